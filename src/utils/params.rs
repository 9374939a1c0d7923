//! Loose form parameters.
//!
//! The student endpoint takes its input as flat key/value pairs, the way an
//! HTML form submits them: first from the query string, then (for POST) from
//! an urlencoded or multipart body. Repeated keys such as `ids[]` keep every
//! value in order.

use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{Method, header::CONTENT_TYPE},
};
use roster_core::AppError;
use roster_core::text::{parse_int, parse_int_list};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(Vec<(String, String)>);

impl RequestParams {
    /// Parses an `application/x-www-form-urlencoded` string.
    pub fn from_urlencoded(raw: &str) -> Result<Self, AppError> {
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
            .map_err(|e| AppError::bad_request(anyhow!("Invalid form parameters: {}", e)))?;
        Ok(Self(pairs))
    }

    /// The first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in submission order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The first value for `key` as an integer; blank or malformed is `None`.
    pub fn int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(parse_int)
    }

    /// Every integer value for `key`, skipping malformed entries.
    pub fn int_list(&self, key: &str) -> Vec<i32> {
        parse_int_list(&self.get_all(key))
    }

    pub fn extend(&mut self, other: RequestParams) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

async fn read_multipart(multipart: &mut Multipart) -> Result<RequestParams, AppError> {
    let mut pairs = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|e| AppError::bad_request(anyhow!("Invalid multipart body: {}", e)))?;
        pairs.push((name, value));
    }
    Ok(RequestParams(pairs))
}

impl<S> FromRequest<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut params = match req.uri().query() {
            Some(query) => Self::from_urlencoded(query)?,
            None => Self::default(),
        };

        if req.method() != Method::POST {
            return Ok(params);
        }

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(anyhow!("Invalid multipart body: {}", e)))?;
            params.extend(read_multipart(&mut multipart).await?);
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(anyhow!("Invalid request body: {}", e)))?;
            let body = std::str::from_utf8(&body)
                .map_err(|_| AppError::bad_request(anyhow!("Request body is not valid UTF-8")))?;
            params.extend(Self::from_urlencoded(body)?);
        }

        Ok(params)
    }
}
