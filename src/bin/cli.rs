use anyhow::Context;
use clap::{Parser, Subcommand};
use roster::cli::seed_students;
use roster::logging::init_tracing;
use roster::modules::students::{PgStudentRepository, StudentRepository, StudentResponse};
use roster_config::AppConfig;
use roster_db::{init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "roster-cli")]
#[command(about = "Roster CLI - Administrative tools for the student database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Insert fake students
    Seed {
        /// Number of students to create
        #[arg(short = 'c', long, default_value = "50")]
        count: usize,
    },
    /// Print every student, newest first
    List,
    /// Delete all students
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.log)?;

    let cli = Cli::parse();

    let pool = init_db_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Migrate => {
            run_migrations(&pool).await?;
            println!("Migrations applied");
        }
        Commands::Seed { count } => {
            let inserted = seed_students(&pool, count).await?;
            println!("Inserted {} student(s)", inserted);
        }
        Commands::List => {
            let repo = PgStudentRepository::new(pool);
            let students = repo.find_all().await?;
            for student in students.into_iter().map(StudentResponse::from) {
                println!(
                    "{:>6}  {:<10}  {:<24}  {:<6}  {:<24}  {}",
                    student.id,
                    student.student_no,
                    student.name,
                    student.gender_text,
                    student.class_name.as_deref().unwrap_or("-"),
                    student.status_text
                );
            }
        }
        Commands::Clear => {
            let repo = PgStudentRepository::new(pool);
            let removed = repo.delete_all().await?;
            println!("Deleted {} student(s)", removed);
        }
    }

    Ok(())
}
