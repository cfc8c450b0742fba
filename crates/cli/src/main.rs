//! StudySpace CLI - Database migrations and admin key management.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! ss-cli migrate
//!
//! # Issue a key (the secret is printed once)
//! ss-cli key create -n "Exam Cell" -r super_admin
//! ss-cli key create -n "DBMS Teacher" -r dept_admin -d cse -s DBMS
//!
//! # Revoke and list keys
//! ss-cli key revoke -n "DBMS Teacher"
//! ss-cli key list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ss-cli")]
#[command(author, version, about = "StudySpace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin secret keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Issue a new admin key
    Create {
        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin role (`super_admin`, `dept_admin`)
        #[arg(short, long, default_value = "dept_admin")]
        role: String,

        /// Department code (required for `dept_admin`)
        #[arg(short, long)]
        department: Option<String>,

        /// Subject within the department
        #[arg(short, long)]
        subject: Option<String>,

        /// College the admin moderates
        #[arg(short, long)]
        college: Option<String>,
    },
    /// Deactivate every active key issued under a name
    Revoke {
        /// Admin display name
        #[arg(short, long)]
        name: String,
    },
    /// List all keys
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Key { action } => match action {
            KeyAction::Create {
                name,
                role,
                department,
                subject,
                college,
            } => {
                let args = commands::key::CreateArgs {
                    name,
                    role,
                    department,
                    subject,
                    college,
                };
                commands::key::create(&args).await?;
            }
            KeyAction::Revoke { name } => commands::key::revoke(&name).await?,
            KeyAction::List => commands::key::list().await?,
        },
    }
    Ok(())
}
