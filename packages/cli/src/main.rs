//! LawSphere CLI - ask the legal assistant, browse sections, draft documents and
//! manage accounts from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Ask a question, answered in Hindi
//! lawsphere ask "What is the punishment for theft?" --hindi
//!
//! # Compare two sections
//! lawsphere compare "BNS 303" "IPC 379"
//!
//! # Search a local section dataset
//! lawsphere sections --file bns.json --query theft --category Property
//!
//! # Render a bail application to HTML
//! lawsphere draft bail -s "Ravi Kumar" -r "Sessions Court, Pune" -d "Case 42/2024" -o bail.html
//!
//! # Accounts
//! lawsphere signup -e asha@example.com -p secret1 -n "Asha" -r citizen
//! lawsphere login -e asha@example.com -p secret1 -r citizen
//! lawsphere google -r lawyer
//! ```
//!
//! # Configuration
//!
//! Settings come from `lawsphere.toml` and `LAWSPHERE_*` environment variables
//! (a `.env` file is loaded first). Accounts go to Firebase when
//! `firebase.api_key` is set, and their profiles to the Firestore database of
//! `firebase.project_id`; otherwise both are kept offline under
//! `store.data_dir`. Log verbosity follows `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use api::models::DraftTemplate;
use api::Role;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lawsphere")]
#[command(author, version, about = "LawSphere legal assistant tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the legal assistant a question
    Ask {
        query: String,

        /// Answer in Hindi
        #[arg(long)]
        hindi: bool,
    },
    /// Compare two legal sections
    Compare { section1: String, section2: String },
    /// Search a JSON file of BNS sections
    Sections {
        /// Path to the section dataset
        #[arg(short, long)]
        file: PathBuf,

        /// Match on section number, title or description
        #[arg(short, long, default_value = "")]
        query: String,

        /// Restrict to one category
        #[arg(short, long, default_value = api::models::ALL_CATEGORIES)]
        category: String,
    },
    /// Render a legal document template to HTML
    Draft {
        /// Template (`fir`, `bail`, `notice`)
        template: DraftTemplate,

        /// Your name
        #[arg(short, long)]
        sender: String,

        /// Police station, court or recipient name
        #[arg(short, long)]
        recipient: String,

        /// Incident, case or notice details
        #[arg(short, long)]
        details: String,

        /// Document date (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Create an account and its profile
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account role (`citizen`, `lawyer`)
        #[arg(short, long)]
        role: Role,
    },
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Role to log in as; must match the account
        #[arg(short, long)]
        role: Role,
    },
    /// Sign in with Google
    Google {
        /// Role for a new account, or the role to log in as
        #[arg(short, long)]
        role: Role,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = api::Settings::new()?;
    match cli.command {
        Commands::Ask { query, hindi } => {
            commands::assistant::ask(&settings, &query, hindi).await?;
        }
        Commands::Compare { section1, section2 } => {
            commands::assistant::compare(&settings, &section1, &section2).await?;
        }
        Commands::Sections {
            file,
            query,
            category,
        } => commands::sections::search(&file, &query, &category)?,
        Commands::Draft {
            template,
            sender,
            recipient,
            details,
            date,
            out,
        } => {
            let input = commands::draft::input(sender, recipient, details, date);
            commands::draft::render(template, &input, out.as_deref())?;
        }
        Commands::Signup {
            email,
            password,
            name,
            role,
        } => {
            let action = commands::account::Action::Signup {
                email,
                password,
                name,
                role,
            };
            commands::account::run(&settings, action).await?;
        }
        Commands::Login {
            email,
            password,
            role,
        } => {
            let action = commands::account::Action::Login {
                email,
                password,
                role,
            };
            commands::account::run(&settings, action).await?;
        }
        Commands::Google { role } => {
            commands::account::run(&settings, commands::account::Action::Google { role }).await?;
        }
    }
    Ok(())
}
