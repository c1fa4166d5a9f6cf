use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "duebell", version, about = "Sheet-driven due-date reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reminder evaluation pass
    Run {
        /// Override "today" (MM/DD/YYYY); defaults to the local date
        #[arg(long)]
        date: Option<String>,
        /// Evaluate without sending alerts or writing status
        #[arg(long)]
        dry_run: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Status store inspection
    Status {
        #[command(subcommand)]
        action: commands::status::StatusAction,
    },
    /// Acknowledge an item so it never alerts again
    Ack {
        /// Item name as it appears in the sheet
        item_name: String,
        /// Due date as it appears in the sheet (MM/DD/YYYY)
        due_date: String,
    },
    /// Sheet credential management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { date, dry_run } => commands::run::run(date, dry_run),
        Commands::Config { action } => commands::config::run(action),
        Commands::Status { action } => commands::status::run(action),
        Commands::Ack {
            item_name,
            due_date,
        } => commands::ack::run(&item_name, &due_date),
        Commands::Auth { action } => commands::auth::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
