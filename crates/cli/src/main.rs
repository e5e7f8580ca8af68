//! lexrag CLI — the main entry point.
//!
//! Commands:
//! - `seed`          — Import a statute corpus from a plain-text file
//! - `ask`           — Ask a question grounded in the stored corpus
//! - `conversations` — List active conversations
//! - `history`       — Show a conversation's full history
//! - `delete`        — Archive a conversation
//! - `reindex`       — Rebuild the article index from the database
//! - `status`        — Show configuration and corpus status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "lexrag",
    about = "lexrag — retrieval-grounded legal Q&A over a statute corpus",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a statute corpus from a plain-text file
    Seed {
        /// Path to the statute text file
        #[arg(short, long)]
        file: String,

        /// Clear the stored corpus before importing
        #[arg(long)]
        force: bool,
    },

    /// Ask a question grounded in the stored corpus
    Ask {
        /// The question
        query: String,

        /// Continue an existing conversation
        #[arg(short, long)]
        conversation: Option<String>,

        /// Owner the conversation belongs to
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// List active conversations, most recently updated first
    Conversations {
        /// Owner whose conversations to list
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Show a conversation's full history
    History {
        /// Conversation id
        conversation: String,

        /// Owner the conversation belongs to
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Archive a conversation (it stays readable by id)
    Delete {
        /// Conversation id
        conversation: String,

        /// Owner the conversation belongs to
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Rebuild the article index from the database
    Reindex,

    /// Show configuration and corpus status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Seed { file, force } => commands::seed::run(&file, force).await?,
        Commands::Ask {
            query,
            conversation,
            owner,
        } => commands::ask::run(&query, conversation, owner).await?,
        Commands::Conversations { owner } => commands::conversations::run(owner).await?,
        Commands::History {
            conversation,
            owner,
        } => commands::history::run(&conversation, owner).await?,
        Commands::Delete {
            conversation,
            owner,
        } => commands::delete::run(&conversation, owner).await?,
        Commands::Reindex => commands::reindex::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
