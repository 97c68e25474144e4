mod interests;
mod status;
mod submit;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "stashd-cli")]
#[command(about = "stashd command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit a URL and run the processing pipeline in-process.
    Submit {
        /// Acting user ID.
        #[arg(long)]
        user: Uuid,
        /// The URL to save.
        #[arg(long)]
        url: String,
        /// Optional memo stored on the link and passed to summarization.
        #[arg(long)]
        memo: Option<String>,
        /// Poll until the content item reaches a terminal state.
        #[arg(long)]
        wait: bool,
    },
    /// Show one saved link with its content and label.
    Status {
        #[arg(long)]
        user: Uuid,
        /// The link ID printed by `submit`.
        #[arg(long)]
        link: Uuid,
    },
    /// Manage a user's interest categories.
    Interests {
        #[command(subcommand)]
        command: interests::InterestsCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Submit {
            user,
            url,
            memo,
            wait,
        } => submit::run(user, &url, memo, wait).await,
        Commands::Status { user, link } => status::run(user, link).await,
        Commands::Interests { command } => interests::run(command).await,
    }
}
