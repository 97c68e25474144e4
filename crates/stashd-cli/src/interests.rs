//! `interests` command: inspect and replace a user's interest horizons.

use clap::Subcommand;
use uuid::Uuid;

use stashd_db::interests;

#[derive(Debug, Subcommand)]
pub(crate) enum InterestsCommand {
    /// Replace the user's interest sets. Omitted horizons are untouched.
    Set {
        #[arg(long)]
        user: Uuid,
        /// Comma-separated categories for the `now` horizon.
        #[arg(long, value_delimiter = ',')]
        now: Option<Vec<String>>,
        /// Comma-separated categories for the `future` horizon.
        #[arg(long, value_delimiter = ',')]
        future: Option<Vec<String>>,
    },
    /// Print the user's current `now` categories.
    Show {
        #[arg(long)]
        user: Uuid,
    },
}

pub(crate) async fn run(command: InterestsCommand) -> anyhow::Result<()> {
    let pool = stashd_db::connect_pool_from_env().await?;

    match command {
        InterestsCommand::Set { user, now, future } => {
            if now.is_none() && future.is_none() {
                anyhow::bail!("provide --now and/or --future");
            }
            if let Some(categories) = now {
                interests::replace_for_horizon(&pool, user, "now", &categories).await?;
                println!("now:    {}", categories.join(", "));
            }
            if let Some(categories) = future {
                interests::replace_for_horizon(&pool, user, "future", &categories).await?;
                println!("future: {}", categories.join(", "));
            }
        }
        InterestsCommand::Show { user } => {
            let categories = interests::now_categories(&pool, user).await?;
            if categories.is_empty() {
                println!("(no current interests)");
            } else {
                for category in categories {
                    println!("{category}");
                }
            }
        }
    }

    Ok(())
}
