// localmart entry point.
//
// Each invocation:
// 1. Initialize tracing (stderr)
// 2. Load config (copying defaults into config/ on first run)
// 3. Open the cart store and restore the saved cart
// 4. Apply one command
// 5. Print the cart and totals

mod commands;
mod prompt;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, warn};

use localmart_cart::config::{self, Config, ConfigError};

#[derive(Parser)]
#[command(name = "localmart")]
#[command(author, version, about = "Manage the localmart shopping cart")]
struct Cli {
    /// Directory holding `config/` and `defaults/` (the workspace root by default)
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Answer yes to every confirmation prompt
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the cart
    Show,
    /// Add one unit of an item
    Add {
        /// Menu item id
        #[arg(long)]
        id: String,

        /// Menu item name
        #[arg(long)]
        name: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Mark the item as vegetarian
        #[arg(long)]
        veg: bool,

        /// Restaurant id (required when the cart is empty)
        #[arg(long, requires = "restaurant_name")]
        restaurant_id: Option<String>,

        /// Restaurant display name
        #[arg(long, requires = "restaurant_id")]
        restaurant_name: Option<String>,
    },
    /// Remove one unit of an item
    Remove {
        /// Menu item id
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Print only the totals
    Total,
    /// Place an order for the cart contents
    Checkout {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        instructions: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let config = load_config(&cli.config_dir)?;
    info!(
        "Config loaded: delivery fee {}, tax rate {}",
        config.pricing.delivery_fee, config.pricing.tax_rate
    );

    commands::run(cli.command, &config, cli.yes).await
}

/// Load config from `config_dir`, falling back to built-in defaults when the
/// directory has neither `config/` nor `defaults/`.
fn load_config(config_dir: &std::path::Path) -> anyhow::Result<Config> {
    match config::load_config(config_dir) {
        Ok(config) => Ok(config),
        Err(ConfigError::DefaultsCopyError { message }) => {
            warn!("Using built-in config: {}", message);
            Ok(Config::default())
        }
        Err(e) => Err(e).context("failed to load configuration"),
    }
}

/// Initialize tracing to stderr so command output on stdout stays clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("localmart=info,localmart_cart=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_flag_parses() {
        let cli = Cli::try_parse_from(["localmart", "--config-dir", "/srv/localmart", "show"])
            .unwrap();
        assert_eq!(cli.config_dir, PathBuf::from("/srv/localmart"));
        assert!(!cli.yes);
        assert!(matches!(cli.command, Command::Show));
    }

    #[test]
    fn config_dir_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["localmart", "--yes", "clear"]).unwrap();
        assert_eq!(cli.config_dir, PathBuf::from("."));
        assert!(cli.yes);
    }

    #[test]
    fn workspace_defaults_are_found_from_the_root() {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
        assert!(root.join("defaults").join("localmart.toml").is_file());
    }

    #[test]
    fn add_requires_both_restaurant_fields() {
        let result = Cli::try_parse_from([
            "localmart", "add", "--id", "m1", "--name", "Dal", "--price", "90",
            "--restaurant-id", "r1",
        ]);
        assert!(result.is_err());
    }
}
