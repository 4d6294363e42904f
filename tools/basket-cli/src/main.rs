//! Basket CLI - storefront, checkout and admin console for the Basket backend.
//!
//! Commands:
//! - `basket auth` - Log in, register, log out, show the profile
//! - `basket products` - Browse and search the catalog
//! - `basket categories` - List categories
//! - `basket cart` - Manage the local cart
//! - `basket checkout` - Interactive four-step checkout
//! - `basket admin` - Products, orders, categories and invoices
//! - `basket config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use basket_observability::{init_tracing, LogFormat, LogLevel, LoggingConfig};
use clap::{Parser, Subcommand};

use commands::{
    AdminArgs, AuthArgs, CartArgs, CategoriesArgs, CheckoutArgs, ConfigArgs, ProductsArgs,
};

/// Basket - shop and run the store from the terminal
#[derive(Parser)]
#[command(name = "basket")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Backend base URL
    #[arg(long, global = true, env = "BASKET_API_BASE_URL")]
    api_url: Option<String>,

    /// Log line format (human or json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, register or log out
    Auth(AuthArgs),

    /// Browse the catalog
    Products(ProductsArgs),

    /// List product categories
    Categories(CategoriesArgs),

    /// Manage the cart
    Cart(CartArgs),

    /// Check out the cart
    Checkout(CheckoutArgs),

    /// Store administration
    Admin(AdminArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose > 0, cli.json);

    // Load config
    let ctx = context::Context::load(cli.config.as_deref(), cli.api_url.as_deref(), output)?;

    let level = if cli.verbose > 0 {
        LogLevel::from_verbosity(cli.verbose)
    } else {
        ctx.config.logging.level
    };
    let format = cli.log_format.unwrap_or(ctx.config.logging.format);
    if let Err(e) = init_tracing(LoggingConfig::new(level, format)) {
        ctx.output.warn(&format!("Logging disabled: {}", e));
    }

    // Execute command
    let result = match cli.command {
        Commands::Auth(args) => commands::auth::run(args, &ctx).await,
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Categories(args) => commands::categories::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Admin(args) => commands::admin::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        if commands::is_auth_failure(&e) {
            ctx.output.info("Run `basket auth login` to sign in again.");
        }
        std::process::exit(1);
    }

    Ok(())
}
