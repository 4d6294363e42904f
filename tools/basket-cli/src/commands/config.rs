//! Configuration management commands.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};
use basket_observability::{LogFormat, LogLevel};
use dialoguer::Confirm;
use url::Url;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let config = &ctx.config;
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &config.api.base_url);
    ctx.output.kv("timeout_secs", &config.api.timeout_secs.to_string());

    ctx.output.info("[store]");
    ctx.output.kv("data_dir", &ctx.data_dir().display().to_string());
    ctx.output.kv("whatsapp_recipient", &config.store.whatsapp_recipient);
    ctx.output.kv("notify", &config.store.notify.to_string());

    ctx.output.info("[pricing]");
    ctx.output.kv(
        "free_shipping_threshold",
        &config.pricing.free_shipping_threshold.to_string(),
    );
    ctx.output
        .kv("flat_shipping_fee", &config.pricing.flat_shipping_fee.to_string());
    ctx.output.kv("express_fee", &config.pricing.express_fee.to_string());

    ctx.output.info("[invoice]");
    ctx.output.kv("store_name", &config.invoice.store_name);
    ctx.output.kv("address", &config.invoice.address);
    ctx.output.kv("phone", &config.invoice.phone);
    ctx.output.kv("email", &config.invoice.email);

    ctx.output.info("[logging]");
    ctx.output.kv("level", config.logging.level.as_str());
    ctx.output.kv("format", &config.logging.format.to_string());
    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let Some(path) = &ctx.config_path else {
        bail!("No config file found. Run `basket config init` to create one.");
    };

    let mut config = CliConfig::load(path)?;
    set_config_value(&mut config, key, value)?;
    config.save(path)?;

    ctx.output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path: PathBuf = ctx.cwd.join("basket.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if config_path.exists() && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Overwrite {}?", config_path.display()))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check_config(&ctx.config);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");
    Ok(())
}

/// Errors and warnings for `config`.
fn check_config(config: &CliConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.scheme() == "http" && url.host_str() != Some("localhost") {
                warnings.push("api.base_url uses plain http".to_string());
            }
        }
        Ok(url) => errors.push(format!("api.base_url has unsupported scheme '{}'", url.scheme())),
        Err(e) => errors.push(format!("api.base_url is not a valid URL: {}", e)),
    }

    if config.api.timeout_secs == 0 {
        errors.push("api.timeout_secs must be greater than 0".to_string());
    }

    let pricing = &config.pricing;
    for (name, amount) in [
        ("free_shipping_threshold", pricing.free_shipping_threshold),
        ("flat_shipping_fee", pricing.flat_shipping_fee),
        ("express_fee", pricing.express_fee),
    ] {
        if amount < 0 {
            errors.push(format!("pricing.{} must not be negative", name));
        }
    }

    if config.store.notify
        && !config
            .store
            .whatsapp_recipient
            .chars()
            .any(|c| c.is_ascii_digit())
    {
        errors.push("store.whatsapp_recipient must contain a phone number".to_string());
    }

    if config.invoice.store_name.trim().is_empty() {
        warnings.push("invoice.store_name is empty".to_string());
    }

    (errors, warnings)
}

fn get_config_value(config: &CliConfig, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["api", "base_url"] => Ok(config.api.base_url.clone()),
        ["api", "timeout_secs"] => Ok(config.api.timeout_secs.to_string()),
        ["store", "data_dir"] => Ok(config
            .store
            .data_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default()),
        ["store", "whatsapp_recipient"] => Ok(config.store.whatsapp_recipient.clone()),
        ["store", "notify"] => Ok(config.store.notify.to_string()),
        ["pricing", "free_shipping_threshold"] => {
            Ok(config.pricing.free_shipping_threshold.to_string())
        }
        ["pricing", "flat_shipping_fee"] => Ok(config.pricing.flat_shipping_fee.to_string()),
        ["pricing", "express_fee"] => Ok(config.pricing.express_fee.to_string()),
        ["invoice", "store_name"] => Ok(config.invoice.store_name.clone()),
        ["invoice", "address"] => Ok(config.invoice.address.clone()),
        ["invoice", "phone"] => Ok(config.invoice.phone.clone()),
        ["invoice", "email"] => Ok(config.invoice.email.clone()),
        ["logging", "level"] => Ok(config.logging.level.to_string()),
        ["logging", "format"] => Ok(config.logging.format.to_string()),
        _ => bail!("Unknown config key: {}", key),
    }
}

fn set_config_value(config: &mut CliConfig, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["api", "base_url"] => config.api.base_url = value.to_string(),
        ["api", "timeout_secs"] => config.api.timeout_secs = value.parse()?,
        ["store", "data_dir"] => {
            config.store.data_dir = Some(value).filter(|v| !v.is_empty()).map(PathBuf::from)
        }
        ["store", "whatsapp_recipient"] => config.store.whatsapp_recipient = value.to_string(),
        ["store", "notify"] => config.store.notify = value.parse()?,
        ["pricing", "free_shipping_threshold"] => {
            config.pricing.free_shipping_threshold = value.parse()?
        }
        ["pricing", "flat_shipping_fee"] => config.pricing.flat_shipping_fee = value.parse()?,
        ["pricing", "express_fee"] => config.pricing.express_fee = value.parse()?,
        ["invoice", "store_name"] => config.invoice.store_name = value.to_string(),
        ["invoice", "address"] => config.invoice.address = value.to_string(),
        ["invoice", "phone"] => config.invoice.phone = value.to_string(),
        ["invoice", "email"] => config.invoice.email = value.to_string(),
        ["logging", "level"] => {
            config.logging.level = value.parse::<LogLevel>().map_err(anyhow::Error::msg)?
        }
        ["logging", "format"] => {
            config.logging.format = value.parse::<LogFormat>().map_err(anyhow::Error::msg)?
        }
        _ => bail!("Unknown config key: {}", key),
    }

    Ok(())
}
