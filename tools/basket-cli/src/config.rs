//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use basket_commerce::admin::InvoiceSettings;
use basket_commerce::cart::{CouponBook, PricingPolicy};
use basket_commerce::checkout::{CheckoutConfig, DeliveryOption};
use basket_commerce::money::Money;
use basket_commerce::notify::DEFAULT_RECIPIENT;
use basket_data::DEFAULT_BASE_URL;
use basket_observability::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};

/// File names searched for, in order.
pub const CONFIG_NAMES: [&str; 3] = ["basket.toml", ".basket.toml", "basket.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Local state and notifications.
    #[serde(default)]
    pub store: StoreConfig,

    /// Shipping rules.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Invoice header.
    #[serde(default)]
    pub invoice: InvoiceSettings,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Pricing and coupon rules for checkout.
    pub fn checkout(&self) -> CheckoutConfig {
        CheckoutConfig {
            pricing: PricingPolicy {
                free_shipping_threshold: Money::inr(self.pricing.free_shipping_threshold),
                flat_shipping_fee: Money::inr(self.pricing.flat_shipping_fee),
            },
            coupons: CouponBook::default(),
        }
    }

    /// Delivery speeds offered at step 2.
    pub fn delivery_options(&self) -> Vec<DeliveryOption> {
        vec![
            DeliveryOption::standard(),
            DeliveryOption::express(Money::inr(self.pricing.express_fee)),
        ]
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8080/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total timeout per request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Local state and notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Where the session and cart are kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Number that receives order messages.
    #[serde(default = "default_recipient")]
    pub whatsapp_recipient: String,

    /// Build WhatsApp links after orders.
    #[serde(default = "default_true")]
    pub notify: bool,
}

fn default_recipient() -> String {
    DEFAULT_RECIPIENT.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            whatsapp_recipient: default_recipient(),
            notify: true,
        }
    }
}

/// Shipping rules, in whole rupees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingConfig {
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: i64,
    #[serde(default = "default_flat_shipping_fee")]
    pub flat_shipping_fee: i64,
    #[serde(default = "default_express_fee")]
    pub express_fee: i64,
}

fn default_free_shipping_threshold() -> i64 {
    499
}

fn default_flat_shipping_fee() -> i64 {
    49
}

fn default_express_fee() -> i64 {
    99
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: default_free_shipping_threshold(),
            flat_shipping_fee: default_flat_shipping_fee(),
            express_fee: default_express_fee(),
        }
    }
}

/// Log settings; `-v` and `--log-format` override them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
}

/// Generate a default basket.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Basket client configuration

[api]
base_url = "{base_url}"
timeout_secs = 20

[store]
# data_dir = "/home/me/.local/share/basket"
whatsapp_recipient = "{recipient}"
notify = true

[pricing]
free_shipping_threshold = 499
flat_shipping_fee = 49
express_fee = 99

[invoice]
store_name = "Neenu's Natural"
address = "Natural & Organic Products Hub, Bangalore, India"
phone = "+91 7892783668"
email = "info@neenusnatural.com"

[logging]
level = "info"
format = "human"
"#,
        base_url = DEFAULT_BASE_URL,
        recipient = DEFAULT_RECIPIENT,
    )
}
