//! CLI command implementations.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod config;
pub mod products;

use basket_auth::AuthError;
use basket_commerce::admin::AdminError;
use basket_commerce::backend::BackendError;
use basket_commerce::checkout::CheckoutError;
use basket_data::FetchError;
use clap::{Args, Subcommand};

/// Whether `err` means the user has to log in again.
pub fn is_auth_failure(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(e) = cause.downcast_ref::<FetchError>() {
            return e.is_auth_failure();
        }
        if let Some(e) = cause.downcast_ref::<BackendError>() {
            return e.is_auth_failure();
        }
        if let Some(e) = cause.downcast_ref::<CheckoutError>() {
            return e.is_auth_failure();
        }
        if let Some(e) = cause.downcast_ref::<AdminError>() {
            return e.is_auth_failure();
        }
        if let Some(e) = cause.downcast_ref::<AuthError>() {
            return e.is_auth_failure();
        }
        false
    })
}

/// Arguments for the auth command.
#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Log in with email and password.
    Login {
        /// Account email (prompted when omitted).
        #[arg(short, long)]
        email: Option<String>,

        /// Password (prompted when omitted).
        #[arg(long, env = "BASKET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account.
    Register {
        /// Full name.
        #[arg(short, long)]
        name: Option<String>,

        /// Account email.
        #[arg(short, long)]
        email: Option<String>,

        /// Phone number.
        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Fetch the profile from the backend.
    Profile,
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List storefront products.
    List {
        /// Only this category.
        #[arg(short, long)]
        category: Option<String>,

        /// Backend search query.
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product.
    Show {
        /// Product ID.
        id: String,
    },
    /// Search-as-you-type suggestions.
    Suggest {
        /// Partial product name.
        query: String,
    },
}

/// Arguments for the categories command.
#[derive(Args)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub command: Option<CategoriesCommand>,
}

#[derive(Subcommand)]
pub enum CategoriesCommand {
    /// List categories.
    List,
    /// Show one category.
    Show {
        /// Category ID.
        id: String,
    },
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart and its totals.
    Show,
    /// Add a product.
    Add {
        /// Product ID.
        product: String,

        /// Variant label, e.g. "500g".
        #[arg(long)]
        variant: Option<String>,

        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        qty: i64,
    },
    /// Set the quantity of a line. Zero removes it.
    Update {
        /// Line key, as shown by `basket cart show`.
        key: String,

        /// New quantity.
        qty: i64,
    },
    /// Remove a line.
    Remove {
        /// Line key.
        key: String,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Coupon code to apply.
    #[arg(long)]
    pub coupon: Option<String>,

    /// Use express delivery.
    #[arg(long)]
    pub express: bool,

    /// Payment method (cod, card, upi, wallet).
    #[arg(long)]
    pub payment: Option<String>,

    /// Delivery location latitude, sent with the order message.
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// Delivery location longitude.
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// Place the order without the final confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the admin command.
#[derive(Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Manage products.
    Products {
        #[command(subcommand)]
        command: AdminProductsCommand,
    },
    /// Manage orders.
    Orders {
        #[command(subcommand)]
        command: AdminOrdersCommand,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: AdminCategoriesCommand,
    },
}

/// Product form fields. Blank fields keep their current value on edit.
#[derive(Args, Default)]
pub struct ProductFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub original_price: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub subcategory: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub weight: Option<String>,
    #[arg(long)]
    pub stock: Option<String>,
    /// Comma-separated ingredients.
    #[arg(long)]
    pub ingredients: Option<String>,
    /// Comma-separated benefits.
    #[arg(long)]
    pub benefits: Option<String>,
    /// Image file to upload with the product.
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Subcommand)]
pub enum AdminProductsCommand {
    /// List all products, including inactive ones.
    List {
        /// Case-insensitive name or brand filter.
        #[arg(short, long)]
        query: Option<String>,

        /// Only this category.
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Create a product.
    Create {
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Edit a product.
    Edit {
        /// Product ID.
        id: String,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product.
    Delete {
        /// Product ID.
        id: String,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum AdminOrdersCommand {
    /// List orders.
    List {
        /// Case-insensitive search over number and customer.
        #[arg(short, long)]
        query: Option<String>,

        /// Only this status.
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Change an order's status.
    Status {
        /// Order ID.
        id: String,

        /// New status (pending, processing, shipped, delivered, cancelled).
        status: String,
    },
    /// Print or save an invoice.
    Invoice {
        /// Order ID.
        id: String,

        /// Write the invoice into this directory instead of printing it.
        #[arg(short, long)]
        out: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AdminCategoriesCommand {
    /// List categories.
    List {
        /// Case-insensitive filter.
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Create a category.
    Add {
        /// Category name.
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        image_url: Option<String>,
    },
    /// Update a category.
    Update {
        /// Category ID.
        id: String,

        /// New name.
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        image_url: Option<String>,
    },
    /// Delete a category.
    Remove {
        /// Category ID.
        id: String,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Get a value, e.g. `api.base_url`.
    Get {
        key: String,
    },
    /// Set a value in the config file.
    Set {
        key: String,
        value: String,
    },
    /// Write a default basket.toml here.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Check the configuration.
    Validate,
}
