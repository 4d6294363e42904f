//! Store administration commands.
//!
//! Every subcommand requires an admin session.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use basket_commerce::admin::{
    CategoryConsole, CategoryFilter, FormMode, ImageUpload, InvoiceDesk, OrderConsole, OrderFilter,
    ProductConsole, ProductFilter, ProductForm,
};
use basket_commerce::backend::AdminBackend;
use basket_commerce::catalog::CategoryPayload;
use basket_commerce::checkout::{Order, OrderStatus};
use basket_commerce::ids::{CategoryId, OrderId, ProductId};
use dialoguer::Confirm;

use super::categories::print_categories;
use super::products::print_products;
use super::{
    AdminArgs, AdminCategoriesCommand, AdminCommand, AdminOrdersCommand, AdminProductsCommand,
    ProductFields,
};
use crate::context::Context;
use crate::output::{status_badge, truncate};

/// Run the admin command.
pub async fn run(args: AdminArgs, ctx: &Context) -> Result<()> {
    let admin = ctx.require_admin()?;
    tracing::debug!(user = %admin.user.email, "admin console");
    let backend: Arc<dyn AdminBackend> = Arc::new(ctx.client()?);

    match args.command {
        AdminCommand::Products { command } => products(command, backend, ctx).await,
        AdminCommand::Orders { command } => orders(command, backend, ctx).await,
        AdminCommand::Categories { command } => categories(command, backend, ctx).await,
    }
}

async fn products(
    command: AdminProductsCommand,
    backend: Arc<dyn AdminBackend>,
    ctx: &Context,
) -> Result<()> {
    let mut console = ProductConsole::new(backend);

    match command {
        AdminProductsCommand::List { query, category } => {
            console.reload().await?;
            let mut filter = ProductFilter::text(query.unwrap_or_default());
            if let Some(category) = category {
                filter = filter.with_category(category);
            }
            console.filter = filter;
            let visible = console.visible();

            if ctx.output.is_json() {
                ctx.output.json(&visible);
                return Ok(());
            }

            ctx.output.header(&format!(
                "Products ({} of {})",
                visible.len(),
                console.all().len()
            ));
            if visible.is_empty() {
                ctx.output.info("No products match");
            } else {
                print_products(&visible, ctx);
            }
            let categories = console.categories();
            if !categories.is_empty() {
                ctx.output.kv("categories", &categories.join(", "));
            }
        }
        AdminProductsCommand::Create { fields } => {
            let mut form = ProductForm::new();
            apply_fields(&mut form, fields, ctx)?;
            let spinner = ctx.output.spinner("Saving product...");
            let result = console.save(FormMode::Create, form).await;
            spinner.finish_and_clear();
            let saved = result?;
            ctx.output
                .success(&format!("Created {} ({})", saved.name, saved.id.as_str()));
        }
        AdminProductsCommand::Edit { id, fields } => {
            console.reload().await?;
            let id = ProductId::new(id);
            let Some(product) = console.find(&id) else {
                bail!("Product {} not found", id.as_str());
            };
            let mut form = ProductForm::from_product(product);
            apply_fields(&mut form, fields, ctx)?;
            let spinner = ctx.output.spinner("Saving product...");
            let result = console.save(FormMode::Edit(id), form).await;
            spinner.finish_and_clear();
            let saved = result?;
            ctx.output
                .success(&format!("Updated {} ({})", saved.name, saved.id.as_str()));
        }
        AdminProductsCommand::Delete { id, yes } => {
            let id = ProductId::new(id);
            if !confirm(yes, &format!("Delete product {}?", id.as_str()))? {
                ctx.output.warn("Cancelled");
                return Ok(());
            }
            console.delete(&id).await?;
            ctx.output.success(&format!(
                "Deleted product {}; {} remain",
                id.as_str(),
                console.all().len()
            ));
        }
    }
    Ok(())
}

/// Copy the given flags onto the form. Omitted flags leave fields as they are.
fn apply_fields(form: &mut ProductForm, fields: ProductFields, ctx: &Context) -> Result<()> {
    let ProductFields {
        name,
        description,
        price,
        original_price,
        category,
        subcategory,
        brand,
        weight,
        stock,
        ingredients,
        benefits,
        image,
    } = fields;

    let targets = [
        (name, &mut form.name),
        (description, &mut form.description),
        (price, &mut form.price),
        (original_price, &mut form.original_price),
        (category, &mut form.category),
        (subcategory, &mut form.subcategory),
        (brand, &mut form.brand),
        (weight, &mut form.weight),
        (stock, &mut form.stock_quantity),
        (ingredients, &mut form.ingredients),
        (benefits, &mut form.benefits),
    ];
    for (value, field) in targets {
        if let Some(value) = value {
            *field = value;
        }
    }

    if let Some(path) = image {
        form.image = Some(ImageUpload::from_path(&ctx.resolve_path(Path::new(&path)))?);
    }
    Ok(())
}

async fn orders(
    command: AdminOrdersCommand,
    backend: Arc<dyn AdminBackend>,
    ctx: &Context,
) -> Result<()> {
    let mut console = OrderConsole::new(backend);

    match command {
        AdminOrdersCommand::List { query, status } => {
            console.reload().await?;
            let mut filter = OrderFilter::text(query.unwrap_or_default());
            if let Some(status) = status {
                filter = filter.with_status(OrderStatus::from(status.as_str()));
            }
            console.filter = filter;
            let visible = console.visible();

            if ctx.output.is_json() {
                ctx.output.json(&visible);
                return Ok(());
            }

            ctx.output.header(&format!(
                "Orders ({} of {})",
                visible.len(),
                console.all().len()
            ));
            print_orders(&visible, ctx);
            let counts: Vec<String> = console
                .status_counts()
                .iter()
                .map(|(status, n)| format!("{} {}", status.display_name(), n))
                .collect();
            ctx.output.kv("status", &counts.join(" · "));
        }
        AdminOrdersCommand::Status { id, status } => {
            let status = parse_status(&status)?;
            let id = OrderId::new(id);
            console.update_status(&id, status.clone()).await?;
            let label = match console.find(&id) {
                Some(order) => order.display_number(),
                None => id.to_string(),
            };
            ctx.output
                .success(&format!("{} is now {}", label, status_badge(&status)));
        }
        AdminOrdersCommand::Invoice { id, out } => {
            console.reload().await?;
            let id = OrderId::new(id);
            let Some(order) = console.find(&id) else {
                bail!("Order {} not found", id.as_str());
            };
            let desk = InvoiceDesk::new(ctx.config.invoice.clone());
            match out {
                Some(dir) => {
                    let path = desk.write(order, &ctx.resolve_path(Path::new(&dir)))?;
                    ctx.output
                        .success(&format!("Invoice written to {}", path.display()));
                }
                None => println!("{}", desk.render(order)?),
            }
        }
    }
    Ok(())
}

/// Only the statuses the store uses can be set.
fn parse_status(input: &str) -> Result<OrderStatus> {
    let status = OrderStatus::from(input);
    if !OrderStatus::ALL.contains(&status) {
        let known: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
        bail!("Unknown status '{}'. Use one of: {}", input, known.join(", "));
    }
    Ok(status)
}

fn print_orders(orders: &[&Order], ctx: &Context) {
    if orders.is_empty() {
        ctx.output.info("No orders match");
        return;
    }
    let widths = [16, 22, 12, 6, 12, 12];
    ctx.output.table_header(
        &["ORDER", "CUSTOMER", "DATE", "ITEMS", "TOTAL", "STATUS"],
        &widths,
    );
    for order in orders {
        let customer = truncate(order.customer_name().unwrap_or("-"), 22);
        let date = order
            .created_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        ctx.output.table_row(
            &[
                &order.display_number(),
                &customer,
                &date,
                &order.item_count().to_string(),
                &order.total.display(),
                &status_badge(&order.status),
            ],
            &widths,
        );
    }
}

async fn categories(
    command: AdminCategoriesCommand,
    backend: Arc<dyn AdminBackend>,
    ctx: &Context,
) -> Result<()> {
    let mut console = CategoryConsole::new(backend);

    match command {
        AdminCategoriesCommand::List { query } => {
            console.reload().await?;
            console.filter = CategoryFilter::text(query.unwrap_or_default());
            let visible = console.visible();
            if ctx.output.is_json() {
                ctx.output.json(&visible);
                return Ok(());
            }
            ctx.output.header(&format!(
                "Categories ({} of {})",
                visible.len(),
                console.all().len()
            ));
            print_categories(&visible, ctx);
        }
        AdminCategoriesCommand::Add {
            name,
            description,
            image_url,
        } => {
            let created = console
                .create(CategoryPayload {
                    name,
                    description,
                    image_url,
                })
                .await?;
            ctx.output
                .success(&format!("Created {} ({})", created.name, created.id.as_str()));
        }
        AdminCategoriesCommand::Update {
            id,
            name,
            description,
            image_url,
        } => {
            let updated = console
                .update(
                    &CategoryId::new(id),
                    CategoryPayload {
                        name,
                        description,
                        image_url,
                    },
                )
                .await?;
            ctx.output.success(&format!("Updated {}", updated.name));
        }
        AdminCategoriesCommand::Remove { id, yes } => {
            let id = CategoryId::new(id);
            if !confirm(yes, &format!("Delete category {}?", id.as_str()))? {
                ctx.output.warn("Cancelled");
                return Ok(());
            }
            console.delete(&id).await?;
            ctx.output.success(&format!("Deleted category {}", id.as_str()));
        }
    }
    Ok(())
}

fn confirm(yes: bool, prompt: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
