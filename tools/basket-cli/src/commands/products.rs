//! Storefront catalog commands.

use anyhow::{bail, Result};
use basket_commerce::backend::CatalogBackend;
use basket_commerce::catalog::{suggestions, Product, ProductVariant, MIN_SUGGESTION_QUERY};
use basket_commerce::ids::ProductId;
use console::style;

use super::{ProductsArgs, ProductsCommand};
use crate::context::Context;
use crate::output::{price_label, truncate};

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ProductsCommand::List { category, search } => list(category, search, ctx).await,
        ProductsCommand::Show { id } => show(&id, ctx).await,
        ProductsCommand::Suggest { query } => suggest(&query, ctx).await,
    }
}

async fn list(category: Option<String>, search: Option<String>, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let spinner = ctx.output.spinner("Loading products...");
    let (result, categories) = match (&search, &category) {
        (Some(query), _) if !query.trim().is_empty() => (client.search_products(query).await, None),
        (_, Some(category)) => (client.products_by_category(category).await, None),
        _ => {
            // Storefront landing: products and the category strip together.
            let (products, categories) =
                futures::join!(client.list_products(), client.list_categories());
            (products, Some(categories))
        }
    };
    spinner.finish_and_clear();
    let mut products = result?;

    // Search results can still be narrowed to one category.
    if let (Some(_), Some(category)) = (&search, &category) {
        products.retain(|p| {
            p.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        });
    }

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(&format!("Products ({})", products.len()));
    if products.is_empty() {
        ctx.output.info("No products found");
        return Ok(());
    }
    print_products(&products.iter().collect::<Vec<_>>(), ctx);

    match categories {
        Some(Ok(categories)) if !categories.is_empty() => {
            let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
            ctx.output.kv("categories", &names.join(", "));
        }
        Some(Err(e)) => tracing::warn!(error = %e, "categories unavailable"),
        _ => {}
    }
    Ok(())
}

async fn show(id: &str, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let product = client.get_product(&ProductId::new(id)).await?;

    if ctx.output.is_json() {
        ctx.output.json(&product);
        return Ok(());
    }

    ctx.output.header(&product.name);
    ctx.output.kv("id", product.id.as_str());
    ctx.output.kv(
        "price",
        &price_label(product.current_price(None), product.reference_price(None)),
    );
    let savings = product.savings_percent(None);
    if savings > 0 {
        ctx.output.kv("you save", &format!("{}%", savings));
    }
    if let Some(category) = &product.category {
        ctx.output.kv("category", category);
    }
    if let Some(brand) = &product.brand {
        ctx.output.kv("brand", brand);
    }
    if let Some(weight) = &product.weight {
        ctx.output.kv("weight", weight);
    }
    ctx.output.kv("stock", &availability(&product));
    ctx.output.kv("image", &client.image_url(&product));
    if !product.description.is_empty() {
        ctx.output.kv("description", &product.description);
    }

    if !product.variants.is_empty() {
        ctx.output.info("Variants:");
        for variant in &product.variants {
            let label = format!(
                "{}  {}  {}",
                variant.label,
                price_label(product.current_price(Some(variant)), product.reference_price(Some(variant))),
                stock_text(&product, Some(variant)),
            );
            ctx.output.list_item(&label);
        }
    }
    if !product.ingredients.is_empty() {
        ctx.output.kv("ingredients", &product.ingredients.join(", "));
    }
    if !product.benefits.is_empty() {
        ctx.output.kv("benefits", &product.benefits.join(", "));
    }
    Ok(())
}

async fn suggest(query: &str, ctx: &Context) -> Result<()> {
    if query.trim().chars().count() < MIN_SUGGESTION_QUERY {
        bail!("Type at least {} characters", MIN_SUGGESTION_QUERY);
    }

    let products = ctx.client()?.list_products().await?;
    let matches = suggestions(&products, query);

    if ctx.output.is_json() {
        ctx.output.json(&matches);
        return Ok(());
    }

    if matches.is_empty() {
        ctx.output.info(&format!("No products match \"{}\"", query.trim()));
        return Ok(());
    }
    for product in matches {
        ctx.output.list_item(&format!(
            "{}  {}",
            product.name,
            style(product.id.as_str()).dim()
        ));
    }
    Ok(())
}

/// Product table shared with the admin console.
pub(super) fn print_products(products: &[&Product], ctx: &Context) {
    let widths = [6, 32, 18, 14, 12];
    ctx.output
        .table_header(&["ID", "NAME", "PRICE", "CATEGORY", "STOCK"], &widths);
    for product in products {
        let name = truncate(&product.name, 32);
        let price = price_label(product.current_price(None), product.reference_price(None));
        let category = truncate(product.category.as_deref().unwrap_or("-"), 14);
        let stock = if product.is_active {
            availability(product)
        } else {
            style("hidden").dim().to_string()
        };
        ctx.output.table_row(
            &[product.id.as_str(), &name, &price, &category, &stock],
            &widths,
        );
    }
}

fn availability(product: &Product) -> String {
    stock_text(product, product.variant(None))
}

fn stock_text(product: &Product, variant: Option<&ProductVariant>) -> String {
    if !product.is_in_stock(variant) {
        return style("out of stock").red().to_string();
    }
    match product.stock_level(variant).cap() {
        Some(n) if n <= 5 => style(format!("only {} left", n)).yellow().to_string(),
        Some(n) => n.to_string(),
        None => style("in stock").green().to_string(),
    }
}
