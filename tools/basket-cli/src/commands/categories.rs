//! Category listing.

use anyhow::Result;
use basket_commerce::backend::CatalogBackend;
use basket_commerce::catalog::Category;
use basket_commerce::ids::CategoryId;

use super::{CategoriesArgs, CategoriesCommand};
use crate::context::Context;
use crate::output::truncate;

/// Run the categories command.
pub async fn run(args: CategoriesArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(CategoriesCommand::List) {
        CategoriesCommand::List => list(ctx).await,
        CategoriesCommand::Show { id } => show(&id, ctx).await,
    }
}

async fn list(ctx: &Context) -> Result<()> {
    let categories = ctx.client()?.list_categories().await?;

    if ctx.output.is_json() {
        ctx.output.json(&categories);
        return Ok(());
    }

    ctx.output.header(&format!("Categories ({})", categories.len()));
    print_categories(&categories.iter().collect::<Vec<_>>(), ctx);
    Ok(())
}

async fn show(id: &str, ctx: &Context) -> Result<()> {
    let category = ctx.client()?.get_category(&CategoryId::new(id)).await?;

    if ctx.output.is_json() {
        ctx.output.json(&category);
        return Ok(());
    }

    ctx.output.header(&category.name);
    ctx.output.kv("id", category.id.as_str());
    if let Some(description) = &category.description {
        ctx.output.kv("description", description);
    }
    if let Some(image) = &category.image_url {
        ctx.output.kv("image", image);
    }
    ctx.output
        .info(&format!("Browse: basket products list --category \"{}\"", category.name));
    Ok(())
}

/// Category table shared with the admin console.
pub(super) fn print_categories(categories: &[&Category], ctx: &Context) {
    if categories.is_empty() {
        ctx.output.info("No categories");
        return;
    }
    let widths = [6, 24, 40];
    ctx.output.table_header(&["ID", "NAME", "DESCRIPTION"], &widths);
    for category in categories {
        let description = truncate(category.description.as_deref().unwrap_or(""), 40);
        ctx.output.table_row(
            &[category.id.as_str(), &category.name, &description],
            &widths,
        );
    }
}
