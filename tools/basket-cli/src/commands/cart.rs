//! Cart commands.

use anyhow::Result;
use basket_commerce::backend::CatalogBackend;
use basket_commerce::cart::{CartItem, CartTotals, LineItemKey, PricingPolicy};
use basket_commerce::ids::ProductId;
use basket_commerce::money::Money;
use dialoguer::Confirm;
use serde::Serialize;

use super::{CartArgs, CartCommand};
use crate::context::Context;
use crate::output::{shipping_label, truncate};

#[derive(Serialize)]
struct CartView<'a> {
    items: &'a [CartItem],
    count: i64,
    totals: CartTotals,
    savings: Money,
}

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => show(ctx),
        CartCommand::Add { product, variant, qty } => add(&product, variant.as_deref(), qty, ctx).await,
        CartCommand::Update { key, qty } => update(&key, qty, ctx),
        CartCommand::Remove { key } => remove(&key, ctx),
        CartCommand::Clear { yes } => clear(yes, ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let cart = ctx.cart_store()?;
    let snapshot = cart.snapshot()?;
    let items = &snapshot.items;
    let savings = snapshot.savings();
    let pricing = ctx.config.checkout().pricing;
    let totals = pricing.totals(items, None, None);

    if ctx.output.is_json() {
        ctx.output.json(&CartView {
            items,
            count: snapshot.item_count(),
            totals,
            savings,
        });
        return Ok(());
    }

    ctx.output.header(&format!("Cart ({} items)", snapshot.item_count()));
    if items.is_empty() {
        ctx.output.info("Your cart is empty");
        return Ok(());
    }

    print_lines(items, ctx);
    print_totals(&totals, &pricing, ctx);
    if savings.is_positive() {
        ctx.output.info(&format!("You save {} on MRP", savings.display()));
    }
    Ok(())
}

async fn add(product_id: &str, variant: Option<&str>, qty: i64, ctx: &Context) -> Result<()> {
    let product = ctx
        .client()?
        .get_product(&ProductId::new(product_id))
        .await?;
    let cart = ctx.cart_store()?;

    let key = cart.add(product.to_cart_item(variant, qty)?)?;
    let line = cart.items()?.into_iter().find(|i| i.key == key);

    if let Some(line) = line {
        ctx.output.success(&format!(
            "{} x {} in cart",
            line.quantity,
            line.display_name()
        ));
        if let Some(cap) = line.stock_cap {
            if line.quantity == cap {
                ctx.output.warn(&format!("Only {} in stock", cap));
            }
        }
    }
    ctx.output.info(&format!("Cart now holds {} items", cart.count()?));
    Ok(())
}

fn update(key: &str, qty: i64, ctx: &Context) -> Result<()> {
    let cart = ctx.cart_store()?;
    cart.update_quantity(&LineItemKey::from(key), qty)?;
    if qty <= 0 {
        ctx.output.success(&format!("Removed {}", key));
    } else {
        ctx.output.success(&format!("Set {} to {}", key, qty));
    }
    Ok(())
}

fn remove(key: &str, ctx: &Context) -> Result<()> {
    let cart = ctx.cart_store()?;
    if cart.remove(&LineItemKey::from(key))? {
        ctx.output.success(&format!("Removed {}", key));
    } else {
        ctx.output.warn(&format!("{} is not in the cart", key));
    }
    Ok(())
}

fn clear(yes: bool, ctx: &Context) -> Result<()> {
    let cart = ctx.cart_store()?;
    if cart.is_empty()? {
        ctx.output.info("Your cart is already empty");
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Remove every item from the cart?")
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    cart.clear()?;
    ctx.output.success("Cart cleared");
    Ok(())
}

/// Cart lines, shared with checkout.
pub(super) fn print_lines(items: &[CartItem], ctx: &Context) {
    let widths = [14, 30, 5, 12, 12];
    ctx.output
        .table_header(&["KEY", "ITEM", "QTY", "PRICE", "TOTAL"], &widths);
    for item in items {
        ctx.output.table_row(
            &[
                item.key.as_str(),
                &truncate(&item.display_name(), 30),
                &item.quantity.to_string(),
                &item.unit_price.display(),
                &item.line_total().display(),
            ],
            &widths,
        );
    }
}

/// Totals block, shared with checkout.
pub(super) fn print_totals(totals: &CartTotals, pricing: &PricingPolicy, ctx: &Context) {
    ctx.output.info("");
    ctx.output.kv("Subtotal", &totals.subtotal.display());
    ctx.output.kv("Shipping", &shipping_label(totals.shipping));
    if totals.has_discount() {
        let label = match &totals.coupon {
            Some(code) => format!("Discount ({})", code),
            None => "Discount".to_string(),
        };
        ctx.output.kv(&label, &format!("-{}", totals.discount.display()));
    }
    ctx.output.kv("Total", &totals.total.display());

    if !totals.ships_free() {
        if let Some(remaining) = pricing.remaining_for_free_shipping(totals.subtotal) {
            ctx.output.info(&format!(
                "Add {} more for free shipping",
                remaining.display()
            ));
        }
    }
}
