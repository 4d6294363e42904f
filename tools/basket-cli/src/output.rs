//! Output formatting for the CLI.

use basket_commerce::checkout::OrderStatus;
use basket_commerce::money::Money;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a step in a process.
    pub fn step(&self, num: usize, total: usize, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style(format!("[{}/{}]", num, total)).dim(), msg);
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| pad(col, *width))
            .collect();
        println!("  {}", formatted.join("  ").trim_end());
    }

    /// Print a table header followed by a rule.
    pub fn table_header(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        self.table_row(cols, widths);
        let width: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        println!("  {}", style("-".repeat(width)).dim());
    }

    /// Create a spinner for a backend call.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Pad by visible width so styled cells line up.
fn pad(col: &str, width: usize) -> String {
    let visible = console::measure_text_width(col);
    if visible >= width {
        col.to_string()
    } else {
        format!("{}{}", col, " ".repeat(width - visible))
    }
}

/// Colored order status.
pub fn status_badge(status: &OrderStatus) -> String {
    let name = status.display_name();
    match status {
        OrderStatus::Delivered => style(name).green().to_string(),
        OrderStatus::Shipped | OrderStatus::Processing => style(name).cyan().to_string(),
        OrderStatus::Pending => style(name).yellow().to_string(),
        OrderStatus::Cancelled => style(name).red().to_string(),
        OrderStatus::Other(_) => style(name).dim().to_string(),
    }
}

/// `₹280.00`, or `FREE` for zero shipping.
pub fn shipping_label(amount: Money) -> String {
    if amount.is_zero() {
        style("FREE").green().to_string()
    } else {
        amount.display()
    }
}

/// Price with the struck-through reference price, when there is one.
pub fn price_label(price: Money, reference: Option<Money>) -> String {
    match reference {
        Some(mrp) if mrp.amount_minor > price.amount_minor => {
            format!("{} {}", price.display(), style(mrp.display()).dim().strikethrough())
        }
        _ => price.display(),
    }
}

/// Shorten `s` to at most `max` characters.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Ghee", 10), "Ghee");
        assert_eq!(truncate("Cold Pressed Groundnut Oil", 10), "Cold Pres…");
    }

    #[test]
    fn test_pad_ignores_styling() {
        console::set_colors_enabled(true);
        let styled = style("ok").green().to_string();
        assert_eq!(console::measure_text_width(&pad(&styled, 6)), 6);
    }

    #[test]
    fn test_price_label_plain_without_reference() {
        assert_eq!(price_label(Money::inr(399), None), "₹399.00");
        assert_eq!(price_label(Money::inr(399), Some(Money::inr(399))), "₹399.00");
    }
}
