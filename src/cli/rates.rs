use super::ui;
use crate::core::rates::{FetchError, RateProvider, RateTable};
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(rate_provider: &(dyn RateProvider + Send + Sync), base: &str) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {base} rates..."));
    let outcome = rate_provider.fetch_rates(base).await;
    pb.finish_and_clear();

    match outcome {
        Ok(table) => display_table(&table),
        Err(e) => {
            println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            if matches!(e, FetchError::Network { .. }) {
                println!(
                    "{}",
                    ui::style_text("Check your connection and try again.", ui::StyleType::Subtle)
                );
            }
        }
    }

    Ok(())
}

fn display_table(table: &RateTable) {
    println!(
        "{}",
        ui::style_text(
            &format!("Exchange rates for 1 {}", table.base()),
            ui::StyleType::Title
        )
    );

    let mut rates_table = ui::new_styled_table();
    rates_table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
    for (code, rate) in table.rates() {
        rates_table.add_row(vec![Cell::new(code), ui::numeric_cell(format!("{rate:.6}"))]);
    }
    println!("{rates_table}");

    let mut footer = format!("{} currencies", table.len());
    if !table.as_of().is_empty() {
        footer.push_str(&format!(", as of {}", table.as_of()));
    }
    println!("{}", ui::style_text(&footer, ui::StyleType::Subtle));
}
