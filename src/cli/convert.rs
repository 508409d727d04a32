use super::ui;
use crate::core::rates::{ConversionResult, FetchError, RateProvider};
use crate::core::session::{ConversionSession, SessionError};
use anyhow::Result;

pub async fn run(
    rate_provider: &(dyn RateProvider + Send + Sync),
    amount: f64,
    from: &str,
    to: &str,
) -> Result<()> {
    let mut session = ConversionSession::new(from, to);
    if let Err(e) = session.set_amount(amount) {
        println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
        return Ok(());
    }

    let pb = ui::new_spinner(&format!("Fetching {from} rates..."));
    session.refresh(rate_provider).await;
    pb.finish_and_clear();

    if let Some(error) = session.error() {
        println!("{}", ui::style_text(&error.to_string(), ui::StyleType::Error));
        if matches!(error, SessionError::Fetch(FetchError::Network { .. })) {
            println!(
                "{}",
                ui::style_text("Check your connection and try again.", ui::StyleType::Subtle)
            );
        }
        return Ok(());
    }

    match session.request_conversion() {
        Ok(result) => display_result(&session, result),
        Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
    }

    Ok(())
}

fn display_result(session: &ConversionSession, result: ConversionResult) {
    let amount_label = format!("{} {}", session.amount(), session.source());
    let converted = format!("{:.4} {}", result.converted_amount, session.target());
    println!(
        "{} = {}",
        ui::style_text(&amount_label, ui::StyleType::TotalLabel),
        ui::style_text(&converted, ui::StyleType::TotalValue)
    );
    println!(
        "{}",
        ui::style_text(
            &format!(
                "1 {} = {:.6} {}",
                session.source(),
                result.effective_rate,
                session.target()
            ),
            ui::StyleType::Subtle
        )
    );
    if let Some(table) = session.table() {
        if !table.as_of().is_empty() {
            println!(
                "{}",
                ui::style_text(&format!("Rates as of {}", table.as_of()), ui::StyleType::Subtle)
            );
        }
    }
}
