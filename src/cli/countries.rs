use super::ui;
use crate::core::country::{Country, CountryCurrency, CountryProvider};
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    country_provider: &(dyn CountryProvider + Send + Sync),
    region: Option<&str>,
    name: Option<&str>,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching countries...");
    let outcome = match (region, name) {
        (Some(region), _) => country_provider.countries_by_region(region).await,
        (None, Some(name)) => country_provider.countries_by_name(name).await,
        (None, None) => country_provider.all_countries().await,
    };
    pb.finish_and_clear();

    match outcome {
        Ok(countries) => display_countries(countries),
        Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
    }

    Ok(())
}

fn display_countries(mut countries: Vec<Country>) {
    if countries.is_empty() {
        println!("No countries found.");
        return;
    }
    if countries.len() == 1 {
        display_country(&countries[0]);
        return;
    }

    countries.sort_by(|a, b| b.population.cmp(&a.population));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Capital"),
        ui::header_cell("Region"),
        ui::header_cell("Population"),
        ui::header_cell("Currencies"),
    ]);
    for country in &countries {
        table.add_row(vec![
            Cell::new(&country.name),
            Cell::new(country.capital.join(", ")),
            Cell::new(&country.region),
            ui::numeric_cell(ui::format_count(country.population)),
            Cell::new(format_currencies(&country.currencies)),
        ]);
    }
    println!("{table}");
    println!(
        "{}",
        ui::style_text(&format!("{} countries", countries.len()), ui::StyleType::Subtle)
    );
}

fn display_country(country: &Country) {
    let title = match &country.flag {
        Some(flag) => format!("{} {}", country.name, flag),
        None => country.name.clone(),
    };
    println!("{}", ui::style_text(&title, ui::StyleType::Title));

    let mut table = ui::new_styled_table();
    table.add_row(vec![
        ui::header_cell("Official name"),
        Cell::new(&country.official_name),
    ]);
    table.add_row(vec![ui::header_cell("Code"), Cell::new(&country.code)]);
    table.add_row(vec![
        ui::header_cell("Capital"),
        Cell::new(country.capital.join(", ")),
    ]);
    table.add_row(vec![
        ui::header_cell("Region"),
        Cell::new(format_region(country)),
    ]);
    table.add_row(vec![
        ui::header_cell("Population"),
        Cell::new(ui::format_count(country.population)),
    ]);
    table.add_row(vec![
        ui::header_cell("Currencies"),
        Cell::new(format_currencies(&country.currencies)),
    ]);
    table.add_row(vec![
        ui::header_cell("Languages"),
        Cell::new(country.languages.join(", ")),
    ]);
    println!("{table}");
}

fn format_region(country: &Country) -> String {
    match &country.subregion {
        Some(subregion) => format!("{} ({})", country.region, subregion),
        None => country.region.clone(),
    }
}

fn format_currencies(currencies: &[CountryCurrency]) -> String {
    if currencies.is_empty() {
        return "N/A".to_string();
    }
    currencies
        .iter()
        .map(|c| match &c.symbol {
            Some(symbol) => format!("{} ({})", c.code, symbol),
            None => c.code.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
