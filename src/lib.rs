pub mod cli;
pub mod core;
pub mod providers;

pub use crate::core::config;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Commands the application can execute once configuration is loaded.
#[derive(Debug)]
pub enum AppCommand {
    Convert {
        amount: f64,
        from: String,
        to: Option<String>,
    },
    Rates {
        base: String,
    },
    Countries {
        region: Option<String>,
        name: Option<String>,
    },
    Movies {
        title: String,
        page: u32,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("apidex starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Convert { amount, from, to } => {
            let base_url = config
                .providers
                .rates
                .as_ref()
                .map_or("https://open.er-api.com", |p| &p.base_url);
            let provider = providers::open_er_api::ErApiProvider::new(base_url);

            let from = from.to_uppercase();
            let to = to.map_or_else(|| config.currency.to_uppercase(), |t| t.to_uppercase());
            cli::convert::run(&provider, amount, &from, &to).await
        }
        AppCommand::Rates { base } => {
            let base_url = config
                .providers
                .rates
                .as_ref()
                .map_or("https://open.er-api.com", |p| &p.base_url);
            let provider = providers::open_er_api::ErApiProvider::new(base_url);

            cli::rates::run(&provider, &base.to_uppercase()).await
        }
        AppCommand::Countries { region, name } => {
            let base_url = config
                .providers
                .countries
                .as_ref()
                .map_or("https://restcountries.com", |p| &p.base_url);
            let provider = providers::rest_countries::RestCountriesProvider::new(base_url);

            cli::countries::run(&provider, region.as_deref(), name.as_deref()).await
        }
        AppCommand::Movies { title, page } => {
            let movies_config = config.providers.movies.as_ref();
            let base_url = movies_config.map_or("https://www.omdbapi.com", |p| &p.base_url);
            let api_key = movies_config.and_then(|p| p.api_key.as_deref()).context(
                "Movie search requires an API key; set providers.movies.api_key in your config \
                 (get a free key at https://www.omdbapi.com/apikey.aspx)",
            )?;
            let provider = providers::omdb::OmdbProvider::new(base_url, api_key);

            cli::movies::run(&provider, &title, page).await
        }
    }
}
