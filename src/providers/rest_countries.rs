use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, error};

use crate::core::country::{Country, CountryCurrency, CountryProvider};

/// Field filter sent with every request; the API rejects unfiltered queries
/// against the full dataset.
const COUNTRY_FIELDS: &str = "name,cca3,capital,region,subregion,population,currencies,languages,flag";

// RestCountriesProvider implementation for CountryProvider
pub struct RestCountriesProvider {
    base_url: String,
}

impl RestCountriesProvider {
    pub fn new(base_url: &str) -> Self {
        RestCountriesProvider {
            base_url: base_url.to_string(),
        }
    }

    async fn fetch_countries(&self, endpoint: &str, lookup: &str) -> Result<Vec<Country>> {
        let url = format!("{}{}?fields={}", self.base_url, endpoint, COUNTRY_FIELDS);
        debug!("Requesting countries from {}", url);

        let client = reqwest::Client::builder().user_agent("apidex/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for lookup: {}", e, lookup))?;

        // The API answers 404 when a name or region matches nothing.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }
        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for lookup: {}",
                response.status(),
                lookup
            ));
        }

        let text = response.text().await?;
        let items: Vec<CountryItem> = serde_json::from_str(&text).map_err(|e| {
            error!(response = %text, "Failed to parse countries response");
            anyhow!("Failed to parse countries response for {}: {}", lookup, e)
        })?;

        Ok(items.into_iter().map(Country::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct CountryName {
    common: String,
    official: String,
}

#[derive(Debug, Deserialize)]
struct CurrencyItem {
    name: String,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountryItem {
    name: CountryName,
    #[serde(default)]
    cca3: String,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    region: String,
    subregion: Option<String>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    currencies: BTreeMap<String, CurrencyItem>,
    #[serde(default)]
    languages: BTreeMap<String, String>,
    flag: Option<String>,
}

impl From<CountryItem> for Country {
    fn from(item: CountryItem) -> Country {
        let currencies = item
            .currencies
            .into_iter()
            .map(|(code, c)| CountryCurrency {
                code,
                name: c.name,
                symbol: c.symbol,
            })
            .collect();
        let mut languages: Vec<String> = item.languages.into_values().collect();
        languages.sort();

        Country {
            name: item.name.common,
            official_name: item.name.official,
            code: item.cca3,
            capital: item.capital,
            region: item.region,
            subregion: item.subregion.filter(|s| !s.is_empty()),
            population: item.population,
            currencies,
            languages,
            flag: item.flag.filter(|f| !f.is_empty()),
        }
    }
}

#[async_trait]
impl CountryProvider for RestCountriesProvider {
    async fn all_countries(&self) -> Result<Vec<Country>> {
        self.fetch_countries("/v3.1/all", "all countries").await
    }

    async fn countries_by_region(&self, region: &str) -> Result<Vec<Country>> {
        self.fetch_countries(&format!("/v3.1/region/{region}"), region)
            .await
    }

    async fn countries_by_name(&self, name: &str) -> Result<Vec<Country>> {
        self.fetch_countries(&format!("/v3.1/name/{name}"), name)
            .await
    }
}
