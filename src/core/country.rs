//! Country lookup abstractions

use anyhow::Result;
use async_trait::async_trait;

/// A currency a country uses, as reported by the countries API.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCurrency {
    pub code: String,
    pub name: String,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub official_name: String,
    pub code: String,
    pub capital: Vec<String>,
    pub region: String,
    pub subregion: Option<String>,
    pub population: u64,
    pub currencies: Vec<CountryCurrency>,
    pub languages: Vec<String>,
    pub flag: Option<String>,
}

#[async_trait]
pub trait CountryProvider: Send + Sync {
    /// All countries the API knows about.
    async fn all_countries(&self) -> Result<Vec<Country>>;

    /// Countries in the given region, e.g. "europe". Empty when the region
    /// matches nothing.
    async fn countries_by_region(&self, region: &str) -> Result<Vec<Country>>;

    /// Countries whose name contains the given fragment. Empty when nothing
    /// matches.
    async fn countries_by_name(&self, name: &str) -> Result<Vec<Country>>;
}
