use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use crate::core::movie::{Movie, MovieProvider, MovieSearchPage};

// OmdbProvider implementation for MovieProvider
pub struct OmdbProvider {
    base_url: String,
    api_key: String,
}

impl OmdbProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        OmdbProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmdbMovieItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Poster")]
    poster: String,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbMovieItem>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl From<OmdbMovieItem> for Movie {
    fn from(item: OmdbMovieItem) -> Movie {
        let poster_url = (item.poster != "N/A").then_some(item.poster);
        Movie {
            title: item.title,
            year: item.year,
            imdb_id: item.imdb_id,
            kind: item.kind,
            poster_url,
        }
    }
}

#[async_trait]
impl MovieProvider for OmdbProvider {
    async fn search(&self, title: &str, page: u32) -> Result<MovieSearchPage> {
        let url = format!("{}/", self.base_url);
        debug!("Requesting movie search from {} (page {})", url, page);

        let client = reqwest::Client::builder().user_agent("apidex/1.0").build()?;
        let page_str = page.to_string();
        let response = client
            .get(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("s", title),
                ("type", "movie"),
                ("page", page_str.as_str()),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for movie search: {}", e, title))?;

        let status = response.status();
        let text = response.text().await?;
        let data: OmdbSearchResponse = serde_json::from_str(&text).map_err(|e| {
            error!(status = %status, response = %text, "Failed to parse movie response");
            if status.is_success() {
                anyhow!("Failed to parse movie response for {}: {}", title, e)
            } else {
                anyhow!("HTTP error: {} for movie search: {}", status, title)
            }
        })?;

        // The API reports "no results" through the same error channel as real
        // failures; only that one means an empty page.
        if data.response != "True" {
            let message = data.error.unwrap_or_else(|| "unknown error".to_string());
            if message == "Movie not found!" {
                return Ok(MovieSearchPage {
                    movies: vec![],
                    page,
                    total_results: 0,
                });
            }
            return Err(anyhow!("Movie API error for {}: {}", title, message));
        }

        let total_results = data
            .total_results
            .as_deref()
            .unwrap_or("0")
            .parse::<u32>()
            .map_err(|e| anyhow!("Invalid totalResults in movie response: {}", e))?;

        Ok(MovieSearchPage {
            movies: data.search.into_iter().map(Movie::from).collect(),
            page,
            total_results,
        })
    }
}
