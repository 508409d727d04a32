//! Movie search abstractions

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub title: String,
    pub year: String,
    pub imdb_id: String,
    pub kind: String,
    pub poster_url: Option<String>,
}

/// One page of search results. The movie API pages in fixed chunks of
/// [`MovieSearchPage::PAGE_SIZE`] and reports the overall match count.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieSearchPage {
    pub movies: Vec<Movie>,
    pub page: u32,
    pub total_results: u32,
}

impl MovieSearchPage {
    pub const PAGE_SIZE: u32 = 10;

    pub fn total_pages(&self) -> u32 {
        self.total_results.div_ceil(Self::PAGE_SIZE)
    }
}

#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Searches movies by title. A title that matches nothing yields an empty
    /// page, not an error.
    async fn search(&self, title: &str, page: u32) -> Result<MovieSearchPage>;
}
