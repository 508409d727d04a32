//! Core business logic abstractions

pub mod config;
pub mod country;
pub mod log;
pub mod movie;
pub mod rates;
pub mod session;

// Re-export main types for cleaner imports
pub use country::{Country, CountryProvider};
pub use movie::{Movie, MovieProvider, MovieSearchPage};
pub use rates::{ConversionResult, RateProvider, RateTable};
pub use session::{ConversionSession, SessionPhase};
