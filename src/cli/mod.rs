//! Command implementations and terminal rendering helpers

pub mod convert;
pub mod countries;
pub mod movies;
pub mod rates;
pub mod setup;
pub mod ui;
