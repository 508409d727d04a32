pub mod omdb;
pub mod open_er_api;
pub mod rest_countries;
