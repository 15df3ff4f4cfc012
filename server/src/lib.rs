//! Read-only entity search service over a Datasette query endpoint

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod utils;
