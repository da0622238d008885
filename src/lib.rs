//! Senior News Daily personalization
//!
//! Local state for the static news site: custom feed sources the user wants
//! to add and articles the user has hidden, persisted on the user's side and
//! kept in sync with the rendered page.

pub mod config;
pub mod controller;
pub mod deleted;
pub mod document;
pub mod export;
pub mod feeds;
pub mod filter;
pub mod page;
pub mod render;
pub mod routes;
pub mod saved;
pub mod store;
pub mod validate;
