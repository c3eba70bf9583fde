//! Library side of NewsFlow: every pipeline component, usable on its own.
//!
//! - [`store`]: SQLite persistence with url uniqueness
//! - [`normalize`]: text cleaning and record validation
//! - [`scrapers`]: listing-page extraction
//! - [`fetch`]: HTTP retrieval
//! - [`pipeline`]: the orchestrated run

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod scrapers;
pub mod store;
pub mod utils;
