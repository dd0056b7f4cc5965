pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{FileSessionStore, GeminiClient, LocalStorage, MemoryStore};
pub use config::{AppConfig, GeminiConfig};
pub use core::{
    cache::ResultCache, export::ReportExporter, fetch::ListingFetcher, session::SearchSession,
    view::DiscountLevel,
};
pub use domain::model::{Listing, PriceHistory};
pub use utils::error::{GemsError, Result};
