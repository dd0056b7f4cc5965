pub mod cache;
pub mod export;
pub mod fetch;
pub mod normalize;
pub mod prompt;
pub mod session;
pub mod view;

pub use crate::domain::model::{Listing, PriceHistory, SearchPrompt};
pub use crate::domain::ports::{Clock, SearchBackend, SessionStore, Storage, SystemClock};
pub use crate::utils::error::Result;
