pub mod aggregate;
pub mod args;
pub mod cache;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod filter;
pub mod geo;
pub mod model;
pub mod report;
mod utils;

pub use cache::DatasetCache;
pub use config::Config;
pub use error::Error;
pub use error::LoadError;
pub use error::Result;
pub use filter::{FilteredView, Selection};
pub use model::{Amount, AmountPolicy, Sale, SalesTable};
pub use report::{Report, Section};
