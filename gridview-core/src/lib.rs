//! Gridview Core - Data Types
//!
//! Pure data structures shared by the row cache and its collaborators.
//! This crate contains no caching behavior: values, rows, load requests,
//! configuration, errors, and the fetcher interface the loader consumes.

mod config;
mod error;
mod fetch;
mod request;
mod row;
mod value;

pub use config::{BindingMatch, CacheConfig, DEFAULT_MIN_FETCH_ROWS};
pub use error::{ConfigError, FetchError, GridError, GridResult};
pub use fetch::RowFetcher;
pub use request::{DatabaseConfig, LoadRequest, OrderBy, SortDirection};
pub use row::Row;
pub use value::{tuple_to_json, BindingTuple, CellValue};
