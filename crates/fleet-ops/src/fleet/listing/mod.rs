//! Search, filter and aggregate engine shared by every list view.

mod engine;
mod entities;
mod query;

pub use engine::{aggregate, filter, matches, ListAggregates, ListResult, Listable};
pub use query::{Category, DateRange, ListQuery, ANY};
