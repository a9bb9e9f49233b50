//! Observable data-binding over the request executor: queries re-fetch when
//! their inputs change and publish state through watch channels.

pub mod items;
pub mod query;

pub use items::{ItemsQuery, Page};
pub use query::{ApiQuery, QueryState};
