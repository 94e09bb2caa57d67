/// Dashboard data aggregation: fan-out over the backend sources, fallback
/// defaults, outcome classification and derived views
pub mod aggregator;
pub mod client;
pub mod common;
pub mod fallback;
pub mod models;
pub mod outcome;
pub mod views;

// Re-export commonly used items
pub use aggregator::{AggregateResult, Aggregator, DashboardData};
pub use client::{DataSourceClient, FetchFuture, HttpDataSourceClient};
pub use fallback::FallbackPolicy;
pub use models::{SourceError, SourceId, SourcePayload, SourceResult};
pub use outcome::OutcomeStatus;
