use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::client::DataSourceClient;
use super::fallback::FallbackPolicy;
use super::models::{
    EmailStats, RecentEmailEntry, ResponseStats, SourceError, SourceId, SourcePayload, SourceResult,
};
use super::outcome::OutcomeStatus;

/// Effective dashboard values: real data where the source answered,
/// fallback defaults everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub email_stats: EmailStats,
    pub recent_emails: Vec<RecentEmailEntry>,
    pub response_stats: ResponseStats,
}

impl DashboardData {
    fn from_results(results: &HashMap<SourceId, SourceResult>) -> Self {
        let mut data = DashboardData {
            email_stats: FallbackPolicy::email_stats(),
            recent_emails: Vec::new(),
            response_stats: FallbackPolicy::response_stats(),
        };

        for source in SourceId::ALL {
            let payload = results
                .get(&source)
                .and_then(SourceResult::payload)
                .cloned()
                .unwrap_or_else(|| FallbackPolicy::default_for(source));

            match payload {
                SourcePayload::EmailStats(stats) => data.email_stats = stats,
                SourcePayload::RecentEmails(emails) => data.recent_emails = emails,
                SourcePayload::ResponseStats(stats) => data.response_stats = stats,
            }
        }

        data
    }
}

/// Snapshot across every known source. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    results: HashMap<SourceId, SourceResult>,
    overall_status: OutcomeStatus,
    data: DashboardData,
}

impl AggregateResult {
    /// Assemble a snapshot from settled results, one per source.
    ///
    /// A source missing from `settled` is recorded as a network failure so
    /// the map always holds exactly one entry per [`SourceId`].
    pub fn from_settled(settled: Vec<SourceResult>) -> Self {
        let mut results: HashMap<SourceId, SourceResult> = settled
            .into_iter()
            .map(|r| (r.source(), r))
            .collect();

        for source in SourceId::ALL {
            results.entry(source).or_insert_with(|| {
                SourceResult::failure(
                    source,
                    SourceError::Network { message: "no response collected".to_string() },
                )
            });
        }

        let overall_status = OutcomeStatus::classify(results.values());
        let data = DashboardData::from_results(&results);

        AggregateResult {
            results,
            overall_status,
            data,
        }
    }

    pub fn overall_status(&self) -> OutcomeStatus {
        self.overall_status
    }

    pub fn results(&self) -> &HashMap<SourceId, SourceResult> {
        &self.results
    }

    pub fn result(&self, source: SourceId) -> &SourceResult {
        // from_settled guarantees one entry per source
        &self.results[&source]
    }

    /// Post-fallback values, safe to hand to the views
    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn failed_sources(&self) -> Vec<SourceId> {
        SourceId::ALL
            .into_iter()
            .filter(|s| !self.result(*s).is_success())
            .collect()
    }
}

/// Fans out one fetch per source and fans back in once all have settled
pub struct Aggregator<C: DataSourceClient> {
    client: C,
    fetch_timeout: Duration,
}

impl<C: DataSourceClient> Aggregator<C> {
    pub fn new(client: C, fetch_timeout: Duration) -> Self {
        Aggregator {
            client,
            fetch_timeout,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch every source concurrently and build a snapshot.
    ///
    /// Never fails: a source that errors or exceeds the fetch timeout is
    /// recorded as failed and replaced by its fallback value.
    pub async fn aggregate(&self) -> AggregateResult {
        debug!("Aggregating {} dashboard sources", SourceId::ALL.len());

        let fetches = SourceId::ALL.into_iter().map(|source| self.fetch_bounded(source));
        let settled = join_all(fetches).await;

        let result = AggregateResult::from_settled(settled);

        match result.overall_status() {
            OutcomeStatus::FullSuccess => {
                info!("✅ Dashboard aggregated: all {} sources available", SourceId::ALL.len());
            }
            OutcomeStatus::PartialFailure => {
                warn!("⚠️  Dashboard aggregated with missing sources: {:?}", result.failed_sources());
            }
            OutcomeStatus::TotalFailure => {
                warn!("❌ Dashboard aggregation failed: no source available");
            }
        }

        result
    }

    /// Like [`aggregate`](Self::aggregate), but gives up as soon as `cancel`
    /// fires. Returns `None` when cancelled; no partial snapshot is built.
    pub async fn aggregate_until(&self, cancel: &CancellationToken) -> Option<AggregateResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Dashboard aggregation cancelled");
                None
            }
            result = self.aggregate() => Some(result),
        }
    }

    async fn fetch_bounded(&self, source: SourceId) -> SourceResult {
        match tokio::time::timeout(self.fetch_timeout, self.client.fetch(source)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("⚠️  {} timed out after {:?}", source, self.fetch_timeout);
                SourceResult::failure(
                    source,
                    SourceError::Network {
                        message: format!("request timed out after {}s", self.fetch_timeout.as_secs_f64()),
                    },
                )
            }
        }
    }
}
