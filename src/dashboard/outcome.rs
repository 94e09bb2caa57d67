use serde::Serialize;

use super::models::SourceResult;

/// Overall quality of an aggregated snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    FullSuccess,
    PartialFailure,
    TotalFailure,
}

impl OutcomeStatus {
    /// Classify from the success/failure mix of `results`.
    ///
    /// An empty set counts as a total failure: nothing usable was collected.
    pub fn classify<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a SourceResult>,
    {
        let (total, succeeded) = results
            .into_iter()
            .fold((0usize, 0usize), |(total, ok), r| (total + 1, ok + r.is_success() as usize));

        if succeeded == 0 {
            OutcomeStatus::TotalFailure
        } else if succeeded == total {
            OutcomeStatus::FullSuccess
        } else {
            OutcomeStatus::PartialFailure
        }
    }

    /// Only a total failure blocks the numeric display
    pub fn is_blocking(&self) -> bool {
        matches!(self, OutcomeStatus::TotalFailure)
    }

    /// User-facing notice for this status, if any
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            OutcomeStatus::FullSuccess => None,
            OutcomeStatus::PartialFailure => Some("Some dashboard data may be incomplete"),
            OutcomeStatus::TotalFailure => Some(
                "All dashboard services are currently unavailable. Please check your connection and try again.",
            ),
        }
    }
}
