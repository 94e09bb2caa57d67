/// Presentation-ready projections of the dashboard data.
///
/// Everything here is pure and total: empty or partial input yields
/// zero-filled output, never an error.
use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use super::common::parse_timestamp;
use super::models::EmailStats;

/// Number of hourly buckets shown on the activity chart
pub const HOURLY_WINDOW: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
    Orange,
    Gray,
}

impl Color {
    pub fn hex(&self) -> &'static str {
        match self {
            Color::Green => "#4caf50",
            Color::Red => "#f44336",
            Color::Orange => "#ff9800",
            Color::Gray => "#757575",
        }
    }
}

/// Categorical domains that have a color mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDomain {
    Sentiment,
    Priority,
}

/// Fixed color for `key` within `domain`; unknown keys are gray
pub fn color_for(key: &str, domain: ColorDomain) -> Color {
    match (domain, key) {
        (ColorDomain::Sentiment, "positive") => Color::Green,
        (ColorDomain::Sentiment, "negative") => Color::Red,
        (ColorDomain::Sentiment, "neutral") => Color::Orange,
        (ColorDomain::Priority, "urgent") => Color::Red,
        (ColorDomain::Priority, "not_urgent") => Color::Green,
        _ => Color::Gray,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyPoint {
    pub hour_label: String,
    pub count: u64,
}

/// Sentiment slices in the order positive, negative, neutral
pub fn sentiment_projection(stats: &EmailStats) -> Vec<CategoryCount> {
    let breakdown = &stats.sentiment_breakdown;
    [
        ("positive", "Positive", breakdown.positive),
        ("negative", "Negative", breakdown.negative),
        ("neutral", "Neutral", breakdown.neutral),
    ]
    .into_iter()
    .map(|(key, label, count)| CategoryCount {
        label: label.to_string(),
        count,
        color: color_for(key, ColorDomain::Sentiment),
    })
    .collect()
}

/// Priority slices in the order urgent, not urgent
pub fn priority_projection(stats: &EmailStats) -> Vec<CategoryCount> {
    let breakdown = &stats.priority_breakdown;
    [
        ("urgent", "Urgent", breakdown.urgent),
        ("not_urgent", "Not Urgent", breakdown.not_urgent),
    ]
    .into_iter()
    .map(|(key, label, count)| CategoryCount {
        label: label.to_string(),
        count,
        color: color_for(key, ColorDomain::Priority),
    })
    .collect()
}

/// Last [`HOURLY_WINDOW`] buckets, oldest first.
///
/// A bucket whose hour cannot be parsed keeps its slot with label "N/A"
/// and a zero count.
pub fn hourly_projection(stats: &EmailStats) -> Vec<HourlyPoint> {
    let start = stats.hourly_stats.len().saturating_sub(HOURLY_WINDOW);

    stats.hourly_stats[start..]
        .iter()
        .map(|bucket| match parse_timestamp(&bucket.hour) {
            Some(hour) => HourlyPoint {
                hour_label: format!("{}:00", hour.hour()),
                count: bucket.count,
            },
            None => HourlyPoint {
                hour_label: "N/A".to_string(),
                count: 0,
            },
        })
        .collect()
}

/// "N minutes ago" / "N hours ago" / "N days ago" relative to `now`
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - timestamp).max(chrono::Duration::zero());

    if elapsed.num_minutes() < 60 {
        format!("{} minutes ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{} hours ago", elapsed.num_hours())
    } else {
        format!("{} days ago", elapsed.num_days())
    }
}
