use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::dashboard::views::{hourly_projection, priority_projection, relative_time, sentiment_projection};
use crate::dashboard::{AggregateResult, OutcomeStatus, SourceId};

/// Render a snapshot as the text report printed by the CLI
pub fn render(result: &AggregateResult, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    // fmt::Write on String is infallible
    let _ = write_report(&mut out, result, now);
    out
}

fn write_report(out: &mut String, result: &AggregateResult, now: DateTime<Utc>) -> std::fmt::Result {
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out, "📊 EMAIL DASHBOARD - {}", now.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "{}", "=".repeat(80))?;

    let status = match result.overall_status() {
        OutcomeStatus::FullSuccess => "✅ All sources available",
        OutcomeStatus::PartialFailure => "⚠️  Partial data",
        OutcomeStatus::TotalFailure => "❌ Dashboard unavailable",
    };
    writeln!(out, "{}", status)?;
    if let Some(notice) = result.overall_status().notice() {
        writeln!(out, "   {}", notice)?;
    }

    for source in SourceId::ALL {
        let source_result = result.result(source);
        if let Some(message) = source_result.error_message() {
            writeln!(out, "   • {}: {}", source, message)?;
        }
    }

    // A total failure shows no numbers, only the error
    if result.overall_status().is_blocking() {
        writeln!(out, "{}", "=".repeat(80))?;
        return Ok(());
    }

    let data = result.data();
    let stats = &data.email_stats;

    writeln!(out)?;
    writeln!(out, "📧 Last 24 hours")?;
    writeln!(out, "   Total: {} | Processed: {} | Pending: {} | Urgent: {}",
             stats.total_emails_24h, stats.processed_emails, stats.pending_emails, stats.urgent_emails)?;

    let response = &data.response_stats;
    writeln!(out, "   Response rate: {:.1}% | Avg response time: {:.2}h | Sent: {}",
             response.response_rate, response.avg_response_time_hours, response.responses_sent)?;

    writeln!(out)?;
    writeln!(out, "💬 Sentiment")?;
    for slice in sentiment_projection(stats) {
        writeln!(out, "   {:<12} {:>6}  {}", slice.label, slice.count, slice.color.hex())?;
    }

    writeln!(out, "🚨 Priority")?;
    for slice in priority_projection(stats) {
        writeln!(out, "   {:<12} {:>6}  {}", slice.label, slice.count, slice.color.hex())?;
    }

    let hourly = hourly_projection(stats);
    if !hourly.is_empty() {
        writeln!(out, "🕐 Hourly activity")?;
        for point in hourly {
            writeln!(out, "   {:>5} {}", point.hour_label, "#".repeat(point.count.min(60) as usize))?;
        }
    }

    writeln!(out)?;
    if data.recent_emails.is_empty() {
        writeln!(out, "📭 No recent emails")?;
    } else {
        writeln!(out, "📬 Recent emails")?;
        for email in &data.recent_emails {
            let flag = if email.processed { "✓" } else { " " };
            writeln!(out, "   [{}] {} - {} ({})",
                     flag, email.sender_email, email.subject, relative_time(email.received_at, now))?;
        }
    }

    writeln!(out, "{}", "=".repeat(80))?;
    Ok(())
}
