/// Safe default values used in place of a source that did not answer
use super::models::{
    EmailStats, PriorityBreakdown, ResponseStats, SentimentBreakdown, SourceId, SourcePayload,
};

pub struct FallbackPolicy;

impl FallbackPolicy {
    /// Structurally complete default for `source`: every counter at zero,
    /// every breakdown key present, every sequence empty.
    pub fn default_for(source: SourceId) -> SourcePayload {
        match source {
            SourceId::EmailStats => SourcePayload::EmailStats(Self::email_stats()),
            SourceId::RecentEmails => SourcePayload::RecentEmails(Vec::new()),
            SourceId::ResponseStats => SourcePayload::ResponseStats(Self::response_stats()),
        }
    }

    pub fn email_stats() -> EmailStats {
        EmailStats {
            total_emails_24h: 0,
            processed_emails: 0,
            pending_emails: 0,
            urgent_emails: 0,
            sentiment_breakdown: SentimentBreakdown {
                positive: 0,
                negative: 0,
                neutral: 0,
            },
            priority_breakdown: PriorityBreakdown {
                urgent: 0,
                not_urgent: 0,
            },
            hourly_stats: Vec::new(),
        }
    }

    pub fn response_stats() -> ResponseStats {
        ResponseStats {
            response_rate: 0.0,
            avg_response_time_hours: 0.0,
            responses_sent: 0,
            emails_with_responses: 0,
            total_emails: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_source() {
        for source in SourceId::ALL {
            assert_eq!(FallbackPolicy::default_for(source).source_id(), source);
        }
    }

    #[test]
    fn test_defaults_serialize_with_every_key() {
        let stats = serde_json::to_value(FallbackPolicy::email_stats()).unwrap();
        for key in ["positive", "negative", "neutral"] {
            assert_eq!(stats["sentiment_breakdown"][key], 0);
        }
        for key in ["urgent", "not_urgent"] {
            assert_eq!(stats["priority_breakdown"][key], 0);
        }
        assert_eq!(stats["hourly_stats"], serde_json::json!([]));

        let response = serde_json::to_value(FallbackPolicy::response_stats()).unwrap();
        assert_eq!(response["response_rate"], 0.0);
        assert_eq!(response["avg_response_time_hours"], 0.0);
        assert_eq!(response["responses_sent"], 0);
        assert_eq!(response["emails_with_responses"], 0);
    }

    #[test]
    fn test_defaults_pass_validation() {
        assert!(FallbackPolicy::response_stats().validate().is_ok());
        assert!(matches!(
            FallbackPolicy::default_for(SourceId::RecentEmails),
            SourcePayload::RecentEmails(ref emails) if emails.is_empty()
        ));
    }
}
