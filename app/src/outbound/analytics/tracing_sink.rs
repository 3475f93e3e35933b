//! Analytics sink that writes events to the tracing pipeline.
//!
//! Events go to the `findmyjob::analytics` target so a subscriber can route
//! them separately from diagnostics. Error-category events are logged at
//! `WARN`, everything else at `INFO`.

use tracing::{info, warn};

use crate::domain::ports::AnalyticsSink;
use crate::domain::{AnalyticsEvent, EventCategory};

/// Sink emitting one structured tracing event per analytics event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn record(&self, event: &AnalyticsEvent) {
        let properties = serde_json::Value::Object(event.properties.clone());
        let user_id = event.user_id.as_ref().map(|id| id.as_str());
        match event.category {
            EventCategory::Error => warn!(
                target: "findmyjob::analytics",
                event = %event.name,
                category = %event.category,
                session_id = %event.session_id,
                user_id,
                timestamp = %event.timestamp,
                %properties,
                "analytics event"
            ),
            _ => info!(
                target: "findmyjob::analytics",
                event = %event.name,
                category = %event.category,
                session_id = %event.session_id,
                user_id,
                timestamp = %event.timestamp,
                %properties,
                "analytics event"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;
    use tracing_subscriber::fmt;

    use super::*;
    use crate::domain::UserId;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().expect("capture lock").clone();
            String::from_utf8(bytes)
                .expect("utf-8 log")
                .lines()
                .map(|line| serde_json::from_str(line).expect("json log line"))
                .collect()
        }
    }

    fn event(name: &str, category: EventCategory) -> AnalyticsEvent {
        AnalyticsEvent {
            name: name.to_owned(),
            category,
            session_id: "session_1".to_owned(),
            user_id: Some(UserId::new("company-1").expect("id")),
            timestamp: Utc
                .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
                .single()
                .expect("timestamp"),
            properties: json!({ "job_id": "j1" })
                .as_object()
                .cloned()
                .expect("object"),
        }
    }

    #[rstest]
    fn events_become_structured_log_lines() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingAnalyticsSink.record(&event("job_posting", EventCategory::Conversion));
            TracingAnalyticsSink.record(&event("error", EventCategory::Error));
        });

        let lines = captured.lines();
        assert_eq!(lines.len(), 2);
        let posting = &lines[0];
        assert_eq!(posting["level"], "INFO");
        assert_eq!(posting["target"], "findmyjob::analytics");
        assert_eq!(posting["fields"]["event"], "job_posting");
        assert_eq!(posting["fields"]["category"], "conversion");
        assert_eq!(posting["fields"]["user_id"], "company-1");
        assert!(posting["fields"]["properties"]
            .as_str()
            .expect("properties field")
            .contains("\"job_id\":\"j1\""));
        assert_eq!(lines[1]["level"], "WARN");
    }
}
