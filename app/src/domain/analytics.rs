//! Product analytics: categorised events, screen views, errors and metrics.
//!
//! [`Analytics`] stamps every event with the session id, the signed-in user
//! and the current time, then hands it to an [`AnalyticsSink`]. Nothing is
//! recorded while tracking is disabled. Clones share one state, so a
//! service holding a clone sees user and enablement changes made elsewhere.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::ports::AnalyticsSink;
use crate::domain::{Job, JobId, UserId};

/// Free-form event properties.
pub type EventProperties = Map<String, Value>;

/// Groups events for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Screen changes.
    Navigation,
    /// Explicit user actions such as searching or signing in.
    UserAction,
    /// Content the user looked at.
    Engagement,
    /// Failures surfaced to the user.
    Error,
    /// Timings and counters.
    Performance,
    /// Applications, postings and other goal completions.
    Conversion,
}

impl EventCategory {
    /// Snake-case name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::UserAction => "user_action",
            Self::Engagement => "engagement",
            Self::Error => "error",
            Self::Performance => "performance",
            Self::Conversion => "conversion",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    /// Event name such as `job_view`.
    pub name: String,
    /// Reporting category.
    pub category: EventCategory,
    /// Identifier of the analytics session.
    pub session_id: String,
    /// Signed-in user, if any.
    pub user_id: Option<UserId>,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Event-specific properties.
    pub properties: EventProperties,
}

/// A screen the user opened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenView {
    /// Screen name.
    pub screen_name: String,
    /// Component or class rendering the screen.
    pub screen_class: Option<String>,
    /// Screen the user came from; the last tracked screen when omitted.
    pub previous_screen: Option<String>,
    /// Extra properties.
    pub properties: EventProperties,
}

impl ScreenView {
    /// View of `screen_name` with nothing else set.
    #[must_use]
    pub fn new(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: screen_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct AnalyticsState {
    enabled: bool,
    user_id: Option<UserId>,
    user_properties: EventProperties,
    last_screen: Option<String>,
}

/// Records analytics events for one client session.
#[derive(Clone)]
pub struct Analytics {
    sink: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
    session_id: Arc<str>,
    state: Arc<Mutex<AnalyticsState>>,
}

impl fmt::Debug for Analytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analytics")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn properties(value: Value) -> EventProperties {
    match value {
        Value::Object(map) => map,
        _ => EventProperties::new(),
    }
}

impl Analytics {
    /// Start an enabled session and record `app_start`.
    #[must_use]
    pub fn new(sink: Arc<dyn AnalyticsSink>, clock: Arc<dyn Clock>) -> Self {
        Self::start(sink, clock, true)
    }

    /// Start a session, recording `app_start` only when `enabled`.
    #[must_use]
    pub fn start(sink: Arc<dyn AnalyticsSink>, clock: Arc<dyn Clock>, enabled: bool) -> Self {
        let started = clock.utc();
        let analytics = Self {
            sink,
            clock,
            session_id: format!("session_{}", started.timestamp_millis()).into(),
            state: Arc::new(Mutex::new(AnalyticsState {
                enabled,
                user_id: None,
                user_properties: EventProperties::new(),
                last_screen: None,
            })),
        };
        analytics.track_event(
            "app_start",
            EventCategory::Performance,
            properties(json!({ "timestamp": started.timestamp_millis() })),
        );
        analytics
    }

    // Every update is a single assignment, so poisoned state is still whole.
    fn state(&self) -> MutexGuard<'_, AnalyticsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identifier stamped on every event.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Turn tracking on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.state().enabled = enabled;
    }

    /// Whether events are currently recorded.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    /// Attach later events to `user_id`, recording `user_login` or
    /// `user_logout`.
    pub fn set_user_id(&self, user_id: Option<UserId>) {
        let name = if user_id.is_some() {
            "user_login"
        } else {
            "user_logout"
        };
        self.state().user_id = user_id;
        self.track_event(name, EventCategory::UserAction, EventProperties::new());
    }

    /// Attach later events to a user who was already signed in, without
    /// recording a login.
    pub fn resume_user(&self, user_id: UserId) {
        self.state().user_id = Some(user_id);
    }

    /// Merge `properties` into the user's segmentation properties.
    pub fn set_user_properties(&self, properties: EventProperties) {
        let mut state = self.state();
        if state.enabled {
            debug!(count = properties.len(), "setting analytics user properties");
        }
        state.user_properties.extend(properties);
    }

    /// Segmentation properties set so far.
    #[must_use]
    pub fn user_properties(&self) -> EventProperties {
        self.state().user_properties.clone()
    }

    /// Record a named event.
    pub fn track_event(&self, name: &str, category: EventCategory, properties: EventProperties) {
        let user_id = {
            let state = self.state();
            if !state.enabled {
                return;
            }
            state.user_id.clone()
        };
        self.sink.record(&AnalyticsEvent {
            name: name.to_owned(),
            category,
            session_id: self.session_id.as_ref().to_owned(),
            user_id,
            timestamp: self.clock.utc(),
            properties,
        });
    }

    /// Record a screen view and remember it as the previous screen.
    pub fn track_screen_view(&self, view: ScreenView) {
        let previous = {
            let mut state = self.state();
            if !state.enabled {
                return;
            }
            let prior = view.previous_screen.or_else(|| state.last_screen.take());
            state.last_screen = Some(view.screen_name.clone());
            prior
        };
        let mut props = properties(json!({
            "screen_name": view.screen_name,
            "screen_class": view.screen_class,
            "previous_screen": previous,
        }));
        props.extend(view.properties);
        self.track_event("screen_view", EventCategory::Navigation, props);
    }

    /// Record a failure shown to the user.
    pub fn track_error(&self, error_name: &str, error_message: &str, extra: EventProperties) {
        let mut props = properties(json!({
            "error_name": error_name,
            "error_message": error_message,
        }));
        props.extend(extra);
        self.track_event("error", EventCategory::Error, props);
    }

    /// Record a numeric measurement.
    pub fn track_metric(&self, metric_name: &str, value: f64, extra: EventProperties) {
        let mut props = properties(json!({
            "metric_name": metric_name,
            "metric_value": value,
        }));
        props.extend(extra);
        self.track_event("metric", EventCategory::Performance, props);
    }

    /// Record how long the client took to start.
    pub fn track_app_start_time(&self, elapsed: Duration) {
        self.track_metric(
            "app_start_time",
            duration_ms(elapsed),
            EventProperties::new(),
        );
    }

    /// Record how long the client took to become usable.
    pub fn track_time_to_interactive(&self, elapsed: Duration) {
        self.track_metric(
            "time_to_interactive",
            duration_ms(elapsed),
            EventProperties::new(),
        );
    }

    /// Record a goal completion.
    pub fn track_conversion(&self, name: &str, properties: EventProperties) {
        self.track_event(name, EventCategory::Conversion, properties);
    }

    /// Record a search and how many results it produced.
    pub fn track_search(&self, query: &str, results_count: usize) {
        self.track_event(
            "search",
            EventCategory::UserAction,
            properties(json!({ "search_query": query, "results_count": results_count })),
        );
    }

    /// Record that `job` was opened.
    pub fn track_job_view(&self, job: &Job) {
        self.track_event(
            "job_view",
            EventCategory::Engagement,
            job_properties(&job.id, &job.title, Some(&job.company)),
        );
    }

    /// Record an application for a job.
    pub fn track_job_application(&self, job_id: &JobId, job_title: &str, company: &str) {
        self.track_conversion(
            "job_application",
            job_properties(job_id, job_title, Some(company)),
        );
    }

    /// Record a company publishing a job.
    pub fn track_job_posting(&self, job_id: &JobId, job_title: &str) {
        self.track_conversion("job_posting", job_properties(job_id, job_title, None));
    }
}

fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1_000.0
}

fn job_properties(job_id: &JobId, job_title: &str, company: Option<&str>) -> EventProperties {
    let mut props = properties(json!({ "job_id": job_id.as_str(), "job_title": job_title }));
    if let Some(company) = company {
        props.insert("company_name".to_owned(), Value::from(company));
    }
    props
}
