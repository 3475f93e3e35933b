//! Push notification channels, tap routing, and device registration.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::deep_link::{Route, Screen};
use crate::domain::ports::{PushMessaging, PushMessagingError};
use crate::domain::{Error, JobId, SessionKey, SessionStore};

/// String key-value data attached to a push message.
pub type NotificationData = BTreeMap<String, String>;

/// How intrusively a channel alerts the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    /// Shown in the tray without interrupting.
    Default,
    /// Heads-up alert.
    High,
}

/// A notification channel the device registers at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationChannel {
    /// Stable channel id.
    pub id: &'static str,
    /// User-visible name.
    pub name: &'static str,
    /// User-visible description.
    pub description: &'static str,
    /// Alert level.
    pub importance: Importance,
    /// Vibrate on delivery.
    pub vibrate: bool,
    /// Play a sound on delivery.
    pub sound: bool,
}

impl NotificationChannel {
    /// New job opportunities.
    pub const JOB_ALERTS: Self = Self {
        id: "job-alerts",
        name: "Job Alerts",
        description: "Notifications about new job opportunities",
        importance: Importance::High,
        vibrate: true,
        sound: false,
    };

    /// Chat and direct messages.
    pub const MESSAGES: Self = Self {
        id: "messages",
        name: "Messages",
        description: "Chat and direct messages",
        importance: Importance::High,
        vibrate: true,
        sound: true,
    };

    /// App updates and everything else.
    pub const UPDATES: Self = Self {
        id: "updates",
        name: "App Updates",
        description: "Information about app updates and features",
        importance: Importance::Default,
        vibrate: false,
        sound: false,
    };

    /// Every channel, in registration order.
    pub const ALL: [Self; 3] = [Self::JOB_ALERTS, Self::MESSAGES, Self::UPDATES];

    /// Channel for a message of `kind` (the payload's `type` field).
    #[must_use]
    pub fn for_kind(kind: Option<&str>) -> Self {
        match kind {
            Some("job_alert") => Self::JOB_ALERTS,
            Some("message") => Self::MESSAGES,
            _ => Self::UPDATES,
        }
    }
}

/// Local notification ready to hand to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNotification {
    /// Heading.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Channel chosen from the payload type.
    pub channel: NotificationChannel,
    /// Payload passed back on tap.
    pub data: NotificationData,
}

impl LocalNotification {
    /// Build a notification for a received push message.
    ///
    /// A missing title falls back to `"New Notification"`.
    pub fn from_push(title: Option<&str>, body: Option<&str>, data: NotificationData) -> Self {
        let channel = NotificationChannel::for_kind(data.get("type").map(String::as_str));
        Self {
            title: title.unwrap_or("New Notification").to_owned(),
            body: body.unwrap_or_default().to_owned(),
            channel,
            data,
        }
    }
}

/// Where tapping a notification with `data` should take the user.
///
/// Returns `None` when the payload names no destination.
#[must_use]
pub fn route_for_tap(data: &NotificationData) -> Option<Route> {
    let kind = data.get("type").map(String::as_str);
    let route = match kind {
        Some("job_alert") => data
            .get("jobId")
            .and_then(|id| JobId::new(id.as_str()).ok())
            .map(|job_id| Route::JobDetail { job_id }),
        Some("message") => data
            .get("chatId")
            .filter(|id| !id.is_empty())
            .map(|chat_id| Route::Chat {
                chat_id: chat_id.clone(),
            }),
        Some("application_update") => Some(Route::Screen(Screen::Applications)),
        _ => None,
    };
    debug!(kind = kind.unwrap_or("unknown"), routed = route.is_some(), "notification tapped");
    route
}

/// Registers the device with the push provider.
pub struct NotificationService<P> {
    messaging: Arc<P>,
    session: SessionStore,
}

impl<P: PushMessaging> NotificationService<P> {
    /// Create the service.
    pub fn new(messaging: Arc<P>, session: SessionStore) -> Self {
        Self { messaging, session }
    }

    /// Fetch this device's token and store it in the session.
    pub async fn register_device(&self) -> Result<String, Error> {
        let token = self
            .messaging
            .registration_token()
            .await
            .map_err(|err| match err {
                PushMessagingError::PermissionDenied => {
                    warn!("notification permission denied");
                    Error::forbidden("notification permission denied")
                }
                PushMessagingError::Provider { message } => {
                    Error::service_unavailable(format!("push provider failed: {message}"))
                }
            })?;
        self.session
            .set(SessionKey::PushToken, &token)
            .map_err(|err| Error::internal(format!("failed to store push token: {err}")))?;
        info!("registered device for push notifications");
        Ok(token)
    }
}
