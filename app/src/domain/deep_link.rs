//! Deep link parsing and formatting.
//!
//! Links arrive either on the custom scheme (`findmyjob://job/42`) or as
//! universal links on the public site (`https://findmyjob.com/job/42`).
//! Query strings and fragments are ignored.

use std::fmt;

use crate::domain::{JobId, UserId};

/// Custom URL scheme prefix.
pub const APP_SCHEME_PREFIX: &str = "findmyjob://";
/// Universal link prefix.
pub const WEB_PREFIX: &str = "https://findmyjob.com";
/// Every prefix the app answers to.
pub const LINK_PREFIXES: [&str; 2] = [APP_SCHEME_PREFIX, WEB_PREFIX];

/// Screens reachable by a fixed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Home feed.
    Home,
    /// Notification inbox.
    Notifications,
    /// Saved search terms.
    SearchHistory,
    /// Job search.
    Jobs,
    /// Job search filters.
    JobFilters,
    /// Saved searches.
    SavedSearches,
    /// Tracked applications.
    Applications,
    /// Application counters.
    ApplicationStats,
    /// Scheduled interviews.
    UpcomingInterviews,
    /// Own profile.
    Profile,
    /// Profile editor.
    EditProfile,
    /// App settings.
    Settings,
    /// Help centre.
    Help,
    /// Notification preferences.
    NotificationSettings,
    /// Sign-in form.
    Login,
    /// Registration form.
    Register,
    /// Password reset form.
    ForgotPassword,
    /// First onboarding step.
    Welcome,
    /// Onboarding feature tour.
    Features,
    /// Onboarding preferences.
    Personalize,
    /// Last onboarding step.
    Final,
}

const SCREEN_PATHS: [(Screen, &str); 21] = [
    (Screen::Home, "home"),
    (Screen::Notifications, "notifications"),
    (Screen::SearchHistory, "search-history"),
    (Screen::Jobs, "jobs"),
    (Screen::JobFilters, "jobs/filters"),
    (Screen::SavedSearches, "jobs/saved-searches"),
    (Screen::Applications, "applications"),
    (Screen::ApplicationStats, "applications/stats"),
    (Screen::UpcomingInterviews, "applications/interviews"),
    (Screen::Profile, "profile"),
    (Screen::EditProfile, "profile/edit"),
    (Screen::Settings, "profile/settings"),
    (Screen::Help, "help"),
    (Screen::NotificationSettings, "settings/notifications"),
    (Screen::Login, "login"),
    (Screen::Register, "register"),
    (Screen::ForgotPassword, "forgot-password"),
    (Screen::Welcome, "welcome"),
    (Screen::Features, "features"),
    (Screen::Personalize, "personalize"),
    (Screen::Final, "final"),
];

impl Screen {
    /// Path of the screen, without a leading slash.
    #[must_use]
    pub fn path(self) -> &'static str {
        SCREEN_PATHS
            .iter()
            .find_map(|(screen, path)| (*screen == self).then_some(*path))
            .unwrap_or_default()
    }

    fn from_path(path: &str) -> Option<Self> {
        SCREEN_PATHS
            .iter()
            .find_map(|(screen, candidate)| (*candidate == path).then_some(*screen))
    }
}

/// Destination resolved from a deep link or notification tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A fixed screen.
    Screen(Screen),
    /// `job/:jobId`
    JobDetail {
        /// Job to show.
        job_id: JobId,
    },
    /// `company/:companyId`
    CompanyDetail {
        /// Company account to show.
        company_id: UserId,
    },
    /// `apply/:jobId`
    ApplicationForm {
        /// Job being applied for.
        job_id: JobId,
    },
    /// `chat/:chatId`
    Chat {
        /// Conversation to open.
        chat_id: String,
    },
    /// `verify/:email`
    Verification {
        /// Address awaiting verification.
        email: String,
    },
}

impl Route {
    /// Path of the route, without a leading slash.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Screen(screen) => screen.path().to_owned(),
            Self::JobDetail { job_id } => format!("job/{job_id}"),
            Self::CompanyDetail { company_id } => format!("company/{company_id}"),
            Self::ApplicationForm { job_id } => format!("apply/{job_id}"),
            Self::Chat { chat_id } => format!("chat/{chat_id}"),
            Self::Verification { email } => format!("verify/{email}"),
        }
    }

    /// Link on the custom scheme.
    #[must_use]
    pub fn to_app_link(&self) -> String {
        format!("{APP_SCHEME_PREFIX}{}", self.path())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Resolve `link` to a route. Returns `None` for foreign prefixes and
/// unknown paths.
///
/// # Examples
///
/// ```
/// use findmyjob::domain::{Route, parse_deep_link};
///
/// let route = parse_deep_link("https://findmyjob.com/job/42?ref=mail");
/// assert!(matches!(route, Some(Route::JobDetail { job_id }) if job_id.as_str() == "42"));
/// assert!(parse_deep_link("https://example.com/job/42").is_none());
/// ```
#[must_use]
pub fn parse_deep_link(link: &str) -> Option<Route> {
    let rest = strip_prefix(link.trim())?;
    let path = rest
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_matches('/');
    if let Some(screen) = Screen::from_path(path) {
        return Some(Route::Screen(screen));
    }

    let (head, param) = path.split_once('/')?;
    if param.is_empty() || param.contains('/') {
        return None;
    }
    match head {
        "job" => JobId::new(param).ok().map(|job_id| Route::JobDetail { job_id }),
        "company" => UserId::new(param)
            .ok()
            .map(|company_id| Route::CompanyDetail { company_id }),
        "apply" => JobId::new(param)
            .ok()
            .map(|job_id| Route::ApplicationForm { job_id }),
        "chat" => Some(Route::Chat {
            chat_id: param.to_owned(),
        }),
        "verify" => Some(Route::Verification {
            email: param.to_owned(),
        }),
        _ => None,
    }
}

fn strip_prefix(link: &str) -> Option<&str> {
    if let Some(rest) = link.strip_prefix(APP_SCHEME_PREFIX) {
        return Some(rest);
    }
    let rest = link.strip_prefix(WEB_PREFIX)?;
    // Reject look-alike hosts such as `findmyjob.com.evil.io`.
    (rest.is_empty() || rest.starts_with(['/', '?', '#'])).then_some(rest)
}
