//! Domain primitives, aggregates, and services.
//!
//! Purpose: hold everything the client knows about jobs, applications,
//! accounts, and the local session, independent of how data reaches the
//! backend or the disk. Adapters live in `outbound` and plug in through the
//! traits in [`ports`].
//!
//! Public surface:
//! - [`TtlCache`] and [`CacheNamespace`]: expiring, namespaced local cache.
//! - [`ApiClient`]: REST client with caching, retries, and single-flight
//!   token refresh.
//! - [`JobSearch`]: filter state over a job list.
//! - Services: [`CompanyJobsService`], [`ApplicationsService`],
//!   [`SearchHistory`], [`RecommendationsService`], [`SavedJobsService`],
//!   [`CompanyAccountsService`], [`AuthService`], [`NotificationService`].
//! - [`Analytics`]: categorised product events handed to an analytics sink.
//! - [`Error`] and [`ErrorCode`]: the error every service returns.

pub mod analytics;
pub mod api_client;
pub mod application;
pub mod applications_service;
pub mod auth_service;
pub mod cache;
pub mod company;
pub mod company_accounts;
pub mod company_jobs;
pub mod deep_link;
pub mod error;
pub mod favorite;
pub mod ids;
pub mod job;
pub mod job_search;
pub mod notifications;
pub mod ports;
pub mod recommendations;
pub mod saved_jobs;
pub mod search_history;
pub mod session;
pub mod user;

pub use self::analytics::{
    Analytics, AnalyticsEvent, EventCategory, EventProperties, ScreenView,
};
pub use self::api_client::{
    ApiClient, ApiClientConfig, ApiClientPorts, ApiClientRuntime, ApiError, ApiErrorKind,
    REFRESH_PATH, RequestOptions, RetrySleeper, TokioSleeper,
};
pub use self::application::{
    ApplicationStats, ApplicationStatus, ApplicationUpdate, JobApplication, NewApplication,
};
pub use self::applications_service::ApplicationsService;
pub use self::auth_service::AuthService;
pub use self::cache::{
    CacheError, CacheNamespace, CacheNamespaceValidationError, DEFAULT_CACHE_TTL, TtlCache,
};
pub use self::company::{
    CompanyLogin, CompanyProfileUpdate, CompanySignup, CompanyUser, CompanyValidationError,
    Password,
};
pub use self::company_accounts::CompanyAccountsService;
pub use self::company_jobs::CompanyJobsService;
pub use self::deep_link::{Route, Screen, parse_deep_link};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::favorite::Favorite;
pub use self::ids::{ApplicationId, FavoriteId, IdValidationError, JobId, UserId};
pub use self::job::{Job, JobDraft, JobDraftValidationError, NewJob, sort_newest_first};
pub use self::job_search::JobSearch;
pub use self::notifications::{
    LocalNotification, NotificationChannel, NotificationData, NotificationService, route_for_tap,
};
pub use self::recommendations::RecommendationsService;
pub use self::saved_jobs::SavedJobsService;
pub use self::search_history::SearchHistory;
pub use self::session::{AuthTokens, SessionKey, SessionStore};
pub use self::user::{UserProfile, UserType};

