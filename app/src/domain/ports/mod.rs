//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod analytics_sink;
mod api_transport;
mod application_repository;
mod company_repository;
mod connectivity;
mod favorites_repository;
mod identity_provider;
mod job_repository;
mod key_value_store;
mod media_uploader;
mod push_messaging;

#[cfg(test)]
pub use analytics_sink::MockAnalyticsSink;
pub use analytics_sink::AnalyticsSink;
#[cfg(test)]
pub use api_transport::MockApiTransport;
pub use api_transport::{
    ApiTransport, ApiTransportError, HttpMethod, TransportRequest, TransportResponse,
};
#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{ApplicationRepository, ApplicationRepositoryError};
#[cfg(test)]
pub use company_repository::MockCompanyRepository;
pub use company_repository::{CompanyRepository, CompanyRepositoryError};
#[cfg(test)]
pub use connectivity::MockConnectivity;
pub use connectivity::{AlwaysConnected, Connectivity};
#[cfg(test)]
pub use favorites_repository::MockFavoritesRepository;
pub use favorites_repository::{FavoritesRepository, FavoritesRepositoryError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{AuthenticatedUser, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use job_repository::MockJobRepository;
pub use job_repository::{JobRepository, JobRepositoryError};
#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{KeyValueStore, KeyValueStoreError};
#[cfg(test)]
pub use media_uploader::MockMediaUploader;
pub use media_uploader::{DEFAULT_IMAGE_FOLDER, ImageUpload, MediaUploadError, MediaUploader};
#[cfg(test)]
pub use push_messaging::MockPushMessaging;
pub use push_messaging::{FixturePushMessaging, PushMessaging, PushMessagingError};
