//! Repositories and the identity provider over the REST API client.
//!
//! Every adapter shares one [`ApiClient`](crate::domain::ApiClient), so
//! they all benefit from its caching, retries, and token refresh. Writes
//! clear the client's response cache so later reads see fresh data.

mod applications;
mod companies;
mod favorites;
mod identity;
mod jobs;

pub use applications::RestApplicationRepository;
pub use companies::RestCompanyRepository;
pub use favorites::RestFavoritesRepository;
pub use identity::RestIdentityProvider;
pub use jobs::RestJobRepository;

use tracing::warn;

use crate::domain::{ApiClient, ApiError};

/// Returns `true` when the backend could not be reached at all.
fn is_unreachable(error: &ApiError) -> bool {
    error.is_network_error() || error.is_timeout()
}

/// Drop cached GET responses after a write.
fn invalidate_reads(client: &ApiClient) {
    if let Err(error) = client.clear_cache() {
        warn!(%error, "failed to clear api cache after write");
    }
}
