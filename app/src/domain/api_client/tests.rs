//! Behaviour of the API client pipeline: caching, retry and token refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tokio::sync::{Barrier, Mutex};

use super::*;
use crate::domain::ports::{ApiTransportError, KeyValueStore, MockConnectivity};
use crate::outbound::http::ReqwestTransport;
use crate::outbound::storage::MemoryKeyValueStore;
use crate::test_support::{MutableClock, RecordingSleeper, ScriptedTransport};

struct Harness {
    store: Arc<MemoryKeyValueStore>,
    clock: Arc<MutableClock>,
    sleeper: Arc<RecordingSleeper>,
}

impl Harness {
    fn client(&self, transport: Arc<dyn ApiTransport>) -> ApiClient {
        ApiClient::with_runtime(
            ApiClientPorts::new(transport, self.store.clone()),
            ApiClientRuntime {
                clock: self.clock.clone(),
                sleeper: self.sleeper.clone(),
            },
            ApiClientConfig::default(),
        )
    }

    fn sign_in(&self, access: &str, refresh: &str) {
        self.store.set("authToken", access).expect("store access token");
        self.store.set("refreshToken", refresh).expect("store refresh token");
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        store: Arc::new(MemoryKeyValueStore::default()),
        clock: Arc::new(MutableClock::fixed()),
        sleeper: Arc::new(RecordingSleeper::default()),
    }
}

fn scripted(script: Vec<Result<TransportResponse, ApiTransportError>>) -> Arc<ScriptedTransport> {
    Arc::new(ScriptedTransport::new(script))
}

#[rstest]
#[tokio::test]
async fn repeated_get_within_ttl_reaches_the_network_once(harness: Harness) {
    let transport = scripted(vec![ScriptedTransport::reply(200, json!([{"id": "j1"}]))]);
    let client = harness.client(transport.clone());

    let first: Value = client
        .get("/jobs", Some(json!({"limit": 20})), RequestOptions::default())
        .await
        .expect("first get");
    let second: Value = client
        .get("/jobs", Some(json!({"limit": 20})), RequestOptions::default())
        .await
        .expect("second get");

    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);
}

#[rstest]
#[tokio::test]
async fn expired_responses_are_fetched_again(harness: Harness) {
    let transport = scripted(vec![
        ScriptedTransport::reply(200, json!({"v": 1})),
        ScriptedTransport::reply(200, json!({"v": 2})),
    ]);
    let client = harness.client(transport.clone());
    let options = RequestOptions::default().with_cache_ttl(Duration::from_secs(10));

    let _: Value = client.get("/me", None, options.clone()).await.expect("get");
    harness.clock.advance(Duration::from_secs(11));
    let fresh: Value = client.get("/me", None, options).await.expect("get");

    assert_eq!(fresh, json!({"v": 2}));
    assert_eq!(transport.calls(), 2);
}

#[rstest]
#[tokio::test]
async fn skip_cache_neither_reads_nor_writes_the_cache(harness: Harness) {
    let transport = scripted(vec![
        ScriptedTransport::reply(200, json!({"v": 1})),
        ScriptedTransport::reply(200, json!({"v": 2})),
    ]);
    let client = harness.client(transport.clone());

    let _: Value = client
        .get("/me", None, RequestOptions::default().without_cache())
        .await
        .expect("get");
    assert!(harness.store.keys().expect("keys").is_empty());

    let _: Value = client
        .get("/me", None, RequestOptions::default().without_cache())
        .await
        .expect("get");
    assert_eq!(transport.calls(), 2);
}

#[rstest]
#[tokio::test]
async fn null_bodies_are_not_cached(harness: Harness) {
    let transport = scripted(vec![
        ScriptedTransport::reply(200, Value::Null),
        ScriptedTransport::reply(200, Value::Null),
    ]);
    let client = harness.client(transport.clone());

    let _: Value = client.get("/ping", None, RequestOptions::default()).await.expect("get");
    let _: Value = client.get("/ping", None, RequestOptions::default()).await.expect("get");
    assert_eq!(transport.calls(), 2);
}

#[rstest]
#[tokio::test]
async fn server_errors_are_retried_with_linear_backoff(harness: Harness) {
    let transport = scripted(
        (0..4)
            .map(|_| ScriptedTransport::reply(500, json!({"message": "upstream down"})))
            .collect(),
    );
    let client = harness.client(transport.clone());

    let err = client
        .get::<Value>("/jobs", None, RequestOptions::default())
        .await
        .expect_err("all attempts fail");

    assert_eq!(transport.calls(), 4);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "upstream down");
    assert_eq!(
        harness.sleeper.delays(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(3)
        ]
    );
}

#[rstest]
#[tokio::test]
async fn client_errors_are_not_retried(harness: Harness) {
    let transport = scripted(vec![ScriptedTransport::reply(404, json!({"message": "no such job"}))]);
    let client = harness.client(transport.clone());

    let err = client
        .get::<Value>("/jobs/missing", None, RequestOptions::default())
        .await
        .expect_err("404 fails");

    assert_eq!(transport.calls(), 1);
    assert_eq!(err.status(), Some(404));
    assert!(harness.sleeper.delays().is_empty());
}

#[rstest]
#[tokio::test]
async fn transient_network_failure_recovers(harness: Harness) {
    let transport = scripted(vec![
        Err(ApiTransportError::timeout("deadline exceeded")),
        ScriptedTransport::reply(201, json!({"id": "a1"})),
    ]);
    let client = harness.client(transport.clone());

    let created: Value = client
        .post("/applications", Some(json!({"jobId": "j1"})), RequestOptions::default())
        .await
        .expect("second attempt succeeds");

    assert_eq!(created["id"], "a1");
    assert_eq!(transport.calls(), 2);
    let sent = transport.requests();
    assert_eq!(sent[0].body, Some(json!({"jobId": "j1"})));
    assert_eq!(sent[0].query, None);
}

#[rstest]
#[tokio::test]
async fn retry_override_bounds_attempts(harness: Harness) {
    let transport = scripted(vec![
        Err(ApiTransportError::network("reset")),
        Err(ApiTransportError::network("reset")),
    ]);
    let client = harness.client(transport.clone());

    let err = client
        .get::<Value>("/jobs", None, RequestOptions::default().with_retries(1))
        .await
        .expect_err("both attempts fail");
    assert!(err.is_network_error());
    assert_eq!(transport.calls(), 2);
}

#[rstest]
#[tokio::test]
async fn unbuildable_requests_fail_without_retrying(harness: Harness) {
    let transport = Arc::new(
        ReqwestTransport::new(
            url::Url::parse("http://127.0.0.1:9").expect("base url"),
            Duration::from_millis(50),
        )
        .expect("transport"),
    );
    let client = harness.client(transport);

    let err = client
        .get::<Value>("/jobs", Some(json!(["not", "an", "object"])), RequestOptions::default())
        .await
        .expect_err("query rejected");

    assert_eq!(err.kind(), ApiErrorKind::InvalidRequest);
    assert!(!err.is_network_error());
    assert!(harness.sleeper.delays().is_empty());
}

#[rstest]
#[tokio::test]
async fn unauthorised_response_refreshes_and_replays(harness: Harness) {
    harness.sign_in("stale", "refresh-1");
    let transport = scripted(vec![
        ScriptedTransport::reply(401, json!({"message": "token expired"})),
        ScriptedTransport::reply(200, json!({"accessToken": "fresh", "refreshToken": "refresh-2"})),
        ScriptedTransport::reply(200, json!({"name": "Ada"})),
    ]);
    let client = harness.client(transport.clone());

    let profile: Value = client
        .get("/me", None, RequestOptions::default())
        .await
        .expect("replay succeeds");

    assert_eq!(profile["name"], "Ada");
    let sent = transport.requests();
    assert_eq!(sent[0].bearer_token.as_deref(), Some("stale"));
    assert_eq!(sent[1].path, REFRESH_PATH);
    assert_eq!(sent[1].bearer_token, None);
    assert_eq!(sent[1].body, Some(json!({"refreshToken": "refresh-1"})));
    assert_eq!(sent[2].bearer_token.as_deref(), Some("fresh"));
    assert_eq!(harness.store.get("authToken").expect("read"), Some("fresh".to_owned()));
    assert_eq!(harness.store.get("refreshToken").expect("read"), Some("refresh-2".to_owned()));
}

#[rstest]
#[tokio::test]
async fn failed_refresh_clears_tokens_and_stops(harness: Harness) {
    harness.sign_in("stale", "revoked");
    let transport = scripted(vec![
        ScriptedTransport::reply(401, json!({})),
        ScriptedTransport::reply(401, json!({"message": "refresh token revoked"})),
    ]);
    let client = harness.client(transport.clone());

    let err = client
        .get::<Value>("/me", None, RequestOptions::default())
        .await
        .expect_err("refresh fails");

    assert_eq!(err.kind(), ApiErrorKind::SessionExpired);
    assert_eq!(err.message(), "refresh token revoked");
    assert_eq!(transport.calls(), 2);
    assert_eq!(harness.store.get("authToken").expect("read"), None);
    assert_eq!(harness.store.get("refreshToken").expect("read"), None);
}

#[rstest]
#[tokio::test]
async fn missing_refresh_token_ends_the_session(harness: Harness) {
    harness.store.set("authToken", "stale").expect("seed token");
    let transport = scripted(vec![ScriptedTransport::reply(401, json!({}))]);
    let client = harness.client(transport.clone());

    let err = client
        .get::<Value>("/me", None, RequestOptions::default())
        .await
        .expect_err("no refresh token");

    assert_eq!(err.kind(), ApiErrorKind::SessionExpired);
    assert_eq!(transport.calls(), 1);
    assert_eq!(harness.store.get("authToken").expect("read"), None);
}

#[rstest]
#[tokio::test]
async fn unauthenticated_requests_skip_token_and_refresh(harness: Harness) {
    harness.sign_in("token", "refresh");
    let transport = scripted(vec![ScriptedTransport::reply(401, json!({"message": "bad credentials"}))]);
    let client = harness.client(transport.clone());

    let err = client
        .post::<Value>(
            "/auth/login",
            Some(json!({"email": "a@b.io"})),
            RequestOptions::default().without_auth(),
        )
        .await
        .expect_err("login rejected");

    assert_eq!(err.status(), Some(401));
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.requests()[0].bearer_token, None);
    assert_eq!(harness.store.get("authToken").expect("read"), Some("token".to_owned()));
}

#[rstest]
#[tokio::test]
async fn offline_requests_fail_without_touching_the_network(harness: Harness) {
    let transport = scripted(vec![]);
    let mut connectivity = MockConnectivity::new();
    connectivity.expect_is_connected().return_const(false);
    let client = ApiClient::with_runtime(
        ApiClientPorts::new(transport.clone(), harness.store.clone())
            .with_connectivity(Arc::new(connectivity)),
        ApiClientRuntime {
            clock: harness.clock.clone(),
            sleeper: harness.sleeper.clone(),
        },
        ApiClientConfig::default(),
    );

    let err = client
        .get::<Value>("/jobs", None, RequestOptions::default())
        .await
        .expect_err("offline");

    assert!(err.is_network_error());
    assert_eq!(err.kind(), ApiErrorKind::Offline);
    assert_eq!(transport.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn clearing_the_cache_forces_a_refetch(harness: Harness) {
    let transport = scripted(vec![
        ScriptedTransport::reply(200, json!([1])),
        ScriptedTransport::reply(200, json!([2])),
        ScriptedTransport::reply(200, json!([3])),
    ]);
    let client = harness.client(transport.clone());
    let params = json!({"limit": 5});

    let _: Value = client.get("/jobs", Some(params.clone()), RequestOptions::default()).await.expect("get");
    client
        .clear_cache_for(HttpMethod::Get, "/jobs", Some(&params))
        .expect("clear one");
    let second: Value = client.get("/jobs", Some(params.clone()), RequestOptions::default()).await.expect("get");
    client.clear_cache().expect("clear all");
    let third: Value = client.get("/jobs", Some(params), RequestOptions::default()).await.expect("get");

    assert_eq!(second, json!([2]));
    assert_eq!(third, json!([3]));
    assert_eq!(transport.calls(), 3);
}

#[rstest]
#[tokio::test]
async fn unexpected_shapes_surface_as_decode_errors(harness: Harness) {
    let transport = scripted(vec![ScriptedTransport::reply(200, json!({"id": 7}))]);
    let client = harness.client(transport);

    let err = client
        .get::<Vec<String>>("/tags", None, RequestOptions::default())
        .await
        .expect_err("shape mismatch");
    assert_eq!(err.kind(), ApiErrorKind::Decode);
}

/// Server that rejects the stale token until both concurrent requests have
/// seen a 401, then rotates to a fresh token on refresh.
struct RotatingAuthServer {
    valid_token: Mutex<String>,
    refreshes: AtomicUsize,
    rejection_gate: Barrier,
}

#[async_trait]
impl ApiTransport for RotatingAuthServer {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, ApiTransportError> {
        if request.path == REFRESH_PATH {
            let count = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            let token = format!("fresh-{count}");
            *self.valid_token.lock().await = token.clone();
            return ScriptedTransport::reply(
                200,
                json!({"accessToken": token, "refreshToken": format!("refresh-{count}")}),
            );
        }
        let valid = self.valid_token.lock().await.clone();
        if request.bearer_token.as_deref() == Some(valid.as_str()) {
            return ScriptedTransport::reply(200, json!({"path": request.path}));
        }
        if self.refreshes.load(Ordering::SeqCst) == 0 {
            self.rejection_gate.wait().await;
        }
        ScriptedTransport::reply(401, json!({"message": "token expired"}))
    }
}

#[rstest]
#[tokio::test]
async fn concurrent_unauthorised_requests_share_one_refresh(harness: Harness) {
    harness.sign_in("stale", "refresh-0");
    let server = Arc::new(RotatingAuthServer {
        valid_token: Mutex::new("never-issued".to_owned()),
        refreshes: AtomicUsize::new(0),
        rejection_gate: Barrier::new(2),
    });
    let client = harness.client(server.clone());

    let (jobs, applications) = tokio::join!(
        client.get::<Value>("/jobs", None, RequestOptions::default().without_cache()),
        client.get::<Value>("/applications", None, RequestOptions::default().without_cache()),
    );

    assert_eq!(jobs.expect("jobs replay")["path"], "/jobs");
    assert_eq!(applications.expect("applications replay")["path"], "/applications");
    assert_eq!(server.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(harness.store.get("authToken").expect("read"), Some("fresh-1".to_owned()));
}
