//! Tests for the company jobs service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{KeyValueStore, MockJobRepository};
use crate::domain::{ErrorCode, UserId, UserType};
use crate::outbound::storage::MemoryKeyValueStore;
use crate::domain::Analytics;
use crate::test_support::{MutableClock, RecordingAnalyticsSink};

struct Context {
    store: Arc<MemoryKeyValueStore>,
    clock: Arc<MutableClock>,
    session: SessionStore,
    cache: TtlCache,
}

impl Context {
    fn service(&self, repo: MockJobRepository) -> CompanyJobsService<MockJobRepository> {
        CompanyJobsService::new(
            Arc::new(repo),
            self.session.clone(),
            self.cache.clone(),
            self.clock.clone(),
        )
    }
}

#[fixture]
fn signed_in() -> Context {
    let store = Arc::new(MemoryKeyValueStore::default());
    let clock = Arc::new(MutableClock::fixed());
    let session = SessionStore::new(store.clone());
    session
        .sign_in(&company_id(), "Acme HR", "hr@acme.io", UserType::Company)
        .expect("sign in");
    Context {
        cache: TtlCache::new(store.clone(), clock.clone()),
        store,
        clock,
        session,
    }
}

fn company_id() -> UserId {
    UserId::new("company-1").expect("id")
}

fn job(id: &str, owner: &str) -> Job {
    Job {
        id: JobId::new(id).expect("id"),
        title: format!("Job {id}"),
        description: "Build things".to_owned(),
        category: "Engineering".to_owned(),
        skill: "Rust".to_owned(),
        experience: "2 years".to_owned(),
        salary: "50k".to_owned(),
        company: "Acme".to_owned(),
        posted_by: UserId::new(owner).expect("id"),
        poster_name: "Acme HR".to_owned(),
        created_at: None,
    }
}

fn draft() -> JobDraft {
    JobDraft {
        title: "Platform Engineer".to_owned(),
        description: "Own the platform".to_owned(),
        category: "Engineering".to_owned(),
        skill: "Rust".to_owned(),
        experience: "4 years".to_owned(),
        salary: "80k-90k".to_owned(),
        company: "Acme".to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn fetch_requires_a_signed_in_company() {
    let store = Arc::new(MemoryKeyValueStore::default());
    let clock = Arc::new(MutableClock::fixed());
    let mut service = CompanyJobsService::new(
        Arc::new(MockJobRepository::new()),
        SessionStore::new(store.clone()),
        TtlCache::new(store, clock.clone()),
        clock,
    );

    let err = service.fetch_jobs(false).await.expect_err("signed out");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn fetch_queries_the_backend_and_caches_the_result(signed_in: Context) {
    let mut repo = MockJobRepository::new();
    repo.expect_list_posted_by()
        .withf(|owner, limit| owner.as_str() == "company-1" && *limit == COMPANY_JOBS_LIMIT)
        .times(1)
        .return_once(|_, _| Ok(vec![job("j2", "company-1"), job("j1", "company-1")]));
    let mut service = signed_in.service(repo);

    let jobs = service.fetch_jobs(false).await.expect("fetch succeeds");
    assert_eq!(jobs.len(), 2);
    assert_eq!(service.last_updated(), Some(signed_in.clock.utc()));

    // A second service instance is served entirely from the cache.
    let mut cached = signed_in.service(MockJobRepository::new());
    let jobs = cached.fetch_jobs(false).await.expect("cache hit");
    assert_eq!(jobs.first().map(|j| j.id.as_str()), Some("j2"));
}

#[rstest]
#[tokio::test]
async fn empty_results_are_not_cached(signed_in: Context) {
    let mut repo = MockJobRepository::new();
    repo.expect_list_posted_by()
        .times(2)
        .returning(|_, _| Ok(Vec::new()));
    let mut service = signed_in.service(repo);

    service.fetch_jobs(false).await.expect("first fetch");
    service.fetch_jobs(false).await.expect("second fetch goes to backend");
    assert_eq!(signed_in.store.get("jobs:company_jobs").expect("read"), None);
}

#[rstest]
#[tokio::test]
async fn refresh_bypasses_a_fresh_cache(signed_in: Context) {
    signed_in
        .cache
        .set(&CacheNamespace::JOBS, COMPANY_JOBS_KEY, &vec![job("old", "company-1")], COMPANY_JOBS_TTL)
        .expect("seed cache");
    let mut repo = MockJobRepository::new();
    repo.expect_list_posted_by()
        .times(1)
        .return_once(|_, _| Ok(vec![job("new", "company-1")]));
    let mut service = signed_in.service(repo);

    let jobs = service.refresh_jobs().await.expect("refresh");
    assert_eq!(jobs.first().map(|j| j.id.as_str()), Some("new"));
}

#[rstest]
#[tokio::test]
async fn stale_cache_falls_through_to_the_backend(signed_in: Context) {
    signed_in
        .cache
        .set(&CacheNamespace::JOBS, COMPANY_JOBS_KEY, &vec![job("old", "company-1")], COMPANY_JOBS_TTL)
        .expect("seed cache");
    signed_in.clock.advance(COMPANY_JOBS_TTL + Duration::from_secs(1));
    let mut repo = MockJobRepository::new();
    repo.expect_list_posted_by()
        .times(1)
        .return_once(|_, _| Ok(vec![job("new", "company-1")]));
    let mut service = signed_in.service(repo);

    let jobs = service.fetch_jobs(false).await.expect("fetch");
    assert_eq!(jobs.first().map(|j| j.id.as_str()), Some("new"));
}

#[rstest]
#[tokio::test]
async fn backend_failures_keep_the_previous_list(signed_in: Context) {
    let mut repo = MockJobRepository::new();
    let mut seq = mockall::Sequence::new();
    repo.expect_list_posted_by()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(vec![job("j1", "company-1")]));
    repo.expect_list_posted_by()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Err(JobRepositoryError::connection("timeout")));
    let mut service = signed_in.service(repo);

    service.fetch_jobs(true).await.expect("first fetch");
    let err = service.fetch_jobs(true).await.expect_err("second fetch fails");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(service.jobs().len(), 1);
}

#[rstest]
#[tokio::test]
async fn delete_removes_locally_and_rewrites_the_cache(signed_in: Context) {
    let mut repo = MockJobRepository::new();
    repo.expect_list_posted_by()
        .return_once(|_, _| Ok(vec![job("j1", "company-1"), job("j2", "company-1")]));
    repo.expect_delete()
        .withf(|id| id.as_str() == "j1")
        .times(1)
        .return_once(|_| Ok(()));
    let mut service = signed_in.service(repo);
    service.fetch_jobs(true).await.expect("fetch");

    service
        .delete_job(&JobId::new("j1").expect("id"))
        .await
        .expect("delete");

    assert_eq!(service.jobs().len(), 1);
    let cached: Vec<Job> = signed_in
        .cache
        .get(&CacheNamespace::JOBS, COMPANY_JOBS_KEY)
        .expect("cache read")
        .expect("cache present");
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id.as_str(), "j2");
}

#[rstest]
#[tokio::test]
async fn failed_delete_leaves_the_list_alone(signed_in: Context) {
    let mut repo = MockJobRepository::new();
    repo.expect_list_posted_by()
        .return_once(|_, _| Ok(vec![job("j1", "company-1")]));
    repo.expect_delete()
        .return_once(|id| Err(JobRepositoryError::not_found(id.as_str())));
    let mut service = signed_in.service(repo);
    service.fetch_jobs(true).await.expect("fetch");

    let err = service
        .delete_job(&JobId::new("j1").expect("id"))
        .await
        .expect_err("delete fails");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(service.jobs().len(), 1);
}

#[rstest]
#[tokio::test]
async fn post_job_stamps_the_poster_and_prepends(signed_in: Context) {
    let mut repo = MockJobRepository::new();
    repo.expect_create()
        .withf(|new_job| new_job.posted_by.as_str() == "company-1" && new_job.poster_name == "Acme HR")
        .times(1)
        .returning(|new_job| {
            let mut created = job("j9", new_job.posted_by.as_str());
            created.apply_draft(&new_job.draft);
            Ok(created)
        });
    let mut service = signed_in.service(repo);
    service.add_job_to_list(job("j1", "company-1"));

    let created = service.post_job(draft()).await.expect("post succeeds");

    assert_eq!(created.title, "Platform Engineer");
    assert_eq!(service.jobs().first().map(|j| j.id.as_str()), Some("j9"));
}

#[rstest]
#[tokio::test]
async fn posted_jobs_are_reported_once_created(signed_in: Context) {
    let mut repo = MockJobRepository::new();
    repo.expect_create().times(1).returning(|new_job| {
        let mut created = job("j9", new_job.posted_by.as_str());
        created.apply_draft(&new_job.draft);
        Ok(created)
    });
    let sink = Arc::new(RecordingAnalyticsSink::default());
    let analytics = Analytics::new(sink.clone(), signed_in.clock.clone());
    let mut service = signed_in.service(repo).with_analytics(analytics);

    service.post_job(draft()).await.expect("post succeeds");
    let mut incomplete = draft();
    incomplete.salary = String::new();
    service.post_job(incomplete).await.expect_err("invalid");

    assert_eq!(sink.names(), ["app_start", "job_posting"]);
    let posting = sink.events().pop().expect("posting event");
    assert_eq!(posting.properties["job_id"], "j9");
    assert_eq!(posting.properties["job_title"], "Platform Engineer");
}

#[rstest]
#[tokio::test]
async fn post_job_rejects_incomplete_drafts(signed_in: Context) {
    let mut service = signed_in.service(MockJobRepository::new());
    let mut incomplete = draft();
    incomplete.salary = String::new();

    let err = service.post_job(incomplete).await.expect_err("invalid");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "salary package is required");
}

#[rstest]
#[tokio::test]
async fn edit_job_updates_owned_jobs(signed_in: Context) {
    let mut repo = MockJobRepository::new();
    repo.expect_update()
        .withf(|job| job.title == "Platform Engineer" && job.created_at.is_some())
        .times(1)
        .return_once(|_| Ok(()));
    let mut service = signed_in.service(repo);
    service.add_job_to_list(job("j1", "company-1"));

    let edited = service
        .edit_job(&JobId::new("j1").expect("id"), draft())
        .await
        .expect("edit succeeds");

    assert_eq!(edited.salary, "80k-90k");
    assert_eq!(service.jobs()[0].title, "Platform Engineer");
}

#[rstest]
#[tokio::test]
async fn edit_job_refuses_other_companies_jobs(signed_in: Context) {
    let mut service = signed_in.service(MockJobRepository::new());
    service.add_job_to_list(job("j1", "company-2"));

    let err = service
        .edit_job(&JobId::new("j1").expect("id"), draft())
        .await
        .expect_err("not owner");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn update_in_list_ignores_unknown_jobs(signed_in: Context) {
    let mut service = signed_in.service(MockJobRepository::new());
    service.add_job_to_list(job("j1", "company-1"));
    service.update_job_in_list(job("zzz", "company-1"));
    assert_eq!(service.jobs().len(), 1);
    assert_eq!(service.jobs()[0].id.as_str(), "j1");
}
