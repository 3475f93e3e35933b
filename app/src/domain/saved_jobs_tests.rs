//! Tests for the saved jobs service.

use chrono::{DateTime, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockFavoritesRepository, MockJobRepository};
use crate::domain::{ErrorCode, Favorite, FavoriteId, UserId, UserType};
use crate::outbound::storage::MemoryKeyValueStore;
use crate::test_support::MutableClock;

type Service = SavedJobsService<MockFavoritesRepository, MockJobRepository>;

struct Context {
    session: SessionStore,
    clock: Arc<MutableClock>,
}

impl Context {
    fn service(&self, favorites: MockFavoritesRepository, jobs: MockJobRepository) -> Service {
        SavedJobsService::new(
            Arc::new(favorites),
            Arc::new(jobs),
            self.session.clone(),
            self.clock.clone(),
        )
    }
}

#[fixture]
fn seeker() -> Context {
    let session = SessionStore::new(Arc::new(MemoryKeyValueStore::default()));
    session
        .sign_in(
            &UserId::new("seeker-1").expect("id"),
            "Sam",
            "sam@example.com",
            UserType::Jobseeker,
        )
        .expect("sign in");
    Context {
        session,
        clock: Arc::new(MutableClock::fixed()),
    }
}

fn job_id(id: &str) -> JobId {
    JobId::new(id).expect("job id")
}

fn job(id: &str, title: &str) -> Job {
    Job {
        id: job_id(id),
        title: title.to_owned(),
        description: String::new(),
        category: "Engineering".to_owned(),
        skill: "Rust".to_owned(),
        experience: String::new(),
        salary: String::new(),
        company: "Acme".to_owned(),
        posted_by: UserId::new("company-1").expect("id"),
        poster_name: String::new(),
        created_at: None,
    }
}

fn favorite(id: &str, job: &str, saved_at: Option<DateTime<Utc>>) -> Favorite {
    Favorite {
        id: FavoriteId::new(id).expect("favorite id"),
        user_id: UserId::new("seeker-1").expect("id"),
        job_id: job_id(job),
        saved_at,
    }
}

fn ids(jobs: &[Job]) -> Vec<&str> {
    jobs.iter().map(|job| job.id.as_str()).collect()
}

#[rstest]
#[tokio::test]
async fn deleted_jobs_are_left_out_of_the_saved_list(seeker: Context) {
    let mut favorites = MockFavoritesRepository::new();
    favorites
        .expect_list_for_user()
        .withf(|user| user.as_str() == "seeker-1")
        .times(1)
        .return_once(|_| {
            Ok(vec![
                favorite("f1", "j1", None),
                favorite("f2", "gone", None),
                favorite("f3", "j3", None),
            ])
        });
    let mut jobs = MockJobRepository::new();
    jobs.expect_find().times(3).returning(|id| match id.as_str() {
        "j1" => Ok(Some(job("j1", "Engineer"))),
        "j3" => Ok(Some(job("j3", "Designer"))),
        _ => Ok(None),
    });
    let mut service = seeker.service(favorites, jobs);

    let saved = service.fetch_saved_jobs().await.expect("saved jobs");
    assert_eq!(ids(saved), vec!["j1", "j3"]);
    assert!(service.is_saved(&job_id("j3")));
    assert!(!service.is_saved(&job_id("gone")));
}

#[rstest]
#[tokio::test]
async fn job_lookup_outages_fail_the_fetch(seeker: Context) {
    let mut favorites = MockFavoritesRepository::new();
    favorites
        .expect_list_for_user()
        .return_once(|_| Ok(vec![favorite("f1", "j1", None)]));
    let mut jobs = MockJobRepository::new();
    jobs.expect_find()
        .return_once(|_| Err(JobRepositoryError::connection("offline")));
    let mut service = seeker.service(favorites, jobs);

    let err = service.fetch_saved_jobs().await.expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert!(service.saved_jobs().is_empty());
}

#[rstest]
#[tokio::test]
async fn saving_records_the_time_and_prepends(seeker: Context) {
    let saved_at = seeker.clock.utc();
    let mut favorites = MockFavoritesRepository::new();
    favorites.expect_find().times(1).return_once(|_, _| Ok(None));
    favorites
        .expect_create()
        .withf(move |user, job, at| {
            user.as_str() == "seeker-1" && job.as_str() == "j9" && *at == saved_at
        })
        .times(1)
        .return_once(move |_, _, _| Ok(favorite("f9", "j9", Some(saved_at))));
    let mut service = seeker.service(favorites, MockJobRepository::new());

    service.save_job(job("j9", "Tester")).await.expect("save");
    assert_eq!(ids(service.saved_jobs()), vec!["j9"]);
}

#[rstest]
#[tokio::test]
async fn saving_twice_is_a_conflict(seeker: Context) {
    let mut favorites = MockFavoritesRepository::new();
    favorites
        .expect_find()
        .return_once(|_, _| Ok(Some(favorite("f1", "j1", None))));
    favorites.expect_create().never();
    let mut service = seeker.service(favorites, MockJobRepository::new());

    let err = service
        .save_job(job("j1", "Engineer"))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn unsaving_deletes_the_matching_record(seeker: Context) {
    let mut favorites = MockFavoritesRepository::new();
    favorites
        .expect_list_for_user()
        .return_once(|_| Ok(vec![favorite("f1", "j1", None), favorite("f2", "j2", None)]));
    favorites
        .expect_find()
        .withf(|user, job| user.as_str() == "seeker-1" && job.as_str() == "j2")
        .return_once(|_, _| Ok(Some(favorite("f2", "j2", None))));
    favorites
        .expect_delete()
        .withf(|id| id.as_str() == "f2")
        .times(1)
        .return_once(|_| Ok(()));
    let mut jobs = MockJobRepository::new();
    jobs.expect_find()
        .returning(|id| Ok(Some(job(id.as_str(), "Engineer"))));
    let mut service = seeker.service(favorites, jobs);
    service.fetch_saved_jobs().await.expect("saved jobs");

    service.remove_saved_job(&job_id("j2")).await.expect("unsave");
    assert_eq!(ids(service.saved_jobs()), vec!["j1"]);
}

#[rstest]
#[tokio::test]
async fn unsaving_an_unknown_job_is_not_found(seeker: Context) {
    let mut favorites = MockFavoritesRepository::new();
    favorites.expect_find().return_once(|_, _| Ok(None));
    favorites.expect_delete().never();
    let mut service = seeker.service(favorites, MockJobRepository::new());

    let err = service
        .remove_saved_job(&job_id("j404"))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "saved job not found");
}

#[rstest]
#[tokio::test]
async fn signed_out_users_have_no_saved_jobs() {
    let ctx = Context {
        session: SessionStore::new(Arc::new(MemoryKeyValueStore::default())),
        clock: Arc::new(MutableClock::fixed()),
    };
    let mut service = ctx.service(MockFavoritesRepository::new(), MockJobRepository::new());

    let err = service.fetch_saved_jobs().await.expect_err("signed out");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
