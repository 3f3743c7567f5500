use super::common::*;
use crate::config::MarketplaceConfig;
use crate::marketplace::domain::{ApplicationId, ApplicationStatus};
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::store::{MarketplaceStore, StoreError};

#[test]
fn apply_creates_applied_application_and_bumps_counter() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");

    let application = fixture
        .market
        .applications
        .apply(&job.id, &fixture.seeker.id)
        .expect("apply");

    assert_eq!(application.status, ApplicationStatus::Applied);
    assert_eq!(application.created_at, start());
    let stored = fixture.store.fetch_job(&job.id).expect("fetch").expect("job");
    assert_eq!(stored.application_count, 1);
}

#[test]
fn second_apply_is_a_duplicate_and_leaves_one_application() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");
    let applications = &fixture.market.applications;

    applications.apply(&job.id, &fixture.seeker.id).expect("first apply");
    let err = applications
        .apply(&job.id, &fixture.seeker.id)
        .expect_err("second apply");

    assert!(matches!(err, MarketplaceError::DuplicateApplication));
    assert_eq!(
        fixture.store.applications_for_job(&job.id).expect("list").len(),
        1
    );
    let stored = fixture.store.fetch_job(&job.id).expect("fetch").expect("job");
    assert_eq!(stored.application_count, 1);
}

#[test]
fn racing_duplicate_is_caught_by_the_unique_index() {
    let fixture = fixture_with(FaultyStore::default(), MarketplaceConfig::default());
    let job = post_job(&fixture, "Platform Engineer");
    fixture
        .market
        .applications
        .apply(&job.id, &fixture.seeker.id)
        .expect("first apply");

    fixture.store.set_fault(Fault::RaceOnInsert);
    let err = fixture
        .market
        .applications
        .apply(&job.id, &fixture.seeker.id)
        .expect_err("raced apply");

    assert!(matches!(err, MarketplaceError::DuplicateApplication));
}

#[test]
fn failed_counter_update_is_not_reported_as_success() {
    let fixture = fixture_with(FaultyStore::default(), MarketplaceConfig::default());
    let job = post_job(&fixture, "Platform Engineer");
    fixture.store.set_fault(Fault::CounterFails);

    let err = fixture
        .market
        .applications
        .apply(&job.id, &fixture.seeker.id)
        .expect_err("counter failure");

    assert!(matches!(
        err,
        MarketplaceError::Persistence(StoreError::Unavailable(_))
    ));
    assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn unavailable_store_is_a_persistence_error() {
    let fixture = fixture_with(FaultyStore::default(), MarketplaceConfig::default());
    let job = post_job(&fixture, "Platform Engineer");
    fixture.store.set_fault(Fault::Unavailable);

    let err = fixture
        .market
        .applications
        .apply(&job.id, &fixture.seeker.id)
        .expect_err("store down");
    assert!(matches!(err, MarketplaceError::Persistence(_)));
}

#[test]
fn employers_cannot_apply_and_closed_jobs_refuse_applications() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");

    let err = fixture
        .market
        .applications
        .apply(&job.id, &fixture.employer.id)
        .expect_err("employer apply");
    assert!(matches!(err, MarketplaceError::Forbidden(_)));

    fixture
        .market
        .jobs
        .toggle_closed(&job.id, &fixture.employer.id)
        .expect("close");
    let err = fixture
        .market
        .applications
        .apply(&job.id, &fixture.seeker.id)
        .expect_err("closed job");
    assert!(matches!(err, MarketplaceError::Validation(_)));
}

#[test]
fn any_status_can_follow_any_other() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");
    let application = fixture
        .market
        .applications
        .apply(&job.id, &fixture.seeker.id)
        .expect("apply");

    for from in ApplicationStatus::ordered() {
        for to in ApplicationStatus::ordered() {
            fixture
                .market
                .applications
                .set_status(&application.id, from, &fixture.employer.id)
                .expect("set from");
            fixture.clock.advance(chrono::Duration::minutes(1));
            let updated = fixture
                .market
                .applications
                .set_status(&application.id, to, &fixture.employer.id)
                .expect("set to");
            assert_eq!(updated.status, to);

            let stored = fixture
                .store
                .fetch_application(&application.id)
                .expect("fetch")
                .expect("application");
            assert_eq!(stored.status, to);
            assert_eq!(stored.updated_at, fixture.now());
        }
    }
}

#[test]
fn other_employers_see_not_found() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");
    let application = fixture
        .market
        .applications
        .apply(&job.id, &fixture.seeker.id)
        .expect("apply");
    let rival = employer_account(fixture.store.as_ref(), "Rita Rival", "Globex");

    let err = fixture
        .market
        .applications
        .set_status(&application.id, ApplicationStatus::Rejected, &rival.id)
        .expect_err("foreign employer");
    assert!(matches!(err, MarketplaceError::NotFound("application")));

    let err = fixture
        .market
        .applications
        .set_status(
            &ApplicationId::from("app-missing"),
            ApplicationStatus::Rejected,
            &fixture.employer.id,
        )
        .expect_err("missing");
    assert!(matches!(err, MarketplaceError::NotFound("application")));

    let err = fixture
        .market
        .applications
        .list_by_job(&job.id, &rival.id, None)
        .expect_err("foreign listing");
    assert!(matches!(err, MarketplaceError::NotFound("job")));
}

#[test]
fn list_by_job_counts_every_status_before_filtering() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");
    let second = seeker_account(fixture.store.as_ref(), "Kim Second");
    let applications = &fixture.market.applications;

    let first = applications.apply(&job.id, &fixture.seeker.id).expect("apply");
    applications.apply(&job.id, &second.id).expect("apply");
    applications
        .set_status(&first.id, ApplicationStatus::Accepted, &fixture.employer.id)
        .expect("accept");

    let listing = applications
        .list_by_job(&job.id, &fixture.employer.id, Some(ApplicationStatus::Accepted))
        .expect("listing");

    assert_eq!(listing.applications.len(), 1);
    assert_eq!(listing.applications[0].id, first.id);
    let applicant = listing.applications[0].applicant.as_ref().expect("applicant");
    assert_eq!(applicant.email, fixture.seeker.email);
    assert_eq!(applicant.resume, fixture.seeker.resume);

    let count = |status| {
        listing
            .status_counts
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.count)
    };
    assert_eq!(count(ApplicationStatus::Applied), Some(1));
    assert_eq!(count(ApplicationStatus::Accepted), Some(1));
    assert_eq!(count(ApplicationStatus::Rejected), Some(0));
}

#[test]
fn list_by_employer_spans_owned_jobs_only() {
    let fixture = fixture();
    let first = post_job(&fixture, "Platform Engineer");
    let second = post_job(&fixture, "Data Engineer");
    let rival = employer_account(fixture.store.as_ref(), "Rita Rival", "Globex");
    let foreign = fixture
        .market
        .jobs
        .create_job(&rival.id, draft("Foreign Role", 1, 2))
        .expect("foreign job");

    let applications = &fixture.market.applications;
    applications.apply(&first.id, &fixture.seeker.id).expect("apply");
    applications.apply(&second.id, &fixture.seeker.id).expect("apply");
    applications.apply(&foreign.id, &fixture.seeker.id).expect("apply");

    let rows = applications
        .list_by_employer(&fixture.employer.id)
        .expect("employer listing");
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .all(|row| row.job.as_ref().is_some_and(|job| job.id != foreign.id)));
}

#[test]
fn seeker_view_tracks_current_job_and_hides_deleted_ones() {
    let fixture = fixture();
    let kept = post_job(&fixture, "Platform Engineer");
    let removed = post_job(&fixture, "Data Engineer");
    let applications = &fixture.market.applications;
    applications.apply(&kept.id, &fixture.seeker.id).expect("apply");
    applications.apply(&removed.id, &fixture.seeker.id).expect("apply");

    fixture
        .market
        .jobs
        .toggle_closed(&kept.id, &fixture.employer.id)
        .expect("close");
    fixture
        .market
        .jobs
        .delete_job(&removed.id, &fixture.employer.id)
        .expect("delete");

    let views = applications
        .list_by_seeker(&fixture.seeker.id)
        .expect("seeker view");
    assert_eq!(views.len(), 2);
    let closed = views
        .iter()
        .find_map(|view| view.job.as_ref().filter(|job| job.id == kept.id))
        .expect("closed job still visible");
    assert!(closed.is_closed);
    assert_eq!(views.iter().filter(|view| view.job.is_none()).count(), 1);
}
