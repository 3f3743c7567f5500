use super::common::*;
use crate::config::MarketplaceConfig;
use crate::marketplace::domain::JobId;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::store::MarketplaceStore;

#[test]
fn save_twice_is_rejected_and_unsave_allows_saving_again() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");
    let saved_jobs = &fixture.market.saved_jobs;

    saved_jobs.save(&job.id, &fixture.seeker.id).expect("first save");
    let err = saved_jobs
        .save(&job.id, &fixture.seeker.id)
        .expect_err("second save");
    assert!(matches!(err, MarketplaceError::AlreadySaved));
    assert_eq!(
        fixture
            .store
            .saved_jobs_for_seeker(&fixture.seeker.id)
            .expect("list")
            .len(),
        1
    );

    saved_jobs.unsave(&job.id, &fixture.seeker.id).expect("unsave");
    saved_jobs
        .save(&job.id, &fixture.seeker.id)
        .expect("save after unsave");
}

#[test]
fn unsave_without_bookmark_is_not_found() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");

    let err = fixture
        .market
        .saved_jobs
        .unsave(&job.id, &fixture.seeker.id)
        .expect_err("nothing saved");
    assert!(matches!(err, MarketplaceError::NotFound("saved job")));
}

#[test]
fn racing_save_is_caught_by_the_unique_index() {
    let fixture = fixture_with(FaultyStore::default(), MarketplaceConfig::default());
    let job = post_job(&fixture, "Platform Engineer");
    fixture
        .market
        .saved_jobs
        .save(&job.id, &fixture.seeker.id)
        .expect("first save");

    fixture.store.set_fault(Fault::RaceOnInsert);
    let err = fixture
        .market
        .saved_jobs
        .save(&job.id, &fixture.seeker.id)
        .expect_err("raced save");
    assert!(matches!(err, MarketplaceError::AlreadySaved));
}

#[test]
fn saving_requires_a_live_job_and_a_jobseeker() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");

    let err = fixture
        .market
        .saved_jobs
        .save(&JobId::from("job-missing"), &fixture.seeker.id)
        .expect_err("missing job");
    assert!(matches!(err, MarketplaceError::NotFound("job")));

    let err = fixture
        .market
        .saved_jobs
        .save(&job.id, &fixture.employer.id)
        .expect_err("employer save");
    assert!(matches!(err, MarketplaceError::Forbidden(_)));
}

#[test]
fn listing_joins_job_and_company_summary() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");
    fixture
        .market
        .saved_jobs
        .save(&job.id, &fixture.seeker.id)
        .expect("save");

    let views = fixture
        .market
        .saved_jobs
        .list_by_seeker(&fixture.seeker.id)
        .expect("list");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].job.as_ref().map(|job| job.id.clone()), Some(job.id));
    let company = views[0].company.as_ref().expect("company");
    assert_eq!(company.company_name, "Acme Corp");
    assert_eq!(company.name, fixture.employer.name);
    assert!(!company.company_logo.is_empty());
}

#[test]
fn deleting_a_job_removes_its_bookmarks() {
    let fixture = fixture();
    let job = post_job(&fixture, "Platform Engineer");
    fixture
        .market
        .saved_jobs
        .save(&job.id, &fixture.seeker.id)
        .expect("save");

    fixture
        .market
        .jobs
        .delete_job(&job.id, &fixture.employer.id)
        .expect("delete");

    let views = fixture
        .market
        .saved_jobs
        .list_by_seeker(&fixture.seeker.id)
        .expect("list");
    assert!(views.is_empty());
}
