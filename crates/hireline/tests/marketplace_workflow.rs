//! Integration specifications for the hiring lifecycle: an employer posts a job, a seeker applies,
//! the employer reviews and closes the posting, and the applicant list is exported.
//!
//! Scenarios only go through the public `Marketplace` facade and the HTTP router.

mod common {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::Value;

    use hireline::config::MarketplaceConfig;
    use hireline::marketplace::router::{USER_ID_HEADER, USER_ROLE_HEADER};
    use hireline::marketplace::{
        InMemoryStore, InMemoryUploader, Job, JobDraft, ManualClock, Marketplace,
        MarketplaceStore, Role, User,
    };

    pub(super) struct World {
        pub(super) market: Arc<Marketplace<InMemoryStore>>,
        pub(super) clock: Arc<ManualClock>,
        pub(super) employer: User,
        pub(super) seeker: User,
    }

    pub(super) fn opened_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn world() -> World {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(opened_at()));

        let mut employer = User::new("Erin Employer", "erin@acme.test", Role::Employer, opened_at());
        employer.company_name = Some("Acme Corp".to_string());
        let employer = store.insert_user(employer).expect("employer");

        let mut seeker = User::new("Sam Seeker", "sam@example.test", Role::Jobseeker, opened_at());
        seeker.resume = "https://cdn.test/sam.pdf".to_string();
        let seeker = store.insert_user(seeker).expect("seeker");

        let market = Arc::new(Marketplace::new(
            store,
            clock.clone(),
            Arc::new(InMemoryUploader::default()),
            MarketplaceConfig::default(),
        ));

        World {
            market,
            clock,
            employer,
            seeker,
        }
    }

    pub(super) fn post_job(world: &World) -> Job {
        let draft = JobDraft {
            title: "Backend Engineer".to_string(),
            description: "Own the hiring APIs.".to_string(),
            requirements: "Rust, SQL".to_string(),
            category: "Engineering".to_string(),
            job_type: "Full-Time".to_string(),
            location: "Lisbon".to_string(),
            salary_min: 50_000,
            salary_max: 70_000,
        };
        world
            .market
            .jobs
            .create_job(&world.employer.id, draft)
            .expect("job posted")
    }

    pub(super) fn as_user(method: Method, uri: &str, user: &User, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_ID_HEADER, user.id.as_str())
            .header(USER_ROLE_HEADER, user.role.label());
        match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        }
    }

    pub(super) async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }
}

use axum::http::{Method, StatusCode};
use chrono::Duration;
use hireline::marketplace::{
    marketplace_router, ApplicationStatus, ExportFormat, ExportSchema, JobFilter, PageRequest,
};
use serde_json::json;
use tower::ServiceExt;

use common::*;

#[test]
fn lifecycle_from_posting_to_closed_job() {
    let world = world();
    let job = post_job(&world);
    let page = PageRequest::new(1, 10).expect("page");

    world.clock.advance(Duration::hours(1));
    let application = world
        .market
        .applications
        .apply(&job.id, &world.seeker.id)
        .expect("applied");
    assert_eq!(application.status, ApplicationStatus::Applied);

    let listing = world
        .market
        .applications
        .list_by_job(&job.id, &world.employer.id, None)
        .expect("employer listing");
    assert_eq!(listing.applications.len(), 1);

    let overview = world
        .market
        .dashboard_overview(&world.employer.id)
        .expect("overview");
    assert_eq!(overview.counts.total_active_jobs, 1);
    assert_eq!(overview.counts.total_applications, 1);

    world.clock.advance(Duration::hours(1));
    world
        .market
        .applications
        .set_status(&application.id, ApplicationStatus::InReview, &world.employer.id)
        .expect("reviewed");

    let seen = world
        .market
        .discovery
        .search(&JobFilter::default(), Some(&world.seeker.id), page)
        .expect("search");
    assert_eq!(seen.items.len(), 1);
    assert_eq!(
        seen.items[0].application_status,
        Some(ApplicationStatus::InReview)
    );

    world
        .market
        .jobs
        .toggle_closed(&job.id, &world.employer.id)
        .expect("closed");

    let overview = world
        .market
        .dashboard_overview(&world.employer.id)
        .expect("overview");
    assert_eq!(overview.counts.total_active_jobs, 0);
    assert_eq!(overview.counts.total_applications, 1);

    let open = world
        .market
        .discovery
        .search(&JobFilter::default(), None, page)
        .expect("search");
    assert_eq!(open.total_items, 0);

    let still_listed = world
        .market
        .applications
        .list_by_job(&job.id, &world.employer.id, None)
        .expect("listing after close");
    assert_eq!(still_listed.applications.len(), 1);
    assert!(still_listed.job.is_closed);

    let mine = world
        .market
        .applications
        .list_by_seeker(&world.seeker.id)
        .expect("seeker view");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, ApplicationStatus::InReview);

    let export = world
        .market
        .export_job_applications(
            &job.id,
            &world.employer.id,
            None,
            ExportFormat::Csv,
            ExportSchema::Full,
        )
        .expect("export");
    assert_eq!(export.filename, format!("Backendengineer-{}.csv", job.id));
    let text = String::from_utf8(export.bytes).expect("utf8");
    assert!(text.contains("Sam Seeker,sam@example.test"));
    assert!(text.contains("In Review"));
}

#[tokio::test]
async fn lifecycle_over_http() {
    let world = world();
    let job = post_job(&world);
    let router = marketplace_router(world.market.clone());

    let applied = router
        .clone()
        .oneshot(as_user(
            Method::POST,
            &format!("/applications/{}", job.id),
            &world.seeker,
            None,
        ))
        .await
        .expect("apply");
    assert_eq!(applied.status(), StatusCode::CREATED);
    let application = json_body(applied).await;
    let application_id = application["id"].as_str().expect("id").to_string();

    let reviewed = router
        .clone()
        .oneshot(as_user(
            Method::PUT,
            &format!("/applications/{application_id}/status"),
            &world.employer,
            Some(json!({ "status": "In Review" })),
        ))
        .await
        .expect("review");
    assert_eq!(reviewed.status(), StatusCode::OK);

    let search = router
        .clone()
        .oneshot(as_user(
            Method::GET,
            &format!("/jobs?userId={}", world.seeker.id),
            &world.seeker,
            None,
        ))
        .await
        .expect("search");
    let body = json_body(search).await;
    assert_eq!(body["items"][0]["applicationStatus"], "In Review");

    let closed = router
        .clone()
        .oneshot(as_user(
            Method::PUT,
            &format!("/jobs/{}/toggle-close", job.id),
            &world.employer,
            None,
        ))
        .await
        .expect("close");
    assert_eq!(closed.status(), StatusCode::OK);

    let dashboard = router
        .clone()
        .oneshot(as_user(
            Method::GET,
            "/dashboard/overview",
            &world.employer,
            None,
        ))
        .await
        .expect("dashboard");
    let body = json_body(dashboard).await;
    assert_eq!(body["counts"]["totalActiveJobs"], 0);
    assert_eq!(body["counts"]["totalApplications"], 1);

    let listing = router
        .oneshot(as_user(
            Method::GET,
            "/applications/my",
            &world.seeker,
            None,
        ))
        .await
        .expect("my applications");
    let body = json_body(listing).await;
    assert_eq!(body[0]["status"], "In Review");
    assert_eq!(body[0]["job"]["isClosed"], true);
}
