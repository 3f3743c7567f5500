use crate::infra::marketplace_with_clock;
use chrono::{Duration, Utc};
use clap::Args;
use hireline::config::AppConfig;
use hireline::error::AppError;
use hireline::marketplace::{
    ApplicationStatus, DashboardOverview, ExportFormat, ExportSchema, JobDraft, JobFilter,
    ManualClock, MarketplaceError, MarketplaceStore, PageRequest, Role, User,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Export format for the applicant list (csv, tsv, json, xlsx)
    #[arg(long, default_value = "csv")]
    pub(crate) export_format: String,
    /// Export column set (full or minimal)
    #[arg(long, default_value = "full")]
    pub(crate) schema: String,
    /// Write the export to this path instead of printing it
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let format = args.export_format.parse::<ExportFormat>()?;
    let schema = args.schema.parse::<ExportSchema>()?;
    let config = AppConfig::load()?;

    let clock = Arc::new(ManualClock::new(Utc::now() - Duration::days(3)));
    let market = marketplace_with_clock(config.marketplace, clock.clone());
    let store = market.store();

    let mut employer = User::new("Erin Employer", "erin@acme.test", Role::Employer, market.now());
    employer.company_name = Some("Acme Corp".to_string());
    let employer = store
        .insert_user(employer)
        .map_err(MarketplaceError::from)?;
    let mut seeker = User::new("Sam Seeker", "sam@example.test", Role::Jobseeker, market.now());
    seeker.resume = "https://cdn.example.test/resumes/sam.pdf".to_string();
    let seeker = store
        .insert_user(seeker)
        .map_err(MarketplaceError::from)?;

    println!("Hiring demo");
    let job = market.jobs.create_job(
        &employer.id,
        JobDraft {
            title: "Software Engineer".to_string(),
            description: "Build the hiring pipeline.".to_string(),
            requirements: "Rust, PostgreSQL, HTTP APIs".to_string(),
            category: "Engineering".to_string(),
            job_type: "Full-Time".to_string(),
            location: "Remote, EU".to_string(),
            salary_min: 50_000,
            salary_max: 70_000,
        },
    )?;
    println!(
        "- {} posted '{}' ({} to {})",
        employer.company_name.as_deref().unwrap_or(&employer.name),
        job.title,
        job.salary_min,
        job.salary_max
    );

    clock.advance(Duration::days(1));
    let application = market.applications.apply(&job.id, &seeker.id)?;
    println!("- {} applied: {}", seeker.name, application.status);

    clock.advance(Duration::days(1));
    market
        .applications
        .set_status(&application.id, ApplicationStatus::InReview, &employer.id)?;

    let listing = market.discovery.get_job(&job.id, Some(&seeker.id))?;
    println!(
        "- seeker now sees the job as: {}",
        listing
            .application_status
            .map(ApplicationStatus::label)
            .unwrap_or("not applied")
    );

    clock.advance(Duration::hours(6));
    market.jobs.toggle_closed(&job.id, &employer.id)?;
    let open = market
        .discovery
        .search(&JobFilter::default(), None, PageRequest::new(1, 10)?)?;
    println!("- job closed; {} open listings remain", open.total_items);

    render_dashboard(&market.dashboard_overview(&employer.id)?);

    let payload =
        market.export_job_applications(&job.id, &employer.id, None, format, schema)?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, &payload.bytes)?;
            println!(
                "\nExported {} ({} bytes) to {}",
                payload.filename,
                payload.bytes.len(),
                path.display()
            );
        }
        None if format == ExportFormat::Xlsx => {
            println!(
                "\n{} is a {} byte workbook; pass --out to save it",
                payload.filename,
                payload.bytes.len()
            );
        }
        None => {
            println!("\n{} ({})", payload.filename, payload.content_type);
            println!("{}", String::from_utf8_lossy(&payload.bytes));
        }
    }

    Ok(())
}

fn render_dashboard(overview: &DashboardOverview) {
    let counts = &overview.counts;
    println!("\nEmployer dashboard");
    println!(
        "- active jobs: {} ({:+}%)",
        counts.total_active_jobs, counts.trends.active_jobs
    );
    println!(
        "- applications: {} ({:+}%)",
        counts.total_applications, counts.trends.total_applicants
    );
    println!(
        "- hired: {} ({:+}%)",
        counts.total_hired, counts.trends.total_hired
    );
    for job in &overview.data.recent_jobs {
        println!("  - {} [{}]", job.title, job.status_label());
    }
}
