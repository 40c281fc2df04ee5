use crate::cli::RunArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CampaignProgressHandler;
use gomcflow::core::project::workspace::Project;
use gomcflow::engine::progress::ProgressReporter;
use gomcflow::workflows::campaign::{self, CampaignReport, Stage};
use tracing::{info, warn};

pub fn run(args: RunArgs) -> Result<()> {
    let app_config = config::build_config(&args.campaign)?;
    let project = Project::open(&app_config.root);

    let progress_handler = CampaignProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = match args.stage {
        Some(stage_arg) => {
            let stage: Stage = stage_arg.into();
            info!(stage = stage.name(), "Running a single pipeline stage.");
            run_single_stage(&project, &app_config.campaign, stage)?
        }
        None => campaign::run_campaign(&project, &app_config.campaign, &reporter)?,
    };
    progress_handler.finish();

    println!(
        "Ran {} stage(s); aggregated {} group(s).",
        report.stages_run, report.groups_aggregated
    );
    if !report.failed_jobs.is_empty() {
        for (job, error) in &report.failed_jobs {
            warn!(job = %job, error = %error, "Job failed.");
            eprintln!("  {job}: {error}");
        }
        return Err(CliError::Campaign(format!(
            "{} job(s) failed",
            report.failed_jobs.len()
        )));
    }
    Ok(())
}

/// Run one stage across every job currently eligible for it, leaving the
/// rest of the pipeline untouched.
fn run_single_stage(
    project: &Project,
    config: &gomcflow::engine::config::CampaignConfig,
    stage: Stage,
) -> Result<CampaignReport> {
    let jobs = project
        .jobs()
        .map_err(gomcflow::engine::error::EngineError::from)?;

    let mut report = CampaignReport::default();
    for job in &jobs {
        let labels = campaign::job_labels(job, config)?;
        if !labels.is_eligible(stage) {
            info!(job = %job.name(), stage = stage.name(), "Not eligible; skipped.");
            continue;
        }
        match campaign::run_stage(project, job, config, stage) {
            Ok(()) => report.stages_run += 1,
            Err(error) => {
                warn!(job = %job.name(), %error, "Stage failed.");
                report.failed_jobs.push((job.name(), error.to_string()));
            }
        }
    }
    Ok(report)
}
