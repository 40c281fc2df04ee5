use crate::cli::StatusArgs;
use crate::config;
use crate::error::Result;
use gomcflow::core::io::summary::AggregateReport;
use gomcflow::core::project::workspace::Project;
use gomcflow::engine::status::RunStatus;
use gomcflow::workflows::campaign::{self, Stage};
use tracing::info;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "-" }
}

fn run_status(status: RunStatus) -> &'static str {
    match status {
        RunStatus::NotStarted => "-",
        RunStatus::Started => "started",
        RunStatus::CompletedProperly => "completed",
        RunStatus::Failed => "FAILED",
    }
}

pub fn run(args: StatusArgs) -> Result<()> {
    let app_config = config::build_config(&args.campaign)?;
    let project = Project::open(&app_config.root);
    let jobs = project
        .jobs()
        .map_err(gomcflow::engine::error::EngineError::from)?;
    info!(jobs = jobs.len(), "Evaluating job labels.");

    println!(
        "{:<28} {:<10} {:<10} {:<12} {:<12} {:<10} {}",
        "job", "document", "inputs", "equilb", "production", "summary", "next stage"
    );
    for job in &jobs {
        let labels = campaign::job_labels(job, &app_config.campaign)?;
        let next = labels
            .next_stage()
            .map(|s| s.name())
            .unwrap_or(if labels.is_complete(Stage::ReplicateAnalysis) {
                "done"
            } else {
                "blocked"
            });
        println!(
            "{:<28} {:<10} {:<10} {:<12} {:<12} {:<10} {}",
            job.name(),
            yes_no(labels.document_initialized),
            yes_no(labels.inputs_written),
            run_status(labels.equilibration),
            run_status(labels.production),
            yes_no(labels.replicate_summary_written),
            next,
        );
    }

    let report = AggregateReport::new(
        project
            .analysis_dir()
            .join(&app_config.campaign.file_names.aggregate_summary_file),
    );
    if report.exists() {
        let rows = report
            .rows()
            .map(|rows| rows.len())
            .unwrap_or(0);
        println!(
            "\nAggregate report: {} ({} group(s))",
            report.path().display(),
            rows
        );
    } else {
        println!("\nAggregate report: not written");
    }
    Ok(())
}
