use crate::cli::AnalyzeArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CampaignProgressHandler;
use gomcflow::core::project::workspace::Project;
use gomcflow::engine::progress::ProgressReporter;
use gomcflow::workflows::campaign;

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let app_config = config::build_config(&args.campaign)?;
    let project = Project::open(&app_config.root);

    let progress_handler = CampaignProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = campaign::run_analysis(&project, &app_config.campaign, &reporter)?;
    progress_handler.finish();

    println!(
        "Summarized {} replicate(s); aggregated {} group(s).",
        report.stages_run, report.groups_aggregated
    );
    Ok(())
}
