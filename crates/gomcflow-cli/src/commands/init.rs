use crate::cli::InitArgs;
use crate::config;
use crate::error::Result;
use gomcflow::core::project::workspace::Project;
use tracing::info;

pub fn run(args: InitArgs) -> Result<()> {
    let app_config = config::build_config(&args.campaign)?;
    info!(
        root = %app_config.root.display(),
        statepoints = app_config.statepoints.len(),
        "Initializing campaign workspace."
    );

    let (project, jobs) = Project::init(&app_config.root, &app_config.statepoints)
        .map_err(gomcflow::engine::error::EngineError::from)?;

    println!(
        "Initialized {} job(s) under {}",
        jobs.len(),
        project.workspace_dir().display()
    );
    Ok(())
}
