use super::analysis;
use crate::core::io::summary::AggregateReport;
use crate::core::project::document::JobDocument;
use crate::core::project::workspace::{DOCUMENT_FILE, Job, Project};
use crate::engine::config::{CampaignConfig, FileNames};
use crate::engine::control::{self, ControlSpec};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::runner;
use crate::engine::status::{self, RunStatus};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{info, instrument, warn};

/// Per-job pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InitializeDocument,
    WriteInputs,
    Equilibration,
    Production,
    ReplicateAnalysis,
}

pub const STAGES: [Stage; 5] = [
    Stage::InitializeDocument,
    Stage::WriteInputs,
    Stage::Equilibration,
    Stage::Production,
    Stage::ReplicateAnalysis,
];

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::InitializeDocument => "initialize-document",
            Stage::WriteInputs => "write-inputs",
            Stage::Equilibration => "equilibration",
            Stage::Production => "production",
            Stage::ReplicateAnalysis => "replicate-analysis",
        }
    }
}

/// Stage-completion labels for one job: the state the driver gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobLabels {
    pub document_initialized: bool,
    pub inputs_written: bool,
    pub equilibration: RunStatus,
    pub production: RunStatus,
    pub replicate_summary_written: bool,
}

/// Evaluate every label for one job with a single pass over its directory.
pub fn job_labels(job: &Job, config: &CampaignConfig) -> Result<JobLabels, EngineError> {
    let names = &config.file_names;

    let structure_written = job.has_file(&names.forcefield_file())
        && job.has_file(&names.structure_file())
        && job.has_file(&names.coordinates_file());
    let controls_written = status::control_file_written(
        &job.path_to(&FileNames::control_file(&names.equilibration_control_stem)),
    )? && status::control_file_written(
        &job.path_to(&FileNames::control_file(&names.production_control_stem)),
    )?;

    Ok(JobLabels {
        document_initialized: job.has_file(DOCUMENT_FILE),
        inputs_written: structure_written && controls_written,
        equilibration: status::scan_console_log(
            &job.path_to(&status::console_log_name(&names.equilibration_control_stem)),
        )?,
        production: status::scan_console_log(
            &job.path_to(&status::console_log_name(&names.production_control_stem)),
        )?,
        replicate_summary_written: job.has_file(&names.replicate_summary_file),
    })
}

impl JobLabels {
    pub fn is_complete(&self, stage: Stage) -> bool {
        match stage {
            Stage::InitializeDocument => self.document_initialized,
            Stage::WriteInputs => self.inputs_written,
            Stage::Equilibration => self.equilibration.is_completed(),
            Stage::Production => self.production.is_completed(),
            Stage::ReplicateAnalysis => self.replicate_summary_written,
        }
    }

    /// Whether a stage's preconditions hold and its postcondition does not.
    pub fn is_eligible(&self, stage: Stage) -> bool {
        if self.is_complete(stage) {
            return false;
        }
        match stage {
            Stage::InitializeDocument => true,
            Stage::WriteInputs => self.document_initialized,
            Stage::Equilibration => self.inputs_written,
            Stage::Production => self.equilibration.is_completed(),
            Stage::ReplicateAnalysis => self.production.is_completed(),
        }
    }

    pub fn next_stage(&self) -> Option<Stage> {
        STAGES.into_iter().find(|stage| self.is_eligible(*stage))
    }
}

/// Run one stage of one job. The caller is responsible for eligibility.
pub fn run_stage(
    project: &Project,
    job: &Job,
    config: &CampaignConfig,
    stage: Stage,
) -> Result<(), EngineError> {
    match stage {
        Stage::InitializeDocument => initialize_document(job, config).map(|_| ()),
        Stage::WriteInputs => write_inputs(job, config),
        Stage::Equilibration => run_equilibration(job, config),
        Stage::Production => run_production(job, config),
        Stage::ReplicateAnalysis => {
            analysis::summarize_replicate(project, job, config).map(|_| ())
        }
    }
}

#[instrument(skip_all, fields(job = %job.name()))]
fn initialize_document(job: &Job, config: &CampaignConfig) -> Result<JobDocument, EngineError> {
    let document = JobDocument::initialize(
        job.statepoint(),
        config.ensemble,
        config.resources.ncpu,
        config.resources.ngpu,
    )?;
    job.write_document(&document)?;
    info!(seed = document.replica_seed, "Initialized job document.");
    Ok(document)
}

#[instrument(skip_all, fields(job = %job.name()))]
fn write_inputs(job: &Job, config: &CampaignConfig) -> Result<(), EngineError> {
    let document = job.document()?;
    runner::run_structure_builder(job.dir(), &config.builder, &config.file_names)?;

    for spec in [
        ControlSpec::equilibration(config, job.statepoint(), document.replica_seed),
        ControlSpec::production(config, job.statepoint(), document.replica_seed),
    ] {
        let path = job.path_to(&spec.control_file_name(&config.file_names));
        let mut writer = BufWriter::new(File::create(&path)?);
        control::write_control_file(&spec, &mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), "Wrote control file.");
    }
    Ok(())
}

fn run_equilibration(job: &Job, config: &CampaignConfig) -> Result<(), EngineError> {
    let document = job.document()?;
    runner::run_engine_phase(
        job.dir(),
        &config.resources.binary_dir,
        &document.equilibration_binary,
        document.ncpu,
        &config.file_names.equilibration_control_stem,
    )?;
    Ok(())
}

fn run_production(job: &Job, config: &CampaignConfig) -> Result<(), EngineError> {
    let document = job.document()?;
    runner::run_engine_phase(
        job.dir(),
        &config.resources.binary_dir,
        &document.production_binary,
        document.ncpu,
        &config.file_names.production_control_stem,
    )?;
    Ok(())
}

/// What a driver pass accomplished.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CampaignReport {
    pub stages_run: usize,
    pub groups_aggregated: usize,
    pub failed_jobs: Vec<(String, String)>,
}

impl CampaignReport {
    fn mark_failed(&mut self, job: &Job, error: &EngineError) {
        self.failed_jobs.push((job.name(), error.to_string()));
    }

    fn has_failed(&self, job: &Job) -> bool {
        let name = job.name();
        self.failed_jobs.iter().any(|(failed, _)| *failed == name)
    }
}

/// Advance every job through its eligible stages until a full pass makes no
/// progress, then aggregate each completed replicate group.
///
/// A failing stage stops only its own job; other jobs keep advancing. Group
/// aggregation runs strictly after all per-job work, one group at a time.
#[instrument(skip_all)]
pub fn run_campaign(
    project: &Project,
    config: &CampaignConfig,
    reporter: &ProgressReporter,
) -> Result<CampaignReport, EngineError> {
    let jobs = project.jobs()?;
    reporter.report(Progress::CampaignStart {
        total_jobs: jobs.len() as u64,
    });

    let mut report = CampaignReport::default();
    loop {
        let mut progressed = false;
        for job in &jobs {
            if report.has_failed(job) {
                continue;
            }
            let labels = job_labels(job, config)?;
            let Some(stage) = labels.next_stage() else {
                continue;
            };
            reporter.report(Progress::StageStart {
                job: job.name(),
                stage: stage.name(),
            });
            match run_stage(project, job, config, stage) {
                Ok(()) => {
                    progressed = true;
                    report.stages_run += 1;
                    reporter.report(Progress::StageFinish {
                        job: job.name(),
                        stage: stage.name(),
                    });
                }
                Err(error) => {
                    warn!(
                        job = %job.name(),
                        stage = stage.name(),
                        %error,
                        "Stage failed; job will not advance further this run."
                    );
                    reporter.report(Progress::Message(format!(
                        "{}: {} failed: {}",
                        job.name(),
                        stage.name(),
                        error
                    )));
                    report.mark_failed(job, &error);
                }
            }
        }
        if !progressed {
            break;
        }
    }

    aggregate_completed_groups(project, config, reporter, &mut report)?;
    Ok(report)
}

/// Run only the analysis stages: refresh the replicate summary of every job
/// whose production run completed, then aggregate the completed groups.
#[instrument(skip_all)]
pub fn run_analysis(
    project: &Project,
    config: &CampaignConfig,
    reporter: &ProgressReporter,
) -> Result<CampaignReport, EngineError> {
    let jobs = project.jobs()?;
    reporter.report(Progress::CampaignStart {
        total_jobs: jobs.len() as u64,
    });

    let mut report = CampaignReport::default();
    for job in &jobs {
        let labels = job_labels(job, config)?;
        if !labels.production.is_completed() {
            info!(job = %job.name(), "Production not completed; skipping analysis.");
            continue;
        }
        reporter.report(Progress::StageStart {
            job: job.name(),
            stage: Stage::ReplicateAnalysis.name(),
        });
        analysis::summarize_replicate(project, job, config)?;
        report.stages_run += 1;
        reporter.report(Progress::StageFinish {
            job: job.name(),
            stage: Stage::ReplicateAnalysis.name(),
        });
    }

    aggregate_completed_groups(project, config, reporter, &mut report)?;
    Ok(report)
}

/// Aggregate every group whose members all have a replicate summary, unless
/// the report already exists (meaning nothing was invalidated since it was
/// built).
fn aggregate_completed_groups(
    project: &Project,
    config: &CampaignConfig,
    reporter: &ProgressReporter,
    report: &mut CampaignReport,
) -> Result<(), EngineError> {
    let aggregate = AggregateReport::new(
        project
            .analysis_dir()
            .join(&config.file_names.aggregate_summary_file),
    );
    if aggregate.exists() {
        info!("Aggregate report is current; nothing to aggregate.");
        return Ok(());
    }

    for (key, members) in project.groups()? {
        let complete = members
            .iter()
            .all(|job| job.has_file(&config.file_names.replicate_summary_file));
        if !complete {
            info!(group = %key, "Replicate summaries incomplete; group not aggregated.");
            continue;
        }
        analysis::aggregate_group(project, &members, config)?;
        report.groups_aggregated += 1;
        reporter.report(Progress::GroupAggregated {
            group: key.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::statepoint::StatePoint;
    use crate::engine::config::test_support::campaign_config;
    use crate::workflows::analysis::block_output_name;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn statepoint(temp: f64, replica: u32) -> StatePoint {
        StatePoint {
            production_temperature_k: temp,
            production_pressure_bar: 1.01325,
            replica_number: replica,
        }
    }

    fn project_with_jobs(statepoints: &[StatePoint]) -> (TempDir, Project, Vec<Job>) {
        let dir = tempdir().unwrap();
        let (project, jobs) = Project::init(dir.path(), statepoints).unwrap();
        (dir, project, jobs)
    }

    /// Fake the on-disk traces of every stage up to and including production.
    fn fake_through_production(job: &Job, config: &CampaignConfig) {
        let names = &config.file_names;
        let document = JobDocument::initialize(
            job.statepoint(),
            config.ensemble,
            config.resources.ncpu,
            config.resources.ngpu,
        )
        .unwrap();
        job.write_document(&document).unwrap();

        for file in [
            names.forcefield_file(),
            names.structure_file(),
            names.coordinates_file(),
        ] {
            fs::write(job.path_to(&file), "x").unwrap();
        }
        for stem in [&names.equilibration_control_stem, &names.production_control_stem] {
            fs::write(
                job.path_to(&FileNames::control_file(stem)),
                format!("Temperature 300\nOutputName {stem}\n"),
            )
            .unwrap();
        }
        for stem in [&names.equilibration_control_stem, &names.production_control_stem] {
            fs::write(
                job.path_to(&status::console_log_name(stem)),
                "Steps/sec: 1000\nCompleted\n",
            )
            .unwrap();
        }
        fs::write(
            job.path_to(&block_output_name(&names.production_output_stem)),
            "#STEP TOT_MOL TOT_DENS VOLUME\n0 500 0.98 15625\n1 500 1.02 15625\n",
        )
        .unwrap();
    }

    #[test]
    fn a_fresh_job_starts_with_document_initialization() {
        let config = campaign_config();
        let (_dir, _project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);

        let labels = job_labels(&jobs[0], &config).unwrap();
        assert!(!labels.document_initialized);
        assert_eq!(labels.equilibration, RunStatus::NotStarted);
        assert_eq!(labels.next_stage(), Some(Stage::InitializeDocument));
    }

    #[test]
    fn equilibration_waits_for_inputs() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        run_stage(&project, &jobs[0], &config, Stage::InitializeDocument).unwrap();

        let labels = job_labels(&jobs[0], &config).unwrap();
        assert!(labels.document_initialized);
        assert!(!labels.is_eligible(Stage::Equilibration));
        assert_eq!(labels.next_stage(), Some(Stage::WriteInputs));
    }

    #[test]
    fn production_waits_for_completed_equilibration() {
        let config = campaign_config();
        let (_dir, _project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        fake_through_production(&jobs[0], &config);
        // Rewind the equilibration log to an interrupted state.
        fs::write(
            jobs[0].path_to(&status::console_log_name(
                &config.file_names.equilibration_control_stem,
            )),
            "Steps/sec: 1000\n",
        )
        .unwrap();

        let labels = job_labels(&jobs[0], &config).unwrap();
        assert_eq!(labels.equilibration, RunStatus::Started);
        assert!(!labels.is_eligible(Stage::Production));
        assert_eq!(labels.next_stage(), Some(Stage::Equilibration));
    }

    #[test]
    fn a_fully_faked_job_only_needs_analysis() {
        let config = campaign_config();
        let (_dir, _project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        fake_through_production(&jobs[0], &config);

        let labels = job_labels(&jobs[0], &config).unwrap();
        assert_eq!(labels.next_stage(), Some(Stage::ReplicateAnalysis));
    }

    #[test]
    fn initialize_document_writes_the_document() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 4)]);
        run_stage(&project, &jobs[0], &config, Stage::InitializeDocument).unwrap();

        let document = jobs[0].document().unwrap();
        assert_eq!(document.replica_seed, 4);
        assert_eq!(document.equilibration_binary, "GOMC_CPU_NPT");
    }

    #[test]
    fn write_inputs_surfaces_a_missing_builder() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        run_stage(&project, &jobs[0], &config, Stage::InitializeDocument).unwrap();

        let result = run_stage(&project, &jobs[0], &config, Stage::WriteInputs);
        assert!(matches!(result, Err(EngineError::Run(_))));
    }

    #[test]
    fn run_campaign_analyzes_and_aggregates_completed_jobs() {
        let config = campaign_config();
        let (_dir, project, jobs) =
            project_with_jobs(&[statepoint(300.0, 0), statepoint(300.0, 1)]);
        for job in &jobs {
            fake_through_production(job, &config);
        }

        let report = run_campaign(&project, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(report.stages_run, 2);
        assert_eq!(report.groups_aggregated, 1);
        assert!(report.failed_jobs.is_empty());

        let aggregate = AggregateReport::new(
            project
                .analysis_dir()
                .join(&config.file_names.aggregate_summary_file),
        );
        let rows = aggregate.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0]["Rho_kg_per_m_cubed"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn run_campaign_leaves_incomplete_groups_unaggregated() {
        let config = campaign_config();
        let (_dir, project, jobs) =
            project_with_jobs(&[statepoint(300.0, 0), statepoint(300.0, 1)]);
        fake_through_production(&jobs[0], &config);
        // The second replicate cannot advance: its builder is missing, so it
        // fails at write-inputs and the group stays incomplete.
        let report = run_campaign(&project, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(report.groups_aggregated, 0);
        assert_eq!(report.failed_jobs.len(), 1);
        let aggregate = AggregateReport::new(
            project
                .analysis_dir()
                .join(&config.file_names.aggregate_summary_file),
        );
        assert!(!aggregate.exists());
    }

    #[test]
    fn run_analysis_skips_jobs_without_completed_production() {
        let config = campaign_config();
        let (_dir, project, jobs) =
            project_with_jobs(&[statepoint(300.0, 0), statepoint(300.0, 1)]);
        fake_through_production(&jobs[0], &config);

        let report = run_analysis(&project, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(report.stages_run, 1);
        assert_eq!(report.groups_aggregated, 0);
        assert!(jobs[0].has_file(&config.file_names.replicate_summary_file));
        assert!(!jobs[1].has_file(&config.file_names.replicate_summary_file));
    }

    #[test]
    fn run_analysis_aggregates_each_completed_group_once() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[
            statepoint(550.0, 0),
            statepoint(550.0, 1),
            statepoint(300.0, 0),
            statepoint(300.0, 1),
        ]);
        for job in &jobs {
            fake_through_production(job, &config);
        }

        let report = run_analysis(&project, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(report.stages_run, 4);
        assert_eq!(report.groups_aggregated, 2);

        // A second pass recomputes the summaries, which invalidates the
        // report, so both groups are aggregated again rather than duplicated.
        let again = run_analysis(&project, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(again.groups_aggregated, 2);
        let aggregate = AggregateReport::new(
            project
                .analysis_dir()
                .join(&config.file_names.aggregate_summary_file),
        );
        assert_eq!(aggregate.rows().unwrap().len(), 2);
    }
}
