use crate::core::io::blk::BlockTable;
use crate::core::io::summary::{
    AggregateReport, AggregateRow, QuantityStats, ReplicateSummary,
};
use crate::core::project::workspace::{Job, Project};
use crate::core::utils::stats;
use crate::engine::config::CampaignConfig;
use crate::engine::error::EngineError;
use tracing::{info, instrument};

// Column names in the engine's block-average output. External contract;
// renaming any of these breaks parsing of real engine files.
const BLK_STEP: &str = "STEP";
const BLK_TOTAL_MOLECULES: &str = "TOT_MOL";
const BLK_DENSITY: &str = "TOT_DENS";
const BLK_VOLUME: &str = "VOLUME";

/// Block-average file the production phase writes for box 0.
pub fn block_output_name(production_output_stem: &str) -> String {
    format!("Blk_{production_output_stem}_BOX_0.dat")
}

/// Summarize one completed replicate: parse its production block output,
/// filter to the configured step range, and write the fixed-width summary
/// record into the job directory.
///
/// Any aggregate report already present is removed first: the aggregate must
/// always be rebuilt from the full set of replicate summaries, so a fresh
/// summary invalidates whatever was aggregated before it existed.
#[instrument(skip_all, fields(job = %job.name()))]
pub fn summarize_replicate(
    project: &Project,
    job: &Job,
    config: &CampaignConfig,
) -> Result<ReplicateSummary, EngineError> {
    let report = AggregateReport::new(
        project
            .analysis_dir()
            .join(&config.file_names.aggregate_summary_file),
    );
    if report.invalidate()? {
        info!("Removed stale aggregate report; it will be rebuilt from scratch.");
    }

    let blk_path = job.path_to(&block_output_name(&config.file_names.production_output_stem));
    let table = BlockTable::from_path(&blk_path).map_err(|source| EngineError::BlockOutput {
        path: blk_path.clone(),
        source,
    })?;
    let range = config.analysis.step_start as f64..=config.analysis.step_finish as f64;
    let table = table
        .filtered_by(BLK_STEP, range)
        .map_err(|source| EngineError::BlockOutput {
            path: blk_path.clone(),
            source,
        })?;

    let column_mean = |name: &str| -> Result<f64, EngineError> {
        let values = table.column(name).map_err(|source| EngineError::BlockOutput {
            path: blk_path.clone(),
            source,
        })?;
        Ok(stats::nan_mean(&values))
    };
    let mol_count = column_mean(BLK_TOTAL_MOLECULES)?;
    let density = column_mean(BLK_DENSITY)?;
    let volume = column_mean(BLK_VOLUME)?;

    let statepoint = job.statepoint();
    let summary = ReplicateSummary {
        temperature_k: statepoint.production_temperature_k,
        pressure_bar: statepoint.production_pressure_bar,
        mol_count,
        density_kg_per_m3: density,
        volume_ang3: volume,
        // Cube root of the mean volume, not the mean of per-row cube roots.
        // Only meaningful for a cubic box, which every box in this campaign is.
        box_length_ang: volume.cbrt(),
    };

    let out_path = job.path_to(&config.file_names.replicate_summary_file);
    summary.write_to_path(&out_path)?;
    info!(path = %out_path.display(), rows = table.len(), "Wrote replicate summary.");
    Ok(summary)
}

fn quantity(values: &[f64]) -> QuantityStats {
    QuantityStats {
        mean: stats::mean(values),
        std_dev: stats::sample_std_dev(values),
    }
}

/// Aggregate one replicate group into the shared report.
///
/// Every member's summary must already exist; a missing or malformed member
/// is fatal for the whole group so that statistics over an incomplete set are
/// never reported as complete. A single-replicate group gets NaN standard
/// deviations. The report append takes no lock; callers must not aggregate
/// two groups concurrently (the sequential driver guarantees this).
#[instrument(skip_all)]
pub fn aggregate_group(
    project: &Project,
    group: &[Job],
    config: &CampaignConfig,
) -> Result<AggregateRow, EngineError> {
    let Some(first) = group.first() else {
        return Err(EngineError::EmptyGroup("<empty>".to_string()));
    };
    let group_key = first.statepoint().group_key();

    let mut temperatures = Vec::with_capacity(group.len());
    let mut pressures = Vec::with_capacity(group.len());
    let mut mol_counts = Vec::with_capacity(group.len());
    let mut densities = Vec::with_capacity(group.len());
    let mut volumes = Vec::with_capacity(group.len());
    let mut box_lengths = Vec::with_capacity(group.len());

    for job in group {
        let path = job.path_to(&config.file_names.replicate_summary_file);
        let summary =
            ReplicateSummary::from_path(&path).map_err(|source| EngineError::Summary {
                path: path.clone(),
                source,
            })?;
        temperatures.push(summary.temperature_k);
        pressures.push(summary.pressure_bar);
        mol_counts.push(summary.mol_count);
        densities.push(summary.density_kg_per_m3);
        volumes.push(summary.volume_ang3);
        box_lengths.push(summary.box_length_ang);
    }

    let row = AggregateRow {
        temperature_k: quantity(&temperatures),
        pressure_bar: quantity(&pressures),
        mol_count: quantity(&mol_counts),
        density_kg_per_m3: quantity(&densities),
        volume_ang3: quantity(&volumes),
        box_length_ang: quantity(&box_lengths),
    };

    let report = AggregateReport::new(
        project
            .analysis_dir()
            .join(&config.file_names.aggregate_summary_file),
    );
    report.append(&row).map_err(|source| EngineError::Summary {
        path: report.path().to_path_buf(),
        source,
    })?;
    info!(group = %group_key, replicates = group.len(), "Appended aggregate row.");
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::summary::COL_TEMPERATURE;
    use crate::core::project::statepoint::StatePoint;
    use crate::engine::config::test_support::campaign_config;
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

    fn write_blk(job: &Job, config: &CampaignConfig, body: &str) {
        let name = block_output_name(&config.file_names.production_output_stem);
        fs::write(job.path_to(&name), body).unwrap();
    }

    const THREE_BLOCKS: &str = "\
#STEP          TOT_MOL        TOT_DENS       VOLUME
10000000       500            0.98           15625
20000000       500            1.00           15625
30000000       500            1.02           15625
";

    #[test]
    fn summarizer_averages_the_tracked_columns() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        write_blk(&jobs[0], &config, THREE_BLOCKS);

        let summary = summarize_replicate(&project, &jobs[0], &config).unwrap();
        assert_eq!(summary.mol_count, 500.0);
        assert!((summary.density_kg_per_m3 - 1.0).abs() < 1e-12);
        assert_eq!(summary.volume_ang3, 15625.0);
        assert_eq!(summary.temperature_k, 300.0);
        assert_eq!(summary.pressure_bar, 1.01325);
        assert!(jobs[0].has_file(&config.file_names.replicate_summary_file));
    }

    #[test]
    fn box_length_is_the_cube_root_of_the_mean_volume() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        // Volumes 1000 and 8000: mean is 4500, so the correct order of
        // operations gives 4500^(1/3), not (10 + 20) / 2.
        write_blk(
            &jobs[0],
            &config,
            "#STEP TOT_MOL TOT_DENS VOLUME\n0 500 1.0 1000\n1 500 1.0 8000\n",
        );

        let summary = summarize_replicate(&project, &jobs[0], &config).unwrap();
        assert!((summary.box_length_ang - 4500f64.cbrt()).abs() < 1e-12);
        assert!((summary.box_length_ang - 16.509636244473134).abs() < 1e-9);
        assert_ne!(summary.box_length_ang, 15.0);
    }

    #[test]
    fn step_filter_bounds_are_inclusive() {
        let mut config = campaign_config();
        config.analysis.step_start = 20_000_000;
        config.analysis.step_finish = 30_000_000;
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        write_blk(&jobs[0], &config, THREE_BLOCKS);

        let summary = summarize_replicate(&project, &jobs[0], &config).unwrap();
        assert!((summary.density_kg_per_m3 - 1.01).abs() < 1e-12);
    }

    #[test]
    fn empty_step_range_yields_nan_means_not_zero() {
        let mut config = campaign_config();
        config.analysis.step_start = 1;
        config.analysis.step_finish = 2;
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        write_blk(&jobs[0], &config, THREE_BLOCKS);

        let summary = summarize_replicate(&project, &jobs[0], &config).unwrap();
        assert!(summary.density_kg_per_m3.is_nan());
        assert!(summary.mol_count.is_nan());
        assert!(summary.volume_ang3.is_nan());
    }

    #[test]
    fn nan_cells_are_excluded_from_the_mean() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        write_blk(
            &jobs[0],
            &config,
            "#STEP TOT_MOL TOT_DENS VOLUME\n0 500 NaN 15625\n1 500 0.98 15625\n2 500 1.02 15625\n",
        );

        let summary = summarize_replicate(&project, &jobs[0], &config).unwrap();
        assert!((summary.density_kg_per_m3 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_block_output_is_fatal_and_writes_nothing() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);

        let result = summarize_replicate(&project, &jobs[0], &config);
        assert!(matches!(result, Err(EngineError::BlockOutput { .. })));
        assert!(!jobs[0].has_file(&config.file_names.replicate_summary_file));
    }

    #[test]
    fn a_fresh_summary_invalidates_the_aggregate_report() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        write_blk(&jobs[0], &config, THREE_BLOCKS);

        let stale = project
            .analysis_dir()
            .join(&config.file_names.aggregate_summary_file);
        fs::create_dir_all(project.analysis_dir()).unwrap();
        fs::write(&stale, "stale aggregate contents\n").unwrap();

        summarize_replicate(&project, &jobs[0], &config).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn aggregator_uses_the_bessel_corrected_deviation() {
        let config = campaign_config();
        let (_dir, project, jobs) =
            project_with_jobs(&[statepoint(300.0, 0), statepoint(300.0, 1)]);
        write_blk(
            &jobs[0],
            &config,
            "#STEP TOT_MOL TOT_DENS VOLUME\n0 500 0.98 15625\n",
        );
        write_blk(
            &jobs[1],
            &config,
            "#STEP TOT_MOL TOT_DENS VOLUME\n0 500 1.02 15625\n",
        );
        for job in &jobs {
            summarize_replicate(&project, job, &config).unwrap();
        }

        let row = aggregate_group(&project, &jobs, &config).unwrap();
        assert!((row.density_kg_per_m3.mean - 1.0).abs() < 1e-12);
        assert!((row.density_kg_per_m3.std_dev - 0.0283).abs() < 1e-4);
        assert_eq!(row.temperature_k.mean, 300.0);
        assert_eq!(row.temperature_k.std_dev, 0.0);
        assert_eq!(row.mol_count.std_dev, 0.0);
    }

    #[test]
    fn single_replicate_group_reports_nan_deviations_without_panicking() {
        let config = campaign_config();
        let (_dir, project, jobs) = project_with_jobs(&[statepoint(300.0, 0)]);
        write_blk(&jobs[0], &config, THREE_BLOCKS);
        summarize_replicate(&project, &jobs[0], &config).unwrap();

        let row = aggregate_group(&project, &jobs, &config).unwrap();
        assert!((row.density_kg_per_m3.mean - 1.0).abs() < 1e-12);
        assert!(row.density_kg_per_m3.std_dev.is_nan());
        assert!(row.temperature_k.std_dev.is_nan());
    }

    #[test]
    fn a_second_group_appends_without_disturbing_the_first() {
        let config = campaign_config();
        let (_dir, project, _) =
            project_with_jobs(&[statepoint(550.0, 0), statepoint(550.0, 1), statepoint(300.0, 0), statepoint(300.0, 1)]);
        let groups = project.groups().unwrap();
        assert_eq!(groups.len(), 2);
        for (_, members) in &groups {
            for job in members {
                write_blk(job, &config, THREE_BLOCKS);
                summarize_replicate(&project, job, &config).unwrap();
            }
        }

        aggregate_group(&project, &groups[0].1, &config).unwrap();
        aggregate_group(&project, &groups[1].1, &config).unwrap();

        let report = AggregateReport::new(
            project
                .analysis_dir()
                .join(&config.file_names.aggregate_summary_file),
        );
        let rows = report.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][COL_TEMPERATURE], 550.0);
        assert_eq!(rows[1][COL_TEMPERATURE], 300.0);
    }

    #[test]
    fn a_missing_member_summary_is_fatal_for_the_group() {
        let config = campaign_config();
        let (_dir, project, jobs) =
            project_with_jobs(&[statepoint(300.0, 0), statepoint(300.0, 1)]);
        write_blk(&jobs[0], &config, THREE_BLOCKS);
        summarize_replicate(&project, &jobs[0], &config).unwrap();

        let result = aggregate_group(&project, &jobs, &config);
        assert!(matches!(result, Err(EngineError::Summary { .. })));
        // No partial aggregate may be left behind for the group.
        let report_path = project
            .analysis_dir()
            .join(&config.file_names.aggregate_summary_file);
        assert!(!report_path.exists());
    }

    #[test]
    fn an_empty_group_is_rejected() {
        let config = campaign_config();
        let (_dir, project, _) = project_with_jobs(&[statepoint(300.0, 0)]);
        assert!(matches!(
            aggregate_group(&project, &[], &config),
            Err(EngineError::EmptyGroup(_))
        ));
    }
}
