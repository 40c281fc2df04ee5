use super::defaults::DefaultsConfig;
use super::file::PartialCampaignConfig;
use super::models::AppConfig;
use crate::cli::CampaignArgs;
use crate::error::{CliError, Result};
use gomcflow::core::project::document::Ensemble;
use gomcflow::core::project::statepoint::StatePoint;
use gomcflow::engine::config::{
    AnalysisRange, BuilderCommand, CampaignConfigBuilder, Cutoffs, FileNames, MoveFrequencies,
    OutputFrequencies, Resources, StepCounts,
};

/// Merge the campaign file with compiled defaults into the configuration the
/// core operations take. File values win over defaults; required values with
/// no sensible default (state points, binary locations) must come from the
/// file.
pub fn build_config(args: &CampaignArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file = PartialCampaignConfig::from_file(&args.config)?;

    let campaign = file.campaign.take().unwrap_or_default();
    let ensemble = parse_ensemble(campaign.ensemble.as_deref().unwrap_or("npt"))?;
    let statepoints = enumerate_statepoints(&campaign)?;

    let files = file.files.take().unwrap_or_default();
    let file_names = FileNames {
        forcefield_stem: files.forcefield_stem.unwrap_or(defaults.forcefield_stem),
        structure_stem: files.structure_stem.unwrap_or(defaults.structure_stem),
        equilibration_control_stem: files
            .equilibration_control_stem
            .unwrap_or(defaults.equilibration_control_stem),
        equilibration_output_stem: files
            .equilibration_output_stem
            .unwrap_or(defaults.equilibration_output_stem),
        production_control_stem: files
            .production_control_stem
            .unwrap_or(defaults.production_control_stem),
        production_output_stem: files
            .production_output_stem
            .unwrap_or(defaults.production_output_stem),
        replicate_summary_file: files
            .replicate_summary_file
            .unwrap_or(defaults.replicate_summary_file),
        aggregate_summary_file: files
            .aggregate_summary_file
            .unwrap_or(defaults.aggregate_summary_file),
    };

    let steps = file.steps.take().unwrap_or_default();
    let step_counts = StepCounts {
        equilibration: steps.equilibration.unwrap_or(defaults.equilibration_steps),
        production: steps.production.unwrap_or(defaults.production_steps),
        initial_equilibration: steps
            .initial_equilibration
            .unwrap_or(defaults.initial_equilibration_steps),
    };

    let frequencies = file.frequencies.take().unwrap_or_default();
    let output_frequencies = OutputFrequencies {
        console: frequencies.console.unwrap_or(defaults.console_freq),
        block_average: frequencies
            .block_average
            .unwrap_or(defaults.block_average_freq),
        coordinate: frequencies.coordinate.unwrap_or(defaults.coordinate_freq),
    };

    let cutoffs = file.cutoffs.take().unwrap_or_default();
    let cutoff_config = Cutoffs {
        rcut_ang: cutoffs.rcut_ang.unwrap_or(defaults.rcut_ang),
        rcut_low_equilibration_ang: cutoffs
            .rcut_low_equilibration_ang
            .unwrap_or(defaults.rcut_low_equilibration_ang),
        rcut_low_production_ang: cutoffs
            .rcut_low_production_ang
            .unwrap_or(defaults.rcut_low_production_ang),
        long_range_correction: cutoffs
            .long_range_correction
            .unwrap_or(defaults.long_range_correction),
        exclude: cutoffs.exclude.unwrap_or(defaults.exclude),
        ewald: cutoffs.ewald.unwrap_or(defaults.ewald),
        electrostatics: cutoffs.electrostatics.unwrap_or(defaults.electrostatics),
    };

    let moves = file.moves.take().unwrap_or_default();
    let move_frequencies = MoveFrequencies {
        displacement: moves.displacement.unwrap_or(defaults.displacement_freq),
        rotation: moves.rotation.unwrap_or(defaults.rotation_freq),
        volume: moves.volume.unwrap_or(defaults.volume_freq),
        multi_particle: moves.multi_particle.unwrap_or(defaults.multi_particle_freq),
    };

    let resources = file.resources.take().unwrap_or_default();
    let resource_config = Resources {
        binary_dir: resources.binary_dir.ok_or_else(|| {
            CliError::Config("`resources.binary-dir` is required.".to_string())
        })?,
        ncpu: resources.ncpu.unwrap_or(defaults.ncpu),
        ngpu: resources.ngpu.unwrap_or(defaults.ngpu),
    };

    let builder = file.builder.take().unwrap_or_default();
    let builder_command = BuilderCommand {
        command: builder
            .command
            .ok_or_else(|| CliError::Config("`builder.command` is required.".to_string()))?,
        forcefield_source: builder.forcefield_source.ok_or_else(|| {
            CliError::Config("`builder.forcefield-source` is required.".to_string())
        })?,
        molecule_source: builder.molecule_source.ok_or_else(|| {
            CliError::Config("`builder.molecule-source` is required.".to_string())
        })?,
        residue_name: builder.residue_name.unwrap_or(defaults.residue_name),
        total_molecules: builder.total_molecules.unwrap_or(defaults.total_molecules),
        box_edge_ang: builder.box_edge_ang.unwrap_or(defaults.box_edge_ang),
    };

    let analysis = file.analysis.take().unwrap_or_default();
    let analysis_range = AnalysisRange {
        step_start: analysis.step_start.unwrap_or(defaults.step_start),
        step_finish: analysis.step_finish.unwrap_or(defaults.step_finish),
    };

    let campaign_config = CampaignConfigBuilder::new()
        .ensemble(ensemble)
        .file_names(file_names)
        .steps(step_counts)
        .frequencies(output_frequencies)
        .cutoffs(cutoff_config)
        .moves(move_frequencies)
        .resources(resource_config)
        .builder_command(builder_command)
        .analysis(analysis_range)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        root: args.root.clone(),
        statepoints,
        campaign: campaign_config,
    })
}

fn parse_ensemble(name: &str) -> Result<Ensemble> {
    match name {
        "npt" => Ok(Ensemble::Npt),
        "nvt" => Ok(Ensemble::Nvt),
        "gemc-nvt" => Ok(Ensemble::GemcNvt),
        "gcmc" => Ok(Ensemble::Gcmc),
        other => Err(CliError::Argument(format!(
            "Unknown ensemble '{other}'. Expected one of: npt, nvt, gemc-nvt, gcmc."
        ))),
    }
}

/// The cross product of the configured temperature list and replica count at
/// the single configured pressure.
fn enumerate_statepoints(
    campaign: &super::file::PartialCampaignSection,
) -> Result<Vec<StatePoint>> {
    let temperatures = campaign.temperatures_k.clone().ok_or_else(|| {
        CliError::Config("`campaign.temperatures-k` is required.".to_string())
    })?;
    let pressure = campaign
        .pressure_bar
        .ok_or_else(|| CliError::Config("`campaign.pressure-bar` is required.".to_string()))?;
    let replicas = campaign
        .replicas
        .ok_or_else(|| CliError::Config("`campaign.replicas` is required.".to_string()))?;
    if replicas == 0 {
        return Err(CliError::Config(
            "`campaign.replicas` must be at least 1.".to_string(),
        ));
    }

    let mut statepoints = Vec::with_capacity(temperatures.len() * replicas as usize);
    for &temperature in &temperatures {
        for replica in 0..replicas {
            statepoints.push(StatePoint {
                production_temperature_k: temperature,
                production_pressure_bar: pressure,
                replica_number: replica,
            });
        }
    }
    Ok(statepoints)
}
