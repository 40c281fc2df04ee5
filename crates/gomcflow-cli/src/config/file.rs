use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialCampaignSection {
    pub ensemble: Option<String>,
    #[serde(rename = "temperatures-k")]
    pub temperatures_k: Option<Vec<f64>>,
    #[serde(rename = "pressure-bar")]
    pub pressure_bar: Option<f64>,
    pub replicas: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialFilesSection {
    #[serde(rename = "forcefield-stem")]
    pub forcefield_stem: Option<String>,
    #[serde(rename = "structure-stem")]
    pub structure_stem: Option<String>,
    #[serde(rename = "equilibration-control-stem")]
    pub equilibration_control_stem: Option<String>,
    #[serde(rename = "equilibration-output-stem")]
    pub equilibration_output_stem: Option<String>,
    #[serde(rename = "production-control-stem")]
    pub production_control_stem: Option<String>,
    #[serde(rename = "production-output-stem")]
    pub production_output_stem: Option<String>,
    #[serde(rename = "replicate-summary-file")]
    pub replicate_summary_file: Option<String>,
    #[serde(rename = "aggregate-summary-file")]
    pub aggregate_summary_file: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialStepsSection {
    pub equilibration: Option<u64>,
    pub production: Option<u64>,
    #[serde(rename = "initial-equilibration")]
    pub initial_equilibration: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialFrequenciesSection {
    pub console: Option<u64>,
    #[serde(rename = "block-average")]
    pub block_average: Option<u64>,
    pub coordinate: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialCutoffsSection {
    #[serde(rename = "rcut-ang")]
    pub rcut_ang: Option<f64>,
    #[serde(rename = "rcut-low-equilibration-ang")]
    pub rcut_low_equilibration_ang: Option<f64>,
    #[serde(rename = "rcut-low-production-ang")]
    pub rcut_low_production_ang: Option<f64>,
    #[serde(rename = "long-range-correction")]
    pub long_range_correction: Option<bool>,
    pub exclude: Option<String>,
    pub ewald: Option<bool>,
    pub electrostatics: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialMovesSection {
    pub displacement: Option<f64>,
    pub rotation: Option<f64>,
    pub volume: Option<f64>,
    #[serde(rename = "multi-particle")]
    pub multi_particle: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialResourcesSection {
    #[serde(rename = "binary-dir")]
    pub binary_dir: Option<PathBuf>,
    pub ncpu: Option<u32>,
    pub ngpu: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialBuilderSection {
    pub command: Option<PathBuf>,
    #[serde(rename = "forcefield-source")]
    pub forcefield_source: Option<PathBuf>,
    #[serde(rename = "molecule-source")]
    pub molecule_source: Option<PathBuf>,
    #[serde(rename = "residue-name")]
    pub residue_name: Option<String>,
    #[serde(rename = "total-molecules")]
    pub total_molecules: Option<u32>,
    #[serde(rename = "box-edge-ang")]
    pub box_edge_ang: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisSection {
    #[serde(rename = "step-start")]
    pub step_start: Option<u64>,
    #[serde(rename = "step-finish")]
    pub step_finish: Option<u64>,
}

/// The campaign TOML file as written, everything optional so the merge layer
/// can fill gaps from defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialCampaignConfig {
    pub campaign: Option<PartialCampaignSection>,
    pub files: Option<PartialFilesSection>,
    pub steps: Option<PartialStepsSection>,
    pub frequencies: Option<PartialFrequenciesSection>,
    pub cutoffs: Option<PartialCutoffsSection>,
    pub moves: Option<PartialMovesSection>,
    pub resources: Option<PartialResourcesSection>,
    pub builder: Option<PartialBuilderSection>,
    pub analysis: Option<PartialAnalysisSection>,
}

impl PartialCampaignConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading campaign configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
