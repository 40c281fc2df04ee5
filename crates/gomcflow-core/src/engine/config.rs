use crate::core::project::document::Ensemble;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Move frequencies must sum to 1.0, got {total}")]
    InvalidMoveFrequencies { total: f64 },
}

/// File-name stems and analysis output names shared across every stage.
/// Stems carry no extension; each consumer appends its own (`.inp`, `.psf`,
/// `.pdb`, `.conf`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNames {
    pub forcefield_stem: String,
    pub structure_stem: String,
    pub equilibration_control_stem: String,
    pub equilibration_output_stem: String,
    pub production_control_stem: String,
    pub production_output_stem: String,
    pub replicate_summary_file: String,
    pub aggregate_summary_file: String,
}

impl FileNames {
    pub fn forcefield_file(&self) -> String {
        format!("{}.inp", self.forcefield_stem)
    }

    pub fn coordinates_file(&self) -> String {
        format!("{}.pdb", self.structure_stem)
    }

    pub fn structure_file(&self) -> String {
        format!("{}.psf", self.structure_stem)
    }

    pub fn control_file(stem: &str) -> String {
        format!("{stem}.conf")
    }
}

/// Monte Carlo step counts for the two phases, plus the in-run equilibration
/// steps the engine spends before collecting averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCounts {
    pub equilibration: u64,
    pub production: u64,
    pub initial_equilibration: u64,
}

/// How often, in Monte Carlo steps, the engine emits each output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFrequencies {
    pub console: u64,
    pub block_average: u64,
    pub coordinate: u64,
}

/// Interaction cutoffs and electrostatics flags. The production phase runs
/// with its own, lower, inner cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct Cutoffs {
    pub rcut_ang: f64,
    pub rcut_low_equilibration_ang: f64,
    pub rcut_low_production_ang: f64,
    pub long_range_correction: bool,
    pub exclude: String,
    pub ewald: bool,
    pub electrostatics: bool,
}

/// Relative frequencies of the Monte Carlo move types. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveFrequencies {
    pub displacement: f64,
    pub rotation: f64,
    pub volume: f64,
    pub multi_particle: f64,
}

impl MoveFrequencies {
    pub fn total(&self) -> f64 {
        self.displacement + self.rotation + self.volume + self.multi_particle
    }
}

/// Where the engine binaries live and how many processors each run gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    pub binary_dir: PathBuf,
    pub ncpu: u32,
    pub ngpu: u32,
}

/// The external structure-builder invocation. The builder must leave the
/// force-field, psf, and pdb files in the job directory; this tool only
/// checks that it did.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderCommand {
    pub command: PathBuf,
    pub forcefield_source: PathBuf,
    pub molecule_source: PathBuf,
    pub residue_name: String,
    pub total_molecules: u32,
    pub box_edge_ang: f64,
}

/// Inclusive step range the per-replicate summarizer keeps. The default
/// upper bound is far past any realistic run, making the filter a no-op
/// unless narrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRange {
    pub step_start: u64,
    pub step_finish: u64,
}

/// Everything the campaign stages need, passed explicitly into each
/// operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignConfig {
    pub ensemble: Ensemble,
    pub file_names: FileNames,
    pub steps: StepCounts,
    pub frequencies: OutputFrequencies,
    pub cutoffs: Cutoffs,
    pub moves: MoveFrequencies,
    pub resources: Resources,
    pub builder: BuilderCommand,
    pub analysis: AnalysisRange,
}

#[derive(Default)]
pub struct CampaignConfigBuilder {
    ensemble: Option<Ensemble>,
    file_names: Option<FileNames>,
    steps: Option<StepCounts>,
    frequencies: Option<OutputFrequencies>,
    cutoffs: Option<Cutoffs>,
    moves: Option<MoveFrequencies>,
    resources: Option<Resources>,
    builder: Option<BuilderCommand>,
    analysis: Option<AnalysisRange>,
}

impl CampaignConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensemble(mut self, ensemble: Ensemble) -> Self {
        self.ensemble = Some(ensemble);
        self
    }
    pub fn file_names(mut self, file_names: FileNames) -> Self {
        self.file_names = Some(file_names);
        self
    }
    pub fn steps(mut self, steps: StepCounts) -> Self {
        self.steps = Some(steps);
        self
    }
    pub fn frequencies(mut self, frequencies: OutputFrequencies) -> Self {
        self.frequencies = Some(frequencies);
        self
    }
    pub fn cutoffs(mut self, cutoffs: Cutoffs) -> Self {
        self.cutoffs = Some(cutoffs);
        self
    }
    pub fn moves(mut self, moves: MoveFrequencies) -> Self {
        self.moves = Some(moves);
        self
    }
    pub fn resources(mut self, resources: Resources) -> Self {
        self.resources = Some(resources);
        self
    }
    pub fn builder_command(mut self, builder: BuilderCommand) -> Self {
        self.builder = Some(builder);
        self
    }
    pub fn analysis(mut self, analysis: AnalysisRange) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn build(self) -> Result<CampaignConfig, ConfigError> {
        let moves = self.moves.ok_or(ConfigError::MissingParameter("moves"))?;
        let total = moves.total();
        if (total - 1.0).abs() > 1e-9 {
            return Err(ConfigError::InvalidMoveFrequencies { total });
        }
        Ok(CampaignConfig {
            ensemble: self.ensemble.ok_or(ConfigError::MissingParameter("ensemble"))?,
            file_names: self
                .file_names
                .ok_or(ConfigError::MissingParameter("file_names"))?,
            steps: self.steps.ok_or(ConfigError::MissingParameter("steps"))?,
            frequencies: self
                .frequencies
                .ok_or(ConfigError::MissingParameter("frequencies"))?,
            cutoffs: self.cutoffs.ok_or(ConfigError::MissingParameter("cutoffs"))?,
            moves,
            resources: self
                .resources
                .ok_or(ConfigError::MissingParameter("resources"))?,
            builder: self.builder.ok_or(ConfigError::MissingParameter("builder"))?,
            analysis: self
                .analysis
                .ok_or(ConfigError::MissingParameter("analysis"))?,
        })
    }
}
