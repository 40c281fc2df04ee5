use super::config::{CampaignConfig, Cutoffs, FileNames, MoveFrequencies, OutputFrequencies};
use crate::core::project::document::Ensemble;
use crate::core::project::statepoint::StatePoint;
use std::io::{self, Write};

/// Restart inputs for the production phase, derived from the equilibration
/// phase's output stem the way the engine names its restart files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartFiles {
    pub coordinates: String,
    pub structure: String,
    pub bin_coordinates: String,
    pub extended_system: String,
}

impl RestartFiles {
    pub fn from_output_stem(stem: &str) -> Self {
        Self {
            coordinates: format!("{stem}_BOX_0_restart.pdb"),
            structure: format!("{stem}_BOX_0_restart.psf"),
            bin_coordinates: format!("{stem}_BOX_0_restart.coor"),
            extended_system: format!("{stem}_BOX_0_restart.xsc"),
        }
    }
}

/// Typed contents of one GOMC control file. A written file is judged
/// complete by the presence of its `OutputName` line.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec<'a> {
    pub ensemble: Ensemble,
    pub run_steps: u64,
    pub initial_equilibration_steps: u64,
    pub temperature_k: f64,
    pub pressure_bar: f64,
    pub seed: u32,
    pub parameters_file: String,
    pub coordinates_file: String,
    pub structure_file: String,
    pub output_stem: String,
    pub restart: Option<RestartFiles>,
    pub rcut_low_ang: f64,
    pub cutoffs: &'a Cutoffs,
    pub moves: &'a MoveFrequencies,
    pub frequencies: &'a OutputFrequencies,
}

impl<'a> ControlSpec<'a> {
    /// Control file for a fresh equilibration run of one job.
    pub fn equilibration(config: &'a CampaignConfig, statepoint: &StatePoint, seed: u32) -> Self {
        Self {
            ensemble: config.ensemble,
            run_steps: config.steps.equilibration,
            initial_equilibration_steps: config.steps.initial_equilibration,
            temperature_k: statepoint.production_temperature_k,
            pressure_bar: statepoint.production_pressure_bar,
            seed,
            parameters_file: config.file_names.forcefield_file(),
            coordinates_file: config.file_names.coordinates_file(),
            structure_file: config.file_names.structure_file(),
            output_stem: config.file_names.equilibration_output_stem.clone(),
            restart: None,
            rcut_low_ang: config.cutoffs.rcut_low_equilibration_ang,
            cutoffs: &config.cutoffs,
            moves: &config.moves,
            frequencies: &config.frequencies,
        }
    }

    /// Control file for the production run, restarting from the
    /// equilibration output.
    pub fn production(config: &'a CampaignConfig, statepoint: &StatePoint, seed: u32) -> Self {
        Self {
            run_steps: config.steps.production,
            output_stem: config.file_names.production_output_stem.clone(),
            restart: Some(RestartFiles::from_output_stem(
                &config.file_names.equilibration_output_stem,
            )),
            rcut_low_ang: config.cutoffs.rcut_low_production_ang,
            ..Self::equilibration(config, statepoint, seed)
        }
    }

    pub fn control_file_name(&self, file_names: &FileNames) -> String {
        let stem = if self.restart.is_some() {
            &file_names.production_control_stem
        } else {
            &file_names.equilibration_control_stem
        };
        FileNames::control_file(stem)
    }
}

/// Render one GOMC control file.
pub fn write_control_file(spec: &ControlSpec, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "########################")?;
    writeln!(writer, "# Input")?;
    writeln!(writer, "########################")?;
    writeln!(writer, "Restart {}", spec.restart.is_some())?;
    writeln!(writer, "PRNG INTSEED")?;
    writeln!(writer, "Random_Seed {}", spec.seed)?;
    writeln!(writer, "ParaTypeCHARMM true")?;
    writeln!(writer, "Parameters {}", spec.parameters_file)?;
    match &spec.restart {
        None => {
            writeln!(writer, "Coordinates 0 {}", spec.coordinates_file)?;
            writeln!(writer, "Structure 0 {}", spec.structure_file)?;
        }
        Some(restart) => {
            writeln!(writer, "Coordinates 0 {}", restart.coordinates)?;
            writeln!(writer, "Structure 0 {}", restart.structure)?;
            writeln!(writer, "binCoordinates 0 {}", restart.bin_coordinates)?;
            writeln!(writer, "extendedSystem 0 {}", restart.extended_system)?;
        }
    }
    writeln!(writer)?;

    writeln!(writer, "########################")?;
    writeln!(writer, "# System")?;
    writeln!(writer, "########################")?;
    writeln!(writer, "Temperature {}", spec.temperature_k)?;
    if spec.ensemble.is_constant_pressure() {
        writeln!(writer, "Pressure {}", spec.pressure_bar)?;
    }
    writeln!(writer, "Potential VDW")?;
    writeln!(writer, "LRC {}", spec.cutoffs.long_range_correction)?;
    writeln!(writer, "Rcut {}", spec.cutoffs.rcut_ang)?;
    writeln!(writer, "RcutLow {}", spec.rcut_low_ang)?;
    writeln!(writer, "Exclude {}", spec.cutoffs.exclude)?;
    writeln!(writer, "Ewald {}", spec.cutoffs.ewald)?;
    writeln!(writer, "ElectroStatic {}", spec.cutoffs.electrostatics)?;
    writeln!(writer, "VDWGeometricSigma false")?;
    writeln!(writer, "RunSteps {}", spec.run_steps)?;
    writeln!(writer, "EqSteps {}", spec.initial_equilibration_steps)?;
    writeln!(writer)?;

    writeln!(writer, "########################")?;
    writeln!(writer, "# Moves")?;
    writeln!(writer, "########################")?;
    writeln!(writer, "DisFreq {}", spec.moves.displacement)?;
    writeln!(writer, "RotFreq {}", spec.moves.rotation)?;
    if spec.ensemble.is_constant_pressure() {
        writeln!(writer, "VolFreq {}", spec.moves.volume)?;
    }
    writeln!(writer, "MultiParticleFreq {}", spec.moves.multi_particle)?;
    writeln!(writer, "CBMC_First 12")?;
    writeln!(writer, "CBMC_Nth 10")?;
    writeln!(writer, "CBMC_Ang 50")?;
    writeln!(writer, "CBMC_Dih 50")?;
    writeln!(writer)?;

    writeln!(writer, "########################")?;
    writeln!(writer, "# Output")?;
    writeln!(writer, "########################")?;
    writeln!(writer, "OutputName {}", spec.output_stem)?;
    writeln!(writer, "RestartFreq true {}", spec.frequencies.coordinate)?;
    writeln!(writer, "CheckpointFreq true {}", spec.frequencies.coordinate)?;
    writeln!(writer, "DCDFreq true {}", spec.frequencies.coordinate)?;
    writeln!(writer, "CoordinatesFreq false {}", spec.frequencies.coordinate)?;
    writeln!(writer, "ConsoleFreq true {}", spec.frequencies.console)?;
    writeln!(writer, "BlockAverageFreq true {}", spec.frequencies.block_average)?;
    writeln!(writer, "HistogramFreq false {}", spec.frequencies.coordinate)?;
    writeln!(writer, "PressureCalc false {}", spec.frequencies.coordinate)?;
    Ok(())
}
