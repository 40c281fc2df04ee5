use super::statepoint::StatePoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("GPU count must be 0 or 1, got {0}")]
    UnsupportedGpuCount(u32),
}

/// Which processor family the engine binary targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Processor {
    Cpu,
    Gpu,
}

impl Processor {
    /// The tag GOMC embeds in its binary names (`GOMC_CPU_NPT` etc.).
    pub fn binary_tag(&self) -> &'static str {
        match self {
            Processor::Cpu => "CPU",
            Processor::Gpu => "GPU",
        }
    }
}

/// Simulation ensemble, selecting the engine binary and the control-file
/// sections that apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ensemble {
    Npt,
    Nvt,
    GemcNvt,
    Gcmc,
}

impl Ensemble {
    pub fn binary_tag(&self) -> &'static str {
        match self {
            Ensemble::Npt => "NPT",
            Ensemble::Nvt => "NVT",
            Ensemble::GemcNvt => "GEMC",
            Ensemble::Gcmc => "GCMC",
        }
    }

    /// Whether the ensemble holds pressure fixed (and therefore needs a
    /// `Pressure` line and volume moves in its control file).
    pub fn is_constant_pressure(&self) -> bool {
        matches!(self, Ensemble::Npt | Ensemble::GemcNvt)
    }
}

/// Runtime parameters derived once from the state point and the campaign
/// configuration, persisted alongside it in the job directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobDocument {
    pub replica_seed: u32,
    pub ncpu: u32,
    pub ngpu: u32,
    pub processor: Processor,
    pub equilibration_binary: String,
    pub production_binary: String,
}

impl JobDocument {
    /// Derive the document for one job. The replica index doubles as the PRNG
    /// seed so that replicates differ in nothing else.
    pub fn initialize(
        statepoint: &StatePoint,
        ensemble: Ensemble,
        ncpu: u32,
        ngpu: u32,
    ) -> Result<Self, DocumentError> {
        let processor = match ngpu {
            0 => Processor::Cpu,
            1 => Processor::Gpu,
            other => return Err(DocumentError::UnsupportedGpuCount(other)),
        };
        let binary = format!("GOMC_{}_{}", processor.binary_tag(), ensemble.binary_tag());
        Ok(Self {
            replica_seed: statepoint.replica_number,
            ncpu,
            ngpu,
            processor,
            equilibration_binary: binary.clone(),
            production_binary: binary,
        })
    }
}
