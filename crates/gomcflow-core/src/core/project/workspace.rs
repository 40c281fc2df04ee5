use super::document::JobDocument;
use super::statepoint::{GroupKey, StatePoint};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STATEPOINT_FILE: &str = "statepoint.json";
pub const DOCUMENT_FILE: &str = "job_document.json";

const WORKSPACE_DIR: &str = "workspace";
const ANALYSIS_DIR: &str = "analysis";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid JSON in '{path}': {source}", path = path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Job directory '{0}' has no state-point file")]
    MissingStatePoint(PathBuf),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ProjectError + '_ {
    move |source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A campaign rooted at one directory: one job directory per state point
/// under `workspace/`, shared cross-replicate outputs under `analysis/`.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    pub fn analysis_dir(&self) -> PathBuf {
        self.root.join(ANALYSIS_DIR)
    }

    /// Create the workspace and one job directory per state point, writing
    /// each state-point file. Existing job directories are left untouched, so
    /// re-initializing with a superset of state points only adds jobs.
    pub fn init(
        root: impl Into<PathBuf>,
        statepoints: &[StatePoint],
    ) -> Result<(Self, Vec<Job>), ProjectError> {
        let project = Self::open(root);
        let workspace = project.workspace_dir();
        fs::create_dir_all(&workspace).map_err(io_err(&workspace))?;

        let mut jobs = Vec::with_capacity(statepoints.len());
        for statepoint in statepoints {
            let dir = workspace.join(statepoint.job_name());
            fs::create_dir_all(&dir).map_err(io_err(&dir))?;
            let sp_path = dir.join(STATEPOINT_FILE);
            if !sp_path.exists() {
                write_json(&sp_path, statepoint)?;
            }
            jobs.push(Job {
                dir,
                statepoint: *statepoint,
            });
        }
        Ok((project, jobs))
    }

    /// All jobs currently in the workspace, sorted by directory name for a
    /// stable iteration order.
    pub fn jobs(&self) -> Result<Vec<Job>, ProjectError> {
        let workspace = self.workspace_dir();
        let mut jobs = Vec::new();
        let entries = fs::read_dir(&workspace).map_err(io_err(&workspace))?;
        for entry in entries {
            let entry = entry.map_err(io_err(&workspace))?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let sp_path = dir.join(STATEPOINT_FILE);
            if !sp_path.exists() {
                return Err(ProjectError::MissingStatePoint(dir));
            }
            let statepoint: StatePoint = read_json(&sp_path)?;
            jobs.push(Job { dir, statepoint });
        }
        jobs.sort_by(|a, b| a.dir.cmp(&b.dir));
        Ok(jobs)
    }

    /// Jobs grouped into replicate groups, groups ordered by temperature
    /// descending and members by replica index.
    pub fn groups(&self) -> Result<Vec<(GroupKey, Vec<Job>)>, ProjectError> {
        let mut by_key: HashMap<GroupKey, Vec<Job>> = HashMap::new();
        for job in self.jobs()? {
            by_key.entry(job.statepoint.group_key()).or_default().push(job);
        }
        let mut groups: Vec<_> = by_key.into_iter().collect();
        groups.sort_by(|(a, _), (b, _)| {
            b.production_temperature_k
                .total_cmp(&a.production_temperature_k)
                .then(a.production_pressure_bar.total_cmp(&b.production_pressure_bar))
        });
        for (_, members) in &mut groups {
            members.sort_by_key(|job| job.statepoint.replica_number);
        }
        Ok(groups)
    }
}

/// One simulation job: a directory plus the state point that defines it.
#[derive(Debug, Clone)]
pub struct Job {
    dir: PathBuf,
    statepoint: StatePoint,
}

impl Job {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn statepoint(&self) -> &StatePoint {
        &self.statepoint
    }

    pub fn name(&self) -> String {
        self.statepoint.job_name()
    }

    /// Absolute path of a file inside this job's directory.
    pub fn path_to(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn has_file(&self, file_name: &str) -> bool {
        self.path_to(file_name).is_file()
    }

    pub fn document(&self) -> Result<JobDocument, ProjectError> {
        read_json(&self.path_to(DOCUMENT_FILE))
    }

    pub fn write_document(&self, document: &JobDocument) -> Result<(), ProjectError> {
        write_json(&self.path_to(DOCUMENT_FILE), document)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ProjectError> {
    let content = fs::read_to_string(path).map_err(io_err(path))?;
    serde_json::from_str(&content).map_err(|source| ProjectError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ProjectError> {
    let content = serde_json::to_string_pretty(value).map_err(|source| ProjectError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(io_err(path))
}
