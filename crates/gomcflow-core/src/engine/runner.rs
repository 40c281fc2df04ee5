use super::config::{BuilderCommand, FileNames};
use super::status::console_log_name;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to launch '{program}': {source}", program = program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}", program = program.display())]
    NonZeroExit { program: PathBuf, status: ExitStatus },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn run_checked(mut command: Command, program: &Path) -> Result<(), RunError> {
    let status = command.status().map_err(|source| RunError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;
    if !status.success() {
        return Err(RunError::NonZeroExit {
            program: program.to_path_buf(),
            status,
        });
    }
    Ok(())
}

/// Launch one engine phase in `job_dir`: `<binary_dir>/<binary> +p<ncpu>
/// <control>.conf`, console output redirected to the log the status scanner
/// reads. Blocks until the engine exits.
pub fn run_engine_phase(
    job_dir: &Path,
    binary_dir: &Path,
    binary: &str,
    ncpu: u32,
    control_stem: &str,
) -> Result<(), RunError> {
    let program = binary_dir.join(binary);
    let log = File::create(job_dir.join(console_log_name(control_stem)))?;
    let log_err = log.try_clone()?;

    info!(
        program = %program.display(),
        control = control_stem,
        ncpu,
        "Launching engine phase"
    );
    let mut command = Command::new(&program);
    command
        .arg(format!("+p{ncpu}"))
        .arg(FileNames::control_file(control_stem))
        .current_dir(job_dir)
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err));
    run_checked(command, &program)
}

/// Invoke the external structure builder in `job_dir`. The builder owns
/// system packing and force-field emission; it must leave
/// `<forcefield>.inp`, `<structure>.psf`, and `<structure>.pdb` behind, which
/// the input-written predicate then checks.
pub fn run_structure_builder(
    job_dir: &Path,
    builder: &BuilderCommand,
    file_names: &FileNames,
) -> Result<(), RunError> {
    info!(
        program = %builder.command.display(),
        molecules = builder.total_molecules,
        "Invoking structure builder"
    );
    let mut command = Command::new(&builder.command);
    command
        .arg("--molecule")
        .arg(&builder.molecule_source)
        .arg("--forcefield")
        .arg(&builder.forcefield_source)
        .arg("--residue")
        .arg(&builder.residue_name)
        .arg("--molecules")
        .arg(builder.total_molecules.to_string())
        .arg("--box-edge")
        .arg(builder.box_edge_ang.to_string())
        .arg("--structure-stem")
        .arg(&file_names.structure_stem)
        .arg("--forcefield-stem")
        .arg(&file_names.forcefield_stem)
        .current_dir(job_dir);
    run_checked(command, &builder.command)
}
