use clap::{Args, Parser, Subcommand, ValueEnum};
use gomcflow::workflows::campaign::Stage;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "GOMCFlow CLI - Campaign automation for GOMC Monte Carlo simulations: workspace setup, input generation, phased engine runs, and replicate-averaged analysis.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the campaign workspace from the configured state points.
    Init(InitArgs),
    /// Show each job's stage labels and engine run statuses.
    Status(StatusArgs),
    /// Advance every job through its eligible pipeline stages.
    Run(RunArgs),
    /// Run only the analysis stages (replicate summaries and group averages).
    Analyze(AnalyzeArgs),
}

/// Arguments shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct CampaignArgs {
    /// Path to the campaign configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Campaign root directory holding `workspace/` and `analysis/`.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub root: PathBuf,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub campaign: CampaignArgs,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub campaign: CampaignArgs,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub campaign: CampaignArgs,

    /// Run only this pipeline stage on the jobs currently eligible for it.
    #[arg(long, value_enum, value_name = "STAGE")]
    pub stage: Option<StageArg>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub campaign: CampaignArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageArg {
    InitializeDocument,
    WriteInputs,
    Equilibration,
    Production,
    ReplicateAnalysis,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::InitializeDocument => Stage::InitializeDocument,
            StageArg::WriteInputs => Stage::WriteInputs,
            StageArg::Equilibration => Stage::Equilibration,
            StageArg::Production => Stage::Production,
            StageArg::ReplicateAnalysis => Stage::ReplicateAnalysis,
        }
    }
}
