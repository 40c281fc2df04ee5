use gomcflow::core::project::statepoint::StatePoint;
use gomcflow::engine::config::CampaignConfig;
use std::path::PathBuf;

/// The fully merged configuration a command runs with.
pub struct AppConfig {
    pub root: PathBuf,
    pub statepoints: Vec<StatePoint>,
    pub campaign: CampaignConfig,
}
