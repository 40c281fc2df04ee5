use gomcflow::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders campaign progress events as an indicatif spinner on stderr.
#[derive(Clone)]
pub struct CampaignProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CampaignProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner().with_style(Self::spinner_style());
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::CampaignStart { total_jobs } => {
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(format!("Campaign started ({total_jobs} job(s))"));
                }
                Progress::StageStart { job, stage } => {
                    pb.set_message(format!("{job} · {stage}"));
                }
                Progress::StageFinish { job, stage } => {
                    pb.set_message(format!("{job} · {stage} done"));
                }
                Progress::GroupAggregated { group } => {
                    pb.println(format!("Aggregated group: {group}"));
                }
                Progress::Message(text) => {
                    pb.println(text);
                }
            }
        })
    }

    pub fn finish(&self) {
        if let Ok(pb) = self.pb.lock() {
            pb.finish_and_clear();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for CampaignProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
