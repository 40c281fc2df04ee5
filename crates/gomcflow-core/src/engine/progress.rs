/// Campaign-level progress events, forwarded to whichever front end drives
/// the run.
#[derive(Debug, Clone)]
pub enum Progress {
    CampaignStart { total_jobs: u64 },
    StageStart { job: String, stage: &'static str },
    StageFinish { job: String, stage: &'static str },
    GroupAggregated { group: String },
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn events_reach_the_callback_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::StageStart { stage, .. } = event {
                seen.lock().unwrap().push(stage);
            }
        }));

        reporter.report(Progress::StageStart {
            job: "a".into(),
            stage: "equilibration",
        });
        reporter.report(Progress::StageStart {
            job: "a".into(),
            stage: "production",
        });
        assert_eq!(*seen.lock().unwrap(), ["equilibration", "production"]);
    }

    #[test]
    fn a_reporter_without_a_callback_is_a_no_op() {
        ProgressReporter::new().report(Progress::Message("ignored".into()));
    }
}
