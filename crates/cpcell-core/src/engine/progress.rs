/// Events emitted while a cell is being solved.
///
/// Each solve phase is bracketed by `PhaseStart`/`PhaseFinish`; inside a phase one
/// `TaskIncrement` is reported per finished energy group. Under the `parallel` feature the
/// increments arrive from worker threads in no particular order.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

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
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));

        reporter.report(Progress::PhaseStart { name: "Test" });
        reporter.report(Progress::TaskStart { total_steps: 2 });
        reporter.report(Progress::Message("halfway".to_string()));
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                Progress::PhaseStart { name: "Test" },
                Progress::TaskStart { total_steps: 2 },
                Progress::Message("halfway".to_string()),
            ]
        );
    }
}
