use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Parsing,
    Analyzing,
    LoadingFonts,
    Generating,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parsing => "parsing",
            Stage::Analyzing => "analyzing",
            Stage::LoadingFonts => "loading-fonts",
            Stage::Generating => "generating",
            Stage::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub stage: Stage,
    pub percent: u8,
    pub message: String,
}

/// Forwards progress to a callback, dropping anything that would move backwards.
pub(crate) struct ProgressReporter<'a> {
    sink: &'a mut dyn FnMut(&Progress),
    last: Option<(Stage, u8)>,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(sink: &'a mut dyn FnMut(&Progress)) -> Self {
        ProgressReporter { sink, last: None }
    }

    pub(crate) fn report(&mut self, stage: Stage, percent: u8, message: impl Into<String>) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| (stage, percent) < last) {
            return;
        }
        self.last = Some((stage, percent));
        let event = Progress { stage, percent, message: message.into() };
        log::debug!("Progress {} {}%: {}", event.stage, event.percent, event.message);
        (self.sink)(&event);
    }
}

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
    }
}
