//! Progress notifications
//!
//! Purely observational: the engine emits a [`Progress`] after each record and
//! never reads anything back.

use std::sync::mpsc::Sender;

/// The pass a notification belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Remove,
    Update,
    Add,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Remove => "Checking files to remove",
            Self::Update => "Checking files to update",
            Self::Add => "Checking files to add",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One progress notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub operation: Operation,
    pub processed: usize,
    pub total: usize,
}

/// Receiver of progress notifications.
pub trait ProgressSink: Send {
    fn report(&self, progress: Progress);
}

/// Discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// Forwards notifications over a channel; a dropped receiver is ignored.
impl ProgressSink for Sender<Progress> {
    fn report(&self, progress: Progress) {
        let _ = self.send(progress);
    }
}
