//! Transfer progress reporting.

use std::ops::ControlFlow;

/// Byte counters reported by the engine during a transfer. Totals are 0
/// while unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub download_total: u64,
    pub download_now: u64,
    pub upload_total: u64,
    pub upload_now: u64,
}

impl Progress {
    /// The engine reports counters as doubles; negative or NaN values read
    /// as 0.
    pub fn from_engine(dltotal: f64, dlnow: f64, ultotal: f64, ulnow: f64) -> Self {
        Self {
            download_total: dltotal as u64,
            download_now: dlnow as u64,
            upload_total: ultotal as u64,
            upload_now: ulnow as u64,
        }
    }
}

/// Receives progress updates. Returning `Break` aborts the transfer, which
/// the call then reports as a transport failure.
pub trait ProgressSink {
    fn update(&mut self, progress: Progress) -> ControlFlow<()>;
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    fn update(&mut self, progress: Progress) -> ControlFlow<()> {
        self(progress)
    }
}

/// Forward one tick to `sink`. Returns whether the engine should continue.
pub(crate) fn relay(sink: &mut dyn ProgressSink, progress: Progress) -> bool {
    sink.update(progress).is_continue()
}
