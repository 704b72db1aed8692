use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::StreamerConfig;
use crate::error::{BackendResult, SetupError};

use super::{AsyncContext, TerminationFlag};

/// The part of a scene backend that may run on the streaming thread.
///
/// Implementations must tolerate `process` running concurrently with
/// render-thread mutation of the scene they stream for.
pub trait StreamSource: Send + Sync {
    /// One round of streaming work. `Ok(false)` means nothing was processed;
    /// it is not an error.
    fn process(&self, async_ctx: &mut AsyncContext) -> BackendResult<bool>;

    /// False once the underlying handle is gone.
    fn is_valid(&self) -> bool {
        true
    }

    fn is_terminated(&self) -> bool {
        false
    }
}

/// Counters collected by the streaming thread over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamerReport {
    pub iterations: u64,
    /// Rounds where the source did work.
    pub processed: u64,
    /// Tasks run from the streaming async context.
    pub tasks: u64,
    pub idle_backoffs: u64,
    pub failures: u64,
}

/// Handle to the background streaming thread.
///
/// Dropping it without `join` raises the termination flag and waits for the
/// thread, so streaming never outlives the scene state it reads.
pub struct Streamer {
    flag: TerminationFlag,
    handle: Option<JoinHandle<StreamerReport>>,
}

impl Streamer {
    pub fn spawn(
        source: Arc<dyn StreamSource>,
        async_ctx: AsyncContext,
        flag: TerminationFlag,
        config: &StreamerConfig,
    ) -> Result<Self, SetupError> {
        let backoff = config.backoff();
        let thread_flag = flag.clone();
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || stream_loop(source, async_ctx, thread_flag, backoff))
            .map_err(SetupError::Spawn)?;

        log::info!("streaming thread '{}' started", config.thread_name);
        Ok(Self {
            flag,
            handle: Some(handle),
        })
    }

    pub fn flag(&self) -> &TerminationFlag {
        &self.flag
    }

    pub fn request_stop(&self) {
        self.flag.set();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Requests termination and waits for the thread.
    pub fn join(mut self) -> StreamerReport {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> StreamerReport {
        self.flag.set();
        match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(report) => report,
                Err(_) => {
                    log::error!("streaming thread panicked");
                    StreamerReport::default()
                }
            },
            None => StreamerReport::default(),
        }
    }
}

impl Drop for Streamer {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop_and_join();
        }
    }
}

fn stream_loop(
    source: Arc<dyn StreamSource>,
    mut async_ctx: AsyncContext,
    flag: TerminationFlag,
    backoff: Duration,
) -> StreamerReport {
    let mut report = StreamerReport::default();

    while !flag.is_set() && !source.is_terminated() && source.is_valid() {
        report.iterations += 1;

        let processed = match source.process(&mut async_ctx) {
            Ok(did_work) => did_work,
            Err(err) => {
                log::warn!("streaming pass failed, retrying: {err}");
                report.failures += 1;
                false
            }
        };
        if processed {
            report.processed += 1;
        }

        let tasks = async_ctx.pump(usize::MAX);
        report.tasks += tasks as u64;

        if !processed && tasks == 0 {
            report.idle_backoffs += 1;
            thread::sleep(backoff);
        }
    }

    log::info!(
        "streaming thread done after {} iteration(s), {} processed",
        report.iterations,
        report.processed
    );
    report
}
