use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Named task queue drained by a single owner.
///
/// Enqueueing is possible from any thread through an `AsyncSender`; draining
/// requires `&mut self`, and the receiver is never handed out, so only the
/// owning thread ever runs the queued tasks.
pub struct AsyncContext {
    name: &'static str,
    tx: Sender<Task>,
    rx: Receiver<Task>,
    completed: u64,
}

/// Cloneable enqueue handle for an `AsyncContext`.
#[derive(Clone)]
pub struct AsyncSender {
    name: &'static str,
    tx: Sender<Task>,
}

impl AsyncContext {
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            name,
            tx,
            rx,
            completed: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sender(&self) -> AsyncSender {
        AsyncSender {
            name: self.name,
            tx: self.tx.clone(),
        }
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // Cannot fail: `self` holds the receiver.
        let _ = self.tx.send(Box::new(task));
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Total tasks run by this context.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Runs up to `max` queued tasks. Tasks enqueued while pumping wait for the
    /// next call. Returns the number run.
    pub fn pump(&mut self, max: usize) -> usize {
        let budget = max.min(self.rx.len());
        let mut ran = 0;
        while ran < budget {
            match self.rx.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.completed += ran as u64;
        ran
    }

    /// Runs queued tasks until the queue is empty, including tasks enqueued by
    /// the tasks themselves.
    pub fn flush(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        self.completed += ran as u64;
        log::debug!("async context '{}' flushed {} task(s)", self.name, ran);
        ran
    }
}

impl std::fmt::Debug for AsyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncContext")
            .field("name", &self.name)
            .field("pending", &self.rx.len())
            .field("completed", &self.completed)
            .finish()
    }
}

impl AsyncSender {
    /// Enqueues `task`. Returns false if the owning context is gone.
    pub fn send<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }

    pub fn context_name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for AsyncSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSender").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn pump_respects_budget_and_defers_nested_tasks() {
        let mut ctx = AsyncContext::new("frame");
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = hits.clone();
            ctx.spawn(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        let sender = ctx.sender();
        let nested_hits = hits.clone();
        ctx.spawn(move || {
            let hits = nested_hits.clone();
            sender.send(move || {
                hits.fetch_add(10, Ordering::SeqCst);
            });
        });

        assert_eq!(ctx.pump(2), 2);
        assert_eq!(ctx.pending(), 2);
        assert_eq!(ctx.pump(usize::MAX), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(ctx.pending(), 1);

        assert_eq!(ctx.flush(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 13);
        assert_eq!(ctx.completed(), 5);
    }

    #[test]
    fn sender_works_across_threads() {
        let mut ctx = AsyncContext::new("stream");
        let sender = ctx.sender();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        std::thread::spawn(move || {
            for _ in 0..8 {
                let h = h.clone();
                assert!(sender.send(move || {
                    h.fetch_add(1, Ordering::SeqCst);
                }));
            }
        })
        .join()
        .unwrap();

        assert_eq!(ctx.flush(), 8);
        assert_eq!(hits.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn send_fails_after_context_is_dropped() {
        let ctx = AsyncContext::new("gone");
        let sender = ctx.sender();
        drop(ctx);
        assert!(!sender.send(|| {}));
    }
}
