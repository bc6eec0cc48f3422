// File: src/observer.rs
//! Debounced re-translation on DOM growth.
//!
//! [`MutationObserver`] is the cheap, cloneable notification side held by
//! whatever mutates the tree. [`RetranslateScheduler`] owns the timer: every
//! notification pushes the deadline back by the debounce delay, and a pass
//! runs once the tree has been quiet for that long. Passes run inline in the
//! scheduler loop, so two passes never overlap; notifications that arrive
//! during a pass schedule the next one.

use crate::core::dom;
use markup5ever_rcdom::Handle;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

pub fn channel(delay: Duration) -> (MutationObserver, RetranslateScheduler) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MutationObserver { tx }, RetranslateScheduler { rx, delay })
}

#[derive(Debug, Clone)]
pub struct MutationObserver {
    tx: mpsc::UnboundedSender<usize>,
}

impl MutationObserver {
    /// Reports a batch of added nodes. Silently ignored once the scheduler is gone.
    pub fn nodes_added(&self, count: usize) {
        if count > 0 && self.tx.send(count).is_err() {
            trace!("scheduler stopped, mutation dropped");
        }
    }

    /// Appends `child` under `parent` and reports the addition.
    pub fn append(&self, parent: &Handle, child: Handle) {
        dom::append_child(parent, child);
        self.nodes_added(1);
    }
}

pub struct RetranslateScheduler {
    rx: mpsc::UnboundedReceiver<usize>,
    delay: Duration,
}

impl RetranslateScheduler {
    /// Runs until every observer is dropped, calling `pass` after each quiet
    /// period. A pending pass is flushed when the last observer goes away.
    /// Returns the number of passes run.
    pub async fn run(mut self, mut pass: impl FnMut()) -> usize {
        let mut passes = 0;
        while let Some(first) = self.rx.recv().await {
            let mut pending = first;
            let timer = sleep(self.delay);
            tokio::pin!(timer);

            let closed = loop {
                tokio::select! {
                    () = &mut timer => break false,
                    batch = self.rx.recv() => match batch {
                        Some(count) => {
                            pending += count;
                            timer.as_mut().reset(Instant::now() + self.delay);
                        }
                        None => break true,
                    },
                }
            };

            debug!(added = pending, "re-translating after DOM changes");
            pass();
            passes += 1;
            if closed {
                break;
            }
        }
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_one_pass() {
        let (observer, scheduler) = channel(Duration::from_millis(300));
        let start = Instant::now();
        let fired = RefCell::new(Vec::new());

        let producer = async move {
            for _ in 0..4 {
                observer.nodes_added(1);
                sleep(Duration::from_millis(100)).await;
            }
            sleep(Duration::from_millis(1_000)).await;
        };
        let (passes, ()) = tokio::join!(scheduler.run(|| fired.borrow_mut().push(start.elapsed())), producer);

        assert_eq!(passes, 1);
        // last notification at 300ms, quiet period 300ms
        assert_eq!(fired.borrow()[0], Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn separated_bursts_each_get_a_pass() {
        let (observer, scheduler) = channel(Duration::from_millis(300));
        let producer = async move {
            observer.nodes_added(2);
            sleep(Duration::from_millis(500)).await;
            observer.nodes_added(1);
            sleep(Duration::from_millis(500)).await;
        };
        let (passes, ()) = tokio::join!(scheduler.run(|| {}), producer);
        assert_eq!(passes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_pass_flushes_on_close() {
        let (observer, scheduler) = channel(Duration::from_millis(300));
        observer.nodes_added(1);
        drop(observer);
        assert_eq!(scheduler.run(|| {}).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_count_is_not_a_mutation() {
        let (observer, scheduler) = channel(Duration::from_millis(300));
        observer.nodes_added(0);
        drop(observer);
        assert_eq!(scheduler.run(|| {}).await, 0);
    }
}
