//! Debounced scan scheduling
//!
//! Every repaint calls [`ScanTrigger::notify`]. The scan runs once the
//! screen has been quiet for the configured period; repaints arriving before
//! that restart the wait, so a burst of output yields a single scan. Scans run
//! on the trigger's own task and never overlap.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Capacity of the result channel handed back by [`ScanTrigger::spawn`]
const RESULT_BUFFER: usize = 16;

pub struct ScanTrigger {
    notify_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl ScanTrigger {
    /// Start the trigger task. Each completed scan's result is sent on the
    /// returned receiver.
    pub fn spawn<F, T>(quiet: Duration, scan_fn: F) -> (Self, mpsc::Receiver<T>)
    where
        F: FnMut() -> T + Send + 'static,
        T: Send + 'static,
    {
        // One slot: a pending repaint is a flag, not a queue
        let (notify_tx, notify_rx) = mpsc::channel(1);
        let (result_tx, result_rx) = mpsc::channel(RESULT_BUFFER);

        let handle = tokio::spawn(run(quiet, notify_rx, result_tx, scan_fn));

        (Self { notify_tx, handle }, result_rx)
    }

    /// Mark a repaint; (re)starts the quiet period
    pub fn notify(&self) {
        // Full means a repaint is already pending, which is the same signal
        if let Err(mpsc::error::TrySendError::Closed(_)) = self.notify_tx.try_send(()) {
            trace!("Scan trigger already stopped");
        }
    }

    /// Stop the task. A scan that has not started yet is dropped.
    pub async fn shutdown(self) {
        let Self { notify_tx, handle } = self;
        drop(notify_tx);
        let _ = handle.await;
        debug!("Scan trigger stopped");
    }
}

async fn run<F, T>(
    quiet: Duration,
    mut notify_rx: mpsc::Receiver<()>,
    result_tx: mpsc::Sender<T>,
    mut scan_fn: F,
) where
    F: FnMut() -> T + Send + 'static,
    T: Send + 'static,
{
    loop {
        if notify_rx.recv().await.is_none() {
            return;
        }

        // Wait out the quiet period, restarting on every new repaint
        loop {
            tokio::select! {
                msg = notify_rx.recv() => {
                    if msg.is_none() {
                        debug!("Scan trigger closed with a scan pending");
                        return;
                    }
                }
                _ = tokio::time::sleep(quiet) => break,
            }
        }

        let result = scan_fn();
        if result_tx.send(result).await.is_err() {
            debug!("Scan result receiver dropped, stopping trigger");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::{sleep, timeout, Instant};

    const QUIET: Duration = Duration::from_millis(50);

    fn counting_trigger() -> (ScanTrigger, mpsc::Receiver<usize>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let scans = count.clone();
        let (trigger, rx) = ScanTrigger::spawn(QUIET, move || scans.fetch_add(1, Ordering::SeqCst) + 1);
        (trigger, rx, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_repaint_scans_after_quiet_period() {
        let (trigger, mut rx, _) = counting_trigger();
        let start = Instant::now();

        trigger.notify();
        assert_eq!(rx.recv().await, Some(1));
        assert!(start.elapsed() >= QUIET);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_scan() {
        let (trigger, mut rx, count) = counting_trigger();
        let start = Instant::now();

        for _ in 0..5 {
            trigger.notify();
            sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(rx.recv().await, Some(1));
        // Last repaint at 40ms, plus the quiet period
        assert!(start.elapsed() >= Duration::from_millis(90));

        assert!(timeout(Duration::from_millis(500), rx.recv()).await.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_repaints_scan_separately() {
        let (trigger, mut rx, _) = counting_trigger();

        trigger.notify();
        assert_eq!(rx.recv().await, Some(1));

        sleep(Duration::from_millis(200)).await;
        trigger.notify();
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_repaint_no_scan() {
        let (_trigger, mut rx, count) = counting_trigger();
        assert!(timeout(Duration::from_secs(1), rx.recv()).await.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_scan() {
        let (trigger, mut rx, count) = counting_trigger();

        trigger.notify();
        trigger.shutdown().await;

        assert_eq!(rx.recv().await, None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_ends_task() {
        let (trigger, mut rx, _) = counting_trigger();
        drop(trigger);
        assert_eq!(rx.recv().await, None);
    }
}
