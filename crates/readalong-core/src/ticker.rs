//! Background timer that drives test mode.
//!
//! The ticker thread never touches a session. It only sends
//! [`TickInput::TestTimer`] messages tagged with the generation it was started
//! for; the owner drains the channel and feeds the ticks to the session on its
//! own thread. A tick that is still queued after the ticker is stopped carries
//! an outdated generation and the session drops it.

use crate::cancellation::CancellationToken;
use crate::session::TickInput;
use anyhow::{Context, Result};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

pub struct TestTicker {
    generation: u64,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl TestTicker {
    pub fn spawn(interval: Duration, generation: u64, sender: Sender<TickInput>) -> Result<Self> {
        let cancel = CancellationToken::new();
        let thread_cancel = cancel.clone();
        let handle = std::thread::Builder::new()
            .name(format!("test-ticker-{generation}"))
            .spawn(move || run(interval, generation, thread_cancel, sender))
            .context("failed to spawn test-mode ticker thread")?;
        info!(generation, interval_ms = interval.as_millis() as u64, "Started test-mode ticker");
        Ok(Self {
            generation,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel the timer and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!(generation = self.generation, "Test-mode ticker thread panicked");
            }
            info!(generation = self.generation, "Stopped test-mode ticker");
        }
    }
}

impl Drop for TestTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(interval: Duration, generation: u64, cancel: CancellationToken, sender: Sender<TickInput>) {
    loop {
        cancel.sleep(interval);
        if let Err(err) = cancel.check_cancelled("test_mode_tick") {
            debug!(generation, "{err}");
            break;
        }
        if sender.send(TickInput::TestTimer { generation }).is_err() {
            debug!(generation, "Tick receiver dropped; stopping test-mode ticker");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn emits_ticks_for_its_generation_until_stopped() {
        let (tx, rx) = mpsc::channel();
        let ticker = TestTicker::spawn(Duration::from_millis(5), 7, tx).expect("spawn ticker");
        let first = rx.recv_timeout(Duration::from_secs(2)).expect("first tick");
        assert!(matches!(first, TickInput::TestTimer { generation: 7 }));
        assert_eq!(ticker.generation(), 7);

        ticker.stop();
        // Drain whatever was queued before the stop; after that the channel
        // is closed because the thread owned the only sender.
        while rx.recv_timeout(Duration::from_millis(100)).is_ok() {}
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn stops_when_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel();
        let ticker = TestTicker::spawn(Duration::from_millis(1), 1, tx).expect("spawn ticker");
        drop(rx);
        ticker.stop();
    }
}
