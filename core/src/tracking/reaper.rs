use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::prelude::{NavError, NavResult};
use crate::tracking::store::CollidableStore;

/// Owned handle to the background thread expiring stale perception.
///
/// The thread stops when `stop` is called, when the handle is dropped, or once the
/// store it watches has been dropped.
pub struct ReaperHandle {
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ReaperHandle {
    pub(crate) fn spawn(store: Weak<CollidableStore>, period: Duration) -> NavResult<Self> {
        let (shutdown, signal) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("collidable-reaper".into())
            .spawn(move || loop {
                match signal.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(store) = store.upgrade() else {
                            break;
                        };
                        store.reap_once();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|err| NavError::Reaper(format!("spawning reaper thread: {}", err)))?;

        Ok(Self {
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map_or(false, |thread| !thread.is_finished())
    }

    /// Signals the thread and waits for it to exit.
    pub fn stop(mut self) -> NavResult<()> {
        self.shutdown_and_join()
    }

    fn shutdown_and_join(&mut self) -> NavResult<()> {
        if let Some(shutdown) = self.shutdown.take() {
            // the thread may already be gone with its receiver
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| NavError::Reaper("reaper thread panicked".into()))?;
        }
        Ok(())
    }
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_and_join();
    }
}
