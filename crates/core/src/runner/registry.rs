use std::collections::HashMap;
use std::process::Child;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crate::shared::constants::STOP_GRACE_PERIOD;

/// The set of currently running external process handles.
///
/// A handle is registered immediately after spawn, before any of its
/// output is consumed, so a concurrent stop request is never lost. It
/// is removed when the process reports exit, or by `stop_all`. The
/// registry therefore only ever contains processes that have not yet
/// reported exit.
#[derive(Default)]
pub struct ProcessRegistry {
    children: Mutex<HashMap<u32, Child>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spawned child. Returns its pid for later removal.
    pub fn register(&self, child: Child) -> u32 {
        let pid = child.id();
        self.children.lock().unwrap().insert(pid, child);
        pid
    }

    /// Take a child back out of the registry. Returns `None` if
    /// `stop_all` already claimed it.
    pub fn remove(&self, pid: u32) -> Option<Child> {
        self.children.lock().unwrap().remove(&pid)
    }

    pub fn active_count(&self) -> usize {
        self.children.lock().unwrap().len()
    }

    /// Stop every registered process: request termination, wait up to
    /// the grace period for it to exit, and log anything that refuses.
    ///
    /// Every handle is removed from the registry regardless of outcome,
    /// and per-handle errors never abort the sweep. Calling this with
    /// an empty registry is a no-op. Returns how many live processes
    /// were told to stop.
    pub fn stop_all(&self) -> usize {
        let drained: Vec<(u32, Child)> = {
            let mut children = self.children.lock().unwrap();
            children.drain().collect()
        };

        let mut stopped = 0;
        for (pid, mut child) in drained {
            match child.try_wait() {
                Ok(Some(_)) => continue, // already exited
                Ok(None) => {}
                Err(e) => {
                    log::warn!("could not poll process {pid}: {e}");
                    continue;
                }
            }

            if let Err(e) = child.kill() {
                log::warn!("could not terminate process {pid}: {e}");
                continue;
            }
            stopped += 1;

            let deadline = Instant::now() + STOP_GRACE_PERIOD;
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => {
                        log::info!("process {pid} stopped ({status})");
                        break;
                    }
                    Ok(None) if Instant::now() < deadline => {
                        thread::sleep(Duration::from_millis(50));
                    }
                    Ok(None) => {
                        log::warn!("process {pid} did not exit within the grace period");
                        break;
                    }
                    Err(e) => {
                        log::warn!("lost track of process {pid}: {e}");
                        break;
                    }
                }
            }
        }
        stopped
    }
}
