//! Repeating tasks with cancellable handles
//!
//! [`FrameScheduler`] is the rendering-thread implementation: nothing runs on its own,
//! the host calls [`FrameScheduler::pump`] once per frame and due ticks run inline. This
//! serializes animation ticks with gesture handling without any locking of the camera.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use instant::Instant;

pub type Tick = Box<dyn FnMut() -> ControlFlow<()> + Send>;

/// Handle to a scheduled repeating task
#[derive(Debug, Clone, Default)]
pub struct RepeatingTask {
    cancelled: Arc<AtomicBool>,
}

impl RepeatingTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub trait Scheduler: Send + Sync {
    /// Run `tick` every `interval` until it breaks or the handle is cancelled
    fn schedule_repeating(&self, interval: Duration, tick: Tick) -> RepeatingTask;
}

struct Entry {
    handle: RepeatingTask,
    interval: Duration,
    due: Instant,
    tick: Tick,
}

/// Frame-pumped scheduler; clones share the same queue
#[derive(Clone, Default)]
pub struct FrameScheduler {
    queue: Arc<Mutex<Vec<Entry>>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every due tick in scheduling order. Returns how many ran.
    pub fn pump(&self, now: Instant) -> usize {
        profiling::scope!("FrameScheduler::pump");
        // Taken out so ticks may schedule new tasks without deadlocking
        let mut entries = match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        let mut ran = 0;
        entries.retain_mut(|entry| {
            if entry.handle.is_cancelled() {
                return false;
            }
            if now < entry.due {
                return true;
            }
            ran += 1;
            match (entry.tick)() {
                ControlFlow::Continue(()) if !entry.handle.is_cancelled() => {
                    entry.due = now + entry.interval;
                    true
                }
                _ => false,
            }
        });

        match self.queue.lock() {
            Ok(mut queue) => {
                entries.append(&mut queue);
                *queue = entries;
            }
            Err(poisoned) => {
                let mut queue = poisoned.into_inner();
                entries.append(&mut queue);
                *queue = entries;
            }
        }
        ran
    }

    /// Earliest pending deadline, for scheduling the next repaint
    pub fn next_deadline(&self) -> Option<Instant> {
        let queue = self.queue.lock().ok()?;
        queue
            .iter()
            .filter(|e| !e.handle.is_cancelled())
            .map(|e| e.due)
            .min()
    }

    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .map(|q| q.iter().filter(|e| !e.handle.is_cancelled()).count())
            .unwrap_or(0)
    }
}

impl Scheduler for FrameScheduler {
    fn schedule_repeating(&self, interval: Duration, tick: Tick) -> RepeatingTask {
        let handle = RepeatingTask::new();
        let entry = Entry {
            handle: handle.clone(),
            interval,
            due: Instant::now() + interval,
            tick,
        };
        match self.queue.lock() {
            Ok(mut queue) => queue.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
        handle
    }
}
