//! Guided-search mode: idle ⇄ searching, with a ~20 Hz animation clock
//!
//! Entering search mode snapshots the camera; leaving returns that exact snapshot for
//! the caller to restore. While searching, a repeating task advances the animation
//! clock and requests a redraw. The tick keeps itself alive only while the mode is
//! still active, and at most one task is live at a time.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use instant::Instant;

use crate::controller::CameraSnapshot;
use crate::model::MapBounds;
use crate::scheduler::{FrameScheduler, RepeatingTask, Scheduler};

/// 20 frames per second
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Default)]
struct AnimationState {
    searching: AtomicBool,
    elapsed_ms: AtomicU64,
}

pub struct SearchModeController {
    scheduler: Arc<dyn Scheduler>,
    state: Arc<AnimationState>,
    task: Option<RepeatingTask>,
    saved: Option<CameraSnapshot>,
    on_frame: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Default for SearchModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchModeController {
    /// Controller with a private [`FrameScheduler`] (ticks only run if something pumps it)
    pub fn new() -> Self {
        Self::with_scheduler(Arc::new(FrameScheduler::new()))
    }

    pub fn with_scheduler(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            state: Arc::default(),
            task: None,
            saved: None,
            on_frame: None,
        }
    }

    /// Redraw request issued on every animation tick
    pub fn set_on_frame(&mut self, callback: impl Fn() + Send + Sync + 'static) {
        self.on_frame = Some(Arc::new(callback));
    }

    /// Snapshot the camera, enter searching and start the animation loop
    pub fn start(&mut self, zoom: f64, bounds: MapBounds) {
        if let Some(previous) = self.task.take() {
            previous.cancel();
        }

        self.saved = Some(CameraSnapshot { zoom, bounds });
        self.state.searching.store(true, Ordering::SeqCst);
        self.state.elapsed_ms.store(0, Ordering::SeqCst);
        tracing::debug!(zoom, "Search mode started");

        let state = self.state.clone();
        let on_frame = self.on_frame.clone();
        let started = Instant::now();
        let task = self.scheduler.schedule_repeating(
            FRAME_INTERVAL,
            Box::new(move || {
                state
                    .elapsed_ms
                    .store(started.elapsed().as_millis() as u64, Ordering::SeqCst);
                if let Some(redraw) = &on_frame {
                    redraw();
                }
                if state.searching.load(Ordering::SeqCst) {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            }),
        );
        self.task = Some(task);
    }

    /// Leave searching and hand back the camera saved by [`start`](Self::start)
    ///
    /// Returns `None` if search mode was never started.
    pub fn stop(&mut self) -> Option<CameraSnapshot> {
        self.state.searching.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        let saved = self.saved.take();
        if saved.is_some() {
            tracing::debug!("Search mode stopped");
        }
        saved
    }

    pub fn is_searching(&self) -> bool {
        self.state.searching.load(Ordering::SeqCst)
    }

    /// Milliseconds since search mode started, as of the last tick
    pub fn animation_time(&self) -> u64 {
        self.state.elapsed_ms.load(Ordering::SeqCst)
    }
}

impl Drop for SearchModeController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}
