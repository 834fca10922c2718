//! Redraw scheduling
//!
//! Writers only *request* a redraw; the host calls [`RedrawScheduler::frame`]
//! once per animation frame and repaints if anything was requested since the
//! previous frame. Any number of requests within one frame coalesce into a
//! single repaint of the strongest requested kind.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

const NOTHING_PENDING: u8 = 0;

/// How much of the UI must be repainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RedrawKind {
    /// Timeline canvas only.
    Canvas = 1,
    /// Canvas plus the widget tree around it.
    Full = 2,
}

impl RedrawKind {
    fn from_pending(value: u8) -> Option<Self> {
        match value {
            1 => Some(RedrawKind::Canvas),
            2 => Some(RedrawKind::Full),
            _ => None,
        }
    }
}

type RedrawCallback = Arc<dyn Fn(RedrawKind) + Send + Sync>;

pub struct RedrawScheduler {
    pending: AtomicU8,
    running: AtomicBool,
    frames_rendered: AtomicU64,
    callbacks: Mutex<Vec<RedrawCallback>>,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self {
            pending: AtomicU8::new(NOTHING_PENDING),
            running: AtomicBool::new(true),
            frames_rendered: AtomicU64::new(0),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Requests a canvas repaint on the next frame.
    pub fn schedule_redraw(&self) {
        self.request(RedrawKind::Canvas);
    }

    /// Requests a repaint of the canvas and the widget tree on the next frame.
    pub fn schedule_full_redraw(&self) {
        self.request(RedrawKind::Full);
    }

    fn request(&self, kind: RedrawKind) {
        if !self.running.load(Ordering::Acquire) {
            log::debug!("Redraw requested after shutdown, ignoring");
            return;
        }
        self.pending.fetch_max(kind as u8, Ordering::AcqRel);
    }

    /// Strongest redraw requested since the last frame, without consuming it.
    pub fn pending(&self) -> Option<RedrawKind> {
        RedrawKind::from_pending(self.pending.load(Ordering::Acquire))
    }

    /// Registers a callback run once per rendered frame.
    pub fn add_redraw_callback(&self, callback: impl Fn(RedrawKind) + Send + Sync + 'static) {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(callback));
    }

    /// Consumes pending requests and runs the redraw callbacks if there were
    /// any. Returns the kind of redraw performed.
    ///
    /// Callbacks run outside the lock, so they may register further callbacks
    /// or request the next frame. A callback added during a frame first runs
    /// on the following one.
    pub fn frame(&self) -> Option<RedrawKind> {
        if !self.running.load(Ordering::Acquire) {
            return None;
        }
        let kind = RedrawKind::from_pending(self.pending.swap(NOTHING_PENDING, Ordering::AcqRel))?;

        let callbacks: Vec<RedrawCallback> = self
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for callback in &callbacks {
            callback(kind);
        }
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
        Some(kind)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops scheduling. Pending and future requests are dropped.
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            self.pending.store(NOTHING_PENDING, Ordering::Release);
            log::debug!(
                "Redraw scheduler stopped after {} frame(s)",
                self.frames_rendered()
            );
        }
    }
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RedrawScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedrawScheduler")
            .field("pending", &self.pending())
            .field("running", &self.is_running())
            .field("frames_rendered", &self.frames_rendered())
            .finish()
    }
}
