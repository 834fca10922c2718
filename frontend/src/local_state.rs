//! Frontend-local state container
//!
//! Holds the field groups the UI writes at input rate (omnibox, visible
//! window, selected time range) plus purely local UI fields. Every write
//! stamps its group, marks it for synchronization and requests a redraw.
//! The controller's copy is folded back in with last-writer-wins per group.

use crate::config::SyncConfig;
use crate::redraw::RedrawScheduler;
use crate::time_scale::{TimeScale, TimeSpan};
use shared::{
    Action, FrontendLocalState, OmniboxMode, OmniboxState, SelectedTimeRange, Timestamped,
    TraceTime, VisibleState, merge_into,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Smallest step between two successive local stamps, in seconds.
const MIN_STAMP_STEP_SEC: f64 = 1e-6;

/// Source of epoch timestamps, in seconds.
pub trait Clock: Send + Sync {
    fn now_sec(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_sec(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(now_sec: f64) -> Self {
        Self {
            bits: AtomicU64::new(now_sec.to_bits()),
        }
    }

    pub fn set(&self, now_sec: f64) {
        self.bits.store(now_sec.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, by: Duration) {
        self.set(self.now_sec() + by.as_secs_f64());
    }
}

impl Clock for ManualClock {
    fn now_sec(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

/// Groups written locally and not yet pushed to the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PendingSync {
    omnibox: bool,
    visible: bool,
    selected_time_range: bool,
}

impl PendingSync {
    fn any(&self) -> bool {
        self.omnibox || self.visible || self.selected_time_range
    }
}

pub struct LocalState {
    clock: Arc<dyn Clock>,
    redraw: Arc<RedrawScheduler>,
    sync_interval: Duration,

    trace_time: TraceTime,
    omnibox_state: Timestamped<OmniboxState>,
    visible_state: Timestamped<VisibleState>,
    selected_time_range: Timestamped<SelectedTimeRange>,
    time_scale: TimeScale,

    search_index: Option<usize>,
    total_search_results: usize,
    hovered_timestamp: Option<f64>,
    highlighted_slice_id: Option<u64>,
    sidebar_visible: bool,

    last_stamp: f64,
    pending: PendingSync,
    last_sync_sec: Option<f64>,
}

impl LocalState {
    pub fn new(redraw: Arc<RedrawScheduler>, clock: Arc<dyn Clock>, sync: SyncConfig) -> Self {
        let initial = FrontendLocalState::default();
        let time_scale = TimeScale::new(
            TimeSpan::new(initial.visible_state.start_sec, initial.visible_state.end_sec),
            0.0,
            0.0,
        );
        Self {
            clock,
            redraw,
            sync_interval: sync.interval(),
            trace_time: TraceTime::default(),
            omnibox_state: initial.omnibox_state,
            visible_state: initial.visible_state,
            selected_time_range: initial.selected_time_range,
            time_scale,
            search_index: None,
            total_search_results: 0,
            hovered_timestamp: None,
            highlighted_slice_id: None,
            sidebar_visible: true,
            last_stamp: 0.0,
            pending: PendingSync::default(),
            last_sync_sec: None,
        }
    }

    // ===== READ =====

    pub fn omnibox_state(&self) -> &Timestamped<OmniboxState> {
        &self.omnibox_state
    }

    pub fn visible_state(&self) -> &Timestamped<VisibleState> {
        &self.visible_state
    }

    pub fn selected_time_range(&self) -> &Timestamped<SelectedTimeRange> {
        &self.selected_time_range
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    pub fn trace_time(&self) -> TraceTime {
        self.trace_time
    }

    pub fn search_index(&self) -> Option<usize> {
        self.search_index
    }

    pub fn total_search_results(&self) -> usize {
        self.total_search_results
    }

    pub fn hovered_timestamp(&self) -> Option<f64> {
        self.hovered_timestamp
    }

    pub fn highlighted_slice_id(&self) -> Option<u64> {
        self.highlighted_slice_id
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    /// Seconds per pixel truncated to the closest lower power of two, so it
    /// only changes every few zoom levels. `None` until the timeline has a
    /// pixel width.
    pub fn cur_resolution(&self) -> Option<f64> {
        self.time_scale.power_of_two_resolution()
    }

    // ===== WRITE: SYNCHRONIZED GROUPS =====

    pub fn set_omnibox(&mut self, omnibox: impl Into<String>, mode: OmniboxMode) {
        let stamp = self.next_stamp();
        self.omnibox_state = Timestamped::new(
            OmniboxState {
                omnibox: omnibox.into(),
                mode,
            },
            stamp,
        );
        self.pending.omnibox = true;
        self.redraw.schedule_full_redraw();
    }

    /// Moves the visible window. Bounds are clamped into the trace; an end
    /// before the start collapses onto the start. Returns `false` when the
    /// input was not finite and nothing changed.
    pub fn update_visible_time(&mut self, start_sec: f64, end_sec: f64) -> bool {
        if !(start_sec.is_finite() && end_sec.is_finite()) {
            log::debug!("Ignoring non-finite visible window {}..{}", start_sec, end_sec);
            return false;
        }
        let start_sec = self.trace_time.clamp(start_sec);
        let end_sec = self.trace_time.clamp(end_sec).max(start_sec);

        self.time_scale.set_time_span(TimeSpan::new(start_sec, end_sec));
        self.write_visible_state(start_sec, end_sec);
        true
    }

    /// Resizes the timeline's pixel extent. The visible window is restamped
    /// only if its resolution changed.
    pub fn update_px_bounds(&mut self, start_px: f64, end_px: f64) {
        if !(start_px.is_finite() && end_px.is_finite()) {
            log::debug!("Ignoring non-finite pixel bounds {}..{}", start_px, end_px);
            return;
        }
        self.time_scale.set_px_bounds(start_px, end_px);
        if self.time_scale.delta_px_to_duration(1.0) != self.visible_state.resolution {
            let span = self.time_scale.time_span();
            self.write_visible_state(span.start, span.end);
        } else {
            self.redraw.schedule_redraw();
        }
    }

    fn write_visible_state(&mut self, start_sec: f64, end_sec: f64) {
        let stamp = self.next_stamp();
        self.visible_state = Timestamped::new(
            VisibleState {
                start_sec,
                end_sec,
                resolution: self.time_scale.delta_px_to_duration(1.0),
            },
            stamp,
        );
        self.pending.visible = true;
        self.redraw.schedule_redraw();
    }

    /// Selects `[start_sec, end_sec]`, clamped like the visible window.
    pub fn select_time_range(&mut self, start_sec: f64, end_sec: f64) -> bool {
        if !(start_sec.is_finite() && end_sec.is_finite()) {
            log::debug!("Ignoring non-finite time range {}..{}", start_sec, end_sec);
            return false;
        }
        let start_sec = self.trace_time.clamp(start_sec);
        let end_sec = self.trace_time.clamp(end_sec).max(start_sec);
        self.write_selected_time_range(SelectedTimeRange {
            start_sec: Some(start_sec),
            end_sec: Some(end_sec),
        });
        true
    }

    pub fn clear_selected_time_range(&mut self) {
        self.write_selected_time_range(SelectedTimeRange::default());
    }

    fn write_selected_time_range(&mut self, range: SelectedTimeRange) {
        let stamp = self.next_stamp();
        self.selected_time_range = Timestamped::new(range, stamp);
        self.pending.selected_time_range = true;
        self.redraw.schedule_redraw();
    }

    // ===== WRITE: LOCAL-ONLY FIELDS =====

    pub fn set_search_index(&mut self, index: Option<usize>) {
        self.search_index = index;
        self.redraw.schedule_redraw();
    }

    pub fn set_total_search_results(&mut self, total: usize) {
        self.total_search_results = total;
        if self.search_index.is_some_and(|index| index >= total) {
            self.search_index = None;
        }
        self.redraw.schedule_full_redraw();
    }

    /// Drops the highlighted search match; a fresh selection supersedes it.
    pub fn cancel_search(&mut self) {
        self.set_search_index(None);
    }

    pub fn set_hovered_timestamp(&mut self, timestamp: Option<f64>) {
        if timestamp.is_some_and(|ts| !ts.is_finite()) {
            return;
        }
        self.hovered_timestamp = timestamp;
        self.redraw.schedule_redraw();
    }

    pub fn set_highlighted_slice_id(&mut self, slice_id: Option<u64>) {
        self.highlighted_slice_id = slice_id;
        self.redraw.schedule_redraw();
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
        self.redraw.schedule_full_redraw();
    }

    // ===== SYNCHRONIZATION =====

    /// Folds the controller's copy into the local groups, keeping whichever
    /// side is newer per group. Also adopts the snapshot's trace bounds
    /// unless they are malformed.
    pub fn reconcile_with_authoritative(&mut self, trace_time: TraceTime, authoritative: &FrontendLocalState) {
        if trace_time.is_valid() {
            self.trace_time = trace_time;
        } else {
            log::warn!(
                "Keeping trace bounds {}..{}, snapshot carried {}..{}",
                self.trace_time.start_sec,
                self.trace_time.end_sec,
                trace_time.start_sec,
                trace_time.end_sec
            );
        }

        if merge_into(&mut self.omnibox_state, &authoritative.omnibox_state) {
            self.pending.omnibox = false;
        }
        if merge_into(&mut self.visible_state, &authoritative.visible_state) {
            self.pending.visible = false;
            self.time_scale.set_time_span(TimeSpan::new(
                self.visible_state.start_sec,
                self.visible_state.end_sec,
            ));
        }
        if merge_into(&mut self.selected_time_range, &authoritative.selected_time_range) {
            self.pending.selected_time_range = false;
        }

        for stamp in [
            self.omnibox_state.last_update,
            self.visible_state.last_update,
            self.selected_time_range.last_update,
        ] {
            if stamp > self.last_stamp {
                self.last_stamp = stamp;
            }
        }
    }

    pub fn has_pending_sync(&self) -> bool {
        self.pending.any()
    }

    /// Sync actions for every group written since the last push, or nothing
    /// if the previous push was less than one sync interval ago.
    pub fn take_sync_actions(&mut self) -> Vec<Action> {
        if !self.pending.any() {
            return Vec::new();
        }
        let now = self.clock.now_sec();
        let interval_sec = self.sync_interval.as_secs_f64();
        if self
            .last_sync_sec
            .is_some_and(|last_sync_sec| now - last_sync_sec < interval_sec)
        {
            return Vec::new();
        }

        let pending = std::mem::take(&mut self.pending);
        self.last_sync_sec = Some(now);

        let mut actions = Vec::new();
        if pending.omnibox {
            actions.push(Action::SetOmnibox(self.omnibox_state.clone()));
        }
        if pending.visible {
            actions.push(Action::SetVisibleTraceTime(self.visible_state.clone()));
        }
        if pending.selected_time_range {
            actions.push(Action::SetSelectedTimeRange(self.selected_time_range.clone()));
        }
        actions
    }

    /// Clock reading for a new write, always strictly after the previous
    /// stamp so two writes never tie under the merge rule.
    fn next_stamp(&mut self) -> f64 {
        let now = self.clock.now_sec();
        let stamp = if now.is_finite() && now > self.last_stamp {
            now
        } else {
            self.last_stamp + MIN_STAMP_STEP_SEC
        };
        self.last_stamp = stamp;
        stamp
    }
}

impl std::fmt::Debug for LocalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalState")
            .field("omnibox_state", &self.omnibox_state)
            .field("visible_state", &self.visible_state)
            .field("selected_time_range", &self.selected_time_range)
            .field("search_index", &self.search_index)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
