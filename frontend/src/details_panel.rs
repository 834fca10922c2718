//! Details panel composition
//!
//! Maps the current selection to at most one detail panel and owns the
//! panel's height, which the drag handle below the timeline resizes.
//!
//! Height rules:
//! - never below the drag handle height (the fully collapsed panel)
//! - pops up to the default height when content first appears while collapsed
//! - keeps its value while the panel is hidden

use crate::config::DetailsPanelConfig;
use crate::dragging::DragTarget;
use crate::redraw::RedrawScheduler;
use shared::{ApplicationState, Selection};
use std::sync::Arc;

pub const UP_ICON: &str = "keyboard_arrow_up";
pub const DOWN_ICON: &str = "keyboard_arrow_down";
pub const HANDLE_TITLE: &str = "Current Selection";

/// Whether the trace contains log entries to fall back on when nothing is
/// selected.
pub trait LogPresence {
    fn has_logs(&self) -> bool;
}

impl LogPresence for bool {
    fn has_logs(&self) -> bool {
        *self
    }
}

/// The one panel to construct, with the parameters it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelDescriptor {
    NotesEditor {
        id: String,
    },
    SliceDetails,
    CounterDetails,
    HeapProfileDetails,
    ChromeSliceDetails,
    ThreadState {
        utid: u32,
        ts: f64,
        dur: f64,
        state: String,
        cpu: u32,
    },
    Log,
}

impl PanelDescriptor {
    /// Stable identity so the host can reuse a panel across renders.
    pub fn key(&self) -> &'static str {
        match self {
            PanelDescriptor::NotesEditor { .. } => "notes",
            PanelDescriptor::SliceDetails => "slice",
            PanelDescriptor::CounterDetails => "counter",
            PanelDescriptor::HeapProfileDetails => "heap_profile",
            PanelDescriptor::ChromeSliceDetails => "chrome_slice",
            PanelDescriptor::ThreadState { .. } => "thread_state",
            PanelDescriptor::Log => "log",
        }
    }
}

/// Write-only consumer of a panel descriptor.
pub trait PanelRenderer {
    fn render(&mut self, panel: &PanelDescriptor);
}

/// Panel for the current selection. With nothing selected the log panel is
/// shown if the trace has logs, otherwise no panel at all.
#[deny(clippy::wildcard_enum_match_arm)]
pub fn panel_for(selection: Option<&Selection>, has_logs: bool) -> Option<PanelDescriptor> {
    let Some(selection) = selection else {
        return has_logs.then_some(PanelDescriptor::Log);
    };
    let panel = match selection {
        Selection::Note { id } => PanelDescriptor::NotesEditor { id: id.clone() },
        Selection::Slice { .. } => PanelDescriptor::SliceDetails,
        Selection::Counter { .. } => PanelDescriptor::CounterDetails,
        Selection::HeapProfile { .. } => PanelDescriptor::HeapProfileDetails,
        Selection::ChromeSlice { .. } => PanelDescriptor::ChromeSliceDetails,
        Selection::ThreadState {
            utid,
            ts,
            dur,
            state,
            cpu,
        } => PanelDescriptor::ThreadState {
            utid: *utid,
            ts: *ts,
            dur: *dur,
            state: state.clone(),
            cpu: *cpu,
        },
    };
    Some(panel)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragHandleView {
    pub closed: bool,
    pub icon: &'static str,
    /// Tooltip of the toggle icon.
    pub title: &'static str,
    pub label: &'static str,
}

impl DragHandleView {
    fn new(closed: bool) -> Self {
        Self {
            closed,
            icon: if closed { UP_ICON } else { DOWN_ICON },
            title: if closed { "Show panel" } else { "Hide panel" },
            label: HANDLE_TITLE,
        }
    }
}

/// One render of the details area.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsView {
    pub panel: Option<PanelDescriptor>,
    pub height: f32,
    pub visible: bool,
    pub handle: DragHandleView,
}

impl DetailsView {
    pub fn render_into(&self, renderer: &mut impl PanelRenderer) {
        if let Some(panel) = &self.panel {
            renderer.render(panel);
        }
    }
}

pub struct DetailsPanel {
    config: DetailsPanelConfig,
    redraw: Arc<RedrawScheduler>,
    height: f32,
    /// Whether the previous render had a panel to show.
    showing: bool,
    closed: bool,
    drag_start_height: f32,
}

impl DetailsPanel {
    /// A hidden, fully collapsed panel. The first selection pops it open.
    pub fn new(config: DetailsPanelConfig, redraw: Arc<RedrawScheduler>) -> Self {
        Self {
            height: config.drag_handle_height,
            config,
            redraw,
            showing: false,
            closed: true,
            drag_start_height: config.drag_handle_height,
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub fn view(&mut self, state: &ApplicationState, logs: &impl LogPresence) -> DetailsView {
        let panel = panel_for(state.current_selection.as_ref(), logs.has_logs());

        let was_showing = self.showing;
        self.showing = panel.is_some();
        if !was_showing && self.showing && self.height == self.config.drag_handle_height {
            self.height = self.config.default_height;
        }
        self.closed = self.height <= self.config.drag_handle_height;

        DetailsView {
            panel,
            height: self.height,
            visible: self.showing,
            handle: DragHandleView::new(self.closed),
        }
    }

    pub fn drag_start(&mut self, _x: f32, _y: f32) {
        self.drag_start_height = self.height;
    }

    /// `y` is the pointer offset from the top of the drag handle.
    pub fn drag(&mut self, _x: f32, y: f32) {
        let handle = self.config.drag_handle_height;
        let new_height = (self.drag_start_height + handle / 2.0 - y).floor();
        self.closed = new_height <= handle;
        self.resize(new_height);
        self.redraw.schedule_full_redraw();
    }

    pub fn drag_end(&mut self) {
        log::debug!("Details panel resized to {}px", self.height);
    }

    /// Snaps between fully collapsed and the default height.
    pub fn toggle(&mut self) {
        if self.height == self.config.drag_handle_height {
            self.closed = false;
            self.resize(self.config.default_height);
        } else {
            self.closed = true;
            self.resize(self.config.drag_handle_height);
        }
        self.redraw.schedule_full_redraw();
    }

    pub fn resize(&mut self, height: f32) {
        if height.is_nan() {
            return;
        }
        self.height = height.max(self.config.drag_handle_height);
    }
}

impl DragTarget for DetailsPanel {
    fn on_drag_start(&mut self, x: f32, y: f32) {
        self.drag_start(x, y);
    }

    fn on_drag(&mut self, x: f32, y: f32) {
        self.drag(x, y);
    }

    fn on_drag_end(&mut self) {
        self.drag_end();
    }
}

impl std::fmt::Debug for DetailsPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailsPanel")
            .field("height", &self.height)
            .field("showing", &self.showing)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
