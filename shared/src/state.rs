use crate::timestamped::Timestamped;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Track group that holds every track not claimed by another group.
pub const SCROLLING_TRACK_GROUP: &str = "ScrollingTracks";

pub const DEFAULT_TRACE_START_SEC: f64 = 0.0;
pub const DEFAULT_TRACE_END_SEC: f64 = 10.0;

/// Keyed collection; the key is always the item's own `id`.
pub type ObjectById<T> = IndexMap<String, T>;

// ===== LOCAL STATE GROUPS =====

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OmniboxMode {
    #[default]
    Search,
    Command,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct OmniboxState {
    pub omnibox: String,
    pub mode: OmniboxMode,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisibleState {
    pub start_sec: f64,
    pub end_sec: f64,
    /// Seconds per pixel at the current zoom level.
    pub resolution: f64,
}

impl Default for VisibleState {
    fn default() -> Self {
        Self {
            start_sec: DEFAULT_TRACE_START_SEC,
            end_sec: DEFAULT_TRACE_END_SEC,
            resolution: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectedTimeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_sec: Option<f64>,
}

impl SelectedTimeRange {
    pub fn is_empty(&self) -> bool {
        self.start_sec.is_none() && self.end_sec.is_none()
    }
}

/// State written by the frontend at input rate and synchronized with the
/// controller at a lower rate. Each group merges independently.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FrontendLocalState {
    pub omnibox_state: Timestamped<OmniboxState>,
    pub visible_state: Timestamped<VisibleState>,
    pub selected_time_range: Timestamped<SelectedTimeRange>,
}

// ===== TRACE MODEL =====

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraceTime {
    pub start_sec: f64,
    pub end_sec: f64,
}

impl Default for TraceTime {
    fn default() -> Self {
        Self {
            start_sec: DEFAULT_TRACE_START_SEC,
            end_sec: DEFAULT_TRACE_END_SEC,
        }
    }
}

impl TraceTime {
    pub fn duration(&self) -> f64 {
        (self.end_sec - self.start_sec).max(0.0)
    }

    /// Both bounds finite and in order.
    pub fn is_valid(&self) -> bool {
        self.start_sec.is_finite() && self.end_sec.is_finite() && self.start_sec <= self.end_sec
    }

    /// Clamps into the bounds. A NaN bound constrains nothing.
    pub fn clamp(&self, time_sec: f64) -> f64 {
        time_sec
            .max(self.start_sec)
            .min(self.end_sec.max(self.start_sec))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EngineSource {
    Url(String),
    File(PathBuf),
    Buffer(Vec<u8>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub id: String,
    pub ready: bool,
    pub source: EngineSource,
}

/// Kind-specific track configuration. Its schema is owned by the track
/// implementation, so the state core carries it untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct TrackConfig(pub serde_json::Value);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackState {
    pub id: String,
    pub engine_id: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_group: Option<String>,
    #[serde(default)]
    pub config: TrackConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackGroupState {
    pub id: String,
    pub engine_id: String,
    pub name: String,
    pub collapsed: bool,
    /// Child track ids.
    pub tracks: Vec<String>,
    pub summary_track_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    pub id: String,
    pub engine_id: String,
    pub query: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Status {
    pub msg: String,
    /// Epoch in seconds.
    pub timestamp: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub timestamp: f64,
    pub color: String,
    pub text: String,
    pub is_movie: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogsPagination {
    pub offset: u64,
    pub count: u64,
}

// ===== SELECTION =====

/// The single highlighted item. Adding a variant is a compile error at every
/// exhaustive match until the panel mapping handles it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Selection {
    Note {
        id: String,
    },
    Slice {
        id: u64,
    },
    #[serde(rename_all = "camelCase")]
    Counter {
        left_ts: f64,
        right_ts: f64,
        id: u64,
    },
    HeapProfile {
        id: u64,
        upid: u32,
        ts: f64,
    },
    ChromeSlice {
        id: u64,
    },
    ThreadState {
        utid: u32,
        ts: f64,
        dur: f64,
        state: String,
        cpu: u32,
    },
}

impl Selection {
    pub fn kind(&self) -> SelectionKind {
        match self {
            Selection::Note { .. } => SelectionKind::Note,
            Selection::Slice { .. } => SelectionKind::Slice,
            Selection::Counter { .. } => SelectionKind::Counter,
            Selection::HeapProfile { .. } => SelectionKind::HeapProfile,
            Selection::ChromeSlice { .. } => SelectionKind::ChromeSlice,
            Selection::ThreadState { .. } => SelectionKind::ThreadState,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    Note,
    Slice,
    Counter,
    HeapProfile,
    ChromeSlice,
    ThreadState,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HeapProfileFlamegraph {
    pub id: u64,
    pub upid: u32,
    pub ts: f64,
}

// ===== APPLICATION STATE =====

/// The authoritative snapshot. Replaced wholesale; never patched from outside
/// the reducer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub route: Option<String>,
    pub next_id: u64,
    pub engines: ObjectById<EngineConfig>,
    pub trace_time: TraceTime,
    pub track_groups: ObjectById<TrackGroupState>,
    pub tracks: ObjectById<TrackState>,
    pub visible_tracks: Vec<String>,
    pub scrolling_tracks: Vec<String>,
    pub pinned_tracks: Vec<String>,
    pub queries: ObjectById<QueryConfig>,
    pub notes: ObjectById<Note>,
    pub status: Status,
    pub current_selection: Option<Selection>,
    pub current_heap_profile_flamegraph: Option<HeapProfileFlamegraph>,
    pub logs_pagination: LogsPagination,
    pub frontend_local_state: FrontendLocalState,
}

impl Default for ApplicationState {
    fn default() -> Self {
        create_empty_state()
    }
}

pub fn create_empty_state() -> ApplicationState {
    ApplicationState {
        route: None,
        next_id: 0,
        engines: ObjectById::new(),
        trace_time: TraceTime::default(),
        track_groups: ObjectById::new(),
        tracks: ObjectById::new(),
        visible_tracks: Vec::new(),
        scrolling_tracks: Vec::new(),
        pinned_tracks: Vec::new(),
        queries: ObjectById::new(),
        notes: ObjectById::new(),
        status: Status::default(),
        current_selection: None,
        current_heap_profile_flamegraph: None,
        logs_pagination: LogsPagination::default(),
        frontend_local_state: FrontendLocalState::default(),
    }
}

impl ApplicationState {
    /// Allocates the next id for generated items (notes, tracks, queries).
    pub fn allocate_id(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        id
    }
}

/// Parent group of `track_id`. A group id that names no existing group is
/// treated as no parent.
pub fn containing_track_group<'a>(state: &'a ApplicationState, track_id: &str) -> Option<&'a str> {
    let parent_id = state.tracks.get(track_id)?.track_group.as_deref()?;
    state
        .track_groups
        .get_key_value(parent_id)
        .map(|(id, _)| id.as_str())
}
