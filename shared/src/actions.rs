use crate::details::{
    CounterDetails, CurrentSearchResults, HeapProfileDetails, QuantizedLoad, QueryResponse,
    SearchSummary, SliceDetails, ThreadDesc,
};
use crate::state::{
    ApplicationState, EngineSource, LogsPagination, OmniboxState, SelectedTimeRange, Selection,
    Status, TraceTime, TrackConfig, VisibleState,
};
use crate::timestamped::Timestamped;
use serde::{Deserialize, Serialize};

// ===== UP MESSAGES =====

/// A named mutation request. Applying one always yields a complete
/// replacement snapshot on the controller side.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "args")]
pub enum Action {
    SetRoute { route: Option<String> },
    SetTraceTime(TraceTime),
    SetStatus(Status),

    AddEngine { id: String, source: EngineSource },
    SetEngineReady { engine_id: String, ready: bool },

    AddTrack {
        id: Option<String>,
        engine_id: String,
        kind: String,
        name: String,
        track_group: Option<String>,
        config: TrackConfig,
    },
    AddTrackGroup {
        id: String,
        engine_id: String,
        name: String,
        summary_track_id: String,
        collapsed: bool,
    },
    ToggleTrackGroupCollapsed { track_group_id: String },
    ToggleTrackPinned { track_id: String },

    ExecuteQuery { query_id: String, engine_id: String, query: String },
    DeleteQuery { query_id: String },

    AddNote { timestamp: f64, color: String },
    ChangeNoteColor { id: String, color: String },
    ChangeNoteText { id: String, text: String },
    RemoveNote { id: String },

    SelectNote { id: String },
    SelectSlice { id: u64 },
    SelectCounter { left_ts: f64, right_ts: f64, id: u64 },
    SelectHeapProfile { id: u64, upid: u32, ts: f64 },
    SelectChromeSlice { id: u64 },
    SelectThreadState { utid: u32, ts: f64, dur: f64, state: String, cpu: u32 },
    DeselectAll,

    ShowHeapProfileFlamegraph { id: u64, upid: u32, ts: f64 },
    HideHeapProfileFlamegraph,

    SetVisibleTraceTime(Timestamped<VisibleState>),
    SetOmnibox(Timestamped<OmniboxState>),
    SetSelectedTimeRange(Timestamped<SelectedTimeRange>),

    UpdateLogsPagination(LogsPagination),
}

impl Action {
    /// The selection this action installs, if it is a selection action.
    /// `Some(None)` means the action clears the selection.
    pub fn selection(&self) -> Option<Option<Selection>> {
        let selection = match self {
            Action::SelectNote { id } => Selection::Note { id: id.clone() },
            Action::SelectSlice { id } => Selection::Slice { id: *id },
            Action::SelectCounter { left_ts, right_ts, id } => Selection::Counter {
                left_ts: *left_ts,
                right_ts: *right_ts,
                id: *id,
            },
            Action::SelectHeapProfile { id, upid, ts } => Selection::HeapProfile {
                id: *id,
                upid: *upid,
                ts: *ts,
            },
            Action::SelectChromeSlice { id } => Selection::ChromeSlice { id: *id },
            Action::SelectThreadState { utid, ts, dur, state, cpu } => Selection::ThreadState {
                utid: *utid,
                ts: *ts,
                dur: *dur,
                state: state.clone(),
                cpu: *cpu,
            },
            Action::DeselectAll => return Some(None),
            _ => return None,
        };
        Some(Some(selection))
    }

    /// Short label for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetRoute { .. } => "SetRoute",
            Action::SetTraceTime(_) => "SetTraceTime",
            Action::SetStatus(_) => "SetStatus",
            Action::AddEngine { .. } => "AddEngine",
            Action::SetEngineReady { .. } => "SetEngineReady",
            Action::AddTrack { .. } => "AddTrack",
            Action::AddTrackGroup { .. } => "AddTrackGroup",
            Action::ToggleTrackGroupCollapsed { .. } => "ToggleTrackGroupCollapsed",
            Action::ToggleTrackPinned { .. } => "ToggleTrackPinned",
            Action::ExecuteQuery { .. } => "ExecuteQuery",
            Action::DeleteQuery { .. } => "DeleteQuery",
            Action::AddNote { .. } => "AddNote",
            Action::ChangeNoteColor { .. } => "ChangeNoteColor",
            Action::ChangeNoteText { .. } => "ChangeNoteText",
            Action::RemoveNote { .. } => "RemoveNote",
            Action::SelectNote { .. } => "SelectNote",
            Action::SelectSlice { .. } => "SelectSlice",
            Action::SelectCounter { .. } => "SelectCounter",
            Action::SelectHeapProfile { .. } => "SelectHeapProfile",
            Action::SelectChromeSlice { .. } => "SelectChromeSlice",
            Action::SelectThreadState { .. } => "SelectThreadState",
            Action::DeselectAll => "DeselectAll",
            Action::ShowHeapProfileFlamegraph { .. } => "ShowHeapProfileFlamegraph",
            Action::HideHeapProfileFlamegraph => "HideHeapProfileFlamegraph",
            Action::SetVisibleTraceTime(_) => "SetVisibleTraceTime",
            Action::SetOmnibox(_) => "SetOmnibox",
            Action::SetSelectedTimeRange(_) => "SetSelectedTimeRange",
            Action::UpdateLogsPagination(_) => "UpdateLogsPagination",
        }
    }
}

// ===== DOWN MESSAGES =====

/// Messages from the background context to the rendering context.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum DownMsg {
    /// A complete replacement snapshot, never a patch.
    StateUpdated(Box<ApplicationState>),
    ThreadsPublished(Vec<ThreadDesc>),
    QueryResultPublished(QueryResponse),
    OverviewPublished { source_id: String, loads: Vec<QuantizedLoad> },
    /// Track-kind specific payload; only the owning track knows its shape.
    TrackDataPublished { track_id: String, data: serde_json::Value },
    SliceDetailsPublished(SliceDetails),
    CounterDetailsPublished(CounterDetails),
    HeapProfileDetailsPublished(HeapProfileDetails),
    SearchResultsPublished(CurrentSearchResults),
    SearchSummaryPublished(SearchSummary),
    LogsPresenceChanged(bool),
    LoadingChanged(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_actions_map_to_selections() {
        assert_eq!(
            Action::SelectSlice { id: 42 }.selection(),
            Some(Some(Selection::Slice { id: 42 }))
        );
        assert_eq!(Action::DeselectAll.selection(), Some(None));
        assert_eq!(Action::HideHeapProfileFlamegraph.selection(), None);
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let json = serde_json::to_value(Action::SelectSlice { id: 3 }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "SelectSlice", "args": {"id": 3}})
        );
        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(back.name(), "SelectSlice");
    }
}
