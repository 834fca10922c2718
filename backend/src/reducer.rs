//! Pure state transition: `(snapshot, action) -> snapshot`.
//!
//! The input snapshot is never touched; callers receive a fresh value and
//! publish it wholesale.

use shared::{
    Action, ApplicationState, EngineConfig, Note, QueryConfig, SCROLLING_TRACK_GROUP, Selection,
    TrackGroupState, TrackState, containing_track_group, merge_into,
};

const DEFAULT_NOTE_COLOR: &str = "#000000";

/// Applies `action` to a copy of `state` and returns the new snapshot.
pub fn apply(state: &ApplicationState, action: Action) -> ApplicationState {
    let mut next = state.clone();
    apply_in_place(&mut next, action);
    next
}

/// Applies a whole batch to one copy; used when the controller drains
/// several queued actions before publishing.
pub fn apply_all(state: &ApplicationState, actions: impl IntoIterator<Item = Action>) -> ApplicationState {
    let mut next = state.clone();
    for action in actions {
        apply_in_place(&mut next, action);
    }
    next
}

fn apply_in_place(state: &mut ApplicationState, action: Action) {
    match action {
        Action::SetRoute { route } => state.route = route,
        Action::SetTraceTime(trace_time) => {
            if !trace_time.is_valid() {
                log::warn!(
                    "Ignoring malformed trace time {}..{}",
                    trace_time.start_sec,
                    trace_time.end_sec
                );
                return;
            }
            state.trace_time = trace_time;
        }
        Action::SetStatus(status) => state.status = status,

        Action::AddEngine { id, source } => {
            state.engines.insert(
                id.clone(),
                EngineConfig {
                    id,
                    ready: false,
                    source,
                },
            );
        }
        Action::SetEngineReady { engine_id, ready } => match state.engines.get_mut(&engine_id) {
            Some(engine) => engine.ready = ready,
            None => log::warn!("SetEngineReady: unknown engine '{}'", engine_id),
        },

        Action::AddTrack {
            id,
            engine_id,
            kind,
            name,
            track_group,
            config,
        } => {
            let id = id.unwrap_or_else(|| state.allocate_id());
            if state.tracks.contains_key(&id) {
                log::debug!("AddTrack: replacing existing track '{}'", id);
                detach_track(state, &id);
            }
            let in_group = match track_group.as_deref() {
                Some(group_id) if group_id != SCROLLING_TRACK_GROUP => {
                    match state.track_groups.get_mut(group_id) {
                        Some(group) => {
                            group.tracks.push(id.clone());
                            true
                        }
                        None => {
                            log::debug!("AddTrack: track '{}' names missing group '{}'", id, group_id);
                            false
                        }
                    }
                }
                _ => false,
            };
            if !in_group && !state.pinned_tracks.contains(&id) {
                state.scrolling_tracks.push(id.clone());
            }
            state.tracks.insert(
                id.clone(),
                TrackState {
                    id,
                    engine_id,
                    kind,
                    name,
                    track_group,
                    config,
                },
            );
        }
        Action::AddTrackGroup {
            id,
            engine_id,
            name,
            summary_track_id,
            collapsed,
        } => {
            state.track_groups.insert(
                id.clone(),
                TrackGroupState {
                    id,
                    engine_id,
                    name,
                    collapsed,
                    tracks: Vec::new(),
                    summary_track_id,
                },
            );
        }
        Action::ToggleTrackGroupCollapsed { track_group_id } => {
            match state.track_groups.get_mut(&track_group_id) {
                Some(group) => group.collapsed = !group.collapsed,
                None => log::warn!("ToggleTrackGroupCollapsed: unknown group '{}'", track_group_id),
            }
        }
        Action::ToggleTrackPinned { track_id } => {
            if !state.tracks.contains_key(&track_id) {
                log::warn!("ToggleTrackPinned: unknown track '{}'", track_id);
                return;
            }
            // Grouped tracks stay listed in their group while pinned
            let in_group = containing_track_group(state, &track_id).is_some();
            if let Some(index) = state.pinned_tracks.iter().position(|id| *id == track_id) {
                state.pinned_tracks.remove(index);
                if !in_group && !state.scrolling_tracks.contains(&track_id) {
                    state.scrolling_tracks.insert(0, track_id);
                }
            } else {
                state.scrolling_tracks.retain(|id| *id != track_id);
                state.pinned_tracks.push(track_id);
            }
        }

        Action::ExecuteQuery {
            query_id,
            engine_id,
            query,
        } => {
            state.queries.insert(
                query_id.clone(),
                QueryConfig {
                    id: query_id,
                    engine_id,
                    query,
                },
            );
        }
        Action::DeleteQuery { query_id } => {
            state.queries.shift_remove(&query_id);
        }

        Action::AddNote { timestamp, color } => {
            let id = state.allocate_id();
            let color = if color.is_empty() {
                DEFAULT_NOTE_COLOR.to_string()
            } else {
                color
            };
            state.notes.insert(
                id.clone(),
                Note {
                    id,
                    timestamp,
                    color,
                    text: String::new(),
                    is_movie: false,
                },
            );
        }
        Action::ChangeNoteColor { id, color } => match state.notes.get_mut(&id) {
            Some(note) => note.color = color,
            None => log::warn!("ChangeNoteColor: unknown note '{}'", id),
        },
        Action::ChangeNoteText { id, text } => match state.notes.get_mut(&id) {
            Some(note) => note.text = text,
            None => log::warn!("ChangeNoteText: unknown note '{}'", id),
        },
        Action::RemoveNote { id } => {
            state.notes.shift_remove(&id);
            let selected = matches!(
                &state.current_selection,
                Some(Selection::Note { id: selected_id }) if *selected_id == id
            );
            if selected {
                state.current_selection = None;
            }
        }

        Action::ShowHeapProfileFlamegraph { id, upid, ts } => {
            state.current_heap_profile_flamegraph =
                Some(shared::HeapProfileFlamegraph { id, upid, ts });
        }
        Action::HideHeapProfileFlamegraph => state.current_heap_profile_flamegraph = None,

        Action::SetVisibleTraceTime(visible) => {
            merge_into(&mut state.frontend_local_state.visible_state, &visible);
        }
        Action::SetOmnibox(omnibox) => {
            merge_into(&mut state.frontend_local_state.omnibox_state, &omnibox);
        }
        Action::SetSelectedTimeRange(range) => {
            merge_into(&mut state.frontend_local_state.selected_time_range, &range);
        }

        Action::UpdateLogsPagination(pagination) => state.logs_pagination = pagination,

        action @ (Action::SelectNote { .. }
        | Action::SelectSlice { .. }
        | Action::SelectCounter { .. }
        | Action::SelectHeapProfile { .. }
        | Action::SelectChromeSlice { .. }
        | Action::SelectThreadState { .. }
        | Action::DeselectAll) => {
            if let Some(selection) = action.selection() {
                select(state, selection);
            }
        }
    }
}

/// Removes `track_id` from the scrolling list and from every group.
fn detach_track(state: &mut ApplicationState, track_id: &str) {
    state.scrolling_tracks.retain(|id| id != track_id);
    for group in state.track_groups.values_mut() {
        group.tracks.retain(|id| id != track_id);
    }
}

fn select(state: &mut ApplicationState, selection: Option<Selection>) {
    if let Some(Selection::Note { id }) = &selection {
        if !state.notes.contains_key(id) {
            log::warn!("SelectNote: unknown note '{}'", id);
            return;
        }
    }
    state.current_selection = selection;
}
