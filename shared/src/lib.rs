//! Types shared by the rendering context (`frontend`) and the background
//! analysis context (`backend`).

pub mod actions;
pub mod details;
pub mod state;
pub mod timestamped;

pub use actions::{Action, DownMsg};
pub use details::{
    CounterDetails, CurrentSearchResults, HeapProfileDetails, LOG_EXISTS_KEY, LogExists,
    QuantizedLoad, QueryResponse, SearchSummary, SliceDetails, ThreadDesc,
};
pub use state::{
    ApplicationState, EngineConfig, EngineSource, FrontendLocalState, HeapProfileFlamegraph,
    LogsPagination, Note, ObjectById, OmniboxMode, OmniboxState, QueryConfig,
    SCROLLING_TRACK_GROUP, SelectedTimeRange, Selection, SelectionKind, Status, TraceTime,
    TrackConfig, TrackGroupState, TrackState, VisibleState, containing_track_group,
    create_empty_state,
};
pub use timestamped::{Timestamped, merge, merge_into};

/// Handle on the background execution context, owned by the frontend
/// registry so shutdown can stop it.
pub trait WorkerHandle: Send {
    /// Stops the background context. Pending work is dropped.
    fn terminate(&mut self);
}
