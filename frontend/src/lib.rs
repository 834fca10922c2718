//! Rendering-side state core of the trace viewer
//!
//! The [`registry::Registry`] is the context object everything else hangs
//! off: it owns the authoritative snapshot published by the background
//! controller, the frontend-local state, the redraw scheduler and the
//! lookup caches. [`connection::ControllerConnection`] feeds controller
//! publications into it; [`details_panel::DetailsPanel`] turns its snapshot
//! into the selection details area.

pub mod config;
pub mod connection;
pub mod dataflow;
pub mod details_panel;
pub mod dragging;
pub mod local_state;
pub mod redraw;
pub mod registry;
pub mod stores;
pub mod time_scale;

pub use config::{ViewerConfig, load_config};
pub use connection::ControllerConnection;
pub use dataflow::{Relay, relay};
pub use details_panel::{DetailsPanel, DetailsView, LogPresence, PanelDescriptor, PanelRenderer};
pub use local_state::{Clock, LocalState, ManualClock, SystemClock};
pub use redraw::{RedrawKind, RedrawScheduler};
pub use registry::{Lifecycle, Registry, RegistryError};
