//! Background analysis context.
//!
//! Receives dispatched [`shared::Action`]s, reduces them into whole
//! [`shared::ApplicationState`] snapshots and publishes those back to the
//! rendering context as [`shared::DownMsg`]s.

pub mod controller;
pub mod reducer;

pub use controller::{ControllerHandle, spawn_controller};
