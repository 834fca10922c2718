//! Receiving side of the controller link
//!
//! The controller publishes on an unbounded stream; the rendering loop calls
//! [`ControllerConnection::pump`] once per frame to apply whatever arrived.

use crate::registry::{Registry, RegistryError};
use futures::channel::mpsc::UnboundedReceiver;
use shared::DownMsg;

pub struct ControllerConnection {
    down_msg_stream: UnboundedReceiver<DownMsg>,
    closed: bool,
}

impl ControllerConnection {
    pub fn new(down_msg_stream: UnboundedReceiver<DownMsg>) -> Self {
        Self {
            down_msg_stream,
            closed: false,
        }
    }

    /// Applies every message already queued, without waiting for more.
    /// Returns how many were applied.
    pub fn pump(&mut self, registry: &mut Registry) -> Result<usize, RegistryError> {
        let mut applied = 0;
        loop {
            match self.down_msg_stream.try_next() {
                Ok(Some(down_msg)) => {
                    handle_down_msg(down_msg, registry)?;
                    applied += 1;
                }
                Ok(None) => {
                    if !self.closed {
                        log::info!("Controller stream closed");
                        self.closed = true;
                    }
                    break;
                }
                // Nothing queued right now
                Err(_) => break,
            }
        }
        Ok(applied)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Routes one controller publication into the registry.
pub fn handle_down_msg(down_msg: DownMsg, registry: &mut Registry) -> Result<(), RegistryError> {
    match down_msg {
        DownMsg::StateUpdated(state) => registry.set_state(*state),
        DownMsg::ThreadsPublished(threads) => {
            registry.update_stores(|stores| stores.publish_threads(threads))
        }
        DownMsg::QueryResultPublished(response) => {
            registry.update_stores(|stores| stores.publish_query_result(response))
        }
        DownMsg::OverviewPublished { source_id, loads } => {
            registry.update_stores(|stores| stores.publish_overview(source_id, loads))
        }
        DownMsg::TrackDataPublished { track_id, data } => {
            registry.update_stores(|stores| stores.track_data.set(track_id, data))
        }
        DownMsg::SliceDetailsPublished(details) => {
            registry.update_stores(|stores| stores.slice_details = details)
        }
        DownMsg::CounterDetailsPublished(details) => {
            registry.update_stores(|stores| stores.counter_details = details)
        }
        DownMsg::HeapProfileDetailsPublished(details) => {
            registry.update_stores(|stores| stores.heap_profile_details = details)
        }
        DownMsg::SearchResultsPublished(results) => {
            let total_results = results.total_results;
            registry.update_stores(|stores| stores.current_search_results = results)?;
            registry
                .local_state_mut()?
                .set_total_search_results(total_results);
            Ok(())
        }
        DownMsg::SearchSummaryPublished(summary) => {
            registry.update_stores(|stores| stores.search_summary = summary)
        }
        DownMsg::LogsPresenceChanged(exists) => {
            registry.update_stores(|stores| stores.set_logs_presence(exists))
        }
        DownMsg::LoadingChanged(loading) => {
            registry.update_stores(|stores| stores.loading = loading)
        }
    }
}
