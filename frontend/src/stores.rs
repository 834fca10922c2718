//! Lookup caches filled by controller publications
//!
//! These never travel back to the controller and are never merged; the
//! latest publication simply replaces what was there. Nothing is evicted.

use crate::details_panel::LogPresence;
use shared::{
    CounterDetails, CurrentSearchResults, HeapProfileDetails, LOG_EXISTS_KEY, LogExists,
    QuantizedLoad, QueryResponse, SearchSummary, SliceDetails, ThreadDesc,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-track render data. Each track kind stores its own payload type and
/// reads it back with the same type.
#[derive(Default, Clone)]
pub struct TrackDataStore {
    data: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl TrackDataStore {
    pub fn set<T: Any + Send + Sync>(&mut self, track_id: impl Into<String>, data: T) {
        self.data.insert(track_id.into(), Arc::new(data));
    }

    /// Payload of `track_id` if present and stored as a `T`.
    pub fn get<T: Any + Send + Sync>(&self, track_id: &str) -> Option<&T> {
        self.data.get(track_id)?.downcast_ref::<T>()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.data.contains_key(track_id)
    }
}

impl std::fmt::Debug for TrackDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.data.keys()).finish()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Stores {
    pub track_data: TrackDataStore,
    /// Keyed by query id.
    pub query_results: HashMap<String, QueryResponse>,
    /// Keyed by overview source (CPU or process) id.
    pub overview: HashMap<String, Vec<QuantizedLoad>>,
    /// Keyed by utid.
    pub threads: HashMap<u32, ThreadDesc>,
    pub slice_details: SliceDetails,
    pub counter_details: CounterDetails,
    pub heap_profile_details: HeapProfileDetails,
    pub current_search_results: CurrentSearchResults,
    pub search_summary: SearchSummary,
    pub loading: bool,
}

impl Stores {
    pub fn publish_threads(&mut self, threads: Vec<ThreadDesc>) {
        self.threads = threads.into_iter().map(|thread| (thread.utid, thread)).collect();
    }

    pub fn publish_query_result(&mut self, response: QueryResponse) {
        self.query_results.insert(response.id.clone(), response);
    }

    /// Appends a batch of overview buckets for one source.
    pub fn publish_overview(&mut self, source_id: String, loads: Vec<QuantizedLoad>) {
        self.overview.entry(source_id).or_default().extend(loads);
    }

    pub fn set_logs_presence(&mut self, exists: bool) {
        self.track_data.set(LOG_EXISTS_KEY, LogExists { exists });
    }

    pub fn thread(&self, utid: u32) -> Option<&ThreadDesc> {
        self.threads.get(&utid)
    }
}

impl LogPresence for Stores {
    /// Whether the analysis side reported any log entries in the trace.
    fn has_logs(&self) -> bool {
        self.track_data
            .get::<LogExists>(LOG_EXISTS_KEY)
            .is_some_and(|presence| presence.exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct SliceTrackData {
        starts: Vec<f64>,
    }

    #[test]
    fn track_data_reads_back_with_stored_type_only() {
        let mut store = TrackDataStore::default();
        store.set("t1", SliceTrackData { starts: vec![1.0, 2.0] });

        assert_eq!(
            store.get::<SliceTrackData>("t1"),
            Some(&SliceTrackData { starts: vec![1.0, 2.0] })
        );
        assert_eq!(store.get::<LogExists>("t1"), None);
        assert_eq!(store.get::<SliceTrackData>("t2"), None);
    }

    #[test]
    fn log_presence_goes_through_track_data() {
        let mut stores = Stores::default();
        assert!(!stores.has_logs());

        stores.set_logs_presence(true);

        assert!(stores.has_logs());
        assert!(stores.track_data.contains(LOG_EXISTS_KEY));
    }

    #[test]
    fn overview_batches_accumulate_per_source() {
        let mut stores = Stores::default();
        let load = |start_sec: f64| QuantizedLoad {
            start_sec,
            end_sec: start_sec + 1.0,
            load: 0.5,
        };

        stores.publish_overview("cpu0".to_string(), vec![load(0.0)]);
        stores.publish_overview("cpu0".to_string(), vec![load(1.0)]);
        stores.publish_overview("cpu1".to_string(), vec![load(0.0)]);

        assert_eq!(stores.overview["cpu0"].len(), 2);
        assert_eq!(stores.overview["cpu1"].len(), 1);
    }

    #[test]
    fn threads_are_indexed_by_utid() {
        let mut stores = Stores::default();
        stores.publish_threads(vec![ThreadDesc {
            utid: 3,
            tid: 1234,
            thread_name: "main".to_string(),
            pid: Some(1200),
            proc_name: Some("app".to_string()),
        }]);

        assert_eq!(stores.thread(3).map(|t| t.tid), Some(1234));
        assert!(stores.thread(4).is_none());
    }
}
