//! Records published by the analysis side for the frontend's lookup caches.
//!
//! None of these are part of [`crate::ApplicationState`]; they travel as
//! [`crate::DownMsg`] publications and are cached locally by the frontend.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SliceDetails {
    pub ts: Option<f64>,
    pub dur: Option<f64>,
    pub priority: Option<i32>,
    pub end_state: Option<String>,
    pub cpu: Option<u32>,
    pub id: Option<u64>,
    pub utid: Option<u32>,
    pub wakeup_ts: Option<f64>,
    pub waker_utid: Option<u32>,
    pub waker_cpu: Option<u32>,
    pub category: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CounterDetails {
    pub start_time: Option<f64>,
    pub value: Option<f64>,
    pub delta: Option<f64>,
    pub duration: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HeapProfileDetails {
    pub ts: Option<f64>,
    pub ts_ns: Option<u64>,
    pub allocated: Option<u64>,
    pub allocated_not_freed: Option<u64>,
    pub pid: Option<u32>,
}

/// CPU load of one time bucket in the overview timeline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuantizedLoad {
    pub start_sec: f64,
    pub end_sec: f64,
    pub load: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDesc {
    pub utid: u32,
    pub tid: u32,
    pub thread_name: String,
    pub pid: Option<u32>,
    pub proc_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub id: String,
    pub query: String,
    pub error: Option<String>,
    pub total_row_count: u64,
    pub duration_ms: u64,
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Matches of the active omnibox search, in timeline order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSearchResults {
    pub slice_ids: Vec<f64>,
    pub ts_starts: Vec<f64>,
    pub utids: Vec<f64>,
    pub track_ids: Vec<String>,
    pub ref_types: Vec<String>,
    pub total_results: usize,
}

/// Per-bucket match density used to paint search markers on the overview.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub ts_starts: Vec<f64>,
    pub ts_ends: Vec<f64>,
    pub count: Vec<u8>,
}

/// Track data store key under which log presence is published.
pub const LOG_EXISTS_KEY: &str = "log-exists";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogExists {
    pub exists: bool,
}
