//! Freshness-tagged field groups
//!
//! A [`Timestamped`] value bundles a group of related fields with the epoch
//! (seconds) of its last update. The frontend writes these groups at input
//! rate while the controller echoes them back at sync rate; [`merge`] decides
//! which copy survives. Merging is all-or-nothing per group so a start time
//! from one source is never paired with an end time from another.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A field group tagged with the epoch of its last update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timestamped<T> {
    #[serde(flatten)]
    pub value: T,
    pub last_update: f64,
}

impl<T> Timestamped<T> {
    pub fn new(value: T, last_update: f64) -> Self {
        Self { value, last_update }
    }

    /// Value as created at state initialization, older than any real update.
    pub fn initial(value: T) -> Self {
        Self::new(value, 0.0)
    }

    /// Whether `other` should replace `self` under the merge rule.
    pub fn is_superseded_by(&self, other: &Timestamped<T>) -> bool {
        other.last_update > self.last_update
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Default> Default for Timestamped<T> {
    fn default() -> Self {
        Timestamped::initial(T::default())
    }
}

impl<T> Deref for Timestamped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Last-writer-wins merge of two copies of the same group.
///
/// Returns `incoming` only when it is strictly newer; ties (and NaN stamps)
/// keep `local`.
pub fn merge<T>(local: Timestamped<T>, incoming: Timestamped<T>) -> Timestamped<T> {
    if local.is_superseded_by(&incoming) {
        incoming
    } else {
        local
    }
}

/// In-place variant of [`merge`]. Returns `true` when `local` was replaced.
pub fn merge_into<T: Clone>(local: &mut Timestamped<T>, incoming: &Timestamped<T>) -> bool {
    if local.is_superseded_by(incoming) {
        *local = incoming.clone();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Window {
        start_sec: f64,
        end_sec: f64,
    }

    fn window(start_sec: f64, end_sec: f64, last_update: f64) -> Timestamped<Window> {
        Timestamped::new(Window { start_sec, end_sec }, last_update)
    }

    #[test]
    fn newer_value_wins_regardless_of_argument_order() {
        let newer = window(1.0, 2.0, 9.0);
        let older = window(3.0, 4.0, 5.0);

        assert_eq!(merge(older.clone(), newer.clone()), newer);
        assert_eq!(merge(newer.clone(), older), newer);
    }

    #[test]
    fn tie_keeps_local() {
        let local = window(1.0, 2.0, 7.0);
        let incoming = window(5.0, 6.0, 7.0);

        assert_eq!(merge(local.clone(), incoming), local);
    }

    #[test]
    fn nan_stamp_never_replaces() {
        let local = window(1.0, 2.0, 7.0);
        let incoming = window(5.0, 6.0, f64::NAN);

        assert_eq!(merge(local.clone(), incoming), local);
    }

    #[test]
    fn merge_never_mixes_fields() {
        let mut local = window(0.0, 10.0, 3.0);
        let incoming = window(4.0, 8.0, 4.0);

        assert!(merge_into(&mut local, &incoming));
        assert_eq!(local.start_sec, 4.0);
        assert_eq!(local.end_sec, 8.0);
        assert!(!merge_into(&mut local, &window(100.0, 200.0, 1.0)));
        assert_eq!(*local, Window { start_sec: 4.0, end_sec: 8.0 });
    }

    #[test]
    fn serializes_flat_with_last_update() {
        let json = serde_json::to_value(window(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"startSec": 1.0, "endSec": 2.0, "lastUpdate": 3.0})
        );
    }
}
