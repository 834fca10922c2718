//! Application-wide registry owned by the rendering context
//!
//! Holds the current authoritative snapshot, the local state container, the
//! redraw scheduler and the lookup caches, plus the dispatch point towards
//! the background controller. It is an explicit value passed to whoever
//! needs it: nothing here is a process-wide singleton.
//!
//! Lifecycle: `Uninitialized → Initialized → ShutDown`. Every accessor
//! reports misuse as a [`RegistryError`].

use crate::config::ViewerConfig;
use crate::dataflow::Relay;
use crate::details_panel::LogPresence;
use crate::local_state::{Clock, LocalState, SystemClock};
use crate::redraw::RedrawScheduler;
use crate::stores::Stores;
use shared::{Action, ApplicationState, OmniboxMode, WorkerHandle, create_empty_state};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    ShutDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("registry used before initialize()")]
    NotInitialized,
    #[error("registry is already initialized")]
    AlreadyInitialized,
    #[error("registry has been shut down")]
    ShutDown,
}

/// Everything allocated by `initialize` and released by `shutdown`.
struct Live {
    action_dispatched_relay: Relay<Action>,
    worker: Box<dyn WorkerHandle>,
    state: Arc<ApplicationState>,
    local_state: LocalState,
    redraw: Arc<RedrawScheduler>,
    stores: Stores,
}

pub struct Registry {
    config: ViewerConfig,
    clock: Arc<dyn Clock>,
    lifecycle: Lifecycle,
    live: Option<Live>,
}

impl Registry {
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ViewerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            lifecycle: Lifecycle::Uninitialized,
            live: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Wires the registry to its background controller and allocates an
    /// empty snapshot, local state, scheduler and caches.
    pub fn initialize(
        &mut self,
        action_dispatched_relay: Relay<Action>,
        worker: Box<dyn WorkerHandle>,
    ) -> Result<(), RegistryError> {
        match self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Initialized => return Err(RegistryError::AlreadyInitialized),
            Lifecycle::ShutDown => return Err(RegistryError::ShutDown),
        }

        let redraw = Arc::new(RedrawScheduler::new());
        let local_state = LocalState::new(redraw.clone(), self.clock.clone(), self.config.sync);
        self.live = Some(Live {
            action_dispatched_relay,
            worker,
            state: Arc::new(create_empty_state()),
            local_state,
            redraw,
            stores: Stores::default(),
        });
        self.lifecycle = Lifecycle::Initialized;
        log::info!("Registry initialized");
        Ok(())
    }

    fn live(&self) -> Result<&Live, RegistryError> {
        match (self.lifecycle, &self.live) {
            (Lifecycle::Initialized, Some(live)) => Ok(live),
            (Lifecycle::ShutDown, _) => Err(RegistryError::ShutDown),
            _ => Err(RegistryError::NotInitialized),
        }
    }

    fn live_mut(&mut self) -> Result<&mut Live, RegistryError> {
        match (self.lifecycle, &mut self.live) {
            (Lifecycle::Initialized, Some(live)) => Ok(live),
            (Lifecycle::ShutDown, _) => Err(RegistryError::ShutDown),
            _ => Err(RegistryError::NotInitialized),
        }
    }

    /// Current authoritative snapshot. Cheap to clone and safe to hold
    /// across a later `set_state`.
    pub fn state(&self) -> Result<Arc<ApplicationState>, RegistryError> {
        Ok(self.live()?.state.clone())
    }

    /// Replaces the snapshot wholesale, folds its local-state groups into the
    /// local container and requests a full redraw.
    pub fn set_state(&mut self, state: ApplicationState) -> Result<(), RegistryError> {
        let live = self.live_mut()?;
        live.local_state
            .reconcile_with_authoritative(state.trace_time, &state.frontend_local_state);
        live.state = Arc::new(state);
        live.redraw.schedule_full_redraw();
        Ok(())
    }

    /// Fire-and-forget hand-off to the controller. The snapshot only changes
    /// once the controller publishes a new one.
    pub fn dispatch(&self, action: Action) -> Result<(), RegistryError> {
        let live = self.live()?;
        log::debug!("Dispatching {}", action.name());
        live.action_dispatched_relay.send(action);
        Ok(())
    }

    /// Dispatches a selection, first dropping the highlighted search match.
    pub fn make_selection(&mut self, action: Action) -> Result<(), RegistryError> {
        if action.selection().is_none() {
            log::warn!("make_selection called with non-selection action {}", action.name());
        }
        self.live_mut()?.local_state.cancel_search();
        self.dispatch(action)
    }

    /// Starts a new omnibox search. The previous match highlight and the
    /// current selection are both dropped.
    pub fn start_search(&mut self, query: impl Into<String>) -> Result<(), RegistryError> {
        let local_state = &mut self.live_mut()?.local_state;
        local_state.set_omnibox(query, OmniboxMode::Search);
        local_state.cancel_search();
        self.dispatch(Action::DeselectAll)
    }

    pub fn local_state(&self) -> Result<&LocalState, RegistryError> {
        Ok(&self.live()?.local_state)
    }

    pub fn local_state_mut(&mut self) -> Result<&mut LocalState, RegistryError> {
        Ok(&mut self.live_mut()?.local_state)
    }

    pub fn redraw_scheduler(&self) -> Result<Arc<RedrawScheduler>, RegistryError> {
        Ok(self.live()?.redraw.clone())
    }

    pub fn stores(&self) -> Result<&Stores, RegistryError> {
        Ok(&self.live()?.stores)
    }

    /// Whether the trace has log entries to show when nothing is selected.
    pub fn has_logs(&self) -> Result<bool, RegistryError> {
        Ok(self.stores()?.has_logs())
    }

    /// Applies `update` to the caches and requests a full redraw.
    pub fn update_stores(&mut self, update: impl FnOnce(&mut Stores)) -> Result<(), RegistryError> {
        let live = self.live_mut()?;
        update(&mut live.stores);
        live.redraw.schedule_full_redraw();
        Ok(())
    }

    /// Seconds per pixel truncated to a power of two; `None` until the
    /// timeline has a width.
    pub fn cur_resolution(&self) -> Result<Option<f64>, RegistryError> {
        Ok(self.live()?.local_state.cur_resolution())
    }

    /// Pushes local-state groups written since the last push, rate limited
    /// by the sync interval. Returns the number of actions dispatched.
    pub fn sync_local_state(&mut self) -> Result<usize, RegistryError> {
        let live = self.live_mut()?;
        let actions = live.local_state.take_sync_actions();
        let count = actions.len();
        for action in actions {
            live.action_dispatched_relay.send(action);
        }
        Ok(count)
    }

    /// Terminates the background controller and stops redraw scheduling.
    pub fn shutdown(&mut self) -> Result<(), RegistryError> {
        self.live()?;
        if let Some(mut live) = self.live.take() {
            live.worker.terminate();
            live.redraw.shutdown();
        }
        self.lifecycle = Lifecycle::ShutDown;
        log::info!("Registry shut down");
        Ok(())
    }

    /// Drops everything allocated by `initialize` without terminating the
    /// worker, returning to `Uninitialized`.
    pub fn reset_for_testing(&mut self) {
        self.live = None;
        self.lifecycle = Lifecycle::Uninitialized;
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("lifecycle", &self.lifecycle)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataflow::relay;
    use crate::local_state::ManualClock;
    use crate::redraw::RedrawKind;
    use futures::channel::mpsc::UnboundedReceiver;
    use shared::{Selection, TraceTime};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default, Clone)]
    struct CountingWorker {
        terminated: Arc<AtomicUsize>,
    }

    impl WorkerHandle for CountingWorker {
        fn terminate(&mut self) {
            self.terminated.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn initialized() -> (Registry, UnboundedReceiver<Action>, CountingWorker, Arc<ManualClock>) {
        init_logging();
        let clock = Arc::new(ManualClock::new(1_000.0));
        let mut registry = Registry::with_clock(ViewerConfig::default(), clock.clone());
        let (action_dispatched_relay, action_stream) = relay();
        let worker = CountingWorker::default();
        registry
            .initialize(action_dispatched_relay, Box::new(worker.clone()))
            .unwrap();
        (registry, action_stream, worker, clock)
    }

    #[test]
    fn accessors_fail_before_initialize() {
        let registry = Registry::new(ViewerConfig::default());

        assert_eq!(registry.state().unwrap_err(), RegistryError::NotInitialized);
        assert_eq!(
            registry.dispatch(Action::DeselectAll),
            Err(RegistryError::NotInitialized)
        );
        assert!(registry.local_state().is_err());
        assert_eq!(registry.has_logs(), Err(RegistryError::NotInitialized));
    }

    #[test]
    fn initialize_allocates_empty_snapshot() {
        let (registry, _actions, _worker, _clock) = initialized();

        assert_eq!(registry.lifecycle(), Lifecycle::Initialized);
        assert_eq!(*registry.state().unwrap(), create_empty_state());
        assert!(registry.stores().unwrap().query_results.is_empty());
    }

    #[test]
    fn second_initialize_is_rejected() {
        let (mut registry, _actions, _worker, _clock) = initialized();
        let (other_relay, _other_stream) = relay();

        assert_eq!(
            registry.initialize(other_relay, Box::new(CountingWorker::default())),
            Err(RegistryError::AlreadyInitialized)
        );
    }

    #[test]
    fn dispatch_forwards_without_touching_state() {
        let (registry, mut actions, _worker, _clock) = initialized();

        registry.dispatch(Action::SelectSlice { id: 1 }).unwrap();

        assert_eq!(actions.try_next().unwrap(), Some(Action::SelectSlice { id: 1 }));
        assert!(registry.state().unwrap().current_selection.is_none());
    }

    #[test]
    fn set_state_replaces_snapshot_and_requests_full_redraw() {
        let (mut registry, _actions, _worker, _clock) = initialized();
        let held = registry.state().unwrap();

        let mut next = create_empty_state();
        next.current_selection = Some(Selection::Slice { id: 42 });
        registry.set_state(next.clone()).unwrap();

        assert_eq!(*registry.state().unwrap(), next);
        assert!(held.current_selection.is_none());
        assert_eq!(
            registry.redraw_scheduler().unwrap().frame(),
            Some(RedrawKind::Full)
        );
    }

    #[test]
    fn make_selection_cancels_search_before_dispatch() {
        let (mut registry, mut actions, _worker, _clock) = initialized();
        let local = registry.local_state_mut().unwrap();
        local.set_total_search_results(10);
        local.set_search_index(Some(4));

        registry.make_selection(Action::SelectSlice { id: 7 }).unwrap();

        assert_eq!(registry.local_state().unwrap().search_index(), None);
        assert_eq!(actions.try_next().unwrap(), Some(Action::SelectSlice { id: 7 }));
    }

    #[test]
    fn search_index_is_cleared_after_every_make_selection() {
        let (mut registry, mut actions, _worker, _clock) = initialized();
        registry
            .local_state_mut()
            .unwrap()
            .set_total_search_results(100);

        for round in 0..20u64 {
            let local = registry.local_state_mut().unwrap();
            local.set_search_index(Some((round as usize * 7) % 100));
            if round % 3 == 0 {
                registry.dispatch(Action::SelectChromeSlice { id: round }).unwrap();
                assert!(registry.local_state().unwrap().search_index().is_some());
            }
            if round % 2 == 0 {
                registry.dispatch(Action::DeselectAll).unwrap();
            }

            registry.make_selection(Action::SelectSlice { id: round }).unwrap();
            assert_eq!(registry.local_state().unwrap().search_index(), None);

            registry.make_selection(Action::DeselectAll).unwrap();
            assert_eq!(registry.local_state().unwrap().search_index(), None);
        }

        let mut dispatched = 0;
        while let Ok(Some(_)) = actions.try_next() {
            dispatched += 1;
        }
        assert_eq!(dispatched, 7 + 10 + 40);
    }

    #[test]
    fn start_search_clears_selection_and_match() {
        let (mut registry, mut actions, _worker, _clock) = initialized();
        let local = registry.local_state_mut().unwrap();
        local.set_total_search_results(3);
        local.set_search_index(Some(2));

        registry.start_search("sched_switch").unwrap();

        let local = registry.local_state().unwrap();
        assert_eq!(local.search_index(), None);
        assert_eq!(local.omnibox_state().omnibox, "sched_switch");
        assert_eq!(local.omnibox_state().mode, OmniboxMode::Search);
        assert_eq!(actions.try_next().unwrap(), Some(Action::DeselectAll));
        assert_eq!(registry.sync_local_state().unwrap(), 1);
    }

    #[test]
    fn malformed_snapshot_bounds_do_not_break_local_writes() {
        let (mut registry, _actions, _worker, _clock) = initialized();
        let mut next = create_empty_state();
        next.trace_time = TraceTime {
            start_sec: f64::NAN,
            end_sec: 10.0,
        };
        registry.set_state(next).unwrap();

        let local = registry.local_state_mut().unwrap();
        assert!(local.update_visible_time(1.0, 2.0));
        assert!(local.select_time_range(3.0, 4.0));
        assert_eq!(local.visible_state().end_sec, 2.0);
        assert_eq!(local.selected_time_range().start_sec, Some(3.0));
    }

    #[test]
    fn sync_local_state_dispatches_pending_groups() {
        let (mut registry, mut actions, _worker, _clock) = initialized();
        registry
            .local_state_mut()
            .unwrap()
            .set_omnibox("sched", OmniboxMode::Search);

        assert_eq!(registry.sync_local_state().unwrap(), 1);
        assert!(matches!(
            actions.try_next().unwrap(),
            Some(Action::SetOmnibox(omnibox)) if omnibox.omnibox == "sched"
        ));
        assert_eq!(registry.sync_local_state().unwrap(), 0);
    }

    #[test]
    fn shutdown_terminates_worker_once() {
        let (mut registry, _actions, worker, _clock) = initialized();
        let redraw = registry.redraw_scheduler().unwrap();

        registry.shutdown().unwrap();

        assert_eq!(worker.terminated.load(Ordering::SeqCst), 1);
        assert!(!redraw.is_running());
        assert_eq!(registry.shutdown(), Err(RegistryError::ShutDown));
        assert_eq!(registry.state().unwrap_err(), RegistryError::ShutDown);
        assert_eq!(worker.terminated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_for_testing_allows_reinitialize() {
        let (mut registry, _actions, _worker, _clock) = initialized();
        registry.shutdown().unwrap();

        registry.reset_for_testing();
        assert_eq!(registry.lifecycle(), Lifecycle::Uninitialized);

        let (action_dispatched_relay, _stream) = relay();
        registry
            .initialize(action_dispatched_relay, Box::new(CountingWorker::default()))
            .unwrap();
        assert_eq!(registry.lifecycle(), Lifecycle::Initialized);
    }

    #[test]
    fn log_presence_reads_published_flag() {
        let (mut registry, _actions, _worker, _clock) = initialized();
        assert_eq!(registry.has_logs(), Ok(false));

        registry
            .update_stores(|stores| stores.set_logs_presence(true))
            .unwrap();

        assert_eq!(registry.has_logs(), Ok(true));

        registry.shutdown().unwrap();
        assert_eq!(registry.has_logs(), Err(RegistryError::ShutDown));
    }
}
