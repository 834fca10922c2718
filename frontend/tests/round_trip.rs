//! Registry and controller wired together the way the viewer runs them.

use backend::spawn_controller;
use frontend::details_panel::{DetailsPanel, PanelDescriptor};
use frontend::{ControllerConnection, Registry, RegistryError, ViewerConfig, relay};
use shared::{Action, ApplicationState, Selection, create_empty_state};
use std::time::Duration;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn start() -> (Registry, ControllerConnection) {
    let (action_dispatched_relay, action_stream) = relay::<Action>();
    let (controller, down_msg_stream) = spawn_controller(create_empty_state(), action_stream);

    let mut registry = Registry::new(ViewerConfig::default());
    registry
        .initialize(action_dispatched_relay, Box::new(controller))
        .unwrap();
    (registry, ControllerConnection::new(down_msg_stream))
}

/// Pumps the connection once per simulated frame until `done` holds.
async fn pump_until(
    registry: &mut Registry,
    connection: &mut ControllerConnection,
    done: impl Fn(&ApplicationState) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            connection.pump(registry).unwrap();
            if done(&registry.state().unwrap()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("controller did not publish the expected snapshot");
}

#[tokio::test(flavor = "multi_thread")]
async fn selection_round_trips_and_opens_details_panel() {
    init_logging();
    let (mut registry, mut connection) = start();
    let redraw = registry.redraw_scheduler().unwrap();
    let mut details = DetailsPanel::new(registry.config().details_panel, redraw.clone());

    let before = details.view(&registry.state().unwrap(), registry.stores().unwrap());
    assert!(!before.visible);

    registry.make_selection(Action::SelectSlice { id: 42 }).unwrap();
    assert!(registry.state().unwrap().current_selection.is_none());

    pump_until(&mut registry, &mut connection, |state| {
        state.current_selection == Some(Selection::Slice { id: 42 })
    })
    .await;

    let view = details.view(&registry.state().unwrap(), registry.stores().unwrap());
    assert_eq!(view.panel, Some(PanelDescriptor::SliceDetails));
    assert_eq!(view.height, registry.config().details_panel.default_height);
    assert!(redraw.frame().is_some());

    registry.shutdown().unwrap();
    assert_eq!(registry.state().unwrap_err(), RegistryError::ShutDown);
}

#[tokio::test(flavor = "multi_thread")]
async fn local_state_survives_its_own_echo() {
    init_logging();
    let (mut registry, mut connection) = start();

    registry
        .local_state_mut()
        .unwrap()
        .update_visible_time(2.0, 6.0);
    let local = registry.local_state().unwrap().visible_state().clone();
    assert_eq!(registry.sync_local_state().unwrap(), 1);

    pump_until(&mut registry, &mut connection, |state| {
        state.frontend_local_state.visible_state.last_update > 0.0
    })
    .await;

    let echoed = registry.state().unwrap().frontend_local_state.visible_state.clone();
    assert_eq!(echoed, local);
    assert_eq!(*registry.local_state().unwrap().visible_state(), local);
    assert!(!registry.local_state().unwrap().has_pending_sync());

    registry.shutdown().unwrap();
}
