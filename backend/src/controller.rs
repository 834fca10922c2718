//! Background controller task
//!
//! Data flows: dispatched Actions → reducer → whole snapshot → DownMsg stream

use crate::reducer;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use futures::StreamExt;
use shared::{Action, ApplicationState, DownMsg, WorkerHandle};
use tokio::task::JoinHandle;

/// Owner-side handle of a running controller.
pub struct ControllerHandle {
    task: Option<JoinHandle<()>>,
    down_sender: UnboundedSender<DownMsg>,
}

impl ControllerHandle {
    /// Publish a side-channel message (threads, query results, details...)
    /// on the same stream the snapshots travel on.
    pub fn publish(&self, msg: DownMsg) {
        if self.down_sender.unbounded_send(msg).is_err() {
            log::debug!("Controller publication dropped: frontend disconnected");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl WorkerHandle for ControllerHandle {
    fn terminate(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::info!("Controller terminated");
        }
    }
}

/// Spawns the controller on the current tokio runtime.
///
/// Every action received on `actions` is applied to the controller's copy of
/// the state. Actions that arrive while a batch is being processed are folded
/// into it, and each batch produces exactly one `DownMsg::StateUpdated`.
pub fn spawn_controller(
    initial: ApplicationState,
    actions: UnboundedReceiver<Action>,
) -> (ControllerHandle, UnboundedReceiver<DownMsg>) {
    let (down_sender, down_stream) = unbounded();
    let task = tokio::spawn(run_controller(initial, actions, down_sender.clone()));
    (
        ControllerHandle {
            task: Some(task),
            down_sender,
        },
        down_stream,
    )
}

async fn run_controller(
    mut state: ApplicationState,
    mut actions: UnboundedReceiver<Action>,
    down_sender: UnboundedSender<DownMsg>,
) {
    while let Some(first) = actions.next().await {
        let mut batch = vec![first];
        while let Ok(Some(action)) = actions.try_next() {
            batch.push(action);
        }
        log::debug!(
            "Controller applying {} action(s): {:?}",
            batch.len(),
            batch.iter().map(Action::name).collect::<Vec<_>>()
        );

        state = reducer::apply_all(&state, batch);

        if down_sender
            .unbounded_send(DownMsg::StateUpdated(Box::new(state.clone())))
            .is_err()
        {
            log::info!("Frontend disconnected, controller stopping");
            break;
        }
    }
}
