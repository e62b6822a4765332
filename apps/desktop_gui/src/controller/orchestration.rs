//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};
use shared::error::CatalogError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::reducer::{reduce, Action, CatalogState};

/// Applies `action` and queues whatever backend command the transition asks for.
pub fn dispatch_action(state: &mut CatalogState, cmd_tx: &Sender<BackendCommand>, action: Action) {
    if let Some(cmd) = reduce(state, action) {
        dispatch_backend_command(state, cmd_tx, cmd);
    }
}

/// Queues `cmd`; if the queue rejects it, the operation is settled as a failure
/// so its pending flag does not stick.
pub fn dispatch_backend_command(
    state: &mut CatalogState,
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) {
    let cmd_name = cmd.name();
    let operation = cmd.operation();

    let reason = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            return;
        }
        Err(TrySendError::Full(_)) => "UI command queue is full; please retry",
        Err(TrySendError::Disconnected(_)) => {
            "Backend command processor disconnected (possible startup/runtime failure); restart the app"
        }
    };

    tracing::warn!(command = cmd_name, "{reason}");
    state.status = reason.to_string();
    if let Some((operation, target)) = operation {
        let error = UiError::from_catalog(operation, &CatalogError::Network(reason.to_string()));
        reduce(state, Action::Backend(UiEvent::OperationFailed { error, target }));
    }
}
