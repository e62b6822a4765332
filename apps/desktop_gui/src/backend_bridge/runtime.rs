//! Runtime bridge between UI command queue and backend event intake.
//!
//! Catalog commands run one at a time in queue order, so their settle events
//! reach the UI in the order the commands were issued. Image fetches are
//! spawned beside them and never touch catalog state.

use std::{sync::Arc, thread};

use client_core::CatalogApi;
use crossbeam_channel::{Receiver, Sender};
use reqwest::Client as HttpClient;
use shared::error::CatalogError;

use crate::backend_bridge::{commands::BackendCommand, images::fetch_preview_image};
use crate::controller::events::{CatalogOperation, UiError, UiEvent};

pub fn launch(
    api: Arc<dyn CatalogApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::Info(format!(
                    "Backend worker startup failure: {err}"
                )));
                return;
            }
        };

        runtime.block_on(run_worker(api, cmd_rx, ui_tx));
    })
}

pub async fn run_worker(
    api: Arc<dyn CatalogApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    let http = HttpClient::new();
    tracing::info!("backend worker ready");

    while let Ok(cmd) = cmd_rx.recv() {
        tracing::debug!(command = cmd.name(), "backend: processing command");
        match cmd {
            BackendCommand::FetchImage { url } => {
                let http = http.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = match fetch_preview_image(&http, &url).await {
                        Ok(image) => UiEvent::ImageLoaded { url, image },
                        Err(reason) => {
                            tracing::warn!(%url, "card image fetch failed: {reason}");
                            UiEvent::ImageFailed { url, reason }
                        }
                    };
                    // Waits for room in the event queue instead of dropping the result.
                    let _ = tokio::task::spawn_blocking(move || ui_tx.send(event)).await;
                });
            }
            other => {
                if let Some(event) = execute_catalog_command(api.as_ref(), other).await {
                    if ui_tx.send(event).is_err() {
                        break;
                    }
                }
            }
        }
    }

    tracing::info!("backend worker stopped: command queue closed");
}

/// Runs one catalog command to completion and maps its outcome to a UI event.
pub async fn execute_catalog_command(
    api: &dyn CatalogApi,
    cmd: BackendCommand,
) -> Option<UiEvent> {
    let event = match cmd {
        BackendCommand::ListProducts => match api.list().await {
            Ok(items) => UiEvent::CatalogLoaded(items),
            Err(err) => failed(CatalogOperation::Fetch, None, &err),
        },
        BackendCommand::CreateProduct { draft } => match api.create(&draft).await {
            Ok(product) => UiEvent::ProductCreated(product),
            Err(err) => failed(CatalogOperation::Create, None, &err),
        },
        BackendCommand::UpdateProduct { id, draft } => match api.update(&id, &draft).await {
            Ok(product) => UiEvent::ProductUpdated { id, product },
            Err(err) => failed(CatalogOperation::Update, Some(id), &err),
        },
        BackendCommand::DeleteProduct { id } => match api.delete(&id).await {
            Ok(()) => UiEvent::ProductDeleted(id),
            Err(err) => failed(CatalogOperation::Delete, Some(id), &err),
        },
        BackendCommand::FetchImage { .. } => return None,
    };
    Some(event)
}

fn failed(
    operation: CatalogOperation,
    target: Option<shared::domain::ProductId>,
    err: &CatalogError,
) -> UiEvent {
    UiEvent::OperationFailed {
        error: UiError::from_catalog(operation, err),
        target,
    }
}
