use std::sync::Arc;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::{config::load_settings, CatalogApi, ClientSettings, HttpCatalogClient, MissingCatalogApi};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{CatalogApp, StartupConfig};

const COMMAND_QUEUE_CAPACITY: usize = 256;
const EVENT_QUEUE_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "catalog-admin", about = "Desktop admin for the product catalog")]
struct Args {
    /// Base URL of the catalog REST API.
    #[arg(long)]
    api_url: Option<String>,
    /// Per-request timeout in seconds; 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Currency label printed after prices.
    #[arg(long)]
    currency: Option<String>,
}

impl Args {
    fn apply(self, mut settings: ClientSettings) -> ClientSettings {
        if let Some(v) = self.api_url {
            settings.api_base_url = v;
        }
        if self.timeout_secs.is_some() {
            settings.request_timeout_secs = self.timeout_secs;
        }
        if let Some(v) = self.currency {
            settings.currency_label = v;
        }
        settings
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Args::parse().apply(load_settings());
    settings
        .validate()
        .context("catalog admin cannot start with this configuration")?;

    let api: Arc<dyn CatalogApi> = match HttpCatalogClient::from_settings(&settings) {
        Ok(client) => {
            tracing::info!(base_url = %client.base_url(), "catalog client ready");
            Arc::new(client)
        }
        Err(err) => {
            tracing::error!("failed to build catalog client: {err}");
            Arc::new(MissingCatalogApi::new(err.to_string()))
        }
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(COMMAND_QUEUE_CAPACITY);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(EVENT_QUEUE_CAPACITY);
    backend_bridge::runtime::launch(api, cmd_rx, ui_tx);

    let startup = StartupConfig {
        api_base_url: settings.api_base_url.clone(),
        currency_label: settings.currency_label.clone(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Product Catalog Admin")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Product Catalog Admin",
        options,
        Box::new(move |_cc| Ok(Box::new(CatalogApp::bootstrap(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop ui exited with error: {err}"))
}

#[cfg(test)]
#[path = "tests/catalog_flow_tests.rs"]
mod catalog_flow_tests;
