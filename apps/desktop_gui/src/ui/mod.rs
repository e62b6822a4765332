//! UI layer for the catalog view: view model and egui painter.

pub mod app;
pub mod view;

pub use app::{CatalogApp, StartupConfig};
