//! Catalog view state and its single transition function.
//!
//! Every user intent and every backend settle event is an [`Action`];
//! [`reduce`] applies it to [`CatalogState`] and returns the backend command
//! the transition requires, if any.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use shared::domain::{Product, ProductDraft, ProductId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{CatalogOperation, UiError, UiEvent};

/// Text-backed form fields; the price stays raw input until submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub image_url: String,
}

impl ProductForm {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: format_price(product.price),
            image_url: product.image_url.clone(),
        }
    }

    /// Name and image URL are forwarded untouched; only the price must parse.
    pub fn to_draft(&self) -> Result<ProductDraft, String> {
        let raw = self.price.trim();
        let price = raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                if raw.is_empty() {
                    "price is required".to_string()
                } else {
                    format!("price '{raw}' is not a number")
                }
            })?;

        Ok(ProductDraft {
            name: self.name.clone(),
            price,
            image_url: self.image_url.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub id: ProductId,
    pub form: ProductForm,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PendingOp {
    Create,
    Update(ProductId),
    Delete(ProductId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Default)]
pub struct CatalogState {
    pub items: Vec<Product>,
    pub loading: bool,
    pub error: Option<UiError>,
    pub draft_new: ProductForm,
    pub draft_edit: Option<EditDraft>,
    pub status: String,
    pub last_synced: Option<DateTime<Local>>,
    mounted: bool,
    pending: HashSet<PendingOp>,
}

impl CatalogState {
    pub fn phase(&self) -> LoadPhase {
        if !self.mounted {
            LoadPhase::Idle
        } else if self.loading {
            LoadPhase::Loading
        } else if self.error.is_some() {
            LoadPhase::Error
        } else {
            LoadPhase::Ready
        }
    }

    pub fn is_creating(&self) -> bool {
        self.pending.contains(&PendingOp::Create)
    }

    pub fn is_updating(&self, id: &ProductId) -> bool {
        self.pending.contains(&PendingOp::Update(id.clone()))
    }

    pub fn is_deleting(&self, id: &ProductId) -> bool {
        self.pending.contains(&PendingOp::Delete(id.clone()))
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn start_fetch(&mut self) -> Option<BackendCommand> {
        if self.loading {
            return None;
        }
        self.mounted = true;
        self.loading = true;
        Some(BackendCommand::ListProducts)
    }

    fn replace_items(&mut self, items: Vec<Product>) {
        let mut seen = HashSet::new();
        let total = items.len();
        self.items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        if self.items.len() != total {
            tracing::warn!(
                dropped = total - self.items.len(),
                "catalog listing contained duplicate ids"
            );
        }
    }

    fn upsert(&mut self, product: Product) {
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(existing) => *existing = product,
            None => self.items.push(product),
        }
    }

    /// Writes `product` into the slot held by `id`; a returned id that differs
    /// takes over that slot and any other entry with the same id is dropped.
    fn replace(&mut self, id: &ProductId, product: Product) {
        let Some(index) = self.items.iter().position(|item| &item.id == id) else {
            return;
        };
        let new_id = product.id.clone();
        self.items[index] = product;
        let mut position = 0;
        self.items.retain(|item| {
            let keep = position == index || item.id != new_id;
            position += 1;
            keep
        });
    }

    fn settle(&mut self, operation: CatalogOperation, target: Option<&ProductId>) {
        match (operation, target) {
            (CatalogOperation::Fetch, _) => self.loading = false,
            (CatalogOperation::Create, _) => {
                self.pending.remove(&PendingOp::Create);
            }
            (CatalogOperation::Update, Some(id)) => {
                self.pending.remove(&PendingOp::Update(id.clone()));
            }
            (CatalogOperation::Delete, Some(id)) => {
                self.pending.remove(&PendingOp::Delete(id.clone()));
            }
            (CatalogOperation::Update | CatalogOperation::Delete, None) => {}
        }
    }
}

#[derive(Debug)]
pub enum Action {
    Mount,
    /// Remount: drops the current error and fetches the catalog again.
    Reload,
    SubmitCreate,
    BeginEdit(ProductId),
    CancelEdit,
    SubmitEdit,
    Delete(ProductId),
    Backend(UiEvent),
}

pub fn reduce(state: &mut CatalogState, action: Action) -> Option<BackendCommand> {
    match action {
        Action::Mount => {
            if state.mounted {
                return None;
            }
            state.start_fetch()
        }
        Action::Reload => {
            state.error = None;
            state.start_fetch()
        }
        Action::SubmitCreate => {
            if state.is_creating() {
                return None;
            }
            match state.draft_new.to_draft() {
                Ok(draft) => {
                    state.pending.insert(PendingOp::Create);
                    Some(BackendCommand::CreateProduct { draft })
                }
                Err(detail) => {
                    state.error = Some(UiError::validation(CatalogOperation::Create, detail));
                    None
                }
            }
        }
        Action::BeginEdit(id) => {
            if let Some(product) = state.product(&id) {
                state.draft_edit = Some(EditDraft {
                    form: ProductForm::from_product(product),
                    id,
                });
            }
            None
        }
        Action::CancelEdit => {
            state.draft_edit = None;
            None
        }
        Action::SubmitEdit => {
            let edit = state.draft_edit.as_ref()?;
            if state.is_updating(&edit.id) {
                return None;
            }
            match edit.form.to_draft() {
                Ok(draft) => {
                    let id = edit.id.clone();
                    state.pending.insert(PendingOp::Update(id.clone()));
                    Some(BackendCommand::UpdateProduct { id, draft })
                }
                Err(detail) => {
                    state.error = Some(UiError::validation(CatalogOperation::Update, detail));
                    None
                }
            }
        }
        Action::Delete(id) => {
            if state.is_deleting(&id) {
                return None;
            }
            state.pending.insert(PendingOp::Delete(id.clone()));
            Some(BackendCommand::DeleteProduct { id })
        }
        Action::Backend(event) => {
            apply_backend_event(state, event);
            None
        }
    }
}

fn apply_backend_event(state: &mut CatalogState, event: UiEvent) {
    match event {
        UiEvent::Info(message) => state.status = message,
        UiEvent::CatalogLoaded(items) => {
            state.settle(CatalogOperation::Fetch, None);
            state.replace_items(items);
            state.last_synced = Some(Local::now());
            state.status = format!("Loaded {} products", state.items.len());
        }
        UiEvent::ProductCreated(product) => {
            state.settle(CatalogOperation::Create, None);
            state.status = format!("Added '{}'", product.name);
            state.upsert(product);
            state.draft_new = ProductForm::default();
        }
        UiEvent::ProductUpdated { id, product } => {
            state.settle(CatalogOperation::Update, Some(&id));
            state.status = format!("Updated '{}'", product.name);
            state.replace(&id, product);
            if state.draft_edit.as_ref().is_some_and(|edit| edit.id == id) {
                state.draft_edit = None;
            }
        }
        UiEvent::ProductDeleted(id) => {
            state.settle(CatalogOperation::Delete, Some(&id));
            state.items.retain(|item| item.id != id);
            if state.draft_edit.as_ref().is_some_and(|edit| edit.id == id) {
                state.draft_edit = None;
            }
            state.status = format!("Deleted product {id}");
        }
        UiEvent::OperationFailed { error, target } => {
            state.settle(error.operation(), target.as_ref());
            tracing::warn!(
                operation = error.operation().verb(),
                category = ?error.category(),
                status = ?error.status(),
                "catalog operation failed: {}",
                error.detail()
            );
            state.error = Some(error);
        }
        UiEvent::ImageLoaded { .. } | UiEvent::ImageFailed { .. } => {}
    }
}

/// Whole prices render without a fractional part (`10`, not `10.0`).
pub fn format_price(price: f64) -> String {
    if price.is_finite() && price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{price:.0}")
    } else {
        price.to_string()
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
