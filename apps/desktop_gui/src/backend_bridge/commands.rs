//! Backend commands queued from UI to backend worker.

use shared::domain::{ProductDraft, ProductId};

use crate::controller::events::CatalogOperation;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    ListProducts,
    CreateProduct { draft: ProductDraft },
    UpdateProduct { id: ProductId, draft: ProductDraft },
    DeleteProduct { id: ProductId },
    FetchImage { url: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListProducts => "list_products",
            Self::CreateProduct { .. } => "create_product",
            Self::UpdateProduct { .. } => "update_product",
            Self::DeleteProduct { .. } => "delete_product",
            Self::FetchImage { .. } => "fetch_image",
        }
    }

    /// The catalog operation this command settles, and the product it targets.
    pub fn operation(&self) -> Option<(CatalogOperation, Option<ProductId>)> {
        match self {
            Self::ListProducts => Some((CatalogOperation::Fetch, None)),
            Self::CreateProduct { .. } => Some((CatalogOperation::Create, None)),
            Self::UpdateProduct { id, .. } => Some((CatalogOperation::Update, Some(id.clone()))),
            Self::DeleteProduct { id } => Some((CatalogOperation::Delete, Some(id.clone()))),
            Self::FetchImage { .. } => None,
        }
    }
}
