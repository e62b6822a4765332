//! Wire shapes of the catalog REST API.
//!
//! `list` answers with a bare array while the mutations wrap their result in a
//! single-key object; the client unwraps both so callers only see `Product`.

use serde::{Deserialize, Serialize};

use crate::domain::{Product, ProductId};

pub const LIST_ITEMS_PATH: &str = "api/items";
pub const ADD_ITEM_PATH: &str = "api/items/add";
pub const UPDATE_ITEM_PATH: &str = "api/items/update";
pub const DELETE_ITEM_PATH: &str = "api/items/delete";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProductEnvelope {
    pub new_product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedProductEnvelope {
    pub updated_product: Product,
}

/// Error body some backends attach to 4xx/5xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

/// Relative path for an operation that targets a single product.
pub fn item_path(prefix: &str, id: &ProductId) -> Vec<String> {
    prefix
        .split('/')
        .map(str::to_string)
        .chain(std::iter::once(id.to_string()))
        .collect()
}
