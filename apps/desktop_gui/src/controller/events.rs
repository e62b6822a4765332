//! UI/backend events and error modeling for the catalog view.

use shared::{
    domain::{Product, ProductId},
    error::CatalogError,
};

use crate::backend_bridge::images::PreviewImage;

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    CatalogLoaded(Vec<Product>),
    ProductCreated(Product),
    /// `id` is the product the update was issued for.
    ProductUpdated {
        id: ProductId,
        product: Product,
    },
    ProductDeleted(ProductId),
    OperationFailed {
        error: UiError,
        target: Option<ProductId>,
    },
    ImageLoaded {
        url: String,
        image: PreviewImage,
    },
    ImageFailed {
        url: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogOperation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl CatalogOperation {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Create => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Server,
    Validation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiError {
    operation: CatalogOperation,
    category: UiErrorCategory,
    status: Option<u16>,
    detail: String,
}

impl UiError {
    pub fn from_catalog(operation: CatalogOperation, err: &CatalogError) -> Self {
        let (category, detail) = match err {
            CatalogError::Network(message) => (UiErrorCategory::Transport, message.clone()),
            CatalogError::Server { status, message } if message.is_empty() => (
                UiErrorCategory::Server,
                format!("server returned status {status}"),
            ),
            CatalogError::Server { status, message } => (
                UiErrorCategory::Server,
                format!("server returned status {status}: {message}"),
            ),
            CatalogError::InvalidResponse(message) => (
                UiErrorCategory::Server,
                format!("unexpected response: {message}"),
            ),
            CatalogError::Validation(message) => (UiErrorCategory::Validation, message.clone()),
        };

        Self {
            operation,
            category,
            status: err.status(),
            detail,
        }
    }

    pub fn validation(operation: CatalogOperation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            category: UiErrorCategory::Validation,
            status: None,
            detail: detail.into(),
        }
    }

    pub fn operation(&self) -> CatalogOperation {
        self.operation
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn banner_message(&self) -> String {
        let noun = match self.operation {
            CatalogOperation::Fetch => "products",
            _ => "product",
        };
        format!("Failed to {} {noun}: {}", self.operation.verb(), self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_catalog_errors() {
        let transport = UiError::from_catalog(
            CatalogOperation::Fetch,
            &CatalogError::Network("connection refused".to_string()),
        );
        assert_eq!(transport.category(), UiErrorCategory::Transport);
        assert_eq!(
            transport.banner_message(),
            "Failed to fetch products: connection refused"
        );

        let server = UiError::from_catalog(
            CatalogOperation::Delete,
            &CatalogError::Server {
                status: 500,
                message: String::new(),
            },
        );
        assert_eq!(server.category(), UiErrorCategory::Server);
        assert_eq!(server.status(), Some(500));
        assert_eq!(
            server.banner_message(),
            "Failed to delete product: server returned status 500"
        );

        let validation = UiError::from_catalog(
            CatalogOperation::Create,
            &CatalogError::Validation("name is required".to_string()),
        );
        assert_eq!(validation.category(), UiErrorCategory::Validation);
        assert_eq!(validation.operation(), CatalogOperation::Create);
    }
}
