//! Toolkit-free view model: what the catalog screen shows for a given state.

use shared::domain::ProductId;

use crate::controller::reducer::{format_price, CatalogState, LoadPhase};

pub const CATALOG_HEADING: &str = "Product list";

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub price_label: String,
    pub image_url: String,
    pub editing: bool,
    pub deleting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub cancellable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView {
    pub heading: &'static str,
    pub spinner: bool,
    pub banner: Option<String>,
    pub cards: Vec<ProductCard>,
    pub create_form: Option<FormView>,
    pub edit_form: Option<FormView>,
}

pub fn render(state: &CatalogState, currency_label: &str) -> CatalogView {
    if state.phase() == LoadPhase::Loading {
        return CatalogView {
            heading: CATALOG_HEADING,
            spinner: true,
            banner: None,
            cards: Vec::new(),
            create_form: None,
            edit_form: None,
        };
    }

    let editing_id = state.draft_edit.as_ref().map(|edit| &edit.id);
    let cards = state
        .items
        .iter()
        .map(|item| {
            let price = format_price(item.price);
            ProductCard {
                id: item.id.clone(),
                name: item.name.clone(),
                price_label: format!("{price} {currency_label}").trim_end().to_string(),
                price,
                image_url: item.image_url.clone(),
                editing: editing_id == Some(&item.id),
                deleting: state.is_deleting(&item.id),
            }
        })
        .collect();

    let edit_form = state.draft_edit.as_ref().map(|edit| FormView {
        heading: "Edit product",
        submit_label: "Update product",
        submit_enabled: !state.is_updating(&edit.id),
        cancellable: true,
    });

    CatalogView {
        heading: CATALOG_HEADING,
        spinner: false,
        banner: state.error.as_ref().map(|error| error.banner_message()),
        cards,
        create_form: Some(FormView {
            heading: "Add new product",
            submit_label: "Add product",
            submit_enabled: !state.is_creating(),
            cancellable: false,
        }),
        edit_form,
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
