use super::*;
use crate::controller::events::{CatalogOperation, UiError, UiEvent};
use crate::controller::reducer::{reduce, Action};
use shared::{domain::Product, error::CatalogError};

fn product(id: &str, name: &str, price: f64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price,
        image_url: "u".to_string(),
    }
}

fn loaded(items: Vec<Product>) -> CatalogState {
    let mut state = CatalogState::default();
    reduce(&mut state, Action::Mount);
    reduce(&mut state, Action::Backend(UiEvent::CatalogLoaded(items)));
    state
}

#[test]
fn loading_state_renders_only_a_spinner() {
    let mut state = CatalogState::default();
    reduce(&mut state, Action::Mount);

    let view = render(&state, "VND");
    assert!(view.spinner);
    assert!(view.cards.is_empty());
    assert!(view.create_form.is_none());
    assert!(view.edit_form.is_none());
}

#[test]
fn one_card_per_product_with_label_and_price() {
    let view = render(&loaded(vec![product("1", "A", 10.0)]), "VND");

    assert!(!view.spinner);
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].name, "A");
    assert_eq!(view.cards[0].price, "10");
    assert_eq!(view.cards[0].price_label, "10 VND");
    assert!(view.banner.is_none());
    assert!(view.edit_form.is_none());
    assert_eq!(
        view.create_form.as_ref().map(|form| form.submit_enabled),
        Some(true)
    );
}

#[test]
fn empty_currency_label_leaves_bare_price() {
    let view = render(&loaded(vec![product("1", "A", 7.25)]), "");
    assert_eq!(view.cards[0].price_label, "7.25");
}

#[test]
fn banner_shows_current_error() {
    let mut state = loaded(vec![product("1", "A", 10.0)]);
    reduce(
        &mut state,
        Action::Backend(UiEvent::OperationFailed {
            error: UiError::from_catalog(
                CatalogOperation::Delete,
                &CatalogError::Network("connection reset".to_string()),
            ),
            target: Some(ProductId::new("1")),
        }),
    );

    let view = render(&state, "VND");
    assert_eq!(
        view.banner.as_deref(),
        Some("Failed to delete product: connection reset")
    );
    assert_eq!(view.cards.len(), 1);
}

#[test]
fn edit_form_appears_for_draft_and_marks_card() {
    let mut state = loaded(vec![product("1", "A", 10.0), product("2", "B", 20.0)]);
    reduce(&mut state, Action::BeginEdit(ProductId::new("2")));

    let view = render(&state, "VND");
    let edit = view.edit_form.as_ref().expect("edit form");
    assert!(edit.submit_enabled);
    assert!(edit.cancellable);
    assert!(!view.cards[0].editing);
    assert!(view.cards[1].editing);

    reduce(&mut state, Action::SubmitEdit);
    let view = render(&state, "VND");
    assert_eq!(
        view.edit_form.as_ref().map(|form| form.submit_enabled),
        Some(false)
    );
}

#[test]
fn in_flight_operations_disable_their_controls() {
    let mut state = loaded(vec![product("1", "A", 10.0)]);
    state.draft_new.price = "3".to_string();
    reduce(&mut state, Action::SubmitCreate);
    reduce(&mut state, Action::Delete(ProductId::new("1")));

    let view = render(&state, "VND");
    assert_eq!(
        view.create_form.as_ref().map(|form| form.submit_enabled),
        Some(false)
    );
    assert!(view.cards[0].deleting);
}

#[test]
fn rendering_same_listing_twice_is_identical() {
    let items = vec![product("1", "A", 10.0), product("2", "B", 20.0)];
    let mut state = loaded(items.clone());
    let first = render(&state, "VND");

    reduce(&mut state, Action::Reload);
    reduce(&mut state, Action::Backend(UiEvent::CatalogLoaded(items)));
    let second = render(&state, "VND");

    assert_eq!(first, second);
}
