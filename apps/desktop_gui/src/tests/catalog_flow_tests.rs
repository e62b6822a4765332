//! End-to-end flows: reducer, backend worker and HTTP client against a local stub catalog.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use client_core::HttpCatalogClient;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde_json::{json, Value};
use shared::domain::{Product, ProductId};
use tokio::{net::TcpListener, sync::Mutex};

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::UiEvent;
use crate::controller::reducer::{reduce, Action, CatalogState};
use crate::ui::view::{render, CatalogView};

const EVENT_WAIT: Duration = Duration::from_secs(10);

#[derive(Clone, Default)]
struct StubCatalog {
    items: Arc<Mutex<Vec<Product>>>,
    next_id: Arc<Mutex<u32>>,
    fail_with: Arc<Mutex<Option<StatusCode>>>,
}

impl StubCatalog {
    fn seeded(items: Vec<Product>) -> Self {
        let next = items.len() as u32 + 1;
        Self {
            items: Arc::new(Mutex::new(items)),
            next_id: Arc::new(Mutex::new(next)),
            fail_with: Arc::new(Mutex::new(None)),
        }
    }

    async fn failing(&self, status: Option<StatusCode>) {
        *self.fail_with.lock().await = status;
    }

    async fn check(&self) -> Result<(), (StatusCode, Json<Value>)> {
        match *self.fail_with.lock().await {
            Some(status) => Err((status, Json(json!({ "message": "stub failure" })))),
            None => Ok(()),
        }
    }

    fn router(self) -> Router {
        Router::new()
            .route("/api/items", get(list_items))
            .route("/api/items/add", post(add_item))
            .route("/api/items/update/:id", put(update_item))
            .route("/api/items/delete/:id", delete(delete_item))
            .with_state(self)
    }
}

type StubResult<T> = Result<T, (StatusCode, Json<Value>)>;

fn product_from_body(id: String, body: &Value) -> Product {
    Product {
        id: ProductId::new(id),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        price: body["price"].as_f64().unwrap_or_default(),
        image_url: body["imageUrl"].as_str().unwrap_or_default().to_string(),
    }
}

async fn list_items(State(stub): State<StubCatalog>) -> StubResult<Json<Vec<Product>>> {
    stub.check().await?;
    Ok(Json(stub.items.lock().await.clone()))
}

async fn add_item(State(stub): State<StubCatalog>, Json(body): Json<Value>) -> StubResult<Json<Value>> {
    stub.check().await?;
    let id = {
        let mut next = stub.next_id.lock().await;
        let id = next.to_string();
        *next += 1;
        id
    };
    let product = product_from_body(id, &body);
    stub.items.lock().await.push(product.clone());
    Ok(Json(json!({ "message": "created", "newProduct": product })))
}

async fn update_item(
    State(stub): State<StubCatalog>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StubResult<Json<Value>> {
    stub.check().await?;
    let product = product_from_body(id.clone(), &body);
    let mut items = stub.items.lock().await;
    match items.iter_mut().find(|item| item.id.as_str() == id) {
        Some(existing) => *existing = product.clone(),
        None => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "no such product" })),
            ))
        }
    }
    Ok(Json(json!({ "updatedProduct": product })))
}

async fn delete_item(State(stub): State<StubCatalog>, Path(id): Path<String>) -> StubResult<StatusCode> {
    stub.check().await?;
    stub.items.lock().await.retain(|item| item.id.as_str() != id);
    Ok(StatusCode::OK)
}

async fn spawn_stub(stub: StubCatalog) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, stub.router()).await;
    });
    format!("http://{addr}")
}

fn product(id: &str, name: &str, price: f64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price,
        image_url: format!("u{id}"),
    }
}

/// Drives the reducer the way the app does, waiting for each settle event.
struct Harness {
    state: CatalogState,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
}

impl Harness {
    fn connect(base_url: &str) -> Self {
        let api = HttpCatalogClient::new(base_url).expect("client");
        let (cmd_tx, cmd_rx) = bounded(16);
        let (ui_tx, ui_rx) = bounded(16);
        runtime::launch(Arc::new(api), cmd_rx, ui_tx);
        Self {
            state: CatalogState::default(),
            cmd_tx,
            ui_rx,
        }
    }

    fn dispatch(&mut self, action: Action) {
        let Some(cmd) = reduce(&mut self.state, action) else {
            return;
        };
        self.cmd_tx.send(cmd).expect("queue command");
        let event = self.ui_rx.recv_timeout(EVENT_WAIT).expect("settle event");
        reduce(&mut self.state, Action::Backend(event));
    }

    fn view(&self) -> CatalogView {
        render(&self.state, "VND")
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mount_lists_one_card_per_product() {
    let base = spawn_stub(StubCatalog::seeded(vec![product("1", "A", 10.0)])).await;
    let mut harness = Harness::connect(&base);

    harness.dispatch(Action::Mount);
    let view = harness.view();

    assert!(!view.spinner);
    assert!(view.banner.is_none());
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].name, "A");
    assert_eq!(view.cards[0].price, "10");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_list_shows_fetch_banner_and_no_cards() {
    let stub = StubCatalog::seeded(vec![product("1", "A", 10.0)]);
    stub.failing(Some(StatusCode::INTERNAL_SERVER_ERROR)).await;
    let base = spawn_stub(stub).await;
    let mut harness = Harness::connect(&base);

    harness.dispatch(Action::Mount);
    let view = harness.view();

    assert!(view.cards.is_empty());
    let banner = view.banner.expect("banner");
    assert!(banner.starts_with("Failed to fetch products:"), "{banner}");
    assert!(banner.contains("500"), "{banner}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn created_product_appears_as_second_card() {
    let base = spawn_stub(StubCatalog::seeded(vec![product("1", "A", 10.0)])).await;
    let mut harness = Harness::connect(&base);
    harness.dispatch(Action::Mount);

    harness.state.draft_new.name = "B".to_string();
    harness.state.draft_new.price = "20".to_string();
    harness.state.draft_new.image_url = "v".to_string();
    harness.dispatch(Action::SubmitCreate);

    let view = harness.view();
    assert_eq!(view.cards.len(), 2);
    assert_eq!(view.cards[1].name, "B");
    assert_eq!(view.cards[1].price, "20");
    assert_eq!(view.cards[1].image_url, "v");
    assert!(harness.state.draft_new.name.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn edit_replaces_fields_and_closes_form() {
    let base = spawn_stub(StubCatalog::seeded(vec![
        product("1", "A", 10.0),
        product("2", "B", 20.0),
    ]))
    .await;
    let mut harness = Harness::connect(&base);
    harness.dispatch(Action::Mount);

    harness.dispatch(Action::BeginEdit(ProductId::new("1")));
    if let Some(edit) = harness.state.draft_edit.as_mut() {
        edit.form.name = "A2".to_string();
        edit.form.price = "15".to_string();
    }
    harness.dispatch(Action::SubmitEdit);

    let view = harness.view();
    assert!(view.edit_form.is_none());
    assert_eq!(view.cards.len(), 2);
    assert_eq!(view.cards[0].name, "A2");
    assert_eq!(view.cards[0].price, "15");
    assert_eq!(view.cards[1].name, "B");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delete_removes_only_that_card() {
    let base = spawn_stub(StubCatalog::seeded(vec![
        product("1", "A", 10.0),
        product("2", "B", 20.0),
    ]))
    .await;
    let mut harness = Harness::connect(&base);
    harness.dispatch(Action::Mount);

    harness.dispatch(Action::Delete(ProductId::new("1")));

    let view = harness.view();
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].name, "B");
    assert!(view.banner.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_delete_keeps_card_and_shows_banner() {
    let stub = StubCatalog::seeded(vec![product("1", "A", 10.0)]);
    let base = spawn_stub(stub.clone()).await;
    let mut harness = Harness::connect(&base);
    harness.dispatch(Action::Mount);

    stub.failing(Some(StatusCode::SERVICE_UNAVAILABLE)).await;
    harness.dispatch(Action::Delete(ProductId::new("1")));

    let view = harness.view();
    assert_eq!(view.cards.len(), 1);
    assert!(!view.cards[0].deleting);
    let banner = view.banner.expect("banner");
    assert!(banner.starts_with("Failed to delete product:"), "{banner}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reloading_unchanged_catalog_renders_identically() {
    let base = spawn_stub(StubCatalog::seeded(vec![
        product("1", "A", 10.0),
        product("2", "B", 20.5),
    ]))
    .await;
    let mut harness = Harness::connect(&base);

    harness.dispatch(Action::Mount);
    let first = harness.view();
    harness.dispatch(Action::Reload);
    let second = harness.view();

    assert_eq!(first, second);
    assert_eq!(second.cards[1].price_label, "20.5 VND");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reload_recovers_from_failed_listing() {
    let stub = StubCatalog::seeded(vec![product("1", "A", 10.0)]);
    stub.failing(Some(StatusCode::BAD_GATEWAY)).await;
    let base = spawn_stub(stub.clone()).await;
    let mut harness = Harness::connect(&base);
    harness.dispatch(Action::Mount);
    assert!(harness.view().banner.is_some());

    stub.failing(None).await;
    harness.dispatch(Action::Reload);

    let view = harness.view();
    assert!(view.banner.is_none());
    assert_eq!(view.cards.len(), 1);
}
