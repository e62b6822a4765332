use std::collections::HashMap;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use eframe::egui;
use egui::TextureHandle;

use crate::backend_bridge::{commands::BackendCommand, images::PreviewImage};
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_action;
use crate::controller::reducer::{Action, CatalogState, ProductForm};
use crate::ui::view::{render, CatalogView, FormView, ProductCard};

const CARD_WIDTH: f32 = 240.0;
const CARD_IMAGE_MAX: egui::Vec2 = egui::vec2(220.0, 160.0);
const MAX_IMAGE_REQUESTS_PER_FRAME: usize = 8;

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub api_base_url: String,
    pub currency_label: String,
}

enum CardImage {
    Loading,
    Decoded(PreviewImage),
    Ready {
        texture: TextureHandle,
        size: egui::Vec2,
    },
    Failed(String),
}

pub struct CatalogApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    startup: StartupConfig,
    state: CatalogState,
    images: HashMap<String, CardImage>,
    image_budget: usize,
}

#[derive(Default)]
struct FormResponse {
    submitted: bool,
    cancelled: bool,
}

impl CatalogApp {
    pub fn bootstrap(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            startup,
            state: CatalogState::default(),
            images: HashMap::new(),
            image_budget: MAX_IMAGE_REQUESTS_PER_FRAME,
        };
        app.state.status = "Connecting to catalog".to_string();
        dispatch_action(&mut app.state, &app.cmd_tx, Action::Mount);
        app
    }

    fn process_ui_events(&mut self) {
        let mut items_changed = false;
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                // Results for URLs pruned in the meantime are dropped.
                UiEvent::ImageLoaded { url, image } => {
                    if let Some(slot) = self.images.get_mut(&url) {
                        *slot = CardImage::Decoded(image);
                    }
                }
                UiEvent::ImageFailed { url, reason } => {
                    if let Some(slot) = self.images.get_mut(&url) {
                        *slot = CardImage::Failed(reason);
                    }
                }
                other => {
                    items_changed |= matches!(
                        other,
                        UiEvent::CatalogLoaded(_)
                            | UiEvent::ProductUpdated { .. }
                            | UiEvent::ProductDeleted(_)
                    );
                    dispatch_action(&mut self.state, &self.cmd_tx, Action::Backend(other));
                }
            }
        }
        if items_changed {
            self.prune_images();
        }
    }

    /// Drops image slots (and their textures) no card refers to any more.
    fn prune_images(&mut self) {
        let items = &self.state.items;
        self.images
            .retain(|url, _| items.iter().any(|item| &item.image_url == url));
    }

    /// Queues a fetch for `url` at most once. Image fetches never use more than
    /// half of the command queue or [`MAX_IMAGE_REQUESTS_PER_FRAME`] per frame;
    /// a deferred request is retried on a later frame.
    fn request_image(&mut self, url: &str) {
        if url.trim().is_empty() || self.images.contains_key(url) || self.image_budget == 0 {
            return;
        }
        if let Some(capacity) = self.cmd_tx.capacity() {
            if self.cmd_tx.len() * 2 >= capacity {
                return;
            }
        }

        let cmd = BackendCommand::FetchImage {
            url: url.to_string(),
        };
        match self.cmd_tx.try_send(cmd) {
            Ok(()) => {
                self.image_budget -= 1;
                self.images.insert(url.to_string(), CardImage::Loading);
            }
            Err(TrySendError::Full(_)) => {
                tracing::debug!(%url, "command queue full; deferring card image");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.images.insert(
                    url.to_string(),
                    CardImage::Failed("backend worker disconnected".to_string()),
                );
            }
        }
    }

    fn show_top_bar(&self, ctx: &egui::Context, view: &CatalogView, actions: &mut Vec<Action>) {
        egui::TopBottomPanel::top("catalog_top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading(view.heading);
                ui.weak(&self.startup.api_base_url);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(!view.spinner, egui::Button::new("Reload"))
                        .clicked()
                    {
                        actions.push(Action::Reload);
                    }
                });
            });
            ui.add_space(6.0);
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("catalog_status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(egui::RichText::new(&self.state.status).weak());
                if let Some(synced) = self.state.last_synced {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(
                            egui::RichText::new(format!(
                                "Last synced {}",
                                synced.format("%H:%M:%S")
                            ))
                            .weak(),
                        );
                    });
                }
            });
        });
    }

    fn show_catalog(&mut self, ctx: &egui::Context, view: &CatalogView, actions: &mut Vec<Action>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if view.spinner {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if let Some(message) = &view.banner {
                        show_error_banner(ui, message);
                        ui.add_space(8.0);
                    }

                    if view.cards.is_empty() {
                        ui.weak("No products yet.");
                    }
                    ui.horizontal_wrapped(|ui| {
                        for card in &view.cards {
                            self.show_card(ui, card, actions);
                        }
                    });

                    if let Some(form) = &view.create_form {
                        ui.add_space(16.0);
                        let response =
                            product_form_ui(ui, "create", &mut self.state.draft_new, form);
                        if response.submitted {
                            actions.push(Action::SubmitCreate);
                        }
                    }

                    if let (Some(form), Some(edit)) =
                        (&view.edit_form, self.state.draft_edit.as_mut())
                    {
                        ui.add_space(16.0);
                        let response = product_form_ui(ui, "edit", &mut edit.form, form);
                        if response.submitted {
                            actions.push(Action::SubmitEdit);
                        }
                        if response.cancelled {
                            actions.push(Action::CancelEdit);
                        }
                    }
                });
        });
    }

    fn show_card(&mut self, ui: &mut egui::Ui, card: &ProductCard, actions: &mut Vec<Action>) {
        ui.group(|ui| {
            ui.set_width(CARD_WIDTH);
            ui.vertical(|ui| {
                self.show_card_image(ui, &card.image_url);
                ui.label(egui::RichText::new(&card.name).strong().size(16.0));
                ui.label(&card.price_label);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!card.editing, egui::Button::new("Edit"))
                        .clicked()
                    {
                        actions.push(Action::BeginEdit(card.id.clone()));
                    }
                    let delete_label = if card.deleting { "Deleting…" } else { "Delete" };
                    if ui
                        .add_enabled(!card.deleting, egui::Button::new(delete_label))
                        .clicked()
                    {
                        actions.push(Action::Delete(card.id.clone()));
                    }
                });
            });
        });
    }

    fn show_card_image(&mut self, ui: &mut egui::Ui, url: &str) {
        self.request_image(url);
        let Some(slot) = self.images.get_mut(url) else {
            return;
        };

        if let CardImage::Decoded(image) = slot {
            let color_image =
                egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
            let size = egui::vec2(image.width as f32, image.height as f32);
            let texture = ui.ctx().load_texture(
                format!("card-image:{url}"),
                color_image,
                egui::TextureOptions::LINEAR,
            );
            *slot = CardImage::Ready { texture, size };
        }

        match slot {
            CardImage::Ready { texture, size } => {
                let scale = (CARD_IMAGE_MAX.x / size.x)
                    .min(CARD_IMAGE_MAX.y / size.y)
                    .min(1.0);
                ui.add(egui::Image::new(&*texture).fit_to_exact_size(*size * scale));
            }
            CardImage::Loading | CardImage::Decoded(_) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.weak("Loading image…");
                });
            }
            CardImage::Failed(reason) => {
                ui.weak("Image unavailable").on_hover_text(reason.as_str());
            }
        }
    }
}

fn show_error_banner(ui: &mut egui::Ui, message: &str) {
    egui::Frame::NONE
        .fill(egui::Color32::from_rgb(111, 53, 53))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
        });
}

fn product_form_ui(
    ui: &mut egui::Ui,
    salt: &'static str,
    form: &mut ProductForm,
    view: &FormView,
) -> FormResponse {
    let mut response = FormResponse::default();
    ui.heading(view.heading);
    egui::Grid::new((salt, "product_form"))
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Product name");
            ui.add(
                egui::TextEdit::singleline(&mut form.name)
                    .id_salt((salt, "name"))
                    .hint_text("Enter product name"),
            );
            ui.end_row();

            ui.label("Price");
            ui.add(
                egui::TextEdit::singleline(&mut form.price)
                    .id_salt((salt, "price"))
                    .hint_text("Enter price"),
            );
            ui.end_row();

            ui.label("Image URL");
            ui.add(
                egui::TextEdit::singleline(&mut form.image_url)
                    .id_salt((salt, "image_url"))
                    .hint_text("Enter image URL"),
            );
            ui.end_row();
        });

    ui.horizontal(|ui| {
        if ui
            .add_enabled(view.submit_enabled, egui::Button::new(view.submit_label))
            .clicked()
        {
            response.submitted = true;
        }
        if view.cancellable && ui.button("Cancel").clicked() {
            response.cancelled = true;
        }
    });
    response
}

impl eframe::App for CatalogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.image_budget = MAX_IMAGE_REQUESTS_PER_FRAME;

        let view = render(&self.state, &self.startup.currency_label);
        let mut actions = Vec::new();

        self.show_top_bar(ctx, &view, &mut actions);
        self.show_status_bar(ctx);
        self.show_catalog(ctx, &view, &mut actions);

        for action in actions {
            dispatch_action(&mut self.state, &self.cmd_tx, action);
        }

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
