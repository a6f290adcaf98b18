use chrono::Utc;
use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, TextEdit, Ui, ViewportBuilder};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod blog_client;
mod config;
mod error;
mod feed;
mod form;
mod models;
mod query_cache;
mod store;

use crate::blog_client::BlogClient;
use crate::config::AppConfig;
use crate::error::FetchError;
use crate::form::{FormField, StoryForm, ValidationErrors};
use crate::models::{CategoryKind, SortOption, Story, StoryId};
use crate::query_cache::QueryStatus;
use crate::store::{StoryQuery, StoryStore};

const DARK_MODE_KEY: &str = "is_dark_mode";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("story_hub=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(
        api = %config.api_base_url,
        stale_secs = config.stale_after.as_secs(),
        "starting Story Hub"
    );

    let client = BlogClient::new(&config)?;
    let store = Arc::new(StoryStore::new(Arc::new(client), config.stale_after));

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Story Hub"),
        ..Default::default()
    };

    eframe::run_native(
        "Story Hub",
        options,
        Box::new(move |cc| {
            let mut app = StoryHubApp::new(store);

            if let Some(storage) = cc.storage {
                if let Some(theme_str) = storage.get_string(DARK_MODE_KEY) {
                    if let Ok(is_dark_mode) = theme_str.parse::<bool>() {
                        app.set_dark_mode(is_dark_mode);
                    }
                }
            }

            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run Story Hub: {e}"))
}

struct AppTheme {
    background: Color32,
    card_background: Color32,
    active_card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    separator: Color32,
    error: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_active_background: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    fn dark() -> Self {
        Self {
            background: Color32::from_rgb(17, 19, 18),
            card_background: Color32::from_rgb(28, 31, 30),
            active_card_background: Color32::from_rgb(22, 44, 36),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(170, 176, 173),
            highlight: Color32::from_rgb(16, 185, 129), // emerald
            separator: Color32::from_rgb(58, 62, 60),
            error: Color32::from_rgb(248, 113, 113),
            button_background: Color32::from_rgb(50, 54, 52),
            button_foreground: Color32::from_rgb(240, 240, 240),
            button_active_background: Color32::from_rgb(16, 185, 129),
            button_hover_background: Color32::from_rgb(66, 72, 69),
        }
    }

    fn light() -> Self {
        Self {
            background: Color32::from_rgb(246, 247, 246),
            card_background: Color32::from_rgb(255, 255, 255),
            active_card_background: Color32::from_rgb(233, 248, 241),
            text: Color32::from_rgb(20, 22, 21),
            secondary_text: Color32::from_rgb(88, 94, 91),
            highlight: Color32::from_rgb(5, 150, 105),
            separator: Color32::from_rgb(205, 210, 207),
            error: Color32::from_rgb(200, 30, 30),
            button_background: Color32::from_rgb(232, 236, 234),
            button_foreground: Color32::from_rgb(20, 22, 21),
            button_active_background: Color32::from_rgb(5, 150, 105),
            button_hover_background: Color32::from_rgb(212, 220, 216),
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);

        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.weak_bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.button_active_background;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.weak_bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);
        style.visuals.hyperlink_color = self.highlight;
        style.visuals.extreme_bg_color = self.card_background;

        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.menu_corner_radius = CornerRadius::same(6);
        style.visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        ctx.set_style(style);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Home,
    Detail(StoryId),
    Create,
}

/// State of the create screen. Rebuilt every time the screen is opened.
#[derive(Default)]
struct Composer {
    form: StoryForm,
    errors: ValidationErrors,
    preview: bool,
    submit_error: Option<String>,
    pending: Option<Receiver<Result<Story, FetchError>>>,
}

struct StoryHubApp {
    store: Arc<StoryStore>,
    theme: AppTheme,
    is_dark_mode: bool,
    route: Route,
    search_query: String,
    sort: SortOption,
    composer: Composer,
}

impl StoryHubApp {
    fn new(store: Arc<StoryStore>) -> Self {
        Self {
            store,
            theme: AppTheme::dark(),
            is_dark_mode: true,
            route: Route::Home,
            search_query: String::new(),
            sort: SortOption::default(),
            composer: Composer::default(),
        }
    }

    fn set_dark_mode(&mut self, is_dark_mode: bool) {
        self.is_dark_mode = is_dark_mode;
        self.theme = if is_dark_mode {
            AppTheme::dark()
        } else {
            AppTheme::light()
        };
    }

    fn toggle_theme(&mut self) {
        self.set_dark_mode(!self.is_dark_mode);
    }

    /// Reads `query` on a worker thread; the result lands in the store and the next frame picks
    /// it up from a snapshot.
    fn spawn_load(&self, ctx: &egui::Context, query: StoryQuery) {
        // marked loading here, before the worker runs, so later frames don't spawn again
        if !self.store.begin(query) {
            return;
        }

        let store = self.store.clone();
        let repaint_ctx = ctx.clone();
        thread::spawn(move || {
            if let Err(err) = store.load(query) {
                warn!(?query, url = err.url(), error = %err, "background load failed");
            }
            repaint_ctx.request_repaint();
        });
        ctx.request_repaint();
    }

    fn ensure_loaded(&self, ctx: &egui::Context, query: StoryQuery) {
        let needs_fetch = match query {
            StoryQuery::All => self.store.stories_snapshot().needs_fetch(),
            StoryQuery::ById(id) => self.store.story_snapshot(id).needs_fetch(),
        };
        if needs_fetch {
            self.spawn_load(ctx, query);
        }
    }

    fn navigate(&mut self, ctx: &egui::Context, route: Route) {
        if self.route == route {
            return;
        }
        debug!(?route, "navigate");

        match route {
            // opening a story again is the retry path for a failed detail read
            Route::Detail(id) => {
                if self.store.story_snapshot(id).status == QueryStatus::Failed {
                    self.spawn_load(ctx, StoryQuery::ById(id));
                }
            }
            Route::Create => {
                if self.composer.pending.is_none() {
                    self.composer = Composer::default();
                }
            }
            Route::Home => {}
        }

        self.route = route;
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(url, error = %e, "failed to open link");
        }
    }

    fn submit(&mut self, ctx: &egui::Context) {
        if self.composer.pending.is_some() {
            return;
        }

        let draft = match self.composer.form.to_draft(Utc::now()) {
            Ok(draft) => draft,
            Err(errors) => {
                debug!(%errors, "draft rejected");
                self.composer.errors = errors;
                return;
            }
        };

        self.composer.errors = ValidationErrors::default();
        self.composer.submit_error = None;

        let store = self.store.clone();
        let ctx = ctx.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(store.create_story(&draft));
            ctx.request_repaint();
        });

        self.composer.pending = Some(rx);
    }

    fn check_submission(&mut self) {
        let Some(rx) = &self.composer.pending else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(story)) => {
                debug!(id = story.id, "publish finished");
                self.composer = Composer::default();
                self.route = Route::Home;
            }
            Ok(Err(err)) => {
                error!(error = %err, "failed to publish story");
                self.composer.pending = None;
                self.composer.submit_error = Some(format!("Failed to publish story: {err}"));
            }
            Err(TryRecvError::Empty) => {
                // Still waiting for the backend
            }
            Err(TryRecvError::Disconnected) => {
                self.composer.pending = None;
                self.composer.submit_error =
                    Some("The publish request was interrupted. Please try again.".to_string());
            }
        }
    }

    fn render_top_bar(&mut self, ui: &mut Ui) {
        let mut open_composer = false;

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Stories")
                    .size(22.0)
                    .strong()
                    .color(self.theme.text),
            );
            ui.label(
                RichText::new(".")
                    .size(22.0)
                    .strong()
                    .color(self.theme.highlight),
            );
            ui.add_space(16.0);

            ui.add(
                TextEdit::singleline(&mut self.search_query)
                    .hint_text("Search stories or categories...")
                    .desired_width(300.0)
                    .id(egui::Id::new("search_input")),
            );
            if !self.search_query.is_empty() && ui.small_button("✖").clicked() {
                self.search_query.clear();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "☀" } else { "🌙" };
                if ui
                    .button(RichText::new(theme_icon).size(16.0))
                    .on_hover_text("Toggle theme")
                    .clicked()
                {
                    self.toggle_theme();
                }

                if ui
                    .button(RichText::new("✏ Write").color(self.theme.button_foreground))
                    .clicked()
                {
                    open_composer = true;
                }
            });
        });
        ui.add_space(6.0);

        if open_composer {
            let ctx = ui.ctx().clone();
            self.navigate(&ctx, Route::Create);
        }
    }

    fn render_story_list(&mut self, ui: &mut Ui) {
        let ctx = ui.ctx().clone();
        let snapshot = self.store.stories_snapshot();

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Live Feed").strong().color(self.theme.highlight));
            if snapshot.is_loading() && snapshot.data.is_some() {
                ui.spinner();
            }
        });
        ui.add_space(4.0);

        let Some(stories) = snapshot.data.clone() else {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                if snapshot.status == QueryStatus::Failed {
                    ui.label(
                        RichText::new("Failed to load stories. Please try again.")
                            .color(self.theme.error),
                    );
                    if let Some(err) = &snapshot.error {
                        ui.label(
                            RichText::new(err.to_string())
                                .small()
                                .color(self.theme.secondary_text),
                        );
                    }
                    ui.add_space(8.0);
                    if ui.button("⟳ Retry").clicked() {
                        self.spawn_load(&ctx, StoryQuery::All);
                    }
                } else {
                    ui.spinner();
                    ui.add_space(12.0);
                    ui.label(
                        RichText::new("Loading stories...").color(self.theme.secondary_text),
                    );
                }
            });
            return;
        };

        if snapshot.status == QueryStatus::Failed {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("Refresh failed, showing saved stories.")
                        .small()
                        .color(self.theme.error),
                );
                if ui.small_button("⟳ Retry").clicked() {
                    self.spawn_load(&ctx, StoryQuery::All);
                }
            });
            if let Some(err) = &snapshot.error {
                ui.label(
                    RichText::new(err.to_string())
                        .small()
                        .color(self.theme.secondary_text),
                );
            }
        }

        let visible = feed::visible_stories(&stories, &self.search_query, self.sort);

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(feed::result_count_label(visible.len()))
                    .small()
                    .color(self.theme.secondary_text),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                egui::ComboBox::from_id_salt("sort_option")
                    .selected_text(self.sort.label())
                    .show_ui(ui, |ui| {
                        for option in SortOption::ALL {
                            ui.selectable_value(&mut self.sort, option, option.label());
                        }
                    });
            });
        });
        ui.add(egui::Separator::default().spacing(8.0));

        if visible.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(RichText::new("No stories found").strong().color(self.theme.text));
                ui.label(
                    RichText::new("Try different keywords or clear the search.")
                        .color(self.theme.secondary_text),
                );
            });
            return;
        }

        let mut opened = None;
        ScrollArea::vertical()
            .id_salt("stories_scroll_area")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for story in &visible {
                    let is_active = self.route == Route::Detail(story.id);
                    if self.render_story_card(ui, story, is_active) {
                        opened = Some(story.id);
                    }
                }
            });

        if let Some(id) = opened {
            self.navigate(&ctx, Route::Detail(id));
        }
    }

    /// Returns true when the card was clicked.
    fn render_story_card(&self, ui: &mut Ui, story: &Story, is_active: bool) -> bool {
        let (fill, stroke) = if is_active {
            (
                self.theme.active_card_background,
                Stroke::new(1.5, self.theme.highlight),
            )
        } else {
            (
                self.theme.card_background,
                Stroke::new(1.0, self.theme.separator),
            )
        };

        let response = egui::Frame::new()
            .fill(fill)
            .corner_radius(CornerRadius::same(10))
            .stroke(stroke)
            .inner_margin(12.0)
            .outer_margin(egui::vec2(4.0, 4.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                // text selection would swallow the card click
                ui.style_mut().interaction.selectable_labels = false;

                ui.horizontal(|ui| {
                    let primary = story.primary_category();
                    let kind = CategoryKind::from_tag(primary);
                    ui.label(
                        RichText::new(format!("{} {}", kind.glyph(), primary.to_uppercase()))
                            .small()
                            .strong()
                            .color(self.theme.highlight),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(story.short_date())
                                .small()
                                .color(self.theme.secondary_text),
                        );
                    });
                });

                let title_color = if is_active {
                    self.theme.highlight
                } else {
                    self.theme.text
                };
                ui.label(
                    RichText::new(&story.title)
                        .size(16.0)
                        .strong()
                        .color(title_color),
                );
                if !story.description.is_empty() {
                    ui.label(RichText::new(&story.description).color(self.theme.secondary_text));
                }
            })
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand);

        response.clicked()
    }

    fn render_landing(&mut self, ui: &mut Ui) {
        let mut start_writing = false;

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.label(RichText::new("✒").size(56.0).color(self.theme.highlight));
            ui.add_space(12.0);
            ui.label(
                RichText::new("Select a story to begin")
                    .size(28.0)
                    .strong()
                    .color(self.theme.text),
            );
            ui.add_space(6.0);
            ui.label(
                RichText::new(
                    "Pick any post from the sidebar to read the full article, or write your own.",
                )
                .size(16.0)
                .color(self.theme.secondary_text),
            );
            ui.add_space(16.0);
            if ui.button(RichText::new("✏ Start writing").size(16.0)).clicked() {
                start_writing = true;
            }
        });

        if start_writing {
            let ctx = ui.ctx().clone();
            self.navigate(&ctx, Route::Create);
        }
    }

    fn render_detail(&mut self, ui: &mut Ui, id: StoryId) {
        let ctx = ui.ctx().clone();
        let snapshot = self.store.story_snapshot(id);

        let Some(story) = snapshot.data.clone() else {
            let mut go_home = false;
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.3);
                if snapshot.status == QueryStatus::Failed {
                    ui.label(
                        RichText::new("Story not found")
                            .size(26.0)
                            .strong()
                            .color(self.theme.text),
                    );
                    let reason = match &snapshot.error {
                        Some(err) if !err.is_not_found() => err.to_string(),
                        _ => "It may have been moved, or the link is wrong.".to_string(),
                    };
                    ui.label(RichText::new(reason).color(self.theme.secondary_text));
                    ui.add_space(12.0);
                    go_home = ui.button("Return Home").clicked();
                } else {
                    ui.spinner();
                    ui.add_space(12.0);
                    ui.label(RichText::new("Loading story...").color(self.theme.secondary_text));
                }
            });
            if go_home {
                self.navigate(&ctx, Route::Home);
            }
            return;
        };

        let all = self.store.stories_snapshot().data.unwrap_or_default();
        let related = feed::related_stories(&story, &all);

        let mut next_route = None;
        ScrollArea::vertical()
            .id_salt("detail_scroll_area")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(8.0);
                if ui.button("← Back").clicked() {
                    next_route = Some(Route::Home);
                }
                ui.add_space(12.0);

                ui.horizontal_wrapped(|ui| {
                    for tag in &story.category {
                        egui::Frame::new()
                            .fill(self.theme.active_card_background)
                            .corner_radius(CornerRadius::same(12))
                            .inner_margin(egui::vec2(8.0, 3.0))
                            .show(ui, |ui| {
                                ui.label(
                                    RichText::new(tag)
                                        .small()
                                        .strong()
                                        .color(self.theme.highlight),
                                );
                            });
                    }
                });
                ui.add_space(8.0);

                ui.label(
                    RichText::new(&story.title)
                        .size(32.0)
                        .strong()
                        .color(self.theme.text),
                );
                ui.label(
                    RichText::new(format!("🕑 {}", story.long_date()))
                        .color(self.theme.secondary_text),
                );

                if !story.cover_image.is_empty() {
                    ui.add_space(4.0);
                    if ui.link("🖼 Open cover image").clicked() {
                        self.open_link(&story.cover_image);
                    }
                }

                ui.add_space(16.0);
                ui.label(
                    RichText::new(&story.description)
                        .size(18.0)
                        .italics()
                        .color(self.theme.secondary_text),
                );
                ui.add(egui::Separator::default().spacing(16.0));
                ui.label(RichText::new(&story.content).size(16.0).color(self.theme.text));

                if !related.is_empty() {
                    ui.add_space(24.0);
                    ui.add(egui::Separator::default().spacing(12.0));
                    ui.label(
                        RichText::new("Related Stories")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text),
                    );
                    ui.add_space(6.0);
                    for related_story in &related {
                        if self.render_story_card(ui, related_story, false) {
                            next_route = Some(Route::Detail(related_story.id));
                        }
                    }
                }
                ui.add_space(24.0);
            });

        if let Some(route) = next_route {
            self.navigate(&ctx, route);
        }
    }

    fn render_composer(&mut self, ui: &mut Ui) {
        let ctx = ui.ctx().clone();
        let submitting = self.composer.pending.is_some();
        let mut cancel = false;
        let mut publish = false;

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("← Back").clicked() {
                cancel = true;
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.selectable_value(&mut self.composer.preview, true, "👁 Preview");
                ui.selectable_value(&mut self.composer.preview, false, "✏ Edit");
            });
        });
        ui.add_space(12.0);

        ScrollArea::vertical()
            .id_salt("composer_scroll_area")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.composer.preview {
                    self.render_preview(ui);
                } else {
                    self.render_form_fields(ui);
                }

                ui.add_space(16.0);
                if let Some(message) = &self.composer.submit_error {
                    ui.label(RichText::new(format!("⚠ {message}")).color(self.theme.error));
                    ui.add_space(8.0);
                }

                ui.horizontal(|ui| {
                    let label = if submitting {
                        "Publishing..."
                    } else {
                        "💾 Publish Story"
                    };
                    if ui
                        .add_enabled(!submitting, egui::Button::new(RichText::new(label).strong()))
                        .clicked()
                    {
                        publish = true;
                    }
                    if submitting {
                        ui.spinner();
                    }
                    if ui.add_enabled(!submitting, egui::Button::new("✖ Cancel")).clicked() {
                        cancel = true;
                    }
                });
            });

        if publish {
            self.submit(&ctx);
        } else if cancel {
            self.navigate(&ctx, Route::Home);
        }
    }

    fn render_form_fields(&mut self, ui: &mut Ui) {
        for field in FormField::ALL {
            ui.label(
                RichText::new(field.label())
                    .strong()
                    .color(self.theme.secondary_text),
            );

            let text = self.composer.form.field_mut(field);
            let editor = match field {
                FormField::Content => TextEdit::multiline(text).desired_rows(14),
                FormField::Description => TextEdit::multiline(text).desired_rows(3),
                _ => TextEdit::singleline(text),
            };
            let response = ui.add(
                editor
                    .hint_text(field_hint(field))
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                self.composer.errors.clear(field);
            }

            if let Some(message) = self.composer.errors.get(field) {
                ui.label(RichText::new(message).small().color(self.theme.error));
            }
            ui.add_space(10.0);
        }
    }

    fn render_preview(&self, ui: &mut Ui) {
        let form = &self.composer.form;
        let tags = form::normalize_categories(&form.category);

        ui.horizontal_wrapped(|ui| {
            for tag in &tags {
                ui.label(RichText::new(tag).small().strong().color(self.theme.highlight));
            }
        });

        let title = if form.title.is_empty() {
            "Untitled story"
        } else {
            form.title.as_str()
        };
        ui.label(RichText::new(title).size(32.0).strong().color(self.theme.text));

        if !form.cover_image.is_empty() && ui.link("🖼 Open cover image").clicked() {
            self.open_link(&form.cover_image);
        }

        ui.add_space(12.0);
        ui.label(
            RichText::new(&form.description)
                .size(18.0)
                .italics()
                .color(self.theme.secondary_text),
        );
        ui.add(egui::Separator::default().spacing(12.0));
        ui.label(RichText::new(&form.content).size(16.0).color(self.theme.text));
    }
}

fn field_hint(field: FormField) -> &'static str {
    match field {
        FormField::Title => "Title of your story...",
        FormField::Category => "Comma separated, e.g. Tech, Life",
        FormField::Description => "A short summary shown in the story list",
        FormField::CoverImage => "Paste an image URL (https://...)",
        FormField::Content => "Tell your story...",
    }
}

impl eframe::App for StoryHubApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string(DARK_MODE_KEY, self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        self.check_submission();

        self.ensure_loaded(ctx, StoryQuery::All);
        if let Route::Detail(id) = self.route {
            self.ensure_loaded(ctx, StoryQuery::ById(id));
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            self.render_top_bar(ui);
        });

        egui::SidePanel::left("stories_panel")
            .resizable(true)
            .default_width(360.0)
            .min_width(260.0)
            .show(ctx, |ui| {
                self.render_story_list(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.route {
            Route::Home => self.render_landing(ui),
            Route::Detail(id) => self.render_detail(ui, id),
            Route::Create => self.render_composer(ui),
        });
    }
}
