use crate::application::{CatalogSession, SyncPhase};
use crate::domain::entities::{AppConfig, ThemeMode};
use crate::domain::services::FilterCodec;
use crate::infrastructure::ConfigRepository;
use crate::infrastructure::history::{BrowserHistory, HistoryNavigationAdapter};
use crate::presentation::components::{
    AddressAction, AddressBar, FilterSidebar, LogEntry, LogManager, SidebarAction,
};
use crate::presentation::style::configure_style;
use anyhow::{Context, Result};
use eframe::egui;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use url::Url;

pub struct StorefrontApp {
    config: AppConfig,
    config_repository: ConfigRepository,
    share_origin: Url,
    history: Rc<BrowserHistory>,
    /// Mounted while the current entry is the listing page.
    session: Option<CatalogSession>,
    sidebar: FilterSidebar,
    address_bar: AddressBar,
    log_manager: LogManager,
    log_rx: Receiver<LogEntry>,
    status_message: String,
    style_applied: bool,
}

impl StorefrontApp {
    /// Opens `start_location` (the listing page if none) and mounts the
    /// listing's filter session on it.
    pub fn new(
        config: AppConfig,
        config_repository: ConfigRepository,
        start_location: Option<String>,
        log_rx: Receiver<LogEntry>,
    ) -> Result<Self> {
        let share_origin = Url::parse(&config.share_origin)
            .with_context(|| format!("Invalid share origin {:?}", config.share_origin))?;

        let history = Rc::new(BrowserHistory::new(&config.sync));
        let location = start_location.unwrap_or_else(|| config.listing_path.clone());
        history
            .load(&location)
            .with_context(|| format!("Cannot open {:?}", location))?;

        let mut app = Self {
            config,
            config_repository,
            share_origin,
            history,
            session: None,
            sidebar: FilterSidebar::new(),
            address_bar: AddressBar::new(),
            log_manager: LogManager::new(),
            log_rx,
            status_message: String::new(),
            style_applied: false,
        };
        app.sync_mount();
        Ok(app)
    }

    /// Mounts the listing session on entering the listing page and drops it,
    /// filters included, on leaving.
    fn sync_mount(&mut self) {
        match (self.on_listing_page(), self.session.is_some()) {
            (true, false) => {
                let navigation = Rc::new(HistoryNavigationAdapter::new(
                    &self.history,
                    &self.config.listing_path,
                ));
                self.session = Some(CatalogSession::mount(navigation, &self.config));
            }
            (false, true) => {
                if let Some(session) = self.session.take() {
                    session.unmount();
                }
            }
            _ => {}
        }
    }

    fn set_theme(&mut self, ctx: &egui::Context, theme: ThemeMode) {
        self.config.theme = theme;
        configure_style(ctx, theme);
        match self.config_repository.save(&self.config) {
            Ok(()) => tracing::debug!("Saved {:?} theme", theme),
            Err(e) => {
                tracing::warn!("Could not save config: {:#}", e);
                self.status_message = format!("Could not save config: {}", e);
            }
        }
    }

    fn poll_logs(&mut self) {
        self.log_manager.extend(self.log_rx.try_iter());
    }

    fn handle_address_action(&mut self, ctx: &egui::Context, action: AddressAction) {
        match action {
            AddressAction::Back => {
                self.history.back();
            }
            AddressAction::Forward => {
                self.history.forward();
            }
            AddressAction::Navigate(location) => {
                if let Err(e) = self.history.push(&location) {
                    tracing::warn!("Navigation failed: {}", e);
                    self.status_message = e.to_string();
                }
            }
            AddressAction::CopyShareLink => match self.share_link() {
                Ok(url) => {
                    ctx.copy_text(url.to_string());
                    self.status_message = format!("Copied {}", url);
                }
                Err(e) => {
                    tracing::warn!("Could not build share link: {}", e);
                    self.status_message = format!("Could not build share link: {}", e);
                }
            },
        }
        self.sync_mount();
    }

    /// The listing's canonical link, or the current location elsewhere.
    fn share_link(&self) -> Result<Url, url::ParseError> {
        match &self.session {
            Some(session) => session.share_url(&self.share_origin),
            None => self.share_origin.join(&self.history.location()),
        }
    }

    fn handle_sidebar_action(session: &CatalogSession, action: SidebarAction) {
        let store = session.store();
        match action {
            SidebarAction::Apply(filters) => store.set_filters(filters),
            SidebarAction::ClearAll => store.clear_filters(),
        }
    }

    fn on_listing_page(&self) -> bool {
        self.history.current().path == self.config.listing_path
    }

    fn show_summary(&self, ui: &mut egui::Ui, session: &CatalogSession) {
        let filters = session.store().filters();
        let controller = session.controller();

        ui.heading("Products");
        ui.label(format!(
            "{} active filters · price {}",
            filters.active_filter_count(),
            filters.price_range()
        ));
        ui.separator();

        egui::Grid::new("sync_status").striped(true).show(ui, |ui| {
            ui.label("Sync phase");
            ui.label(format!("{:?}", controller.phase()));
            ui.end_row();

            let stats = controller.stats();
            ui.label("Address writes");
            ui.label(format!("{} ({} failed)", stats.writes, stats.failed_writes));
            ui.end_row();
            ui.label("Echoes ignored");
            ui.label(stats.echoes_suppressed.to_string());
            ui.end_row();
            ui.label("Navigations applied");
            ui.label(stats.navigations_applied.to_string());
            ui.end_row();
            ui.label("Last write");
            ui.monospace(controller.last_written_query().unwrap_or_else(|| "—".to_string()));
            ui.end_row();
        });

        ui.separator();
        ui.label("Catalog query handed to the product service:");
        let query = FilterCodec::encode(&filters).to_string();
        ui.monospace(if query.is_empty() { "(all products)" } else { query.as_str() });
    }
}

impl eframe::App for StorefrontApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.style_applied {
            self.style_applied = true;
            configure_style(ctx, self.config.theme);
        }
        self.poll_logs();

        egui::TopBottomPanel::top("address_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            let actions = self.address_bar.show(
                ui,
                &self.history.location(),
                self.history.can_go_back(),
                self.history.can_go_forward(),
            );
            for action in actions {
                self.handle_address_action(ctx, action);
            }
            if !self.status_message.is_empty() {
                ui.small(&self.status_message);
            }
        });

        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(160.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Clear log").clicked() {
                        self.log_manager.clear();
                    }
                    ui.checkbox(self.log_manager.show_trace_mut(), "Show trace");

                    let mut theme = self.config.theme;
                    egui::ComboBox::from_label("Theme")
                        .selected_text(format!("{:?}", theme))
                        .show_ui(ui, |ui| {
                            for mode in [ThemeMode::System, ThemeMode::Light, ThemeMode::Dark] {
                                ui.selectable_value(&mut theme, mode, format!("{:?}", mode));
                            }
                        });
                    if theme != self.config.theme {
                        self.set_theme(ctx, theme);
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in self.log_manager.filtered_logs() {
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "[{} {}]",
                                        entry.format_timestamp(),
                                        entry.level
                                    ))
                                    .color(egui::Color32::GRAY)
                                    .monospace(),
                                );
                                ui.monospace(&entry.message);
                            });
                        }
                    });
            });

        if let Some(session) = &self.session {
            egui::SidePanel::left("filter_panel")
                .resizable(true)
                .default_width(260.0)
                .show(ctx, |ui| {
                    let current = session.store().filters();
                    let actions = self.sidebar.show(ui, &self.config.facets, &current);
                    for action in actions {
                        Self::handle_sidebar_action(session, action);
                    }
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(session) = &self.session {
                self.show_summary(ui, session);
            } else {
                ui.heading(self.history.current().path);
                ui.label("This page is not part of the catalog.");
                if ui.button("Back to products").clicked() {
                    let listing = self.config.listing_path.clone();
                    self.handle_address_action(ctx, AddressAction::Navigate(listing));
                }
            }
        });

        let writing = self
            .session
            .as_ref()
            .is_some_and(|session| session.controller().phase() == SyncPhase::WritingLocally);
        if writing {
            ctx.request_repaint_after(self.config.sync.guard_window() + Duration::from_millis(10));
        } else {
            ctx.request_repaint_after(Duration::from_millis(500));
        }
    }
}
