// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use iced::alignment::{Horizontal, Vertical};
use iced::widget::{
    button, center, column, container, mouse_area, opaque, row, scrollable, stack, text,
    text_input, Column,
};
use iced::{keyboard, Element, Font, Length, Subscription, Task, Theme};
use log::{info, warn, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use wander_core::directions::{DirectionsResponse, DirectionsTicket, OriginAndDestination};
use wander_core::features::{FeatureCollection, LayerKind};
use wander_core::geocoder::{GeocodedPlace, Geocoder, MapboxGeocoder};
use wander_core::popup::{FormAction, PopupForm};
use wander_core::route::{SaveOutcome, Waypoint};
use wander_core::session::{
    DestinationRequest, Dialog, DialogChoice, MarkerRef, Notice, NoticeKind, TripSession,
};
use wander_core::{Backend, HttpBackend, LatLng, WanderConfig};

mod map;
mod style;
use map::{MapView, TileManager};

/// Geocoder queries shorter than this are not sent.
const MIN_QUERY_LEN: usize = 3;

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = WanderConfig::load()?;
    let backend = HttpBackend::from_config(&config)?;
    if let Err(e) = backend.load_cookies(&cookie_path()) {
        warn!("Could not restore session cookie — error={}", e);
    }
    let geocoder = match MapboxGeocoder::from_config(&config) {
        Ok(g) => Some(Arc::new(g)),
        Err(e) => {
            warn!("Place search disabled — reason={}", e);
            None
        }
    };

    iced::application("Wander", App::update, App::view)
        .subscription(App::subscription)
        .theme(|_| Theme::Dark)
        .run_with(move || App::new(config, Arc::new(backend), geocoder))?;
    Ok(())
}

fn init_logging() {
    let term: Box<dyn SharedLogger> = TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    let log_path = wander_core::get_config_root().join("wander.log");
    let file = std::fs::create_dir_all(wander_core::get_config_root())
        .and_then(|_| std::fs::File::create(&log_path));
    let result = match file {
        Ok(file) => CombinedLogger::init(vec![
            term,
            WriteLogger::new(LevelFilter::Debug, Config::default(), file),
        ]),
        Err(_) => CombinedLogger::init(vec![term]),
    };
    if result.is_err() {
        eprintln!("Logger already initialized");
    }
}

fn cookie_path() -> PathBuf {
    wander_core::get_config_root().join("session_cookie.txt")
}

#[derive(Debug, Clone)]
enum Message {
    // Page bootstrap
    HasOrigin(Result<bool, String>),
    LandmarksLoaded(LayerKind, Result<FeatureCollection, String>),
    WaypointsLoaded(Result<Vec<Waypoint>, String>),

    // Geocoder
    QueryChanged(String),
    SearchSubmitted,
    SearchResults(String, Result<Vec<GeocodedPlace>, String>),
    PlaceSelected(usize),

    // Destinations
    DialogChoice(DialogChoice),
    DestinationSaved(Result<SaveOutcome, String>),
    DestinationAdded(Result<Waypoint, String>),
    PopupSubmit(PopupForm),
    OpenDetails(String),

    // Map
    MapMoved { center: LatLng, zoom: f64 },
    ZoomIn,
    ZoomOut,
    MapClicked,
    MarkerHovered(Option<MarkerRef>),
    MarkerClicked(MarkerRef),
    TilesTick,

    // Directions
    GetDirections,
    OriginDestinationLoaded(DirectionsTicket, Result<OriginAndDestination, String>),
    RouteLoaded(DirectionsTicket, Result<DirectionsResponse, String>),

    // Trip actions
    Clear,
    Cleared(Result<(), String>),
    AddNewLandmark,
    NewLandmarkAdded(Result<Waypoint, String>),
    ShowDebug,
    DebugLoaded(Result<serde_json::Value, String>),
    CloseDialog,
    DismissNotice(usize),
}

struct App {
    backend: Arc<HttpBackend>,
    geocoder: Option<Arc<MapboxGeocoder>>,
    session: TripSession,
    tile_manager: TileManager,
    hovered: Option<MarkerRef>,
    query: String,
    results: Vec<GeocodedPlace>,
    toasts: Vec<Notice>,
}

/// Runs a blocking backend call off the async executor.
fn call<B, T, F>(backend: &Arc<B>, f: F) -> impl Future<Output = Result<T, String>>
where
    B: Backend + 'static,
    T: Send + 'static,
    F: FnOnce(&B) -> wander_core::Result<T> + Send + 'static,
{
    let backend = Arc::clone(backend);
    async move {
        tokio::task::spawn_blocking(move || f(&backend))
            .await
            .map_err(|e| e.to_string())?
            .map_err(|e| e.to_string())
    }
}

impl App {
    fn new(
        config: WanderConfig,
        backend: Arc<HttpBackend>,
        geocoder: Option<Arc<MapboxGeocoder>>,
    ) -> (Self, Task<Message>) {
        let app = Self {
            tile_manager: TileManager::new(&config.tile_url),
            session: TripSession::new(&config),
            backend,
            geocoder,
            hovered: None,
            query: String::new(),
            results: Vec::new(),
            toasts: Vec::new(),
        };
        let tasks = app.bootstrap();
        (app, tasks)
    }

    /// Everything the page does once the map is ready.
    fn bootstrap(&self) -> Task<Message> {
        let layer = |kind: LayerKind| {
            Task::perform(call(&self.backend, move |b| b.landmarks(kind)), move |r| {
                Message::LandmarksLoaded(kind, r)
            })
        };
        Task::batch(vec![
            Task::perform(call(&self.backend, |b| b.has_origin()), Message::HasOrigin),
            layer(LayerKind::Initial),
            layer(LayerKind::Full),
            Task::perform(
                call(&self.backend, |b| b.all_waypoints()),
                Message::WaypointsLoaded,
            ),
        ])
    }

    fn send(&self, request: DestinationRequest) -> Task<Message> {
        let target = request.target;
        match request.action {
            FormAction::Save => Task::perform(
                call(&self.backend, move |b| b.save_destination(&target)),
                Message::DestinationSaved,
            ),
            FormAction::Add => Task::perform(
                call(&self.backend, move |b| b.add_destination(&target)),
                Message::DestinationAdded,
            ),
        }
    }

    fn search(&self) -> Task<Message> {
        let Some(geocoder) = self.geocoder.clone() else {
            return Task::none();
        };
        let query = self.query.trim().to_string();
        if query.chars().count() < MIN_QUERY_LEN {
            return Task::none();
        }
        let proximity = self.session.view.center;
        Task::perform(
            async move {
                let q = query.clone();
                let result = tokio::task::spawn_blocking(move || geocoder.search(&q, Some(proximity)))
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|r| r.map_err(|e| e.to_string()));
                (query, result)
            },
            |(query, result)| Message::SearchResults(query, result),
        )
    }

    fn save_cookies(&self) {
        if let Err(e) = self.backend.save_cookies(&cookie_path()) {
            warn!("Could not store session cookie — error={}", e);
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        self.toasts.extend(self.session.drain_notices());
        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::HasOrigin(result) => {
                match result {
                    Ok(has_origin) => {
                        self.session.apply_has_origin(has_origin);
                        self.save_cookies();
                    }
                    Err(e) => self.session.report_failure("check origin", &e),
                }
                Task::none()
            }
            Message::LandmarksLoaded(kind, result) => {
                match result {
                    Ok(collection) => self.session.load_landmarks(kind, collection),
                    Err(e) => self.session.report_failure("load landmarks", &e),
                }
                Task::none()
            }
            Message::WaypointsLoaded(result) => {
                match result {
                    Ok(waypoints) => self.session.apply_waypoints(&waypoints),
                    Err(e) => self.session.report_failure("load waypoints", &e),
                }
                Task::none()
            }

            Message::QueryChanged(query) => {
                self.query = query;
                if self.query.trim().chars().count() < MIN_QUERY_LEN {
                    self.results.clear();
                    return Task::none();
                }
                self.search()
            }
            Message::SearchSubmitted => self.search(),
            Message::SearchResults(query, result) => {
                // Only the answer to the current text matters.
                if query != self.query.trim() {
                    return Task::none();
                }
                match result {
                    Ok(places) => self.results = places,
                    Err(e) => self.session.report_failure("search places", &e),
                }
                Task::none()
            }
            Message::PlaceSelected(index) => {
                if let Some(place) = self.results.get(index) {
                    self.session.select_place(place);
                }
                Task::none()
            }

            Message::DialogChoice(choice) => match self.session.choose(choice) {
                Some(request) => self.send(request),
                None => Task::none(),
            },
            Message::DestinationSaved(result) => {
                match result {
                    Ok(outcome) => self.session.apply_saved(outcome),
                    Err(e) => self.session.report_failure("save destination", &e),
                }
                Task::none()
            }
            Message::DestinationAdded(result) => {
                match result {
                    Ok(waypoint) => {
                        info!("Destination added — place_name={}", waypoint.place_name);
                        self.session.apply_added(&waypoint);
                    }
                    Err(e) => self.session.report_failure("add destination", &e),
                }
                Task::none()
            }
            Message::PopupSubmit(form) => {
                let request = self.session.submit_form(&form);
                self.send(request)
            }
            Message::OpenDetails(path) => {
                match self.backend.endpoint(&path) {
                    Ok(url) => {
                        if let Err(e) = open::that(url.as_str()) {
                            warn!("Could not open landmark page — url={} error={}", url, e);
                        }
                    }
                    Err(e) => self.session.report_failure("open landmark page", &e),
                }
                Task::none()
            }

            Message::MapMoved { center, zoom } => {
                self.session.view.set_view(center, zoom);
                Task::none()
            }
            Message::ZoomIn => {
                self.session.view.zoom_by(1.0);
                Task::none()
            }
            Message::ZoomOut => {
                self.session.view.zoom_by(-1.0);
                Task::none()
            }
            Message::MapClicked => {
                self.session.close_popup();
                Task::none()
            }
            Message::MarkerHovered(marker) => {
                if let Some(m) = &marker {
                    self.session.marker_hover(m);
                }
                self.hovered = marker;
                Task::none()
            }
            Message::MarkerClicked(marker) => {
                if self.session.marker_click(&marker) {
                    self.hovered = None;
                }
                Task::none()
            }
            Message::TilesTick => Task::none(),

            Message::GetDirections => {
                let ticket = self.session.begin_directions();
                Task::batch(vec![
                    Task::perform(
                        call(&self.backend, |b| b.origin_and_destination()),
                        move |r| Message::OriginDestinationLoaded(ticket, r),
                    ),
                    Task::perform(call(&self.backend, |b| b.route_directions()), move |r| {
                        Message::RouteLoaded(ticket, r)
                    }),
                ])
            }
            Message::OriginDestinationLoaded(ticket, result) => {
                match result {
                    Ok(od) => {
                        self.session.apply_origin_destination(ticket, &od);
                    }
                    Err(e) => self.session.report_failure("load origin and destination", &e),
                }
                Task::none()
            }
            Message::RouteLoaded(ticket, result) => {
                match result {
                    Ok(response) => {
                        if let Err(e) = self.session.apply_route(ticket, &response) {
                            self.session.report_failure("route directions", &e);
                        }
                    }
                    Err(e) => self.session.report_failure("load route directions", &e),
                }
                Task::none()
            }

            Message::Clear => Task::perform(call(&self.backend, |b| b.clear()), Message::Cleared),
            Message::Cleared(result) => {
                if let Err(e) = result {
                    self.session.report_failure("clear trip", &e);
                    return Task::none();
                }
                self.session.apply_cleared();
                if !self.session.take_reload_request() {
                    return Task::none();
                }
                self.session.reload();
                self.hovered = None;
                self.query.clear();
                self.results.clear();
                self.bootstrap()
            }
            Message::AddNewLandmark => Task::perform(
                call(&self.backend, |b| b.add_new_landmark()),
                Message::NewLandmarkAdded,
            ),
            Message::NewLandmarkAdded(result) => {
                match result {
                    Ok(waypoint) => self.session.apply_added(&waypoint),
                    Err(e) => self.session.report_failure("add new landmark", &e),
                }
                Task::none()
            }
            Message::ShowDebug => Task::perform(
                call(&self.backend, |b| b.debugger()),
                Message::DebugLoaded,
            ),
            Message::DebugLoaded(result) => {
                let shown = result.and_then(|state| {
                    self.session.show_debug(&state).map_err(|e| e.to_string())
                });
                if let Err(e) = shown {
                    self.session.report_failure("load session state", &e);
                }
                Task::none()
            }
            Message::CloseDialog => {
                self.session.dismiss_dialog();
                Task::none()
            }
            Message::DismissNotice(index) => {
                if index < self.toasts.len() {
                    self.toasts.remove(index);
                }
                Task::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let escape = keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(keyboard::key::Named::Escape) => Some(Message::CloseDialog),
            _ => None,
        });
        // Repaint while tiles are still arriving from the background fetchers.
        let tiles = if self.tile_manager.has_pending() {
            iced::time::every(Duration::from_millis(250)).map(|_| Message::TilesTick)
        } else {
            Subscription::none()
        };
        Subscription::batch([escape, tiles])
    }

    fn view(&self) -> Element<'_, Message> {
        let map = MapView {
            session: &self.session,
            tile_manager: &self.tile_manager,
            hovered: self.hovered.as_ref(),
        };

        let zoom_controls = column![
            button(text("+").size(16).align_x(Horizontal::Center))
                .width(Length::Fixed(32.0))
                .on_press(Message::ZoomIn)
                .style(style::button_secondary),
            button(text("−").size(16).align_x(Horizontal::Center))
                .width(Length::Fixed(32.0))
                .on_press(Message::ZoomOut)
                .style(style::button_secondary),
        ]
        .spacing(4);

        let mut layers = stack![
            Element::from(map),
            container(zoom_controls).padding(10),
            container(self.view_toasts())
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(Horizontal::Center)
                .align_y(Vertical::Bottom)
                .padding(16),
        ];
        if let Some(popup) = self.view_popup() {
            layers = layers.push(
                container(popup)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .align_x(Horizontal::Right)
                    .align_y(Vertical::Top)
                    .padding(12),
            );
        }

        let content: Element<'_, Message> = row![
            container(self.view_sidebar())
                .width(Length::Fixed(340.0))
                .height(Length::Fill)
                .padding(15)
                .style(style::container_sidebar),
            layers,
        ]
        .width(Length::Fill)
        .height(Length::Fill)
        .into();

        match self.session.dialog() {
            Some(dialog) => modal(content, self.view_dialog(dialog), Message::CloseDialog),
            None => content,
        }
    }

    fn view_sidebar(&self) -> Element<'_, Message> {
        let mut search = text_input(self.session.placeholder(), &self.query)
            .padding(10)
            .size(14)
            .style(style::search_input);
        if self.geocoder.is_some() {
            search = search
                .on_input(Message::QueryChanged)
                .on_submit(Message::SearchSubmitted);
        }

        let results = Column::with_children(self.results.iter().enumerate().map(|(i, place)| {
            button(
                column![
                    text(&place.text).size(13),
                    text(&place.place_name)
                        .size(11)
                        .color(style::palette::TEXT_SECONDARY),
                ]
                .spacing(2),
            )
            .width(Length::Fill)
            .on_press(Message::PlaceSelected(i))
            .style(style::button_ghost)
            .into()
        }))
        .spacing(2);

        let actions = row![
            button(text("Get directions").size(12))
                .on_press(Message::GetDirections)
                .style(style::button_primary)
                .padding([6, 12]),
            button(text("Clear").size(12))
                .on_press(Message::Clear)
                .style(style::button_danger)
                .padding([6, 12]),
        ]
        .spacing(8);

        let extras = row![
            button(text("Surprise me").size(12))
                .on_press(Message::AddNewLandmark)
                .style(style::button_success)
                .padding([6, 12]),
            button(text("Session").size(12))
                .on_press(Message::ShowDebug)
                .style(style::button_secondary)
                .padding([6, 12]),
        ]
        .spacing(8);

        let stops = Column::with_children(self.session.route().markers().iter().enumerate().map(
            |(i, marker)| {
                text(format!("{}. {}", i + 1, marker.title))
                    .size(13)
                    .into()
            },
        ))
        .spacing(4);

        column![
            search,
            results,
            actions,
            extras,
            text("Your trip").size(16),
            stops,
            scrollable(self.view_directions()).height(Length::Fill),
        ]
        .spacing(12)
        .into()
    }

    fn view_directions(&self) -> Element<'_, Message> {
        let panel = self.session.panel();
        if panel.is_empty() {
            return column![].into();
        }
        let summary = format!("{}{}", panel.routes.concat(), panel.duration.concat());
        let steps = Column::with_children(panel.instructions.iter().zip(&panel.distances).map(
            |(instruction, distance)| {
                row![
                    text(instruction).size(12).width(Length::Fill),
                    text(distance)
                        .size(12)
                        .color(style::palette::TEXT_SECONDARY),
                ]
                .spacing(8)
                .into()
            },
        ))
        .spacing(6);

        column![text("Directions").size(16), text(summary).size(13), steps]
            .spacing(8)
            .into()
    }

    fn view_popup(&self) -> Option<Element<'_, Message>> {
        if let Some(popup) = self.session.landmark_popup() {
            let forms = row(popup.forms().into_iter().map(|form| {
                let style = match form.action {
                    FormAction::Add => style::button_primary,
                    FormAction::Save => style::button_success,
                };
                button(text(form.action.label()).size(12))
                    .on_press(Message::PopupSubmit(form))
                    .style(style)
                    .padding([6, 12])
                    .into()
            }))
            .spacing(8);

            let card = column![
                button(text(popup.title.clone()).size(18))
                    .padding(0)
                    .on_press(Message::OpenDetails(popup.detail_path.clone()))
                    .style(style::button_link),
                text(popup.description.clone()).size(13),
                forms,
            ]
            .spacing(8);
            return Some(
                container(card)
                    .padding(12)
                    .width(Length::Fixed(popup.min_width as f32 * 2.5))
                    .style(style::container_card)
                    .into(),
            );
        }

        let marker = self.session.route_popup()?;
        Some(
            container(
                column![
                    text(marker.title.clone()).size(18),
                    text("Destination added").size(13)
                ]
                .spacing(6),
            )
            .padding(12)
            .style(style::container_card)
            .into(),
        )
    }

    fn view_toasts(&self) -> Element<'_, Message> {
        Column::with_children(self.toasts.iter().enumerate().map(|(i, notice)| {
            let style = match notice.kind {
                NoticeKind::Info => style::container_toast_info,
                NoticeKind::Error => style::container_toast_error,
            };
            container(
                row![
                    text(&notice.text).size(13).width(Length::Fill),
                    button(text("OK").size(12))
                        .on_press(Message::DismissNotice(i))
                        .style(style::button_ghost),
                ]
                .spacing(10)
                .align_y(iced::Alignment::Center),
            )
            .padding([6, 12])
            .width(Length::Fixed(360.0))
            .style(style)
            .into()
        }))
        .spacing(6)
        .into()
    }

    fn view_dialog<'a>(&'a self, dialog: &'a Dialog) -> Element<'a, Message> {
        let body: Element<'a, Message> = match dialog {
            Dialog::ConfirmDestination(confirm) => {
                let buttons = row(confirm.buttons().into_iter().map(|b| {
                    let style = match b.choice {
                        DialogChoice::Save => style::button_success,
                        DialogChoice::Cancel => style::button_secondary,
                        DialogChoice::Add => style::button_primary,
                    };
                    button(text(b.label).size(12))
                        .on_press(Message::DialogChoice(b.choice))
                        .style(style)
                        .padding([6, 12])
                        .into()
                }))
                .spacing(8);
                column![
                    text(&confirm.title).size(20),
                    text(confirm.message).size(14),
                    buttons,
                ]
                .spacing(14)
                .into()
            }
            Dialog::Session { title, text: dump, .. } => column![
                text(title).size(20),
                scrollable(text(dump).size(12).font(Font::MONOSPACE)).height(Length::Fixed(420.0)),
                button(text("OK").size(12))
                    .on_press(Message::CloseDialog)
                    .style(style::button_secondary)
                    .padding([6, 12]),
            ]
            .spacing(14)
            .into(),
        };

        container(body)
            .padding(20)
            .max_width(560.0)
            .style(style::container_card)
            .into()
    }
}

fn modal<'a>(
    base: Element<'a, Message>,
    content: Element<'a, Message>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base,
        opaque(
            mouse_area(center(opaque(content)).style(style::container_modal_backdrop))
                .on_press(on_blur)
        )
    ]
    .into()
}
