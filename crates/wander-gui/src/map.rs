// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use crate::style::palette;
use crate::Message;
use iced::advanced::{self, layout, renderer, widget, Layout, Widget};
use iced::event::Status;
use iced::widget::image;
use iced::{mouse, Border, Color, Element, Event, Length, Point, Radians, Rectangle};
use log::warn;
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wander_core::config::expand_tile_url;
use wander_core::features::{Landmark, LayerStage};
use wander_core::geo::{lat_to_y, lon_to_x, x_to_lon, y_to_lat, LatLng, MAX_MERCATOR_LAT, TILE_SIZE};
use wander_core::session::{MarkerRef, TripSession};

const TILE_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(300) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Pointer radius, in screen pixels, that counts as touching a marker.
const HIT_RADIUS: f64 = 10.0;

// --- Tile Management ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoords {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

pub struct TileManager {
    template: String,
    tiles: Arc<Mutex<LruCache<TileCoords, image::Handle>>>,
    pending: Arc<Mutex<HashSet<TileCoords>>>,
}

impl TileManager {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            tiles: Arc::new(Mutex::new(LruCache::new(TILE_CACHE_SIZE))),
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn get_tile(&self, coords: TileCoords) -> Option<image::Handle> {
        self.tiles.lock().ok()?.get(&coords).cloned()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().map(|p| !p.is_empty()).unwrap_or(false)
    }

    pub fn request_tile(&self, coords: TileCoords) {
        {
            let (Ok(mut pending), Ok(tiles)) = (self.pending.lock(), self.tiles.lock()) else {
                return;
            };
            if pending.contains(&coords) || tiles.contains(&coords) {
                return;
            }
            pending.insert(coords);
        }

        let url = expand_tile_url(&self.template, coords.z, coords.x, coords.y);
        let tiles = Arc::clone(&self.tiles);
        let pending = Arc::clone(&self.pending);

        std::thread::spawn(move || {
            let resp = ureq::get(&url)
                .set("User-Agent", concat!("Wander/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(10))
                .call();

            match resp {
                Ok(response) => {
                    let mut bytes = Vec::new();
                    match std::io::Read::read_to_end(&mut response.into_reader(), &mut bytes) {
                        Ok(_) => {
                            if let Ok(mut tiles) = tiles.lock() {
                                tiles.put(coords, image::Handle::from_bytes(bytes));
                            }
                        }
                        Err(e) => warn!("Failed to read tile — url={} error={}", url, e),
                    }
                }
                Err(e) => warn!("Failed to fetch tile — url={} error={}", url, e),
            }
            if let Ok(mut pending) = pending.lock() {
                pending.remove(&coords);
            }
        });
    }
}

/// Zoom-0 world pixel of a position.
fn world(p: LatLng) -> (f64, f64) {
    (lon_to_x(p.lng, 0.0), lat_to_y(p.lat, 0.0))
}

fn marker_color(landmark: &Landmark, stage: LayerStage) -> Color {
    let parsed = landmark.marker_color.as_deref().and_then(Color::parse);
    parsed.unwrap_or(match stage {
        LayerStage::Initial => palette::ACCENT_ORANGE,
        LayerStage::Full => palette::ACCENT_PURPLE,
    })
}

pub struct MapView<'a> {
    pub session: &'a TripSession,
    pub tile_manager: &'a TileManager,
    pub hovered: Option<&'a MarkerRef>,
}

impl<'a> MapView<'a> {
    /// Topmost marker under a zoom-0 world point. Route markers sit above landmarks.
    fn marker_at(&self, wx: f64, wy: f64, scale: f64) -> Option<MarkerRef> {
        let radius_sq = (HIT_RADIUS / scale).powi(2);
        let hit = |p: LatLng| {
            let (tx, ty) = world(p);
            (tx - wx).powi(2) + (ty - wy).powi(2) < radius_sq
        };

        let markers = self.session.route().markers();
        if let Some(i) = (0..markers.len()).rev().find(|&i| hit(markers[i].position)) {
            return Some(MarkerRef::Route(i));
        }

        let layers = self.session.landmarks();
        layers
            .visible()
            .iter()
            .rev()
            .find(|l| hit(l.position))
            .map(|l| match layers.stage() {
                LayerStage::Initial => MarkerRef::Initial(l.id.clone()),
                LayerStage::Full => MarkerRef::Landmark(l.id.clone()),
            })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MapState {
    is_dragging: bool,
    press_position: Option<Point>,
    last_cursor: Option<Point>,
    // Track values between prop updates to handle multiple events per frame
    current_center: Option<LatLng>,
    current_zoom: f64,
    last_prop_center: Option<LatLng>,
    last_prop_zoom: Option<f64>,
}

impl<'a, Theme, Renderer> Widget<Message, Theme, Renderer> for MapView<'a>
where
    Renderer: renderer::Renderer + advanced::image::Renderer<Handle = image::Handle>,
{
    fn size(&self) -> iced::Size<Length> {
        iced::Size {
            width: Length::Fill,
            height: Length::Fill,
        }
    }

    fn tag(&self) -> widget::tree::Tag {
        widget::tree::Tag::of::<MapState>()
    }

    fn state(&self) -> widget::tree::State {
        widget::tree::State::new(MapState::default())
    }

    fn layout(
        &self,
        _tree: &mut widget::Tree,
        _renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        layout::Node::new(limits.max())
    }

    fn draw(
        &self,
        tree: &widget::Tree,
        renderer: &mut Renderer,
        _theme: &Theme,
        _style: &renderer::Style,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _viewport: &Rectangle,
    ) {
        let state = tree.state.downcast_ref::<MapState>();
        let bounds = layout.bounds();
        let view = &self.session.view;

        // Internal state gives zero-latency feedback while dragging, but only
        // while the props it was synced from are still current.
        let in_sync = state.last_prop_zoom == Some(view.zoom)
            && state.last_prop_center == Some(view.center);
        let (zoom, center) = match state.current_center {
            Some(center) if in_sync => (state.current_zoom, center),
            _ => (view.zoom, view.center),
        };

        let zoom_scale = 2.0f64.powf(zoom);
        let (camera_x, camera_y) = world(center);

        let to_screen = |p: LatLng| {
            let (wx, wy) = world(p);
            Point::new(
                bounds.x + bounds.width / 2.0 + ((wx - camera_x) * zoom_scale) as f32,
                bounds.y + bounds.height / 2.0 + ((wy - camera_y) * zoom_scale) as f32,
            )
        };

        renderer.with_layer(bounds, |renderer| {
            renderer.fill_quad(
                renderer::Quad {
                    bounds,
                    ..Default::default()
                },
                palette::MAP_BACKGROUND,
            );

            // --- Tile Layer ---
            let z = zoom.floor().clamp(0.0, 19.0) as u32;
            let num_tiles = 2i64.pow(z);
            let tile_size_z0 = TILE_SIZE / 2.0f64.powf(z as f64);

            let half_w = (bounds.width as f64 / 2.0) / zoom_scale;
            let half_h = (bounds.height as f64 / 2.0) / zoom_scale;

            let min_tx = ((camera_x - half_w) / tile_size_z0).floor() as i64;
            let max_tx = ((camera_x + half_w) / tile_size_z0).ceil() as i64;
            let min_ty = ((camera_y - half_h) / tile_size_z0).floor() as i64;
            let max_ty = ((camera_y + half_h) / tile_size_z0).ceil() as i64;

            for tx in min_tx.max(0)..=max_tx.min(num_tiles - 1) {
                for ty in min_ty.max(0)..=max_ty.min(num_tiles - 1) {
                    let coords = TileCoords {
                        x: tx as u32,
                        y: ty as u32,
                        z,
                    };
                    let size = (tile_size_z0 * zoom_scale) as f32;
                    let tile_rect = Rectangle {
                        x: bounds.x
                            + bounds.width / 2.0
                            + ((tx as f64 * tile_size_z0 - camera_x) * zoom_scale) as f32,
                        y: bounds.y
                            + bounds.height / 2.0
                            + ((ty as f64 * tile_size_z0 - camera_y) * zoom_scale) as f32,
                        width: size,
                        height: size,
                    };

                    if let Some(handle) = self.tile_manager.get_tile(coords) {
                        renderer.draw_image(
                            advanced::image::Image {
                                handle,
                                filter_method: image::FilterMethod::Linear,
                                rotation: Radians(0.0),
                                opacity: 1.0,
                                snap: false,
                            },
                            tile_rect,
                        );
                    } else {
                        renderer.fill_quad(
                            renderer::Quad {
                                bounds: tile_rect,
                                ..Default::default()
                            },
                            palette::MAP_TILE_LOADING,
                        );
                        self.tile_manager.request_tile(coords);
                    }
                }
            }
        });

        // --- Route Line Layer ---
        let points = self.session.polyline().points();
        if points.len() > 1 {
            renderer.with_layer(bounds, |renderer| {
                for pair in points.windows(2) {
                    let a = to_screen(pair[0]);
                    let b = to_screen(pair[1]);
                    let dx = b.x - a.x;
                    let dy = b.y - a.y;
                    let steps = ((dx * dx + dy * dy).sqrt() / 2.0).ceil().max(1.0) as usize;
                    for i in 0..=steps {
                        let t = i as f32 / steps as f32;
                        renderer.fill_quad(
                            renderer::Quad {
                                bounds: Rectangle {
                                    x: a.x + dx * t - 2.0,
                                    y: a.y + dy * t - 2.0,
                                    width: 4.0,
                                    height: 4.0,
                                },
                                border: Border {
                                    radius: 2.0.into(),
                                    ..Default::default()
                                },
                                ..Default::default()
                            },
                            palette::ROUTE_LINE,
                        );
                    }
                }
            });
        }

        // --- Marker Layer ---
        renderer.with_layer(bounds, |renderer| {
            let dot = |renderer: &mut Renderer, at: Point, size: f32, fill: Color| {
                renderer.fill_quad(
                    renderer::Quad {
                        bounds: Rectangle {
                            x: at.x - size / 2.0,
                            y: at.y - size / 2.0,
                            width: size,
                            height: size,
                        },
                        border: Border {
                            color: Color::WHITE,
                            width: 1.5,
                            radius: (size / 2.0).into(),
                        },
                        ..Default::default()
                    },
                    fill,
                );
            };

            let layers = self.session.landmarks();
            for landmark in layers.visible() {
                let hovered = matches!(
                    self.hovered,
                    Some(MarkerRef::Initial(id) | MarkerRef::Landmark(id)) if *id == landmark.id
                );
                let size = if hovered { 16.0 } else { 12.0 };
                dot(
                    renderer,
                    to_screen(landmark.position),
                    size,
                    marker_color(landmark, layers.stage()),
                );
            }

            // Hovered route marker is drawn last so it rises above its neighbours.
            let markers = self.session.route().markers();
            let raised = match self.hovered {
                Some(MarkerRef::Route(i)) if markers.get(*i).is_some_and(|m| m.rise_on_hover) => {
                    Some(*i)
                }
                _ => None,
            };
            for (i, marker) in markers.iter().enumerate() {
                if Some(i) != raised {
                    dot(renderer, to_screen(marker.position), 16.0, palette::ACCENT_BLUE);
                }
            }
            if let Some(i) = raised {
                dot(renderer, to_screen(markers[i].position), 20.0, palette::ACCENT_BLUE);
            }
        });
    }

    fn on_event(
        &mut self,
        tree: &mut widget::Tree,
        event: Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn advanced::Clipboard,
        shell: &mut advanced::Shell<'_, Message>,
        _viewport: &Rectangle,
    ) -> Status {
        let state = tree.state.downcast_mut::<MapState>();
        let bounds = layout.bounds();
        let view = &self.session.view;

        // Initialize or sync internal state from props if props changed externally
        if state.last_prop_center != Some(view.center) || state.last_prop_zoom != Some(view.zoom) {
            state.current_center = Some(view.center);
            state.current_zoom = view.zoom;
            state.last_prop_center = Some(view.center);
            state.last_prop_zoom = Some(view.zoom);
        }

        let current_zoom = state.current_zoom;
        let (camera_x, camera_y) = world(state.current_center.unwrap_or(view.center));
        let scale = 2.0f64.powf(current_zoom);

        let cursor_point = cursor.position_in(bounds);
        let mouse_z0 = cursor_point.map(|p| {
            let rx = (p.x as f64) - (bounds.width as f64 / 2.0);
            let ry = (p.y as f64) - (bounds.height as f64 / 2.0);
            (camera_x + rx / scale, camera_y + ry / scale)
        });

        let clamp_camera = |wx: f64, wy: f64, scale: f64| {
            let half_vw = (bounds.width as f64 / 2.0) / scale;
            let half_vh = (bounds.height as f64 / 2.0) / scale;
            let cx = if half_vw * 2.0 >= TILE_SIZE {
                TILE_SIZE / 2.0
            } else {
                wx.clamp(half_vw, TILE_SIZE - half_vw)
            };
            let cy = if half_vh * 2.0 >= TILE_SIZE {
                TILE_SIZE / 2.0
            } else {
                wy.clamp(half_vh, TILE_SIZE - half_vh)
            };
            LatLng::new(
                y_to_lat(cy, 0.0).clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT),
                x_to_lon(cx, 0.0),
            )
        };

        match event {
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if !view.is_interactive() {
                    return Status::Ignored;
                }
                if let Some(p) = cursor_point {
                    let d = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y as f64,
                        mouse::ScrollDelta::Pixels { y, .. } => (y as f64) / 100.0,
                    };
                    let new_zoom = view.clamp_zoom(current_zoom + d * 0.25);

                    if (new_zoom - current_zoom).abs() > 0.001 {
                        let new_scale = 2.0f64.powf(new_zoom);
                        let mx = (p.x as f64) - (bounds.width as f64 / 2.0);
                        let my = (p.y as f64) - (bounds.height as f64 / 2.0);
                        // Keep the world point under the cursor fixed.
                        let center = clamp_camera(
                            camera_x + mx / scale - mx / new_scale,
                            camera_y + my / scale - my / new_scale,
                            new_scale,
                        );

                        state.current_center = Some(center);
                        state.current_zoom = new_zoom;
                        shell.publish(Message::MapMoved {
                            center,
                            zoom: new_zoom,
                        });
                        return Status::Captured;
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if cursor.is_over(bounds) {
                    if let Some(position) = cursor.position() {
                        state.is_dragging = true;
                        state.press_position = Some(position);
                        state.last_cursor = Some(position);
                        return Status::Captured;
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let was_dragging = state.is_dragging;
                let press_pos = state.press_position;
                let release_pos = cursor.position();

                state.is_dragging = false;
                state.press_position = None;
                state.last_cursor = None;

                if was_dragging {
                    if let (Some(p1), Some(p2), Some((wx, wy))) = (press_pos, release_pos, mouse_z0)
                    {
                        if (p1.x - p2.x).hypot(p1.y - p2.y) < 5.0 {
                            let message = match self.marker_at(wx, wy, scale) {
                                Some(marker) => Message::MarkerClicked(marker),
                                None => Message::MapClicked,
                            };
                            shell.publish(message);
                        }
                    }
                    return Status::Captured;
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) => {
                if state.is_dragging && view.is_interactive() {
                    if let Some(last_pos) = state.last_cursor {
                        let delta = position - last_pos;
                        state.last_cursor = Some(position);

                        let center = clamp_camera(
                            camera_x - delta.x as f64 / scale,
                            camera_y - delta.y as f64 / scale,
                            scale,
                        );
                        state.current_center = Some(center);
                        shell.publish(Message::MapMoved {
                            center,
                            zoom: current_zoom,
                        });
                        return Status::Captured;
                    }
                }

                if let Some((wx, wy)) = mouse_z0 {
                    let under = self.marker_at(wx, wy, scale);
                    if under.as_ref() != self.hovered {
                        shell.publish(Message::MarkerHovered(under));
                        return Status::Captured;
                    }
                }
            }
            _ => {}
        }

        Status::Ignored
    }

    fn mouse_interaction(
        &self,
        _tree: &widget::Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _viewport: &Rectangle,
        _renderer: &Renderer,
    ) -> mouse::Interaction {
        if self.hovered.is_some() && cursor.is_over(layout.bounds()) {
            mouse::Interaction::Pointer
        } else if cursor.is_over(layout.bounds()) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

impl<'a, Theme, Renderer> From<MapView<'a>> for Element<'a, Message, Theme, Renderer>
where
    Theme: 'a,
    Renderer: 'a + renderer::Renderer + advanced::image::Renderer<Handle = image::Handle>,
{
    fn from(map_view: MapView<'a>) -> Self {
        Self::new(map_view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wander_core::features::{FeatureCollection, FeatureId, LayerKind};
    use wander_core::route::Waypoint;
    use wander_core::WanderConfig;

    const LANDMARKS: &str = r##"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "id": 1, "geometry": {"type": "Point", "coordinates": [-122.4058, 37.8024]},
         "properties": {"name": "Coit Tower", "marker-color": "#D3D3D3"}}
    ]}"##;

    fn session() -> TripSession {
        let mut session = TripSession::new(&WanderConfig::default());
        let fc = FeatureCollection::from_json(LANDMARKS).unwrap();
        session.load_landmarks(LayerKind::Initial, fc.clone());
        session.load_landmarks(LayerKind::Full, fc);
        session
    }

    #[test]
    fn test_marker_color_from_properties() {
        let s = session();
        let landmark = &s.landmarks().visible()[0];
        assert_eq!(
            marker_color(landmark, LayerStage::Initial),
            Color::from_rgb8(0xD3, 0xD3, 0xD3)
        );

        let mut short = landmark.clone();
        short.marker_color = Some("#fff".into());
        assert_eq!(marker_color(&short, LayerStage::Initial), Color::WHITE);

        let mut plain = landmark.clone();
        plain.marker_color = Some("not-a-color".into());
        assert_eq!(marker_color(&plain, LayerStage::Full), palette::ACCENT_PURPLE);
    }

    #[test]
    fn test_hit_test_prefers_route_markers() {
        let mut s = session();
        let tiles = TileManager::new("http://tiles.invalid/{z}/{x}/{y}.png");
        let coit = LatLng::new(37.8024, -122.4058);
        let (wx, wy) = world(coit);
        let scale = 2.0f64.powf(12.0);

        let view = MapView {
            session: &s,
            tile_manager: &tiles,
            hovered: None,
        };
        assert_eq!(
            view.marker_at(wx, wy, scale),
            Some(MarkerRef::Initial(FeatureId::Number(1)))
        );
        assert_eq!(view.marker_at(wx + 1.0, wy, scale), None);

        s.apply_added(&Waypoint {
            coordinates: [-122.4058, 37.8024],
            place_name: "Coit Tower".into(),
        });
        let view = MapView {
            session: &s,
            tile_manager: &tiles,
            hovered: None,
        };
        assert_eq!(view.marker_at(wx, wy, scale), Some(MarkerRef::Route(0)));
    }
}
