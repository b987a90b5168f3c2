//! Slippy-map rendering of the sample markers.
//!
//! Wraps the `walkers` map widget: an OpenStreetMap tile layer, a plugin that
//! projects and paints one marker per plotted sample (clustering dense
//! neighborhoods into count glyphs), and the fixed decorations around it —
//! a coordinate search box, a collapsible overview mini-map, and a live
//! cursor-coordinate readout.

use std::sync::{Arc, Mutex};

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Ui, Vec2};
use walkers::sources::OpenStreetMap;
use walkers::{HttpTiles, Map, MapMemory, Plugin, Position, Projector};

use crate::scene::RenderScene;

/// Initial map center, over the Banda Arc.
pub const HOME_LATITUDE: f64 = -10.0;
pub const HOME_LONGITUDE: f64 = 130.0;
/// Initial zoom level.
pub const HOME_ZOOM: f64 = 3.0;

/// Side length of the screen-space clustering grid.
const CLUSTER_CELL_PX: f32 = 48.0;
/// Radius of a single sample marker.
const MARKER_RADIUS: f32 = 6.0;
/// Radius of a cluster glyph.
const CLUSTER_RADIUS: f32 = 12.0;
/// Pointer distance within which a marker counts as hovered or clicked.
const HIT_RADIUS: f32 = 10.0;
/// Margin applied when culling against the viewport, in degrees.
const CULL_MARGIN_DEG: f64 = 0.1;

const MINIMAP_SIZE: Vec2 = Vec2::new(180.0, 120.0);
const MINIMAP_ZOOM: f64 = 1.0;

fn home_position() -> Position {
    walkers::lat_lon(HOME_LATITUDE, HOME_LONGITUDE)
}

/// What the marker plugin observed this frame.
#[derive(Clone, Default)]
struct MapFeedback {
    /// Index into the scene's marker list, if the pointer is over a single.
    hovered: Option<usize>,
    /// Member count, if the pointer is over a cluster glyph.
    hovered_cluster: Option<usize>,
    /// Marker index that was clicked this frame.
    clicked: Option<usize>,
    /// The map background (no marker) was clicked.
    clicked_background: bool,
    /// Pointer position in geographic coordinates, if over the map.
    cursor: Option<(f64, f64)>,
}

/// Map panel state. Pan/zoom lives in `MapMemory`; everything else is
/// recomputed per frame from the scene.
pub struct MapPanel {
    memory: MapMemory,
    tiles: Option<HttpTiles>,
    mini_memory: MapMemory,
    mini_tiles: Option<HttpTiles>,
    show_minimap: bool,
    search_text: String,
    search_error: bool,
    /// Index into the current scene's marker list.
    selected: Option<usize>,
}

impl Default for MapPanel {
    fn default() -> Self {
        Self {
            memory: MapMemory::default(),
            tiles: None,
            mini_memory: MapMemory::default(),
            mini_tiles: None,
            show_minimap: true,
            search_text: String::new(),
            search_error: false,
            selected: None,
        }
    }
}

impl MapPanel {
    /// Drop the marker selection; called when the scene is rebuilt so a stale
    /// index never points into a different oxide's marker list.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Lazily create the tile layers and apply the initial view.
    fn ensure_tiles(&mut self, ctx: &egui::Context) {
        if self.tiles.is_none() {
            self.tiles = Some(HttpTiles::new(OpenStreetMap, ctx.clone()));
            self.mini_tiles = Some(HttpTiles::new(OpenStreetMap, ctx.clone()));
            if self.memory.set_zoom(HOME_ZOOM).is_err() {
                log::warn!("initial zoom level {HOME_ZOOM} rejected by map widget");
            }
            self.memory.center_at(home_position());
        }
    }

    /// The current view center (follows the user's panning).
    fn view_center(&self) -> Position {
        self.memory.detached().unwrap_or_else(home_position)
    }

    /// Render the map and its decorations for the given scene.
    pub fn show(&mut self, ui: &mut Ui, scene: &RenderScene) {
        self.ensure_tiles(ui.ctx());

        let map_rect = ui.available_rect_before_wrap();
        let feedback = Arc::new(Mutex::new(MapFeedback::default()));

        let markers: Vec<(Position, Color32)> = scene
            .markers
            .iter()
            .map(|m| (walkers::lat_lon(m.latitude, m.longitude), m.color))
            .collect();

        if let Some(tiles) = self.tiles.as_mut() {
            let plugin = SampleMarkersPlugin {
                markers,
                map_rect,
                feedback: feedback.clone(),
            };
            let map = Map::new(Some(tiles), &mut self.memory, home_position())
                .with_plugin(plugin);
            ui.put(map_rect, map);
        }

        let fb = feedback.lock().map(|g| g.clone()).unwrap_or_default();

        if let Some(idx) = fb.clicked {
            self.selected = Some(idx);
        } else if fb.clicked_background {
            self.selected = None;
        }

        self.render_hover_tooltip(ui, map_rect, scene, &fb);
        self.render_selection_popup(ui, map_rect, scene);
        self.render_cursor_readout(ui, map_rect, &fb);
        self.render_search_box(ui, map_rect);
        self.render_minimap(ui, map_rect);
        render_attribution(ui, map_rect);
    }

    /// Tooltip beside the pointer: the raw value for singles, the member
    /// count for clusters.
    fn render_hover_tooltip(&self, ui: &Ui, map_rect: Rect, scene: &RenderScene, fb: &MapFeedback) {
        let text = if let Some(idx) = fb.hovered {
            scene.markers.get(idx).map(|m| format!("{:.2}", m.value))
        } else {
            fb.hovered_cluster.map(|count| format!("{count} samples"))
        };
        let (Some(text), Some(pointer)) = (text, ui.ctx().pointer_latest_pos()) else {
            return;
        };
        if !map_rect.contains(pointer) {
            return;
        }

        egui::Area::new(egui::Id::new("marker_tooltip"))
            .fixed_pos(pointer + Vec2::new(14.0, 12.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                    ui.label(text);
                });
            });
    }

    /// Popup after a marker click, naming the active oxide.
    fn render_selection_popup(&self, ui: &Ui, map_rect: Rect, scene: &RenderScene) {
        let Some(marker) = self.selected.and_then(|idx| scene.markers.get(idx)) else {
            return;
        };

        egui::Area::new(egui::Id::new("marker_popup"))
            .fixed_pos(Pos2::new(map_rect.min.x + 10.0, map_rect.max.y - 34.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                    ui.label(format!(
                        "{}: {:.2} wt% at ({:.4}, {:.4})",
                        scene.oxide.name(),
                        marker.value,
                        marker.latitude,
                        marker.longitude,
                    ));
                });
            });
    }

    /// Live cursor-coordinate readout at the top right.
    fn render_cursor_readout(&self, ui: &Ui, map_rect: Rect, fb: &MapFeedback) {
        egui::Area::new(egui::Id::new("cursor_readout"))
            .fixed_pos(Pos2::new(map_rect.max.x - 230.0, map_rect.min.y + 8.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                    ui.label(egui::RichText::new(format_cursor_position(fb.cursor)).small());
                });
            });
    }

    /// Coordinate search box at the top left; recenters the map on success.
    fn render_search_box(&mut self, ui: &Ui, map_rect: Rect) {
        egui::Area::new(egui::Id::new("location_search"))
            .fixed_pos(map_rect.min + Vec2::new(10.0, 8.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let edit = egui::TextEdit::singleline(&mut self.search_text)
                            .hint_text("lat, lon")
                            .desired_width(120.0);
                        let response = ui.add(edit);
                        let submitted = response.lost_focus()
                            && ui.input(|i| i.key_pressed(egui::Key::Enter));
                        if ui.button("Go").clicked() || submitted {
                            match parse_lat_lon(&self.search_text) {
                                Some((lat, lon)) => {
                                    self.memory.center_at(walkers::lat_lon(lat, lon));
                                    self.search_error = false;
                                }
                                None => self.search_error = true,
                            }
                        }
                    });
                    if self.search_error {
                        ui.colored_label(Color32::RED, "expected: lat, lon");
                    }
                });
            });
    }

    /// Collapsible overview inset at the bottom right, tracking the main view
    /// center at a fixed low zoom.
    fn render_minimap(&mut self, ui: &Ui, map_rect: Rect) {
        let toggle_pos = Pos2::new(
            map_rect.max.x - 30.0,
            map_rect.max.y - 30.0 - if self.show_minimap { MINIMAP_SIZE.y + 6.0 } else { 0.0 },
        );
        egui::Area::new(egui::Id::new("minimap_toggle"))
            .fixed_pos(toggle_pos)
            .show(ui.ctx(), |ui| {
                let label = if self.show_minimap { "▾" } else { "▴" };
                if ui.button(label).clicked() {
                    self.show_minimap = !self.show_minimap;
                }
            });

        if !self.show_minimap {
            return;
        }

        let center = self.view_center();
        self.mini_memory.center_at(center);
        if self.mini_memory.set_zoom(MINIMAP_ZOOM).is_err() {
            return;
        }

        let minimap_pos = Pos2::new(
            map_rect.max.x - MINIMAP_SIZE.x - 10.0,
            map_rect.max.y - MINIMAP_SIZE.y - 24.0,
        );
        egui::Area::new(egui::Id::new("minimap"))
            .fixed_pos(minimap_pos)
            .show(ui.ctx(), |ui| {
                let (rect, _) =
                    ui.allocate_exact_size(MINIMAP_SIZE, egui::Sense::hover());
                if let Some(mini_tiles) = self.mini_tiles.as_mut() {
                    let mini = Map::new(Some(mini_tiles), &mut self.mini_memory, center);
                    ui.put(rect, mini);
                }
                let painter = ui.painter();
                painter.rect_stroke(
                    rect,
                    egui::CornerRadius::ZERO,
                    Stroke::new(1.0, Color32::GRAY),
                    egui::StrokeKind::Outside,
                );
                // Cross at the main view center.
                let c = rect.center();
                painter.line_segment(
                    [Pos2::new(c.x - 5.0, c.y), Pos2::new(c.x + 5.0, c.y)],
                    Stroke::new(1.5, Color32::RED),
                );
                painter.line_segment(
                    [Pos2::new(c.x, c.y - 5.0), Pos2::new(c.x, c.y + 5.0)],
                    Stroke::new(1.5, Color32::RED),
                );
            });
    }
}

fn render_attribution(ui: &Ui, map_rect: Rect) {
    ui.painter().text(
        map_rect.max - Vec2::new(5.0, 5.0),
        Align2::RIGHT_BOTTOM,
        "© OpenStreetMap contributors",
        FontId::proportional(10.0),
        Color32::from_black_alpha(150),
    );
}

/// Plugin that projects, clusters, and paints the markers, and reports
/// hover/click hits back through shared feedback.
struct SampleMarkersPlugin {
    markers: Vec<(Position, Color32)>,
    map_rect: Rect,
    feedback: Arc<Mutex<MapFeedback>>,
}

impl Plugin for SampleMarkersPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter().with_clip_rect(self.map_rect);

        // Geographic viewport for culling.
        let top_left = projector.unproject(self.map_rect.min.to_vec2());
        let bottom_right = projector.unproject(self.map_rect.max.to_vec2());
        let max_lat = top_left.y().max(bottom_right.y()) + CULL_MARGIN_DEG;
        let min_lat = top_left.y().min(bottom_right.y()) - CULL_MARGIN_DEG;
        let left_lon = top_left.x();
        let right_lon = bottom_right.x();
        let crosses_date_line = left_lon > right_lon;

        // Project the visible markers, keeping their scene indices.
        let mut projected: Vec<(Pos2, usize)> = Vec::with_capacity(self.markers.len());
        for (idx, (pos, _)) in self.markers.iter().enumerate() {
            let lat = pos.y();
            let lon = pos.x();
            if lat > max_lat || lat < min_lat {
                continue;
            }
            let lon_visible = if crosses_date_line {
                lon >= left_lon - CULL_MARGIN_DEG || lon <= right_lon + CULL_MARGIN_DEG
            } else {
                lon >= left_lon - CULL_MARGIN_DEG && lon <= right_lon + CULL_MARGIN_DEG
            };
            if !lon_visible {
                continue;
            }
            let screen = projector.project(*pos);
            projected.push((Pos2::new(screen.x, screen.y), idx));
        }

        let clusters = cluster_projected(&projected, CLUSTER_CELL_PX);

        let pointer = response.hover_pos();
        let clicked = response.clicked();
        let mut fb = MapFeedback {
            cursor: pointer.map(|p| {
                let pos = projector.unproject(p.to_vec2());
                (pos.y(), pos.x())
            }),
            clicked_background: clicked,
            ..MapFeedback::default()
        };

        for cluster in &clusters {
            if cluster.members.len() == 1 {
                let idx = cluster.members[0];
                let (_, color) = self.markers[idx];
                let center = cluster.center;
                painter.circle_filled(center, MARKER_RADIUS, color);
                painter.circle_stroke(center, MARKER_RADIUS, Stroke::new(1.5, Color32::GRAY));

                if let Some(p) = pointer {
                    if center.distance(p) <= HIT_RADIUS {
                        fb.hovered = Some(idx);
                        if clicked {
                            fb.clicked = Some(idx);
                            fb.clicked_background = false;
                        }
                    }
                }
            } else {
                painter.circle_filled(cluster.center, CLUSTER_RADIUS, Color32::from_gray(90));
                painter.circle_stroke(
                    cluster.center,
                    CLUSTER_RADIUS,
                    Stroke::new(1.5, Color32::WHITE),
                );
                painter.text(
                    cluster.center,
                    Align2::CENTER_CENTER,
                    cluster.members.len().to_string(),
                    FontId::proportional(11.0),
                    Color32::WHITE,
                );

                if let Some(p) = pointer {
                    if cluster.center.distance(p) <= CLUSTER_RADIUS + 2.0 {
                        fb.hovered_cluster = Some(cluster.members.len());
                    }
                }
            }
        }

        if let Ok(mut shared) = self.feedback.lock() {
            *shared = fb;
        }
    }
}

/// A grid cell's worth of markers, drawn as one glyph.
#[derive(Clone, Debug, PartialEq)]
struct Cluster {
    center: Pos2,
    /// Scene marker indices that fell into this cell.
    members: Vec<usize>,
}

/// Bucket projected markers into square cells of `cell` pixels.
///
/// Returns one cluster per occupied cell, centered on the mean of its member
/// positions, ordered by cell key so the result is deterministic.
fn cluster_projected(points: &[(Pos2, usize)], cell: f32) -> Vec<Cluster> {
    use std::collections::BTreeMap;

    let mut cells: BTreeMap<(i32, i32), Vec<usize>> = BTreeMap::new();
    for (i, (pos, _)) in points.iter().enumerate() {
        let key = ((pos.x / cell).floor() as i32, (pos.y / cell).floor() as i32);
        cells.entry(key).or_default().push(i);
    }

    cells
        .into_values()
        .map(|indices| {
            let mut sum = Vec2::ZERO;
            for &i in &indices {
                sum += points[i].0.to_vec2();
            }
            let center = (sum / indices.len() as f32).to_pos2();
            let members = indices.into_iter().map(|i| points[i].1).collect();
            Cluster { center, members }
        })
        .collect()
}

/// Parse `lat, lon` (comma or whitespace separated) within valid coordinate
/// bounds.
fn parse_lat_lon(input: &str) -> Option<(f64, f64)> {
    let mut parts = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let lat: f64 = parts.next()?.parse().ok()?;
    let lon: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}

/// Cursor readout text; `NaN` when the pointer is off the map.
fn format_cursor_position(cursor: Option<(f64, f64)>) -> String {
    match cursor {
        Some((lat, lon)) => format!("Mouse position: {lat:.4} | {lon:.4}"),
        None => "Mouse position: NaN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clustering_merges_co_located_markers() {
        let points = vec![
            (Pos2::new(10.0, 10.0), 0),
            (Pos2::new(12.0, 14.0), 1),
            (Pos2::new(400.0, 400.0), 2),
        ];
        let clusters = cluster_projected(&points, 48.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 1]);
        assert_eq!(clusters[0].center, Pos2::new(11.0, 12.0));
        assert_eq!(clusters[1].members, vec![2]);
    }

    #[test]
    fn clustering_keeps_distant_markers_separate() {
        let points: Vec<(Pos2, usize)> = (0..4)
            .map(|i| (Pos2::new(i as f32 * 100.0, 0.0), i))
            .collect();
        let clusters = cluster_projected(&points, 48.0);
        assert_eq!(clusters.len(), 4);
        assert!(clusters.iter().all(|c| c.members.len() == 1));
    }

    #[test]
    fn clustering_empty_input() {
        assert!(cluster_projected(&[], 48.0).is_empty());
    }

    #[test]
    fn clustering_is_deterministic() {
        let points = vec![
            (Pos2::new(10.0, 10.0), 0),
            (Pos2::new(200.0, 10.0), 1),
            (Pos2::new(12.0, 14.0), 2),
        ];
        assert_eq!(
            cluster_projected(&points, 48.0),
            cluster_projected(&points, 48.0)
        );
    }

    #[test]
    fn parse_lat_lon_accepts_comma_and_whitespace() {
        assert_eq!(parse_lat_lon("-10.0, 130.0"), Some((-10.0, 130.0)));
        assert_eq!(parse_lat_lon("-10 130"), Some((-10.0, 130.0)));
        assert_eq!(parse_lat_lon("  45.5 ,  -120.25 "), Some((45.5, -120.25)));
    }

    #[test]
    fn parse_lat_lon_rejects_garbage_and_out_of_bounds() {
        assert_eq!(parse_lat_lon(""), None);
        assert_eq!(parse_lat_lon("banda arc"), None);
        assert_eq!(parse_lat_lon("-10.0"), None);
        assert_eq!(parse_lat_lon("1 2 3"), None);
        assert_eq!(parse_lat_lon("91.0, 0.0"), None);
        assert_eq!(parse_lat_lon("0.0, 181.0"), None);
    }

    #[test]
    fn cursor_readout_format() {
        assert_eq!(
            format_cursor_position(Some((-10.0, 130.0))),
            "Mouse position: -10.0000 | 130.0000"
        );
        assert_eq!(format_cursor_position(None), "Mouse position: NaN");
    }
}
