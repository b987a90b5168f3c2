//! The static colorbar legend shown beside the map.
//!
//! A vertical gradient texture sampled from the palette, with the range
//! maximum labeled at the top and the minimum at the bottom. The texture
//! depends only on the palette, so it is built once and reused; the labels
//! track the current scene.

use egui::{Color32, ColorImage, Stroke, TextureHandle, TextureOptions, Ui, Vec2};

use crate::colormap::{Palette, ValueRange};
use crate::oxide::Oxide;

/// Vertical resolution of the gradient texture.
const COLORBAR_STEPS: usize = 256;
/// On-screen bar size.
const BAR_WIDTH: f32 = 32.0;
const BAR_MAX_HEIGHT: f32 = 320.0;

pub struct Colorbar {
    texture: Option<TextureHandle>,
}

impl Default for Colorbar {
    fn default() -> Self {
        Self { texture: None }
    }
}

impl Colorbar {
    fn ensure_texture(&mut self, ctx: &egui::Context, palette: &Palette) {
        if self.texture.is_some() {
            return;
        }

        // High values at the top.
        let pixels: Vec<Color32> = (0..COLORBAR_STEPS)
            .rev()
            .map(|y| palette.sample(y as f64 / (COLORBAR_STEPS - 1) as f64))
            .collect();

        let image = ColorImage::new([1, COLORBAR_STEPS], pixels);
        self.texture = Some(ctx.load_texture("colorbar", image, TextureOptions::LINEAR));
    }

    /// Render the legend for the current selection. Without a range the bar
    /// is drawn unlabeled.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        palette: &Palette,
        oxide: Oxide,
        range: Option<ValueRange>,
    ) {
        self.ensure_texture(ui.ctx(), palette);

        ui.vertical(|ui| {
            ui.label(egui::RichText::new("Color Bar").strong());
            ui.label(format!("{} (wt%)", oxide.name()));
            ui.add_space(4.0);

            if let Some(range) = range {
                ui.label(egui::RichText::new(format_tick(range.max)).small());
            }

            if let Some(texture) = &self.texture {
                let bar_height = BAR_MAX_HEIGHT.min(ui.available_height() - 24.0).max(64.0);
                let (rect, _) = ui.allocate_exact_size(
                    Vec2::new(BAR_WIDTH, bar_height),
                    egui::Sense::hover(),
                );
                let painter = ui.painter();
                painter.rect_stroke(
                    rect.expand(1.0),
                    egui::CornerRadius::ZERO,
                    Stroke::new(1.0, Color32::GRAY),
                    egui::StrokeKind::Outside,
                );
                painter.image(
                    texture.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }

            if let Some(range) = range {
                ui.label(egui::RichText::new(format_tick(range.min)).small());
            }
        });
    }
}

/// Compact tick label for the range endpoints.
fn format_tick(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if v.abs() >= 1e4 || v.abs() < 1e-2 {
        format!("{v:.2e}")
    } else {
        format!("{v:.2}")
    }
}
