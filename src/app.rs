//! Page assembly: panels, the oxide selector, and the recompute gating.

use egui::ComboBox;

use crate::colorbar::Colorbar;
use crate::colormap::Palette;
use crate::dataset::{DatasetError, SampleTable};
use crate::map_view::MapPanel;
use crate::oxide::Oxide;
use crate::scene::{build_scene, RenderScene};

/// Where the dataset is read from, once, at startup.
pub const DATA_PATH: &str = "data/Banda Arc.csv";

const APP_TITLE: &str = "Oxide values of geologic sample locations";
const APP_DESCRIPTION: &str = "Explore oxide values of geologic samples from the Banda Arc craton. \
Sample locations are shown on the map, with marker colors keyed to the oxide content. \
Hover over a marker to see the exact value; click it to see which oxide is selected.";

/// Fraction of the page width given to the colorbar legend.
const LEGEND_WIDTH_FRACTION: f32 = 0.3;

/// The application: dataset, current selection, and the derived scene.
///
/// The scene is rebuilt only when the selection changes; everything else is
/// plain per-frame rendering.
pub struct OxideMapApp {
    table: Result<SampleTable, DatasetError>,
    palette: Palette,
    selection: Oxide,
    scene: RenderScene,
    map: MapPanel,
    colorbar: Colorbar,
}

impl OxideMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let table = SampleTable::load(DATA_PATH);
        if let Err(err) = &table {
            log::error!("dataset load failed: {err}");
        }

        let palette = Palette::rainbow();
        let selection = Oxide::default();
        let scene = match &table {
            Ok(table) => build_scene(table, selection, &palette),
            Err(_) => RenderScene::default(),
        };

        Self {
            table,
            palette,
            selection,
            scene,
            map: MapPanel::default(),
            colorbar: Colorbar::default(),
        }
    }

    /// Recompute the scene for a new selection. One call per interaction;
    /// nothing is reused from the previous selection.
    fn select_oxide(&mut self, oxide: Oxide) {
        if oxide == self.selection {
            return;
        }
        self.selection = oxide;
        if let Ok(table) = &self.table {
            self.scene = build_scene(table, oxide, &self.palette);
            self.map.clear_selection();
            log::debug!(
                "selected {}: {} markers",
                oxide.name(),
                self.scene.markers.len()
            );
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.heading(APP_TITLE);
        ui.label(APP_DESCRIPTION);
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            ui.label("Oxide:");
            let mut selection = self.selection;
            ComboBox::from_id_salt("oxide_select")
                .selected_text(selection.name())
                .show_ui(ui, |ui| {
                    for oxide in Oxide::ALL {
                        ui.selectable_value(&mut selection, oxide, oxide.name());
                    }
                });
            self.select_oxide(selection);

            ui.separator();
            match self.scene.range {
                Some(range) => {
                    ui.label(format!(
                        "{} samples plotted, min {:.2} / max {:.2} wt%",
                        self.scene.markers.len(),
                        range.min,
                        range.max,
                    ));
                }
                None => {
                    ui.label("no defined values for this oxide");
                }
            }
        });
        ui.add_space(4.0);
    }

    fn render_error_page(ui: &mut egui::Ui, err: &DatasetError) {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.colored_label(egui::Color32::RED, "Could not load the dataset");
                ui.label(err.to_string());
                ui.label(format!("expected at: {DATA_PATH}"));
            });
        });
    }
}

impl eframe::App for OxideMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Err(err) = &self.table {
            egui::CentralPanel::default().show(ctx, |ui| {
                Self::render_error_page(ui, err);
            });
            return;
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.render_header(ui);
        });

        let legend_width = ctx.screen_rect().width() * LEGEND_WIDTH_FRACTION;
        egui::SidePanel::right("legend")
            .exact_width(legend_width.min(260.0))
            .resizable(false)
            .show(ctx, |ui| {
                self.colorbar
                    .show(ui, &self.palette, self.scene.oxide, self.scene.range);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.map.show(ui, &self.scene);
            });

        // Tiles arrive asynchronously; keep repainting so they appear.
        ctx.request_repaint();
    }
}
