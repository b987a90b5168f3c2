//! The single recompute step: selection in, render scene out.
//!
//! `build_scene` is pure; the UI calls it once per selection change and
//! renders whatever comes back. There is no intermediate state between
//! select, compute, and render.

use egui::Color32;

use crate::colormap::{Palette, ValueRange};
use crate::dataset::SampleTable;
use crate::oxide::Oxide;

/// One plotted sample: position, raw value, and the computed marker color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
    pub color: Color32,
}

/// Everything the map and the legend need for one selection.
#[derive(Clone, Debug, Default)]
pub struct RenderScene {
    pub oxide: Oxide,
    pub range: Option<ValueRange>,
    pub markers: Vec<SampleMarker>,
}

/// Compute the scene for the current selection.
///
/// The range covers every defined value of the selected column. Markers
/// additionally require coordinates: a sample with an undefined value or a
/// missing coordinate is excluded entirely, never plotted with a default.
pub fn build_scene(table: &SampleTable, oxide: Oxide, palette: &Palette) -> RenderScene {
    let range = ValueRange::compute(table.values(oxide));

    let Some(range) = range else {
        return RenderScene { oxide, range: None, markers: Vec::new() };
    };

    let markers = table
        .samples()
        .iter()
        .filter_map(|sample| {
            let value = sample.value(oxide)?;
            let latitude = sample.latitude?;
            let longitude = sample.longitude?;
            Some(SampleMarker {
                latitude,
                longitude,
                value,
                color: palette.color_for(value, range),
            })
        })
        .collect();

    RenderScene { oxide, range: Some(range), markers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SampleTable;

    const HEADER: &str = "LATITUDE MIN,LONGITUDE MIN,TIO2(WT%),AL2O3(WT%),FEOT(WT%),CAO(WT%),MNO(WT%),NA2O(WT%),MGO(WT%)";

    fn table(body: &str) -> SampleTable {
        let data = format!("{HEADER}\n{body}");
        SampleTable::load_from_reader(data.as_bytes()).expect("table should load")
    }

    /// 3 samples, TiO2 values [0.5, undefined, 1.5]: range (0.5, 1.5), two
    /// markers, endpoints take the palette's first and last anchor.
    #[test]
    fn endpoint_markers_take_anchor_colors() {
        let table = table(
            "-10.0,130.0,0.5,14.2,8.1,9.9,0.2,3.1,7.4\n\
             -9.5,131.2,,15.0,7.7,8.8,0.1,2.9,6.6\n\
             -9.0,132.4,1.5,13.1,8.4,9.1,0.3,3.4,7.0",
        );
        let palette = Palette::rainbow();
        let scene = build_scene(&table, Oxide::TiO2, &palette);

        assert_eq!(scene.range, Some(ValueRange { min: 0.5, max: 1.5 }));
        assert_eq!(scene.markers.len(), 2);
        assert_eq!(scene.markers[0].color, palette.start());
        assert_eq!(scene.markers[1].color, palette.end());
    }

    #[test]
    fn undefined_values_never_plotted_for_any_oxide() {
        // Row two has every oxide undefined.
        let table = table(
            "-10.0,130.0,0.5,14.2,8.1,9.9,0.2,3.1,7.4\n\
             -9.5,131.2,,,,,,,",
        );
        let palette = Palette::rainbow();
        for oxide in Oxide::ALL {
            let scene = build_scene(&table, oxide, &palette);
            assert_eq!(scene.markers.len(), 1, "oxide {}", oxide.name());
            assert_eq!(scene.markers[0].latitude, -10.0);
        }
    }

    #[test]
    fn missing_coordinates_skip_marker_but_not_range() {
        let table = table(
            ",130.0,0.5,14.2,8.1,9.9,0.2,3.1,7.4\n\
             -9.0,132.4,1.0,13.1,8.4,9.1,0.3,3.4,7.0",
        );
        let scene = build_scene(&table, Oxide::TiO2, &Palette::rainbow());
        // The coordinate-less 0.5 still anchors the range minimum.
        assert_eq!(scene.range, Some(ValueRange { min: 0.5, max: 1.0 }));
        assert_eq!(scene.markers.len(), 1);
        assert_eq!(scene.markers[0].value, 1.0);
    }

    #[test]
    fn all_undefined_column_renders_nothing() {
        let table = table("-10.0,130.0,,14.2,8.1,9.9,0.2,3.1,7.4");
        let scene = build_scene(&table, Oxide::TiO2, &Palette::rainbow());
        assert_eq!(scene.range, None);
        assert!(scene.markers.is_empty());
    }

    #[test]
    fn empty_table_renders_nothing() {
        let scene = build_scene(&SampleTable::default(), Oxide::TiO2, &Palette::rainbow());
        assert_eq!(scene.range, None);
        assert!(scene.markers.is_empty());
    }

    #[test]
    fn identical_inputs_build_identical_scenes() {
        let table = table(
            "-10.0,130.0,0.5,14.2,8.1,9.9,0.2,3.1,7.4\n\
             -9.0,132.4,1.5,13.1,8.4,9.1,0.3,3.4,7.0",
        );
        let palette = Palette::rainbow();
        let first = build_scene(&table, Oxide::TiO2, &palette);
        let second = build_scene(&table, Oxide::TiO2, &palette);
        assert_eq!(first.range, second.range);
        assert_eq!(first.markers, second.markers);
    }

    #[test]
    fn switching_selection_recomputes_independently() {
        let table = table(
            "-10.0,130.0,0.5,14.2,8.1,9.9,0.2,3.1,7.4\n\
             -9.0,132.4,1.5,13.1,8.4,9.1,0.3,3.4,7.0",
        );
        let palette = Palette::rainbow();
        let tio2 = build_scene(&table, Oxide::TiO2, &palette);
        let cao = build_scene(&table, Oxide::CaO, &palette);

        assert_ne!(tio2.range, cao.range);
        // CaO values are [9.9, 9.1]: row one is now the maximum, row two the
        // minimum, the reverse of the TiO2 ordering.
        assert_eq!(cao.markers[0].color, palette.end());
        assert_eq!(cao.markers[1].color, palette.start());
        assert_eq!(tio2.markers[0].color, palette.start());
        assert_eq!(tio2.markers[1].color, palette.end());
    }
}
