//! oxidemap - an interactive map of oxide values for geologic samples
//!
//! Loads a CSV table of samples from the Banda Arc craton, lets the user pick
//! one oxide column, and renders the sample locations on a slippy map with
//! marker colors keyed to a colorbar legend.
//!
//! ## Architecture
//!
//! - `dataset`: CSV ingest with up-front column validation
//! - `colormap`: value range + anchor-interpolated palette (ValueColorMapper)
//! - `scene`: the single pure recompute step from selection to markers
//! - `map_view`: walkers map, marker clustering, and the fixed decorations
//! - `colorbar`: the static gradient legend
//! - `app`: eframe shell tying the panels together

pub mod app;
pub mod colorbar;
pub mod colormap;
pub mod dataset;
pub mod map_view;
pub mod oxide;
pub mod scene;

pub use app::OxideMapApp;
