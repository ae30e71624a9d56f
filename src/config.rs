//! Compiled-in map presets, one per deployed page.

use crate::components::slippy_map::{
	BoundaryStyle, ConfigError, EdgeStyle, LatLng, MapView, STADIA_ATTRIBUTION, STADIA_SMOOTH_URL,
};

pub const BOUNDARY_URL: &str = "boundaries/lad_filtered.geojson";

/// Everything a page needs to build its map.
#[derive(Clone, Debug, PartialEq)]
pub struct MapPreset {
	pub center: LatLng,
	pub min_zoom: u8,
	pub max_zoom: u8,
	pub zoom: u8,
	pub tile_url: &'static str,
	pub attribution: &'static [(&'static str, &'static str)],
	pub edges_url: String,
	pub boundary_url: String,
	pub edge_style: EdgeStyle,
	pub boundary_style: BoundaryStyle,
	/// Refit the view around the edges once they load.
	pub fit_bounds: bool,
}

impl MapPreset {
	/// Bedford edges published as GeoJSON next to the page.
	pub fn beds_geojson() -> Self {
		Self {
			center: LatLng::new(52.067137963027754, -0.39834061887875316),
			min_zoom: 10,
			max_zoom: 16,
			zoom: 12,
			tile_url: STADIA_SMOOTH_URL,
			attribution: STADIA_ATTRIBUTION,
			edges_url: "geojsons/Beds_EO.geojson".into(),
			boundary_url: BOUNDARY_URL.into(),
			edge_style: EdgeStyle::default(),
			boundary_style: BoundaryStyle::default(),
			fit_bounds: false,
		}
	}

	/// Raw analysis output: plain lines, no hover.
	pub fn analysis_output() -> Self {
		Self {
			edges_url: "../output/Beds_EO.json".into(),
			edge_style: EdgeStyle {
				hover: false,
				..EdgeStyle::default()
			},
			fit_bounds: true,
			..Self::beds_geojson()
		}
	}

	pub fn view(&self) -> Result<MapView, ConfigError> {
		MapView::new(self.center, self.min_zoom, self.max_zoom, self.zoom)
	}
}

impl Default for MapPreset {
	fn default() -> Self {
		Self::beds_geojson()
	}
}
