use serde::Deserialize;

/// A geographic position in degrees.
///
/// Deserialises from a `[lat, lng]` pair, the order used by the edge resource.
/// GeoJSON positions are `[lng, lat]` and go through [`LatLng::from_geojson`].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct LatLng {
	pub lat: f64,
	pub lng: f64,
}

impl LatLng {
	pub const fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng }
	}

	pub fn from_geojson(position: &[f64]) -> Option<Self> {
		match position {
			[lng, lat, ..] => Some(Self::new(*lat, *lng)),
			_ => None,
		}
	}

	pub fn is_valid(&self) -> bool {
		(-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
	}
}

impl From<[f64; 2]> for LatLng {
	fn from([lat, lng]: [f64; 2]) -> Self {
		Self::new(lat, lng)
	}
}

/// One record of the `edge_list` array.
#[derive(Clone, Debug, Deserialize)]
pub struct EdgeRecord {
	pub geometry: Vec<LatLng>,
	#[serde(default)]
	pub color: Option<String>,
	/// Normalised activity (0-100, negative for public rights of way).
	#[serde(default)]
	pub activity: Option<f64>,
	#[serde(default)]
	pub popup: Option<String>,
}

/// The edge resource: `{ "edge_list": [...] }`.
#[derive(Clone, Debug, Deserialize)]
pub struct EdgeCollection {
	pub edge_list: Vec<EdgeRecord>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub resting_weight: f64,
	pub highlight_weight: f64,
	/// The analysis-output page draws plain lines with no hover feedback.
	pub hover: bool,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			resting_weight: 3.0,
			highlight_weight: 8.0,
			hover: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryStyle {
	pub color: String,
	pub weight: f64,
	pub fill_color: String,
	pub fill_opacity: f64,
	/// Shade everything outside the polygons instead of inside.
	pub invert: bool,
}

impl Default for BoundaryStyle {
	fn default() -> Self {
		Self {
			color: "blue".into(),
			weight: 2.0,
			fill_color: "black".into(),
			fill_opacity: 0.1,
			invert: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
	pub points: Vec<LatLng>,
	pub color: String,
	pub weight: f64,
	pub popup: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryOverlay {
	pub rings: Vec<Vec<LatLng>>,
	pub style: BoundaryStyle,
}
