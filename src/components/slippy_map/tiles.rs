use std::collections::{HashMap, HashSet};

use web_sys::HtmlImageElement;

use super::projection::{MapView, TILE_SIZE};

pub const STADIA_SMOOTH_URL: &str =
	"https://tiles.stadiamaps.com/tiles/alidade_smooth/{z}/{x}/{y}{r}.png";

/// Attribution links shown under the base layer, as (label, href).
pub const STADIA_ATTRIBUTION: &[(&str, &str)] = &[
	("Stadia Maps", "https://stadiamaps.com/"),
	("Stamen Design", "https://www.stamen.com/"),
	("OpenMapTiles", "https://openmaptiles.org/"),
	("OpenStreetMap", "https://www.openstreetmap.org/copyright/"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileKey {
	pub z: u8,
	pub x: u32,
	pub y: u32,
}

/// A tile to draw and where its top-left corner lands on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePlacement {
	pub key: TileKey,
	pub sx: f64,
	pub sy: f64,
}

pub fn tile_url(template: &str, key: TileKey, retina: bool) -> String {
	template
		.replace("{z}", &key.z.to_string())
		.replace("{x}", &key.x.to_string())
		.replace("{y}", &key.y.to_string())
		.replace("{r}", if retina { "@2x" } else { "" })
}

/// Tiles covering the viewport. Columns wrap around the antimeridian, rows
/// outside the world are skipped.
pub fn visible_tiles(view: &MapView) -> Vec<TilePlacement> {
	let (ox, oy) = view.origin();
	let count = 1i64 << view.zoom;
	let (col0, col1) = (
		(ox / TILE_SIZE).floor() as i64,
		((ox + view.width) / TILE_SIZE).floor() as i64,
	);
	let (row0, row1) = (
		(oy / TILE_SIZE).floor() as i64,
		((oy + view.height) / TILE_SIZE).floor() as i64,
	);

	let mut out = Vec::new();
	for row in row0.max(0)..=row1.min(count - 1) {
		for col in col0..=col1 {
			out.push(TilePlacement {
				key: TileKey {
					z: view.zoom,
					x: col.rem_euclid(count) as u32,
					y: row as u32,
				},
				sx: col as f64 * TILE_SIZE - ox,
				sy: row as f64 * TILE_SIZE - oy,
			});
		}
	}
	out
}

/// Browser image cache for base-layer tiles.
///
/// Failed tiles stay in the cache as broken images and are skipped when
/// drawing, so a missing tile never surfaces as an error.
pub struct TileCache {
	template: String,
	retina: bool,
	images: HashMap<TileKey, HtmlImageElement>,
}

impl TileCache {
	pub fn new(template: impl Into<String>, retina: bool) -> Self {
		Self {
			template: template.into(),
			retina,
			images: HashMap::new(),
		}
	}

	/// The image for `key`, requesting it on first use.
	pub fn get(&mut self, key: TileKey) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(&key) {
			let img = HtmlImageElement::new().ok()?;
			img.set_cross_origin(Some("anonymous"));
			img.set_src(&tile_url(&self.template, key, self.retina));
			self.images.insert(key, img);
		}
		self.images.get(&key)
	}

	/// True while any requested tile is still downloading.
	pub fn has_pending(&self) -> bool {
		self.images.values().any(|img| !img.complete())
	}

	/// Drop every tile outside `visible`, aborting downloads still in flight.
	pub fn retain_visible(&mut self, visible: &[TilePlacement]) {
		for key in stale_keys(&self.images, visible) {
			if let Some(img) = self.images.remove(&key) {
				if !img.complete() {
					img.set_src("");
				}
			}
		}
	}
}

/// Cached keys that no placement in `visible` uses.
fn stale_keys<V>(cached: &HashMap<TileKey, V>, visible: &[TilePlacement]) -> Vec<TileKey> {
	let keep: HashSet<TileKey> = visible.iter().map(|p| p.key).collect();
	cached.keys().filter(|k| !keep.contains(k)).copied().collect()
}

pub fn is_drawable(img: &HtmlImageElement) -> bool {
	img.complete() && img.natural_width() > 0
}
