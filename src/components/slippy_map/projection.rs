//! Spherical web-mercator viewport.

use std::f64::consts::PI;

use thiserror::Error;

use super::types::LatLng;

pub const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Rejected view presets.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	#[error("center ({lat}, {lng}) is not a valid latitude/longitude")]
	InvalidCenter { lat: f64, lng: f64 },
	#[error("zoom {zoom} outside bounds {min}..={max}")]
	ZoomOutOfBounds { zoom: u8, min: u8, max: u8 },
}

/// Size of the whole world in pixels at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
	TILE_SIZE * 2f64.powi(i32::from(zoom))
}

/// Project to absolute world pixels at `zoom`.
pub fn project(point: LatLng, zoom: u8) -> (f64, f64) {
	let size = world_size(zoom);
	let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
	let x = (point.lng + 180.0) / 360.0 * size;
	let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
	(x, y)
}

pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
	let size = world_size(zoom);
	let lng = x / size * 360.0 - 180.0;
	let n = PI - 2.0 * PI * y / size;
	let lat = n.sinh().atan().to_degrees();
	LatLng::new(lat, lng)
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapView {
	pub center: LatLng,
	pub zoom: u8,
	pub min_zoom: u8,
	pub max_zoom: u8,
	pub width: f64,
	pub height: f64,
}

impl MapView {
	pub fn new(center: LatLng, min_zoom: u8, max_zoom: u8, zoom: u8) -> Result<Self, ConfigError> {
		if !center.is_valid() {
			return Err(ConfigError::InvalidCenter {
				lat: center.lat,
				lng: center.lng,
			});
		}
		if !(min_zoom..=max_zoom).contains(&zoom) {
			return Err(ConfigError::ZoomOutOfBounds {
				zoom,
				min: min_zoom,
				max: max_zoom,
			});
		}
		Ok(Self {
			center,
			zoom,
			min_zoom,
			max_zoom,
			width: 0.0,
			height: 0.0,
		})
	}

	/// World pixel coordinates of the viewport's top-left corner.
	pub fn origin(&self) -> (f64, f64) {
		let (cx, cy) = project(self.center, self.zoom);
		(cx - self.width / 2.0, cy - self.height / 2.0)
	}

	pub fn to_screen(&self, point: LatLng) -> (f64, f64) {
		let (ox, oy) = self.origin();
		let (x, y) = project(point, self.zoom);
		(x - ox, y - oy)
	}

	pub fn to_latlng(&self, sx: f64, sy: f64) -> LatLng {
		let (ox, oy) = self.origin();
		unproject(ox + sx, oy + sy, self.zoom)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Move the view so content shifts by (`dx`, `dy`) screen pixels.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		let (cx, cy) = project(self.center, self.zoom);
		let size = world_size(self.zoom);
		let y = (cy - dy).clamp(0.0, size);
		self.center = wrap(unproject(cx - dx, y, self.zoom));
	}

	/// Step the zoom by `delta` levels keeping the point under (`sx`, `sy`)
	/// fixed. Returns false when the zoom bounds leave the view unchanged.
	pub fn zoom_at(&mut self, delta: i32, sx: f64, sy: f64) -> bool {
		let target = (i32::from(self.zoom) + delta)
			.clamp(i32::from(self.min_zoom), i32::from(self.max_zoom)) as u8;
		if target == self.zoom {
			return false;
		}
		let anchor = self.to_latlng(sx, sy);
		let (ax, ay) = project(anchor, target);
		let (cx, cy) = (
			ax - sx + self.width / 2.0,
			ay - sy + self.height / 2.0,
		);
		self.zoom = target;
		self.center = wrap(unproject(cx, cy, target));
		true
	}

	/// Centre on `points` at the largest allowed zoom that shows them all.
	pub fn fit_bounds(&mut self, points: &[LatLng]) -> bool {
		let Some(first) = points.first() else {
			return false;
		};
		let (mut south, mut west, mut north, mut east) = (first.lat, first.lng, first.lat, first.lng);
		for p in points {
			south = south.min(p.lat);
			north = north.max(p.lat);
			west = west.min(p.lng);
			east = east.max(p.lng);
		}
		let (sw, ne) = (LatLng::new(south, west), LatLng::new(north, east));
		let mut zoom = self.min_zoom;
		for z in (self.min_zoom..=self.max_zoom).rev() {
			let (x0, y0) = project(sw, z);
			let (x1, y1) = project(ne, z);
			if (x1 - x0).abs() <= self.width && (y0 - y1).abs() <= self.height {
				zoom = z;
				break;
			}
		}
		let (x0, y0) = project(sw, zoom);
		let (x1, y1) = project(ne, zoom);
		self.zoom = zoom;
		self.center = unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, zoom);
		true
	}
}

fn wrap(mut p: LatLng) -> LatLng {
	p.lng = (p.lng + 180.0).rem_euclid(360.0) - 180.0;
	p
}

#[cfg(test)]
mod tests {
	use super::*;

	fn view() -> MapView {
		let mut v = MapView::new(LatLng::new(52.0671, -0.3983), 10, 16, 12).unwrap();
		v.resize(800.0, 600.0);
		v
	}

	#[test]
	fn rejects_zoom_outside_bounds() {
		let err = MapView::new(LatLng::new(0.0, 0.0), 10, 16, 17).unwrap_err();
		assert_eq!(
			err,
			ConfigError::ZoomOutOfBounds {
				zoom: 17,
				min: 10,
				max: 16
			}
		);
		assert!(MapView::new(LatLng::new(91.0, 0.0), 0, 4, 2).is_err());
	}

	#[test]
	fn center_projects_to_middle_of_viewport() {
		let v = view();
		let (x, y) = v.to_screen(v.center);
		assert!((x - 400.0).abs() < 1e-6);
		assert!((y - 300.0).abs() < 1e-6);
	}

	#[test]
	fn screen_round_trip() {
		let v = view();
		let p = v.to_latlng(123.0, 456.0);
		let (x, y) = v.to_screen(p);
		assert!((x - 123.0).abs() < 1e-6);
		assert!((y - 456.0).abs() < 1e-6);
	}

	#[test]
	fn zoom_is_clamped_and_keeps_anchor() {
		let mut v = view();
		let anchor = v.to_latlng(100.0, 100.0);
		assert!(v.zoom_at(1, 100.0, 100.0));
		assert_eq!(v.zoom, 13);
		let (x, y) = v.to_screen(anchor);
		assert!((x - 100.0).abs() < 1e-6);
		assert!((y - 100.0).abs() < 1e-6);

		assert!(v.zoom_at(10, 0.0, 0.0));
		assert_eq!(v.zoom, 16);
		assert!(!v.zoom_at(1, 0.0, 0.0));
		assert!(v.zoom_at(-20, 0.0, 0.0));
		assert_eq!(v.zoom, 10);
	}

	#[test]
	fn pan_moves_content_with_pointer() {
		let mut v = view();
		let p = v.to_latlng(400.0, 300.0);
		v.pan_by(50.0, -20.0);
		let (x, y) = v.to_screen(p);
		assert!((x - 450.0).abs() < 1e-6);
		assert!((y - 280.0).abs() < 1e-6);
	}

	#[test]
	fn fit_bounds_contains_every_point() {
		let mut v = view();
		let points = [LatLng::new(52.0, -0.5), LatLng::new(52.2, -0.2)];
		assert!(v.fit_bounds(&points));
		for p in points {
			let (x, y) = v.to_screen(p);
			assert!((0.0..=800.0).contains(&x));
			assert!((0.0..=600.0).contains(&y));
		}
		assert!(!v.fit_bounds(&[]));
	}
}
