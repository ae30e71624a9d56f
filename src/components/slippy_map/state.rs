use super::projection::MapView;
use super::types::{BoundaryOverlay, BoundaryStyle, EdgeStyle, LatLng, Polyline};

/// Extra pixels around a line's stroke that still count as a hit.
pub const HIT_TOLERANCE: f64 = 3.0;
/// Wheel travel, in pixels, that steps the zoom by one level.
pub const WHEEL_PX_PER_LEVEL: f64 = 60.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub last_x: f64,
	pub last_y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
	pub text: String,
	pub at: LatLng,
}

/// The map canvas: viewport plus every overlay added to it.
///
/// Loaders only append; nothing ever removes an overlay.
pub struct MapCanvas {
	pub view: MapView,
	pub edge_style: EdgeStyle,
	pub drag: DragState,
	pub popup: Option<Popup>,
	polylines: Vec<Polyline>,
	boundaries: Vec<BoundaryOverlay>,
	hovered: Option<usize>,
	wheel_px: f64,
	dirty: bool,
}

impl MapCanvas {
	pub fn new(view: MapView, edge_style: EdgeStyle) -> Self {
		Self {
			view,
			edge_style,
			drag: DragState::default(),
			popup: None,
			polylines: Vec::new(),
			boundaries: Vec::new(),
			hovered: None,
			wheel_px: 0.0,
			dirty: true,
		}
	}

	/// Polylines in draw order; the last one is on top.
	pub fn polylines(&self) -> &[Polyline] {
		&self.polylines
	}

	pub fn boundaries(&self) -> &[BoundaryOverlay] {
		&self.boundaries
	}

	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	pub fn add_polyline(&mut self, points: Vec<LatLng>, color: String, popup: Option<String>) -> usize {
		self.polylines.push(Polyline {
			points,
			color,
			weight: self.edge_style.resting_weight,
			popup,
		});
		self.dirty = true;
		self.polylines.len() - 1
	}

	pub fn add_boundary(&mut self, rings: Vec<Vec<LatLng>>, style: BoundaryStyle) {
		self.boundaries.push(BoundaryOverlay { rings, style });
		self.dirty = true;
	}

	/// Pointer entered polyline `idx`.
	pub fn pointer_enter(&mut self, idx: usize) {
		if !self.edge_style.hover {
			return;
		}
		if let Some(line) = self.polylines.get_mut(idx) {
			line.weight = self.edge_style.highlight_weight;
			self.dirty = true;
		}
	}

	/// Pointer left polyline `idx`.
	pub fn pointer_leave(&mut self, idx: usize) {
		if !self.edge_style.hover {
			return;
		}
		if let Some(line) = self.polylines.get_mut(idx) {
			line.weight = self.edge_style.resting_weight;
			self.dirty = true;
		}
	}

	/// Move the hover target, firing leave on the old line and enter on the
	/// new one.
	pub fn set_hover(&mut self, idx: Option<usize>) {
		if self.hovered == idx {
			return;
		}
		if let Some(prev) = self.hovered.take() {
			self.pointer_leave(prev);
		}
		if let Some(next) = idx {
			self.pointer_enter(next);
		}
		self.hovered = idx;
	}

	/// Topmost polyline under the screen point, if any.
	pub fn polyline_at(&self, sx: f64, sy: f64) -> Option<usize> {
		self.polylines.iter().enumerate().rev().find_map(|(idx, line)| {
			let reach = line.weight / 2.0 + HIT_TOLERANCE;
			let hit = line.points.windows(2).any(|seg| {
				let (x1, y1) = self.view.to_screen(seg[0]);
				let (x2, y2) = self.view.to_screen(seg[1]);
				segment_distance(sx, sy, x1, y1, x2, y2) <= reach
			});
			hit.then_some(idx)
		})
	}

	/// Open the popup of the line under the pointer, or close any open one.
	pub fn click(&mut self, sx: f64, sy: f64) {
		let popup = self
			.polyline_at(sx, sy)
			.and_then(|idx| self.polylines[idx].popup.clone())
			.map(|text| Popup {
				text,
				at: self.view.to_latlng(sx, sy),
			});
		if popup.is_some() || self.popup.is_some() {
			self.popup = popup;
			self.dirty = true;
		}
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.view.pan_by(dx, dy);
		self.dirty = true;
	}

	pub fn zoom_at(&mut self, delta: i32, sx: f64, sy: f64) {
		if self.view.zoom_at(delta, sx, sy) {
			log::debug!("zoom {}", self.view.zoom);
			self.dirty = true;
		}
	}

	/// Feed a vertical wheel delta in pixels. Small trackpad deltas build up
	/// until they amount to one zoom level; a change of direction starts over.
	/// Zero and non-finite deltas (horizontal scrolls) are ignored.
	pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) {
		if !delta_y.is_finite() || delta_y == 0.0 {
			return;
		}
		if self.wheel_px.signum() != delta_y.signum() {
			self.wheel_px = 0.0;
		}
		self.wheel_px += delta_y;
		if self.wheel_px.abs() < WHEEL_PX_PER_LEVEL {
			return;
		}
		let delta = if self.wheel_px > 0.0 { -1 } else { 1 };
		self.wheel_px = 0.0;
		self.zoom_at(delta, sx, sy);
	}

	/// CSS cursor for the current pointer state.
	pub fn cursor(&self) -> &'static str {
		if self.drag.active && self.drag.moved {
			"grabbing"
		} else if self.hovered.is_some() {
			"pointer"
		} else {
			"grab"
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.view.resize(width, height);
		self.dirty = true;
	}

	/// Fit the view to every polyline point loaded so far.
	pub fn fit_to_polylines(&mut self) {
		let points: Vec<LatLng> = self
			.polylines
			.iter()
			.flat_map(|line| line.points.iter().copied())
			.collect();
		if self.view.fit_bounds(&points) {
			log::debug!("fitted view to {} points, zoom {}", points.len(), self.view.zoom);
			self.dirty = true;
		}
	}

	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// Returns whether a redraw is due and clears the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}

fn segment_distance(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-12 {
		0.0
	} else {
		(((px - x1) * dx + (py - y1) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (x1 + t * dx, y1 + t * dy);
	((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}
