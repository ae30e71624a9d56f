use web_sys::{CanvasRenderingContext2d, CanvasWindingRule};

use super::projection::TILE_SIZE;
use super::state::MapCanvas;
use super::tiles::{TileCache, is_drawable, visible_tiles};
use super::types::BoundaryOverlay;

pub fn render(state: &MapCanvas, tiles: &mut TileCache, ctx: &CanvasRenderingContext2d) {
	let (w, h) = (state.view.width, state.view.height);
	ctx.set_fill_style_str("#f2efe9");
	ctx.fill_rect(0.0, 0.0, w, h);
	draw_tiles(state, tiles, ctx);
	for boundary in state.boundaries() {
		draw_boundary(state, boundary, ctx);
	}
	draw_polylines(state, ctx);
}

fn draw_tiles(state: &MapCanvas, tiles: &mut TileCache, ctx: &CanvasRenderingContext2d) {
	let placements = visible_tiles(&state.view);
	for placement in &placements {
		let Some(img) = tiles.get(placement.key) else {
			continue;
		};
		if is_drawable(img) {
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				img,
				placement.sx,
				placement.sy,
				TILE_SIZE,
				TILE_SIZE,
			);
		}
	}
	tiles.retain_visible(&placements);
}

fn trace_rings(state: &MapCanvas, boundary: &BoundaryOverlay, ctx: &CanvasRenderingContext2d) {
	for ring in &boundary.rings {
		let mut points = ring.iter().map(|p| state.view.to_screen(*p));
		let Some((x, y)) = points.next() else {
			continue;
		};
		ctx.move_to(x, y);
		for (x, y) in points {
			ctx.line_to(x, y);
		}
		ctx.close_path();
	}
}

fn draw_boundary(state: &MapCanvas, boundary: &BoundaryOverlay, ctx: &CanvasRenderingContext2d) {
	if boundary.rings.is_empty() {
		return;
	}
	let style = &boundary.style;
	let (w, h) = (state.view.width, state.view.height);

	ctx.begin_path();
	if style.invert {
		// Outer rectangle padded past the edges so the stroke never shows.
		ctx.rect(-w, -h, w * 3.0, h * 3.0);
	}
	trace_rings(state, boundary, ctx);
	ctx.set_global_alpha(style.fill_opacity);
	ctx.set_fill_style_str(&style.fill_color);
	ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
	ctx.set_global_alpha(1.0);

	// Stroke only the polygon outlines, not the inversion frame.
	ctx.begin_path();
	trace_rings(state, boundary, ctx);
	ctx.set_stroke_style_str(&style.color);
	ctx.set_line_width(style.weight);
	ctx.set_line_join("round");
	ctx.stroke();
}

fn draw_polylines(state: &MapCanvas, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_cap("round");
	ctx.set_line_join("round");
	for line in state.polylines() {
		let mut points = line.points.iter().map(|p| state.view.to_screen(*p));
		let Some((x, y)) = points.next() else {
			continue;
		};
		ctx.begin_path();
		ctx.move_to(x, y);
		for (x, y) in points {
			ctx.line_to(x, y);
		}
		ctx.set_stroke_style_str(&line.color);
		ctx.set_line_width(line.weight);
		ctx.stroke();
	}
}
