use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use send_wrapper::SendWrapper;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::frame::FrameLoop;
use super::legend::Legend;
use super::loader::{spawn_boundary_loader, spawn_edge_loader};
use super::projection::ConfigError;
use super::render;
use super::state::MapCanvas;
use super::tiles::TileCache;
use crate::config::MapPreset;

/// Closure slot shared between a callback and whoever unregisters it.
type CallbackSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Popup text with its current screen anchor.
type PopupView = Option<(String, f64, f64)>;

fn popup_view(s: &MapCanvas) -> PopupView {
	s.popup.as_ref().map(|p| {
		let (x, y) = s.view.to_screen(p.at);
		(p.text.clone(), x, y)
	})
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Wheel delta in pixels, whatever unit the browser reported it in.
fn wheel_delta_px(ev: &WheelEvent, page_height: f64) -> f64 {
	match ev.delta_mode() {
		WheelEvent::DOM_DELTA_LINE => ev.delta_y() * 40.0,
		WheelEvent::DOM_DELTA_PAGE => ev.delta_y() * page_height,
		_ => ev.delta_y(),
	}
}

fn show_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, s: &MapCanvas) {
	if let Some(canvas) = canvas_ref.get() {
		let canvas: HtmlCanvasElement = canvas.into();
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", s.cursor());
	}
}

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Interactive map: tile base layer, edge and boundary overlays, legend.
///
/// The tile layer and legend exist as soon as the canvas mounts; the two
/// overlay loaders then run independently in the background.
#[component]
pub fn SlippyMap(preset: MapPreset) -> Result<impl IntoView, ConfigError> {
	let view = preset.view()?;
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = Rc::new(RefCell::new(MapCanvas::new(view, preset.edge_style.clone())));
	let animate: CallbackSlot = Rc::new(RefCell::new(None));
	let resize_cb: CallbackSlot = Rc::new(RefCell::new(None));
	let frames = Rc::new(FrameLoop::default());
	let started = Rc::new(Cell::new(false));
	let popup = RwSignal::new(PopupView::None);
	let attribution = preset.attribution;

	let teardown = SendWrapper::new((animate.clone(), resize_cb.clone(), frames.clone()));
	on_cleanup(move || {
		let (animate, resize_cb, frames) = teardown.take();
		let window = web_sys::window();
		if let (Some(id), Some(win)) = (frames.stop(), window.as_ref()) {
			let _ = win.cancel_animation_frame(id);
		}
		if let Some(cb) = resize_cb.borrow_mut().take() {
			if let Some(win) = window.as_ref() {
				let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		animate.borrow_mut().take();
		log::debug!("Map torn down");
	});

	let (state_init, animate_init, resize_cb_init, frames_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), frames.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if frames_init.is_stopped() || started.replace(true) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		state_init.borrow_mut().resize(w, h);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
			.expect("canvas 2d context");
		let mut tiles = TileCache::new(preset.tile_url, window.device_pixel_ratio() > 1.0);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = container_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			let mut s = state_resize.borrow_mut();
			s.resize(nw, nh);
			popup.set(popup_view(&s));
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, frames_anim) =
			(state_init.clone(), animate_init.clone(), frames_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !frames_anim.fired() {
				return;
			}
			{
				let mut s = state_anim.borrow_mut();
				if s.take_dirty() || tiles.has_pending() {
					render::render(&s, &mut tiles, &ctx);
					popup.set(popup_view(&s));
				}
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
					frames_anim.scheduled(id);
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				frames_init.scheduled(id);
			}
		}

		log::info!("Map ready at zoom {}", state_init.borrow().view.zoom);
		spawn_edge_loader(state_init.clone(), preset.edges_url.clone(), preset.fit_bounds);
		spawn_boundary_loader(
			state_init.clone(),
			preset.boundary_url.clone(),
			preset.boundary_style.clone(),
		);
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_md.borrow_mut();
		s.drag.active = true;
		s.drag.moved = false;
		s.drag.last_x = x;
		s.drag.last_y = y;
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_mm.borrow_mut();
		if s.drag.active {
			let (dx, dy) = (x - s.drag.last_x, y - s.drag.last_y);
			if dx != 0.0 || dy != 0.0 {
				s.drag.moved = true;
				s.drag.last_x = x;
				s.drag.last_y = y;
				s.pan_by(dx, dy);
			}
		} else {
			let hovered = s.polyline_at(x, y);
			s.set_hover(hovered);
		}
		show_cursor(canvas_ref, &s);
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let mut s = state_mu.borrow_mut();
		if s.drag.active && !s.drag.moved {
			if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
				s.click(x, y);
			}
		}
		s.drag.active = false;
		s.drag.moved = false;
		show_cursor(canvas_ref, &s);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut s = state_ml.borrow_mut();
		s.drag.active = false;
		s.drag.moved = false;
		s.set_hover(None);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_wh.borrow_mut();
		let px = wheel_delta_px(&ev, s.view.height);
		s.wheel(px, x, y);
	};

	Ok(view! {
		<div class="slippy-map" style="position: relative; width: 100%; height: 100%; overflow: hidden;">
			<canvas
				node_ref=canvas_ref
				class="slippy-map-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<Legend />
			{move || {
				popup
					.get()
					.map(|(text, x, y)| {
						view! {
							<div
								class="map-popup"
								style=format!(
									"position: absolute; left: {x}px; top: {y}px; transform: translate(-50%, calc(-100% - 8px)); z-index: 1001; padding: 6px 10px; background: white; border-radius: 4px; box-shadow: 0 1px 4px rgba(0, 0, 0, 0.4); font: 13px sans-serif; pointer-events: none;",
								)
							>
								{text}
							</div>
						}
					})
			}}
			<div
				class="map-attribution"
				style="position: absolute; right: 0; bottom: 0; z-index: 1000; padding: 0 5px; background: rgba(255, 255, 255, 0.8); font: 11px sans-serif;"
			>
				{attribution
					.iter()
					.map(|(label, href)| {
						view! {
							"© "
							<a href=*href target="_blank">
								{*label}
							</a>
							" "
						}
					})
					.collect_view()}
			</div>
		</div>
	})
}
