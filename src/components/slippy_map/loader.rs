//! Asynchronous overlay loaders.
//!
//! Each loader fetches one resource, parses it and appends overlays to the
//! shared [`MapCanvas`]. The `populate_*` wrappers are the failure boundary:
//! they log a failed load once and swallow it, so one loader can never
//! disturb the other or the rest of the page.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_net::http::Request;
use log::{error, info};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::legend::activity_color;
use super::state::MapCanvas;
use super::types::{BoundaryStyle, EdgeCollection, LatLng};

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("request for {url} failed: {reason}")]
	Network { url: String, reason: String },
	#[error("{url} answered with status {status}")]
	Status { url: String, status: u16 },
	#[error("response is not valid JSON: {0}")]
	Parse(#[source] serde_json::Error),
	#[error("response does not match the expected schema: {0}")]
	MalformedSchema(String),
	#[error("edge {index} is malformed: {reason}")]
	MalformedEdge { index: usize, reason: String },
}

/// Where resources come from. The browser uses [`HttpSource`].
#[allow(async_fn_in_trait)]
pub trait ResourceSource {
	async fn fetch_text(&self, url: &str) -> Result<String, LoadError>;
}

/// Fetches resources over HTTP relative to the page.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpSource;

impl ResourceSource for HttpSource {
	async fn fetch_text(&self, url: &str) -> Result<String, LoadError> {
		let network = |e: gloo_net::Error| LoadError::Network {
			url: url.to_string(),
			reason: e.to_string(),
		};
		let resp = Request::get(url).send().await.map_err(network)?;
		if !resp.ok() {
			return Err(LoadError::Status {
				url: url.to_string(),
				status: resp.status(),
			});
		}
		resp.text().await.map_err(network)
	}
}

fn parse_json(body: &str) -> Result<Value, LoadError> {
	serde_json::from_str(body).map_err(LoadError::Parse)
}

/// Fetch the edge collection at `url` and add one polyline per edge, in
/// order. Returns the number of polylines added.
///
/// A malformed edge stops the load; polylines added before it stay.
pub async fn load_edges<S: ResourceSource>(
	source: &S,
	canvas: &RefCell<MapCanvas>,
	url: &str,
) -> Result<usize, LoadError> {
	let body = source.fetch_text(url).await?;
	let collection = EdgeCollection::deserialize(parse_json(&body)?)
		.map_err(|e| LoadError::MalformedSchema(e.to_string()))?;

	let mut canvas = canvas.borrow_mut();
	let mut added = 0;
	for (index, edge) in collection.edge_list.into_iter().enumerate() {
		if edge.geometry.len() < 2 {
			return Err(LoadError::MalformedEdge {
				index,
				reason: format!("geometry has {} point(s), need at least 2", edge.geometry.len()),
			});
		}
		let color = match (edge.color, edge.activity) {
			(Some(color), _) => color,
			(None, Some(activity)) => activity_color(activity),
			(None, None) => {
				return Err(LoadError::MalformedEdge {
					index,
					reason: "no color or activity".into(),
				});
			}
		};
		canvas.add_polyline(edge.geometry, color, edge.popup);
		added += 1;
	}
	Ok(added)
}

/// Fetch the boundary document at `url` and add it as one overlay styled
/// with `style`. Returns the number of polygon rings drawn.
///
/// A document without polygons adds nothing: an empty inverted overlay
/// would shade the whole map.
pub async fn load_boundary<S: ResourceSource>(
	source: &S,
	canvas: &RefCell<MapCanvas>,
	url: &str,
	style: BoundaryStyle,
) -> Result<usize, LoadError> {
	let body = source.fetch_text(url).await?;
	let doc = parse_json(&body)?;
	let mut rings = Vec::new();
	collect_rings(&doc, &mut rings)?;
	let count = rings.len();
	if count > 0 {
		canvas.borrow_mut().add_boundary(rings, style);
	}
	Ok(count)
}

/// Polygon rings of any GeoJSON object. Geometry kinds other than
/// (Multi)Polygon are skipped.
fn collect_rings(obj: &Value, out: &mut Vec<Vec<LatLng>>) -> Result<(), LoadError> {
	let kind = obj
		.get("type")
		.and_then(Value::as_str)
		.ok_or_else(|| LoadError::MalformedSchema("GeoJSON object without \"type\"".into()))?;
	match kind {
		"FeatureCollection" => {
			let features = obj
				.get("features")
				.and_then(Value::as_array)
				.ok_or_else(|| LoadError::MalformedSchema("FeatureCollection without features".into()))?;
			for feature in features {
				collect_rings(feature, out)?;
			}
		}
		"Feature" => {
			if let Some(geometry) = obj.get("geometry").filter(|g| !g.is_null()) {
				collect_rings(geometry, out)?;
			}
		}
		"GeometryCollection" => {
			for geometry in obj.get("geometries").and_then(Value::as_array).into_iter().flatten() {
				collect_rings(geometry, out)?;
			}
		}
		"Polygon" => {
			let polygon: Vec<Vec<Vec<f64>>> = coordinates(obj)?;
			out.extend(polygon.iter().map(|ring| to_ring(ring)));
		}
		"MultiPolygon" => {
			let polygons: Vec<Vec<Vec<Vec<f64>>>> = coordinates(obj)?;
			out.extend(polygons.iter().flatten().map(|ring| to_ring(ring)));
		}
		_ => {}
	}
	Ok(())
}

fn coordinates<T: serde::de::DeserializeOwned>(geometry: &Value) -> Result<T, LoadError> {
	let coords = geometry
		.get("coordinates")
		.cloned()
		.ok_or_else(|| LoadError::MalformedSchema("geometry without coordinates".into()))?;
	serde_json::from_value(coords).map_err(|e| LoadError::MalformedSchema(e.to_string()))
}

fn to_ring(positions: &[Vec<f64>]) -> Vec<LatLng> {
	positions.iter().filter_map(|p| LatLng::from_geojson(p)).collect()
}

/// Run the edge loader, logging the outcome. Failures end here.
pub async fn populate_edges<S: ResourceSource>(
	source: &S,
	canvas: &RefCell<MapCanvas>,
	url: &str,
	fit_bounds: bool,
) -> Option<usize> {
	match load_edges(source, canvas, url).await {
		Ok(count) => {
			info!("Loaded {count} edges from {url}");
			if fit_bounds {
				canvas.borrow_mut().fit_to_polylines();
			}
			Some(count)
		}
		Err(e) => {
			error!("Error loading edges from {url}: {e}");
			None
		}
	}
}

/// Run the boundary loader, logging the outcome. Failures end here.
pub async fn populate_boundary<S: ResourceSource>(
	source: &S,
	canvas: &RefCell<MapCanvas>,
	url: &str,
	style: BoundaryStyle,
) -> Option<usize> {
	match load_boundary(source, canvas, url, style).await {
		Ok(rings) => {
			info!("Loaded boundary with {rings} rings from {url}");
			Some(rings)
		}
		Err(e) => {
			error!("Error loading the GeoJSON file {url}: {e}");
			None
		}
	}
}

/// Start the edge loader on the browser event loop.
pub fn spawn_edge_loader(canvas: Rc<RefCell<MapCanvas>>, url: String, fit_bounds: bool) {
	wasm_bindgen_futures::spawn_local(async move {
		populate_edges(&HttpSource, &canvas, &url, fit_bounds).await;
	});
}

/// Start the boundary loader on the browser event loop.
pub fn spawn_boundary_loader(canvas: Rc<RefCell<MapCanvas>>, url: String, style: BoundaryStyle) {
	wasm_bindgen_futures::spawn_local(async move {
		populate_boundary(&HttpSource, &canvas, &url, style).await;
	});
}
