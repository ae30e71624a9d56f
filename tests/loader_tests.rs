use std::cell::RefCell;
use std::collections::HashMap;

use futures::executor::block_on;
use log::{Level, LevelFilter, Log, Metadata, Record};
use prow_map::components::slippy_map::{
	BoundaryStyle, EdgeStyle, LoadError, MapCanvas, ResourceSource, legend_rows, load_edges,
	populate_boundary, populate_edges,
};
use prow_map::config::MapPreset;

struct MemorySource(HashMap<&'static str, Result<&'static str, u16>>);

impl MemorySource {
	fn new(entries: &[(&'static str, Result<&'static str, u16>)]) -> Self {
		Self(entries.iter().cloned().collect())
	}
}

impl ResourceSource for MemorySource {
	async fn fetch_text(&self, url: &str) -> Result<String, LoadError> {
		match self.0.get(url) {
			Some(Ok(body)) => Ok(body.to_string()),
			Some(Err(status)) => Err(LoadError::Status {
				url: url.to_string(),
				status: *status,
			}),
			None => Err(LoadError::Network {
				url: url.to_string(),
				reason: "connection refused".into(),
			}),
		}
	}
}

thread_local! {
	static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Collects log records per test thread.
struct CaptureLogger;

impl Log for CaptureLogger {
	fn enabled(&self, _: &Metadata) -> bool {
		true
	}

	fn log(&self, record: &Record) {
		RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
	}

	fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

fn capture_logs() {
	let _ = log::set_logger(&LOGGER);
	log::set_max_level(LevelFilter::Trace);
	RECORDS.with(|r| r.borrow_mut().clear());
}

fn logged() -> Vec<(Level, String)> {
	RECORDS.with(|r| r.borrow().clone())
}

fn canvas(style: EdgeStyle) -> RefCell<MapCanvas> {
	let mut c = MapCanvas::new(MapPreset::beds_geojson().view().unwrap(), style);
	c.resize(800.0, 600.0);
	RefCell::new(c)
}

const EDGES: &str = r#"{"edge_list": [
	{"geometry": [[52.06, -0.40], [52.07, -0.39]], "color": "black"},
	{"geometry": [[52.06, -0.41], [52.065, -0.40], [52.07, -0.38]], "color": "magenta"},
	{"geometry": [[52.05, -0.42], [52.08, -0.37]], "color": "red", "popup": "Busy path"}
]}"#;

const BOUNDARY: &str = r#"{"type": "FeatureCollection", "features": [
	{"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
		"coordinates": [[[-0.7, 52.0], [-0.2, 52.0], [-0.2, 52.3], [-0.7, 52.0]]]}}
]}"#;

#[test]
fn every_edge_becomes_a_polyline_with_its_color() {
	let source = MemorySource::new(&[("edges.json", Ok(EDGES))]);
	let canvas = canvas(EdgeStyle::default());
	let added = block_on(load_edges(&source, &canvas, "edges.json")).unwrap();
	assert_eq!(added, 3);

	let c = canvas.borrow();
	let colors: Vec<&str> = c.polylines().iter().map(|l| l.color.as_str()).collect();
	assert_eq!(colors, ["black", "magenta", "red"]);
	assert!(c.polylines().iter().all(|l| l.weight == 3.0));
	assert_eq!(c.polylines()[2].popup.as_deref(), Some("Busy path"));
	assert_eq!(c.polylines()[1].points.len(), 3);
}

#[test]
fn hover_round_trip_after_load() {
	let source = MemorySource::new(&[("edges.json", Ok(EDGES))]);
	let canvas = canvas(EdgeStyle::default());
	block_on(load_edges(&source, &canvas, "edges.json")).unwrap();

	let mut c = canvas.borrow_mut();
	for _ in 0..10 {
		c.set_hover(Some(1));
		assert_eq!(c.polylines()[1].weight, 8.0);
		c.set_hover(None);
	}
	assert!(c.polylines().iter().all(|l| l.weight == 3.0));
}

#[test]
fn boundary_failure_leaves_edges_and_legend_alone() {
	capture_logs();
	let source = MemorySource::new(&[
		("edges.json", Ok(EDGES)),
		("boundaries/lad_filtered.geojson", Err(404)),
	]);
	let canvas = canvas(EdgeStyle::default());

	let boundary = block_on(populate_boundary(
		&source,
		&canvas,
		"boundaries/lad_filtered.geojson",
		BoundaryStyle::default(),
	));
	let edges = block_on(populate_edges(&source, &canvas, "edges.json", false));

	assert_eq!(boundary, None);
	assert_eq!(edges, Some(3));
	assert_eq!(canvas.borrow().polylines().len(), 3);
	assert!(canvas.borrow().boundaries().is_empty());
	assert_eq!(legend_rows().len(), 3);

	let errors: Vec<_> = logged().into_iter().filter(|(l, _)| *l == Level::Error).collect();
	assert_eq!(errors.len(), 1);
	assert!(errors[0].1.contains("404"));
}

#[test]
fn missing_edge_list_adds_nothing_and_logs_once() {
	capture_logs();
	let source = MemorySource::new(&[("edges.json", Ok("{}"))]);
	let canvas = canvas(EdgeStyle::default());

	assert!(matches!(
		block_on(load_edges(&source, &canvas, "edges.json")),
		Err(LoadError::MalformedSchema(_))
	));
	capture_logs();
	assert_eq!(block_on(populate_edges(&source, &canvas, "edges.json", false)), None);

	assert!(canvas.borrow().polylines().is_empty());
	let records = logged();
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].0, Level::Error);
}

#[test]
fn invalid_json_and_unreachable_resources_are_typed() {
	let source = MemorySource::new(&[("bad.json", Ok("{not json")), ("gone.json", Err(500))]);
	let canvas = canvas(EdgeStyle::default());

	assert!(matches!(
		block_on(load_edges(&source, &canvas, "bad.json")),
		Err(LoadError::Parse(_))
	));
	assert!(matches!(
		block_on(load_edges(&source, &canvas, "gone.json")),
		Err(LoadError::Status { status: 500, .. })
	));
	assert!(matches!(
		block_on(load_edges(&source, &canvas, "missing.json")),
		Err(LoadError::Network { .. })
	));
	assert!(canvas.borrow().polylines().is_empty());
}

#[test]
fn malformed_edge_keeps_earlier_polylines() {
	let body = r#"{"edge_list": [
		{"geometry": [[52.06, -0.40], [52.07, -0.39]], "color": "black"},
		{"geometry": [[52.06, -0.40]], "color": "red"},
		{"geometry": [[52.06, -0.40], [52.07, -0.39]], "color": "blue"}
	]}"#;
	let source = MemorySource::new(&[("edges.json", Ok(body))]);
	let canvas = canvas(EdgeStyle::default());

	let err = block_on(load_edges(&source, &canvas, "edges.json")).unwrap_err();
	assert!(matches!(err, LoadError::MalformedEdge { index: 1, .. }));
	let c = canvas.borrow();
	assert_eq!(c.polylines().len(), 1);
	assert_eq!(c.polylines()[0].color, "black");
}

#[test]
fn z_order_follows_input_order() {
	let ab = r#"{"edge_list": [
		{"geometry": [[52.06, -0.40], [52.07, -0.39]], "color": "red"},
		{"geometry": [[52.06, -0.40], [52.07, -0.39]], "color": "blue"}
	]}"#;
	let ba = r#"{"edge_list": [
		{"geometry": [[52.06, -0.40], [52.07, -0.39]], "color": "blue"},
		{"geometry": [[52.06, -0.40], [52.07, -0.39]], "color": "red"}
	]}"#;
	let source = MemorySource::new(&[("ab.json", Ok(ab)), ("ba.json", Ok(ba))]);

	for (url, top) in [("ab.json", "blue"), ("ba.json", "red")] {
		let canvas = canvas(EdgeStyle::default());
		block_on(load_edges(&source, &canvas, url)).unwrap();
		let c = canvas.borrow();
		let (x, y) = c.view.to_screen(c.polylines()[0].points[0]);
		let hit = c.polyline_at(x, y).unwrap();
		assert_eq!(hit, 1);
		assert_eq!(c.polylines()[hit].color, top);
	}
}

#[test]
fn activity_fills_in_missing_color() {
	let body = r#"{"edge_list": [
		{"geometry": [[52.06, -0.40], [52.07, -0.39]], "activity": -1},
		{"geometry": [[52.06, -0.40], [52.07, -0.39]], "activity": 100}
	]}"#;
	let source = MemorySource::new(&[("edges.json", Ok(body))]);
	let canvas = canvas(EdgeStyle::default());
	block_on(load_edges(&source, &canvas, "edges.json")).unwrap();
	let c = canvas.borrow();
	assert_eq!(c.polylines()[0].color, "#000000");
	assert_eq!(c.polylines()[1].color, "#ff0000");
}

#[test]
fn boundary_is_added_with_fixed_style() {
	let source = MemorySource::new(&[("b.geojson", Ok(BOUNDARY))]);
	let canvas = canvas(EdgeStyle::default());
	let rings = block_on(populate_boundary(&source, &canvas, "b.geojson", BoundaryStyle::default()));
	assert_eq!(rings, Some(1));

	let c = canvas.borrow();
	let style = &c.boundaries()[0].style;
	assert_eq!(style.color, "blue");
	assert_eq!(style.weight, 2.0);
	assert_eq!(style.fill_color, "black");
	assert_eq!(style.fill_opacity, 0.1);
	assert!(style.invert);
	assert!(c.polylines().is_empty());
}

#[test]
fn boundary_without_polygons_adds_no_overlay() {
	let points_only = r#"{"type": "FeatureCollection", "features": [
		{"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [-0.4, 52.1]}}
	]}"#;
	let source = MemorySource::new(&[("b.geojson", Ok(points_only))]);
	let canvas = canvas(EdgeStyle::default());
	let rings = block_on(populate_boundary(&source, &canvas, "b.geojson", BoundaryStyle::default()));
	assert_eq!(rings, Some(0));
	assert!(canvas.borrow().boundaries().is_empty());
}

#[test]
fn loaders_run_together_and_fail_independently() {
	capture_logs();
	let source = MemorySource::new(&[
		("edges.json", Ok(EDGES)),
		("boundaries/lad_filtered.geojson", Ok("{not json")),
	]);
	let canvas = canvas(EdgeStyle::default());

	let (edges, boundary) = block_on(async {
		futures::join!(
			populate_edges(&source, &canvas, "edges.json", false),
			populate_boundary(
				&source,
				&canvas,
				"boundaries/lad_filtered.geojson",
				BoundaryStyle::default()
			),
		)
	});

	assert_eq!(edges, Some(3));
	assert_eq!(boundary, None);
	assert_eq!(canvas.borrow().polylines().len(), 3);
	assert!(canvas.borrow().boundaries().is_empty());
	assert_eq!(legend_rows().len(), 3);
	let errors = logged().into_iter().filter(|(l, _)| *l == Level::Error).count();
	assert_eq!(errors, 1);
}

#[test]
fn analysis_output_preset_fits_view_without_hover() {
	let preset = MapPreset::analysis_output();
	let source = MemorySource::new(&[("../output/Beds_EO.json", Ok(EDGES))]);
	let canvas = canvas(preset.edge_style.clone());
	let before = canvas.borrow().view.clone();

	let added = block_on(populate_edges(&source, &canvas, &preset.edges_url, preset.fit_bounds));
	assert_eq!(added, Some(3));

	let mut c = canvas.borrow_mut();
	assert_ne!(c.view, before);
	assert!((c.view.min_zoom..=c.view.max_zoom).contains(&c.view.zoom));
	c.set_hover(Some(0));
	assert_eq!(c.polylines()[0].weight, 3.0);
}

#[test]
fn legend_ignores_map_state() {
	let source = MemorySource::new(&[("edges.json", Ok(EDGES))]);
	let before = legend_rows().to_vec();
	let canvas = canvas(EdgeStyle::default());
	block_on(load_edges(&source, &canvas, "edges.json")).unwrap();
	{
		let mut c = canvas.borrow_mut();
		c.zoom_at(2, 10.0, 10.0);
		c.pan_by(120.0, -40.0);
	}
	assert_eq!(legend_rows(), before.as_slice());
}
