mod component;
mod frame;
pub mod legend;
pub mod loader;
pub mod projection;
mod render;
pub mod state;
pub mod tiles;
mod types;

pub use component::SlippyMap;
pub use legend::{Legend, LegendRow, activity_color, legend_rows};
pub use loader::{HttpSource, LoadError, ResourceSource, load_boundary, load_edges, populate_boundary, populate_edges};
pub use projection::{ConfigError, MapView};
pub use state::MapCanvas;
pub use tiles::{STADIA_ATTRIBUTION, STADIA_SMOOTH_URL};
pub use types::{BoundaryOverlay, BoundaryStyle, EdgeCollection, EdgeRecord, EdgeStyle, LatLng, Polyline};
