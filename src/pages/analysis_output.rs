use leptos::prelude::*;

use super::home::MapPage;
use crate::config::MapPreset;

/// Map straight from the analysis output directory.
#[component]
pub fn AnalysisOutput() -> impl IntoView {
	view! { <MapPage preset=MapPreset::analysis_output() /> }
}
