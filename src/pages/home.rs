use leptos::prelude::*;

use crate::components::slippy_map::SlippyMap;
use crate::config::MapPreset;

/// Full-page map for one preset. A preset that fails validation renders the
/// error list instead.
#[component]
pub fn MapPage(preset: MapPreset) -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="fullscreen-map" style="position: fixed; inset: 0;">
				<SlippyMap preset=preset />
			</div>
		</ErrorBoundary>
	}
}

/// Default Home Page: Bedford edges with hover highlighting.
#[component]
pub fn Home() -> impl IntoView {
	view! { <MapPage preset=MapPreset::beds_geojson() /> }
}
