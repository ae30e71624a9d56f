use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegendRow {
	pub label: &'static str,
	pub color: &'static str,
}

const ROWS: &[LegendRow] = &[
	LegendRow {
		label: "Public Right of Way",
		color: "black",
	},
	LegendRow {
		label: "Active non-PRoW",
		color: "magenta",
	},
	LegendRow {
		label: "Highly active non-PRoW",
		color: "red",
	},
];

/// Rows of the legend panel, top to bottom. Independent of map state.
pub fn legend_rows() -> &'static [LegendRow] {
	ROWS
}

/// Colour ramp behind the legend: negative activity marks a public right
/// of way (black); otherwise 0..=100 runs from magenta to red.
pub fn activity_color(activity: f64) -> String {
	if activity < 0.0 {
		return "#000000".into();
	}
	let v = activity.min(100.0) / 100.0 * 0.9 + 0.1;
	let blue = (255.0 - 255.0 * v) as u8;
	format!("#ff00{blue:02x}")
}

/// Static top-right legend control.
#[component]
pub fn Legend() -> impl IntoView {
	view! {
		<div class="legend" style="position: absolute; top: 10px; right: 10px; z-index: 1000; padding: 6px 8px; background: rgba(255, 255, 255, 0.8); border-radius: 5px; line-height: 18px; font: 14px sans-serif;">
			{legend_rows()
				.iter()
				.map(|row| {
					view! {
						<div class="legend-row">
							<i style=format!(
								"display: inline-block; width: 18px; height: 18px; margin-right: 8px; vertical-align: middle; background: {}",
								row.color,
							)></i>
							{row.label}
						</div>
					}
				})
				.collect_view()}
		</div>
	}
}
