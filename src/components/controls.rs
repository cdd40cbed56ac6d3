use leptos::ev;
use leptos::prelude::*;

/// Step of the confidence slider.
const THRESHOLD_STEP: f64 = 0.05;

/// Sidebar with node-type toggles and the confidence threshold slider.
#[component]
pub fn FilterControls(
	show_papers: RwSignal<bool>,
	show_concepts: RwSignal<bool>,
	confidence_threshold: RwSignal<f64>,
) -> impl IntoView {
	let on_threshold = move |evt: ev::Event| {
		if let Ok(value) = event_target_value(&evt).parse::<f64>() {
			confidence_threshold.set(value.clamp(0.0, 1.0));
		}
	};

	view! {
		<aside class="graph-controls">
			<h3>"Filters"</h3>
			<label class="toggle">
				<input
					type="checkbox"
					prop:checked=move || show_papers.get()
					on:change=move |evt| show_papers.set(event_target_checked(&evt))
				/>
				"Show papers"
			</label>
			<label class="toggle">
				<input
					type="checkbox"
					prop:checked=move || show_concepts.get()
					on:change=move |evt| show_concepts.set(event_target_checked(&evt))
				/>
				"Show concepts"
			</label>
			<label class="threshold">
				<span>
					"Confidence threshold: "
					{move || format!("{:.0}%", confidence_threshold.get() * 100.0)}
				</span>
				<input
					type="range"
					min="0"
					max="1"
					step=THRESHOLD_STEP.to_string()
					prop:value=move || confidence_threshold.get().to_string()
					on:input=on_threshold
				/>
			</label>
		</aside>
	}
}
