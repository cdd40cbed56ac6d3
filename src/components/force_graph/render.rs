use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, ease_out_cubic};

const BACKGROUND: &str = "#1a1a2e";
const EMPTY_MESSAGE: &str = "No graph data available";

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	if state.graph.is_empty() {
		if !state.show_empty_message {
			return;
		}
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.6)");
		ctx.set_font("14px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(EMPTY_MESSAGE, state.width / 2.0, state.height / 2.0);
		ctx.set_text_align("start");
		return;
	}

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (base_width, dash, gap, arrow_size) = (1.0 / k, 8.0 / k, 4.0 / k, 6.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for edge in &state.graph.edges {
		let (Some(a), Some(b)) = (
			state.simulation.index_of(&edge.source),
			state.simulation.index_of(&edge.target),
		) else {
			continue;
		};
		let (Some((x1, y1)), Some((x2, y2))) =
			(state.simulation.position_at(a), state.simulation.position_at(b))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = dx.hypot(dy);
		if dist < 0.001 {
			continue;
		}
		let (r1, r2) = (
			state.graph.nodes[a].radius(),
			state.graph.nodes[b].radius(),
		);

		let is_highlighted = state.is_highlighted(a) && state.is_highlighted(b);
		let width = base_width * edge.strength.clamp(0.5, 4.0);

		// t=0: every edge at 0.6; t=1: highlighted at 0.95, others at 0.15
		let (alpha, width) = if is_highlighted {
			(0.6 + 0.35 * t, width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, width * (1.0 - 0.3 * t))
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(edge.kind.color());
		ctx.set_fill_style_str(edge.kind.color());
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + arrow_size), y2 - uy * (r2 + arrow_size));
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_label(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64, k: f64) {
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	let _ = ctx.fill_text(text, x, y);
}

fn draw_selection_ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, k: f64) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius + 3.0 / k, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str("#facc15");
	ctx.set_line_width(2.0 / k);
	ctx.stroke();
}

// Dashed ring around a node held by a drag.
fn draw_pin_ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, k: f64) {
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(3.0 / k),
		&JsValue::from_f64(2.0 / k),
	));
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius + 6.0 / k, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
	ctx.set_line_width(1.0 / k);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	for (idx, node) in state.graph.nodes.iter().enumerate() {
		if has_highlight && state.is_highlighted(idx) {
			continue;
		}
		let Some((x, y)) = state.simulation.position_at(idx) else {
			continue;
		};
		let base = node.radius();
		let (alpha, radius) = (1.0 - 0.7 * t, base * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.color());
		ctx.fill();

		if state.is_selected(idx) {
			draw_selection_ring(ctx, x, y, radius, k);
		}
		if state.simulation.is_pinned(&node.id) {
			draw_pin_ring(ctx, x, y, radius, k);
		}

		ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
		draw_label(ctx, &node.name, x + radius + 3.0, y + 3.0, k);
		ctx.set_global_alpha(1.0);
	}

	if !has_highlight {
		return;
	}

	for (idx, node) in state.graph.nodes.iter().enumerate() {
		if !state.is_highlighted(idx) {
			continue;
		}
		let Some((x, y)) = state.simulation.position_at(idx) else {
			continue;
		};
		let base = node.radius();
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(base * (1.0 + 0.35 * t), base * (1.8 + 1.2 * t))
		} else if is_neighbor {
			(base * (1.0 + 0.2 * t), base * (1.4 + 0.6 * t))
		} else {
			(base, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
				let _ = gradient.add_color_stop(
					0.6,
					&format!("rgba(200, 220, 255, {})", alpha * 0.3),
				);
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.color());
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
		if state.is_selected(idx) {
			draw_selection_ring(ctx, x, y, radius, k);
		}
		if state.simulation.is_pinned(&node.id) {
			draw_pin_ring(ctx, x, y, radius, k);
		}

		ctx.set_fill_style_str("white");
		draw_label(ctx, &node.name, x + radius + 3.0, y + 3.0, k);
	}
}
