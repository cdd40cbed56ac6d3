//! Force-directed layout over one graph snapshot.
//!
//! The simulation is a plain iterative solver: every [`Simulation::tick`]
//! applies link, repulsion, centering and collision forces scaled by a
//! cooling factor `alpha`, which decays to `alpha_min` over exactly
//! `max_ticks` ticks. After that the simulation is cooled and ticking is a
//! no-op until [`Simulation::reheat`].

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::types::{Graph, NodeId};

const GOLDEN_ANGLE: f64 = PI * 0.763_932_022_500_210_3;

/// Tunables for the solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
	/// Tick budget of one cooling cycle.
	pub max_ticks: u32,
	/// Rest length of a strength 1 link; stronger links rest closer.
	pub link_distance: f64,
	pub link_stiffness: f64,
	/// Floor applied to edge strength before dividing by it.
	pub min_strength: f64,
	/// Repulsion between every pair of bodies.
	pub charge: f64,
	pub center_strength: f64,
	/// Extra gap kept between node circles.
	pub collision_padding: f64,
	pub collision_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	pub alpha_min: f64,
	/// Per tick displacement cap.
	pub max_speed: f64,
	/// Smallest distance used in any division.
	pub epsilon: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			max_ticks: 100,
			link_distance: 60.0,
			link_stiffness: 0.3,
			min_strength: 0.1,
			charge: 60.0,
			center_strength: 0.5,
			collision_padding: 2.0,
			collision_strength: 0.7,
			velocity_decay: 0.4,
			alpha_min: 0.001,
			max_speed: 50.0,
			epsilon: 1e-3,
		}
	}
}

#[derive(Clone, Debug)]
struct Body {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
	radius: f64,
	pinned: bool,
}

#[derive(Clone, Debug)]
struct Spring {
	a: usize,
	b: usize,
	distance: f64,
}

/// Layout state for the nodes of one graph, indexed in graph order.
#[derive(Clone, Debug)]
pub struct Simulation {
	params: LayoutParams,
	index: HashMap<NodeId, usize>,
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	center: (f64, f64),
	alpha: f64,
	alpha_decay: f64,
	ticks: u32,
}

impl Simulation {
	/// Starts a simulation with random initial jitter.
	pub fn new(graph: &Graph, params: LayoutParams, width: f64, height: f64) -> Self {
		Self::seeded(graph, params, width, height, &HashMap::new(), &mut rand::rng())
	}

	/// Starts a simulation, placing nodes found in `known` at those
	/// coordinates and everything else on a jittered ring around the center.
	pub fn seeded<R: Rng>(
		graph: &Graph,
		params: LayoutParams,
		width: f64,
		height: f64,
		known: &HashMap<NodeId, (f64, f64)>,
		rng: &mut R,
	) -> Self {
		let center = (width / 2.0, height / 2.0);
		let count = graph.nodes.len().max(1) as f64;
		let mut index = HashMap::with_capacity(graph.nodes.len());
		let mut bodies = Vec::with_capacity(graph.nodes.len());

		for (i, node) in graph.nodes.iter().enumerate() {
			let start = known
				.get(&node.id)
				.copied()
				.or(node.position)
				.filter(|(x, y)| x.is_finite() && y.is_finite());
			let (x, y) = start.unwrap_or_else(|| {
				let angle = (i as f64) * 2.0 * PI / count;
				(
					center.0 + 100.0 * angle.cos() + rng.random_range(-5.0..5.0),
					center.1 + 100.0 * angle.sin() + rng.random_range(-5.0..5.0),
				)
			});
			index.insert(node.id.clone(), i);
			bodies.push(Body {
				x,
				y,
				vx: 0.0,
				vy: 0.0,
				radius: node.radius(),
				pinned: false,
			});
		}

		let springs = graph
			.edges
			.iter()
			.filter(|e| !e.is_self_loop() && e.strength.is_finite())
			.filter_map(|e| {
				let (&a, &b) = (index.get(&e.source)?, index.get(&e.target)?);
				Some(Spring {
					a,
					b,
					distance: params.link_distance / e.strength.max(params.min_strength),
				})
			})
			.collect();

		let alpha_decay = if params.max_ticks == 0 {
			1.0
		} else {
			1.0 - params.alpha_min.powf(1.0 / params.max_ticks as f64)
		};

		Self {
			params,
			index,
			bodies,
			springs,
			center,
			alpha: 1.0,
			alpha_decay,
			ticks: 0,
		}
	}

	/// Advances one step. Returns whether the simulation is still warm.
	pub fn tick(&mut self) -> bool {
		if self.is_cooled() {
			return false;
		}
		self.alpha -= self.alpha * self.alpha_decay;

		self.apply_links();
		self.apply_repulsion();
		self.integrate();
		self.apply_centering();
		self.apply_collisions();
		self.sanitize();

		self.ticks += 1;
		if self.is_cooled() {
			debug!("layout cooled after {} ticks", self.ticks);
			return false;
		}
		true
	}

	/// Ticks until cooled, returning the number of ticks taken.
	#[cfg(test)]
	pub fn run(&mut self) -> u32 {
		let start = self.ticks;
		while self.tick() {}
		self.ticks - start
	}

	/// True once the tick budget is spent.
	pub fn is_cooled(&self) -> bool {
		self.ticks >= self.params.max_ticks
	}

	/// Restarts the cooling cycle.
	pub fn reheat(&mut self) {
		self.ticks = 0;
		self.alpha = 1.0;
	}

	/// Fixes a node at `(x, y)`. Non-finite coordinates are ignored.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		if !x.is_finite() || !y.is_finite() {
			return false;
		}
		let Some(body) = self.index.get(id).map(|&i| &mut self.bodies[i]) else {
			return false;
		};
		body.x = x;
		body.y = y;
		body.vx = 0.0;
		body.vy = 0.0;
		body.pinned = true;
		true
	}

	/// Releases a pinned node back to the forces.
	pub fn unpin(&mut self, id: &str) -> bool {
		match self.index.get(id) {
			Some(&i) => {
				self.bodies[i].pinned = false;
				true
			}
			None => false,
		}
	}

	/// Whether the node is currently pinned.
	pub fn is_pinned(&self, id: &str) -> bool {
		self.index.get(id).is_some_and(|&i| self.bodies[i].pinned)
	}

	/// Position of a node by id.
	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.index.get(id).and_then(|&i| self.position_at(i))
	}

	/// Position of the node at `index` in graph order.
	pub fn position_at(&self, index: usize) -> Option<(f64, f64)> {
		self.bodies.get(index).map(|b| (b.x, b.y))
	}

	/// Graph-order index of a node.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Snapshot of every position, keyed by node id.
	pub fn positions(&self) -> HashMap<NodeId, (f64, f64)> {
		self.index
			.iter()
			.map(|(id, &i)| (id.clone(), (self.bodies[i].x, self.bodies[i].y)))
			.collect()
	}

	/// Topmost node whose circle, grown by `slop`, contains `(x, y)`.
	pub fn node_at(&self, x: f64, y: f64, slop: f64) -> Option<usize> {
		self.bodies
			.iter()
			.enumerate()
			.rev()
			.find(|(_, b)| (b.x - x).hypot(b.y - y) <= b.radius + slop)
			.map(|(i, _)| i)
	}

	/// Moves the centering target to the middle of a new viewport.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.center = (width / 2.0, height / 2.0);
	}

	/// Vector from body `i` to body `j` and its length, never shorter than
	/// epsilon. Coincident bodies get a deterministic direction.
	fn separation(&self, i: usize, j: usize) -> (f64, f64, f64) {
		let eps = self.params.epsilon;
		let (a, b) = (&self.bodies[i], &self.bodies[j]);
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = dx.hypot(dy);
		if dist.is_finite() && dist >= eps {
			return (dx, dy, dist);
		}
		let angle = (i * 7 + j * 13 + 1) as f64 * GOLDEN_ANGLE;
		(angle.cos() * eps, angle.sin() * eps, eps)
	}

	fn apply_links(&mut self) {
		let strength = self.params.link_stiffness * self.alpha * 0.5;
		for s in 0..self.springs.len() {
			let Spring { a, b, distance } = self.springs[s];
			let (dx, dy, dist) = self.separation(a, b);
			let k = (dist - distance) / dist * strength;
			let (fx, fy) = (dx * k, dy * k);
			self.bodies[a].vx += fx;
			self.bodies[a].vy += fy;
			self.bodies[b].vx -= fx;
			self.bodies[b].vy -= fy;
		}
	}

	fn apply_repulsion(&mut self) {
		let charge = self.params.charge * self.alpha;
		for i in 0..self.bodies.len() {
			for j in (i + 1)..self.bodies.len() {
				let (dx, dy, dist) = self.separation(i, j);
				let f = charge / (dist * dist);
				let (fx, fy) = (dx * f, dy * f);
				self.bodies[i].vx -= fx;
				self.bodies[i].vy -= fy;
				self.bodies[j].vx += fx;
				self.bodies[j].vy += fy;
			}
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.params.velocity_decay;
		let max_speed = self.params.max_speed;
		for body in &mut self.bodies {
			if body.pinned {
				body.vx = 0.0;
				body.vy = 0.0;
				continue;
			}
			body.vx *= keep;
			body.vy *= keep;
			let speed = body.vx.hypot(body.vy);
			if speed > max_speed {
				body.vx *= max_speed / speed;
				body.vy *= max_speed / speed;
			}
			body.x += body.vx;
			body.y += body.vy;
		}
	}

	fn apply_centering(&mut self) {
		let free = self.bodies.iter().filter(|b| !b.pinned);
		let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
		for b in free {
			sx += b.x;
			sy += b.y;
			n += 1;
		}
		if n == 0 {
			return;
		}
		let shift_x = (self.center.0 - sx / n as f64) * self.params.center_strength;
		let shift_y = (self.center.1 - sy / n as f64) * self.params.center_strength;
		for b in self.bodies.iter_mut().filter(|b| !b.pinned) {
			b.x += shift_x;
			b.y += shift_y;
		}
	}

	fn apply_collisions(&mut self) {
		let (padding, strength) = (self.params.collision_padding, self.params.collision_strength);
		for i in 0..self.bodies.len() {
			for j in (i + 1)..self.bodies.len() {
				let (pi, pj) = (self.bodies[i].pinned, self.bodies[j].pinned);
				if pi && pj {
					continue;
				}
				let touching = self.bodies[i].radius + self.bodies[j].radius;
				let (dx, dy, dist) = self.separation(i, j);
				if dist >= touching + padding {
					continue;
				}
				// Overlapping circles are separated in full, only the padding is eased in.
				let push = if dist < touching {
					touching - dist + padding * strength
				} else {
					(touching + padding - dist) * strength
				};
				let k = push / dist;
				let (px, py) = (dx * k, dy * k);
				let (share_i, share_j) = match (pi, pj) {
					(true, _) => (0.0, 1.0),
					(_, true) => (1.0, 0.0),
					_ => (0.5, 0.5),
				};
				self.bodies[i].x -= px * share_i;
				self.bodies[i].y -= py * share_i;
				self.bodies[j].x += px * share_j;
				self.bodies[j].y += py * share_j;
			}
		}
	}

	fn sanitize(&mut self) {
		for body in &mut self.bodies {
			if !(body.x.is_finite() && body.y.is_finite()) {
				body.x = self.center.0;
				body.y = self.center.1;
			}
			if !(body.vx.is_finite() && body.vy.is_finite()) {
				body.vx = 0.0;
				body.vy = 0.0;
			}
		}
	}
}
