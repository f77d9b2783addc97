use crate::animation::builtin::map_vectors;
use crate::animation::module::{AnimationModule, ModuleScratch};
use crate::animation::props::{
    AnimationProps, prop_f64_or, prop_u64_or, props_from_value, require_integer, require_number,
};
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::VecfieldResult;
use crate::model::context::AnimationContext;
use crate::model::vector::VectorState;

/// A small boids flock roams the surface; every vector points at its nearest agent.
///
/// The flock lives in the executor-owned scratch, so each pipeline instance has its own flock.
pub struct Flocking;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Agent {
    pub(crate) pos: Point,
    pub(crate) vel: Vec2,
}

#[derive(Debug, Default)]
pub(crate) struct FlockState {
    pub(crate) agents: Vec<Agent>,
    last_ms: Option<f64>,
    seed: u64,
}

/// SplitMix64; deterministic agent spawning.
struct Rng64 {
    state: u64,
}

impl Rng64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

// Longest simulated step; a stalled tab resumes without agents teleporting.
const MAX_STEP_SECS: f64 = 0.1;

impl FlockState {
    fn spawn(&mut self, count: usize, seed: u64, speed: f64, width: f64, height: f64) {
        let mut rng = Rng64::new(seed);
        self.agents = (0..count)
            .map(|_| {
                let pos = Point::new(rng.next_f64_01() * width, rng.next_f64_01() * height);
                let heading = rng.next_f64_01() * std::f64::consts::TAU;
                Agent {
                    pos,
                    vel: Vec2::from_angle(heading) * speed,
                }
            })
            .collect();
        self.seed = seed;
        self.last_ms = None;
    }

    fn step(&mut self, dt: f64, speed: f64, radius: f64, width: f64, height: f64) {
        let snapshot = self.agents.clone();
        let r2 = radius * radius;
        for agent in &mut self.agents {
            let mut center = Vec2::ZERO;
            let mut heading = Vec2::ZERO;
            let mut separation = Vec2::ZERO;
            let mut n = 0.0;
            for other in &snapshot {
                let d = other.pos - agent.pos;
                let d2 = d.length_squared();
                if d2 == 0.0 || d2 > r2 {
                    continue;
                }
                n += 1.0;
                center += other.pos.to_vec2();
                heading += other.vel;
                separation -= d / d2.sqrt();
            }
            if n > 0.0 {
                let cohesion = center / n - agent.pos.to_vec2();
                let alignment = heading / n - agent.vel;
                agent.vel += (cohesion * 0.5 + alignment * 0.8 + separation * speed * 1.5) * dt;
            }
            let v = agent.vel.length();
            if v > speed && v > 0.0 {
                agent.vel *= speed / v;
            }
            let p = agent.pos + agent.vel * dt;
            agent.pos = Point::new(p.x.rem_euclid(width), p.y.rem_euclid(height));
        }
    }

    fn nearest(&self, p: Point) -> Option<Point> {
        self.agents
            .iter()
            .map(|a| a.pos)
            .min_by(|a, b| {
                (*a - p)
                    .length_squared()
                    .total_cmp(&(*b - p).length_squared())
            })
    }
}

impl AnimationModule for Flocking {
    fn id(&self) -> &str {
        "flocking"
    }

    fn default_props(&self) -> AnimationProps {
        props_from_value(serde_json::json!({
            "agents": 12,
            "speed": 140.0,
            "radius": 120.0,
            "seed": 7,
        }))
    }

    fn validate_props(&self, props: &AnimationProps) -> VecfieldResult<()> {
        require_integer(props, "agents", 1, 256)?;
        require_number(props, "speed", 0.0, 5000.0)?;
        require_number(props, "radius", 1.0, 100_000.0)?;
        require_integer(props, "seed", 0, 9_000_000_000_000_000)?;
        Ok(())
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
        scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        let count = prop_u64_or(props, "agents", 12) as usize;
        let speed = prop_f64_or(props, "speed", 140.0);
        let radius = prop_f64_or(props, "radius", 120.0);
        let seed = prop_u64_or(props, "seed", 7);
        let (w, h) = (ctx.width.max(1.0), ctx.height.max(1.0));

        let flock = scratch.get_or_insert_with(FlockState::default);
        if flock.agents.len() != count || flock.seed != seed {
            flock.spawn(count, seed, speed, w, h);
        }
        let dt = match flock.last_ms {
            Some(last) => ((ctx.elapsed_ms - last) / 1000.0).clamp(0.0, MAX_STEP_SECS),
            None => 0.0,
        };
        flock.last_ms = Some(ctx.elapsed_ms);
        if dt > 0.0 {
            flock.step(dt, speed, radius, w, h);
        }

        let flock = &*flock;
        Ok(map_vectors(vectors, |v| {
            if let Some(target) = flock.nearest(v.origin()) {
                let d = target - v.origin();
                if d.length_squared() > 0.0 {
                    v.angle = d.atan2();
                }
            }
        }))
    }

    fn on_destroy(&self, scratch: &mut ModuleScratch) {
        scratch.clear();
    }

    fn complexity_weight(&self) -> Option<f64> {
        Some(0.9)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/animation/flocking.rs"]
mod tests;
