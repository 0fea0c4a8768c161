//! Background visualizer: drifting dust, the cursor trail and click bursts
//!
//! Lives for the whole host lifetime, independent of any game session.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geom::Rect;
use super::palette;
use super::pool::{Entity, EntityPool, random_point};
use crate::consts::*;

/// Population and feature switches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualizerConfig {
    pub ambient_count: usize,
    pub trails: bool,
    pub particles: bool,
    pub click_burst: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            ambient_count: AMBIENT_COUNT,
            trails: true,
            particles: true,
            click_burst: CLICK_BURST_SIZE,
        }
    }
}

/// A line between two nearby trail points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailLink {
    pub from: Vec2,
    pub to: Vec2,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct Visualizer {
    config: VisualizerConfig,
    bounds: Rect,
    ambient: EntityPool,
    trail: EntityPool,
    bursts: EntityPool,
    /// Position of the most recent trail spawn
    last_trail: Vec2,
    ticks: u64,
    rng: Pcg32,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig, width: f32, height: f32, seed: u64) -> Self {
        let mut vis = Self {
            config,
            bounds: Rect::sanitized(width, height),
            ambient: EntityPool::new(),
            trail: EntityPool::with_limit(MAX_TRAIL_POINTS),
            bursts: EntityPool::new(),
            last_trail: Vec2::ZERO,
            ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        vis.seed_ambient();
        vis
    }

    fn seed_ambient(&mut self) {
        self.ambient.clear();
        if !self.config.particles {
            return;
        }
        for _ in 0..self.config.ambient_count {
            let pos = random_point(&self.bounds, &mut self.rng);
            let vel = Vec2::new(
                self.rng.random_range(-AMBIENT_DRIFT..=AMBIENT_DRIFT),
                self.rng.random_range(-AMBIENT_DRIFT..=AMBIENT_DRIFT),
            );
            let life = self.rng.random::<f32>();
            let size = self.rng.random_range(1.0..3.0);
            self.ambient
                .spawn(Entity::ambient(pos, vel, life, AMBIENT_DECAY, size, palette::TRAIL_LINK));
        }
    }

    /// Adopt new viewport bounds
    ///
    /// The ambient population is re-seeded; trail points and bursts are
    /// pulled inside the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Rect::sanitized(width, height);
        self.seed_ambient();
        let bounds = self.bounds;
        for pool in [&mut self.trail, &mut self.bursts] {
            for (_, e) in pool.iter_mut() {
                e.pos = bounds.clamp_point(e.pos);
            }
        }
        self.last_trail = bounds.clamp_point(self.last_trail);
    }

    /// Record pointer motion; returns true if a trail point was laid
    pub fn pointer_move(&mut self, pos: Vec2) -> bool {
        if !self.config.trails || !pos.is_finite() {
            return false;
        }
        if pos.distance(self.last_trail) <= TRAIL_SPAWN_DISTANCE {
            return false;
        }
        self.trail.spawn(Entity::trail(pos, TRAIL_DECAY, palette::TRAIL_LINK));
        self.last_trail = pos;
        true
    }

    /// Spray a small burst where the pointer went down
    pub fn pointer_down(&mut self, pos: Vec2) {
        if !self.config.particles || !pos.is_finite() {
            return;
        }
        let pos = self.bounds.clamp_point(pos);
        for _ in 0..self.config.click_burst {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(1.0..BURST_SPEED);
            let hue = self.rng.random_range(250.0..330.0);
            self.bursts.spawn(Entity::fragment(
                pos,
                Vec2::from_angle(angle) * speed,
                FRAGMENT_DECAY,
                FRAGMENT_DAMPING,
                palette::hsl(hue, 0.7, 0.6),
            ));
        }
    }

    /// Advance every pool by one tick
    pub fn step(&mut self) {
        self.ticks += 1;
        self.ambient.step(1.0, &self.bounds, &mut self.rng);
        self.trail.step(1.0, &self.bounds, &mut self.rng);
        self.bursts.step(1.0, &self.bounds, &mut self.rng);
    }

    /// Pairs of trail points closer than the link distance, faded by both lives
    pub fn links(&self) -> Vec<TrailLink> {
        let points: Vec<&Entity> = self.trail.iter().map(|(_, e)| e).collect();
        let mut links = Vec::new();
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                let d = a.pos.distance(b.pos);
                if d < TRAIL_LINK_DISTANCE {
                    links.push(TrailLink {
                        from: a.pos,
                        to: b.pos,
                        alpha: (1.0 - d / TRAIL_LINK_DISTANCE) * a.opacity() * b.opacity() * 0.3,
                    });
                }
            }
        }
        links
    }

    pub fn ambient(&self) -> &EntityPool {
        &self.ambient
    }

    pub fn trail(&self) -> &EntityPool {
        &self.trail
    }

    pub fn bursts(&self) -> &EntityPool {
        &self.bursts
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Simulated seconds since creation
    pub fn elapsed(&self) -> f32 {
        self.ticks as f32 * SIM_DT
    }
}
