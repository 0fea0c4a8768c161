//! Entity lifecycle pool
//!
//! One insertion-ordered container per entity class. Entities are spawned,
//! advanced and expired in place; ids are handed out monotonically and never
//! reused, so an id that has been removed can never alias a newer entity.

use glam::Vec2;
use rand::Rng;

use super::geom::{Circle, Rect};
use crate::consts::{BULLET_DECAY, ENEMY_DECAY};

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

/// Stable entity identifier (unique per pool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Closed set of simulated entity kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    /// Background dust: wraps at the edges and respawns instead of dying
    Ambient,
    /// Cursor trail point (stationary, fades out)
    Trail,
    /// Burst fragment from an impact or click
    Fragment,
    /// Player projectile (wave survival)
    Bullet,
    /// Descending enemy (wave survival)
    Enemy { health: u8 },
}

/// What happens when an entity leaves the pool bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundPolicy {
    Wrap,
    Remove,
}

impl EntityKind {
    pub fn bound_policy(&self) -> BoundPolicy {
        match self {
            EntityKind::Ambient => BoundPolicy::Wrap,
            EntityKind::Trail
            | EntityKind::Fragment
            | EntityKind::Bullet
            | EntityKind::Enemy { .. } => BoundPolicy::Remove,
        }
    }
}

/// A moving, optionally decaying entity
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in (0, 1]
    pub life: f32,
    /// Life lost per tick; zero means the entity never decays
    pub decay: f32,
    /// Velocity multiplier per tick
    pub damping: f32,
    /// Render radius
    pub size: f32,
    pub tint: Color,
}

impl Entity {
    fn base(kind: EntityKind, pos: Vec2, vel: Vec2, decay: f32, size: f32, tint: Color) -> Self {
        Self {
            kind,
            pos,
            vel,
            life: 1.0,
            decay: decay.max(0.0),
            damping: 1.0,
            size,
            tint,
        }
    }

    pub fn ambient(pos: Vec2, vel: Vec2, life: f32, decay: f32, size: f32, tint: Color) -> Self {
        let mut e = Self::base(EntityKind::Ambient, pos, vel, decay, size, tint);
        e.life = life.clamp(f32::EPSILON, 1.0);
        e
    }

    pub fn trail(pos: Vec2, decay: f32, tint: Color) -> Self {
        Self::base(EntityKind::Trail, pos, Vec2::ZERO, decay, 2.0, tint)
    }

    pub fn fragment(pos: Vec2, vel: Vec2, decay: f32, damping: f32, tint: Color) -> Self {
        let mut e = Self::base(EntityKind::Fragment, pos, vel, decay, 2.0, tint);
        e.damping = damping;
        e
    }

    pub fn bullet(pos: Vec2, vel: Vec2, radius: f32, tint: Color) -> Self {
        Self::base(EntityKind::Bullet, pos, vel, BULLET_DECAY, radius, tint)
    }

    pub fn enemy(pos: Vec2, vel: Vec2, health: u8, radius: f32, tint: Color) -> Self {
        Self::base(EntityKind::Enemy { health }, pos, vel, ENEMY_DECAY, radius, tint)
    }

    /// Whether life ticks down for this entity
    #[inline]
    pub fn is_mortal(&self) -> bool {
        self.decay > 0.0
    }

    /// Render opacity, linear in remaining life
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.life.clamp(0.0, 1.0)
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.size)
    }
}

/// Counts from a single `step`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Removed because life ran out
    pub expired: usize,
    /// Removed because they left the bounds
    pub escaped: usize,
    /// Ambient entities reborn in place of expiring
    pub respawned: usize,
}

/// Outcome of advancing one entity
enum Fate {
    Live,
    Expired,
    Escaped,
    Respawned,
}

/// Move and decay a single entity according to its kind
fn advance<R: Rng + ?Sized>(entity: &mut Entity, dt: f32, bounds: &Rect, rng: &mut R) -> Fate {
    entity.pos += entity.vel * dt;
    if entity.damping != 1.0 {
        entity.vel *= entity.damping.powf(dt);
    }
    if entity.is_mortal() {
        entity.life -= entity.decay * dt;
    }

    match entity.kind.bound_policy() {
        BoundPolicy::Wrap => {
            entity.pos = bounds.wrap_point(entity.pos);
            if entity.life <= 0.0 {
                entity.life = 1.0;
                entity.pos = random_point(bounds, rng);
                Fate::Respawned
            } else {
                Fate::Live
            }
        }
        BoundPolicy::Remove => {
            if entity.is_mortal() && entity.life <= 0.0 {
                Fate::Expired
            } else if !bounds.contains(entity.pos) {
                Fate::Escaped
            } else {
                Fate::Live
            }
        }
    }
}

/// Uniform random point inside `bounds`
pub fn random_point<R: Rng + ?Sized>(bounds: &Rect, rng: &mut R) -> Vec2 {
    bounds.min + Vec2::new(rng.random::<f32>(), rng.random::<f32>()) * bounds.size
}

/// Insertion-ordered pool of live entities
#[derive(Debug, Clone, Default)]
pub struct EntityPool {
    entries: Vec<(EntityId, Entity)>,
    next_id: u64,
    /// When set, spawning past this count evicts the oldest entity
    limit: Option<usize>,
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool that evicts its oldest entity when `limit` is exceeded
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
        self.enforce_limit();
    }

    /// Add an entity and return its id
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, entity));
        self.enforce_limit();
        id
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
            }
        }
    }

    /// Advance every live entity by `dt` ticks, dropping the dead and escaped
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, bounds: &Rect, rng: &mut R) -> StepReport {
        let mut report = StepReport::default();
        self.entries.retain_mut(|(_, entity)| match advance(entity, dt, bounds, rng) {
            Fate::Live => true,
            Fate::Respawned => {
                report.respawned += 1;
                true
            }
            Fate::Expired => {
                report.expired += 1;
                false
            }
            Fate::Escaped => {
                report.escaped += 1;
                false
            }
        });
        report
    }

    /// Live entities in spawn order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.entries.iter_mut().map(|(id, e)| (*id, e))
    }

    pub fn for_each<F: FnMut(EntityId, &Entity)>(&self, mut visit: F) {
        for (id, e) in &self.entries {
            visit(*id, e);
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.position(id).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.position(id).map(move |i| &mut self.entries[i].1)
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        // Ids are pushed in increasing order
        self.entries.binary_search_by_key(&id, |(eid, _)| *eid).ok()
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.position(id).map(|i| self.entries.remove(i).1)
    }

    /// Keep entities matching the predicate; returns how many were removed
    pub fn retain<F: FnMut(EntityId, &mut Entity) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.entries.len();
        self.entries.retain_mut(|(id, e)| keep(*id, e));
        before - self.entries.len()
    }

    /// Number of live entities matching `pred`
    pub fn count_where<F: Fn(&Entity) -> bool>(&self, pred: F) -> usize {
        self.entries.iter().filter(|(_, e)| pred(e)).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
