//! Entity store and per-tick motion
//!
//! Every title keeps its simulated objects in one or more `EntityStore`s.
//! Kind-specific data rides along in the generic `kind` field so the store,
//! boundary policies and compaction are shared across games.

use glam::Vec2;

/// Logical extent of the playfield
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// What happens when an entity leaves the playfield
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// Invert the velocity component carrying the entity further out
    Reflect,
    /// Mark not-alive once more than `margin` past any edge
    Cull { margin: f32 },
}

/// A simulated object
#[derive(Debug, Clone)]
pub struct Entity<K> {
    pub id: u32,
    pub kind: K,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radius, diameter or edge length depending on the title
    pub size: f32,
    pub alive: bool,
}

impl<K> Entity<K> {
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.size.is_finite()
    }
}

/// Owning collection of entities for one game instance
#[derive(Debug, Clone)]
pub struct EntityStore<K> {
    entities: Vec<Entity<K>>,
    next_id: u32,
}

impl<K> Default for EntityStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EntityStore<K> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Insert a live entity, returning its id
    pub fn spawn(&mut self, kind: K, pos: Vec2, vel: Vec2, size: f32) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.entities.push(Entity {
            id,
            kind,
            pos,
            vel,
            size,
            alive: true,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity<K>> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity<K>> {
        self.entities.iter_mut()
    }

    /// Alive entities only
    pub fn alive(&self) -> impl Iterator<Item = &Entity<K>> {
        self.entities.iter().filter(|e| e.alive)
    }

    pub fn alive_mut(&mut self) -> impl Iterator<Item = &mut Entity<K>> {
        self.entities.iter_mut().filter(|e| e.alive)
    }

    pub fn get(&self, id: u32) -> Option<&Entity<K>> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity<K>> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn count_where(&self, mut pred: impl FnMut(&Entity<K>) -> bool) -> usize {
        self.entities.iter().filter(|e| e.alive && pred(e)).count()
    }

    /// Fixed per-tick displacement: `pos += vel` for every alive entity
    pub fn step(&mut self) {
        for entity in self.alive_mut() {
            entity.pos += entity.vel;
        }
    }

    /// Apply a boundary policy to every alive entity
    pub fn apply_boundary(&mut self, bounds: Bounds, boundary: Boundary) {
        for entity in self.alive_mut() {
            match boundary {
                Boundary::Reflect => {
                    if (entity.pos.x < 0.0 && entity.vel.x < 0.0)
                        || (entity.pos.x > bounds.width && entity.vel.x > 0.0)
                    {
                        entity.vel.x = -entity.vel.x;
                    }
                    if (entity.pos.y < 0.0 && entity.vel.y < 0.0)
                        || (entity.pos.y > bounds.height && entity.vel.y > 0.0)
                    {
                        entity.vel.y = -entity.vel.y;
                    }
                }
                Boundary::Cull { margin } => {
                    let outside = entity.pos.x < -margin
                        || entity.pos.y < -margin
                        || entity.pos.x >= bounds.width + margin
                        || entity.pos.y >= bounds.height + margin;
                    if outside {
                        entity.alive = false;
                    }
                }
            }
        }
    }

    /// Drop not-alive entities, keeping spawn order
    pub fn compact(&mut self) {
        self.entities.retain(|e| e.alive);
    }

    /// Remove everything; ids keep increasing across rounds
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// First entity with a non-finite position, velocity or size
    pub fn first_non_finite(&self) -> Option<&Entity<K>> {
        self.entities.iter().find(|e| !e.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Bounds = Bounds::new(800.0, 600.0);

    #[test]
    fn test_step_applies_fixed_displacement() {
        let mut store = EntityStore::new();
        let id = store.spawn((), Vec2::new(10.0, 10.0), Vec2::new(2.0, -1.0), 5.0);
        store.step();
        store.step();
        let e = store.get(id).unwrap();
        assert_eq!(e.pos, Vec2::new(14.0, 8.0));
    }

    #[test]
    fn test_dead_entities_do_not_move() {
        let mut store = EntityStore::new();
        let id = store.spawn((), Vec2::ZERO, Vec2::ONE, 1.0);
        store.get_mut(id).unwrap().alive = false;
        store.step();
        assert_eq!(store.get(id).unwrap().pos, Vec2::ZERO);
    }

    #[test]
    fn test_reflect_only_when_moving_outward() {
        let mut store = EntityStore::new();
        // Just spawned outside the left edge, heading in: must not flip
        let entering = store.spawn((), Vec2::new(-18.0, 300.0), Vec2::new(2.0, 0.0), 10.0);
        // Left the right edge heading out: must flip
        let leaving = store.spawn((), Vec2::new(801.0, 300.0), Vec2::new(3.0, 0.0), 10.0);
        store.apply_boundary(BOUNDS, Boundary::Reflect);

        assert_eq!(store.get(entering).unwrap().vel.x, 2.0);
        assert_eq!(store.get(leaving).unwrap().vel.x, -3.0);
    }

    #[test]
    fn test_reflect_never_oscillates_at_spawn_edge() {
        let mut store = EntityStore::new();
        let id = store.spawn((), Vec2::new(-20.0, 300.0), Vec2::new(1.5, 0.0), 10.0);
        for _ in 0..30 {
            store.step();
            store.apply_boundary(BOUNDS, Boundary::Reflect);
        }
        assert!(store.get(id).unwrap().pos.x > 0.0);
    }

    #[test]
    fn test_cull_lags_behind_exit() {
        let mut store = EntityStore::new();
        let id = store.spawn((), Vec2::new(100.0, 620.0), Vec2::new(0.0, 5.0), 10.0);
        store.apply_boundary(BOUNDS, Boundary::Cull { margin: 50.0 });
        assert!(store.get(id).unwrap().alive, "still inside the margin");

        for _ in 0..6 {
            store.step();
        }
        store.apply_boundary(BOUNDS, Boundary::Cull { margin: 50.0 });
        assert!(!store.get(id).unwrap().alive);

        store.compact();
        assert!(store.is_empty());
    }

    #[test]
    fn test_compact_keeps_order_and_ids_stay_unique() {
        let mut store = EntityStore::new();
        let a = store.spawn('a', Vec2::ZERO, Vec2::ZERO, 1.0);
        let b = store.spawn('b', Vec2::ZERO, Vec2::ZERO, 1.0);
        let c = store.spawn('c', Vec2::ZERO, Vec2::ZERO, 1.0);
        store.get_mut(b).unwrap().alive = false;
        store.compact();

        let ids: Vec<u32> = store.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, c]);

        store.clear();
        let d = store.spawn('d', Vec2::ZERO, Vec2::ZERO, 1.0);
        assert!(d > c);
    }

    #[test]
    fn test_non_finite_detection() {
        let mut store = EntityStore::new();
        store.spawn((), Vec2::ZERO, Vec2::ZERO, 1.0);
        assert!(store.first_non_finite().is_none());
        store.spawn((), Vec2::new(f32::NAN, 0.0), Vec2::ZERO, 1.0);
        assert!(store.first_non_finite().is_some());
    }
}
