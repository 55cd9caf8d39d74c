//! Geometric overlap tests and hit resolution
//!
//! Two shapes cover every title: circles (bubbles, enemies) and axis-aligned
//! boxes (the basket and falling items). Resolution helpers make sure a
//! target changes state at most once per tick.

use glam::Vec2;

/// Circle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned box anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square box of edge `size` at `min`
    pub fn square(min: Vec2, size: f32) -> Self {
        Self {
            min,
            size: Vec2::splat(size),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Four strict inequalities; touching edges do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max().x
            && self.max().x > other.min.x
            && self.min.y < other.max().y
            && self.max().y > other.min.y
    }
}

/// Circles overlap when their centers are closer than the sum of radii
#[inline]
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    within(a.center, b.center, a.radius + b.radius)
}

/// Single combined threshold variant used when one radius is a growth state
#[inline]
pub fn within(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance_squared(b) < threshold * threshold && threshold > 0.0
}

/// Claim each target at most once against any of `sources`
///
/// Targets for which `claimed` already holds are skipped, so a target that
/// was resolved earlier (this tick or before) never scores twice. Returns
/// the number of newly claimed targets.
pub fn claim_hits<'a, T: 'a, S>(
    targets: impl IntoIterator<Item = &'a mut T>,
    sources: &[S],
    claimed: impl Fn(&T) -> bool,
    hits: impl Fn(&T, &S) -> bool,
    mut on_claim: impl FnMut(&mut T, &S),
) -> u32 {
    let mut count = 0;
    for target in targets {
        if claimed(target) {
            continue;
        }
        if let Some(source) = sources.iter().find(|s| hits(target, s)) {
            on_claim(target, source);
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_circle_overlap_basic() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 10.0);
        let b = Circle::new(Vec2::new(15.0, 0.0), 6.0);
        let c = Circle::new(Vec2::new(16.0, 0.0), 6.0);
        assert!(circles_overlap(&a, &b));
        assert!(!circles_overlap(&a, &c), "touching is not overlapping");
    }

    #[test]
    fn test_within_zero_threshold_never_hits() {
        assert!(!within(Vec2::ZERO, Vec2::ZERO, 0.0));
    }

    #[test]
    fn test_aabb_catch_scenario() {
        let basket = Aabb::new(400.0, 550.0, 60.0, 40.0);
        let nugget = Aabb::square(Vec2::new(420.0, 560.0), 20.0);
        assert!(basket.overlaps(&nugget));
        assert!(nugget.overlaps(&basket));

        let beside = Aabb::square(Vec2::new(460.0, 560.0), 20.0);
        assert!(!basket.overlaps(&beside), "shared edge is not an overlap");
    }

    #[test]
    fn test_claim_hits_once() {
        struct Target {
            pos: Vec2,
            claimed: bool,
        }
        let mut targets = vec![
            Target {
                pos: Vec2::new(0.0, 0.0),
                claimed: false,
            },
            Target {
                pos: Vec2::new(100.0, 0.0),
                claimed: false,
            },
        ];
        // Two overlapping sources both cover the first target
        let sources = [Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        let hit = |t: &Target, s: &Vec2| within(t.pos, *s, 5.0);
        let claim = |t: &mut Target, _: &Vec2| t.claimed = true;

        let first = claim_hits(targets.iter_mut(), &sources, |t| t.claimed, hit, claim);
        let second = claim_hits(targets.iter_mut(), &sources, |t| t.claimed, hit, claim);

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert!(targets[0].claimed);
        assert!(!targets[1].claimed);
    }

    proptest! {
        #[test]
        fn prop_circle_collision_is_symmetric(
            ax in -1000.0f32..1000.0,
            ay in -1000.0f32..1000.0,
            ar in 0.0f32..200.0,
            bx in -1000.0f32..1000.0,
            by in -1000.0f32..1000.0,
            br in 0.0f32..200.0,
        ) {
            let a = Circle::new(Vec2::new(ax, ay), ar);
            let b = Circle::new(Vec2::new(bx, by), br);
            prop_assert_eq!(circles_overlap(&a, &b), circles_overlap(&b, &a));
        }

        #[test]
        fn prop_aabb_overlap_is_symmetric(
            ax in -500.0f32..500.0,
            ay in -500.0f32..500.0,
            aw in 0.0f32..200.0,
            ah in 0.0f32..200.0,
            bx in -500.0f32..500.0,
            by in -500.0f32..500.0,
            bw in 0.0f32..200.0,
            bh in 0.0f32..200.0,
        ) {
            let a = Aabb::new(ax, ay, aw, ah);
            let b = Aabb::new(bx, by, bw, bh);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
