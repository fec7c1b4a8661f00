//! Capsule collision between NPCs and against static buildings.
//!
//! NPC bodies are vertical capsules. Pairs are separated on the horizontal
//! plane only; the ground owns the vertical axis.

use brawl_common::{flat, random_unit_xz, Vec3, PLANAR_EPSILON};

use crate::config::CollisionTuning;
use crate::npc::Npc;
use crate::world::Aabb;

/// How velocity responds to hitting a static collider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CollisionBehavior {
    /// Drop all horizontal velocity
    Stop,
    /// Remove the velocity component into the surface
    #[default]
    Slide,
    /// Reflect with coefficient (0.0 = no bounce, 1.0 = full bounce)
    Bounce(f32),
}

impl CollisionBehavior {
    /// Applies the response to `velocity` against surface normal `normal`.
    ///
    /// Velocity moving away from the surface is left alone.
    #[must_use]
    pub fn respond(self, velocity: Vec3, normal: Vec3) -> Vec3 {
        let into = velocity.dot(normal);
        if into >= 0.0 {
            return velocity;
        }
        match self {
            Self::Stop => Vec3::new(0.0, velocity.y, 0.0),
            Self::Slide => velocity - normal * into,
            Self::Bounce(restitution) => velocity - normal * into * (1.0 + restitution.clamp(0.0, 1.0)),
        }
    }
}

/// Penetration of a capsule into a building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxContact {
    /// Horizontal unit normal pointing out of the box
    pub normal: Vec3,
    /// Horizontal distance to push out along `normal`
    pub depth: f32,
}

/// Finds the deepest horizontal penetration of a capsule into a box.
///
/// Each sphere of the capsule is tested on its own. A sphere whose centre is
/// inside the box is pushed out through the nearest vertical face.
#[must_use]
pub fn capsule_box_contact(points: [Vec3; 2], radius: f32, aabb: &Aabb) -> Option<BoxContact> {
    points
        .into_iter()
        .filter_map(|center| sphere_box_contact(center, radius, aabb))
        .max_by(|a, b| a.depth.total_cmp(&b.depth))
}

fn sphere_box_contact(center: Vec3, radius: f32, aabb: &Aabb) -> Option<BoxContact> {
    if aabb.contains(center) {
        let exits = [
            (center.x - aabb.min.x, Vec3::NEG_X),
            (aabb.max.x - center.x, Vec3::X),
            (center.z - aabb.min.z, Vec3::NEG_Z),
            (aabb.max.z - center.z, Vec3::Z),
        ];
        let (distance, normal) = exits
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))?;
        return Some(BoxContact {
            normal,
            depth: distance + radius,
        });
    }

    let offset = center - aabb.closest_point(center);
    let vertical = offset.y.abs();
    if vertical >= radius {
        return None;
    }
    let horizontal = flat(offset);
    let reach = horizontal.length();
    if reach < PLANAR_EPSILON {
        // Straight above or below the box: nothing to resolve sideways.
        return None;
    }

    let slice = (radius * radius - vertical * vertical).sqrt();
    let depth = slice - reach;
    (depth > 0.0).then(|| BoxContact {
        normal: horizontal / reach,
        depth,
    })
}

/// Box enclosing both capsule spheres.
fn capsule_bounds([bottom, top]: [Vec3; 2], radius: f32) -> Aabb {
    Aabb::new(bottom - Vec3::splat(radius), top + Vec3::splat(radius))
}

/// Pushes a body out of every building it overlaps.
///
/// Returns `true` if any building was touched.
pub fn resolve_buildings(npc: &mut Npc, buildings: &[Aabb], behavior: CollisionBehavior) -> bool {
    let radius = npc.radius();
    let mut touched = false;
    for building in buildings {
        if !capsule_bounds(npc.capsule_points(), radius).overlaps(building) {
            continue;
        }
        let Some(contact) = capsule_box_contact(npc.capsule_points(), radius, building) else {
            continue;
        };
        npc.position += contact.normal * contact.depth;
        npc.velocity = behavior.respond(npc.velocity, contact.normal);
        touched = true;
    }
    touched
}

/// Two bodies found overlapping during pair resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContact {
    /// Slot of the first body
    pub a: usize,
    /// Slot of the second body
    pub b: usize,
    /// Horizontal unit normal from `a` to `b`
    pub normal: Vec3,
    /// Speed at which the bodies approach along the normal
    pub closing_speed: f32,
}

/// Horizontal capsule overlap: centre distance against the radius sum, plus
/// overlapping vertical spans.
#[must_use]
pub fn bodies_overlap(a: &Npc, b: &Npc) -> bool {
    let vertical = a.position.y < b.position.y + b.height() && b.position.y < a.position.y + a.height();
    let reach = a.radius() + b.radius();
    vertical && flat(b.position - a.position).length_squared() < reach * reach
}

/// Separates overlapping bodies among `bodies` (slot indices into `npcs`).
///
/// Every unordered pair is checked once per iteration, in list order. Each
/// body is pushed half the penetration, capped per iteration. Returns each
/// touching pair once, with its closing speed from the first time it was
/// found overlapping this call.
pub fn resolve_pairs(
    npcs: &mut [Npc],
    bodies: &[usize],
    tuning: &CollisionTuning,
    rng: &mut fastrand::Rng,
) -> Vec<PairContact> {
    let mut contacts: Vec<PairContact> = Vec::new();

    for _ in 0..tuning.iterations {
        let mut moved = false;
        for (n, &i) in bodies.iter().enumerate() {
            for &j in &bodies[n + 1..] {
                if i == j {
                    continue;
                }
                let (a, b) = pair_mut(npcs, i, j);
                if !bodies_overlap(a, b) {
                    continue;
                }

                let delta = flat(b.position - a.position);
                let distance = delta.length();
                let normal = if distance > PLANAR_EPSILON {
                    delta / distance
                } else {
                    random_unit_xz(rng)
                };
                let penetration = a.radius() + b.radius() - distance;
                let push = (penetration * 0.5).min(tuning.max_push_per_iteration);
                a.position -= normal * push;
                b.position += normal * push;
                moved = true;

                if !contacts.iter().any(|c| c.a == i && c.b == j) {
                    contacts.push(PairContact {
                        a: i,
                        b: j,
                        normal,
                        closing_speed: flat(a.velocity - b.velocity).dot(normal),
                    });
                }
            }
        }
        if !moved {
            break;
        }
    }

    contacts
}

/// Borrows two distinct elements mutably.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npc::NpcKind;

    fn body(slot: u32, kind: NpcKind, position: Vec3) -> Npc {
        let mut npc = Npc::parked(slot);
        npc.activate(kind, position, 0.5, Vec3::X);
        npc
    }

    #[test]
    fn test_behavior_responses() {
        let velocity = Vec3::new(-4.0, 1.0, 2.0);
        let normal = Vec3::X;

        assert_eq!(CollisionBehavior::Stop.respond(velocity, normal), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(CollisionBehavior::Slide.respond(velocity, normal), Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(CollisionBehavior::Bounce(0.5).respond(velocity, normal), Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(CollisionBehavior::default(), CollisionBehavior::Slide);
    }

    #[test]
    fn test_separating_velocity_untouched() {
        let velocity = Vec3::new(3.0, 0.0, 0.0);
        assert_eq!(CollisionBehavior::Bounce(1.0).respond(velocity, Vec3::X), velocity);
    }

    #[test]
    fn test_capsule_outside_box_no_contact() {
        let building = Aabb::new(Vec3::new(2.0, 0.0, -1.0), Vec3::new(4.0, 5.0, 1.0));
        let npc = body(0, NpcKind::Basic, Vec3::ZERO);
        assert!(capsule_box_contact(npc.capsule_points(), npc.radius(), &building).is_none());
    }

    #[test]
    fn test_capsule_touching_wall_pushed_out() {
        let building = Aabb::new(Vec3::new(2.0, 0.0, -1.0), Vec3::new(4.0, 5.0, 1.0));
        let mut npc = body(0, NpcKind::Basic, Vec3::new(1.7, 0.0, 0.0));
        npc.velocity = Vec3::new(3.0, 0.0, 1.0);

        assert!(resolve_buildings(&mut npc, &[building], CollisionBehavior::Slide));

        assert!((npc.position.x - (2.0 - npc.radius())).abs() < 1e-4);
        assert_eq!(npc.velocity, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_capsule_bounds_cover_both_spheres() {
        let npc = body(0, NpcKind::Basic, Vec3::new(1.0, 0.0, 0.0));
        let bounds = capsule_bounds(npc.capsule_points(), npc.radius());

        assert_eq!(bounds.min, Vec3::new(1.0 - npc.radius(), 0.0, -npc.radius()));
        assert!((bounds.max.y - npc.height().max(2.0 * npc.radius())).abs() < 1e-5);
    }

    #[test]
    fn test_only_nearby_buildings_resolved() {
        let far = Aabb::new(Vec3::new(20.0, 0.0, -1.0), Vec3::new(22.0, 5.0, 1.0));
        let near = Aabb::new(Vec3::new(2.0, 0.0, -1.0), Vec3::new(4.0, 5.0, 1.0));
        let mut npc = body(0, NpcKind::Basic, Vec3::new(1.7, 0.0, 0.0));
        npc.velocity = Vec3::new(3.0, 0.0, 0.0);

        assert!(!resolve_buildings(&mut npc, &[far], CollisionBehavior::Slide));
        assert_eq!(npc.velocity.x, 3.0);

        assert!(resolve_buildings(&mut npc, &[far, near], CollisionBehavior::Slide));
        assert_eq!(npc.velocity.x, 0.0);
    }

    #[test]
    fn test_center_inside_box_exits_nearest_face() {
        let building = Aabb::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 5.0, 2.0));
        let npc = body(0, NpcKind::Basic, Vec3::new(0.0, 0.0, 1.5));
        let contact = capsule_box_contact(npc.capsule_points(), npc.radius(), &building).expect("inside");

        assert_eq!(contact.normal, Vec3::Z);
        assert!((contact.depth - (0.5 + npc.radius())).abs() < 1e-5);
    }

    #[test]
    fn test_body_above_roof_ignored() {
        let building = Aabb::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 3.0, 2.0));
        let npc = body(0, NpcKind::Basic, Vec3::new(0.0, 3.2, 0.0));
        assert!(capsule_box_contact(npc.capsule_points(), npc.radius(), &building).is_none());
    }

    #[test]
    fn test_ragdoll_bounces_off_wall() {
        let building = Aabb::new(Vec3::new(2.0, 0.0, -1.0), Vec3::new(4.0, 5.0, 1.0));
        let mut npc = body(0, NpcKind::Basic, Vec3::new(1.7, 0.0, 0.0));
        npc.velocity = Vec3::new(10.0, 0.0, 0.0);

        resolve_buildings(&mut npc, &[building], CollisionBehavior::Bounce(0.5));
        assert!((npc.velocity.x + 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_pair_separation_is_symmetric() {
        let mut npcs = vec![
            body(0, NpcKind::Basic, Vec3::new(0.0, 0.0, 0.0)),
            body(1, NpcKind::Basic, Vec3::new(0.6, 0.0, 0.0)),
        ];
        let tuning = CollisionTuning::default();
        let mut rng = fastrand::Rng::with_seed(1);

        let contacts = resolve_pairs(&mut npcs, &[0, 1], &tuning, &mut rng);

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].normal, Vec3::X);
        let gap = npcs[1].position.x - npcs[0].position.x;
        assert!(gap > 0.6);
        assert!((npcs[0].position.x + (npcs[1].position.x - 0.6)).abs() < 1e-5, "equal and opposite pushes");
    }

    #[test]
    fn test_push_is_capped_per_iteration() {
        let mut npcs = vec![
            body(0, NpcKind::Heavy, Vec3::new(0.0, 0.0, 0.0)),
            body(1, NpcKind::Heavy, Vec3::new(0.01, 0.0, 0.0)),
        ];
        let tuning = CollisionTuning {
            iterations: 1,
            ..Default::default()
        };
        let mut rng = fastrand::Rng::with_seed(1);

        resolve_pairs(&mut npcs, &[0, 1], &tuning, &mut rng);

        assert!((npcs[0].position.x + tuning.max_push_per_iteration).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_bodies_get_separated() {
        let mut npcs = vec![
            body(0, NpcKind::Basic, Vec3::ZERO),
            body(1, NpcKind::Basic, Vec3::ZERO),
        ];
        let tuning = CollisionTuning::default();
        let mut rng = fastrand::Rng::with_seed(9);

        let contacts = resolve_pairs(&mut npcs, &[0, 1], &tuning, &mut rng);

        assert_eq!(contacts.len(), 1);
        assert!(npcs[0].position.distance(npcs[1].position) > 0.5);
    }

    #[test]
    fn test_closing_speed() {
        let mut npcs = vec![
            body(0, NpcKind::Basic, Vec3::new(0.0, 0.0, 0.0)),
            body(1, NpcKind::Basic, Vec3::new(1.0, 0.0, 0.0)),
        ];
        npcs[0].velocity = Vec3::new(9.0, 0.0, 0.0);
        npcs[1].velocity = Vec3::new(-1.0, 0.0, 0.0);
        let mut rng = fastrand::Rng::with_seed(1);

        let contacts = resolve_pairs(&mut npcs, &[0, 1], &CollisionTuning::default(), &mut rng);

        assert!((contacts[0].closing_speed - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_vertically_separated_bodies_pass() {
        let npcs = [
            body(0, NpcKind::Basic, Vec3::ZERO),
            body(1, NpcKind::Basic, Vec3::new(0.2, 3.0, 0.0)),
        ];
        assert!(!bodies_overlap(&npcs[0], &npcs[1]));
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut values = [1, 2, 3];
        let (a, b) = pair_mut(&mut values, 2, 0);
        std::mem::swap(a, b);
        assert_eq!(values, [3, 2, 1]);
    }
}
