//! Arcade physics: gravity, integration, static contacts, world bounds and
//! player overlap detection, run as one `legion` schedule per frame.

use std::collections::HashSet;

use glam::DVec2;
use legion::world::SubWorld;
use legion::*;

use crate::animation::Animations;
use crate::collision::{Aabb, separation};
use crate::components::*;
use crate::events::{Contact, EventQueue};
use crate::quadtree::QuadTree;

/// Rebounds slower than this come to rest instead of jittering
pub const REST_SPEED: f64 = 12.0;

/// Shared state of the simulation, read by every system
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsWorld {
    pub gravity: DVec2,
    pub bounds: Aabb,
    pub quadtree_capacity: usize,
    pub paused: bool,
}

impl PhysicsWorld {
    pub fn new(gravity: DVec2, bounds: Aabb, quadtree_capacity: usize) -> Self {
        Self {
            gravity,
            bounds,
            quadtree_capacity,
            paused: false,
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }
}

/// Trigger bodies of the last step, used as the overlap broad phase
pub type TriggerTree = QuadTree<(Trigger, Entity)>;

pub fn physics_schedule() -> Schedule {
    Schedule::builder()
        .add_system(apply_gravity_system())
        .add_system(update_positions_system())
        .flush()
        .add_system(resolve_static_collisions_system())
        .add_system(check_wall_collision_system())
        .flush()
        .add_system(detect_overlaps_system())
        .build()
}

pub fn animation_schedule() -> Schedule {
    Schedule::builder().add_system(animate_system()).build()
}

/// Velocity after hitting something with restitution `bounce`. Only
/// inelastic bodies come to rest.
fn rebound(v: f64, bounce: f64) -> f64 {
    let v = -v * bounce;
    if bounce < 1.0 && v.abs() < REST_SPEED { 0.0 } else { v }
}

#[system(for_each)]
#[filter(!component::<Disabled>())]
pub fn apply_gravity(
    vel: &mut Velocity,
    body: &Body,
    #[resource] physics: &PhysicsWorld,
    #[resource] dt: &f32,
) {
    if body.allow_gravity && !body.immovable {
        vel.0 += physics.gravity * *dt as f64;
    }
}

#[system(for_each)]
#[filter(!component::<Disabled>())]
pub fn update_positions(pos: &mut Position, vel: &Velocity, body: &mut Body, #[resource] dt: &f32) {
    let dt = *dt as f64;

    body.touching = Touching::default();

    if body.immovable {
        return;
    }

    pos.0.x += vel.0.x * dt;
    pos.0.y += vel.0.y * dt;
}

#[system]
pub fn resolve_static_collisions(
    world: &mut SubWorld,
    statics: &mut Query<(&Position, &Body, &StaticBody)>,
    dynamics: &mut Query<(&mut Position, &mut Velocity, &mut Body, Option<&Disabled>)>,
) {
    let solids = statics
        .iter(world)
        .map(|(pos, body, _)| body.bounds(pos.0))
        .collect::<Vec<_>>();

    dynamics.for_each_mut(world, |(pos, vel, body, disabled)| {
        if disabled.is_some() || !body.collide_static || body.immovable {
            return;
        }

        for solid in &solids {
            let Some(push) = separation(&body.bounds(pos.0), solid) else {
                continue;
            };

            pos.0 += push;

            if push.y < 0.0 {
                body.touching.down = true;
                if vel.0.y > 0.0 {
                    vel.0.y = rebound(vel.0.y, body.bounce.y);
                }
            } else if push.y > 0.0 {
                body.touching.up = true;
                if vel.0.y < 0.0 {
                    vel.0.y = rebound(vel.0.y, body.bounce.y);
                }
            } else if push.x < 0.0 {
                body.touching.right = true;
                if vel.0.x > 0.0 {
                    vel.0.x = rebound(vel.0.x, body.bounce.x);
                }
            } else if push.x > 0.0 {
                body.touching.left = true;
                if vel.0.x < 0.0 {
                    vel.0.x = rebound(vel.0.x, body.bounce.x);
                }
            }
        }
    });
}

#[system(for_each)]
#[filter(!component::<Disabled>())]
pub fn check_wall_collision(
    pos: &mut Position,
    vel: &mut Velocity,
    body: &Body,
    #[resource] physics: &PhysicsWorld,
) {
    if !body.collide_world_bounds {
        return;
    }

    let half = body.size * 0.5;
    let Aabb { min, max } = physics.bounds;

    if pos.0.x - half.x < min.x {
        pos.0.x = min.x + half.x;
        vel.0.x = rebound(vel.0.x, body.bounce.x);
    } else if pos.0.x + half.x > max.x {
        pos.0.x = max.x - half.x;
        vel.0.x = rebound(vel.0.x, body.bounce.x);
    }

    if pos.0.y - half.y < min.y {
        pos.0.y = min.y + half.y;
        vel.0.y = rebound(vel.0.y, body.bounce.y);
    } else if pos.0.y + half.y > max.y {
        pos.0.y = max.y - half.y;
        vel.0.y = rebound(vel.0.y, body.bounce.y);
    }
}

#[system]
pub fn detect_overlaps(
    world: &mut SubWorld,
    players: &mut Query<(&Position, &Body, &Player, Option<&Disabled>)>,
    triggers: &mut Query<(Entity, &Position, &Body, &Trigger, Option<&Disabled>)>,
    #[resource] physics: &PhysicsWorld,
    #[resource] tree: &mut TriggerTree,
    #[resource] contacts: &mut EventQueue<Contact>,
) {
    *tree = QuadTree::new(physics.quadtree_capacity, physics.bounds);

    triggers
        .iter(world)
        .filter(|(.., disabled)| disabled.is_none())
        .for_each(|(entity, pos, body, trigger, _)| {
            tree.push(body.bounds(pos.0), (*trigger, *entity));
        });

    let player_boxes = players
        .iter(world)
        .filter(|(.., disabled)| disabled.is_none())
        .map(|(pos, body, ..)| body.bounds(pos.0))
        .collect::<Vec<_>>();

    for player in player_boxes {
        let mut seen = HashSet::new();
        let mut hits = tree
            .query(&player)
            .into_iter()
            .filter(|(_, entity)| seen.insert(*entity))
            .collect::<Vec<_>>();

        // stable: stars, then bombs, then the door
        hits.sort_by_key(|(trigger, _)| *trigger);

        for (trigger, entity) in hits {
            log::trace!("contact {:?} with {:?}", trigger, entity);
            contacts.send(Contact { trigger, entity });
        }
    }
}

#[system(for_each)]
#[filter(!component::<Disabled>())]
pub fn animate(animator: &mut Animator, #[resource] animations: &Animations, #[resource] dt: &f32) {
    animations.advance(animator, *dt as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (World, Resources) {
        let world = World::default();
        let mut resources = Resources::default();
        resources.insert(PhysicsWorld::new(
            DVec2::new(0.0, 300.0),
            Aabb::new(DVec2::ZERO, DVec2::new(1280.0, 640.0)),
            8,
        ));
        resources.insert(1.0f32 / 60.0);
        resources.insert(TriggerTree::new(8, Aabb::new(DVec2::ZERO, DVec2::ONE)));
        resources.insert(EventQueue::<Contact>::new());
        (world, resources)
    }

    fn push_ground(world: &mut World) -> Entity {
        world.push((
            Position(DVec2::new(640.0, 608.0)),
            Body::new(DVec2::new(400.0, 32.0)),
            StaticBody,
        ))
    }

    fn push_player(world: &mut World, at: DVec2) -> Entity {
        let mut body = Body::new(DVec2::new(32.0, 48.0));
        body.bounce = DVec2::new(0.0, 0.2);
        body.collide_world_bounds = true;
        world.push((Position(at), Velocity(DVec2::ZERO), body, Player))
    }

    fn run(schedule: &mut Schedule, world: &mut World, resources: &mut Resources, frames: usize) {
        for _ in 0..frames {
            schedule.execute(world, resources);
        }
    }

    #[test]
    fn falling_body_lands_and_reports_ground_contact() {
        let (mut world, mut resources) = setup();
        push_ground(&mut world);
        let player = push_player(&mut world, DVec2::new(640.0, 400.0));

        let mut schedule = physics_schedule();
        run(&mut schedule, &mut world, &mut resources, 300);

        let entry = world.entry(player).unwrap();
        let body = entry.get_component::<Body>().unwrap();
        let pos = entry.get_component::<Position>().unwrap();
        assert!(body.touching.down);
        // resting on the platform top (592) with half height 24
        assert!((pos.0.y - 568.0).abs() < 1.0, "y = {}", pos.0.y);
    }

    #[test]
    fn world_bounds_stop_the_player() {
        let (mut world, mut resources) = setup();
        let player = push_player(&mut world, DVec2::new(20.0, 300.0));
        world
            .entry(player)
            .unwrap()
            .add_component(Velocity(DVec2::new(-600.0, 0.0)));

        let mut schedule = physics_schedule();
        run(&mut schedule, &mut world, &mut resources, 10);

        let entry = world.entry(player).unwrap();
        assert!(entry.get_component::<Position>().unwrap().0.x >= 16.0);
        assert!(entry.get_component::<Position>().unwrap().0.y <= 640.0 - 24.0);
    }

    #[test]
    fn gravity_free_bodies_keep_their_speed() {
        let (mut world, mut resources) = setup();
        let mut body = Body::new(DVec2::splat(14.0));
        body.allow_gravity = false;
        let bomb = world.push((
            Position(DVec2::new(300.0, 100.0)),
            Velocity(DVec2::new(0.0, 20.0)),
            body,
            Bomb,
        ));

        let mut schedule = physics_schedule();
        run(&mut schedule, &mut world, &mut resources, 60);

        let entry = world.entry(bomb).unwrap();
        assert_eq!(entry.get_component::<Velocity>().unwrap().0, DVec2::new(0.0, 20.0));
        assert!((entry.get_component::<Position>().unwrap().0.y - 120.0).abs() < 0.01);
    }

    #[test]
    fn overlaps_are_reported_for_active_triggers_only() {
        let (mut world, mut resources) = setup();
        push_player(&mut world, DVec2::new(300.0, 300.0));

        let mut still = Body::new(DVec2::new(24.0, 22.0));
        still.allow_gravity = false;
        let star = world.push((
            Position(DVec2::new(310.0, 300.0)),
            Velocity(DVec2::ZERO),
            still,
            Trigger::Star,
            Star,
        ));
        let collected = world.push((
            Position(DVec2::new(290.0, 300.0)),
            Velocity(DVec2::ZERO),
            still,
            Trigger::Star,
            Star,
            Disabled,
        ));
        let bomb = world.push((
            Position(DVec2::new(300.0, 310.0)),
            Velocity(DVec2::ZERO),
            still,
            Trigger::Bomb,
            Bomb,
        ));

        let mut schedule = physics_schedule();
        schedule.execute(&mut world, &mut resources);

        let contacts = resources
            .get_mut::<EventQueue<Contact>>()
            .unwrap()
            .take();
        assert_eq!(
            contacts,
            vec![
                Contact {
                    trigger: Trigger::Star,
                    entity: star
                },
                Contact {
                    trigger: Trigger::Bomb,
                    entity: bomb
                },
            ]
        );
        assert!(!contacts.iter().any(|c| c.entity == collected));
    }

    #[test]
    fn rebound_settles_small_bounces() {
        assert_eq!(rebound(50.0, 0.2), 0.0);
        assert_eq!(rebound(300.0, 0.2), -60.0);
        assert_eq!(rebound(-200.0, 1.0), 200.0);
        assert_eq!(rebound(10.0, 1.0), -10.0);
    }

    #[test]
    fn elastic_bodies_keep_slow_speeds_off_the_walls() {
        let (mut world, mut resources) = setup();
        let mut body = Body::new(DVec2::splat(14.0));
        body.allow_gravity = false;
        body.bounce = DVec2::ONE;
        body.collide_world_bounds = true;
        let bomb = world.push((
            Position(DVec2::new(1273.5, 50.0)),
            Velocity(DVec2::new(10.0, 20.0)),
            body,
            Bomb,
        ));

        let mut schedule = physics_schedule();
        schedule.execute(&mut world, &mut resources);

        let entry = world.entry(bomb).unwrap();
        assert_eq!(entry.get_component::<Velocity>().unwrap().0, DVec2::new(-10.0, 20.0));
        assert_eq!(entry.get_component::<Position>().unwrap().0.x, 1280.0 - 7.0);
    }
}
