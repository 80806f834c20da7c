//! # World Scenario Tests
//!
//! End-to-end behavior of entities, groups and the scheduler through the
//! public API only.

use std::cell::RefCell;
use std::rc::Rc;

use ember_core::{
    from_fn, Component, EcsError, EcsResult, GroupHandle, SharedState, System, Tag, World,
    WorldConfig,
};

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Flag(&'static str),
    Com1 { x: i32, y: i32 },
    Com2 { img: String },
}

impl Component for Part {
    fn tag(&self) -> Tag {
        match self {
            Part::Flag(tag) => Tag::from_static(*tag),
            Part::Com1 { .. } => Tag::from_static("com1"),
            Part::Com2 { .. } => Tag::from_static("com2"),
        }
    }
}

fn flags(tags: &[&'static str]) -> Vec<Part> {
    tags.iter().copied().map(Part::Flag).collect()
}

fn group_len(world: &mut World<Part>, tags: &[&str]) -> usize {
    let handle = world.get_group(tags.iter().copied()).unwrap();
    world.group(handle).unwrap().len()
}

#[test]
fn test_has_is_order_independent() {
    let mut world: World<Part> = World::new();
    let me = world.add_new_entity("me", flags(&["aaa", "bbb", "ccc"]));
    let me = world.entity(me).unwrap();

    assert!(me.has(["aaa", "bbb", "ccc"]));
    assert!(me.has(["ccc", "bbb", "aaa"]));
    assert!(!me.has(["aaa", "ddd"]));
    assert!(me.has(["aaa", "bbb"]) && me.has(["ccc"]));
}

#[test]
fn test_group_sizes_over_mixed_population() {
    let mut world: World<Part> = World::new();
    for tag in ["aaa", "bbb", "ccc", "ddd"] {
        world.add_new_entity(tag, flags(&[tag]));
    }
    world.add_new_entity("bcd", flags(&["bbb", "ccc", "ddd"]));
    world.add_new_entity("cd", flags(&["ccc", "ddd"]));
    world.add_new_entity("d", flags(&["ddd"]));

    assert_eq!(group_len(&mut world, &["aaa"]), 1);
    assert_eq!(group_len(&mut world, &["aaa", "bbb"]), 0);
    assert_eq!(group_len(&mut world, &["ddd", "bbb", "ccc"]), 1);
    assert_eq!(group_len(&mut world, &["bbb"]), 2);
    assert_eq!(group_len(&mut world, &["ccc"]), 3);
    assert_eq!(group_len(&mut world, &["ddd"]), 4);
    assert_eq!(group_len(&mut world, &["ddd", "ccc"]), 2);
    assert_eq!(world.group_count(), 7);
}

/// Reads `com1` through the group handle captured at construction.
struct Observer {
    groups: [GroupHandle; 1],
    seen: Rc<RefCell<Vec<(usize, i32, i32)>>>,
}

impl Observer {
    fn new(world: &mut World<Part>, seen: Rc<RefCell<Vec<(usize, i32, i32)>>>) -> EcsResult<Self> {
        Ok(Self {
            groups: [world.get_group(["com1"])?],
            seen,
        })
    }
}

impl System<Part> for Observer {
    fn update(&mut self, world: &mut World<Part>) -> EcsResult<()> {
        let group = world.group(self.groups[0])?;
        let len = group.len();
        for entity in world.group_entities(self.groups[0])? {
            if let Part::Com1 { x, y } = entity.get("com1")? {
                self.seen.borrow_mut().push((len, *x, *y));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "observer"
    }

    fn groups(&self) -> &[GroupHandle] {
        &self.groups
    }
}

#[test]
fn test_system_observes_components_unchanged() {
    let mut world: World<Part> = World::new();
    world.add_new_entity(
        "sprite",
        [
            Part::Com1 { x: 3, y: 0 },
            Part::Com2 {
                img: "sss.png".to_string(),
            },
        ],
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let observer = Observer::new(&mut world, Rc::clone(&seen)).unwrap();
    world.add_system(observer).unwrap();
    world.update().unwrap();

    assert_eq!(*seen.borrow(), [(1, 3, 0)]);
    let entity = world.find_by_name("sprite").unwrap();
    assert_eq!(
        entity.get("com2"),
        Ok(&Part::Com2 {
            img: "sss.png".to_string()
        })
    );
}

#[test]
fn test_systems_run_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut world: World<Part> = World::new();
    for name in ["s1", "s2", "s3"] {
        let log = Rc::clone(&log);
        world
            .add_system(from_fn(name, move |_world: &mut World<Part>| {
                log.borrow_mut().push(name);
                Ok(())
            }))
            .unwrap();
    }

    world.update().unwrap();
    assert_eq!(*log.borrow(), ["s1", "s2", "s3"]);

    for _ in 0..3 {
        world.update().unwrap();
    }
    assert_eq!(log.borrow().len(), 12);
    assert_eq!(world.stats().ticks, 4);
}

#[test]
fn test_later_system_sees_earlier_mutation() {
    let mut world: World<Part> = World::new();
    let marked = world.get_group(["marked"]).unwrap();
    let target = world.add_new_entity("target", flags(&["aaa"]));
    let observed = Rc::new(RefCell::new(Vec::new()));

    world
        .add_system(from_fn("marker", move |world: &mut World<Part>| {
            world.require_mut(target)?.add(Part::Flag("marked"));
            Ok(())
        }))
        .unwrap();
    let sink = Rc::clone(&observed);
    world
        .add_system(from_fn("reader", move |world: &mut World<Part>| {
            sink.borrow_mut().push(world.group(marked)?.len());
            Ok(())
        }))
        .unwrap();

    world.update().unwrap();
    assert_eq!(*observed.borrow(), [1]);
}

#[test]
fn test_removal_during_walk_via_snapshot() {
    let mut world: World<Part> = World::new();
    let doomed = world.get_group(["doomed"]).unwrap();
    for _ in 0..5 {
        world.add_new_entity("d", flags(&["doomed"]));
    }

    let visited = Rc::new(RefCell::new(0));
    let count = Rc::clone(&visited);
    world
        .add_system(from_fn("reaper", move |world: &mut World<Part>| {
            for id in world.group_ids(doomed)? {
                // Each entity also removes its successor.
                if world.entity(id).is_none() {
                    continue;
                }
                *count.borrow_mut() += 1;
                world.remove_entity(id);
                let next = ember_core::EntityId::from_raw(id.raw() + 1);
                world.remove_entity(next);
            }
            Ok(())
        }))
        .unwrap();

    world.update().unwrap();
    assert_eq!(*visited.borrow(), 3);
    assert!(world.group(doomed).unwrap().is_empty());
    assert!(world.is_empty());
}

#[test]
fn test_deferred_despawn_applies_after_last_system() {
    let mut world: World<Part> = World::new();
    let group = world.get_group(["aaa"]).unwrap();
    world.add_new_entity("a", flags(&["aaa"]));
    let sizes = Rc::new(RefCell::new(Vec::new()));

    world
        .add_system(from_fn("despawner", move |world: &mut World<Part>| {
            for id in world.group_ids(group)? {
                world.commands().despawn(id);
            }
            Ok(())
        }))
        .unwrap();
    let sink = Rc::clone(&sizes);
    world
        .add_system(from_fn("counter", move |world: &mut World<Part>| {
            sink.borrow_mut().push(world.group(group)?.len());
            Ok(())
        }))
        .unwrap();

    world.update().unwrap();
    assert_eq!(*sizes.borrow(), [1]);
    assert!(world.group(group).unwrap().is_empty());
    assert_eq!(world.stats().pending_commands, 0);
}

#[test]
fn test_missing_component_error_surfaces_from_update() {
    let mut world: World<Part> = World::new();
    let id = world.add_new_entity("bare", flags(&["aaa"]));
    world
        .add_system(from_fn("strict", move |world: &mut World<Part>| {
            world.require(id)?.get("com1").map(|_| ())
        }))
        .unwrap();

    let err = world.update().unwrap_err();
    assert!(matches!(err, EcsError::ComponentNotFound { .. }));
    assert_eq!(world.tick(), 1);
}

#[test]
fn test_worlds_are_isolated() {
    let mut left: World<Part> = World::new();
    let mut right: World<Part> = World::new();
    left.add_new_entity("l", flags(&["aaa"]));

    assert_eq!(group_len(&mut left, &["aaa"]), 1);
    assert_eq!(group_len(&mut right, &["aaa"]), 0);

    let handle = left.get_group(["aaa"]).unwrap();
    assert!(matches!(
        right.group(handle),
        Err(EcsError::ForeignGroup { .. })
    ));
}

#[test]
fn test_shared_state_reaches_systems() {
    let config = WorldConfig::from_toml_str("slow_system_warn_ms = 1000").unwrap();
    let mut world: World<Part> = World::with_config(config);
    world
        .state_mut()
        .insert(ember_core::state::keys::DELTA_SECONDS, 0.5_f32);

    world
        .add_system(from_fn("clock", |world: &mut World<Part, SharedState>| {
            let delta = world
                .state()
                .get::<f32>(ember_core::state::keys::DELTA_SECONDS)
                .copied()
                .unwrap_or_default();
            if let Some(elapsed) = world.state_mut().get_or_insert_with("elapsed", || 0.0_f32) {
                *elapsed += delta;
            }
            Ok(())
        }))
        .unwrap();

    world.update().unwrap();
    world.update().unwrap();
    assert_eq!(world.state().get::<f32>("elapsed"), Some(&1.0));
}

#[test]
fn test_application_defined_state() {
    #[derive(Default)]
    struct Frame {
        count: u32,
    }

    let mut world: World<Part, Frame> = World::with_state(Frame::default());
    world
        .add_system(from_fn("frames", |world: &mut World<Part, Frame>| {
            world.state_mut().count += 1;
            Ok(())
        }))
        .unwrap();

    world.update().unwrap();
    world.update().unwrap();
    assert_eq!(world.state().count, 2);
}
