use std::collections::BTreeSet;

use quadspace::*;

fn v(x: f64, y: f64) -> Vector {
    Vector::new(x, y)
}

fn make_space(subdivision: usize, capacity: usize, use_tags: bool) -> Space {
    Space::new(
        subdivision,
        capacity,
        20.0,
        20.0,
        v(-10.0, -10.0),
        v(10.0, 10.0),
        use_tags,
    )
    .expect("valid space parameters")
}

fn circle(x: f64, y: f64, radius: f64) -> Shape {
    Shape::circle(v(x, y), radius).unwrap()
}

#[test]
fn invalid_parameters_are_rejected() {
    let result = Space::new(0, 4, 20.0, 20.0, v(-10.0, -10.0), v(10.0, 10.0), false);
    assert_eq!(result.err(), Some(CollisionError::InvalidSubdivision(0)));

    let result = Space::new(2, 0, 20.0, 20.0, v(-10.0, -10.0), v(10.0, 10.0), false);
    assert_eq!(result.err(), Some(CollisionError::InvalidCapacity(0)));

    let result = Space::new(2, 4, 20.0, 20.0, v(10.0, 10.0), v(-10.0, -10.0), false);
    assert!(matches!(result, Err(CollisionError::InvalidBounds(_))));
}

#[test]
fn builder_matches_config() {
    let space = Space::builder()
        .subdivision(3)
        .node_capacity(2)
        .size(64.0, 32.0)
        .bounds(v(-30.0, -10.0), v(30.0, 10.0))
        .use_tags(true)
        .build()
        .unwrap();

    let config = space.config();
    assert_eq!(config.subdivision, 3);
    assert_eq!(config.node_capacity, 2);
    assert_eq!(config.width, 64.0);
    assert_eq!(config.height, 32.0);
    assert!(space.use_tags());
    assert_eq!(Space::from_config(config).unwrap().config(), config);
}

#[test]
fn add_rejects_shapes_outside_the_bounds() {
    let mut space = make_space(2, 4, false);

    let result = space.add(circle(11.0, 0.0, 1.0));
    assert_eq!(result, Err(CollisionError::OutOfBounds { x: 11.0, y: 0.0 }));
    assert!(space.is_empty());

    // The batch is validated up front.
    let result = space.add_all(vec![circle(0.0, 0.0, 1.0), circle(0.0, -12.0, 1.0)]);
    assert!(result.is_err());
    assert!(space.is_empty());
}

#[test]
fn remove_hands_the_shape_back() {
    let mut space = make_space(2, 4, false);
    let id = space
        .add(circle(3.0, 3.0, 1.0).with_data(String::from("payload")))
        .unwrap();

    let shape = space.remove(id).unwrap();
    assert_eq!(shape.data_as::<String>().map(String::as_str), Some("payload"));
    assert!(!space.contains(id));
    assert_eq!(space.remove(id).err(), Some(CollisionError::UnknownShape(id)));
    assert!(space.cells().iter().all(|cell| cell.shapes.is_empty()));
}

#[test]
fn remove_all_is_all_or_nothing() {
    let mut space = make_space(2, 4, false);
    let ids = space
        .add_all(vec![circle(1.0, 1.0, 1.0), circle(-1.0, -1.0, 1.0)])
        .unwrap();
    let removed = space.remove(ids[0]).unwrap();

    assert!(space.remove_all(ids.clone()).is_err());
    assert_eq!(space.len(), 1);

    space.add(removed).unwrap();
    assert_eq!(space.remove_all(vec![ids[1]]).unwrap().len(), 1);
    assert_eq!(space.len(), 1);
}

#[test]
fn update_follows_moved_shapes() {
    let mut space = make_space(2, 1, false);
    let a = space.add(circle(5.0, 5.0, 1.0)).unwrap();
    space.add(circle(-5.0, 5.0, 1.0)).unwrap();
    assert_eq!(space.leaf_count(), 4);

    space.shape_mut(a).unwrap().set_position(v(5.0, -5.0));
    let cells = space.update(a).unwrap();

    assert_eq!(cells.len(), 1);
    assert!(cells[0].boundary.contains_point(v(5.0, -5.0)));
    assert!(cells[0].shapes.contains(&a));
    assert_eq!(space.search(a).unwrap(), *space.domain(a).unwrap());
}

#[test]
fn adjust_shape_position_clamps_into_bounds() {
    let mut space = make_space(2, 4, false);
    let id = space.add(circle(9.0, 9.0, 1.0)).unwrap();
    space.shape_mut(id).unwrap().translate(v(5.0, -30.0));

    let adjusted = space.adjust_shape_position(id).unwrap();
    assert_eq!(adjusted, v(10.0, -10.0));
    assert_eq!(space.shape(id).unwrap().center(), v(10.0, -10.0));
}

#[test]
fn colliding_shapes_reports_both_directions() {
    let mut space = make_space(3, 2, false);
    let a = space.add(circle(0.0, 0.0, 1.0)).unwrap();
    let b = space.add(circle(1.5, 0.0, 1.0)).unwrap();
    let c = space.add(circle(-6.0, -6.0, 1.0)).unwrap();

    let colliding = space.colliding_shapes();
    assert_eq!(colliding.get(&a), Some(&BTreeSet::from([b])));
    assert_eq!(colliding.get(&b), Some(&BTreeSet::from([a])));
    assert!(!colliding.contains_key(&c));
}

#[test]
fn tags_make_collisions_directional() {
    let mut space = make_space(2, 4, true);
    let a = space
        .add(circle(0.0, 0.0, 2.0).with_tag(Tag::new(32, 32)))
        .unwrap();
    let b = space
        .add(circle(1.0, 0.0, 2.0).with_tag(Tag::new(64, 32)))
        .unwrap();

    assert_eq!(space.colliding_with(a).unwrap(), BTreeSet::from([b]));
    assert!(space.collided_by(a).unwrap().is_empty());
    assert!(space.colliding_with(b).unwrap().is_empty());
    assert_eq!(space.collided_by(b).unwrap(), BTreeSet::from([a]));

    let colliding = space.colliding_shapes();
    assert_eq!(colliding.get(&b), Some(&BTreeSet::from([a])));
    assert!(!colliding.contains_key(&a));

    space.set_use_tags(false);
    assert_eq!(space.collided_by(a).unwrap(), BTreeSet::from([b]));
}

#[test]
fn would_be_collided_by_restores_the_shape() {
    let mut space = Space::new(4, 4, 1280.0, 1280.0, v(0.0, 0.0), v(640.0, 640.0), false).unwrap();
    let rect = space
        .add(Shape::rectangle(v(600.0, 228.0), 150.0, 50.0, 0.0).unwrap())
        .unwrap();
    let line = space
        .add(Shape::line(v(480.0, 240.0), v(620.0, 240.0)).unwrap())
        .unwrap();
    let domain = space.domain(rect).unwrap().clone();

    let hits = space
        .would_be_collided_by(rect, v(0.0, 0.2171355), 0.0)
        .unwrap();

    assert_eq!(hits, BTreeSet::from([line]));
    assert_eq!(space.shape(rect).unwrap().center(), v(600.0, 228.0));
    assert_eq!(space.shape(rect).unwrap().angle(), 0.0);
    assert_eq!(*space.domain(rect).unwrap(), domain);
}

#[test]
fn would_be_colliding_with_only_sees_the_target_pose() {
    let mut space = make_space(3, 2, false);
    let mover = space.add(circle(-5.0, 0.0, 1.0)).unwrap();
    let target = space.add(circle(5.0, 0.0, 1.0)).unwrap();

    assert_eq!(
        space.would_be_colliding_with(mover, v(9.0, 0.0), 0.0).unwrap(),
        BTreeSet::from([target])
    );
    assert!(space
        .would_be_colliding_with(mover, v(0.0, 4.0), 0.0)
        .unwrap()
        .is_empty());
    assert_eq!(space.shape(mover).unwrap().center(), v(-5.0, 0.0));
}

#[test]
fn segments_cannot_tunnel_through_each_other() {
    let mut space = make_space(2, 4, false);
    let mover = space.add(Shape::line(v(-8.0, 0.0), v(-6.0, 0.0)).unwrap()).unwrap();
    let wall = space.add(Shape::line(v(0.0, -3.0), v(0.0, 3.0)).unwrap()).unwrap();

    assert_eq!(
        space.would_be_collided_by(mover, v(12.0, 0.0), 0.0).unwrap(),
        BTreeSet::from([wall])
    );
}

#[test]
fn casts_find_overlapping_shapes() {
    let mut space = make_space(3, 2, false);
    let near = space.add(circle(2.0, 2.0, 1.0)).unwrap();
    let far = space.add(circle(-7.0, -7.0, 1.0)).unwrap();
    let line = space.add(Shape::line(v(-2.0, 6.0), v(2.0, 6.0)).unwrap()).unwrap();

    let probe = Rectangle::new(v(1.0, 3.0), 4.0, 8.0, 0.0).unwrap();
    assert_eq!(space.boxcast(&probe), BTreeSet::from([near, line]));

    let probe = Circle::new(v(-6.0, -6.0), 1.0).unwrap();
    assert_eq!(space.circlecast(&probe), BTreeSet::from([far]));
}

#[test]
fn shapes_are_selected_by_tag_bits() {
    let mut space = make_space(2, 4, false);
    let a = space.add(circle(1.0, 1.0, 1.0).with_tag(Tag::new(0b011, 0b100))).unwrap();
    let b = space.add(circle(2.0, 2.0, 1.0).with_tag(Tag::new(0b010, 0b110))).unwrap();

    assert_eq!(space.shapes_with_identity(0b010), BTreeSet::from([a, b]));
    assert_eq!(space.shapes_with_identity(0b001), BTreeSet::from([a]));
    assert_eq!(space.shapes_with_mask(0b110), BTreeSet::from([b]));
}

#[test]
fn approximate_stops_at_the_first_blocker() {
    let mut space = Space::new(1, 10, 64.0, 64.0, v(-32.0, -32.0), v(32.0, 32.0), false).unwrap();
    let ball = space.add(circle(0.0, 0.0, 1.0)).unwrap();
    let wall = space
        .add(Shape::rectangle(v(10.0, 0.0), 2.0, 10.0, 0.0).unwrap())
        .unwrap();

    let result = space.approximate(ball, v(20.0, 0.0), 0.0, 20).unwrap();

    assert_eq!(result.blocker, Some(wall));
    assert!((result.position.x - 7.0).abs() < 1e-9);
    assert_eq!(space.shape(ball).unwrap().center(), v(0.0, 0.0));
}

#[test]
fn rebuild_collapses_emptied_quadrants() {
    let mut space = make_space(3, 1, false);
    let ids = space
        .add_all(vec![
            circle(5.0, 5.0, 0.5),
            circle(-5.0, 5.0, 0.5),
            circle(5.0, -5.0, 0.5),
            circle(-5.0, -5.0, 0.5),
        ])
        .unwrap();
    assert_eq!(space.leaf_count(), 4);

    space.remove_all(ids[1..].to_vec()).unwrap();
    assert_eq!(space.leaf_count(), 4);

    assert!(space.rebuild() > 0);
    assert_eq!(space.leaf_count(), 1);
    assert_eq!(space.domain(ids[0]).unwrap().len(), 1);
}

#[test]
fn clear_resets_the_index() {
    let mut space = make_space(3, 1, false);
    space
        .add_all((0..6).map(|i| circle(-8.0 + 3.0 * i as f64, 0.0, 0.5)))
        .unwrap();

    space.clear();
    assert!(space.is_empty());
    assert_eq!(space.leaf_count(), 1);
    assert_eq!(space.shapes().count(), 0);
}

#[test]
fn moving_shapes_back_lets_rebuild_restore_the_leaves() {
    let mut space = make_space(3, 2, false);
    let a = space.add(circle(5.0, 5.0, 0.5)).unwrap();
    let b = space.add(circle(-5.0, 5.0, 0.5)).unwrap();
    let c = space.add(circle(-5.0, -5.0, 0.5)).unwrap();
    assert_eq!(space.leaf_count(), 4);

    for (id, position) in [(b, v(3.0, 7.0)), (c, v(7.0, 3.0))] {
        space.shape_mut(id).unwrap().set_position(position);
        space.update(id).unwrap();
    }
    assert_eq!(space.leaf_count(), 7);

    for (id, position) in [(b, v(-5.0, 5.0)), (c, v(-5.0, -5.0))] {
        space.shape_mut(id).unwrap().set_position(position);
        space.update(id).unwrap();
    }
    space.rebuild();

    assert_eq!(space.leaf_count(), 4);
    let indexed: BTreeSet<ShapeId> =
        space.cells().into_iter().flat_map(|cell| cell.shapes).collect();
    assert_eq!(indexed, BTreeSet::from([a, b, c]));
    for id in [a, b, c] {
        assert!(!space.search(id).unwrap().is_empty());
        assert!(!space.colliding_with(id).unwrap().contains(&id));
    }
}

#[test]
fn stale_ids_are_rejected_without_touching_the_index() {
    let mut space = make_space(2, 1, false);
    let kept = space.add(circle(5.0, 5.0, 1.0)).unwrap();
    let stale = space.add(circle(-5.0, 5.0, 1.0)).unwrap();
    space.remove(stale).unwrap();

    let cells = space.cells();
    let leaves = space.leaf_count();

    assert_eq!(space.update(stale), Err(CollisionError::UnknownShape(stale)));
    assert_eq!(
        space.would_be_collided_by(stale, v(1.0, 0.0), 0.0),
        Err(CollisionError::UnknownShape(stale))
    );
    assert_eq!(space.domain(stale).err(), Some(CollisionError::UnknownShape(stale)));

    assert_eq!(space.cells(), cells);
    assert_eq!(space.leaf_count(), leaves);
    assert_eq!(space.search(kept).unwrap(), *space.domain(kept).unwrap());
}

#[test]
fn approximate_motion_uses_the_configured_steps() {
    let mut space = Space::builder()
        .subdivision(1)
        .node_capacity(10)
        .size(64.0, 64.0)
        .bounds(v(-32.0, -32.0), v(32.0, 32.0))
        .approximation_steps(20)
        .build()
        .unwrap();
    let ball = space.add(circle(0.0, 0.0, 1.0)).unwrap();
    let wall = space
        .add(Shape::rectangle(v(10.0, 0.0), 2.0, 10.0, 0.0).unwrap())
        .unwrap();

    let result = space.approximate_motion(ball, v(20.0, 0.0), 0.0).unwrap();

    assert_eq!(space.config().approximation_steps, 20);
    assert_eq!(result, space.approximate(ball, v(20.0, 0.0), 0.0, 20).unwrap());
    assert_eq!(result.blocker, Some(wall));
}
