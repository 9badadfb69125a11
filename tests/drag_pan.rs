//! End-to-end behavior of the pan controller in a headless app.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::Reflect;
use bevy_render::prelude::*;
use bevy_rig_pan::{controller::pan::PanBasis, prelude::*};
use bevy_transform::prelude::*;
use bevy_window::{PrimaryWindow, RequestRedraw, Window};

#[derive(Component, Reflect)]
struct OrbitRig {
    position: Vec3,
    pivot: Vec3,
    follow_target: Option<Entity>,
}

#[derive(Resource, Default)]
struct RotateCalls {
    orbit: u32,
    free_look: u32,
}

fn host_orbit_on_drag(mut calls: ResMut<RotateCalls>) {
    calls.orbit += 1;
}

fn host_free_look_on_drag(mut calls: ResMut<RotateCalls>) {
    calls.free_look += 1;
}

/// A rig that rebuilds its transform from its own state every frame.
fn host_rig_update(mut rigs: Query<(&OrbitRig, &mut Transform)>) {
    for (rig, mut transform) in &mut rigs {
        transform.translation = rig.position;
    }
}

struct Harness {
    app: App,
    window: Entity,
    camera: Entity,
    rig: Option<Entity>,
    subject: Entity,
}

impl Harness {
    fn new(with_rig: bool) -> Self {
        let mut app = App::new();
        app.init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<RotateCalls>()
            .add_plugins(DragPanPlugin::<OrbitRig>::default())
            .add_systems(
                Update,
                (
                    host_orbit_on_drag.run_if(rotate_allowed),
                    host_free_look_on_drag.run_if(rotate_allowed),
                ),
            );

        let world = app.world_mut();
        let window = world.spawn((Window::default(), PrimaryWindow)).id();
        let camera_transform =
            Transform::from_xyz(0.0, 10.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y);
        let camera = world
            .spawn((
                Camera::default(),
                camera_transform,
                GlobalTransform::from(camera_transform),
            ))
            .id();
        let subject = world.spawn_empty().id();
        let rig = with_rig.then(|| {
            world
                .spawn((
                    OrbitRig {
                        position: Vec3::ZERO,
                        pivot: Vec3::new(0.0, 0.0, -5.0),
                        follow_target: Some(subject),
                    },
                    Transform::default(),
                ))
                .id()
        });

        Self {
            app,
            window,
            camera,
            rig,
            subject,
        }
    }

    fn cursor(&mut self, x: f32, y: f32) -> &mut Self {
        self.app
            .world_mut()
            .get_mut::<Window>(self.window)
            .unwrap()
            .set_cursor_position(Some(Vec2::new(x, y)));
        self
    }

    fn cursor_outside(&mut self) -> &mut Self {
        self.app
            .world_mut()
            .get_mut::<Window>(self.window)
            .unwrap()
            .set_cursor_position(None);
        self
    }

    fn press(&mut self) -> &mut Self {
        self.mouse().press(MouseButton::Right);
        self
    }

    fn release(&mut self) -> &mut Self {
        self.mouse().release(MouseButton::Right);
        self
    }

    fn modifier(&mut self, held: bool) -> &mut Self {
        let mut keys = self.app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        if held {
            keys.press(KeyCode::AltLeft);
        } else {
            keys.release(KeyCode::AltLeft);
        }
        self
    }

    fn mouse(&mut self) -> Mut<ButtonInput<MouseButton>> {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
    }

    fn enabled(&mut self, enabled: bool) -> &mut Self {
        self.app
            .world_mut()
            .resource_mut::<PanSettings>()
            .enabled = enabled;
        self
    }

    /// The input tick half of a frame.
    fn input_tick(&mut self) -> &mut Self {
        self.app.world_mut().run_schedule(PreUpdate);
        self.clear_edges();
        self
    }

    /// The render half of a frame.
    fn drain(&mut self) -> &mut Self {
        self.app.world_mut().run_schedule(PostUpdate);
        self
    }

    /// A full frame.
    fn frame(&mut self) -> &mut Self {
        self.app.update();
        self.clear_edges();
        self
    }

    /// Stands in for the input plugin, which clears just pressed/released state every frame.
    fn clear_edges(&mut self) {
        let world = self.app.world_mut();
        world.resource_mut::<ButtonInput<MouseButton>>().clear();
        world.resource_mut::<ButtonInput<KeyCode>>().clear();
    }

    fn pending(&self) -> Vec3 {
        self.app.world().resource::<PendingPan>().0
    }

    fn rig(&self) -> &OrbitRig {
        self.app.world().get::<OrbitRig>(self.rig.unwrap()).unwrap()
    }

    fn rig_translation(&self) -> Vec3 {
        self.app
            .world()
            .get::<Transform>(self.rig.unwrap())
            .unwrap()
            .translation
    }

    fn camera_translation(&self) -> Vec3 {
        self.app
            .world()
            .get::<Transform>(self.camera)
            .unwrap()
            .translation
    }

    fn is_dragging(&self) -> bool {
        self.app.world().resource::<DragPanState>().is_dragging()
    }

    fn rotate_calls(&self) -> (u32, u32) {
        let calls = self.app.world().resource::<RotateCalls>();
        (calls.orbit, calls.free_look)
    }

    fn ended(&mut self) -> Vec<DragEnded> {
        self.app
            .world_mut()
            .resource_mut::<Events<DragEnded>>()
            .drain()
            .collect()
    }

    fn world_delta(&self, dx: f32, dy: f32) -> Vec3 {
        let camera = *self.app.world().get::<Transform>(self.camera).unwrap();
        PanBasis::from_camera(&GlobalTransform::from(camera), Vec3::Y)
            .world_delta(Vec2::new(dx, dy), 0.02 * 1.5)
    }
}

fn assert_close(a: Vec3, b: Vec3) {
    assert!((a - b).length() < 1e-5, "{a} != {b}");
}

#[test]
fn press_drag_drain_release() {
    let mut h = Harness::new(true);

    h.cursor(100.0, 100.0).press().input_tick();
    assert!(h.is_dragging());
    assert_eq!(h.rig().follow_target, None, "follow target detached");
    let started = h.app.world().resource::<Events<DragStarted>>();
    assert_eq!(started.len(), 1);

    h.cursor(110.0, 95.0).input_tick();
    let expected = h.world_delta(10.0, -5.0);
    assert_close(expected, Vec3::new(-0.3, 0.0, -0.15));
    assert_close(h.pending(), expected);

    h.drain();
    assert_close(h.rig_translation(), expected);
    assert_close(h.rig().position, expected);
    assert_close(h.rig().pivot, Vec3::new(0.0, 0.0, -5.0) + expected);
    assert_eq!(h.pending(), Vec3::ZERO);
    let applier = h.app.world().resource::<PanApplier>();
    assert_eq!(applier.outcome(), ApplyOutcome::Rig { nudged_fields: 2 });

    h.release().frame();
    assert!(!h.is_dragging());
    assert_eq!(h.rig().follow_target, Some(h.subject));
    let ended = h.ended();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].reason, DragEndReason::Released);
    assert!(ended[0].restored_follow_target);
}

#[test]
fn pending_is_zero_after_every_frame() {
    let mut h = Harness::new(true);
    h.cursor(10.0, 10.0).press().frame();
    for step in 1..20 {
        h.cursor(10.0 + step as f32 * 3.0, 200.0 - step as f32).frame();
        assert_eq!(h.pending(), Vec3::ZERO);
    }
}

#[test]
fn disabled_never_accumulates() {
    let mut h = Harness::new(true);
    h.enabled(false);
    h.cursor(100.0, 100.0).press().input_tick();
    for x in [120.0, 180.0, 300.0] {
        h.cursor(x, 50.0).input_tick();
        assert_eq!(h.pending(), Vec3::ZERO);
    }
    h.drain();
    assert!(!h.is_dragging());
    assert_eq!(h.rig_translation(), Vec3::ZERO);
    assert_eq!(h.rig().follow_target, Some(h.subject));
    assert!(h.app.world().get_resource::<PanApplier>().is_none());
}

#[test]
fn modifier_at_press_leaves_rotation_alone() {
    let mut h = Harness::new(true);
    h.modifier(true).cursor(100.0, 100.0).press().frame();
    assert!(!h.is_dragging());
    assert_eq!(h.rotate_calls(), (1, 1));

    h.cursor(150.0, 100.0).frame();
    assert_eq!(h.rotate_calls(), (2, 2));
    assert_eq!(h.rig_translation(), Vec3::ZERO);
}

#[test]
fn plain_drag_vetoes_both_rotate_entry_points() {
    let mut h = Harness::new(true);
    h.frame();
    assert_eq!(h.rotate_calls(), (1, 1));

    h.cursor(100.0, 100.0).press().frame();
    h.cursor(120.0, 100.0).frame();
    assert_eq!(h.rotate_calls(), (1, 1));

    h.release().frame();
    assert_eq!(h.rotate_calls(), (2, 2));
}

#[test]
fn modifier_mid_drag_cancels_and_restores_once() {
    let mut h = Harness::new(true);
    h.cursor(100.0, 100.0).press().frame();
    h.cursor(120.0, 100.0).frame();
    let moved = h.rig_translation();
    assert_ne!(moved, Vec3::ZERO);

    h.modifier(true).cursor(140.0, 100.0).frame();
    assert!(!h.is_dragging());
    assert_eq!(h.rig().follow_target, Some(h.subject));
    let ended = h.ended();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].reason, DragEndReason::Canceled);
    assert!(ended[0].restored_follow_target);

    // Rotation belongs to the rig again, and panning has stopped.
    let (orbit, _) = h.rotate_calls();
    h.cursor(200.0, 100.0).frame();
    h.modifier(false).cursor(260.0, 100.0).frame();
    assert_eq!(h.rig_translation(), moved);
    assert_eq!(h.rotate_calls().0, orbit + 1);

    h.release().frame();
    assert!(h.ended().is_empty());
}

#[test]
fn disabling_mid_drag_ends_with_restore() {
    let mut h = Harness::new(true);
    h.cursor(100.0, 100.0).press().frame();
    h.enabled(false).cursor(130.0, 100.0).frame();

    assert!(!h.is_dragging());
    assert_eq!(h.pending(), Vec3::ZERO);
    assert_eq!(h.rig_translation(), Vec3::ZERO);
    let ended = h.ended();
    assert_eq!(ended[0].reason, DragEndReason::Disabled);
    assert_eq!(h.rig().follow_target, Some(h.subject));
}

#[test]
fn second_drain_is_a_no_op() {
    let mut h = Harness::new(true);
    h.cursor(100.0, 100.0).press().input_tick();
    h.cursor(90.0, 120.0).input_tick();
    h.drain();
    let once = h.rig_translation();
    h.drain();
    assert_eq!(h.rig_translation(), once);
    assert_eq!(h.app.world().resource::<PanApplier>().applied, 1);
}

#[test]
fn ticks_before_a_drain_sum() {
    let mut h = Harness::new(true);
    h.cursor(0.0, 0.0).press().input_tick();

    let path = [(5.0, 3.0), (12.0, -4.0), (12.0, -4.0), (40.0, 25.0), (33.0, 31.0)];
    let mut last = Vec2::ZERO;
    let mut expected = Vec3::ZERO;
    for (x, y) in path {
        h.cursor(x, y).input_tick();
        let delta = Vec2::new(x, y) - last;
        expected += h.world_delta(delta.x, delta.y);
        last = Vec2::new(x, y);
    }
    assert_close(h.pending(), expected);

    h.drain();
    assert_close(h.rig_translation(), expected);
    assert_close(h.rig().position, expected);
}

#[test]
fn nudged_state_prevents_snap_back() {
    let mut h = Harness::new(true);
    h.app.add_systems(Update, host_rig_update);

    h.cursor(100.0, 100.0).press().frame();
    h.cursor(150.0, 100.0).frame();
    let panned = h.rig_translation();
    assert_ne!(panned, Vec3::ZERO);

    h.release().frame();
    h.frame();
    assert_close(h.rig_translation(), panned);
}

#[test]
fn without_a_rig_the_camera_moves() {
    let mut h = Harness::new(false);
    let start = h.camera_translation();

    h.cursor(100.0, 100.0).press().input_tick();
    h.cursor(110.0, 95.0).input_tick();
    let expected = h.world_delta(10.0, -5.0);
    h.drain();

    assert_close(h.camera_translation(), start + expected);
    assert_eq!(h.pending(), Vec3::ZERO);
    let applier = h.app.world().resource::<PanApplier>();
    assert_eq!(applier.outcome(), ApplyOutcome::CameraOnly);

    h.release().frame();
    let ended = h.ended();
    assert!(!ended[0].restored_follow_target);
}

#[test]
fn without_a_camera_input_is_skipped() {
    let mut h = Harness::new(true);
    h.app.world_mut().despawn(h.camera);

    h.cursor(100.0, 100.0).press().input_tick();
    h.cursor(110.0, 95.0).input_tick();
    assert_eq!(h.pending(), Vec3::ZERO);
    assert!(h.is_dragging());
}

#[test]
fn without_a_rig_or_camera_the_pan_is_discarded() {
    let mut h = Harness::new(false);
    h.cursor(100.0, 100.0).press().input_tick();
    h.cursor(110.0, 95.0).input_tick();
    assert_ne!(h.pending(), Vec3::ZERO);

    h.app.world_mut().despawn(h.camera);
    h.drain();

    assert_eq!(h.pending(), Vec3::ZERO);
    let applier = h.app.world().resource::<PanApplier>();
    assert_eq!(applier.outcome(), ApplyOutcome::Nothing);
    assert!(h.app.world().resource::<Events<RequestRedraw>>().is_empty());
}

#[test]
fn press_outside_the_window_pans_once_the_pointer_returns() {
    let mut h = Harness::new(true);
    h.cursor_outside().press().frame();
    assert!(h.is_dragging());
    assert_eq!(h.rotate_calls(), (0, 0));

    h.cursor(50.0, 50.0).frame();
    assert_eq!(h.rig_translation(), Vec3::ZERO);

    h.cursor(90.0, 50.0).frame();
    assert_close(h.rig_translation(), h.world_delta(40.0, 0.0));
    assert_eq!(h.rotate_calls(), (0, 0));

    h.release().frame();
    assert!(!h.is_dragging());
    assert_eq!(h.rotate_calls(), (1, 1));
    assert_eq!(h.rig().follow_target, Some(h.subject));
}

#[test]
fn field_resolution_is_cached() {
    let mut h = Harness::new(true);
    h.cursor(100.0, 100.0).press().frame();
    let locator = h.app.world().resource::<RigFieldLocator<OrbitRig>>();
    let handles = locator.resolved().expect("resolved on drag start").clone();
    assert_eq!(handles.get(FieldRole::CurrentPosition).unwrap().name, "position");
    assert_eq!(handles.get(FieldRole::Pivot).unwrap().name, "pivot");
    assert!(handles.get(FieldRole::TargetPosition).is_none());
    assert!(handles.get(FieldRole::LookAt).is_none());

    h.cursor(120.0, 100.0).frame();
    let locator = h.app.world().resource::<RigFieldLocator<OrbitRig>>();
    assert_eq!(locator.resolved(), Some(&handles));
}
