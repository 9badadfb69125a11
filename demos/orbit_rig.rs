//! A host orbit rig that follows a moving subject and rotates on right drag. Adding the pan
//! plugin turns right drag into panning, while Alt + right drag still rotates.

use bevy::{input::mouse::AccumulatedMouseMotion, prelude::*};
use bevy_rig_pan::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            DefaultDragPanPlugins::<OrbitRig>::default(), // Step 1: name the rig component
        ))
        .add_systems(Startup, (setup_rig, setup_scene).chain())
        .add_systems(
            Update,
            (
                orbit_on_drag.run_if(rotate_allowed), // Step 2: gate the rig's rotate-on-drag
                follow_subject,
                place_rig,
                move_subject,
            )
                .chain(),
        )
        .run();
}

/// The host's rig. Its transform is rebuilt from these fields every frame, which is what would
/// make a transform-only pan snap back.
#[derive(Component, Reflect)]
struct OrbitRig {
    pivot: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    follow_target: Option<Entity>,
}

#[derive(Component)]
struct Subject;

fn setup_rig(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        OrbitRig {
            pivot: Vec3::ZERO,
            yaw: 0.0,
            pitch: -0.6,
            distance: 12.0,
            follow_target: None,
        },
    ));
}

fn orbit_on_drag(
    mouse: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    mut rigs: Query<&mut OrbitRig>,
) {
    if !mouse.pressed(MouseButton::Right) {
        return;
    }
    for mut rig in &mut rigs {
        rig.yaw -= motion.delta.x * 0.005;
        rig.pitch = (rig.pitch - motion.delta.y * 0.005).clamp(-1.5, -0.05);
    }
}

fn follow_subject(mut rigs: Query<&mut OrbitRig>, subjects: Query<&Transform, With<Subject>>) {
    for mut rig in &mut rigs {
        if let Some(transform) = rig.follow_target.and_then(|e| subjects.get(e).ok()) {
            rig.pivot = rig.pivot.lerp(transform.translation, 0.1);
        }
    }
}

fn place_rig(mut rigs: Query<(&OrbitRig, &mut Transform)>) {
    for (rig, mut transform) in &mut rigs {
        let rotation = Quat::from_euler(EulerRot::YXZ, rig.yaw, rig.pitch, 0.0);
        transform.translation = rig.pivot + rotation * Vec3::Z * rig.distance;
        transform.look_at(rig.pivot, Vec3::Y);
    }
}

fn move_subject(time: Res<Time>, mut subjects: Query<&mut Transform, With<Subject>>) {
    for mut transform in &mut subjects {
        let t = time.elapsed_secs() * 0.3;
        transform.translation = Vec3::new(t.cos() * 6.0, 0.5, t.sin() * 6.0);
    }
}

//
// --- The below code is not important for the example ---
//

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rigs: Query<&mut OrbitRig>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 40.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
    ));
    let subject = commands
        .spawn((
            Subject,
            Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
            Transform::from_xyz(6.0, 0.5, 0.0),
        ))
        .id();
    for mut rig in &mut rigs {
        rig.follow_target = Some(subject);
    }
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let text = "Right Mouse - Pan\nAlt + Right Mouse - Orbit\nF7 - Toggle pan";
    commands.spawn((
        Text::new(text),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        Node {
            margin: UiRect::all(Val::Px(20.0)),
            ..Default::default()
        },
    ));
}
