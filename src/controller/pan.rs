//! Conversion of pointer motion in pixels into a world space pan vector.

use bevy_ecs::prelude::*;
use bevy_math::prelude::*;
use bevy_render::prelude::*;
use bevy_transform::prelude::*;

/// The two world space directions a screen space drag maps onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanBasis {
    /// The camera's right axis. Dragging right moves the rig left, so the scene follows the
    /// pointer.
    pub right: Vec3,
    /// The camera's forward axis flattened onto the ground plane.
    pub forward: Vec3,
}

impl PanBasis {
    /// Build the basis for a camera with the given world space orientation.
    ///
    /// `forward` is projected onto the plane perpendicular to `up`, so panning stays level
    /// regardless of camera pitch. When the camera looks straight along `up`, the flattened
    /// forward axis vanishes, and the camera's up axis, flattened the same way, is used instead.
    pub fn from_camera(camera: &GlobalTransform, up: Vec3) -> Self {
        let up = up.normalize_or(Vec3::Y);
        let flatten = |v: Vec3| v.reject_from_normalized(up).normalize_or_zero();

        let forward = flatten(*camera.forward());
        let forward = if forward == Vec3::ZERO {
            flatten(*camera.up())
        } else {
            forward
        };

        Self {
            right: *camera.right(),
            forward,
        }
    }

    /// World space translation for a pointer delta in pixels. Screen y grows downward, so a
    /// positive `delta.y` moves the rig backward.
    pub fn world_delta(&self, delta: Vec2, world_units_per_pixel: f32) -> Vec3 {
        (-self.right * delta.x + -self.forward * delta.y) * world_units_per_pixel
    }
}

/// Pick the camera the user is looking through: the active camera with the highest order.
pub fn active_camera<'a, T>(cameras: impl IntoIterator<Item = (&'a Camera, T)>) -> Option<T> {
    cameras
        .into_iter()
        .filter(|(camera, _)| camera.is_active)
        .max_by_key(|(camera, _)| camera.order)
        .map(|(_, item)| item)
}

/// The global transform of the active camera, if there is one.
pub fn active_camera_transform<'a>(
    cameras: &'a Query<(&Camera, &GlobalTransform)>,
) -> Option<&'a GlobalTransform> {
    active_camera(cameras.iter())
}
