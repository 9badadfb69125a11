//! Provides [`PanSettings`], the user-facing configuration of the controller.

use bevy_ecs::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::inputs::PanBindings;

/// Configuration shared by every part of the drag pan controller.
///
/// The controller only ever reads this resource. Flip [`PanSettings::enabled`] from your own
/// settings UI, or use the toggle key extension.
#[derive(Debug, Clone, Resource, Reflect)]
#[reflect(Resource)]
pub struct PanSettings {
    /// Is the pan override active? When this becomes `false` during a drag, the drag ends on the
    /// next tick, exactly as if the button had been released.
    pub enabled: bool,
    /// Which pointer button pans, and which keys hand that button back to the rig.
    pub bindings: PanBindings,
    /// World units moved per pixel of pointer motion, before [`PanSettings::speed_factor`].
    pub pixel_scale: f32,
    /// Multiplier applied on top of [`PanSettings::pixel_scale`].
    pub speed_factor: f32,
    /// The world's up direction. Panning happens on the plane perpendicular to this, regardless
    /// of camera pitch.
    pub up: Vec3,
}

impl Default for PanSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bindings: PanBindings::default(),
            pixel_scale: 0.02,
            speed_factor: 1.5,
            up: Vec3::Y,
        }
    }
}

impl PanSettings {
    /// World units moved per pixel of pointer motion.
    pub fn world_units_per_pixel(&self) -> f32 {
        self.pixel_scale * self.speed_factor
    }
}
