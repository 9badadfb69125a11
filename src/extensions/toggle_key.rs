//! A `bevy_rig_pan` extension that flips [`PanSettings::enabled`] with a hotkey.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::prelude::*;
use bevy_log::prelude::*;
use bevy_reflect::prelude::*;

use crate::prelude::*;

/// See the [module](self) docs.
pub struct TogglePanKeyPlugin;

impl Plugin for TogglePanKeyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TogglePanKey>()
            .init_resource::<PanSettings>()
            .add_systems(
                PreUpdate,
                TogglePanKey::toggle.before(DragPanSystems::Sample),
            )
            .register_type::<TogglePanKey>();
    }
}

/// The key that turns the pan override on and off. Set `key` to `None` to disable the hotkey
/// without removing the plugin.
#[derive(Debug, Clone, Resource, Reflect)]
#[reflect(Resource)]
pub struct TogglePanKey {
    /// The hotkey, if any.
    pub key: Option<KeyCode>,
}

impl Default for TogglePanKey {
    fn default() -> Self {
        Self {
            key: Some(KeyCode::F7),
        }
    }
}

impl TogglePanKey {
    fn toggle(
        toggle: Res<Self>,
        keys: Res<ButtonInput<KeyCode>>,
        mut settings: ResMut<PanSettings>,
    ) {
        let Some(key) = toggle.key else {
            return;
        };
        if keys.just_pressed(key) {
            settings.enabled = !settings.enabled;
            info!("Drag pan {}", if settings.enabled { "enabled" } else { "disabled" });
        }
    }
}
