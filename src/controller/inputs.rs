//! Sampling of the pointer, the pan button, and modifier keys, once per input tick.

use bevy_ecs::prelude::*;
use bevy_input::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_window::{PrimaryWindow, Window};

use super::settings::PanSettings;

/// The pointer button that pans, and the modifier keys that hand it back to the rig.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct PanBindings {
    /// Dragging with this button pans the rig.
    pub button: MouseButton,
    /// While any of these keys are held, the button keeps its original rig behavior.
    pub modifiers: Vec<KeyCode>,
}

impl Default for PanBindings {
    fn default() -> Self {
        Self {
            button: MouseButton::Right,
            modifiers: vec![KeyCode::AltLeft, KeyCode::AltRight],
        }
    }
}

impl PanBindings {
    /// Read the button edges and modifier state for this tick.
    ///
    /// Both the drag state machine and the rotate suppressor go through this, so the two can
    /// never disagree about whether a pan is in progress.
    pub fn sample_buttons(
        &self,
        mouse: &ButtonInput<MouseButton>,
        keys: &ButtonInput<KeyCode>,
    ) -> ButtonSample {
        ButtonSample {
            just_pressed: mouse.just_pressed(self.button),
            held: mouse.pressed(self.button),
            just_released: mouse.just_released(self.button),
            modifier_held: keys.any_pressed(self.modifiers.iter().copied()),
        }
    }
}

/// Button and modifier state for a single tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct ButtonSample {
    /// The pan button went down this tick.
    pub just_pressed: bool,
    /// The pan button is down.
    pub held: bool,
    /// The pan button went up this tick.
    pub just_released: bool,
    /// Any of the modifier keys are down.
    pub modifier_held: bool,
}

impl ButtonSample {
    /// The button is engaged this tick and the modifier isn't claiming it.
    pub fn is_plain_press(&self) -> bool {
        (self.held || self.just_pressed) && !self.modifier_held
    }
}

/// Everything the drag state machine needs from the input devices for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Resource, Reflect)]
#[reflect(Resource)]
pub struct PointerSample {
    /// Pointer position in logical pixels, `None` when the pointer is outside the window.
    pub position: Option<Vec2>,
    /// State of the pan button and modifiers.
    pub buttons: ButtonSample,
}

impl PointerSample {
    /// Sample the primary window's pointer and the configured bindings.
    pub fn update(
        mut sample: ResMut<Self>,
        settings: Res<PanSettings>,
        mouse: Res<ButtonInput<MouseButton>>,
        keys: Res<ButtonInput<KeyCode>>,
        windows: Query<&Window, With<PrimaryWindow>>,
    ) {
        let next = PointerSample {
            position: windows.single().ok().and_then(Window::cursor_position),
            buttons: settings.bindings.sample_buttons(&mouse, &keys),
        };
        // Avoid triggering change detection every frame.
        sample.set_if_neq(next);
    }
}
