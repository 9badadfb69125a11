//! Vetoing the rig's own rotate-on-drag behavior while a pan owns the button.

use bevy_ecs::{prelude::*, system::SystemParam};
use bevy_input::prelude::*;
use bevy_log::prelude::*;

use super::{inputs::ButtonSample, settings::PanSettings};

/// Decides whether the host's rotate-on-drag logic may run this tick.
///
/// Use this directly in a system, or gate the rig's rotate systems with [`rotate_allowed`].
/// The decision is computed from the live button state with the same sampling as the drag state
/// machine, so it holds no matter where in the frame the host's rotate systems run.
#[derive(SystemParam)]
pub struct RotateSuppressor<'w> {
    settings: Res<'w, PanSettings>,
    mouse: Res<'w, ButtonInput<MouseButton>>,
    keys: Res<'w, ButtonInput<KeyCode>>,
}

impl RotateSuppressor<'_> {
    /// Should the host's rotate-on-drag be suppressed right now?
    pub fn vetoes(&self) -> bool {
        let buttons = self
            .settings
            .bindings
            .sample_buttons(&self.mouse, &self.keys);
        should_veto(buttons, self.settings.enabled)
    }
}

/// Veto if the feature is on, the pan button is held or was just pressed, and no modifier is
/// claiming the button.
pub fn should_veto(buttons: ButtonSample, enabled: bool) -> bool {
    enabled && buttons.is_plain_press()
}

/// Run condition for the rig's rotate-on-drag systems. Each system gated with this is vetoed
/// independently, without running, whenever a plain pan drag owns the button.
pub fn rotate_allowed(suppressor: RotateSuppressor) -> bool {
    let veto = suppressor.vetoes();
    if veto {
        trace!("Rotate-on-drag suppressed");
    }
    !veto
}
