//! A drag-to-pan override for camera rigs you don't control.
//!
//! Add [`DefaultDragPanPlugins`] with the type of your camera rig component, and holding the
//! designated pointer button will pan the rig across the ground plane instead of letting the
//! rig's own rotate-on-drag behavior run. Holding a modifier key hands the button back to the
//! rig.
//!
//! ## Design
//!
//! Pointer input is sampled once per tick in [`PreUpdate`](bevy_app::PreUpdate), where a small
//! state machine ([`DragPanState`](controller::drag::DragPanState)) converts pointer deltas into a
//! world space vector accumulated in [`PendingPan`](controller::drag::PendingPan). Once per
//! frame, in [`PostUpdate`](bevy_app::PostUpdate), the pending vector is drained and applied to
//! the rig's [`Transform`](bevy_transform::components::Transform).
//!
//! Many rigs recompute their transform from internal state (a pivot, a target position, a
//! follow target) every frame, which would undo a transform-only move. To prevent this
//! "snap-back", the rig type is probed once with [`bevy_reflect`] for fields that look like
//! position state, and any that are found get nudged by the same vector. Rigs that expose none
//! of these still pan, they just rely on the transform alone.
//!
//! The rig's own rotate-on-drag systems should be gated with
//! [`rotate_allowed`](controller::suppress::rotate_allowed), so they only run when a pan is not
//! in progress:
//!
//! ```rust,ignore
//! app.add_plugins(DefaultDragPanPlugins::<OrbitRig>::default())
//!     .add_systems(Update, orbit_rig_on_drag.run_if(rotate_allowed));
//! ```

pub mod controller;
pub mod extensions;

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            apply::{ApplyOutcome, PanApplier},
            drag::{DragEndReason, DragEnded, DragPanState, DragStarted, PendingPan},
            inputs::{PanBindings, PointerSample},
            locator::{FieldRole, RigFieldCandidates, RigFieldHandles, RigFieldLocator},
            settings::PanSettings,
            suppress::{rotate_allowed, RotateSuppressor},
            DragPanPlugin, DragPanSystems,
        },
        DefaultDragPanPlugins,
    };

    #[cfg(feature = "extension_toggle_key")]
    pub use crate::extensions::toggle_key::{TogglePanKey, TogglePanKeyPlugin};
}

use std::marker::PhantomData;

use bevy_app::{PluginGroup, PluginGroupBuilder};
use bevy_ecs::{component::Mutable, prelude::*};
use bevy_reflect::Reflect;

/// Adds the drag pan controller for the rig component `R`, along with default extensions.
pub struct DefaultDragPanPlugins<R>(PhantomData<fn() -> R>);

impl<R> Default for DefaultDragPanPlugins<R> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<R> PluginGroup for DefaultDragPanPlugins<R>
where
    R: Component<Mutability = Mutable> + Reflect,
{
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>()
            .add(controller::DragPanPlugin::<R>::default());

        #[cfg(feature = "extension_toggle_key")]
        let group = group.add(extensions::toggle_key::TogglePanKeyPlugin);

        group
    }
}
