//! The drag pan controller: input sampling, the drag state machine, the deferred applier, and
//! the rig field locator.

use std::marker::PhantomData;

use bevy_app::prelude::*;
use bevy_ecs::{component::Mutable, prelude::*, query::QuerySingleError};
use bevy_input::InputSystem;
use bevy_log::prelude::*;
use bevy_reflect::Reflect;
use bevy_transform::TransformSystem;
use bevy_window::RequestRedraw;

pub mod apply;
pub mod drag;
pub mod inputs;
pub mod locator;
pub mod pan;
pub mod settings;
pub mod suppress;

use apply::PanApplier;
use drag::{DragEnded, DragPanState, DragStarted, PendingPan};
use inputs::PointerSample;
use locator::{RigFieldCandidates, RigFieldLocator};
use settings::PanSettings;

/// Ordering of the controller's systems within a frame.
///
/// All input ticks of a frame run before that frame's apply. Host systems that read or write the
/// rig's internal state should run outside `Drive..=Apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum DragPanSystems {
    /// Input sampling, in [`PreUpdate`].
    Sample,
    /// The drag state machine, in [`PreUpdate`].
    Drive,
    /// Draining the pending pan onto the rig, in [`PostUpdate`].
    Apply,
}

/// Pans the camera rig component `R` by dragging.
///
/// `R` is your rig's component type. It is located with a query for a single entity, and must
/// implement [`Reflect`] so its internal position state can be found.
pub struct DragPanPlugin<R> {
    candidates: RigFieldCandidates,
    _rig: PhantomData<fn() -> R>,
}

impl<R> Default for DragPanPlugin<R> {
    fn default() -> Self {
        Self::with_candidates(RigFieldCandidates::default())
    }
}

impl<R> DragPanPlugin<R> {
    /// Use custom field names when probing the rig for internal state.
    pub fn with_candidates(candidates: RigFieldCandidates) -> Self {
        Self {
            candidates,
            _rig: PhantomData,
        }
    }
}

impl<R> Plugin for DragPanPlugin<R>
where
    R: Component<Mutability = Mutable> + Reflect,
{
    fn build(&self, app: &mut App) {
        app.init_resource::<PanSettings>()
            .init_resource::<PointerSample>()
            .init_resource::<PendingPan>()
            .init_resource::<DragPanState>()
            .insert_resource(RigFieldLocator::<R>::new(self.candidates.clone()))
            .add_event::<DragStarted>()
            .add_event::<DragEnded>()
            .add_event::<RequestRedraw>()
            .configure_sets(
                PreUpdate,
                (DragPanSystems::Sample, DragPanSystems::Drive)
                    .chain()
                    .after(InputSystem),
            )
            .configure_sets(
                PostUpdate,
                DragPanSystems::Apply.before(TransformSystem::TransformPropagate),
            )
            .add_systems(
                PreUpdate,
                (
                    PointerSample::update.in_set(DragPanSystems::Sample),
                    DragPanState::drive::<R>.in_set(DragPanSystems::Drive),
                ),
            )
            .add_systems(
                PostUpdate,
                PanApplier::apply::<R>
                    .run_if(resource_exists::<PanApplier>)
                    .in_set(DragPanSystems::Apply),
            )
            .register_type::<PanSettings>()
            .register_type::<PointerSample>()
            .register_type::<PendingPan>()
            .register_type::<PanApplier>();
    }
}

/// The rig, if there is exactly one.
fn single_rig<D>(rig: Result<D, QuerySingleError>) -> Option<D> {
    match rig {
        Ok(rig) => Some(rig),
        Err(QuerySingleError::NoEntities(_)) => None,
        Err(QuerySingleError::MultipleEntities(_)) => {
            warn_once!("More than one camera rig found, only the active camera will be panned");
            None
        }
    }
}
