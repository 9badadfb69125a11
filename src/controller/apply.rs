//! Once-per-frame application of the pending pan to the rig.

use bevy_ecs::{component::Mutable, prelude::*};
use bevy_log::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::prelude::*;
use bevy_transform::prelude::*;
use bevy_window::RequestRedraw;

use super::{drag::PendingPan, locator::RigFieldLocator, pan::active_camera, single_rig};

/// What a single application of the pending pan ended up moving.
///
/// These are tried in order, each a weaker fallback than the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ApplyOutcome {
    /// There was nothing to apply.
    Idle,
    /// The rig's transform moved, along with this many of its internal position fields.
    Rig { nudged_fields: usize },
    /// No rig was found. The active camera's transform was moved directly, which is visual only.
    CameraOnly,
    /// Neither a rig nor an active camera was found. The pan was discarded.
    Nothing,
}

/// Drains [`PendingPan`] once per frame, after game logic and before transform propagation.
///
/// Inserted the first time a drag starts. Until then, the system that applies pans does not
/// run at all.
#[derive(Debug, Default, Clone, Resource, Reflect)]
#[reflect(Resource)]
pub struct PanApplier {
    /// Result of the most recent non-empty drain.
    pub last_outcome: Option<ApplyOutcome>,
    /// How many non-empty pans have been applied.
    pub applied: u64,
}

impl PanApplier {
    /// The outcome of the most recent pan, or [`ApplyOutcome::Idle`] if none happened yet.
    pub fn outcome(&self) -> ApplyOutcome {
        self.last_outcome.unwrap_or(ApplyOutcome::Idle)
    }

    /// Move the rig by the pending pan, then clear it.
    ///
    /// When a rig exists, every internal position field the locator found is nudged first, then
    /// the transform is moved, so a rig that recomputes its transform from that state next frame
    /// lands in the same place. Without a rig, the active camera's transform is moved instead.
    /// The pending pan is cleared whichever path is taken.
    pub fn apply<R>(
        mut applier: ResMut<Self>,
        mut pending: ResMut<PendingPan>,
        mut locator: ResMut<RigFieldLocator<R>>,
        mut rigs: Query<(&mut R, &mut Transform)>,
        mut cameras: Query<(&Camera, &mut Transform), Without<R>>,
        mut redraw: EventWriter<RequestRedraw>,
    ) where
        R: Component<Mutability = Mutable> + Reflect,
    {
        if pending.is_zero() {
            return;
        }
        let delta = pending.take();

        let outcome = if let Some((mut rig, mut transform)) = single_rig(rigs.single_mut()) {
            let handles = locator.handles(&rig);
            let nudged_fields = handles.nudge(&mut *rig, delta);
            transform.translation += delta;
            ApplyOutcome::Rig { nudged_fields }
        } else if let Some(mut transform) = active_camera(cameras.iter_mut()) {
            transform.translation += delta;
            ApplyOutcome::CameraOnly
        } else {
            ApplyOutcome::Nothing
        };

        trace!("Applied pan {delta}: {outcome:?}");
        if outcome != ApplyOutcome::Nothing {
            redraw.write(RequestRedraw);
        }
        applier.applied += 1;
        applier.last_outcome = Some(outcome);
    }
}
