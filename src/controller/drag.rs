//! The drag state machine, which turns sampled input into a pending world space pan.

use bevy_derive::{Deref, DerefMut};
use bevy_ecs::{component::Mutable, prelude::*};
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::{prelude::*, PartialReflect};
use bevy_render::prelude::*;
use bevy_transform::prelude::*;

use super::{
    apply::PanApplier,
    inputs::{ButtonSample, PointerSample},
    locator::RigFieldLocator,
    pan::{active_camera_transform, PanBasis},
    settings::PanSettings,
    single_rig,
};

/// The world space translation accumulated since the last time it was applied.
///
/// Written by [`DragPanState::drive`] every input tick, drained by the
/// [`PanApplier`] once per frame. It is always zero right after a drain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Resource, Reflect, Deref, DerefMut)]
#[reflect(Resource)]
pub struct PendingPan(pub Vec3);

impl PendingPan {
    /// Add a world space translation to the pending pan.
    pub fn accumulate(&mut self, delta: Vec3) {
        self.0 += delta;
    }

    /// Take the pending pan, leaving zero behind.
    pub fn take(&mut self) -> Vec3 {
        std::mem::take(&mut self.0)
    }

    /// Is there nothing to apply?
    pub fn is_zero(&self) -> bool {
        self.0 == Vec3::ZERO
    }
}

/// State of a drag in progress.
#[derive(Debug)]
pub struct DragSession {
    /// Where the pointer was on the previous tick, in logical pixels. `None` until the pointer
    /// has been over the window during this drag.
    pub last_pointer_position: Option<Vec2>,
    /// The rig's follow target from before the drag started. Only present when the rig has a
    /// follow target field.
    pub saved_follow_target: Option<Box<dyn PartialReflect>>,
}

impl DragSession {
    fn new(anchor: Option<Vec2>) -> Self {
        Self {
            last_pointer_position: anchor,
            saved_follow_target: None,
        }
    }
}

/// Why a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DragEndReason {
    /// The pan button was released.
    Released,
    /// A modifier key was pressed mid-drag, handing the button back to the rig.
    Canceled,
    /// [`PanSettings::enabled`] was turned off mid-drag.
    Disabled,
}

impl DragEndReason {
    /// Should a drag in progress end, given this tick's input?
    ///
    /// A button that is no longer held ends the drag even if the release edge was never seen,
    /// for example when the window lost focus and the input state was reset.
    pub fn from_sample(buttons: ButtonSample, enabled: bool) -> Option<Self> {
        if buttons.modifier_held {
            Some(Self::Canceled)
        } else if !enabled {
            Some(Self::Disabled)
        } else if buttons.just_released || !buttons.held {
            Some(Self::Released)
        } else {
            None
        }
    }
}

/// Sent when a pan drag begins.
#[derive(Debug, Clone, Event)]
pub struct DragStarted {
    /// Pointer position the drag is anchored at, `None` if the pointer was outside the window.
    pub anchor: Option<Vec2>,
    /// Was the rig's follow target saved and detached?
    pub detached_follow_target: bool,
}

/// Sent when a pan drag ends, for any reason.
#[derive(Debug, Clone, Event)]
pub struct DragEnded {
    /// What ended the drag.
    pub reason: DragEndReason,
    /// Was a saved follow target written back to the rig?
    pub restored_follow_target: bool,
}

/// What happened on a single tick of the state machine.
#[derive(Debug)]
pub enum DragTransition {
    /// Nothing to do.
    None,
    /// A drag started at the pointer position.
    Started,
    /// The pointer moved this many pixels during a drag.
    Moved(Vec2),
    /// The drag ended. The finished session is handed back for cleanup.
    Ended {
        reason: DragEndReason,
        session: DragSession,
    },
}

/// Drag lifecycle of the pan controller.
#[derive(Debug, Default, Resource)]
pub enum DragPanState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragPanState {
    /// Is a pan drag in progress?
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    /// The drag in progress, if any.
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }

    fn session_mut(&mut self) -> Option<&mut DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }

    /// Advance the state machine by one input tick.
    ///
    /// Button presses while a drag is already in progress are ignored. A plain press starts a
    /// drag even with the pointer outside the window. The anchor is then set on the first tick
    /// the pointer is back, and motion is only counted from there.
    pub fn step(&mut self, sample: &PointerSample, enabled: bool) -> DragTransition {
        let buttons = sample.buttons;
        let Self::Dragging(session) = self else {
            if !(enabled && buttons.just_pressed && !buttons.modifier_held) {
                return DragTransition::None;
            }
            *self = Self::Dragging(DragSession::new(sample.position));
            return DragTransition::Started;
        };

        if let Some(reason) = DragEndReason::from_sample(buttons, enabled) {
            return match std::mem::take(self) {
                Self::Dragging(session) => DragTransition::Ended { reason, session },
                Self::Idle => DragTransition::None,
            };
        }

        // The pointer left the window, hold the last position until it comes back.
        let Some(position) = sample.position else {
            return DragTransition::None;
        };
        let Some(last) = session.last_pointer_position.replace(position) else {
            trace!("Pan drag anchored at {position}");
            return DragTransition::None;
        };
        let delta = position - last;
        if delta == Vec2::ZERO {
            DragTransition::None
        } else {
            DragTransition::Moved(delta)
        }
    }

    /// Run the state machine for this tick, and carry out the side effects of each transition on
    /// the rig and the pending pan. Runs once per input tick.
    #[allow(clippy::too_many_arguments)]
    pub fn drive<R>(
        mut state: ResMut<Self>,
        mut pending: ResMut<PendingPan>,
        mut locator: ResMut<RigFieldLocator<R>>,
        sample: Res<PointerSample>,
        settings: Res<PanSettings>,
        mut rigs: Query<&mut R>,
        cameras: Query<(&Camera, &GlobalTransform)>,
        applier: Option<Res<PanApplier>>,
        mut commands: Commands,
        mut started: EventWriter<DragStarted>,
        mut ended: EventWriter<DragEnded>,
    ) where
        R: Component<Mutability = Mutable> + Reflect,
    {
        match state.step(&sample, settings.enabled) {
            DragTransition::None => (),
            DragTransition::Started => {
                let saved = single_rig(rigs.single_mut()).and_then(|mut rig| {
                    let handles = locator.handles(&rig);
                    handles.take_follow_target(&mut *rig)
                });
                let detached_follow_target = saved.is_some();
                let mut anchor = None;
                if let Some(session) = state.session_mut() {
                    anchor = session.last_pointer_position;
                    session.saved_follow_target = saved;
                }
                if applier.is_none() {
                    commands.init_resource::<PanApplier>();
                }
                debug!("Pan drag started at {anchor:?}, follow target detached: {detached_follow_target}");
                started.write(DragStarted {
                    anchor,
                    detached_follow_target,
                });
            }
            DragTransition::Moved(delta) => {
                let Some(camera) = active_camera_transform(&cameras) else {
                    trace!("No active camera, skipping pan input {delta}");
                    return;
                };
                let world_delta = PanBasis::from_camera(camera, settings.up)
                    .world_delta(delta, settings.world_units_per_pixel());
                pending.accumulate(world_delta);
                trace!("Pan input {delta} px -> {world_delta}, pending {}", pending.0);
            }
            DragTransition::Ended { reason, session } => {
                let restored_follow_target = session
                    .saved_follow_target
                    .and_then(|saved| {
                        let mut rig = single_rig(rigs.single_mut())?;
                        let handles = locator.handles(&rig);
                        Some(handles.restore_follow_target(&mut *rig, saved.as_ref()))
                    })
                    .unwrap_or(false);
                debug!("Pan drag ended ({reason:?}), follow target restored: {restored_follow_target}");
                ended.write(DragEnded {
                    reason,
                    restored_follow_target,
                });
            }
        }

        if !settings.enabled && !state.is_dragging() {
            pending.set_if_neq(PendingPan::default());
        }
    }
}
