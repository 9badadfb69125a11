//! Best-effort discovery of a camera rig's internal position state, using [`bevy_reflect`].
//!
//! Rigs that recompute their transform from internal fields every frame will "snap back" after a
//! transform-only move. Finding those fields lets the applier move them along with the
//! transform. Nothing here is required: a rig with no matching fields is a normal, common case.

use std::marker::PhantomData;

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::{
    prelude::*, DynamicEnum, DynamicVariant, PartialReflect, ReflectMut, ReflectRef,
};

/// The kinds of rig state the locator looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum FieldRole {
    /// Where the rig currently is.
    CurrentPosition,
    /// Where the rig is easing toward.
    TargetPosition,
    /// The point the rig orbits around.
    Pivot,
    /// The point the rig faces.
    LookAt,
    /// A reference to something the rig automatically tracks. May be of any type.
    FollowTarget,
}

impl FieldRole {
    /// Roles holding a [`Vec3`] that gets nudged by the pan vector.
    pub const VECTORS: [FieldRole; 4] = [
        FieldRole::CurrentPosition,
        FieldRole::TargetPosition,
        FieldRole::Pivot,
        FieldRole::LookAt,
    ];
}

/// Ordered field names tried for each [`FieldRole`]. The first match wins.
#[derive(Debug, Clone, Reflect)]
pub struct RigFieldCandidates {
    /// Names tried for [`FieldRole::CurrentPosition`].
    pub current_position: Vec<String>,
    /// Names tried for [`FieldRole::TargetPosition`].
    pub target_position: Vec<String>,
    /// Names tried for [`FieldRole::Pivot`].
    pub pivot: Vec<String>,
    /// Names tried for [`FieldRole::LookAt`].
    pub look_at: Vec<String>,
    /// Names tried for [`FieldRole::FollowTarget`].
    pub follow_target: Vec<String>,
}

impl Default for RigFieldCandidates {
    fn default() -> Self {
        let names = |names: &[&str]| names.iter().map(ToString::to_string).collect();
        Self {
            current_position: names(&["current_position", "position", "current", "pos"]),
            target_position: names(&["target_position", "desired_position", "goal", "target"]),
            pivot: names(&["pivot", "pivot_point", "orbit_center", "focus"]),
            look_at: names(&["look_at", "look_at_point", "look_target", "focus_point"]),
            follow_target: names(&["follow_target", "follow", "tracked", "target_entity"]),
        }
    }
}

impl RigFieldCandidates {
    /// Candidate names for `role`, in priority order.
    pub fn for_role(&self, role: FieldRole) -> &[String] {
        match role {
            FieldRole::CurrentPosition => &self.current_position,
            FieldRole::TargetPosition => &self.target_position,
            FieldRole::Pivot => &self.pivot,
            FieldRole::LookAt => &self.look_at,
            FieldRole::FollowTarget => &self.follow_target,
        }
    }
}

/// A resolved, writable field of the rig type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHandle {
    /// Index of the field in the rig struct.
    pub index: usize,
    /// Name the field was found under.
    pub name: String,
}

impl FieldHandle {
    fn field_mut<'a>(
        &self,
        rig: &'a mut dyn PartialReflect,
    ) -> Option<&'a mut dyn PartialReflect> {
        match rig.reflect_mut() {
            ReflectMut::Struct(rig) => rig.field_at_mut(self.index),
            _ => None,
        }
    }
}

/// The result of probing a rig type. Any role may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RigFieldHandles {
    /// The rig's current position, a [`Vec3`].
    pub current_position: Option<FieldHandle>,
    /// The position the rig is easing toward, a [`Vec3`].
    pub target_position: Option<FieldHandle>,
    /// The orbit pivot, a [`Vec3`].
    pub pivot: Option<FieldHandle>,
    /// The look-at point, a [`Vec3`].
    pub look_at: Option<FieldHandle>,
    /// The follow target, of any type.
    pub follow_target: Option<FieldHandle>,
}

impl RigFieldHandles {
    /// Probe `rig` for each role. Vector roles only accept [`Vec3`] fields, and a field is never
    /// handed to more than one role.
    pub fn resolve(rig: &dyn PartialReflect, candidates: &RigFieldCandidates) -> Self {
        let ReflectRef::Struct(rig) = rig.reflect_ref() else {
            warn_once!(
                "Camera rig {} is not a struct, its internal state can't be reconciled",
                rig.reflect_type_path()
            );
            return Self::default();
        };

        let index_of = |name: &str| (0..rig.field_len()).find(|&i| rig.name_at(i) == Some(name));

        let mut handles = Self::default();
        let mut claimed = Vec::new();
        for role in FieldRole::VECTORS {
            let handle = candidates.for_role(role).iter().find_map(|name| {
                let index = index_of(name).filter(|i| !claimed.contains(i))?;
                rig.field_at(index)?.try_downcast_ref::<Vec3>()?;
                Some(FieldHandle {
                    index,
                    name: name.clone(),
                })
            });
            if let Some(handle) = &handle {
                claimed.push(handle.index);
            }
            *handles.slot_mut(role) = handle;
        }

        handles.follow_target = candidates
            .for_role(FieldRole::FollowTarget)
            .iter()
            .find_map(|name| {
                let index = index_of(name).filter(|i| !claimed.contains(i))?;
                Some(FieldHandle {
                    index,
                    name: name.clone(),
                })
            });

        for role in FieldRole::VECTORS
            .into_iter()
            .chain([FieldRole::FollowTarget])
        {
            match handles.get(role) {
                Some(handle) => debug!("Rig field {role:?} resolved to `{}`", handle.name),
                None => debug!("Rig field {role:?} not found"),
            }
        }
        handles
    }

    /// The handle for `role`, if it resolved.
    pub fn get(&self, role: FieldRole) -> Option<&FieldHandle> {
        match role {
            FieldRole::CurrentPosition => self.current_position.as_ref(),
            FieldRole::TargetPosition => self.target_position.as_ref(),
            FieldRole::Pivot => self.pivot.as_ref(),
            FieldRole::LookAt => self.look_at.as_ref(),
            FieldRole::FollowTarget => self.follow_target.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: FieldRole) -> &mut Option<FieldHandle> {
        match role {
            FieldRole::CurrentPosition => &mut self.current_position,
            FieldRole::TargetPosition => &mut self.target_position,
            FieldRole::Pivot => &mut self.pivot,
            FieldRole::LookAt => &mut self.look_at,
            FieldRole::FollowTarget => &mut self.follow_target,
        }
    }

    /// Add `delta` to every resolved vector field. Returns how many fields moved.
    pub fn nudge(&self, rig: &mut dyn PartialReflect, delta: Vec3) -> usize {
        let mut moved = 0;
        for handle in FieldRole::VECTORS.into_iter().filter_map(|role| self.get(role)) {
            if let Some(field) = handle
                .field_mut(rig)
                .and_then(|field| field.try_downcast_mut::<Vec3>())
            {
                *field += delta;
                moved += 1;
            }
        }
        moved
    }

    /// Save the rig's follow target and detach it. Returns `None` if the rig has no follow
    /// target field.
    ///
    /// Detaching sets an `Option`-like field to its `None` variant. Fields that can't be cleared
    /// that way are left as they are, but are still saved so they can be restored.
    pub fn take_follow_target(
        &self,
        rig: &mut dyn PartialReflect,
    ) -> Option<Box<dyn PartialReflect>> {
        let handle = self.follow_target.as_ref()?;
        let field = handle.field_mut(rig)?;
        let saved = field.to_dynamic();
        if let Err(err) = field.try_apply(&DynamicEnum::new("None", DynamicVariant::Unit)) {
            warn_once!(
                "Follow target `{}` could not be detached, the rig may fight the pan: {err}",
                handle.name
            );
        }
        Some(saved)
    }

    /// Write a saved follow target back to the rig. Returns `true` if it was restored.
    pub fn restore_follow_target(
        &self,
        rig: &mut dyn PartialReflect,
        saved: &dyn PartialReflect,
    ) -> bool {
        let Some(handle) = self.follow_target.as_ref() else {
            return false;
        };
        let Some(field) = handle.field_mut(rig) else {
            return false;
        };
        match field.try_apply(saved) {
            Ok(()) => true,
            Err(err) => {
                warn!("Follow target `{}` could not be restored: {err}", handle.name);
                false
            }
        }
    }
}

/// Resolves and caches the [`RigFieldHandles`] of the rig type `R`.
///
/// Resolution happens once, the first time a rig is available. The result, including any
/// absent roles, is kept for the rest of the run.
#[derive(Resource)]
pub struct RigFieldLocator<R> {
    candidates: RigFieldCandidates,
    handles: Option<RigFieldHandles>,
    _rig: PhantomData<fn() -> R>,
}

impl<R> Default for RigFieldLocator<R> {
    fn default() -> Self {
        Self::new(RigFieldCandidates::default())
    }
}

impl<R> RigFieldLocator<R> {
    /// Create a locator that will probe using `candidates`.
    pub fn new(candidates: RigFieldCandidates) -> Self {
        Self {
            candidates,
            handles: None,
            _rig: PhantomData,
        }
    }

    /// The cached handles, if resolution has happened yet.
    pub fn resolved(&self) -> Option<&RigFieldHandles> {
        self.handles.as_ref()
    }
}

impl<R: PartialReflect> RigFieldLocator<R> {
    /// The handles for `R`, resolving them from `rig` on first use.
    pub fn handles(&mut self, rig: &R) -> &RigFieldHandles {
        let candidates = &self.candidates;
        self.handles
            .get_or_insert_with(|| RigFieldHandles::resolve(rig, candidates))
    }
}
