// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adorner groups and the z-order band protocol.
//!
//! An [`AdornerGroup`] collects the adorners that share one owning surface.
//! While the group is owned, every member is linked to the owner through the
//! native owned-by relation and stacked in a contiguous band directly in
//! front of the owner:
//!
//! ```text
//!   front   ┌────────────────────┐
//!           │ previous neighbour │
//!           ├────────────────────┤ ◄─┐
//!           │ member 1           │   │
//!           │ member 2           │   │ band
//!           │ ...                │   │
//!           │ owner              │ ◄─┘
//!           ├────────────────────┤
//!   back    │ everything else    │
//!           └────────────────────┘
//! ```
//!
//! [`place_band`] builds the band from scratch; [`clamp_into_band`] restores
//! it after the window manager has pulled a single member forward on
//! activation.

use alloc::vec::Vec;

use crate::connection::{ConnectionFilter, SurfaceConnection};
use crate::id::{AdornerId, NodeId, SurfaceId};
use crate::native::NativeWindows;
use crate::trace::Tracer;

/// Membership and ownership state for one group.
#[derive(Debug)]
pub(crate) struct AdornerGroup {
    /// Members in insertion order.
    pub(crate) members: Vec<AdornerId>,
    pub(crate) connection: SurfaceConnection,
    /// The owning surface while owned.
    pub(crate) owner: Option<SurfaceId>,
}

impl AdornerGroup {
    pub(crate) fn new(anchor: NodeId, filter: ConnectionFilter) -> Self {
        Self {
            members: Vec::new(),
            connection: SurfaceConnection::new(anchor, filter),
            owner: None,
        }
    }

    pub(crate) fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Inserts `adorner` unless it is already a member.
    pub(crate) fn insert(&mut self, adorner: AdornerId) -> bool {
        if self.members.contains(&adorner) {
            return false;
        }
        self.members.push(adorner);
        true
    }

    pub(crate) fn remove(&mut self, adorner: AdornerId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != adorner);
        self.members.len() != before
    }
}

/// Restacks `surface` directly behind `above`, skipping no-op moves.
pub(crate) fn restack(
    windows: &mut dyn NativeWindows,
    tracer: &mut Tracer,
    surface: SurfaceId,
    above: SurfaceId,
) {
    if surface == above || windows.surface_above(surface) == Some(above) {
        return;
    }
    windows.place_below(surface, above);
    tracer.restack(surface, above);
}

/// Stacks `members` directly in front of `owner`, first member front-most.
///
/// Surfaces outside the band keep their relative order. If the owner is the
/// front-most surface, the owner is moved behind the first member instead of
/// moving the members.
pub(crate) fn place_band(
    windows: &mut dyn NativeWindows,
    tracer: &mut Tracer,
    owner: SurfaceId,
    members: &[SurfaceId],
) {
    let Some(&first) = members.first() else {
        return;
    };
    let mut above = match windows.surface_above(owner) {
        Some(above) => above,
        None => {
            restack(windows, tracer, owner, first);
            first
        }
    };
    for &member in members {
        restack(windows, tracer, member, above);
        above = member;
    }
}

/// Brings `target` to the front of its group's band without letting it
/// escape in front of a foreign surface.
///
/// Walks forward from `owner` over group members. If a foreign surface is
/// found, `target` is placed directly behind it and that surface is
/// returned. If the walk reaches the front of the stacking order, the
/// front-most band surface is placed behind `target` instead.
pub(crate) fn clamp_into_band(
    windows: &mut dyn NativeWindows,
    tracer: &mut Tracer,
    owner: SurfaceId,
    target: SurfaceId,
    is_member: impl Fn(SurfaceId) -> bool,
) -> Option<SurfaceId> {
    let mut current = owner;
    let mut above = windows.surface_above(current);
    while let Some(next) = above.filter(|s| is_member(*s)) {
        current = next;
        above = windows.surface_above(current);
    }
    match above {
        Some(foreign) => {
            restack(windows, tracer, target, foreign);
            Some(foreign)
        }
        None => {
            restack(windows, tracer, current, target);
            None
        }
    }
}
