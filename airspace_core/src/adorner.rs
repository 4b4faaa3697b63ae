// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating overlay surfaces bound to scene nodes.
//!
//! An [`Adorner`] owns at most one native overlay surface. The surface exists
//! only while the anchor node is loaded; the adorner itself persists across
//! load/unload cycles and recreates the surface on the next load.
//!
//! Placement is derived from two rectangles:
//!
//! - the **owner bounds**: the owning surface's client area on screen, pushed
//!   in by the adorner's group whenever the owner moves;
//! - the **local bounds**: the anchor's arranged rectangle in the owner's
//!   client space, recomputed after each layout pass.
//!
//! A native reposition is issued only when the resulting pixel rectangle
//! differs from the one last sent.

use kurbo::Rect;

use crate::geometry::PixelRect;
use crate::id::{AdornerId, ContentId, GroupId, NodeId, SurfaceId};
use crate::native::NativeWindows;
use crate::trace::{AdornerMovedEvent, AdornerVisibilityEvent, Tracer};

/// Lifecycle state of an adorner's native surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdornerState {
    /// No native surface (anchor not loaded).
    Detached,
    /// The surface exists but is hidden.
    AttachedHidden,
    /// The surface exists and is shown.
    AttachedShown,
}

/// One overlay surface anchored to one scene node.
#[derive(Debug)]
pub(crate) struct Adorner {
    pub(crate) anchor: NodeId,
    pub(crate) content: Option<ContentId>,
    /// Explicit group supplied at construction.
    pub(crate) context: Option<GroupId>,
    /// Singleton group created on demand when no context group is usable.
    pub(crate) own_group: Option<GroupId>,
    /// The group this adorner is currently a member of.
    pub(crate) group: Option<GroupId>,
    surface: Option<SurfaceId>,
    shown: bool,
    owner_bounds: Option<Rect>,
    local_bounds: Rect,
    placed: Option<PixelRect>,
}

impl Adorner {
    pub(crate) fn new(anchor: NodeId, context: Option<GroupId>) -> Self {
        Self {
            anchor,
            content: None,
            context,
            own_group: None,
            group: None,
            surface: None,
            shown: false,
            owner_bounds: None,
            local_bounds: Rect::ZERO,
            placed: None,
        }
    }

    pub(crate) fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub(crate) fn state(&self) -> AdornerState {
        match (self.surface, self.shown) {
            (None, _) => AdornerState::Detached,
            (Some(_), false) => AdornerState::AttachedHidden,
            (Some(_), true) => AdornerState::AttachedShown,
        }
    }

    /// Screen rectangle for the native surface.
    ///
    /// The size is clamped to what remains of the owner's client area to the
    /// right of and below the anchor. Without known owner bounds the local
    /// rectangle is used as is.
    pub(crate) fn absolute_bounds(&self) -> PixelRect {
        let local = self.local_bounds;
        let Some(owner) = self.owner_bounds else {
            return PixelRect::truncate(local.x0, local.y0, local.width(), local.height());
        };
        let width = local.width().min(owner.width() - local.x0).max(0.0);
        let height = local.height().min(owner.height() - local.y0).max(0.0);
        PixelRect::truncate(owner.x0 + local.x0, owner.y0 + local.y0, width, height)
    }

    /// Creates the native surface if it does not exist yet and mounts the
    /// content. New surfaces start hidden.
    pub(crate) fn create_surface(&mut self, windows: &mut dyn NativeWindows) -> SurfaceId {
        if let Some(surface) = self.surface {
            return surface;
        }
        let bounds = self.absolute_bounds();
        let surface = windows.create_overlay(bounds);
        windows.set_content(surface, self.content);
        self.surface = Some(surface);
        self.placed = Some(bounds);
        self.shown = false;
        surface
    }

    /// Unmounts the content and destroys the native surface.
    pub(crate) fn destroy_surface(
        &mut self,
        windows: &mut dyn NativeWindows,
    ) -> Option<SurfaceId> {
        let surface = self.surface.take()?;
        windows.set_content(surface, None);
        windows.destroy_overlay(surface);
        self.placed = None;
        self.shown = false;
        Some(surface)
    }

    pub(crate) fn set_content(
        &mut self,
        windows: &mut dyn NativeWindows,
        content: Option<ContentId>,
    ) {
        self.content = content;
        if let Some(surface) = self.surface {
            windows.set_content(surface, content);
        }
    }

    /// Shows or hides the surface so that it matches `needs_to_appear`.
    ///
    /// Visibility changes never move, resize, activate or restack.
    pub(crate) fn invalidate_appearance(
        &mut self,
        id: AdornerId,
        needs_to_appear: bool,
        windows: &mut dyn NativeWindows,
        tracer: &mut Tracer,
    ) {
        let Some(surface) = self.surface else {
            return;
        };
        if needs_to_appear == self.shown {
            return;
        }
        windows.set_visible(surface, needs_to_appear);
        self.shown = needs_to_appear;
        tracer.adorner_visibility(&AdornerVisibilityEvent {
            adorner: id,
            shown: needs_to_appear,
        });
    }

    pub(crate) fn update_owner_bounds(
        &mut self,
        id: AdornerId,
        owner: Option<Rect>,
        windows: &mut dyn NativeWindows,
        tracer: &mut Tracer,
    ) {
        if self.owner_bounds != owner {
            self.owner_bounds = owner;
            self.reposition(id, windows, tracer);
        }
    }

    pub(crate) fn update_local_bounds(
        &mut self,
        id: AdornerId,
        local: Rect,
        windows: &mut dyn NativeWindows,
        tracer: &mut Tracer,
    ) {
        if self.local_bounds != local {
            self.local_bounds = local;
            self.reposition(id, windows, tracer);
        }
    }

    fn reposition(&mut self, id: AdornerId, windows: &mut dyn NativeWindows, tracer: &mut Tracer) {
        let Some(surface) = self.surface else {
            return;
        };
        let bounds = self.absolute_bounds();
        if self.placed == Some(bounds) {
            return;
        }
        windows.set_bounds(surface, bounds);
        self.placed = Some(bounds);
        tracer.adorner_moved(&AdornerMovedEvent {
            adorner: id,
            bounds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SlotKey;

    fn adorner(local: Rect, owner: Option<Rect>) -> Adorner {
        let mut a = Adorner::new(NodeId::new(0, 0), None);
        a.local_bounds = local;
        a.owner_bounds = owner;
        a
    }

    #[test]
    fn offsets_by_owner_origin() {
        let a = adorner(
            Rect::new(10.0, 20.0, 60.0, 50.0),
            Some(Rect::new(100.0, 200.0, 900.0, 800.0)),
        );
        assert_eq!(a.absolute_bounds(), PixelRect::new(110, 220, 50, 30));
    }

    #[test]
    fn clamps_to_owner_client_area() {
        let a = adorner(
            Rect::new(80.0, 90.0, 180.0, 190.0),
            Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
        );
        assert_eq!(a.absolute_bounds(), PixelRect::new(80, 90, 20, 10));
    }

    #[test]
    fn clamp_never_goes_negative() {
        let a = adorner(
            Rect::new(150.0, 0.0, 200.0, 10.0),
            Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
        );
        assert_eq!(a.absolute_bounds().width, 0);
    }

    #[test]
    fn unknown_owner_uses_local_rect() {
        let a = adorner(Rect::new(1.9, 2.9, 11.9, 12.9), None);
        assert_eq!(a.absolute_bounds(), PixelRect::new(1, 2, 10, 10));
    }

    #[test]
    fn detached_adorner_reports_detached() {
        let mut a = adorner(Rect::ZERO, None);
        assert_eq!(a.state(), AdornerState::Detached);
        let mut tracer = Tracer::none();
        struct Unreachable;
        impl NativeWindows for Unreachable {
            fn create_overlay(&mut self, _: PixelRect) -> SurfaceId {
                unreachable!()
            }
            fn destroy_overlay(&mut self, _: SurfaceId) {
                unreachable!()
            }
            fn set_bounds(&mut self, _: SurfaceId, _: PixelRect) {
                unreachable!()
            }
            fn set_visible(&mut self, _: SurfaceId, _: bool) {
                unreachable!()
            }
            fn set_owner(&mut self, _: SurfaceId, _: Option<SurfaceId>) {
                unreachable!()
            }
            fn set_content(&mut self, _: SurfaceId, _: Option<ContentId>) {
                unreachable!()
            }
            fn surface_above(&self, _: SurfaceId) -> Option<SurfaceId> {
                unreachable!()
            }
            fn place_below(&mut self, _: SurfaceId, _: SurfaceId) {
                unreachable!()
            }
            fn client_bounds_on_screen(&self, _: SurfaceId) -> Option<Rect> {
                unreachable!()
            }
            fn watch(&mut self, _: SurfaceId) {
                unreachable!()
            }
            fn unwatch(&mut self, _: SurfaceId) {
                unreachable!()
            }
        }
        // Without a surface nothing reaches the native layer.
        let id = AdornerId::from_parts(0, 0);
        a.invalidate_appearance(id, true, &mut Unreachable, &mut tracer);
        a.update_local_bounds(
            id,
            Rect::new(0.0, 0.0, 5.0, 5.0),
            &mut Unreachable,
            &mut tracer,
        );
        assert_eq!(a.state(), AdornerState::Detached);
        assert_eq!(a.destroy_surface(&mut Unreachable), None);
    }
}
