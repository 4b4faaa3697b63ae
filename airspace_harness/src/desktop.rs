// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simulated window manager.
//!
//! [`SimDesktop`] keeps a global front-to-back stacking order, per-window
//! state, a log of every native call the engine made, and an outbox of
//! notifications the real window manager would have sent. It models what
//! the engine relies on and nothing more: owned windows are not dragged
//! along when their owner is restacked, and clients have no chrome.

use std::collections::{BTreeMap, VecDeque};

use airspace_core::geometry::PixelRect;
use airspace_core::id::{ContentId, SurfaceId};
use airspace_core::native::{MessageKind, NativeWindows};
use kurbo::Rect;

/// One call the engine issued through [`NativeWindows`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeCall {
    /// An overlay was created.
    CreateOverlay {
        /// The new surface.
        surface: SurfaceId,
        /// Initial bounds.
        bounds: PixelRect,
    },
    /// An overlay was destroyed.
    DestroyOverlay(SurfaceId),
    /// A surface was moved or resized.
    SetBounds {
        /// The surface.
        surface: SurfaceId,
        /// New bounds.
        bounds: PixelRect,
    },
    /// A surface was shown or hidden.
    SetVisible {
        /// The surface.
        surface: SurfaceId,
        /// New visibility.
        visible: bool,
    },
    /// A surface's owner was set or cleared.
    SetOwner {
        /// The owned surface.
        surface: SurfaceId,
        /// The new owner.
        owner: Option<SurfaceId>,
    },
    /// Overlay content was mounted or cleared.
    SetContent {
        /// The overlay.
        surface: SurfaceId,
        /// The content.
        content: Option<ContentId>,
    },
    /// A surface was restacked.
    PlaceBelow {
        /// The surface that moved.
        surface: SurfaceId,
        /// The surface it now sits behind.
        above: SurfaceId,
    },
    /// Notifications were requested for a surface.
    Watch(SurfaceId),
    /// Notifications were released for a surface.
    Unwatch(SurfaceId),
}

/// State of one simulated window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimWindow {
    /// Screen bounds (equal to the client area).
    pub bounds: PixelRect,
    /// Whether the window is shown.
    pub visible: bool,
    /// The owning window.
    pub owner: Option<SurfaceId>,
    /// Mounted overlay content.
    pub content: Option<ContentId>,
    /// Whether the engine created this window.
    pub overlay: bool,
}

/// A simulated desktop implementing [`NativeWindows`].
#[derive(Debug, Default)]
pub struct SimDesktop {
    windows: BTreeMap<SurfaceId, SimWindow>,
    /// Front to back.
    z_order: Vec<SurfaceId>,
    calls: Vec<NativeCall>,
    watched: BTreeMap<SurfaceId, usize>,
    outbox: VecDeque<(SurfaceId, MessageKind)>,
    next_id: u64,
}

impl SimDesktop {
    /// Creates an empty desktop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a visible top-level window at the front of the stacking order.
    pub fn create_top_level(&mut self, bounds: PixelRect) -> SurfaceId {
        self.open(bounds, true, false)
    }

    /// Moves or resizes a window as the user would.
    pub fn move_window(&mut self, surface: SurfaceId, bounds: PixelRect) {
        if let Some(window) = self.windows.get_mut(&surface) {
            window.bounds = bounds;
            self.notify(surface, MessageKind::PositionChanged);
        }
    }

    /// Brings a window to the front and activates it, as a click would.
    pub fn activate(&mut self, surface: SurfaceId) {
        if !self.windows.contains_key(&surface) {
            return;
        }
        self.z_order.retain(|s| *s != surface);
        self.z_order.insert(0, surface);
        self.notify(surface, MessageKind::PositionChanged);
        if self.is_overlay(surface) {
            self.outbox.push_back((surface, MessageKind::Activated));
        }
    }

    /// Replaces the stacking order. Windows not listed keep their relative
    /// order behind the listed ones.
    pub fn set_z_order(&mut self, front_to_back: &[SurfaceId]) {
        let rest: Vec<_> = self
            .z_order
            .iter()
            .copied()
            .filter(|s| !front_to_back.contains(s))
            .collect();
        self.z_order = front_to_back.to_vec();
        self.z_order.extend(rest);
    }

    /// The stacking order, front to back.
    #[must_use]
    pub fn z_order(&self) -> &[SurfaceId] {
        &self.z_order
    }

    /// State of one window.
    #[must_use]
    pub fn window(&self, surface: SurfaceId) -> Option<&SimWindow> {
        self.windows.get(&surface)
    }

    /// Whether the engine created `surface`.
    #[must_use]
    pub fn is_overlay(&self, surface: SurfaceId) -> bool {
        self.windows.get(&surface).is_some_and(|w| w.overlay)
    }

    /// Live overlays, in creation order.
    #[must_use]
    pub fn overlays(&self) -> Vec<SurfaceId> {
        self.windows
            .iter()
            .filter_map(|(s, w)| w.overlay.then_some(*s))
            .collect()
    }

    /// Whether notifications are being delivered for `surface`.
    #[must_use]
    pub fn is_watched(&self, surface: SurfaceId) -> bool {
        self.watched.contains_key(&surface)
    }

    /// Every native call since the last [`take_calls`](Self::take_calls).
    #[must_use]
    pub fn calls(&self) -> &[NativeCall] {
        &self.calls
    }

    /// Returns and clears the call log.
    pub fn take_calls(&mut self) -> Vec<NativeCall> {
        std::mem::take(&mut self.calls)
    }

    /// Counts logged calls matching `pred`.
    #[must_use]
    pub fn count_calls(&self, pred: impl Fn(&NativeCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Drains pending notifications in delivery order.
    pub fn drain_messages(&mut self) -> impl Iterator<Item = (SurfaceId, MessageKind)> + '_ {
        self.outbox.drain(..)
    }

    fn open(&mut self, bounds: PixelRect, visible: bool, overlay: bool) -> SurfaceId {
        self.next_id += 1;
        let surface = SurfaceId(0x1000 + self.next_id);
        self.windows.insert(
            surface,
            SimWindow {
                bounds,
                visible,
                owner: None,
                content: None,
                overlay,
            },
        );
        self.z_order.insert(0, surface);
        surface
    }

    /// Queues a notification if anyone listens for it.
    fn notify(&mut self, surface: SurfaceId, kind: MessageKind) {
        if self.is_watched(surface) {
            self.outbox.push_back((surface, kind));
        }
    }
}

impl NativeWindows for SimDesktop {
    fn create_overlay(&mut self, bounds: PixelRect) -> SurfaceId {
        let surface = self.open(bounds, false, true);
        self.calls.push(NativeCall::CreateOverlay { surface, bounds });
        surface
    }

    fn destroy_overlay(&mut self, surface: SurfaceId) {
        self.calls.push(NativeCall::DestroyOverlay(surface));
        self.windows.remove(&surface);
        self.z_order.retain(|s| *s != surface);
        self.watched.remove(&surface);
        self.outbox.retain(|(s, _)| *s != surface);
    }

    fn set_bounds(&mut self, surface: SurfaceId, bounds: PixelRect) {
        self.calls.push(NativeCall::SetBounds { surface, bounds });
        if let Some(window) = self.windows.get_mut(&surface) {
            window.bounds = bounds;
            self.notify(surface, MessageKind::PositionChanged);
        }
    }

    fn set_visible(&mut self, surface: SurfaceId, visible: bool) {
        self.calls.push(NativeCall::SetVisible { surface, visible });
        if let Some(window) = self.windows.get_mut(&surface) {
            window.visible = visible;
        }
    }

    fn set_owner(&mut self, surface: SurfaceId, owner: Option<SurfaceId>) {
        self.calls.push(NativeCall::SetOwner { surface, owner });
        if let Some(window) = self.windows.get_mut(&surface) {
            window.owner = owner;
        }
    }

    fn set_content(&mut self, surface: SurfaceId, content: Option<ContentId>) {
        self.calls.push(NativeCall::SetContent { surface, content });
        if let Some(window) = self.windows.get_mut(&surface) {
            window.content = content;
        }
    }

    fn surface_above(&self, surface: SurfaceId) -> Option<SurfaceId> {
        let pos = self.z_order.iter().position(|s| *s == surface)?;
        pos.checked_sub(1).map(|i| self.z_order[i])
    }

    fn place_below(&mut self, surface: SurfaceId, above: SurfaceId) {
        self.calls.push(NativeCall::PlaceBelow { surface, above });
        if surface == above || !self.z_order.contains(&surface) || !self.z_order.contains(&above)
        {
            return;
        }
        self.z_order.retain(|s| *s != surface);
        if let Some(pos) = self.z_order.iter().position(|s| *s == above) {
            self.z_order.insert(pos + 1, surface);
        }
        self.notify(surface, MessageKind::PositionChanged);
    }

    fn client_bounds_on_screen(&self, surface: SurfaceId) -> Option<Rect> {
        self.windows.get(&surface).map(|w| w.bounds.to_rect())
    }

    fn watch(&mut self, surface: SurfaceId) {
        self.calls.push(NativeCall::Watch(surface));
        *self.watched.entry(surface).or_insert(0) += 1;
    }

    fn unwatch(&mut self, surface: SurfaceId) {
        self.calls.push(NativeCall::Unwatch(surface));
        if let Some(count) = self.watched.get_mut(&surface) {
            *count -= 1;
            if *count == 0 {
                self.watched.remove(&surface);
            }
        }
    }
}
