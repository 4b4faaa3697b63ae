// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native windowing contract.
//!
//! The engine drives foreign surfaces through [`NativeWindows`], a small set
//! of window-manager primitives that every backend provides:
//!
//! - **Overlay lifecycle**: borderless, non-activating, per-pixel-transparent
//!   surfaces created and destroyed on demand.
//! - **Placement**: move/resize without activation, z-order or owner
//!   changes, applied asynchronously so consecutive calls coalesce.
//! - **Visibility**: show/hide without moving, resizing, activating or
//!   restacking.
//! - **Ownership**: the OS-level "owned-by" link between two surfaces.
//! - **Stacking**: query the next surface toward the front, and restack a
//!   surface directly behind a named neighbour.
//! - **Notifications**: start/stop delivering [`NativeMessage`]s for a
//!   surface the engine did not create.
//!
//! Native calls are treated as always succeeding. A backend that observes a
//! failure has nothing useful to report back to the engine, which never
//! retries.

use kurbo::Rect;

use crate::geometry::PixelRect;
use crate::id::{ContentId, SurfaceId};

/// Window-manager primitives consumed by the engine.
///
/// All methods are called from the single thread that owns the
/// [`Airspace`](crate::Airspace).
pub trait NativeWindows {
    /// Creates a hidden overlay surface at `bounds` (screen pixels).
    fn create_overlay(&mut self, bounds: PixelRect) -> SurfaceId;

    /// Destroys an overlay created by [`create_overlay`](Self::create_overlay).
    fn destroy_overlay(&mut self, surface: SurfaceId);

    /// Moves and resizes `surface` without activating it or touching its
    /// z-order or its owner's z-order.
    fn set_bounds(&mut self, surface: SurfaceId, bounds: PixelRect);

    /// Shows or hides `surface` without moving, resizing, activating or
    /// restacking it.
    fn set_visible(&mut self, surface: SurfaceId, visible: bool);

    /// Sets or clears the owner of `surface`.
    fn set_owner(&mut self, surface: SurfaceId, owner: Option<SurfaceId>);

    /// Presents `content` inside the overlay `surface`, or clears it.
    fn set_content(&mut self, surface: SurfaceId, content: Option<ContentId>);

    /// Returns the surface immediately in front of `surface` in the global
    /// stacking order, or `None` if `surface` is front-most.
    fn surface_above(&self, surface: SurfaceId) -> Option<SurfaceId>;

    /// Restacks `surface` so it sits immediately behind `above`, without
    /// moving, resizing or activating either surface.
    fn place_below(&mut self, surface: SurfaceId, above: SurfaceId);

    /// Returns the client area of `surface` in screen coordinates.
    fn client_bounds_on_screen(&self, surface: SurfaceId) -> Option<Rect>;

    /// Starts delivering position and activation messages for `surface`.
    ///
    /// Calls nest: several groups may watch the same owner, and delivery
    /// stops only after the matching number of [`unwatch`](Self::unwatch)
    /// calls.
    fn watch(&mut self, surface: SurfaceId);

    /// Releases one [`watch`](Self::watch) on `surface`.
    fn unwatch(&mut self, surface: SurfaceId);
}

/// Minimum and maximum tracking sizes reported during a min/max query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinMaxInfo {
    /// Smallest size the user (or the engine) may resize the surface to.
    pub min_track: (i32, i32),
    /// Largest trackable size.
    pub max_track: (i32, i32),
}

/// A native notification for one surface.
#[derive(Debug, PartialEq, Eq)]
pub enum NativeMessage<'a> {
    /// The surface was activated by the window manager.
    Activated,
    /// The surface moved, resized or restacked.
    PositionChanged,
    /// The window manager is asking for tracking limits. Handlers may edit
    /// the limits in place.
    MinMaxQuery(&'a mut MinMaxInfo),
}

/// The payload-free kind of a [`NativeMessage`], for queueing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// See [`NativeMessage::Activated`].
    Activated,
    /// See [`NativeMessage::PositionChanged`].
    PositionChanged,
}

impl MessageKind {
    /// Builds the corresponding [`NativeMessage`].
    #[must_use]
    pub fn message(self) -> NativeMessage<'static> {
        match self {
            Self::Activated => NativeMessage::Activated,
            Self::PositionChanged => NativeMessage::PositionChanged,
        }
    }
}
