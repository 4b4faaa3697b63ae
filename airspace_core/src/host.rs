// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Embedded native regions sharing one container.
//!
//! A *holder* wraps one embedded native surface laid out by the scene. A
//! [`HostGroup`] coordinates the holders of one container so that collapsing
//! them (shrinking each to a zero-size point) and expanding them back happens
//! in a deterministic order: nearest a stable corner first.
//!
//! Collapse passes are ordered from the bottom-right corner of the union of
//! all holders' latest bounds, comparing each holder's own bottom-right
//! corner. Expand passes mirror this from the top-left.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::geometry::PixelRect;
use crate::id::{HolderId, NodeId, SurfaceId};
use crate::native::NativeWindows;

/// An embedded native region that a [`HostGroup`] can collapse and expand.
pub trait HostHolder {
    /// Shrinks the region to a zero-size rectangle at its latest origin.
    ///
    /// With `freeze_bounds`, later bounds reports are recorded but not
    /// applied until the region is expanded.
    fn collapse(&mut self, windows: &mut dyn NativeWindows, freeze_bounds: bool);

    /// Stops applying bounds reports without moving the region.
    fn freeze_bounds(&mut self);

    /// Restores the region to its latest bounds and resumes applying
    /// bounds reports.
    fn expand(&mut self, windows: &mut dyn NativeWindows);

    /// Records a new layout rectangle for the region, applying it unless
    /// bounds are frozen.
    fn report_bounds(&mut self, windows: &mut dyn NativeWindows, bounds: Rect);

    /// The most recently reported layout rectangle.
    fn latest_bounds(&self) -> Rect;

    /// The rectangle captured by the last freeze.
    fn frozen_bounds(&self) -> Rect;
}

/// A [`HostHolder`] that places one native surface.
///
/// Layout rectangles are converted to pixels by rounding each edge half away
/// from zero.
#[derive(Clone, Debug, PartialEq)]
pub struct HostedRegion {
    surface: SurfaceId,
    latest: Rect,
    frozen: Rect,
    bounds_frozen: bool,
}

impl HostedRegion {
    /// Creates a holder for `surface` with empty bounds.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            latest: Rect::ZERO,
            frozen: Rect::ZERO,
            bounds_frozen: false,
        }
    }

    /// The hosted surface.
    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Whether bounds reports are currently withheld.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.bounds_frozen
    }

    /// Unfreezes without moving; the next bounds report is applied.
    pub fn expand_on_next_reposition(&mut self) {
        self.bounds_frozen = false;
    }

    fn place(&self, windows: &mut dyn NativeWindows, rect: Rect) {
        windows.set_bounds(self.surface, PixelRect::round(rect));
    }
}

impl HostHolder for HostedRegion {
    fn collapse(&mut self, windows: &mut dyn NativeWindows, freeze_bounds: bool) {
        if self.bounds_frozen {
            return;
        }
        if freeze_bounds {
            self.freeze_bounds();
        }
        let origin = self.latest.origin();
        self.place(windows, Rect::from_points(origin, origin));
    }

    fn freeze_bounds(&mut self) {
        self.bounds_frozen = true;
        self.frozen = self.latest;
    }

    fn expand(&mut self, windows: &mut dyn NativeWindows) {
        self.bounds_frozen = false;
        self.place(windows, self.latest);
    }

    fn report_bounds(&mut self, windows: &mut dyn NativeWindows, bounds: Rect) {
        self.latest = bounds;
        if !self.bounds_frozen {
            self.place(windows, bounds);
        }
    }

    fn latest_bounds(&self) -> Rect {
        self.latest
    }

    fn frozen_bounds(&self) -> Rect {
        self.frozen
    }
}

/// Which corner orders a host pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Corner {
    TopLeft,
    BottomRight,
}

impl Corner {
    fn of(self, rect: Rect) -> Point {
        match self {
            Self::TopLeft => Point::new(rect.x0, rect.y0),
            Self::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// The holders of one container.
#[derive(Debug)]
pub(crate) struct HostGroup {
    pub(crate) container: NodeId,
    /// Holders in insertion order.
    pub(crate) holders: Vec<HolderId>,
    /// An asynchronous expand pass is queued and has not run yet.
    pub(crate) expand_scheduled: bool,
}

impl HostGroup {
    pub(crate) fn new(container: NodeId) -> Self {
        Self {
            container,
            holders: Vec::new(),
            expand_scheduled: false,
        }
    }
}

/// Orders `holders` by ascending distance between each holder's `corner` and
/// the same corner of the union of all bounds. Ties keep input order.
pub(crate) fn pass_order(holders: &[(HolderId, Rect)], corner: Corner) -> Vec<HolderId> {
    let Some(union) = holders
        .iter()
        .map(|(_, bounds)| *bounds)
        .reduce(|acc, r| acc.union(r))
    else {
        return Vec::new();
    };
    let reference = corner.of(union);
    let mut keyed: Vec<(f64, HolderId)> = holders
        .iter()
        .map(|(id, bounds)| (corner.of(*bounds).distance(reference), *id))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, id)| id).collect()
}
