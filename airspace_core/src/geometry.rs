// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate mapping from scene space to native pixel space.
//!
//! A node's layout rectangle reaches the native window manager in two steps:
//!
//! 1. **Node to root**: compose the node-to-parent transforms of the node
//!    and each ancestor below the surface root.
//! 2. **Root to client**: apply the root's own transform (including its
//!    offset), then the surface's device (DPI) transform.
//!
//! The result is in the owning surface's client space. [`PixelRect`] carries
//! it across the native boundary as integers.

use kurbo::{Affine, Rect};

use crate::id::NodeId;
use crate::scene::{SceneView, SurfaceSource};

/// An integer rectangle in native pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl PixelRect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its origin and size.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Converts origin and size by truncating toward zero.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "native pixel coordinates are i32; float-to-int casts saturate"
    )]
    pub fn truncate(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x as i32, y as i32, width as i32, height as i32)
    }

    /// Converts `rect` by rounding each edge half away from zero.
    #[must_use]
    pub fn round(rect: Rect) -> Self {
        let left = round_half_away(rect.x0);
        let top = round_half_away(rect.y0);
        let right = round_half_away(rect.x1);
        let bottom = round_half_away(rect.y1);
        Self::new(left, top, right - left, bottom - top)
    }

    /// Converts back to a floating-point rectangle.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x) + f64::from(self.width),
            f64::from(self.y) + f64::from(self.height),
        )
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "native pixel coordinates are i32; float-to-int casts saturate"
)]
fn round_half_away(v: f64) -> i32 {
    if v > 0.0 {
        (v + 0.5) as i32
    } else {
        (v - 0.5) as i32
    }
}

/// Transforms an axis-aligned `Rect` by an `Affine` and returns its
/// axis-aligned bounding box.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}

/// Maps `rect` from `node`'s local space to the space of `root`.
///
/// Returns `None` if `root` is not an ancestor-or-self of `node`.
#[must_use]
pub fn node_to_root(
    scene: &dyn SceneView,
    node: NodeId,
    root: NodeId,
    rect: Rect,
) -> Option<Rect> {
    let mut acc = Affine::IDENTITY;
    let mut current = node;
    while current != root {
        acc = scene.transform(current) * acc;
        current = scene.parent(current)?;
    }
    Some(transform_rect_bbox(acc, rect))
}

/// Maps `rect` from root space to the client space of `source`'s surface.
#[must_use]
pub fn root_to_client(scene: &dyn SceneView, source: &SurfaceSource, rect: Rect) -> Rect {
    let root = scene.transform(source.root);
    transform_rect_bbox(source.device_transform * root, rect)
}

/// Maps `rect` from `node`'s local space to its owning surface's client
/// space.
///
/// If `node` is not presented through any surface the input is returned
/// unchanged; callers that care should check
/// [`SceneView::source`] first.
#[must_use]
pub fn node_to_client(scene: &dyn SceneView, node: NodeId, rect: Rect) -> Rect {
    let Some(source) = scene.source(node) else {
        return rect;
    };
    match node_to_root(scene, node, source.root, rect) {
        Some(root_rect) => root_to_client(scene, &source, root_rect),
        None => rect,
    }
}

/// Returns `node`'s arranged bounds in its owning surface's client space,
/// or `None` if it is not presented through any surface.
#[must_use]
pub fn client_bounds(scene: &dyn SceneView, node: NodeId) -> Option<Rect> {
    let source = scene.source(node)?;
    let local = Rect::from_origin_size((0.0, 0.0), scene.render_size(node));
    let root_rect = node_to_root(scene, node, source.root, local)?;
    Some(root_to_client(scene, &source, root_rect))
}
