// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene-graph collaborator interface.
//!
//! The engine never owns the scene graph. It reads layout, visibility and
//! surface association through [`SceneView`], and it is told about changes
//! through [`SceneEvent`]s that the integration layer forwards to
//! [`Airspace::handle_scene_event`](crate::Airspace::handle_scene_event).

use kurbo::{Affine, Size};

use crate::id::{NodeId, SurfaceId};

/// What kind of scene root hosts a native surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootKind {
    /// A top-level application window.
    Window,
    /// Any other root container (popups, embedded sources, overlays).
    Other,
}

/// The native surface a scene node is currently presented through.
///
/// This is the scene-side view of an "owning surface": which native window
/// draws the node, which node is the root of that window's visual tree, and
/// how root coordinates map to device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSource {
    /// The native surface.
    pub surface: SurfaceId,
    /// The root node of the surface's visual tree.
    pub root: NodeId,
    /// What kind of root container the surface is.
    pub kind: RootKind,
    /// Root-space to device-pixel transform (DPI scale).
    pub device_transform: Affine,
}

/// Read-only queries the engine issues against the scene graph.
pub trait SceneView {
    /// Returns the visual parent of `node`.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the transform from `node`'s local space to its parent's space,
    /// including the layout offset.
    fn transform(&self, node: NodeId) -> Affine;

    /// Returns the arranged size of `node`.
    fn render_size(&self, node: NodeId) -> Size;

    /// Returns whether `node` is connected to a presentation surface.
    fn is_loaded(&self, node: NodeId) -> bool;

    /// Returns whether `node` is effectively visible (loaded, and neither it
    /// nor any ancestor is hidden).
    fn is_visible(&self, node: NodeId) -> bool;

    /// Returns the surface `node` is currently presented through.
    fn source(&self, node: NodeId) -> Option<SurfaceSource>;
}

/// A change notification from the scene graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEvent {
    /// `node` became connected to a presentation surface.
    Loaded(NodeId),
    /// `node` lost its presentation surface.
    Unloaded(NodeId),
    /// The effective visibility of `node` flipped.
    VisibilityChanged(NodeId),
    /// A layout pass completed somewhere in the scene.
    LayoutUpdated,
    /// The surface `node` is presented through changed.
    SurfaceChanged {
        /// The affected node.
        node: NodeId,
        /// The previous surface, if any.
        old: Option<SurfaceSource>,
        /// The new surface, if any.
        new: Option<SurfaceSource>,
    },
}
