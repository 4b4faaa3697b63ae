// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracking which native surface a scene node is presented through.
//!
//! A [`SurfaceConnection`] watches one anchor node. While activated it turns
//! the node's surface association into a stream of [`ConnectionEvent`]s:
//! a disconnect for the surface that went away, then a connect for the one
//! that replaced it. Consumers never observe two connected surfaces at once.
//!
//! The connection does not call back into its consumer. Each operation
//! returns the events it produced and the caller applies them, which keeps
//! ownership flat: the engine owns both the connection and the state the
//! events act on.

use crate::id::NodeId;
use crate::scene::{RootKind, SceneView, SurfaceSource};

/// Which surfaces a connection reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionFilter {
    /// Any native surface the anchor is presented through.
    #[default]
    AnySurface,
    /// Only surfaces whose root is a top-level window.
    TopLevelWindow,
}

impl ConnectionFilter {
    /// Returns whether `source` passes this filter.
    #[must_use]
    pub fn accepts(self, source: &SurfaceSource) -> bool {
        match self {
            Self::AnySurface => true,
            Self::TopLevelWindow => source.kind == RootKind::Window,
        }
    }
}

/// A change in the anchor's owning surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConnectionEvent {
    /// The anchor became presented through this surface.
    Connected(SurfaceSource),
    /// The anchor stopped being presented through this surface.
    Disconnected(SurfaceSource),
}

/// Tracks the owning surface of one anchor node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceConnection {
    anchor: NodeId,
    filter: ConnectionFilter,
    activated: bool,
}

impl SurfaceConnection {
    /// Creates an inactive connection for `anchor`.
    #[must_use]
    pub fn new(anchor: NodeId, filter: ConnectionFilter) -> Self {
        Self {
            anchor,
            filter,
            activated: false,
        }
    }

    /// The node whose surface is tracked.
    #[must_use]
    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    /// The filter applied to reported surfaces.
    #[must_use]
    pub fn filter(&self) -> ConnectionFilter {
        self.filter
    }

    /// Whether surface changes are currently being reported.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Starts reporting surface changes.
    ///
    /// If the anchor is already presented through a surface, the returned
    /// event connects it. Activating twice is a no-op.
    pub fn activate(&mut self, scene: &dyn SceneView) -> Option<ConnectionEvent> {
        if self.activated {
            return None;
        }
        self.activated = true;
        self.current(scene).map(ConnectionEvent::Connected)
    }

    /// Stops reporting surface changes.
    ///
    /// If the anchor is currently presented through a surface, the returned
    /// event disconnects it. Deactivating twice is a no-op.
    pub fn deactivate(&mut self, scene: &dyn SceneView) -> Option<ConnectionEvent> {
        if !self.activated {
            return None;
        }
        self.activated = false;
        self.current(scene).map(ConnectionEvent::Disconnected)
    }

    /// Translates a surface change on the anchor into connection events,
    /// disconnect before connect.
    ///
    /// Yields nothing while the connection is inactive.
    pub fn source_changed(
        &self,
        old: Option<SurfaceSource>,
        new: Option<SurfaceSource>,
    ) -> impl Iterator<Item = ConnectionEvent> + use<> {
        let filter = self.filter;
        let active = self.activated;
        let old = old
            .filter(|s| active && filter.accepts(s))
            .map(ConnectionEvent::Disconnected);
        let new = new
            .filter(|s| active && filter.accepts(s))
            .map(ConnectionEvent::Connected);
        old.into_iter().chain(new)
    }

    fn current(&self, scene: &dyn SceneView) -> Option<SurfaceSource> {
        scene
            .source(self.anchor)
            .filter(|s| self.filter.accepts(s))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Affine, Size};

    use super::*;
    use crate::id::SurfaceId;

    struct OneNode(Option<SurfaceSource>);

    impl SceneView for OneNode {
        fn parent(&self, _node: NodeId) -> Option<NodeId> {
            None
        }

        fn transform(&self, _node: NodeId) -> Affine {
            Affine::IDENTITY
        }

        fn render_size(&self, _node: NodeId) -> Size {
            Size::ZERO
        }

        fn is_loaded(&self, _node: NodeId) -> bool {
            self.0.is_some()
        }

        fn is_visible(&self, _node: NodeId) -> bool {
            self.0.is_some()
        }

        fn source(&self, _node: NodeId) -> Option<SurfaceSource> {
            self.0
        }
    }

    fn source(id: u64, kind: RootKind) -> SurfaceSource {
        SurfaceSource {
            surface: SurfaceId(id),
            root: NodeId::new(0, 0),
            kind,
            device_transform: Affine::IDENTITY,
        }
    }

    #[test]
    fn activate_connects_current_surface_once() {
        let scene = OneNode(Some(source(1, RootKind::Window)));
        let mut conn = SurfaceConnection::new(NodeId::new(0, 0), ConnectionFilter::AnySurface);
        assert_eq!(
            conn.activate(&scene),
            Some(ConnectionEvent::Connected(source(1, RootKind::Window)))
        );
        assert_eq!(conn.activate(&scene), None);
        assert!(conn.is_activated());
    }

    #[test]
    fn activate_without_surface_still_activates() {
        let scene = OneNode(None);
        let mut conn = SurfaceConnection::new(NodeId::new(0, 0), ConnectionFilter::AnySurface);
        assert_eq!(conn.activate(&scene), None);
        assert!(conn.is_activated());
        assert_eq!(conn.deactivate(&scene), None);
        assert!(!conn.is_activated());
    }

    #[test]
    fn deactivate_disconnects_once() {
        let scene = OneNode(Some(source(1, RootKind::Other)));
        let mut conn = SurfaceConnection::new(NodeId::new(0, 0), ConnectionFilter::AnySurface);
        conn.activate(&scene);
        assert_eq!(
            conn.deactivate(&scene),
            Some(ConnectionEvent::Disconnected(source(1, RootKind::Other)))
        );
        assert_eq!(conn.deactivate(&scene), None);
    }

    #[test]
    fn replacement_reports_old_before_new() {
        let scene = OneNode(None);
        let mut conn = SurfaceConnection::new(NodeId::new(0, 0), ConnectionFilter::AnySurface);
        conn.activate(&scene);
        let events: Vec<_> = conn
            .source_changed(
                Some(source(1, RootKind::Window)),
                Some(source(2, RootKind::Window)),
            )
            .collect();
        assert_eq!(
            events,
            [
                ConnectionEvent::Disconnected(source(1, RootKind::Window)),
                ConnectionEvent::Connected(source(2, RootKind::Window)),
            ]
        );
    }

    #[test]
    fn inactive_connection_reports_nothing() {
        let conn = SurfaceConnection::new(NodeId::new(0, 0), ConnectionFilter::AnySurface);
        let mut events = conn.source_changed(None, Some(source(2, RootKind::Window)));
        assert_eq!(events.next(), None);
    }

    #[test]
    fn top_level_filter_ignores_other_roots() {
        let scene = OneNode(Some(source(1, RootKind::Other)));
        let mut conn =
            SurfaceConnection::new(NodeId::new(0, 0), ConnectionFilter::TopLevelWindow);
        assert_eq!(conn.activate(&scene), None);
        let events: Vec<_> = conn
            .source_changed(
                Some(source(1, RootKind::Other)),
                Some(source(2, RootKind::Window)),
            )
            .collect();
        assert_eq!(
            events,
            [ConnectionEvent::Connected(source(2, RootKind::Window))]
        );
    }
}
