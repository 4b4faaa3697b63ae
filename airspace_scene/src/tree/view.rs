// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine-facing queries.
//!
//! Stale handles read as detached, unloaded nodes: the engine may still hold
//! an id for a node destroyed since the last evaluation.

use airspace_core::id::NodeId;
use airspace_core::scene::{SceneView, SurfaceSource};
use kurbo::{Affine, Size};

use super::store::SceneTree;

impl SceneView for SceneTree {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let idx = self.live_index(node)?;
        self.handle(self.parent[idx as usize])
    }

    fn transform(&self, node: NodeId) -> Affine {
        self.live_index(node)
            .map_or(Affine::IDENTITY, |idx| self.transform[idx as usize])
    }

    fn render_size(&self, node: NodeId) -> Size {
        self.live_index(node)
            .map_or(Size::ZERO, |idx| self.size[idx as usize])
    }

    fn is_loaded(&self, node: NodeId) -> bool {
        self.live_index(node)
            .is_some_and(|idx| self.source[idx as usize].is_some())
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.live_index(node)
            .is_some_and(|idx| self.visible[idx as usize])
    }

    fn source(&self, node: NodeId) -> Option<SurfaceSource> {
        self.source[self.live_index(node)? as usize]
    }
}

#[cfg(test)]
mod tests {
    use airspace_core::geometry;
    use airspace_core::id::SurfaceId;
    use kurbo::Rect;

    use super::*;
    use crate::SurfaceAttachment;

    #[test]
    fn client_bounds_apply_device_scale() {
        let mut tree = SceneTree::new();
        let root = tree.create_node();
        let panel = tree.create_node();
        tree.add_child(root, panel);
        tree.attach_surface(root, SurfaceAttachment::window(SurfaceId(1), 1.5));
        tree.set_transform(panel, Affine::translate((10.0, 20.0)));
        tree.set_size(panel, Size::new(100.0, 40.0));
        let _ = tree.evaluate();

        assert_eq!(
            geometry::client_bounds(&tree, panel),
            Some(Rect::new(15.0, 30.0, 165.0, 90.0))
        );
    }

    #[test]
    fn stale_handles_read_as_unloaded() {
        let mut tree = SceneTree::new();
        let root = tree.create_node();
        tree.attach_surface(root, SurfaceAttachment::window(SurfaceId(1), 1.0));
        let _ = tree.evaluate();
        tree.detach_surface(root);
        tree.destroy_node(root);

        assert!(!tree.is_loaded(root));
        assert!(!tree.is_visible(root));
        assert_eq!(tree.source(root), None);
        assert_eq!(SceneView::parent(&tree, root), None);
        assert_eq!(SceneView::transform(&tree, root), Affine::IDENTITY);
    }
}
