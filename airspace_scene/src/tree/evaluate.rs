// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evaluation and change detection.
//!
//! Evaluation drains each dirty channel and recomputes derived state for the
//! affected nodes, parents before children:
//!
//! 1. Destroyed nodes that were loaded report their surface loss first.
//! 2. **SOURCE**: resolve each node's owning surface as the nearest
//!    attachment on itself or an ancestor. A change emits
//!    [`SceneEvent::SurfaceChanged`]; gaining or losing a surface emits
//!    [`SceneEvent::Loaded`] or [`SceneEvent::Unloaded`].
//! 3. **VISIBILITY**: recompute `loaded && !hidden` along the ancestry and
//!    emit [`SceneEvent::VisibilityChanged`] on flips.
//! 4. **LAYOUT**: any mark (or any surface change) emits one
//!    [`SceneEvent::LayoutUpdated`].
//!
//! Surface changes precede load events, so a consumer that activates on
//! `Loaded` already sees the new surface and is not told about it twice.

use alloc::vec::Vec;

use airspace_core::scene::{SceneEvent, SurfaceSource};

use super::store::{INVALID, SceneTree};
use crate::dirty;

/// The events produced by a single [`SceneTree::evaluate`] call, in the
/// order they should be delivered.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Scene events, ready for the engine.
    pub events: Vec<SceneEvent>,
}

impl SceneChanges {
    /// Clears the event list.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl SceneTree {
    /// Recomputes derived state and returns the resulting events.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();
        let mut surfaces = Vec::new();
        let mut loads = Vec::new();
        let mut visibility = Vec::new();

        for (node, source, was_visible) in self.pending_detached.drain(..) {
            surfaces.push(SceneEvent::SurfaceChanged {
                node,
                old: Some(source),
                new: None,
            });
            loads.push(SceneEvent::Unloaded(node));
            if was_visible {
                visibility.push(SceneEvent::VisibilityChanged(node));
            }
        }

        let mut dirty_sources: Vec<u32> = self
            .dirty
            .drain(dirty::SOURCE)
            .affected()
            .deterministic()
            .run()
            .filter(|idx| !self.free_list.contains(idx))
            .collect();
        self.sort_parents_first(&mut dirty_sources);
        for &idx in &dirty_sources {
            let old = self.source[idx as usize];
            let new = self.resolve_source(idx);
            if old == new {
                continue;
            }
            self.source[idx as usize] = new;
            let Some(node) = self.handle(idx) else {
                continue;
            };
            surfaces.push(SceneEvent::SurfaceChanged { node, old, new });
            match (old.is_some(), new.is_some()) {
                (false, true) => loads.push(SceneEvent::Loaded(node)),
                (true, false) => loads.push(SceneEvent::Unloaded(node)),
                _ => {}
            }
        }

        let mut dirty_visibility: Vec<u32> = self
            .dirty
            .drain(dirty::VISIBILITY)
            .affected()
            .deterministic()
            .run()
            .filter(|idx| !self.free_list.contains(idx))
            .collect();
        dirty_visibility.extend_from_slice(&dirty_sources);
        self.sort_parents_first(&mut dirty_visibility);
        dirty_visibility.dedup();
        for idx in dirty_visibility {
            let visible = self.source[idx as usize].is_some() && !self.hidden_in_chain(idx);
            if visible == self.visible[idx as usize] {
                continue;
            }
            self.visible[idx as usize] = visible;
            if let Some(node) = self.handle(idx) {
                visibility.push(SceneEvent::VisibilityChanged(node));
            }
        }

        let layout_marks = self.dirty.drain(dirty::LAYOUT).deterministic().run().count();

        let layout_changed = layout_marks > 0 || !surfaces.is_empty();
        changes.events.extend(surfaces);
        changes.events.extend(loads);
        changes.events.extend(visibility);
        if layout_changed {
            changes.events.push(SceneEvent::LayoutUpdated);
        }
    }

    fn resolve_source(&self, idx: u32) -> Option<SurfaceSource> {
        let mut cur = idx;
        while cur != INVALID {
            if let Some(attachment) = self.attachment[cur as usize] {
                let root = self.handle(cur)?;
                return Some(attachment.source(root));
            }
            cur = self.parent[cur as usize];
        }
        None
    }

    fn hidden_in_chain(&self, idx: u32) -> bool {
        let mut cur = idx;
        while cur != INVALID {
            if self.hidden[cur as usize] {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }

    fn depth(&self, idx: u32) -> u32 {
        let mut depth = 0;
        let mut cur = self.parent[idx as usize];
        while cur != INVALID {
            depth += 1;
            cur = self.parent[cur as usize];
        }
        depth
    }

    fn sort_parents_first(&self, indices: &mut [u32]) {
        indices.sort_unstable_by_key(|&idx| (self.depth(idx), idx));
    }
}

#[cfg(test)]
mod tests {
    use airspace_core::id::SurfaceId;
    use airspace_core::scene::SceneView;
    use kurbo::Affine;

    use super::*;
    use crate::SurfaceAttachment;

    #[test]
    fn attaching_a_surface_loads_the_subtree_parent_first() {
        let mut tree = SceneTree::new();
        let root = tree.create_node();
        let child = tree.create_node();
        tree.add_child(root, child);
        let _ = tree.evaluate();

        tree.attach_surface(root, SurfaceAttachment::window(SurfaceId(9), 1.0));
        let events = tree.evaluate().events;

        let source = tree.source(root);
        assert!(source.is_some(), "root should resolve its own attachment");
        assert_eq!(
            events,
            [
                SceneEvent::SurfaceChanged {
                    node: root,
                    old: None,
                    new: source
                },
                SceneEvent::SurfaceChanged {
                    node: child,
                    old: None,
                    new: source
                },
                SceneEvent::Loaded(root),
                SceneEvent::Loaded(child),
                SceneEvent::VisibilityChanged(root),
                SceneEvent::VisibilityChanged(child),
                SceneEvent::LayoutUpdated,
            ]
        );
        assert!(tree.is_visible(child));
    }

    #[test]
    fn unchanged_tree_evaluates_to_nothing() {
        let mut tree = SceneTree::new();
        let root = tree.create_node();
        tree.attach_surface(root, SurfaceAttachment::window(SurfaceId(1), 1.0));
        let _ = tree.evaluate();
        assert!(tree.evaluate().is_empty());
    }

    #[test]
    fn hiding_an_ancestor_flips_descendant_visibility() {
        let mut tree = SceneTree::new();
        let root = tree.create_node();
        let child = tree.create_node();
        tree.add_child(root, child);
        tree.attach_surface(root, SurfaceAttachment::window(SurfaceId(1), 1.0));
        let _ = tree.evaluate();

        tree.set_hidden(root, true);
        assert_eq!(
            tree.evaluate().events,
            [
                SceneEvent::VisibilityChanged(root),
                SceneEvent::VisibilityChanged(child)
            ]
        );
        assert!(tree.is_loaded(child));
        assert!(!tree.is_visible(child));
    }

    #[test]
    fn layout_marks_coalesce_into_one_event() {
        let mut tree = SceneTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        let _ = tree.evaluate();
        tree.set_transform(a, Affine::translate((5.0, 5.0)));
        tree.set_transform(b, Affine::translate((1.0, 1.0)));
        assert_eq!(tree.evaluate().events, [SceneEvent::LayoutUpdated]);
    }

    #[test]
    fn replacing_a_surface_reports_old_and_new_without_unload() {
        let mut tree = SceneTree::new();
        let root = tree.create_node();
        tree.attach_surface(root, SurfaceAttachment::window(SurfaceId(1), 1.0));
        let _ = tree.evaluate();
        let old = tree.source(root);

        tree.attach_surface(root, SurfaceAttachment::window(SurfaceId(2), 1.0));
        let events = tree.evaluate().events;
        assert_eq!(
            events,
            [
                SceneEvent::SurfaceChanged {
                    node: root,
                    old,
                    new: tree.source(root)
                },
                SceneEvent::LayoutUpdated,
            ]
        );
    }

    #[test]
    fn destroying_a_loaded_node_reports_unload_under_stale_handle() {
        let mut tree = SceneTree::new();
        let root = tree.create_node();
        let leaf = tree.create_node();
        tree.add_child(root, leaf);
        tree.attach_surface(root, SurfaceAttachment::window(SurfaceId(1), 1.0));
        let _ = tree.evaluate();
        let old = tree.source(leaf);

        tree.destroy_node(leaf);
        let events = tree.evaluate().events;
        assert_eq!(
            &events[..3],
            [
                SceneEvent::SurfaceChanged {
                    node: leaf,
                    old,
                    new: None
                },
                SceneEvent::Unloaded(leaf),
                SceneEvent::VisibilityChanged(leaf),
            ]
        );
        assert!(!tree.is_loaded(leaf));
    }
}
