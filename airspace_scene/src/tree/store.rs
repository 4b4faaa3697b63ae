// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::vec::Vec;

use airspace_core::id::{NodeId, SurfaceId};
use airspace_core::scene::{RootKind, SurfaceSource};
use kurbo::{Affine, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::traverse::Children;
use crate::dirty;

/// Sentinel for "no node" in the topology arrays.
pub(crate) const INVALID: u32 = u32::MAX;

/// Presents a node's subtree through a native surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceAttachment {
    /// The native surface.
    pub surface: SurfaceId,
    /// What kind of root container the surface is.
    pub kind: RootKind,
    /// Device pixels per scene unit.
    pub scale: f64,
}

impl SurfaceAttachment {
    /// A top-level window surface at the given scale.
    #[must_use]
    pub fn window(surface: SurfaceId, scale: f64) -> Self {
        Self {
            surface,
            kind: RootKind::Window,
            scale,
        }
    }

    /// A non-window root (popup, embedded source) at the given scale.
    #[must_use]
    pub fn other(surface: SurfaceId, scale: f64) -> Self {
        Self {
            surface,
            kind: RootKind::Other,
            scale,
        }
    }

    pub(crate) fn source(self, root: NodeId) -> SurfaceSource {
        SurfaceSource {
            surface: self.surface,
            root,
            kind: self.kind,
            device_transform: Affine::scale(self.scale),
        }
    }
}

/// Struct-of-arrays storage for a retained node tree.
///
/// Nodes are addressed by [`NodeId`] handles. Destroyed nodes are recycled
/// via a free list, and generation counters prevent stale handle access:
/// mutations and getters panic on a stale handle, while the
/// [`SceneView`](airspace_core::scene::SceneView) queries treat it as an
/// unloaded node.
#[derive(Debug)]
pub struct SceneTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) transform: Vec<Affine>,
    pub(crate) size: Vec<Size>,
    pub(crate) hidden: Vec<bool>,
    pub(crate) attachment: Vec<Option<SurfaceAttachment>>,

    // -- Derived properties (written by evaluate) --
    pub(crate) source: Vec<Option<SurfaceSource>>,
    pub(crate) visible: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    /// Destroyed nodes that were loaded, with the source they had.
    pub(crate) pending_detached: Vec<(NodeId, SurfaceSource, bool)>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            transform: Vec::new(),
            size: Vec::new(),
            hidden: Vec::new(),
            attachment: Vec::new(),
            source: Vec::new(),
            visible: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_detached: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a detached node with an identity transform, zero size and no
    /// surface.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.transform[i] = Affine::IDENTITY;
            self.size[i] = Size::ZERO;
            self.hidden[i] = false;
            self.attachment[i] = None;
            self.source[i] = None;
            self.visible[i] = false;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.transform.push(Affine::IDENTITY);
            self.size.push(Size::ZERO);
            self.hidden.push(false);
            self.attachment.push(None);
            self.source.push(None);
            self.visible.push(false);
            self.generation.push(0);
            idx
        };
        NodeId::new(idx, self.generation[idx as usize])
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// A loaded node reports its surface loss and unload on the next
    /// [`evaluate`](Self::evaluate), under its now-stale handle.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        let idx = self.validate(id);
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );
        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }
        if let Some(source) = self.source[idx as usize].take() {
            let was_visible = self.visible[idx as usize];
            self.pending_detached.push((id, source, was_visible));
        }
        self.visible[idx as usize] = false;
        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
        self.dirty.mark(idx, dirty::LAYOUT);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.live_index(id).is_some()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let p = self.validate(parent);
        let c = self.validate(child);
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        self.link_last(p, c);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        let c = self.validate(child);
        let p = self.parent[c as usize];
        assert!(p != INVALID, "node has no parent");
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::SOURCE);
        self.dirty.remove_dependency(c, p, dirty::VISIBILITY);
        self.mark_subtree_inherited_dirty(c);
    }

    /// Moves `child` under `new_parent`, detaching it from its current
    /// parent first.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        let c = self.validate(child);
        let p = self.validate(new_parent);
        let old = self.parent[c as usize];
        if old != INVALID {
            self.unlink_from_parent(c);
            self.dirty.remove_dependency(c, old, dirty::SOURCE);
            self.dirty.remove_dependency(c, old, dirty::VISIBILITY);
        }
        self.link_last(p, c);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let idx = self.validate(id);
        self.handle(self.parent[idx as usize])
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let idx = self.validate(id);
        Children::new(self, self.first_child[idx as usize])
    }

    // -- Property getters --

    /// Returns the node-to-parent transform.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> Affine {
        self.transform[self.validate(id) as usize]
    }

    /// Returns the arranged size.
    #[must_use]
    pub fn size(&self, id: NodeId) -> Size {
        self.size[self.validate(id) as usize]
    }

    /// Returns the node's own hidden flag.
    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.hidden[self.validate(id) as usize]
    }

    /// Returns the surface attached directly to this node.
    #[must_use]
    pub fn attachment(&self, id: NodeId) -> Option<SurfaceAttachment> {
        self.attachment[self.validate(id) as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the node-to-parent transform, including the layout offset.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) {
        let idx = self.validate(id);
        self.transform[idx as usize] = transform;
        self.dirty.mark(idx, dirty::LAYOUT);
    }

    /// Sets the arranged size.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        let idx = self.validate(id);
        self.size[idx as usize] = size;
        self.dirty.mark(idx, dirty::LAYOUT);
    }

    /// Sets the node's hidden flag. Hiding a node hides its subtree.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        let idx = self.validate(id);
        self.hidden[idx as usize] = hidden;
        self.dirty.mark_with(idx, dirty::VISIBILITY, &EagerPolicy);
    }

    /// Presents this node's subtree through `attachment`, replacing any
    /// surface previously attached here.
    pub fn attach_surface(&mut self, id: NodeId, attachment: SurfaceAttachment) {
        let idx = self.validate(id);
        self.attachment[idx as usize] = Some(attachment);
        self.mark_subtree_inherited_dirty(idx);
    }

    /// Removes the surface attached directly to this node.
    pub fn detach_surface(&mut self, id: NodeId) {
        let idx = self.validate(id);
        if self.attachment[idx as usize].take().is_some() {
            self.mark_subtree_inherited_dirty(idx);
        }
    }

    // -- Internal helpers --

    pub(crate) fn live_index(&self, id: NodeId) -> Option<u32> {
        let idx = id.index();
        (idx < self.len
            && self.generation[idx as usize] == id.generation()
            && !self.free_list.contains(&idx))
        .then_some(idx)
    }

    pub(crate) fn handle(&self, idx: u32) -> Option<NodeId> {
        (idx != INVALID).then(|| NodeId::new(idx, self.generation[idx as usize]))
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) -> u32 {
        match self.live_index(id) {
            Some(idx) => idx,
            None => panic!("stale NodeId: {id:?}"),
        }
    }

    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        let _ = self.dirty.add_dependency(c, p, dirty::SOURCE);
        let _ = self.dirty.add_dependency(c, p, dirty::VISIBILITY);
        self.mark_subtree_inherited_dirty(c);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::SOURCE, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::VISIBILITY, &EagerPolicy);
        self.dirty.mark(idx, dirty::LAYOUT);
    }
}
