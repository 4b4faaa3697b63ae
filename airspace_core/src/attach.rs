// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node adornment, declared as a property of the anchor.
//!
//! [`AdornmentRegistry`] lets an integration layer treat "this node shows
//! that content in a floating overlay" as a single settable value: setting
//! content creates the node's adorner on first use, and clearing it disposes
//! the adorner.

use hashbrown::HashMap;

use crate::Airspace;
use crate::error::AirspaceError;
use crate::id::{AdornerId, ContentId, GroupId, NodeId};
use crate::native::NativeWindows;
use crate::scene::SceneView;

/// Maps nodes to the adorner presenting their attached content.
#[derive(Clone, Debug, Default)]
pub struct AdornmentRegistry {
    adorners: HashMap<NodeId, AdornerId>,
}

impl AdornmentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the content adorning `node`.
    ///
    /// With `Some` content, the node's adorner is created if it does not
    /// exist (joining `context` when given) and its content replaced. With
    /// `None`, the adorner is disposed. Returns the adorner now presenting
    /// the content.
    pub fn set_adornment<W: NativeWindows>(
        &mut self,
        airspace: &mut Airspace<W>,
        scene: &dyn SceneView,
        node: NodeId,
        content: Option<ContentId>,
        context: Option<GroupId>,
    ) -> Result<Option<AdornerId>, AirspaceError> {
        let Some(content) = content else {
            if let Some(id) = self.adorners.remove(&node) {
                airspace.dispose_adorner(scene, id);
            }
            return Ok(None);
        };
        let id = match self.adorners.get(&node) {
            Some(&id) if airspace.contains_adorner(id) => id,
            _ => {
                let id = airspace.create_adorner(scene, node, context)?;
                self.adorners.insert(node, id);
                id
            }
        };
        airspace.set_adornment(id, Some(content))?;
        Ok(Some(id))
    }

    /// The adorner attached to `node`, if any.
    #[must_use]
    pub fn adorner_for(&self, node: NodeId) -> Option<AdornerId> {
        self.adorners.get(&node).copied()
    }

    /// Number of adorned nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adorners.len()
    }

    /// Whether no node is adorned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adorners.is_empty()
    }
}
