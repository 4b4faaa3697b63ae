// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! A *node* is an arranged element of the retained scene. Each node has:
//!
//! - An identity ([`NodeId`](airspace_core::NodeId)): a generational handle
//!   that becomes stale when the node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - **Local properties** set by the caller:
//!   [`transform`](SceneTree::set_transform), [`size`](SceneTree::set_size),
//!   [`hidden`](SceneTree::set_hidden), and an optional
//!   [surface attachment](SceneTree::attach_surface).
//! - **Derived properties** produced by [`evaluate`](SceneTree::evaluate):
//!   the owning surface (nearest attachment on the node or an ancestor) and
//!   effective visibility (loaded and not hidden along the ancestry).
//!
//! A node is *loaded* while it has an owning surface.

mod evaluate;
mod store;
mod traverse;
mod view;

pub use evaluate::SceneChanges;
pub use store::{SceneTree, SurfaceAttachment};
pub use traverse::Children;
