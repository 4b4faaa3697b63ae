// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A dirty-tracked retained scene tree that drives the airspace engine.
//!
//! `airspace_scene` provides [`SceneTree`], a generational node tree with
//! transforms, sizes, hidden flags and native surface attachments. It
//! implements [`SceneView`](airspace_core::scene::SceneView) so the engine can
//! query it, and its [`evaluate`](SceneTree::evaluate) turns accumulated
//! mutations into the [`SceneEvent`](airspace_core::scene::SceneEvent)
//! stream the engine consumes:
//!
//! ```text
//!   set_transform / set_hidden / attach_surface / add_child ...
//!       │ (marks dirty channels)
//!       ▼
//!   SceneTree::evaluate() ──► SceneChanges ──► Airspace::handle_scene_event
//! ```
//!
//! **[`dirty`]**: channel constants for `understory_dirty`.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
mod tree;

pub use tree::{Children, SceneChanges, SceneTree, SurfaceAttachment};
