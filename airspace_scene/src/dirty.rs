// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The scene tree uses multi-channel dirty tracking (via [`understory_dirty`])
//! to find the nodes whose derived state may have changed since the last
//! [`evaluate`](crate::SceneTree::evaluate).
//!
//! - [`SOURCE`] and [`VISIBILITY`] propagate: they are marked with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) over child-to-parent
//!   dependency edges, because the owning surface and the effective
//!   visibility are inherited.
//! - [`LAYOUT`] is local-only. Any layout mark produces a single
//!   [`SceneEvent::LayoutUpdated`](airspace_core::scene::SceneEvent::LayoutUpdated).

use understory_dirty::Channel;

/// Surface attachment or ancestry changed: the owning surface is resolved
/// again for the node and its descendants.
pub const SOURCE: Channel = Channel::new(0);

/// Hidden flag or ancestry changed: effective visibility is recomputed for
/// the node and its descendants.
pub const VISIBILITY: Channel = Channel::new(1);

/// Transform or size changed.
pub const LAYOUT: Channel = Channel::new(2);
