// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for native surface coordination.
//!
//! This module provides a [`TraceSink`] trait with one method per engine
//! event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] holds an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and installing a sink
//! simply drops it. When **on**, each method performs a single `Option`
//! branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`RestackEvent`], emitted once per
//!   native restack call.

use alloc::boxed::Box;

use crate::geometry::PixelRect;
use crate::id::{AdornerId, GroupId, HostGroupId, SurfaceId};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an adorner's native surface is repositioned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdornerMovedEvent {
    /// The adorner that moved.
    pub adorner: AdornerId,
    /// The bounds sent to the native layer.
    pub bounds: PixelRect,
}

/// Emitted when an adorner's native surface is shown or hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdornerVisibilityEvent {
    /// The adorner.
    pub adorner: AdornerId,
    /// New visibility.
    pub shown: bool,
}

/// Emitted when a group attaches to an owning surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnerConnectedEvent {
    /// The group.
    pub group: GroupId,
    /// The new owner.
    pub owner: SurfaceId,
    /// Member count at connection time.
    pub members: usize,
}

/// Emitted when a group detaches from its owning surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnerDisconnectedEvent {
    /// The group.
    pub group: GroupId,
    /// The previous owner.
    pub owner: SurfaceId,
}

/// Emitted after a full z-order placement of a group's members.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZOrderPlacedEvent {
    /// The group.
    pub group: GroupId,
    /// The owner the members were stacked above.
    pub owner: SurfaceId,
    /// Number of members placed.
    pub members: usize,
}

/// Emitted after an activated member was clamped back into its group's band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivationClampedEvent {
    /// The group.
    pub group: GroupId,
    /// The activated adorner.
    pub adorner: AdornerId,
    /// The first foreign surface above the band, or `None` if the band
    /// reached the front of the stacking order.
    pub below: Option<SurfaceId>,
}

/// Which holder operation a host pass performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostPassKind {
    /// Holders were collapsed.
    Collapse,
    /// Holder bounds were frozen without collapsing.
    Freeze,
    /// Holders were expanded.
    Expand,
}

/// Emitted after a collapse, freeze or expand pass over a host group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostPassEvent {
    /// The host group.
    pub group: HostGroupId,
    /// What the pass did.
    pub kind: HostPassKind,
    /// Number of holders visited.
    pub holders: usize,
}

/// Emitted when an asynchronous expand is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpandScheduledEvent {
    /// The host group.
    pub group: HostGroupId,
    /// `true` if a pass was already pending and the request was absorbed.
    pub coalesced: bool,
}

/// A single native restack call.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestackEvent {
    /// The surface that moved in the stacking order.
    pub surface: SurfaceId,
    /// The surface it now sits directly behind.
    pub above: SurfaceId,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an adorner is repositioned.
    fn on_adorner_moved(&mut self, e: &AdornerMovedEvent) {
        _ = e;
    }

    /// Called when an adorner is shown or hidden.
    fn on_adorner_visibility(&mut self, e: &AdornerVisibilityEvent) {
        _ = e;
    }

    /// Called when a group connects to an owner.
    fn on_owner_connected(&mut self, e: &OwnerConnectedEvent) {
        _ = e;
    }

    /// Called when a group disconnects from its owner.
    fn on_owner_disconnected(&mut self, e: &OwnerDisconnectedEvent) {
        _ = e;
    }

    /// Called after full z-order placement.
    fn on_z_order_placed(&mut self, e: &ZOrderPlacedEvent) {
        _ = e;
    }

    /// Called after clamped reinsertion of an activated member.
    fn on_activation_clamped(&mut self, e: &ActivationClampedEvent) {
        _ = e;
    }

    /// Called after a host pass.
    fn on_host_pass(&mut self, e: &HostPassEvent) {
        _ = e;
    }

    /// Called when an asynchronous expand is requested.
    fn on_expand_scheduled(&mut self, e: &ExpandScheduledEvent) {
        _ = e;
    }

    /// Called for every native restack (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_restack(&mut self, e: &RestackEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($(#[$meta:meta])* $name:ident, $hook:ident, $event:ty) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl Tracer {
    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a tracer that dispatches to `sink`.
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        let mut tracer = Self::none();
        tracer.set_sink(Some(sink));
        tracer
    }

    /// Installs or removes the sink. Without the `trace` feature the sink is
    /// dropped immediately.
    pub fn set_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        #[cfg(feature = "trace")]
        {
            self.sink = sink;
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
        }
    }

    emit!(
        /// Emits an [`AdornerMovedEvent`].
        adorner_moved,
        on_adorner_moved,
        AdornerMovedEvent
    );
    emit!(
        /// Emits an [`AdornerVisibilityEvent`].
        adorner_visibility,
        on_adorner_visibility,
        AdornerVisibilityEvent
    );
    emit!(
        /// Emits an [`OwnerConnectedEvent`].
        owner_connected,
        on_owner_connected,
        OwnerConnectedEvent
    );
    emit!(
        /// Emits an [`OwnerDisconnectedEvent`].
        owner_disconnected,
        on_owner_disconnected,
        OwnerDisconnectedEvent
    );
    emit!(
        /// Emits a [`ZOrderPlacedEvent`].
        z_order_placed,
        on_z_order_placed,
        ZOrderPlacedEvent
    );
    emit!(
        /// Emits an [`ActivationClampedEvent`].
        activation_clamped,
        on_activation_clamped,
        ActivationClampedEvent
    );
    emit!(
        /// Emits a [`HostPassEvent`].
        host_pass,
        on_host_pass,
        HostPassEvent
    );
    emit!(
        /// Emits an [`ExpandScheduledEvent`].
        expand_scheduled,
        on_expand_scheduled,
        ExpandScheduledEvent
    );

    /// Emits a restack record (a no-op without `trace-rich`).
    #[inline]
    pub fn restack(&mut self, surface: SurfaceId, above: SurfaceId) {
        #[cfg(feature = "trace-rich")]
        if let Some(s) = &mut self.sink {
            s.on_restack(&RestackEvent { surface, above });
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = (surface, above);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
