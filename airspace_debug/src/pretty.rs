// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use airspace_core::trace::{
    ActivationClampedEvent, AdornerMovedEvent, AdornerVisibilityEvent, ExpandScheduledEvent,
    HostPassEvent, HostPassKind, OwnerConnectedEvent, OwnerDisconnectedEvent, RestackEvent,
    TraceSink, ZOrderPlacedEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

pub(crate) fn pass_name(kind: HostPassKind) -> &'static str {
    match kind {
        HostPassKind::Collapse => "collapse",
        HostPassKind::Freeze => "freeze",
        HostPassKind::Expand => "expand",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_adorner_moved(&mut self, e: &AdornerMovedEvent) {
        let b = e.bounds;
        let _ = writeln!(
            self.writer,
            "[adorner:move] {:?} to {},{} {}x{}",
            e.adorner, b.x, b.y, b.width, b.height,
        );
    }

    fn on_adorner_visibility(&mut self, e: &AdornerVisibilityEvent) {
        let state = if e.shown { "show" } else { "hide" };
        let _ = writeln!(self.writer, "[adorner:{state}] {:?}", e.adorner);
    }

    fn on_owner_connected(&mut self, e: &OwnerConnectedEvent) {
        let _ = writeln!(
            self.writer,
            "[group:connect] {:?} owner={:?} members={}",
            e.group, e.owner, e.members,
        );
    }

    fn on_owner_disconnected(&mut self, e: &OwnerDisconnectedEvent) {
        let _ = writeln!(
            self.writer,
            "[group:disconnect] {:?} owner={:?}",
            e.group, e.owner,
        );
    }

    fn on_z_order_placed(&mut self, e: &ZOrderPlacedEvent) {
        let _ = writeln!(
            self.writer,
            "[group:place] {:?} owner={:?} members={}",
            e.group, e.owner, e.members,
        );
    }

    fn on_activation_clamped(&mut self, e: &ActivationClampedEvent) {
        let below = match e.below {
            Some(surface) => format!("{surface:?}"),
            None => "top".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[group:clamp] {:?} adorner={:?} below={below}",
            e.group, e.adorner,
        );
    }

    fn on_host_pass(&mut self, e: &HostPassEvent) {
        let _ = writeln!(
            self.writer,
            "[host:{}] {:?} holders={}",
            pass_name(e.kind),
            e.group,
            e.holders,
        );
    }

    fn on_expand_scheduled(&mut self, e: &ExpandScheduledEvent) {
        let what = if e.coalesced { "coalesced" } else { "queued" };
        let _ = writeln!(self.writer, "[host:schedule] {:?} {what}", e.group);
    }

    fn on_restack(&mut self, e: &RestackEvent) {
        let _ = writeln!(
            self.writer,
            "[restack] {:?} below {:?}",
            e.surface, e.above,
        );
    }
}
