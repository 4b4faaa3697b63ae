// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording and JSON-lines export.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends every event to a
//! buffer shared by all of its clones: install one clone in the engine and
//! keep another to read the recording back.
//!
//! [`RecorderSink::to_json_lines`] writes one JSON object per event, each
//! with an `"event"` name and the event's fields. Handles are written as
//! `[index, generation]` pairs and surfaces as plain integers.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use serde_json::{Value, json};

use airspace_core::id::{AdornerId, GroupId, HostGroupId, SurfaceId};
use airspace_core::trace::{
    ActivationClampedEvent, AdornerMovedEvent, AdornerVisibilityEvent, ExpandScheduledEvent,
    HostPassEvent, OwnerConnectedEvent, OwnerDisconnectedEvent, RestackEvent, TraceSink,
    ZOrderPlacedEvent,
};

use crate::pretty::pass_name;

/// One recorded event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// See [`TraceSink::on_adorner_moved`].
    AdornerMoved(AdornerMovedEvent),
    /// See [`TraceSink::on_adorner_visibility`].
    AdornerVisibility(AdornerVisibilityEvent),
    /// See [`TraceSink::on_owner_connected`].
    OwnerConnected(OwnerConnectedEvent),
    /// See [`TraceSink::on_owner_disconnected`].
    OwnerDisconnected(OwnerDisconnectedEvent),
    /// See [`TraceSink::on_z_order_placed`].
    ZOrderPlaced(ZOrderPlacedEvent),
    /// See [`TraceSink::on_activation_clamped`].
    ActivationClamped(ActivationClampedEvent),
    /// See [`TraceSink::on_host_pass`].
    HostPass(HostPassEvent),
    /// See [`TraceSink::on_expand_scheduled`].
    ExpandScheduled(ExpandScheduledEvent),
    /// See [`TraceSink::on_restack`].
    Restack(RestackEvent),
}

impl RecordedEvent {
    /// The event's name as written to JSON.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AdornerMoved(_) => "AdornerMoved",
            Self::AdornerVisibility(_) => "AdornerVisibility",
            Self::OwnerConnected(_) => "OwnerConnected",
            Self::OwnerDisconnected(_) => "OwnerDisconnected",
            Self::ZOrderPlaced(_) => "ZOrderPlaced",
            Self::ActivationClamped(_) => "ActivationClamped",
            Self::HostPass(_) => "HostPass",
            Self::ExpandScheduled(_) => "ExpandScheduled",
            Self::Restack(_) => "Restack",
        }
    }

    /// The event as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let name = self.name();
        match *self {
            Self::AdornerMoved(e) => json!({
                "event": name,
                "adorner": adorner(e.adorner),
                "bounds": [e.bounds.x, e.bounds.y, e.bounds.width, e.bounds.height],
            }),
            Self::AdornerVisibility(e) => json!({
                "event": name,
                "adorner": adorner(e.adorner),
                "shown": e.shown,
            }),
            Self::OwnerConnected(e) => json!({
                "event": name,
                "group": group(e.group),
                "owner": surface(e.owner),
                "members": e.members,
            }),
            Self::OwnerDisconnected(e) => json!({
                "event": name,
                "group": group(e.group),
                "owner": surface(e.owner),
            }),
            Self::ZOrderPlaced(e) => json!({
                "event": name,
                "group": group(e.group),
                "owner": surface(e.owner),
                "members": e.members,
            }),
            Self::ActivationClamped(e) => json!({
                "event": name,
                "group": group(e.group),
                "adorner": adorner(e.adorner),
                "below": e.below.map(surface),
            }),
            Self::HostPass(e) => json!({
                "event": name,
                "group": host_group(e.group),
                "kind": pass_name(e.kind),
                "holders": e.holders,
            }),
            Self::ExpandScheduled(e) => json!({
                "event": name,
                "group": host_group(e.group),
                "coalesced": e.coalesced,
            }),
            Self::Restack(e) => json!({
                "event": name,
                "surface": surface(e.surface),
                "above": surface(e.above),
            }),
        }
    }
}

fn adorner(id: AdornerId) -> [u32; 2] {
    [id.index(), id.generation()]
}

fn group(id: GroupId) -> [u32; 2] {
    [id.index(), id.generation()]
}

fn host_group(id: HostGroupId) -> [u32; 2] {
    [id.index(), id.generation()]
}

fn surface(id: SurfaceId) -> u64 {
    id.0
}

/// A [`TraceSink`] that records events in memory.
///
/// Clones share one recording.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    events: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    /// Counts recorded events matching `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Discards the recording.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Writes the recording as JSON lines.
    pub fn to_json_lines(&self, writer: &mut dyn Write) -> io::Result<()> {
        for event in self.events.borrow().iter() {
            serde_json::to_writer(&mut *writer, &event.to_json())?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn push(&self, event: RecordedEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_adorner_moved(&mut self, e: &AdornerMovedEvent) {
        self.push(RecordedEvent::AdornerMoved(*e));
    }

    fn on_adorner_visibility(&mut self, e: &AdornerVisibilityEvent) {
        self.push(RecordedEvent::AdornerVisibility(*e));
    }

    fn on_owner_connected(&mut self, e: &OwnerConnectedEvent) {
        self.push(RecordedEvent::OwnerConnected(*e));
    }

    fn on_owner_disconnected(&mut self, e: &OwnerDisconnectedEvent) {
        self.push(RecordedEvent::OwnerDisconnected(*e));
    }

    fn on_z_order_placed(&mut self, e: &ZOrderPlacedEvent) {
        self.push(RecordedEvent::ZOrderPlaced(*e));
    }

    fn on_activation_clamped(&mut self, e: &ActivationClampedEvent) {
        self.push(RecordedEvent::ActivationClamped(*e));
    }

    fn on_host_pass(&mut self, e: &HostPassEvent) {
        self.push(RecordedEvent::HostPass(*e));
    }

    fn on_expand_scheduled(&mut self, e: &ExpandScheduledEvent) {
        self.push(RecordedEvent::ExpandScheduled(*e));
    }

    fn on_restack(&mut self, e: &RestackEvent) {
        self.push(RecordedEvent::Restack(*e));
    }
}

#[cfg(test)]
mod tests {
    use airspace_core::geometry::PixelRect;
    use airspace_core::trace::HostPassKind;

    use super::*;

    #[test]
    fn clones_share_one_recording() {
        let recorder = RecorderSink::new();
        let mut installed = recorder.clone();
        installed.on_expand_scheduled(&ExpandScheduledEvent {
            group: HostGroupId::from_raw(0, 0),
            coalesced: false,
        });
        assert_eq!(recorder.len(), 1);
        recorder.clear();
        assert!(installed.is_empty());
    }

    #[test]
    fn json_lines_have_one_object_per_event() {
        let mut recorder = RecorderSink::new();
        recorder.on_adorner_moved(&AdornerMovedEvent {
            adorner: AdornerId::from_raw(2, 1),
            bounds: PixelRect::new(10, 20, 30, 40),
        });
        recorder.on_host_pass(&HostPassEvent {
            group: HostGroupId::from_raw(0, 0),
            kind: HostPassKind::Expand,
            holders: 3,
        });
        recorder.on_activation_clamped(&ActivationClampedEvent {
            group: GroupId::from_raw(1, 0),
            adorner: AdornerId::from_raw(2, 1),
            below: None,
        });

        let mut out = Vec::new();
        recorder.to_json_lines(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "AdornerMoved");
        assert_eq!(lines[0]["adorner"], json!([2, 1]));
        assert_eq!(lines[0]["bounds"], json!([10, 20, 30, 40]));
        assert_eq!(lines[1]["kind"], "expand");
        assert_eq!(lines[2]["below"], Value::Null);
    }
}
