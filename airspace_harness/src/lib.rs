// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated desktop and end-to-end harness for the airspace engine.
//!
//! [`Harness`] wires a [`SceneTree`] and an [`Airspace`] over a
//! [`SimDesktop`] and plays the role of the application's message loop:
//!
//! ```text
//!   SceneTree::evaluate ──► Airspace::handle_scene_event ──┐
//!          ▲                                               ▼
//!          │                                          SimDesktop
//!          │                                               │ outbox
//!   Harness::pump ◄── Airspace::handle_native_message ◄────┘
//!
//!   Harness::run_idle ──► Airspace::run_pending ──► Harness::pump
//! ```

mod desktop;

pub use desktop::{NativeCall, SimDesktop, SimWindow};

use airspace_core::geometry::PixelRect;
use airspace_core::id::{NodeId, SurfaceId};
use airspace_core::native::{MinMaxInfo, NativeMessage};
use airspace_core::{Airspace, AdornmentRegistry};
use airspace_scene::{SceneTree, SurfaceAttachment};
use kurbo::{Affine, Rect};

/// Rounds the harness may spend settling before it gives up.
const MAX_ROUNDS: usize = 64;

/// Tracking limits the simulated window manager proposes before the engine
/// edits them.
pub const DEFAULT_MIN_TRACK: (i32, i32) = (136, 39);

/// A scene, an engine and a simulated desktop driven together.
#[derive(Debug)]
pub struct Harness {
    /// The scene graph.
    pub scene: SceneTree,
    /// The engine under test.
    pub airspace: Airspace<SimDesktop>,
    /// Attached adornments.
    pub registry: AdornmentRegistry,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Creates an empty harness.
    #[must_use]
    pub fn new() -> Self {
        Self::with_airspace(Airspace::new(SimDesktop::new()))
    }

    /// Creates a harness around a preconfigured engine.
    #[must_use]
    pub fn with_airspace(airspace: Airspace<SimDesktop>) -> Self {
        Self {
            scene: SceneTree::new(),
            airspace,
            registry: AdornmentRegistry::new(),
        }
    }

    /// The simulated desktop.
    #[must_use]
    pub fn desktop(&self) -> &SimDesktop {
        self.airspace.windows()
    }

    /// Mutable access to the simulated desktop.
    pub fn desktop_mut(&mut self) -> &mut SimDesktop {
        self.airspace.windows_mut()
    }

    /// Opens a top-level window and a scene root presented through it.
    ///
    /// The root is not loaded until the next [`pump`](Self::pump).
    pub fn open_window(&mut self, bounds: PixelRect, scale: f64) -> (SurfaceId, NodeId) {
        let surface = self.desktop_mut().create_top_level(bounds);
        let root = self.scene.create_node();
        self.scene.set_size(
            root,
            kurbo::Size::new(f64::from(bounds.width), f64::from(bounds.height)),
        );
        self.scene
            .attach_surface(root, SurfaceAttachment::window(surface, scale));
        (surface, root)
    }

    /// Adds a child of `parent` arranged at `rect` in the parent's space.
    pub fn add_node(&mut self, parent: NodeId, rect: Rect) -> NodeId {
        let node = self.scene.create_node();
        self.scene
            .set_transform(node, Affine::translate(rect.origin().to_vec2()));
        self.scene.set_size(node, rect.size());
        self.scene.add_child(parent, node);
        node
    }

    /// Delivers scene changes and native notifications until both are quiet.
    /// Deferred engine tasks are left queued. Returns the number of events
    /// and messages delivered.
    ///
    /// # Panics
    ///
    /// Panics if the system keeps producing events for too many rounds.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        for _ in 0..MAX_ROUNDS {
            let changes = self.scene.evaluate();
            for event in &changes.events {
                self.airspace.handle_scene_event(&self.scene, event);
            }
            let messages: Vec<_> = self.desktop_mut().drain_messages().collect();
            for &(surface, kind) in &messages {
                self.airspace.handle_native_message(surface, kind.message());
            }
            let round = changes.events.len() + messages.len();
            if round == 0 {
                return delivered;
            }
            delivered += round;
        }
        panic!("harness did not settle after {MAX_ROUNDS} rounds");
    }

    /// Runs deferred engine tasks, as an idle message loop would, then
    /// pumps. Returns the number of tasks run.
    pub fn run_idle(&mut self) -> usize {
        let ran = self.airspace.run_pending();
        self.pump();
        ran
    }

    /// Sends a min/max query for `surface` and returns the answer.
    pub fn query_min_max(&mut self, surface: SurfaceId) -> MinMaxInfo {
        let mut info = MinMaxInfo {
            min_track: DEFAULT_MIN_TRACK,
            max_track: (i32::MAX, i32::MAX),
        };
        self.airspace
            .handle_native_message(surface, NativeMessage::MinMaxQuery(&mut info));
        info
    }
}
