// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native overlay and embedded-surface coordination for retained scene graphs.
//!
//! A retained scene graph cannot draw over or clip the native surfaces it
//! hosts: those live in the window manager's own stacking order. This crate
//! reconciles the scene's layout, visibility and z-order decisions with
//! explicit native window operations. It is `no_std` compatible (with
//! `alloc`) and talks to the outside world through two traits, one per
//! collaborator.
//!
//! # Architecture
//!
//! ```text
//!   Scene graph                          Window manager
//!       │ SceneEvent                          │ NativeMessage
//!       ▼                                     ▼
//!   Airspace::handle_scene_event      Airspace::handle_native_message
//!       │                                     │
//!       └──────────────┬──────────────────────┘
//!                      ▼
//!        adorners ◄─► adorner groups      host groups ─► holders
//!                      │                        │
//!                      ▼                        ▼
//!                 NativeWindows            Dispatcher ─► Airspace::run_pending
//! ```
//!
//! **[`geometry`]**: maps a node's layout rectangle into its owning
//! surface's client pixels via ancestor transforms and the device scale.
//!
//! **[`connection`]**: tracks which native surface an anchor node is
//! presented through and reports connect/disconnect transitions, old before
//! new.
//!
//! **Adorners** are floating overlay surfaces bound to one node. They are
//! shown only while their group is owned and their anchor is visible, and
//! they reposition only when their pixel rectangle actually changes.
//!
//! **Adorner groups** share one owning surface. They keep every member
//! linked to the owner and stacked in a contiguous band in front of it, and
//! clamp activated members back into that band.
//!
//! **[`host`]**: host groups collapse and expand the embedded regions of one
//! container in a stable corner-distance order, with asynchronous expand
//! passes coalesced through [`dispatch`].
//!
//! **[`native`]** and **[`scene`]** define the collaborator contracts.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! engine instrumentation, behind a zero-overhead [`Tracer`](trace::Tracer).
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-restack
//!   events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod adorner;
mod airspace;
mod attach;
pub mod connection;
pub mod dispatch;
mod error;
pub mod geometry;
mod group;
pub mod host;
pub mod id;
pub mod native;
pub mod scene;
mod slots;
pub mod trace;

pub use adorner::AdornerState;
pub use airspace::Airspace;
pub use attach::AdornmentRegistry;
pub use error::AirspaceError;
pub use id::{AdornerId, ContentId, GroupId, HolderId, HostGroupId, NodeId, SurfaceId};
