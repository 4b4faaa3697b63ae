// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Win32 backend for airspace.
//!
//! [`Win32Windows`] implements [`NativeWindows`](airspace_core::native::NativeWindows)
//! over plain `HWND`s:
//!
//! - overlays are borderless `WS_POPUP` windows with `WS_EX_NOACTIVATE`,
//!   `WS_EX_TOOLWINDOW` and `WS_EX_LAYERED`;
//! - placement, visibility and restacking go through `SetWindowPos` with
//!   flags that leave everything else untouched;
//! - overlay content is rendered into a premultiplied [`Frame`] by the
//!   [`PaintHook`] and presented with `UpdateLayeredWindow`, so overlays
//!   keep per-pixel alpha;
//! - ownership is the `GWLP_HWNDPARENT` link;
//! - notifications for watched windows come from a window subclass.
//!
//! Window procedures cannot reach the engine, so notifications are queued
//! on a thread-local outbox. Drain it from the message loop with
//! [`drain_messages`] and forward each entry to
//! [`Airspace::handle_native_message`](airspace_core::Airspace::handle_native_message).
//! Min/max queries are synchronous and are answered inside the overlay
//! window procedure.
//!
//! This crate is empty on non-Windows targets.

#[cfg(windows)]
mod win32;

#[cfg(windows)]
pub use win32::{
    Frame, PaintHook, Win32Windows, drain_messages, hwnd, surface_id, with_min_max_info,
};
