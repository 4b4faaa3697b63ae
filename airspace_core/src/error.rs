// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for engine operations.

use core::fmt;

use crate::id::{AdornerId, GroupId, HolderId, HostGroupId};

/// Errors returned by [`Airspace`](crate::Airspace) operations.
///
/// Only lifecycle misuse is reported. A missing native surface is a normal
/// state (the anchor is unloaded) and the corresponding operations quietly do
/// nothing instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AirspaceError {
    /// The adorner was disposed.
    AdornerDisposed(AdornerId),
    /// The adorner group was disposed.
    GroupDisposed(GroupId),
    /// The host group was disposed.
    HostGroupDisposed(HostGroupId),
    /// The holder handle does not name a registered holder.
    UnknownHolder(HolderId),
}

impl fmt::Display for AirspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdornerDisposed(id) => write!(f, "adorner {id:?} has been disposed"),
            Self::GroupDisposed(id) => write!(f, "adorner group {id:?} has been disposed"),
            Self::HostGroupDisposed(id) => write!(f, "host group {id:?} has been disposed"),
            Self::UnknownHolder(id) => write!(f, "holder {id:?} is not registered"),
        }
    }
}

impl core::error::Error for AirspaceError {}
