// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity types for scene nodes, native surfaces, and engine objects.

use core::fmt;

/// A handle to a node in the host scene graph.
///
/// Scene implementations mint these with [`NodeId::new`]; the engine only
/// compares them and hands them back to [`SceneView`](crate::scene::SceneView)
/// queries.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    idx: u32,
    generation: u32,
}

impl NodeId {
    /// Creates a node handle from a slot index and generation counter.
    #[inline]
    #[must_use]
    pub const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// An opaque native window handle.
///
/// On Win32 this is the `HWND` value; other backends and test doubles pick
/// their own numbering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({:#x})", self.0)
    }
}

/// An opaque reference to the visual content hosted inside an overlay.
///
/// The content itself lives in the scene graph; the native layer only needs
/// to know which content root to present in which overlay surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(pub u64);

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

/// Generational handle types stored in engine slot storage.
pub(crate) trait SlotKey: Copy + Eq {
    fn from_parts(idx: u32, generation: u32) -> Self;
    fn idx(self) -> u32;
    fn generation(self) -> u32;
}

macro_rules! slot_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            idx: u32,
            generation: u32,
        }

        impl $name {
            /// Reassembles a handle from its parts, as found in recorded
            /// traces. The result only names a live object in the engine that
            /// minted it.
            #[inline]
            #[must_use]
            pub const fn from_raw(idx: u32, generation: u32) -> Self {
                Self { idx, generation }
            }

            /// Returns the raw slot index (for diagnostics only).
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.idx
            }

            /// Returns the generation counter.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.generation
            }
        }

        impl SlotKey for $name {
            #[inline]
            fn from_parts(idx: u32, generation: u32) -> Self {
                Self { idx, generation }
            }

            #[inline]
            fn idx(self) -> u32 {
                self.idx
            }

            #[inline]
            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}@gen{})"), self.idx, self.generation)
            }
        }
    };
}

slot_key!(
    /// A handle to an adorner: one floating overlay surface bound to a node.
    ///
    /// Becomes stale once the adorner is disposed.
    AdornerId
);

slot_key!(
    /// A handle to an adorner group: adorners sharing one owning surface.
    GroupId
);

slot_key!(
    /// A handle to a host group: the embedded regions of one container.
    HostGroupId
);

slot_key!(
    /// A handle to a registered [`HostHolder`](crate::host::HostHolder).
    HolderId
);

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn debug_formats_include_generation() {
        let id = AdornerId::from_parts(3, 1);
        assert_eq!(format!("{id:?}"), "AdornerId(3@gen1)");
        assert_eq!(format!("{:?}", NodeId::new(7, 0)), "NodeId(7@gen0)");
    }

    #[test]
    fn keys_compare_by_index_and_generation() {
        assert_eq!(GroupId::from_parts(1, 2), GroupId::from_parts(1, 2));
        assert_ne!(GroupId::from_parts(1, 2), GroupId::from_parts(1, 3));
    }
}
