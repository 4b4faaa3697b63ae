// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: adorners, adorner groups, and host groups in one store.
//!
//! [`Airspace`] owns every engine object in generational slot storage and
//! addresses them by handle, so groups and members can refer to each other
//! without shared ownership. It is driven from the outside by two pumps:
//!
//! - [`handle_scene_event`](Airspace::handle_scene_event) for load, unload,
//!   visibility, layout and surface changes reported by the scene graph;
//! - [`handle_native_message`](Airspace::handle_native_message) for
//!   activation, position and min/max notifications from the window manager.
//!
//! Deferred work (asynchronous expand passes) is queued on an owned
//! [`Dispatcher`] and runs when the application calls
//! [`run_pending`](Airspace::run_pending).

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::adorner::{Adorner, AdornerState};
use crate::connection::{ConnectionEvent, ConnectionFilter};
use crate::dispatch::{Dispatcher, Priority};
use crate::error::AirspaceError;
use crate::geometry;
use crate::group::{self, AdornerGroup};
use crate::host::{self, Corner, HostGroup, HostHolder};
use crate::id::{AdornerId, ContentId, GroupId, HolderId, HostGroupId, NodeId, SurfaceId};
use crate::native::{NativeMessage, NativeWindows};
use crate::scene::{SceneEvent, SceneView, SurfaceSource};
use crate::slots::Slots;
use crate::trace::{
    ActivationClampedEvent, ExpandScheduledEvent, HostPassEvent, HostPassKind,
    OwnerConnectedEvent, OwnerDisconnectedEvent, TraceSink, Tracer, ZOrderPlacedEvent,
};

/// Deferred engine work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    ExpandHosts(HostGroupId),
}

struct HolderEntry {
    holder: Box<dyn HostHolder>,
    /// Node and manager for the connects-to-host-manager binding.
    binding: Option<(NodeId, HostGroupId)>,
    connects: bool,
    /// The manager this holder joined through its binding.
    joined: Option<HostGroupId>,
}

impl core::fmt::Debug for HolderEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HolderEntry")
            .field("binding", &self.binding)
            .field("connects", &self.connects)
            .field("joined", &self.joined)
            .finish_non_exhaustive()
    }
}

/// Native surface coordination for one UI thread.
pub struct Airspace<W> {
    windows: W,
    adorners: Slots<AdornerId, Adorner>,
    groups: Slots<GroupId, AdornerGroup>,
    host_groups: Slots<HostGroupId, HostGroup>,
    holders: Slots<HolderId, HolderEntry>,
    /// Overlay surface to the adorner that owns it.
    overlays: HashMap<SurfaceId, AdornerId>,
    dispatcher: Dispatcher<Task>,
    expand_priority: Priority,
    tracer: Tracer,
}

impl<W> core::fmt::Debug for Airspace<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Airspace")
            .field("adorners", &self.adorners.iter().count())
            .field("groups", &self.groups.iter().count())
            .field("host_groups", &self.host_groups.iter().count())
            .field("holders", &self.holders.iter().count())
            .field("pending", &self.dispatcher.len())
            .finish_non_exhaustive()
    }
}

impl<W: NativeWindows> Airspace<W> {
    /// Creates an empty engine driving `windows`.
    #[must_use]
    pub fn new(windows: W) -> Self {
        Self {
            windows,
            adorners: Slots::new(),
            groups: Slots::new(),
            host_groups: Slots::new(),
            holders: Slots::new(),
            overlays: HashMap::new(),
            dispatcher: Dispatcher::new(),
            expand_priority: Priority::Input,
            tracer: Tracer::none(),
        }
    }

    /// Sets the priority used for asynchronous expand passes.
    #[must_use]
    pub fn with_expand_priority(mut self, priority: Priority) -> Self {
        self.expand_priority = priority;
        self
    }

    /// The priority used for asynchronous expand passes.
    #[must_use]
    pub fn expand_priority(&self) -> Priority {
        self.expand_priority
    }

    /// Installs or removes the trace sink.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.tracer.set_sink(sink);
    }

    /// The native window backend.
    #[must_use]
    pub fn windows(&self) -> &W {
        &self.windows
    }

    /// Mutable access to the native window backend.
    pub fn windows_mut(&mut self) -> &mut W {
        &mut self.windows
    }

    // -----------------------------------------------------------------------
    // Adorners
    // -----------------------------------------------------------------------

    /// Creates an adorner for `anchor`.
    ///
    /// With a `context` group the adorner joins it whenever the anchor
    /// loads; otherwise it creates and joins its own singleton group. If the
    /// anchor is already loaded the native surface is created immediately.
    pub fn create_adorner(
        &mut self,
        scene: &dyn SceneView,
        anchor: NodeId,
        context: Option<GroupId>,
    ) -> Result<AdornerId, AirspaceError> {
        if let Some(g) = context {
            self.group(g)?;
        }
        let id = self.adorners.insert(Adorner::new(anchor, context));
        if scene.is_loaded(anchor) {
            self.load_adorner(scene, id);
        }
        Ok(id)
    }

    /// Disposes an adorner: leaves its group, unmounts its content and
    /// destroys its native surface. Disposing twice is a no-op.
    pub fn dispose_adorner(&mut self, scene: &dyn SceneView, id: AdornerId) {
        if !self.adorners.contains(id) {
            return;
        }
        self.disconnect_from_group(scene, id);
        let Some(mut adorner) = self.adorners.remove(id) else {
            return;
        };
        adorner.content = None;
        if let Some(surface) = adorner.destroy_surface(&mut self.windows) {
            self.overlays.remove(&surface);
        }
        if let Some(g) = adorner.own_group {
            self.remove_group(scene, g);
        }
    }

    /// Returns whether `id` names a live adorner.
    #[must_use]
    pub fn contains_adorner(&self, id: AdornerId) -> bool {
        self.adorners.contains(id)
    }

    /// The content presented by the adorner.
    pub fn adornment(&self, id: AdornerId) -> Result<Option<ContentId>, AirspaceError> {
        Ok(self.adorner(id)?.content)
    }

    /// Sets the content presented by the adorner. It is mounted into the
    /// native surface immediately if the surface exists.
    pub fn set_adornment(
        &mut self,
        id: AdornerId,
        content: Option<ContentId>,
    ) -> Result<(), AirspaceError> {
        let adorner = self
            .adorners
            .get_mut(id)
            .ok_or(AirspaceError::AdornerDisposed(id))?;
        adorner.set_content(&mut self.windows, content);
        Ok(())
    }

    /// The adorner's native surface lifecycle state.
    pub fn adorner_state(&self, id: AdornerId) -> Result<AdornerState, AirspaceError> {
        Ok(self.adorner(id)?.state())
    }

    /// The adorner's native surface, if its anchor is loaded.
    pub fn adorner_surface(&self, id: AdornerId) -> Result<Option<SurfaceId>, AirspaceError> {
        Ok(self.adorner(id)?.surface())
    }

    /// The group the adorner currently belongs to.
    pub fn adorner_group(&self, id: AdornerId) -> Result<Option<GroupId>, AirspaceError> {
        Ok(self.adorner(id)?.group)
    }

    fn adorner(&self, id: AdornerId) -> Result<&Adorner, AirspaceError> {
        self.adorners
            .get(id)
            .ok_or(AirspaceError::AdornerDisposed(id))
    }

    fn load_adorner(&mut self, scene: &dyn SceneView, id: AdornerId) {
        let Some(adorner) = self.adorners.get_mut(id) else {
            return;
        };
        if adorner.surface().is_some() {
            return;
        }
        if let Some(local) = geometry::client_bounds(scene, adorner.anchor) {
            adorner.update_local_bounds(id, local, &mut self.windows, &mut self.tracer);
        }
        let surface = adorner.create_surface(&mut self.windows);
        self.overlays.insert(surface, id);
        self.connect_to_group(scene, id);
    }

    fn unload_adorner(&mut self, scene: &dyn SceneView, id: AdornerId) {
        self.disconnect_from_group(scene, id);
        let Some(adorner) = self.adorners.get_mut(id) else {
            return;
        };
        if let Some(surface) = adorner.destroy_surface(&mut self.windows) {
            self.overlays.remove(&surface);
        }
    }

    fn connect_to_group(&mut self, scene: &dyn SceneView, id: AdornerId) {
        self.disconnect_from_group(scene, id);
        let Some(adorner) = self.adorners.get(id) else {
            return;
        };
        let (anchor, context, own) = (adorner.anchor, adorner.context, adorner.own_group);
        let live = |g: &GroupId| self.groups.contains(*g);
        let g = match context.filter(live).or_else(|| own.filter(live)) {
            Some(g) => g,
            None => {
                let g = self
                    .groups
                    .insert(AdornerGroup::new(anchor, ConnectionFilter::AnySurface));
                if let Some(adorner) = self.adorners.get_mut(id) {
                    adorner.own_group = Some(g);
                }
                g
            }
        };
        self.group_add(scene, g, id);
    }

    fn disconnect_from_group(&mut self, scene: &dyn SceneView, id: AdornerId) {
        if let Some(g) = self.adorners.get(id).and_then(|a| a.group) {
            self.group_remove(scene, g, id);
        }
    }

    /// Shown iff the adorner's group is owned and the anchor is visible.
    fn needs_to_appear(&self, scene: &dyn SceneView, id: AdornerId) -> bool {
        let Some(adorner) = self.adorners.get(id) else {
            return false;
        };
        let owned = adorner
            .group
            .and_then(|g| self.groups.get(g))
            .is_some_and(|g| g.is_owned() && g.members.contains(&id));
        owned && scene.is_visible(adorner.anchor)
    }

    fn invalidate_appearance(&mut self, scene: &dyn SceneView, id: AdornerId) {
        let needs = self.needs_to_appear(scene, id);
        if let Some(adorner) = self.adorners.get_mut(id) {
            adorner.invalidate_appearance(id, needs, &mut self.windows, &mut self.tracer);
        }
    }

    fn surface_of(&self, id: AdornerId) -> Option<SurfaceId> {
        self.adorners.get(id).and_then(Adorner::surface)
    }

    // -----------------------------------------------------------------------
    // Adorner groups
    // -----------------------------------------------------------------------

    /// Creates a manager group anchored at `anchor`.
    ///
    /// Adorners created with this group as context join it. The group owns
    /// whichever surface `anchor` is presented through, subject to `filter`.
    pub fn create_adorner_group(&mut self, anchor: NodeId, filter: ConnectionFilter) -> GroupId {
        self.groups.insert(AdornerGroup::new(anchor, filter))
    }

    /// Disposes a manager group. Members are detached and hidden; they join
    /// their own singleton groups the next time their anchors load.
    pub fn dispose_adorner_group(&mut self, scene: &dyn SceneView, g: GroupId) {
        self.remove_group(scene, g);
    }

    /// Whether the group is currently owned by a native surface.
    pub fn is_owned(&self, g: GroupId) -> Result<bool, AirspaceError> {
        Ok(self.group(g)?.is_owned())
    }

    /// The group's owning surface.
    pub fn group_owner(&self, g: GroupId) -> Result<Option<SurfaceId>, AirspaceError> {
        Ok(self.group(g)?.owner)
    }

    /// The group's members in insertion order.
    pub fn group_members(&self, g: GroupId) -> Result<&[AdornerId], AirspaceError> {
        Ok(&self.group(g)?.members)
    }

    /// Whether the group's connection is tracking its anchor's surface.
    pub fn is_group_active(&self, g: GroupId) -> Result<bool, AirspaceError> {
        Ok(self.group(g)?.connection.is_activated())
    }

    fn group(&self, g: GroupId) -> Result<&AdornerGroup, AirspaceError> {
        self.groups.get(g).ok_or(AirspaceError::GroupDisposed(g))
    }

    fn remove_group(&mut self, scene: &dyn SceneView, g: GroupId) {
        let Some(group) = self.groups.get(g) else {
            return;
        };
        for a in group.members.clone() {
            self.group_remove(scene, g, a);
        }
        self.deactivate_group(scene, g);
        self.groups.remove(g);
    }

    fn group_add(&mut self, scene: &dyn SceneView, g: GroupId, id: AdornerId) {
        self.activate_group(scene, g);
        let Some(group) = self.groups.get_mut(g) else {
            return;
        };
        group.insert(id);
        let owner = group.owner;
        if let Some(adorner) = self.adorners.get_mut(id) {
            adorner.group = Some(g);
        }
        let Some(owner) = owner else {
            return;
        };
        if let Some(surface) = self.surface_of(id) {
            self.windows.set_owner(surface, Some(owner));
            self.activate_in_group_limits(g, id);
        }
        self.invalidate_appearance(scene, id);
        let bounds = self.windows.client_bounds_on_screen(owner);
        if let Some(adorner) = self.adorners.get_mut(id) {
            adorner.update_owner_bounds(id, bounds, &mut self.windows, &mut self.tracer);
        }
    }

    fn group_remove(&mut self, scene: &dyn SceneView, g: GroupId, id: AdornerId) {
        let Some(group) = self.groups.get_mut(g) else {
            return;
        };
        group.remove(id);
        let owned = group.is_owned();
        let empty = group.members.is_empty();
        if let Some(adorner) = self.adorners.get_mut(id) {
            if adorner.group == Some(g) {
                adorner.group = None;
            }
        }
        if owned {
            if let Some(surface) = self.surface_of(id) {
                self.windows.set_owner(surface, None);
            }
            self.invalidate_appearance(scene, id);
        }
        if empty {
            self.deactivate_group(scene, g);
        }
    }

    fn activate_group(&mut self, scene: &dyn SceneView, g: GroupId) {
        let event = self
            .groups
            .get_mut(g)
            .and_then(|group| group.connection.activate(scene));
        if let Some(event) = event {
            self.apply_connection(scene, g, event);
        }
    }

    fn deactivate_group(&mut self, scene: &dyn SceneView, g: GroupId) {
        let event = self
            .groups
            .get_mut(g)
            .and_then(|group| group.connection.deactivate(scene));
        if let Some(event) = event {
            self.apply_connection(scene, g, event);
        }
        // The scene may already have dropped the surface; an inactive group
        // must not stay owned.
        self.disconnect_owner(scene, g);
    }

    fn apply_connection(&mut self, scene: &dyn SceneView, g: GroupId, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connected(source) => self.connect_owner(scene, g, source),
            ConnectionEvent::Disconnected(source) => {
                let owner = self.groups.get(g).and_then(|group| group.owner);
                if owner == Some(source.surface) {
                    self.disconnect_owner(scene, g);
                }
            }
        }
    }

    fn connect_owner(&mut self, scene: &dyn SceneView, g: GroupId, source: SurfaceSource) {
        if self.groups.get(g).is_some_and(AdornerGroup::is_owned) {
            self.disconnect_owner(scene, g);
        }
        let Some(group) = self.groups.get_mut(g) else {
            return;
        };
        let owner = source.surface;
        group.owner = Some(owner);
        let members = group.members.clone();
        self.windows.watch(owner);
        self.tracer.owner_connected(&OwnerConnectedEvent {
            group: g,
            owner,
            members: members.len(),
        });
        if members.is_empty() {
            return;
        }

        let surfaces: Vec<SurfaceId> = members.iter().filter_map(|a| self.surface_of(*a)).collect();
        for &surface in &surfaces {
            self.windows.set_owner(surface, Some(owner));
        }
        group::place_band(&mut self.windows, &mut self.tracer, owner, &surfaces);
        self.tracer.z_order_placed(&ZOrderPlacedEvent {
            group: g,
            owner,
            members: surfaces.len(),
        });
        self.push_owner_bounds(g);
        for a in members {
            self.invalidate_appearance(scene, a);
        }
    }

    fn disconnect_owner(&mut self, scene: &dyn SceneView, g: GroupId) {
        let Some(group) = self.groups.get_mut(g) else {
            return;
        };
        let Some(owner) = group.owner.take() else {
            return;
        };
        let members = group.members.clone();
        self.windows.unwatch(owner);
        for &a in &members {
            if let Some(surface) = self.surface_of(a) {
                self.windows.set_owner(surface, None);
            }
        }
        for a in members {
            self.invalidate_appearance(scene, a);
        }
        self.tracer
            .owner_disconnected(&OwnerDisconnectedEvent { group: g, owner });
    }

    /// Sends the owner's current client area on screen to every member.
    fn push_owner_bounds(&mut self, g: GroupId) {
        let Some(group) = self.groups.get(g) else {
            return;
        };
        let Some(owner) = group.owner else {
            return;
        };
        let bounds = self.windows.client_bounds_on_screen(owner);
        for &a in &group.members {
            if let Some(adorner) = self.adorners.get_mut(a) {
                adorner.update_owner_bounds(a, bounds, &mut self.windows, &mut self.tracer);
            }
        }
    }

    /// Restores `id` to the front of its group's band after activation.
    fn activate_in_group_limits(&mut self, g: GroupId, id: AdornerId) {
        let Some(group) = self.groups.get(g) else {
            return;
        };
        let Some(owner) = group.owner else {
            return;
        };
        if !group.members.contains(&id) {
            return;
        }
        let Some(target) = self.surface_of(id) else {
            return;
        };
        let siblings: Vec<SurfaceId> = group
            .members
            .iter()
            .filter_map(|a| self.surface_of(*a))
            .collect();
        let below = group::clamp_into_band(&mut self.windows, &mut self.tracer, owner, target, |s| {
            siblings.contains(&s)
        });
        self.tracer.activation_clamped(&ActivationClampedEvent {
            group: g,
            adorner: id,
            below,
        });
    }

    // -----------------------------------------------------------------------
    // Holders
    // -----------------------------------------------------------------------

    /// Registers a holder so it can join host groups.
    pub fn register_holder(&mut self, holder: Box<dyn HostHolder>) -> HolderId {
        self.holders.insert(HolderEntry {
            holder,
            binding: None,
            connects: false,
            joined: None,
        })
    }

    /// Removes a holder from every host group and returns it.
    pub fn unregister_holder(&mut self, h: HolderId) -> Result<Box<dyn HostHolder>, AirspaceError> {
        let entry = self.holders.remove(h).ok_or(AirspaceError::UnknownHolder(h))?;
        for g in self.host_groups.keys_where(|group| group.holders.contains(&h)) {
            if let Some(group) = self.host_groups.get_mut(g) {
                group.holders.retain(|x| *x != h);
            }
        }
        Ok(entry.holder)
    }

    /// The registered holder.
    pub fn holder(&self, h: HolderId) -> Result<&dyn HostHolder, AirspaceError> {
        Ok(&*self.entry(h)?.holder)
    }

    /// Forwards a new layout rectangle to the holder.
    pub fn report_host_bounds(&mut self, h: HolderId, bounds: Rect) -> Result<(), AirspaceError> {
        let entry = self
            .holders
            .get_mut(h)
            .ok_or(AirspaceError::UnknownHolder(h))?;
        entry.holder.report_bounds(&mut self.windows, bounds);
        Ok(())
    }

    fn entry(&self, h: HolderId) -> Result<&HolderEntry, AirspaceError> {
        self.holders.get(h).ok_or(AirspaceError::UnknownHolder(h))
    }

    // -----------------------------------------------------------------------
    // Host groups
    // -----------------------------------------------------------------------

    /// Creates the host group for `container`.
    ///
    /// When the container loads the group schedules an asynchronous expand;
    /// when it unloads the group collapses every holder with bounds frozen.
    pub fn create_host_group(&mut self, container: NodeId) -> HostGroupId {
        self.host_groups.insert(HostGroup::new(container))
    }

    /// Disposes a host group. Holders stay registered; a pending expand
    /// pass for the group is dropped when it comes up.
    pub fn dispose_host_group(&mut self, g: HostGroupId) {
        if self.host_groups.remove(g).is_none() {
            return;
        }
        for h in self.holders.keys_where(|entry| entry.joined == Some(g)) {
            if let Some(entry) = self.holders.get_mut(h) {
                entry.joined = None;
            }
        }
    }

    /// Adds a holder to the group. Unless an asynchronous expand is pending,
    /// the holder is expanded right away so it cannot stay collapsed.
    pub fn add_host(&mut self, g: HostGroupId, h: HolderId) -> Result<(), AirspaceError> {
        let group = self
            .host_groups
            .get_mut(g)
            .ok_or(AirspaceError::HostGroupDisposed(g))?;
        let entry = self
            .holders
            .get_mut(h)
            .ok_or(AirspaceError::UnknownHolder(h))?;
        if !group.holders.contains(&h) {
            group.holders.push(h);
        }
        if !group.expand_scheduled {
            entry.holder.expand(&mut self.windows);
        }
        Ok(())
    }

    /// Removes a holder from the group without touching it.
    pub fn remove_host(&mut self, g: HostGroupId, h: HolderId) -> Result<(), AirspaceError> {
        let group = self.host_group_mut(g)?;
        group.holders.retain(|x| *x != h);
        Ok(())
    }

    /// The group's holders in insertion order.
    pub fn host_group_holders(&self, g: HostGroupId) -> Result<&[HolderId], AirspaceError> {
        Ok(&self.host_group(g)?.holders)
    }

    /// Collapses every holder, nearest the union's bottom-right corner first.
    pub fn collapse_hosts(&mut self, g: HostGroupId, freeze_bounds: bool) -> Result<(), AirspaceError> {
        self.host_group(g)?;
        self.collapse_pass(g, freeze_bounds);
        Ok(())
    }

    /// Freezes every holder's bounds without collapsing.
    pub fn freeze_host_bounds(&mut self, g: HostGroupId) -> Result<(), AirspaceError> {
        let holders = self.host_group(g)?.holders.clone();
        for &h in &holders {
            if let Some(entry) = self.holders.get_mut(h) {
                entry.holder.freeze_bounds();
            }
        }
        self.trace_pass(g, HostPassKind::Freeze, holders.len());
        Ok(())
    }

    /// Expands every holder, nearest the union's top-left corner first.
    pub fn expand_hosts(&mut self, g: HostGroupId) -> Result<(), AirspaceError> {
        self.host_group(g)?;
        self.expand_pass(g);
        Ok(())
    }

    /// Queues one expand pass. Requests made while a pass is pending are
    /// absorbed by it.
    pub fn expand_hosts_async(&mut self, g: HostGroupId) -> Result<(), AirspaceError> {
        self.host_group(g)?;
        self.schedule_expand(g);
        Ok(())
    }

    /// Collapses with bounds frozen now and expands again later.
    pub fn refresh_hosts_async(&mut self, g: HostGroupId) -> Result<(), AirspaceError> {
        self.collapse_hosts(g, true)?;
        self.expand_hosts_async(g)
    }

    /// Whether an asynchronous expand pass is pending.
    pub fn is_expand_scheduled(&self, g: HostGroupId) -> Result<bool, AirspaceError> {
        Ok(self.host_group(g)?.expand_scheduled)
    }

    fn host_group(&self, g: HostGroupId) -> Result<&HostGroup, AirspaceError> {
        self.host_groups
            .get(g)
            .ok_or(AirspaceError::HostGroupDisposed(g))
    }

    fn host_group_mut(&mut self, g: HostGroupId) -> Result<&mut HostGroup, AirspaceError> {
        self.host_groups
            .get_mut(g)
            .ok_or(AirspaceError::HostGroupDisposed(g))
    }

    fn collapse_pass(&mut self, g: HostGroupId, freeze_bounds: bool) {
        let order = self.pass_order(g, Corner::BottomRight);
        for &h in &order {
            if let Some(entry) = self.holders.get_mut(h) {
                entry.holder.collapse(&mut self.windows, freeze_bounds);
            }
        }
        self.trace_pass(g, HostPassKind::Collapse, order.len());
    }

    fn expand_pass(&mut self, g: HostGroupId) {
        let order = self.pass_order(g, Corner::TopLeft);
        for &h in &order {
            if let Some(entry) = self.holders.get_mut(h) {
                entry.holder.expand(&mut self.windows);
            }
        }
        self.trace_pass(g, HostPassKind::Expand, order.len());
    }

    fn schedule_expand(&mut self, g: HostGroupId) {
        let Some(group) = self.host_groups.get_mut(g) else {
            return;
        };
        let coalesced = group.expand_scheduled;
        if !coalesced {
            group.expand_scheduled = true;
            self.dispatcher.post(self.expand_priority, Task::ExpandHosts(g));
        }
        self.tracer.expand_scheduled(&ExpandScheduledEvent {
            group: g,
            coalesced,
        });
    }

    /// Holders of a live group in pass order; empty for a disposed group.
    fn pass_order(&self, g: HostGroupId, corner: Corner) -> Vec<HolderId> {
        let Some(group) = self.host_groups.get(g) else {
            return Vec::new();
        };
        let bounds: Vec<(HolderId, Rect)> = group
            .holders
            .iter()
            .filter_map(|&h| {
                let entry = self.holders.get(h)?;
                Some((h, entry.holder.latest_bounds()))
            })
            .collect();
        host::pass_order(&bounds, corner)
    }

    fn trace_pass(&mut self, g: HostGroupId, kind: HostPassKind, holders: usize) {
        if holders > 0 {
            self.tracer.host_pass(&HostPassEvent {
                group: g,
                kind,
                holders,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Connects-to-host-manager binding
    // -----------------------------------------------------------------------

    /// Binds a holder to `node` and the host group `manager`.
    ///
    /// While the binding is enabled (see
    /// [`set_connects_to_host_manager`](Self::set_connects_to_host_manager))
    /// the holder joins `manager` whenever `node` loads and leaves it when
    /// `node` unloads.
    pub fn bind_holder(
        &mut self,
        scene: &dyn SceneView,
        h: HolderId,
        node: NodeId,
        manager: HostGroupId,
    ) -> Result<(), AirspaceError> {
        self.host_group(manager)?;
        self.entry(h)?;
        self.leave_host_manager(h);
        let entry = self
            .holders
            .get_mut(h)
            .ok_or(AirspaceError::UnknownHolder(h))?;
        entry.binding = Some((node, manager));
        if entry.connects && scene.is_loaded(node) {
            self.join_host_manager(h);
        }
        Ok(())
    }

    /// Enables or disables the holder's host-manager binding. Enabling while
    /// the bound node is loaded joins immediately; disabling leaves
    /// immediately.
    pub fn set_connects_to_host_manager(
        &mut self,
        scene: &dyn SceneView,
        h: HolderId,
        enabled: bool,
    ) -> Result<(), AirspaceError> {
        let entry = self
            .holders
            .get_mut(h)
            .ok_or(AirspaceError::UnknownHolder(h))?;
        if entry.connects == enabled {
            return Ok(());
        }
        entry.connects = enabled;
        if !enabled {
            self.leave_host_manager(h);
        } else if entry.binding.is_some_and(|(node, _)| scene.is_loaded(node)) {
            self.join_host_manager(h);
        }
        Ok(())
    }

    /// Whether the holder's host-manager binding is enabled.
    pub fn connects_to_host_manager(&self, h: HolderId) -> Result<bool, AirspaceError> {
        Ok(self.entry(h)?.connects)
    }

    fn join_host_manager(&mut self, h: HolderId) {
        let Some((_, manager)) = self.holders.get(h).and_then(|e| e.binding) else {
            return;
        };
        if self.holders.get(h).is_some_and(|e| e.joined == Some(manager)) {
            return;
        }
        self.leave_host_manager(h);
        if self.add_host(manager, h).is_ok() {
            if let Some(entry) = self.holders.get_mut(h) {
                entry.joined = Some(manager);
            }
        }
    }

    fn leave_host_manager(&mut self, h: HolderId) {
        let Some(joined) = self.holders.get_mut(h).and_then(|e| e.joined.take()) else {
            return;
        };
        if let Some(group) = self.host_groups.get_mut(joined) {
            group.holders.retain(|x| *x != h);
        }
    }

    // -----------------------------------------------------------------------
    // Event pumps
    // -----------------------------------------------------------------------

    /// Reacts to one scene notification.
    pub fn handle_scene_event(&mut self, scene: &dyn SceneView, event: &SceneEvent) {
        match *event {
            SceneEvent::Loaded(node) => {
                for a in self.adorners.keys_where(|a| a.anchor == node) {
                    self.load_adorner(scene, a);
                }
                for g in self.host_groups.keys_where(|g| g.container == node) {
                    self.schedule_expand(g);
                }
                for h in self.bound_holders(node) {
                    self.join_host_manager(h);
                }
            }
            SceneEvent::Unloaded(node) => {
                for a in self.adorners.keys_where(|a| a.anchor == node) {
                    self.unload_adorner(scene, a);
                }
                for g in self.host_groups.keys_where(|g| g.container == node) {
                    self.collapse_pass(g, true);
                }
                for h in self.bound_holders(node) {
                    self.leave_host_manager(h);
                }
            }
            SceneEvent::VisibilityChanged(node) => {
                for a in self.adorners.keys_where(|a| a.anchor == node) {
                    self.invalidate_appearance(scene, a);
                }
            }
            SceneEvent::LayoutUpdated => {
                for a in self.adorners.keys_where(|a| a.surface().is_some()) {
                    let Some(adorner) = self.adorners.get_mut(a) else {
                        continue;
                    };
                    if let Some(local) = geometry::client_bounds(scene, adorner.anchor) {
                        adorner.update_local_bounds(a, local, &mut self.windows, &mut self.tracer);
                    }
                }
            }
            SceneEvent::SurfaceChanged { node, old, new } => {
                let tracking = self.groups.keys_where(|g| {
                    g.connection.is_activated() && g.connection.anchor() == node
                });
                for g in tracking {
                    let Some(group) = self.groups.get(g) else {
                        continue;
                    };
                    let events: Vec<_> = group.connection.source_changed(old, new).collect();
                    for event in events {
                        self.apply_connection(scene, g, event);
                    }
                }
            }
        }
    }

    fn bound_holders(&self, node: NodeId) -> Vec<HolderId> {
        self.holders
            .keys_where(|e| e.connects && e.binding.is_some_and(|(n, _)| n == node))
    }

    /// Reacts to one native notification for `surface`.
    pub fn handle_native_message(&mut self, surface: SurfaceId, message: NativeMessage<'_>) {
        match message {
            NativeMessage::Activated => {
                let Some(&a) = self.overlays.get(&surface) else {
                    return;
                };
                let Some(g) = self.adorners.get(a).and_then(|ad| ad.group) else {
                    return;
                };
                self.activate_in_group_limits(g, a);
            }
            NativeMessage::PositionChanged => {
                for g in self.groups.keys_where(|g| g.owner == Some(surface)) {
                    self.push_owner_bounds(g);
                }
            }
            NativeMessage::MinMaxQuery(info) => {
                if self.overlays.contains_key(&surface) {
                    info.min_track = (0, 0);
                }
            }
        }
    }

    /// Runs every queued task and returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some((_, task)) = self.dispatcher.pop() {
            match task {
                Task::ExpandHosts(g) => {
                    if self.host_groups.contains(g) {
                        self.expand_pass(g);
                    }
                    if let Some(group) = self.host_groups.get_mut(g) {
                        group.expand_scheduled = false;
                    }
                }
            }
            ran += 1;
        }
        ran
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.dispatcher.len()
    }
}
