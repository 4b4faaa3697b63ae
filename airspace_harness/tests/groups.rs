// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adorner groups: shared ownership, the z-order band and activation.

use airspace_core::connection::ConnectionFilter;
use airspace_core::geometry::PixelRect;
use airspace_core::id::{AdornerId, GroupId, NodeId, SurfaceId};
use airspace_core::{AdornerState, AirspaceError};
use airspace_harness::{Harness, NativeCall};
use airspace_scene::SurfaceAttachment;
use kurbo::Rect;

const WINDOW: PixelRect = PixelRect::new(100, 100, 800, 600);

fn overlay(h: &Harness, a: AdornerId) -> SurfaceId {
    h.airspace
        .adorner_surface(a)
        .unwrap()
        .expect("adorner should have a native surface")
}

/// One window whose root anchors a manager group with two members.
struct Pair {
    h: Harness,
    win: SurfaceId,
    root: NodeId,
    panels: [NodeId; 2],
    group: GroupId,
    members: [AdornerId; 2],
}

impl Pair {
    fn new() -> Self {
        Self::with_hidden_second(false)
    }

    fn with_hidden_second(hidden: bool) -> Self {
        let mut h = Harness::new();
        let (win, root) = h.open_window(WINDOW, 1.0);
        let a = h.add_node(root, Rect::new(10.0, 10.0, 60.0, 40.0));
        let b = h.add_node(root, Rect::new(10.0, 50.0, 60.0, 80.0));
        h.scene.set_hidden(b, hidden);
        let group = h
            .airspace
            .create_adorner_group(root, ConnectionFilter::AnySurface);
        let first = h.airspace.create_adorner(&h.scene, a, Some(group)).unwrap();
        let second = h.airspace.create_adorner(&h.scene, b, Some(group)).unwrap();
        h.pump();
        Self {
            h,
            win,
            root,
            panels: [a, b],
            group,
            members: [first, second],
        }
    }

    fn overlays(&self) -> [SurfaceId; 2] {
        self.members.map(|a| overlay(&self.h, a))
    }
}

#[test]
fn members_share_the_owner() {
    let p = Pair::new();
    let [a, b] = p.overlays();

    assert_eq!(p.h.airspace.is_owned(p.group), Ok(true));
    assert_eq!(p.h.airspace.group_owner(p.group), Ok(Some(p.win)));
    assert_eq!(p.h.airspace.group_members(p.group), Ok(&p.members[..]));
    for ov in [a, b] {
        assert_eq!(p.h.desktop().window(ov).unwrap().owner, Some(p.win));
    }
    // Each member joined at the front of the band.
    assert_eq!(p.h.desktop().z_order(), [b, a, p.win]);
}

#[test]
fn hidden_anchor_keeps_member_hidden_until_shown() {
    let mut p = Pair::with_hidden_second(true);
    let [a, b] = p.overlays();

    assert_eq!(
        p.h.airspace.adorner_state(p.members[0]),
        Ok(AdornerState::AttachedShown)
    );
    assert_eq!(
        p.h.airspace.adorner_state(p.members[1]),
        Ok(AdornerState::AttachedHidden)
    );
    assert_eq!(p.h.desktop().window(a).unwrap().owner, Some(p.win));
    assert_eq!(p.h.desktop().window(b).unwrap().owner, Some(p.win));

    p.h.desktop_mut().take_calls();
    p.h.scene.set_hidden(p.panels[1], false);
    p.h.pump();

    assert_eq!(
        p.h.airspace.adorner_state(p.members[1]),
        Ok(AdornerState::AttachedShown)
    );
    assert_eq!(
        p.h.desktop().calls(),
        [NativeCall::SetVisible {
            surface: b,
            visible: true,
        }]
    );
}

#[test]
fn activation_is_clamped_behind_foreign_surface() {
    let mut p = Pair::new();
    let [a, b] = p.overlays();
    let unrelated = p.h.desktop_mut().create_top_level(WINDOW);
    p.h.desktop_mut().set_z_order(&[unrelated, a, b, p.win]);

    // A click raises B above everything.
    p.h.desktop_mut().activate(b);
    assert_eq!(p.h.desktop().z_order(), [b, unrelated, a, p.win]);
    p.h.pump();

    assert_eq!(p.h.desktop().z_order(), [unrelated, b, a, p.win]);
}

#[test]
fn activation_at_the_front_reorders_the_band() {
    let mut p = Pair::new();
    let [a, b] = p.overlays();
    assert_eq!(p.h.desktop().z_order(), [b, a, p.win]);
    p.h.desktop_mut().take_calls();

    p.h.desktop_mut().activate(a);
    p.h.pump();

    // Nothing foreign is in front, so the band is left as activated.
    assert_eq!(p.h.desktop().z_order(), [a, b, p.win]);
    assert_eq!(
        p.h.desktop()
            .count_calls(|c| matches!(c, NativeCall::PlaceBelow { .. })),
        0
    );
}

#[test]
fn band_is_placed_when_owner_connects_later() {
    let mut h = Harness::new();
    let (w1, root) = h.open_window(WINDOW, 1.0);
    let a = h.add_node(root, Rect::new(0.0, 0.0, 50.0, 50.0));
    let b = h.add_node(root, Rect::new(50.0, 0.0, 100.0, 50.0));
    // The manager lives in a tree that is not presented yet.
    let remote = h.scene.create_node();
    let group = h
        .airspace
        .create_adorner_group(remote, ConnectionFilter::AnySurface);
    let first = h.airspace.create_adorner(&h.scene, a, Some(group)).unwrap();
    let second = h.airspace.create_adorner(&h.scene, b, Some(group)).unwrap();
    h.pump();

    assert_eq!(h.airspace.is_group_active(group), Ok(true));
    assert_eq!(h.airspace.is_owned(group), Ok(false));
    assert_eq!(h.airspace.adorner_state(first), Ok(AdornerState::AttachedHidden));
    let (ova, ovb) = (overlay(&h, first), overlay(&h, second));

    let w2 = h.desktop_mut().create_top_level(PixelRect::new(0, 0, 400, 300));
    h.desktop_mut().set_z_order(&[w1, ovb, w2, ova]);
    h.scene
        .attach_surface(remote, SurfaceAttachment::window(w2, 1.0));
    h.pump();

    assert_eq!(h.airspace.group_owner(group), Ok(Some(w2)));
    // Previous neighbour, members in insertion order, owner.
    assert_eq!(&h.desktop().z_order()[..4], [w1, ova, ovb, w2]);
    assert_eq!(h.desktop().window(ova).unwrap().owner, Some(w2));
    assert_eq!(h.airspace.adorner_state(second), Ok(AdornerState::AttachedShown));
}

#[test]
fn replacing_the_owner_moves_the_band_to_the_new_surface() {
    let mut p = Pair::new();
    let [a, b] = p.overlays();
    let w2 = p.h.desktop_mut().create_top_level(PixelRect::new(0, 0, 400, 300));
    assert_eq!(p.h.desktop().z_order(), [w2, b, a, p.win]);

    p.h.scene
        .attach_surface(p.root, SurfaceAttachment::window(w2, 1.0));
    p.h.pump();

    assert_eq!(p.h.airspace.group_owner(p.group), Ok(Some(w2)));
    assert!(!p.h.desktop().is_watched(p.win));
    assert!(p.h.desktop().is_watched(w2));
    // Same surfaces: the anchors never unloaded.
    assert_eq!(p.overlays(), [a, b]);
    for (member, ov) in p.members.into_iter().zip([a, b]) {
        assert_eq!(p.h.desktop().window(ov).unwrap().owner, Some(w2));
        assert_eq!(
            p.h.airspace.adorner_state(member),
            Ok(AdornerState::AttachedShown)
        );
    }
    // The new owner was front-most, so it moved behind the band.
    assert_eq!(p.h.desktop().z_order(), [a, b, w2, p.win]);
    assert_eq!(
        p.h.desktop().window(a).unwrap().bounds,
        PixelRect::new(10, 10, 50, 30)
    );
}

#[test]
fn front_most_owner_moves_behind_the_band() {
    let mut h = Harness::new();
    let (w1, root) = h.open_window(WINDOW, 1.0);
    let a = h.add_node(root, Rect::new(0.0, 0.0, 50.0, 50.0));
    let b = h.add_node(root, Rect::new(50.0, 0.0, 100.0, 50.0));
    let remote = h.scene.create_node();
    let group = h
        .airspace
        .create_adorner_group(remote, ConnectionFilter::AnySurface);
    let first = h.airspace.create_adorner(&h.scene, a, Some(group)).unwrap();
    let second = h.airspace.create_adorner(&h.scene, b, Some(group)).unwrap();
    h.pump();
    let (ova, ovb) = (overlay(&h, first), overlay(&h, second));

    // Opens in front of everything.
    let w2 = h.desktop_mut().create_top_level(PixelRect::new(0, 0, 400, 300));
    h.scene
        .attach_surface(remote, SurfaceAttachment::window(w2, 1.0));
    h.pump();

    assert_eq!(h.desktop().z_order(), [ova, ovb, w2, w1]);
}

#[test]
fn removing_the_last_member_releases_the_owner() {
    let mut p = Pair::new();
    let [a, _] = p.overlays();

    p.h.airspace.dispose_adorner(&p.h.scene, p.members[1]);
    assert_eq!(p.h.airspace.is_owned(p.group), Ok(true));
    assert_eq!(p.h.airspace.group_members(p.group), Ok(&p.members[..1]));
    assert!(p.h.desktop().is_watched(p.win));

    p.h.airspace.dispose_adorner(&p.h.scene, p.members[0]);
    assert_eq!(p.h.airspace.is_group_active(p.group), Ok(false));
    assert_eq!(p.h.airspace.is_owned(p.group), Ok(false));
    assert!(!p.h.desktop().is_watched(p.win));
    assert!(p.h.desktop().window(a).is_none());
}

#[test]
fn disposed_group_falls_back_to_singleton_groups() {
    let mut p = Pair::new();
    let [a, _] = p.overlays();

    p.h.airspace.dispose_adorner_group(&p.h.scene, p.group);
    assert_eq!(
        p.h.airspace.is_owned(p.group),
        Err(AirspaceError::GroupDisposed(p.group))
    );
    assert_eq!(p.h.airspace.adorner_group(p.members[0]), Ok(None));
    assert_eq!(
        p.h.airspace.adorner_state(p.members[0]),
        Ok(AdornerState::AttachedHidden)
    );
    let window = p.h.desktop().window(a).unwrap();
    assert_eq!(window.owner, None);
    assert!(!window.visible, "detached members are hidden");
    assert!(!p.h.desktop().is_watched(p.win));
    assert_eq!(
        p.h.airspace
            .create_adorner(&p.h.scene, p.panels[0], Some(p.group)),
        Err(AirspaceError::GroupDisposed(p.group))
    );

    // The next load joins a fresh group of its own.
    p.h.scene.detach_surface(p.root);
    p.h.pump();
    p.h.scene
        .attach_surface(p.root, SurfaceAttachment::window(p.win, 1.0));
    p.h.pump();

    let own = p.h.airspace.adorner_group(p.members[0]).unwrap().unwrap();
    assert_ne!(own, p.group);
    assert_eq!(p.h.airspace.group_owner(own), Ok(Some(p.win)));
    assert_eq!(
        p.h.airspace.adorner_state(p.members[0]),
        Ok(AdornerState::AttachedShown)
    );
}

#[test]
fn top_level_filter_ignores_other_roots() {
    let mut h = Harness::new();
    let popup = h.desktop_mut().create_top_level(PixelRect::new(0, 0, 200, 200));
    let root = h.scene.create_node();
    h.scene
        .attach_surface(root, SurfaceAttachment::other(popup, 1.0));
    let item = h.add_node(root, Rect::new(0.0, 0.0, 20.0, 20.0));
    let strict = h
        .airspace
        .create_adorner_group(root, ConnectionFilter::TopLevelWindow);
    let loose = h
        .airspace
        .create_adorner_group(root, ConnectionFilter::AnySurface);
    let a = h.airspace.create_adorner(&h.scene, item, Some(strict)).unwrap();
    let b = h.airspace.create_adorner(&h.scene, item, Some(loose)).unwrap();
    h.pump();

    assert_eq!(h.airspace.is_owned(strict), Ok(false));
    assert_eq!(h.airspace.adorner_state(a), Ok(AdornerState::AttachedHidden));
    assert_eq!(h.airspace.group_owner(loose), Ok(Some(popup)));
    assert_eq!(h.airspace.adorner_state(b), Ok(AdornerState::AttachedShown));
}
