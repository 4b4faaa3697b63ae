// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adorner placement, visibility and lifecycle on a simulated desktop.

use airspace_core::geometry::PixelRect;
use airspace_core::id::{AdornerId, ContentId, NodeId, SurfaceId};
use airspace_core::{AdornerState, AirspaceError};
use airspace_harness::{DEFAULT_MIN_TRACK, Harness, NativeCall};
use airspace_scene::SurfaceAttachment;
use kurbo::{Affine, Rect};

const WINDOW: PixelRect = PixelRect::new(100, 100, 800, 600);
const PANEL: Rect = Rect::new(10.0, 20.0, 110.0, 70.0);

/// A loaded window with one panel adorned by a single adorner.
struct Single {
    h: Harness,
    win: SurfaceId,
    root: NodeId,
    panel: NodeId,
    adorner: AdornerId,
}

impl Single {
    fn new() -> Self {
        let mut h = Harness::new();
        let (win, root) = h.open_window(WINDOW, 1.0);
        let panel = h.add_node(root, PANEL);
        h.pump();
        let adorner = h.airspace.create_adorner(&h.scene, panel, None).unwrap();
        h.pump();
        Self {
            h,
            win,
            root,
            panel,
            adorner,
        }
    }

    fn overlay(&self) -> SurfaceId {
        overlay(&self.h, self.adorner)
    }
}

fn overlay(h: &Harness, a: AdornerId) -> SurfaceId {
    h.airspace
        .adorner_surface(a)
        .unwrap()
        .expect("adorner should have a native surface")
}

fn set_bounds_calls(h: &Harness) -> usize {
    h.desktop()
        .count_calls(|c| matches!(c, NativeCall::SetBounds { .. }))
}

#[test]
fn adorner_is_placed_over_its_anchor() {
    let s = Single::new();
    let ov = s.overlay();

    assert_eq!(
        s.h.airspace.adorner_state(s.adorner),
        Ok(AdornerState::AttachedShown)
    );
    let window = s.h.desktop().window(ov).unwrap();
    assert_eq!(window.bounds, PixelRect::new(110, 120, 100, 50));
    assert_eq!(window.owner, Some(s.win));
    assert!(window.visible, "owned adorner over a visible anchor is shown");
    assert!(s.h.desktop().is_watched(s.win));
    assert_eq!(s.h.desktop().z_order(), [ov, s.win]);
}

#[test]
fn adorner_waits_for_its_anchor_to_load() {
    let mut h = Harness::new();
    let (_, root) = h.open_window(WINDOW, 1.0);
    let panel = h.add_node(root, PANEL);
    let a = h.airspace.create_adorner(&h.scene, panel, None).unwrap();

    assert_eq!(h.airspace.adorner_state(a), Ok(AdornerState::Detached));
    assert!(h.desktop().overlays().is_empty());

    h.pump();
    assert_eq!(h.airspace.adorner_state(a), Ok(AdornerState::AttachedShown));
}

#[test]
fn device_scale_applies_to_local_bounds() {
    let mut h = Harness::new();
    let (_, root) = h.open_window(WINDOW, 1.5);
    let panel = h.add_node(root, PANEL);
    h.pump();
    let a = h.airspace.create_adorner(&h.scene, panel, None).unwrap();

    let bounds = h.desktop().window(overlay(&h, a)).unwrap().bounds;
    assert_eq!(bounds, PixelRect::new(115, 130, 150, 75));
}

#[test]
fn size_is_clamped_to_owner_client_area() {
    let mut h = Harness::new();
    let (_, root) = h.open_window(WINDOW, 1.0);
    let panel = h.add_node(root, Rect::new(750.0, 580.0, 850.0, 640.0));
    h.pump();
    let a = h.airspace.create_adorner(&h.scene, panel, None).unwrap();

    let bounds = h.desktop().window(overlay(&h, a)).unwrap().bounds;
    assert_eq!(bounds, PixelRect::new(850, 680, 50, 20));
}

#[test]
fn unchanged_layout_issues_no_reposition() {
    let mut s = Single::new();
    let ov = s.overlay();
    s.h.desktop_mut().take_calls();

    // Same transform: a layout pass runs but the pixel rectangle is equal.
    s.h.scene
        .set_transform(s.panel, Affine::translate(PANEL.origin().to_vec2()));
    s.h.pump();
    assert_eq!(set_bounds_calls(&s.h), 0);

    s.h.scene
        .set_transform(s.panel, Affine::translate((30.0, 20.0)));
    s.h.pump();
    assert_eq!(
        s.h.desktop().calls(),
        [NativeCall::SetBounds {
            surface: ov,
            bounds: PixelRect::new(130, 120, 100, 50),
        }]
    );
}

#[test]
fn moving_the_owner_moves_the_adorner() {
    let mut s = Single::new();
    let ov = s.overlay();
    s.h.desktop_mut().take_calls();

    s.h.desktop_mut()
        .move_window(s.win, PixelRect::new(300, 50, 800, 600));
    s.h.pump();

    assert_eq!(
        s.h.desktop().calls(),
        [NativeCall::SetBounds {
            surface: ov,
            bounds: PixelRect::new(310, 70, 100, 50),
        }]
    );
}

#[test]
fn hiding_the_anchor_hides_without_moving() {
    let mut s = Single::new();
    let ov = s.overlay();
    s.h.desktop_mut().take_calls();

    s.h.scene.set_hidden(s.root, true);
    s.h.pump();
    assert_eq!(
        s.h.airspace.adorner_state(s.adorner),
        Ok(AdornerState::AttachedHidden)
    );
    assert_eq!(
        s.h.desktop().calls(),
        [NativeCall::SetVisible {
            surface: ov,
            visible: false,
        }]
    );

    s.h.scene.set_hidden(s.root, false);
    s.h.pump();
    assert!(s.h.desktop().window(ov).unwrap().visible);
    assert_eq!(set_bounds_calls(&s.h), 0);
}

#[test]
fn unload_destroys_surface_and_reload_recreates_it() {
    let mut s = Single::new();
    s.h.airspace
        .set_adornment(s.adorner, Some(ContentId(7)))
        .unwrap();
    let first = s.overlay();

    s.h.scene.detach_surface(s.root);
    s.h.pump();
    assert_eq!(
        s.h.airspace.adorner_state(s.adorner),
        Ok(AdornerState::Detached)
    );
    assert!(s.h.desktop().overlays().is_empty());
    assert!(!s.h.desktop().is_watched(s.win));
    assert_eq!(
        s.h.desktop()
            .count_calls(|c| *c == NativeCall::DestroyOverlay(first)),
        1
    );

    s.h.scene
        .attach_surface(s.root, SurfaceAttachment::window(s.win, 1.0));
    s.h.pump();
    let second = s.overlay();
    assert_ne!(first, second);
    assert_eq!(
        s.h.airspace.adorner_state(s.adorner),
        Ok(AdornerState::AttachedShown)
    );
    let window = s.h.desktop().window(second).unwrap();
    assert_eq!(window.owner, Some(s.win));
    assert_eq!(window.content, Some(ContentId(7)));
    assert!(s.h.desktop().is_watched(s.win));
}

#[test]
fn content_is_mounted_into_the_live_surface() {
    let mut s = Single::new();
    let ov = s.overlay();
    s.h.airspace
        .set_adornment(s.adorner, Some(ContentId(3)))
        .unwrap();

    assert_eq!(s.h.airspace.adornment(s.adorner), Ok(Some(ContentId(3))));
    assert_eq!(s.h.desktop().window(ov).unwrap().content, Some(ContentId(3)));
}

#[test]
fn disposal_releases_everything() {
    let mut s = Single::new();
    let ov = s.overlay();
    let group = s.h.airspace.adorner_group(s.adorner).unwrap().unwrap();

    s.h.airspace.dispose_adorner(&s.h.scene, s.adorner);
    // Disposing twice is harmless.
    s.h.airspace.dispose_adorner(&s.h.scene, s.adorner);

    assert!(s.h.desktop().window(ov).is_none());
    assert!(!s.h.desktop().is_watched(s.win));
    assert_eq!(
        s.h.airspace.adorner_state(s.adorner),
        Err(AirspaceError::AdornerDisposed(s.adorner))
    );
    assert_eq!(
        s.h.airspace.set_adornment(s.adorner, Some(ContentId(1))),
        Err(AirspaceError::AdornerDisposed(s.adorner))
    );
    // The singleton group went with it.
    assert_eq!(
        s.h.airspace.is_owned(group),
        Err(AirspaceError::GroupDisposed(group))
    );
}

#[test]
fn min_track_is_zeroed_for_overlays_only() {
    let s = Single::new();
    let ov = s.overlay();
    let mut h = s.h;

    assert_eq!(h.query_min_max(ov).min_track, (0, 0));
    assert_eq!(h.query_min_max(s.win).min_track, DEFAULT_MIN_TRACK);
}

#[test]
fn registry_creates_reuses_and_clears() {
    let mut h = Harness::new();
    let (_, root) = h.open_window(WINDOW, 1.0);
    let panel = h.add_node(root, PANEL);
    h.pump();

    let first = h
        .registry
        .set_adornment(&mut h.airspace, &h.scene, panel, Some(ContentId(1)), None)
        .unwrap()
        .unwrap();
    let again = h
        .registry
        .set_adornment(&mut h.airspace, &h.scene, panel, Some(ContentId(2)), None)
        .unwrap();
    assert_eq!(again, Some(first));
    assert_eq!(h.registry.adorner_for(panel), Some(first));
    assert_eq!(h.desktop().overlays().len(), 1);
    let ov = overlay(&h, first);
    assert_eq!(h.desktop().window(ov).unwrap().content, Some(ContentId(2)));

    let cleared = h
        .registry
        .set_adornment(&mut h.airspace, &h.scene, panel, None, None)
        .unwrap();
    assert_eq!(cleared, None);
    assert!(h.registry.is_empty());
    assert!(!h.airspace.contains_adorner(first));
    assert!(h.desktop().overlays().is_empty());
}
