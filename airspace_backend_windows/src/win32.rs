// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `HWND`-based implementation of the native windowing contract.

#![expect(
    unsafe_code,
    reason = "window management is only reachable through the Win32 FFI"
)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ffi::c_void;
use std::sync::Once;

use airspace_core::geometry::PixelRect;
use airspace_core::id::{ContentId, SurfaceId};
use airspace_core::native::{MessageKind, MinMaxInfo, NativeWindows};
use kurbo::Rect;
use windows::Win32::Foundation::{
    COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, SIZE, WPARAM,
};
use windows::Win32::Graphics::Gdi::{
    AC_SRC_ALPHA, AC_SRC_OVER, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION,
    ClientToScreen, CreateCompatibleDC, CreateDIBSection, DIB_RGB_COLORS, DeleteDC,
    DeleteObject, GetDC, HGDIOBJ, ReleaseDC, SelectObject,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GW_HWNDPREV, GWLP_HWNDPARENT, GetClientRect,
    GetWindow, MINMAXINFO, RegisterClassW, SET_WINDOW_POS_FLAGS, SWP_ASYNCWINDOWPOS,
    SWP_HIDEWINDOW, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOOWNERZORDER, SWP_NOSIZE, SWP_NOZORDER,
    SWP_SHOWWINDOW, SetWindowLongPtrW, SetWindowPos, ULW_ALPHA, UpdateLayeredWindow,
    WA_INACTIVE, WM_ACTIVATE, WM_GETMINMAXINFO, WM_NCDESTROY, WM_WINDOWPOSCHANGED, WNDCLASSW,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_POPUP,
};
use windows_core::{PCWSTR, w};

/// Show or hide only.
const VISIBILITY_ONLY: SET_WINDOW_POS_FLAGS = SET_WINDOW_POS_FLAGS(
    SWP_NOMOVE.0 | SWP_NOSIZE.0 | SWP_NOACTIVATE.0 | SWP_NOZORDER.0 | SWP_NOOWNERZORDER.0,
);

/// Move and resize only, without waiting for the owning thread.
const LOCATION_ONLY: SET_WINDOW_POS_FLAGS = SET_WINDOW_POS_FLAGS(
    SWP_NOACTIVATE.0 | SWP_NOZORDER.0 | SWP_NOOWNERZORDER.0 | SWP_ASYNCWINDOWPOS.0,
);

/// Restack only.
const ZORDER_ONLY: SET_WINDOW_POS_FLAGS =
    SET_WINDOW_POS_FLAGS(SWP_NOMOVE.0 | SWP_NOSIZE.0 | SWP_NOACTIVATE.0);

const WATCH_SUBCLASS_ID: usize = 0x4149_5253;

/// Composites premultiplied source pixels over the desktop.
#[expect(
    clippy::cast_possible_truncation,
    reason = "blend operation and format constants are single bytes"
)]
const PER_PIXEL_ALPHA: BLENDFUNCTION = BLENDFUNCTION {
    BlendOp: AC_SRC_OVER as u8,
    BlendFlags: 0,
    SourceConstantAlpha: 255,
    AlphaFormat: AC_SRC_ALPHA as u8,
};

/// Renders mounted content into an overlay's pixels.
pub type PaintHook = Box<dyn FnMut(ContentId, Frame<'_>)>;

thread_local! {
    static OUTBOX: RefCell<VecDeque<(SurfaceId, MessageKind)>> =
        const { RefCell::new(VecDeque::new()) };
}

/// The pixels of one overlay, handed to the [`PaintHook`].
///
/// Pixels are premultiplied BGRA, one `u32` each, rows top to bottom. They
/// start fully transparent; whatever the hook leaves behind is presented
/// with per-pixel alpha.
#[derive(Debug)]
pub struct Frame<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height` pixels.
    pub pixels: &'a mut [u32],
}

/// The surface id for a window handle.
#[must_use]
pub fn surface_id(hwnd: HWND) -> SurfaceId {
    SurfaceId(hwnd.0 as usize as u64)
}

/// The window handle behind a surface id.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "surface ids are minted from pointer-sized handles"
)]
pub fn hwnd(surface: SurfaceId) -> HWND {
    HWND(surface.0 as usize as *mut c_void)
}

/// Takes every notification queued by window procedures on this thread, in
/// arrival order.
pub fn drain_messages() -> Vec<(SurfaceId, MessageKind)> {
    OUTBOX.with_borrow_mut(|outbox| outbox.drain(..).collect())
}

/// Runs `f` over the tracking limits carried by a `WM_GETMINMAXINFO`
/// message and writes the edited limits back.
///
/// Overlays answer this message themselves. Use this to route the message
/// for other windows through the engine.
///
/// # Safety
///
/// `lparam` must be the `LPARAM` of a `WM_GETMINMAXINFO` message currently
/// being handled on this thread.
pub unsafe fn with_min_max_info(lparam: LPARAM, f: impl FnOnce(&mut MinMaxInfo)) {
    let ptr = lparam.0 as *mut MINMAXINFO;
    // SAFETY: the caller guarantees `lparam` points at a live MINMAXINFO.
    let Some(native) = (unsafe { ptr.as_mut() }) else {
        return;
    };
    let mut info = MinMaxInfo {
        min_track: (native.ptMinTrackSize.x, native.ptMinTrackSize.y),
        max_track: (native.ptMaxTrackSize.x, native.ptMaxTrackSize.y),
    };
    f(&mut info);
    native.ptMinTrackSize = POINT {
        x: info.min_track.0,
        y: info.min_track.1,
    };
    native.ptMaxTrackSize = POINT {
        x: info.max_track.0,
        y: info.max_track.1,
    };
}

fn post(surface: SurfaceId, kind: MessageKind) {
    OUTBOX.with_borrow_mut(|outbox| outbox.push_back((surface, kind)));
}

fn register_overlay_class() -> Option<HINSTANCE> {
    static REGISTER: Once = Once::new();
    // SAFETY: querying the current module has no preconditions.
    let instance: HINSTANCE = unsafe { GetModuleHandleW(PCWSTR::null()) }.ok()?.into();
    REGISTER.call_once(|| {
        let class = WNDCLASSW {
            lpfnWndProc: Some(overlay_proc),
            hInstance: instance,
            lpszClassName: w!("AirspaceOverlay"),
            ..Default::default()
        };
        // SAFETY: the class description is fully initialized.
        let _ = unsafe { RegisterClassW(&class) };
    });
    Some(instance)
}

unsafe extern "system" fn overlay_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_ACTIVATE => {
            if wparam.0 & 0xffff != WA_INACTIVE as usize {
                post(surface_id(hwnd), MessageKind::Activated);
            }
        }
        WM_GETMINMAXINFO => {
            // SAFETY: this is the message the pointer belongs to.
            unsafe { with_min_max_info(lparam, |info| info.min_track = (0, 0)) };
            return LRESULT(0);
        }
        _ => {}
    }
    // SAFETY: forwarding the message unchanged to the default procedure.
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// Renders `paint` into a fresh transparent bitmap of `size` and presents it
/// as the layered content of `window`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the bitmap header size is a small constant"
)]
fn present(window: HWND, size: (i32, i32), paint: impl FnOnce(Frame<'_>)) {
    let (width, height) = size;
    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
        return;
    };
    if w == 0 || h == 0 {
        return;
    }
    let info = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            // Negative height selects a top-down DIB.
            biHeight: -height,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };
    // SAFETY: a null window selects the screen DC, released below.
    let screen = unsafe { GetDC(None) };
    // SAFETY: `screen` is a valid DC or null, which CreateCompatibleDC accepts.
    let memory = unsafe { CreateCompatibleDC(Some(screen)) };
    let mut bits: *mut c_void = std::ptr::null_mut();
    // SAFETY: `info` describes a 32-bit DIB and `bits` receives its pixels.
    let bitmap = unsafe {
        CreateDIBSection(Some(memory), &info, DIB_RGB_COLORS, &mut bits, None, 0)
    };
    if let Ok(bitmap) = bitmap
        && !bits.is_null()
    {
        // SAFETY: `memory` is our DC and `bitmap` was created for it.
        let previous = unsafe { SelectObject(memory, HGDIOBJ::from(bitmap)) };
        // SAFETY: the DIB section holds `w * h` 32-bit pixels and lives until
        // the DeleteObject below.
        let pixels =
            unsafe { std::slice::from_raw_parts_mut(bits.cast::<u32>(), (w * h) as usize) };
        pixels.fill(0);
        paint(Frame {
            width: w,
            height: h,
            pixels,
        });
        let extent = SIZE {
            cx: width,
            cy: height,
        };
        let origin = POINT::default();
        let blend = PER_PIXEL_ALPHA;
        // SAFETY: every pointer refers to a local that outlives the call.
        let _ = unsafe {
            UpdateLayeredWindow(
                window,
                Some(screen),
                None,
                Some(&raw const extent),
                Some(memory),
                Some(&raw const origin),
                COLORREF(0),
                Some(&raw const blend),
                ULW_ALPHA,
            )
        };
        // SAFETY: restores the DC before its bitmap is released.
        unsafe {
            let _ = SelectObject(memory, previous);
            let _ = DeleteObject(HGDIOBJ::from(bitmap));
        }
    }
    // SAFETY: releases the DCs acquired above.
    unsafe {
        let _ = DeleteDC(memory);
        let _ = ReleaseDC(None, screen);
    }
}

unsafe extern "system" fn watch_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    id: usize,
    _data: usize,
) -> LRESULT {
    match msg {
        WM_WINDOWPOSCHANGED => post(surface_id(hwnd), MessageKind::PositionChanged),
        WM_NCDESTROY => {
            // SAFETY: removing our own subclass from the window being destroyed.
            let _ = unsafe { RemoveWindowSubclass(hwnd, Some(watch_proc), id) };
        }
        _ => {}
    }
    // SAFETY: forwarding the message unchanged down the subclass chain.
    unsafe { DefSubclassProc(hwnd, msg, wparam, lparam) }
}

/// What the backend keeps per overlay.
#[derive(Clone, Copy, Debug, Default)]
struct Overlay {
    content: Option<ContentId>,
    size: (i32, i32),
}

/// [`NativeWindows`] over Win32 windows on the calling thread.
///
/// Surface ids are window handles (see [`surface_id`] and [`hwnd`]). Every
/// call must come from the thread that created the windows involved.
///
/// Overlays are layered windows presented with `UpdateLayeredWindow`. The
/// [`PaintHook`] renders mounted content whenever an overlay is created,
/// its content changes, or it is resized; call [`repaint`](Self::repaint)
/// when the content itself changed.
#[derive(Default)]
pub struct Win32Windows {
    watched: HashMap<SurfaceId, usize>,
    overlays: HashMap<SurfaceId, Overlay>,
    paint_hook: Option<PaintHook>,
}

impl std::fmt::Debug for Win32Windows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Win32Windows")
            .field("watched", &self.watched)
            .field("overlays", &self.overlays)
            .field("paint_hook", &self.paint_hook.is_some())
            .finish()
    }
}

impl Win32Windows {
    /// Creates the backend for the calling thread.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the callback that renders overlay content.
    pub fn set_paint_hook(&mut self, hook: Option<PaintHook>) {
        self.paint_hook = hook;
    }

    /// Renders and presents the overlay again.
    ///
    /// Overlays without content are presented fully transparent.
    pub fn repaint(&mut self, surface: SurfaceId) {
        let Some(overlay) = self.overlays.get(&surface).copied() else {
            return;
        };
        let hook = &mut self.paint_hook;
        present(hwnd(surface), overlay.size, |frame| {
            if let (Some(content), Some(hook)) = (overlay.content, hook.as_mut()) {
                hook(content, frame);
            }
        });
    }

    fn set_pos(
        surface: SurfaceId,
        after: Option<SurfaceId>,
        rect: PixelRect,
        flags: SET_WINDOW_POS_FLAGS,
    ) {
        // SAFETY: SetWindowPos validates its handles and fails on stale ones.
        let _ = unsafe {
            SetWindowPos(
                hwnd(surface),
                after.map(hwnd),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                flags,
            )
        };
    }
}

impl NativeWindows for Win32Windows {
    fn create_overlay(&mut self, bounds: PixelRect) -> SurfaceId {
        let Some(instance) = register_overlay_class() else {
            return surface_id(HWND::default());
        };
        // SAFETY: the class is registered and all string pointers are static.
        let created = unsafe {
            CreateWindowExW(
                WS_EX_NOACTIVATE | WS_EX_TOOLWINDOW | WS_EX_LAYERED,
                w!("AirspaceOverlay"),
                PCWSTR::null(),
                WS_POPUP,
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                None,
                None,
                Some(instance),
                None,
            )
        };
        let Ok(window) = created else {
            return surface_id(HWND::default());
        };
        let surface = surface_id(window);
        self.overlays.insert(
            surface,
            Overlay {
                content: None,
                size: (bounds.width, bounds.height),
            },
        );
        self.repaint(surface);
        surface
    }

    fn destroy_overlay(&mut self, surface: SurfaceId) {
        self.overlays.remove(&surface);
        if self.watched.remove(&surface).is_some() {
            // SAFETY: removes the subclass installed by `watch`.
            let _ = unsafe {
                RemoveWindowSubclass(hwnd(surface), Some(watch_proc), WATCH_SUBCLASS_ID)
            };
        }
        // SAFETY: DestroyWindow fails harmlessly on stale handles.
        let _ = unsafe { DestroyWindow(hwnd(surface)) };
    }

    fn set_bounds(&mut self, surface: SurfaceId, bounds: PixelRect) {
        Self::set_pos(surface, None, bounds, LOCATION_ONLY);
        let size = (bounds.width, bounds.height);
        if let Some(overlay) = self.overlays.get_mut(&surface)
            && overlay.size != size
        {
            overlay.size = size;
            self.repaint(surface);
        }
    }

    fn set_visible(&mut self, surface: SurfaceId, visible: bool) {
        let show = if visible { SWP_SHOWWINDOW } else { SWP_HIDEWINDOW };
        Self::set_pos(surface, None, PixelRect::ZERO, VISIBILITY_ONLY | show);
    }

    fn set_owner(&mut self, surface: SurfaceId, owner: Option<SurfaceId>) {
        let owner = owner.map_or(0, |o| hwnd(o).0 as isize);
        // SAFETY: GWLP_HWNDPARENT on a top-level window sets its owner.
        let _ = unsafe { SetWindowLongPtrW(hwnd(surface), GWLP_HWNDPARENT, owner) };
    }

    fn set_content(&mut self, surface: SurfaceId, content: Option<ContentId>) {
        let Some(overlay) = self.overlays.get_mut(&surface) else {
            return;
        };
        if overlay.content != content {
            overlay.content = content;
            self.repaint(surface);
        }
    }

    fn surface_above(&self, surface: SurfaceId) -> Option<SurfaceId> {
        // SAFETY: GetWindow fails harmlessly on stale handles.
        let above = unsafe { GetWindow(hwnd(surface), GW_HWNDPREV) }.ok()?;
        (!above.is_invalid()).then(|| surface_id(above))
    }

    fn place_below(&mut self, surface: SurfaceId, above: SurfaceId) {
        Self::set_pos(surface, Some(above), PixelRect::ZERO, ZORDER_ONLY);
    }

    fn client_bounds_on_screen(&self, surface: SurfaceId) -> Option<Rect> {
        let window = hwnd(surface);
        let mut client = RECT::default();
        // SAFETY: both calls write into locals and fail on stale handles.
        unsafe { GetClientRect(window, &mut client) }.ok()?;
        let mut origin = POINT::default();
        if !unsafe { ClientToScreen(window, &mut origin) }.as_bool() {
            return None;
        }
        Some(Rect::new(
            f64::from(origin.x),
            f64::from(origin.y),
            f64::from(origin.x + client.right),
            f64::from(origin.y + client.bottom),
        ))
    }

    fn watch(&mut self, surface: SurfaceId) {
        let count = self.watched.entry(surface).or_insert(0);
        *count += 1;
        if *count == 1 {
            // SAFETY: the subclass procedure only reads the message.
            let _ = unsafe {
                SetWindowSubclass(hwnd(surface), Some(watch_proc), WATCH_SUBCLASS_ID, 0)
            };
        }
    }

    fn unwatch(&mut self, surface: SurfaceId) {
        let Some(count) = self.watched.get_mut(&surface) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.watched.remove(&surface);
            // SAFETY: removes the subclass installed by `watch`.
            let _ = unsafe {
                RemoveWindowSubclass(hwnd(surface), Some(watch_proc), WATCH_SUBCLASS_ID)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use windows::Win32::UI::WindowsAndMessaging::{GWL_EXSTYLE, GetWindowLongPtrW, IsWindowVisible};

    use super::*;

    #[test]
    fn surface_ids_round_trip_handles() {
        let surface = SurfaceId(0x1234);
        assert_eq!(surface_id(hwnd(surface)), surface);
    }

    #[test]
    fn min_max_edits_are_written_back() {
        let mut native = MINMAXINFO {
            ptMinTrackSize: POINT { x: 136, y: 39 },
            ..Default::default()
        };
        // SAFETY: `native` is a live MINMAXINFO for the duration of the call.
        unsafe {
            with_min_max_info(LPARAM(&mut native as *mut MINMAXINFO as isize), |info| {
                assert_eq!(info.min_track, (136, 39));
                info.min_track = (0, 0);
            });
        }
        assert_eq!((native.ptMinTrackSize.x, native.ptMinTrackSize.y), (0, 0));
    }

    #[test]
    fn overlay_starts_hidden_and_non_activating() {
        let mut windows = Win32Windows::new();
        let surface = windows.create_overlay(PixelRect::new(10, 20, 30, 40));
        let window = hwnd(surface);
        assert!(!window.is_invalid());

        // SAFETY: `window` is a live window created on this thread.
        let style = unsafe { GetWindowLongPtrW(window, GWL_EXSTYLE) };
        assert_ne!(style & WS_EX_NOACTIVATE.0 as isize, 0);
        assert!(!unsafe { IsWindowVisible(window) }.as_bool());

        windows.destroy_overlay(surface);
    }

    #[test]
    fn content_is_rendered_at_overlay_size() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut windows = Win32Windows::new();
        let log = seen.clone();
        windows.set_paint_hook(Some(Box::new(move |content, mut frame: Frame<'_>| {
            let clear = frame.pixels.iter().all(|p| *p == 0);
            log.borrow_mut()
                .push((content, frame.width, frame.height, clear));
            frame.pixels.fill(0x8000_0000);
        })));
        let surface = windows.create_overlay(PixelRect::new(0, 0, 30, 20));
        assert!(seen.borrow().is_empty(), "nothing mounted yet");

        windows.set_content(surface, Some(ContentId(5)));
        // Moving without resizing keeps the presented pixels.
        windows.set_bounds(surface, PixelRect::new(5, 5, 30, 20));
        windows.set_bounds(surface, PixelRect::new(5, 5, 40, 10));
        assert_eq!(
            *seen.borrow(),
            [(ContentId(5), 30, 20, true), (ContentId(5), 40, 10, true)]
        );

        windows.set_content(surface, None);
        windows.repaint(surface);
        assert_eq!(seen.borrow().len(), 2);
        windows.destroy_overlay(surface);
    }

    #[test]
    fn destroying_a_watched_overlay_drops_the_watch() {
        let mut windows = Win32Windows::new();
        let surface = windows.create_overlay(PixelRect::new(0, 0, 10, 10));
        windows.watch(surface);
        windows.watch(surface);
        windows.destroy_overlay(surface);
        assert!(windows.watched.is_empty());
        assert!(windows.overlays.is_empty());

        // A later unwatch for the dead handle is a no-op.
        windows.unwatch(surface);
        assert!(windows.watched.is_empty());
    }
}
