//! GDI-based capture for Windows.
//!
//! Captures blit the desktop (or a window via `PrintWindow`) into a DIB
//! section and copy the BGRA pixels out. Each capture call creates and
//! tears down its own GDI resources, so the backend itself is stateless
//! and callable from any thread.

use std::ffi::c_void;
use std::mem::size_of;
use std::ptr::null_mut;

use bytes::Bytes;
use tracing::{debug, trace};
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, ReleaseDC,
    SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ,
    SRCCOPY,
};
use windows::Win32::Storage::Xps::{PrintWindow, PRINT_WINDOW_FLAGS};
use windows::Win32::UI::WindowsAndMessaging::{
    DrawIconEx, GetCursorInfo, GetSystemMetrics, GetWindowRect, IsIconic, IsWindow,
    IsWindowVisible, CURSORINFO, CURSOR_SHOWING, DI_NORMAL, HICON, SM_CXVIRTUALSCREEN,
    SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
};

use crate::error::CaptureError;
use crate::frame::Frame;
use crate::{CaptureBackend, CaptureOptions, CaptureResult, CaptureTarget};

/// Virtual screen geometry in desktop coordinates.
#[derive(Debug, Clone, Copy)]
struct VirtualScreen {
    left: i32,
    top: i32,
    width: u32,
    height: u32,
}

fn virtual_screen() -> CaptureResult<VirtualScreen> {
    let width = unsafe { GetSystemMetrics(SM_CXVIRTUALSCREEN) };
    let height = unsafe { GetSystemMetrics(SM_CYVIRTUALSCREEN) };
    if width <= 0 || height <= 0 {
        return Err(CaptureError::CaptureFailed(format!(
            "virtual screen has no extent ({width}x{height})"
        )));
    }
    Ok(VirtualScreen {
        left: unsafe { GetSystemMetrics(SM_XVIRTUALSCREEN) },
        top: unsafe { GetSystemMetrics(SM_YVIRTUALSCREEN) },
        width: width as u32,
        height: height as u32,
    })
}

/// A screen DC, memory DC and DIB section sized for one capture.
struct GdiSurface {
    screen_dc: HDC,
    mem_dc: HDC,
    bitmap: HBITMAP,
    old_bitmap: HGDIOBJ,
    bits: *mut u8,
    width: u32,
    height: u32,
}

impl GdiSurface {
    fn new(width: u32, height: u32) -> CaptureResult<Self> {
        let screen_dc = unsafe { GetDC(None) };
        if screen_dc.is_invalid() {
            return Err(CaptureError::CaptureFailed("GetDC(NULL) failed".into()));
        }

        let mem_dc = unsafe { CreateCompatibleDC(Some(screen_dc)) };
        if mem_dc.is_invalid() {
            unsafe {
                ReleaseDC(None, screen_dc);
            }
            return Err(CaptureError::CaptureFailed(
                "CreateCompatibleDC failed".into(),
            ));
        }

        let mut info = BITMAPINFO::default();
        info.bmiHeader.biSize = size_of::<BITMAPINFOHEADER>() as u32;
        info.bmiHeader.biWidth = width as i32;
        // Negative height selects a top-down DIB so rows come out in
        // image order.
        info.bmiHeader.biHeight = -(height as i32);
        info.bmiHeader.biPlanes = 1;
        info.bmiHeader.biBitCount = 32;
        info.bmiHeader.biCompression = BI_RGB.0;

        let mut bits: *mut c_void = null_mut();
        let bitmap = match unsafe {
            CreateDIBSection(Some(mem_dc), &info, DIB_RGB_COLORS, &mut bits, None, 0)
        } {
            Ok(bitmap) => bitmap,
            Err(e) => {
                unsafe {
                    let _ = DeleteDC(mem_dc);
                    ReleaseDC(None, screen_dc);
                }
                return Err(CaptureError::WindowsApi(e));
            }
        };

        let old_bitmap = unsafe { SelectObject(mem_dc, bitmap.into()) };

        Ok(Self {
            screen_dc,
            mem_dc,
            bitmap,
            old_bitmap,
            bits: bits.cast(),
            width,
            height,
        })
    }

    /// Composite the current cursor into the surface. `origin` is the
    /// desktop coordinate of the surface's top-left pixel.
    fn draw_cursor(&self, origin_x: i32, origin_y: i32) {
        let mut info = CURSORINFO {
            cbSize: size_of::<CURSORINFO>() as u32,
            ..Default::default()
        };
        if unsafe { GetCursorInfo(&mut info) }.is_err() || info.flags != CURSOR_SHOWING {
            return;
        }
        let x = info.ptScreenPos.x - origin_x;
        let y = info.ptScreenPos.y - origin_y;
        // The cursor may simply be outside the captured area.
        if unsafe {
            DrawIconEx(
                self.mem_dc,
                x,
                y,
                HICON(info.hCursor.0),
                0,
                0,
                0,
                None,
                DI_NORMAL,
            )
        }
        .is_err()
        {
            trace!("DrawIconEx failed, frame captured without cursor");
        }
    }

    /// Copy the DIB pixels out as a BGRA frame.
    fn to_frame(&self) -> Frame {
        let len = Frame::bgra_buffer_size(self.width, self.height);
        let data = unsafe { std::slice::from_raw_parts(self.bits, len) }.to_vec();
        Frame::new(Bytes::from(data), self.width, self.height)
    }
}

impl Drop for GdiSurface {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.mem_dc, self.old_bitmap);
            let _ = DeleteObject(self.bitmap.into());
            let _ = DeleteDC(self.mem_dc);
            ReleaseDC(None, self.screen_dc);
        }
    }
}

/// GDI capture backend.
pub struct GdiBackend;

impl GdiBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }

    fn capture_screen_rect(
        &self,
        left: i32,
        top: i32,
        width: u32,
        height: u32,
        include_cursor: bool,
    ) -> CaptureResult<Frame> {
        let surface = GdiSurface::new(width, height)?;

        unsafe {
            BitBlt(
                surface.mem_dc,
                0,
                0,
                width as i32,
                height as i32,
                Some(surface.screen_dc),
                left,
                top,
                SRCCOPY,
            )
        }?;

        if include_cursor {
            surface.draw_cursor(left, top);
        }

        Ok(surface.to_frame())
    }

    fn capture_window(&self, window_id: u32, include_cursor: bool) -> CaptureResult<Frame> {
        let hwnd = HWND(window_id as usize as *mut c_void);
        if !unsafe { IsWindow(Some(hwnd)) }.as_bool() {
            return Err(CaptureError::WindowNotFound(window_id));
        }
        if unsafe { IsIconic(hwnd) }.as_bool() {
            return Err(CaptureError::CaptureFailed(format!(
                "window {window_id} is minimized"
            )));
        }
        if !unsafe { IsWindowVisible(hwnd) }.as_bool() {
            return Err(CaptureError::CaptureFailed(format!(
                "window {window_id} is not visible"
            )));
        }

        let mut rect = RECT::default();
        unsafe { GetWindowRect(hwnd, &mut rect) }?;
        let width = rect.right.saturating_sub(rect.left);
        let height = rect.bottom.saturating_sub(rect.top);
        if width <= 0 || height <= 0 {
            return Err(CaptureError::CaptureFailed(format!(
                "window {window_id} has empty bounds"
            )));
        }

        let surface = GdiSurface::new(width as u32, height as u32)?;

        // PW_RENDERFULLCONTENT (2) handles composited windows; plain
        // PrintWindow is the fallback for legacy ones.
        let mut rendered =
            unsafe { PrintWindow(hwnd, surface.mem_dc, PRINT_WINDOW_FLAGS(2)) }.as_bool();
        if !rendered {
            rendered =
                unsafe { PrintWindow(hwnd, surface.mem_dc, PRINT_WINDOW_FLAGS(0)) }.as_bool();
        }
        if !rendered {
            return Err(CaptureError::CaptureFailed(format!(
                "PrintWindow failed for window {window_id}"
            )));
        }

        if include_cursor {
            surface.draw_cursor(rect.left, rect.top);
        }

        Ok(surface.to_frame())
    }
}

impl Default for GdiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for GdiBackend {
    fn is_available(&self) -> bool {
        virtual_screen().is_ok()
    }

    fn display_size(&self) -> CaptureResult<(u32, u32)> {
        let screen = virtual_screen()?;
        Ok((screen.width, screen.height))
    }

    fn capture(&self, target: &CaptureTarget, options: &CaptureOptions) -> CaptureResult<Frame> {
        match target {
            CaptureTarget::FullScreen => {
                let screen = virtual_screen()?;
                debug!(
                    width = screen.width,
                    height = screen.height,
                    "capturing full screen"
                );
                self.capture_screen_rect(
                    screen.left,
                    screen.top,
                    screen.width,
                    screen.height,
                    options.include_cursor,
                )
            }
            CaptureTarget::Region(region) => {
                let screen = virtual_screen()?;
                let bounds = region.clamp_to_display(screen.width, screen.height)?;
                debug!(?bounds, "capturing region");
                self.capture_screen_rect(
                    screen.left + bounds.x,
                    screen.top + bounds.y,
                    bounds.width,
                    bounds.height,
                    options.include_cursor,
                )
            }
            CaptureTarget::Window(id) => {
                debug!(window_id = id, "capturing window");
                self.capture_window(*id, options.include_cursor)
            }
        }
    }
}
