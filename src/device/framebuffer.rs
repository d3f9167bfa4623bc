//! Linux framebuffer device.
//!
//! Draws into an off-screen pixmap and blits it to a memory-mapped fbdev on
//! flush. Only 32-bit truecolor visuals are supported. Input comes from the
//! controlling terminal through the same event reader as the terminal
//! device, so the virtual-terminal flags suppress drawing while switched
//! away.

use crate::device::canvas::Canvas;
use crate::device::font::UiFont;
use crate::device::terminal::{CommandChannel, EventReader, InputEvent};
use crate::device::{Device, InputBuffer, Key, TimeoutMs};
use crate::error::{Error, Result};
use crate::signals::SignalFlags;

const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;
const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;

#[repr(C)]
#[derive(Clone, Copy, Default)]
#[allow(dead_code)]
struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
#[allow(dead_code)]
struct FbVarScreeninfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct FbFixScreeninfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    type_: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

impl Default for FbFixScreeninfo {
    fn default() -> Self {
        // SAFETY: all fields are plain integers.
        unsafe { std::mem::zeroed() }
    }
}

/// A memory-mapped Linux framebuffer.
pub struct FramebufferDevice {
    canvas: Canvas,
    reader: EventReader,
    fd: i32,
    map: *mut u8,
    map_len: usize,
    width: u32,
    height: u32,
    stride: usize,
    red_offset: u32,
    blue_offset: u32,
    finished: bool,
}

// The raw mapping is only touched from the owning thread; the viewer is
// single-threaded.
unsafe impl Send for FramebufferDevice {}

impl FramebufferDevice {
    /// Open and map a framebuffer device node. A non-positive
    /// `font_size` selects the default.
    pub fn open(
        device: Option<&str>,
        command_path: Option<&str>,
        font_size: f64,
        flags: SignalFlags,
    ) -> Result<FramebufferDevice> {
        let device = device.unwrap_or("/dev/fb0");
        let fail = |reason: String| Error::DeviceInit {
            device: device.to_string(),
            reason,
        };

        let cpath =
            std::ffi::CString::new(device).map_err(|_| fail("invalid path".to_string()))?;
        let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_RDWR) };
        if fd < 0 {
            return Err(fail(std::io::Error::last_os_error().to_string()));
        }

        let mut var = FbVarScreeninfo::default();
        let mut fix = FbFixScreeninfo::default();
        let ok = unsafe {
            libc::ioctl(fd, FBIOGET_VSCREENINFO, &mut var) == 0
                && libc::ioctl(fd, FBIOGET_FSCREENINFO, &mut fix) == 0
        };
        if !ok {
            unsafe { libc::close(fd) };
            return Err(fail("cannot query screen info".to_string()));
        }
        if var.bits_per_pixel != 32 {
            unsafe { libc::close(fd) };
            return Err(fail(format!(
                "unsupported depth {} (need 32 bpp)",
                var.bits_per_pixel
            )));
        }

        let map_len = fix.smem_len as usize;
        let map = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if map == libc::MAP_FAILED {
            unsafe { libc::close(fd) };
            return Err(fail(std::io::Error::last_os_error().to_string()));
        }

        crossterm::terminal::enable_raw_mode()
            .map_err(|e| fail(e.to_string()))?;

        let command = match command_path {
            Some(path) => Some(CommandChannel::open(path)?),
            None => None,
        };
        let font_size = if font_size > 0.0 {
            font_size
        } else {
            var.yres as f64 / 25.0
        };
        let font = UiFont::monospace(font_size);
        Ok(FramebufferDevice {
            canvas: Canvas::new(var.xres, var.yres, font),
            reader: EventReader { command, flags },
            fd,
            map: map as *mut u8,
            map_len,
            width: var.xres,
            height: var.yres,
            stride: fix.line_length as usize,
            red_offset: var.red.offset,
            blue_offset: var.blue.offset,
            finished: false,
        })
    }
}

impl Device for FramebufferDevice {
    fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    fn width(&self) -> f64 {
        self.width as f64
    }

    fn height(&self) -> f64 {
        self.height as f64
    }

    fn screen_width(&self) -> f64 {
        self.width as f64
    }

    fn screen_height(&self) -> f64 {
        self.height as f64
    }

    fn double_buffering(&self) -> bool {
        true
    }

    fn clear(&mut self) {
        self.canvas.clear(crate::device::rgb(1.0, 1.0, 1.0));
    }

    fn blank(&mut self) {
        self.canvas.clear(crate::device::rgb(0.0, 0.0, 0.0));
    }

    fn flush(&mut self) {
        if self.reader.flags.suspended() {
            return;
        }
        let pixmap = self.canvas.pixmap();
        let data = pixmap.data();
        let width = self.width.min(pixmap.width()) as usize;
        let height = self.height.min(pixmap.height()) as usize;
        for y in 0..height {
            for x in 0..width {
                let src = (y * pixmap.width() as usize + x) * 4;
                let dst = y * self.stride + x * 4;
                if dst + 3 >= self.map_len {
                    continue;
                }
                // Pixmap data is premultiplied RGBA; the screen wants the
                // channels at the offsets the driver reports.
                let (r, g, b) = (data[src], data[src + 1], data[src + 2]);
                unsafe {
                    *self.map.add(dst + (self.red_offset / 8) as usize) = r;
                    *self.map.add(dst + 1) = g;
                    *self.map.add(dst + (self.blue_offset / 8) as usize) = b;
                    *self.map.add(dst + 3) = 0;
                }
            }
        }
    }

    fn is_active(&self) -> bool {
        !self.reader.flags.suspended()
    }

    fn input(&mut self, timeout: TimeoutMs, buffer: &mut InputBuffer) -> Key {
        match self.reader.wait(timeout, buffer) {
            InputEvent::Key(key) => key,
            // The framebuffer does not resize; a terminal resize only
            // affects the input tty.
            InputEvent::Resize(_, _) => Key::Redraw,
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        unsafe {
            libc::munmap(self.map as *mut libc::c_void, self.map_len);
            libc::close(self.fd);
        }
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

impl Drop for FramebufferDevice {
    fn drop(&mut self) {
        self.finish();
    }
}
