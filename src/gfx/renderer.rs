//! Double-buffered framebuffer renderer.
//!
//! Owns the overlay layer's pixel buffers and turns logical draw calls into
//! writes through a pluggable [`PixelLayout`]. All drawing happens on the
//! current back buffer between `start_frame` and `end_frame`; `end_frame`
//! seeds the following buffer with the finished frame (so callers may redraw
//! only what changed), paces to the frame-rate target, then waits for vsync
//! and presents.
//!
//! Calling `start_frame` twice without an intervening `end_frame` (or the
//! reverse) is a caller error and is not guarded.

use std::thread;
use std::time::Duration;

use anyhow::{ensure, Result};

use super::color::{blend_channel, Color};
use super::display::DisplayBackend;
use super::font::{FontSet, GlyphBitmap};
use super::layout::PixelLayout;
use crate::style;

const BUFFER_COUNT: usize = 2;

/// Construction parameters for [`Renderer`].
pub struct RendererOptions {
    pub width: u16,
    pub height: u16,
    pub frame_rate: u32,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            width: style::FRAMEBUFFER_WIDTH,
            height: style::FRAMEBUFFER_HEIGHT,
            frame_rate: style::DEFAULT_FRAME_RATE,
        }
    }
}

pub struct Renderer {
    width: u16,
    height: u16,
    layout: Box<dyn PixelLayout>,
    backend: Box<dyn DisplayBackend>,
    fonts: FontSet,
    buffers: Vec<Vec<u16>>,
    cur_slot: usize,
    scissor: Option<(u16, u16, u16, u16)>,
    opacity: f32,
    frame_rate: u32,
}

impl Renderer {
    /// Creates a renderer over the given backend. This is the fatal path:
    /// a surface that cannot be allocated aborts overlay startup.
    pub fn new(
        backend: Box<dyn DisplayBackend>,
        layout: Box<dyn PixelLayout>,
        fonts: FontSet,
        options: RendererOptions,
    ) -> Result<Self> {
        ensure!(
            options.width > 0 && options.height > 0,
            "framebuffer dimensions must be non-zero ({}x{})",
            options.width,
            options.height
        );

        let len = layout.required_len(options.width as u32, options.height as u32);
        let buffers = vec![vec![0u16; len]; BUFFER_COUNT];

        tracing::debug!(
            width = options.width,
            height = options.height,
            buffer_len = len,
            "renderer surface allocated"
        );

        Ok(Self {
            width: options.width,
            height: options.height,
            layout,
            backend,
            fonts,
            buffers,
            cur_slot: 0,
            scissor: None,
            opacity: 1.0,
            frame_rate: options.frame_rate,
        })
    }

    /// Headless renderer over a linear software surface. Used by tests and
    /// the demo binary; pacing is disabled.
    pub fn headless(width: u16, height: u16) -> Self {
        use super::display::NullDisplay;
        use super::layout::LinearLayout;

        // Allocation of a linear surface cannot fail validation here.
        Self::new(
            Box::new(NullDisplay::new()),
            Box::new(LinearLayout::new(width as u32)),
            FontSet::builtin(),
            RendererOptions {
                width,
                height,
                frame_rate: 0,
            },
        )
        .expect("headless surface")
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn set_frame_rate(&mut self, frame_rate: u32) {
        self.frame_rate = frame_rate;
    }

    /// Sets the process-visible opacity used by [`Renderer::alpha`].
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Scales a color's alpha by the current overlay opacity. Every color an
    /// element draws goes through this so fades affect the whole tree.
    pub fn alpha(&self, c: Color) -> Color {
        c.with_alpha((c.a() as f32 * self.opacity) as u8)
    }

    /// Clips all subsequent draws to the given rectangle. Only one scissor
    /// rectangle can be active at a time.
    pub fn enable_scissor(&mut self, x: u16, y: u16, w: u16, h: u16) {
        self.scissor = Some((x, y, w, h));
    }

    pub fn disable_scissor(&mut self) {
        self.scissor = None;
    }

    pub fn request_foreground(&mut self, enabled: bool) {
        self.backend.request_foreground(enabled);
    }

    // Frame lifecycle

    /// Begins a frame on the current back buffer.
    pub fn start_frame(&mut self) {
        // The buffers are owned, so there is nothing to acquire from the
        // host; the slot selected at the end of the previous frame is the
        // draw target.
    }

    /// Finishes the frame: seeds the next buffer with this frame's pixels,
    /// paces to the frame-rate target, waits for vsync and presents.
    pub fn end_frame(&mut self) {
        let cur = self.cur_slot;
        let next = (cur + 1) % BUFFER_COUNT;

        let (left, right) = self.buffers.split_at_mut(cur.max(next));
        if cur < next {
            right[0].copy_from_slice(&left[cur]);
        } else {
            left[next].copy_from_slice(&right[0]);
        }

        if self.frame_rate > 0 {
            thread::sleep(Duration::from_nanos(1_000_000_000 / self.frame_rate as u64));
        }

        self.backend.wait_vsync();
        if let Err(err) = self.backend.present(&self.buffers[cur]) {
            tracing::warn!(%err, "present failed");
        }

        self.cur_slot = next;
    }

    // Pixel primitives

    fn pixel_offset(&self, x: u32, y: u32) -> Option<usize> {
        if let Some((sx, sy, sw, sh)) = self.scissor {
            let (sx, sy, sw, sh) = (sx as u32, sy as u32, sw as u32, sh as u32);
            if x < sx || y < sy || x > sx + sw || y > sy + sh {
                return None;
            }
        }
        Some(self.layout.offset(x, y))
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Writes one pixel. Out-of-range coordinates are silently ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        if let Some(off) = self.pixel_offset(x as u32, y as u32) {
            if let Some(px) = self.buffers[self.cur_slot].get_mut(off) {
                *px = color.raw();
            }
        }
    }

    /// Reads one pixel from the current buffer (layout-translated, ignoring
    /// the scissor). Out-of-range reads yield transparent black.
    pub fn pixel_at(&self, x: i32, y: i32) -> Color {
        if !self.in_bounds(x, y) {
            return Color::TRANSPARENT;
        }
        let off = self.layout.offset(x as u32, y as u32);
        self.buffers[self.cur_slot]
            .get(off)
            .map(|&raw| Color::from_raw(raw))
            .unwrap_or(Color::TRANSPARENT)
    }

    /// Blends `color` over the existing pixel, keeping the existing pixel's
    /// alpha channel.
    pub fn set_pixel_blend_src(&mut self, x: i32, y: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        let Some(off) = self.pixel_offset(x as u32, y as u32) else {
            return;
        };
        let Some(&raw) = self.buffers[self.cur_slot].get(off) else {
            return;
        };

        let src = Color::from_raw(raw);
        let dst = color;
        let out = Color::rgba4(
            blend_channel(src.r(), dst.r(), dst.a()),
            blend_channel(src.g(), dst.g(), dst.a()),
            blend_channel(src.b(), dst.b(), dst.a()),
            src.a(),
        );
        self.buffers[self.cur_slot][off] = out.raw();
    }

    /// Blends `color` over the existing pixel, keeping the incoming color's
    /// alpha channel.
    pub fn set_pixel_blend_dst(&mut self, x: i32, y: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        let Some(off) = self.pixel_offset(x as u32, y as u32) else {
            return;
        };
        let Some(&raw) = self.buffers[self.cur_slot].get(off) else {
            return;
        };

        let src = Color::from_raw(raw);
        let dst = color;
        let out = Color::rgba4(
            blend_channel(src.r(), dst.r(), dst.a()),
            blend_channel(src.g(), dst.g(), dst.a()),
            blend_channel(src.b(), dst.b(), dst.a()),
            dst.a(),
        );
        self.buffers[self.cur_slot][off] = out.raw();
    }

    // Shape primitives

    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        for x1 in x..x + w {
            for y1 in y..y + h {
                self.set_pixel_blend_dst(x1, y1, color);
            }
        }
    }

    /// Draws only the 1-pixel outline of a rectangle. Edges are inclusive of
    /// `x + w` and `y + h`.
    pub fn draw_empty_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        for x1 in x..=x + w {
            for y1 in y..=y + h {
                if y1 == y || x1 == x || y1 == y + h || x1 == x + w {
                    self.set_pixel_blend_dst(x1, y1, color);
                }
            }
        }
    }

    /// Draws a line with a per-column slope/intercept walk. Pixels above
    /// `max(y0, y1)` are never plotted even when rounding overshoots.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        if x0 == x1 && y0 == y1 {
            self.set_pixel_blend_dst(x0, y0, color);
            return;
        }

        let x_max = x0.max(x1);
        let y_max = y0.max(y1);
        let x_min = x0.min(x1);
        let y_min = y0.min(y1);

        if x_min < 0 || y_min < 0 || x_min >= self.width as i32 || y_min >= self.height as i32 {
            return;
        }

        let dy = y_max - y_min;
        let dx = x_max - x_min;

        if dx == 0 {
            for y in y_min..=y_max {
                self.set_pixel_blend_dst(x_min, y, color);
            }
            return;
        }

        // y = mx + b
        let m = dy as f32 / dx as f32;
        let b = y_min as f32 - m * x_min as f32;

        for x in x_min..=x_max {
            let mut y = (m * x as f32 + b).round() as i32;
            let y_end = (m * (x + 1) as f32 + b).round() as i32;
            if y == y_end {
                if x <= x_max && y <= y_max {
                    self.set_pixel_blend_dst(x, y, color);
                }
            } else {
                while y < y_end {
                    if x <= x_max && y <= y_max {
                        self.set_pixel_blend_dst(x, y, color);
                    }
                    y += 1;
                }
            }
        }
    }

    /// Draws a dashed line; `line_width` pixels on, `line_width` pixels off,
    /// alternated via a sign-flipped run counter.
    pub fn draw_dashed_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        line_width: i32,
        color: Color,
    ) {
        let x_min = x0.min(x1);
        let x_max = x0.max(x1);
        let y_min = y0.min(y1);
        let y_max = y0.max(y1);

        if x_min < 0 || y_min < 0 || x_min >= self.width as i32 || y_min >= self.height as i32 {
            return;
        }

        let dx = x_max - x_min;
        let dy = y_max - y_min;
        let mut d = 2 * dy - dx;
        let incr_e = 2 * dy;
        let incr_ne = 2 * (dy - dx);

        self.set_pixel_blend_dst(x_min, y_min, color);

        let mut x = x_min;
        let mut y = y_min;
        let mut rendered = 0;

        while x < x1 {
            if d <= 0 {
                d += incr_e;
                x += 1;
            } else {
                d += incr_ne;
                x += 1;
                y += 1;
            }
            rendered += 1;
            if !self.in_bounds(x, y) {
                continue;
            }
            if x <= x_max && y <= y_max {
                if rendered > 0 && rendered < line_width {
                    self.set_pixel_blend_dst(x, y, color);
                } else if rendered > 0 && rendered >= line_width {
                    rendered = -rendered;
                }
            }
        }
    }

    /// Copies a pre-decoded bitmap (4 bytes per pixel, byte order
    /// alpha, red, green, blue; top nibbles used) through the source-blend
    /// path.
    pub fn draw_bitmap(&mut self, x: i32, y: i32, w: i32, h: i32, bmp: &[u8]) {
        let mut pixels = bmp.chunks_exact(4);
        for y1 in 0..h {
            for x1 in 0..w {
                let Some(px) = pixels.next() else {
                    return;
                };
                let color = Color::rgba4(px[1] >> 4, px[2] >> 4, px[3] >> 4, px[0] >> 4);
                let color = self.alpha(color);
                self.set_pixel_blend_src(x + x1, y + y1, color);
            }
        }
    }

    /// Fills the whole surface, bypassing blending and the scissor.
    pub fn fill_screen(&mut self, color: Color) {
        self.buffers[self.cur_slot].fill(color.raw());
    }

    /// Fills the surface with transparent black.
    pub fn clear_screen(&mut self) {
        self.fill_screen(Color::TRANSPARENT);
    }

    // Text

    /// Draws a string with the baseline of the first line at `y`.
    ///
    /// Codepoints present in the extended face use it, everything else the
    /// standard face; kerning is applied against the previous codepoint.
    /// `'\n'` resets the x cursor and advances by `font_size` (there is no
    /// wrapping at the container's width). Whitespace and fully transparent
    /// colors skip rasterization, which makes a transparent draw a pure
    /// measuring call. Returns the drawn dimensions.
    pub fn draw_string(
        &mut self,
        text: &str,
        monospace: bool,
        x: i32,
        y: i32,
        font_size: f32,
        color: Color,
    ) -> (u32, u32) {
        let mut max_x = x as f32;
        let mut cur_x = x as f32;
        let mut cur_y = y as f32;
        let mut prev: Option<char> = None;

        for c in text.chars() {
            let (scale, kern, advance, glyph) = {
                let face = self.fonts.face_for(c);
                (
                    face.scale_for_height(font_size),
                    prev.map(|p| face.kern(p, c)).unwrap_or(0.0),
                    face.advance(c, monospace),
                    face.glyph(c),
                )
            };

            cur_x += kern * scale;

            if c == '\n' {
                max_x = max_x.max(cur_x);
                cur_x = x as f32;
                cur_y += font_size;
                prev = Some(c);
                continue;
            }

            if !c.is_whitespace() && font_size > 0.0 && color.a() != 0 {
                if let Some(bitmap) = glyph {
                    self.draw_glyph(&bitmap, cur_x as i32, cur_y as i32, font_size, color);
                }
            }

            cur_x += advance * scale;
            prev = Some(c);
        }

        max_x = max_x.max(cur_x);
        (
            (max_x - x as f32).max(0.0) as u32,
            (cur_y - y as f32).max(0.0) as u32,
        )
    }

    /// Rasterizes one glyph with its baseline at `y`. The 4-bit coverage of
    /// each glyph pixel scales the requested color's alpha before the
    /// source-blend write.
    fn draw_glyph(&mut self, bitmap: &GlyphBitmap, x: i32, y: i32, font_size: f32, color: Color) {
        let h_px = font_size.round() as i32;
        if h_px <= 0 {
            return;
        }
        let w_px = h_px; // square cells

        let top = y - h_px;
        for py in 0..h_px {
            let row = bitmap[(py * 8 / h_px) as usize];
            for px in 0..w_px {
                let col = px * 8 / w_px;
                if (row >> col) & 1 == 0 {
                    continue;
                }
                let coverage = 0xF;
                let glyph_color = color.with_alpha(coverage * color.a() / 0xF);
                self.set_pixel_blend_src(x + px, top + py, glyph_color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Renderer {
        Renderer::headless(64, 64)
    }

    #[test]
    fn test_set_pixel_out_of_range_is_ignored() {
        let mut r = renderer();
        r.set_pixel(-1, 0, Color::WHITE);
        r.set_pixel(0, -1, Color::WHITE);
        r.set_pixel(64, 0, Color::WHITE);
        r.set_pixel(0, 64, Color::WHITE);
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(r.pixel_at(x, y), Color::TRANSPARENT);
            }
        }
    }

    #[test]
    fn test_blend_src_keeps_existing_alpha() {
        let mut r = renderer();
        r.set_pixel(3, 3, Color::rgba4(0, 0, 0, 5));
        r.set_pixel_blend_src(3, 3, Color::rgba4(15, 15, 15, 15));
        let px = r.pixel_at(3, 3);
        assert_eq!(px.a(), 5);
        assert_eq!(px.r(), 15);
    }

    #[test]
    fn test_blend_dst_takes_incoming_alpha() {
        let mut r = renderer();
        r.set_pixel(3, 3, Color::rgba4(0, 0, 0, 5));
        r.set_pixel_blend_dst(3, 3, Color::rgba4(15, 15, 15, 9));
        assert_eq!(r.pixel_at(3, 3).a(), 9);
    }

    #[test]
    fn test_opaque_blend_replaces_channels() {
        let mut r = renderer();
        r.set_pixel(1, 1, Color::rgba4(1, 2, 3, 15));
        r.set_pixel_blend_dst(1, 1, Color::rgba4(9, 8, 7, 15));
        let px = r.pixel_at(1, 1);
        assert_eq!((px.r(), px.g(), px.b(), px.a()), (9, 8, 7, 15));
    }

    #[test]
    fn test_transparent_blend_keeps_channels() {
        let mut r = renderer();
        r.set_pixel(1, 1, Color::rgba4(1, 2, 3, 15));
        r.set_pixel_blend_dst(1, 1, Color::rgba4(9, 8, 7, 0));
        let px = r.pixel_at(1, 1);
        assert_eq!((px.r(), px.g(), px.b()), (1, 2, 3));
    }

    #[test]
    fn test_scissor_clips_writes() {
        let mut r = renderer();
        let prior = Color::rgba4(1, 1, 1, 15);
        r.fill_screen(prior);

        r.enable_scissor(10, 10, 8, 8);
        r.draw_rect(0, 0, 64, 64, Color::rgba4(15, 0, 0, 15));

        // Inside the scissor the rect landed.
        assert_eq!(r.pixel_at(12, 12).r(), 15);
        // Strictly outside, the prior value survives.
        assert_eq!(r.pixel_at(5, 5), prior);
        assert_eq!(r.pixel_at(40, 40), prior);

        r.disable_scissor();
        r.draw_rect(0, 0, 64, 64, Color::rgba4(0, 15, 0, 15));
        assert_eq!(r.pixel_at(5, 5).g(), 15);
    }

    #[test]
    fn test_fill_screen_bypasses_scissor() {
        let mut r = renderer();
        r.enable_scissor(0, 0, 4, 4);
        r.fill_screen(Color::rgba4(2, 2, 2, 15));
        assert_eq!(r.pixel_at(50, 50), Color::rgba4(2, 2, 2, 15));
    }

    #[test]
    fn test_clear_screen_is_transparent_fill() {
        let mut r = renderer();
        r.fill_screen(Color::WHITE);
        r.clear_screen();
        assert_eq!(r.pixel_at(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn test_line_never_exceeds_y_max() {
        let mut r = renderer();
        r.draw_line(0, 0, 20, 13, Color::WHITE);
        for y in 14..64 {
            for x in 0..64 {
                assert_eq!(r.pixel_at(x, y), Color::TRANSPARENT, "stray pixel at {},{}", x, y);
            }
        }
    }

    #[test]
    fn test_vertical_line() {
        let mut r = renderer();
        r.draw_line(5, 2, 5, 9, Color::WHITE);
        for y in 2..=9 {
            assert_eq!(r.pixel_at(5, y), Color::WHITE);
        }
        assert_eq!(r.pixel_at(5, 1), Color::TRANSPARENT);
        assert_eq!(r.pixel_at(5, 10), Color::TRANSPARENT);
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut r = renderer();
        r.draw_dashed_line(0, 0, 40, 0, 4, Color::WHITE);
        let drawn = (0..=40).filter(|&x| r.pixel_at(x, 0) == Color::WHITE).count();
        assert!(drawn > 0, "dashed line drew nothing");
        assert!(drawn < 41, "dashed line has no gaps");
    }

    #[test]
    fn test_empty_rect_draws_outline_only() {
        let mut r = renderer();
        r.draw_empty_rect(2, 2, 6, 6, Color::WHITE);
        assert_eq!(r.pixel_at(2, 2), Color::WHITE);
        assert_eq!(r.pixel_at(8, 8), Color::WHITE);
        assert_eq!(r.pixel_at(5, 2), Color::WHITE);
        assert_eq!(r.pixel_at(5, 5), Color::TRANSPARENT);
    }

    #[test]
    fn test_bitmap_byte_order_and_blend() {
        let mut r = renderer();
        // One pixel: alpha 0xF0, red 0xF0, green 0x00, blue 0x00.
        let bmp = [0xF0u8, 0xF0, 0x00, 0x00];
        r.draw_bitmap(4, 4, 1, 1, &bmp);
        let px = r.pixel_at(4, 4);
        assert_eq!(px.r(), 15);
        assert_eq!(px.g(), 0);
    }

    #[test]
    fn test_draw_string_measures_without_drawing() {
        let mut r = renderer();
        let (w, h) = r.draw_string("AB", false, 0, 16, 16.0, Color::TRANSPARENT);
        assert_eq!(w, 32); // two glyphs, 16px advance each
        assert_eq!(h, 0); // single line: no vertical advance
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(r.pixel_at(x, y), Color::TRANSPARENT);
            }
        }
    }

    #[test]
    fn test_draw_string_newline_resets_cursor() {
        let mut r = renderer();
        let (w, h) = r.draw_string("AB\nC", false, 0, 16, 16.0, Color::TRANSPARENT);
        assert_eq!(w, 32); // longest line
        assert_eq!(h, 16); // one newline advanced the cursor
    }

    #[test]
    fn test_draw_string_rasterizes_opaque_text() {
        let mut r = renderer();
        r.draw_string("H", false, 0, 16, 16.0, Color::WHITE);
        let drawn = (0..16)
            .flat_map(|y| (0..16).map(move |x| (x, y)))
            .filter(|&(x, y)| r.pixel_at(x, y) != Color::TRANSPARENT)
            .count();
        assert!(drawn > 0, "glyph produced no pixels");
    }

    #[test]
    fn test_whitespace_advances_without_pixels() {
        let mut r = renderer();
        let (w, _) = r.draw_string(" ", false, 0, 16, 16.0, Color::WHITE);
        assert_eq!(w, 16);
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(r.pixel_at(x, y), Color::TRANSPARENT);
            }
        }
    }

    #[test]
    fn test_end_frame_seeds_next_buffer() {
        let mut r = renderer();
        r.start_frame();
        r.set_pixel(7, 7, Color::WHITE);
        r.end_frame();
        // The freshly selected buffer carries the previous frame's pixels.
        assert_eq!(r.pixel_at(7, 7), Color::WHITE);
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let mut r = renderer();
        r.set_opacity(0.5);
        let c = r.alpha(Color::rgba4(1, 1, 1, 14));
        assert_eq!(c.a(), 7);
        r.set_opacity(0.0);
        assert_eq!(r.alpha(Color::WHITE).a(), 0);
        r.set_opacity(2.0); // clamped
        assert_eq!(r.opacity(), 1.0);
    }
}
