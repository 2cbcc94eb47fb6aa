//! Software frame buffer
//!
//! Both views (ray-marched and overhead) draw into an RGBA byte buffer that
//! the presentation layer uploads as-is. The depth buffer holds per-pixel
//! ray distance so sprites and particles can be occluded by walls.

use super::types::{Color, Texture};

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>,    // RGBA, 4 bytes per pixel
    pub zbuffer: Vec<f32>,  // Ray distance per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![f32::MAX; width * height],
            width,
            height,
        }
    }

    /// Fill with `color` and reset the depth buffer
    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.zbuffer.fill(f32::MAX);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            Color::new(self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2])
        } else {
            Color::BLACK
        }
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Set a pixel with alpha blending (0 = transparent, 255 = opaque)
    #[inline]
    pub fn set_pixel_alpha(&mut self, x: usize, y: usize, color: Color, alpha: u8) {
        if x < self.width && y < self.height {
            let back = self.get_pixel(x, y);
            self.set_pixel(x, y, back.blend(color, alpha));
        }
    }

    /// Write `color` only if `z` is closer than what is stored
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: Color) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if z < self.zbuffer[idx] {
                self.zbuffer[idx] = z;
                self.set_pixel(x, y, color);
                return true;
            }
        }
        false
    }

    pub fn set_depth(&mut self, x: usize, y: usize, z: f32) {
        if x < self.width && y < self.height {
            self.zbuffer[y * self.width + x] = z;
        }
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.zbuffer[y * self.width + x]
        } else {
            f32::MAX
        }
    }

    /// Fill a horizontal span with alpha blending
    pub fn blend_row(&mut self, y: usize, color: Color, alpha: u8) {
        if alpha == 0 {
            return;
        }
        for x in 0..self.width {
            self.set_pixel_alpha(x, y, color, alpha);
        }
    }

    /// Fill a horizontal span with a solid color
    pub fn fill_row(&mut self, y: usize, color: Color) {
        for x in 0..self.width {
            self.set_pixel(x, y, color);
        }
    }

    /// Scaled copy of a texture region into a destination rectangle
    /// (nearest-neighbour, clipped to the buffer)
    #[allow(clippy::too_many_arguments)]
    pub fn blit_scaled(
        &mut self,
        tex: &Texture,
        src_x: usize, src_y: usize, src_w: usize, src_h: usize,
        dst_x: i32, dst_y: i32, dst_w: i32, dst_h: i32,
    ) {
        if src_w == 0 || src_h == 0 || dst_w <= 0 || dst_h <= 0 {
            return;
        }

        let x_start = dst_x.max(0);
        let x_end = (dst_x + dst_w).min(self.width as i32);
        let y_start = dst_y.max(0);
        let y_end = (dst_y + dst_h).min(self.height as i32);

        for y in y_start..y_end {
            let sy = src_y + ((y - dst_y) as usize * src_h) / dst_h as usize;
            for x in x_start..x_end {
                let sx = src_x + ((x - dst_x) as usize * src_w) / dst_w as usize;
                self.set_pixel(x as usize, y as usize, tex.get_pixel(sx, sy));
            }
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                self.set_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a rectangle outline from (x0, y0) to (x1, y1)
    pub fn draw_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (min_x, max_x) = if x0 < x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 < y1 { (y0, y1) } else { (y1, y0) };

        self.draw_line(min_x, min_y, max_x, min_y, color); // Top
        self.draw_line(max_x, min_y, max_x, max_y, color); // Right
        self.draw_line(max_x, max_y, min_x, max_y, color); // Bottom
        self.draw_line(min_x, max_y, min_x, min_y, color); // Left
    }

    /// Blend a filled rectangle from (x0, y0) to (x1, y1) over the buffer
    pub fn draw_filled_rect_alpha(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color, alpha: u8) {
        let (min_x, max_x) = if x0 < x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 < y1 { (y0, y1) } else { (y1, y0) };

        let min_x = min_x.max(0);
        let min_y = min_y.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.set_pixel_alpha(x as usize, y as usize, color, alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_depth() {
        let mut fb = Framebuffer::new(4, 4);
        assert!(fb.set_pixel_with_depth(1, 1, 5.0, Color::RED));
        assert!(!fb.set_pixel_with_depth(1, 1, 6.0, Color::BLUE));
        assert_eq!(fb.get_pixel(1, 1), Color::RED);

        fb.clear(Color::BLACK);
        assert_eq!(fb.depth_at(1, 1), f32::MAX);
        assert!(fb.set_pixel_with_depth(1, 1, 6.0, Color::BLUE));
    }

    #[test]
    fn test_out_of_bounds_writes_are_ignored() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set_pixel(5, 5, Color::WHITE);
        fb.draw_line(-10, 0, 10, 0, Color::WHITE);
        assert_eq!(fb.get_pixel(0, 0), Color::WHITE);
        assert_eq!(fb.get_pixel(1, 0), Color::WHITE);
        assert_eq!(fb.get_pixel(0, 1), Color::BLACK);
    }

    #[test]
    fn test_blit_scaled_doubles_pixels() {
        let mut tex = Texture::new(2, 1);
        tex.pixels = vec![Color::RED, Color::BLUE];
        let mut fb = Framebuffer::new(4, 2);
        fb.blit_scaled(&tex, 0, 0, 2, 1, 0, 0, 4, 2);

        assert_eq!(fb.get_pixel(0, 0), Color::RED);
        assert_eq!(fb.get_pixel(1, 1), Color::RED);
        assert_eq!(fb.get_pixel(2, 0), Color::BLUE);
        assert_eq!(fb.get_pixel(3, 1), Color::BLUE);
    }
}
