//! Core rasterizer types: colors and textures

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Error type for texture loading
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture atlas is empty")]
    Empty,
}

/// Opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const GRAY: Color = Color::new(128, 128, 128);
    pub const DARK_GRAY: Color = Color::new(48, 48, 48);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const LIGHT_BLUE: Color = Color::new(64, 128, 255);
    pub const DARK_BLUE: Color = Color::new(0, 0, 64);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const PURPLE: Color = Color::new(255, 0, 255);
    pub const BROWN: Color = Color::new(32, 24, 16);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Multiplicative blend against a gray level: `self * level / 255`
    pub fn modulate(self, level: u8) -> Self {
        let l = level as u16;
        Self {
            r: ((self.r as u16 * l) / 255) as u8,
            g: ((self.g as u16 * l) / 255) as u8,
            b: ((self.b as u16 * l) / 255) as u8,
        }
    }

    /// Alpha blend `front` over `self` (0 = keep self, 255 = front)
    pub fn blend(self, front: Color, alpha: u8) -> Self {
        let a = alpha as u16;
        let inv_a = 255 - a;
        Self {
            r: ((front.r as u16 * a + self.r as u16 * inv_a) / 255) as u8,
            g: ((front.g as u16 * a + self.g as u16 * inv_a) / 255) as u8,
            b: ((front.b as u16 * a + self.b as u16 * inv_a) / 255) as u8,
        }
    }

    /// Convert to [u8; 4] for the framebuffer (RGBA, always opaque)
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Simple texture (array of colors)
///
/// Tile graphics live in a vertical atlas: graphic `g` occupies rows
/// `g * tex_size .. (g + 1) * tex_size`.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE; width * height],
            name: String::new(),
        }
    }

    /// Load texture from an image file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self::from_image(img, name))
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| Color::new(p[0], p[1], p[2])).collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 8) + (y / 8)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Stack square tiles vertically into an atlas
    pub fn stack(tiles: &[Texture]) -> Result<Self, TextureError> {
        let first = tiles.first().ok_or(TextureError::Empty)?;
        let width = first.width;
        let mut pixels = Vec::with_capacity(width * first.height * tiles.len());
        let mut height = 0;

        for tile in tiles {
            for y in 0..tile.height {
                for x in 0..width {
                    pixels.push(tile.get_pixel(x, y));
                }
            }
            height += tile.height;
        }

        Ok(Self { width, height, pixels, name: "atlas".to_string() })
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }

    /// Sample a texel of graphic `graphic` in a vertical atlas of square
    /// `tex_size` tiles. Coordinates wrap within the tile.
    pub fn atlas_texel(&self, graphic: u16, tex_size: usize, u: i32, v: i32) -> Color {
        let size = tex_size as i32;
        let x = u.rem_euclid(size) as usize;
        let y = v.rem_euclid(size) as usize + graphic as usize * tex_size;
        self.get_pixel(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulate_full_and_zero() {
        let c = Color::new(200, 100, 50);
        assert_eq!(c.modulate(255), c);
        assert_eq!(c.modulate(0), Color::BLACK);
    }

    #[test]
    fn test_blend_endpoints() {
        let back = Color::new(10, 20, 30);
        assert_eq!(back.blend(Color::WHITE, 0), back);
        assert_eq!(back.blend(Color::WHITE, 255), Color::WHITE);
    }

    #[test]
    fn test_atlas_texel_selects_graphic_row() {
        let red = Texture { width: 4, height: 4, pixels: vec![Color::RED; 16], name: String::new() };
        let blue = Texture { width: 4, height: 4, pixels: vec![Color::BLUE; 16], name: String::new() };
        let atlas = Texture::stack(&[red, blue]).unwrap();

        assert_eq!(atlas.height, 8);
        assert_eq!(atlas.atlas_texel(0, 4, 1, 1), Color::RED);
        assert_eq!(atlas.atlas_texel(1, 4, 1, 1), Color::BLUE);
        // Wraps inside the tile instead of bleeding into the next graphic
        assert_eq!(atlas.atlas_texel(0, 4, 1, 5), Color::RED);
    }
}
