//! Texture image loading.
//!
//! Decodes an image from disk into linear float RGB so the renderer can
//! sample it without caring about the source encoding.

use std::path::Path;

use thiserror::Error;
use umbra_math::Vec3;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} has no pixels")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
///
/// Pixels are stored in linear RGB, row-major, top row first.
#[derive(Clone, Debug)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
    /// Original file path (for debugging)
    pub path: String,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Load and linearize an image file (JPEG, PNG, ...).
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let img = image::open(path).map_err(|source| TextureError::Load {
            path: display.clone(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(display));
        }

        let pixels = rgb
            .pixels()
            .map(|p| {
                Vec3::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        log::debug!("Loaded texture: {} ({}x{})", display, width, height);

        Ok(Self::new(width, height, pixels, display))
    }

    /// Nearest-pixel lookup at UV coordinates.
    ///
    /// `u` and `v` are clamped to `[0, 1]`; `v = 0` is the bottom row.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        if self.width == 0 || self.height == 0 {
            return Vec3::ZERO;
        }

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0); // Flip V for image coordinates

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        self.get_pixel(x, y)
    }

    /// Get pixel at integer coordinates.
    fn get_pixel(&self, x: u32, y: u32) -> Vec3 {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or(Vec3::ZERO)
    }
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> TextureImage {
        // top-left red, top-right green, bottom-left blue, bottom-right white
        TextureImage::new(
            2,
            2,
            vec![Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE],
            "<test>",
        )
    }

    #[test]
    fn test_sample_corners() {
        let tex = two_by_two();

        assert_eq!(tex.sample(0.0, 1.0), Vec3::X);
        assert_eq!(tex.sample(1.0, 1.0), Vec3::Y);
        assert_eq!(tex.sample(0.0, 0.0), Vec3::Z);
        assert_eq!(tex.sample(1.0, 0.0), Vec3::ONE);
    }

    #[test]
    fn test_sample_clamps_out_of_range() {
        let tex = two_by_two();
        assert_eq!(tex.sample(-3.0, 7.0), Vec3::X);
        assert_eq!(tex.sample(4.0, -2.0), Vec3::ONE);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = TextureImage::load("definitely/not/here.jpg");
        assert!(matches!(result, Err(TextureError::Load { .. })));
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
