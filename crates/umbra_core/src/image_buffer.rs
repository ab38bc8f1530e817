//! Linear-colour image buffers and their encoders.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use thiserror::Error;
use umbra_math::Vec3;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Errors produced while encoding or writing an image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Output encodings understood by [`ImageBuffer::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Plain-text PPM (`P3`).
    #[default]
    Ppm,
    Png,
}

impl ImageFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Ppm => "ppm",
            ImageFormat::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Ppm => write!(f, "PPM"),
            ImageFormat::Png => write!(f, "PNG"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ppm" => Ok(ImageFormat::Ppm),
            "png" => Ok(ImageFormat::Png),
            _ => Err(ImageError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let to_byte = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Row-major buffer of linear colours, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Height for a given width and aspect ratio, never less than one row.
    pub fn height_for(width: u32, aspect_ratio: f32) -> u32 {
        ((width as f32 / aspect_ratio) as u32).max(1)
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    /// Borrow one row of pixels.
    pub fn row(&self, y: u32) -> &[Color] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Gamma-corrected RGB bytes, three per pixel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }

    /// Encode the image in `format` into `writer`.
    pub fn write<W: Write>(&self, writer: &mut W, format: ImageFormat) -> Result<(), ImageError> {
        match format {
            ImageFormat::Ppm => self.write_ppm(writer),
            ImageFormat::Png => self.write_png(writer),
        }
    }

    fn write_ppm<W: Write>(&self, writer: &mut W) -> Result<(), ImageError> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        for color in &self.pixels {
            let [r, g, b] = color_to_rgb8(*color);
            writeln!(writer, "{} {} {}", r, g, b)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_png<W: Write>(&self, writer: &mut W) -> Result<(), ImageError> {
        let bytes = self.to_rgb8();
        PngEncoder::new(&mut *writer).write_image(&bytes, self.width, self.height, ColorType::Rgb8)?;
        writer.flush()?;
        Ok(())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8_clamps() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::splat(4.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.25, -1.0, f32::NAN)), [128, 0, 0]);
    }

    #[test]
    fn test_height_for_aspect() {
        assert_eq!(ImageBuffer::height_for(400, 16.0 / 9.0), 225);
        assert_eq!(ImageBuffer::height_for(1, 16.0 / 9.0), 1);
    }

    #[test]
    fn test_get_set_row() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(2, 1, Color::ONE);

        assert_eq!(image.get(2, 1), Color::ONE);
        assert_eq!(image.row(1), &[Color::ZERO, Color::ZERO, Color::ONE]);
    }

    #[test]
    fn test_write_ppm() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(0, 0, Color::ONE);

        let mut out = Vec::new();
        image.write(&mut out, ImageFormat::Ppm).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "P3\n2 1\n255\n255 255 255\n0 0 0\n");
    }

    #[test]
    fn test_write_png_signature() {
        let image = ImageBuffer::new(4, 4);
        let mut out = Vec::new();
        image.write(&mut out, ImageFormat::Png).unwrap();

        assert_eq!(&out[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("ppm".parse::<ImageFormat>().unwrap(), ImageFormat::Ppm);
        assert!("bmp".parse::<ImageFormat>().is_err());
        assert_eq!(ImageFormat::Png.extension(), "png");
    }
}
