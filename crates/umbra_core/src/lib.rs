//! Umbra Core - image buffers and texture images for the Umbra path tracer.
//!
//! This crate provides:
//!
//! - **Image buffers**: `ImageBuffer`, a row-major linear RGB raster, and its
//!   PPM/PNG encoders
//! - **Texture images**: decoding image files into linear RGB for the
//!   renderer's image texture
//!
//! # Example
//!
//! ```ignore
//! use umbra_core::{ImageBuffer, ImageFormat};
//!
//! let image = ImageBuffer::new(400, 225);
//! let mut file = std::fs::File::create("out.png")?;
//! image.write(&mut file, ImageFormat::Png)?;
//! ```

pub mod image_buffer;
pub mod texture;

// Re-export commonly used types
pub use image_buffer::{color_to_rgb8, linear_to_gamma, Color, ImageBuffer, ImageError, ImageFormat};
pub use texture::{TextureError, TextureImage, TextureResult};
