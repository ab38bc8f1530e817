//! Procedural and image-backed textures.

use std::path::Path;
use std::sync::Arc;

use rand::RngCore;
use umbra_core::{Color, TextureImage};
use umbra_math::Vec3;

use crate::perlin::Perlin;

/// Anything that yields a colour for a surface point.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

impl<T: Texture + ?Sized> Texture for Arc<T> {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        (**self).value(u, v, p)
    }
}

/// Constant colour.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.albedo
    }
}

/// 3D checker pattern alternating between two sub-textures.
///
/// Cells are `scale` units wide along every axis; the parity of the sum of
/// the three cell indices picks `even` or `odd`.
#[derive(Clone)]
pub struct CheckerTexture {
    inv_scale: f32,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(scale: f32, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    /// Checker between two solid colours.
    pub fn from_colors(scale: f32, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let cell = (self.inv_scale * p).floor();
        let sum = cell.x as i64 + cell.y as i64 + cell.z as i64;

        if sum.rem_euclid(2) == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// Colour used when an image texture has no pixel data.
pub const MISSING_TEXTURE_COLOR: Color = Vec3::new(0.0, 1.0, 1.0);

/// Texture sampled from a decoded image.
///
/// A texture that failed to load renders solid cyan instead of aborting
/// the render.
#[derive(Clone)]
pub struct ImageTexture {
    image: Option<Arc<TextureImage>>,
}

impl ImageTexture {
    pub fn new(image: Arc<TextureImage>) -> Self {
        Self { image: Some(image) }
    }

    /// Load an image from disk. Failures are logged and fall back to the
    /// missing-texture colour.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match TextureImage::load(path) {
            Ok(image) => Self::new(Arc::new(image)),
            Err(e) => {
                log::warn!("{}", e);
                Self { image: None }
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        match &self.image {
            Some(image) => image.sample(u, v),
            None => MISSING_TEXTURE_COLOR,
        }
    }
}

/// Marble-like turbulence pattern.
#[derive(Clone)]
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    const TURBULENCE_DEPTH: u32 = 7;

    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.noise.turb(p, Self::TURBULENCE_DEPTH);
        Color::splat(0.5 * (1.0 + phase.sin()))
    }
}
