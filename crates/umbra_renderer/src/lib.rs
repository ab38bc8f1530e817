//! Umbra Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering: BVH-accelerated
//! ray/scene intersection, textured materials and participating media,
//! fixed or adaptive per-pixel sampling, and a row-parallel render driver.

mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod medium;
mod perlin;
mod planar;
pub mod random;
mod renderer;
mod sampler;
mod sink;
mod sphere;
mod texture;
mod transform;
mod world;

pub use bvh::BvhNode;
pub use camera::{Camera, Viewport};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult};
pub use medium::ConstantMedium;
pub use perlin::Perlin;
pub use planar::{make_box, Planar, PlanarShape};
pub use renderer::{
    render, render_pixel, render_with_progress, RenderConfig, RenderOutput, RenderProgress,
    DEFAULT_MAX_DEPTH,
};
pub use sampler::{AdaptiveConfig, PixelSampler, Sampler, SamplerConfig, SamplerKind};
pub use sink::{ColourSink, DensitySink, OutputKind, PixelSink};
pub use sphere::Sphere;
pub use texture::{
    CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture, MISSING_TEXTURE_COLOR,
};
pub use transform::{RotateY, Translate};
pub use world::{World, DEFAULT_BACKGROUND};

/// Re-export common math and image types
pub use umbra_core::{Color, ImageBuffer};
pub use umbra_math::{Aabb, Interval, Ray, Vec3};
