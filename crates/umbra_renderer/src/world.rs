//! Scene root plus the recursive light transport estimator.

use rand::RngCore;
use umbra_core::Color;
use umbra_math::{Interval, Ray};

use crate::hittable::{HitRecord, Hittable};

/// Background used when a scene does not set one.
pub const DEFAULT_BACKGROUND: Color = Color::new(0.001, 0.001, 0.001);

/// Rays are only accepted this far along their direction to avoid
/// re-hitting the surface they left.
const SHADOW_ACNE_EPSILON: f32 = 0.001;

/// A renderable scene: one root object and the colour of empty space.
pub struct World {
    root: Box<dyn Hittable>,
    background: Color,
}

impl World {
    pub fn new<H: Hittable + 'static>(root: H) -> Self {
        Self::with_background(root, DEFAULT_BACKGROUND)
    }

    pub fn with_background<H: Hittable + 'static>(root: H, background: Color) -> Self {
        Self {
            root: Box::new(root),
            background,
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn root(&self) -> &dyn Hittable {
        self.root.as_ref()
    }

    /// Compute the colour seen along `ray`, following at most `depth` bounces.
    ///
    /// Paths that run out of depth contribute the background colour.
    pub fn ray_colour(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if depth == 0 {
            return self.background;
        }

        let mut rec = HitRecord::default();
        if !self.root.hit(
            ray,
            Interval::new(SHADOW_ACNE_EPSILON, f32::INFINITY),
            &mut rec,
            rng,
        ) {
            return self.background;
        }

        let emission = rec.material.emitted(rec.u, rec.v, rec.p);

        match rec.material.scatter(ray, &rec, rng) {
            Some(result) => {
                emission + result.attenuation * self.ray_colour(&result.scattered, depth - 1, rng)
            }
            None => emission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiffuseLight, HittableList, Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_math::Vec3;

    #[test]
    fn test_miss_returns_background() {
        let world = World::with_background(HittableList::new(), Color::new(0.7, 0.8, 1.0));
        let mut rng = StdRng::seed_from_u64(0);
        let c = world.ray_colour(&Ray::new_simple(Vec3::ZERO, Vec3::Z), 10, &mut rng);
        assert_eq!(c, Color::new(0.7, 0.8, 1.0));
    }

    #[test]
    fn test_zero_depth_returns_background() {
        let light = Sphere::new(Vec3::new(0.0, 0.0, -2.0), 1.0, DiffuseLight::new(Color::splat(5.0)));
        let world = World::new(light);
        let mut rng = StdRng::seed_from_u64(0);
        let c = world.ray_colour(&Ray::new_simple(Vec3::ZERO, -Vec3::Z), 0, &mut rng);
        assert_eq!(c, DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_emitter_returns_emission() {
        let light = Sphere::new(Vec3::new(0.0, 0.0, -2.0), 1.0, DiffuseLight::new(Color::splat(5.0)));
        let world = World::with_background(light, Color::ZERO);
        let mut rng = StdRng::seed_from_u64(0);
        let c = world.ray_colour(&Ray::new_simple(Vec3::ZERO, -Vec3::Z), 1, &mut rng);
        assert_eq!(c, Color::splat(5.0));
    }

    #[test]
    fn test_diffuse_attenuates_background() {
        // Grey ground under a white sky: one bounce keeps at most half
        let mut list = HittableList::new();
        list.add(Sphere::new(Vec3::new(0.0, -1000.5, 0.0), 1000.0, Lambertian::new(Color::splat(0.5))));
        let world = World::with_background(list, Color::ONE);
        let mut rng = StdRng::seed_from_u64(0);

        let c = world.ray_colour(&Ray::new_simple(Vec3::ZERO, -Vec3::Y), 50, &mut rng);
        assert!(c.x > 0.0 && c.x <= 0.5 + 1e-6);
    }
}
