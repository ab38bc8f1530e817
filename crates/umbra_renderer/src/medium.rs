//! Homogeneous participating media (smoke, fog, subsurface haze).

use std::sync::Arc;

use rand::RngCore;
use umbra_core::Color;
use umbra_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::material::Isotropic;
use crate::random::gen_f32;
use crate::texture::Texture;

/// Offset past the entry point when searching for the exit point.
const EXIT_SEARCH_OFFSET: f32 = 0.0001;

/// A constant-density volume filling a closed boundary.
///
/// A ray travelling a distance `L` through the volume scatters inside it
/// with probability `1 - exp(-density * L)`. A density that is zero,
/// negative or NaN gives an empty volume that never scatters.
pub struct ConstantMedium {
    boundary: Box<dyn Hittable>,
    /// `-1 / density`, or `None` for an empty volume
    neg_inv_density: Option<f32>,
    phase_function: Isotropic,
}

impl ConstantMedium {
    pub fn new<H: Hittable + 'static>(boundary: H, density: f32, texture: Arc<dyn Texture>) -> Self {
        Self {
            boundary: Box::new(boundary),
            neg_inv_density: neg_inv_density(density),
            phase_function: Isotropic::from_texture(texture),
        }
    }

    pub fn from_color<H: Hittable + 'static>(boundary: H, density: f32, albedo: Color) -> Self {
        Self {
            boundary: Box::new(boundary),
            neg_inv_density: neg_inv_density(density),
            phase_function: Isotropic::new(albedo),
        }
    }
}

fn neg_inv_density(density: f32) -> Option<f32> {
    if density > 0.0 {
        Some(-1.0 / density)
    } else {
        log::warn!("Medium density {} is not positive; the volume will be empty", density);
        None
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let Some(neg_inv_density) = self.neg_inv_density else {
            return false;
        };

        let mut entry = HitRecord::default();
        let mut exit = HitRecord::default();

        if !self.boundary.hit(ray, Interval::UNIVERSE, &mut entry, rng) {
            return false;
        }

        let exit_t = Interval::new(entry.t + EXIT_SEARCH_OFFSET, f32::INFINITY);
        if !self.boundary.hit(ray, exit_t, &mut exit, rng) {
            return false;
        }

        let t_enter = entry.t.max(ray_t.min).max(0.0);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return false;
        }

        let ray_length = ray.direction().length();
        if ray_length == 0.0 {
            return false;
        }

        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        // 1 - U lies in (0, 1], so the log is finite
        let hit_distance = neg_inv_density * (1.0 - gen_f32(rng)).ln();

        if hit_distance > distance_inside_boundary {
            return false;
        }

        rec.t = t_enter + hit_distance / ray_length;
        rec.p = ray.at(rec.t);
        rec.normal = Vec3::X; // arbitrary
        rec.front_face = true; // also arbitrary
        rec.u = 0.0;
        rec.v = 0.0;
        rec.material = &self.phase_function;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dielectric, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dense_medium_scatters_inside_boundary() {
        let medium = ConstantMedium::from_color(
            Sphere::new(Vec3::ZERO, 1.0, Dielectric::new(1.5)),
            1000.0,
            Color::ONE,
        );
        let ray = Ray::new_simple(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let mut rec = HitRecord::default();
            assert!(medium.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
            assert!(rec.t >= 4.0 && rec.t <= 6.0);
            assert!(rec.front_face);
            assert_eq!(rec.normal, Vec3::X);
        }
    }

    #[test]
    fn test_medium_missed_boundary() {
        let medium = ConstantMedium::from_color(
            Sphere::new(Vec3::ZERO, 1.0, Dielectric::new(1.5)),
            1000.0,
            Color::ONE,
        );
        let ray = Ray::new_simple(Vec3::new(-5.0, 3.0, 0.0), Vec3::X);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(!medium.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_ray_starting_inside_medium() {
        let medium = ConstantMedium::from_color(
            Sphere::new(Vec3::ZERO, 10.0, Dielectric::new(1.5)),
            1000.0,
            Color::ONE,
        );
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(3);

        assert!(medium.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!(rec.t >= 0.001 && rec.t < 10.0);
    }

    #[test]
    fn test_non_positive_density_never_scatters() {
        let ray = Ray::new_simple(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        let mut rng = StdRng::seed_from_u64(11);

        for density in [0.0, -0.5, f32::NAN] {
            let medium = ConstantMedium::from_color(
                Sphere::new(Vec3::ZERO, 1.0, Dielectric::new(1.5)),
                density,
                Color::ONE,
            );
            for _ in 0..1000 {
                let mut rec = HitRecord::default();
                assert!(
                    !medium.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng),
                    "density {density} scattered at t={}",
                    rec.t
                );
            }
        }
    }

    #[test]
    fn test_scatter_point_stays_inside_query_interval() {
        let medium = ConstantMedium::from_color(
            Sphere::new(Vec3::ZERO, 1.0, Dielectric::new(1.5)),
            0.5,
            Color::ONE,
        );
        let ray = Ray::new_simple(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        let mut rng = StdRng::seed_from_u64(12);

        for _ in 0..1000 {
            let mut rec = HitRecord::default();
            if medium.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng) {
                assert!(rec.t.is_finite());
                assert!((4.0..=6.0).contains(&rec.t));
            }
        }
    }

    #[test]
    fn test_medium_bbox_is_boundary_bbox() {
        let sphere = Sphere::new(Vec3::ONE, 2.0, Dielectric::new(1.5));
        let expected = sphere.bounding_box();
        let medium = ConstantMedium::from_color(sphere, 0.5, Color::ONE);
        assert_eq!(medium.bounding_box(), expected);
    }
}
