//! Sphere primitive for ray tracing.

use std::f32::consts::PI;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// A sphere primitive, optionally moving linearly over the shutter interval.
pub struct Sphere<M: Material> {
    /// Center at time 0, with direction pointing to the center at time 1
    center: Ray,
    radius: f32,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Sphere<M> {
    /// Create a new stationary sphere.
    pub fn new(center: Vec3, radius: f32, material: M) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center: Ray::new(center, Vec3::ZERO, 0.0),
            radius,
            material,
            bbox,
        }
    }

    /// Create a sphere moving from `center1` at time 0 to `center2` at time 1.
    pub fn moving(center1: Vec3, center2: Vec3, radius: f32, material: M) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);
        let box2 = Aabb::from_points(center2 - rvec, center2 + rvec);

        Self {
            center: Ray::new(center1, center2 - center1, 0.0),
            radius,
            material,
            bbox: Aabb::surrounding(&box1, &box2),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl<M: Material + 'static> Hittable for Sphere<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let a = ray.direction().length_squared();
        if self.radius <= 0.0 || a == 0.0 {
            return false;
        }

        let current_center = self.center.at(ray.time());
        let oc = current_center - ray.origin();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - current_center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);
        rec.material = &self.material;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Lambertian {
        Lambertian::new(Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let interval = Interval::new(0.001, f32::INFINITY);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(sphere.hit(&ray, interval, &mut rec, &mut rng));
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());

        // Ray pointing away from sphere
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let interval = Interval::new(0.001, f32::INFINITY);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(!sphere.hit(&ray, interval, &mut rec, &mut rng));
    }

    #[test]
    fn test_sphere_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, grey());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert!(!rec.front_face);
        assert!((rec.normal + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_non_positive_radius_never_hits() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), -3.0, grey());
        assert_eq!(sphere.radius(), 0.0);

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!sphere.hit(&ray, Interval::UNIVERSE, &mut rec, &mut rng));
    }

    #[test]
    fn test_zero_direction_is_a_miss() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, grey());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::ZERO);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!sphere.hit(&ray, Interval::UNIVERSE, &mut rec, &mut rng));
    }

    #[test]
    fn test_moving_sphere_follows_time() {
        let sphere = Sphere::moving(Vec3::new(0.0, 0.0, -5.0), Vec3::new(10.0, 0.0, -5.0), 1.0, grey());
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        let interval = Interval::new(0.001, f32::INFINITY);

        let early = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert!(sphere.hit(&early, interval, &mut rec, &mut rng));

        let late = Ray::new(Vec3::ZERO, -Vec3::Z, 1.0);
        assert!(!sphere.hit(&late, interval, &mut rec, &mut rng));

        let late_shifted = Ray::new(Vec3::new(10.0, 0.0, 0.0), -Vec3::Z, 1.0);
        assert!(sphere.hit(&late_shifted, interval, &mut rec, &mut rng));
    }

    #[test]
    fn test_moving_sphere_bbox_covers_both_ends() {
        let sphere = Sphere::moving(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 1.0, grey());
        let bbox = sphere.bounding_box();
        assert_eq!(bbox.min_point(), Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max_point(), Vec3::new(5.0, 1.0, 1.0));
    }

    #[test]
    fn test_sphere_uv() {
        let sphere_uv = Sphere::<Lambertian>::get_sphere_uv;
        let (u, v) = sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-5 && (v - 0.5).abs() < 1e-5);
        let (_, v) = sphere_uv(Vec3::new(0.0, 1.0, 0.0));
        assert!((v - 1.0).abs() < 1e-5);
        let (u, _) = sphere_uv(Vec3::new(0.0, 0.0, 1.0));
        assert!((u - 0.25).abs() < 1e-5);
    }
}
