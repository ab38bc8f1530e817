//! Instancing decorators: translation and rotation about the Y axis.
//!
//! Both move the ray into object space, ask the wrapped object, and move the
//! hit back into world space.

use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};

/// Offsets a wrapped object by a fixed vector.
pub struct Translate {
    object: Box<dyn Hittable>,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new<H: Hittable + 'static>(object: H, offset: Vec3) -> Self {
        let bbox = object.bounding_box().translate(offset);
        Self {
            object: Box::new(object),
            offset,
            bbox,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let offset_r = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        if !self.object.hit(&offset_r, ray_t, rec, rng) {
            return false;
        }

        rec.p += self.offset;
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Rotates a wrapped object about the world Y axis.
pub struct RotateY {
    object: Box<dyn Hittable>,
    sin_theta: f32,
    cos_theta: f32,
    bbox: Aabb,
}

impl RotateY {
    /// `angle` is in degrees, counter-clockwise looking down -Y.
    pub fn new<H: Hittable + 'static>(object: H, angle: f32) -> Self {
        let radians = angle.to_radians();
        let (sin_theta, cos_theta) = radians.sin_cos();

        let mut rotated = Self {
            bbox: Aabb::EMPTY,
            object: Box::new(object),
            sin_theta,
            cos_theta,
        };

        let child = rotated.object.bounding_box();
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in child.corners() {
            let p = rotated.to_world(corner);
            min = min.min(p);
            max = max.max(p);
        }
        rotated.bbox = Aabb::from_points(min, max);

        rotated
    }

    #[inline]
    fn to_object(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    #[inline]
    fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl Hittable for RotateY {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let rotated_r = Ray::new(
            self.to_object(ray.origin()),
            self.to_object(ray.direction()),
            ray.time(),
        );

        if !self.object.hit(&rotated_r, ray_t, rec, rng) {
            return false;
        }

        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_box, Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_sphere() -> Sphere<Lambertian> {
        Sphere::new(Vec3::ZERO, 1.0, Lambertian::new(Vec3::ONE))
    }

    #[test]
    fn test_translate_moves_hit() {
        let moved = Translate::new(unit_sphere(), Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(moved.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert_eq!(moved.bounding_box().z, Interval::new(-6.0, -4.0));
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        // Box spanning x in [1, 2], rotated 90 degrees ends up at z in [-2, -1]
        let rotated = RotateY::new(
            make_box(Vec3::new(1.0, 0.0, -0.5), Vec3::new(2.0, 1.0, 0.5), Lambertian::new(Vec3::ONE)),
            90.0,
        );
        let bbox = rotated.bounding_box();
        assert!((bbox.z.min + 2.0).abs() < 1e-4);
        assert!((bbox.z.max + 1.0).abs() < 1e-4);
        assert!((bbox.x.min + 0.5).abs() < 1e-4);

        let ray = Ray::new_simple(Vec3::new(0.0, 0.5, 5.0), -Vec3::Z);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(rotated.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.p.z + 1.0).abs() < 1e-4);
        assert!((rec.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_rotation_round_trip() {
        let rotated = RotateY::new(unit_sphere(), 37.0);
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!((rotated.to_world(rotated.to_object(v)) - v).length() < 1e-5);
    }
}
