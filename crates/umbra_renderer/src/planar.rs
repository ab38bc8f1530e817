//! Planar primitives: quads, triangles, ellipses and discs.
//!
//! All four shapes share one plane intersection. A shape is described by a
//! corner (or centre) `q` and two edge vectors `u` and `v`; a hit point is
//! expressed in that basis as `q + alpha * u + beta * v` and the shape only
//! decides which `(alpha, beta)` pairs are inside.

use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::Material;

/// Denominators smaller than this are treated as a ray parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Which region of the `(alpha, beta)` plane is solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanarShape {
    /// `0 <= alpha, beta <= 1`
    Quad,
    /// `0 <= alpha, beta` and `alpha + beta <= 1`
    Triangle,
    /// `alpha^2 + beta^2 <= 1`, with `q` at the centre
    Ellipse,
}

impl PlanarShape {
    /// Texture coordinates for interior coordinates, or `None` if outside.
    fn interior(self, alpha: f32, beta: f32) -> Option<(f32, f32)> {
        let unit = Interval::new(0.0, 1.0);
        match self {
            PlanarShape::Quad => {
                (unit.contains(alpha) && unit.contains(beta)).then_some((alpha, beta))
            }
            PlanarShape::Triangle => (unit.contains(alpha)
                && unit.contains(beta)
                && alpha + beta <= 1.0)
                .then_some((alpha, beta)),
            PlanarShape::Ellipse => (alpha * alpha + beta * beta <= 1.0)
                .then_some(((alpha + 1.0) / 2.0, (beta + 1.0) / 2.0)),
        }
    }
}

/// A bounded piece of a plane.
pub struct Planar<M: Material> {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` with `n = u x v`, used to solve for `(alpha, beta)`
    w: Vec3,
    normal: Vec3,
    d: f32,
    shape: PlanarShape,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Planar<M> {
    /// Parallelogram with corner `q` and edges `u`, `v`.
    pub fn quad(q: Vec3, u: Vec3, v: Vec3, material: M) -> Self {
        let bbox = Aabb::surrounding(
            &Aabb::from_points(q, q + u + v),
            &Aabb::from_points(q + u, q + v),
        );
        Self::with_shape(q, u, v, PlanarShape::Quad, material, bbox)
    }

    /// Triangle with corners `q`, `q + u` and `q + v`.
    pub fn triangle(q: Vec3, u: Vec3, v: Vec3, material: M) -> Self {
        let bbox = Aabb::surrounding(&Aabb::from_points(q, q + u), &Aabb::from_points(q, q + v));
        Self::with_shape(q, u, v, PlanarShape::Triangle, material, bbox)
    }

    /// Ellipse centred at `center` with semi-axes `u` and `v`.
    pub fn ellipse(center: Vec3, u: Vec3, v: Vec3, material: M) -> Self {
        let bbox = Aabb::surrounding(
            &Aabb::from_points(center - u - v, center + u + v),
            &Aabb::from_points(center - u + v, center + u - v),
        );
        Self::with_shape(center, u, v, PlanarShape::Ellipse, material, bbox)
    }

    /// Circular disc in the plane spanned by `u` and `v`.
    ///
    /// Only the directions of `u` and `v` matter: `u` is rescaled to
    /// `radius`, and `v` is made orthogonal to `u` before being rescaled.
    pub fn disc(center: Vec3, u: Vec3, v: Vec3, radius: f32, material: M) -> Self {
        let radius = radius.max(0.0);
        let u_dir = u.normalize_or_zero();
        let v_dir = (v - u_dir * v.dot(u_dir)).normalize_or_zero();
        Self::ellipse(center, u_dir * radius, v_dir * radius, material)
    }

    fn with_shape(q: Vec3, u: Vec3, v: Vec3, shape: PlanarShape, material: M, bbox: Aabb) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let n_len_sq = n.length_squared();
        let w = if n_len_sq > 0.0 { n / n_len_sq } else { Vec3::ZERO };

        Self {
            q,
            u,
            v,
            w,
            normal,
            d: normal.dot(q),
            shape,
            material,
            bbox,
        }
    }

    pub fn shape(&self) -> PlanarShape {
        self.shape
    }

    /// Plane coordinates `(alpha, beta)` of a point already on the plane.
    pub fn plane_coordinates(&self, point: Vec3) -> (f32, f32) {
        let planar_hitpt = point - self.q;
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));
        (alpha, beta)
    }
}

impl<M: Material + 'static> Hittable for Planar<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane, or degenerate edges
        if denom.abs() < PARALLEL_EPSILON {
            return false;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return false;
        }

        let intersection = ray.at(t);
        let (alpha, beta) = self.plane_coordinates(intersection);
        let Some((u, v)) = self.shape.interior(alpha, beta) else {
            return false;
        };

        rec.t = t;
        rec.p = intersection;
        rec.u = u;
        rec.v = v;
        rec.material = &self.material;
        rec.set_face_normal(ray, self.normal);

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Axis-aligned box between two opposite corners, built from six quads.
pub fn make_box<M: Material + Clone + 'static>(a: Vec3, b: Vec3, material: M) -> HittableList {
    let mut sides = HittableList::new();

    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    // front, right, back, left, top, bottom
    sides.add(Planar::quad(Vec3::new(min.x, min.y, max.z), dx, dy, material.clone()));
    sides.add(Planar::quad(Vec3::new(max.x, min.y, max.z), -dz, dy, material.clone()));
    sides.add(Planar::quad(Vec3::new(max.x, min.y, min.z), -dx, dy, material.clone()));
    sides.add(Planar::quad(Vec3::new(min.x, min.y, min.z), dz, dy, material.clone()));
    sides.add(Planar::quad(Vec3::new(min.x, max.y, max.z), dx, -dz, material.clone()));
    sides.add(Planar::quad(Vec3::new(min.x, min.y, min.z), dx, dz, material));

    sides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mat() -> Lambertian {
        Lambertian::new(Vec3::splat(0.5))
    }

    fn cast<M: Material + 'static>(
        shape: &Planar<M>,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<(f32, f32, f32)> {
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(origin, direction);
        shape
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng)
            .then_some((rec.t, rec.u, rec.v))
    }

    #[test]
    fn test_quad_centre_coordinates() {
        let quad = Planar::quad(
            Vec3::new(-3.0, -2.0, 5.0),
            Vec3::new(0.0, 0.0, -4.0),
            Vec3::new(0.0, 4.0, 0.0),
            mat(),
        );
        let target = Vec3::new(-3.0, 0.0, 3.0);
        let origin = Vec3::new(0.0, 0.0, 9.0);

        let (t, u, v) = cast(&quad, origin, target - origin).expect("centre of quad");
        assert!((u - 0.5).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_quad_edges_are_inclusive() {
        let quad = Planar::quad(Vec3::ZERO, Vec3::X, Vec3::Y, mat());
        assert!(cast(&quad, Vec3::new(1.0, 1.0, 1.0), -Vec3::Z).is_some());
        assert!(cast(&quad, Vec3::new(0.0, 0.5, 1.0), -Vec3::Z).is_some());
        assert!(cast(&quad, Vec3::new(1.01, 0.5, 1.0), -Vec3::Z).is_none());
    }

    #[test]
    fn test_triangle_interior() {
        let tri = Planar::triangle(Vec3::ZERO, Vec3::X, Vec3::Y, mat());
        assert!(cast(&tri, Vec3::new(0.25, 0.25, 1.0), -Vec3::Z).is_some());
        assert!(cast(&tri, Vec3::new(0.75, 0.75, 1.0), -Vec3::Z).is_none());
    }

    #[test]
    fn test_ellipse_interior_and_uv() {
        let ellipse = Planar::ellipse(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::Y, mat());
        let (_, u, v) = cast(&ellipse, Vec3::new(0.0, 0.0, 1.0), -Vec3::Z).expect("centre");
        assert!((u - 0.5).abs() < 1e-5 && (v - 0.5).abs() < 1e-5);

        assert!(cast(&ellipse, Vec3::new(1.9, 0.0, 1.0), -Vec3::Z).is_some());
        assert!(cast(&ellipse, Vec3::new(1.9, 0.9, 1.0), -Vec3::Z).is_none());
    }

    #[test]
    fn test_disc_rescales_basis() {
        let disc = Planar::disc(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Vec3::Y, 1.5, mat());
        assert!(cast(&disc, Vec3::new(1.4, 0.0, 1.0), -Vec3::Z).is_some());
        assert!(cast(&disc, Vec3::new(0.0, -1.4, 1.0), -Vec3::Z).is_some());
        assert!(cast(&disc, Vec3::new(1.1, 1.1, 1.0), -Vec3::Z).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let quad = Planar::quad(Vec3::ZERO, Vec3::X, Vec3::Y, mat());
        assert!(cast(&quad, Vec3::new(0.5, 0.5, 1.0), Vec3::X).is_none());
    }

    #[test]
    fn test_degenerate_edges_never_hit() {
        let quad = Planar::quad(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, mat());
        assert!(cast(&quad, Vec3::new(0.5, 0.0, 1.0), -Vec3::Z).is_none());
    }

    #[test]
    fn test_flat_quad_bbox_is_padded() {
        let quad = Planar::quad(Vec3::ZERO, Vec3::X, Vec3::Y, mat());
        let bbox = quad.bounding_box();
        assert!(bbox.z.size() > 0.0);
        assert!(bbox.z.contains(0.0));
    }

    #[test]
    fn test_make_box_has_six_sides() {
        let sides = make_box(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, mat());
        assert_eq!(sides.len(), 6);

        let bbox = sides.bounding_box();
        assert!((bbox.min_point() - Vec3::ZERO).length() < 1e-3);
        assert!((bbox.max_point() - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-3);

        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Vec3::new(0.5, 1.0, -5.0), Vec3::Z);
        assert!(sides.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 5.0).abs() < 1e-4);
        assert!((rec.normal + Vec3::Z).length() < 1e-5);
    }
}
