//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding boxes over shared scene objects, built by
//! median split along the longest axis.

use std::sync::Arc;

use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray};

use crate::hittable::{HitRecord, Hittable, HittableList};

/// BVH node - either a branch with two children or an empty tree.
///
/// Children are arbitrary hittables: leaves are the scene objects
/// themselves and inner nodes are nested `BvhNode`s. A single object is
/// stored as both children so traversal never has to check for a missing
/// side.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Arc<dyn Hittable>,
        right: Arc<dyn Hittable>,
        bbox: Aabb,
    },
    /// Empty tree (no objects). Never hit.
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    pub fn new(objects: Vec<Arc<dyn Hittable>>) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }

        let count = objects.len();
        let node = Self::build(objects);
        log::debug!("Built BVH over {} objects", count);
        node
    }

    /// Create a BVH from the contents of a hittable list.
    pub fn from_list(list: HittableList) -> Self {
        Self::new(list.into_objects())
    }

    /// Recursive BVH construction.
    ///
    /// Median split: sort objects by their box minimum on the longest axis
    /// of the combined bounds, split in half, recurse.
    fn build(mut objects: Vec<Arc<dyn Hittable>>) -> Self {
        let (left, right): (Arc<dyn Hittable>, Arc<dyn Hittable>) = match objects.len() {
            1 => (objects[0].clone(), objects[0].clone()),
            2 => (objects[0].clone(), objects[1].clone()),
            n => {
                let bounds = objects.iter().fold(Aabb::EMPTY, |acc, obj| {
                    Aabb::surrounding(&acc, &obj.bounding_box())
                });
                let axis = bounds.longest_axis();

                objects.sort_by(|a, b| {
                    let a_min = a.bounding_box().axis_interval(axis).min;
                    let b_min = b.bounding_box().axis_interval(axis).min;
                    a_min.total_cmp(&b_min)
                });

                let right_objects = objects.split_off(n / 2);
                let left: Arc<dyn Hittable> = Arc::new(Self::build(objects));
                let right: Arc<dyn Hittable> = Arc::new(Self::build(right_objects));
                (left, right)
            }
        };

        // Box of the finished children, not of the pre-split bounds
        let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());

        BvhNode::Branch { left, right, bbox }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        match self {
            BvhNode::Empty => false,

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = left.hit(ray, ray_t, rec, rng);

                // Only check right up to closest hit
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max), rec, rng);

                hit_left || hit_right
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}
