//! Geometry of the flavor simplex.
//!
//! The three gameplay flavors sit on the vertices of an equilateral triangle
//! inscribed in a circle of radius `r`, 120° apart:
//! - spicy at the lower right `(√3/2, 0.5)`
//! - savory at the lower left `(−√3/2, 0.5)`
//! - sweet at the top `(0, −1)`
//!
//! A blend is the barycentric combination of the vertices weighted by
//! `share / 100`. Because every normalized blend sums to 100, blends with the
//! same relative emphasis land on the same point.

use crate::types::{BLEND_TOTAL, Flavor, FlavorVector, Point2};

const HALF_SQRT_3: f64 = 0.866_025_403_784_438_6;

/// Default radius of the pot preview triangle, in screen units.
pub const DEFAULT_RADIUS: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlavorSpace {
    pub radius: f64,
}

impl Default for FlavorSpace {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

impl FlavorSpace {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// Unit-circle vertex for a gameplay flavor. Sour has no vertex.
    pub fn unit_vertex(flavor: Flavor) -> Point2 {
        match flavor {
            Flavor::Spicy => Point2::new(HALF_SQRT_3, 0.5),
            Flavor::Savory => Point2::new(-HALF_SQRT_3, 0.5),
            Flavor::Sweet => Point2::new(0.0, -1.0),
            Flavor::Sour => Point2::default(),
        }
    }

    /// Vertex for a gameplay flavor at this space's radius.
    pub fn vertex(&self, flavor: Flavor) -> Point2 {
        Self::unit_vertex(flavor) * self.radius
    }

    /// Point of a blend relative to the triangle's center, at this radius.
    pub fn to_point(&self, blend: &FlavorVector) -> Point2 {
        Self::unit_point(blend) * self.radius
    }

    /// Blend at a point relative to the triangle's center.
    ///
    /// Points outside the triangle produce negative barycentric weights;
    /// those are clamped onto the simplex before renormalizing.
    pub fn from_point(&self, point: Point2) -> FlavorVector {
        let p = if self.radius > 0.0 {
            point * (1.0 / self.radius)
        } else {
            Point2::default()
        };
        // v0 + v1 + v2 = 0 and the weights sum to 1, so:
        //   y = 0.5 - 1.5 * w_sweet
        //   x = √3/2 * (w_spicy - w_savory)
        let sweet = (0.5 - p.y) / 1.5;
        let spread = p.x / HALF_SQRT_3;
        let spicy = (1.0 - sweet + spread) / 2.0;
        let savory = (1.0 - sweet - spread) / 2.0;
        FlavorVector::new(spicy * BLEND_TOTAL, savory * BLEND_TOTAL, sweet * BLEND_TOTAL)
            .clamped_normalized()
    }

    /// Euclidean distance between two blends in radius-normalized units.
    ///
    /// Independent of the configured radius: the triangle's circumradius is 1.
    pub fn distance(a: &FlavorVector, b: &FlavorVector) -> f64 {
        Self::unit_point(a).distance(Self::unit_point(b))
    }

    fn unit_point(blend: &FlavorVector) -> Point2 {
        let mut pos = Point2::default();
        for flavor in Flavor::gameplay() {
            pos += Self::unit_vertex(flavor) * (blend[flavor] / BLEND_TOTAL);
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pure(flavor: Flavor) -> FlavorVector {
        let mut v = FlavorVector::new(0.0, 0.0, 0.0);
        v[flavor] = BLEND_TOTAL;
        v
    }

    #[test]
    fn uniform_blend_is_the_center() {
        let space = FlavorSpace::new(200.0);
        let p = space.to_point(&FlavorVector::uniform());
        assert!(p.magnitude() < 1e-9, "center = {:?}", p);
    }

    #[test]
    fn pure_blends_sit_on_vertices() {
        let space = FlavorSpace::new(180.0);
        for flavor in Flavor::gameplay() {
            let p = space.to_point(&pure(flavor));
            assert!(p.distance(space.vertex(flavor)) < 1e-9);
            assert!((p.magnitude() - 180.0).abs() < 1e-9);
        }
        assert!(space.vertex(Flavor::Sweet).y < 0.0, "sweet is at the top");
    }

    #[test]
    fn vertex_to_vertex_distance_is_root_three() {
        let d = FlavorSpace::distance(&pure(Flavor::Spicy), &pure(Flavor::Sweet));
        assert!((d - 3f64.sqrt()).abs() < 1e-9, "d = {}", d);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_equal() {
        let a = FlavorVector::new(10.0, 20.0, 70.0);
        let b = FlavorVector::new(50.0, 25.0, 25.0);
        assert_eq!(FlavorSpace::distance(&a, &b), FlavorSpace::distance(&b, &a));
        assert_eq!(FlavorSpace::distance(&a, &a), 0.0);
        assert!(FlavorSpace::distance(&a, &b) > 0.0);
    }

    #[test]
    fn from_point_inverts_to_point() {
        let space = FlavorSpace::new(50.0);
        let blend = FlavorVector::new(12.0, 30.0, 58.0);
        let back = space.from_point(space.to_point(&blend));
        assert!(back.approx_eq(&blend, 1e-9), "back = {:?}", back);
    }

    #[test]
    fn from_point_outside_clamps_to_edge() {
        let space = FlavorSpace::new(1.0);
        // Far beyond the spicy vertex.
        let blend = space.from_point(Point2::new(5.0, 3.0));
        assert!((blend.total() - BLEND_TOTAL).abs() < 1e-9);
        assert!(blend.spicy > 99.0, "blend = {:?}", blend);
    }
}
