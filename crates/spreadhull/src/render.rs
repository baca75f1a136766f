//! Geometry handed to a drawing layer for one chosen hit.
//!
//! The engine computes everything; a renderer only draws: the rotated vertices
//! (for rotation rays), the actual hull, and a regular polygon with the same
//! vertex count and circumradius as a visual reference.

use nalgebra::{Point2, Point3};
use std::f64::consts::TAU;

use crate::projection::{rotate_f64, PlaneNormal};
use crate::search::SearchHit;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderData {
    /// Rotated vertices in 3D, in polytope vertex order.
    pub rotated: Vec<Point3<f64>>,
    /// Hull vertices in the projection plane, counter-clockwise.
    pub hull: Vec<Point2<f64>>,
    /// Regular reference polygon, first vertex aligned with the first hull vertex.
    pub ideal: Vec<Point2<f64>>,
    /// Largest distance of a hull vertex from the origin.
    pub circumradius: f64,
    pub plane: PlaneNormal,
}

/// Pure query over an already evaluated hit.
pub fn render_data(hit: &SearchHit) -> RenderData {
    let rotated = rotate_f64(&hit.polytope, &hit.spreads);
    let hull: Vec<Point2<f64>> = hit
        .result
        .hull_points()
        .into_iter()
        .map(|p| Point2::new(p.x, p.y))
        .collect();
    let circumradius = hull.iter().map(|p| p.coords.norm()).fold(0.0, f64::max);
    let phase = hull.first().map(|p| p.y.atan2(p.x)).unwrap_or(0.0);
    RenderData {
        rotated,
        ideal: regular_polygon(hull.len(), circumradius, phase),
        hull,
        circumradius,
        plane: hit.result.plane,
    }
}

/// `n` vertices on a circle of radius `r`, counter-clockwise from angle `phase`.
pub fn regular_polygon(n: usize, r: f64, phase: f64) -> Vec<Point2<f64>> {
    (0..n)
        .map(|k| {
            let a = phase + TAU * k as f64 / n as f64;
            Point2::new(r * a.cos(), r * a.sin())
        })
        .collect()
}
