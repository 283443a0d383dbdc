//! Float comparisons for tests.

use cgmath::{Matrix4, Point3};

pub static TOLERANCE: f64 = 1e-9;

pub fn mat_approx_eq(a: &Matrix4<f64>, b: &Matrix4<f64>) -> bool {
    for c in 0..4 {
        for r in 0..4 {
            if (a[c][r] - b[c][r]).abs() > TOLERANCE {
                return false;
            }
        }
    }
    true
}

pub fn point_approx_eq(a: Point3<f64>, b: Point3<f64>) -> bool {
    (a.x - b.x).abs() < TOLERANCE &&
    (a.y - b.y).abs() < TOLERANCE &&
    (a.z - b.z).abs() < TOLERANCE
}
