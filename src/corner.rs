//! Squared radii of the diagonal corner bands of a square kernel.
//!
//! For a kernel of side `size`, corner depth `d` is the diagonal band of
//! cells `(x, y)` with `x + y == d` in one corner. The cell of that band
//! farthest from the kernel centre always lies on the border (`x == 0`), so
//! the band's maximum squared radius has a closed form.

/// Distance from a border cell to the kernel centre along one axis.
fn half_span(size: usize) -> f64 {
    (size as f64 - 1.0) / 2.0
}

/// Maximum squared distance from the centre to any cell of corner band `depth`.
pub fn max_sqr_radius(size: usize, depth: usize) -> f64 {
    let center = half_span(size);
    center * center + (center - depth as f64).powi(2)
}

/// [`max_sqr_radius`] for every corner depth a kernel of `size` can have.
pub fn max_sqr_radii(size: usize) -> Vec<f64> {
    (0..size / 2).map(|depth| max_sqr_radius(size, depth)).collect()
}
