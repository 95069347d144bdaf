//! Matrix operators over views.
//!
//! All kernels are portable row-major loops; per-scalar accumulation runs
//! left to right over the inner dimension, which keeps results reproducible
//! across view shapes and buffer offsets.

use super::{MatView, MatViewMut};

/// Computes matrix-matrix multiplication `C = A * B`.
pub fn product(a: MatView<'_>, b: MatView<'_>, c: &mut MatViewMut<'_>) {
    debug_assert_eq!(a.rows(), c.rows());
    debug_assert_eq!(b.columns(), c.columns());
    debug_assert_eq!(a.columns(), b.rows());

    for i in 0..a.rows() {
        let a_row = a.row(i);
        let c_row = c.row_mut(i);
        for (j, out) in c_row.iter_mut().enumerate() {
            let mut value = 0.0;
            for (k, &a_value) in a_row.iter().enumerate() {
                value += a_value * b.get(k, j);
            }
            *out = value;
        }
    }
}

/// Adds to `C` the result of matrix-matrix multiplication: `C += A * B`.
pub fn add_product(a: MatView<'_>, b: MatView<'_>, c: &mut MatViewMut<'_>) {
    debug_assert_eq!(a.rows(), c.rows());
    debug_assert_eq!(b.columns(), c.columns());
    debug_assert_eq!(a.columns(), b.rows());

    for i in 0..a.rows() {
        let a_row = a.row(i);
        let c_row = c.row_mut(i);
        for (j, out) in c_row.iter_mut().enumerate() {
            let mut value = *out;
            for (k, &a_value) in a_row.iter().enumerate() {
                value += a_value * b.get(k, j);
            }
            *out = value;
        }
    }
}

/// In-place element-wise addition `A += B`.
pub fn add_in_place(a: &mut MatViewMut<'_>, b: MatView<'_>) {
    debug_assert_eq!(a.rows(), b.rows());
    debug_assert_eq!(a.columns(), b.columns());

    for i in 0..b.rows() {
        let b_row = b.row(i);
        for (out, &b_value) in a.row_mut(i).iter_mut().zip(b_row) {
            *out += b_value;
        }
    }
}

/// Adds the column vector `v` to every column of `m`, in place.
pub fn add_in_place_column_wise(m: &mut MatViewMut<'_>, v: MatView<'_>) {
    debug_assert_eq!(v.columns(), 1);
    debug_assert_eq!(v.rows(), m.rows());

    for i in 0..m.rows() {
        let value = v.get(i, 0);
        for out in m.row_mut(i) {
            *out += value;
        }
    }
}

/// Copies `source` into `destination`; shapes must match.
pub fn copy(destination: &mut MatViewMut<'_>, source: MatView<'_>) {
    debug_assert_eq!(destination.rows(), source.rows());
    debug_assert_eq!(destination.columns(), source.columns());

    for i in 0..source.rows() {
        destination.row_mut(i).copy_from_slice(source.row(i));
    }
}
