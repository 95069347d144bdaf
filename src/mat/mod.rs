//! Row-major float matrices with zero-copy rectangular views.
//!
//! A [`Matrix`] owns a contiguous `f32` buffer. All computation happens
//! through [`MatView`] / [`MatViewMut`], non-owning windows into that
//! buffer described by a row count, a column count and a row stride.
//! Views alias the parent storage: a write through one view is visible
//! through every overlapping view and through the matrix itself.

mod ops;

pub use ops::{add_in_place, add_in_place_column_wise, add_product, copy, product};

/// An owned row-major matrix of `f32` values.
#[derive(Debug, Clone, Default)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    /// Creates a matrix from row slices. All rows must have the same length.
    pub fn from_rows(rows: &[&[f32]]) -> Self {
        let Some(first) = rows.first() else {
            return Self::default();
        };
        let columns = first.len();
        let mut m = Self::new(rows.len(), columns);
        for (i, row) in rows.iter().enumerate() {
            debug_assert_eq!(row.len(), columns);
            m.data[i * columns..(i + 1) * columns].copy_from_slice(row);
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> f32 {
        self.data[row * self.columns + column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f32) {
        self.data[row * self.columns + column] = value;
    }

    /// Reallocates to the given shape, discarding contents, if the shape
    /// differs; otherwise keeps the existing storage untouched.
    pub fn resize(&mut self, rows: usize, columns: usize) {
        if self.rows == rows && self.columns == columns {
            return;
        }
        *self = Self::new(rows, columns);
    }

    pub fn set_zero(&mut self) {
        self.data.fill(0.0);
    }

    pub fn as_view(&self) -> MatView<'_> {
        MatView {
            data: &self.data,
            rows: self.rows,
            columns: self.columns,
            stride: self.columns,
        }
    }

    pub fn as_view_mut(&mut self) -> MatViewMut<'_> {
        MatViewMut {
            rows: self.rows,
            columns: self.columns,
            stride: self.columns,
            data: &mut self.data,
        }
    }

    /// Rectangular sub-view starting at `(from_row, from_column)`.
    pub fn view(
        &self,
        from_row: usize,
        from_column: usize,
        num_rows: usize,
        num_columns: usize,
    ) -> MatView<'_> {
        self.as_view().view(from_row, from_column, num_rows, num_columns)
    }

    pub fn view_mut(
        &mut self,
        from_row: usize,
        from_column: usize,
        num_rows: usize,
        num_columns: usize,
    ) -> MatViewMut<'_> {
        self.as_view_mut()
            .into_view(from_row, from_column, num_rows, num_columns)
    }

    /// View of `num_columns` consecutive columns across all rows.
    pub fn view_middle_columns(&self, start_column: usize, num_columns: usize) -> MatView<'_> {
        self.view(0, start_column, self.rows, num_columns)
    }

    pub fn view_middle_columns_mut(
        &mut self,
        start_column: usize,
        num_columns: usize,
    ) -> MatViewMut<'_> {
        let rows = self.rows;
        self.view_mut(0, start_column, rows, num_columns)
    }

    /// View of the first `num_rows` rows.
    pub fn view_top_rows(&self, num_rows: usize) -> MatView<'_> {
        self.view(0, 0, num_rows, self.columns)
    }
}

/// A non-owning read-only window into a [`Matrix`].
#[derive(Debug, Clone, Copy)]
pub struct MatView<'a> {
    /// Starts at the view origin; rows are `stride` values apart.
    data: &'a [f32],
    rows: usize,
    columns: usize,
    stride: usize,
}

impl<'a> MatView<'a> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> f32 {
        debug_assert!(row < self.rows && column < self.columns);
        self.data[row * self.stride + column]
    }

    pub fn row(&self, row: usize) -> &'a [f32] {
        debug_assert!(row < self.rows);
        let data: &'a [f32] = self.data;
        let from = row * self.stride;
        &data[from..from + self.columns]
    }

    pub fn view(
        &self,
        from_row: usize,
        from_column: usize,
        num_rows: usize,
        num_columns: usize,
    ) -> MatView<'a> {
        debug_assert!(from_row + num_rows <= self.rows);
        debug_assert!(from_column + num_columns <= self.columns);
        let data: &'a [f32] = self.data;
        MatView {
            data: &data[from_row * self.stride + from_column..],
            rows: num_rows,
            columns: num_columns,
            stride: self.stride,
        }
    }

    pub fn view_middle_columns(&self, start_column: usize, num_columns: usize) -> MatView<'a> {
        self.view(0, start_column, self.rows, num_columns)
    }

    pub fn view_top_rows(&self, num_rows: usize) -> MatView<'a> {
        self.view(0, 0, num_rows, self.columns)
    }
}

/// A non-owning mutable window into a [`Matrix`].
#[derive(Debug)]
pub struct MatViewMut<'a> {
    data: &'a mut [f32],
    rows: usize,
    columns: usize,
    stride: usize,
}

impl<'a> MatViewMut<'a> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> f32 {
        debug_assert!(row < self.rows && column < self.columns);
        self.data[row * self.stride + column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f32) {
        debug_assert!(row < self.rows && column < self.columns);
        self.data[row * self.stride + column] = value;
    }

    pub fn row(&self, row: usize) -> &[f32] {
        debug_assert!(row < self.rows);
        let from = row * self.stride;
        &self.data[from..from + self.columns]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        debug_assert!(row < self.rows);
        let from = row * self.stride;
        &mut self.data[from..from + self.columns]
    }

    /// Reborrows as a read-only view.
    pub fn as_view(&self) -> MatView<'_> {
        MatView {
            data: &*self.data,
            rows: self.rows,
            columns: self.columns,
            stride: self.stride,
        }
    }

    /// Consumes the borrow, producing a sub-view with the original lifetime.
    pub fn into_view(
        self,
        from_row: usize,
        from_column: usize,
        num_rows: usize,
        num_columns: usize,
    ) -> MatViewMut<'a> {
        debug_assert!(from_row + num_rows <= self.rows);
        debug_assert!(from_column + num_columns <= self.columns);
        let offset = from_row * self.stride + from_column;
        let stride = self.stride;
        let data: &'a mut [f32] = self.data;
        MatViewMut {
            data: &mut data[offset..],
            rows: num_rows,
            columns: num_columns,
            stride,
        }
    }

    /// Reborrowing variant of [`MatViewMut::into_view`].
    pub fn view_mut(
        &mut self,
        from_row: usize,
        from_column: usize,
        num_rows: usize,
        num_columns: usize,
    ) -> MatViewMut<'_> {
        debug_assert!(from_row + num_rows <= self.rows);
        debug_assert!(from_column + num_columns <= self.columns);
        MatViewMut {
            data: &mut self.data[from_row * self.stride + from_column..],
            rows: num_rows,
            columns: num_columns,
            stride: self.stride,
        }
    }

    pub fn view_middle_columns_mut(
        &mut self,
        start_column: usize,
        num_columns: usize,
    ) -> MatViewMut<'_> {
        let rows = self.rows;
        self.view_mut(0, start_column, rows, num_columns)
    }

    pub fn tanh_in_place(&mut self) {
        for row in 0..self.rows {
            for value in self.row_mut(row) {
                *value = value.tanh();
            }
        }
    }

    pub fn sigmoid_in_place(&mut self) {
        for row in 0..self.rows {
            for value in self.row_mut(row) {
                *value = 1.0 / (1.0 + (-*value).exp());
            }
        }
    }

    pub fn set_zero(&mut self) {
        for row in 0..self.rows {
            self.row_mut(row).fill(0.0);
        }
    }

    /// Copies `num_columns` columns starting at `src_column` over the
    /// columns starting at `dst_column`, row by row. The ranges may
    /// overlap.
    pub fn copy_columns_within(
        &mut self,
        src_column: usize,
        dst_column: usize,
        num_columns: usize,
    ) {
        debug_assert!(src_column + num_columns <= self.columns);
        debug_assert!(dst_column + num_columns <= self.columns);
        for row in 0..self.rows {
            self.row_mut(row)
                .copy_within(src_column..src_column + num_columns, dst_column);
        }
    }
}

/// A column vector: a [`Matrix`] with a single column and index addressing.
#[derive(Debug, Clone, Default)]
pub struct Vector {
    matrix: Matrix,
}

impl Vector {
    pub fn new(size: usize) -> Self {
        Self {
            matrix: Matrix::new(size, 1),
        }
    }

    pub fn from_slice(values: &[f32]) -> Self {
        let mut v = Self::new(values.len());
        v.matrix.data.copy_from_slice(values);
        v
    }

    pub fn size(&self) -> usize {
        self.matrix.rows
    }

    pub fn get(&self, index: usize) -> f32 {
        self.matrix.get(index, 0)
    }

    pub fn set(&mut self, index: usize, value: f32) {
        self.matrix.set(index, 0, value);
    }

    pub fn as_view(&self) -> MatView<'_> {
        self.matrix.as_view()
    }
}
