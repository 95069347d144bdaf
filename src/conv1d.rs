//! Causal dilated 1-D convolution.
//!
//! The kernel is stored as `kernel_size` separate `(out, in)` matrices so
//! each tap is a plain matrix product against a column window of the
//! input. Tap `k` reads the input at offset `dilation * (k + 1 - K)`
//! relative to the output column: the last tap sits on the current
//! column and all others reach into the past, never the future.

use crate::error::Result;
use crate::mat::{self, MatView, MatViewMut, Matrix, Vector};
use crate::weights::{WeightReader, WeightWriter};

#[derive(Debug, Clone)]
pub struct Conv1dConfig {
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: usize,
    pub bias: bool,
    pub dilation: usize,
}

#[derive(Debug)]
pub struct Conv1d {
    /// One `(out_channels, in_channels)` matrix per kernel tap.
    weight: Vec<Matrix>,
    bias: Option<Vector>,
    dilation: usize,
}

impl Conv1d {
    pub fn new(config: &Conv1dConfig) -> Self {
        Self {
            weight: (0..config.kernel_size)
                .map(|_| Matrix::new(config.out_channels, config.in_channels))
                .collect(),
            bias: config.bias.then(|| Vector::new(config.out_channels)),
            dilation: config.dilation,
        }
    }

    /// Fills parameters from the stream.
    ///
    /// On-disk order interleaves the kernel taps per `(out, in)` pair:
    /// for each output channel, for each input channel, the K tap weights
    /// are consecutive. The bias values follow the weights.
    pub fn set_params(&mut self, params: &mut WeightReader<'_>) -> Result<()> {
        if let Some(first) = self.weight.first() {
            let out_channels = first.rows();
            let in_channels = first.columns();
            for i in 0..out_channels {
                for j in 0..in_channels {
                    for weight in &mut self.weight {
                        weight.set(i, j, params.next_value()?);
                    }
                }
            }
        }
        if let Some(bias) = &mut self.bias {
            for i in 0..bias.size() {
                bias.set(i, params.next_value()?);
            }
        }
        Ok(())
    }

    /// Re-emits parameters in [`Conv1d::set_params`] order.
    pub fn dump_params(&self, out: &mut WeightWriter) {
        if let Some(first) = self.weight.first() {
            for i in 0..first.rows() {
                for j in 0..first.columns() {
                    for weight in &self.weight {
                        out.push(weight.get(i, j));
                    }
                }
            }
        }
        if let Some(bias) = &self.bias {
            for i in 0..bias.size() {
                out.push(bias.get(i));
            }
        }
    }

    pub fn in_channels(&self) -> usize {
        self.weight.first().map_or(0, Matrix::columns)
    }

    pub fn out_channels(&self) -> usize {
        self.weight.first().map_or(0, Matrix::rows)
    }

    pub fn kernel_size(&self) -> usize {
        self.weight.len()
    }

    pub fn dilation(&self) -> usize {
        self.dilation
    }

    /// Computes `num_columns` output columns starting at `output_start`,
    /// reading input columns around `input_start`.
    ///
    /// The caller must guarantee `dilation * (kernel_size - 1)` valid
    /// columns before `input_start`; the ring buffers in the layer stack
    /// are sized for exactly this.
    pub fn process(
        &self,
        input: MatView<'_>,
        output: &mut MatViewMut<'_>,
        input_start: usize,
        num_columns: usize,
        output_start: usize,
    ) {
        let kernel_size = self.weight.len();
        let dilation = self.dilation;

        let back = dilation * (kernel_size - 1);
        mat::product(
            self.weight[0].as_view(),
            input.view_middle_columns(input_start - back, num_columns),
            &mut output.view_middle_columns_mut(output_start, num_columns),
        );

        for k in 1..kernel_size {
            let back = dilation * (kernel_size - 1 - k);
            mat::add_product(
                self.weight[k].as_view(),
                input.view_middle_columns(input_start - back, num_columns),
                &mut output.view_middle_columns_mut(output_start, num_columns),
            );
        }

        if let Some(bias) = &self.bias {
            mat::add_in_place_column_wise(
                &mut output.view_middle_columns_mut(output_start, num_columns),
                bias.as_view(),
            );
        }
    }
}
