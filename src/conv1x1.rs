//! 1×1 convolution: a channel rechanneling with no temporal context.

use crate::error::Result;
use crate::mat::{self, MatView, MatViewMut, Matrix, Vector};
use crate::weights::{WeightReader, WeightWriter};

#[derive(Debug, Clone)]
pub struct Conv1x1Config {
    pub in_channels: usize,
    pub out_channels: usize,
    pub bias: bool,
}

#[derive(Debug)]
pub struct Conv1x1 {
    weight: Matrix,
    bias: Option<Vector>,
}

impl Conv1x1 {
    pub fn new(config: &Conv1x1Config) -> Self {
        Self {
            weight: Matrix::new(config.out_channels, config.in_channels),
            bias: config.bias.then(|| Vector::new(config.out_channels)),
        }
    }

    pub fn out_channels(&self) -> usize {
        self.weight.rows()
    }

    /// Fills parameters from the stream: weights row-major (out, in),
    /// then the bias values.
    pub fn set_params(&mut self, params: &mut WeightReader<'_>) -> Result<()> {
        for i in 0..self.weight.rows() {
            for j in 0..self.weight.columns() {
                self.weight.set(i, j, params.next_value()?);
            }
        }
        if let Some(bias) = &mut self.bias {
            for i in 0..bias.size() {
                bias.set(i, params.next_value()?);
            }
        }
        Ok(())
    }

    /// Re-emits parameters in [`Conv1x1::set_params`] order.
    pub fn dump_params(&self, out: &mut WeightWriter) {
        for i in 0..self.weight.rows() {
            for j in 0..self.weight.columns() {
                out.push(self.weight.get(i, j));
            }
        }
        if let Some(bias) = &self.bias {
            for i in 0..bias.size() {
                out.push(bias.get(i));
            }
        }
    }

    /// `output := W * input`, plus the bias broadcast over columns.
    pub fn process(&self, input: MatView<'_>, output: &mut MatViewMut<'_>) {
        mat::product(self.weight.as_view(), input, output);
        if let Some(bias) = &self.bias {
            mat::add_in_place_column_wise(output, bias.as_view());
        }
    }
}
