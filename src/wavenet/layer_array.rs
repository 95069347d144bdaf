//! A ring-buffered stack of dilated layers.
//!
//! Each layer inside the array owns one wide arena matrix of shape
//! `(channels, 65536 + R)`, where `R` is the stack's receptive field. The
//! left margin of `R` columns always holds enough history for every
//! dilated conv to read causally; `buffer_start` is the single cursor
//! marking the current write window across all arenas.

use serde::{Deserialize, Serialize};

use crate::conv1x1::{Conv1x1, Conv1x1Config};
use crate::error::{Error, Result};
use crate::mat::Matrix;
use crate::weights::{WeightReader, WeightWriter};

use super::layer::{Layer, LayerConfig};

/// Arena width beyond the receptive-field margin. Bounds the number of
/// frames a single `process` call may cover.
pub(crate) const LAYER_ARRAY_BUFFER_SIZE: usize = 65536;

/// Per-stack configuration, as it appears in the model-data document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayerArrayConfig {
    pub input_size: usize,
    pub condition_size: usize,
    pub head_size: usize,
    pub channels: usize,
    pub kernel_size: usize,
    pub dilations: Vec<usize>,
    pub activation: String,
    pub gated: bool,
    pub head_bias: bool,
}

#[derive(Debug)]
pub struct LayerArray {
    buffer_start: usize,
    rechannel: Conv1x1,
    layer_buffers: Vec<Matrix>,
    layers: Vec<Layer>,
    head_rechannel: Conv1x1,
}

impl LayerArray {
    pub fn new(config: &LayerArrayConfig) -> Result<Self> {
        if config.dilations.is_empty() {
            return Err(Error::Config("layer array has no dilations".into()));
        }

        let layers = config
            .dilations
            .iter()
            .map(|&dilation| {
                Layer::new(&LayerConfig {
                    condition_size: config.condition_size,
                    channels: config.channels,
                    kernel_size: config.kernel_size,
                    dilation,
                    activation: config.activation.clone(),
                    gated: config.gated,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut array = Self {
            buffer_start: 0,
            rechannel: Conv1x1::new(&Conv1x1Config {
                in_channels: config.input_size,
                out_channels: config.channels,
                bias: false,
            }),
            layer_buffers: Vec::new(),
            layers,
            head_rechannel: Conv1x1::new(&Conv1x1Config {
                in_channels: config.channels,
                out_channels: config.head_size,
                bias: config.head_bias,
            }),
        };

        let receptive_field = array.receptive_field();
        let layer_columns = LAYER_ARRAY_BUFFER_SIZE + receptive_field;
        array.layer_buffers = (0..config.dilations.len())
            .map(|_| Matrix::new(config.channels, layer_columns))
            .collect();
        array.buffer_start = receptive_field;

        Ok(array)
    }

    /// Zero-indexed receptive field: history columns needed to the left of
    /// the write cursor for a causal response.
    pub fn receptive_field(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| (layer.kernel_size() - 1) * layer.dilation())
            .sum()
    }

    fn buffer_size(&self) -> usize {
        self.layer_buffers.first().map_or(0, Matrix::columns)
    }

    /// Rewinds the ring if the next `num_frames` columns would run off the
    /// end of the arenas.
    pub fn prepare_for_frames(&mut self, num_frames: usize) {
        if self.buffer_start + num_frames > self.buffer_size() {
            self.rewind_buffers();
        }
    }

    /// Moves the write cursor past the frames just processed.
    pub fn advance_buffers(&mut self, num_frames: usize) {
        self.buffer_start += num_frames;
    }

    fn rewind_buffers(&mut self) {
        let start = self.receptive_field();
        for (layer, buffer) in self.layers.iter().zip(&mut self.layer_buffers) {
            // Only the last (K-1)*d columns can still be read by this
            // layer's dilated conv; copy them back to the left margin.
            let history = (layer.kernel_size() - 1) * layer.dilation();
            buffer.as_view_mut().copy_columns_within(
                self.buffer_start - history,
                start - history,
                history,
            );
        }
        self.buffer_start = start;
    }

    pub fn set_params(&mut self, params: &mut WeightReader<'_>) -> Result<()> {
        self.rechannel.set_params(params)?;
        for layer in &mut self.layers {
            layer.set_params(params)?;
        }
        self.head_rechannel.set_params(params)
    }

    pub fn dump_params(&self, out: &mut WeightWriter) {
        self.rechannel.dump_params(out);
        for layer in &self.layers {
            layer.dump_params(out);
        }
        self.head_rechannel.dump_params(out);
    }

    /// Reshapes per-layer scratch for a new buffer length.
    ///
    /// Panics if `num_frames` cannot fit the arena alongside the
    /// receptive-field margin; per-buffer frame counts are a host
    /// contract, not runtime input.
    pub fn set_num_frames(&mut self, num_frames: usize) {
        assert!(
            num_frames + self.receptive_field() < LAYER_ARRAY_BUFFER_SIZE,
            "buffer of {num_frames} frames is too large for the layer arena"
        );
        for layer in &mut self.layers {
            layer.set_num_frames(num_frames);
        }
    }

    /// Runs the stack over one buffer. All arguments span
    /// `layer_inputs.columns()` columns; `layer_outputs` and
    /// `head_outputs` are written from column 0.
    pub fn process(
        &mut self,
        layer_inputs: &Matrix,
        condition: &Matrix,
        head_inputs: &mut Matrix,
        layer_outputs: &mut Matrix,
        head_outputs: &mut Matrix,
    ) {
        self.rechannel.process(
            layer_inputs.as_view(),
            &mut self.layer_buffers[0]
                .view_middle_columns_mut(self.buffer_start, layer_inputs.columns()),
        );

        let last = self.layers.len() - 1;
        for i in 0..last {
            let (inputs, outputs) = self.layer_buffers.split_at_mut(i + 1);
            self.layers[i].process(
                &inputs[i],
                condition,
                head_inputs,
                &mut outputs[0],
                self.buffer_start,
                self.buffer_start,
            );
        }
        self.layers[last].process(
            &self.layer_buffers[last],
            condition,
            head_inputs,
            layer_outputs,
            self.buffer_start,
            0,
        );

        self.head_rechannel
            .process(head_inputs.as_view(), &mut head_outputs.as_view_mut());
    }
}
