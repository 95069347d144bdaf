//! The streaming WaveNet model.
//!
//! A model is a chain of [`LayerArray`] stacks: stack *i*'s layer output
//! feeds stack *i+1*'s input, while every stack reads the same
//! conditioning row (the raw input samples) and passes an accumulated
//! "head" signal down the chain. The final head row, scaled by
//! `head_scale`, is the output stream.
//!
//! Hosts drive the model one buffer at a time: [`Model::process`]
//! computes `input.len()` output samples, [`Model::finalize`] then
//! advances the ring cursors by the same count. Steady-state processing
//! performs no allocation; per-buffer scratch is reshaped only when the
//! buffer length changes between calls.

mod layer;
mod layer_array;
mod model_data;

pub use layer_array::{LayerArray, LayerArrayConfig};
pub use model_data::ModelData;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mat::Matrix;
use crate::weights::{WeightReader, WeightWriter};

/// Model configuration, as it appears in the model-data document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub head_scale: f32,
    /// Reserved for a custom head module; must be null or absent.
    #[serde(default)]
    pub head: Option<serde_json::Value>,
    pub layers: Vec<LayerArrayConfig>,
}

pub struct Model {
    num_frames: usize,
    layer_arrays: Vec<LayerArray>,
    layer_array_outputs: Vec<Matrix>,
    condition: Matrix,
    head_arrays: Vec<Matrix>,
    head_scale: f32,
    head_output: Matrix,
}

impl Model {
    /// Builds a model from a configuration and a weight stream, then
    /// warms up the ring buffers so the first real buffer sees a fully
    /// primed receptive field.
    pub fn new(config: &Config, params: &mut WeightReader<'_>) -> Result<Self> {
        if let Some(head) = &config.head {
            if !head.is_null() {
                return Err(Error::NotImplemented("custom head"));
            }
        }
        if config.layers.len() < 2 {
            return Err(Error::Config(format!(
                "expected at least two layer arrays, actual {}",
                config.layers.len()
            )));
        }

        let mut layer_arrays = Vec::with_capacity(config.layers.len());
        let mut layer_array_outputs = Vec::with_capacity(config.layers.len());
        let mut head_arrays = Vec::with_capacity(config.layers.len() + 1);
        head_arrays.push(Matrix::new(config.layers[0].channels, 0));

        for (i, array_config) in config.layers.iter().enumerate() {
            if i > 0 && array_config.channels != config.layers[i - 1].head_size {
                return Err(Error::Config(format!(
                    "channels of layer array {} ({}) don't match head size of previous array ({})",
                    i,
                    array_config.channels,
                    config.layers[i - 1].head_size
                )));
            }
            layer_arrays.push(LayerArray::new(array_config)?);
            layer_array_outputs.push(Matrix::new(array_config.channels, 0));
            head_arrays.push(Matrix::new(array_config.head_size, 0));
        }

        let mut model = Self {
            num_frames: 0,
            layer_arrays,
            layer_array_outputs,
            condition: Matrix::default(),
            head_arrays,
            head_scale: config.head_scale,
            head_output: Matrix::new(1, 0),
        };
        model.set_params(params)?;

        tracing::debug!(
            layer_arrays = model.layer_arrays.len(),
            receptive_field = model.receptive_field(),
            "model constructed, warming up"
        );
        model.warm_up();
        Ok(model)
    }

    fn set_params(&mut self, params: &mut WeightReader<'_>) -> Result<()> {
        for layer_array in &mut self.layer_arrays {
            layer_array.set_params(params)?;
        }
        self.head_scale = params.next_value()?;
        if params.has_next() {
            return Err(Error::WeightOverflow {
                remaining: params.remaining(),
            });
        }
        Ok(())
    }

    /// Re-emits the full weight stream, trailing `head_scale` included,
    /// in the on-disk order consumed by [`Model::new`].
    pub fn dump_weights(&self) -> Vec<f32> {
        let mut out = WeightWriter::new();
        for layer_array in &self.layer_arrays {
            layer_array.dump_params(&mut out);
        }
        out.push(self.head_scale);
        out.into_values()
    }

    /// One-indexed receptive field of the whole chain.
    pub fn receptive_field(&self) -> usize {
        1 + self
            .layer_arrays
            .iter()
            .map(LayerArray::receptive_field)
            .sum::<usize>()
    }

    fn warm_up(&mut self) {
        let receptive_field = self.receptive_field();
        let mut output = [0.0f32];
        for _ in 0..receptive_field {
            self.process(&[0.0], &mut output);
            self.finalize(1);
        }
    }

    /// Computes one buffer of output samples from one buffer of input
    /// samples. Both slices must have the same length, and that length
    /// plus the receptive field must fit the ring arenas (< 65536).
    ///
    /// Must be followed by [`Model::finalize`] with the same length
    /// before the next call.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        assert_eq!(
            input.len(),
            output.len(),
            "input and output buffers must have the same length"
        );
        let num_frames = input.len();
        self.set_num_frames(num_frames);
        self.prepare_for_frames(num_frames);

        for (j, &value) in input.iter().enumerate() {
            self.condition.set(0, j, value);
        }

        self.head_arrays[0].set_zero();

        // The first stack reads the conditioning row as its input too.
        {
            let (head_inputs, head_outputs) = self.head_arrays.split_at_mut(1);
            self.layer_arrays[0].process(
                &self.condition,
                &self.condition,
                &mut head_inputs[0],
                &mut self.layer_array_outputs[0],
                &mut head_outputs[0],
            );
        }
        for i in 1..self.layer_arrays.len() {
            let (head_inputs, head_outputs) = self.head_arrays.split_at_mut(i + 1);
            let (layer_inputs, layer_outputs) = self.layer_array_outputs.split_at_mut(i);
            self.layer_arrays[i].process(
                &layer_inputs[i - 1],
                &self.condition,
                &mut head_inputs[i],
                &mut layer_outputs[0],
                &mut head_outputs[0],
            );
        }

        let final_head_array = &self.head_arrays[self.head_arrays.len() - 1];
        for (j, out) in output.iter_mut().enumerate() {
            *out = self.head_scale * final_head_array.get(0, j);
        }
    }

    /// Advances the ring cursors past the buffer just processed.
    pub fn finalize(&mut self, num_frames: usize) {
        for layer_array in &mut self.layer_arrays {
            layer_array.advance_buffers(num_frames);
        }
    }

    fn prepare_for_frames(&mut self, num_frames: usize) {
        for layer_array in &mut self.layer_arrays {
            layer_array.prepare_for_frames(num_frames);
        }
    }

    fn set_num_frames(&mut self, num_frames: usize) {
        if num_frames == self.num_frames {
            return;
        }

        self.condition.resize(1, num_frames);
        for head_array in &mut self.head_arrays {
            let rows = head_array.rows();
            head_array.resize(rows, num_frames);
        }
        for layer_array_output in &mut self.layer_array_outputs {
            let rows = layer_array_output.rows();
            layer_array_output.resize(rows, num_frames);
        }

        let rows = self.head_output.rows();
        self.head_output.resize(rows, num_frames);
        self.head_output.set_zero();

        for layer_array in &mut self.layer_arrays {
            layer_array.set_num_frames(num_frames);
        }
        self.num_frames = num_frames;
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("layer_arrays", &self.layer_arrays.len())
            .field("receptive_field", &self.receptive_field())
            .field("head_scale", &self.head_scale)
            .field("num_frames", &self.num_frames)
            .finish()
    }
}
