//! A single residual block of the dilated stack.

use crate::activations::Activation;
use crate::conv1d::{Conv1d, Conv1dConfig};
use crate::conv1x1::{Conv1x1, Conv1x1Config};
use crate::error::{Error, Result};
use crate::mat::{self, Matrix};
use crate::weights::{WeightReader, WeightWriter};

#[derive(Debug, Clone)]
pub struct LayerConfig {
    pub condition_size: usize,
    pub channels: usize,
    pub kernel_size: usize,
    pub dilation: usize,
    pub activation: String,
    pub gated: bool,
}

/// front dilated conv → conditioning mix-in → activation → head tap →
/// 1×1 post conv → residual input skip.
#[derive(Debug)]
pub struct Layer {
    front_conv: Conv1d,
    input_mixin: Conv1x1,
    post_conv: Conv1x1,
    activation: Activation,
    /// Front-conv output for the current buffer, `(channels, num_frames)`.
    state: Matrix,
    tmp_state: Matrix,
}

impl Layer {
    pub fn new(config: &LayerConfig) -> Result<Self> {
        if config.gated {
            return Err(Error::Config("gated not supported".into()));
        }

        let out_channels = config.channels;
        Ok(Self {
            front_conv: Conv1d::new(&Conv1dConfig {
                in_channels: config.channels,
                out_channels,
                kernel_size: config.kernel_size,
                bias: true,
                dilation: config.dilation,
            }),
            input_mixin: Conv1x1::new(&Conv1x1Config {
                in_channels: config.condition_size,
                out_channels,
                bias: false,
            }),
            post_conv: Conv1x1::new(&Conv1x1Config {
                in_channels: config.channels,
                out_channels: config.channels,
                bias: true,
            }),
            activation: Activation::from_name(&config.activation)?,
            state: Matrix::default(),
            tmp_state: Matrix::default(),
        })
    }

    pub fn channels(&self) -> usize {
        self.front_conv.in_channels()
    }

    pub fn dilation(&self) -> usize {
        self.front_conv.dilation()
    }

    pub fn kernel_size(&self) -> usize {
        self.front_conv.kernel_size()
    }

    /// Reshapes scratch for a new buffer length; no-op when unchanged.
    pub fn set_num_frames(&mut self, num_frames: usize) {
        let conv_out_channels = self.front_conv.out_channels();
        if self.state.rows() == conv_out_channels && self.state.columns() == num_frames {
            return;
        }
        self.state.resize(conv_out_channels, num_frames);
        self.state.set_zero();
        self.tmp_state.resize(conv_out_channels, num_frames);
    }

    pub fn set_params(&mut self, params: &mut WeightReader<'_>) -> Result<()> {
        self.front_conv.set_params(params)?;
        self.input_mixin.set_params(params)?;
        self.post_conv.set_params(params)
    }

    pub fn dump_params(&self, out: &mut WeightWriter) {
        self.front_conv.dump_params(out);
        self.input_mixin.dump_params(out);
        self.post_conv.dump_params(out);
    }

    /// Runs the block over `condition.columns()` columns.
    ///
    /// `input` and `output` are arena matrices; `input_start` and
    /// `output_start` locate the current write window inside them.
    pub fn process(
        &mut self,
        input: &Matrix,
        condition: &Matrix,
        head_input: &mut Matrix,
        output: &mut Matrix,
        input_start: usize,
        output_start: usize,
    ) {
        let num_columns = condition.columns();
        let channels = self.channels();

        self.front_conv.process(
            input.as_view(),
            &mut self.state.as_view_mut(),
            input_start,
            num_columns,
            0,
        );

        self.input_mixin
            .process(condition.as_view(), &mut self.tmp_state.as_view_mut());
        mat::add_in_place(&mut self.state.as_view_mut(), self.tmp_state.as_view());

        self.activation.apply(&mut self.state.as_view_mut());

        let top_state = self.state.view_top_rows(channels);
        mat::add_in_place(&mut head_input.as_view_mut(), top_state);

        let mut output_view = output.view_middle_columns_mut(output_start, num_columns);
        self.post_conv.process(top_state, &mut output_view);
        mat::add_in_place(
            &mut output_view,
            input.view_middle_columns(input_start, num_columns),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LayerConfig {
        LayerConfig {
            condition_size: 1,
            channels: 2,
            kernel_size: 2,
            dilation: 1,
            activation: "Tanh".into(),
            gated: false,
        }
    }

    #[test]
    fn gated_construction_fails() {
        let config = LayerConfig {
            gated: true,
            ..test_config()
        };
        let err = Layer::new(&config).unwrap_err();
        assert_eq!(err.to_string(), "gated not supported");
    }

    #[test]
    fn unknown_activation_fails() {
        let config = LayerConfig {
            activation: "Swish".into(),
            ..test_config()
        };
        assert!(matches!(Layer::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn scratch_reshapes_only_on_frame_count_change() {
        let mut layer = Layer::new(&test_config()).unwrap();
        layer.set_num_frames(16);
        assert_eq!(layer.state.rows(), 2);
        assert_eq!(layer.state.columns(), 16);

        layer.state.set(0, 0, 42.0);
        layer.set_num_frames(16);
        assert_eq!(layer.state.get(0, 0), 42.0);

        layer.set_num_frames(8);
        assert_eq!(layer.state.columns(), 8);
        assert_eq!(layer.state.get(0, 0), 0.0);
    }

    #[test]
    fn residual_skip_and_head_tap() {
        // All-zero weights: the front conv and mix-in produce zero, tanh(0)
        // = 0, the post conv adds only its (zero) bias, so the output is
        // exactly the input window and the head tap adds nothing.
        let mut layer = Layer::new(&test_config()).unwrap();
        let zeros = vec![0.0; 2 * 2 * 2 + 2 + 2 * 1 + 2 * 2 + 2];
        layer
            .set_params(&mut WeightReader::new(&zeros))
            .unwrap();
        layer.set_num_frames(3);

        let input = Matrix::from_rows(&[
            &[9.0, 0.1, 0.2, 0.3],
            &[9.0, 1.1, 1.2, 1.3],
        ]);
        let condition = Matrix::from_rows(&[&[0.5, 0.5, 0.5]]);
        let mut head_input = Matrix::new(2, 3);
        let mut output = Matrix::new(2, 4);

        layer.process(&input, &condition, &mut head_input, &mut output, 1, 1);

        for j in 0..3 {
            assert_eq!(output.get(0, j + 1), input.get(0, j + 1));
            assert_eq!(output.get(1, j + 1), input.get(1, j + 1));
            assert_eq!(head_input.get(0, j), 0.0);
            assert_eq!(head_input.get(1, j), 0.0);
        }
        // Columns outside the write window stay untouched.
        assert_eq!(output.get(0, 0), 0.0);
    }
}
