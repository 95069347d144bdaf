//! Real-time WaveNet inference engine for neural guitar amp modeling.
//!
//! Runs `.nam` model-data files (dilated causal convolution stacks, as
//! produced by Neural Amp Modeler training) over streaming mono audio.
//! The engine is built for the audio callback: after a model is loaded
//! and warmed up, each [`Model::process`] call runs allocation-free over
//! ring-buffered activations, preserving the causal receptive field
//! across buffer boundaries without re-running history.
//!
//! ```no_run
//! # fn main() -> wavern::Result<()> {
//! let mut model = wavern::Model::load("amp.nam")?;
//! let input = vec![0.0f32; 256];
//! let mut output = vec![0.0f32; 256];
//! // once per audio callback:
//! model.process(&input, &mut output);
//! model.finalize(input.len());
//! # Ok(())
//! # }
//! ```

pub mod activations;
pub mod conv1d;
pub mod conv1x1;
mod error;
pub mod mat;
#[cfg(feature = "tools")]
pub mod processing;
#[cfg(feature = "tools")]
pub mod wave;
pub mod wavenet;
pub mod weights;

pub use crate::error::{Error, Result};
pub use crate::wavenet::{Config, LayerArrayConfig, Model, ModelData};

/// The only sample rate the engine's models are trained at.
pub const SAMPLE_RATE: u32 = 48_000;
