//! Shared helpers for integration tests.
#![allow(dead_code)]

use wavern::{Config, LayerArrayConfig, ModelData};

/// Deterministic pseudo-random signal in [-1, 1].
pub fn generate_signal(len: usize, seed: u32) -> Vec<f32> {
    let mut v = Vec::with_capacity(len);
    let mut state = seed;
    for _ in 0..len {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        v.push((state as i32 >> 16) as f32 / 32768.0);
    }
    v
}

/// Deterministic buffer-length schedule in `[1, max_len]` summing to
/// exactly `total`.
pub fn chunk_schedule(total: usize, max_len: usize, seed: u32) -> Vec<usize> {
    let mut chunks = Vec::new();
    let mut state = seed;
    let mut remaining = total;
    while remaining > 0 {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        let len = (1 + (state >> 16) as usize % max_len).min(remaining);
        chunks.push(len);
        remaining -= len;
    }
    chunks
}

pub fn layer_array_config(
    input_size: usize,
    head_size: usize,
    channels: usize,
    head_bias: bool,
) -> LayerArrayConfig {
    LayerArrayConfig {
        input_size,
        condition_size: 1,
        head_size,
        channels,
        kernel_size: 3,
        dilations: vec![1, 2, 4],
        activation: "Tanh".into(),
        gated: false,
        head_bias,
    }
}

/// A small two-stack model in the standard `.nam` WaveNet shape.
pub fn test_config(channels: usize) -> Config {
    Config {
        head_scale: 0.02,
        head: None,
        layers: vec![
            layer_array_config(1, channels, channels, false),
            layer_array_config(channels, 1, channels, true),
        ],
    }
}

/// Number of weights the engine consumes for `config`, head scale
/// included, following the on-disk stream order.
pub fn weight_count(config: &Config) -> usize {
    let mut count = 0;
    for array in &config.layers {
        count += array.channels * array.input_size;
        for _ in &array.dilations {
            // front conv (with bias), input mix-in, post conv (with bias)
            count += array.kernel_size * array.channels * array.channels + array.channels;
            count += array.channels * array.condition_size;
            count += array.channels * array.channels + array.channels;
        }
        count += array.head_size * array.channels;
        if array.head_bias {
            count += array.head_size;
        }
    }
    count + 1
}

/// Deterministic weights, small enough to keep activations unsaturated.
pub fn test_weights(count: usize, seed: u32) -> Vec<f32> {
    generate_signal(count, seed)
        .into_iter()
        .map(|v| v * 0.25)
        .collect()
}

pub fn test_model_data(channels: usize, seed: u32) -> ModelData {
    let config = test_config(channels);
    let weights = test_weights(weight_count(&config), seed);
    ModelData {
        version: "0.5.4".into(),
        architecture: "WaveNet".into(),
        config,
        weights,
    }
}
