//! Streaming correctness: the engine must produce the same output stream
//! regardless of how the input is sliced into buffers, across ring-buffer
//! rewinds, and after a weight dump/reload round trip.

mod test_common;

use test_common::{chunk_schedule, generate_signal, test_model_data};
use wavern::Model;

fn process_in_chunks(model: &mut Model, input: &[f32], chunks: &[usize]) -> Vec<f32> {
    let mut output = vec![0.0f32; input.len()];
    let mut offset = 0;
    for &len in chunks {
        model.process(&input[offset..offset + len], &mut output[offset..offset + len]);
        model.finalize(len);
        offset += len;
    }
    assert_eq!(offset, input.len());
    output
}

fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

#[test]
fn chunked_processing_matches_single_shot() {
    let data = test_model_data(4, 7);
    let signal = generate_signal(20_000, 99);

    let mut single = Model::from_model_data(&data).unwrap();
    let receptive_field = single.receptive_field();
    let mut single_output = vec![0.0f32; signal.len()];
    single.process(&signal, &mut single_output);
    single.finalize(signal.len());

    let mut chunked = Model::from_model_data(&data).unwrap();
    let chunks = chunk_schedule(signal.len(), 4096, 1234);
    assert!(chunks.len() > 4, "schedule should actually slice the signal");
    let chunked_output = process_in_chunks(&mut chunked, &signal, &chunks);

    let diff = max_abs_diff(
        &single_output[receptive_field..],
        &chunked_output[receptive_field..],
    );
    assert!(diff <= 1e-4, "max deviation {diff}");
}

#[test]
fn output_is_stable_across_ring_rewinds() {
    let data = test_model_data(2, 21);
    // Long enough to force several rewinds of the 65536-column arenas,
    // at different cursor positions for the two schedules.
    let signal = generate_signal(200_000, 5);

    let mut a = Model::from_model_data(&data).unwrap();
    let output_a = process_in_chunks(&mut a, &signal, &chunk_schedule(signal.len(), 4096, 42));

    let mut b = Model::from_model_data(&data).unwrap();
    let output_b = process_in_chunks(&mut b, &signal, &chunk_schedule(signal.len(), 2891, 43));

    let diff = max_abs_diff(&output_a, &output_b);
    assert!(diff <= 1e-4, "max deviation {diff}");
}

#[test]
fn alternating_buffer_lengths_reuse_scratch_correctly() {
    let data = test_model_data(2, 3);
    let signal = generate_signal(12_000, 17);

    let mut reference = Model::from_model_data(&data).unwrap();
    let reference_output =
        process_in_chunks(&mut reference, &signal, &vec![500; signal.len() / 500]);

    // Alternate between two frame counts so per-buffer scratch is
    // reshaped repeatedly mid-stream.
    let mut alternating = Model::from_model_data(&data).unwrap();
    let mut chunks = Vec::new();
    let mut remaining = signal.len();
    let mut flip = false;
    while remaining > 0 {
        let len = if flip { 750 } else { 250 }.min(remaining);
        chunks.push(len);
        remaining -= len;
        flip = !flip;
    }
    let alternating_output = process_in_chunks(&mut alternating, &signal, &chunks);

    let diff = max_abs_diff(&reference_output, &alternating_output);
    assert!(diff <= 1e-4, "max deviation {diff}");
}

#[test]
fn dumped_weights_rebuild_an_identical_model() {
    let data = test_model_data(4, 3);
    let mut original = Model::from_model_data(&data).unwrap();

    let dumped = original.dump_weights();
    assert_eq!(dumped, data.weights);

    let rebuilt_data = wavern::ModelData {
        weights: dumped,
        ..data.clone()
    };
    let mut rebuilt = Model::from_model_data(&rebuilt_data).unwrap();

    let signal = generate_signal(8_192, 3);
    let chunks = chunk_schedule(signal.len(), 1024, 8);
    let output_original = process_in_chunks(&mut original, &signal, &chunks);
    let output_rebuilt = process_in_chunks(&mut rebuilt, &signal, &chunks);

    // Same weights, same kernels, same slicing: bit-identical.
    for (a, b) in output_original.iter().zip(&output_rebuilt) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[cfg(feature = "tools")]
#[test]
fn offline_driver_matches_direct_processing() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.nam");
    let input_path = dir.path().join("input.wav");
    let output_path = dir.path().join("output.wav");

    let data = test_model_data(2, 11);
    std::fs::write(&model_path, serde_json::to_string(&data).unwrap()).unwrap();

    let signal = generate_signal(10_000, 77);
    wavern::wave::write_wav(&signal, &input_path).unwrap();

    wavern::processing::process_wav_file(&model_path, &input_path, &output_path).unwrap();
    let processed = wavern::wave::read_wav(&output_path).unwrap();
    assert_eq!(processed.len(), signal.len());

    // Reference run over the samples the WAV actually carries (24-bit
    // quantized), chunked the way the driver chunks.
    let quantized_input = wavern::wave::read_wav(&input_path).unwrap();
    let mut model = Model::from_model_data(&data).unwrap();
    let mut reference = vec![0.0f32; quantized_input.len()];
    for (input_chunk, output_chunk) in quantized_input
        .chunks(4096)
        .zip(reference.chunks_mut(4096))
    {
        model.process(input_chunk, output_chunk);
        model.finalize(input_chunk.len());
    }

    let diff = max_abs_diff(&processed, &reference);
    assert!(diff <= 2.0 / 8_388_608.0, "max deviation {diff}");
}
