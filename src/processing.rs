//! Offline WAV-to-WAV processing.

use std::path::Path;

use crate::error::Result;
use crate::wave;
use crate::wavenet::Model;

/// Buffer length for offline processing; well inside the ring arena for
/// any realistic receptive field.
const CHUNK_SIZE: usize = 4096;

/// Loads a model and runs a WAV file through it, buffer by buffer, the
/// same way a live host would.
pub fn process_wav_file(
    model_path: impl AsRef<Path>,
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let mut model = Model::load(model_path)?;

    let input = wave::read_wav(input_path)?;
    let mut output = vec![0.0f32; input.len()];

    tracing::info!(samples = input.len(), "processing");
    for (input_chunk, output_chunk) in input.chunks(CHUNK_SIZE).zip(output.chunks_mut(CHUNK_SIZE)) {
        model.process(input_chunk, output_chunk);
        model.finalize(input_chunk.len());
    }

    wave::write_wav(&output, output_path)
}
