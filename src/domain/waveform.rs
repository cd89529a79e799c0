use super::chunk::ChunkSpan;

/// Sample rate every decoded waveform is normalized to (Whisper's input rate).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decoded mono audio at a known sample rate.
///
/// Produced once by the audio loader and treated as immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples covered by a span obtained from `chunk_spans(self.len(), ..)`.
    pub fn span_samples(&self, span: &ChunkSpan) -> &[f32] {
        &self.samples[span.start..span.end()]
    }
}
