mod chunk;
mod lesson;
mod waveform;

pub use chunk::{ChunkSpan, chunk_spans};
pub use lesson::LessonContext;
pub use waveform::{TARGET_SAMPLE_RATE, Waveform};
