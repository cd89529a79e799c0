/// One contiguous sub-range of a waveform, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Position of this chunk in the original waveform order.
    pub index: usize,
    /// First sample covered by the chunk.
    pub start: usize,
    /// Number of samples covered.
    pub len: usize,
}

impl ChunkSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Partition `total_samples` into spans of `chunk_samples` each.
///
/// The last span carries the remainder and may be shorter than the rest,
/// never longer, never empty. Spans are contiguous, non-overlapping and
/// ordered by start offset; together they cover the input exactly.
pub fn chunk_spans(total_samples: usize, chunk_samples: usize) -> Vec<ChunkSpan> {
    if total_samples == 0 || chunk_samples == 0 {
        return Vec::new();
    }

    let count = total_samples.div_ceil(chunk_samples);
    (0..count)
        .map(|index| {
            let start = index * chunk_samples;
            ChunkSpan {
                index,
                start,
                len: chunk_samples.min(total_samples - start),
            }
        })
        .collect()
}
