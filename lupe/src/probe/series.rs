use crate::probe::ProbeError;


/// Splits delimited repeated-probe output into exactly `count` chunks.
/// Anything past `count` (typically a trailing partial read) is discarded;
/// fewer chunks than `count` means the series cannot be reconstructed.
pub fn split_samples(raw: &str, delimiter: &str, count: usize) -> Result<Vec<String>, ProbeError> {
    let chunks: Vec<String> = raw
        .split(delimiter)
        .take(count)
        .map(|chunk| chunk.to_string())
        .collect();

    if chunks.len() < count {
        return Err(ProbeError::parse(
            format!("expected {} samples, found {}", count, chunks.len()),
            raw,
        ));
    }

    return Ok(chunks);
}


/// Synthetic time axis: `[0, interval, 2*interval, ..., (count-1)*interval]`.
pub fn time_axis(interval_s: f64, count: usize) -> Vec<f64> {
    return (0..count).map(|index| interval_s * index as f64).collect();
}


/// Per-interval rates from cumulative counters via discrete difference.
/// The first and last samples are trimmed, yielding `len - 2` points that
/// pair with `time_axis()[1..len-1]`.
pub fn rate(samples: &[u64], interval_s: f64) -> Vec<f64> {
    if samples.len() < 3 {
        return Vec::new();
    }

    return (1..samples.len() - 1)
        .map(|index| (samples[index + 1] as f64 - samples[index] as f64) / interval_s)
        .collect();
}
