//! Synthetic acquisition data with predictable values.

/// `len` consecutive values starting at `start`: `start, start + 1, ...`
///
/// ```
/// use test_utils::ramp;
///
/// assert_eq!(ramp(10.0, 3), vec![10.0, 11.0, 12.0]);
/// ```
pub fn ramp(start: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| start + i as f64).collect()
}

/// A `[rows, cols]` array in row-major order with `value(row, col)` per cell.
pub fn frames_with<F>(rows: usize, cols: usize, value: F) -> Vec<f64>
where
    F: Fn(usize, usize) -> f64,
{
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push(value(row, col));
        }
    }
    data
}

/// Cell value `row * 1000 + col`, so any slice can be checked by eye.
///
/// ```
/// use test_utils::indexed_frames;
///
/// let data = indexed_frames(2, 3);
/// assert_eq!(data, vec![0.0, 1.0, 2.0, 1000.0, 1001.0, 1002.0]);
/// ```
pub fn indexed_frames(rows: usize, cols: usize) -> Vec<f64> {
    frames_with(rows, cols, |row, col| (row * 1000 + col) as f64)
}

/// Temperature-like profile in °C: a gentle gradient with a warm spot in the
/// middle of the fibre. Each later frame is 0.5 °C warmer.
pub fn temperature_frames(rows: usize, cols: usize) -> Vec<f64> {
    let centre = cols as f64 / 2.0;
    let width = (cols as f64 / 10.0).max(1.0);
    frames_with(rows, cols, |row, col| {
        let x = col as f64;
        let hotspot = 8.0 * (-((x - centre) / width).powi(2)).exp();
        18.0 + 0.01 * x + hotspot + 0.5 * row as f64
    })
}

/// Strain-like profile in µε: a slow sinusoid around zero.
pub fn strain_frames(rows: usize, cols: usize) -> Vec<f64> {
    frames_with(rows, cols, |row, col| {
        let phase = col as f64 / cols.max(1) as f64 * std::f64::consts::TAU;
        120.0 * phase.sin() + 5.0 * row as f64
    })
}

/// Brillouin frequency profile in GHz around 10.85.
pub fn frequency_frames(rows: usize, cols: usize) -> Vec<f64> {
    frames_with(rows, cols, |row, col| {
        10.85 + 0.0001 * col as f64 + 0.001 * row as f64
    })
}

/// Brillouin gain amplitude, decaying along the fibre.
pub fn amplitude_frames(rows: usize, cols: usize) -> Vec<f64> {
    frames_with(rows, cols, |row, col| {
        1.0 / (1.0 + 0.002 * col as f64) - 0.01 * row as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_frames_layout() {
        let data = indexed_frames(3, 4);
        assert_eq!(data.len(), 12);
        assert_eq!(data[4], 1000.0);
        assert_eq!(data[11], 2003.0);
    }

    #[test]
    fn test_temperature_hotspot() {
        let data = temperature_frames(1, 100);
        let peak = data.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak > data[0] + 7.0);
    }

    #[test]
    fn test_profiles_have_expected_size() {
        assert_eq!(strain_frames(2, 50).len(), 100);
        assert_eq!(frequency_frames(3, 7).len(), 21);
        assert_eq!(amplitude_frames(0, 7).len(), 0);
    }
}
