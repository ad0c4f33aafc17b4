//! Axis tick generation.

/// Round `raw` up to 1, 2 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Upper bound on the levels one axis can produce.
pub const MAX_LEVELS: usize = 100;

/// Multiples of `interval` inside `[min_value, max_value]`, at most
/// [`MAX_LEVELS`] of them.
///
/// Empty when the bounds or the interval are not finite, or when the range
/// holds more levels than the cap.
pub fn generate_levels(min_value: f64, max_value: f64, interval: f64) -> Vec<f64> {
    if interval <= 0.0
        || max_value < min_value
        || !interval.is_finite()
        || !min_value.is_finite()
        || !max_value.is_finite()
    {
        return vec![];
    }

    // Tolerance keeps an endpoint that lands on a level after rounding.
    let eps = interval * 1e-9;
    let start = ((min_value - eps) / interval).ceil();
    let end = ((max_value + eps) / interval).floor();
    if !start.is_finite() || !end.is_finite() || end - start >= MAX_LEVELS as f64 {
        return vec![];
    }

    let mut levels = Vec::new();
    let mut k = start;
    while k <= end && levels.len() < MAX_LEVELS {
        let level = k * interval;
        // Avoid printing -0.
        levels.push(if level == 0.0 { 0.0 } else { level });
        let next = k + 1.0;
        // Past 2^53 the counter no longer advances.
        if next == k {
            break;
        }
        k = next;
    }
    levels
}

/// Roughly `target` nicely spaced ticks covering `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> (Vec<f64>, f64) {
    let span = max - min;
    let step = nice_step(span / target.max(1) as f64);
    (generate_levels(min, max, step), step)
}

/// Like [`nice_ticks`] but never finer than whole numbers, for index axes.
pub fn integer_ticks(min: f64, max: f64, target: usize) -> (Vec<f64>, f64) {
    let span = max - min;
    let step = nice_step(span / target.max(1) as f64).max(1.0);
    (generate_levels(min, max, step), step)
}

/// Format a tick value with just enough decimals for `step`.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 || step <= 0.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    let text = format!("{:.*}", decimals, value);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}
