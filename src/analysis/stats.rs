//! Small numeric helpers shared by the aggregation modules.
//!
//! Every function returns `None` instead of `NaN` when the statistic is
//! undefined (no values, or zero variance for correlation).

/// Arithmetic mean; `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Pearson correlation coefficient of two equally long samples.
///
/// Undefined (`None`) when fewer than two pairs are given or when either
/// sample is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 || is_constant(&xs[..n]) || is_constant(&ys[..n]) {
        return None;
    }
    let mean_x = mean(xs[..n].iter().copied())?;
    let mean_y = mean(ys[..n].iter().copied())?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Compare exactly: a mean-based check would see rounding noise as variance.
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(&first) => values.iter().all(|&v| v == first),
        None => true,
    }
}

/// Quantile of an ascending slice with linear interpolation between ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_undefined() {
        assert_eq!(mean(Vec::new()), None);
        assert_eq!(mean([6.0, 7.0]), Some(6.5));
    }

    #[test]
    fn pearson_detects_perfect_relationships() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_is_undefined_for_constant_or_tiny_samples() {
        assert_eq!(pearson(&[6.1, 6.1, 6.1], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[], &[]), None);
    }

    #[test]
    fn pearson_ignores_unpaired_tail() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0, -100.0, 50.0];
        assert_eq!(pearson(&xs, &ys), pearson(&xs, &ys[..4]));
        assert!((pearson(&ys, &xs).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }
}
