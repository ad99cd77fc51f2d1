//! Column statistics shared by the scorers and the index composer.

/// Percentile rank of each present value, ascending, using the average-rank
/// convention: tied values share the mean of the 1-based positions they
/// occupy, divided by the number of present values. Missing or NaN inputs
/// get no rank.
pub fn percentile_rank(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut ranks = vec![None; values.len()];
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.filter(|v| !v.is_nan()).map(|v| (idx, v)))
        .collect();

    let count = present.len();
    if count == 0 {
        return ranks;
    }

    present.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut start = 0;
    while start < count {
        let mut end = start;
        while end + 1 < count && present[end + 1].1 == present[start].1 {
            end += 1;
        }
        // positions start..=end are 1-based ranks start+1..=end+1
        let average_rank = (start + end) as f64 / 2.0 + 1.0;
        let pct = average_rank / count as f64;
        for (idx, _) in &present[start..=end] {
            ranks[*idx] = Some(pct);
        }
        start = end + 1;
    }

    ranks
}

/// Min-max normalize present values to `[0, 1]`. When every present value is
/// equal the result is 0 for each of them. Missing values stay missing.
pub fn min_max_normalize(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = values.iter().filter_map(|v| v.filter(|x| !x.is_nan()));
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let range = max - min;
    values
        .iter()
        .map(|value| {
            value.filter(|v| !v.is_nan()).map(|v| {
                if range > 0.0 {
                    (v - min) / range
                } else {
                    0.0
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_values_rank_by_position() {
        let ranks = percentile_rank(&[Some(30.0), Some(10.0), Some(20.0), Some(40.0)]);
        assert_eq!(ranks, vec![Some(0.75), Some(0.25), Some(0.5), Some(1.0)]);
    }

    #[test]
    fn test_ties_share_average_rank() {
        // sorted: 1, 2, 2, 5 -> ranks 1, 2.5, 2.5, 4
        let ranks = percentile_rank(&[Some(2.0), Some(5.0), Some(1.0), Some(2.0)]);
        assert_eq!(ranks, vec![Some(0.625), Some(1.0), Some(0.25), Some(0.625)]);
    }

    #[test]
    fn test_missing_values_are_not_ranked() {
        let ranks = percentile_rank(&[Some(1.0), None, Some(3.0), Some(f64::NAN)]);
        assert_eq!(ranks, vec![Some(0.5), None, Some(1.0), None]);
        assert!(percentile_rank(&[None, None]).iter().all(Option::is_none));
        assert!(percentile_rank(&[]).is_empty());
    }

    #[test]
    fn test_min_max_normalize() {
        let normalized = min_max_normalize(&[Some(2.0), Some(4.0), None, Some(3.0)]);
        assert_eq!(normalized, vec![Some(0.0), Some(1.0), None, Some(0.5)]);
    }

    #[test]
    fn test_constant_column_normalizes_to_zero() {
        let normalized = min_max_normalize(&[Some(0.75), Some(0.75), Some(0.75)]);
        assert_eq!(normalized, vec![Some(0.0), Some(0.0), Some(0.0)]);
        assert_eq!(min_max_normalize(&[Some(9.0)]), vec![Some(0.0)]);
    }
}
