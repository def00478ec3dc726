/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Day-over-day change, aligned to the later day. One element shorter than
/// the input.
pub fn first_difference(values: &[Option<f64>]) -> Vec<Option<f64>> {
    values
        .windows(2)
        .map(|pair| match (pair[0], pair[1]) {
            (Some(prev), Some(next)) => Some(next - prev),
            _ => None,
        })
        .collect()
}

/// Centered rolling mean over `window` consecutive values.
///
/// The first and last `window / 2` positions have no complete window and are
/// `None`, as is any window containing a missing value.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let half = window / 2;
    let n = values.len();

    (0..n)
        .map(|i| {
            if window == 0 || i < half || i + half >= n {
                return None;
            }
            let start = i - half;
            let slice = &values[start..(start + window).min(n)];
            if slice.len() < window {
                return None;
            }
            let complete: Option<Vec<f64>> = slice.iter().copied().collect();
            complete.map(|v| mean(&v))
        })
        .collect()
}

/// Ratcliff/Obershelp similarity of two names, ignoring case. 1.0 for equal
/// strings, 0.0 for strings with nothing in common.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (mut best, mut best_a, mut best_b) = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                cur[j + 1] = prev[j] + 1;
                if cur[j + 1] > best {
                    best = cur[j + 1];
                    best_a = i + 1 - best;
                    best_b = j + 1 - best;
                }
            }
        }
        prev = cur;
    }

    if best == 0 {
        return 0;
    }

    best + matching_chars(&a[..best_a], &b[..best_b])
        + matching_chars(&a[best_a + best..], &b[best_b + best..])
}

/// Up to `n` candidates scoring at least `cutoff`, best first.
pub fn close_matches<'a, I>(word: &str, candidates: I, n: usize, cutoff: f64) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|c| (similarity(word, c), c))
        .filter(|(score, _)| *score >= cutoff)
        .collect();

    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then_with(|| x.1.cmp(y.1)));
    scored
        .into_iter()
        .take(n)
        .map(|(_, c)| c.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_first_difference() {
        let diff = first_difference(&[Some(100.0), Some(150.0), None, Some(225.0)]);
        assert_eq!(diff, vec![Some(50.0), None, None]);
        assert!(first_difference(&[Some(1.0)]).is_empty());
    }

    #[test]
    fn test_rolling_mean_constant_series() {
        let k = 3.5;
        let values = vec![Some(k); 20];
        let window = 7;
        let rolled = rolling_mean(&values, window);

        assert_eq!(rolled.len(), values.len());
        for (i, v) in rolled.iter().enumerate() {
            if i < window / 2 || i >= values.len() - window / 2 {
                assert_eq!(*v, None, "position {i} should be invalid");
            } else {
                assert!(approx(v.unwrap(), k), "position {i} should equal {k}");
            }
        }
    }

    #[test]
    fn test_rolling_mean_even_window_marks_same_edges() {
        let values = vec![Some(2.0); 10];
        let rolled = rolling_mean(&values, 4);
        assert_eq!(rolled[..2], [None, None]);
        assert_eq!(rolled[8..], [None, None]);
        assert!(rolled[2..8].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_rolling_mean_missing_value_poisons_window() {
        let values = vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
        let rolled = rolling_mean(&values, 3);
        assert_eq!(rolled, vec![None, None, None, None, None]);
    }

    #[test]
    fn test_rolling_mean_short_series() {
        let rolled = rolling_mean(&[Some(1.0), Some(2.0)], 7);
        assert_eq!(rolled, vec![None, None]);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("Italy", "Italy"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!(approx(similarity("USA", "United States"), 6.0 / 16.0));
    }

    #[test]
    fn test_close_matches_orders_and_limits() {
        let names = ["Italy", "Iceland", "India", "Ireland", "Norway"];
        let matches = close_matches("Itly", names.iter().copied(), 3, 0.3);
        assert_eq!(matches.first().map(String::as_str), Some("Italy"));
        assert!(matches.len() <= 3);
        assert!(!matches.contains(&"Norway".to_string()));
    }
}
