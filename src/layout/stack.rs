// Stacked-series transform for the stream graph: series order is the key
// order handed in (order "none"); the baseline follows the streamgraph
// wiggle offset of Byron & Wattenberg, which shifts the whole stack between
// steps to minimize weighted wiggle.

/// Stack `values[step][series]` into per-series `[lower, upper]` extents,
/// returned series-major: `result[series][step]`.
///
/// Inputs are expected non-negative and gap-free (missing cells zeroed by
/// the parser); the output is then NaN-free.
pub fn stack_wiggle(values: &[Vec<f64>]) -> Vec<Vec<(f64, f64)>> {
    let steps = values.len();
    let series = values.first().map(Vec::len).unwrap_or(0);
    let mut stacked = vec![vec![(0.0, 0.0); steps]; series];
    if series == 0 || steps == 0 {
        return stacked;
    }
    let v = |s: usize, j: usize| values[j][s];

    // Baseline for the first series at each step.
    let mut y = 0.0;
    for j in 1..steps {
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        for i in 0..series {
            let sij0 = v(i, j);
            let sij1 = v(i, j - 1);
            let mut s3 = (sij0 - sij1) / 2.0;
            for k in 0..i {
                s3 += v(k, j) - v(k, j - 1);
            }
            s1 += sij0;
            s2 += s3 * sij0;
        }
        stacked[0][j - 1] = (y, y + v(0, j - 1));
        if s1 != 0.0 {
            y -= s2 / s1;
        }
    }
    stacked[0][steps - 1] = (y, y + v(0, steps - 1));

    // Remaining series sit on the one below.
    for i in 1..series {
        for j in 0..steps {
            let base = stacked[i - 1][j].1;
            stacked[i][j] = (base, base + v(i, j));
        }
    }
    stacked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn extents_are_contiguous_and_sum_to_step_totals() {
        let values = vec![
            vec![2.0, 1.0, 4.0],
            vec![3.0, 0.0, 1.0],
            vec![1.0, 5.0, 2.0],
        ];
        let stacked = stack_wiggle(&values);
        assert_eq!(stacked.len(), 3);
        for (j, row) in values.iter().enumerate() {
            for i in 1..stacked.len() {
                assert!(close(stacked[i][j].0, stacked[i - 1][j].1));
            }
            let total: f64 = row.iter().sum();
            let span = stacked[stacked.len() - 1][j].1 - stacked[0][j].0;
            assert!(close(span, total));
        }
    }

    #[test]
    fn constant_totals_keep_the_baseline_still() {
        // Every series constant across steps: no wiggle to minimize.
        let values = vec![vec![2.0, 3.0], vec![2.0, 3.0], vec![2.0, 3.0]];
        let stacked = stack_wiggle(&values);
        for j in 0..values.len() {
            assert!(close(stacked[0][j].0, 0.0));
        }
    }

    #[test]
    fn baseline_shifts_against_growth() {
        // Series 0 grows 1 -> 3, series 1 stays flat at 1.
        let values = vec![vec![1.0, 1.0], vec![3.0, 1.0]];
        let stacked = stack_wiggle(&values);
        assert_eq!(stacked[0][0], (0.0, 1.0));
        assert_eq!(stacked[1][0], (1.0, 2.0));
        // s1 = 4, s2 = 5, so the second baseline is -5/4.
        assert!(close(stacked[0][1].0, -1.25));
        assert!(close(stacked[0][1].1, 1.75));
        assert!(close(stacked[1][1].0, 1.75));
        assert!(close(stacked[1][1].1, 2.75));
    }

    #[test]
    fn single_step_stacks_from_zero() {
        let values = vec![vec![4.0, 6.0]];
        let stacked = stack_wiggle(&values);
        assert_eq!(stacked[0][0], (0.0, 4.0));
        assert_eq!(stacked[1][0], (4.0, 10.0));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(stack_wiggle(&[]).is_empty());
    }
}
