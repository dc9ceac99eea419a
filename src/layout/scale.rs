// Continuous and quantized scales for mapping data values to pixels.
// Domain math is f64 (data side); callers cast to f32 at the layout edge.

#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }
}

/// Power scale with exponent 0.5; interpolates in sqrt space so equal areas
/// read as equal lengths. Optionally rounds outputs to whole pixels.
#[derive(Debug, Clone, Copy)]
pub struct SqrtScale {
    domain: (f64, f64),
    range: (f64, f64),
    round: bool,
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            round: false,
        }
    }

    pub fn rounded(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            round: true,
        }
    }

    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1.sqrt() - d0.sqrt();
        let out = if span == 0.0 {
            (r0 + r1) / 2.0
        } else {
            r0 + (value.max(0.0).sqrt() - d0.sqrt()) / span * (r1 - r0)
        };
        if self.round {
            out.round()
        } else {
            out
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

/// Piecewise-constant scale: `n` cut points split the domain into `n + 1`
/// buckets. A value equal to a threshold lands in the upper bucket.
#[derive(Debug, Clone)]
pub struct ThresholdScale {
    thresholds: Vec<f64>,
}

impl ThresholdScale {
    pub fn new(thresholds: Vec<f64>) -> Self {
        Self { thresholds }
    }

    pub fn bucket(&self, value: f64) -> usize {
        self.thresholds.partition_point(|threshold| *threshold <= value)
    }

    pub fn bucket_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    /// The [lo, hi) extent a bucket covers; `None` at the open ends.
    pub fn invert_extent(&self, bucket: usize) -> (Option<f64>, Option<f64>) {
        let lo = bucket
            .checked_sub(1)
            .and_then(|i| self.thresholds.get(i))
            .copied();
        let hi = self.thresholds.get(bucket).copied();
        (lo, hi)
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }
}

pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64)> = None;
    for value in values {
        if value.is_nan() {
            continue;
        }
        bounds = Some(match bounds {
            None => (value, value),
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
        });
    }
    bounds
}
