//! Band and linear scales plus "nice" tick generation for the bar chart.

const E10: f64 = 7.071_067_811_865_475; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Discrete categories mapped onto evenly sized bands along `[start, end]`.
///
/// Duplicate categories share the band of their first occurrence. Inner and
/// outer padding are the same fraction of a step; bands are centred.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new<I, S>(categories: I, range: (f64, f64), padding: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut domain: Vec<String> = Vec::new();
        for category in categories {
            let category = category.as_ref();
            if !domain.iter().any(|known| known == category) {
                domain.push(category.to_string());
            }
        }

        let padding = padding.clamp(0.0, 1.0);
        let (r0, r1) = range;
        let n = domain.len() as f64;
        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;

        Self {
            domain,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    /// Left edge of the band for `category`.
    pub fn position(&self, category: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|known| known == category)
            .map(|idx| self.start + self.step * idx as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

/// Continuous mapping from `domain` onto `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Map `value` into the range. A zero-width domain maps everything to the
    /// start of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Roughly `count` evenly spaced round values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = (d0.min(d1), d0.max(d1));
        if count == 0 || !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }

        let step = (hi - lo) / count as f64;
        let power = step.log10().floor();
        let error = step / 10f64.powf(power);
        let factor = if error >= E10 {
            10.0
        } else if error >= E5 {
            5.0
        } else if error >= E2 {
            2.0
        } else {
            1.0
        };

        // Negative powers divide by an integer so fractional ticks stay exact.
        if power < 0.0 {
            let inc = 10f64.powf(-power) / factor;
            let mut first = (lo * inc).round();
            let mut last = (hi * inc).round();
            if first / inc < lo {
                first += 1.0;
            }
            if last / inc > hi {
                last -= 1.0;
            }
            integer_steps(first, last).map(|i| i / inc).collect()
        } else {
            let inc = 10f64.powf(power) * factor;
            let mut first = (lo / inc).round();
            let mut last = (hi / inc).round();
            if first * inc < lo {
                first += 1.0;
            }
            if last * inc > hi {
                last -= 1.0;
            }
            integer_steps(first, last).map(|i| i * inc).collect()
        }
    }
}

fn integer_steps(first: f64, last: f64) -> impl Iterator<Item = f64> {
    let first = first as i64;
    let last = last as i64;
    (first..=last).map(|i| i as f64)
}
