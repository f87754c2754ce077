//! Count distributions used to decide how many agents a message reaches.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Distribution of non-negative counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CountDistribution {
    /// Always the same count.
    Constant { value: u32 },
    /// Uniform over `min..=max`.
    Uniform { min: u32, max: u32 },
    /// Poisson with mean `lambda`.
    Poisson { lambda: f64 },
}

impl Default for CountDistribution {
    fn default() -> Self {
        CountDistribution::Constant { value: 1 }
    }
}

/// Largest accepted Poisson mean. Sampling cost grows linearly with the mean.
pub const MAX_POISSON_LAMBDA: f64 = 1.0e6;

impl CountDistribution {
    pub fn validate(&self) -> SimResult<()> {
        match *self {
            CountDistribution::Constant { .. } => Ok(()),
            CountDistribution::Uniform { min, max } if min > max => Err(SimError::InvalidDistribution(
                format!("uniform min {min} exceeds max {max}"),
            )),
            CountDistribution::Uniform { .. } => Ok(()),
            CountDistribution::Poisson { lambda } if !lambda.is_finite() || lambda < 0.0 => Err(
                SimError::InvalidDistribution(format!("poisson lambda must be finite and >= 0, got {lambda}")),
            ),
            CountDistribution::Poisson { lambda } if lambda > MAX_POISSON_LAMBDA => Err(
                SimError::InvalidDistribution(format!(
                    "poisson lambda {lambda} exceeds the maximum of {MAX_POISSON_LAMBDA}"
                )),
            ),
            CountDistribution::Poisson { .. } => Ok(()),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<u32> {
        self.validate()?;
        let n = match *self {
            CountDistribution::Constant { value } => value,
            CountDistribution::Uniform { min, max } => rng.gen_range(min..=max),
            CountDistribution::Poisson { lambda } => sample_poisson(lambda, rng),
        };
        Ok(n)
    }
}

/// Knuth's multiplication method; fine for the small means used for message
/// reach. Large means are split into chunks to keep `exp(-lambda)` above zero.
fn sample_poisson<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u32 {
    const CHUNK: f64 = 30.0;

    let mut remaining = lambda;
    let mut total: u32 = 0;
    while remaining > 0.0 {
        let step = remaining.min(CHUNK);
        remaining -= step;

        let limit = (-step).exp();
        let mut k: u32 = 0;
        let mut p = 1.0;
        loop {
            p *= rng.gen::<f64>();
            if p <= limit {
                break;
            }
            k += 1;
        }
        total = total.saturating_add(k);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn constant_and_uniform_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let constant = CountDistribution::Constant { value: 4 };
        assert_eq!(constant.sample(&mut rng).unwrap(), 4);

        let uniform = CountDistribution::Uniform { min: 2, max: 5 };
        for _ in 0..200 {
            let n = uniform.sample(&mut rng).unwrap();
            assert!((2..=5).contains(&n));
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let bad = CountDistribution::Uniform { min: 5, max: 2 };
        assert!(matches!(bad.sample(&mut rng), Err(SimError::InvalidDistribution(_))));

        let bad = CountDistribution::Poisson { lambda: -1.0 };
        assert!(matches!(bad.validate(), Err(SimError::InvalidDistribution(_))));
    }

    #[test]
    fn huge_poisson_mean_is_rejected_before_sampling() {
        let mut rng = StdRng::seed_from_u64(1);
        let huge = CountDistribution::Poisson { lambda: 1e9 };
        assert!(matches!(huge.validate(), Err(SimError::InvalidDistribution(_))));
        assert!(matches!(huge.sample(&mut rng), Err(SimError::InvalidDistribution(_))));

        let at_limit = CountDistribution::Poisson { lambda: MAX_POISSON_LAMBDA };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn poisson_mean_is_close_to_lambda() {
        let mut rng = StdRng::seed_from_u64(42);
        let dist = CountDistribution::Poisson { lambda: 3.0 };
        let n = 5_000;
        let sum: u64 = (0..n).map(|_| dist.sample(&mut rng).unwrap() as u64).sum();
        let mean = sum as f64 / n as f64;
        assert!((mean - 3.0).abs() < 0.2, "mean was {mean}");

        let zero = CountDistribution::Poisson { lambda: 0.0 };
        assert_eq!(zero.sample(&mut rng).unwrap(), 0);
    }

    #[test]
    fn parses_from_json() {
        let dist: CountDistribution = serde_json::from_str(r#"{"kind":"poisson","lambda":2.5}"#).unwrap();
        assert_eq!(dist, CountDistribution::Poisson { lambda: 2.5 });
    }
}
