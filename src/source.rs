//! Seedable noise sequences for feeding the convolution engine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Range of [`NoiseGenerator::uniform`].
pub const UNIFORM_NOISE: Noise = Noise::Uniform {
    low: 0.0,
    high: 100.0,
};

/// Parameters of [`NoiseGenerator::gaussian`].
pub const GAUSSIAN_NOISE: Noise = Noise::Gaussian {
    mean: 0.0,
    std_dev: 0.1,
};

/// Distribution the generated samples are drawn from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Noise {
    /// Uniform on `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// Normal with the given mean and standard deviation.
    Gaussian { mean: f64, std_dev: f64 },
}

/// Errors constructing a [`NoiseGenerator`].
#[derive(Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The distribution parameters are invalid.
    InvalidDistribution(String),
}

impl core::fmt::Display for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDistribution(reason) => write!(f, "Invalid noise distribution: {reason}"),
        }
    }
}

impl core::fmt::Debug for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self, f)
    }
}

impl std::error::Error for SourceError {}

enum Sampler {
    Uniform(Uniform<f64>),
    Gaussian(Normal<f64>),
}

/// Pseudo-random sequence generator with an explicit, seedable RNG.
///
/// Two generators built with the same seed and distribution yield the same samples.
pub struct NoiseGenerator {
    rng: ChaCha8Rng,
    sampler: Sampler,
    seed: u64,
}

impl NoiseGenerator {
    /// Uniform noise on `[0, 100)`. A `None` seed draws a fresh one from the OS.
    pub fn uniform(seed: Option<u64>) -> Result<Self, SourceError> {
        Self::with_distribution(seed, UNIFORM_NOISE)
    }

    /// White Gaussian noise with mean 0 and standard deviation 0.1.
    pub fn gaussian(seed: Option<u64>) -> Result<Self, SourceError> {
        Self::with_distribution(seed, GAUSSIAN_NOISE)
    }

    pub fn with_distribution(seed: Option<u64>, noise: Noise) -> Result<Self, SourceError> {
        let sampler = match noise {
            Noise::Uniform { low, high } => Uniform::new(low, high)
                .map(Sampler::Uniform)
                .map_err(|error| SourceError::InvalidDistribution(error.to_string()))?,
            // Normal::new only rejects non-finite deviations.
            Noise::Gaussian { std_dev, .. } if !(std_dev >= 0.0) => {
                return Err(SourceError::InvalidDistribution(format!(
                    "standard deviation {std_dev} must be non-negative"
                )));
            }
            Noise::Gaussian { mean, std_dev } => Normal::new(mean, std_dev)
                .map(Sampler::Gaussian)
                .map_err(|error| SourceError::InvalidDistribution(error.to_string()))?,
        };

        let seed = seed.unwrap_or_else(rand::random);

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            sampler,
            seed,
        })
    }

    /// Seed the generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws the next `len` samples.
    pub fn samples(&mut self, len: usize) -> Vec<f64> {
        let rng = &mut self.rng;
        match &self.sampler {
            Sampler::Uniform(distribution) => (0..len).map(|_| distribution.sample(rng)).collect(),
            Sampler::Gaussian(distribution) => (0..len).map(|_| distribution.sample(rng)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let a = NoiseGenerator::uniform(Some(11)).unwrap().samples(64);
        let b = NoiseGenerator::uniform(Some(11)).unwrap().samples(64);
        let c = NoiseGenerator::uniform(Some(12)).unwrap().samples(64);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_uniform_range() {
        let samples = NoiseGenerator::uniform(Some(1)).unwrap().samples(10_000);
        assert!(samples.iter().all(|&x| (0.0..100.0).contains(&x)));

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((mean - 50.0).abs() < 2.0, "Uniform mean {mean} far from 50");
    }

    #[test]
    fn test_gaussian_moments() {
        let samples = NoiseGenerator::gaussian(Some(5)).unwrap().samples(20_000);
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        assert!(mean.abs() < 0.01, "Gaussian mean {mean} far from 0");
        assert!(
            (variance.sqrt() - 0.1).abs() < 0.01,
            "Gaussian std dev {} far from 0.1",
            variance.sqrt()
        );
    }

    #[test]
    fn test_seed_is_reported() {
        let generator = NoiseGenerator::gaussian(Some(99)).unwrap();
        assert_eq!(generator.seed(), 99);

        let mut random = NoiseGenerator::gaussian(None).unwrap();
        let mut replay = NoiseGenerator::gaussian(Some(random.seed())).unwrap();
        assert_eq!(
            random.samples(8),
            replay.samples(8),
            "Reported seed must replay the sequence"
        );
    }

    #[test]
    fn test_invalid_distribution() {
        let empty_range = NoiseGenerator::with_distribution(
            Some(0),
            Noise::Uniform {
                low: 1.0,
                high: 1.0,
            },
        );
        assert!(matches!(
            empty_range,
            Err(SourceError::InvalidDistribution(_))
        ));

        let negative_std = NoiseGenerator::with_distribution(
            Some(0),
            Noise::Gaussian {
                mean: 0.0,
                std_dev: -1.0,
            },
        );
        assert!(matches!(
            negative_std,
            Err(SourceError::InvalidDistribution(_))
        ));

        let nan_std = NoiseGenerator::with_distribution(
            Some(0),
            Noise::Gaussian {
                mean: 0.0,
                std_dev: f64::NAN,
            },
        );
        assert!(matches!(nan_std, Err(SourceError::InvalidDistribution(_))));

        // Zero deviation is a valid constant distribution.
        let mut constant = NoiseGenerator::with_distribution(
            Some(0),
            Noise::Gaussian {
                mean: 2.0,
                std_dev: 0.0,
            },
        )
        .unwrap();
        assert_eq!(constant.samples(3), vec![2.0; 3]);
    }
}
