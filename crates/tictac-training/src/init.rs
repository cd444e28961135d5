//! Weight initialization schemes.
//!
//! Both schemes scale the spread of the initial weights inversely with the fan-in
//! of the layer, so the variance of a unit's pre-activation stays roughly constant
//! across layers:
//!
//! - [`WeightInit::HeNormal`]: `N(0, σ²)` with `σ = scale · sqrt(2 / fan_in)`, suited to ReLU units
//! - [`WeightInit::XavierUniform`]: `U(-l, l)` with `l = scale · sqrt(6 / (fan_in + fan_out))`
//!
//! `scale` is the tunable multiplier from [`MlpConfig`](crate::mlp::MlpConfig); `1.0`
//! gives the textbook schemes. Biases are not drawn here; they start at zero.

use rand::Rng;
use rand_distr::{Distribution as _, Normal};

use crate::ConfigError;

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::FromStr,
)]
pub enum WeightInit {
    #[default]
    HeNormal,
    XavierUniform,
}

impl WeightInit {
    /// Draws `fan_in * fan_out` weights for a `fan_out × fan_in` matrix, row-major.
    pub fn sample<R>(
        self,
        rng: &mut R,
        fan_in: usize,
        fan_out: usize,
        scale: f32,
    ) -> Result<Vec<f32>, ConfigError>
    where
        R: Rng + ?Sized,
    {
        let len = fan_in * fan_out;
        match self {
            Self::HeNormal => he_normal(rng, fan_in, len, scale),
            Self::XavierUniform => xavier_uniform(rng, fan_in, fan_out, len, scale),
        }
    }
}

/// Creates a weight vector by applying a function to each index.
///
/// # Examples
///
/// ```
/// use tictac_training::init;
///
/// let weights = init::from_fn(|i| i as f32 * 0.5, 3);
/// assert_eq!(weights, vec![0.0, 0.5, 1.0]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Scales must be finite and non-negative.
fn check_scale(scale: f32) -> Result<(), ConfigError> {
    if scale.is_finite() && scale >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InitScale { value: scale })
    }
}

#[expect(clippy::cast_precision_loss)]
pub fn he_normal<R>(rng: &mut R, fan_in: usize, len: usize, scale: f32) -> Result<Vec<f32>, ConfigError>
where
    R: Rng + ?Sized,
{
    check_scale(scale)?;
    let std_dev = scale * (2.0 / fan_in.max(1) as f32).sqrt();
    let normal =
        Normal::new(0.0, std_dev).map_err(|_| ConfigError::InitScale { value: scale })?;
    Ok(from_fn(|_| normal.sample(rng), len))
}

#[expect(clippy::cast_precision_loss)]
pub fn xavier_uniform<R>(
    rng: &mut R,
    fan_in: usize,
    fan_out: usize,
    len: usize,
    scale: f32,
) -> Result<Vec<f32>, ConfigError>
where
    R: Rng + ?Sized,
{
    check_scale(scale)?;
    let limit = scale * (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    if limit == 0.0 {
        return Ok(vec![0.0; len]);
    }
    Ok(from_fn(|_| rng.random_range(-limit..limit), len))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[expect(clippy::cast_precision_loss)]
    fn variance(values: &[f32]) -> f32 {
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n
    }

    #[test]
    fn test_he_normal_variance_follows_fan_in() {
        let mut rng = Pcg32::seed_from_u64(0);
        let narrow = he_normal(&mut rng, 9, 20_000, 1.0).unwrap();
        let wide = he_normal(&mut rng, 128, 20_000, 1.0).unwrap();
        assert!((variance(&narrow) - 2.0 / 9.0).abs() < 0.02);
        assert!((variance(&wide) - 2.0 / 128.0).abs() < 0.002);
    }

    #[test]
    fn test_xavier_uniform_is_bounded() {
        let mut rng = Pcg32::seed_from_u64(1);
        let limit = (6.0f32 / (9.0 + 64.0)).sqrt();
        let weights = xavier_uniform(&mut rng, 9, 64, 576, 1.0).unwrap();
        assert_eq!(weights.len(), 576);
        assert!(weights.iter().all(|w| w.abs() <= limit));
    }

    #[test]
    fn test_zero_scale_gives_zero_weights() {
        let mut rng = Pcg32::seed_from_u64(2);
        for init in [WeightInit::HeNormal, WeightInit::XavierUniform] {
            let weights = init.sample(&mut rng, 9, 4, 0.0).unwrap();
            assert_eq!(weights, vec![0.0; 36]);
        }
    }

    #[test]
    fn test_negative_scale_is_rejected() {
        let mut rng = Pcg32::seed_from_u64(3);
        for init in [WeightInit::HeNormal, WeightInit::XavierUniform] {
            for scale in [-1.0, f32::NAN, f32::INFINITY] {
                assert!(
                    matches!(
                        init.sample(&mut rng, 9, 4, scale),
                        Err(ConfigError::InitScale { .. })
                    ),
                    "{init} accepted scale {scale}"
                );
            }
        }
    }
}
