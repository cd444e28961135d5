//! Single-hidden-layer perceptron with momentum SGD.
//!
//! # Architecture
//!
//! ```text
//! input (9)  ──W1, b1──▶  hidden (H, ReLU)  ──W2, b2──▶  logits (9)  ──softmax──▶  probabilities (9)
//! ```
//!
//! `W1` is `H × 9` and `W2` is `9 × H`: each matrix has one row per unit of the
//! layer it feeds and one column per unit of the layer it reads.
//!
//! # Training Step
//!
//! [`Mlp::train`] performs one stochastic step on a single sample:
//!
//! 1. Forward pass, keeping the hidden pre-activations, activations and logits
//! 2. Output gradient `δ₂ = p - t` (softmax and cross-entropy combined)
//! 3. Hidden gradient `δ₁ = (W2ᵀ δ₂) ⊙ 1[z₁ > 0]`, computed from the current `W2`
//! 4. Momentum update, output layer first, then hidden layer:
//!    `v ← β·v + η·g`, `w ← w - v` for every weight and bias
//!
//! All gradients are taken before any parameter changes, so the hidden layer never
//! sees a partially updated output layer.

use std::array;

use rand::Rng;
use tictac_engine::CELL_COUNT;

use crate::{
    ConfigError,
    bundle::{LoadError, WeightBundle},
    init::WeightInit,
};

pub const INPUT_SIZE: usize = CELL_COUNT;
pub const OUTPUT_SIZE: usize = CELL_COUNT;

/// Probabilities are floored at this value before taking a logarithm.
pub const PROBABILITY_FLOOR: f32 = 1e-10;

/// Network shape and optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MlpConfig {
    pub hidden_size: usize,
    /// Momentum decay β.
    pub momentum: f32,
    pub init: WeightInit,
    /// Multiplier on the spread of the initial weights.
    pub init_scale: f32,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_size: 128,
            momentum: 0.9,
            init: WeightInit::HeNormal,
            init_scale: 1.0,
        }
    }
}

impl MlpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hidden_size == 0 {
            return Err(ConfigError::ZeroHiddenSize);
        }
        check_momentum(self.momentum)?;
        if !self.init_scale.is_finite() || self.init_scale < 0.0 {
            return Err(ConfigError::InitScale {
                value: self.init_scale,
            });
        }
        Ok(())
    }
}

fn check_momentum(momentum: f32) -> Result<(), ConfigError> {
    if (0.0..1.0).contains(&momentum) {
        Ok(())
    } else {
        Err(ConfigError::Momentum { value: momentum })
    }
}

/// Fully connected layer stored row-major: `weights[row * inputs + col]`.
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    inputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    fn zeros(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            weights: vec![0.0; inputs * outputs],
            biases: vec![0.0; outputs],
        }
    }

    fn outputs(&self) -> usize {
        self.biases.len()
    }

    fn row(&self, row: usize) -> &[f32] {
        &self.weights[row * self.inputs..(row + 1) * self.inputs]
    }

    fn weight(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.inputs + col]
    }

    fn affine(&self, row: usize, input: &[f32]) -> f32 {
        self.biases[row] + self.row(row).iter().zip(input).map(|(w, x)| w * x).sum::<f32>()
    }

    fn to_rows(&self) -> Vec<Vec<f32>> {
        self.weights
            .chunks(self.inputs)
            .map(<[f32]>::to_vec)
            .collect()
    }

    fn from_rows(rows: &[Vec<f32>], biases: &[f32]) -> Self {
        Self {
            inputs: rows.first().map_or(0, Vec::len),
            weights: rows.iter().flatten().copied().collect(),
            biases: biases.to_vec(),
        }
    }
}

/// Momentum accumulators shaped like a [`Layer`].
#[derive(Debug, Clone, PartialEq)]
struct Velocity {
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Velocity {
    fn zeros_like(layer: &Layer) -> Self {
        Self {
            weights: vec![0.0; layer.weights.len()],
            biases: vec![0.0; layer.biases.len()],
        }
    }

    /// Applies `v ← β·v + η·g; w ← w - v` with `g = delta ⊗ input`.
    fn step(&mut self, layer: &mut Layer, delta: &[f32], input: &[f32], learning_rate: f32, beta: f32) {
        let inputs = layer.inputs;
        for (row, &d) in delta.iter().enumerate() {
            let range = row * inputs..(row + 1) * inputs;
            let weights = &mut layer.weights[range.clone()];
            let velocity = &mut self.weights[range];
            for ((w, v), &x) in weights.iter_mut().zip(velocity).zip(input) {
                *v = beta * *v + learning_rate * d * x;
                *w -= *v;
            }
            let v = &mut self.biases[row];
            *v = beta * *v + learning_rate * d;
            layer.biases[row] -= *v;
        }
    }
}

/// Intermediate values of one forward pass, needed by backpropagation.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub hidden_pre: Vec<f32>,
    pub hidden: Vec<f32>,
    pub logits: [f32; OUTPUT_SIZE],
    pub probabilities: [f32; OUTPUT_SIZE],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    hidden: Layer,
    output: Layer,
    hidden_velocity: Velocity,
    output_velocity: Velocity,
    momentum: f32,
}

impl Mlp {
    /// Creates a randomly initialized network with zero biases and zero momentum.
    pub fn new<R>(config: &MlpConfig, rng: &mut R) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;
        let MlpConfig {
            hidden_size,
            momentum,
            init,
            init_scale,
        } = *config;

        let mut hidden = Layer::zeros(INPUT_SIZE, hidden_size);
        hidden.weights = init.sample(rng, INPUT_SIZE, hidden_size, init_scale)?;
        let mut output = Layer::zeros(hidden_size, OUTPUT_SIZE);
        output.weights = init.sample(rng, hidden_size, OUTPUT_SIZE, init_scale)?;

        Ok(Self::from_layers(hidden, output, momentum))
    }

    /// Rebuilds a network from saved weights. Momentum starts at zero.
    pub fn from_bundle(bundle: &WeightBundle, momentum: f32) -> Result<Self, LoadError> {
        check_momentum(momentum)?;
        bundle.validate()?;
        let hidden = Layer::from_rows(&bundle.w1, &bundle.b1);
        let output = Layer::from_rows(&bundle.w2, &bundle.b2);
        Ok(Self::from_layers(hidden, output, momentum))
    }

    fn from_layers(hidden: Layer, output: Layer, momentum: f32) -> Self {
        Self {
            hidden_velocity: Velocity::zeros_like(&hidden),
            output_velocity: Velocity::zeros_like(&output),
            hidden,
            output,
            momentum,
        }
    }

    /// Snapshot of weights and biases (momentum is not included).
    #[must_use]
    pub fn to_bundle(&self) -> WeightBundle {
        WeightBundle {
            w1: self.hidden.to_rows(),
            b1: self.hidden.biases.clone(),
            w2: self.output.to_rows(),
            b2: self.output.biases.clone(),
        }
    }

    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.hidden.outputs()
    }

    #[must_use]
    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    #[must_use]
    pub fn forward(&self, input: &[f32; INPUT_SIZE]) -> ForwardPass {
        let hidden_pre = (0..self.hidden.outputs())
            .map(|row| self.hidden.affine(row, input))
            .collect::<Vec<_>>();
        let hidden = hidden_pre.iter().map(|&z| relu(z)).collect::<Vec<_>>();
        let logits = array::from_fn(|row| self.output.affine(row, &hidden));
        let probabilities = softmax(&logits);
        ForwardPass {
            hidden_pre,
            hidden,
            logits,
            probabilities,
        }
    }

    /// Returns the move probabilities for `input`.
    #[must_use]
    pub fn predict(&self, input: &[f32; INPUT_SIZE]) -> [f32; OUTPUT_SIZE] {
        self.forward(input).probabilities
    }

    /// Runs one momentum SGD step on a single sample.
    ///
    /// Returns the cross-entropy loss of the sample measured before the update.
    pub fn train(
        &mut self,
        input: &[f32; INPUT_SIZE],
        target: &[f32; OUTPUT_SIZE],
        learning_rate: f32,
    ) -> f32 {
        let pass = self.forward(input);
        let loss = cross_entropy(&pass.probabilities, target);

        let d_output: [f32; OUTPUT_SIZE] = array::from_fn(|i| pass.probabilities[i] - target[i]);
        let d_hidden = pass
            .hidden_pre
            .iter()
            .enumerate()
            .map(|(j, &z)| {
                if z > 0.0 {
                    d_output
                        .iter()
                        .enumerate()
                        .map(|(i, d)| d * self.output.weight(i, j))
                        .sum()
                } else {
                    0.0
                }
            })
            .collect::<Vec<f32>>();

        let beta = self.momentum;
        self.output_velocity
            .step(&mut self.output, &d_output, &pass.hidden, learning_rate, beta);
        self.hidden_velocity
            .step(&mut self.hidden, &d_hidden, input, learning_rate, beta);
        loss
    }
}

#[inline]
fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// Numerically stable softmax.
///
/// The largest logit is subtracted before exponentiating, so at least one term
/// is exactly `1.0` and the normalizer is never below one.
#[must_use]
pub fn softmax(logits: &[f32; OUTPUT_SIZE]) -> [f32; OUTPUT_SIZE] {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps = logits.map(|z| (z - max).exp());
    let sum = exps.iter().sum::<f32>();
    exps.map(|e| e / sum)
}

/// Categorical cross-entropy `-Σ tᵢ·ln(max(pᵢ, floor))`.
#[must_use]
pub fn cross_entropy(probabilities: &[f32; OUTPUT_SIZE], target: &[f32; OUTPUT_SIZE]) -> f32 {
    probabilities
        .iter()
        .zip(target)
        .filter(|(_, t)| **t != 0.0)
        .map(|(p, t)| -t * p.max(PROBABILITY_FLOOR).ln())
        .sum()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn network(hidden_size: usize, momentum: f32, seed: u64) -> Mlp {
        let config = MlpConfig {
            hidden_size,
            momentum,
            ..MlpConfig::default()
        };
        Mlp::new(&config, &mut Pcg32::seed_from_u64(seed)).unwrap()
    }

    const INPUT: [f32; INPUT_SIZE] = [1.0, -1.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0];
    const TARGET: [f32; OUTPUT_SIZE] = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

    #[test]
    fn test_shapes() {
        let mlp = network(16, 0.9, 0);
        assert_eq!(mlp.hidden_size(), 16);
        let bundle = mlp.to_bundle();
        assert_eq!(bundle.w1.len(), 16);
        assert!(bundle.w1.iter().all(|row| row.len() == INPUT_SIZE));
        assert_eq!(bundle.b1, vec![0.0; 16]);
        assert_eq!(bundle.w2.len(), OUTPUT_SIZE);
        assert!(bundle.w2.iter().all(|row| row.len() == 16));
        assert_eq!(bundle.b2, vec![0.0; OUTPUT_SIZE]);
    }

    #[test]
    fn test_forward_outputs_distribution() {
        let mlp = network(32, 0.9, 1);
        for input in [[0.0; INPUT_SIZE], INPUT, [1.0; INPUT_SIZE], [-1.0; INPUT_SIZE]] {
            let pass = mlp.forward(&input);
            let sum = pass.probabilities.iter().sum::<f32>();
            assert!((sum - 1.0).abs() < 1e-5, "sum = {sum}");
            assert!(pass.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
            assert_eq!(pass.hidden.len(), 32);
            for (z, a) in pass.hidden_pre.iter().zip(&pass.hidden) {
                assert_eq!(*a, z.max(0.0));
            }
        }
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let logits = [1000.0, 999.0, -1000.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let p = softmax(&logits);
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(p[0] > p[1]);
    }

    #[test]
    fn test_cross_entropy_floors_zero_probability() {
        let mut p = [0.0; OUTPUT_SIZE];
        p[0] = 1.0;
        let loss = cross_entropy(&p, &TARGET);
        assert!(loss.is_finite());
        assert!((loss - (-PROBABILITY_FLOOR.ln())).abs() < 1e-3);
        assert!(cross_entropy(&p, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).abs() < 1e-6);
    }

    #[test]
    fn test_train_step_lowers_sample_loss() {
        let mut mlp = network(32, 0.9, 2);
        let before = mlp.train(&INPUT, &TARGET, 0.01);
        let after = cross_entropy(&mlp.predict(&INPUT), &TARGET);
        assert!(after < before, "{after} >= {before}");
    }

    fn loss_of(mlp: &Mlp) -> f32 {
        cross_entropy(&mlp.predict(&INPUT), &TARGET)
    }

    /// With zero momentum and a unit learning rate the update equals the gradient.
    fn applied_gradient(mlp: &Mlp) -> Mlp {
        let mut trained = mlp.clone();
        trained.train(&INPUT, &TARGET, 1.0);
        trained
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let mlp = network(8, 0.0, 3);
        let trained = applied_gradient(&mlp);
        let eps = 1e-3;

        // output bias
        for row in 0..OUTPUT_SIZE {
            let analytic = mlp.output.biases[row] - trained.output.biases[row];
            let mut plus = mlp.clone();
            plus.output.biases[row] += eps;
            let mut minus = mlp.clone();
            minus.output.biases[row] -= eps;
            let numeric = (loss_of(&plus) - loss_of(&minus)) / (2.0 * eps);
            assert!((analytic - numeric).abs() < 1e-2, "b2[{row}]: {analytic} vs {numeric}");
        }

        // hidden weights of clearly active units
        let pass = mlp.forward(&INPUT);
        let active = (0..mlp.hidden_size())
            .filter(|&j| pass.hidden_pre[j] > 0.1)
            .collect::<Vec<_>>();
        assert!(!active.is_empty());
        for &j in &active {
            let index = j * INPUT_SIZE;
            let analytic = mlp.hidden.weights[index] - trained.hidden.weights[index];
            let mut plus = mlp.clone();
            plus.hidden.weights[index] += eps;
            let mut minus = mlp.clone();
            minus.hidden.weights[index] -= eps;
            let numeric = (loss_of(&plus) - loss_of(&minus)) / (2.0 * eps);
            assert!((analytic - numeric).abs() < 1e-2, "w1[{j}][0]: {analytic} vs {numeric}");
        }
    }

    #[test]
    fn test_momentum_accumulates_across_steps() {
        let mut plain = network(8, 0.0, 4);
        let mut heavy = network(8, 0.9, 4);
        for _ in 0..2 {
            plain.train(&INPUT, &TARGET, 0.01);
            heavy.train(&INPUT, &TARGET, 0.01);
        }
        // identical first step, larger second step with momentum
        assert_ne!(plain.to_bundle(), heavy.to_bundle());
        assert!(heavy.output_velocity.biases[2].abs() > plain.output_velocity.biases[2].abs());
    }

    #[test]
    fn test_config_validation() {
        let mut rng = Pcg32::seed_from_u64(5);
        let bad = [
            MlpConfig {
                hidden_size: 0,
                ..MlpConfig::default()
            },
            MlpConfig {
                momentum: 1.0,
                ..MlpConfig::default()
            },
            MlpConfig {
                init_scale: f32::NAN,
                ..MlpConfig::default()
            },
        ];
        for config in bad {
            assert!(Mlp::new(&config, &mut rng).is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_bundle_restores_same_outputs() {
        let mut mlp = network(16, 0.9, 6);
        for _ in 0..10 {
            mlp.train(&INPUT, &TARGET, 0.01);
        }
        let restored = Mlp::from_bundle(&mlp.to_bundle(), 0.9).unwrap();
        assert_eq!(restored.predict(&INPUT), mlp.predict(&INPUT));
        // momentum is not part of the snapshot
        assert!(restored.output_velocity.biases.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_bundle_rejects_out_of_range_momentum() {
        let bundle = network(4, 0.9, 7).to_bundle();
        for momentum in [1.0, -0.1, f32::NAN] {
            assert!(
                matches!(
                    Mlp::from_bundle(&bundle, momentum),
                    Err(LoadError::Config(ConfigError::Momentum { .. }))
                ),
                "accepted momentum {momentum}"
            );
        }
        assert!(Mlp::from_bundle(&bundle, 0.0).is_ok());
    }
}
