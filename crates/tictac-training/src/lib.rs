//! Move-prediction network and its training loop.
//!
//! This crate learns the move choices of an oracle from labeled samples produced by
//! `tictac-dataset`, and plays with the resulting network through the same
//! [`MoveOracle`](tictac_oracle::MoveOracle) interface the oracles use.
//!
//! # How Training Works
//!
//! 1. **Initialize** - Draw the weights of a 9 → H → 9 perceptron ([`init`], [`mlp`])
//! 2. **Shuffle** - Reorder the training samples at the start of each epoch
//! 3. **Step** - One momentum SGD step per sample ([`Mlp::train`](mlp::Mlp::train))
//! 4. **Evaluate** - Every `eval_interval` epochs, measure loss and accuracy on the whole set
//! 5. **Stop** - When accuracy exceeds the target or the epoch limit is reached
//! 6. **Export** - Save weights as a [`WeightBundle`](bundle::WeightBundle)
//!
//! # Architecture
//!
//! ```text
//! Dataset (tictac-dataset)
//!     ↓ samples
//! Trainer (trainer)
//!     ↓ SGD steps
//! Mlp (mlp)
//!     ↓ snapshot
//! WeightBundle (bundle) ── JSON file
//!     ↓ reload
//! NetworkOracle (policy)
//!     ↓ select_move
//! play / arena
//! ```
//!
//! # Network
//!
//! - Input: the mover-normalized board (`+1` own mark, `-1` opponent, `0` empty)
//! - Hidden: `H` ReLU units (128 by default)
//! - Output: softmax over the nine cells
//! - Loss: categorical cross-entropy against the one-hot oracle move
//!
//! The network itself knows nothing about legality; [`policy::NetworkOracle`]
//! masks occupied cells when picking a move.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use tictac_engine::{Board, Player};
//! use tictac_training::{
//!     mlp::{Mlp, MlpConfig},
//!     policy,
//! };
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let mlp = Mlp::new(&MlpConfig::default(), &mut rng).unwrap();
//!
//! let input = policy::encode(&Board::EMPTY, Player::X);
//! let probabilities = mlp.predict(&input);
//! assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5);
//! ```

pub mod bundle;
pub mod init;
pub mod mlp;
pub mod policy;
pub mod trainer;

/// Error returned when a network or trainer setting is out of range.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("hidden layer size must be at least 1")]
    ZeroHiddenSize,
    #[display("momentum must be in [0, 1), got {value}")]
    Momentum { value: f32 },
    #[display("initialization scale must be finite and non-negative, got {value}")]
    InitScale { value: f32 },
    #[display("learning rate must be finite and positive, got {value}")]
    LearningRate { value: f32 },
    #[display("evaluation interval must be at least 1")]
    ZeroEvalInterval,
    #[display("target accuracy must be in (0, 1], got {value}")]
    TargetAccuracy { value: f32 },
}
