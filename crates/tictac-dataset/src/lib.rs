//! Training data synthesis for the move-prediction network.
//!
//! This crate turns move oracles into labeled samples:
//!
//! - [`sample`] - [`Sample`](sample::Sample) (mover-normalized board + one-hot move) and the
//!   two-source [`Dataset`](sample::Dataset) file format
//! - [`synthesizer`] - random-opening generation driven by an oracle, with retry on dead
//!   positions and oracle refusals
//! - [`episode`] - full games between oracles, recorded ply by ply
//!
//! # Data Flow
//!
//! ```text
//! random legal opening (0-8 plies)
//!     ↓ rejected if finished
//! oracle.select_move(board, mover)
//!     ↓ skipped if None
//! Sample { x: board.normalize(mover), y: one_hot(move) }
//! ```
//!
//! # Dataset File
//!
//! ```json
//! {
//!   "ruleBased": [{ "x": [0, 1, -1, 0, 0, 0, 0, 0, 0], "y": [0, 0, 0, 0, 1, 0, 0, 0, 0] }],
//!   "minimax": [...]
//! }
//! ```
//!
//! Duplicate samples are kept on purpose: the frequency of a position in the
//! dataset follows how often random play reaches it.

pub mod episode;
pub mod sample;
pub mod synthesizer;
