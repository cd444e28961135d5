use serde::{Deserialize, Serialize};
use tictac_engine::{Board, CELL_COUNT, Player};

/// A labeled training example.
///
/// `input` is always the board as seen by the mover (see [`Board::normalize`]),
/// taken before the move is played; `target` is the chosen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SampleRecord<f64>", into = "SampleRecord<i8>")]
pub struct Sample {
    input: Board,
    target: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SampleError {
    #[display("x[{index}] = {value} is not a cell value (-1, 0 or 1)")]
    InvalidInput { index: usize, value: f64 },
    #[display("y is not a one-hot vector")]
    NotOneHot,
    #[display("target cell {target} is occupied in x")]
    OccupiedTarget { target: usize },
}

impl Sample {
    /// Records that `player` chose `target` on `board` (absolute marks).
    #[must_use]
    pub fn new(board: &Board, player: Player, target: usize) -> Self {
        debug_assert!(board.is_empty_cell(target), "target {target} is not legal");
        Self {
            input: board.normalize(player),
            target,
        }
    }

    /// The mover-normalized board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.input
    }

    #[must_use]
    pub fn target_move(&self) -> usize {
        self.target
    }

    /// Network input: the normalized cells as floats.
    #[must_use]
    pub fn input(&self) -> [f32; CELL_COUNT] {
        self.input.cells().map(f32::from)
    }

    /// Network target: one-hot encoding of the chosen cell.
    #[must_use]
    pub fn target(&self) -> [f32; CELL_COUNT] {
        let mut y = [0.0; CELL_COUNT];
        y[self.target] = 1.0;
        y
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SampleRecord<T> {
    x: [T; CELL_COUNT],
    y: [T; CELL_COUNT],
}

impl From<Sample> for SampleRecord<i8> {
    fn from(sample: Sample) -> Self {
        let mut y = [0; CELL_COUNT];
        y[sample.target] = 1;
        Self {
            x: *sample.input.cells(),
            y,
        }
    }
}

impl TryFrom<SampleRecord<f64>> for Sample {
    type Error = SampleError;

    #[expect(clippy::cast_possible_truncation)]
    fn try_from(record: SampleRecord<f64>) -> Result<Self, Self::Error> {
        let mut cells = [0; CELL_COUNT];
        for (index, (&value, cell)) in record.x.iter().zip(&mut cells).enumerate() {
            if value != -1.0 && value != 0.0 && value != 1.0 {
                return Err(SampleError::InvalidInput { index, value });
            }
            *cell = value as i8;
        }
        let input = Board::from_cells(cells).map_err(|e| SampleError::InvalidInput {
            index: e.index,
            value: f64::from(e.value),
        })?;

        let ones = record.y.iter().filter(|&&v| v == 1.0).count();
        let zeros = record.y.iter().filter(|&&v| v == 0.0).count();
        if ones != 1 || zeros != CELL_COUNT - 1 {
            return Err(SampleError::NotOneHot);
        }
        let target = record
            .y
            .iter()
            .position(|&v| v == 1.0)
            .ok_or(SampleError::NotOneHot)?;
        if !input.is_empty_cell(target) {
            return Err(SampleError::OccupiedTarget { target });
        }
        Ok(Self { input, target })
    }
}

/// Which part of a [`Dataset`] to train on.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::FromStr,
)]
pub enum TrainingSource {
    #[default]
    Minimax,
    RuleBased,
    All,
}

/// Samples from the two oracles, stored under separate keys.
///
/// Order inside each list carries no meaning; training always reshuffles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub rule_based: Vec<Sample>,
    #[serde(default)]
    pub minimax: Vec<Sample>,
}

impl Dataset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rule_based.len() + self.minimax.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collects the samples of `source` into one list.
    #[must_use]
    pub fn select(&self, source: TrainingSource) -> Vec<Sample> {
        match source {
            TrainingSource::Minimax => self.minimax.clone(),
            TrainingSource::RuleBased => self.rule_based.clone(),
            TrainingSource::All => self
                .rule_based
                .iter()
                .chain(&self.minimax)
                .copied()
                .collect(),
        }
    }
}
