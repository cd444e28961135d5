use serde::{Deserialize, Serialize};

/// One of the two sides.
///
/// The numeric sign of a player is the value its marks take in a raw [`Board`](crate::Board).
/// [`Player::X`] always moves first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub const ALL: [Self; 2] = [Self::X, Self::O];

    /// Returns the cell value used for this player's marks (`+1` for X, `-1` for O).
    #[inline]
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::X => 1,
            Self::O => -1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            1 => Some(Self::X),
            -1 => Some(Self::O),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    /// Returns the character used in board notation.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_roundtrip() {
        for player in Player::ALL {
            assert_eq!(Player::from_sign(player.sign()), Some(player));
        }
        assert_eq!(Player::from_sign(0), None);
        assert_eq!(Player::from_sign(2), None);
    }

    #[test]
    fn test_opponent_alternates() {
        assert_eq!(Player::X.opponent(), Player::O);
        assert_eq!(Player::O.opponent(), Player::X);
        assert_eq!(Player::X.opponent().opponent(), Player::X);
    }
}
