use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const FILES: &[u8; 8] = b"ABCDEFGH";

/// A square on the board, `(file, rank)` with both components in `0..8`.
///
/// File 0 is the `A` file and rank 0 is the first rank, so `Coords::at(3, 1)`
/// is `D2`. The fields are private: every value that exists is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coords {
    file: u8,
    rank: u8,
}

impl Coords {
    /// Create a square from file (0-7, A-H) and rank (0-7, 1-8).
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// Create a square the caller knows to be on the board.
    ///
    /// # Panics
    ///
    /// Panics if either component is outside `0..8`.
    #[must_use]
    pub const fn at(file: u8, rank: u8) -> Self {
        match Self::new(file, rank) {
            Some(coords) => coords,
            None => panic!("illegal board coordinates"),
        }
    }

    /// Get the file (0-7, A-H).
    #[must_use]
    pub const fn file(self) -> u8 {
        self.file
    }

    /// Get the rank (0-7, 1-8).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// All 64 squares, rank by rank starting at A1.
    pub fn all() -> impl Iterator<Item = Coords> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Coords { file, rank }))
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = FILES[self.file as usize] as char;
        let rank = (b'1' + self.rank) as char;
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Coords {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| BoardError::InvalidCoordinate {
            input: s.to_string(),
            reason,
        };

        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid("square must be 2 characters"));
        };
        if !('A'..='H').contains(&file) {
            return Err(invalid("file must be A-H"));
        }
        if !('1'..='8').contains(&rank) {
            return Err(invalid("rank must be 1-8"));
        }

        Ok(Self {
            file: file as u8 - b'A',
            rank: rank as u8 - b'1',
        })
    }
}

impl TryFrom<String> for Coords {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coords> for String {
    fn from(coords: Coords) -> Self {
        coords.to_string()
    }
}
