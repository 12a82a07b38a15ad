//! The six axis-aligned face directions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A face direction, written textually as `-x`, `+x`, `-y`, `+y`, `-z`, `+z`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    NegX,
    PosX,
    NegY,
    PosY,
    NegZ,
    PosZ,
}

/// Error for a face token outside `±x`, `±y`, `±z`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown face direction: {0:?}")]
pub struct ParseFaceError(pub String);

impl Face {
    /// All six faces, in index order.
    pub const ALL: [Face; 6] = [
        Face::NegX,
        Face::PosX,
        Face::NegY,
        Face::PosY,
        Face::NegZ,
        Face::PosZ,
    ];

    /// Dense index in `0..6`, matching [`Face::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The face pointing the other way along the same axis.
    pub fn opposite(self) -> Face {
        match self {
            Face::NegX => Face::PosX,
            Face::PosX => Face::NegX,
            Face::NegY => Face::PosY,
            Face::PosY => Face::NegY,
            Face::NegZ => Face::PosZ,
            Face::PosZ => Face::NegZ,
        }
    }

    /// Textual form, e.g. `"+x"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Face::NegX => "-x",
            Face::PosX => "+x",
            Face::NegY => "-y",
            Face::PosY => "+y",
            Face::NegZ => "-z",
            Face::PosZ => "+z",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Face {
    type Err = ParseFaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Face::ALL
            .into_iter()
            .find(|face| face.as_str() == s)
            .ok_or_else(|| ParseFaceError(s.to_string()))
    }
}
