//! Nibble codec: packs 4-bit values two to a byte.
//!
//! The low nibble of each byte holds the even-indexed value and the high
//! nibble holds the odd-indexed one, which is how per-cell metadata and
//! light levels are stored inside chunk files.

use thiserror::Error;

/// Largest value a nibble can hold.
pub const NIBBLE_MAX: u8 = 0x0F;

/// Errors produced by the nibble codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NibbleError {
    /// Packing needs pairs of values; the input had an odd count.
    #[error("cannot pack an odd number of nibbles ({0})")]
    InvalidLength(usize),
}

/// Expands each byte into `(byte & 0xF, byte >> 4)`, low nibble first.
///
/// The output is always twice as long as the input.
pub fn unpack_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut values = Vec::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        values.push(byte & NIBBLE_MAX);
        values.push(byte >> 4);
    }
    values
}

/// Packs pairs `(values[2k], values[2k + 1])` into `low | high << 4`.
///
/// Values above 15 are truncated to their low 4 bits; they never spill into
/// the neighbouring nibble and never panic.
///
/// # Errors
///
/// Returns [`NibbleError::InvalidLength`] if `values.len()` is odd.
pub fn pack_nibbles(values: &[u8]) -> Result<Vec<u8>, NibbleError> {
    if values.len() % 2 != 0 {
        return Err(NibbleError::InvalidLength(values.len()));
    }
    Ok(values
        .chunks_exact(2)
        .map(|pair| (pair[0] & NIBBLE_MAX) | ((pair[1] & NIBBLE_MAX) << 4))
        .collect())
}

// ---------------------------------------------------------------------------
// NibbleArray
// ---------------------------------------------------------------------------

/// An owned array of 4-bit values kept in packed form.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NibbleArray {
    /// Packed storage; element `i` lives in byte `i / 2`.
    data: Vec<u8>,
}

impl NibbleArray {
    /// Creates an array of `len` zero nibbles.
    ///
    /// # Errors
    ///
    /// Returns [`NibbleError::InvalidLength`] if `len` is odd.
    pub fn new(len: usize) -> Result<Self, NibbleError> {
        if len % 2 != 0 {
            return Err(NibbleError::InvalidLength(len));
        }
        Ok(Self {
            data: vec![0u8; len / 2],
        })
    }

    /// Wraps an already-packed byte buffer.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Packs a slice of unpacked values.
    pub fn from_values(values: &[u8]) -> Result<Self, NibbleError> {
        pack_nibbles(values).map(Self::from_bytes)
    }

    /// Returns the nibble at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<u8> {
        let byte = *self.data.get(index / 2)?;
        Some(if index % 2 == 0 {
            byte & NIBBLE_MAX
        } else {
            byte >> 4
        })
    }

    /// Stores `value & 0xF` at `index`.
    ///
    /// Returns `false` without writing if `index` is past the end.
    pub fn set(&mut self, index: usize, value: u8) -> bool {
        let Some(byte) = self.data.get_mut(index / 2) else {
            return false;
        };
        let value = value & NIBBLE_MAX;
        if index % 2 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & NIBBLE_MAX) | (value << 4);
        }
        true
    }

    /// Number of nibbles (always even).
    pub fn len(&self) -> usize {
        self.data.len() * 2
    }

    /// Returns `true` if the array holds no nibbles.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Packed bytes, half as many as [`len`](Self::len).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the array and returns the packed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Iterates over the unpacked values in order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.data
            .iter()
            .flat_map(|&byte| [byte & NIBBLE_MAX, byte >> 4])
    }

    /// Unpacks into one byte per value.
    pub fn to_values(&self) -> Vec<u8> {
        unpack_nibbles(&self.data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
