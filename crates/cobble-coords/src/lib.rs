//! World and chunk coordinate arithmetic.
//!
//! The world is divided horizontally into square chunks of [`CHUNK_SIZE`]
//! cells. An absolute coordinate `x` splits into a chunk index `cx` and an
//! in-chunk offset `ox` such that `x == cx * CHUNK_SIZE + ox` and
//! `0 <= ox < CHUNK_SIZE`. Negative coordinates use floor division, so
//! `x = -1` lands in chunk `-1` at offset `15`, never in chunk `0`.

pub mod temporal;

/// Width of a chunk along both horizontal axes, in cells.
pub const CHUNK_SIZE: i32 = 16;

// ---------------------------------------------------------------------------
// Chunk positions
// ---------------------------------------------------------------------------

/// Chunk-absolute horizontal position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkPos {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a new chunk position.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the chunk containing the world-absolute column `(x, z)`.
    pub fn containing(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_SIZE),
            z: z.div_euclid(CHUNK_SIZE),
        }
    }

    /// World-absolute coordinates of this chunk's `(0, 0)` corner.
    ///
    /// Widened to `i64` since `i32::MAX` chunks times 16 does not fit in `i32`.
    pub fn origin(self) -> (i64, i64) {
        (
            i64::from(self.x) * i64::from(CHUNK_SIZE),
            i64::from(self.z) * i64::from(CHUNK_SIZE),
        )
    }

    /// Returns the position offset by `(dx, dz)` chunks.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Taxicab distance to another chunk position, in chunks.
    pub fn taxicab(self, other: ChunkPos) -> u64 {
        taxicab2(self.x, self.z, other.x, other.z)
    }
}

impl From<(i32, i32)> for ChunkPos {
    fn from((x, z): (i32, i32)) -> Self {
        Self { x, z }
    }
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Splits world-absolute `(x, z)` into `(cx, ox, cz, oz)`.
///
/// `cx`/`cz` are floor-divided chunk indices and `ox`/`oz` are the Euclidean
/// remainders, always in `[0, CHUNK_SIZE)`.
pub fn split_coords(x: i32, z: i32) -> (i32, i32, i32, i32) {
    (
        x.div_euclid(CHUNK_SIZE),
        x.rem_euclid(CHUNK_SIZE),
        z.div_euclid(CHUNK_SIZE),
        z.rem_euclid(CHUNK_SIZE),
    )
}

// ---------------------------------------------------------------------------
// Distance metrics
// ---------------------------------------------------------------------------

/// Taxicab (L1) distance between two points in the plane.
pub fn taxicab2(x1: i32, y1: i32, x2: i32, y2: i32) -> u64 {
    u64::from(x1.abs_diff(x2)) + u64::from(y1.abs_diff(y2))
}

/// Taxicab (L1) distance between two points in space.
pub fn taxicab3(x1: i32, y1: i32, z1: i32, x2: i32, y2: i32, z2: i32) -> u64 {
    u64::from(x1.abs_diff(x2)) + u64::from(y1.abs_diff(y2)) + u64::from(z1.abs_diff(z2))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
