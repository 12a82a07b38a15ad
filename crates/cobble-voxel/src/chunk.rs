//! A chunk column and read access to its stored payload.
//!
//! The payload is the tag tree read from the chunk's file. Cell arrays live
//! under the `Level` compound: `Blocks` holds one id byte per cell, while
//! `Data`, `SkyLight` and `BlockLight` hold one nibble per cell, packed two to
//! a byte. Cells are ordered Y-fastest: `y + oz * 128 + ox * 128 * 16`.

use cobble_coords::ChunkPos;
use quartz_nbt::NbtCompound;
use thiserror::Error;

use crate::nibble::NibbleArray;
use crate::registry::{BlockRegistry, BlockType};

/// Cells along each horizontal edge.
pub const CHUNK_WIDTH: usize = 16;
/// Cells along the vertical axis.
pub const CHUNK_HEIGHT: usize = 128;
/// Total cells in a chunk column.
pub const CHUNK_CELLS: usize = CHUNK_WIDTH * CHUNK_WIDTH * CHUNK_HEIGHT;

const LEVEL: &str = "Level";
const BLOCKS: &str = "Blocks";
const DATA: &str = "Data";
const SKY_LIGHT: &str = "SkyLight";
const BLOCK_LIGHT: &str = "BlockLight";

/// Errors reading cells out of a chunk payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkDataError {
    /// No payload has been attached yet.
    #[error("chunk ({x}, {z}) has no payload")]
    Unloaded { x: i32, z: i32 },
    /// A required tag is absent or has the wrong type.
    #[error("chunk payload is missing {0}")]
    MissingField(&'static str),
    /// A cell array has an unexpected size.
    #[error("{field} holds {actual} bytes, expected {expected}")]
    WrongLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// In-chunk coordinates outside the column.
    #[error("cell ({ox}, {y}, {oz}) is outside the chunk")]
    OutOfBounds { ox: usize, y: usize, oz: usize },
}

/// Index of cell `(ox, y, oz)` in the chunk's cell arrays.
pub fn cell_index(ox: usize, y: usize, oz: usize) -> Option<usize> {
    (ox < CHUNK_WIDTH && y < CHUNK_HEIGHT && oz < CHUNK_WIDTH)
        .then(|| y + oz * CHUNK_HEIGHT + ox * CHUNK_HEIGHT * CHUNK_WIDTH)
}

/// A chunk column identified by its chunk coordinates.
///
/// The position is fixed at construction; the payload is attached once the
/// chunk's file has been read.
#[derive(Clone, Debug)]
pub struct Chunk {
    pos: ChunkPos,
    tag: Option<NbtCompound>,
}

impl Chunk {
    /// Creates an empty chunk with no payload.
    pub fn new(x: i32, z: i32) -> Self {
        Self {
            pos: ChunkPos::new(x, z),
            tag: None,
        }
    }

    /// Creates a chunk carrying `tag` as its payload.
    pub fn with_tag(x: i32, z: i32, tag: NbtCompound) -> Self {
        Self {
            pos: ChunkPos::new(x, z),
            tag: Some(tag),
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn x(&self) -> i32 {
        self.pos.x
    }

    pub fn z(&self) -> i32 {
        self.pos.z
    }

    /// The raw payload, if attached.
    pub fn tag(&self) -> Option<&NbtCompound> {
        self.tag.as_ref()
    }

    /// Returns `true` once a payload is attached.
    pub fn is_loaded(&self) -> bool {
        self.tag.is_some()
    }

    /// Attaches or replaces the payload.
    pub fn attach(&mut self, tag: NbtCompound) {
        self.tag = Some(tag);
    }

    /// Block ids for every cell.
    pub fn blocks(&self) -> Result<Vec<u8>, ChunkDataError> {
        Ok(self.cell_bytes(BLOCKS, CHUNK_CELLS)?.to_vec())
    }

    /// Per-cell metadata nibbles.
    pub fn metadata(&self) -> Result<NibbleArray, ChunkDataError> {
        self.nibbles(DATA)
    }

    /// Per-cell sky light nibbles.
    pub fn sky_light(&self) -> Result<NibbleArray, ChunkDataError> {
        self.nibbles(SKY_LIGHT)
    }

    /// Per-cell block light nibbles.
    pub fn block_light(&self) -> Result<NibbleArray, ChunkDataError> {
        self.nibbles(BLOCK_LIGHT)
    }

    /// Block id at `(ox, y, oz)`.
    pub fn block(&self, ox: usize, y: usize, oz: usize) -> Result<u8, ChunkDataError> {
        let index = cell_index(ox, y, oz).ok_or(ChunkDataError::OutOfBounds { ox, y, oz })?;
        Ok(self.cell_bytes(BLOCKS, CHUNK_CELLS)?[index])
    }

    /// Metadata nibble at `(ox, y, oz)`.
    pub fn metadata_at(&self, ox: usize, y: usize, oz: usize) -> Result<u8, ChunkDataError> {
        let index = cell_index(ox, y, oz).ok_or(ChunkDataError::OutOfBounds { ox, y, oz })?;
        let packed = self.cell_bytes(DATA, CHUNK_CELLS / 2)?;
        let byte = packed[index / 2];
        Ok(if index % 2 == 0 { byte & 0x0F } else { byte >> 4 })
    }

    /// Registry entry for the block at `(ox, y, oz)`; `None` for unregistered ids.
    pub fn block_type<'r>(
        &self,
        ox: usize,
        y: usize,
        oz: usize,
        registry: &'r BlockRegistry,
    ) -> Result<Option<&'r BlockType>, ChunkDataError> {
        let id = self.block(ox, y, oz)?;
        Ok(registry.lookup_by_id(u16::from(id)))
    }

    fn nibbles(&self, field: &'static str) -> Result<NibbleArray, ChunkDataError> {
        let packed = self.cell_bytes(field, CHUNK_CELLS / 2)?;
        Ok(NibbleArray::from_bytes(packed.to_vec()))
    }

    fn cell_bytes(&self, field: &'static str, expected: usize) -> Result<&[u8], ChunkDataError> {
        let tag = self.tag.as_ref().ok_or(ChunkDataError::Unloaded {
            x: self.pos.x,
            z: self.pos.z,
        })?;
        let level = tag
            .get::<_, &NbtCompound>(LEVEL)
            .map_err(|_| ChunkDataError::MissingField(LEVEL))?;
        let bytes = level
            .get::<_, &[i8]>(field)
            .map_err(|_| ChunkDataError::MissingField(field))?;
        if bytes.len() != expected {
            return Err(ChunkDataError::WrongLength {
                field,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(bytemuck::cast_slice(bytes))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nibble::pack_nibbles;

    fn level_tag(blocks: Vec<u8>, metadata: Vec<u8>) -> NbtCompound {
        let to_i8 = |v: Vec<u8>| v.into_iter().map(|b| b as i8).collect::<Vec<i8>>();
        let mut level = NbtCompound::new();
        level.insert("xPos", 3i32);
        level.insert("zPos", -2i32);
        level.insert(BLOCKS, to_i8(blocks));
        level.insert(DATA, to_i8(pack_nibbles(&metadata).unwrap()));
        level.insert(SKY_LIGHT, vec![-1i8; CHUNK_CELLS / 2]);
        level.insert(BLOCK_LIGHT, vec![0i8; CHUNK_CELLS / 2]);
        let mut root = NbtCompound::new();
        root.insert(LEVEL, level);
        root
    }

    #[test]
    fn test_cell_index_layout() {
        assert_eq!(cell_index(0, 0, 0), Some(0));
        assert_eq!(cell_index(0, 1, 0), Some(1));
        assert_eq!(cell_index(0, 0, 1), Some(128));
        assert_eq!(cell_index(1, 0, 0), Some(2048));
        assert_eq!(cell_index(15, 127, 15), Some(CHUNK_CELLS - 1));
        assert_eq!(cell_index(16, 0, 0), None);
        assert_eq!(cell_index(0, 128, 0), None);
    }

    #[test]
    fn test_identity_fixed_and_unloaded() {
        let chunk = Chunk::new(-4, 9);
        assert_eq!(chunk.pos(), ChunkPos::new(-4, 9));
        assert!(!chunk.is_loaded());
        assert_eq!(
            chunk.block(0, 0, 0),
            Err(ChunkDataError::Unloaded { x: -4, z: 9 })
        );
    }

    #[test]
    fn test_reads_blocks_and_metadata() {
        let mut blocks = vec![0u8; CHUNK_CELLS];
        let mut metadata = vec![0u8; CHUNK_CELLS];
        let ladder = cell_index(2, 64, 5).unwrap();
        blocks[ladder] = 65;
        metadata[ladder] = 0x5;
        let stone = cell_index(2, 65, 5).unwrap();
        blocks[stone] = 1;
        metadata[stone] = 0xA;

        let mut chunk = Chunk::new(3, -2);
        chunk.attach(level_tag(blocks, metadata));

        assert_eq!(chunk.block(2, 64, 5), Ok(65));
        assert_eq!(chunk.metadata_at(2, 64, 5), Ok(0x5));
        assert_eq!(chunk.metadata_at(2, 65, 5), Ok(0xA));
        assert_eq!(chunk.metadata().unwrap().get(stone), Some(0xA));
        assert_eq!(chunk.sky_light().unwrap().get(0), Some(15));
        assert_eq!(chunk.block_light().unwrap().len(), CHUNK_CELLS);
        assert_eq!(chunk.blocks().unwrap().len(), CHUNK_CELLS);

        let registry = BlockRegistry::global();
        let def = chunk.block_type(2, 64, 5, registry).unwrap().unwrap();
        assert_eq!(def.name, "ladder");
        let face = def.face(chunk.metadata_at(2, 64, 5).unwrap()).unwrap();
        assert_eq!(face.to_string(), "+x");
    }

    #[test]
    fn test_out_of_bounds_cell() {
        let chunk = Chunk::with_tag(0, 0, level_tag(vec![0; CHUNK_CELLS], vec![0; CHUNK_CELLS]));
        assert_eq!(
            chunk.block(0, 200, 0),
            Err(ChunkDataError::OutOfBounds { ox: 0, y: 200, oz: 0 })
        );
    }

    #[test]
    fn test_missing_and_short_fields() {
        let chunk = Chunk::with_tag(0, 0, NbtCompound::new());
        assert_eq!(chunk.blocks(), Err(ChunkDataError::MissingField(LEVEL)));

        let chunk = Chunk::with_tag(0, 0, level_tag(vec![0; 10], vec![0; CHUNK_CELLS]));
        assert_eq!(
            chunk.blocks(),
            Err(ChunkDataError::WrongLength {
                field: BLOCKS,
                expected: CHUNK_CELLS,
                actual: 10,
            })
        );
    }
}
