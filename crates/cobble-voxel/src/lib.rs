//! Block identity, per-cell metadata, and chunked world storage.

pub mod blocks;
pub mod chunk;
pub mod face;
pub mod nibble;
pub mod registry;
pub mod tag_io;
pub mod world;

pub use chunk::{CHUNK_CELLS, CHUNK_HEIGHT, CHUNK_WIDTH, Chunk, ChunkDataError};
pub use face::{Face, ParseFaceError};
pub use nibble::{NibbleArray, NibbleError, pack_nibbles, unpack_nibbles};
pub use registry::{
    BlockKind, BlockRegistry, BlockType, Orientation, OrientationError, ParseBlockError,
    RegistryError, Slot, parse_block,
};
pub use world::{World, WorldError, base36};
