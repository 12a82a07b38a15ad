//! World save access: the level record, sharded chunk files, and player records.
//!
//! A save directory looks like:
//!
//! ```text
//! <root>/level.dat
//! <root>/<base36(cx & 63)>/<base36(cz & 63)>/c.<base36(cx)>.<base36(cz)>.dat
//! <root>/players/<username>.dat
//! ```
//!
//! [`World`] owns every resident [`Chunk`], at most one per chunk position.
//! All mutation goes through `&mut self`; callers that share a world between
//! threads wrap it in a `Mutex` so each load's check-then-insert stays atomic.

use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use cobble_config::WorldConfig;
use cobble_coords::{ChunkPos, split_coords};
use quartz_nbt::NbtCompound;
use quartz_nbt::io::NbtIoError;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::chunk::{Chunk, ChunkDataError};
use crate::tag_io;

/// Level record file name.
pub const LEVEL_FILE: &str = "level.dat";
/// Directory holding player records.
pub const PLAYER_DIR: &str = "players";
/// Extension of every tag file in a save.
pub const FILE_EXTENSION: &str = "dat";
/// Mask applied to chunk coordinates to pick shard directories.
pub const SHARD_MASK: i32 = 63;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Errors surfaced by world loading. No load is retried or partially applied.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The level record is missing or lacks required fields.
    #[error("corrupt save {}: {reason}", path.display())]
    CorruptSave { path: PathBuf, reason: String },
    /// No file exists for the requested chunk.
    #[error("chunk ({x}, {z}) not found at {}", path.display())]
    ChunkNotFound { x: i32, z: i32, path: PathBuf },
    /// No record exists for the requested player.
    #[error("player {username:?} not found at {}", path.display())]
    PlayerNotFound { username: String, path: PathBuf },
    /// The username cannot name a file inside the players directory.
    #[error("invalid player name {0:?}")]
    InvalidUsername(String),
    /// The tag file exists but could not be read or parsed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: NbtIoError,
    },
    /// A resident chunk's payload is malformed.
    #[error(transparent)]
    ChunkData(#[from] ChunkDataError),
}

/// Encodes `n` in lowercase base 36; negatives get a leading `-`.
pub fn base36(n: i64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut magnitude = n.unsigned_abs();
    let mut digits = Vec::new();
    while magnitude > 0 {
        digits.push(char::from(BASE36_DIGITS[(magnitude % 36) as usize]));
        magnitude /= 36;
    }
    if n < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

/// Path of the chunk file for `(x, z)` relative to a save root.
pub fn chunk_file_path(root: &Path, x: i32, z: i32) -> PathBuf {
    root.join(base36(i64::from(x & SHARD_MASK)))
        .join(base36(i64::from(z & SHARD_MASK)))
        .join(format!(
            "c.{}.{}.{FILE_EXTENSION}",
            base36(i64::from(x)),
            base36(i64::from(z))
        ))
}

/// Owns the level record and every resident chunk of one save directory.
#[derive(Debug)]
pub struct World {
    root: PathBuf,
    spawn: (i32, i32, i32),
    time: Option<i64>,
    chunks: FxHashMap<ChunkPos, Chunk>,
}

impl World {
    /// Opens the save at `root`, reading the spawn point from `level.dat`.
    ///
    /// # Errors
    ///
    /// [`WorldError::CorruptSave`] if `level.dat` is absent or lacks
    /// `Data.SpawnX/Y/Z`; [`WorldError::Io`] if it cannot be parsed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, WorldError> {
        let root = root.into();
        let path = root.join(LEVEL_FILE);
        let corrupt = |reason: &str| WorldError::CorruptSave {
            path: path.clone(),
            reason: reason.to_string(),
        };

        if !path.is_file() {
            return Err(corrupt("level record is missing"));
        }
        let level = tag_io::read_tree(&path).map_err(|source| WorldError::Io {
            path: path.clone(),
            source,
        })?;
        let data = level
            .get::<_, &NbtCompound>("Data")
            .map_err(|_| corrupt("missing Data compound"))?;
        let field = |name: &str| {
            data.get::<_, i32>(name)
                .map_err(|_| corrupt(&format!("missing {name}")))
        };
        let spawn = (field("SpawnX")?, field("SpawnY")?, field("SpawnZ")?);
        let time = data.get::<_, i64>("Time").ok();

        tracing::info!(
            root = %root.display(),
            spawn_x = spawn.0,
            spawn_y = spawn.1,
            spawn_z = spawn.2,
            "world opened"
        );
        Ok(Self {
            root,
            spawn,
            time,
            chunks: FxHashMap::default(),
        })
    }

    /// Opens the configured save and preloads chunks around spawn.
    pub fn from_config(config: &WorldConfig) -> Result<Self, WorldError> {
        let mut world = Self::open(&config.save_dir)?;
        world.preload_spawn(config.spawn_preload_radius)?;
        Ok(world)
    }

    /// Root directory of the save.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Spawn point in world-absolute block coordinates.
    pub fn spawn(&self) -> (i32, i32, i32) {
        self.spawn
    }

    /// Level tick counter, if the level record carries one.
    pub fn time(&self) -> Option<i64> {
        self.time
    }

    /// File that stores chunk `(x, z)`.
    pub fn chunk_path(&self, x: i32, z: i32) -> PathBuf {
        chunk_file_path(&self.root, x, z)
    }

    /// File that stores `username`'s record.
    pub fn player_path(&self, username: &str) -> PathBuf {
        self.root
            .join(PLAYER_DIR)
            .join(format!("{username}.{FILE_EXTENSION}"))
    }

    /// Reads chunk `(x, z)` from disk and makes it resident.
    ///
    /// A chunk already resident at `(x, z)` is replaced by the fresh read.
    /// Nothing is registered unless the read succeeds.
    ///
    /// # Errors
    ///
    /// [`WorldError::ChunkNotFound`] if the chunk file does not exist,
    /// [`WorldError::Io`] if it cannot be read.
    pub fn load_chunk(&mut self, x: i32, z: i32) -> Result<&Chunk, WorldError> {
        let path = self.chunk_path(x, z);
        if !path.is_file() {
            return Err(WorldError::ChunkNotFound { x, z, path });
        }
        let tag = tag_io::read_tree(&path).map_err(|source| WorldError::Io {
            path: path.clone(),
            source,
        })?;
        let chunk = Chunk::with_tag(x, z, tag);

        let chunk = match self.chunks.entry(ChunkPos::new(x, z)) {
            Entry::Occupied(mut slot) => {
                tracing::debug!(x, z, "replacing resident chunk");
                slot.insert(chunk);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(chunk),
        };
        tracing::debug!(x, z, path = %path.display(), "chunk loaded");
        Ok(&*chunk)
    }

    /// Drops chunk `(x, z)` from the resident set.
    pub fn unload_chunk(&mut self, x: i32, z: i32) -> Option<Chunk> {
        self.chunks.remove(&ChunkPos::new(x, z))
    }

    /// The resident chunk at `(x, z)`, if any.
    pub fn chunk(&self, x: i32, z: i32) -> Option<&Chunk> {
        self.chunks.get(&ChunkPos::new(x, z))
    }

    /// Returns `true` if chunk `(x, z)` is resident.
    pub fn is_resident(&self, x: i32, z: i32) -> bool {
        self.chunks.contains_key(&ChunkPos::new(x, z))
    }

    /// Positions of all resident chunks, in no particular order.
    pub fn resident_chunks(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    /// Number of resident chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// Block id at world-absolute `(x, y, z)`, loading the owning chunk if needed.
    pub fn block_at(&mut self, x: i32, y: usize, z: i32) -> Result<u8, WorldError> {
        let (cx, ox, cz, oz) = split_coords(x, z);
        if !self.is_resident(cx, cz) {
            self.load_chunk(cx, cz)?;
        }
        let chunk = self
            .chunk(cx, cz)
            .ok_or_else(|| WorldError::ChunkNotFound {
                x: cx,
                z: cz,
                path: self.chunk_path(cx, cz),
            })?;
        // Offsets from split_coords are always in 0..16.
        Ok(chunk.block(ox as usize, y, oz as usize)?)
    }

    /// Loads every on-disk chunk within taxicab `radius` of the spawn chunk.
    ///
    /// Missing chunk files are skipped. Returns how many chunks were loaded.
    pub fn preload_spawn(&mut self, radius: u32) -> Result<usize, WorldError> {
        let center = ChunkPos::containing(self.spawn.0, self.spawn.2);
        let reach = i32::try_from(radius).unwrap_or(i32::MAX);
        let mut loaded = 0;

        for dx in -reach..=reach {
            for dz in -reach..=reach {
                let (Some(x), Some(z)) = (center.x.checked_add(dx), center.z.checked_add(dz))
                else {
                    continue;
                };
                if center.taxicab(ChunkPos::new(x, z)) > u64::from(radius) {
                    continue;
                }
                match self.load_chunk(x, z) {
                    Ok(_) => loaded += 1,
                    Err(WorldError::ChunkNotFound { .. }) => {}
                    Err(err) => return Err(err),
                }
            }
        }

        tracing::info!(radius, loaded, "spawn chunks preloaded");
        Ok(loaded)
    }

    /// Reads `username`'s record. Records are never cached.
    ///
    /// # Errors
    ///
    /// [`WorldError::InvalidUsername`] for names that would escape the players
    /// directory, [`WorldError::PlayerNotFound`] if no record exists,
    /// [`WorldError::Io`] if it cannot be read.
    pub fn load_player(&self, username: &str) -> Result<NbtCompound, WorldError> {
        if username.is_empty()
            || username.contains(['/', '\\', '\0'])
            || username.contains("..")
        {
            return Err(WorldError::InvalidUsername(username.to_string()));
        }
        let path = self.player_path(username);
        if !path.is_file() {
            return Err(WorldError::PlayerNotFound {
                username: username.to_string(),
                path,
            });
        }
        let record = tag_io::read_tree(&path).map_err(|source| WorldError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(username, "player record loaded");
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use super::*;
    use crate::chunk::CHUNK_CELLS;

    fn write_level(root: &Path, spawn: (i32, i32, i32)) {
        let mut data = NbtCompound::new();
        data.insert("SpawnX", spawn.0);
        data.insert("SpawnY", spawn.1);
        data.insert("SpawnZ", spawn.2);
        data.insert("Time", 6000i64);
        let mut level = NbtCompound::new();
        level.insert("Data", data);
        tag_io::write_tree(&root.join(LEVEL_FILE), &level).unwrap();
    }

    fn write_chunk(root: &Path, x: i32, z: i32, fill: u8) {
        let mut level = NbtCompound::new();
        level.insert("xPos", x);
        level.insert("zPos", z);
        level.insert("Blocks", vec![fill as i8; CHUNK_CELLS]);
        level.insert("Data", vec![0i8; CHUNK_CELLS / 2]);
        let mut tree = NbtCompound::new();
        tree.insert("Level", level);
        tag_io::write_tree(&chunk_file_path(root, x, z), &tree).unwrap();
    }

    fn new_world(spawn: (i32, i32, i32)) -> (tempfile::TempDir, World) {
        let dir = tempfile::tempdir().unwrap();
        write_level(dir.path(), spawn);
        let world = World::open(dir.path()).unwrap();
        (dir, world)
    }

    #[test]
    fn test_base36() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(9), "9");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(63), "1r");
        assert_eq!(base36(-1), "-1");
        assert_eq!(base36(-36), "-10");
        assert_eq!(base36(i64::from(i32::MAX)), "zik0zj");
        assert_eq!(base36(i64::from(i32::MIN)), "-zik0zk");
        assert!(base36(i64::MIN).starts_with('-'));
    }

    #[test]
    fn test_chunk_path_shards_by_masked_coords() {
        let root = Path::new("/saves/w");
        assert_eq!(
            chunk_file_path(root, 0, 0),
            PathBuf::from("/saves/w/0/0/c.0.0.dat")
        );
        assert_eq!(
            chunk_file_path(root, -1, 2),
            PathBuf::from("/saves/w/1r/2/c.-1.2.dat")
        );
        assert_eq!(
            chunk_file_path(root, 100, -64),
            PathBuf::from("/saves/w/10/0/c.2s.-1s.dat")
        );
    }

    #[test]
    fn test_open_reads_spawn_and_time() {
        let (_dir, world) = new_world((12, 70, -40));
        assert_eq!(world.spawn(), (12, 70, -40));
        assert_eq!(world.time(), Some(6000));
        assert_eq!(world.loaded_count(), 0);
    }

    #[test]
    fn test_open_without_level_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            World::open(dir.path()),
            Err(WorldError::CorruptSave { .. })
        ));
    }

    #[test]
    fn test_open_missing_spawn_field_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = NbtCompound::new();
        data.insert("SpawnX", 1i32);
        data.insert("SpawnZ", 1i32);
        let mut level = NbtCompound::new();
        level.insert("Data", data);
        tag_io::write_tree(&dir.path().join(LEVEL_FILE), &level).unwrap();

        match World::open(dir.path()) {
            Err(WorldError::CorruptSave { reason, .. }) => assert!(reason.contains("SpawnY")),
            other => panic!("expected CorruptSave, got {other:?}"),
        }
    }

    #[test]
    fn test_open_unparseable_level_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LEVEL_FILE), b"garbage").unwrap();
        assert!(matches!(World::open(dir.path()), Err(WorldError::Io { .. })));
    }

    #[test]
    fn test_load_chunk_registers_once() {
        let (dir, mut world) = new_world((0, 64, 0));
        write_chunk(dir.path(), -3, 5, 1);

        let chunk = world.load_chunk(-3, 5).unwrap();
        assert_eq!((chunk.x(), chunk.z()), (-3, 5));
        assert_eq!(chunk.block(0, 0, 0), Ok(1));
        assert!(world.is_resident(-3, 5));

        // A second load replaces the first entry rather than adding another.
        write_chunk(dir.path(), -3, 5, 2);
        world.load_chunk(-3, 5).unwrap();
        assert_eq!(world.loaded_count(), 1);
        assert_eq!(world.chunk(-3, 5).unwrap().block(0, 0, 0), Ok(2));
        assert_eq!(world.resident_chunks().collect::<Vec<_>>(), vec![ChunkPos::new(-3, 5)]);
    }

    #[test]
    fn test_missing_chunk_is_not_registered() {
        let (_dir, mut world) = new_world((0, 64, 0));
        let err = world.load_chunk(7, 7).unwrap_err();
        assert!(matches!(err, WorldError::ChunkNotFound { x: 7, z: 7, .. }));
        assert!(!world.is_resident(7, 7));
        assert_eq!(world.loaded_count(), 0);
    }

    #[test]
    fn test_unload_chunk() {
        let (dir, mut world) = new_world((0, 64, 0));
        write_chunk(dir.path(), 0, 0, 3);
        world.load_chunk(0, 0).unwrap();
        assert!(world.unload_chunk(0, 0).is_some());
        assert!(!world.is_resident(0, 0));
        assert!(world.unload_chunk(0, 0).is_none());
    }

    #[test]
    fn test_block_at_negative_coordinates() {
        let (dir, mut world) = new_world((0, 64, 0));
        write_chunk(dir.path(), -1, -1, 4);
        assert_eq!(world.block_at(-1, 10, -16).unwrap(), 4);
        assert!(world.is_resident(-1, -1));
        assert!(matches!(
            world.block_at(16, 10, 0),
            Err(WorldError::ChunkNotFound { x: 1, z: 0, .. })
        ));
        assert!(matches!(
            world.block_at(-1, 500, -1),
            Err(WorldError::ChunkData(ChunkDataError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_preload_spawn_within_taxicab_radius() {
        let (dir, mut world) = new_world((-20, 64, 40));
        // Spawn column (-20, 40) lives in chunk (-2, 2).
        for (x, z) in [(-2, 2), (-1, 2), (-2, 3), (-1, 3), (0, 2)] {
            write_chunk(dir.path(), x, z, 1);
        }
        assert_eq!(world.preload_spawn(1).unwrap(), 3);
        assert!(world.is_resident(-2, 2));
        assert!(world.is_resident(-1, 2));
        assert!(world.is_resident(-2, 3));
        assert!(!world.is_resident(-1, 3)); // distance 2
        assert!(!world.is_resident(0, 2));
    }

    #[test]
    fn test_from_config_preloads() {
        let dir = tempfile::tempdir().unwrap();
        write_level(dir.path(), (5, 64, 5));
        write_chunk(dir.path(), 0, 0, 1);
        let config = WorldConfig {
            save_dir: dir.path().to_path_buf(),
            spawn_preload_radius: 0,
        };
        let world = World::from_config(&config).unwrap();
        assert_eq!(world.loaded_count(), 1);
    }

    #[test]
    fn test_load_player() {
        let (dir, world) = new_world((0, 64, 0));
        let mut record = NbtCompound::new();
        record.insert("Health", 20i16);
        tag_io::write_tree(&dir.path().join(PLAYER_DIR).join("notch.dat"), &record).unwrap();

        let loaded = world.load_player("notch").unwrap();
        assert_eq!(loaded.get::<_, i16>("Health").unwrap(), 20);

        assert!(matches!(
            world.load_player("jeb"),
            Err(WorldError::PlayerNotFound { .. })
        ));
    }

    #[test]
    fn test_load_player_rereads_disk() {
        let (dir, world) = new_world((0, 64, 0));
        let path = world.player_path("alex");
        let mut record = NbtCompound::new();
        record.insert("Health", 20i16);
        tag_io::write_tree(&path, &record).unwrap();
        assert!(world.load_player("alex").is_ok());

        std::fs::remove_file(dir.path().join(PLAYER_DIR).join("alex.dat")).unwrap();
        assert!(matches!(
            world.load_player("alex"),
            Err(WorldError::PlayerNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_usernames_rejected() {
        let (_dir, world) = new_world((0, 64, 0));
        for name in ["", "../level", "a/b", "a\\b"] {
            assert!(matches!(
                world.load_player(name),
                Err(WorldError::InvalidUsername(_))
            ));
        }
    }

    #[test]
    fn test_shared_world_keeps_one_chunk_per_key() {
        let (dir, world) = new_world((0, 64, 0));
        write_chunk(dir.path(), 2, 2, 9);
        let world = Arc::new(Mutex::new(world));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let world = Arc::clone(&world);
                thread::spawn(move || {
                    let mut world = world.lock().unwrap();
                    world.load_chunk(2, 2).map(|c| c.pos())
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), ChunkPos::new(2, 2));
        }
        assert_eq!(world.lock().unwrap().loaded_count(), 1);
    }
}
