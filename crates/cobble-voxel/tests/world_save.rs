//! End-to-end: world coordinates → sharded chunk file → nibble metadata → registry.

use std::path::Path;

use cobble_config::{Config, WorldConfig};
use cobble_coords::{ChunkPos, split_coords, temporal::split_time};
use cobble_voxel::chunk::cell_index;
use cobble_voxel::tag_io::{read_tree, write_tree};
use cobble_voxel::world::{LEVEL_FILE, chunk_file_path};
use cobble_voxel::{
    BlockRegistry, CHUNK_CELLS, Face, NibbleArray, World, WorldError, parse_block,
};
use quartz_nbt::NbtCompound;

fn write_level(root: &Path, spawn: (i32, i32, i32), time: i64) {
    let mut data = NbtCompound::new();
    data.insert("SpawnX", spawn.0);
    data.insert("SpawnY", spawn.1);
    data.insert("SpawnZ", spawn.2);
    data.insert("Time", time);
    let mut level = NbtCompound::new();
    level.insert("Data", data);
    write_tree(&root.join(LEVEL_FILE), &level).unwrap();
}

fn write_chunk(root: &Path, pos: ChunkPos, blocks: &[u8], metadata: &NibbleArray) {
    let to_i8 = |bytes: &[u8]| bytes.iter().map(|&b| b as i8).collect::<Vec<i8>>();
    let mut level = NbtCompound::new();
    level.insert("xPos", pos.x);
    level.insert("zPos", pos.z);
    level.insert("Blocks", to_i8(blocks));
    level.insert("Data", to_i8(metadata.as_bytes()));
    level.insert("SkyLight", vec![0i8; CHUNK_CELLS / 2]);
    level.insert("BlockLight", vec![0i8; CHUNK_CELLS / 2]);
    let mut tree = NbtCompound::new();
    tree.insert("Level", level);
    write_tree(&chunk_file_path(root, pos.x, pos.z), &tree).unwrap();
}

#[test]
fn ladder_placed_at_negative_coordinates_reads_back_facing() {
    let dir = tempfile::tempdir().unwrap();
    write_level(dir.path(), (-5, 64, -5), 12000);

    let registry = BlockRegistry::global();
    let ladder = registry.lookup_by_name("ladder").unwrap();

    // World column (-1, -17) lives in chunk (-1, -2) at offset (15, 15).
    let (cx, ox, cz, oz) = split_coords(-1, -17);
    assert_eq!((cx, ox, cz, oz), (-1, 15, -2, 15));

    let index = cell_index(ox as usize, 70, oz as usize).unwrap();
    let mut blocks = vec![0u8; CHUNK_CELLS];
    blocks[index] = parse_block("ladder").unwrap().primary as u8;
    let mut metadata = NibbleArray::new(CHUNK_CELLS).unwrap();
    metadata.set(index, ladder.orientation(Face::NegZ).unwrap());
    write_chunk(dir.path(), ChunkPos::new(cx, cz), &blocks, &metadata);

    let config = WorldConfig {
        save_dir: dir.path().to_path_buf(),
        ..Config::default().world
    };
    let mut world = World::from_config(&config).unwrap();
    assert_eq!(world.spawn(), (-5, 64, -5));
    assert_eq!(world.time().map(split_time), Some((18, 0)));

    assert_eq!(world.block_at(-1, 70, -17).unwrap(), 65);
    let chunk = world.chunk(cx, cz).unwrap();
    let meta = chunk.metadata().unwrap().get(index).unwrap();
    let def = chunk
        .block_type(ox as usize, 70, oz as usize, registry)
        .unwrap()
        .unwrap();
    assert_eq!(def.name, "ladder");
    assert_eq!(def.face(meta).unwrap(), Face::NegZ);
}

#[test]
fn chunk_file_lands_in_base36_shard() {
    let dir = tempfile::tempdir().unwrap();
    write_level(dir.path(), (0, 64, 0), 0);
    let pos = ChunkPos::new(-37, 100);
    write_chunk(
        dir.path(),
        pos,
        &vec![0u8; CHUNK_CELLS],
        &NibbleArray::new(CHUNK_CELLS).unwrap(),
    );

    // -37 & 63 == 27 ("r"), 100 & 63 == 36 ("10").
    let expected = dir.path().join("r").join("10").join("c.-11.2s.dat");
    assert!(expected.is_file());
    assert!(read_tree(&expected).is_ok());

    let mut world = World::open(dir.path()).unwrap();
    assert_eq!(world.chunk_path(pos.x, pos.z), expected);
    assert!(world.load_chunk(pos.x, pos.z).is_ok());
    assert!(matches!(
        world.load_chunk(pos.x + 1, pos.z),
        Err(WorldError::ChunkNotFound { .. })
    ));
}
