//! Reading and writing gzip-compressed tag trees on disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use quartz_nbt::io::{Flavor, NbtIoError};
use quartz_nbt::NbtCompound;

/// Reads the root compound of a gzip-compressed tag file.
pub fn read_tree(path: &Path) -> Result<NbtCompound, NbtIoError> {
    let mut reader = BufReader::new(File::open(path)?);
    let (root, _name) = quartz_nbt::io::read_nbt(&mut reader, Flavor::GzCompressed)?;
    Ok(root)
}

/// Writes `root` as a gzip-compressed tag file, creating parent directories.
pub fn write_tree(path: &Path, root: &NbtCompound) -> Result<(), NbtIoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    quartz_nbt::io::write_nbt(&mut writer, None, root, Flavor::GzCompressed)?;
    writer.flush()?;
    Ok(())
}
