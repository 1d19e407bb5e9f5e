//! Block-oriented reads from on-disk tile files.
//!
//! Block `n` of a tile lives at byte offset `n * 2048`; no record spans a
//! 2048-byte boundary. Each read opens the file, seeks, reads exactly one
//! record and closes the handle again, so a failed lookup never holds a
//! descriptor open.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::block::{GridBlock, BLOCK_BYTES};
use crate::error::{Result, TerrainError};

/// Reads fixed-size grid blocks out of tile files in a data directory.
#[derive(Debug)]
pub struct TileStore {
    data_dir: PathBuf,
}

impl TileStore {
    /// Create a store over the given data directory.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidDataDir`] if the path does not exist
    /// or is not a directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            return Err(TerrainError::InvalidDataDir { path: data_dir });
        }
        Ok(Self { data_dir })
    }

    /// The directory containing the tile files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of a tile file inside the data directory.
    pub fn tile_path(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }

    /// Read and decode one block of a tile.
    ///
    /// # Errors
    ///
    /// - [`TerrainError::MissingTile`] if the file cannot be opened.
    /// - [`TerrainError::TruncatedRead`] if the seek or the full 2048-byte
    ///   read cannot be satisfied.
    pub fn read_block(&self, filename: &str, block: u32) -> Result<GridBlock> {
        let path = self.tile_path(filename);

        let mut file = File::open(&path).map_err(|_| TerrainError::MissingTile {
            path: path.clone(),
        })?;

        let offset = u64::from(block) * BLOCK_BYTES as u64;
        file.seek(SeekFrom::Start(offset))
            .map_err(|_| TerrainError::TruncatedRead {
                path: path.clone(),
                block,
            })?;

        let mut buf = [0u8; BLOCK_BYTES];
        file.read_exact(&mut buf)
            .map_err(|_| TerrainError::TruncatedRead { path, block })?;

        Ok(GridBlock::from_bytes(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Write a tile file whose block `n` has spacing 30 and version `n + 1`.
    fn create_tile(dir: &Path, filename: &str, blocks: u16) {
        let mut data = Vec::with_capacity(blocks as usize * BLOCK_BYTES);
        for n in 0..blocks {
            let mut block = GridBlock {
                version: n + 1,
                spacing: 30,
                ..GridBlock::default()
            };
            block.set_height(3, 7, 100 * n as i16);
            data.extend_from_slice(&block.to_bytes());
        }
        let mut file = File::create(dir.join(filename)).unwrap();
        file.write_all(&data).unwrap();
    }

    #[test]
    fn test_read_block_by_number() {
        let tmp = TempDir::new().unwrap();
        create_tile(tmp.path(), "N47E008.DAT", 3);

        let store = TileStore::new(tmp.path()).unwrap();
        let block = store.read_block("N47E008.DAT", 2).unwrap();

        assert_eq!(block.version, 3);
        assert_eq!(block.spacing, 30);
        assert_eq!(block.height(3, 7), Some(200));
    }

    #[test]
    fn test_missing_tile() {
        let tmp = TempDir::new().unwrap();
        let store = TileStore::new(tmp.path()).unwrap();

        let err = store.read_block("N00E000.DAT", 0).unwrap_err();
        assert!(matches!(err, TerrainError::MissingTile { .. }));
    }

    #[test]
    fn test_read_past_end_of_file() {
        let tmp = TempDir::new().unwrap();
        create_tile(tmp.path(), "N47E008.DAT", 2);

        let store = TileStore::new(tmp.path()).unwrap();
        let err = store.read_block("N47E008.DAT", 5).unwrap_err();
        assert!(matches!(err, TerrainError::TruncatedRead { block: 5, .. }));
    }

    #[test]
    fn test_short_final_block() {
        let tmp = TempDir::new().unwrap();
        let mut file = File::create(tmp.path().join("N47E008.DAT")).unwrap();
        file.write_all(&[0u8; BLOCK_BYTES + 100]).unwrap();

        let store = TileStore::new(tmp.path()).unwrap();
        assert!(store.read_block("N47E008.DAT", 0).is_ok());
        let err = store.read_block("N47E008.DAT", 1).unwrap_err();
        assert!(matches!(err, TerrainError::TruncatedRead { block: 1, .. }));
    }

    #[test]
    fn test_invalid_data_dir() {
        let err = TileStore::new("/definitely/not/a/real/dir").unwrap_err();
        assert!(matches!(err, TerrainError::InvalidDataDir { .. }));
    }

    #[test]
    fn test_data_dir_must_be_directory() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("plain_file");
        File::create(&file_path).unwrap();

        let err = TileStore::new(&file_path).unwrap_err();
        assert!(matches!(err, TerrainError::InvalidDataDir { .. }));
    }
}
