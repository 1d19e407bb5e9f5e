//! Altitude query service over a tile data directory.
//!
//! [`TerrainService`] orchestrates one lookup per coordinate: locate the
//! block, derive the tile filename, read (or re-use) the block, extract the
//! height. Batches run synchronously in input order and stop at the first
//! failure, handing back whatever altitudes were already resolved.
//!
//! The service is an explicitly constructed object: the tile directory is
//! supplied at build time and immutable afterwards.
//!
//! ```ignore
//! use terradat::{Coordinate, TerrainService};
//!
//! let service = TerrainService::builder("/data/terrain").build()?;
//! let heights = service.coordinate_heights(&[Coordinate::new(47.3, 8.5)])?;
//! println!("ground at {}m", heights[0]);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;

use crate::block::GridBlock;
use crate::error::{BatchAbort, Result, TerrainError};
use crate::filename::tile_filename;
use crate::geodesy::Coordinate;
use crate::index::{BlockIndexer, DEFAULT_GRID_SPACING};
use crate::path::{FixedStepSampler, PathSample, PathSampler};
use crate::store::TileStore;

/// Statistics about block cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of blocks currently in the cache.
    pub entry_count: u64,
    /// Number of lookups served from cache.
    pub hit_count: u64,
    /// Number of lookups that went to disk.
    pub miss_count: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Result of a path query: altitudes along the sampled path plus the
/// distances reported by the sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct PathHeights {
    /// One altitude per sampled coordinate, in path order.
    pub altitudes: Vec<f64>,
    /// Great-circle length of the whole path in meters.
    pub total_distance: f64,
    /// Distance from the last intermediate sample to the end point.
    pub final_segment_distance: f64,
}

/// Synchronous altitude query service over a directory of grid tiles.
///
/// Each lookup opens, reads and closes the tile file independently; decoded
/// blocks are kept in a size-bounded cache keyed by `(filename, block)` as
/// a pure optimization that never changes observable results.
pub struct TerrainService {
    store: TileStore,
    indexer: BlockIndexer,
    sampler: Box<dyn PathSampler + Send + Sync>,
    block_cache: Cache<(String, u32), Arc<GridBlock>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl std::fmt::Debug for TerrainService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainService")
            .field("store", &self.store)
            .field("indexer", &self.indexer)
            .field("hit_count", &self.hit_count)
            .field("miss_count", &self.miss_count)
            .finish_non_exhaustive()
    }
}

impl TerrainService {
    /// Create a service with default grid spacing and cache size.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidDataDir`] if `data_dir` is not a
    /// readable directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::builder(data_dir).build()
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(data_dir: P) -> TerrainServiceBuilder {
        TerrainServiceBuilder::new(data_dir)
    }

    /// Look up the altitude for each coordinate, preserving input order.
    ///
    /// Processing stops at the first coordinate that fails: the returned
    /// [`BatchAbort`] carries the altitudes accumulated before the failure
    /// together with the error. An empty input yields an empty result.
    pub fn coordinate_heights(
        &self,
        coordinates: &[Coordinate],
    ) -> std::result::Result<Vec<f64>, BatchAbort> {
        let mut altitudes = Vec::with_capacity(coordinates.len());
        for &coordinate in coordinates {
            match self.lookup(coordinate) {
                Ok(height) => altitudes.push(height),
                Err(error) => {
                    return Err(BatchAbort {
                        partial: altitudes,
                        error,
                    })
                }
            }
        }
        Ok(altitudes)
    }

    /// Sample the path between two coordinates and look up every sample.
    ///
    /// Sampling is delegated to the configured [`PathSampler`]; the lookup
    /// behaves exactly like [`TerrainService::coordinate_heights`],
    /// including the abort-on-first-failure contract.
    pub fn path_heights(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> std::result::Result<PathHeights, BatchAbort> {
        let PathSample {
            coordinates,
            total_distance,
            final_segment_distance,
        } = self.sampler.path_to_coords(from, to);

        let altitudes = self.coordinate_heights(&coordinates)?;

        Ok(PathHeights {
            altitudes,
            total_distance,
            final_segment_distance,
        })
    }

    /// Area queries are not served by this data source.
    ///
    /// Always fails with [`TerrainError::Unsupported`] without touching the
    /// filesystem.
    pub fn carpet_heights(
        &self,
        _south_west: Coordinate,
        _north_east: Coordinate,
        _stats_only: bool,
    ) -> Result<Vec<f64>> {
        Err(TerrainError::Unsupported {
            operation: "carpet",
        })
    }

    /// Resolve one coordinate to its ground elevation in meters.
    fn lookup(&self, coordinate: Coordinate) -> Result<f64> {
        let location = self.indexer.locate(coordinate);
        let filename = tile_filename(coordinate);
        let block = self.load_block(&filename, location.block)?;

        block
            .height(location.idx_x, location.idx_y)
            .map(f64::from)
            .ok_or(TerrainError::GridIndexOutOfRange {
                x: location.idx_x,
                y: location.idx_y,
            })
    }

    /// Fetch a decoded block from the cache or from disk.
    fn load_block(&self, filename: &str, block: u32) -> Result<Arc<GridBlock>> {
        let key = (filename.to_string(), block);
        if let Some(cached) = self.block_cache.get(&key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }
        self.miss_count.fetch_add(1, Ordering::Relaxed);

        let decoded = Arc::new(self.store.read_block(filename, block)?);
        self.block_cache.insert(key, decoded.clone());
        Ok(decoded)
    }

    /// The directory containing the tile files.
    pub fn data_dir(&self) -> &Path {
        self.store.data_dir()
    }

    /// The grid spacing in meters the service indexes with.
    pub fn grid_spacing(&self) -> u32 {
        self.indexer.grid_spacing()
    }

    /// Get block cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.block_cache.entry_count(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }

    /// Maximum number of decoded blocks kept in memory.
    pub fn cache_capacity(&self) -> u64 {
        self.block_cache.policy().max_capacity().unwrap_or(0)
    }

    /// Clear all decoded blocks from the cache.
    pub fn clear_cache(&self) {
        self.block_cache.invalidate_all();
    }
}

/// Builder for creating [`TerrainService`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use terradat::TerrainService;
///
/// let service = TerrainService::builder("/data/terrain")
///     .grid_spacing(30)
///     .cache_size(256)
///     .build()?;
/// ```
pub struct TerrainServiceBuilder {
    data_dir: PathBuf,
    grid_spacing: u32,
    cache_size: u64,
    sampler: Option<Box<dyn PathSampler + Send + Sync>>,
}

impl TerrainServiceBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            grid_spacing: DEFAULT_GRID_SPACING,
            cache_size: 64,
            sampler: None,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `TERRADAT_DATA_DIR` | Directory containing .DAT tiles | Required |
    /// | `TERRADAT_CACHE_SIZE` | Maximum decoded blocks in cache | 64 |
    /// | `TERRADAT_GRID_SPACING` | Sample spacing in meters | 30 |
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidDataDir`] if `TERRADAT_DATA_DIR` is
    /// not set.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("TERRADAT_DATA_DIR").map_err(|_| {
            TerrainError::InvalidDataDir {
                path: PathBuf::from("(TERRADAT_DATA_DIR is not set)"),
            }
        })?;

        let cache_size: u64 = std::env::var("TERRADAT_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64);

        let grid_spacing: u32 = std::env::var("TERRADAT_GRID_SPACING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_GRID_SPACING);

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            grid_spacing,
            cache_size,
            sampler: None,
        })
    }

    /// Set the data directory.
    ///
    /// Overrides the directory set in the constructor or from environment.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the grid spacing in meters between elevation samples.
    ///
    /// Must match the spacing the tiles were generated with. Default is
    /// 30 m.
    pub fn grid_spacing(mut self, meters: u32) -> Self {
        self.grid_spacing = meters;
        self
    }

    /// Set the maximum number of decoded blocks to keep in cache.
    ///
    /// Default is 64 blocks (~128 KiB).
    pub fn cache_size(mut self, size: u64) -> Self {
        self.cache_size = size;
        self
    }

    /// Replace the default fixed-step path sampler.
    pub fn path_sampler(mut self, sampler: impl PathSampler + Send + Sync + 'static) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Build the [`TerrainService`].
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidDataDir`] if the data directory does
    /// not exist or is not a directory.
    pub fn build(self) -> Result<TerrainService> {
        let store = TileStore::new(&self.data_dir)?;
        let grid_spacing = self.grid_spacing;

        Ok(TerrainService {
            store,
            indexer: BlockIndexer::new(grid_spacing),
            sampler: self
                .sampler
                .unwrap_or_else(|| Box::new(FixedStepSampler::new(f64::from(grid_spacing)))),
            block_cache: Cache::builder().max_capacity(self.cache_size).build(),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;

    /// Write the tile covering `coords[0].0` with the given heights planted
    /// at the block addresses the indexer resolves. All coordinates must
    /// fall inside the same tile; untouched blocks are zero-filled.
    fn create_tile(dir: &Path, coords: &[(Coordinate, i16)]) {
        let indexer = BlockIndexer::default();
        let filename = tile_filename(coords[0].0);

        let mut blocks: BTreeMap<u32, GridBlock> = BTreeMap::new();
        let mut last = 0;
        for &(coordinate, height) in coords {
            let loc = indexer.locate(coordinate);
            last = last.max(loc.block);
            blocks
                .entry(loc.block)
                .or_default()
                .set_height(loc.idx_x, loc.idx_y, height);
        }

        let mut data = Vec::new();
        for n in 0..=last {
            let block = blocks.get(&n).cloned().unwrap_or_default();
            data.extend_from_slice(&block.to_bytes());
        }
        std::fs::write(dir.join(filename), data).unwrap();
    }

    #[test]
    fn test_single_coordinate() {
        let tmp = TempDir::new().unwrap();
        let c = Coordinate::new(47.05, 8.04);
        create_tile(tmp.path(), &[(c, 432)]);

        let service = TerrainService::new(tmp.path()).unwrap();
        let altitudes = service.coordinate_heights(&[c]).unwrap();
        assert_eq!(altitudes, vec![432.0]);
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let tmp = TempDir::new().unwrap();
        let a = Coordinate::new(47.01, 8.01);
        let b = Coordinate::new(47.03, 8.05);
        let c = Coordinate::new(47.06, 8.02);
        create_tile(tmp.path(), &[(a, 100), (b, 200), (c, 300)]);

        let service = TerrainService::new(tmp.path()).unwrap();
        let altitudes = service.coordinate_heights(&[a, b, c]).unwrap();
        assert_eq!(altitudes, vec![100.0, 200.0, 300.0]);

        let altitudes = service.coordinate_heights(&[c, a, b]).unwrap();
        assert_eq!(altitudes, vec![300.0, 100.0, 200.0]);
    }

    #[test]
    fn test_empty_batch() {
        let tmp = TempDir::new().unwrap();
        let service = TerrainService::new(tmp.path()).unwrap();
        assert_eq!(service.coordinate_heights(&[]).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_batch_aborts_on_first_failure_with_partial() {
        let tmp = TempDir::new().unwrap();
        let good = Coordinate::new(47.05, 8.04);
        let missing = Coordinate::new(12.5, 44.5);
        create_tile(tmp.path(), &[(good, 555)]);

        let service = TerrainService::new(tmp.path()).unwrap();
        let abort = service
            .coordinate_heights(&[good, missing, good])
            .unwrap_err();

        // the first coordinate resolved, the second aborted the batch and
        // the third was never attempted
        assert_eq!(abort.partial, vec![555.0]);
        assert!(matches!(abort.error, TerrainError::MissingTile { .. }));
    }

    #[test]
    fn test_multiple_tiles() {
        let tmp = TempDir::new().unwrap();
        let zurich = Coordinate::new(47.05, 8.04);
        let capetown = Coordinate::new(-33.05, 18.03);
        create_tile(tmp.path(), &[(zurich, 408)]);
        create_tile(tmp.path(), &[(capetown, 25)]);

        let service = TerrainService::new(tmp.path()).unwrap();
        let altitudes = service.coordinate_heights(&[zurich, capetown]).unwrap();
        assert_eq!(altitudes, vec![408.0, 25.0]);
    }

    #[test]
    fn test_block_cache_hit() {
        let tmp = TempDir::new().unwrap();
        let c = Coordinate::new(47.05, 8.04);
        create_tile(tmp.path(), &[(c, 432)]);

        let service = TerrainService::new(tmp.path()).unwrap();
        let _ = service.coordinate_heights(&[c]).unwrap();
        let stats = service.cache_stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 0);

        let _ = service.coordinate_heights(&[c]).unwrap();
        let stats = service.cache_stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
    }

    #[test]
    fn test_cached_results_are_identical() {
        let tmp = TempDir::new().unwrap();
        let c = Coordinate::new(47.05, 8.04);
        create_tile(tmp.path(), &[(c, 432)]);

        let service = TerrainService::new(tmp.path()).unwrap();
        let cold = service.coordinate_heights(&[c]).unwrap();
        let warm = service.coordinate_heights(&[c]).unwrap();
        assert_eq!(cold, warm);
    }

    #[test]
    fn test_clear_cache() {
        let tmp = TempDir::new().unwrap();
        let c = Coordinate::new(47.05, 8.04);
        create_tile(tmp.path(), &[(c, 432)]);

        let service = TerrainService::new(tmp.path()).unwrap();
        let _ = service.coordinate_heights(&[c]).unwrap();
        service.clear_cache();
        let _ = service.coordinate_heights(&[c]).unwrap();
        assert_eq!(service.cache_stats().miss_count, 2);
    }

    #[test]
    fn test_path_heights() {
        let tmp = TempDir::new().unwrap();
        let from = Coordinate::new(47.001, 8.001);
        let to = Coordinate::new(47.001, 8.004);

        // plant the same height at every coordinate the default sampler
        // will produce for this path
        let sampler = FixedStepSampler::new(f64::from(DEFAULT_GRID_SPACING));
        let sample = sampler.path_to_coords(from, to);
        let planted: Vec<(Coordinate, i16)> =
            sample.coordinates.iter().map(|&c| (c, 77)).collect();
        create_tile(tmp.path(), &planted);

        let service = TerrainService::new(tmp.path()).unwrap();
        let heights = service.path_heights(from, to).unwrap();

        assert_eq!(heights.altitudes.len(), sample.coordinates.len());
        assert!(heights.altitudes.iter().all(|&h| h == 77.0));
        assert!((heights.total_distance - sample.total_distance).abs() < 1e-9);
        assert!(
            (heights.final_segment_distance - sample.final_segment_distance).abs() < 1e-9
        );
    }

    #[test]
    fn test_path_heights_missing_tile() {
        let tmp = TempDir::new().unwrap();
        let service = TerrainService::new(tmp.path()).unwrap();

        let abort = service
            .path_heights(Coordinate::new(12.5, 44.5), Coordinate::new(12.5, 44.6))
            .unwrap_err();
        assert!(abort.partial.is_empty());
        assert!(matches!(abort.error, TerrainError::MissingTile { .. }));
    }

    #[test]
    fn test_carpet_heights_always_unsupported() {
        let tmp = TempDir::new().unwrap();
        let service = TerrainService::new(tmp.path()).unwrap();

        for stats_only in [false, true] {
            let err = service
                .carpet_heights(
                    Coordinate::new(47.0, 8.0),
                    Coordinate::new(48.0, 9.0),
                    stats_only,
                )
                .unwrap_err();
            assert!(matches!(
                err,
                TerrainError::Unsupported { operation: "carpet" }
            ));
        }

        // the rejection happens before any tile is touched
        let stats = service.cache_stats();
        assert_eq!(stats.hit_count + stats.miss_count, 0);
    }

    #[test]
    fn test_invalid_data_dir_at_build() {
        let err = TerrainService::new("/definitely/not/a/real/dir").unwrap_err();
        assert!(matches!(err, TerrainError::InvalidDataDir { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failing_queries_leak_no_descriptors() {
        fn open_fds() -> usize {
            std::fs::read_dir("/proc/self/fd").unwrap().count()
        }

        let tmp = TempDir::new().unwrap();
        let service = TerrainService::new(tmp.path()).unwrap();
        let missing = Coordinate::new(12.5, 44.5);

        // warm up any lazily opened descriptors
        let _ = service.coordinate_heights(&[missing]);
        let before = open_fds();
        for _ in 0..100 {
            assert!(service.coordinate_heights(&[missing]).is_err());
        }
        assert_eq!(open_fds(), before);
    }

    #[test]
    fn test_builder_from_env() {
        let tmp = TempDir::new().unwrap();

        let orig_dir = std::env::var("TERRADAT_DATA_DIR").ok();
        let orig_size = std::env::var("TERRADAT_CACHE_SIZE").ok();

        std::env::set_var("TERRADAT_DATA_DIR", tmp.path());
        std::env::set_var("TERRADAT_CACHE_SIZE", "16");

        let service = TerrainServiceBuilder::from_env().unwrap().build().unwrap();
        assert_eq!(service.data_dir(), tmp.path());
        assert_eq!(service.cache_capacity(), 16);
        assert_eq!(service.grid_spacing(), DEFAULT_GRID_SPACING);

        match orig_dir {
            Some(v) => std::env::set_var("TERRADAT_DATA_DIR", v),
            None => std::env::remove_var("TERRADAT_DATA_DIR"),
        }
        match orig_size {
            Some(v) => std::env::set_var("TERRADAT_CACHE_SIZE", v),
            None => std::env::remove_var("TERRADAT_CACHE_SIZE"),
        }
    }

    #[test]
    fn test_custom_path_sampler() {
        struct TwoPointSampler;
        impl PathSampler for TwoPointSampler {
            fn path_to_coords(&self, from: Coordinate, to: Coordinate) -> PathSample {
                PathSample {
                    coordinates: vec![from, to],
                    total_distance: crate::geodesy::distance_m(from, to),
                    final_segment_distance: crate::geodesy::distance_m(from, to),
                }
            }
        }

        let tmp = TempDir::new().unwrap();
        let from = Coordinate::new(47.01, 8.01);
        let to = Coordinate::new(47.02, 8.02);
        create_tile(tmp.path(), &[(from, 10), (to, 20)]);

        let service = TerrainService::builder(tmp.path())
            .path_sampler(TwoPointSampler)
            .build()
            .unwrap();

        let heights = service.path_heights(from, to).unwrap();
        assert_eq!(heights.altitudes, vec![10.0, 20.0]);
    }
}
