//! Coordinate types for world, chunk, and region positions.
//!
//! The world is addressed on the horizontal X/Z plane. World positions are
//! `glam::Vec3` in world units; chunks and regions are integer grids layered
//! on top of it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Z coordinate in chunk space
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts a world position to the chunk containing it.
    ///
    /// Uses floor division so negative positions land in negative chunks.
    #[must_use]
    pub fn from_world(position: Vec3, chunk_size: f32) -> Self {
        Self {
            x: (position.x / chunk_size).floor() as i32,
            z: (position.z / chunk_size).floor() as i32,
        }
    }

    /// Converts to world position (minimum corner of the chunk, y = 0).
    #[must_use]
    pub fn to_world(self, chunk_size: f32) -> Vec3 {
        Vec3::new(self.x as f32 * chunk_size, 0.0, self.z as f32 * chunk_size)
    }

    /// Converts to the region containing this chunk.
    #[must_use]
    pub const fn to_region(self, region_size: i32) -> RegionCoord {
        RegionCoord::from_chunk(self, region_size)
    }

    /// Iterates over the square of chunks within `radius` of this one,
    /// row by row, including the center.
    pub fn square(self, radius: u32) -> impl Iterator<Item = ChunkCoord> {
        let r = radius as i32;
        (-r..=r).flat_map(move |dz| (-r..=r).map(move |dx| Self::new(self.x + dx, self.z + dz)))
    }
}

/// Region coordinate: a `region_size x region_size` block of chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RegionCoord {
    /// Region X.
    pub x: i32,
    /// Region Z.
    pub z: i32,
}

impl RegionCoord {
    /// Creates a new region coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Creates from chunk coordinates (floor division by `region_size`).
    #[must_use]
    pub const fn from_chunk(chunk: ChunkCoord, region_size: i32) -> Self {
        Self {
            x: chunk.x.div_euclid(region_size),
            z: chunk.z.div_euclid(region_size),
        }
    }

    /// First chunk (minimum corner) of this region.
    #[must_use]
    pub const fn origin_chunk(self, region_size: i32) -> ChunkCoord {
        ChunkCoord::new(self.x * region_size, self.z * region_size)
    }
}
