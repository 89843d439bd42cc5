//! 點數 → 骨牌集合索引
//!
//! 盤面用它列舉合法出牌：只需查看含有端點點數的那一桶，
//! 不必掃過全部未上盤的骨牌。

use super::constants::SIDE_COUNT;
use super::tile::Tile;
use super::tile_set::TileSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileIndex {
    by_side: [TileSet; SIDE_COUNT],
    all: TileSet,
}

impl TileIndex {
    /// 空索引
    pub fn empty() -> Self {
        Self {
            by_side: [TileSet::EMPTY; SIDE_COUNT],
            all: TileSet::EMPTY,
        }
    }

    /// 含全部 28 張的索引
    pub fn full() -> Self {
        Self::from_set(TileSet::FULL)
    }

    pub fn from_set(set: TileSet) -> Self {
        let mut index = Self::empty();
        for tile in set {
            index.insert(tile);
        }
        index
    }

    pub fn insert(&mut self, tile: Tile) -> bool {
        if !self.all.insert(tile) {
            return false;
        }
        self.by_side[tile.small_side() as usize].insert(tile);
        self.by_side[tile.big_side() as usize].insert(tile);
        true
    }

    pub fn remove(&mut self, tile: Tile) -> bool {
        if !self.all.remove(tile) {
            return false;
        }
        self.by_side[tile.small_side() as usize].remove(tile);
        self.by_side[tile.big_side() as usize].remove(tile);
        true
    }

    #[inline]
    pub fn contains(&self, tile: Tile) -> bool {
        self.all.contains(tile)
    }

    /// 含有 `value` 的骨牌
    #[inline]
    pub fn with_side(&self, value: u8) -> TileSet {
        self.by_side[value as usize]
    }

    #[inline]
    pub fn tiles(&self) -> TileSet {
        self.all
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

impl Default for TileIndex {
    fn default() -> Self {
        Self::full()
    }
}
