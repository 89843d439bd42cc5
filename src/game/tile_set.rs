//! 骨牌集合（28 位元 bitset）
//!
//! 手牌、未見牌池、索引桶都用它表示；`Copy` 且集合運算為 O(1)。

use std::fmt;
use std::ops::{BitAnd, BitOr, Sub};

use super::constants::TILE_COUNT;
use super::tile::Tile;

const FULL_MASK: u32 = (1u32 << TILE_COUNT) - 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileSet(u32);

impl TileSet {
    pub const EMPTY: TileSet = TileSet(0);
    pub const FULL: TileSet = TileSet(FULL_MASK);

    pub fn new() -> Self {
        Self::EMPTY
    }

    #[inline]
    pub fn contains(self, tile: Tile) -> bool {
        self.0 & (1 << tile.id()) != 0
    }

    /// 加入骨牌，回傳原本是否不在集合中
    #[inline]
    pub fn insert(&mut self, tile: Tile) -> bool {
        let was_absent = !self.contains(tile);
        self.0 |= 1 << tile.id();
        was_absent
    }

    /// 移除骨牌，回傳原本是否在集合中
    #[inline]
    pub fn remove(&mut self, tile: Tile) -> bool {
        let was_present = self.contains(tile);
        self.0 &= !(1 << tile.id());
        was_present
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_disjoint(self, other: TileSet) -> bool {
        self.0 & other.0 == 0
    }

    #[inline]
    pub fn is_subset(self, other: TileSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// 依 id 遞增順序走訪
    pub fn iter(self) -> TileSetIter {
        TileSetIter(self.0)
    }

    /// 全部骨牌點數總和
    pub fn total_points(self) -> u32 {
        self.iter().map(Tile::total_points).sum()
    }
}

impl BitOr for TileSet {
    type Output = TileSet;
    fn bitor(self, rhs: TileSet) -> TileSet {
        TileSet(self.0 | rhs.0)
    }
}

impl BitAnd for TileSet {
    type Output = TileSet;
    fn bitand(self, rhs: TileSet) -> TileSet {
        TileSet(self.0 & rhs.0)
    }
}

impl Sub for TileSet {
    type Output = TileSet;
    fn sub(self, rhs: TileSet) -> TileSet {
        TileSet(self.0 & !rhs.0)
    }
}

impl FromIterator<Tile> for TileSet {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        let mut set = TileSet::EMPTY;
        for tile in iter {
            set.insert(tile);
        }
        set
    }
}

impl IntoIterator for TileSet {
    type Item = Tile;
    type IntoIter = TileSetIter;
    fn into_iter(self) -> TileSetIter {
        self.iter()
    }
}

impl fmt::Display for TileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, tile) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", tile)?;
        }
        f.write_str("}")
    }
}

pub struct TileSetIter(u32);

impl Iterator for TileSetIter {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.0 == 0 {
            return None;
        }
        let id = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(Tile::from_id(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for TileSetIter {}

// ============================================================================
// 單元測試
// ============================================================================
