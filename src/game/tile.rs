//! 骨牌、方向與擺放朝向定義

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::constants::{MAX_SIDE_VALUE, SIDE_COUNT, TILE_COUNT};
use crate::error::DominoError;

// ============================================================================
// Tile
// ============================================================================

/// 一張骨牌，永遠以 (small, big) 正規化儲存
///
/// 因為正規化，`Tile::new(a, b) == Tile::new(b, a)` 且兩者雜湊相同。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    small: u8,
    big: u8,
}

const ALL_TILES: [Tile; TILE_COUNT] = build_all_tiles();

const fn build_all_tiles() -> [Tile; TILE_COUNT] {
    let mut out = [Tile { small: 0, big: 0 }; TILE_COUNT];
    let mut idx = 0;
    let mut small = 0;
    while small <= MAX_SIDE_VALUE {
        let mut big = small;
        while big <= MAX_SIDE_VALUE {
            out[idx] = Tile { small, big };
            idx += 1;
            big += 1;
        }
        small += 1;
    }
    out
}

impl Tile {
    /// 建立骨牌；點數超出範圍屬於呼叫端錯誤
    pub fn new(side_1: u8, side_2: u8) -> Self {
        assert!(
            side_1 <= MAX_SIDE_VALUE && side_2 <= MAX_SIDE_VALUE,
            "pip out of range: {side_1}-{side_2}"
        );
        Self {
            small: side_1.min(side_2),
            big: side_1.max(side_2),
        }
    }

    /// 外部輸入用的檢查版本
    pub fn try_new(side_1: u8, side_2: u8) -> Result<Self, DominoError> {
        for side in [side_1, side_2] {
            if side > MAX_SIDE_VALUE {
                return Err(DominoError::PipOutOfRange(side));
            }
        }
        Ok(Self::new(side_1, side_2))
    }

    /// 由 0..TILE_COUNT 的索引取回骨牌
    pub fn from_id(id: usize) -> Self {
        ALL_TILES[id]
    }

    /// 在全部 28 張中的索引（與 `all_tiles()` 順序一致）
    #[inline]
    pub fn id(self) -> usize {
        let s = self.small as usize;
        s * (2 * SIDE_COUNT - s + 1) / 2 + (self.big - self.small) as usize
    }

    #[inline]
    pub fn small_side(self) -> u8 {
        self.small
    }

    #[inline]
    pub fn big_side(self) -> u8 {
        self.big
    }

    #[inline]
    pub fn is_double(self) -> bool {
        self.small == self.big
    }

    #[inline]
    pub fn total_points(self) -> u32 {
        (self.small + self.big) as u32
    }

    /// 是否含有指定點數
    #[inline]
    pub fn has(self, value: u8) -> bool {
        self.small == value || self.big == value
    }

    /// 接上 `value` 之後露出的另一端
    pub fn other_side(self, value: u8) -> Option<u8> {
        if self.small == value {
            Some(self.big)
        } else if self.big == value {
            Some(self.small)
        } else {
            None
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}|{}]", self.small, self.big)
    }
}

impl FromStr for Tile {
    type Err = DominoError;

    /// 接受 "62"、"6-2"、"6|2"、"[6|2]"、"6,2"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<char> = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | '|' | '-' | ',' | ' '))
            .collect();
        match digits.as_slice() {
            [a, b] => {
                let a = a.to_digit(10).ok_or_else(|| DominoError::InvalidTile(s.to_string()))?;
                let b = b.to_digit(10).ok_or_else(|| DominoError::InvalidTile(s.to_string()))?;
                Tile::try_new(a as u8, b as u8)
            }
            _ => Err(DominoError::InvalidTile(s.to_string())),
        }
    }
}

impl Serialize for Tile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 全部骨牌（依 id 排序）
pub fn all_tiles() -> &'static [Tile; TILE_COUNT] {
    &ALL_TILES
}

// ============================================================================
// Direction
// ============================================================================

/// 盤面四個可接牌的方向
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// 上下兩支（只能接在 spinner 上）
    #[inline]
    pub fn is_arm(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn from_char(c: char) -> Option<Direction> {
        match c.to_ascii_uppercase() {
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        };
        f.write_str(name)
    }
}

impl Serialize for Direction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Orientation
// ============================================================================

/// 骨牌在盤面上的朝向，由放牌演算法推導
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    NotOnBoard,
    BigUp,
    BigDown,
    BigLeft,
    BigRight,
    Double,
}

impl Orientation {
    /// 大點數朝向 `direction` 外側
    pub fn big_out(direction: Direction) -> Orientation {
        match direction {
            Direction::Left => Orientation::BigLeft,
            Direction::Right => Orientation::BigRight,
            Direction::Up => Orientation::BigUp,
            Direction::Down => Orientation::BigDown,
        }
    }

    /// 大點數朝內（貼著原本的端點）
    pub fn big_in(direction: Direction) -> Orientation {
        Orientation::big_out(direction.opposite())
    }
}

// ============================================================================
// PlacedTile
// ============================================================================

/// 已放上盤面的骨牌及其朝向
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacedTile {
    pub tile: Tile,
    pub orientation: Orientation,
}

impl PlacedTile {
    pub fn new(tile: Tile, orientation: Orientation) -> Self {
        Self { tile, orientation }
    }

    /// 朝 `direction` 一側露出的點數；雙牌回傳其點數
    pub fn side(&self, direction: Direction) -> u8 {
        let big = Orientation::big_out(direction);
        let small = Orientation::big_in(direction);
        match self.orientation {
            o if o == big => self.tile.big_side(),
            o if o == small => self.tile.small_side(),
            Orientation::Double => self.tile.small_side(),
            other => panic!("{} oriented {:?} has no {} side", self.tile, other, direction),
        }
    }

    /// 朝 `direction` 一側計入總數的點數；雙牌計整張
    pub fn points(&self, direction: Direction) -> u32 {
        if self.tile.is_double() {
            self.tile.total_points()
        } else {
            self.side(direction) as u32
        }
    }

    pub fn left_side(&self) -> u8 {
        self.side(Direction::Left)
    }

    pub fn right_side(&self) -> u8 {
        self.side(Direction::Right)
    }

    pub fn up_side(&self) -> u8 {
        self.side(Direction::Up)
    }

    pub fn down_side(&self) -> u8 {
        self.side(Direction::Down)
    }

    pub fn left_points(&self) -> u32 {
        self.points(Direction::Left)
    }

    pub fn right_points(&self) -> u32 {
        self.points(Direction::Right)
    }

    pub fn up_points(&self) -> u32 {
        self.points(Direction::Up)
    }

    pub fn down_points(&self) -> u32 {
        self.points(Direction::Down)
    }

    /// 依朝向排列的 (左/上, 右/下) 點數，用於顯示
    pub fn ordered_sides(&self) -> (u8, u8) {
        let (s, b) = (self.tile.small_side(), self.tile.big_side());
        match self.orientation {
            Orientation::BigLeft | Orientation::BigUp => (b, s),
            _ => (s, b),
        }
    }
}

impl fmt::Display for PlacedTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.ordered_sides();
        write!(f, "[{}|{}]", a, b)
    }
}

// ============================================================================
// 單元測試
// ============================================================================
