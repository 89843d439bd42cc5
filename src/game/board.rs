//! 盤面引擎
//!
//! 十字形（spinner）盤面：主列左右兩端，加上第一張雙牌打出後開放的上下兩支。
//! `place` / `remove` 互為精確逆操作，搜尋在同一個盤面上原地套用與還原，
//! 不做複製。
//!
//! 在非法端點放牌、移除空端點、重複放同一張牌都屬於呼叫端錯誤，直接 panic。

use std::collections::VecDeque;
use std::fmt;

use crate::error::{DominoError, Result};

use super::constants::SCORE_MULTIPLE;
use super::tile::{Direction, Orientation, PlacedTile, Tile};
use super::tile_index::TileIndex;
use super::tile_set::TileSet;

/// 一次放牌：骨牌 + 方向
pub type Placement = (Tile, Direction);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    main_row: VecDeque<PlacedTile>,
    up: Vec<PlacedTile>,
    down: Vec<PlacedTile>,
    spinner: Option<Tile>,
    ends: [Option<u8>; 4],
    total_count: u32,
    // 尚未上盤的全部骨牌（不區分手牌或牌堆）
    remaining: TileIndex,
}

impl Board {
    pub fn new() -> Self {
        Self {
            main_row: VecDeque::new(),
            up: Vec::new(),
            down: Vec::new(),
            spinner: None,
            ends: [None; 4],
            total_count: 0,
            remaining: TileIndex::full(),
        }
    }

    /// 新一局開始前清空盤面
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 依序重播一串放牌建立盤面（測試與 CLI 用）
    pub fn from_placements(placements: &[Placement]) -> Self {
        let mut board = Self::new();
        for &(tile, direction) in placements {
            board.place(tile, direction);
        }
        board
    }

    // ------------------------------------------------------------------------
    // 唯讀存取
    // ------------------------------------------------------------------------

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.main_row.is_empty()
    }

    pub fn main_row(&self) -> &VecDeque<PlacedTile> {
        &self.main_row
    }

    pub fn up(&self) -> &[PlacedTile] {
        &self.up
    }

    pub fn down(&self) -> &[PlacedTile] {
        &self.down
    }

    pub fn spinner(&self) -> Option<Tile> {
        self.spinner
    }

    /// 某方向目前露出的點數
    #[inline]
    pub fn end_value(&self, direction: Direction) -> Option<u8> {
        self.ends[direction.index()]
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    /// 尚未上盤的骨牌索引
    pub fn remaining(&self) -> &TileIndex {
        &self.remaining
    }

    pub fn tiles_on_board(&self) -> TileSet {
        TileSet::FULL - self.remaining.tiles()
    }

    pub fn num_tiles_on_board(&self) -> usize {
        self.main_row.len() + self.up.len() + self.down.len()
    }

    // ------------------------------------------------------------------------
    // 合法性
    // ------------------------------------------------------------------------

    fn spinner_on_end(&self) -> bool {
        match (self.spinner, self.main_row.front(), self.main_row.back()) {
            (Some(spinner), Some(front), Some(back)) => {
                front.tile == spinner || back.tile == spinner
            }
            _ => false,
        }
    }

    /// 上下兩支是否可接：spinner 存在且已被埋在主列中間
    pub fn can_play_up_or_down(&self) -> bool {
        self.spinner.is_some() && !self.spinner_on_end()
    }

    pub fn valid_move(&self, tile: Tile, direction: Direction) -> bool {
        if direction.is_arm() && !self.can_play_up_or_down() {
            return false;
        }
        if self.is_empty() {
            // 第一張一律記為向右
            return direction == Direction::Right;
        }
        self.end_value(direction).is_some_and(|value| tile.has(value))
    }

    /// 該方向端點的骨牌是否為雙牌（空的支線不算）
    pub fn end_is_double(&self, direction: Direction) -> bool {
        let end = match direction {
            Direction::Left => self.main_row.front(),
            Direction::Right => self.main_row.back(),
            Direction::Up => self.up.last(),
            Direction::Down => self.down.last(),
        };
        end.is_some_and(|placed| placed.tile.is_double())
    }

    // ------------------------------------------------------------------------
    // 放牌 / 移除
    // ------------------------------------------------------------------------

    fn orientation_for(&self, tile: Tile, direction: Direction) -> Orientation {
        if tile.is_double() {
            Orientation::Double
        } else if self.is_empty() {
            Orientation::BigRight
        } else if self.end_value(direction) == Some(tile.big_side()) {
            Orientation::big_in(direction)
        } else {
            Orientation::big_out(direction)
        }
    }

    fn install_spinner(&mut self, tile: Tile) {
        if self.spinner.is_none() && tile.is_double() {
            self.spinner = Some(tile);
            self.ends[Direction::Up.index()] = Some(tile.small_side());
            self.ends[Direction::Down.index()] = Some(tile.small_side());
        }
    }

    fn clear_spinner_if(&mut self, removed: Tile) {
        if self.spinner == Some(removed) {
            assert!(
                self.up.is_empty() && self.down.is_empty(),
                "spinner {} removed while its arms are occupied",
                removed
            );
            self.spinner = None;
            self.ends[Direction::Up.index()] = None;
            self.ends[Direction::Down.index()] = None;
        }
    }

    /// 放牌並回傳得分
    pub fn place(&mut self, tile: Tile, direction: Direction) -> u32 {
        assert!(
            self.valid_move(tile, direction),
            "illegal placement {} {}",
            tile,
            direction
        );
        assert!(self.remaining.remove(tile), "{} is already on the board", tile);

        let first_tile = self.is_empty();
        let placed = PlacedTile::new(tile, self.orientation_for(tile, direction));
        match direction {
            Direction::Left => {
                self.main_row.push_front(placed);
                self.install_spinner(tile);
                self.ends[Direction::Left.index()] = Some(placed.left_side());
            }
            Direction::Right => {
                self.main_row.push_back(placed);
                self.install_spinner(tile);
                self.ends[Direction::Right.index()] = Some(placed.right_side());
                if first_tile {
                    self.ends[Direction::Left.index()] = Some(placed.left_side());
                }
            }
            Direction::Up => {
                self.up.push(placed);
                self.ends[Direction::Up.index()] = Some(placed.up_side());
            }
            Direction::Down => {
                self.down.push(placed);
                self.ends[Direction::Down.index()] = Some(placed.down_side());
            }
        }

        self.update_total_count();
        self.score()
    }

    /// 外部輸入用的 `place`：非法放牌回傳錯誤
    pub fn try_place(&mut self, tile: Tile, direction: Direction) -> Result<u32> {
        if !self.remaining.contains(tile) {
            return Err(DominoError::TileOnBoard(tile));
        }
        if !self.valid_move(tile, direction) {
            return Err(DominoError::IllegalPlacement { tile, direction });
        }
        Ok(self.place(tile, direction))
    }

    /// `from_placements` 的可失敗版本
    pub fn try_from_placements(placements: &[Placement]) -> Result<Self> {
        let mut board = Self::new();
        for &(tile, direction) in placements {
            board.try_place(tile, direction)?;
        }
        Ok(board)
    }

    /// `place` 的逆操作；回傳被移除的骨牌
    pub fn remove(&mut self, direction: Direction) -> Tile {
        let removed = match direction {
            Direction::Left | Direction::Right => {
                let popped = if direction == Direction::Left {
                    self.main_row.pop_front()
                } else {
                    self.main_row.pop_back()
                };
                let placed = popped.unwrap_or_else(|| panic!("remove {} on an empty board", direction));
                self.clear_spinner_if(placed.tile);
                match (self.main_row.front(), self.main_row.back()) {
                    (Some(front), Some(back)) => {
                        self.ends[Direction::Left.index()] = Some(front.left_side());
                        self.ends[Direction::Right.index()] = Some(back.right_side());
                    }
                    _ => self.ends = [None; 4],
                }
                placed.tile
            }
            Direction::Up => {
                let placed = self.up.pop().unwrap_or_else(|| panic!("remove UP on an empty arm"));
                self.ends[Direction::Up.index()] = self
                    .up
                    .last()
                    .map(PlacedTile::up_side)
                    .or(self.spinner.map(Tile::small_side));
                placed.tile
            }
            Direction::Down => {
                let placed = self.down.pop().unwrap_or_else(|| panic!("remove DOWN on an empty arm"));
                self.ends[Direction::Down.index()] = self
                    .down
                    .last()
                    .map(PlacedTile::down_side)
                    .or(self.spinner.map(Tile::small_side));
                placed.tile
            }
        };

        assert!(self.remaining.insert(removed), "{} was not on the board", removed);
        self.update_total_count();
        removed
    }

    // ------------------------------------------------------------------------
    // 計分
    // ------------------------------------------------------------------------

    fn compute_total_count(&self) -> u32 {
        match self.main_row.len() {
            0 => 0,
            1 => self.main_row[0].tile.total_points(),
            _ => {
                let up_points = self.up.last().map_or(0, PlacedTile::up_points);
                let down_points = self.down.last().map_or(0, PlacedTile::down_points);
                let left_points = self.main_row.front().map_or(0, PlacedTile::left_points);
                let right_points = self.main_row.back().map_or(0, PlacedTile::right_points);
                up_points + down_points + left_points + right_points
            }
        }
    }

    fn update_total_count(&mut self) {
        self.total_count = self.compute_total_count();
    }

    /// 總數為 5 的倍數時得分，否則 0
    pub fn score(&self) -> u32 {
        if self.total_count > 0 && self.total_count % SCORE_MULTIPLE == 0 {
            self.total_count
        } else {
            0
        }
    }

    // ------------------------------------------------------------------------
    // 合法出牌列舉
    // ------------------------------------------------------------------------

    fn open_directions(&self) -> impl Iterator<Item = (Direction, u8)> + '_ {
        let arms_open = self.can_play_up_or_down();
        Direction::ALL
            .into_iter()
            .filter(move |d| arms_open || !d.is_arm())
            .filter_map(|d| self.end_value(d).map(|value| (d, value)))
    }

    /// 合法出牌；`hand` 為 None 時以全部未上盤骨牌計算
    ///
    /// 每個方向只查含端點點數的索引桶。順序為 LEFT、RIGHT、UP、DOWN，
    /// 同方向內依骨牌 id 遞增。
    pub fn legal_moves(&self, hand: Option<TileSet>) -> Vec<Placement> {
        let candidates = self.candidates(hand);
        if self.is_empty() {
            return candidates.iter().map(|t| (t, Direction::Right)).collect();
        }

        let mut moves = Vec::new();
        for (direction, value) in self.open_directions() {
            for tile in self.remaining.with_side(value) & candidates {
                moves.push((tile, direction));
            }
        }
        moves
    }

    /// 去除對稱重複後的合法出牌
    ///
    /// 左右（或上下）兩端露出相同點數且都不是雙牌時，接哪一端結果相同，
    /// 只保留 RIGHT（或 UP）。盤面上只有一張雙牌時左右亦相同。
    pub fn unique_legal_moves(&self, hand: Option<TileSet>) -> Vec<Placement> {
        let same_left_right = (self.main_row.len() == 1 && self.main_row[0].tile.is_double())
            || (self.main_row.len() > 1
                && self.end_value(Direction::Left) == self.end_value(Direction::Right)
                && !self.end_is_double(Direction::Left)
                && !self.end_is_double(Direction::Right));
        let same_up_down = self.up.is_empty() == self.down.is_empty()
            && self.end_value(Direction::Up) == self.end_value(Direction::Down)
            && !self.end_is_double(Direction::Up)
            && !self.end_is_double(Direction::Down);

        self.legal_moves(hand)
            .into_iter()
            .filter(|&(_, direction)| match direction {
                Direction::Left => !same_left_right,
                Direction::Down => !same_up_down,
                _ => true,
            })
            .collect()
    }

    /// 單張骨牌可接的所有方向
    pub fn playable_moves(&self, tile: Tile) -> Vec<Placement> {
        Direction::ALL
            .into_iter()
            .filter(|&d| self.valid_move(tile, d))
            .map(|d| (tile, d))
            .collect()
    }

    /// `hand` 中是否有任何一張可出
    pub fn has_legal_move(&self, hand: TileSet) -> bool {
        let candidates = self.candidates(Some(hand));
        if self.is_empty() {
            return !candidates.is_empty();
        }
        self.open_directions()
            .any(|(_, value)| !(self.remaining.with_side(value) & candidates).is_empty())
    }

    /// 所有未上盤的骨牌都無處可接
    pub fn is_blocked(&self) -> bool {
        !self.has_legal_move(self.remaining.tiles())
    }

    fn candidates(&self, hand: Option<TileSet>) -> TileSet {
        let remaining = self.remaining.tiles();
        match hand {
            Some(hand) => {
                assert!(
                    hand.is_subset(remaining),
                    "hand {} overlaps tiles on the board",
                    hand
                );
                hand
            }
            None => remaining,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn joined(tiles: &[PlacedTile]) -> String {
    tiles.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board:")?;
        match self.spinner {
            Some(spinner) => writeln!(f, "Spinner: {}", spinner)?,
            None => writeln!(f, "Spinner: None")?,
        }
        let main_row: Vec<PlacedTile> = self.main_row.iter().copied().collect();
        writeln!(f, "Main row: [{}]", joined(&main_row))?;
        writeln!(f, "Up: [{}]", joined(&self.up))?;
        writeln!(f, "Down: [{}]", joined(&self.down))?;
        write!(f, "Count: {}", self.total_count)
    }
}

// ============================================================================
// 單元測試
// ============================================================================
