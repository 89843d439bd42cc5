//! 玩家手牌與累計分數

use std::fmt;

use serde::Serialize;

use crate::game::{Board, Tile, TileSet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Player {
    name: String,
    #[serde(skip)]
    hand: TileSet,
    total_score: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: TileSet::EMPTY,
            total_score: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> TileSet {
        self.hand
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    #[inline]
    pub fn has_tile(&self, tile: Tile) -> bool {
        self.hand.contains(tile)
    }

    /// 重複加入同一張屬於發牌錯誤
    pub fn add_tile(&mut self, tile: Tile) {
        assert!(self.hand.insert(tile), "{} already holds {}", self.name, tile);
    }

    pub fn add_tiles(&mut self, tiles: impl IntoIterator<Item = Tile>) {
        for tile in tiles {
            self.add_tile(tile);
        }
    }

    pub fn remove_tile(&mut self, tile: Tile) {
        assert!(self.hand.remove(tile), "{} doesn't hold {}", self.name, tile);
    }

    pub fn empty_hand(&mut self) {
        self.hand = TileSet::EMPTY;
    }

    pub fn add_score(&mut self, points: u32) {
        self.total_score += points;
    }

    pub fn reset_score(&mut self) {
        self.total_score = 0;
    }

    pub fn is_out_of_tiles(&self) -> bool {
        self.hand.is_empty()
    }

    pub fn total_points_in_hand(&self) -> u32 {
        self.hand.total_points()
    }

    pub fn can_play(&self, board: &Board) -> bool {
        board.has_legal_move(self.hand)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.total_score, self.hand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;

    #[test]
    fn test_hand_bookkeeping() {
        let mut player = Player::new("alice");
        player.add_tiles([Tile::new(6, 6), Tile::new(2, 3)]);
        assert!(player.has_tile(Tile::new(3, 2)));
        assert_eq!(player.total_points_in_hand(), 17);
        player.remove_tile(Tile::new(6, 6));
        assert_eq!(player.hand().len(), 1);
        player.empty_hand();
        assert!(player.is_out_of_tiles());
    }

    #[test]
    #[should_panic(expected = "already holds")]
    fn test_duplicate_tile_panics() {
        let mut player = Player::new("bob");
        player.add_tile(Tile::new(1, 1));
        player.add_tile(Tile::new(1, 1));
    }

    #[test]
    fn test_can_play() {
        let board = Board::from_placements(&[(Tile::new(5, 5), Direction::Right)]);
        let mut player = Player::new("carol");
        player.add_tile(Tile::new(1, 2));
        assert!(!player.can_play(&board));
        player.add_tile(Tile::new(5, 0));
        assert!(player.can_play(&board));
    }

    #[test]
    fn test_score_and_display() {
        let mut player = Player::new("dave");
        player.add_score(15);
        player.add_score(10);
        assert_eq!(player.total_score(), 25);
        player.add_tile(Tile::new(0, 4));
        assert_eq!(player.to_string(), "dave (25): {[0|4]}");
        player.reset_score();
        assert_eq!(player.total_score(), 0);
    }
}
