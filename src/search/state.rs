//! 搜尋用的局面
//!
//! 搜尋時原地修改，每個分支返回前必須完全還原。

use std::fmt;

use crate::error::{DominoError, Result};
use crate::game::{Board, TileSet};

use super::valuation::{self, RoundWinner};

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub my_score: u32,
    pub opp_score: u32,
    pub play_to: u32,
    pub hand: TileSet,
    pub opp_hand_size: usize,
    /// 搜尋套用我方出牌後為 false，還原時恢復
    pub my_turn: bool,
}

impl GameState {
    /// 建立局面；手牌與盤面重疊、對手沒有手牌或張數超過未見牌屬於呼叫端錯誤
    pub fn new(
        board: Board,
        my_score: u32,
        opp_score: u32,
        play_to: u32,
        hand: TileSet,
        opp_hand_size: usize,
    ) -> Self {
        let state = Self {
            board,
            my_score,
            opp_score,
            play_to,
            hand,
            opp_hand_size,
            my_turn: true,
        };
        state.check_invariants();
        state
    }

    /// 外部輸入（CLI）用：不變量不成立時回傳錯誤而非 panic
    pub fn try_new(
        board: Board,
        my_score: u32,
        opp_score: u32,
        play_to: u32,
        hand: TileSet,
        opp_hand_size: usize,
    ) -> Result<Self> {
        let on_board = hand & board.tiles_on_board();
        if !on_board.is_empty() {
            return Err(DominoError::InvalidPosition(format!(
                "hand tiles {} are already on the board",
                on_board
            )));
        }
        let unseen = (board.remaining().tiles() - hand).len();
        if opp_hand_size == 0 || opp_hand_size > unseen {
            return Err(DominoError::InvalidPosition(format!(
                "opponent hand size must be 1..={}, got {}",
                unseen, opp_hand_size
            )));
        }
        Ok(Self::new(board, my_score, opp_score, play_to, hand, opp_hand_size))
    }

    pub fn check_invariants(&self) {
        assert!(self.opp_hand_size > 0, "opponent has no tiles left");
        assert!(
            self.hand.is_disjoint(self.board.tiles_on_board()),
            "hand {} overlaps tiles on the board",
            self.hand
        );
        assert!(
            self.opp_hand_size <= self.unseen().len(),
            "opponent holds {} tiles but only {} are unseen",
            self.opp_hand_size,
            self.unseen().len()
        );
    }

    /// 不在盤面也不在我方手中的牌（對手手牌 + 牌堆）
    #[inline]
    pub fn unseen(&self) -> TileSet {
        self.board.remaining().tiles() - self.hand
    }

    /// 牌堆張數
    pub fn boneyard_size(&self) -> usize {
        let unseen = self.unseen().len();
        unseen
            .checked_sub(self.opp_hand_size)
            .unwrap_or_else(|| panic!("opponent holds {} of {} unseen tiles", self.opp_hand_size, unseen))
    }

    pub fn win_probability(&self) -> f64 {
        valuation::win_probability(self.my_score, self.opp_score, self.play_to)
    }

    pub fn terminal_value(&self) -> f64 {
        valuation::terminal_value(
            self.my_score,
            self.opp_score,
            self.play_to,
            self.hand.len(),
            self.opp_hand_size,
            self.my_turn,
        )
    }

    pub fn boxed_out_value(&self) -> f64 {
        valuation::boxed_out_value(
            self.hand,
            self.unseen(),
            self.opp_hand_size,
            self.my_score,
            self.opp_score,
            self.play_to,
        )
    }

    pub fn domino_value(&self, winner: RoundWinner) -> f64 {
        valuation::domino_value(
            self.hand,
            self.unseen(),
            self.opp_hand_size,
            self.my_score,
            self.opp_score,
            self.play_to,
            winner,
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        writeln!(f, "Hand: {}", self.hand)?;
        writeln!(f, "OppHandSize: {}", self.opp_hand_size)?;
        writeln!(f, "Scores: [{}, {}] ({})", self.my_score, self.opp_score, self.play_to)?;
        write!(f, "MyTurn: {}", self.my_turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Tile};

    fn small_state() -> GameState {
        let board = Board::from_placements(&[(Tile::new(6, 6), Direction::Right)]);
        let hand: TileSet = [Tile::new(1, 2), Tile::new(6, 3)].into_iter().collect();
        GameState::new(board, 10, 20, 150, hand, 7)
    }

    #[test]
    fn test_try_new_rejects_bad_positions() {
        let board = Board::from_placements(&[(Tile::new(6, 6), Direction::Right)]);
        let overlapping: TileSet = [Tile::new(6, 6)].into_iter().collect();
        assert!(matches!(
            GameState::try_new(board.clone(), 0, 0, 150, overlapping, 7),
            Err(DominoError::InvalidPosition(_))
        ));
        let hand: TileSet = [Tile::new(1, 2)].into_iter().collect();
        assert!(GameState::try_new(board.clone(), 0, 0, 150, hand, 0).is_err());
        assert!(GameState::try_new(board.clone(), 0, 0, 150, hand, 27).is_err());
        assert_eq!(
            GameState::try_new(board.clone(), 0, 0, 150, hand, 26),
            Ok(GameState::new(board, 0, 0, 150, hand, 26))
        );
    }

    #[test]
    fn test_unseen_and_boneyard() {
        let state = small_state();
        assert_eq!(state.unseen().len(), 25);
        assert!(!state.unseen().contains(Tile::new(6, 6)));
        assert!(!state.unseen().contains(Tile::new(1, 2)));
        assert_eq!(state.boneyard_size(), 18);
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn test_hand_on_board_panics() {
        let board = Board::from_placements(&[(Tile::new(6, 6), Direction::Right)]);
        let hand: TileSet = [Tile::new(6, 6)].into_iter().collect();
        GameState::new(board, 0, 0, 150, hand, 7);
    }

    #[test]
    #[should_panic(expected = "unseen")]
    fn test_oversized_opponent_hand_panics() {
        GameState::new(Board::new(), 0, 0, 150, TileSet::EMPTY, 29);
    }

    #[test]
    #[should_panic(expected = "no tiles")]
    fn test_empty_opponent_hand_panics() {
        GameState::new(Board::new(), 0, 0, 150, TileSet::EMPTY, 0);
    }

    #[test]
    fn test_display() {
        let rendered = small_state().to_string();
        assert!(rendered.contains("OppHandSize: 7"));
        assert!(rendered.contains("Scores: [10, 20] (150)"));
    }
}
