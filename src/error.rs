//! 可恢復錯誤類型
//!
//! 規則引擎內部的不變量違反（在非法端點放牌、未見牌池為空等）直接 panic；
//! 這裡只收錄來自外部輸入或對局流程、呼叫端可以處理的錯誤。

use thiserror::Error;

use crate::game::{Direction, Tile};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DominoError {
    #[error("pip value {0} out of range")]
    PipOutOfRange(u8),

    #[error("cannot parse tile: {0:?}")]
    InvalidTile(String),

    #[error("cannot parse move: {0:?}")]
    InvalidMove(String),

    #[error("{player} doesn't have tile {tile}")]
    TileNotInHand { player: String, tile: Tile },

    #[error("can't play {tile} {direction}")]
    IllegalPlacement { tile: Tile, direction: Direction },

    #[error("{0} has a playable tile and must play it")]
    MustPlay(String),

    #[error("{0} is already on the board")]
    TileOnBoard(Tile),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("{0} must draw before knocking")]
    MustDraw(String),

    #[error("round is over, deal again")]
    RoundOver,

    #[error("bone yard is empty")]
    EmptyBoneYard,

    #[error("invalid player setup: {0}")]
    InvalidPlayers(String),

    #[error("unknown strategy: {0:?}")]
    UnknownStrategy(String),

    #[error("game exceeded {0} turns")]
    TurnLimit(u32),
}

pub type Result<T> = std::result::Result<T, DominoError>;
