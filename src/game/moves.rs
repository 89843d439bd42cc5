//! 玩家動作

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::tile::{Direction, Tile};
use crate::error::DominoError;

/// 一次行動：出牌、摸牌、或無牌可摸時敲桌（pass）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Move {
    Play(Tile, Direction),
    Draw,
    Knock,
}

impl Move {
    pub fn play(tile: Tile, direction: Direction) -> Self {
        Move::Play(tile, direction)
    }

    pub fn is_play(&self) -> bool {
        matches!(self, Move::Play(..))
    }

    pub fn tile(&self) -> Option<Tile> {
        match self {
            Move::Play(tile, _) => Some(*tile),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Move::Play(_, direction) => Some(*direction),
            _ => None,
        }
    }
}

impl From<(Tile, Direction)> for Move {
    fn from((tile, direction): (Tile, Direction)) -> Self {
        Move::Play(tile, direction)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Play(tile, direction) => write!(f, "{} {}", tile, direction),
            Move::Draw => f.write_str("DRAW"),
            Move::Knock => f.write_str("KNOCK"),
        }
    }
}

impl FromStr for Move {
    type Err = DominoError;

    /// 接受 "62L"、"6-2 R"、"draw"、"pass"（同 draw）、"knock"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "draw" | "pass" => return Ok(Move::Draw),
            "knock" => return Ok(Move::Knock),
            _ => {}
        }

        let invalid = || DominoError::InvalidMove(s.to_string());
        let last = trimmed.chars().last().ok_or_else(invalid)?;
        let direction = Direction::from_char(last).ok_or_else(invalid)?;
        let tile_part = &trimmed[..trimmed.len() - last.len_utf8()];
        let tile = tile_part.parse::<Tile>().map_err(|_| invalid())?;
        Ok(Move::Play(tile, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play() {
        assert_eq!(
            "62L".parse::<Move>().unwrap(),
            Move::Play(Tile::new(2, 6), Direction::Left)
        );
        assert_eq!(
            "3-4 r".parse::<Move>().unwrap(),
            Move::Play(Tile::new(3, 4), Direction::Right)
        );
        assert_eq!("Pass".parse::<Move>().unwrap(), Move::Draw);
        assert_eq!("knock".parse::<Move>().unwrap(), Move::Knock);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Move>().is_err());
        assert!("62X".parse::<Move>().is_err());
        assert!("6L".parse::<Move>().is_err());
        assert_eq!(
            "99U".parse::<Move>(),
            Err(DominoError::InvalidMove("99U".to_string()))
        );
    }

    #[test]
    fn test_accessors() {
        let m: Move = (Tile::new(0, 5), Direction::Up).into();
        assert!(m.is_play());
        assert_eq!(m.tile(), Some(Tile::new(0, 5)));
        assert_eq!(m.direction(), Some(Direction::Up));
        assert_eq!(m.to_string(), "[0|5] UP");
        assert_eq!(Move::Draw.tile(), None);
    }

    #[test]
    fn test_serialize_json() {
        let m = Move::Play(Tile::new(0, 5), Direction::Up);
        assert_eq!(serde_json::to_string(&m).unwrap(), r#"{"Play":["[0|5]","UP"]}"#);
        assert_eq!(serde_json::to_string(&Move::Knock).unwrap(), r#""Knock""#);
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), r#""LEFT""#);
    }
}
