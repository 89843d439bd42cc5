//! 遊戲核心模組
//!
//! 雙六 spinner 骨牌的規則定義：
//! - `constants`: 遊戲常量
//! - `tile`: 骨牌、方向、擺放朝向
//! - `tile_set`: 骨牌集合 bitset
//! - `tile_index`: 點數 → 骨牌索引
//! - `board`: 盤面（放牌、移除、計分、合法出牌）
//! - `moves`: 玩家動作

pub mod constants;
pub mod tile;
pub mod tile_set;
pub mod tile_index;
pub mod board;
pub mod moves;

pub use constants::*;
pub use tile::{all_tiles, Direction, Orientation, PlacedTile, Tile};
pub use tile_set::TileSet;
pub use tile_index::TileIndex;
pub use board::{Board, Placement};
pub use moves::Move;
