//! 遊戲常量定義

// ============================================================================
// 牌組常量
// ============================================================================

pub const MAX_SIDE_VALUE: u8 = 6;                         // 雙六骨牌
pub const SIDE_COUNT: usize = MAX_SIDE_VALUE as usize + 1; // 點數種類 0..=6
pub const TILE_COUNT: usize = SIDE_COUNT * (SIDE_COUNT + 1) / 2; // 28 張

// ============================================================================
// 遊戲規則常量
// ============================================================================

pub const HAND_SIZE: usize = 7;          // 每人起手張數
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
pub const SCORE_MULTIPLE: u32 = 5;       // 盤面總點數為 5 的倍數才得分
pub const DEFAULT_PLAY_TO: u32 = 150;    // 預設目標分數
pub const MAX_TURNS: u32 = 1000;         // 單局動作上限

// ============================================================================
// 搜尋 / 估值常量
// ============================================================================

pub const AVG_POINTS_PER_SCORE: f64 = 10.0;  // 每次得分的平均點數
pub const DRAW_SIMULATIONS: usize = 5;       // 無牌可出時的摸牌模擬次數
pub const DEFAULT_SEARCH_DEPTH: u32 = 1;
pub const Z_SATURATION: f64 = 20.0;          // sigmoid 飽和界限

// 發球權加分（距離目標越遠加分越多）
pub const SERVE_BONUS_FAR: u32 = 12;   // 剩餘 > 15
pub const SERVE_BONUS_MID: u32 = 8;    // 剩餘 > 10
pub const SERVE_BONUS_NEAR: u32 = 6;   // 剩餘 > 5
pub const SERVE_BONUS_LAST: u32 = 4;   // 剩餘 <= 5
