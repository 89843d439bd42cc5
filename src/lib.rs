//! 雙六 spinner 骨牌引擎
//!
//! - `game`: 規則核心（骨牌、盤面、動作）
//! - `search`: 期望值樹搜尋 AI
//! - `service`: 對局流程、機器人策略、對戰統計

pub mod error;
pub mod game;
pub mod search;
pub mod service;

pub use error::{DominoError, Result};
