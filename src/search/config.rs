//! 搜尋設定

use serde::Serialize;

use crate::game::{DEFAULT_SEARCH_DEPTH, DRAW_SIMULATIONS};

/// 期望值搜尋的可調參數，預設值即標準行為
///
/// - `depth`: 我方出牌層數；0 表示只看自己這一步
/// - `draw_simulations`: 無牌可出時模擬摸牌的次數
/// - `parallel`: 根節點候選出牌以 rayon 平行評估
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    pub depth: u32,
    pub draw_simulations: usize,
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            draw_simulations: DRAW_SIMULATIONS,
            parallel: false,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn draw_simulations(mut self, draw_simulations: usize) -> Self {
        self.draw_simulations = draw_simulations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.depth, 1);
        assert_eq!(config.draw_simulations, 5);
        assert!(!config.parallel);
    }

    #[test]
    fn test_builders() {
        let config = SearchConfig::with_depth(3).parallel(true).draw_simulations(8);
        assert_eq!(config.depth, 3);
        assert_eq!(config.draw_simulations, 8);
        assert!(config.parallel);
    }
}
