//! 搜尋模組
//!
//! - `config`: 搜尋參數
//! - `state`: 搜尋用局面
//! - `combinatorics`: 對手手牌的組合機率
//! - `valuation`: 勝率與局末估值
//! - `draws`: 摸牌模擬
//! - `engine`: 期望值樹搜尋

pub mod config;
pub mod state;
pub mod combinatorics;
pub mod valuation;
pub mod draws;
pub mod engine;

pub use config::SearchConfig;
pub use state::GameState;
pub use combinatorics::{
    expected_draws_given_drawing, n_choose_r, probability_each_move_is_opponents_best,
    probability_of_draw,
};
pub use valuation::{
    boxed_out_value, domino_value, is_on_serve, service_bonus, terminal_value, win_probability,
    RoundWinner,
};
pub use draws::{draw_candidates, simulate_draws, Candidate};
pub use engine::{search, MoveValue, SearchResult, SearchStats, TreeSearch};
