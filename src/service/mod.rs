//! 服務層模組
//!
//! 規則引擎與搜尋之外的協作者：玩家手牌、對局流程、機器人策略、對戰統計

pub mod player;
pub mod game;
pub mod bots;
pub mod tournament;

pub use player::Player;
pub use game::{Game, GameConfig, RoundEnd, Turn, TurnView};
pub use bots::{
    pick_defensive_move, pick_greedy_move, BotKind, DefensiveBot, GreedyBot, RandomBot, Strategy,
    TreeBot,
};
pub use tournament::{serve_stats, tournament, ServeStats, StrategyRecord, TournamentSummary};
