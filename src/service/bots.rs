//! 機器人策略
//!
//! - `RandomBot`: 合法出牌中隨機挑一個
//! - `GreedyBot`: 立即得分最高者
//! - `DefensiveBot`: 能得分就得分，否則挑讓對手下一手最多只能得最少分的出牌
//! - `TreeBot`: 期望值樹搜尋

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::DominoError;
use crate::game::{Board, Move, Placement, TileSet};
use crate::search::{SearchConfig, TreeSearch};

use super::game::TurnView;

/// 對局中決定每一步的策略
pub trait Strategy: Send {
    fn name(&self) -> &str;

    /// 回傳要出的牌；無牌可出時回傳 `Move::Draw` 或 `Move::Knock`
    fn pick_move(&mut self, view: &TurnView<'_>, rng: &mut StdRng) -> Move;
}

fn no_move(view: &TurnView<'_>) -> Move {
    if view.bone_yard_size > 0 {
        Move::Draw
    } else {
        Move::Knock
    }
}

/// 在盤面上試放一張牌並回傳得分
fn score_of(board: &mut Board, (tile, direction): Placement) -> u32 {
    let score = board.place(tile, direction);
    board.remove(direction);
    score
}

// ============================================================================
// 簡單策略
// ============================================================================

/// 立即得分最高的出牌（同分取第一個）
pub fn pick_greedy_move(board: &Board, hand: TileSet) -> Option<(Placement, u32)> {
    let mut board = board.clone();
    let mut best: Option<(Placement, u32)> = None;
    for placement in board.legal_moves(Some(hand)) {
        let score = score_of(&mut board, placement);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((placement, score));
        }
    }
    best
}

/// 能得分就用貪婪出牌；否則挑對手最佳立即回應得分最低者（同分取第一個）
pub fn pick_defensive_move(board: &Board, hand: TileSet) -> Option<Placement> {
    let (greedy, greedy_score) = pick_greedy_move(board, hand)?;
    if greedy_score > 0 {
        return Some(greedy);
    }

    let mut board = board.clone();
    let mut best: Option<(Placement, u32)> = None;
    for placement @ (tile, direction) in board.legal_moves(Some(hand)) {
        board.place(tile, direction);
        let others = board.remaining().tiles() - hand;
        let reply = board
            .legal_moves(Some(others))
            .into_iter()
            .map(|reply| score_of(&mut board, reply))
            .max()
            .unwrap_or(0);
        board.remove(direction);

        if best.map_or(true, |(_, best_reply)| reply < best_reply) {
            best = Some((placement, reply));
        }
    }
    best.map(|(placement, _)| placement)
}

pub struct RandomBot;

impl Strategy for RandomBot {
    fn name(&self) -> &str {
        "random"
    }

    fn pick_move(&mut self, view: &TurnView<'_>, rng: &mut StdRng) -> Move {
        match view.legal_moves().choose(rng) {
            Some(&placement) => placement.into(),
            None => no_move(view),
        }
    }
}

pub struct GreedyBot;

impl Strategy for GreedyBot {
    fn name(&self) -> &str {
        "greedy"
    }

    fn pick_move(&mut self, view: &TurnView<'_>, _rng: &mut StdRng) -> Move {
        match pick_greedy_move(view.board, view.hand) {
            Some((placement, _)) => placement.into(),
            None => no_move(view),
        }
    }
}

pub struct DefensiveBot;

impl Strategy for DefensiveBot {
    fn name(&self) -> &str {
        "defensive"
    }

    fn pick_move(&mut self, view: &TurnView<'_>, _rng: &mut StdRng) -> Move {
        match pick_defensive_move(view.board, view.hand) {
            Some(placement) => placement.into(),
            None => no_move(view),
        }
    }
}

/// 以期望值樹搜尋選擇最佳行動
pub struct TreeBot {
    name: String,
    search: TreeSearch,
}

impl TreeBot {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            name: format!("tree{}", config.depth),
            search: TreeSearch::new(config),
        }
    }
}

impl Strategy for TreeBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn pick_move(&mut self, view: &TurnView<'_>, rng: &mut StdRng) -> Move {
        let state = view.to_game_state();
        // 搜尋只知道未見牌總數；摸牌或敲桌交給實際牌堆決定
        match self.search.search(&state, rng).best() {
            Some(best) if best.action.is_play() => best.action,
            _ => no_move(view),
        }
    }
}

// ============================================================================
// 策略名稱
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotKind {
    Random,
    Greedy,
    Defensive,
    Tree { depth: u32 },
}

impl BotKind {
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            BotKind::Random => Box::new(RandomBot),
            BotKind::Greedy => Box::new(GreedyBot),
            BotKind::Defensive => Box::new(DefensiveBot),
            BotKind::Tree { depth } => Box::new(TreeBot::new(SearchConfig::with_depth(depth))),
        }
    }
}

impl std::fmt::Display for BotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotKind::Random => write!(f, "random"),
            BotKind::Greedy => write!(f, "greedy"),
            BotKind::Defensive => write!(f, "defensive"),
            BotKind::Tree { depth } => write!(f, "tree{}", depth),
        }
    }
}

/// `random` / `greedy` / `defensive` / `tree`（深度 1）/ `tree<深度>`
impl FromStr for BotKind {
    type Err = DominoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "random" => Ok(BotKind::Random),
            "greedy" => Ok(BotKind::Greedy),
            "defensive" => Ok(BotKind::Defensive),
            "tree" => Ok(BotKind::Tree { depth: 1 }),
            other => other
                .strip_prefix("tree")
                .and_then(|depth| depth.parse().ok())
                .map(|depth| BotKind::Tree { depth })
                .ok_or_else(|| DominoError::UnknownStrategy(s.to_string())),
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================
