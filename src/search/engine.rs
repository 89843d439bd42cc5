//! 期望值樹搜尋
//!
//! 節點輪到我方：列舉手中合法出牌（無牌時模擬摸牌），逐一原地套用、
//! 評估、還原。我方出牌後換對手：對手手牌未知，只能以未見牌列舉
//! 對手可能的出牌，再以組合機率加權其「最佳出牌」與「必須摸牌」兩種情況。
//! 葉節點以勝率估值。
//!
//! 搜尋只在根節點複製一次局面；平行模式下每個根候選各自複製。

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::game::{Move, Placement, TileSet};

use super::combinatorics::{
    expected_draws_given_drawing, probability_each_move_is_opponents_best, probability_of_draw,
};
use super::config::SearchConfig;
use super::draws::{draw_candidates, simulate_draws, Candidate};
use super::state::GameState;
use super::valuation::RoundWinner;

// ============================================================================
// 結果
// ============================================================================

/// 一個根候選行動的期望勝率
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveValue {
    pub action: Move,
    pub value: f64,
}

impl MoveValue {
    pub fn new(action: Move, value: f64) -> Self {
        Self { action, value }
    }
}

/// 單次搜尋的統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub nodes: u64,
    pub root_candidates: usize,
    pub elapsed_us: u64,
}

/// 搜尋結果：行動 → 期望勝率
///
/// 無牌可出時只有一筆 `Draw`（各次模擬平均）或 `Knock`。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    values: Vec<MoveValue>,
    stats: SearchStats,
}

impl SearchResult {
    pub fn values(&self) -> &[MoveValue] {
        &self.values
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, action: Move) -> Option<f64> {
        self.values.iter().find(|mv| mv.action == action).map(|mv| mv.value)
    }

    /// 期望值最高者；同值取先列出的
    pub fn best(&self) -> Option<MoveValue> {
        self.values.iter().copied().fold(None, |best, mv| match best {
            Some(b) if b.value >= mv.value => Some(b),
            _ => Some(mv),
        })
    }

    /// 依期望值由高到低排序（穩定）
    pub fn ranked(&self) -> Vec<MoveValue> {
        let mut ranked = self.values.clone();
        ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
        ranked
    }
}

// ============================================================================
// 搜尋入口
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSearch {
    config: SearchConfig,
}

impl TreeSearch {
    pub fn new(config: SearchConfig) -> Self {
        assert!(config.draw_simulations > 0, "draw_simulations must be positive");
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// 評估目前輪到我方的局面
    pub fn search<R: Rng>(&self, state: &GameState, rng: &mut R) -> SearchResult {
        state.check_invariants();
        assert!(state.my_turn, "search must start on the searcher's turn");
        let started = Instant::now();
        let mut work = state.clone();
        let depth = self.config.depth;

        let (values, nodes) = if self.config.parallel {
            self.search_parallel(&mut work, depth, rng)
        } else {
            let mut worker = Worker::new(self.config);
            let values = worker.node(&mut work, depth, true, rng);
            (values, worker.nodes)
        };
        debug_assert_eq!(&work, state, "search left the state modified");

        let stats = SearchStats {
            nodes,
            root_candidates: values.len(),
            elapsed_us: started.elapsed().as_micros() as u64,
        };
        debug!(
            depth,
            nodes = stats.nodes,
            candidates = stats.root_candidates,
            elapsed_us = stats.elapsed_us,
            parallel = self.config.parallel,
            "tree search finished"
        );
        SearchResult { values, stats }
    }

    /// 根候選平行評估；每個候選各自複製局面並以獨立種子建立亂數
    fn search_parallel<R: Rng>(
        &self,
        work: &mut GameState,
        depth: u32,
        rng: &mut R,
    ) -> (Vec<MoveValue>, u64) {
        let own = work.board.legal_moves(Some(work.hand));
        if own.is_empty() || work.board.is_blocked() {
            let mut worker = Worker::new(self.config);
            let values = worker.node(work, depth, true, rng);
            return (values, worker.nodes);
        }

        let seeded: Vec<(Placement, u64)> = own.into_iter().map(|p| (p, rng.gen())).collect();
        let config = self.config;
        let shared: &GameState = work;
        let results: Vec<(MoveValue, u64)> = seeded
            .into_par_iter()
            .map(|(placement, seed)| {
                let mut local = shared.clone();
                let mut rng = StdRng::seed_from_u64(seed);
                let mut worker = Worker::new(config);
                let candidate = Candidate::new(placement.into(), TileSet::EMPTY);
                let value = worker.evaluate(&mut local, depth, candidate, &mut rng);
                (MoveValue::new(placement.into(), value), worker.nodes)
            })
            .collect();

        let nodes = 1 + results.iter().map(|(_, n)| n).sum::<u64>();
        (results.into_iter().map(|(mv, _)| mv).collect(), nodes)
    }
}

/// 以預設參數、指定深度搜尋
pub fn search<R: Rng>(depth: u32, state: &GameState, rng: &mut R) -> SearchResult {
    TreeSearch::new(SearchConfig::with_depth(depth)).search(state, rng)
}

// ============================================================================
// 遞迴
// ============================================================================

struct Worker {
    config: SearchConfig,
    nodes: u64,
}

impl Worker {
    fn new(config: SearchConfig) -> Self {
        Self { config, nodes: 0 }
    }

    /// 我方節點；根節點列出全部合法出牌，內部節點略去對稱重複
    fn node<R: Rng>(
        &mut self,
        state: &mut GameState,
        depth: u32,
        root: bool,
        rng: &mut R,
    ) -> Vec<MoveValue> {
        self.nodes += 1;

        if state.board.is_blocked() {
            return vec![MoveValue::new(Move::Knock, state.boxed_out_value())];
        }

        let own = if root {
            state.board.legal_moves(Some(state.hand))
        } else {
            state.board.unique_legal_moves(Some(state.hand))
        };
        if !own.is_empty() {
            return own
                .into_iter()
                .map(|placement| {
                    let candidate = Candidate::new(placement.into(), TileSet::EMPTY);
                    MoveValue::new(placement.into(), self.evaluate(state, depth, candidate, rng))
                })
                .collect();
        }

        let boneyard = state.boneyard_size();
        if boneyard == 0 {
            let candidate = Candidate::new(Move::Knock, TileSet::EMPTY);
            return vec![MoveValue::new(Move::Knock, self.evaluate(state, depth, candidate, rng))];
        }

        // 各次模擬等權平均
        let samples = self.config.draw_simulations;
        let mut total = 0.0;
        for _ in 0..samples {
            let drawn = simulate_draws(&state.board, state.unseen(), boneyard, rng);
            total += draw_candidates(&state.board, &drawn)
                .into_iter()
                .map(|candidate| self.evaluate(state, depth, candidate, rng))
                .fold(f64::NEG_INFINITY, f64::max);
        }
        vec![MoveValue::new(Move::Draw, total / samples as f64)]
    }

    fn best_value<R: Rng>(&mut self, state: &mut GameState, depth: u32, rng: &mut R) -> f64 {
        self.node(state, depth, false, rng)
            .into_iter()
            .map(|mv| mv.value)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// 套用一個候選、評估、完全還原
    fn evaluate<R: Rng>(
        &mut self,
        state: &mut GameState,
        depth: u32,
        candidate: Candidate,
        rng: &mut R,
    ) -> f64 {
        debug_assert!(candidate.extra.is_disjoint(state.hand));
        state.hand = state.hand | candidate.extra;

        let placed = match candidate.action {
            Move::Play(tile, direction) => {
                assert!(state.hand.contains(tile), "{} is not in hand", tile);
                let score = state.board.place(tile, direction);
                state.hand.remove(tile);
                state.my_score += score;
                Some((tile, direction, score))
            }
            Move::Draw | Move::Knock => None,
        };

        state.my_turn = false;
        let value = self.after_my_move(state, depth, rng);
        state.my_turn = true;

        if let Some((tile, direction, score)) = placed {
            state.my_score -= score;
            let removed = state.board.remove(direction);
            debug_assert_eq!(removed, tile);
            state.hand.insert(tile);
        }
        state.hand = state.hand - candidate.extra;
        value
    }

    fn after_my_move<R: Rng>(&mut self, state: &mut GameState, depth: u32, rng: &mut R) -> f64 {
        if state.my_score >= state.play_to {
            return 1.0;
        }
        if state.hand.is_empty() {
            return state.domino_value(RoundWinner::Me);
        }
        if state.board.is_blocked() {
            return state.boxed_out_value();
        }
        if depth == 0 {
            return state.terminal_value();
        }
        self.opponent_reply(state, depth, rng)
    }

    /// 對手節點：以未見牌列舉其可能出牌並以機率加權
    fn opponent_reply<R: Rng>(&mut self, state: &mut GameState, depth: u32, rng: &mut R) -> f64 {
        let unseen = state.unseen();
        let total = unseen.len();
        let opp_hand = state.opp_hand_size;
        let opp_moves = state.board.unique_legal_moves(Some(unseen));

        // 可出的牌都在我方手中：對手摸光牌堆後敲桌
        if opp_moves.is_empty() {
            let boneyard = state.boneyard_size();
            state.opp_hand_size += boneyard;
            state.my_turn = true;
            let value = self.best_value(state, depth - 1, rng);
            state.my_turn = false;
            state.opp_hand_size = opp_hand;
            return value;
        }

        let num_valid = opp_moves.iter().map(|&(tile, _)| tile).collect::<TileSet>().len();
        let prob_draw = probability_of_draw(num_valid, opp_hand, total);
        let extra_draws = if prob_draw > 0.0 {
            expected_draws_given_drawing(num_valid, total - opp_hand)
        } else {
            0
        };

        let mut played = Vec::with_capacity(opp_moves.len());
        let mut after_drawing = Vec::new();
        for (tile, direction) in opp_moves {
            let score = state.board.place(tile, direction);
            state.opp_score += score;

            state.opp_hand_size = opp_hand - 1;
            played.push(((tile, direction), self.after_opponent_move(state, depth, rng)));

            if prob_draw > 0.0 {
                state.opp_hand_size = opp_hand - 1 + extra_draws;
                after_drawing.push(self.after_opponent_move(state, depth, rng));
            }

            state.opp_hand_size = opp_hand;
            state.opp_score -= score;
            state.board.remove(direction);
        }

        let probabilities = probability_each_move_is_opponents_best(&played, opp_hand, total);
        let mut expected: f64 = played
            .iter()
            .zip(&probabilities)
            .map(|((_, value), p)| p * value)
            .sum();
        if !after_drawing.is_empty() {
            let mean = after_drawing.iter().sum::<f64>() / after_drawing.len() as f64;
            expected += prob_draw * mean;
        }
        expected
    }

    fn after_opponent_move<R: Rng>(
        &mut self,
        state: &mut GameState,
        depth: u32,
        rng: &mut R,
    ) -> f64 {
        if state.opp_score >= state.play_to {
            return 0.0;
        }
        if state.opp_hand_size == 0 {
            return state.domino_value(RoundWinner::Opponent);
        }
        state.my_turn = true;
        let value = self.best_value(state, depth - 1, rng);
        state.my_turn = false;
        value
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, Direction, Tile};
    use crate::search::valuation;

    use Direction::{Down, Left, Right, Up};

    fn t(a: u8, b: u8) -> Tile {
        Tile::new(a, b)
    }

    fn set(tiles: &[Tile]) -> TileSet {
        tiles.iter().copied().collect()
    }

    fn cross_board() -> Board {
        Board::from_placements(&[
            (t(6, 6), Right),
            (t(6, 3), Right),
            (t(6, 4), Left),
            (t(6, 0), Up),
            (t(3, 3), Right),
            (t(4, 5), Left),
            (t(5, 6), Left),
        ])
    }

    fn nearly_blocked_board() -> Board {
        Board::from_placements(&[
            (t(6, 6), Right),
            (t(6, 0), Right),
            (t(1, 0), Right),
            (t(1, 6), Right),
            (t(6, 2), Right),
            (t(2, 3), Right),
            (t(6, 3), Right),
            (t(6, 4), Left),
            (t(5, 4), Left),
            (t(5, 5), Left),
            (t(5, 3), Left),
            (t(3, 0), Left),
            (t(0, 5), Left),
            (t(5, 1), Left),
            (t(1, 2), Left),
            (t(2, 5), Left),
        ])
    }

    fn scoring_state() -> GameState {
        GameState::new(cross_board(), 0, 0, 150, set(&[t(3, 4), t(0, 3), t(6, 1)]), 4)
    }

    #[test]
    fn test_depth_zero_prefers_biggest_score() {
        let state = scoring_state();
        let mut rng = StdRng::seed_from_u64(1);
        let result = search(0, &state, &mut rng);

        assert_eq!(result.len(), 5);
        let best = result.best().unwrap();
        assert_eq!(best.action, Move::Play(t(0, 3), Up));
        assert!(result.get(Move::Play(t(3, 4), Right)).unwrap() > result.get(Move::Play(t(6, 1), Left)).unwrap());
        assert_eq!(
            result.get(Move::Play(t(0, 3), Up)),
            Some(valuation::win_probability(15 + 12, 0, 150))
        );
    }

    #[test]
    fn test_root_lists_every_legal_move() {
        let state = scoring_state();
        let mut rng = StdRng::seed_from_u64(2);
        let result = search(1, &state, &mut rng);

        let expected = state.board.legal_moves(Some(state.hand));
        let actions: Vec<Move> = result.values().iter().map(|mv| mv.action).collect();
        assert_eq!(actions, expected.into_iter().map(Move::from).collect::<Vec<_>>());
        for mv in result.values() {
            assert!((0.0..=1.0).contains(&mv.value), "{:?}", mv);
        }
        assert!(result.stats().nodes > 1);
    }

    #[test]
    fn test_search_is_reproducible_with_same_seed() {
        let state = scoring_state();
        let a = search(1, &state, &mut StdRng::seed_from_u64(9)).values().to_vec();
        let b = search(1, &state, &mut StdRng::seed_from_u64(9)).values().to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn test_worker_restores_state() {
        let mut state = scoring_state();
        let before = state.clone();
        let mut worker = Worker::new(SearchConfig::with_depth(2));
        let mut rng = StdRng::seed_from_u64(3);
        let values = worker.node(&mut state, 2, true, &mut rng);
        assert!(!values.is_empty());
        assert_eq!(state, before);
        assert!(worker.nodes > 1);
    }

    #[test]
    fn test_blocked_board_is_knock() {
        let board = Board::from_placements(&[
            (t(6, 6), Right),
            (t(6, 0), Right),
            (t(1, 0), Right),
            (t(1, 6), Right),
            (t(6, 2), Right),
            (t(2, 3), Right),
            (t(6, 3), Right),
            (t(6, 4), Left),
            (t(5, 4), Left),
            (t(5, 6), Left),
        ]);
        assert!(board.is_blocked());
        let state = GameState::new(board, 30, 40, 150, set(&[t(0, 0), t(1, 1)]), 3);
        let result = search(2, &state, &mut StdRng::seed_from_u64(4));
        assert_eq!(result.len(), 1);
        assert_eq!(result.values()[0].action, Move::Knock);
        assert_eq!(result.values()[0].value, state.boxed_out_value());
    }

    #[test]
    fn test_no_moves_with_boneyard_draws() {
        let state = GameState::new(
            nearly_blocked_board(),
            0,
            0,
            150,
            set(&[t(1, 1), t(2, 2), t(3, 3), t(4, 4)]),
            4,
        );
        assert_eq!(state.boneyard_size(), 4);
        let result = search(1, &state, &mut StdRng::seed_from_u64(5));
        assert_eq!(result.len(), 1);
        assert_eq!(result.values()[0].action, Move::Draw);
        let value = result.values()[0].value;
        assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn test_no_moves_without_boneyard_knocks() {
        let state = GameState::new(
            nearly_blocked_board(),
            0,
            0,
            150,
            set(&[t(1, 1), t(2, 2), t(3, 3), t(4, 4)]),
            8,
        );
        assert_eq!(state.boneyard_size(), 0);
        let result = search(1, &state, &mut StdRng::seed_from_u64(6));
        assert_eq!(result.len(), 1);
        assert_eq!(result.values()[0].action, Move::Knock);
    }

    #[test]
    fn test_reaching_target_is_certain_win() {
        let mut state = scoring_state();
        state.my_score = 140;
        let result = search(1, &state, &mut StdRng::seed_from_u64(7));
        // 15 分與 10 分都達標
        assert_eq!(result.get(Move::Play(t(0, 3), Up)), Some(1.0));
        assert_eq!(result.get(Move::Play(t(3, 4), Right)), Some(1.0));
        assert_eq!(result.best().unwrap().value, 1.0);
        assert!(result.get(Move::Play(t(6, 1), Left)).unwrap() < 1.0);
    }

    #[test]
    fn test_going_out_uses_domino_value() {
        // 只剩一張，打出即出完
        let state = GameState::new(cross_board(), 0, 0, 150, set(&[t(6, 1)]), 5);
        let result = search(1, &state, &mut StdRng::seed_from_u64(8));
        let mut after = state.clone();
        after.board.place(t(6, 1), Down);
        after.hand = TileSet::EMPTY;
        assert_eq!(
            result.get(Move::Play(t(6, 1), Down)),
            Some(after.domino_value(RoundWinner::Me))
        );
    }

    #[test]
    fn test_parallel_matches_sequential_without_draws() {
        let state = scoring_state();
        let sequential = TreeSearch::new(SearchConfig::with_depth(0))
            .search(&state, &mut StdRng::seed_from_u64(10));
        let parallel = TreeSearch::new(SearchConfig::with_depth(0).parallel(true))
            .search(&state, &mut StdRng::seed_from_u64(10));
        assert_eq!(sequential.values(), parallel.values());

        let deeper = TreeSearch::new(SearchConfig::with_depth(1).parallel(true))
            .search(&state, &mut StdRng::seed_from_u64(10));
        assert_eq!(deeper.len(), 5);
    }

    /// 兩端都露 6，剩下的 6 全在手上（或只留 [4|6] 在外）
    fn six_ends_board() -> Board {
        Board::from_placements(&[(t(3, 6), Right), (t(3, 5), Left), (t(5, 6), Left)])
    }

    #[test]
    #[should_panic(expected = "searcher's turn")]
    fn test_search_rejects_opponent_turn() {
        let mut state = scoring_state();
        state.my_turn = false;
        search(0, &state, &mut StdRng::seed_from_u64(0));
    }

    #[test]
    fn test_depth_zero_leaf_is_opponent_to_move() {
        let state = scoring_state();
        let result = search(0, &state, &mut StdRng::seed_from_u64(1));
        let mut after = state.clone();
        after.my_score += after.board.place(t(6, 1), Left);
        after.hand.remove(t(6, 1));
        after.my_turn = false;
        assert_eq!(result.get(Move::Play(t(6, 1), Left)), Some(after.terminal_value()));
    }

    #[test]
    fn test_opponent_without_playable_tile_draws_boneyard() {
        let hand = set(&[t(6, 6), t(0, 6), t(1, 6), t(2, 6), t(4, 6)]);
        let state = GameState::new(six_ends_board(), 0, 0, 150, hand, 7);
        assert_eq!(state.boneyard_size(), 13);
        let result = search(1, &state, &mut StdRng::seed_from_u64(12));

        // 打出 [6|6] 後未見牌沒有 6：對手摸光 13 張牌堆
        let mut after = state.clone();
        assert_eq!(after.board.place(t(6, 6), Right), 0);
        after.hand.remove(t(6, 6));
        assert!(after.board.unique_legal_moves(Some(after.unseen())).is_empty());
        assert!(!after.board.is_blocked());
        after.opp_hand_size = 20;
        let expected = Worker::new(SearchConfig::with_depth(1)).best_value(
            &mut after,
            0,
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(result.get(Move::Play(t(6, 6), Right)), Some(expected));
    }

    #[test]
    fn test_opponent_reply_is_probability_weighted() {
        let hand = set(&[t(6, 6), t(0, 6), t(1, 6), t(2, 6)]);
        let state = GameState::new(six_ends_board(), 0, 0, 150, hand, 5);
        let result = search(1, &state, &mut StdRng::seed_from_u64(13));

        let mut base = state.clone();
        base.board.place(t(6, 6), Right);
        base.hand.remove(t(6, 6));
        assert_eq!(base.unseen().len(), 21);
        // 對手唯一可出的牌 [4|6]，左右各一步
        assert_eq!(
            base.board.unique_legal_moves(Some(base.unseen())),
            vec![(t(4, 6), Left), (t(4, 6), Right)]
        );

        let extra = expected_draws_given_drawing(1, 16);
        let reply_value = |direction: Direction, opp_hand_size: usize| {
            let mut after = base.clone();
            after.opp_score += after.board.place(t(4, 6), direction);
            after.opp_hand_size = opp_hand_size;
            Worker::new(SearchConfig::with_depth(1)).best_value(
                &mut after,
                0,
                &mut StdRng::seed_from_u64(0),
            )
        };
        let played = [reply_value(Left, 4), reply_value(Right, 4)];
        let drew = [reply_value(Left, 4 + extra), reply_value(Right, 4 + extra)];

        // 對手手上有 [4|6] 的機率 5/21，否則必須摸牌
        let p_best = 5.0 / 21.0;
        let p_draw = 16.0 / 21.0;
        assert!((probability_of_draw(1, 5, 21) - p_draw).abs() < 1e-12);
        let expected = p_best * played[0].min(played[1]) + p_draw * (drew[0] + drew[1]) / 2.0;

        let value = result.get(Move::Play(t(6, 6), Right)).unwrap();
        assert!((value - expected).abs() < 1e-12, "{} vs {}", value, expected);
    }

    #[test]
    fn test_result_ranking() {
        let result = SearchResult {
            values: vec![
                MoveValue::new(Move::Play(t(1, 1), Right), 0.4),
                MoveValue::new(Move::Play(t(2, 2), Right), 0.7),
                MoveValue::new(Move::Play(t(3, 3), Right), 0.7),
            ],
            stats: SearchStats::default(),
        };
        assert_eq!(result.best().unwrap().action, Move::Play(t(2, 2), Right));
        let ranked: Vec<f64> = result.ranked().iter().map(|mv| mv.value).collect();
        assert_eq!(ranked, vec![0.7, 0.7, 0.4]);
        assert_eq!(result.ranked()[0].action, Move::Play(t(2, 2), Right));
    }
}
