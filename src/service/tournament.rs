//! 對戰統計
//!
//! - `tournament`: 多場完整對局，統計各座位策略的勝場
//! - `serve_stats`: 單局統計「先出」的價值

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{DominoError, Result};

use super::bots::{BotKind, Strategy};
use super::game::{Game, GameConfig};

// ============================================================================
// 結果
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyRecord {
    pub seat: usize,
    pub strategy: String,
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentSummary {
    pub games: usize,
    pub play_to: u32,
    pub records: Vec<StrategyRecord>,
    /// 超過回合上限沒打完的場數
    pub unfinished: usize,
}

impl TournamentSummary {
    pub fn win_rate(&self, seat: usize) -> f64 {
        let finished = self.games - self.unfinished;
        match self.records.get(seat) {
            Some(record) if finished > 0 => record.wins as f64 / finished as f64,
            _ => 0.0,
        }
    }
}

/// 先出方保住 / 失去發球權時的平均分差
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServeStats {
    pub rounds: usize,
    pub kept_serve: usize,
    pub keep_probability: f64,
    pub avg_delta_kept: Option<f64>,
    pub avg_delta_lost: Option<f64>,
    /// E = (p1·s1 + p2·s2) / p2
    pub expected_value: Option<f64>,
}

// ============================================================================
// 驅動
// ============================================================================

fn seat_names(kinds: &[BotKind]) -> Vec<String> {
    kinds
        .iter()
        .enumerate()
        .map(|(seat, kind)| format!("{}-{}", kind, seat))
        .collect()
}

fn build_strategies(kinds: &[BotKind]) -> Vec<Box<dyn Strategy>> {
    kinds.iter().map(|kind| kind.build()).collect()
}

/// 由主種子衍生每場的種子
fn game_seeds(count: usize, seed: u64) -> Vec<u64> {
    let mut master = StdRng::seed_from_u64(seed);
    (0..count).map(|_| master.gen()).collect()
}

/// 平行打 `games` 場完整對局
pub fn tournament(
    kinds: &[BotKind],
    games: usize,
    config: GameConfig,
    seed: u64,
) -> Result<TournamentSummary> {
    let names = seat_names(kinds);
    // 先驗證座位設定，錯誤不必等到平行區塊內
    Game::new(names.clone(), config, seed)?;

    let wins: DashMap<usize, u32> = DashMap::new();
    let unfinished = game_seeds(games, seed)
        .into_par_iter()
        .enumerate()
        .filter(|&(index, game_seed)| {
            let mut strategies = build_strategies(kinds);
            let outcome = Game::new(names.clone(), config, game_seed).and_then(|mut game| {
                game.play(&mut strategies)?;
                Ok(game.winner())
            });
            match outcome {
                Ok(Some(winner)) => {
                    *wins.entry(winner).or_insert(0) += 1;
                    false
                }
                Ok(None) => true,
                Err(err) => {
                    warn!(game = index, %err, "game did not finish");
                    true
                }
            }
        })
        .count();

    let records: Vec<StrategyRecord> = kinds
        .iter()
        .enumerate()
        .map(|(seat, kind)| StrategyRecord {
            seat,
            strategy: kind.to_string(),
            wins: wins.get(&seat).map_or(0, |w| *w),
        })
        .collect();

    info!(
        games,
        unfinished,
        wins = ?records.iter().map(|r| r.wins).collect::<Vec<_>>(),
        "tournament finished"
    );
    Ok(TournamentSummary {
        games,
        play_to: config.play_to,
        records,
        unfinished,
    })
}

/// 雙人單局：座位 0 每局先出，統計保住先出權的機率與分差
pub fn serve_stats(
    kinds: &[BotKind],
    rounds: usize,
    config: GameConfig,
    seed: u64,
) -> Result<ServeStats> {
    if kinds.len() != 2 {
        return Err(DominoError::InvalidPlayers(format!(
            "serve statistics need exactly 2 players, got {}",
            kinds.len()
        )));
    }
    let names = seat_names(kinds);
    Game::new(names.clone(), config, seed)?;

    let samples: Vec<(bool, i64)> = game_seeds(rounds, seed)
        .into_par_iter()
        .enumerate()
        .filter_map(|(index, round_seed)| {
            let mut strategies = build_strategies(kinds);
            let outcome = Game::new(names.clone(), config, round_seed).and_then(|mut game| {
                game.set_leader(0);
                let end = game.play_round(&mut strategies)?;
                let scores = game.scores();
                Ok((end.player() == 0, scores[0] as i64 - scores[1] as i64))
            });
            match outcome {
                Ok(sample) => Some(sample),
                Err(err) => {
                    warn!(round = index, %err, "round did not finish");
                    None
                }
            }
        })
        .collect();

    let stats = summarize_serve(&samples);
    info!(
        rounds = stats.rounds,
        kept = stats.kept_serve,
        expected_value = ?stats.expected_value,
        "serve statistics finished"
    );
    Ok(stats)
}

fn mean(values: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, count) = values.fold((0i64, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum as f64 / count as f64)
}

fn summarize_serve(samples: &[(bool, i64)]) -> ServeStats {
    let rounds = samples.len();
    let kept_serve = samples.iter().filter(|(kept, _)| *kept).count();
    let avg_delta_kept = mean(samples.iter().filter(|s| s.0).map(|s| s.1));
    let avg_delta_lost = mean(samples.iter().filter(|s| !s.0).map(|s| s.1));
    let keep_probability = if rounds > 0 {
        kept_serve as f64 / rounds as f64
    } else {
        0.0
    };
    let lose_probability = 1.0 - keep_probability;

    let expected_value = match (avg_delta_kept, avg_delta_lost) {
        (Some(s1), Some(s2)) if lose_probability > 0.0 => {
            Some((keep_probability * s1 + lose_probability * s2) / lose_probability)
        }
        _ => None,
    };

    ServeStats {
        rounds,
        kept_serve,
        keep_probability,
        avg_delta_kept,
        avg_delta_lost,
        expected_value,
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_serve() {
        let samples = [(true, 20), (true, 10), (false, -10), (false, -30)];
        let stats = summarize_serve(&samples);
        assert_eq!(stats.rounds, 4);
        assert_eq!(stats.kept_serve, 2);
        assert_eq!(stats.avg_delta_kept, Some(15.0));
        assert_eq!(stats.avg_delta_lost, Some(-20.0));
        // (0.5·15 + 0.5·(−20)) / 0.5
        let ev = stats.expected_value.unwrap();
        assert!((ev - -5.0).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_serve_always_kept() {
        let stats = summarize_serve(&[(true, 15), (true, 5)]);
        assert_eq!(stats.keep_probability, 1.0);
        assert_eq!(stats.avg_delta_lost, None);
        assert_eq!(stats.expected_value, None);
    }

    #[test]
    fn test_game_seeds_are_reproducible() {
        assert_eq!(game_seeds(8, 3), game_seeds(8, 3));
        assert_ne!(game_seeds(8, 3), game_seeds(8, 4));
    }

    #[test]
    fn test_serve_stats_requires_two_players() {
        let kinds = [BotKind::Greedy, BotKind::Greedy, BotKind::Random];
        assert!(matches!(
            serve_stats(&kinds, 4, GameConfig::default(), 0),
            Err(DominoError::InvalidPlayers(_))
        ));
    }

    #[test]
    fn test_win_rate() {
        let summary = TournamentSummary {
            games: 10,
            play_to: 150,
            records: vec![
                StrategyRecord { seat: 0, strategy: "greedy".into(), wins: 6 },
                StrategyRecord { seat: 1, strategy: "random".into(), wins: 2 },
            ],
            unfinished: 2,
        };
        assert_eq!(summary.win_rate(0), 0.75);
        assert_eq!(summary.win_rate(1), 0.25);
        assert_eq!(summary.win_rate(5), 0.0);
    }
}
