//! 組合機率
//!
//! 對手手牌未知，只知道張數。這裡估計：
//! - 對手手中完全沒有可出牌（必須摸牌）的機率
//! - 摸牌時平均要摸幾張
//! - 每一步候選出牌恰好是對手「手中最好的一張」的機率

use crate::game::{Placement, TileSet};

/// 二項式係數 C(n, r)；n、r 為負或 r > n 時為 0
///
/// 逐步相乘再整除，每一步都是整數；中間值以 u128 計算。
/// 結果超出 u64 屬於呼叫端錯誤。
pub fn n_choose_r(n: i64, r: i64) -> u64 {
    if n < 0 || r < 0 || r > n {
        return 0;
    }
    let r = r.min(n - r) as u128;
    let n = n as u128;
    let mut result: u128 = 1;
    for i in 0..r {
        result = result * (n - i) / (i + 1);
    }
    u64::try_from(result).unwrap_or_else(|_| panic!("C({}, {}) overflows u64", n, r))
}

/// 從 `total_unseen` 張未見牌抽出 `hand_size` 張，一張 `num_valid` 都沒抽到的機率
pub fn probability_of_draw(num_valid: usize, hand_size: usize, total_unseen: usize) -> f64 {
    assert!(total_unseen > 0, "unseen tile pool is empty");
    assert!(
        hand_size <= total_unseen,
        "hand of {} exceeds {} unseen tiles",
        hand_size,
        total_unseen
    );
    let misses = n_choose_r(total_unseen as i64 - num_valid as i64, hand_size as i64);
    let all = n_choose_r(total_unseen as i64, hand_size as i64);
    misses as f64 / all as f64
}

/// 已知要摸牌時，直到摸到第一張可出牌的期望張數（四捨五入）
///
/// 牌堆沒有可出牌時整堆摸完。
pub fn expected_draws_given_drawing(num_valid: usize, boneyard_size: usize) -> usize {
    let mut expected = 0.0;
    let mut reach = 1.0;
    for draw in 1..=boneyard_size {
        let left = boneyard_size - draw + 1;
        let stop = if draw == boneyard_size {
            1.0
        } else {
            (num_valid as f64 / left as f64).min(1.0)
        };
        expected += reach * stop * draw as f64;
        reach *= 1.0 - stop;
    }
    expected.round() as usize
}

/// 對手每個候選出牌是其最佳出牌的機率，順序與 `move_values` 一致
///
/// `move_values` 為搜尋方視角的價值，對手偏好低值：依價值遞增穩定排序，
/// 同值時先出現者優先。同一張骨牌只有排最前的那一步會分到機率。
/// 第 k 張相異骨牌的機率為
/// `(1 - 前面累計) * min(1, hand_size / (total_unseen - k))`，
/// 全部加總等於 `1 - probability_of_draw`。
pub fn probability_each_move_is_opponents_best(
    move_values: &[(Placement, f64)],
    hand_size: usize,
    total_unseen: usize,
) -> Vec<f64> {
    assert!(total_unseen > 0, "unseen tile pool is empty");

    let mut order: Vec<usize> = (0..move_values.len()).collect();
    order.sort_by(|&a, &b| move_values[a].1.total_cmp(&move_values[b].1));

    let mut probabilities = vec![0.0; move_values.len()];
    let mut seen = TileSet::EMPTY;
    let mut cumulative = 0.0;
    for idx in order {
        let ((tile, _), _) = move_values[idx];
        if !seen.insert(tile) {
            continue;
        }
        let left = total_unseen.saturating_sub(seen.len() - 1);
        if left == 0 {
            break;
        }
        let factor = (hand_size as f64 / left as f64).min(1.0);
        let p = ((1.0 - cumulative) * factor).max(0.0);
        probabilities[idx] = p;
        cumulative += p;
    }
    probabilities
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Tile};
    use proptest::prelude::*;

    const EPS: f64 = 1e-12;

    /// 每步一張不同骨牌
    fn distinct_moves(values: &[f64]) -> Vec<(Placement, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ((Tile::from_id(i), Direction::Right), v))
            .collect()
    }

    fn expected_value(values: &[f64], hand_size: usize, total: usize) -> f64 {
        let moves = distinct_moves(values);
        probability_each_move_is_opponents_best(&moves, hand_size, total)
            .iter()
            .zip(values)
            .map(|(p, v)| p * v)
            .sum()
    }

    #[test]
    fn test_n_choose_r() {
        assert_eq!(n_choose_r(10, 5), 252);
        assert_eq!(n_choose_r(28, 7), 1_184_040);
        assert_eq!(n_choose_r(5, 0), 1);
        assert_eq!(n_choose_r(0, 0), 1);
        assert_eq!(n_choose_r(4, 5), 0);
        assert_eq!(n_choose_r(4, -1), 0);
        assert_eq!(n_choose_r(-3, 2), 0);
    }

    #[test]
    fn test_n_choose_r_large_inputs() {
        // 中間乘積超過 u64，結果仍在範圍內
        assert_eq!(n_choose_r(64, 32), 1_832_624_140_942_590_534);
        assert_eq!(n_choose_r(67, 33), 14_226_520_737_620_288_370);
        assert_eq!(n_choose_r(100, 3), 161_700);
        assert_eq!(n_choose_r(1_000_000, 2), 499_999_500_000);
    }

    #[test]
    fn test_probability_of_draw() {
        assert_eq!(probability_of_draw(10, 5, 10), 0.0);
        assert_eq!(probability_of_draw(6, 5, 10), 0.0);
        assert!((probability_of_draw(1, 1, 10) - 0.9).abs() < EPS);
        assert!((probability_of_draw(1, 9, 10) - 0.1).abs() < EPS);
        assert_eq!(probability_of_draw(0, 10, 10), 1.0);
        assert_eq!(probability_of_draw(0, 3, 10), 1.0);

        let miss_all = 7.0 / 10.0 * 6.0 / 9.0 * 5.0 / 8.0 * 4.0 / 7.0 * 3.0 / 6.0;
        assert!((probability_of_draw(3, 5, 10) - miss_all).abs() < EPS);
    }

    #[test]
    #[should_panic(expected = "unseen tile pool is empty")]
    fn test_probability_of_draw_empty_pool_panics() {
        probability_of_draw(0, 0, 0);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn test_probability_of_draw_oversized_hand_panics() {
        probability_of_draw(1, 6, 5);
    }

    #[test]
    fn test_expected_draws_given_drawing() {
        assert_eq!(expected_draws_given_drawing(5, 5), 1);
        assert_eq!(expected_draws_given_drawing(0, 5), 5);
        assert_eq!(expected_draws_given_drawing(3, 0), 0);

        let exp: f64 = 1.0 / 3.0 + (2.0 / 3.0) * 0.5 * 2.0 + (2.0 / 3.0) * 0.5 * 3.0;
        assert_eq!(expected_draws_given_drawing(1, 3), exp.round() as usize);

        let exp: f64 = 0.8 + 0.2 * (8.0 / 9.0) * 2.0 + 0.2 * (1.0 / 9.0) * 3.0;
        assert_eq!(expected_draws_given_drawing(8, 10), exp.round() as usize);
    }

    #[test]
    fn test_opponent_holds_everything_picks_lowest() {
        let values = [0.3, 0.5, 0.8, 0.8, 0.9];
        assert!((expected_value(&values, 5, 5) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_opponent_holds_one_tile_is_average() {
        let values = [0.3, 0.5, 0.8, 0.8, 0.9];
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        assert!((expected_value(&values, 1, 5) - avg).abs() < EPS);
    }

    #[test]
    fn test_opponent_holds_three_tiles() {
        let values = [0.3, 0.5, 0.8, 0.8, 0.9];
        let top = 3.0 / 5.0;
        let second = (1.0 - top) * (3.0 / 4.0);
        let third = 1.0 - top - second;
        let exp = top * 0.3 + second * 0.5 + third * 0.8;
        assert!((expected_value(&values, 3, 5) - exp).abs() < EPS);
    }

    #[test]
    fn test_some_tiles_not_playable() {
        let values = [0.3, 0.5];
        assert!((expected_value(&values, 5, 5) - 0.3).abs() < EPS);

        let top = 2.0 / 5.0;
        let second = (1.0 - top) * (2.0 / 4.0);
        let exp = top * 0.3 + second * 0.5;
        assert!((expected_value(&values, 2, 5) - exp).abs() < EPS);

        // 剩下的機率質量正好是必須摸牌
        let moves = distinct_moves(&values);
        let total: f64 = probability_each_move_is_opponents_best(&moves, 2, 5).iter().sum();
        assert!((total + probability_of_draw(2, 2, 5) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let moves = distinct_moves(&[0.9, 0.3, 0.5]);
        let probs = probability_each_move_is_opponents_best(&moves, 1, 3);
        assert!((probs[1] - 1.0 / 3.0).abs() < EPS);
        assert!((probs[2] - 1.0 / 3.0).abs() < EPS);
        assert!((probs[0] - 1.0 / 3.0).abs() < EPS);

        let probs = probability_each_move_is_opponents_best(&moves, 3, 3);
        assert_eq!(probs, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_same_tile_only_best_direction_counts() {
        let tile = Tile::new(6, 1);
        let moves = vec![
            ((tile, Direction::Left), 0.6),
            ((tile, Direction::Down), 0.4),
            ((Tile::new(0, 0), Direction::Up), 0.5),
        ];
        let probs = probability_each_move_is_opponents_best(&moves, 1, 4);
        assert_eq!(probs[0], 0.0);
        assert!((probs[1] - 0.25).abs() < EPS);
        assert!((probs[2] - 0.25).abs() < EPS);
    }

    #[test]
    fn test_ties_go_to_first_listed() {
        let moves = distinct_moves(&[0.5, 0.5]);
        let probs = probability_each_move_is_opponents_best(&moves, 2, 2);
        assert_eq!(probs, vec![1.0, 0.0]);
    }

    proptest! {
        #[test]
        fn prop_n_choose_r_symmetric(n in 0i64..=28, r in 0i64..=28) {
            prop_assume!(r <= n);
            prop_assert_eq!(n_choose_r(n, r), n_choose_r(n, n - r));
        }

        #[test]
        fn prop_pascal_rule(n in 1i64..=28, r in 1i64..=28) {
            prop_assume!(r <= n);
            prop_assert_eq!(n_choose_r(n, r), n_choose_r(n - 1, r - 1) + n_choose_r(n - 1, r));
        }

        #[test]
        fn prop_best_move_mass_matches_draw(
            values in proptest::collection::vec(0.0f64..1.0, 1..10),
            extra in 0usize..10,
            hand_size in 1usize..8,
        ) {
            let total = values.len() + extra;
            prop_assume!(hand_size <= total);
            let moves = distinct_moves(&values);
            let mass: f64 = probability_each_move_is_opponents_best(&moves, hand_size, total).iter().sum();
            let draw = probability_of_draw(values.len(), hand_size, total);
            prop_assert!((mass + draw - 1.0).abs() < 1e-9);
        }
    }
}
