//! 局面估值
//!
//! 葉節點把比分換算成勝率。勝率模型是常態近似的啟發式：
//! 兩邊各自還差多少分，以每次得分平均 10 分計算需要幾次得分，
//! 再以標準化差距經 sigmoid 變換。只保證對稱與單調，數值本身不精確。

use crate::game::{
    TileSet, AVG_POINTS_PER_SCORE, SCORE_MULTIPLE, SERVE_BONUS_FAR, SERVE_BONUS_LAST,
    SERVE_BONUS_MID, SERVE_BONUS_NEAR, Z_SATURATION,
};

/// 一局結束時拿分的一方
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundWinner {
    Me,
    Opponent,
}

fn sigmoid(x: f64) -> f64 {
    if x > Z_SATURATION {
        1.0
    } else if x < -Z_SATURATION {
        0.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

fn z_transform(z: f64) -> f64 {
    let sign = if z >= 0.0 { 1.0 } else { -1.0 };
    1.0 - sigmoid(sign * z * z)
}

/// 以目前比分估計獲勝機率
pub fn win_probability(my_score: u32, opp_score: u32, play_to: u32) -> f64 {
    if my_score >= play_to {
        return 1.0;
    }
    if opp_score >= play_to {
        return 0.0;
    }
    let my_needed = (play_to - my_score) as f64;
    let opp_needed = (play_to - opp_score) as f64;

    let n = (my_needed + opp_needed) / AVG_POINTS_PER_SCORE;
    let x = my_needed / AVG_POINTS_PER_SCORE;
    let p = 0.5;
    let z = (x - n * p) / (n * p * (1.0 - p));
    z_transform(z)
}

/// 發球（下一局先出）的加分；離目標越遠越多，加分本身不會讓人直接達標
pub fn service_bonus(score: u32, play_to: u32) -> u32 {
    if score >= play_to {
        return 0;
    }
    let remaining = play_to - score;
    let bonus = match remaining {
        r if r > 15 => SERVE_BONUS_FAR,
        r if r > 10 => SERVE_BONUS_MID,
        r if r > 5 => SERVE_BONUS_NEAR,
        _ => SERVE_BONUS_LAST,
    };
    bonus.min(remaining - 1)
}

/// 手牌先出完的一方下一局發球；輪到對手時對手手牌先視為少一張
pub fn is_on_serve(hand_size: usize, opp_hand_size: usize, my_turn: bool) -> bool {
    let opp_hand_size = if my_turn {
        opp_hand_size
    } else {
        opp_hand_size.saturating_sub(1)
    };
    hand_size <= opp_hand_size
}

/// 搜尋截斷時的估值：已達標直接 1 / 0，否則發球方加分後換算勝率
pub fn terminal_value(
    my_score: u32,
    opp_score: u32,
    play_to: u32,
    hand_size: usize,
    opp_hand_size: usize,
    my_turn: bool,
) -> f64 {
    if my_score >= play_to {
        return 1.0;
    }
    if opp_score >= play_to {
        return 0.0;
    }
    let (mut my_score, mut opp_score) = (my_score, opp_score);
    if is_on_serve(hand_size, opp_hand_size, my_turn) {
        my_score += service_bonus(my_score, play_to);
    } else {
        opp_score += service_bonus(opp_score, play_to);
    }
    win_probability(my_score, opp_score, play_to)
}

/// 點數向下取到 5 的倍數
pub fn round_down_to_multiple(points: f64) -> u32 {
    let multiple = SCORE_MULTIPLE as f64;
    ((points / multiple).floor() * multiple).max(0.0) as u32
}

/// 對手手牌的期望點數：未見牌平均點數 × 對手張數
pub fn expected_opponent_pips(unseen: TileSet, opp_hand_size: usize) -> f64 {
    if unseen.is_empty() {
        return 0.0;
    }
    unseen.total_points() as f64 * opp_hand_size as f64 / unseen.len() as f64
}

/// 一局結束：`winner` 拿 `points`（取到 5 的倍數）並取得發球加分
pub fn round_end_value(
    my_score: u32,
    opp_score: u32,
    play_to: u32,
    winner: Option<RoundWinner>,
    points: f64,
) -> f64 {
    let (mut my_score, mut opp_score) = (my_score, opp_score);
    match winner {
        Some(RoundWinner::Me) => {
            my_score += round_down_to_multiple(points);
            my_score += service_bonus(my_score, play_to);
        }
        Some(RoundWinner::Opponent) => {
            opp_score += round_down_to_multiple(points);
            opp_score += service_bonus(opp_score, play_to);
        }
        None => {}
    }
    win_probability(my_score, opp_score, play_to)
}

/// 雙方都無牌可出：手牌點數較少的一方拿走對方點數
pub fn boxed_out_value(
    hand: TileSet,
    unseen: TileSet,
    opp_hand_size: usize,
    my_score: u32,
    opp_score: u32,
    play_to: u32,
) -> f64 {
    let my_pips = hand.total_points() as f64;
    let opp_pips = expected_opponent_pips(unseen, opp_hand_size);
    if my_pips < opp_pips {
        round_end_value(my_score, opp_score, play_to, Some(RoundWinner::Me), opp_pips)
    } else if opp_pips < my_pips {
        round_end_value(my_score, opp_score, play_to, Some(RoundWinner::Opponent), my_pips)
    } else {
        round_end_value(my_score, opp_score, play_to, None, 0.0)
    }
}

/// 有人出完手牌：出完的一方拿走對方剩餘點數
pub fn domino_value(
    hand: TileSet,
    unseen: TileSet,
    opp_hand_size: usize,
    my_score: u32,
    opp_score: u32,
    play_to: u32,
    winner: RoundWinner,
) -> f64 {
    let points = match winner {
        RoundWinner::Me => expected_opponent_pips(unseen, opp_hand_size),
        RoundWinner::Opponent => hand.total_points() as f64,
    };
    round_end_value(my_score, opp_score, play_to, Some(winner), points)
}

// ============================================================================
// 單元測試
// ============================================================================
