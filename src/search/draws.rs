//! 摸牌模擬
//!
//! 無牌可出時，從「未上盤且不在我方手中」的牌池隨機一張張摸，
//! 摸到可出的牌或摸滿牌堆張數為止。亂數由呼叫端注入。

use rand::Rng;

use crate::game::{Board, Move, Tile, TileSet};

/// 一個候選行動，連同為了它必須先摸進手中的牌
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub action: Move,
    pub extra: TileSet,
}

impl Candidate {
    pub fn new(action: Move, extra: TileSet) -> Self {
        Self { action, extra }
    }
}

/// 模擬一串摸牌；最後一張若可出即停止
///
/// `pool` 中每張都可能在牌堆裡；最多摸 `boneyard_size` 張。
pub fn simulate_draws<R: Rng>(
    board: &Board,
    pool: TileSet,
    boneyard_size: usize,
    rng: &mut R,
) -> Vec<Tile> {
    assert!(
        boneyard_size <= pool.len(),
        "boneyard of {} exceeds {} unseen tiles",
        boneyard_size,
        pool.len()
    );
    let mut pool: Vec<Tile> = pool.iter().collect();
    let mut drawn = Vec::new();
    while drawn.len() < boneyard_size {
        let tile = pool.swap_remove(rng.gen_range(0..pool.len()));
        drawn.push(tile);
        if board.has_legal_move(TileSet::from_iter([tile])) {
            break;
        }
    }
    drawn
}

/// 一次摸牌結果展開成候選：最後一張可出則每個方向一個 Play，否則 Knock
///
/// 所有摸到的牌（含要打出的那張）都計入 `extra`。
pub fn draw_candidates(board: &Board, drawn: &[Tile]) -> Vec<Candidate> {
    let extra: TileSet = drawn.iter().copied().collect();
    let plays: Vec<Candidate> = drawn
        .last()
        .map(|&last| board.playable_moves(last))
        .unwrap_or_default()
        .into_iter()
        .map(|placement| Candidate::new(placement.into(), extra))
        .collect();
    if plays.is_empty() {
        vec![Candidate::new(Move::Knock, extra)]
    } else {
        plays
    }
}
