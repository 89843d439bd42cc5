//! 對局流程
//!
//! 發牌、輪流出牌、摸牌 / 敲桌、整局計分與勝負判定。
//! 每一步由目前玩家的 `Strategy` 決定，亂數由種子建立的 `StdRng` 提供。

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::error::{DominoError, Result};
use crate::game::{
    all_tiles, Board, Direction, Move, Tile, TileSet, DEFAULT_PLAY_TO, HAND_SIZE, MAX_PLAYERS,
    MAX_SIDE_VALUE, MAX_TURNS, MIN_PLAYERS, TILE_COUNT,
};
use crate::search::valuation::round_down_to_multiple;
use crate::search::GameState;

use super::bots::Strategy;
use super::player::Player;

// ============================================================================
// 設定 / 事件
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameConfig {
    pub play_to: u32,
    pub hand_size: usize,
    pub max_turns: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            play_to: DEFAULT_PLAY_TO,
            hand_size: HAND_SIZE,
            max_turns: MAX_TURNS,
        }
    }
}

/// 一局的結束方式；`player` 為拿分者，也是下一局先出者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundEnd {
    Domino { player: usize, points: u32 },
    Blocked { player: usize, points: u32 },
}

impl RoundEnd {
    pub fn player(&self) -> usize {
        match *self {
            RoundEnd::Domino { player, .. } | RoundEnd::Blocked { player, .. } => player,
        }
    }

    pub fn points(&self) -> u32 {
        match *self {
            RoundEnd::Domino { points, .. } | RoundEnd::Blocked { points, .. } => points,
        }
    }
}

/// 單一步的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Played { tile: Tile, direction: Direction, score: u32 },
    Drew(Tile),
    Knocked,
}

/// 輪到某位玩家時他看得到的資訊
#[derive(Debug, Clone, Copy)]
pub struct TurnView<'a> {
    pub board: &'a Board,
    pub hand: TileSet,
    pub my_score: u32,
    /// 對手中的最高分
    pub opp_score: u32,
    /// 下一位玩家的手牌張數
    pub opp_hand_size: usize,
    pub bone_yard_size: usize,
    pub play_to: u32,
}

impl TurnView<'_> {
    pub fn legal_moves(&self) -> Vec<(Tile, Direction)> {
        self.board.legal_moves(Some(self.hand))
    }

    /// 不在盤面也不在自己手中的牌
    pub fn unseen(&self) -> TileSet {
        self.board.remaining().tiles() - self.hand
    }

    /// 轉成雙人搜尋用的局面
    pub fn to_game_state(&self) -> GameState {
        GameState::new(
            self.board.clone(),
            self.my_score,
            self.opp_score,
            self.play_to,
            self.hand,
            self.opp_hand_size,
        )
    }
}

// ============================================================================
// Game
// ============================================================================

#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    players: Vec<Player>,
    board: Board,
    bone_yard: TileSet,
    turn_index: usize,
    round_over: bool,
    game_over: bool,
    last_round: Option<RoundEnd>,
    rng: StdRng,
}

impl Game {
    /// 2 至 4 位名稱不重複的玩家
    pub fn new<S: Into<String>>(names: Vec<S>, config: GameConfig, seed: u64) -> Result<Self> {
        let players: Vec<Player> = names.into_iter().map(Player::new).collect();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(DominoError::InvalidPlayers(format!(
                "need {}-{} players, got {}",
                MIN_PLAYERS,
                MAX_PLAYERS,
                players.len()
            )));
        }
        for (i, player) in players.iter().enumerate() {
            if players[..i].iter().any(|p| p.name() == player.name()) {
                return Err(DominoError::InvalidPlayers(format!(
                    "duplicate player name {:?}",
                    player.name()
                )));
            }
        }
        if config.hand_size == 0 || players.len() * config.hand_size > TILE_COUNT {
            return Err(DominoError::InvalidPlayers(format!(
                "cannot deal {} tiles to {} players",
                config.hand_size,
                players.len()
            )));
        }

        Ok(Self {
            config,
            players,
            board: Board::new(),
            bone_yard: TileSet::EMPTY,
            turn_index: 0,
            round_over: true,
            game_over: false,
            last_round: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    // ------------------------------------------------------------------------
    // 唯讀存取
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn bone_yard(&self) -> TileSet {
        self.bone_yard
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.turn_index]
    }

    pub fn is_round_over(&self) -> bool {
        self.round_over
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn last_round(&self) -> Option<RoundEnd> {
        self.last_round
    }

    pub fn scores(&self) -> Vec<u32> {
        self.players.iter().map(Player::total_score).collect()
    }

    /// 達標者中分數最高的玩家
    pub fn winner(&self) -> Option<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.total_score() >= self.config.play_to)
            .max_by_key(|(i, p)| (p.total_score(), std::cmp::Reverse(*i)))
            .map(|(i, _)| i)
    }

    /// 指定先出的玩家（下一局發牌前使用）
    pub fn set_leader(&mut self, index: usize) {
        assert!(index < self.players.len(), "no player at seat {}", index);
        self.turn_index = index;
    }

    pub fn view(&self) -> TurnView<'_> {
        view_of(&self.players, &self.board, self.bone_yard, self.turn_index, self.config.play_to)
    }

    // ------------------------------------------------------------------------
    // 發牌
    // ------------------------------------------------------------------------

    /// 洗牌後每人發 `hand_size` 張，其餘進牌堆
    pub fn deal_tiles(&mut self) {
        for player in &mut self.players {
            player.empty_hand();
        }
        self.board.reset();

        let mut deck: Vec<Tile> = all_tiles().to_vec();
        deck.shuffle(&mut self.rng);
        let mut chunks = deck.chunks(self.config.hand_size);
        for player in &mut self.players {
            if let Some(chunk) = chunks.next() {
                player.add_tiles(chunk.iter().copied());
            }
        }
        self.bone_yard = chunks.flatten().copied().collect();
        self.round_over = false;
        self.last_round = None;
        debug!(bone_yard = self.bone_yard.len(), leader = self.turn_index, "tiles dealt");
    }

    /// 第一局：持有最大雙牌者先出並把它打在右邊；沒人有雙牌就重發
    pub fn start_first_game(&mut self) -> Result<()> {
        loop {
            self.deal_tiles();
            for value in (0..=MAX_SIDE_VALUE).rev() {
                let double = Tile::new(value, value);
                if let Some(index) = self.players.iter().position(|p| p.has_tile(double)) {
                    self.turn_index = index;
                    self.make_move(double, Direction::Right)?;
                    return Ok(());
                }
            }
            debug!("nobody holds a double, redealing");
        }
    }

    // ------------------------------------------------------------------------
    // 動作
    // ------------------------------------------------------------------------

    /// 目前玩家出牌；回傳得分
    pub fn make_move(&mut self, tile: Tile, direction: Direction) -> Result<u32> {
        if self.round_over {
            return Err(DominoError::RoundOver);
        }
        let player = &self.players[self.turn_index];
        if !player.has_tile(tile) {
            return Err(DominoError::TileNotInHand {
                player: player.name().to_string(),
                tile,
            });
        }
        if !self.board.valid_move(tile, direction) {
            return Err(DominoError::IllegalPlacement { tile, direction });
        }

        let score = self.board.place(tile, direction);
        let player = &mut self.players[self.turn_index];
        player.remove_tile(tile);
        player.add_score(score);
        debug!(player = player.name(), %tile, %direction, score, "played");

        if player.is_out_of_tiles() {
            self.domino();
        } else {
            self.next_player();
        }
        self.check_for_win();
        Ok(score)
    }

    /// 手中有牌可出時不能摸牌或敲桌
    fn ensure_cannot_play(&self) -> Result<()> {
        if self.round_over {
            return Err(DominoError::RoundOver);
        }
        let player = self.current_player();
        if player.can_play(&self.board) {
            return Err(DominoError::MustPlay(player.name().to_string()));
        }
        Ok(())
    }

    /// 目前玩家從牌堆摸一張
    pub fn draw(&mut self) -> Result<Tile> {
        if self.round_over {
            return Err(DominoError::RoundOver);
        }
        if self.bone_yard.is_empty() {
            return Err(DominoError::EmptyBoneYard);
        }
        self.ensure_cannot_play()?;
        let pick = self.rng.gen_range(0..self.bone_yard.len());
        let tile = self
            .bone_yard
            .iter()
            .nth(pick)
            .ok_or(DominoError::EmptyBoneYard)?;
        self.bone_yard.remove(tile);
        let player = &mut self.players[self.turn_index];
        player.add_tile(tile);
        debug!(player = player.name(), "drew a tile");
        Ok(tile)
    }

    /// 目前玩家敲桌（牌堆須已摸完）；全員都無牌可出則本局封死
    pub fn knock(&mut self) -> Result<()> {
        self.ensure_cannot_play()?;
        if !self.bone_yard.is_empty() {
            return Err(DominoError::MustDraw(self.current_player().name().to_string()));
        }
        debug!(player = self.current_player().name(), "knocked");
        if self.players.iter().all(|p| !p.can_play(&self.board)) {
            self.score_block_out();
            self.check_for_win();
        } else {
            self.next_player();
        }
        Ok(())
    }

    /// 套用策略給出的動作；`Draw` / `Knock` 只在手中無牌可出時允許，
    /// 牌堆還有牌就摸牌，否則敲桌
    pub fn apply(&mut self, action: Move) -> Result<Turn> {
        match action {
            Move::Play(tile, direction) => {
                let score = self.make_move(tile, direction)?;
                Ok(Turn::Played { tile, direction, score })
            }
            Move::Draw | Move::Knock => {
                if self.bone_yard.is_empty() {
                    self.knock()?;
                    Ok(Turn::Knocked)
                } else {
                    Ok(Turn::Drew(self.draw()?))
                }
            }
        }
    }

    /// 目前玩家的策略決定一步並套用
    pub fn step(&mut self, strategies: &mut [Box<dyn Strategy>]) -> Result<Turn> {
        assert_eq!(
            strategies.len(),
            self.players.len(),
            "one strategy per player"
        );
        let view = view_of(&self.players, &self.board, self.bone_yard, self.turn_index, self.config.play_to);
        let action = strategies[self.turn_index].pick_move(&view, &mut self.rng);
        self.apply(action)
    }

    /// 發牌並打完一局（由目前的先出者開始）
    pub fn play_round(&mut self, strategies: &mut [Box<dyn Strategy>]) -> Result<RoundEnd> {
        self.deal_tiles();
        for _ in 0..self.config.max_turns {
            self.step(strategies)?;
            if let Some(end) = self.last_round.filter(|_| self.round_over) {
                return Ok(end);
            }
        }
        Err(DominoError::TurnLimit(self.config.max_turns))
    }

    /// 打到有人達標；回傳各玩家最終分數
    pub fn play(&mut self, strategies: &mut [Box<dyn Strategy>]) -> Result<Vec<u32>> {
        for player in &mut self.players {
            player.reset_score();
        }
        self.game_over = false;
        self.start_first_game()?;

        for _ in 0..self.config.max_turns {
            if self.game_over {
                return Ok(self.scores());
            }
            if self.round_over {
                self.deal_tiles();
            }
            self.step(strategies)?;
        }
        if self.game_over {
            return Ok(self.scores());
        }
        Err(DominoError::TurnLimit(self.config.max_turns))
    }

    // ------------------------------------------------------------------------
    // 計分
    // ------------------------------------------------------------------------

    fn next_player(&mut self) {
        self.turn_index = (self.turn_index + 1) % self.players.len();
    }

    fn domino(&mut self) {
        let total: u32 = self.players.iter().map(Player::total_points_in_hand).sum();
        let points = round_down_to_multiple(total as f64);
        let player = &mut self.players[self.turn_index];
        player.add_score(points);
        debug!(player = player.name(), points, "domino");
        self.end_round(RoundEnd::Domino {
            player: self.turn_index,
            points,
        });
    }

    /// 手牌點數最低者（同分取座位在前者）拿走其他人點數
    fn score_block_out(&mut self) {
        let (lowest, lowest_points) = self
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.total_points_in_hand()))
            .min_by_key(|&(i, points)| (points, i))
            .unwrap_or((0, 0));
        let others: u32 = self
            .players
            .iter()
            .map(Player::total_points_in_hand)
            .sum::<u32>()
            - lowest_points;
        let points = round_down_to_multiple(others as f64);
        self.players[lowest].add_score(points);
        debug!(player = self.players[lowest].name(), points, "round blocked");
        self.turn_index = lowest;
        self.end_round(RoundEnd::Blocked {
            player: lowest,
            points,
        });
    }

    fn end_round(&mut self, end: RoundEnd) {
        for player in &mut self.players {
            player.empty_hand();
        }
        self.round_over = true;
        self.last_round = Some(end);
    }

    fn check_for_win(&mut self) {
        if let Some(winner) = self.winner() {
            debug!(player = self.players[winner].name(), scores = ?self.scores(), "game over");
            self.game_over = true;
        }
    }
}

fn view_of<'a>(
    players: &'a [Player],
    board: &'a Board,
    bone_yard: TileSet,
    turn_index: usize,
    play_to: u32,
) -> TurnView<'a> {
    let me = &players[turn_index];
    let next = &players[(turn_index + 1) % players.len()];
    let opp_score = players
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != turn_index)
        .map(|(_, p)| p.total_score())
        .max()
        .unwrap_or(0);
    TurnView {
        board,
        hand: me.hand(),
        my_score: me.total_score(),
        opp_score,
        opp_hand_size: next.hand().len(),
        bone_yard_size: bone_yard.len(),
        play_to,
    }
}

// ============================================================================
// 單元測試
// ============================================================================
