//! dominoes CLI
//!
//! - `tournament`: 多場機器人對戰，輸出勝場統計
//! - `serve-stats`: 統計先出的價值
//! - `analyze`: 對給定局面做樹搜尋並排序所有行動
//!
//! 輸出皆為 JSON；日誌寫到 stderr（`RUST_LOG` 或 `--verbose`）。

use std::error::Error;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dominoes_engine::game::{
    Board, Move, Placement, Tile, TileSet, DEFAULT_PLAY_TO, DEFAULT_SEARCH_DEPTH,
    DRAW_SIMULATIONS, MAX_TURNS,
};
use dominoes_engine::search::{GameState, SearchConfig, TreeSearch};
use dominoes_engine::service::{serve_stats, tournament, BotKind, GameConfig};
use dominoes_engine::DominoError;

#[derive(Parser)]
#[command(name = "dominoes")]
#[command(about = "Double-six spinner dominoes engine with an expected-value search AI")]
struct Cli {
    /// 顯示 debug 日誌
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 機器人對戰
    Tournament {
        /// 各座位策略：random / greedy / defensive / tree / tree<深度>
        #[arg(long, num_args = 2..=4, default_values = ["defensive", "greedy"])]
        bots: Vec<BotKind>,

        #[arg(short, long, default_value_t = 100)]
        games: usize,

        #[command(flatten)]
        game: GameArgs,
    },

    /// 先出價值統計（雙人）
    ServeStats {
        #[arg(long, num_args = 2, default_values = ["defensive", "defensive"])]
        bots: Vec<BotKind>,

        #[arg(short, long, default_value_t = 1000)]
        rounds: usize,

        #[command(flatten)]
        game: GameArgs,
    },

    /// 對給定局面排序所有行動
    Analyze {
        /// 盤面出牌序列，例如 "66R 63R 64L"
        #[arg(long, default_value = "")]
        board: String,

        /// 手牌，例如 "34 03 61"
        #[arg(long)]
        hand: String,

        #[arg(long, default_value_t = 7)]
        opp_hand: usize,

        #[arg(long, default_value_t = 0)]
        my_score: u32,

        #[arg(long, default_value_t = 0)]
        opp_score: u32,

        #[arg(long, default_value_t = DEFAULT_PLAY_TO)]
        play_to: u32,

        #[arg(short, long, default_value_t = DEFAULT_SEARCH_DEPTH)]
        depth: u32,

        #[arg(long, default_value_t = DRAW_SIMULATIONS)]
        draw_simulations: usize,

        /// 根節點候選平行評估
        #[arg(long)]
        parallel: bool,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Args)]
struct GameArgs {
    #[arg(long, default_value_t = DEFAULT_PLAY_TO)]
    play_to: u32,

    #[arg(long, default_value_t = MAX_TURNS)]
    max_turns: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl GameArgs {
    fn config(&self) -> GameConfig {
        GameConfig {
            play_to: self.play_to,
            max_turns: self.max_turns,
            ..GameConfig::default()
        }
    }
}

fn parse_board(moves: &str) -> Result<Board, DominoError> {
    let placements = moves
        .split_whitespace()
        .map(|token| match token.parse::<Move>()? {
            Move::Play(tile, direction) => Ok((tile, direction)),
            _ => Err(DominoError::InvalidMove(token.to_string())),
        })
        .collect::<Result<Vec<Placement>, DominoError>>()?;
    Board::try_from_placements(&placements)
}

fn parse_hand(tiles: &str) -> Result<TileSet, DominoError> {
    tiles
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::parse::<Tile>)
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Tournament { bots, games, game } => {
            info!(?bots, games, "starting tournament");
            let summary = tournament(&bots, games, game.config(), game.seed)?;
            if summary.unfinished > 0 {
                warn!(unfinished = summary.unfinished, "some games hit the turn limit");
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::ServeStats { bots, rounds, game } => {
            info!(?bots, rounds, "collecting serve statistics");
            let stats = serve_stats(&bots, rounds, game.config(), game.seed)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Analyze {
            board,
            hand,
            opp_hand,
            my_score,
            opp_score,
            play_to,
            depth,
            draw_simulations,
            parallel,
            seed,
        } => {
            if draw_simulations == 0 {
                return Err("--draw-simulations must be positive".into());
            }
            let board = parse_board(&board)?;
            let hand = parse_hand(&hand)?;
            let state = GameState::try_new(board, my_score, opp_score, play_to, hand, opp_hand)?;
            let config = SearchConfig::with_depth(depth)
                .draw_simulations(draw_simulations)
                .parallel(parallel);

            let mut rng = StdRng::seed_from_u64(seed);
            let result = TreeSearch::new(config).search(&state, &mut rng);
            let output = json!({
                "board": state.board.to_string(),
                "hand": state.hand.to_string(),
                "win_probability": state.win_probability(),
                "config": config,
                "best": result.best(),
                "ranking": result.ranked(),
                "stats": result.stats(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
