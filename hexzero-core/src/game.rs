//! Game orchestration: agent vs agent play and self-play recording
//!
//! ## Architecture
//! - Level 1: play / self_play (game loops)
//! - Level 2: request_move, outcome (single steps)
//! - Level 3: outcome labelling

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::agent::{Agent, DEFAULT_TEMPERATURE};
use crate::board::{Board, Player};
use crate::encoder::StateTensor;
use crate::error::{HexError, Result};

// ============================================================================
// TYPES
// ============================================================================

/// One recorded self-play position
#[derive(Clone, Debug, Serialize)]
pub struct TrainingSample {
    /// Encoded position before the move
    pub state: StateTensor,
    /// Agent's move distribution over all cells
    pub probs: Vec<f32>,
    /// +1.0 if the mover went on to win, -1.0 if it lost, 0.0 on a tie
    pub outcome: f32,
}

/// Result of a self-play game
#[derive(Clone, Debug, Serialize)]
pub struct SelfPlayRecord {
    /// `None` for a tie
    pub winner: Option<Player>,
    /// Positions in the order they were played
    pub samples: Vec<TrainingSample>,
}

/// Owner of the board for one session
#[derive(Debug)]
pub struct Game {
    board: Board,
    move_timeout: Option<Duration>,
}

impl Game {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            move_timeout: None,
        }
    }

    /// Fail the game with [`HexError::StalledAgent`] when an agent needs
    /// longer than `timeout` for a move.
    ///
    /// Agents run on the caller's thread, so the limit is checked once the
    /// agent returns: slow agents are reported, hung agents are not
    /// interrupted.
    pub fn with_move_timeout(mut self, timeout: Duration) -> Self {
        self.move_timeout = Some(timeout);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    // ========================================================================
    // LEVEL 1 - GAME LOOPS
    // ========================================================================

    /// Play one game. `agent1` plays player one, `agent2` player two;
    /// `start_player` 0 lets player one open, 1 lets player two open.
    ///
    /// Returns the winner, or `None` for a tie.
    pub fn play(
        &mut self,
        agent1: &mut dyn Agent,
        agent2: &mut dyn Agent,
        start_player: usize,
        show: bool,
    ) -> Result<Option<Player>> {
        if start_player > 1 {
            return Err(HexError::InvalidStartPlayer(start_player));
        }
        self.board.init_board(start_player)?;
        agent1.set_player(Player::One);
        agent2.set_player(Player::Two);

        tracing::info!(
            "Starting game: {} (X) vs {} (O) on {}x{}",
            agent1.name(),
            agent2.name(),
            self.board.width(),
            self.board.height()
        );
        if show {
            println!("{}", self.board);
        }

        loop {
            let mover = self.board.current_player();
            let mv = match mover {
                Player::One => {
                    self.request_move(mover, || agent1.get_action(&self.board, DEFAULT_TEMPERATURE))?
                }
                Player::Two => {
                    self.request_move(mover, || agent2.get_action(&self.board, DEFAULT_TEMPERATURE))?
                }
            };
            self.board.do_move(mv)?;
            tracing::debug!("Player {} played {:?}", mover, self.board.move_to_location(mv));

            if show {
                println!("{}", self.board);
            }

            if let Some(winner) = self.outcome() {
                if show {
                    match winner {
                        Some(player) => {
                            let name = if player == Player::One { agent1.name() } else { agent2.name() };
                            println!("Game end. Winner is {} (player {})", name, player);
                        }
                        None => println!("Game end. Tie"),
                    }
                }
                tracing::info!("Game over after {} moves: {:?}", self.board.move_count(), winner);
                return Ok(winner);
            }
        }
    }

    /// Let one agent play both sides, recording every position together with
    /// the agent's move distribution. The agent's retained state is reset
    /// before returning, whether the game finished or failed.
    pub fn self_play(&mut self, agent: &mut dyn Agent, temperature: f32, show: bool) -> Result<SelfPlayRecord> {
        let record = self.run_self_play(agent, temperature, show);
        agent.reset_player();
        record
    }

    fn run_self_play(&mut self, agent: &mut dyn Agent, temperature: f32, show: bool) -> Result<SelfPlayRecord> {
        self.board.init_board(0)?;

        let mut states = Vec::new();
        let mut move_probs = Vec::new();
        let mut movers = Vec::new();

        loop {
            let mover = self.board.current_player();
            let (mv, probs) =
                self.request_move(mover, || agent.get_action_with_probs(&self.board, temperature))?;

            states.push(self.board.current_state()?);
            move_probs.push(probs);
            movers.push(mover);

            self.board.do_move(mv)?;
            tracing::debug!("Self-play: player {} played {:?}", mover, self.board.move_to_location(mv));

            if show {
                println!("{}", self.board);
            }

            if let Some(winner) = self.outcome() {
                if show {
                    match winner {
                        Some(player) => println!("Game end. Winner is player: {}", player),
                        None => println!("Game end. Tie"),
                    }
                }
                tracing::info!(
                    "Self-play game over after {} moves: {:?}",
                    self.board.move_count(),
                    winner
                );

                let samples = states
                    .into_iter()
                    .zip(move_probs)
                    .zip(outcome_labels(&movers, winner))
                    .map(|((state, probs), outcome)| TrainingSample { state, probs, outcome })
                    .collect();

                return Ok(SelfPlayRecord { winner, samples });
            }
        }
    }

    // ========================================================================
    // LEVEL 2 - STEPS
    // ========================================================================

    /// Run an agent call, enforcing the move timeout
    fn request_move<T, F>(&self, player: Player, request: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let started = Instant::now();
        let answer = request()?;
        let elapsed = started.elapsed();

        match self.move_timeout {
            Some(limit) if elapsed > limit => Err(HexError::StalledAgent { player, elapsed }),
            _ => Ok(answer),
        }
    }

    /// `Some(winner)` once the game is over; the inner `None` is a tie
    fn outcome(&self) -> Option<Option<Player>> {
        let (end, winner) = self.board.game_end();
        if end {
            return Some(winner);
        }
        if self.board.available_count() == 0 {
            tracing::warn!("Board full without a connection; scoring as a tie");
            return Some(None);
        }
        None
    }
}

// ============================================================================
// LEVEL 3 - LABELLING
// ============================================================================

/// Outcome from each mover's point of view
fn outcome_labels(movers: &[Player], winner: Option<Player>) -> Vec<f32> {
    movers
        .iter()
        .map(|&mover| match winner {
            Some(w) if w == mover => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// Plays a fixed list of moves, then the lowest available cell
    struct ScriptedAgent {
        moves: Vec<usize>,
        player: Option<Player>,
        resets: usize,
        delay: Option<Duration>,
    }

    impl ScriptedAgent {
        fn new(moves: &[usize]) -> Self {
            Self {
                moves: moves.iter().rev().copied().collect(),
                player: None,
                resets: 0,
                delay: None,
            }
        }
    }

    impl Agent for ScriptedAgent {
        fn set_player(&mut self, player: Player) {
            self.player = Some(player);
        }

        fn get_action(&mut self, board: &Board, _temperature: f32) -> Result<usize> {
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            match self.moves.pop() {
                Some(mv) => Ok(mv),
                None => board
                    .available_moves()
                    .next()
                    .ok_or_else(|| HexError::Agent("no moves left".to_string())),
            }
        }

        fn reset_player(&mut self) {
            self.resets += 1;
        }
    }

    fn game(size: usize) -> Game {
        Game::new(Board::new(size, size).unwrap())
    }

    #[test]
    fn test_play_rejects_bad_start() {
        let mut game = game(3);
        let mut a = ScriptedAgent::new(&[]);
        let mut b = ScriptedAgent::new(&[]);
        let result = game.play(&mut a, &mut b, 2, false);
        assert!(matches!(result, Err(HexError::InvalidStartPlayer(2))));
        assert!(a.player.is_none());
    }

    #[test]
    fn test_play_assigns_players_and_finds_winner() {
        let mut game = game(3);
        // Player one walks down column 0
        let mut a = ScriptedAgent::new(&[0, 3, 6]);
        let mut b = ScriptedAgent::new(&[1, 2]);

        let winner = game.play(&mut a, &mut b, 0, false).unwrap();
        assert_eq!(winner, Some(Player::One));
        assert_eq!(a.player, Some(Player::One));
        assert_eq!(b.player, Some(Player::Two));
        assert_eq!(game.board().move_count(), 5);
    }

    #[test]
    fn test_play_second_player_opens() {
        let mut game = game(2);
        // Two: (0,0) (0,1) links the columns
        let mut a = ScriptedAgent::new(&[2]);
        let mut b = ScriptedAgent::new(&[0, 1]);

        let winner = game.play(&mut a, &mut b, 1, false).unwrap();
        assert_eq!(winner, Some(Player::Two));
        assert_eq!(game.board().occupant(0), Some(Player::Two));
    }

    #[test]
    fn test_play_propagates_illegal_move() {
        let mut game = game(3);
        let mut a = ScriptedAgent::new(&[4]);
        let mut b = ScriptedAgent::new(&[4]);

        let result = game.play(&mut a, &mut b, 0, false);
        assert!(matches!(result, Err(HexError::IllegalMove(4))));
        assert_eq!(game.board().move_count(), 1);
    }

    #[test]
    fn test_play_reports_stalled_agent() {
        let mut game = game(3).with_move_timeout(Duration::from_millis(1));
        let mut a = ScriptedAgent::new(&[]);
        a.delay = Some(Duration::from_millis(20));
        let mut b = ScriptedAgent::new(&[]);

        let result = game.play(&mut a, &mut b, 0, false);
        assert!(matches!(
            result,
            Err(HexError::StalledAgent { player: Player::One, .. })
        ));
        assert_eq!(game.board().move_count(), 0);
    }

    #[test]
    fn test_self_play_records_every_position() {
        let mut game = game(3);
        let mut agent = ScriptedAgent::new(&[0, 1, 3, 2, 6]);

        let record = game.self_play(&mut agent, 1.0, false).unwrap();
        assert_eq!(record.winner, Some(Player::One));
        assert_eq!(record.samples.len(), 5);
        assert_eq!(agent.resets, 1);

        let labels: Vec<f32> = record.samples.iter().map(|s| s.outcome).collect();
        assert_eq!(labels, vec![1.0, -1.0, 1.0, -1.0, 1.0]);

        for (sample, mv) in record.samples.iter().zip([0, 1, 3, 2, 6]) {
            assert_eq!(sample.state.shape(), (9, 3, 3));
            assert_eq!(sample.probs.len(), 9);
            assert_eq!(sample.probs[mv], 1.0);
        }

        // First position: empty board, even move count
        assert!(record.samples[0].state.plane(8).iter().all(|&v| v == 1.0));
        assert!(record.samples[1].state.plane(8).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_self_play_resets_agent_on_failure() {
        let mut game = game(3);
        // Second move repeats the first
        let mut agent = ScriptedAgent::new(&[4, 4]);

        let result = game.self_play(&mut agent, 1.0, false);
        assert!(matches!(result, Err(HexError::IllegalMove(4))));
        assert_eq!(agent.resets, 1);
    }

    #[test]
    fn test_outcome_labels() {
        let movers = [Player::One, Player::Two, Player::One];
        assert_eq!(outcome_labels(&movers, Some(Player::Two)), vec![-1.0, 1.0, -1.0]);
        assert_eq!(outcome_labels(&movers, None), vec![0.0, 0.0, 0.0]);
    }
}
