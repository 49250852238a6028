use std::sync::Arc;

use chess_core::MaybeTimeout;
use chrono::{DateTime, Utc};

use crate::{
    domain::{
        GAME_ALREADY_FINISHED, GameId, NOT_YOUR_TURN, ServiceError, UserId,
        game::{Game, GameService},
        result::{finalize, finalize_timeout},
    },
    ports::rules::RulesEngine,
};

/// Sole mutator of the move log of an active game.
pub trait MoveService {
    /// Applies `notation` for `user`. On success the updated game is returned; it may already
    /// be finished when the move ended the game. `Timeout` means the mover's clock had run out
    /// before the lock was taken: the game was ended and the move was discarded. This also
    /// happens when `user` is not a participant.
    fn apply_move(
        &self,
        game_id: GameId,
        user: UserId,
        notation: &str,
        now: DateTime<Utc>,
    ) -> Result<MaybeTimeout<Game, Game>, ServiceError>;
}

pub struct MoveServiceImpl<G: GameService, R: RulesEngine> {
    game_service: Arc<G>,
    rules_engine: Arc<R>,
}

impl<G: GameService, R: RulesEngine> MoveServiceImpl<G, R> {
    pub fn new(game_service: Arc<G>, rules_engine: Arc<R>) -> Self {
        Self {
            game_service,
            rules_engine,
        }
    }
}

impl<G: GameService, R: RulesEngine> MoveService for MoveServiceImpl<G, R> {
    fn apply_move(
        &self,
        game_id: GameId,
        user: UserId,
        notation: &str,
        now: DateTime<Utc>,
    ) -> Result<MaybeTimeout<Game, Game>, ServiceError> {
        let notation = notation.trim();
        self.game_service
            .with_game(game_id, |game| {
                if !game.is_active() {
                    return Err(ServiceError::invalid_state(GAME_ALREADY_FINISHED));
                }
                if game.is_flagged(now) {
                    finalize_timeout(game, now)?;
                    return Ok(MaybeTimeout::Timeout(game.clone()));
                }
                let player_side = game.side_of(user).ok_or(ServiceError::Forbidden)?;

                let mover = game.side_to_move();
                if player_side != mover {
                    return Err(ServiceError::invalid_state(NOT_YOUR_TURN));
                }
                if notation.is_empty() {
                    return Err(ServiceError::IllegalMove("empty move".to_string()));
                }

                let position = self
                    .rules_engine
                    .validate(&game.moves, notation)
                    .map_err(|e| ServiceError::IllegalMove(e.reason))?;

                let increment_ms = game.time_control.increment_ms();
                game.clock.punch(mover, now, increment_ms);
                game.moves.push(notation.to_string());
                log::debug!(
                    "Game {}: move {} {} by {}",
                    game.id,
                    game.moves.len(),
                    notation,
                    user
                );

                let terminal = self.rules_engine.terminal_state(&position);
                if let Some((status, reason)) = terminal.outcome(mover) {
                    finalize(game, status, reason, now)?;
                }
                Ok(MaybeTimeout::Result(game.clone()))
            })
            .unwrap_or(Err(ServiceError::NotFound))
    }
}
