use std::sync::Arc;

use chess_core::{GameStatus, MaybeTimeout, ResultReason};
use chrono::{DateTime, Utc};

use crate::domain::{
    GAME_ALREADY_FINISHED, GameId, ServiceError, UserId,
    game::{Game, GameService},
};

/// Moves an active game into its terminal state. Must be called with the game lock held.
///
/// A game that is no longer active is never touched again, so a second finalisation fails
/// instead of applying twice.
pub(crate) fn finalize(
    game: &mut Game,
    status: GameStatus,
    reason: ResultReason,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    if !game.is_active() {
        return Err(ServiceError::invalid_state(GAME_ALREADY_FINISHED));
    }
    if !reason.allows(status) {
        return Err(ServiceError::invalid_request(format!(
            "a game cannot end as {} by {}",
            status.as_str(),
            reason.as_str()
        )));
    }
    let to_move = game.side_to_move();
    game.clock.stop(to_move, now);
    game.status = status;
    game.result_reason = Some(reason);
    log::info!(
        "Game {} finished after {} moves: {} ({})",
        game.id,
        game.moves.len(),
        status.as_str(),
        reason.as_str()
    );
    Ok(())
}

/// Side to move ran out of time; its opponent wins.
pub(crate) fn finalize_timeout(game: &mut Game, now: DateTime<Utc>) -> Result<(), ServiceError> {
    let winner = game.side_to_move().opponent();
    finalize(game, GameStatus::win_for(winner), ResultReason::Timeout, now)
}

/// Player-initiated and caller-asserted game endings.
///
/// Every entry point first settles an expired clock: if the side to move has no time left
/// when the lock is taken, the game ends by timeout and the requested ending is not applied.
pub trait ResultService {
    fn resign(
        &self,
        game_id: GameId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<MaybeTimeout<Game, Game>, ServiceError>;
    fn finish_game(
        &self,
        game_id: GameId,
        status: GameStatus,
        reason: ResultReason,
        acting_user: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<MaybeTimeout<Game, Game>, ServiceError>;
}

pub struct ResultServiceImpl<G: GameService> {
    game_service: Arc<G>,
}

impl<G: GameService> ResultServiceImpl<G> {
    pub fn new(game_service: Arc<G>) -> Self {
        Self { game_service }
    }
}

fn settle_expired_clock(
    game: &mut Game,
    now: DateTime<Utc>,
) -> Result<Option<Game>, ServiceError> {
    if game.is_flagged(now) {
        finalize_timeout(game, now)?;
        return Ok(Some(game.clone()));
    }
    Ok(None)
}

impl<G: GameService> ResultService for ResultServiceImpl<G> {
    fn resign(
        &self,
        game_id: GameId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<MaybeTimeout<Game, Game>, ServiceError> {
        self.game_service
            .with_game(game_id, |game| {
                if !game.is_active() {
                    return Err(ServiceError::invalid_state(GAME_ALREADY_FINISHED));
                }
                let side = game.side_of(user).ok_or(ServiceError::Forbidden)?;
                if let Some(timed_out) = settle_expired_clock(game, now)? {
                    return Ok(MaybeTimeout::Timeout(timed_out));
                }
                finalize(
                    game,
                    GameStatus::win_for(side.opponent()),
                    ResultReason::Resignation,
                    now,
                )?;
                Ok(MaybeTimeout::Result(game.clone()))
            })
            .unwrap_or(Err(ServiceError::NotFound))
    }

    fn finish_game(
        &self,
        game_id: GameId,
        status: GameStatus,
        reason: ResultReason,
        acting_user: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<MaybeTimeout<Game, Game>, ServiceError> {
        if !reason.allows(status) {
            return Err(ServiceError::invalid_request(format!(
                "a game cannot end as {} by {}",
                status.as_str(),
                reason.as_str()
            )));
        }
        self.game_service
            .with_game(game_id, |game| {
                if !game.is_active() {
                    return Err(ServiceError::invalid_state(GAME_ALREADY_FINISHED));
                }
                if acting_user.is_some_and(|user| game.side_of(user).is_none()) {
                    return Err(ServiceError::Forbidden);
                }
                if let Some(timed_out) = settle_expired_clock(game, now)? {
                    return Ok(MaybeTimeout::Timeout(timed_out));
                }
                finalize(game, status, reason, now)?;
                Ok(MaybeTimeout::Result(game.clone()))
            })
            .unwrap_or(Err(ServiceError::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use chess_core::Side;
    use chrono::TimeDelta;

    use super::*;
    use crate::domain::game::{
        GameServiceImpl,
        tests::{alice, blitz, bob},
    };

    fn setup() -> (Arc<GameServiceImpl>, ResultServiceImpl<GameServiceImpl>, Game) {
        let game_service = Arc::new(GameServiceImpl::new());
        let game = game_service.create_game(alice(), bob(), blitz(), Utc::now());
        (
            game_service.clone(),
            ResultServiceImpl::new(game_service),
            game,
        )
    }

    #[test]
    fn test_resign_gives_opponent_the_win() {
        let (game_service, result_service, game) = setup();

        let Ok(MaybeTimeout::Result(finished)) =
            result_service.resign(game.id, game.black.id, Utc::now())
        else {
            panic!("resignation should finish the game");
        };

        assert_eq!(finished.status, GameStatus::WhiteWon);
        assert_eq!(finished.result_reason, Some(ResultReason::Resignation));
        assert_eq!(game_service.get_game(game.id), Some(finished));
    }

    #[test]
    fn test_resign_by_outsider_is_forbidden() {
        let (_, result_service, game) = setup();
        let result = result_service.resign(game.id, UserId::new(), Utc::now());
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn test_resign_unknown_game() {
        let (_, result_service, game) = setup();
        let result = result_service.resign(GameId::new(999), game.white.id, Utc::now());
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn test_second_finalisation_fails_and_keeps_first_result() {
        let (game_service, result_service, game) = setup();
        let now = Utc::now();

        assert!(
            result_service
                .finish_game(game.id, GameStatus::Draw, ResultReason::DrawAgreement, None, now)
                .is_ok()
        );
        let second = result_service.resign(game.id, game.white.id, now);
        let third = result_service.finish_game(
            game.id,
            GameStatus::BlackWon,
            ResultReason::Checkmate,
            None,
            now,
        );

        assert!(matches!(second, Err(ServiceError::InvalidState(_))));
        assert!(matches!(third, Err(ServiceError::InvalidState(_))));
        let stored = game_service.get_game(game.id).unwrap();
        assert_eq!(stored.status, GameStatus::Draw);
        assert_eq!(stored.result_reason, Some(ResultReason::DrawAgreement));
    }

    #[test]
    fn test_finish_rejects_inconsistent_result() {
        let (game_service, result_service, game) = setup();
        let now = Utc::now();

        let draw_by_checkmate =
            result_service.finish_game(game.id, GameStatus::Draw, ResultReason::Checkmate, None, now);
        let still_active = result_service.finish_game(
            game.id,
            GameStatus::Active,
            ResultReason::DrawAgreement,
            None,
            now,
        );

        assert!(matches!(draw_by_checkmate, Err(ServiceError::InvalidRequest(_))));
        assert!(matches!(still_active, Err(ServiceError::InvalidRequest(_))));
        assert!(game_service.get_game(game.id).unwrap().is_active());
    }

    #[test]
    fn test_finish_checks_acting_user() {
        let (_, result_service, game) = setup();
        let now = Utc::now();

        let outsider = result_service.finish_game(
            game.id,
            GameStatus::Draw,
            ResultReason::DrawAgreement,
            Some(UserId::new()),
            now,
        );
        let participant = result_service.finish_game(
            game.id,
            GameStatus::Draw,
            ResultReason::DrawAgreement,
            Some(game.white.id),
            now,
        );

        assert!(matches!(outsider, Err(ServiceError::Forbidden)));
        assert!(matches!(participant, Ok(MaybeTimeout::Result(_))));
    }

    #[test]
    fn test_expired_clock_wins_over_resignation() {
        let (game_service, result_service, game) = setup();
        let late = game.created_at + TimeDelta::seconds(301);

        let Ok(MaybeTimeout::Timeout(finished)) =
            result_service.resign(game.id, game.black.id, late)
        else {
            panic!("expired clock should end the game by timeout");
        };

        assert_eq!(finished.status, GameStatus::win_for(Side::Black));
        assert_eq!(finished.result_reason, Some(ResultReason::Timeout));
        assert_eq!(finished.clock.white_ms, 0);
        assert_eq!(game_service.get_game(game.id), Some(finished));
    }
}
