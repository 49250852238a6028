use std::collections::HashMap;

use chess_core::{ResultReason, Side};
use chrono::{DateTime, Utc};

use crate::domain::{GameId, UserId, UserRef, game::Game};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Win,
    Loss,
    Draw,
}

impl GameOutcome {
    fn of(game: &Game, side: Side) -> Option<GameOutcome> {
        if game.is_active() {
            return None;
        }
        Some(match game.status.winner() {
            Some(winner) if winner == side => GameOutcome::Win,
            Some(_) => GameOutcome::Loss,
            None => GameOutcome::Draw,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameOutcome::Win => "win",
            GameOutcome::Loss => "loss",
            GameOutcome::Draw => "draw",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub game_id: GameId,
    pub opponent: UserRef,
    pub side: Side,
    pub result: GameOutcome,
    pub result_reason: Option<ResultReason>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankEntry {
    pub user: UserRef,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl RankEntry {
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Read-only projections over finished games. Callers pass the games in; nothing is cached,
/// so a finished game is counted exactly once per query.
pub trait RankingService {
    fn history(&self, user: UserId, games: &[Game]) -> Vec<HistoryEntry>;
    fn rankings(&self, games: &[Game]) -> Vec<RankEntry>;
}

pub struct RankingServiceImpl;

impl RankingService for RankingServiceImpl {
    fn history(&self, user: UserId, games: &[Game]) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = games
            .iter()
            .filter_map(|game| {
                let side = game.side_of(user)?;
                let result = GameOutcome::of(game, side)?;
                Some(HistoryEntry {
                    game_id: game.id,
                    opponent: game.player(side.opponent()).clone(),
                    side,
                    result,
                    result_reason: game.result_reason,
                    created_at: game.created_at,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.game_id.cmp(&a.game_id))
        });
        entries
    }

    fn rankings(&self, games: &[Game]) -> Vec<RankEntry> {
        let mut finished: Vec<&Game> = games.iter().filter(|game| !game.is_active()).collect();
        // Oldest first so the latest display name wins.
        finished.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut table: HashMap<UserId, RankEntry> = HashMap::new();
        for game in finished {
            for side in [Side::White, Side::Black] {
                let Some(outcome) = GameOutcome::of(game, side) else {
                    continue;
                };
                let player = game.player(side);
                let entry = table.entry(player.id).or_insert_with(|| RankEntry {
                    user: player.clone(),
                    wins: 0,
                    losses: 0,
                    draws: 0,
                });
                entry.user.name.clone_from(&player.name);
                match outcome {
                    GameOutcome::Win => entry.wins += 1,
                    GameOutcome::Loss => entry.losses += 1,
                    GameOutcome::Draw => entry.draws += 1,
                }
            }
        }

        let mut rankings: Vec<RankEntry> = table.into_values().collect();
        rankings.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(a.losses.cmp(&b.losses))
                .then_with(|| a.user.name.cmp(&b.user.name))
                .then(a.user.id.cmp(&b.user.id))
        });
        rankings
    }
}

#[cfg(test)]
mod tests {
    use chess_core::GameStatus;
    use chrono::TimeDelta;

    use super::*;
    use crate::domain::{
        game::{
            GameService, GameServiceImpl,
            tests::{alice, blitz, bob},
        },
        result::finalize,
    };

    fn finished(
        service: &GameServiceImpl,
        white: &UserRef,
        black: &UserRef,
        status: GameStatus,
        reason: ResultReason,
        at: DateTime<Utc>,
    ) -> Game {
        let game = service.create_game(white.clone(), black.clone(), blitz(), at);
        service
            .with_game(game.id, |game| {
                finalize(game, status, reason, at).unwrap();
                game.clone()
            })
            .unwrap()
    }

    #[test]
    fn test_history_lists_finished_games_newest_first() {
        let service = GameServiceImpl::new();
        let (a, b) = (alice(), bob());
        let t = Utc::now();
        let first = finished(&service, &a, &b, GameStatus::WhiteWon, ResultReason::Checkmate, t);
        let second = finished(
            &service,
            &b,
            &a,
            GameStatus::Draw,
            ResultReason::Stalemate,
            t + TimeDelta::seconds(10),
        );
        service.create_game(a.clone(), b.clone(), blitz(), t + TimeDelta::seconds(20));

        let history = RankingServiceImpl.history(a.id, &service.finished_games());

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].game_id, second.id);
        assert_eq!(history[0].side, Side::Black);
        assert_eq!(history[0].result, GameOutcome::Draw);
        assert_eq!(history[0].opponent, b);
        assert_eq!(history[1].game_id, first.id);
        assert_eq!(history[1].result, GameOutcome::Win);
        assert_eq!(history[1].result_reason, Some(ResultReason::Checkmate));
        assert!(RankingServiceImpl.history(UserId::new(), &service.finished_games()).is_empty());
    }

    #[test]
    fn test_rankings_order_and_totals() {
        let service = GameServiceImpl::new();
        let (a, b) = (alice(), bob());
        let c = UserRef::new(UserId::new(), "carol");
        let t = Utc::now();
        finished(&service, &a, &b, GameStatus::WhiteWon, ResultReason::Resignation, t);
        finished(&service, &c, &b, GameStatus::BlackWon, ResultReason::Timeout, t);
        finished(&service, &a, &c, GameStatus::WhiteWon, ResultReason::Checkmate, t);
        finished(&service, &b, &c, GameStatus::Draw, ResultReason::DrawAgreement, t);

        let games = service.finished_games();
        let rankings = RankingServiceImpl.rankings(&games);

        let names: Vec<&str> = rankings.iter().map(|r| r.user.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!((rankings[0].wins, rankings[0].losses, rankings[0].draws), (2, 0, 0));
        assert_eq!((rankings[1].wins, rankings[1].losses, rankings[1].draws), (1, 1, 1));
        assert_eq!((rankings[2].wins, rankings[2].losses, rankings[2].draws), (0, 2, 1));
        for entry in &rankings {
            let played = games
                .iter()
                .filter(|game| game.side_of(entry.user.id).is_some())
                .count() as u32;
            assert_eq!(entry.games_played(), played);
        }
    }

    #[test]
    fn test_rankings_tie_broken_by_losses_then_name() {
        let service = GameServiceImpl::new();
        let (a, b) = (alice(), bob());
        let t = Utc::now();
        finished(&service, &b, &a, GameStatus::Draw, ResultReason::DrawAgreement, t);

        let rankings = RankingServiceImpl.rankings(&service.finished_games());

        let names: Vec<&str> = rankings.iter().map(|r| r.user.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_game_finalized_twice_counts_once() {
        let service = GameServiceImpl::new();
        let (a, b) = (alice(), bob());
        let t = Utc::now();
        let game = finished(&service, &a, &b, GameStatus::WhiteWon, ResultReason::Resignation, t);
        let second = service
            .with_game(game.id, |game| {
                finalize(game, GameStatus::BlackWon, ResultReason::Resignation, t)
            })
            .unwrap();
        assert!(second.is_err());

        let rankings = RankingServiceImpl.rankings(&service.finished_games());
        let total: u32 = rankings.iter().map(RankEntry::games_played).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_active_games_are_ignored() {
        let service = GameServiceImpl::new();
        let all = vec![service.create_game(alice(), bob(), blitz(), Utc::now())];
        assert!(RankingServiceImpl.rankings(&all).is_empty());
        assert!(RankingServiceImpl.history(all[0].white.id, &all).is_empty());
    }
}
