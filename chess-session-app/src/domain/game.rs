use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use chess_core::{GameClock, GameStatus, ResultReason, Side, TimeControl};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::{GameId, UserId, UserRef};

#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub id: GameId,
    pub white: UserRef,
    pub black: UserRef,
    /// Append-only move log in the notation the players submitted.
    pub moves: Vec<String>,
    pub status: GameStatus,
    pub result_reason: Option<ResultReason>,
    pub time_control: TimeControl,
    pub clock: GameClock,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRemaining {
    pub white_ms: u64,
    pub black_ms: u64,
}

impl Game {
    pub fn side_to_move(&self) -> Side {
        Side::to_move(self.moves.len())
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn player(&self, side: Side) -> &UserRef {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn side_of(&self, user: UserId) -> Option<Side> {
        if user == self.white.id {
            Some(Side::White)
        } else if user == self.black.id {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, user: UserId) -> Option<&UserRef> {
        self.side_of(user).map(|side| self.player(side.opponent()))
    }

    pub fn last_move_at(&self) -> DateTime<Utc> {
        self.clock.last_move_at
    }

    pub fn is_flagged(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.clock.is_flagged(self.side_to_move(), now)
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> TimeRemaining {
        let (white_ms, black_ms) = if self.is_active() {
            self.clock.remaining_both(self.side_to_move(), now)
        } else {
            (self.clock.white_ms, self.clock.black_ms)
        };
        TimeRemaining { white_ms, black_ms }
    }

    /// Strictly increases with every state change of the game.
    pub fn revision(&self) -> u64 {
        self.moves.len() as u64 * 2 + u64::from(!self.is_active())
    }
}

/// Authoritative store of all games of this process, each behind its own lock.
pub trait GameService {
    fn create_game(
        &self,
        white: UserRef,
        black: UserRef,
        time_control: TimeControl,
        now: DateTime<Utc>,
    ) -> Game;
    fn restore_games(&self, games: Vec<Game>) -> usize;
    fn get_game(&self, game_id: GameId) -> Option<Game>;
    fn list_games_of(&self, user: UserId) -> Vec<Game>;
    fn active_game_ids(&self) -> Vec<GameId>;
    fn finished_games(&self) -> Vec<Game>;
    /// Runs `f` while holding the lock of the game. All mutations go through here.
    fn with_game<R>(&self, game_id: GameId, f: impl FnOnce(&mut Game) -> R) -> Option<R>;
}

pub struct GameServiceImpl {
    games: DashMap<GameId, Arc<Mutex<Game>>>,
    games_by_user: DashMap<UserId, Vec<GameId>>,
    next_game_id: AtomicU32,
}

impl GameServiceImpl {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
            games_by_user: DashMap::new(),
            next_game_id: AtomicU32::new(1),
        }
    }

    fn insert(&self, game: Game) {
        for user in [game.white.id, game.black.id] {
            self.games_by_user.entry(user).or_default().push(game.id);
        }
        self.games.insert(game.id, Arc::new(Mutex::new(game)));
    }

    fn entry(&self, game_id: GameId) -> Option<Arc<Mutex<Game>>> {
        self.games.get(&game_id).map(|entry| entry.value().clone())
    }

    fn snapshot_all(&self) -> Vec<Game> {
        let entries: Vec<Arc<Mutex<Game>>> =
            self.games.iter().map(|entry| entry.value().clone()).collect();
        entries.iter().map(|game| game.lock().clone()).collect()
    }
}

impl GameService for GameServiceImpl {
    fn create_game(
        &self,
        white: UserRef,
        black: UserRef,
        time_control: TimeControl,
        now: DateTime<Utc>,
    ) -> Game {
        let id = GameId::new(self.next_game_id.fetch_add(1, Ordering::SeqCst));
        let game = Game {
            id,
            white,
            black,
            moves: Vec::new(),
            status: GameStatus::Active,
            result_reason: None,
            clock: GameClock::new(&time_control, now),
            time_control,
            created_at: now,
        };
        self.insert(game.clone());
        log::info!(
            "Created game {} ({} vs {})",
            id,
            game.white.name,
            game.black.name
        );
        game
    }

    fn restore_games(&self, games: Vec<Game>) -> usize {
        let count = games.len();
        for game in games {
            self.next_game_id
                .fetch_max(game.id.value().saturating_add(1), Ordering::SeqCst);
            self.insert(game);
        }
        count
    }

    fn get_game(&self, game_id: GameId) -> Option<Game> {
        self.entry(game_id).map(|game| game.lock().clone())
    }

    fn list_games_of(&self, user: UserId) -> Vec<Game> {
        let ids = self
            .games_by_user
            .get(&user)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        let mut games: Vec<Game> = ids.into_iter().filter_map(|id| self.get_game(id)).collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        games
    }

    fn active_game_ids(&self) -> Vec<GameId> {
        self.snapshot_all()
            .into_iter()
            .filter(|game| game.is_active())
            .map(|game| game.id)
            .collect()
    }

    fn finished_games(&self) -> Vec<Game> {
        self.snapshot_all()
            .into_iter()
            .filter(|game| !game.is_active())
            .collect()
    }

    fn with_game<R>(&self, game_id: GameId, f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        let game = self.entry(game_id)?;
        let mut guard = game.lock();
        Some(f(&mut guard))
    }
}
