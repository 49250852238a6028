use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chess_session_app::{
    domain::{GameId, RepoError, game::Game},
    ports::persistence::GameRepository,
};
use dashmap::DashMap;
use tokio::sync::Mutex;

mod entity;

pub use entity::GameEntity;

/// Stores every game as `{dir}/{id}.json`. A write goes to a temporary file first and is
/// renamed over the old document, so a crash never leaves a half-written game behind.
pub struct FileGameRepository {
    dir: PathBuf,
    /// Highest revision written per game. Also serialises writes of the same game.
    revisions: DashMap<GameId, Arc<Mutex<Option<u64>>>>,
}

fn storage_error(context: &str, path: &Path, e: impl std::fmt::Display) -> RepoError {
    RepoError::StorageError(format!("{} {}: {}", context, path.display(), e))
}

impl FileGameRepository {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("cannot create", &dir, e))?;
        Ok(Self {
            dir,
            revisions: DashMap::new(),
        })
    }

    fn game_path(&self, game_id: GameId) -> PathBuf {
        self.dir.join(format!("{}.json", game_id))
    }

    fn revision_lock(&self, game_id: GameId) -> Arc<Mutex<Option<u64>>> {
        self.revisions
            .entry(game_id)
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .value()
            .clone()
    }

    async fn read_entity(path: &Path) -> Result<GameEntity, RepoError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| storage_error("cannot read", path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| storage_error("cannot parse", path, e))
    }
}

#[async_trait::async_trait]
impl GameRepository for FileGameRepository {
    async fn save_game(&self, game: Game) -> Result<(), RepoError> {
        let entity = GameEntity::from_game(&game);
        let lock = self.revision_lock(game.id);
        let mut stored_revision = lock.lock().await;
        if stored_revision.is_some_and(|stored| stored >= entity.revision) {
            log::debug!(
                "Skipping stale write of game {} at revision {}",
                game.id,
                entity.revision
            );
            return Ok(());
        }

        let path = self.game_path(game.id);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(&entity)
            .map_err(|e| storage_error("cannot serialize", &path, e))?;
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| storage_error("cannot write", &tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| storage_error("cannot replace", &path, e))?;

        *stored_revision = Some(entity.revision);
        Ok(())
    }

    async fn load_games(&self) -> Result<Vec<Game>, RepoError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| storage_error("cannot list", &self.dir, e))?;
        let mut games = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error("cannot list", &self.dir, e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let game = match Self::read_entity(&path).await.and_then(|entity| {
                entity
                    .into_game()
                    .map_err(|e| storage_error("invalid game in", &path, e))
            }) {
                Ok(game) => game,
                Err(e) => {
                    log::warn!("Ignoring stored game: {}", e);
                    continue;
                }
            };
            let lock = self.revision_lock(game.id);
            let mut stored_revision = lock.lock().await;
            *stored_revision = Some(stored_revision.unwrap_or(0).max(game.revision()));
            drop(stored_revision);
            games.push(game);
        }
        games.sort_by_key(|game| game.id);
        log::info!("Loaded {} games from {}", games.len(), self.dir.display());
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chess_core::{GameClock, GameStatus, ResultReason, TimeControl};
    use chess_session_app::domain::{UserId, UserRef};
    use chrono::{TimeDelta, Utc};

    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("chess-games-{}", uuid::Uuid::new_v4()))
    }

    fn game(id: u32) -> Game {
        let time_control = TimeControl::new(Duration::from_secs(180), Duration::from_secs(2));
        let created_at = Utc::now();
        Game {
            id: GameId::new(id),
            white: UserRef::new(UserId::new(), "alice"),
            black: UserRef::new(UserId::new(), "bob"),
            moves: Vec::new(),
            status: GameStatus::Active,
            result_reason: None,
            clock: GameClock::new(&time_control, created_at),
            time_control,
            created_at,
        }
    }

    fn advanced(mut game: Game, moves: &[&str]) -> Game {
        game.moves.extend(moves.iter().map(|m| m.to_string()));
        game.clock.white_ms -= 1_500;
        game.clock.last_move_at += TimeDelta::seconds(3);
        game
    }

    #[tokio::test]
    async fn test_games_survive_restart() {
        let dir = temp_dir();
        let repository = FileGameRepository::new(&dir).await.unwrap();
        let active = advanced(game(1), &["e4", "e5"]);
        let mut finished = advanced(game(2), &["d4"]);
        finished.status = GameStatus::BlackWon;
        finished.result_reason = Some(ResultReason::Resignation);
        repository.save_game(active.clone()).await.unwrap();
        repository.save_game(finished.clone()).await.unwrap();

        let reopened = FileGameRepository::new(&dir).await.unwrap();
        let loaded = reopened.load_games().await.unwrap();

        assert_eq!(loaded, vec![active, finished]);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_writes_are_dropped() {
        let dir = temp_dir();
        let repository = FileGameRepository::new(&dir).await.unwrap();
        let start = game(5);
        let later = advanced(start.clone(), &["e4"]);

        repository.save_game(later.clone()).await.unwrap();
        repository.save_game(start.clone()).await.unwrap();
        assert_eq!(repository.load_games().await.unwrap(), vec![later.clone()]);

        let reopened = FileGameRepository::new(&dir).await.unwrap();
        reopened.load_games().await.unwrap();
        reopened.save_game(start).await.unwrap();
        assert_eq!(reopened.load_games().await.unwrap(), vec![later]);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_documents_are_skipped() {
        let dir = temp_dir();
        let repository = FileGameRepository::new(&dir).await.unwrap();
        repository.save_game(game(1)).await.unwrap();
        tokio::fs::write(dir.join("2.json"), b"{ not json").await.unwrap();
        tokio::fs::write(dir.join("notes.txt"), b"ignored").await.unwrap();

        let loaded = repository.load_games().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, GameId::new(1));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_entity_rejects_inconsistent_result() {
        let mut entity = GameEntity::from_game(&game(1));
        entity.result_reason = Some("checkmate".to_string());
        assert!(entity.clone().into_game().is_err());
        entity.status = "draw".to_string();
        assert!(entity.clone().into_game().is_err());
        entity.status = "white_won".to_string();
        assert!(entity.clone().into_game().is_ok());
        entity.status = "nonsense".to_string();
        assert!(entity.into_game().is_err());
    }
}
