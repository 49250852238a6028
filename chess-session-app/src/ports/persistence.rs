use crate::domain::{RepoError, game::Game};

/// Durable copy of the game store. The in-memory store stays authoritative; the repository
/// receives a full snapshot after every state change and is read once at start-up.
#[async_trait::async_trait]
pub trait GameRepository {
    /// Stores `game` unless a snapshot with a higher or equal revision is already stored.
    async fn save_game(&self, game: Game) -> Result<(), RepoError>;
    async fn load_games(&self) -> Result<Vec<Game>, RepoError>;
}
