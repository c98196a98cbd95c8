pub mod memory;

pub use memory::InMemoryRepository;

use crate::chirp::{Chirp, NewChirp};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence contract for chirps, their authors and their tags.
///
/// An empty tag filter places no tag restriction on the result: every chirp
/// is listed or counted, including chirps without tags.
#[async_trait]
pub trait ChirpRepository: Send + Sync + 'static {
    /// Creates the backing tables if they do not exist yet.
    async fn ensure_schema(&self) -> Result<()>;

    /// Stores a chirp with its author and tags in one atomic unit and
    /// returns the new chirp id.
    ///
    /// Authors and tags are reused by name. On any failure nothing from the
    /// submission is visible afterwards.
    async fn create_chirp(&self, chirp: NewChirp) -> Result<i32>;

    /// Lists chirps carrying at least one of `tags`. Each chirp comes back
    /// with its full tag set, not only the tags that matched.
    async fn get_chirps(&self, tags: &[String]) -> Result<Vec<Chirp>>;

    /// Counts distinct chirps created in `[starting_date, ending_date)` that
    /// carry at least one of `tags`.
    ///
    /// Dates are `YYYY-MM-DD` strings (a time of day is accepted as well);
    /// a malformed date is an execution failure.
    async fn count_chirps(
        &self,
        starting_date: &str,
        ending_date: &str,
        tags: &[String],
    ) -> Result<i64>;
}
