use std::cmp::Reverse;

use crate::errors::FilmorateError;
use crate::logic::models::FilmId;

pub const DEFAULT_POPULAR_COUNT: i64 = 10;

/// Validates the optional `count` query value and turns it into a limit.
pub fn popular_limit(count: Option<i64>) -> Result<usize, FilmorateError> {
    let count = count.unwrap_or(DEFAULT_POPULAR_COUNT);
    if count <= 0 {
        return Err(FilmorateError::validation(format!(
            "Count of popular films must be positive, got {}",
            count
        )));
    }
    Ok(usize::try_from(count).unwrap_or(usize::MAX))
}

/// Orders `(film id, like count)` pairs by likes descending then id ascending
/// and keeps the first `limit` ids. Films without likes stay in the ranking.
pub fn rank<I>(scores: I, limit: usize) -> Vec<FilmId>
where
    I: IntoIterator<Item = (FilmId, usize)>,
{
    let mut scores: Vec<(FilmId, usize)> = scores.into_iter().collect();
    scores.sort_by_key(|&(id, likes)| (Reverse(likes), id));
    scores.into_iter().take(limit).map(|(id, _)| id).collect()
}
