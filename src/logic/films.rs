use log::*;

use crate::errors::FilmorateError;
use crate::logic::blocking;
use crate::logic::models::{Film, FilmDraft, FilmId, ResponseMessage, UserId};
use crate::logic::popularity::popular_limit;
use crate::logic::validation::{require_id, validate_film};
use crate::storage::SharedStorage;

pub async fn get_films(storage: &SharedStorage) -> Result<Vec<Film>, FilmorateError> {
    debug!("Requesting all films");
    blocking(storage, |s| s.films()).await
}

pub async fn get_film(storage: &SharedStorage, id: FilmId) -> Result<Film, FilmorateError> {
    debug!("Requesting film with ID: {}", id);
    blocking(storage, move |s| s.film(id)).await
}

pub async fn create_film(storage: &SharedStorage, draft: FilmDraft) -> Result<Film, FilmorateError> {
    let mut film = validate_film(draft)?;
    film.id = None;
    let film = blocking(storage, move |s| {
        let id = s.put_film(film)?;
        s.film(id)
    })
    .await?;
    info!(
        "Created film ID: {}, name: {}, release: {}",
        film.id, film.name, film.release_date
    );
    Ok(film)
}

pub async fn update_film(storage: &SharedStorage, draft: FilmDraft) -> Result<Film, FilmorateError> {
    require_id(draft.id, "Film")?;
    let film = validate_film(draft)?;
    let film = blocking(storage, move |s| {
        let id = s.put_film(film)?;
        s.film(id)
    })
    .await?;
    info!(
        "Updated film ID: {}, name: {}, release: {}",
        film.id, film.name, film.release_date
    );
    Ok(film)
}

pub async fn delete_film(storage: &SharedStorage, id: FilmId) -> Result<ResponseMessage, FilmorateError> {
    blocking(storage, move |s| s.delete_film(id)).await?;
    let message = format!("Film with ID: {} was deleted", id);
    info!("{}", message);
    Ok(ResponseMessage::ok(message))
}

// LIKES

pub async fn add_like(
    storage: &SharedStorage,
    film_id: FilmId,
    user_id: UserId,
) -> Result<ResponseMessage, FilmorateError> {
    debug!("User with ID: {} likes film with ID: {}", user_id, film_id);
    blocking(storage, move |s| s.add_like(film_id, user_id)).await?;
    let message = format!("User with ID: {} liked film with ID: {}", user_id, film_id);
    info!("{}", message);
    Ok(ResponseMessage::ok(message))
}

pub async fn remove_like(
    storage: &SharedStorage,
    film_id: FilmId,
    user_id: UserId,
) -> Result<ResponseMessage, FilmorateError> {
    debug!("User with ID: {} removes like from film with ID: {}", user_id, film_id);
    blocking(storage, move |s| s.remove_like(film_id, user_id)).await?;
    let message = format!("User with ID: {} removed like from film with ID: {}", user_id, film_id);
    info!("{}", message);
    Ok(ResponseMessage::ok(message))
}

pub async fn get_popular(storage: &SharedStorage, count: Option<i64>) -> Result<Vec<Film>, FilmorateError> {
    let limit = popular_limit(count)?;
    debug!("Requesting {} most popular films", limit);
    blocking(storage, move |s| s.popular(limit)).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::FilmorateErrorKind;
    use crate::logic::models::{Reference, UserDraft};
    use crate::logic::users::create_user;
    use crate::storage::in_memory::InMemoryStorage;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn storage() -> SharedStorage {
        Arc::new(InMemoryStorage::new())
    }

    fn draft(name: &str) -> FilmDraft {
        FilmDraft {
            id: None,
            name: name.to_owned(),
            description: "Any film description".to_owned(),
            release_date: NaiveDate::from_ymd_opt(1990, 10, 12),
            duration: Some(95),
            mpa: Some(Reference { id: 1 }),
            genres: vec![Reference { id: 2 }, Reference { id: 1 }],
        }
    }

    async fn user(storage: &SharedStorage, login: &str) -> Result<UserId, FilmorateError> {
        let draft = UserDraft {
            id: None,
            email: format!("{}@example.com", login),
            login: login.to_owned(),
            name: None,
            birthday: NaiveDate::from_ymd_opt(2005, 1, 22),
        };
        Ok(create_user(storage, draft).await?.id)
    }

    #[tokio::test]
    pub async fn test_create_film_fills_references() -> Result<(), FilmorateError> {
        let storage = storage();
        let film = create_film(&storage, draft("FilmName")).await?;
        assert_eq!(film.mpa.name, "G");
        assert_eq!(
            film.genres.iter().map(|genre| genre.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        Ok(())
    }

    #[tokio::test]
    pub async fn test_update_film_replaces_genres_and_keeps_likes() -> Result<(), FilmorateError> {
        let storage = storage();
        let film = create_film(&storage, draft("FilmName")).await?;
        let user_id = user(&storage, "fan").await?;
        add_like(&storage, film.id, user_id).await?;

        let mut change = draft("FilmName Redux");
        change.id = Some(film.id);
        change.genres = vec![Reference { id: 6 }];
        let updated = update_film(&storage, change).await?;
        assert_eq!(updated.name, "FilmName Redux");
        assert_eq!(updated.genres.len(), 1);
        assert_eq!(updated.genres[0].id, 6);
        assert!(updated.likes.contains(&user_id));
        Ok(())
    }

    #[tokio::test]
    pub async fn test_popular_default_and_invalid_count() -> Result<(), FilmorateError> {
        let storage = storage();
        for i in 0..12 {
            create_film(&storage, draft(&format!("Film{}", i))).await?;
        }
        assert_eq!(get_popular(&storage, None).await?.len(), 10);
        let error = get_popular(&storage, Some(0)).await.unwrap_err();
        assert!(matches!(error.kind(), FilmorateErrorKind::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    pub async fn test_like_round_trip() -> Result<(), FilmorateError> {
        let storage = storage();
        let film = create_film(&storage, draft("FilmName")).await?;
        let user_id = user(&storage, "fan").await?;

        add_like(&storage, film.id, user_id).await?;
        let error = add_like(&storage, film.id, user_id).await.unwrap_err();
        assert!(matches!(error.kind(), FilmorateErrorKind::AlreadyExists(_)));
        remove_like(&storage, film.id, user_id).await?;
        assert_eq!(get_film(&storage, film.id).await?, film);
        Ok(())
    }
}
