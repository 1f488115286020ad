//! Scenarios every storage must pass. Each storage module runs them against
//! a fresh instance of itself.

use std::thread;

use chrono::NaiveDate;

use crate::errors::FilmorateErrorKind;
use crate::logic::friendship::{FriendAction, FriendshipOutcome};
use crate::logic::validation::{ValidFilm, ValidUser};

use super::{Result, Storage};

pub fn valid_user(login: &str) -> ValidUser {
    ValidUser {
        id: None,
        email: format!("{}@example.com", login),
        login: login.to_owned(),
        name: login.to_uppercase(),
        birthday: NaiveDate::from_ymd_opt(1990, 10, 12).unwrap_or_default(),
    }
}

pub fn valid_film(name: &str) -> ValidFilm {
    ValidFilm {
        id: None,
        name: name.to_owned(),
        description: format!("Description of {}", name),
        release_date: NaiveDate::from_ymd_opt(1999, 3, 31).unwrap_or_default(),
        duration: 136,
        mpa_id: 4,
        genre_ids: vec![4, 6],
    }
}

fn is_not_found<T>(result: Result<T>) -> bool {
    matches!(result, Err(e) if matches!(e.kind(), FilmorateErrorKind::NotFound(_)))
}

fn is_already_exists<T>(result: Result<T>) -> bool {
    matches!(result, Err(e) if matches!(e.kind(), FilmorateErrorKind::AlreadyExists(_)))
}

fn users(storage: &dyn Storage, logins: &[&str]) -> Result<Vec<i32>> {
    logins
        .iter()
        .map(|login| storage.put_user(valid_user(login)))
        .collect()
}

fn friend_ids(storage: &dyn Storage, id: i32) -> Result<Vec<i32>> {
    Ok(storage.friends(id)?.into_iter().map(|user| user.id).collect())
}

// USERS

pub fn user_crud(storage: &dyn Storage) -> Result<()> {
    let id = storage.put_user(valid_user("neo"))?;
    let user = storage.user(id)?;
    assert_eq!(user.login, "neo");
    assert_eq!(user.name, "NEO");
    assert!(user.friends.is_empty());
    assert!(storage.user_exists(id)?);
    assert!(!storage.user_exists(id + 100)?);

    let mut change = valid_user("anderson");
    change.id = Some(id);
    assert_eq!(storage.put_user(change)?, id);
    assert_eq!(storage.user(id)?.login, "anderson");

    let mut missing = valid_user("smith");
    missing.id = Some(id + 100);
    assert!(is_not_found(storage.put_user(missing)));

    let mut same_email = valid_user("trinity");
    same_email.email = "anderson@example.com".to_owned();
    assert!(is_already_exists(storage.put_user(same_email)));
    let mut same_login = valid_user("anderson");
    same_login.email = "other@example.com".to_owned();
    assert!(is_already_exists(storage.put_user(same_login)));

    let second = storage.put_user(valid_user("morpheus"))?;
    let ids: Vec<i32> = storage.users()?.into_iter().map(|user| user.id).collect();
    assert_eq!(ids, vec![id, second]);

    assert!(storage.delete_user(id)?);
    assert!(is_not_found(storage.user(id)));
    assert!(is_not_found(storage.delete_user(id)));
    Ok(())
}

pub fn user_delete_cascades(storage: &dyn Storage) -> Result<()> {
    let ids = users(storage, &["neo", "trinity", "morpheus"])?;
    let (neo, trinity, morpheus) = (ids[0], ids[1], ids[2]);
    storage.update_friendship(FriendAction::Add, neo, trinity)?;
    storage.update_friendship(FriendAction::Add, trinity, neo)?;
    storage.update_friendship(FriendAction::Add, morpheus, neo)?;
    let film = storage.put_film(valid_film("The Matrix"))?;
    storage.add_like(film, neo)?;
    storage.add_like(film, trinity)?;

    storage.delete_user(neo)?;
    assert!(friend_ids(storage, trinity)?.is_empty());
    assert!(friend_ids(storage, morpheus)?.is_empty());
    assert_eq!(storage.film(film)?.likes.into_iter().collect::<Vec<_>>(), vec![trinity]);
    Ok(())
}

// FRIENDS

pub fn friendship_protocol(storage: &dyn Storage) -> Result<()> {
    let ids = users(storage, &["alice", "bob"])?;
    let (alice, bob) = (ids[0], ids[1]);

    assert_eq!(
        storage.update_friendship(FriendAction::Add, alice, bob)?,
        FriendshipOutcome::RequestSent
    );
    assert_eq!(friend_ids(storage, alice)?, vec![bob]);
    assert!(friend_ids(storage, bob)?.is_empty());
    assert!(is_already_exists(storage.update_friendship(FriendAction::Add, alice, bob)));

    assert_eq!(
        storage.update_friendship(FriendAction::Add, bob, alice)?,
        FriendshipOutcome::Confirmed
    );
    assert_eq!(friend_ids(storage, alice)?, vec![bob]);
    assert_eq!(friend_ids(storage, bob)?, vec![alice]);
    assert!(storage.user(alice)?.friends.contains(&bob));
    assert!(is_already_exists(storage.update_friendship(FriendAction::Add, bob, alice)));

    assert_eq!(
        storage.update_friendship(FriendAction::Remove, bob, alice)?,
        FriendshipOutcome::Unfriended
    );
    assert!(friend_ids(storage, alice)?.is_empty());
    assert!(friend_ids(storage, bob)?.is_empty());
    assert!(is_not_found(storage.update_friendship(FriendAction::Remove, bob, alice)));

    storage.update_friendship(FriendAction::Add, alice, bob)?;
    assert_eq!(
        storage.update_friendship(FriendAction::Remove, alice, bob)?,
        FriendshipOutcome::RequestWithdrawn
    );
    assert!(friend_ids(storage, alice)?.is_empty());

    assert!(is_not_found(storage.update_friendship(FriendAction::Add, alice, bob + 100)));
    assert!(is_not_found(storage.update_friendship(FriendAction::Add, alice + 100, bob)));
    let self_request = storage.update_friendship(FriendAction::Add, alice, alice);
    assert!(matches!(self_request, Err(e) if matches!(e.kind(), FilmorateErrorKind::SelfReference(_))));
    Ok(())
}

pub fn friend_queries(storage: &dyn Storage) -> Result<()> {
    let ids = users(storage, &["alice", "bob", "carol", "dave"])?;
    let (alice, bob, carol, dave) = (ids[0], ids[1], ids[2], ids[3]);
    storage.update_friendship(FriendAction::Add, alice, dave)?;
    storage.update_friendship(FriendAction::Add, alice, carol)?;
    storage.update_friendship(FriendAction::Add, bob, carol)?;
    storage.update_friendship(FriendAction::Add, carol, bob)?;
    storage.update_friendship(FriendAction::Add, bob, dave)?;

    assert_eq!(friend_ids(storage, alice)?, vec![carol, dave]);
    let common: Vec<i32> = storage
        .common_friends(alice, bob)?
        .into_iter()
        .map(|user| user.id)
        .collect();
    assert_eq!(common, vec![carol, dave]);
    assert!(storage.common_friends(carol, dave)?.is_empty());

    assert!(is_not_found(storage.friends(alice + 100)));
    assert!(is_not_found(storage.common_friends(alice, alice + 100)));
    Ok(())
}

// FILMS

pub fn film_crud(storage: &dyn Storage) -> Result<()> {
    let id = storage.put_film(valid_film("The Matrix"))?;
    let film = storage.film(id)?;
    assert_eq!(film.mpa.name, "R");
    assert_eq!(
        film.genres.iter().map(|genre| genre.name.as_str()).collect::<Vec<_>>(),
        vec!["Thriller", "Action"]
    );
    assert!(storage.film_exists(id)?);

    let mut change = valid_film("The Matrix Reloaded");
    change.id = Some(id);
    change.genre_ids = vec![];
    change.mpa_id = 3;
    storage.put_film(change)?;
    let film = storage.film(id)?;
    assert_eq!(film.name, "The Matrix Reloaded");
    assert!(film.genres.is_empty());
    assert_eq!(film.mpa.name, "PG-13");

    let mut missing = valid_film("Missing");
    missing.id = Some(id + 100);
    assert!(is_not_found(storage.put_film(missing)));
    assert!(is_already_exists(storage.put_film(valid_film("The Matrix Reloaded"))));

    let mut bad_mpa = valid_film("Bad rating");
    bad_mpa.mpa_id = 42;
    assert!(is_not_found(storage.put_film(bad_mpa)));
    let mut bad_genre = valid_film("Bad genre");
    bad_genre.genre_ids = vec![1, 42];
    assert!(is_not_found(storage.put_film(bad_genre)));
    assert_eq!(storage.films()?.len(), 1);

    assert!(storage.delete_film(id)?);
    assert!(is_not_found(storage.film(id)));
    assert!(is_not_found(storage.delete_film(id)));
    Ok(())
}

pub fn likes(storage: &dyn Storage) -> Result<()> {
    let film = storage.put_film(valid_film("Heat"))?;
    let user = storage.put_user(valid_user("fan"))?;

    storage.add_like(film, user)?;
    assert!(storage.film(film)?.likes.contains(&user));
    assert!(is_already_exists(storage.add_like(film, user)));

    storage.remove_like(film, user)?;
    assert!(storage.film(film)?.likes.is_empty());
    assert!(is_not_found(storage.remove_like(film, user)));

    assert!(is_not_found(storage.add_like(film + 100, user)));
    assert!(is_not_found(storage.add_like(film, user + 100)));
    Ok(())
}

pub fn popular(storage: &dyn Storage) -> Result<()> {
    let films: Vec<i32> = ["Alien", "Aliens", "Alien 3", "Prometheus"]
        .iter()
        .map(|name| storage.put_film(valid_film(name)))
        .collect::<Result<_>>()?;
    let fans = users(storage, &["ripley", "hicks", "bishop"])?;
    for fan in &fans {
        storage.add_like(films[1], *fan)?;
    }
    storage.add_like(films[3], fans[0])?;
    storage.add_like(films[2], fans[1])?;

    let ranked: Vec<i32> = storage.popular(10)?.into_iter().map(|film| film.id).collect();
    assert_eq!(ranked, vec![films[1], films[2], films[3], films[0]]);
    let top: Vec<i32> = storage.popular(2)?.into_iter().map(|film| film.id).collect();
    assert_eq!(top, vec![films[1], films[2]]);
    assert_eq!(storage.popular(2)?[0].likes.len(), 3);
    assert_eq!(storage.popular(3)?, storage.popular(3)?);
    Ok(())
}

// CONCURRENCY

const ROUNDS: usize = 40;
const LIKE_THREADS: usize = 8;

/// Two users ask each other at the same moment: one request is sent, the
/// other confirms it, and the friendship ends up confirmed on both sides.
pub fn concurrent_mutual_requests(storage: &dyn Storage) -> Result<()> {
    for round in 0..ROUNDS {
        let left = format!("left{}", round);
        let right = format!("right{}", round);
        let ids = users(storage, &[&left, &right])?;
        let (a, b) = (ids[0], ids[1]);

        let (forward, backward) = thread::scope(|scope| {
            let forward = scope.spawn(move || storage.update_friendship(FriendAction::Add, a, b));
            let backward = scope.spawn(move || storage.update_friendship(FriendAction::Add, b, a));
            (
                forward.join().expect("friend request thread"),
                backward.join().expect("friend request thread"),
            )
        });
        let mut outcomes = vec![forward?, backward?];
        outcomes.sort_by_key(|outcome| *outcome == FriendshipOutcome::Confirmed);
        assert_eq!(
            outcomes,
            vec![FriendshipOutcome::RequestSent, FriendshipOutcome::Confirmed]
        );
        assert_eq!(friend_ids(storage, a)?, vec![b]);
        assert_eq!(friend_ids(storage, b)?, vec![a]);
        assert!(is_already_exists(storage.update_friendship(FriendAction::Add, a, b)));
    }
    Ok(())
}

/// Many identical likes at once: exactly one is stored.
pub fn concurrent_likes(storage: &dyn Storage) -> Result<()> {
    let film = storage.put_film(valid_film("Rashomon"))?;
    let user = storage.put_user(valid_user("witness"))?;

    let results: Vec<Result<()>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..LIKE_THREADS)
            .map(|_| scope.spawn(move || storage.add_like(film, user)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("like thread"))
            .collect()
    });
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .into_iter()
        .filter(|result| result.is_err())
        .all(is_already_exists));
    assert_eq!(storage.film(film)?.likes.len(), 1);
    Ok(())
}

// CATALOG

pub fn catalog(storage: &dyn Storage) -> Result<()> {
    let ratings: Vec<String> = storage.all_mpa()?.into_iter().map(|mpa| mpa.name).collect();
    assert_eq!(ratings, vec!["G", "PG", "PG-13", "R", "NC-17"]);
    assert_eq!(storage.mpa(5)?.name, "NC-17");
    assert!(is_not_found(storage.mpa(6)));

    let genres = storage.genres()?;
    assert_eq!(genres.len(), 6);
    assert_eq!(genres[0].name, "Comedy");
    assert_eq!(storage.genre(5)?.name, "Documentary");
    assert!(is_not_found(storage.genre(0)));
    Ok(())
}
