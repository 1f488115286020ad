use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{DbError, DbErrorKind, FilmorateError};
use crate::logic::catalog::{GENRES, MPA_RATINGS};
use crate::logic::friendship::{self, EdgeOp, EdgePair, FriendAction, FriendshipOutcome, FriendshipStatus};
use crate::logic::models::{Film, FilmId, Genre, Mpa, User, UserId};
use crate::logic::popularity;
use crate::logic::validation::{ValidFilm, ValidUser};

use super::{
    film_not_found, genre_not_found, mpa_not_found, user_not_found, CatalogStorage, FilmStorage,
    Result, UserStorage,
};

#[derive(Clone, Debug)]
struct UserRecord {
    email: String,
    login: String,
    name: String,
    birthday: chrono::NaiveDate,
    /// Outgoing edges: friend id -> status.
    friends: BTreeMap<UserId, FriendshipStatus>,
}

#[derive(Clone, Debug)]
struct FilmRecord {
    name: String,
    description: String,
    release_date: chrono::NaiveDate,
    duration: i32,
    mpa_id: i32,
    genre_ids: BTreeSet<i32>,
    likes: BTreeSet<UserId>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, UserRecord>,
    films: BTreeMap<FilmId, FilmRecord>,
    mpa: BTreeMap<i32, String>,
    genres: BTreeMap<i32, String>,
}

/// Map based storage. One lock guards all tables so every check-then-act
/// sequence runs under a single write guard.
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
    next_user_id: AtomicI32,
    next_film_id: AtomicI32,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        let tables = Tables {
            mpa: MPA_RATINGS.iter().map(|(id, name)| (*id, name.to_string())).collect(),
            genres: GENRES.iter().map(|(id, name)| (*id, name.to_string())).collect(),
            ..Tables::default()
        };
        InMemoryStorage {
            tables: RwLock::new(tables),
            next_user_id: AtomicI32::new(1),
            next_film_id: AtomicI32::new(1),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| FilmorateError::from(DbError(DbErrorKind::Poisoned)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| FilmorateError::from(DbError(DbErrorKind::Poisoned)))
    }
}

impl Tables {
    fn user(&self, id: UserId) -> Result<User> {
        let record = self.users.get(&id).ok_or_else(|| user_not_found(id))?;
        Ok(User {
            id,
            email: record.email.clone(),
            login: record.login.clone(),
            name: record.name.clone(),
            birthday: record.birthday,
            friends: record.friends.keys().copied().collect(),
        })
    }

    fn film(&self, id: FilmId) -> Result<Film> {
        let record = self.films.get(&id).ok_or_else(|| film_not_found(id))?;
        Ok(Film {
            id,
            name: record.name.clone(),
            description: record.description.clone(),
            release_date: record.release_date,
            duration: record.duration,
            mpa: self.mpa(record.mpa_id)?,
            genres: record
                .genre_ids
                .iter()
                .map(|genre_id| self.genre(*genre_id))
                .collect::<Result<Vec<_>>>()?,
            likes: record.likes.clone(),
        })
    }

    fn mpa(&self, id: i32) -> Result<Mpa> {
        self.mpa
            .get(&id)
            .map(|name| Mpa { id, name: name.clone() })
            .ok_or_else(|| mpa_not_found(id))
    }

    fn genre(&self, id: i32) -> Result<Genre> {
        self.genres
            .get(&id)
            .map(|name| Genre { id, name: name.clone() })
            .ok_or_else(|| genre_not_found(id))
    }

    fn require_user(&self, id: UserId) -> Result<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(user_not_found(id))
        }
    }

    fn require_film(&self, id: FilmId) -> Result<()> {
        if self.films.contains_key(&id) {
            Ok(())
        } else {
            Err(film_not_found(id))
        }
    }

    fn check_user_unique(&self, user: &ValidUser) -> Result<()> {
        let others = self
            .users
            .iter()
            .filter(|(id, _)| Some(**id) != user.id)
            .map(|(_, record)| record);
        for record in others {
            if record.email == user.email {
                return Err(FilmorateError::already_exists(format!(
                    "User with email: {} already exists",
                    user.email
                )));
            }
            if record.login == user.login {
                return Err(FilmorateError::already_exists(format!(
                    "User with login: {} already exists",
                    user.login
                )));
            }
        }
        Ok(())
    }

    fn check_film_references(&self, film: &ValidFilm) -> Result<()> {
        if self
            .films
            .iter()
            .any(|(id, record)| Some(*id) != film.id && record.name == film.name)
        {
            return Err(FilmorateError::already_exists(format!(
                "Film {} already exists",
                film.name
            )));
        }
        self.mpa(film.mpa_id)?;
        for genre_id in &film.genre_ids {
            self.genre(*genre_id)?;
        }
        Ok(())
    }

    fn edge(&self, from: UserId, to: UserId) -> Option<FriendshipStatus> {
        self.users
            .get(&from)
            .and_then(|record| record.friends.get(&to).copied())
    }

    fn apply(&mut self, op: EdgeOp) {
        match op {
            EdgeOp::Insert { from, to, status } => {
                if let Some(record) = self.users.get_mut(&from) {
                    record.friends.insert(to, status);
                }
            }
            EdgeOp::Delete { from, to } => {
                if let Some(record) = self.users.get_mut(&from) {
                    record.friends.remove(&to);
                }
            }
        }
    }

    fn friend_ids(&self, id: UserId) -> Result<BTreeSet<UserId>> {
        let record = self.users.get(&id).ok_or_else(|| user_not_found(id))?;
        Ok(record.friends.keys().copied().collect())
    }
}

impl UserStorage for InMemoryStorage {
    fn users(&self) -> Result<Vec<User>> {
        let tables = self.read()?;
        tables.users.keys().map(|id| tables.user(*id)).collect()
    }

    fn user(&self, id: UserId) -> Result<User> {
        self.read()?.user(id)
    }

    fn user_exists(&self, id: UserId) -> Result<bool> {
        Ok(self.read()?.users.contains_key(&id))
    }

    fn put_user(&self, user: ValidUser) -> Result<UserId> {
        let mut tables = self.write()?;
        if let Some(id) = user.id {
            tables.require_user(id)?;
        }
        tables.check_user_unique(&user)?;
        match user.id {
            None => {
                let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
                tables.users.insert(
                    id,
                    UserRecord {
                        email: user.email,
                        login: user.login,
                        name: user.name,
                        birthday: user.birthday,
                        friends: BTreeMap::new(),
                    },
                );
                Ok(id)
            }
            Some(id) => {
                let record = tables.users.get_mut(&id).ok_or_else(|| user_not_found(id))?;
                record.email = user.email;
                record.login = user.login;
                record.name = user.name;
                record.birthday = user.birthday;
                Ok(id)
            }
        }
    }

    fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut tables = self.write()?;
        tables.require_user(id)?;
        tables.users.remove(&id);
        for record in tables.users.values_mut() {
            record.friends.remove(&id);
        }
        for film in tables.films.values_mut() {
            film.likes.remove(&id);
        }
        Ok(true)
    }

    fn update_friendship(
        &self,
        action: FriendAction,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<FriendshipOutcome> {
        friendship::check_not_self(user_id, friend_id)?;
        let mut tables = self.write()?;
        tables.require_user(user_id)?;
        tables.require_user(friend_id)?;
        let edges = EdgePair {
            forward: tables.edge(user_id, friend_id),
            reverse: tables.edge(friend_id, user_id),
        };
        let transition = friendship::transition(action, user_id, friend_id, edges)?;
        for op in transition.ops {
            tables.apply(op);
        }
        Ok(transition.outcome)
    }

    fn friends(&self, id: UserId) -> Result<Vec<User>> {
        let tables = self.read()?;
        tables
            .friend_ids(id)?
            .into_iter()
            .map(|friend_id| tables.user(friend_id))
            .collect()
    }

    fn common_friends(&self, id: UserId, other_id: UserId) -> Result<Vec<User>> {
        let tables = self.read()?;
        let first = tables.friend_ids(id)?;
        let second = tables.friend_ids(other_id)?;
        first
            .intersection(&second)
            .map(|friend_id| tables.user(*friend_id))
            .collect()
    }
}

impl FilmStorage for InMemoryStorage {
    fn films(&self) -> Result<Vec<Film>> {
        let tables = self.read()?;
        tables.films.keys().map(|id| tables.film(*id)).collect()
    }

    fn film(&self, id: FilmId) -> Result<Film> {
        self.read()?.film(id)
    }

    fn film_exists(&self, id: FilmId) -> Result<bool> {
        Ok(self.read()?.films.contains_key(&id))
    }

    fn put_film(&self, film: ValidFilm) -> Result<FilmId> {
        let mut tables = self.write()?;
        if let Some(id) = film.id {
            tables.require_film(id)?;
        }
        tables.check_film_references(&film)?;
        let genre_ids: BTreeSet<i32> = film.genre_ids.into_iter().collect();
        match film.id {
            None => {
                let id = self.next_film_id.fetch_add(1, Ordering::SeqCst);
                tables.films.insert(
                    id,
                    FilmRecord {
                        name: film.name,
                        description: film.description,
                        release_date: film.release_date,
                        duration: film.duration,
                        mpa_id: film.mpa_id,
                        genre_ids,
                        likes: BTreeSet::new(),
                    },
                );
                Ok(id)
            }
            Some(id) => {
                let record = tables.films.get_mut(&id).ok_or_else(|| film_not_found(id))?;
                record.name = film.name;
                record.description = film.description;
                record.release_date = film.release_date;
                record.duration = film.duration;
                record.mpa_id = film.mpa_id;
                record.genre_ids = genre_ids;
                Ok(id)
            }
        }
    }

    fn delete_film(&self, id: FilmId) -> Result<bool> {
        let mut tables = self.write()?;
        tables.require_film(id)?;
        Ok(tables.films.remove(&id).is_some())
    }

    fn add_like(&self, film_id: FilmId, user_id: UserId) -> Result<()> {
        let mut tables = self.write()?;
        tables.require_film(film_id)?;
        tables.require_user(user_id)?;
        let film = tables.films.get_mut(&film_id).ok_or_else(|| film_not_found(film_id))?;
        if !film.likes.insert(user_id) {
            return Err(FilmorateError::already_exists(format!(
                "User with ID: {} already liked film {} with ID: {}",
                user_id, film.name, film_id
            )));
        }
        Ok(())
    }

    fn remove_like(&self, film_id: FilmId, user_id: UserId) -> Result<()> {
        let mut tables = self.write()?;
        tables.require_film(film_id)?;
        tables.require_user(user_id)?;
        let film = tables.films.get_mut(&film_id).ok_or_else(|| film_not_found(film_id))?;
        if !film.likes.remove(&user_id) {
            return Err(FilmorateError::not_found(format!(
                "User with ID: {} has not liked film {} with ID: {}",
                user_id, film.name, film_id
            )));
        }
        Ok(())
    }

    fn popular(&self, limit: usize) -> Result<Vec<Film>> {
        let tables = self.read()?;
        let scores = tables.films.iter().map(|(id, film)| (*id, film.likes.len()));
        popularity::rank(scores, limit)
            .into_iter()
            .map(|id| tables.film(id))
            .collect()
    }
}

impl CatalogStorage for InMemoryStorage {
    fn all_mpa(&self) -> Result<Vec<Mpa>> {
        let tables = self.read()?;
        tables.mpa.keys().map(|id| tables.mpa(*id)).collect()
    }

    fn mpa(&self, id: i32) -> Result<Mpa> {
        self.read()?.mpa(id)
    }

    fn genres(&self) -> Result<Vec<Genre>> {
        let tables = self.read()?;
        tables.genres.keys().map(|id| tables.genre(*id)).collect()
    }

    fn genre(&self, id: i32) -> Result<Genre> {
        self.read()?.genre(id)
    }
}
