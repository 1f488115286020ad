use std::collections::{BTreeMap, BTreeSet};

use diesel::dsl::{count, exists};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;
use log::*;

use crate::db_config::SqlitePool;
use crate::errors::FilmorateError;
use crate::logic::friendship::{self, EdgeOp, EdgePair, FriendAction, FriendshipOutcome, FriendshipStatus};
use crate::logic::models::{Film, FilmId, Genre, Mpa, User, UserId};
use crate::logic::validation::{ValidFilm, ValidUser};
use crate::schema::{film_genres, films, friends, genres, likes, mpa, users};
use crate::storage::{
    film_not_found, genre_not_found, mpa_not_found, user_not_found, CatalogStorage, FilmStorage,
    Result, UserStorage,
};

use super::models::{
    catalog::{GenreRow, MpaRow},
    film::{FilmGenre, FilmRow, NewFilm, NewLike},
    friends::{Friend, NewFriend},
    user::{NewUser, UserRow},
};

type Connection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Relational storage. Every mutation runs inside one immediate transaction,
/// so concurrent writers are serialized by the database.
pub struct DbStorage {
    pool: SqlitePool,
}

impl DbStorage {
    pub fn new(pool: SqlitePool) -> Self {
        DbStorage { pool }
    }

    fn connection(&self) -> Result<Connection> {
        Ok(self.pool.get()?)
    }
}

// USERS

fn require_user(conn: &mut SqliteConnection, id: UserId) -> Result<()> {
    let found: bool = diesel::select(exists(users::table.find(id))).get_result(conn)?;
    if found {
        Ok(())
    } else {
        Err(user_not_found(id))
    }
}

fn check_user_unique(conn: &mut SqliteConnection, user: &ValidUser) -> Result<()> {
    let mut query = users::table
        .filter(users::email.eq(&user.email).or(users::login.eq(&user.login)))
        .into_boxed();
    if let Some(id) = user.id {
        query = query.filter(users::id.ne(id));
    }
    match query.first::<UserRow>(conn).optional()? {
        Some(existing) if existing.email == user.email => Err(FilmorateError::already_exists(
            format!("User with email: {} already exists", user.email),
        )),
        Some(_) => Err(FilmorateError::already_exists(format!(
            "User with login: {} already exists",
            user.login
        ))),
        None => Ok(()),
    }
}

/// Loads users ascending by id with their outgoing edges. `None` loads everyone.
fn load_users(conn: &mut SqliteConnection, ids: Option<&[UserId]>) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = match ids {
        Some(ids) => users::table
            .filter(users::id.eq_any(ids))
            .order(users::id.asc())
            .load(conn)?,
        None => users::table.order(users::id.asc()).load(conn)?,
    };
    let row_ids: Vec<UserId> = rows.iter().map(|row| row.id).collect();
    let edges: Vec<(UserId, UserId)> = friends::table
        .filter(friends::user_id.eq_any(&row_ids))
        .select((friends::user_id, friends::friend_id))
        .load(conn)?;

    let mut friends_of: BTreeMap<UserId, BTreeSet<UserId>> = BTreeMap::new();
    for (user_id, friend_id) in edges {
        friends_of.entry(user_id).or_default().insert(friend_id);
    }
    Ok(rows
        .into_iter()
        .map(|row| {
            let friends = friends_of.remove(&row.id).unwrap_or_default();
            row.into_user(friends)
        })
        .collect())
}

fn load_user(conn: &mut SqliteConnection, id: UserId) -> Result<User> {
    load_users(conn, Some(std::slice::from_ref(&id)))?
        .pop()
        .ok_or_else(|| user_not_found(id))
}

fn friend_ids(conn: &mut SqliteConnection, id: UserId) -> Result<BTreeSet<UserId>> {
    require_user(conn, id)?;
    let ids: Vec<UserId> = friends::table
        .filter(friends::user_id.eq(id))
        .select(friends::friend_id)
        .load(conn)?;
    Ok(ids.into_iter().collect())
}

fn edge(conn: &mut SqliteConnection, from: UserId, to: UserId) -> Result<Option<FriendshipStatus>> {
    let friend = friends::table
        .find((from, to))
        .first::<Friend>(conn)
        .optional()?;
    Ok(friend.map(|friend| friend.status()))
}

fn apply(conn: &mut SqliteConnection, op: EdgeOp) -> Result<()> {
    match op {
        EdgeOp::Insert { from, to, status } => {
            diesel::insert_into(friends::table)
                .values(NewFriend::new(from, to, status))
                .execute(conn)?;
        }
        EdgeOp::Delete { from, to } => {
            diesel::delete(friends::table.find((from, to))).execute(conn)?;
        }
    }
    Ok(())
}

impl UserStorage for DbStorage {
    fn users(&self) -> Result<Vec<User>> {
        let mut connection = self.connection()?;
        load_users(&mut connection, None)
    }

    fn user(&self, id: UserId) -> Result<User> {
        let mut connection = self.connection()?;
        load_user(&mut connection, id)
    }

    fn user_exists(&self, id: UserId) -> Result<bool> {
        let mut connection = self.connection()?;
        let found = diesel::select(exists(users::table.find(id))).get_result(&mut connection)?;
        Ok(found)
    }

    fn put_user(&self, user: ValidUser) -> Result<UserId> {
        let mut connection = self.connection()?;
        connection.immediate_transaction(|conn| {
            if let Some(id) = user.id {
                require_user(conn, id)?;
            }
            check_user_unique(conn, &user)?;
            let id = user.id;
            let row = NewUser::from(user);
            match id {
                None => {
                    let id = diesel::insert_into(users::table)
                        .values(&row)
                        .returning(users::id)
                        .get_result(conn)?;
                    Ok(id)
                }
                Some(id) => {
                    diesel::update(users::table.find(id)).set(&row).execute(conn)?;
                    Ok(id)
                }
            }
        })
    }

    fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut connection = self.connection()?;
        connection.immediate_transaction(|conn| {
            require_user(conn, id)?;
            diesel::delete(friends::table.filter(friends::user_id.eq(id).or(friends::friend_id.eq(id))))
                .execute(conn)?;
            diesel::delete(likes::table.filter(likes::user_id.eq(id))).execute(conn)?;
            let deleted = diesel::delete(users::table.find(id)).execute(conn)?;
            Ok(deleted > 0)
        })
    }

    fn update_friendship(
        &self,
        action: FriendAction,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<FriendshipOutcome> {
        friendship::check_not_self(user_id, friend_id)?;
        let mut connection = self.connection()?;
        connection.immediate_transaction(|conn| {
            require_user(conn, user_id)?;
            require_user(conn, friend_id)?;
            let edges = EdgePair {
                forward: edge(conn, user_id, friend_id)?,
                reverse: edge(conn, friend_id, user_id)?,
            };
            let transition = friendship::transition(action, user_id, friend_id, edges)?;
            debug!("Friendship {:?} -> {:?}", edges, transition.ops);
            for op in transition.ops {
                apply(conn, op)?;
            }
            Ok(transition.outcome)
        })
    }

    fn friends(&self, id: UserId) -> Result<Vec<User>> {
        let mut connection = self.connection()?;
        let ids: Vec<UserId> = friend_ids(&mut connection, id)?.into_iter().collect();
        load_users(&mut connection, Some(&ids))
    }

    fn common_friends(&self, id: UserId, other_id: UserId) -> Result<Vec<User>> {
        let mut connection = self.connection()?;
        let first = friend_ids(&mut connection, id)?;
        let second = friend_ids(&mut connection, other_id)?;
        let common: Vec<UserId> = first.intersection(&second).copied().collect();
        load_users(&mut connection, Some(&common))
    }
}

// FILMS

fn film_name(conn: &mut SqliteConnection, id: FilmId) -> Result<String> {
    films::table
        .find(id)
        .select(films::name)
        .first::<String>(conn)
        .optional()?
        .ok_or_else(|| film_not_found(id))
}

fn check_film_references(conn: &mut SqliteConnection, film: &ValidFilm) -> Result<()> {
    let mut query = films::table
        .filter(films::name.eq(&film.name))
        .select(films::id)
        .into_boxed();
    if let Some(id) = film.id {
        query = query.filter(films::id.ne(id));
    }
    if query.first::<FilmId>(conn).optional()?.is_some() {
        return Err(FilmorateError::already_exists(format!(
            "Film {} already exists",
            film.name
        )));
    }
    load_mpa(conn, film.mpa_id)?;
    for genre_id in &film.genre_ids {
        load_genre(conn, *genre_id)?;
    }
    Ok(())
}

/// Loads films ascending by id with their rating, genres and likes.
fn load_films(conn: &mut SqliteConnection, ids: Option<&[FilmId]>) -> Result<Vec<Film>> {
    let rows: Vec<FilmRow> = match ids {
        Some(ids) => films::table
            .filter(films::id.eq_any(ids))
            .order(films::id.asc())
            .load(conn)?,
        None => films::table.order(films::id.asc()).load(conn)?,
    };
    let row_ids: Vec<FilmId> = rows.iter().map(|row| row.id).collect();

    let ratings: BTreeMap<i32, Mpa> = mpa::table
        .load::<MpaRow>(conn)?
        .into_iter()
        .map(|row| (row.id, row.into()))
        .collect();

    let mut genres_of: BTreeMap<FilmId, Vec<Genre>> = BTreeMap::new();
    let film_genre_rows: Vec<(FilmId, GenreRow)> = film_genres::table
        .inner_join(genres::table)
        .filter(film_genres::film_id.eq_any(&row_ids))
        .order((film_genres::film_id.asc(), genres::id.asc()))
        .select((film_genres::film_id, (genres::id, genres::name)))
        .load(conn)?;
    for (film_id, genre) in film_genre_rows {
        genres_of.entry(film_id).or_default().push(genre.into());
    }

    let mut likes_of: BTreeMap<FilmId, BTreeSet<UserId>> = BTreeMap::new();
    let like_rows: Vec<(FilmId, UserId)> = likes::table
        .filter(likes::film_id.eq_any(&row_ids))
        .select((likes::film_id, likes::user_id))
        .load(conn)?;
    for (film_id, user_id) in like_rows {
        likes_of.entry(film_id).or_default().insert(user_id);
    }

    rows.into_iter()
        .map(|row| {
            let rating = ratings
                .get(&row.mpa_id)
                .cloned()
                .ok_or_else(|| mpa_not_found(row.mpa_id))?;
            let genres = genres_of.remove(&row.id).unwrap_or_default();
            let likes = likes_of.remove(&row.id).unwrap_or_default();
            Ok(row.into_film(rating, genres, likes))
        })
        .collect()
}

fn load_film(conn: &mut SqliteConnection, id: FilmId) -> Result<Film> {
    load_films(conn, Some(std::slice::from_ref(&id)))?
        .pop()
        .ok_or_else(|| film_not_found(id))
}

impl FilmStorage for DbStorage {
    fn films(&self) -> Result<Vec<Film>> {
        let mut connection = self.connection()?;
        load_films(&mut connection, None)
    }

    fn film(&self, id: FilmId) -> Result<Film> {
        let mut connection = self.connection()?;
        load_film(&mut connection, id)
    }

    fn film_exists(&self, id: FilmId) -> Result<bool> {
        let mut connection = self.connection()?;
        let found = diesel::select(exists(films::table.find(id))).get_result(&mut connection)?;
        Ok(found)
    }

    fn put_film(&self, film: ValidFilm) -> Result<FilmId> {
        let mut connection = self.connection()?;
        connection.immediate_transaction(|conn| {
            if let Some(id) = film.id {
                film_name(conn, id)?;
            }
            check_film_references(conn, &film)?;
            let row = NewFilm::from(&film);
            let id = match film.id {
                None => diesel::insert_into(films::table)
                    .values(&row)
                    .returning(films::id)
                    .get_result(conn)?,
                Some(id) => {
                    diesel::update(films::table.find(id)).set(&row).execute(conn)?;
                    id
                }
            };
            diesel::delete(film_genres::table.filter(film_genres::film_id.eq(id))).execute(conn)?;
            let genre_rows: Vec<FilmGenre> = film
                .genre_ids
                .iter()
                .map(|genre_id| FilmGenre {
                    film_id: id,
                    genre_id: *genre_id,
                })
                .collect();
            if !genre_rows.is_empty() {
                diesel::insert_into(film_genres::table)
                    .values(&genre_rows)
                    .execute(conn)?;
            }
            Ok(id)
        })
    }

    fn delete_film(&self, id: FilmId) -> Result<bool> {
        let mut connection = self.connection()?;
        connection.immediate_transaction(|conn| {
            film_name(conn, id)?;
            diesel::delete(film_genres::table.filter(film_genres::film_id.eq(id))).execute(conn)?;
            diesel::delete(likes::table.filter(likes::film_id.eq(id))).execute(conn)?;
            let deleted = diesel::delete(films::table.find(id)).execute(conn)?;
            Ok(deleted > 0)
        })
    }

    fn add_like(&self, film_id: FilmId, user_id: UserId) -> Result<()> {
        let mut connection = self.connection()?;
        connection.immediate_transaction(|conn| {
            let name = film_name(conn, film_id)?;
            require_user(conn, user_id)?;
            let liked: bool =
                diesel::select(exists(likes::table.find((film_id, user_id)))).get_result(conn)?;
            if liked {
                return Err(FilmorateError::already_exists(format!(
                    "User with ID: {} already liked film {} with ID: {}",
                    user_id, name, film_id
                )));
            }
            diesel::insert_into(likes::table)
                .values(NewLike { film_id, user_id })
                .execute(conn)?;
            Ok(())
        })
    }

    fn remove_like(&self, film_id: FilmId, user_id: UserId) -> Result<()> {
        let mut connection = self.connection()?;
        connection.immediate_transaction(|conn| {
            let name = film_name(conn, film_id)?;
            require_user(conn, user_id)?;
            let deleted = diesel::delete(likes::table.find((film_id, user_id))).execute(conn)?;
            if deleted == 0 {
                return Err(FilmorateError::not_found(format!(
                    "User with ID: {} has not liked film {} with ID: {}",
                    user_id, name, film_id
                )));
            }
            Ok(())
        })
    }

    fn popular(&self, limit: usize) -> Result<Vec<Film>> {
        let mut connection = self.connection()?;
        let ranked: Vec<FilmId> = films::table
            .left_join(likes::table)
            .group_by(films::id)
            .select((films::id, count(likes::user_id.nullable())))
            .order_by((count(likes::user_id.nullable()).desc(), films::id.asc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load::<(FilmId, i64)>(&mut connection)?
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        let mut films: BTreeMap<FilmId, Film> = load_films(&mut connection, Some(&ranked))?
            .into_iter()
            .map(|film| (film.id, film))
            .collect();
        Ok(ranked.iter().filter_map(|id| films.remove(id)).collect())
    }
}

// CATALOG

fn load_mpa(conn: &mut SqliteConnection, id: i32) -> Result<Mpa> {
    mpa::table
        .find(id)
        .first::<MpaRow>(conn)
        .optional()?
        .map(Mpa::from)
        .ok_or_else(|| mpa_not_found(id))
}

fn load_genre(conn: &mut SqliteConnection, id: i32) -> Result<Genre> {
    genres::table
        .find(id)
        .first::<GenreRow>(conn)
        .optional()?
        .map(Genre::from)
        .ok_or_else(|| genre_not_found(id))
}

impl CatalogStorage for DbStorage {
    fn all_mpa(&self) -> Result<Vec<Mpa>> {
        let mut connection = self.connection()?;
        let rows = mpa::table.order(mpa::id.asc()).load::<MpaRow>(&mut connection)?;
        Ok(rows.into_iter().map(Mpa::from).collect())
    }

    fn mpa(&self, id: i32) -> Result<Mpa> {
        let mut connection = self.connection()?;
        load_mpa(&mut connection, id)
    }

    fn genres(&self) -> Result<Vec<Genre>> {
        let mut connection = self.connection()?;
        let rows = genres::table
            .order(genres::id.asc())
            .load::<GenreRow>(&mut connection)?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }

    fn genre(&self, id: i32) -> Result<Genre> {
        let mut connection = self.connection()?;
        load_genre(&mut connection, id)
    }
}
