use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::logic::models::{Film, FilmId, Genre, Mpa, UserId};
use crate::logic::validation::ValidFilm;
use crate::schema::{film_genres, films, likes};

#[derive(Queryable, PartialEq, Clone, Debug)]
pub struct FilmRow {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa_id: i32,
}

impl FilmRow {
    pub fn into_film(self, mpa: Mpa, genres: Vec<Genre>, likes: BTreeSet<UserId>) -> Film {
        Film {
            id: self.id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa,
            genres,
            likes,
        }
    }
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = films)]
pub struct NewFilm {
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa_id: i32,
}

impl From<&ValidFilm> for NewFilm {
    fn from(film: &ValidFilm) -> Self {
        NewFilm {
            name: film.name.clone(),
            description: film.description.clone(),
            release_date: film.release_date,
            duration: film.duration,
            mpa_id: film.mpa_id,
        }
    }
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = film_genres)]
pub struct FilmGenre {
    pub film_id: FilmId,
    pub genre_id: i32,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub film_id: FilmId,
    pub user_id: UserId,
}
