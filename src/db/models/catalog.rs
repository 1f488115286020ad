use crate::logic::models::{Genre, Mpa};

#[derive(Queryable, Clone, Debug)]
pub struct MpaRow {
    pub id: i32,
    pub name: String,
}

impl From<MpaRow> for Mpa {
    fn from(row: MpaRow) -> Self {
        Mpa {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Queryable, Clone, Debug)]
pub struct GenreRow {
    pub id: i32,
    pub name: String,
}

impl From<GenreRow> for Genre {
    fn from(row: GenreRow) -> Self {
        Genre {
            id: row.id,
            name: row.name,
        }
    }
}
