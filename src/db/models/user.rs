use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::logic::models::{User, UserId};
use crate::logic::validation::ValidUser;
use crate::schema::users;

#[derive(Queryable, PartialEq, Clone, Debug)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}

impl UserRow {
    pub fn into_user(self, friends: BTreeSet<UserId>) -> User {
        User {
            id: self.id,
            email: self.email,
            login: self.login,
            name: self.name,
            birthday: self.birthday,
            friends,
        }
    }
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}

impl From<ValidUser> for NewUser {
    fn from(user: ValidUser) -> Self {
        NewUser {
            email: user.email,
            login: user.login,
            name: user.name,
            birthday: user.birthday,
        }
    }
}
