use chrono::NaiveDateTime;

use crate::logic::friendship::FriendshipStatus;
use crate::logic::models::UserId;
use crate::schema::friends;

#[derive(Queryable, PartialEq, Clone, Debug)]
pub struct Friend {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl Friend {
    pub fn status(&self) -> FriendshipStatus {
        FriendshipStatus::from(self.status.as_str())
    }
}

#[derive(Insertable, Clone)]
#[diesel(table_name = friends)]
pub struct NewFriend {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: String,
}

impl NewFriend {
    pub fn new(user_id: UserId, friend_id: UserId, status: FriendshipStatus) -> Self {
        NewFriend {
            user_id,
            friend_id,
            status: status.to_string(),
        }
    }
}
