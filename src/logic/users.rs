use log::*;

use crate::errors::FilmorateError;
use crate::logic::blocking;
use crate::logic::friendship::{self, FriendAction, FriendshipOutcome};
use crate::logic::models::{ResponseMessage, User, UserDraft, UserId};
use crate::logic::validation::{require_id, validate_user};
use crate::storage::SharedStorage;

pub async fn get_users(storage: &SharedStorage) -> Result<Vec<User>, FilmorateError> {
    debug!("Requesting all users");
    blocking(storage, |s| s.users()).await
}

pub async fn get_user(storage: &SharedStorage, id: UserId) -> Result<User, FilmorateError> {
    debug!("Requesting user with ID: {}", id);
    blocking(storage, move |s| s.user(id)).await
}

pub async fn create_user(storage: &SharedStorage, draft: UserDraft) -> Result<User, FilmorateError> {
    let mut user = validate_user(draft)?;
    user.id = None;
    let user = blocking(storage, move |s| {
        let id = s.put_user(user)?;
        s.user(id)
    })
    .await?;
    info!(
        "Created user ID: {}, email: {}, login: {}",
        user.id, user.email, user.login
    );
    Ok(user)
}

pub async fn update_user(storage: &SharedStorage, draft: UserDraft) -> Result<User, FilmorateError> {
    require_id(draft.id, "User")?;
    let user = validate_user(draft)?;
    let user = blocking(storage, move |s| {
        let id = s.put_user(user)?;
        s.user(id)
    })
    .await?;
    info!(
        "Updated user ID: {}, email: {}, login: {}",
        user.id, user.email, user.login
    );
    Ok(user)
}

pub async fn delete_user(storage: &SharedStorage, id: UserId) -> Result<ResponseMessage, FilmorateError> {
    blocking(storage, move |s| s.delete_user(id)).await?;
    let message = format!("User with ID: {} was deleted", id);
    info!("{}", message);
    Ok(ResponseMessage::ok(message))
}

// FRIENDS

pub async fn add_friend(
    storage: &SharedStorage,
    user_id: UserId,
    friend_id: UserId,
) -> Result<ResponseMessage, FilmorateError> {
    change_friendship(storage, FriendAction::Add, user_id, friend_id).await
}

pub async fn remove_friend(
    storage: &SharedStorage,
    user_id: UserId,
    friend_id: UserId,
) -> Result<ResponseMessage, FilmorateError> {
    change_friendship(storage, FriendAction::Remove, user_id, friend_id).await
}

async fn change_friendship(
    storage: &SharedStorage,
    action: FriendAction,
    user_id: UserId,
    friend_id: UserId,
) -> Result<ResponseMessage, FilmorateError> {
    debug!("{:?} friend with ID: {} for user with ID: {}", action, friend_id, user_id);
    friendship::check_not_self(user_id, friend_id)?;
    let outcome: FriendshipOutcome =
        blocking(storage, move |s| s.update_friendship(action, user_id, friend_id)).await?;
    let message = outcome.describe(user_id, friend_id);
    info!("{}", message);
    Ok(ResponseMessage::ok(message))
}

pub async fn get_friends(storage: &SharedStorage, id: UserId) -> Result<Vec<User>, FilmorateError> {
    debug!("Requesting friends of user with ID: {}", id);
    blocking(storage, move |s| s.friends(id)).await
}

pub async fn get_common_friends(
    storage: &SharedStorage,
    id: UserId,
    other_id: UserId,
) -> Result<Vec<User>, FilmorateError> {
    debug!("Requesting common friends of users with ID: {} and ID: {}", id, other_id);
    blocking(storage, move |s| s.common_friends(id, other_id)).await
}
