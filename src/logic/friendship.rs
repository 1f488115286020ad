//! Friend request protocol between two users.
//!
//! A friendship edge is directional. `A -> B` pending means A asked B and B
//! has not answered yet. When B asks A back, the pending edge is replaced by
//! two confirmed edges. Storages read the edge pair for `(user, friend)`, ask
//! [`transition`] what to do, and apply the returned operations atomically.

use std::fmt;

use crate::errors::FilmorateError;
use crate::logic::models::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipStatus {
    Pending,
    Confirmed,
}

impl From<&str> for FriendshipStatus {
    fn from(str: &str) -> Self {
        match str {
            "confirmed" => FriendshipStatus::Confirmed,
            _ => FriendshipStatus::Pending,
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FriendshipStatus::Pending => write!(f, "pending"),
            FriendshipStatus::Confirmed => write!(f, "confirmed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    Add,
    Remove,
}

/// Current edges between `user` and `friend`: `forward` is `user -> friend`,
/// `reverse` is `friend -> user`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgePair {
    pub forward: Option<FriendshipStatus>,
    pub reverse: Option<FriendshipStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOp {
    Insert {
        from: UserId,
        to: UserId,
        status: FriendshipStatus,
    },
    Delete {
        from: UserId,
        to: UserId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipOutcome {
    RequestSent,
    Confirmed,
    RequestWithdrawn,
    Unfriended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub ops: Vec<EdgeOp>,
    pub outcome: FriendshipOutcome,
}

impl FriendshipOutcome {
    pub fn describe(&self, user_id: UserId, friend_id: UserId) -> String {
        match self {
            FriendshipOutcome::RequestSent => format!(
                "User with ID: {} sent a friend request to user with ID: {}, friendship is not confirmed",
                user_id, friend_id
            ),
            FriendshipOutcome::Confirmed => format!(
                "User with ID: {} added user with ID: {} to friends, friendship is confirmed",
                user_id, friend_id
            ),
            FriendshipOutcome::RequestWithdrawn => format!(
                "User with ID: {} withdrew the friend request to user with ID: {}",
                user_id, friend_id
            ),
            FriendshipOutcome::Unfriended => format!(
                "User with ID: {} removed user with ID: {} from friends",
                user_id, friend_id
            ),
        }
    }
}

/// Rejects self friendship before any lookup is made.
pub fn check_not_self(user_id: UserId, friend_id: UserId) -> Result<(), FilmorateError> {
    if user_id == friend_id {
        return Err(FilmorateError::self_reference(format!(
            "User with ID: {} cannot be their own friend",
            user_id
        )));
    }
    Ok(())
}

pub fn transition(
    action: FriendAction,
    user_id: UserId,
    friend_id: UserId,
    edges: EdgePair,
) -> Result<Transition, FilmorateError> {
    check_not_self(user_id, friend_id)?;
    match action {
        FriendAction::Add => add(user_id, friend_id, edges),
        FriendAction::Remove => remove(user_id, friend_id, edges),
    }
}

fn add(user_id: UserId, friend_id: UserId, edges: EdgePair) -> Result<Transition, FilmorateError> {
    match (edges.forward, edges.reverse) {
        (Some(FriendshipStatus::Confirmed), _) => Err(FilmorateError::already_exists(format!(
            "Users with ID: {} and ID: {} are already friends",
            user_id, friend_id
        ))),
        (Some(FriendshipStatus::Pending), _) => Err(FilmorateError::already_exists(format!(
            "User with ID: {} already sent a friend request to user with ID: {}",
            user_id, friend_id
        ))),
        (None, None) => Ok(Transition {
            ops: vec![EdgeOp::Insert {
                from: user_id,
                to: friend_id,
                status: FriendshipStatus::Pending,
            }],
            outcome: FriendshipOutcome::RequestSent,
        }),
        (None, Some(_)) => Ok(Transition {
            ops: vec![
                EdgeOp::Delete {
                    from: friend_id,
                    to: user_id,
                },
                EdgeOp::Insert {
                    from: user_id,
                    to: friend_id,
                    status: FriendshipStatus::Confirmed,
                },
                EdgeOp::Insert {
                    from: friend_id,
                    to: user_id,
                    status: FriendshipStatus::Confirmed,
                },
            ],
            outcome: FriendshipOutcome::Confirmed,
        }),
    }
}

// A confirmed friendship is dissolved on both sides, the other user keeps no
// pending request.
fn remove(user_id: UserId, friend_id: UserId, edges: EdgePair) -> Result<Transition, FilmorateError> {
    match (edges.forward, edges.reverse) {
        (None, _) => Err(FilmorateError::not_found(format!(
            "Users with ID: {} and ID: {} are not friends",
            user_id, friend_id
        ))),
        (Some(_), None) => Ok(Transition {
            ops: vec![EdgeOp::Delete {
                from: user_id,
                to: friend_id,
            }],
            outcome: FriendshipOutcome::RequestWithdrawn,
        }),
        (Some(_), Some(_)) => Ok(Transition {
            ops: vec![
                EdgeOp::Delete {
                    from: user_id,
                    to: friend_id,
                },
                EdgeOp::Delete {
                    from: friend_id,
                    to: user_id,
                },
            ],
            outcome: FriendshipOutcome::Unfriended,
        }),
    }
}
