use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Friendship edge lifecycle. Pending edges are directed (only the addressee
/// may accept or reject); accepted edges are symmetric. Rejected is terminal:
/// a later request between the same pair creates a new edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendshipStatus {
    /// Active edges are subject to the one-edge-per-pair invariant.
    pub fn is_active(self) -> bool {
        matches!(self, FriendshipStatus::Pending | FriendshipStatus::Accepted)
    }
}

impl std::fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FriendshipStatus::Pending => "PENDING",
            FriendshipStatus::Accepted => "ACCEPTED",
            FriendshipStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

/// A single directed edge between two users. Symmetry of accepted
/// friendships is a query-time concern; only one row exists per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// True when the edge connects the given unordered pair, either direction.
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.requester_id == a && self.addressee_id == b)
            || (self.requester_id == b && self.addressee_id == a)
    }

    /// True when the user is on either side of the edge.
    pub fn involves(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.addressee_id == user_id
    }
}
