//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! The channel-backed helpers give a client whose mailbox we control: the
//! test inspects the messages the client sends and plays the actor's side of
//! the conversation deterministically.

use chrono::Utc;
use tokio::sync::mpsc;

use crate::clients::{DirectoryClient, FriendshipClient};
use crate::domain::{Friendship, FriendshipStatus, User};
use crate::error::{DirectoryError, FriendshipError};
use crate::messages::{DirectoryRequest, FriendshipRequest, ServiceResponse};

/// A directory client wired to a channel the test holds the other end of.
pub fn mock_directory_client(
    buffer_size: usize,
) -> (DirectoryClient, mpsc::Receiver<DirectoryRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (DirectoryClient::new(sender), receiver)
}

/// A friendship client over mock channels for both its own mailbox and the
/// directory it validates addressees against.
pub fn mock_friendship_client(
    buffer_size: usize,
) -> (
    FriendshipClient,
    mpsc::Receiver<FriendshipRequest>,
    mpsc::Receiver<DirectoryRequest>,
) {
    let (directory, directory_rx) = mock_directory_client(buffer_size);
    let (sender, receiver) = mpsc::channel(buffer_size);
    (
        FriendshipClient::new(sender, directory),
        receiver,
        directory_rx,
    )
}

/// Helper to verify that the next directory message is a GetUser request
pub async fn expect_get_user(
    receiver: &mut mpsc::Receiver<DirectoryRequest>,
) -> Option<(String, ServiceResponse<Option<User>, DirectoryError>)> {
    match receiver.recv().await {
        Some(DirectoryRequest::GetUser { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next friendship message is a SendRequest
pub async fn expect_send_request(
    receiver: &mut mpsc::Receiver<FriendshipRequest>,
) -> Option<(
    String,
    String,
    ServiceResponse<Friendship, FriendshipError>,
)> {
    match receiver.recv().await {
        Some(FriendshipRequest::SendRequest {
            requester_id,
            addressee_id,
            respond_to,
        }) => Some((requester_id, addressee_id, respond_to)),
        _ => None,
    }
}

pub fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: "Test".to_string(),
        email: format!("{id}@example.com"),
        bio: None,
        photo_url: None,
        is_public: true,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_request_validates_the_addressee_first() {
        let (client, mut friend_rx, mut directory_rx) = mock_friendship_client(10);

        let task = tokio::spawn(async move {
            client
                .send_request("user_1".to_string(), "user_2".to_string())
                .await
        });

        // the client asks the directory about the addressee before anything else
        let (id, responder) = expect_get_user(&mut directory_rx)
            .await
            .expect("Expected GetUser request");
        assert_eq!(id, "user_2");
        responder.send(Ok(Some(sample_user("user_2")))).unwrap();

        // only then does the graph see the request
        let (requester, addressee, responder) = expect_send_request(&mut friend_rx)
            .await
            .expect("Expected SendRequest request");
        assert_eq!(requester, "user_1");
        assert_eq!(addressee, "user_2");
        let edge = Friendship {
            id: "friendship_1".to_string(),
            requester_id: requester,
            addressee_id: addressee,
            status: FriendshipStatus::Pending,
            created_at: Utc::now(),
        };
        responder.send(Ok(edge.clone())).unwrap();

        let result = task.await.unwrap().unwrap();
        assert_eq!(result.id, edge.id);
    }

    #[tokio::test]
    async fn unknown_addressee_never_reaches_the_graph() {
        let (client, mut friend_rx, mut directory_rx) = mock_friendship_client(10);

        let task = tokio::spawn(async move {
            client
                .send_request("user_1".to_string(), "user_9".to_string())
                .await
        });

        let (_, responder) = expect_get_user(&mut directory_rx)
            .await
            .expect("Expected GetUser request");
        responder.send(Ok(None)).unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, FriendshipError::UserNotFound("user_9".to_string()));

        // no message was sent to the friendship mailbox
        assert!(friend_rx.try_recv().is_err());
    }
}
