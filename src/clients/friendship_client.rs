use tokio::sync::mpsc;
use tracing::{debug, error, instrument};

use crate::client_method;
use crate::clients::DirectoryClient;
use crate::domain::Friendship;
use crate::error::FriendshipError;
use crate::messages::FriendshipRequest;

/// Client for the Friendship actor. `send_request` orchestrates: the
/// addressee is validated against the directory before the graph is asked to
/// create the edge.
#[derive(Clone)]
pub struct FriendshipClient {
    sender: mpsc::Sender<FriendshipRequest>,
    directory: DirectoryClient,
}

impl FriendshipClient {
    pub fn new(sender: mpsc::Sender<FriendshipRequest>, directory: DirectoryClient) -> Self {
        Self { sender, directory }
    }

    #[instrument(skip(self))]
    pub async fn send_request(
        &self,
        requester_id: String,
        addressee_id: String,
    ) -> Result<Friendship, FriendshipError> {
        debug!("Sending request");

        // Step 1: the addressee must exist
        match self.directory.get_user(addressee_id.clone()).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                error!("Addressee not found");
                return Err(FriendshipError::UserNotFound(addressee_id));
            }
            Err(e) => {
                error!(error = %e, "Addressee lookup failed");
                return Err(FriendshipError::ActorCommunicationError(e.to_string()));
            }
        }

        // Step 2: let the graph actor run the atomic duplicate check + create
        let (respond_to, response) = tokio::sync::oneshot::channel();
        self.sender
            .send(FriendshipRequest::SendRequest {
                requester_id,
                addressee_id,
                respond_to,
            })
            .await
            .map_err(|_| FriendshipError::ActorCommunicationError("Actor closed".to_string()))?;

        response
            .await
            .map_err(|_| FriendshipError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), String> {
        debug!("Sending shutdown request");
        self.sender
            .send(FriendshipRequest::Shutdown)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

client_method!(FriendshipClient => fn accept(friendship_id: String, acting_user_id: String) -> Friendship as FriendshipRequest::Accept, Error = FriendshipError);
client_method!(FriendshipClient => fn reject(friendship_id: String, acting_user_id: String) -> Friendship as FriendshipRequest::Reject, Error = FriendshipError);
client_method!(FriendshipClient => fn remove(friendship_id: String, acting_user_id: String) -> () as FriendshipRequest::Remove, Error = FriendshipError);
client_method!(FriendshipClient => fn list_friends(user_id: String) -> Vec<Friendship> as FriendshipRequest::ListFriends, Error = FriendshipError);
client_method!(FriendshipClient => fn list_pending(user_id: String) -> Vec<Friendship> as FriendshipRequest::ListPending, Error = FriendshipError);
client_method!(FriendshipClient => fn are_connected(a: String, b: String) -> bool as FriendshipRequest::AreConnected, Error = FriendshipError);

// Test-only method for internal state inspection
#[cfg(test)]
client_method!(FriendshipClient => fn get_edge_count() -> usize as FriendshipRequest::GetEdgeCount, Error = FriendshipError);
