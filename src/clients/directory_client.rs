use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::client_method;
use crate::domain::{ProfilePatch, User, UserCreate};
use crate::error::DirectoryError;
use crate::messages::DirectoryRequest;

/// Client for the Directory actor (the identity store).
#[derive(Clone)]
pub struct DirectoryClient {
    sender: mpsc::Sender<DirectoryRequest>,
}

impl DirectoryClient {
    pub fn new(sender: mpsc::Sender<DirectoryRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), String> {
        debug!("Sending shutdown request");
        self.sender
            .send(DirectoryRequest::Shutdown)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

client_method!(DirectoryClient => fn register_user(user: UserCreate) -> String as DirectoryRequest::RegisterUser, Error = DirectoryError);
client_method!(DirectoryClient => fn get_user(id: String) -> Option<User> as DirectoryRequest::GetUser, Error = DirectoryError);
client_method!(DirectoryClient => fn find_user_by_name(name: String) -> Option<User> as DirectoryRequest::FindUserByName, Error = DirectoryError);
client_method!(DirectoryClient => fn search_users(fragment: String) -> Vec<User> as DirectoryRequest::SearchUsers, Error = DirectoryError);
client_method!(DirectoryClient => fn update_profile(id: String, patch: ProfilePatch) -> User as DirectoryRequest::UpdateProfile, Error = DirectoryError);
client_method!(DirectoryClient => fn list_users() -> Vec<User> as DirectoryRequest::ListUsers, Error = DirectoryError);

// Test-only method for internal state inspection
#[cfg(test)]
client_method!(DirectoryClient => fn get_user_count() -> usize as DirectoryRequest::GetUserCount, Error = DirectoryError);
