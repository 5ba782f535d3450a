use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::clients::DirectoryClient;
use crate::domain::{ProfilePatch, User, UserCreate};
use crate::error::DirectoryError;
use crate::messages::{DirectoryRequest, ServiceResponse};

/// The identity store realized as a sub-actor: user records, registration,
/// lookup, and profile updates. Other services reference users by id only.
pub struct DirectoryService {
    receiver: mpsc::Receiver<DirectoryRequest>,
    users: HashMap<String, User>,
    order: Vec<String>,
    next_id: u64,
}

impl DirectoryService {
    pub fn new(buffer_size: usize) -> (Self, DirectoryClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            users: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        };
        let client = DirectoryClient::new(sender);
        (service, client)
    }

    #[instrument(name = "directory_service", skip(self))]
    pub async fn run(mut self) {
        info!("DirectoryService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                DirectoryRequest::RegisterUser { user, respond_to } => {
                    self.handle_register_user(user, respond_to);
                }
                DirectoryRequest::GetUser { id, respond_to } => {
                    self.handle_get_user(id, respond_to);
                }
                DirectoryRequest::FindUserByName { name, respond_to } => {
                    self.handle_find_user_by_name(name, respond_to);
                }
                DirectoryRequest::SearchUsers {
                    fragment,
                    respond_to,
                } => {
                    self.handle_search_users(fragment, respond_to);
                }
                DirectoryRequest::UpdateProfile {
                    id,
                    patch,
                    respond_to,
                } => {
                    self.handle_update_profile(id, patch, respond_to);
                }
                DirectoryRequest::ListUsers { respond_to } => {
                    self.handle_list_users(respond_to);
                }
                DirectoryRequest::Shutdown => {
                    info!("DirectoryService shutting down");
                    break;
                }
                #[cfg(test)]
                DirectoryRequest::GetUserCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.users.len()));
                }
            }
        }

        info!("DirectoryService stopped");
    }

    /// Registration validates the payload and enforces email uniqueness; the
    /// check and the insert run in one handler turn.
    #[instrument(fields(user_name = %user.name, user_email = %user.email), skip(self, user, respond_to))]
    fn handle_register_user(
        &mut self,
        user: UserCreate,
        respond_to: ServiceResponse<String, DirectoryError>,
    ) {
        debug!("Processing register_user request");

        if user.name.trim().is_empty() {
            error!("Validation failed: empty name");
            let _ = respond_to.send(Err(DirectoryError::ValidationError(
                "Name required".to_string(),
            )));
            return;
        }
        if user.email.trim().is_empty() {
            error!("Validation failed: empty email");
            let _ = respond_to.send(Err(DirectoryError::ValidationError(
                "Email required".to_string(),
            )));
            return;
        }
        if self.users.values().any(|u| u.email == user.email) {
            error!("Email already registered");
            let _ = respond_to.send(Err(DirectoryError::EmailAlreadyExists(user.email)));
            return;
        }

        let id = format!("user_{}", self.next_id);
        self.next_id += 1;

        let record = User {
            id: id.clone(),
            name: user.name,
            email: user.email,
            bio: None,
            photo_url: None,
            is_public: user.is_public,
            created_at: Utc::now(),
        };
        self.users.insert(id.clone(), record);
        self.order.push(id.clone());

        info!(user_id = %id, "User registered successfully");
        let _ = respond_to.send(Ok(id));
    }

    #[instrument(fields(user_id = %id), skip(self, respond_to))]
    fn handle_get_user(&self, id: String, respond_to: ServiceResponse<Option<User>, DirectoryError>) {
        debug!("Processing get_user request");

        let user = self.users.get(&id).cloned();

        match &user {
            Some(user) => info!(user_name = %user.name, "User found"),
            None => debug!("User not found"),
        }

        let _ = respond_to.send(Ok(user));
    }

    /// Exact-name lookup, per the identity store contract.
    #[instrument(fields(user_name = %name), skip(self, respond_to))]
    fn handle_find_user_by_name(
        &self,
        name: String,
        respond_to: ServiceResponse<Option<User>, DirectoryError>,
    ) {
        debug!("Processing find_user_by_name request");

        let user = self.users.values().find(|u| u.name == name).cloned();
        let _ = respond_to.send(Ok(user));
    }

    /// Case-insensitive substring search over user names.
    #[instrument(skip(self, respond_to))]
    fn handle_search_users(
        &self,
        fragment: String,
        respond_to: ServiceResponse<Vec<User>, DirectoryError>,
    ) {
        debug!("Processing search_users request");

        let needle = fragment.to_lowercase();
        let users: Vec<User> = self
            .order
            .iter()
            .filter_map(|id| self.users.get(id))
            .filter(|u| u.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        info!(match_count = users.len(), "Searched users");
        let _ = respond_to.send(Ok(users));
    }

    #[instrument(fields(user_id = %id), skip(self, patch, respond_to))]
    fn handle_update_profile(
        &mut self,
        id: String,
        patch: ProfilePatch,
        respond_to: ServiceResponse<User, DirectoryError>,
    ) {
        debug!("Processing update_profile request");

        let result = match self.users.get_mut(&id) {
            Some(user) => {
                user.apply(patch);
                info!("Profile updated successfully");
                Ok(user.clone())
            }
            None => {
                error!("User not found for update");
                Err(DirectoryError::NotFound(id))
            }
        };

        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_list_users(&self, respond_to: ServiceResponse<Vec<User>, DirectoryError>) {
        debug!("Processing list_users request");

        let users: Vec<User> = self
            .order
            .iter()
            .filter_map(|id| self.users.get(id))
            .cloned()
            .collect();

        info!(user_count = users.len(), "Listed users");
        let _ = respond_to.send(Ok(users));
    }
}
