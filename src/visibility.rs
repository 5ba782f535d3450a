use tracing::{debug, instrument};

use crate::clients::{DirectoryClient, FriendshipClient};
use crate::domain::{Profile, User};
use crate::error::VisibilityError;

/// The single predicate deciding whether one user may see another's private
/// details. Every gated read goes through here; no caller re-implements the
/// rule.
#[derive(Clone)]
pub struct Visibility {
    directory: DirectoryClient,
    friendships: FriendshipClient,
}

impl Visibility {
    pub fn new(directory: DirectoryClient, friendships: FriendshipClient) -> Self {
        Self {
            directory,
            friendships,
        }
    }

    /// Viewer sees subject when viewing themself, when the subject's profile
    /// is public, or when an accepted friendship joins the pair.
    #[instrument(skip(self))]
    pub async fn can_view(
        &self,
        viewer_id: &str,
        subject_id: &str,
    ) -> Result<bool, VisibilityError> {
        let subject = self.fetch_subject(subject_id).await?;
        self.can_view_user(viewer_id, &subject).await
    }

    /// Same predicate when the caller already holds the subject record.
    pub async fn can_view_user(
        &self,
        viewer_id: &str,
        subject: &User,
    ) -> Result<bool, VisibilityError> {
        if viewer_id == subject.id || subject.is_public {
            return Ok(true);
        }

        self.friendships
            .are_connected(viewer_id.to_string(), subject.id.clone())
            .await
            .map_err(|e| VisibilityError::ActorCommunicationError(e.to_string()))
    }

    /// Resolves a profile view: the full record when the gate passes, the
    /// redacted form when it does not. The gate suppresses fields, it never
    /// hides the user's existence.
    #[instrument(skip(self))]
    pub async fn view_profile(
        &self,
        viewer_id: &str,
        subject_id: &str,
    ) -> Result<Profile, VisibilityError> {
        let subject = self.fetch_subject(subject_id).await?;

        let profile = if self.can_view_user(viewer_id, &subject).await? {
            debug!("Gate passed, full profile");
            Profile::full(&subject)
        } else {
            debug!("Gate failed, redacted profile");
            Profile::redacted(&subject)
        };
        Ok(profile)
    }

    async fn fetch_subject(&self, subject_id: &str) -> Result<User, VisibilityError> {
        self.directory
            .get_user(subject_id.to_string())
            .await
            .map_err(|e| VisibilityError::ActorCommunicationError(e.to_string()))?
            .ok_or_else(|| VisibilityError::UserNotFound(subject_id.to_string()))
    }
}
