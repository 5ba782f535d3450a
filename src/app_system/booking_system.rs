use tracing::{error, info};

use crate::clients::{DirectoryClient, FriendshipClient, SchedulingClient};
use crate::directory::DirectoryService;
use crate::friendships::FriendshipService;
use crate::scheduler::SchedulingService;
use crate::visibility::Visibility;

const CHANNEL_BUFFER_SIZE: usize = 32;

/// The application system that orchestrates all actors.
///
/// Responsible for starting the services in dependency order, wiring the
/// clients together, and handling shutdown.
pub struct BookingSystem {
    pub directory: DirectoryClient,
    pub friendships: FriendshipClient,
    pub scheduling: SchedulingClient,
    pub visibility: Visibility,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for BookingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingSystem {
    pub fn new() -> Self {
        // 1. Directory first: everything else validates users against it
        let (directory_service, directory) = DirectoryService::new(CHANNEL_BUFFER_SIZE);
        let directory_handle = tokio::spawn(directory_service.run());

        // 2. Friendship graph, validating addressees via the directory
        let (friendship_service, friendships) =
            FriendshipService::new(CHANNEL_BUFFER_SIZE, directory.clone());
        let friendship_handle = tokio::spawn(friendship_service.run());

        // 3. Scheduling root actor, gating reads via directory + friendships
        let (scheduling_service, scheduling) = SchedulingService::new(
            CHANNEL_BUFFER_SIZE,
            directory.clone(),
            friendships.clone(),
        );
        let scheduling_handle = tokio::spawn(scheduling_service.run());

        let visibility = Visibility::new(directory.clone(), friendships.clone());

        Self {
            directory,
            friendships,
            scheduling,
            visibility,
            handles: vec![directory_handle, friendship_handle, scheduling_handle],
        }
    }

    /// Sends each service its shutdown message in reverse dependency order
    /// and waits for the actor tasks to finish.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        self.scheduling.shutdown().await?;
        self.friendships.shutdown().await?;
        self.directory.shutdown().await?;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
