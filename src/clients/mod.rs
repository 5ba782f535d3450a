mod macros;

mod directory_client;
mod friendship_client;
mod scheduler_client;

pub use directory_client::DirectoryClient;
pub use friendship_client::FriendshipClient;
pub use scheduler_client::SchedulingClient;
