pub mod appointment;
pub mod event;
pub mod friendship;
pub mod user;

pub use appointment::*;
pub use event::*;
pub use friendship::*;
pub use user::*;
