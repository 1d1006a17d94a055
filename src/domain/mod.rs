pub mod announcement;
pub mod user;

pub use announcement::*;
pub use user::*;
