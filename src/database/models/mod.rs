pub mod item;
pub mod user;

pub use item::{Item, ItemPatch};
pub use user::{User, UserPatch};
