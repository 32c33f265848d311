pub mod category;
pub mod event;
pub mod user;

pub use category::{Category, NewCategory};
pub use event::{Event, EventInput};
pub use user::{NewUser, User};
