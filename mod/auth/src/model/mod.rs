pub mod session;
pub mod user;

pub use session::{Claims, RefreshRequest, Session, TokenKind, TokenPair};
pub use user::{CreateUser, Role, UpdateUser, User, UserView};
