//! Domain of the travel tracker: users, the countries they have visited and
//! the process-wide current user.

pub use error::EngineError;
pub use ops::{Dashboard, Engine, EngineBuilder};
pub use session::CurrentUser;
pub use users::{DEFAULT_COLOR, FALLBACK_COLOR, User};

pub mod countries;
mod error;
mod ops;
mod session;
pub mod users;
pub mod visited_countries;

type ResultEngine<T> = Result<T, EngineError>;
