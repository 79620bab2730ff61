mod forms;
mod session;
mod user;

pub use forms::*;
pub use session::*;
pub use user::*;
