// Export submodules
mod dispatcher;
pub mod keyword;

pub use dispatcher::{compose_reply, MessageDispatcher};
pub use keyword::{parse_keyword, KEYWORDS};
