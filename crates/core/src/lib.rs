pub mod auth;
pub mod display;
pub mod llm_client;
pub mod query;
pub mod reference;
pub mod response;
pub mod session;
pub mod typing;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{Authenticator, Credentials};
pub use display::{Banner, DisplaySurface};
pub use query::{Selection, compose};
pub use reference::{ReferenceList, ReferenceListError};
pub use response::{FailureKind, ResponseResult, ResponseService};
pub use session::{AskOutcome, LoginOutcome, SessionController, SessionPhase, SessionState};
pub use typing::TypingRenderer;
