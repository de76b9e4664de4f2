// Session orchestration: the upload → parse → analyze → dashboard state machine,
// the in-memory session registry, and the controller that drives gateway calls.
// Only the controller mutates session state; handlers go through it.

pub mod controller;
pub mod handlers;
pub mod state;
pub mod store;

pub use controller::SessionController;
pub use state::{AppPhase, Session, SessionError};
pub use store::{SessionStore, SharedSession};
