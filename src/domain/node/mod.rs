//! Node domain module

mod epoch;
mod session;

pub use epoch::ServerEpoch;
pub use session::{InvalidRoleTransition, Link, NodeSession, Role};
