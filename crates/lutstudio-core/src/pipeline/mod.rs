//! Session state, buffer reuse, and background regrade scheduling.

pub mod coordinator;
pub mod pool;
pub mod session;
