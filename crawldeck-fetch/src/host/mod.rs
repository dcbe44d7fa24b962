//! Host APIs the client depends on.
//!
//! These are the only places that touch the network or the clock:
//!
//! - [`http`] - HTTP sender trait and the reqwest implementation
//! - [`timer`] - Deadline timer trait and the tokio implementation

pub mod http;
pub mod timer;

// Re-export key types
pub use http::{HttpRequest, HttpResponse, HttpSend, Method, ReqwestSender};
pub use timer::{Timer, TokioTimer};
