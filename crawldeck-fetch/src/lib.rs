// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Crawldeck Fetch
//!
//! Adaptive API client for a self-hosted scraping server.
//!
//! Servers in the wild expose either the current `/v2` API or an older
//! surface. This crate hides the difference:
//!
//! ## Transport
//!
//! - [`transport::Transport`] - Executes one request, composing the caller's
//!   [`CancelSignal`] with a per-request deadline
//! - [`host::http::HttpSend`] - Injected sender, reqwest in production
//! - [`host::timer::Timer`] - Injected deadline clock, tokio in production
//!
//! ## Capability Probing
//!
//! - [`probe::ProbeChain`] - Tries the current endpoint, then legacy ones
//! - [`legacy`] - The health, activity and usage chains
//! - [`normalize`] - Maps legacy response shapes onto the current models
//!
//! ## Facade
//!
//! - [`client::CrawlClient`] - One method per remote operation
//! - [`poller::Poller`] - Interval polling with per-tick cancellation
//!
//! ## Example
//!
//! ```ignore
//! use crawldeck_fetch::{ClientConfig, CrawlClient, RequestOptions};
//!
//! let client = CrawlClient::new(ClientConfig::from_parts("http://localhost:3002/", None))?;
//! let health = client.health(&RequestOptions::new()).await?;
//! println!("{} via {:?}", health.status, health.checked_endpoint());
//! ```

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod legacy;
pub mod normalize;
pub mod poller;
pub mod probe;
pub mod transport;

#[cfg(test)]
mod testutil;

// Re-export key types at crate root

// Errors
pub use error::{ClientError, ErrorKind, HttpError};

// Configuration
pub use cancel::CancelSignal;
pub use config::{ClientConfig, DEFAULT_TIMEOUT, RequestOptions};

// Host APIs
pub use host::{HttpRequest, HttpResponse, HttpSend, Method, ReqwestSender, Timer, TokioTimer};

// Client
pub use client::CrawlClient;
pub use poller::{PollState, Poller};
pub use probe::{ProbeAttempt, ProbeChain, ProbeOutcome, ProbeStep};
pub use transport::Transport;
