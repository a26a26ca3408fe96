//! ocdeploy rollout watching — waits for the platform to report a ready rollout.
//!
//! After an update is submitted the platform converges replicas on its
//! own. This crate drives a bounded polling loop over the client's
//! readiness check until the rollout is ready, the attempt budget runs
//! out, or the caller cancels.
//!
//! # Components
//!
//! - **`policy`** — Poll policy (max attempts, fixed interval)
//! - **`watcher`** — Rollout state machine (Polling → Ready | TimedOut)

pub mod policy;
pub mod watcher;

pub use policy::PollPolicy;
pub use watcher::{RolloutError, RolloutOutcome, RolloutPhase, RolloutWatcher};
