//! ocdeploy-release — one release of one deployment config, end to end.
//!
//! ```text
//! Release::run
//!   ├── WorkDir::create            (removed again on every path)
//!   ├── SourceFetcher::fetch       (git clone of the release repo)
//!   ├── prepare_descriptor         (variable context + Tera + YAML)
//!   ├── server_status              (must be 200)
//!   ├── Reconciler::reconcile      (existence checks, live state merge)
//!   ├── Reconciler::submit
//!   ├── RolloutWatcher::wait       (bounded fixed-interval polling)
//!   └── ReleaseSummary             (best-effort read of the final state)
//! ```
//!
//! Every failure is fatal to the release and surfaces as a single
//! [`ReleaseError`]; [`ReleaseError::kind`] classifies it.

pub mod error;
pub mod orchestrator;
pub mod reconcile;
pub mod source;
pub mod summary;
pub mod workspace;

pub use error::{FailureKind, ReleaseError, ReleaseResult};
pub use orchestrator::{Release, prepare_descriptor};
pub use reconcile::{Reconciler, build_payload};
pub use source::{GitFetcher, LocalDirFetcher, SourceFetcher};
pub use summary::ReleaseSummary;
pub use workspace::WorkDir;
