//! ocdeploy-render — turns a checked-out template into a deployment descriptor.
//!
//! # Components
//!
//! - **`resolve`** — locates the deployment template and environment
//!   variable file by trying `yaml` then `yml`
//! - **`renderer`** — renders the template with Tera against a
//!   [`VariableContext`](ocdeploy_core::VariableContext) and parses the
//!   result as a single YAML document

pub mod error;
pub mod renderer;
pub mod resolve;

pub use error::{RenderError, RenderResult};
pub use renderer::{Renderer, load_variables, parse_descriptor};
pub use resolve::{EXTENSIONS, SourceLayout, TemplateSources, resolve_first};
