//! reqwest implementation of the triage [`ProjectSource`].
//!
//! Talks to three endpoints of the Asana REST API:
//!
//! ```text
//! GET /projects?workspace=&limit=&archived=false&opt_fields=&offset=   list, paginated
//! GET /projects/{gid}?opt_fields=                                     single read
//! PUT /projects/{gid}   {"data": {"notes": ...} | {"color": ...}}     partial update
//! ```
//!
//! Every response is wrapped in `{"data": ...}`; listings add a `next_page`
//! object whose `offset` is fed back for the following page. HTTP 503 maps to
//! a transient [`SourceError`]; everything else is permanent.
//!
//! [`ProjectSource`]: triage_core::ProjectSource
//! [`SourceError`]: triage_core::SourceError

pub mod client;
pub mod error;

pub use client::{AsanaClient, DEFAULT_BASE_URL};
pub use error::AsanaError;
