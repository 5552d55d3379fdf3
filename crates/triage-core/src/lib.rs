pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod hold;
pub mod mutate;
pub mod palette;
pub mod source;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::CacheEngine;
pub use config::{ConfigKey, ConfigStore, Credentials, SecretBackend, Settings};
pub use error::{Result, TriageError};
pub use filter::FilteredView;
pub use mutate::{Confirmation, NoteMutator};
pub use palette::PaletteColor;
pub use source::{ListQuery, ProjectPage, ProjectSource, SourceError, SourceErrorKind};
pub use types::{Project, ProjectId, ProjectPatch, Snapshot};
pub use view::{ViewDefinition, ViewKind, ViewSet};
