//! Wire and domain types shared by the banana slides client crates.

mod domain;
pub use domain::*;

mod kind;
pub use kind::{JobKind, JobRequest, MaterialJob, ServiceKind};

mod settings;
pub use settings::{
    ImageResolution, MAX_WORKERS, MIN_WORKERS, ProviderFormat, Settings, SettingsUpdate,
};

mod library;
pub use library::*;

mod error;
pub use error::ModelError;
