pub mod deploy;
pub mod provisioner;
pub mod report;
pub mod resolver;
pub mod retry;

pub use crate::domain::model::{Account, Project, ProjectDescriptor};
pub use crate::domain::ports::ApiTransport;
pub use crate::utils::error::Result;
