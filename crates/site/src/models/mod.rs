//! Domain types for the site.

pub mod catalog;
pub mod session;
pub mod user;

pub use catalog::{
    Dataset, DatasetInput, Studio, StudioInput, StudioWithWorkflows, Toolkit, ToolkitInput,
    ToolkitWithStudios, Workflow, WorkflowInput,
};
pub use session::CurrentUser;
pub use user::{LabUser, LabUserUpdate, NewLabUser, ProfileUpdate};
