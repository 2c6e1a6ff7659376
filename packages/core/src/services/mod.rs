//! Business Services
//!
//! - `TreeService` - node and tree creation workflows plus tree read paths
//!
//! Services coordinate between the storage layer, content generation, and layout,
//! implementing ownership rules and the all-or-nothing creation guarantees.

pub mod error;
pub mod tree_service;

pub use error::{CreationStage, ErrorCategory, ErrorKind, ErrorPayload, TreeServiceError};
pub use tree_service::{
    ChildCreated, CreateChildNode, CreateTree, TreeCreated, TreeRef, TreeService,
    TreeServiceConfig,
};
