pub mod audit;
pub mod emitter;
pub mod error;
pub mod id;
pub mod model;
pub mod mutation;
pub mod pages;
pub mod parser;
pub mod registry;
pub mod submission;
mod tree;

pub use audit::{AuditFinding, audit_document};
pub use emitter::{serialize, serialize_pretty};
pub use error::{BridgeError, KindError, PageError, RecordError, TreeError};
pub use id::ElementId;
pub use model::*;
pub use mutation::Mutation;
pub use parser::deserialize;
pub use registry::{KindInfo, construct};
pub use submission::validate_submission;
