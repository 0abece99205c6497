pub mod commands;
pub mod gesture;
pub mod persist;
pub mod reconcile;
pub mod session;
pub mod store;

pub use gesture::{DragSource, DropTarget};
pub use persist::{LoadError, SaveError, load_session, save_session};
pub use reconcile::{DropError, Plan, Reconciler};
pub use session::{DesignerSession, SessionConfig};
pub use store::{FormStore, MemoryStore, SaveRequest, StoreError, StoredForm};
