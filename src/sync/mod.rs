pub mod engine;
pub mod gesture;
pub mod rollback;
pub mod session;
pub mod state;

pub use engine::{BoardOptions, BoardSync, DropEvent};
pub use gesture::{Binding, DragCapability, GestureRegistry};
pub use rollback::rollback;
pub use session::{DragSession, SessionSlot};
pub use state::{MoveOutcome, MoveState, PendingMove};
