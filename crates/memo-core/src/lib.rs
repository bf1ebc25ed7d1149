pub mod assembly;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod live;
pub mod logging;
pub mod moving;
pub mod repository;
pub mod types;
pub mod validation;

pub use assembly::{assemble, flat_items, ExpandState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MemoConfig;
pub use error::{MemoError, Result};
pub use events::{DomainEvent, Table};
pub use live::Subscription;
pub use moving::{plan_move, DropTarget, MoveOutcome};
pub use repository::{FolderRepository, MemoRepository};
pub use types::*;
pub use validation::ValidationError;
