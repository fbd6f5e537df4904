pub mod extension;
pub mod freespace;
pub mod goal;
pub mod workspace;

pub use extension::ExtensionStrategy;
pub use freespace::Freespace;
pub use goal::{GoalPredicate, GoalRegion};
pub use workspace::Workspace;
