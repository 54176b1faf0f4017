pub mod direction;
pub mod entry;
pub mod slot;
pub mod tag;
pub mod task;

pub use direction::Direction;
pub use entry::Entry;
pub use slot::Slot;
pub use tag::Tag;
pub use task::Task;
