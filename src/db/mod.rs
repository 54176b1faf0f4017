pub mod initialize;
pub mod log;
pub mod migrate;
pub mod queries;
pub mod ray_slot_reader;
pub mod session;
pub mod stash_writer;
pub mod timer_reader;

pub use ray_slot_reader::RaySlotReader;
pub use session::{Access, Session};
pub use stash_writer::StashWriter;
pub use timer_reader::TimerReader;
