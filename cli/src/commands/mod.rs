pub mod kill;
pub mod list;
pub mod targets;
