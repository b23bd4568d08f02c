//! Small helpers shared by the CLI and the migration phases.

pub mod path;
pub mod plural;
