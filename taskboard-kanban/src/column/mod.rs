//! Column commands

mod add;
mod rename;

pub use add::AddColumn;
pub use rename::RenameColumn;
