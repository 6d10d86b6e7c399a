//! Task commands

mod add;
mod mv;

pub use add::AddTask;
pub use mv::MoveTask;
