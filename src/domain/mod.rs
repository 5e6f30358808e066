pub mod board;
pub mod page;
pub mod task;

pub use board::{Board, BoardId, Column, ColumnId, TaskPosition};
pub use page::Page;
pub use task::TaskId;
