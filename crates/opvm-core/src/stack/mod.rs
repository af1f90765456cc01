pub mod cursor;
pub mod operand_stack;

pub use cursor::{Advance, CursorState, StackCursor};
pub use operand_stack::{Iter, OperandStack, SyncRoot};
