//! Fail-fast stack cursor
//!
//! A cursor walks a stack from the top down without holding a borrow between
//! steps, so the stack can be mutated underneath it. It is stamped with the
//! stack's version and refuses to advance once the stack has changed.

use crate::error::{OpvmError, OpvmResult};

use super::operand_stack::OperandStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    NotStarted,
    InProgress,
    Ended,
    Disposed,
}

impl CursorState {
    fn describe(self) -> &'static str {
        match self {
            CursorState::NotStarted => "not started",
            CursorState::InProgress => "in progress",
            CursorState::Ended => "ended",
            CursorState::Disposed => "disposed",
        }
    }
}

/// Outcome of a successful advance
#[derive(Debug, PartialEq, Eq)]
pub enum Advance<'a, T> {
    Item(&'a T),
    Ended,
}

#[derive(Debug, Clone)]
pub struct StackCursor {
    stack_id: u64,
    version: u64,
    state: CursorState,
    index: usize,
}

impl StackCursor {
    pub(crate) fn new<T>(stack: &OperandStack<T>) -> Self {
        StackCursor {
            stack_id: stack.id(),
            version: stack.version(),
            state: CursorState::NotStarted,
            index: 0,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Move to the next operand down the stack.
    pub fn advance<'a, T>(&mut self, stack: &'a OperandStack<T>) -> OpvmResult<Advance<'a, T>> {
        self.check_stack(stack)?;
        self.check_version(stack)?;

        match self.state {
            CursorState::NotStarted => {
                if stack.is_empty() {
                    self.state = CursorState::Ended;
                    return Ok(Advance::Ended);
                }
                self.index = stack.len() - 1;
                self.state = CursorState::InProgress;
            }
            CursorState::InProgress => {
                if self.index == 0 {
                    self.state = CursorState::Ended;
                    return Ok(Advance::Ended);
                }
                self.index -= 1;
            }
            CursorState::Ended | CursorState::Disposed => return Ok(Advance::Ended),
        }

        stack
            .slot(self.index)
            .map(Advance::Item)
            .ok_or(OpvmError::InvalidatedIteration)
    }

    /// The operand the cursor is positioned on.
    pub fn current<'a, T>(&self, stack: &'a OperandStack<T>) -> OpvmResult<&'a T> {
        self.check_stack(stack)?;
        if self.state != CursorState::InProgress {
            return Err(OpvmError::InvalidIteratorState(self.state.describe()));
        }
        // The element is not cached, so a mutated stack cannot serve it.
        self.check_version(stack)?;
        stack.slot(self.index).ok_or(OpvmError::InvalidatedIteration)
    }

    /// Rewind to before the current top and take a fresh version stamp.
    pub fn reset<T>(&mut self, stack: &OperandStack<T>) -> OpvmResult<()> {
        self.check_stack(stack)?;
        if self.state == CursorState::Disposed {
            return Err(OpvmError::InvalidIteratorState(self.state.describe()));
        }
        self.version = stack.version();
        self.state = CursorState::NotStarted;
        self.index = 0;
        Ok(())
    }

    pub fn dispose(&mut self) {
        self.state = CursorState::Disposed;
    }

    fn check_stack<T>(&self, stack: &OperandStack<T>) -> OpvmResult<()> {
        if stack.id() != self.stack_id {
            return Err(OpvmError::invalid_argument(
                "cursor used with a stack other than the one that created it",
            ));
        }
        Ok(())
    }

    fn check_version<T>(&self, stack: &OperandStack<T>) -> OpvmResult<()> {
        if stack.version() != self.version {
            return Err(OpvmError::InvalidatedIteration);
        }
        Ok(())
    }
}
