//! Operand Stack Implementation
//!
//! Array-backed LIFO used as the interpreter's evaluation stack.
//! No execution semantics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::trace;

use crate::config::OpvmConfig;
use crate::error::{OpvmError, OpvmResult};

use super::cursor::StackCursor;

/// Capacity of the first allocation made by a push
const MIN_GROWTH: usize = 4;

static NEXT_STACK_ID: AtomicU64 = AtomicU64::new(1);

/// External lock target for callers that need to serialize access themselves.
/// The stack never takes it internally.
pub type SyncRoot = Arc<Mutex<()>>;

/// Growable LIFO with a mutation counter
///
/// Slot 0 holds the bottom of the stack. Slots at or above `len()` are
/// always empty so popped operands are released immediately.
pub struct OperandStack<T> {
    slots: Box<[Option<T>]>,
    count: usize,
    version: u64,
    id: u64,
    sync_root: OnceCell<SyncRoot>,
}

impl<T> OperandStack<T> {
    /// Create an empty stack with no storage
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty stack with room for `capacity` operands
    pub fn with_capacity(capacity: usize) -> Self {
        OperandStack {
            slots: empty_slots(capacity),
            count: 0,
            version: 0,
            id: NEXT_STACK_ID.fetch_add(1, Ordering::Relaxed),
            sync_root: OnceCell::new(),
        }
    }

    pub fn from_config(config: &OpvmConfig) -> Self {
        Self::with_capacity(config.initial_stack_capacity)
    }

    /// Build from a known-length source; the last item ends up on top.
    pub fn from_exact<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator<Item = T>,
    {
        let items = items.into_iter();
        let mut stack = Self::with_capacity(items.len());
        for item in items {
            stack.push(item);
        }
        stack
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Mutation counter; bumps on every push, pop, clear and reallocating compact.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Push operand onto stack
    pub fn push(&mut self, item: T) {
        if self.count == self.slots.len() {
            let new_capacity = MIN_GROWTH.max(self.slots.len() * 2);
            self.reallocate(new_capacity);
        }
        self.slots[self.count] = Some(item);
        self.count += 1;
        self.bump();
    }

    /// Pop operand from stack
    pub fn pop(&mut self) -> OpvmResult<T> {
        self.try_pop().ok_or(OpvmError::EmptyCollection)
    }

    pub fn try_pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        let item = self.slots[self.count].take();
        self.bump();
        item
    }

    /// Peek at top of stack without removing
    pub fn peek(&self) -> OpvmResult<&T> {
        self.try_peek().ok_or(OpvmError::EmptyCollection)
    }

    pub fn try_peek(&self) -> Option<&T> {
        self.count.checked_sub(1).and_then(|top| self.slot(top))
    }

    /// Linear scan from top to bottom. Use `OperandStack<Option<T>>` when
    /// slots may hold null operands; a `None` probe then matches only `None`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|stored| stored == item)
    }

    /// Clear stack, releasing every held operand
    pub fn clear(&mut self) {
        for slot in &mut self.slots[..self.count] {
            *slot = None;
        }
        self.count = 0;
        self.bump();
    }

    /// Copy every operand into `destination[offset..]`, bottom-most first.
    pub fn copy_into(&self, destination: &mut [T], offset: usize) -> OpvmResult<()>
    where
        T: Clone,
    {
        if offset > destination.len() {
            return Err(OpvmError::invalid_argument(format!(
                "offset {} exceeds destination length {}",
                offset,
                destination.len()
            )));
        }
        if destination.len() - offset < self.count {
            return Err(OpvmError::invalid_argument(format!(
                "destination has room for {} operands after offset {}, stack holds {}",
                destination.len() - offset,
                offset,
                self.count
            )));
        }
        let range = &mut destination[offset..offset + self.count];
        for (dst, item) in range.iter_mut().zip(self.iter()) {
            *dst = item.clone();
        }
        // Iteration order is top-down; the copied range is bottom-up.
        range.reverse();
        Ok(())
    }

    /// Shrink storage to `len()` when less than 90% of capacity is in use.
    pub fn compact(&mut self) {
        // Integer form of `count < 0.9 * capacity`, without truncation.
        if (self.count as u128) * 10 < (self.slots.len() as u128) * 9 {
            self.reallocate(self.count);
            self.bump();
        }
    }

    /// All operands, bottom-most first. The stack is left untouched.
    pub fn reverse_snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.slots[..self.count].iter().flatten().cloned().collect()
    }

    /// Borrowing iterator from the top of the stack down
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots[..self.count].iter().rev(),
        }
    }

    /// Detached, version-stamped cursor positioned before the top operand
    pub fn cursor(&self) -> StackCursor {
        StackCursor::new(self)
    }

    /// Lazily created lock handle for external synchronization.
    pub fn sync_root(&self) -> &SyncRoot {
        self.sync_root.get_or_init(|| Arc::new(Mutex::new(())))
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }
        self.slots[index].as_ref()
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn reallocate(&mut self, capacity: usize) {
        trace!(from = self.slots.len(), to = capacity, len = self.count, "operand stack reallocating");
        let mut slots = empty_slots(capacity);
        for (dst, src) in slots.iter_mut().zip(self.slots[..self.count].iter_mut()) {
            *dst = src.take();
        }
        self.slots = slots;
    }
}

fn empty_slots<T>(capacity: usize) -> Box<[Option<T>]> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

impl<T> Default for OperandStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OperandStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperandStack")
            .field("top_down", &self.iter().collect::<Vec<_>>())
            .field("capacity", &self.slots.len())
            .field("version", &self.version)
            .finish()
    }
}

impl<T> FromIterator<T> for OperandStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut stack = Self::new();
        for item in iter {
            stack.push(item);
        }
        stack
    }
}

/// Top-down iterator over a borrowed stack
pub struct Iter<'a, T> {
    inner: std::iter::Rev<std::slice::Iter<'a, Option<T>>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(Option::as_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> IntoIterator for &'a OperandStack<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
