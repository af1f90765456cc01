use opvm_core::stack::{Advance, CursorState, OperandStack};
use opvm_core::OpvmError;

// Count tracks pushes minus pops and peek always shows the latest live push,
// across several growth steps.
#[test]
fn count_and_top_follow_pushes_and_pops() {
    let mut stack = OperandStack::new();
    let mut model: Vec<u32> = Vec::new();
    for step in 0u32..40 {
        if step % 3 == 2 {
            assert_eq!(stack.pop().expect("pop failed"), model.pop().expect("model empty"));
        } else {
            stack.push(step);
            model.push(step);
        }
        assert_eq!(stack.len(), model.len());
        assert_eq!(stack.try_peek(), model.last());
    }
    assert_eq!(stack.reverse_snapshot(), model);
}

#[test]
fn growth_never_reorders() {
    let mut stack = OperandStack::new();
    let mut capacities = Vec::new();
    for i in 0..17 {
        let before = stack.capacity();
        stack.push(i);
        if stack.capacity() != before {
            capacities.push(stack.capacity());
        }
        assert!(stack.capacity() >= stack.len());
    }
    assert_eq!(capacities, vec![4, 8, 16, 32]);
    assert_eq!(stack.reverse_snapshot(), (0..17).collect::<Vec<_>>());
}

#[test]
fn copy_into_is_bottom_to_top() {
    let stack: OperandStack<i32> = [1, 2, 3].into_iter().collect();
    let mut dest = [0; 3];
    stack.copy_into(&mut dest, 0).expect("copy failed");
    assert_eq!(dest, [1, 2, 3]);
    assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);

    let mut wide = [9; 6];
    stack.copy_into(&mut wide, 2).expect("copy failed");
    assert_eq!(wide, [9, 9, 1, 2, 3, 9]);
}

#[test]
fn copy_into_rejects_bad_ranges() {
    let stack: OperandStack<i32> = [1, 2, 3].into_iter().collect();
    let mut dest = [0; 4];
    assert!(matches!(
        stack.copy_into(&mut dest, 5),
        Err(OpvmError::InvalidArgument { .. })
    ));
    assert!(matches!(
        stack.copy_into(&mut dest, 2),
        Err(OpvmError::InvalidArgument { .. })
    ));
    assert_eq!(dest, [0; 4]);
    stack.copy_into(&mut dest, 1).expect("copy failed");
    assert_eq!(dest, [0, 1, 2, 3]);
}

#[test]
fn contains_treats_none_as_its_own_value() {
    let mut stack: OperandStack<Option<&str>> = OperandStack::new();
    stack.push(Some("a"));
    assert!(!stack.contains(&None));
    stack.push(None);
    assert!(stack.contains(&None));
    assert!(stack.contains(&Some("a")));
    assert!(!stack.contains(&Some("b")));
}

#[test]
fn read_only_operations_keep_version() {
    let stack: OperandStack<i32> = [4, 5].into_iter().collect();
    let version = stack.version();
    let _ = stack.peek();
    let _ = stack.contains(&4);
    let _ = stack.reverse_snapshot();
    let _ = stack.iter().count();
    assert_eq!(stack.version(), version);
}

#[test]
fn clear_releases_and_bumps_version() {
    let mut stack: OperandStack<String> = ["x", "y"].into_iter().map(String::from).collect();
    let version = stack.version();
    stack.clear();
    assert!(stack.is_empty());
    assert!(stack.version() > version);
    assert!(matches!(stack.peek(), Err(OpvmError::EmptyCollection)));
}

// A mutation after the cursor is created invalidates the next advance;
// reset restamps and the walk restarts from the new top.
#[test]
fn mutation_invalidates_cursor_until_reset() {
    let mut stack: OperandStack<i32> = [1, 2].into_iter().collect();
    let mut cursor = stack.cursor();
    assert_eq!(cursor.advance(&stack).expect("advance failed"), Advance::Item(&2));

    stack.push(3);
    assert!(matches!(cursor.advance(&stack), Err(OpvmError::InvalidatedIteration)));

    cursor.reset(&stack).expect("reset failed");
    assert_eq!(cursor.state(), CursorState::NotStarted);
    let mut seen = Vec::new();
    while let Advance::Item(v) = cursor.advance(&stack).expect("advance failed") {
        seen.push(*v);
    }
    assert_eq!(seen, vec![3, 2, 1]);
}

#[test]
fn compact_invalidates_cursor_only_when_reallocating() {
    let mut stack: OperandStack<i32> = OperandStack::with_capacity(10);
    for i in 0..9 {
        stack.push(i);
    }
    let mut cursor = stack.cursor();
    stack.compact();
    assert_eq!(stack.capacity(), 10);
    assert!(cursor.advance(&stack).is_ok());

    stack.pop().expect("pop failed");
    cursor.reset(&stack).expect("reset failed");
    stack.compact();
    assert_eq!(stack.capacity(), 8);
    assert!(matches!(cursor.advance(&stack), Err(OpvmError::InvalidatedIteration)));
}

#[test]
fn from_exact_puts_last_item_on_top() {
    let stack = OperandStack::from_exact(vec!['a', 'b', 'c']);
    assert_eq!(stack.capacity(), 3);
    assert_eq!(*stack.peek().expect("peek failed"), 'c');
}
