#![forbid(unsafe_code)]

//! List mutation helpers for callers applying a [`GridChange`].
//!
//! Neither helper touches its inputs: they return new sequences so the
//! caller can swap them into its own state in one step.
//!
//! [`GridChange`]: crate::registry::GridChange

use std::borrow::Cow;
use std::fmt;

/// An index passed to a list helper was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMutationError {
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for ListMutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for list of length {len}")
            }
        }
    }
}

impl std::error::Error for ListMutationError {}

fn check(index: usize, len: usize) -> Result<(), ListMutationError> {
    if index < len {
        Ok(())
    } else {
        Err(ListMutationError::IndexOutOfRange { index, len })
    }
}

/// Relocate the element at `from` to `to`.
///
/// Elements between the two positions shift one slot toward the vacated
/// position; this is not a pairwise exchange. `from == to` returns the input
/// borrowed.
///
/// ```
/// use regrid_layout::list::swap;
///
/// let moved = swap(&[0, 1, 2, 3, 4], 1, 3).unwrap();
/// assert_eq!(&*moved, &[0, 2, 3, 1, 4]);
/// ```
pub fn swap<T: Clone>(
    list: &[T],
    from: usize,
    to: usize,
) -> Result<Cow<'_, [T]>, ListMutationError> {
    check(from, list.len())?;
    check(to, list.len())?;
    if from == to {
        return Ok(Cow::Borrowed(list));
    }
    let mut out = list.to_vec();
    let item = out.remove(from);
    out.insert(to, item);
    Ok(Cow::Owned(out))
}

/// Move `source[source_index]` into `destination` at `dest_index`.
///
/// `dest_index` may equal `destination.len()` to append. Returns the new
/// source and destination.
pub fn move_between<T: Clone>(
    source: &[T],
    destination: &[T],
    source_index: usize,
    dest_index: usize,
) -> Result<(Vec<T>, Vec<T>), ListMutationError> {
    check(source_index, source.len())?;
    if dest_index > destination.len() {
        return Err(ListMutationError::IndexOutOfRange {
            index: dest_index,
            len: destination.len(),
        });
    }
    let mut new_source = source.to_vec();
    let item = new_source.remove(source_index);
    let mut new_destination = Vec::with_capacity(destination.len() + 1);
    new_destination.extend_from_slice(&destination[..dest_index]);
    new_destination.push(item);
    new_destination.extend_from_slice(&destination[dest_index..]);
    Ok((new_source, new_destination))
}
