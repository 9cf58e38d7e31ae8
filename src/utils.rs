//! Iteration and validity helpers.

use std::{iter::Chain, vec};

use arrow_array::Array;
use arrow_buffer::BooleanBuffer;

/// Iterator replaying a sequence after [`first_valid_item`] peeked into it.
pub type Replay<T, I> = Chain<vec::IntoIter<Option<T>>, I>;

/// Find the first non-null element of a one-shot sequence.
///
/// Returns the number of elements scanned before it (its index, or the total count when
/// every element is null), a clone of the element, and an iterator that yields the entire
/// original sequence in order: the scanned prefix is buffered and chained back in front of
/// the untouched remainder.
pub fn first_valid_item<T, I>(items: I) -> (usize, Option<T>, Replay<T, I::IntoIter>)
where
    T: Clone,
    I: IntoIterator<Item = Option<T>>,
{
    let mut rest = items.into_iter();
    let mut scanned = Vec::new();
    let mut first = None;
    for item in rest.by_ref() {
        let found = item.clone();
        scanned.push(item);
        if found.is_some() {
            first = found;
            break;
        }
    }
    let consumed = if first.is_some() {
        scanned.len() - 1
    } else {
        scanned.len()
    };
    (consumed, first, scanned.into_iter().chain(rest))
}

/// Random-access variant of [`first_valid_item`]: the slice itself is the replayable sequence.
pub fn first_valid_in_slice<T>(items: &[Option<T>]) -> (usize, Option<&T>) {
    match items.iter().position(Option::is_some) {
        Some(idx) => (idx, items[idx].as_ref()),
        None => (items.len(), None),
    }
}

/// Validity bits of an array, relative to its own offset.
///
/// `None` means the array tracks no null information, which is the case for arrays built
/// without nulls and for `Null` arrays.
pub fn validity_bits(array: &dyn Array) -> Option<BooleanBuffer> {
    array.nulls().map(|nulls| nulls.inner().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_replayed_before_the_remainder() {
        let input = vec![None, None, Some(3), None, Some(5)];
        let (consumed, first, replay) = first_valid_item(input.clone());
        assert_eq!(consumed, 2);
        assert_eq!(first, Some(3));
        assert_eq!(replay.collect::<Vec<_>>(), input);
    }

    #[test]
    fn all_null_sequence_is_fully_buffered() {
        let (consumed, first, replay) = first_valid_item(vec![None::<i32>; 4]);
        assert_eq!(consumed, 4);
        assert_eq!(first, None);
        assert_eq!(replay.count(), 4);
    }

    #[test]
    fn empty_sequence() {
        let (consumed, first, replay) = first_valid_item(Vec::<Option<u8>>::new());
        assert_eq!((consumed, first), (0, None));
        assert_eq!(replay.count(), 0);
    }

    #[test]
    fn slice_variant_points_into_the_original() {
        let input = [None, Some("a"), Some("b")];
        assert_eq!(first_valid_in_slice(&input), (1, Some(&"a")));
        assert_eq!(first_valid_in_slice::<u8>(&[None, None]), (2, None));
    }

    #[test]
    fn validity_bits_follow_the_slice_offset() {
        use arrow_array::{Int32Array, NullArray};

        let array = Int32Array::from(vec![Some(1), None, Some(3), None]);
        let sliced = array.slice(1, 3);
        let bits = validity_bits(&sliced).unwrap();
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![false, true, false]);

        assert!(validity_bits(&Int32Array::from(vec![1, 2])).is_none());
        assert!(validity_bits(&NullArray::new(2)).is_none());
    }
}
