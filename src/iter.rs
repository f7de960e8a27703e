//! Iterator adaptors.

use std::iter::FusedIterator;

/// Pairs each item with the one before it.
///
/// The first pair is `(None, Some(first))` and the last is `(Some(last), None)`,
/// so an input of `n` items yields `n + 1` pairs. An empty input yields a single
/// `(None, None)`.
///
/// ```
/// use npg::iter::with_previous;
///
/// let pairs: Vec<_> = with_previous([1, 2, 3]).collect();
/// assert_eq!(
///     pairs,
///     vec![(None, Some(1)), (Some(1), Some(2)), (Some(2), Some(3)), (Some(3), None)]
/// );
/// ```
pub fn with_previous<I>(iterable: I) -> WithPrevious<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Clone,
{
    WithPrevious {
        iter: iterable.into_iter(),
        previous: None,
        done: false,
    }
}

/// Iterator returned by [`with_previous`].
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct WithPrevious<I: Iterator> {
    iter: I,
    previous: Option<I::Item>,
    done: bool,
}

impl<I> Iterator for WithPrevious<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = (Option<I::Item>, Option<I::Item>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.iter.next() {
            Some(current) => {
                let previous = self.previous.replace(current.clone());
                Some((previous, Some(current)))
            }
            None => {
                self.done = true;
                Some((self.previous.take(), None))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let (lower, upper) = self.iter.size_hint();
        (
            lower.saturating_add(1),
            upper.and_then(|u| u.checked_add(1)),
        )
    }
}

impl<I> FusedIterator for WithPrevious<I>
where
    I: Iterator,
    I::Item: Clone,
{
}

/// Adds [`with_previous`] as a method on every iterator.
pub trait WithPreviousExt: Iterator + Sized
where
    Self::Item: Clone,
{
    fn with_previous(self) -> WithPrevious<Self> {
        with_previous(self)
    }
}

impl<I> WithPreviousExt for I
where
    I: Iterator,
    I::Item: Clone,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_pairs_of_previous_and_current_items() {
        let result: Vec<_> = with_previous(vec![1, 2, 3]).collect();
        let expected = vec![
            (None, Some(1)),
            (Some(1), Some(2)),
            (Some(2), Some(3)),
            (Some(3), None),
        ];
        assert_eq!(result, expected);
    }

    #[test]
    fn test_handles_empty_iterable() {
        let result: Vec<(Option<i32>, Option<i32>)> = with_previous(Vec::new()).collect();
        assert_eq!(result, vec![(None, None)]);
    }

    #[test]
    fn test_handles_single_element_iterable() {
        let result: Vec<_> = with_previous([1]).collect();
        assert_eq!(result, vec![(None, Some(1)), (Some(1), None)]);
    }

    #[test]
    fn test_handles_iterable_of_options() {
        let result: Vec<_> = with_previous([None, Some(1), None]).collect();
        let expected = vec![
            (None, Some(None)),
            (Some(None), Some(Some(1))),
            (Some(Some(1)), Some(None)),
            (Some(None), None),
        ];
        assert_eq!(result, expected);
    }

    #[test]
    fn test_is_fused() {
        let mut it = with_previous(["a"]);
        assert_eq!(it.next(), Some((None, Some("a"))));
        assert_eq!(it.next(), Some((Some("a"), None)));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_size_hint() {
        let it = with_previous(vec![1, 2, 3]);
        assert_eq!(it.size_hint(), (4, Some(4)));

        let mut it = with_previous(Vec::<i32>::new());
        assert_eq!(it.size_hint(), (1, Some(1)));
        it.next();
        assert_eq!(it.size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_size_hint_saturates_at_usize_max() {
        let it = with_previous(0..usize::MAX);
        assert_eq!(it.size_hint(), (usize::MAX, None));
    }

    #[test]
    fn test_extension_method() {
        let days = ["mon", "tue"];
        let transitions: Vec<_> = days
            .iter()
            .copied()
            .with_previous()
            .filter_map(|pair| match pair {
                (Some(prev), Some(curr)) => Some(format!("{prev}->{curr}")),
                _ => None,
            })
            .collect();
        assert_eq!(transitions, vec!["mon->tue".to_string()]);
    }
}
