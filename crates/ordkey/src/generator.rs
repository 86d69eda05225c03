use crate::key::{FIRST_DIGIT_SEGMENT, MalformedSegmentError, parse_digit};
use crate::{BaseOrder, Error, OrderKey, Result};
use core::cmp::Ordering;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Steps past a previous sibling: returns `prefix` with `last_digit + 1`
/// appended.
///
/// `prefix` is the previous key's segments up to (excluding) its trailing
/// digit, joined with a trailing dot, and `last_digit` is that trailing
/// digit.
///
/// # Errors
///
/// Fails with [`Error::InvalidInputOrder`] when `last_digit` is zero;
/// persisted keys always end in a digit `>= 1`.
///
/// # Example
/// ```
/// use ordkey::next_from_previous;
///
/// assert_eq!(next_from_previous(5, "1.dev.")?, "1.dev.6");
/// # Ok::<(), ordkey::Error>(())
/// ```
#[cfg_attr(feature = "tracing", instrument(level = "trace"))]
pub fn next_from_previous(last_digit: u64, prefix: &str) -> Result<String> {
    if last_digit < 1 {
        return Err(Error::InvalidInputOrder);
    }
    Ok(format!("{prefix}{}", last_digit + 1))
}

/// Steps ahead of a next sibling: returns `prefix` with `next_digit - 1`
/// appended, or descends one level when no integer room remains.
///
/// A `next_digit` of `1` has nothing strictly between it and `0` at the
/// current depth, so the result gains a `0` padding level followed by `1`
/// (`prefix + "0.1"`).
///
/// # Errors
///
/// Fails with [`Error::InvalidInputOrder`] when `next_digit` is zero.
///
/// # Example
/// ```
/// use ordkey::prev_from_next;
///
/// assert_eq!(prev_from_next(5, "1.dev.")?, "1.dev.4");
/// assert_eq!(prev_from_next(1, "1.dev.")?, "1.dev.0.1");
/// # Ok::<(), ordkey::Error>(())
/// ```
#[cfg_attr(feature = "tracing", instrument(level = "trace"))]
pub fn prev_from_next(next_digit: u64, prefix: &str) -> Result<String> {
    if next_digit < 1 {
        return Err(Error::InvalidInputOrder);
    }
    if next_digit == 1 {
        Ok(format!("{prefix}0.1"))
    } else {
        Ok(format!("{prefix}{}", next_digit - 1))
    }
}

/// Generates an order key that sorts strictly between two sibling keys.
///
/// An empty `prev_order` means "no left neighbor" (insert at the start of
/// the sibling list); an empty `next_order` means "no right neighbor"
/// (insert at the end). The result sorts strictly between the boundaries
/// under [`crate::compare`].
///
/// When a non-empty boundary key carries no ordering digits (two segments or
/// fewer), the call returns an empty string instead of an error and the
/// caller must treat the insertion as unplaceable. [`OrderKey::between`]
/// rejects such keys up front and never produces this sentinel.
///
/// # Errors
///
/// - [`Error::InvalidBoundaries`] when both boundary keys are empty.
/// - [`Error::InvalidInputOrder`] when a required trailing digit is zero.
/// - [`Error::MalformedSegment`] when a required digit segment is not a
///   non-negative integer, or a deeper next key carries nothing but zero
///   padding below the previous key's depth.
///
/// # Example
/// ```
/// use ordkey::bookmark_order;
///
/// // Integer room between the neighbors: plain increment.
/// assert_eq!(bookmark_order("1.dev.3", "1.dev.7")?, "1.dev.4");
/// // Adjacent digits: descend one level of precision.
/// assert_eq!(bookmark_order("1.dev.3", "1.dev.4")?, "1.dev.3.1");
/// // No right neighbor: step past the last sibling.
/// assert_eq!(bookmark_order("1.dev.5", "")?, "1.dev.6");
/// # Ok::<(), ordkey::Error>(())
/// ```
#[cfg_attr(feature = "tracing", instrument(level = "trace"))]
pub fn bookmark_order(prev_order: &str, next_order: &str) -> Result<String> {
    let prev: Vec<&str> = prev_order.split('.').collect();
    let next: Vec<&str> = next_order.split('.').collect();

    if prev.len() == 1 && next.len() == 1 {
        return Err(Error::InvalidBoundaries);
    }

    if next.len() == 1 {
        return after_last(&prev);
    }
    if prev.len() == 1 {
        return before_first(&next);
    }
    between_both(&prev, &next)
}

// Splits a key into its dotted prefix and trailing digit: "1.dev.5" becomes
// ("1.dev.", 5).
fn split_last(parts: &[&str]) -> Result<(String, u64)> {
    let last_index = parts.len() - 1;
    let last = parse_digit(parts[last_index], last_index)?;
    let mut prefix = parts[..last_index].join(".");
    prefix.push('.');
    Ok((prefix, last))
}

// No right neighbor: step the previous key's trailing digit up.
fn after_last(prev: &[&str]) -> Result<String> {
    if prev.len() <= FIRST_DIGIT_SEGMENT {
        return Ok(String::new());
    }
    let (prefix, last) = split_last(prev)?;
    next_from_previous(last, &prefix)
}

// No left neighbor: step ahead of the next key's trailing digit.
fn before_first(next: &[&str]) -> Result<String> {
    if next.len() <= FIRST_DIGIT_SEGMENT {
        return Ok(String::new());
    }
    let (prefix, last) = split_last(next)?;
    prev_from_next(last, &prefix)
}

fn between_both(prev: &[&str], next: &[&str]) -> Result<String> {
    if prev.len() <= FIRST_DIGIT_SEGMENT || next.len() <= FIRST_DIGIT_SEGMENT {
        return Ok(String::new());
    }
    let (prefix, last_prev) = split_last(prev)?;

    match prev.len().cmp(&next.len()) {
        Ordering::Equal => {
            let last_index = next.len() - 1;
            let last_next = parse_digit(next[last_index], last_index)?;
            if last_next.saturating_sub(last_prev) > 1 {
                // Integer room at this depth.
                Ok(format!("{prefix}{}", last_prev + 1))
            } else {
                // Adjacent digits: descend one level.
                Ok(format!("{prefix}{last_prev}.1"))
            }
        }
        Ordering::Less => descend_into_next(prev, next, prefix, last_prev),
        Ordering::Greater => next_from_previous(last_prev, &prefix),
    }
}

// The next key reaches deeper than the previous one. The result extends the
// previous key, carrying over whatever zero padding the next key holds below
// the previous key's depth.
fn descend_into_next(
    prev: &[&str],
    next: &[&str],
    mut prefix: String,
    last_prev: u64,
) -> Result<String> {
    // Do the leading segments of both keys agree up to (excluding) the
    // previous key's trailing digit? Compared as raw strings.
    let aligned = prev[..prev.len() - 1]
        .iter()
        .zip(&next[..prev.len() - 1])
        .all(|(p, n)| p == n);

    prefix.push_str(prev[prev.len() - 1]);
    prefix.push('.');

    // Carry the next key's zero padding below the previous key's depth into
    // the prefix; the first non-zero digit is the bound to step ahead of.
    let mut current = prev.len();
    while current < next.len() && parse_digit(next[current], current)? == 0 {
        prefix.push_str(next[current]);
        prefix.push('.');
        current += 1;
    }
    if current == next.len() {
        // Nothing but zero padding: the next key ends in 0, which no
        // generated key does.
        return Err(MalformedSegmentError {
            segment: next[next.len() - 1].to_string(),
            index: next.len() - 1,
        }
        .into());
    }
    let last_next = parse_digit(next[current], current)?;

    if aligned {
        let same_position = parse_digit(next[prev.len() - 1], prev.len() - 1)?;
        if same_position > last_prev {
            // The next key already moved past the previous key's digit at
            // its own depth, so the first slot underneath it is free.
            return Ok(format!("{prefix}1"));
        }
    }
    prev_from_next(last_next, &prefix)
}

impl OrderKey {
    /// Generates a key sorting strictly between two validated sibling keys.
    ///
    /// `None` means the corresponding side has no boundary: `(None, Some)`
    /// inserts at the start of the sibling list, `(Some, None)` at the end.
    /// Unlike the raw [`bookmark_order`], validated inputs always carry
    /// ordering digits, so the result is always a complete key.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidBoundaries`] when both sides are `None`.
    ///
    /// # Example
    /// ```
    /// use ordkey::OrderKey;
    ///
    /// let prev = OrderKey::parse("1.dev.3")?;
    /// let next = OrderKey::parse("1.dev.4")?;
    /// let mid = OrderKey::between(Some(&prev), Some(&next))?;
    /// assert_eq!(mid.as_str(), "1.dev.3.1");
    /// assert!(prev < mid && mid < next);
    /// # Ok::<(), ordkey::Error>(())
    /// ```
    pub fn between(prev: Option<&OrderKey>, next: Option<&OrderKey>) -> Result<OrderKey> {
        let prev_order = prev.map_or("", OrderKey::as_str);
        let next_order = next.map_or("", OrderKey::as_str);
        let order = bookmark_order(prev_order, next_order)?;
        OrderKey::parse(&order)
    }
}

/// A per-device allocator for append-at-end keys.
///
/// Tracks the last key it issued and steps its trailing digit on every call,
/// so a device can keep appending bookmarks without consulting its siblings.
/// The first key issued is the base's [`BaseOrder::first_child`].
///
/// **Not thread-safe**: issuing mutates the tracked tail, and the owning
/// sync layer serializes appends per device.
///
/// # Example
/// ```
/// use ordkey::{BaseOrder, BasicOrderGenerator};
///
/// let base = BaseOrder::new("device123", "windows")?;
/// let mut generator = BasicOrderGenerator::new(base);
/// assert_eq!(generator.next_key().as_str(), "1.device123.1");
/// assert_eq!(generator.next_key().as_str(), "1.device123.2");
/// # Ok::<(), ordkey::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct BasicOrderGenerator {
    base: BaseOrder,
    last: Option<OrderKey>,
}

impl BasicOrderGenerator {
    /// Creates a generator that has issued no keys yet.
    pub fn new(base: BaseOrder) -> Self {
        Self { base, last: None }
    }

    /// Restores a generator from the last key a previous run issued, e.g.
    /// after reloading the device's persisted tail.
    pub fn from_last(base: BaseOrder, last: OrderKey) -> Self {
        Self {
            base,
            last: Some(last),
        }
    }

    /// Returns the most recently issued key, if any. This is the value to
    /// persist across runs and feed back through [`Self::from_last`].
    pub fn last_key(&self) -> Option<&OrderKey> {
        self.last.as_ref()
    }

    /// Issues the next append-at-end key for this device.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_key(&mut self) -> OrderKey {
        let next = match &self.last {
            None => self.base.first_child(),
            Some(last) => last.step_last_digit(),
        };
        self.last = Some(next.clone());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare;
    use core::cmp::Ordering;

    fn order(prev: &str, next: &str) -> String {
        bookmark_order(prev, next).unwrap_or_else(|e| panic!("({prev:?}, {next:?}): {e}"))
    }

    // Asserts prev < generated < next under the sibling sort, for whichever
    // boundaries are present.
    fn assert_between(prev: &str, next: &str, generated: &str) {
        if !prev.is_empty() {
            assert_eq!(
                compare(prev, generated),
                Ordering::Less,
                "{prev} should sort before {generated}"
            );
        }
        if !next.is_empty() {
            assert_eq!(
                compare(generated, next),
                Ordering::Less,
                "{generated} should sort before {next}"
            );
        }
    }

    #[test]
    fn steps_past_previous() {
        assert_eq!(next_from_previous(5, "1.dev.").expect("valid"), "1.dev.6");
    }

    #[test]
    fn steps_ahead_of_next() {
        assert_eq!(prev_from_next(5, "1.dev.").expect("valid"), "1.dev.4");
        assert_eq!(prev_from_next(2, "1.dev.").expect("valid"), "1.dev.1");
    }

    #[test]
    fn descends_when_next_digit_is_one() {
        assert_eq!(prev_from_next(1, "1.dev.").expect("valid"), "1.dev.0.1");
    }

    #[test]
    fn zero_digits_are_invalid_input() {
        assert_eq!(
            next_from_previous(0, "1.dev."),
            Err(Error::InvalidInputOrder)
        );
        assert_eq!(prev_from_next(0, "1.dev."), Err(Error::InvalidInputOrder));
    }

    #[test]
    fn both_boundaries_empty_is_an_error() {
        assert_eq!(bookmark_order("", ""), Err(Error::InvalidBoundaries));
    }

    #[test]
    fn appends_after_the_last_sibling() {
        assert_eq!(order("1.dev.5", ""), "1.dev.6");
        assert_eq!(order("2.device123.3.2", ""), "2.device123.3.3");
    }

    #[test]
    fn inserts_before_the_first_sibling() {
        assert_eq!(order("", "1.dev.5"), "1.dev.4");
        assert_eq!(order("", "1.dev.1"), "1.dev.0.1");
    }

    #[test]
    fn increments_into_integer_room() {
        assert_eq!(order("1.dev.3", "1.dev.7"), "1.dev.4");
        assert_eq!(order("1.dev.3", "1.dev.5"), "1.dev.4");
    }

    #[test]
    fn descends_between_adjacent_digits() {
        assert_eq!(order("1.dev.3", "1.dev.4"), "1.dev.3.1");
    }

    #[test]
    fn slots_above_a_deeper_next() {
        assert_eq!(order("1.dev.3", "1.dev.3.2"), "1.dev.3.1");
    }

    #[test]
    fn carries_zero_padding_from_a_deeper_next() {
        assert_eq!(order("1.dev.3", "1.dev.3.0.0.2"), "1.dev.3.0.0.1");
    }

    #[test]
    fn descends_under_previous_when_next_moved_past_it() {
        assert_eq!(order("1.dev.3", "1.dev.4.0.1"), "1.dev.3.0.1");
    }

    #[test]
    fn steps_past_a_deeper_previous() {
        assert_eq!(order("1.dev.3.2", "1.dev.4"), "1.dev.3.3");
    }

    #[test]
    fn boundary_without_digits_yields_empty_order() {
        // Keys with two or fewer segments carry no ordering digits; the
        // legacy surface reports them as an empty order, not an error.
        assert_eq!(order("1.dev", ""), "");
        assert_eq!(order("", "1.dev"), "");
        assert_eq!(order("1.dev", "1.dev.3"), "");
        assert_eq!(order("1.dev.3", "1.dev"), "");
    }

    #[test]
    fn rejects_non_numeric_digits() {
        assert!(matches!(
            bookmark_order("1.dev.x", ""),
            Err(Error::MalformedSegment(_))
        ));
        assert!(matches!(
            bookmark_order("", "1.dev.3x"),
            Err(Error::MalformedSegment(_))
        ));
    }

    #[test]
    fn rejects_deeper_next_with_only_zero_padding() {
        assert!(matches!(
            bookmark_order("1.dev.3", "1.dev.3.0"),
            Err(Error::MalformedSegment(_))
        ));
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(order("1.dev.3", "1.dev.4"), order("1.dev.3", "1.dev.4"));
    }

    #[test]
    fn generated_keys_sort_between_their_boundaries() {
        let cases = [
            ("1.dev.5", ""),
            ("", "1.dev.5"),
            ("", "1.dev.1"),
            ("1.dev.3", "1.dev.7"),
            ("1.dev.3", "1.dev.4"),
            ("1.dev.3", "1.dev.3.2"),
            ("1.dev.3", "1.dev.3.0.0.2"),
            ("1.dev.3", "1.dev.4.0.1"),
            ("1.dev.3.2", "1.dev.4"),
            ("2.device123.1.1", "2.device123.1.2"),
        ];
        for (prev, next) in cases {
            assert_between(prev, next, &order(prev, next));
        }
    }

    #[test]
    fn repeated_front_insertion_stays_ordered() {
        // Keep inserting at the very front; every new key must sort before
        // the previous front-runner.
        let mut next = "1.dev.2".to_string();
        for _ in 0..64 {
            let generated = order("", &next);
            assert_between("", &next, &generated);
            next = generated;
        }
    }

    #[test]
    fn repeated_gap_insertion_stays_ordered() {
        // Keep splitting the same gap from the left; the chain must descend
        // without ever touching the right boundary.
        let prev = "1.dev.1".to_string();
        let mut next = "1.dev.2".to_string();
        for _ in 0..64 {
            let generated = order(&prev, &next);
            assert_between(&prev, &next, &generated);
            next = generated;
        }
    }

    #[test]
    fn typed_between_matches_raw_surface() {
        let prev = OrderKey::parse("1.dev.3").expect("valid key");
        let next = OrderKey::parse("1.dev.4").expect("valid key");
        let mid = OrderKey::between(Some(&prev), Some(&next)).expect("between");
        assert_eq!(mid.as_str(), "1.dev.3.1");
        assert!(prev < mid && mid < next);

        let after = OrderKey::between(Some(&next), None).expect("after");
        assert_eq!(after.as_str(), "1.dev.5");
        let before = OrderKey::between(None, Some(&prev)).expect("before");
        assert_eq!(before.as_str(), "1.dev.2");
    }

    #[test]
    fn typed_between_requires_a_boundary() {
        assert_eq!(
            OrderKey::between(None, None),
            Err(Error::InvalidBoundaries)
        );
    }

    #[test]
    fn basic_generator_counts_up_from_first_child() {
        let base = BaseOrder::new("device123", "ios").expect("valid device id");
        let mut generator = BasicOrderGenerator::new(base);
        assert!(generator.last_key().is_none());
        assert_eq!(generator.next_key().as_str(), "2.device123.1");
        assert_eq!(generator.next_key().as_str(), "2.device123.2");
        assert_eq!(generator.next_key().as_str(), "2.device123.3");
        assert_eq!(
            generator.last_key().map(OrderKey::as_str),
            Some("2.device123.3")
        );
    }

    #[test]
    fn basic_generator_resumes_from_persisted_tail() {
        let base = BaseOrder::new("device123", "ios").expect("valid device id");
        let last = OrderKey::parse("2.device123.41").expect("valid key");
        let mut generator = BasicOrderGenerator::from_last(base, last);
        assert_eq!(generator.next_key().as_str(), "2.device123.42");
    }
}
