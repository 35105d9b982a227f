//! Merge sort where every comparison is a question for the user.
//!
//! Each half is ranked before the two are merged, so the merge only has to compare the fronts
//! of two already ordered lists. That keeps the number of questions at O(n log n) instead of
//! asking about every pair.

use tracing::{debug, trace};

use crate::{error::Result, model::Choice};

/// Answers a single head-to-head between two items
pub trait Chooser<T> {
    fn choose(&mut self, left: &T, right: &T) -> Result<Choice>;
}

impl<T, F> Chooser<T> for F
where
    F: FnMut(&T, &T) -> Result<Choice>,
{
    fn choose(&mut self, left: &T, right: &T) -> Result<Choice> {
        self(left, right)
    }
}

/// A single ranking run, owning the chooser and counting the questions asked
pub struct RankingSession<'c, C: ?Sized> {
    chooser: &'c mut C,
    comparisons: usize,
}

impl<'c, C: ?Sized> RankingSession<'c, C> {
    pub fn new(chooser: &'c mut C) -> Self {
        Self {
            chooser,
            comparisons: 0,
        }
    }

    /// How many times the chooser has been asked so far
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// Order `items` by the chooser's preferences, most preferred first
    ///
    /// Lists of zero or one item come back untouched without a single question. Otherwise the
    /// list is split at `len / 2`, the left half is ranked completely before the right half,
    /// and the two are merged.
    pub fn rank<T>(&mut self, items: Vec<T>) -> Result<Vec<T>>
    where
        C: Chooser<T>,
    {
        if items.len() <= 1 {
            return Ok(items);
        }

        let mut left = items;
        let right = left.split_off(left.len() / 2);

        let left = self.rank(left)?;
        let right = self.rank(right)?;

        self.merge(left, right)
    }

    fn merge<T>(&mut self, left: Vec<T>, right: Vec<T>) -> Result<Vec<T>>
    where
        C: Chooser<T>,
    {
        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();

        while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
            let choice = self.chooser.choose(l, r)?;
            self.comparisons += 1;
            trace!(?choice, comparison = self.comparisons, "Head to head decided");

            let picked = match choice {
                Choice::Left => left.next(),
                Choice::Right => right.next(),
            };
            merged.extend(picked);
        }

        // One side ran dry, the rest of the other is already in order
        merged.extend(left);
        merged.extend(right);

        debug!(len = merged.len(), "Merged two ranked halves");

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;

    use super::*;
    use crate::error::Error;

    fn rank<T, C: Chooser<T>>(items: Vec<T>, chooser: &mut C) -> Result<Vec<T>> {
        RankingSession::new(chooser).rank(items)
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Replays canned responses, recording every pair it was shown
    struct Scripted {
        responses: VecDeque<&'static str>,
        asked: Vec<(String, String)>,
    }

    impl Scripted {
        fn new(responses: &[&'static str]) -> Self {
            Self {
                responses: responses.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Chooser<String> for Scripted {
        fn choose(&mut self, left: &String, right: &String) -> Result<Choice> {
            self.asked.push((left.clone(), right.clone()));
            let line = self.responses.pop_front().ok_or(Error::InputClosed)?;
            Ok(Choice::from_response(line))
        }
    }

    fn always(choice: Choice) -> impl FnMut(&String, &String) -> Result<Choice> {
        move |_, _| Ok(choice)
    }

    fn sorted(mut items: Vec<String>) -> Vec<String> {
        items.sort();
        items
    }

    /// Answers by cycling through `script`, true meaning "2"; an empty script always says "1"
    fn replay(script: &[bool]) -> impl FnMut(&String, &String) -> Result<Choice> + '_ {
        let mut answers = script.iter().cycle();
        move |_, _| {
            Ok(match answers.next() {
                Some(&true) => Choice::Right,
                _ => Choice::Left,
            })
        }
    }

    #[test]
    fn empty_input_asks_nothing() {
        let mut chooser = Scripted::new(&[]);
        let mut session = RankingSession::new(&mut chooser);

        let ranked = session.rank(Vec::<String>::new()).unwrap();

        assert!(ranked.is_empty());
        assert_eq!(session.comparisons(), 0);
        assert!(chooser.asked.is_empty());
    }

    #[test]
    fn single_item_is_returned_as_is() {
        let mut chooser = Scripted::new(&[]);

        let ranked = rank(names(&["Nina Simone"]), &mut chooser).unwrap();

        assert_eq!(ranked, names(&["Nina Simone"]));
        assert!(chooser.asked.is_empty());
    }

    #[test]
    fn invalid_response_defaults_to_left() {
        let mut chooser = Scripted::new(&["x"]);

        let ranked = rank(names(&["A", "B"]), &mut chooser).unwrap();

        assert_eq!(ranked, names(&["A", "B"]));
    }

    #[test]
    fn two_picks_the_right_side() {
        let mut chooser = Scripted::new(&["2"]);

        let ranked = rank(names(&["A", "B"]), &mut chooser).unwrap();

        assert_eq!(ranked, names(&["B", "A"]));
    }

    #[test]
    fn always_left_keeps_input_order() {
        let mut chooser = Scripted::new(&["1", "1", "1", "1"]);

        let ranked = rank(names(&["A", "B", "C", "D"]), &mut chooser).unwrap();

        assert_eq!(ranked, names(&["A", "B", "C", "D"]));
        assert_eq!(
            chooser.asked,
            vec![
                ("A".into(), "B".into()),
                ("C".into(), "D".into()),
                ("A".into(), "C".into()),
                ("B".into(), "C".into()),
            ]
        );
    }

    #[test]
    fn always_right_puts_second_half_first() {
        let mut chooser = Scripted::new(&["2", "2", "2", "2"]);

        let ranked = rank(names(&["A", "B", "C", "D"]), &mut chooser).unwrap();

        // Each pair flips to B,A and D,C, then the final merge drains D,C before B,A
        assert_eq!(ranked, names(&["D", "C", "B", "A"]));
        assert_eq!(
            chooser.asked,
            vec![
                ("A".into(), "B".into()),
                ("C".into(), "D".into()),
                ("B".into(), "D".into()),
                ("B".into(), "C".into()),
            ]
        );
    }

    #[test]
    fn final_merge_preferring_right_half() {
        // Halves keep their order, then the final merge always takes the right side
        let mut chooser = Scripted::new(&["1", "1", "2", "2"]);

        let ranked = rank(names(&["A", "B", "C", "D"]), &mut chooser).unwrap();

        assert_eq!(ranked, names(&["C", "D", "A", "B"]));
        assert_eq!(chooser.asked.len(), 4);
    }

    #[test]
    fn odd_length_splits_with_floor() {
        let mut chooser = Scripted::new(&["1", "1"]);

        let ranked = rank(names(&["A", "B", "C"]), &mut chooser).unwrap();

        assert_eq!(ranked, names(&["A", "B", "C"]));
        // Left half is just "A", so the first question comes from ranking "B" and "C"
        assert_eq!(
            chooser.asked,
            vec![("B".into(), "C".into()), ("A".into(), "B".into())]
        );
    }

    #[test]
    fn duplicates_are_kept_as_separate_entries() {
        let input = names(&["Low", "Low", "Can", "Low"]);

        let ranked = rank(input.clone(), &mut always(Choice::Right)).unwrap();

        assert_eq!(sorted(ranked), sorted(input));
    }

    #[test]
    fn same_script_gives_same_ranking() {
        let input = names(&["A", "B", "C", "D", "E", "F", "G"]);
        let script = ["2", "1", "x", "2", "", "2", "1", "1", "2", "1", "2", "1", "2"];

        let first = rank(input.clone(), &mut Scripted::new(&script)).unwrap();
        let second = rank(input, &mut Scripted::new(&script)).unwrap();

        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn output_is_a_permutation_of_the_input(
            input in prop::collection::vec("[a-d]{1,2}", 0..40),
            script in prop::collection::vec(any::<bool>(), 0..64),
        ) {
            let ranked = rank(input.clone(), &mut replay(&script)).unwrap();

            prop_assert_eq!(ranked.len(), input.len());
            prop_assert_eq!(sorted(ranked), sorted(input));
        }

        #[test]
        fn comparisons_stay_within_merge_sort_bounds(
            n in 2usize..=64,
            script in prop::collection::vec(any::<bool>(), 0..64),
        ) {
            let input: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            let mut chooser = replay(&script);
            let mut session = RankingSession::new(&mut chooser);

            session.rank(input).unwrap();

            let log2 = (usize::BITS - (n - 1).leading_zeros()) as usize;
            prop_assert!(session.comparisons() >= n - 1);
            prop_assert!(session.comparisons() <= n * log2);
        }
    }

    #[test]
    fn chooser_sees_real_order_when_it_compares_values() {
        let input: Vec<u32> = vec![5, 3, 9, 1, 7, 2, 8];
        let mut lower_first = |l: &u32, r: &u32| -> Result<Choice> {
            Ok(if r < l { Choice::Right } else { Choice::Left })
        };

        let ranked = rank(input, &mut lower_first).unwrap();

        assert_eq!(ranked, vec![1, 2, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn chooser_failure_stops_the_ranking() {
        let mut chooser = Scripted::new(&["1"]);

        let err = rank(names(&["A", "B", "C"]), &mut chooser).unwrap_err();

        assert!(matches!(err, Error::InputClosed));
        assert_eq!(chooser.asked.len(), 2);
    }
}
