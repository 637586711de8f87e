/// How per-pattern match results combine into a selection
///
/// | any   | exclude | selected when          |
/// |-------|---------|------------------------|
/// | true  | false   | some pattern matches   |
/// | true  | true    | no pattern matches     |
/// | false | false   | every pattern matches  |
/// | false | true    | some pattern misses    |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatchPolicy {
    /// OR across patterns instead of AND
    pub any: bool,

    /// Invert the final selection
    pub exclude: bool,
}

impl MatchPolicy {
    pub fn new(any: bool, exclude: bool) -> Self {
        Self { any, exclude }
    }

    /// Decide selection from lazily evaluated per-pattern results.
    ///
    /// Stops pulling from `outcomes` as soon as the answer is fixed: on the
    /// first match in ANY mode, on the first miss in ALL mode.
    pub fn select<I>(self, outcomes: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut outcomes = outcomes.into_iter();
        let hit = if self.any {
            outcomes.any(|matched| matched)
        } else {
            outcomes.all(|matched| matched)
        };
        hit != self.exclude
    }

    /// Decide selection after every pattern has been evaluated
    pub fn select_exhaustive(self, outcomes: &[bool]) -> bool {
        let matched = outcomes.iter().filter(|m| **m).count();
        let hit = if self.any {
            matched > 0
        } else {
            matched == outcomes.len()
        };
        hit != self.exclude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    const POLICIES: [MatchPolicy; 4] = [
        MatchPolicy { any: true, exclude: false },
        MatchPolicy { any: true, exclude: true },
        MatchPolicy { any: false, exclude: false },
        MatchPolicy { any: false, exclude: true },
    ];

    #[test]
    fn test_two_pattern_table() {
        // (any, exclude, outcomes, selected)
        let table = [
            (true, false, [false, false], false),
            (true, false, [true, false], true),
            (true, false, [false, true], true),
            (true, false, [true, true], true),
            (true, true, [false, false], true),
            (true, true, [true, false], false),
            (true, true, [false, true], false),
            (true, true, [true, true], false),
            (false, false, [false, false], false),
            (false, false, [true, false], false),
            (false, false, [false, true], false),
            (false, false, [true, true], true),
            (false, true, [false, false], true),
            (false, true, [true, false], true),
            (false, true, [false, true], true),
            (false, true, [true, true], false),
        ];

        for (any, exclude, outcomes, expected) in table {
            let policy = MatchPolicy::new(any, exclude);
            assert_eq!(policy.select(outcomes), expected, "{policy:?} {outcomes:?}");
            assert_eq!(policy.select_exhaustive(&outcomes), expected, "{policy:?} {outcomes:?}");
        }
    }

    #[test]
    fn test_lazy_matches_exhaustive_for_all_inputs() {
        for len in 0..=8usize {
            for bits in 0u32..(1 << len) {
                let outcomes: Vec<bool> = (0..len).map(|i| bits & (1 << i) != 0).collect();
                for policy in POLICIES {
                    assert_eq!(
                        policy.select(outcomes.iter().copied()),
                        policy.select_exhaustive(&outcomes),
                        "{policy:?} {outcomes:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_stops_at_deciding_pattern() {
        let outcomes = [false, true, false, true];
        let expected_pulls = [
            // ANY: decided by the first match at position 1
            (MatchPolicy::new(true, false), 2),
            (MatchPolicy::new(true, true), 2),
            // ALL: decided by the first miss at position 0
            (MatchPolicy::new(false, false), 1),
            (MatchPolicy::new(false, true), 1),
        ];

        for (policy, expected) in expected_pulls {
            let pulled = Cell::new(0);
            policy.select(outcomes.iter().map(|m| {
                pulled.set(pulled.get() + 1);
                *m
            }));
            assert_eq!(pulled.get(), expected, "{policy:?}");
        }
    }

    #[test]
    fn test_no_early_exit_without_decider() {
        let pulled = Cell::new(0);
        let selected = MatchPolicy::new(false, false).select([true, true, true].iter().map(|m| {
            pulled.set(pulled.get() + 1);
            *m
        }));
        assert!(selected);
        assert_eq!(pulled.get(), 3);
    }

    proptest! {
        #[test]
        fn prop_lazy_equals_exhaustive(
            outcomes in prop::collection::vec(any::<bool>(), 0..32),
            any_mode in any::<bool>(),
            exclude in any::<bool>(),
        ) {
            let policy = MatchPolicy::new(any_mode, exclude);
            prop_assert_eq!(
                policy.select(outcomes.iter().copied()),
                policy.select_exhaustive(&outcomes)
            );
        }
    }
}
