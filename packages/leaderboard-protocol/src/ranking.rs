//! Ranking Order
//!
//! Rosters are ranked by score, highest first. Equal scores are ordered by
//! name ascending so that a ranked view never depends on the order in which
//! updates arrived.

use std::cmp::Ordering;

use crate::messages::TraderScore;

/// Compare two traders in rank order.
#[must_use]
pub fn compare_ranked(a: &TraderScore, b: &TraderScore) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name))
}

/// Sort a roster in place into rank order.
pub fn rank(traders: &mut [TraderScore]) {
    traders.sort_by(compare_ranked);
}

/// Collect traders into a new ranked roster.
#[must_use]
pub fn ranked(traders: impl IntoIterator<Item = TraderScore>) -> Vec<TraderScore> {
    let mut roster: Vec<TraderScore> = traders.into_iter().collect();
    rank(&mut roster);
    roster
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn names(roster: &[TraderScore]) -> Vec<&str> {
        roster.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn highest_score_first() {
        let roster = ranked([
            TraderScore::new("A", dec!(-1)),
            TraderScore::new("B", dec!(7.25)),
            TraderScore::new("C", dec!(0)),
        ]);
        assert_eq!(names(&roster), ["B", "C", "A"]);
    }

    #[test]
    fn ties_break_by_name() {
        let roster = ranked([
            TraderScore::new("zed", dec!(1.5)),
            TraderScore::new("amy", dec!(1.5)),
            TraderScore::new("kim", dec!(1.50)),
        ]);
        assert_eq!(names(&roster), ["amy", "kim", "zed"]);
    }

    fn roster_strategy() -> impl Strategy<Value = Vec<TraderScore>> {
        prop::collection::vec(("[a-e]{1,3}", -100_000i64..100_000), 0..24).prop_map(|rows| {
            rows.into_iter()
                .map(|(name, cents)| TraderScore::new(name, Decimal::new(cents, 2)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn ranked_is_non_increasing(roster in roster_strategy()) {
            let roster = ranked(roster);
            for pair in roster.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    prop_assert!(pair[0].name <= pair[1].name);
                }
            }
        }

        #[test]
        fn ranking_ignores_input_order(roster in roster_strategy()) {
            let mut reversed = roster.clone();
            reversed.reverse();
            prop_assert_eq!(ranked(roster), ranked(reversed));
        }
    }
}
