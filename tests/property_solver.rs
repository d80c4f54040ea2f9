//! Property-based tests for stagnation tracking and majority voting.

use proptest::prelude::*;
use std::sync::Arc;

use swiftsage::adapters::substrates::ScriptedProvider;
use swiftsage::services::{majority_vote, FeedbackAgent, PromptTemplates};

fn evaluator(limit: u32) -> FeedbackAgent {
    FeedbackAgent::new(
        Arc::new(ScriptedProvider::new(Vec::<String>::new())),
        Arc::new(PromptTemplates::builtin()),
        limit,
    )
}

/// Length of the trailing run of non-improving scores, with 0 as the baseline.
fn stagnant_suffix(scores: &[i64]) -> u32 {
    let mut count = 0;
    for (i, score) in scores.iter().enumerate().rev() {
        let previous = if i == 0 { 0 } else { scores[i - 1] };
        if *score > previous {
            break;
        }
        count += 1;
    }
    count
}

proptest! {
    /// Property: the stagnation counter equals the trailing run of
    /// non-improving scores
    #[test]
    fn prop_stagnation_counts_trailing_run(scores in prop::collection::vec(-3i64..10, 0..30)) {
        let mut agent = evaluator(2);
        for score in &scores {
            agent.record_score(*score);
        }

        prop_assert_eq!(agent.stagnant_count(), stagnant_suffix(&scores));
        prop_assert_eq!(agent.scores(), scores.as_slice());
    }

    /// Property: a strictly improving score always resets the counter
    #[test]
    fn prop_improvement_resets(scores in prop::collection::vec(0i64..10, 1..20)) {
        let mut agent = evaluator(2);
        for score in &scores {
            agent.record_score(*score);
        }
        let best = scores.last().copied().unwrap_or(0);
        agent.record_score(best + 1);
        prop_assert_eq!(agent.stagnant_count(), 0);
        prop_assert!(!agent.should_consult_sage());
    }

    /// Property: the winner has the highest count and, among ties, the
    /// earliest first occurrence
    #[test]
    fn prop_vote_winner_is_earliest_max(
        values in prop::collection::vec(prop::option::of(0u8..4), 0..20)
    ) {
        let solutions: Vec<Option<String>> =
            values.iter().map(|v| v.map(|n| n.to_string())).collect();

        let vote = majority_vote(&solutions);

        if solutions.iter().all(Option::is_none) {
            prop_assert!(vote.is_none());
        } else {
            let vote = vote.expect("some solution exists");
            let count_of = |value: &str| {
                solutions.iter().filter(|s| s.as_deref() == Some(value)).count()
            };
            let first_index = |value: &str| {
                solutions.iter().position(|s| s.as_deref() == Some(value)).unwrap()
            };

            prop_assert_eq!(vote.count, count_of(&vote.value));
            prop_assert_eq!(vote.index, first_index(&vote.value));

            for other in solutions.iter().flatten() {
                let count = count_of(other);
                prop_assert!(count <= vote.count);
                if count == vote.count {
                    prop_assert!(first_index(other) >= vote.index);
                }
            }
        }
    }
}
