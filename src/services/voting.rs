//! Best-of-N reduction over candidate solutions.

use regex::Regex;
use std::sync::LazyLock;

static ANSWER_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bis\b[:\s]*(.*)$").expect("answer clause pattern is valid"));

/// The winning solution of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    /// Position of the first candidate carrying the winning solution
    pub index: usize,

    /// Winning solution, trimmed
    pub value: String,

    /// Candidates that agreed on it
    pub count: usize,
}

/// Majority vote over per-candidate solutions.
///
/// Absent solutions do not vote. Solutions are compared after trimming.
/// The highest count wins; between equal counts the solution that first
/// appeared earliest in `solutions` wins. Returns `None` when no candidate
/// has a solution.
pub fn majority_vote(solutions: &[Option<String>]) -> Option<Vote> {
    // (value, first index, count) in first-occurrence order
    let mut tally: Vec<(&str, usize, usize)> = Vec::new();
    for (index, solution) in solutions.iter().enumerate() {
        let Some(solution) = solution else { continue };
        let value = solution.trim();
        match tally.iter_mut().find(|(v, _, _)| *v == value) {
            Some(entry) => entry.2 += 1,
            None => tally.push((value, index, 1)),
        }
    }

    let mut best: Option<(&str, usize, usize)> = None;
    for entry in tally {
        // strict comparison keeps the earlier entry on ties
        if best.is_none_or(|b| entry.2 > b.2) {
            best = Some(entry);
        }
    }

    best.map(|(value, index, count)| Vote {
        index,
        value: value.to_string(),
        count,
    })
}

/// Reduce `"... is: <value>"` program output to `<value>`.
///
/// Looks at the last line of the output; the first standalone `is`
/// (any case) followed by optional colons or whitespace starts the value.
/// A trailing period is dropped. Output without such a clause, or with an
/// empty value, is returned trimmed but otherwise unchanged.
pub fn normalize_answer(raw: &str) -> String {
    let trimmed = raw.trim();
    let last_line = trimmed.rsplit('\n').next().unwrap_or(trimmed);

    let Some(captures) = ANSWER_CLAUSE.captures(last_line) else {
        return trimmed.to_string();
    };

    let value = captures[1].trim();
    let value = value.strip_suffix('.').unwrap_or(value).trim_end();
    if value.is_empty() {
        trimmed.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some((*v).to_string())).collect()
    }

    #[test]
    fn test_majority_wins() {
        let vote = majority_vote(&some(&["1", "2", "2"])).unwrap();
        assert_eq!(vote.value, "2");
        assert_eq!(vote.index, 1);
        assert_eq!(vote.count, 2);
    }

    #[test]
    fn test_tie_goes_to_earliest_first_occurrence() {
        let vote = majority_vote(&some(&["b", "a", "a", "b"])).unwrap();
        assert_eq!(vote.value, "b");
        assert_eq!(vote.index, 0);

        let vote = majority_vote(&some(&["x", "y", "z"])).unwrap();
        assert_eq!(vote.value, "x");
    }

    #[test]
    fn test_absent_solutions_do_not_vote() {
        let solutions = vec![None, Some("7".to_string()), None];
        let vote = majority_vote(&solutions).unwrap();
        assert_eq!(vote.index, 1);
        assert_eq!(vote.count, 1);
        assert!(majority_vote(&[None, None]).is_none());
        assert!(majority_vote(&[]).is_none());
    }

    #[test]
    fn test_comparison_after_trimming() {
        let vote = majority_vote(&some(&["3", " 4", "4\n"])).unwrap();
        assert_eq!(vote.value, "4");
        assert_eq!(vote.count, 2);
        assert_eq!(vote.index, 1);
    }

    #[test]
    fn test_normalize_answer_clause() {
        assert_eq!(normalize_answer("The answer is: 42"), "42");
        assert_eq!(normalize_answer("The answer IS 3.5."), "3.5");
        assert_eq!(normalize_answer("step 1\nstep 2\nresult is 7\n"), "7");
    }

    #[test]
    fn test_normalize_without_clause() {
        assert_eq!(normalize_answer("42\n"), "42");
        assert_eq!(normalize_answer("this island"), "this island");
        assert_eq!(normalize_answer("the answer is"), "the answer is");
    }

    #[test]
    fn test_normalize_only_last_line() {
        assert_eq!(normalize_answer("x is 1\n2"), "x is 1\n2");
    }
}
