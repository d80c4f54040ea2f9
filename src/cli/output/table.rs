//! Table output formatting for solve traces using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{Trace, TraceRecord};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per trace step: label, outcome, detail
    pub fn format_trace(&self, trace: &Trace) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Outcome").add_attribute(Attribute::Bold),
            Cell::new("Detail").add_attribute(Attribute::Bold),
        ]);

        for (label, record) in trace.iter() {
            let (outcome, color, detail) = describe(record);
            let outcome_cell = if self.use_colors {
                Cell::new(outcome).fg(color)
            } else {
                Cell::new(outcome)
            };
            table.add_row(vec![
                Cell::new(label),
                outcome_cell,
                Cell::new(truncate(&detail, 60)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(record: &TraceRecord) -> (String, Color, String) {
    match record {
        TraceRecord::Swift {
            candidate,
            generated,
            votes,
            ..
        } => match candidate.solution {
            Some(ref solution) => (
                format!("solution ({votes}/{generated} votes)"),
                Color::Cyan,
                solution.clone(),
            ),
            None => (
                "no solution".to_string(),
                Color::Yellow,
                candidate.code_report.clone(),
            ),
        },
        TraceRecord::Feedback {
            score, feedback, ..
        } => (
            format!("score {score}"),
            if *score > 0 { Color::Green } else { Color::Red },
            feedback.clone(),
        ),
        TraceRecord::Sage {
            solved, solution, ..
        } => (
            if *solved { "solved" } else { "revised" }.to_string(),
            Color::Magenta,
            solution.clone(),
        ),
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Candidate, SandboxResult};
    use chrono::Utc;

    #[test]
    fn test_format_trace_rows() {
        let mut trace = Trace::new();
        trace.insert(
            "Swift 1",
            TraceRecord::Swift {
                candidate: Candidate::from_execution(
                    None,
                    "print(42)".to_string(),
                    SandboxResult::done("42"),
                ),
                generated: 3,
                with_solution: 2,
                votes: 2,
                recorded_at: Utc::now(),
            },
        );
        trace.insert("Feedback 1", TraceRecord::feedback(9, "looks right"));

        let formatter = TableFormatter::with_config(false, Some(120));
        let rendered = formatter.format_trace(&trace);

        assert!(rendered.contains("Swift 1"));
        assert!(rendered.contains("solution (2/3 votes)"));
        assert!(rendered.contains("score 9"));
        assert!(rendered.contains("looks right"));
    }
}
