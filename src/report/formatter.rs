use crate::analyzer::AnalysisResult;
use crate::issue::{Issue, Severity};
use crate::performance::format_seconds;
use std::fmt;

/// Formats analysis results into human-readable text reports.
pub struct ReportFormatter;

/// A report that renders straight into any formatter, e.g. `print!("{}", report)`.
pub struct Report<'a>(&'a AnalysisResult);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ReportFormatter::write_report(f, self.0)
    }
}

impl ReportFormatter {
    /// Render the whole result: header, score, issues by severity, performance
    /// and recommendations.
    pub fn format(result: &AnalysisResult) -> String {
        Self::display(result).to_string()
    }

    pub fn display(result: &AnalysisResult) -> Report<'_> {
        Report(result)
    }

    fn write_report(out: &mut fmt::Formatter<'_>, result: &AnalysisResult) -> fmt::Result {
        writeln!(out, "Workflow: {} ({})", result.workflow_name, result.workflow_id)?;
        writeln!(
            out,
            "Health score: {}/100 ({}), confidence {}",
            result.health_score, result.grade, result.confidence
        )?;
        writeln!(
            out,
            "Analyzed {} of {} nodes, severity multiplier x{:.2}",
            result.metadata.analyzed_node_count,
            result.metadata.total_node_count,
            result.metadata.severity_multiplier
        )?;

        writeln!(out)?;
        if result.issues.is_empty() {
            writeln!(out, "No issues found.")?;
        } else {
            writeln!(out, "Issues ({}):", result.issues.len())?;
            for severity in Severity::ALL {
                let group: Vec<&Issue> = result
                    .issues
                    .iter()
                    .filter(|i| i.severity == severity)
                    .collect();
                if group.is_empty() {
                    continue;
                }
                writeln!(out, "  [{}]", severity)?;
                for issue in group {
                    Self::write_issue(out, issue)?;
                }
            }
        }

        let perf = &result.performance;
        writeln!(out)?;
        writeln!(out, "Performance:")?;
        writeln!(
            out,
            "  {} steps, ~{} end to end, complexity {}",
            perf.estimated_steps,
            format_seconds(perf.estimated_time_seconds),
            perf.complexity
        )?;
        for bottleneck in &perf.bottlenecks {
            writeln!(out, "  bottleneck: {}", bottleneck)?;
        }

        if !result.recommendations.is_empty() {
            writeln!(out)?;
            writeln!(out, "Recommendations:")?;
            for (i, line) in result.recommendations.iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, line)?;
            }
        }
        Ok(())
    }

    fn write_issue(out: &mut fmt::Formatter<'_>, issue: &Issue) -> fmt::Result {
        if issue.node_ids.is_empty() {
            writeln!(out, "    - {} (-{})", issue.title, Self::format_penalty(issue.penalty))?;
        } else {
            writeln!(
                out,
                "    - {} [{}] (-{})",
                issue.title,
                issue.node_ids.join(", "),
                Self::format_penalty(issue.penalty)
            )?;
        }
        writeln!(out, "      {}", issue.description)?;
        if !issue.fix.is_empty() {
            writeln!(out, "      fix: {}", issue.fix)?;
        }
        Ok(())
    }

    fn format_penalty(penalty: f64) -> String {
        if penalty.fract() == 0.0 {
            format!("{}", penalty as i64)
        } else {
            format!("{:.1}", penalty)
        }
    }
}
