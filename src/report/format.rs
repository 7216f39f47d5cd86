//! Formatted terminal output.
//!
//! Formatting lives in one place so the training and ranking code stays free of
//! presentation concerns.

use crate::app::pipeline::{StudentRecommendations, TableStats, TrainingRun};
use crate::domain::{MatchResult, TrainConfig};

/// Dataset stats, per-candidate hold-out accuracy and the chosen model.
pub fn format_training_summary(run: &TrainingRun, config: &TrainConfig) -> String {
    let mut out = String::new();

    out.push_str("=== intern-match - Qualification Model Training ===\n");
    out.push_str(&format_table_stats("Students", &run.students));
    out.push_str(&format_table_stats("Companies", &run.companies));
    if run.students_without_department > 0 {
        out.push_str(&format!(
            "  ({} students without a department left out)\n",
            run.students_without_department
        ));
    }

    let share = if run.pairs == 0 {
        0.0
    } else {
        100.0 * run.positives as f64 / run.pairs as f64
    };
    out.push_str(&format!(
        "Pairs: n={} | qualified={} ({share:.1}%)\n",
        run.pairs, run.positives
    ));
    out.push_str(&format!(
        "Split: train={} test={} | seed={}\n",
        run.selection.n_train, run.selection.n_test, config.seed
    ));

    out.push_str("\nHold-out accuracy:\n");
    for score in &run.selection.scores {
        let chosen = if score.kind == run.selection.best_kind { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<20} {:.4}\n",
            score.kind.display_name(),
            score.accuracy
        ));
    }

    out.push_str("\nChosen model:\n");
    out.push_str(&format!(
        "- {} (accuracy={:.4})\n",
        run.selection.best_kind.display_name(),
        run.selection.best_accuracy
    ));
    out.push_str(&format!("- saved to: {}\n", config.model_out.display()));
    out.push_str(&format!(
        "- created: {}\n",
        run.model.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out
}

fn format_table_stats(label: &str, stats: &TableStats) -> String {
    let mut out = format!(
        "{label}: rows={} used={} skipped={}\n",
        stats.rows_read,
        stats.rows_used,
        stats.row_errors.len()
    );
    for err in &stats.row_errors {
        let id = err.id.as_deref().map(|id| format!(" ({id})")).unwrap_or_default();
        out.push_str(&format!("  line {}{id}: {}\n", err.line, err.message));
    }
    out
}

/// One block per student: a ranked company table, or the error that stopped it.
pub fn format_recommendations(results: &[StudentRecommendations]) -> String {
    let mut out = String::new();

    for (i, entry) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Recommendations for {}:\n", entry.student.display_name()));
        match &entry.outcome {
            Err(err) => {
                out.push_str(&format!("  error: {err}\n"));
            }
            Ok(recs) => {
                push_row(&mut out, format!("{:>4} {:<28} {:>12}", "rank", "company", "probability"));
                push_row(&mut out, format!("{:-<4} {:-<28} {:-<12}", "", "", ""));
                for (rank, rec) in recs.iter().enumerate() {
                    push_row(
                        &mut out,
                        format!(
                            "{:>4} {:<28} {:>11.2}%",
                            rank + 1,
                            truncate(&rec.company, 28),
                            rec.probability_percent
                        ),
                    );
                }
            }
        }
    }

    out
}

/// Ranked internship matches with their per-factor breakdown.
pub fn format_matches(results: &[MatchResult]) -> String {
    let mut out = String::new();

    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let id = result.student_id.map(|id| format!(" (id {id})")).unwrap_or_default();
        out.push_str(&format!("Matches for {}{id}:\n", result.student_name));

        if result.top_matches.is_empty() {
            out.push_str("  no eligible internships\n");
            continue;
        }

        push_row(
            &mut out,
            format!(
                "{:>4} {:<20} {:<22} {:<12} {:>6} {:>6} {:>6} {:>6} {:>6}",
                "rank", "company", "role", "location", "score", "cgpa", "field", "loc", "role"
            ),
        );
        push_row(
            &mut out,
            format!(
                "{:-<4} {:-<20} {:-<22} {:-<12} {:-<6} {:-<6} {:-<6} {:-<6} {:-<6}",
                "", "", "", "", "", "", "", "", ""
            ),
        );
        for (rank, m) in result.top_matches.iter().enumerate() {
            let b = &m.breakdown;
            push_row(
                &mut out,
                format!(
                    "{:>4} {:<20} {:<22} {:<12} {:>6.3} {:>6.2} {:>6.2} {:>6.2} {:>6.2}",
                    rank + 1,
                    truncate(&m.internship.company_name, 20),
                    truncate(&m.internship.suggested_role, 22),
                    truncate(&m.internship.location, 12),
                    m.score,
                    b.cgpa_fit,
                    b.field_match,
                    b.location_match,
                    b.role_alignment
                ),
            );
        }
    }

    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InternshipPosting, MatchBreakdown, MatchScore, Recommendation, StudentProfile};
    use crate::error::AppError;

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Initech", 10), "Initech");
        assert_eq!(truncate("Cyberdyne Systems", 8), "Cyberdy.");
    }

    #[test]
    fn recommendations_show_rows_and_errors() {
        let asha = StudentProfile {
            full_name: "Asha".to_string(),
            ..StudentProfile::default()
        };
        let ravi = StudentProfile {
            full_name: "Ravi".to_string(),
            ..StudentProfile::default()
        };
        let text = format_recommendations(&[
            StudentRecommendations {
                student: asha,
                outcome: Ok(vec![Recommendation {
                    company: "Acme".to_string(),
                    probability_percent: 88.08,
                }]),
            },
            StudentRecommendations {
                student: ravi,
                outcome: Err(AppError::UnknownCategory {
                    field: "department".to_string(),
                    value: "BIOTECH".to_string(),
                }),
            },
        ]);

        assert!(text.contains("Recommendations for Asha:"));
        assert!(text.contains("   1 Acme"));
        assert!(text.contains("88.08%"));
        assert!(text.contains("Recommendations for Ravi:\n  error: Unknown department category: 'BIOTECH'"));
        assert!(text.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn matches_show_breakdown_or_empty_notice() {
        let job = InternshipPosting {
            company_name: "Acme".to_string(),
            suggested_role: "python developer".to_string(),
            location: "Remote".to_string(),
            ..InternshipPosting::default()
        };
        let results = vec![
            MatchResult {
                student_id: Some(1),
                student_name: "Asha".to_string(),
                best_match: Some(job.clone()),
                top_matches: vec![MatchScore {
                    score: 0.7775,
                    internship: job,
                    breakdown: MatchBreakdown {
                        cgpa_fit: 0.85,
                        field_match: 1.0,
                        location_match: 0.6,
                        role_alignment: 0.8,
                    },
                }],
            },
            MatchResult {
                student_id: None,
                student_name: "Ravi".to_string(),
                best_match: None,
                top_matches: vec![],
            },
        ];

        let text = format_matches(&results);
        assert!(text.contains("Matches for Asha (id 1):"));
        assert!(text.contains("0.777") || text.contains("0.778"));
        assert!(text.contains("Matches for Ravi:\n  no eligible internships"));
    }
}
