//! Export recommendations and match results.
//!
//! The format follows the file extension: `.json` writes pretty JSON, anything
//! else writes CSV that is easy to consume in spreadsheets.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{MatchResult, Recommendation};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

#[derive(Serialize)]
struct RecommendationRow<'a> {
    student: &'a str,
    rank: usize,
    company: &'a str,
    probability_percent: f64,
}

#[derive(Serialize)]
struct MatchRow<'a> {
    student_id: Option<u32>,
    student_name: &'a str,
    rank: usize,
    score: f64,
    internship_id: Option<u32>,
    company_name: &'a str,
    suggested_role: &'a str,
    location: &'a str,
    cgpa_fit: f64,
    field_match: f64,
    location_match: f64,
    role_alignment: f64,
}

#[derive(Serialize)]
struct StudentEntry<'a> {
    student: &'a str,
    recommendations: &'a [Recommendation],
}

/// Write recommendations for one or more students, keyed by display name.
pub fn write_recommendations(path: &Path, entries: &[(&str, &[Recommendation])]) -> Result<(), AppError> {
    match ExportFormat::from_path(path) {
        ExportFormat::Json => {
            let entries: Vec<StudentEntry<'_>> = entries
                .iter()
                .map(|&(student, recommendations)| StudentEntry {
                    student,
                    recommendations,
                })
                .collect();
            write_json(path, &entries)
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)?;
            for &(student, recs) in entries {
                for (i, rec) in recs.iter().enumerate() {
                    writer.serialize(RecommendationRow {
                        student,
                        rank: i + 1,
                        company: &rec.company,
                        probability_percent: rec.probability_percent,
                    })?;
                }
            }
            writer.flush().map_err(|e| AppError::io(path, e))
        }
    }
}

/// Write ranked matches for any number of students (one CSV row per match).
pub fn write_matches(path: &Path, results: &[MatchResult]) -> Result<(), AppError> {
    match ExportFormat::from_path(path) {
        ExportFormat::Json => write_json(path, &results),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)?;
            for result in results {
                for (i, m) in result.top_matches.iter().enumerate() {
                    writer.serialize(MatchRow {
                        student_id: result.student_id,
                        student_name: &result.student_name,
                        rank: i + 1,
                        score: m.score,
                        internship_id: m.internship.id,
                        company_name: &m.internship.company_name,
                        suggested_role: &m.internship.suggested_role,
                        location: &m.internship.location,
                        cgpa_fit: m.breakdown.cgpa_fit,
                        field_match: m.breakdown.field_match,
                        location_match: m.breakdown.location_match,
                        role_alignment: m.breakdown.role_alignment,
                    })?;
                }
            }
            writer.flush().map_err(|e| AppError::io(path, e))
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)?;
    out.write_all(b"\n").map_err(|e| AppError::io(path, e))?;
    out.flush().map_err(|e| AppError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InternshipPosting, MatchBreakdown, MatchScore};

    fn result() -> MatchResult {
        let job = InternshipPosting {
            id: Some(4),
            company_name: "Acme".to_string(),
            suggested_role: "python developer".to_string(),
            location: "Remote".to_string(),
            min_cgpa: 7.0,
            field: "CSE".to_string(),
            ..InternshipPosting::default()
        };
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
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("x.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("x.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("x")), ExportFormat::Csv);
    }

    #[test]
    fn matches_csv_has_one_row_per_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.csv");
        write_matches(&path, &[result()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "student_id,student_name,rank,score,internship_id,company_name,suggested_role,location,\
             cgpa_fit,field_match,location_match,role_alignment"
        );
        assert!(lines.next().unwrap().starts_with("1,Asha,1,0.7775,4,Acme,python developer,Remote,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn matches_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.json");
        write_matches(&path, &[result()]).unwrap();

        let back: Vec<MatchResult> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec![result()]);
    }

    #[test]
    fn recommendations_csv_keeps_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recs.csv");
        let none = [Recommendation::none()];
        write_recommendations(&path, &[("Asha", &none)]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "student,rank,company,probability_percent\nAsha,1,None,0.0\n");
    }

    #[test]
    fn recommendations_json_groups_by_student() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recs.json");
        let asha = [Recommendation {
            company: "Acme".to_string(),
            probability_percent: 88.08,
        }];
        let ravi = [Recommendation::none()];
        write_recommendations(&path, &[("Asha", &asha), ("Ravi", &ravi)]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["student"], "Asha");
        assert_eq!(value[0]["recommendations"][0]["company"], "Acme");
        assert_eq!(value[1]["recommendations"][0]["company"], "None");
    }
}
