//! Shared domain types.
//!
//! These types are kept plain and serializable so they can be:
//!
//! - loaded from CSV tables
//! - scored in-memory (deterministic matcher and classifier ranker)
//! - exported to CSV/JSON for downstream consumers

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Number of columns in a candidate-pair feature vector.
pub const FEATURE_COUNT: usize = 5;

/// `[encoded_department, cgpa, projects, min_cgpa, min_projects]`.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Upper bound on the number of matches returned by `rank_internships`.
pub const MAX_TOP_K: usize = 20;

/// Company name used for the "nothing cleared the threshold" recommendation.
pub const NO_RECOMMENDATION: &str = "None";

/// A learner profile.
///
/// `department` doubles as the student's field of study: the deterministic
/// matcher compares it with an internship's `field`, the classifier path
/// encodes it as a categorical feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: Option<u32>,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    /// CGPA on a 0–10 scale (inclusive).
    pub cgpa: f64,
    pub projects: u32,
    /// Raw comma-separated skills, as entered.
    pub skills: String,
    pub location: Option<String>,
}

impl StudentProfile {
    /// Skills as a clean list: trimmed, empty entries dropped, case-insensitive
    /// duplicates removed (first spelling wins).
    pub fn skill_list(&self) -> Vec<String> {
        normalize_skills(self.skills.split(','))
    }

    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            "(unnamed student)"
        } else {
            self.full_name.trim()
        }
    }
}

fn normalize_skills<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::<String>::new();
    let mut out = Vec::new();
    for raw in items {
        let skill = raw.as_ref().trim();
        if skill.is_empty() {
            continue;
        }
        let key = skill.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(skill.to_string());
    }
    out
}

/// A company row used for classifier training and recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company: String,
    pub min_cgpa: f64,
    pub min_projects: u32,
    /// Raw comma-separated required skills.
    pub skills_required: String,
}

/// An internship posting scored by the deterministic matcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternshipPosting {
    pub id: Option<u32>,
    pub company_name: String,
    /// Free-text role; tokenized on whitespace for skill alignment.
    pub suggested_role: String,
    pub location: String,
    pub min_cgpa: f64,
    pub field: String,
    pub min_projects: u32,
    pub required_skills: String,
    pub program: String,
}

/// Classifier output for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub company: String,
    /// Positive-class probability in percent, rounded to 2 decimals.
    pub probability_percent: f64,
}

impl Recommendation {
    /// The sentinel returned when no company clears the threshold.
    pub fn none() -> Self {
        Self {
            company: NO_RECOMMENDATION.to_string(),
            probability_percent: 0.0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.company == NO_RECOMMENDATION && self.probability_percent == 0.0
    }
}

/// Per-factor sub-scores behind a deterministic match score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub cgpa_fit: f64,
    /// Reported for explanation only; not part of the weighted score.
    pub field_match: f64,
    pub location_match: f64,
    pub role_alignment: f64,
}

/// A scored internship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub score: f64,
    pub internship: InternshipPosting,
    pub breakdown: MatchBreakdown,
}

/// Ranked internships for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub student_id: Option<u32>,
    pub student_name: String,
    pub best_match: Option<InternshipPosting>,
    pub top_matches: Vec<MatchScore>,
}

/// Classifier families tried by the model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    LogisticRegression,
    RandomForest,
    GradientBoosting,
}

impl ClassifierKind {
    /// Training order; on equal hold-out accuracy the earlier entry wins.
    pub const CANDIDATES: [ClassifierKind; 3] = [
        ClassifierKind::LogisticRegression,
        ClassifierKind::RandomForest,
        ClassifierKind::GradientBoosting,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ClassifierKind::LogisticRegression => "Logistic Regression",
            ClassifierKind::RandomForest => "Random Forest",
            ClassifierKind::GradientBoosting => "Gradient Boosting",
        }
    }
}

/// Hold-out split settings for model selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionConfig {
    pub seed: u64,
    /// Share of rows held out for evaluation, in (0, 1).
    pub test_fraction: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
        }
    }
}

/// Training run configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub students_csv: PathBuf,
    pub companies_csv: PathBuf,
    pub model_out: PathBuf,
    pub seed: u64,
    /// Share of candidate pairs held out for evaluation.
    pub test_fraction: f64,
}

impl TrainConfig {
    pub fn selection(&self) -> SelectionConfig {
        SelectionConfig {
            seed: self.seed,
            test_fraction: self.test_fraction,
        }
    }
}

/// Synthetic dataset generation settings.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub student_count: usize,
    pub company_count: usize,
    pub seed: u64,
    pub students_out: PathBuf,
    pub companies_out: PathBuf,
}

/// Where the students to score come from.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentSource {
    Csv(PathBuf),
    /// A single profile given on the command line.
    Inline(StudentProfile),
}

/// Recommendation run configuration.
#[derive(Debug, Clone)]
pub struct RecommendConfig {
    pub model_path: PathBuf,
    pub companies_csv: PathBuf,
    pub students: StudentSource,
    /// Minimum positive-class probability, in [0, 1].
    pub threshold: f64,
    pub export: Option<PathBuf>,
}

/// Deterministic matching run configuration.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub students_csv: PathBuf,
    pub internships_csv: PathBuf,
    /// Requested number of matches; clamped into `1..=MAX_TOP_K` when ranking.
    pub top_k: usize,
    /// Only rank this student when set.
    pub student_id: Option<u32>,
    pub export: Option<PathBuf>,
}
