//! Shared pipeline logic behind the CLI subcommands.
//!
//! Keeping this in one place keeps the workflows testable without a terminal:
//! - training: load tables -> fit encoders -> cross-join -> label -> select -> persist
//! - recommending: load artifact -> score each student against the catalog
//! - matching: load tables -> deterministic ranking per student
//!
//! The CLI layer only formats and prints what these return.

use tracing::{info, warn};

use crate::domain::{
    CompanyProfile, MatchConfig, MatchResult, Recommendation, RecommendConfig, SelectionConfig, StudentProfile,
    StudentSource, TrainConfig,
};
use crate::error::AppError;
use crate::features::{cross_join, label_pairs, FeatureEncoder};
use crate::fit::{select_model, ModelSelection};
use crate::io::{load_companies, load_internships, load_students, read_model, write_model, RowError};
use crate::models::TrainedModel;
use crate::rank::{rank_internships, recommend};

/// Input bookkeeping for one CSV table.
#[derive(Debug, Clone)]
pub struct TableStats {
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

/// All computed outputs of a single training run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub students: TableStats,
    pub companies: TableStats,
    /// Students dropped because they have no department to encode.
    pub students_without_department: usize,
    pub pairs: usize,
    pub positives: usize,
    pub selection: ModelSelection,
    pub model: TrainedModel,
}

/// Train, select and persist a model. Nothing is written unless every step succeeds.
pub fn run_training(config: &TrainConfig) -> Result<TrainingRun, AppError> {
    let students = load_students(&config.students_csv)?;
    let companies = load_companies(&config.companies_csv)?;
    info!(
        students = students.records.len(),
        companies = companies.records.len(),
        "training tables loaded"
    );

    let (labeled, without_department): (Vec<StudentProfile>, Vec<StudentProfile>) = students
        .records
        .into_iter()
        .partition(|s| s.department.is_some());
    if !without_department.is_empty() {
        warn!(
            count = without_department.len(),
            "students without a department are left out of training"
        );
    }

    let trained = train_model(&labeled, &companies.records, &config.selection())?;
    write_model(&config.model_out, &trained.model)?;

    Ok(TrainingRun {
        students: TableStats {
            rows_read: students.rows_read,
            rows_used: labeled.len(),
            row_errors: students.row_errors,
        },
        companies: TableStats {
            rows_read: companies.rows_read,
            rows_used: companies.records.len(),
            row_errors: companies.row_errors,
        },
        students_without_department: without_department.len(),
        pairs: trained.pairs,
        positives: trained.positives,
        selection: trained.selection,
        model: trained.model,
    })
}

/// In-memory result of [`train_model`].
#[derive(Debug, Clone)]
pub struct TrainedOutput {
    pub model: TrainedModel,
    pub selection: ModelSelection,
    pub pairs: usize,
    pub positives: usize,
}

/// Fit encoders, build the labeled cross product and select a classifier.
pub fn train_model(
    students: &[StudentProfile],
    companies: &[CompanyProfile],
    selection_config: &SelectionConfig,
) -> Result<TrainedOutput, AppError> {
    if students.is_empty() || companies.is_empty() {
        return Err(AppError::DegenerateTrainingSet(format!(
            "need students and companies, got {} and {}",
            students.len(),
            companies.len()
        )));
    }

    let department_encoder = FeatureEncoder::fit(
        "department",
        students.iter().filter_map(|s| s.department.as_deref()),
    );
    let company_encoder = FeatureEncoder::fit("company", companies.iter().map(|c| c.company.as_str()));

    let pairs = cross_join(students, companies, &department_encoder)?;
    let set = label_pairs(&pairs);
    info!(pairs = set.len(), positives = set.positives(), "candidate pairs labeled");

    let selection = select_model(&set, selection_config)?;
    let model = TrainedModel::new(
        selection.best.clone(),
        department_encoder,
        company_encoder,
        selection.best_accuracy,
    );

    Ok(TrainedOutput {
        model,
        selection,
        pairs: set.len(),
        positives: set.positives(),
    })
}

/// Recommendations (or a per-student client error) for each student.
#[derive(Debug)]
pub struct StudentRecommendations {
    pub student: StudentProfile,
    pub outcome: Result<Vec<Recommendation>, AppError>,
}

/// Score every requested student against the company catalog.
///
/// Client errors (e.g. a department the model never saw) are kept per student;
/// anything else aborts the run.
pub fn run_recommend(config: &RecommendConfig) -> Result<Vec<StudentRecommendations>, AppError> {
    let model = read_model(&config.model_path)?;
    let companies = load_companies(&config.companies_csv)?.records;
    let students = match &config.students {
        StudentSource::Csv(path) => load_students(path)?.records,
        StudentSource::Inline(student) => vec![student.clone()],
    };
    info!(
        students = students.len(),
        companies = companies.len(),
        model = model.classifier_kind().display_name(),
        "scoring students"
    );

    let mut out = Vec::with_capacity(students.len());
    for student in students {
        let outcome = match recommend(&student, &companies, &model, config.threshold) {
            Err(err) if err.is_client_error() => {
                warn!(student = student.display_name(), "{err}");
                Err(err)
            }
            Err(err) => return Err(err),
            Ok(recs) => Ok(recs),
        };
        out.push(StudentRecommendations { student, outcome });
    }
    Ok(out)
}

/// Deterministic top-K matches for each (selected) student.
pub fn run_matching(config: &MatchConfig) -> Result<Vec<MatchResult>, AppError> {
    let students = load_students(&config.students_csv)?.records;
    let internships = load_internships(&config.internships_csv)?.records;

    let selected: Vec<&StudentProfile> = match config.student_id {
        Some(id) => students.iter().filter(|s| s.id == Some(id)).collect(),
        None => students.iter().collect(),
    };
    if let (Some(id), true) = (config.student_id, selected.is_empty()) {
        return Err(AppError::InvalidInput(format!("no student with id {id}")));
    }

    info!(
        students = selected.len(),
        internships = internships.len(),
        top_k = config.top_k,
        "matching students"
    );
    Ok(selected
        .into_iter()
        .map(|s| rank_internships(s, &internships, config.top_k))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{write_synthetic, SyntheticData};
    use crate::domain::SyntheticConfig;
    use crate::models::Classifier;
    use std::fs;
    use std::path::Path;

    fn synthetic(dir: &Path) -> (SyntheticConfig, SyntheticData) {
        let cfg = SyntheticConfig {
            student_count: 60,
            company_count: 8,
            seed: 7,
            students_out: dir.join("students.csv"),
            companies_out: dir.join("companies.csv"),
        };
        let data = write_synthetic(&cfg).unwrap();
        (cfg, data)
    }

    fn train_config(dir: &Path, synth: &SyntheticConfig) -> TrainConfig {
        TrainConfig {
            students_csv: synth.students_out.clone(),
            companies_csv: synth.companies_out.clone(),
            model_out: dir.join("model.json"),
            seed: 42,
            test_fraction: 0.2,
        }
    }

    #[test]
    fn training_persists_a_loadable_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let (synth, data) = synthetic(dir.path());
        let config = train_config(dir.path(), &synth);

        let run = run_training(&config).unwrap();
        assert_eq!(run.pairs, 60 * 8);
        assert_eq!(run.selection.n_test, 96);
        assert_eq!(run.selection.scores.len(), 3);

        let loaded = read_model(&config.model_out).unwrap();
        assert_eq!(loaded.classifier_kind(), run.selection.best_kind);
        assert_eq!(loaded.company_encoder().len(), data.companies.len());

        let row = [0.0, 9.5, 5.0, 6.0, 0.0];
        let a = run.model.classifier().predict_proba(&row).unwrap();
        let b = loaded.classifier().predict_proba(&row).unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn degenerate_training_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let students = dir.path().join("students.csv");
        let companies = dir.path().join("companies.csv");
        fs::write(&students, "department,cgpa,projects,skills\nCSE,5.0,0,python\nECE,5.5,0,java\n").unwrap();
        fs::write(&companies, "company,min_cgpa,min_projects,skills_required\nAcme,9.0,3,rust\n").unwrap();

        let config = TrainConfig {
            students_csv: students,
            companies_csv: companies,
            model_out: dir.path().join("model.json"),
            seed: 42,
            test_fraction: 0.2,
        };
        let err = run_training(&config).unwrap_err();
        assert!(matches!(err, AppError::DegenerateTrainingSet(_)));
        assert_eq!(err.exit_code(), 3);
        assert!(!config.model_out.exists());
        assert!(!dir.path().join("model.json.tmp").exists());
    }

    #[test]
    fn recommend_keeps_unknown_departments_per_student() {
        let dir = tempfile::tempdir().unwrap();
        let (synth, _) = synthetic(dir.path());
        let config = train_config(dir.path(), &synth);
        run_training(&config).unwrap();

        let newcomers = dir.path().join("new.csv");
        fs::write(
            &newcomers,
            "full_name,department,cgpa,projects,skills\n\
             Known,CSE,9.8,5,python\n\
             Stranger,BIOTECH,9.0,2,python\n",
        )
        .unwrap();

        let out = run_recommend(&RecommendConfig {
            model_path: config.model_out.clone(),
            companies_csv: synth.companies_out.clone(),
            students: StudentSource::Csv(newcomers),
            threshold: 0.5,
            export: None,
        })
        .unwrap();

        assert_eq!(out.len(), 2);
        let known = out[0].outcome.as_ref().unwrap();
        assert!(!known.is_empty());
        assert!(known.windows(2).all(|w| w[0].probability_percent >= w[1].probability_percent));
        assert!(matches!(
            out[1].outcome,
            Err(AppError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn matching_filters_by_student_id() {
        let dir = tempfile::tempdir().unwrap();
        let students = dir.path().join("students.csv");
        let internships = dir.path().join("internships.csv");
        fs::write(
            &students,
            "id,full_name,department,cgpa,projects,skills,location\n\
             1,Asha,CSE,8.5,3,\"python,java\",\n\
             2,Ravi,ECE,6.0,1,sql,Pune\n",
        )
        .unwrap();
        fs::write(
            &internships,
            "id,company_name,suggested_role,location,min_cgpa,field\n\
             10,Acme,python developer,Remote,7.0,CSE\n\
             11,Beta,data analyst,Pune,5.0,ECE\n",
        )
        .unwrap();

        let mut config = MatchConfig {
            students_csv: students,
            internships_csv: internships,
            top_k: 3,
            student_id: Some(1),
            export: None,
        };
        let results = run_matching(&config).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].student_name, "Asha");
        assert!((results[0].top_matches[0].score - 0.7775).abs() < 1e-9);

        config.student_id = Some(99);
        assert!(matches!(run_matching(&config), Err(AppError::InvalidInput(_))));

        config.student_id = None;
        assert_eq!(run_matching(&config).unwrap().len(), 2);
    }
}
