//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments into config structs
//! - runs the pipelines and prints reports
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, GenerateArgs, MatchArgs, RecommendArgs, TrainArgs};
use crate::domain::{
    MatchConfig, Recommendation, RecommendConfig, StudentProfile, StudentSource, SyntheticConfig, TrainConfig,
};
use crate::error::AppError;

pub mod pipeline;

const DEFAULT_LOG_FILTER: &str = "intern_match=info";

/// Entry point for the `intern-match` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Generate(args) => handle_generate(&args),
        Command::Train(args) => handle_train(&args),
        Command::Recommend(args) => handle_recommend(&args),
        Command::Match(args) => handle_match(&args),
    }
}

/// Logs go to stderr so reports on stdout stay pipeable. `RUST_LOG` overrides the default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_generate(args: &GenerateArgs) -> Result<(), AppError> {
    let config = synthetic_config_from_args(args);
    let data = crate::data::write_synthetic(&config)?;
    println!(
        "Wrote {} students to {} and {} companies to {}",
        data.students.len(),
        config.students_out.display(),
        data.companies.len(),
        config.companies_out.display()
    );
    Ok(())
}

fn handle_train(args: &TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(args);
    let run = pipeline::run_training(&config)?;
    println!("{}", crate::report::format_training_summary(&run, &config));
    Ok(())
}

fn handle_recommend(args: &RecommendArgs) -> Result<(), AppError> {
    let config = recommend_config_from_args(args)?;
    let results = pipeline::run_recommend(&config)?;
    println!("{}", crate::report::format_recommendations(&results));

    if let Some(path) = &config.export {
        let entries: Vec<(&str, &[Recommendation])> = results
            .iter()
            .filter_map(|r| {
                r.outcome
                    .as_ref()
                    .ok()
                    .map(|recs| (r.student.display_name(), recs.as_slice()))
            })
            .collect();
        crate::io::write_recommendations(path, &entries)?;
    }
    Ok(())
}

fn handle_match(args: &MatchArgs) -> Result<(), AppError> {
    let config = match_config_from_args(args);
    let results = pipeline::run_matching(&config)?;
    println!("{}", crate::report::format_matches(&results));

    if let Some(path) = &config.export {
        crate::io::write_matches(path, &results)?;
    }
    Ok(())
}

pub fn synthetic_config_from_args(args: &GenerateArgs) -> SyntheticConfig {
    SyntheticConfig {
        student_count: args.students,
        company_count: args.companies,
        seed: args.seed,
        students_out: args.students_out.clone(),
        companies_out: args.companies_out.clone(),
    }
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        students_csv: args.students.clone(),
        companies_csv: args.companies.clone(),
        model_out: args.model_out.clone(),
        seed: args.seed,
        test_fraction: args.test_fraction,
    }
}

/// Builds the recommend config; the inline student needs every field.
pub fn recommend_config_from_args(args: &RecommendArgs) -> Result<RecommendConfig, AppError> {
    let students = match &args.students {
        Some(path) => StudentSource::Csv(path.clone()),
        None => StudentSource::Inline(inline_student(args)?),
    };
    Ok(RecommendConfig {
        model_path: args.model.clone(),
        companies_csv: args.companies.clone(),
        students,
        threshold: args.threshold,
        export: args.export.clone(),
    })
}

fn inline_student(args: &RecommendArgs) -> Result<StudentProfile, AppError> {
    let missing: Vec<&str> = [
        ("--department", args.department.is_none()),
        ("--cgpa", args.cgpa.is_none()),
        ("--projects", args.projects.is_none()),
        ("--skills", args.skills.is_none()),
    ]
    .into_iter()
    .filter_map(|(flag, absent)| absent.then_some(flag))
    .collect();
    if !missing.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "pass --students or all inline fields (missing {})",
            missing.join(", ")
        )));
    }

    let cgpa = args.cgpa.unwrap_or_default();
    if !(0.0..=10.0).contains(&cgpa) {
        return Err(AppError::InvalidInput(format!("CGPA {cgpa} is outside 0-10")));
    }

    Ok(StudentProfile {
        full_name: "Inline student".to_string(),
        department: args.department.as_ref().map(|d| d.trim().to_string()),
        cgpa,
        projects: args.projects.unwrap_or_default(),
        skills: args.skills.clone().unwrap_or_default(),
        ..StudentProfile::default()
    })
}

pub fn match_config_from_args(args: &MatchArgs) -> MatchConfig {
    MatchConfig {
        students_csv: args.students.clone(),
        internships_csv: args.internships.clone(),
        top_k: args.top_k,
        student_id: args.student_id,
        export: args.export.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn recommend_args() -> RecommendArgs {
        RecommendArgs {
            model: PathBuf::from("model.json"),
            companies: PathBuf::from("companies.csv"),
            students: None,
            department: Some(" CSE ".to_string()),
            cgpa: Some(8.2),
            projects: Some(2),
            skills: Some("python,sql".to_string()),
            threshold: 0.5,
            export: None,
        }
    }

    #[test]
    fn inline_student_is_built_from_flags() {
        let config = recommend_config_from_args(&recommend_args()).unwrap();
        let StudentSource::Inline(student) = config.students else {
            panic!("expected an inline student");
        };
        assert_eq!(student.department.as_deref(), Some("CSE"));
        assert_eq!(student.cgpa, 8.2);
        assert_eq!(student.projects, 2);
        assert_eq!(student.skills, "python,sql");
    }

    #[test]
    fn inline_student_needs_every_field() {
        let mut args = recommend_args();
        args.cgpa = None;
        args.skills = None;
        let err = recommend_config_from_args(&args).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("--cgpa"));
        assert!(message.contains("--skills"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn inline_cgpa_is_range_checked() {
        let mut args = recommend_args();
        args.cgpa = Some(11.0);
        assert!(matches!(
            recommend_config_from_args(&args),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn csv_source_wins_when_given() {
        let mut args = recommend_args();
        args.students = Some(PathBuf::from("new.csv"));
        let config = recommend_config_from_args(&args).unwrap();
        assert_eq!(config.students, StudentSource::Csv(PathBuf::from("new.csv")));
    }
}
