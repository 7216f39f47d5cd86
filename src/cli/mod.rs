//! Command-line parsing for the internship matcher.
//!
//! Argument parsing and command dispatch stay separate from the modeling code;
//! `app` turns these structs into plain config values.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "intern-match",
    version,
    about = "Student ↔ internship matching: qualification classifier and deterministic ranker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write seeded synthetic student and company tables.
    Generate(GenerateArgs),
    /// Train the qualification classifier and save the model artifact.
    Train(TrainArgs),
    /// Recommend companies for new students using a saved model.
    Recommend(RecommendArgs),
    /// Rank internship postings for students with the deterministic scorer.
    Match(MatchArgs),
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Number of synthetic students.
    #[arg(long, default_value_t = 200)]
    pub students: usize,

    /// Number of synthetic companies.
    #[arg(long, default_value_t = 20)]
    pub companies: usize,

    /// Random seed.
    #[arg(long, env = "INTERN_MATCH_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Output CSV for students.
    #[arg(long, value_name = "CSV", default_value = "students.csv")]
    pub students_out: PathBuf,

    /// Output CSV for companies.
    #[arg(long, value_name = "CSV", default_value = "companies.csv")]
    pub companies_out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Student table (department, cgpa, projects, skills).
    #[arg(long, value_name = "CSV")]
    pub students: PathBuf,

    /// Company table (company, min_cgpa, min_projects, skills_required).
    #[arg(long, value_name = "CSV")]
    pub companies: PathBuf,

    /// Where to write the model artifact.
    #[arg(long = "model", value_name = "JSON", env = "INTERN_MATCH_MODEL", default_value = "model.json")]
    pub model_out: PathBuf,

    /// Seed for the hold-out split and the ensembles.
    #[arg(long, env = "INTERN_MATCH_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Share of candidate pairs held out for model selection.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,
}

#[derive(Debug, Args, Clone)]
pub struct RecommendArgs {
    /// Model artifact written by `train`.
    #[arg(long, value_name = "JSON", env = "INTERN_MATCH_MODEL", default_value = "model.json")]
    pub model: PathBuf,

    /// Company catalog to score against.
    #[arg(long, value_name = "CSV")]
    pub companies: PathBuf,

    /// Students to score. Without it, a single student is read from the inline flags.
    #[arg(long, value_name = "CSV", conflicts_with_all = ["department", "cgpa", "projects", "skills"])]
    pub students: Option<PathBuf>,

    /// Inline student: department.
    #[arg(long)]
    pub department: Option<String>,

    /// Inline student: CGPA (0-10).
    #[arg(long)]
    pub cgpa: Option<f64>,

    /// Inline student: number of projects.
    #[arg(long)]
    pub projects: Option<u32>,

    /// Inline student: comma-separated skills.
    #[arg(long)]
    pub skills: Option<String>,

    /// Minimum qualification probability (0-1).
    #[arg(long, env = "INTERN_MATCH_THRESHOLD", default_value_t = 0.5)]
    pub threshold: f64,

    /// Export recommendations (CSV, or JSON by extension).
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct MatchArgs {
    /// Student table.
    #[arg(long, value_name = "CSV")]
    pub students: PathBuf,

    /// Internship postings.
    #[arg(long, value_name = "CSV")]
    pub internships: PathBuf,

    /// Matches per student (clamped into 1..=20).
    #[arg(long, default_value_t = 3)]
    pub top_k: usize,

    /// Only rank the student with this id.
    #[arg(long)]
    pub student_id: Option<u32>,

    /// Export matches (CSV, or JSON by extension).
    #[arg(long)]
    pub export: Option<PathBuf>,
}
