//! Seeded synthetic student and company tables for training.

use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::Serialize;
use tracing::info;

use crate::domain::{CompanyProfile, StudentProfile, SyntheticConfig};
use crate::error::AppError;

pub const DEPARTMENTS: [&str; 6] = ["CSE", "ECE", "EEE", "MECH", "CIVIL", "IT"];

pub const SKILL_VOCABULARY: [&str; 8] = [
    "python",
    "java",
    "sql",
    "c++",
    "machine learning",
    "web development",
    "data analysis",
    "cloud",
];

const LOCATIONS: [&str; 5] = ["Bengaluru", "Pune", "Hyderabad", "Chennai", "Remote"];

const COMPANY_STEMS: [&str; 10] = [
    "Acme", "Globex", "Initech", "Umbrella", "Hooli", "Vandelay", "Stark", "Wonka", "Cyberdyne", "Tyrell",
];

const CGPA_MEAN: f64 = 7.2;
const CGPA_SD: f64 = 1.1;
const MAX_STUDENT_PROJECTS: u32 = 5;
const MAX_COMPANY_PROJECTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct SyntheticData {
    pub students: Vec<StudentProfile>,
    pub companies: Vec<CompanyProfile>,
}

pub fn generate(config: &SyntheticConfig) -> Result<SyntheticData, AppError> {
    if config.student_count == 0 || config.company_count == 0 {
        return Err(AppError::InvalidInput(
            "Student and company counts must be > 0.".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let cgpa_dist = Normal::new(CGPA_MEAN, CGPA_SD)
        .map_err(|e| AppError::InvalidInput(format!("CGPA distribution error: {e}")))?;

    let students = (0..config.student_count)
        .map(|i| {
            let n = i + 1;
            let cgpa = round2(cgpa_dist.sample(&mut rng).clamp(0.0, 10.0));
            StudentProfile {
                id: u32::try_from(n).ok(),
                full_name: format!("Student {n:03}"),
                email: format!("student{n:03}@example.edu"),
                department: Some(pick(&mut rng, &DEPARTMENTS).to_string()),
                cgpa,
                projects: rng.gen_range(0..=MAX_STUDENT_PROJECTS),
                skills: pick_skills(&mut rng, 1, 4),
                location: Some(pick(&mut rng, &LOCATIONS).to_string()),
            }
        })
        .collect();

    let companies = (0..config.company_count)
        .map(|i| CompanyProfile {
            company: company_name(i),
            min_cgpa: (rng.gen_range(6.0..=8.5_f64) * 10.0).round() / 10.0,
            min_projects: rng.gen_range(0..=MAX_COMPANY_PROJECTS),
            skills_required: pick_skills(&mut rng, 1, 2),
        })
        .collect();

    Ok(SyntheticData { students, companies })
}

/// Generate and write both tables as CSV.
pub fn write_synthetic(config: &SyntheticConfig) -> Result<SyntheticData, AppError> {
    let data = generate(config)?;
    write_csv(&config.students_out, &data.students)?;
    write_csv(&config.companies_out, &data.companies)?;
    info!(
        students = data.students.len(),
        companies = data.companies.len(),
        seed = config.seed,
        "synthetic datasets written"
    );
    Ok(data)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| AppError::io(path, e))
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// Skills are joined with a bare comma: qualification labels match student
/// tokens verbatim, so a separator space would hide every skill but the first.
fn pick_skills(rng: &mut StdRng, min: usize, max: usize) -> String {
    let count = rng.gen_range(min..=max);
    SKILL_VOCABULARY
        .choose_multiple(rng, count)
        .copied()
        .collect::<Vec<_>>()
        .join(",")
}

fn company_name(i: usize) -> String {
    let stem = COMPANY_STEMS[i % COMPANY_STEMS.len()];
    match i / COMPANY_STEMS.len() {
        0 => stem.to_string(),
        round => format!("{stem} {}", round + 1),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
