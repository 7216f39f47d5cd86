//! Candidate (student, company) pairs and their feature vectors.
//!
//! Training uses the full students × companies cross product; serving pairs one
//! new student with every company in the catalog. Both go through the same
//! feature builder so the column layout cannot drift between the two.

use crate::domain::{CompanyProfile, FeatureVector, StudentProfile};
use crate::error::AppError;
use crate::features::encoder::FeatureEncoder;
use crate::features::label::label;

/// One (student, company) combination considered for scoring.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
    pub student: &'a StudentProfile,
    pub company: &'a CompanyProfile,
    pub features: FeatureVector,
}

/// Labeled feature rows, aligned by index.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub rows: Vec<FeatureVector>,
    pub labels: Vec<u8>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&y| y == 1).count()
    }

    /// Select a subset of rows by index (indices may repeat).
    pub fn subset(&self, indices: &[usize]) -> TrainingSet {
        TrainingSet {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

/// Encode the student's department and lay out the feature vector.
pub fn feature_vector(
    student: &StudentProfile,
    company: &CompanyProfile,
    department_encoder: &FeatureEncoder,
) -> Result<FeatureVector, AppError> {
    let department = student
        .department
        .as_deref()
        .ok_or(AppError::MissingField("department"))?;
    let code = department_encoder.encode(department)?;
    Ok([
        code as f64,
        student.cgpa,
        f64::from(student.projects),
        company.min_cgpa,
        f64::from(company.min_projects),
    ])
}

/// Full cross product, students outermost (row-major like a merge on a constant key).
pub fn cross_join<'a>(
    students: &'a [StudentProfile],
    companies: &'a [CompanyProfile],
    department_encoder: &FeatureEncoder,
) -> Result<Vec<CandidatePair<'a>>, AppError> {
    let mut out = Vec::with_capacity(students.len() * companies.len());
    for student in students {
        out.extend(against_catalog(student, companies, department_encoder)?);
    }
    Ok(out)
}

/// One student against every company, in catalog order.
pub fn against_catalog<'a>(
    student: &'a StudentProfile,
    companies: &'a [CompanyProfile],
    department_encoder: &FeatureEncoder,
) -> Result<Vec<CandidatePair<'a>>, AppError> {
    companies
        .iter()
        .map(|company| -> Result<CandidatePair<'a>, AppError> {
            Ok(CandidatePair {
                student,
                company,
                features: feature_vector(student, company, department_encoder)?,
            })
        })
        .collect()
}

/// Attach qualification labels to candidate pairs.
pub fn label_pairs(pairs: &[CandidatePair<'_>]) -> TrainingSet {
    TrainingSet {
        rows: pairs.iter().map(|p| p.features).collect(),
        labels: pairs.iter().map(|p| label(p.student, p.company)).collect(),
    }
}
