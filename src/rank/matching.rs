//! Deterministic student ↔ internship scoring.
//!
//! score = 0.35·cgpa_fit + 0.20·location + 0.45·role_alignment, rounded to 4
//! decimals. Field match is computed and reported in the breakdown but carries
//! no weight. A student below the posting's minimum CGPA scores exactly 0.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{InternshipPosting, MatchBreakdown, MatchResult, MatchScore, StudentProfile, MAX_TOP_K};
use crate::math::round_to;

const W_CGPA: f64 = 0.35;
const W_LOCATION: f64 = 0.20;
const W_ROLE: f64 = 0.45;

/// CGPA headroom (in grade points) at which the fit saturates.
const CGPA_HEADROOM: f64 = 3.0;
const CGPA_FLOOR: f64 = 0.7;

const FIELD_MISMATCH: f64 = 0.5;
const LOCATION_MISMATCH: f64 = 0.6;
const ROLE_BASE: f64 = 0.6;

pub const DEFAULT_TOP_K: usize = 3;

/// Per-factor scores. `None` when the student is below the CGPA floor.
pub fn breakdown(student: &StudentProfile, internship: &InternshipPosting) -> Option<MatchBreakdown> {
    if student.cgpa < internship.min_cgpa {
        return None;
    }

    let cgpa_fit = if student.cgpa > internship.min_cgpa {
        (CGPA_FLOOR + (1.0 - CGPA_FLOOR) * (student.cgpa - internship.min_cgpa) / CGPA_HEADROOM).min(1.0)
    } else {
        CGPA_FLOOR
    };

    let field_match = match student.department.as_deref().map(str::trim) {
        Some(field) if !field.is_empty() && eq_ignore_case(field, internship.field.trim()) => 1.0,
        _ => FIELD_MISMATCH,
    };

    let location_match = match student.location.as_deref().map(str::trim) {
        Some(loc) if !loc.is_empty() && eq_ignore_case(loc, internship.location.trim()) => 1.0,
        _ => LOCATION_MISMATCH,
    };

    Some(MatchBreakdown {
        cgpa_fit,
        field_match,
        location_match,
        role_alignment: role_alignment(student, &internship.suggested_role),
    })
}

/// Weighted score in [0, 1].
pub fn score_match(student: &StudentProfile, internship: &InternshipPosting) -> f64 {
    breakdown(student, internship).map_or(0.0, |b| weighted(&b))
}

fn weighted(b: &MatchBreakdown) -> f64 {
    round_to(
        W_CGPA * b.cgpa_fit + W_LOCATION * b.location_match + W_ROLE * b.role_alignment,
        4,
    )
}

fn role_alignment(student: &StudentProfile, role: &str) -> f64 {
    let role_tokens: HashSet<String> = role.split_whitespace().map(str::to_lowercase).collect();
    if role_tokens.is_empty() {
        return ROLE_BASE;
    }
    let skill_set: HashSet<String> = student.skill_list().iter().map(|s| s.to_lowercase()).collect();
    let overlap = role_tokens.intersection(&skill_set).count();
    ROLE_BASE + (1.0 - ROLE_BASE) * overlap as f64 / role_tokens.len() as f64
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Rank `internships` for `student`, keeping the top `top_k` (clamped into `1..=20`).
///
/// Zero scores are dropped; equal scores keep catalog order.
pub fn rank_internships(
    student: &StudentProfile,
    internships: &[InternshipPosting],
    top_k: usize,
) -> MatchResult {
    let k = top_k.clamp(1, MAX_TOP_K);

    let mut scored: Vec<MatchScore> = internships
        .iter()
        .filter_map(|internship| {
            let b = breakdown(student, internship)?;
            let score = weighted(&b);
            (score > 0.0).then(|| MatchScore {
                score,
                internship: internship.clone(),
                breakdown: b,
            })
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);

    debug!(
        student = student.display_name(),
        catalog = internships.len(),
        kept = scored.len(),
        "ranked internships"
    );

    MatchResult {
        student_id: student.id,
        student_name: student.display_name().to_string(),
        best_match: scored.first().map(|m| m.internship.clone()),
        top_matches: scored,
    }
}
