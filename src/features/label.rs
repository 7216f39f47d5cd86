//! Ground-truth qualification labels for training pairs.

use crate::domain::{CompanyProfile, StudentProfile};

/// `1` iff the student holds every required skill, meets the CGPA floor and
/// meets the project floor (all thresholds inclusive), else `0`.
///
/// Required skills are lowercased and trimmed. Student skills are only
/// lowercased: a required skill must match one of the student's comma-separated
/// entries verbatim.
pub fn label(student: &StudentProfile, company: &CompanyProfile) -> u8 {
    let skills_match = has_required_skills(&student.skills, &company.skills_required);
    let cgpa_match = student.cgpa >= company.min_cgpa;
    let projects_match = student.projects >= company.min_projects;
    u8::from(skills_match && cgpa_match && projects_match)
}

fn has_required_skills(student_skills: &str, skills_required: &str) -> bool {
    let student_lower = student_skills.to_lowercase();
    let student_tokens: Vec<&str> = student_lower.split(',').collect();
    skills_required
        .to_lowercase()
        .split(',')
        .all(|required| student_tokens.contains(&required.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(cgpa: f64, projects: u32, skills: &str) -> StudentProfile {
        StudentProfile {
            department: Some("CSE".to_string()),
            cgpa,
            projects,
            skills: skills.to_string(),
            ..StudentProfile::default()
        }
    }

    fn company(min_cgpa: f64, min_projects: u32, skills_required: &str) -> CompanyProfile {
        CompanyProfile {
            company: "Growify".to_string(),
            min_cgpa,
            min_projects,
            skills_required: skills_required.to_string(),
        }
    }

    #[test]
    fn qualifies_when_all_three_conditions_hold() {
        assert_eq!(label(&student(8.5, 3, "python,java"), &company(7.0, 2, "Python")), 1);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(label(&student(7.0, 2, "python"), &company(7.0, 2, "python")), 1);
        assert_eq!(label(&student(6.99, 2, "python"), &company(7.0, 2, "python")), 0);
        assert_eq!(label(&student(7.0, 1, "python"), &company(7.0, 2, "python")), 0);
    }

    #[test]
    fn every_required_skill_must_be_present() {
        let s = student(9.0, 5, "python,sql");
        assert_eq!(label(&s, &company(6.0, 0, "python, sql")), 1);
        assert_eq!(label(&s, &company(6.0, 0, "python,java")), 0);
    }

    #[test]
    fn student_tokens_must_match_verbatim() {
        // The space after the comma stays part of the student's token.
        let s = student(9.0, 5, "python, java");
        assert_eq!(label(&s, &company(6.0, 0, "java")), 0);
        assert_eq!(label(&s, &company(6.0, 0, "PYTHON")), 1);
    }
}
