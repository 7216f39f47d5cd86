//! CSV ingest and validation for the student, company and internship tables.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Lenient headers**: case-insensitive, BOM-tolerant, with a few aliases

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::domain::{CompanyProfile, InternshipPosting, StudentProfile};
use crate::error::AppError;

const CGPA_MAX: f64 = 10.0;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: parsed records plus whatever was skipped.
#[derive(Debug, Clone)]
pub struct Table<T> {
    pub records: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Logical column with accepted header spellings (first is canonical).
type Column = &'static [&'static str];

mod col {
    use super::Column;

    pub const ID: Column = &["id", "student_id"];
    pub const FULL_NAME: Column = &["full_name", "name"];
    pub const EMAIL: Column = &["email"];
    pub const DEPARTMENT: Column = &["department", "field"];
    pub const CGPA: Column = &["cgpa"];
    pub const PROJECTS: Column = &["projects"];
    pub const SKILLS: Column = &["skills"];
    pub const LOCATION: Column = &["location"];

    pub const COMPANY: Column = &["company"];
    pub const MIN_CGPA: Column = &["min_cgpa"];
    pub const MIN_PROJECTS: Column = &["min_projects"];
    pub const SKILLS_REQUIRED: Column = &["skills_required", "required_skills"];

    pub const INTERNSHIP_ID: Column = &["id", "internship_id"];
    pub const COMPANY_NAME: Column = &["company_name", "company"];
    pub const ROLE: Column = &["suggested_role", "role"];
    pub const FIELD: Column = &["field"];
    pub const PROGRAM: Column = &["program"];
}

const STUDENT_COLUMNS: [Column; 4] = [col::DEPARTMENT, col::CGPA, col::PROJECTS, col::SKILLS];
const COMPANY_COLUMNS: [Column; 4] = [col::COMPANY, col::MIN_CGPA, col::MIN_PROJECTS, col::SKILLS_REQUIRED];
const INTERNSHIP_COLUMNS: [Column; 5] = [col::COMPANY_NAME, col::ROLE, col::LOCATION, col::MIN_CGPA, col::FIELD];

pub fn load_students(path: &Path) -> Result<Table<StudentProfile>, AppError> {
    let table = read_students(open(path)?)?;
    report_row_errors(path, &table);
    Ok(table)
}

pub fn load_companies(path: &Path) -> Result<Table<CompanyProfile>, AppError> {
    let table = read_companies(open(path)?)?;
    report_row_errors(path, &table);
    Ok(table)
}

pub fn load_internships(path: &Path) -> Result<Table<InternshipPosting>, AppError> {
    let table = read_internships(open(path)?)?;
    report_row_errors(path, &table);
    Ok(table)
}

pub fn read_students<R: Read>(reader: R) -> Result<Table<StudentProfile>, AppError> {
    read_table(reader, &STUDENT_COLUMNS, parse_student)
}

pub fn read_companies<R: Read>(reader: R) -> Result<Table<CompanyProfile>, AppError> {
    read_table(reader, &COMPANY_COLUMNS, parse_company)
}

pub fn read_internships<R: Read>(reader: R) -> Result<Table<InternshipPosting>, AppError> {
    read_table(reader, &INTERNSHIP_COLUMNS, parse_internship)
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::io(path, e))
}

fn report_row_errors<T>(path: &Path, table: &Table<T>) {
    for err in &table.row_errors {
        warn!(
            file = %path.display(),
            line = err.line,
            id = err.id.as_deref().unwrap_or("-"),
            "skipped row: {}",
            err.message
        );
    }
}

fn read_table<R, T, F>(reader: R, required: &[Column], parse: F) -> Result<Table<T>, AppError>
where
    R: Read,
    F: Fn(&StringRecord, &HeaderMap) -> Result<T, RowFailure>,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_map = HeaderMap::new(reader.headers()?);
    for column in required {
        if header_map.index(column).is_none() {
            return Err(AppError::InvalidInput(format!(
                "Missing required column: `{}`",
                column[0]
            )));
        }
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse(&record, &header_map) {
            Ok(row) => records.push(row),
            Err(failure) => row_errors.push(RowError {
                line,
                id: failure.id,
                message: failure.message,
            }),
        }
    }

    Ok(Table {
        records,
        row_errors,
        rows_read,
    })
}

/// Header name → column index, with normalized names.
struct HeaderMap(HashMap<String, usize>);

impl HeaderMap {
    fn new(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(idx, name)| (normalize_header_name(name), idx))
                .collect(),
        )
    }

    fn index(&self, column: Column) -> Option<usize> {
        column.iter().find_map(|name| self.0.get(*name).copied())
    }

    fn required<'a>(&self, record: &'a StringRecord, column: Column) -> Result<&'a str, String> {
        self.optional(record, column)
            .ok_or_else(|| format!("Missing required value: `{}`", column[0]))
    }

    fn optional<'a>(&self, record: &'a StringRecord, column: Column) -> Option<&'a str> {
        let idx = self.index(column)?;
        record.get(idx).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Present-but-possibly-empty text column.
    fn text(&self, record: &StringRecord, column: Column) -> String {
        self.optional(record, column).unwrap_or_default().to_string()
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Why a row was rejected, plus its identifier when one was readable.
struct RowFailure {
    id: Option<String>,
    message: String,
}

impl RowFailure {
    fn with_id(id: Option<&str>) -> impl Fn(String) -> RowFailure + '_ {
        move |message| RowFailure {
            id: id.map(str::to_string),
            message,
        }
    }
}

fn parse_student(record: &StringRecord, headers: &HeaderMap) -> Result<StudentProfile, RowFailure> {
    let id_text = headers.optional(record, col::ID);
    let fail = RowFailure::with_id(id_text);

    let id = id_text.map(|s| parse_u32(s, "id")).transpose().map_err(&fail)?;
    let cgpa = parse_grade(headers.required(record, col::CGPA).map_err(&fail)?, "cgpa").map_err(&fail)?;
    let projects = parse_u32(headers.required(record, col::PROJECTS).map_err(&fail)?, "projects").map_err(&fail)?;

    Ok(StudentProfile {
        id,
        full_name: headers.text(record, col::FULL_NAME),
        email: headers.text(record, col::EMAIL),
        department: headers.optional(record, col::DEPARTMENT).map(str::to_string),
        cgpa,
        projects,
        skills: headers.text(record, col::SKILLS),
        location: headers.optional(record, col::LOCATION).map(str::to_string),
    })
}

fn parse_company(record: &StringRecord, headers: &HeaderMap) -> Result<CompanyProfile, RowFailure> {
    let name = headers.optional(record, col::COMPANY);
    let fail = RowFailure::with_id(name);

    let company = headers.required(record, col::COMPANY).map_err(&fail)?.to_string();
    let min_cgpa = parse_grade(headers.required(record, col::MIN_CGPA).map_err(&fail)?, "min_cgpa").map_err(&fail)?;
    let min_projects =
        parse_u32(headers.required(record, col::MIN_PROJECTS).map_err(&fail)?, "min_projects").map_err(&fail)?;

    Ok(CompanyProfile {
        company,
        min_cgpa,
        min_projects,
        skills_required: headers.text(record, col::SKILLS_REQUIRED),
    })
}

fn parse_internship(record: &StringRecord, headers: &HeaderMap) -> Result<InternshipPosting, RowFailure> {
    let id_text = headers.optional(record, col::INTERNSHIP_ID);
    let fail = RowFailure::with_id(id_text.or_else(|| headers.optional(record, col::COMPANY_NAME)));

    let id = id_text.map(|s| parse_u32(s, "id")).transpose().map_err(&fail)?;
    let company_name = headers.required(record, col::COMPANY_NAME).map_err(&fail)?.to_string();
    let suggested_role = headers.required(record, col::ROLE).map_err(&fail)?.to_string();
    let min_cgpa = parse_grade(headers.required(record, col::MIN_CGPA).map_err(&fail)?, "min_cgpa").map_err(&fail)?;
    let min_projects = headers
        .optional(record, col::MIN_PROJECTS)
        .map(|s| parse_u32(s, "min_projects"))
        .transpose()
        .map_err(&fail)?
        .unwrap_or(0);

    Ok(InternshipPosting {
        id,
        company_name,
        suggested_role,
        location: headers.text(record, col::LOCATION),
        min_cgpa,
        field: headers.text(record, col::FIELD),
        min_projects,
        required_skills: headers.text(record, col::SKILLS_REQUIRED),
        program: headers.text(record, col::PROGRAM),
    })
}

/// CGPA-scale value in `[0, 10]`.
fn parse_grade(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}' (expected a number)."))?;
    if !v.is_finite() || !(0.0..=CGPA_MAX).contains(&v) {
        return Err(format!("`{name}` must be within [0, {CGPA_MAX}], got {v}."));
    }
    Ok(v)
}

fn parse_u32(s: &str, name: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("Invalid `{name}` value '{s}' (expected a non-negative integer)."))
}
