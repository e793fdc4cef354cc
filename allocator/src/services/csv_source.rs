//! CSV record source
//!
//! Reads the team and task sheets exported from the store planning
//! spreadsheet. Header names are matched after trimming and lower-casing,
//! so `Name`, ` name ` and `NAME` all work.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::{component_info, Component, RawRecord, Task, TeamMember};
use tokio::fs;

use crate::error::{AllocatorError, AllocatorResult};
use crate::traits::RecordSource;

pub const TEAM_COLUMNS: &[&str] = &["name", "speed"];
pub const TASK_COLUMNS: &[&str] = &["id", "time", "priority", "difficulty", "zone"];

/// Team and task lists backed by two CSV files
pub struct CsvRecordSource {
    team_path: PathBuf,
    tasks_path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(team_path: impl Into<PathBuf>, tasks_path: impl Into<PathBuf>) -> Self {
        Self {
            team_path: team_path.into(),
            tasks_path: tasks_path.into(),
        }
    }

    async fn read(path: &Path) -> AllocatorResult<String> {
        fs::read_to_string(path)
            .await
            .map_err(|e| AllocatorError::fs("read", path, e))
    }
}

#[async_trait]
impl RecordSource for CsvRecordSource {
    async fn load_team(&self) -> AllocatorResult<Vec<TeamMember>> {
        let content = Self::read(&self.team_path).await?;
        let team = parse_typed::<TeamMember>(&content, "team", TEAM_COLUMNS)?;
        component_info!(
            Component::Loader,
            "📥 Loaded {} team members from {}",
            team.len(),
            self.team_path.display()
        );
        Ok(team)
    }

    async fn load_tasks(&self) -> AllocatorResult<Vec<Task>> {
        let content = Self::read(&self.tasks_path).await?;
        let tasks = parse_typed::<Task>(&content, "tasks", TASK_COLUMNS)?;
        component_info!(
            Component::Loader,
            "📥 Loaded {} tasks from {}",
            tasks.len(),
            self.tasks_path.display()
        );
        Ok(tasks)
    }
}

/// Parse `content` into typed records, checking `required` columns first
pub fn parse_typed<T>(content: &str, sheet: &str, required: &[&str]) -> AllocatorResult<Vec<T>>
where
    T: for<'r> TryFrom<&'r RawRecord, Error = shared::SharedError>,
{
    parse_records(content, sheet, required)?
        .into_iter()
        .map(|(line, record)| {
            T::try_from(&record).map_err(|e| AllocatorError::CsvError {
                line,
                message: format!("{sheet}: {e}"),
            })
        })
        .collect()
}

/// Parse a CSV document into header-keyed records tagged with their line
pub fn parse_records(
    content: &str,
    sheet: &str,
    required: &[&str],
) -> AllocatorResult<Vec<(usize, RawRecord)>> {
    let mut rows = parse_rows(content)?.into_iter();
    let (_, header) = rows
        .next()
        .ok_or_else(|| AllocatorError::config(format!("{sheet} file has no header row")))?;
    let header: Vec<String> = header.iter().map(|h| RawRecord::normalize_key(h)).collect();

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !header.iter().any(|h| h == col))
        .collect();
    if !missing.is_empty() {
        return Err(AllocatorError::config(format!(
            "{sheet} file must have {} columns (missing {})",
            required.join(", "),
            missing.join(", ")
        )));
    }

    rows.map(|(line, fields)| {
        if fields.len() != header.len() {
            return Err(AllocatorError::CsvError {
                line,
                message: format!("expected {} fields, found {}", header.len(), fields.len()),
            });
        }
        let record = header.iter().zip(fields).collect::<RawRecord>();
        Ok((line, record))
    })
    .collect()
}

/// Split CSV text into rows of fields, skipping blank lines
///
/// Supports quoted fields with embedded commas, newlines and `""` escapes.
pub fn parse_rows(content: &str) -> AllocatorResult<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, row_line, std::mem::take(&mut row));
                line += 1;
                row_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(AllocatorError::CsvError {
            line: row_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row_line, row);
    }
    Ok(rows)
}

fn push_row(rows: &mut Vec<(usize, Vec<String>)>, line: usize, row: Vec<String>) {
    if row.iter().all(|f| f.trim().is_empty()) {
        return;
    }
    rows.push((line, row));
}

/// Quote a field for CSV output when it needs it
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Priority;
    use tempfile::TempDir;

    #[test]
    fn test_parse_rows_handles_quotes_and_blank_lines() {
        let content = "id,zone\r\n\"L-1\",\"Aisle 3, left\"\n\n\"L-2\",\"Say \"\"hi\"\"\"\n";
        let rows = parse_rows(content).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], (2, vec!["L-1".to_string(), "Aisle 3, left".to_string()]));
        assert_eq!(rows[2].0, 4);
        assert_eq!(rows[2].1[1], "Say \"hi\"");
    }

    #[test]
    fn test_parse_rows_without_trailing_newline() {
        let rows = parse_rows("a,b\n1,2").unwrap();
        assert_eq!(rows[1].1, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_unterminated_quote_is_reported() {
        let err = parse_rows("a,b\n\"oops,2\n").unwrap_err();
        assert!(matches!(err, AllocatorError::CsvError { line: 2, .. }));
    }

    #[test]
    fn test_headers_are_normalised() {
        let content = " Name ,SPEED\nAna,1.2\nBo,0.8\n";
        let team = parse_typed::<TeamMember>(content, "team", TEAM_COLUMNS).unwrap();

        assert_eq!(team, vec![TeamMember::new("Ana", 1.2), TeamMember::new("Bo", 0.8)]);
    }

    #[test]
    fn test_missing_columns_fail_before_rows_are_read() {
        let content = "id,time,priority,zone\nL-1,10,low,A\n";
        let err = parse_typed::<Task>(content, "tasks", TASK_COLUMNS).unwrap_err();

        assert!(matches!(err, AllocatorError::ConfigurationError { .. }));
        assert!(err.to_string().contains("difficulty"));
    }

    #[test]
    fn test_bad_row_reports_line() {
        let content = "name,speed\nAna,1.0\nBo,fast\n";
        let err = parse_typed::<TeamMember>(content, "team", TEAM_COLUMNS).unwrap_err();

        match err {
            AllocatorError::CsvError { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("speed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let err = parse_records("name,speed\nAna\n", "team", TEAM_COLUMNS).unwrap_err();
        assert!(matches!(err, AllocatorError::CsvError { line: 2, .. }));
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"x\""), "\"say \"\"x\"\"\"");
    }

    #[tokio::test]
    async fn test_source_reads_both_files() {
        let temp = TempDir::new().unwrap();
        let team_path = temp.path().join("team.csv");
        let tasks_path = temp.path().join("tasks.csv");
        fs::write(&team_path, "name,speed\nAna,1.0\n").await.unwrap();
        fs::write(&tasks_path, "ID,Time,Priority,Difficulty,Zone\nL-1,30,fz,2,Frozen\n")
            .await
            .unwrap();

        let source = CsvRecordSource::new(&team_path, &tasks_path);
        let team = source.load_team().await.unwrap();
        let tasks = source.load_tasks().await.unwrap();

        assert_eq!(team.len(), 1);
        assert_eq!(tasks[0].priority, Priority::Freezer);
        assert_eq!(tasks[0].zone, "Frozen");
    }

    #[test]
    fn test_numeric_priorities_are_levels() {
        let content = "id,time,priority,difficulty,zone\nL-1,10,1,2,Dry\nL-2,10,3,2,Dry\nL-3,10,dy,1,Chilled\n";
        let tasks = parse_typed::<Task>(content, "tasks", TASK_COLUMNS).unwrap();

        assert_eq!(tasks[0].priority, Priority::Level(1));
        assert_eq!(tasks[1].priority, Priority::Level(3));
        assert_eq!(tasks[2].priority, Priority::Dairy);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = CsvRecordSource::new("/nonexistent/team.csv", "/nonexistent/tasks.csv");
        let err = source.load_team().await.unwrap_err();
        assert!(matches!(err, AllocatorError::FileSystemError { .. }));
    }
}
