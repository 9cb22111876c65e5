use thiserror::Error;

use super::job::{Pid, Process, ProcessError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("expected ARRIVAL,BURST[,PRIORITY], got {0:?}")]
    Shape(String),
    #[error("{field} must be a non-negative integer, got {value:?}")]
    Field { field: &'static str, value: String },
    #[error(transparent)]
    Process(#[from] ProcessError),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("row {line}")]
pub struct TableError {
    pub line: usize,
    #[source]
    pub source: RowError,
}

fn field(name: &'static str, value: &str) -> Result<u64, RowError> {
    value.trim().parse().map_err(|_| RowError::Field {
        field: name,
        value: value.trim().to_owned(),
    })
}

// ARRIVAL,BURST[,PRIORITY]; priority defaults to 0
pub fn parse_row(pid: Pid, row: &str) -> Result<Process, RowError> {
    let fields: Vec<&str> = row.split(',').collect();
    let (arrival, burst, priority) = match fields.as_slice() {
        [arrival, burst] => (arrival, burst, None),
        [arrival, burst, priority] => (arrival, burst, Some(priority)),
        _ => return Err(RowError::Shape(row.trim().to_owned())),
    };

    let arrival = field("arrival", arrival)?;
    let burst = field("burst", burst)?;
    let priority = priority.map_or(Ok(0), |p| field("priority", p))?;
    Ok(Process::new(pid, arrival, burst, priority)?)
}

// Blank rows and `#` comments are skipped. Pids count up from 1 over the
// rows that remain; `line` in errors is 1-based over all rows.
pub fn parse_rows<'a>(rows: impl IntoIterator<Item = &'a str>) -> Result<Vec<Process>, TableError> {
    let mut processes = Vec::new();

    for (i, row) in rows.into_iter().enumerate() {
        let row = row.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let pid = processes.len() as Pid + 1;
        let process = parse_row(pid, row).map_err(|source| TableError { line: i + 1, source })?;
        processes.push(process);
    }

    Ok(processes)
}
