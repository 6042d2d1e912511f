//! Append-only CSV log of simulation trials

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::TrialResult;
use crate::domain::DomainError;

/// One logged trial
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRow {
    pub run_id: Uuid,
    pub list_index: usize,
    pub client_id: usize,
    pub num_categories: usize,
    pub num_images: usize,
    pub simple_cache_bytes: u64,
    pub similarity_cache_bytes: u64,
    pub simple_cache_kb: String,
    pub similarity_cache_kb: String,
    pub simple_failed: usize,
    pub similarity_failed: usize,
    pub similarity_reused: usize,
    pub recorded_at: DateTime<Utc>,
}

impl SimulationRow {
    pub fn from_result(run_id: Uuid, result: &TrialResult) -> Self {
        Self {
            run_id,
            // 1-based in the log
            list_index: result.list_index + 1,
            client_id: result.client_id + 1,
            num_categories: result.workload.num_categories,
            num_images: result.workload.num_images,
            simple_cache_bytes: result.simple.bytes,
            similarity_cache_bytes: result.similarity.bytes,
            simple_cache_kb: kilobytes(result.simple.bytes),
            similarity_cache_kb: kilobytes(result.similarity.bytes),
            simple_failed: result.simple.failed,
            similarity_failed: result.similarity.failed,
            similarity_reused: result.similarity.reused,
            recorded_at: Utc::now(),
        }
    }
}

fn kilobytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

/// Single-writer CSV sink; each row is flushed as soon as it is written
pub struct SimulationLog<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl SimulationLog<File> {
    /// Creates (or truncates) the log file
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path).map_err(|e| {
            DomainError::storage(format!("Cannot create log {}: {}", path.display(), e))
        })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> SimulationLog<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            rows: 0,
        }
    }

    pub fn write(&mut self, row: &SimulationRow) -> Result<(), DomainError> {
        self.writer
            .serialize(row)
            .map_err(|e| DomainError::storage(format!("Failed to write log row: {}", e)))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W, DomainError> {
        self.writer
            .into_inner()
            .map_err(|e| DomainError::storage(format!("Failed to flush log: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::simulation::{ModeTotals, SimulationWorkload};

    fn result() -> TrialResult {
        TrialResult {
            list_index: 0,
            client_id: 4,
            workload: SimulationWorkload::new(2, 10),
            similarity: ModeTotals {
                bytes: 2048,
                failed: 0,
                reused: 3,
            },
            simple: ModeTotals {
                bytes: 3072,
                failed: 1,
                reused: 0,
            },
        }
    }

    #[test]
    fn test_header_written_once() {
        let run_id = Uuid::new_v4();
        let mut log = SimulationLog::new(Vec::new());
        log.write(&SimulationRow::from_result(run_id, &result())).unwrap();
        log.write(&SimulationRow::from_result(run_id, &result())).unwrap();
        assert_eq!(log.rows(), 2);

        let output = String::from_utf8(log.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("run_id,list_index,client_id,num_categories,num_images"));
        assert_eq!(output.matches("run_id").count(), 1);
    }

    #[test]
    fn test_row_values() {
        let row = SimulationRow::from_result(Uuid::nil(), &result());
        assert_eq!(row.list_index, 1);
        assert_eq!(row.client_id, 5);
        assert_eq!(row.simple_cache_kb, "3.00");
        assert_eq!(row.similarity_cache_kb, "2.00");
    }

    #[test]
    fn test_create_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("simulation.csv");

        let mut log = SimulationLog::create(&path).unwrap();
        log.write(&SimulationRow::from_result(Uuid::nil(), &result())).unwrap();
        drop(log);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
