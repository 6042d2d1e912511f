//! Similarity matrices read from per-category CSV artifacts

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::image::{CategoryKey, ImageIdentity};
use crate::domain::similarity::{SimilarityMatrix, SimilarityRepository, MAX_SCORE};
use crate::domain::DomainError;

/// Reads `{image_dir}/{website}/{category}/{website} - {category}.csv`
///
/// The first row holds image ids (its first cell is the empty index
/// header), the first column holds the row ids. Empty and NaN cells are
/// undefined pairs.
#[derive(Debug, Clone)]
pub struct CsvSimilarityRepository {
    image_dir: PathBuf,
}

impl CsvSimilarityRepository {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
        }
    }

    pub fn artifact_path(&self, category: &CategoryKey) -> PathBuf {
        artifact_path(&self.image_dir, category)
    }
}

pub fn artifact_path(image_dir: &Path, category: &CategoryKey) -> PathBuf {
    image_dir
        .join(category.website())
        .join(category.category())
        .join(format!("{}.csv", category))
}

#[async_trait]
impl SimilarityRepository for CsvSimilarityRepository {
    async fn load(&self, category: &CategoryKey) -> Result<Arc<SimilarityMatrix>, DomainError> {
        let path = self.artifact_path(category);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DomainError::similarity_artifact_missing(category.to_string()));
            }
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let matrix = parse_matrix(category.clone(), raw.as_slice())?;
        debug!(
            category = %category,
            images = matrix.len(),
            path = %path.display(),
            "Loaded similarity matrix"
        );

        Ok(Arc::new(matrix))
    }
}

/// Parses a square similarity table
pub fn parse_matrix<R: Read>(
    category: CategoryKey,
    reader: R,
) -> Result<SimilarityMatrix, DomainError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let invalid = |message: String| DomainError::validation(format!("{}: {}", category, message));

    let columns: Vec<ImageIdentity> = csv
        .headers()
        .map_err(|e| invalid(format!("unreadable header: {}", e)))?
        .iter()
        .skip(1)
        .map(ImageIdentity::new)
        .collect::<Result<_, _>>()?;

    let mut builder = SimilarityMatrix::builder(category.clone());
    for column in &columns {
        builder.touch(column.clone());
    }

    for (line, record) in csv.records().enumerate() {
        let record = record.map_err(|e| invalid(format!("row {}: {}", line + 1, e)))?;

        let mut cells = record.iter();
        let row_id = cells
            .next()
            .ok_or_else(|| invalid(format!("row {} is empty", line + 1)))
            .and_then(ImageIdentity::new)?;
        builder.touch(row_id.clone());

        for (column, cell) in columns.iter().zip(cells) {
            let score = parse_score(cell)
                .map_err(|m| invalid(format!("({}, {}): {}", row_id, column, m)))?;
            if let Some(score) = score {
                builder.insert(row_id.clone(), column.clone(), score)?;
            }
        }
    }

    Ok(builder.build())
}

/// Accepts integers and integral floats (`3`, `3.0`); empty/NaN mean undefined
fn parse_score(cell: &str) -> Result<Option<u8>, String> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    let value: f64 = cell
        .parse()
        .map_err(|_| format!("'{}' is not a number", cell))?;

    if value.fract() != 0.0 || value < 0.0 || value > f64::from(MAX_SCORE) {
        return Err(format!("'{}' is not an integer in [0, {}]", cell, MAX_SCORE));
    }

    Ok(Some(value as u8))
}
