//! Plain-text interview summary, one file per completed conversation.

use std::path::PathBuf;

use tracing::info;
use uuid::Uuid;

use crate::intake::record::{CandidateRecord, TECHNICAL_ANSWERS_KEY};
use crate::intake::store::StoreError;

pub const SUMMARY_TITLE: &str = "Candidate Interview Summary";

/// Title line, then `key: value` per field and the answers as `key:` followed
/// by one answer per line. Fields are separated by a blank line.
pub fn render_summary(record: &CandidateRecord) -> String {
    let mut blocks = vec![SUMMARY_TITLE.to_string()];
    blocks.extend(
        record
            .fields()
            .iter()
            .map(|(key, value)| format!("{key}: {value}")),
    );

    let mut answers = format!("{TECHNICAL_ANSWERS_KEY}:");
    for answer in record.technical_answers() {
        answers.push('\n');
        answers.push_str(answer);
    }
    blocks.push(answers);

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

pub struct SummaryExporter {
    dir: PathBuf,
}

impl SummaryExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, session_id: Uuid) -> PathBuf {
        self.dir
            .join(format!("candidate_summary_{session_id}.txt"))
    }

    pub async fn export(
        &self,
        session_id: Uuid,
        record: &CandidateRecord,
    ) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let path = self.path_for(session_id);
        tokio::fs::write(&path, render_summary(record))
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        info!("Interview summary written to {}", path.display());
        Ok(path)
    }

    /// Reads a previously exported summary.
    pub async fn read(&self, session_id: Uuid) -> Result<String, StoreError> {
        let path = self.path_for(session_id);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::slots::{EMAIL_ADDRESS, FULL_NAME};

    fn record() -> CandidateRecord {
        let mut record = CandidateRecord::default();
        record.set(FULL_NAME, "Ada Lovelace");
        record.set(EMAIL_ADDRESS, "ada@example.com");
        record.attach_answers(vec![
            "First detailed answer".to_string(),
            "Second detailed answer".to_string(),
        ]);
        record
    }

    #[test]
    fn test_render_layout() {
        let expected = "Candidate Interview Summary\n\
                        \n\
                        Full Name: Ada Lovelace\n\
                        \n\
                        Email Address: ada@example.com\n\
                        \n\
                        Technical Answers:\n\
                        First detailed answer\n\
                        Second detailed answer\n";
        assert_eq!(render_summary(&record()), expected);
    }

    #[test]
    fn test_render_without_answers() {
        let out = render_summary(&CandidateRecord::default());
        assert_eq!(out, "Candidate Interview Summary\n\nTechnical Answers:\n");
    }

    #[tokio::test]
    async fn test_export_writes_one_file_per_session() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SummaryExporter::new(dir.path().join("exports"));
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let path = exporter.export(first, &record()).await.unwrap();
        exporter.export(second, &record()).await.unwrap();

        assert_eq!(path, exporter.path_for(first));
        assert_ne!(exporter.path_for(first), exporter.path_for(second));
        assert_eq!(
            exporter.read(first).await.unwrap(),
            render_summary(&record())
        );
    }

    #[tokio::test]
    async fn test_read_missing_summary_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SummaryExporter::new(dir.path());
        assert!(exporter.read(Uuid::new_v4()).await.is_err());
    }
}
