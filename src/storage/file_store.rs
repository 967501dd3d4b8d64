use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use super::{PlanId, SectionKey, SectionStore};
use crate::error::{WorkbookError, WorkbookResult};

/// Stores sections as `<root>/plans/<plan-id>/<section>.json`.
#[derive(Debug, Clone)]
pub struct FileSectionStore {
    root: PathBuf,
}

impl FileSectionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn section_path(&self, plan: &PlanId, section: SectionKey) -> PathBuf {
        self.root
            .join("plans")
            .join(plan.as_str())
            .join(format!("{section}.json"))
    }
}

impl SectionStore for FileSectionStore {
    fn load(&self, plan: &PlanId, section: SectionKey) -> WorkbookResult<Option<Value>> {
        let path = self.section_path(plan, section);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(WorkbookError::Storage(format!(
                    "Failed to open {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        let document = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            WorkbookError::Storage(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        tracing::debug!(plan = %plan, section = %section, "loaded section");
        Ok(Some(document))
    }

    fn save(&self, plan: &PlanId, section: SectionKey, document: &Value) -> WorkbookResult<()> {
        let path = self.section_path(plan, section);
        write_json_atomic(&path, document)?;
        tracing::debug!(plan = %plan, section = %section, "saved section");
        Ok(())
    }
}

// Write to a temp file in the target directory, then rename over the target.
// The temp file is deleted on drop if any step fails before `persist`.
fn write_json_atomic(path: &Path, document: &Value) -> WorkbookResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| {
        WorkbookError::Storage(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| WorkbookError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(temp.as_file_mut());
    serde_json::to_writer_pretty(&mut writer, document)
        .map_err(|e| WorkbookError::Storage(format!("Failed to serialize section: {}", e)))?;
    writer
        .flush()
        .map_err(|e| WorkbookError::Storage(format!("Failed to flush section: {}", e)))?;
    drop(writer);

    temp.as_file()
        .sync_all()
        .map_err(|e| WorkbookError::Storage(format!("Failed to sync section: {}", e)))?;

    temp.persist(path).map_err(|e| {
        WorkbookError::Storage(format!("Failed to replace {}: {}", path.display(), e))
    })?;
    Ok(())
}
