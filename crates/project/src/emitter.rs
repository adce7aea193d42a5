use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::model::ProjectModel;
use crate::pbxproj::{self, RenderError};
use crate::util::write_atomic;

/// Outcome of a successful emission.
/// 成功輸出後的結果摘要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitReport {
    pub path: PathBuf,
    pub bytes: usize,
    /// `false` when the file on disk already held identical content.
    pub changed: bool,
}

/// Errors emitted by [`DescriptorEmitter`].
/// [`DescriptorEmitter`] 可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Renders project models and atomically replaces the descriptor at `path`.
/// A failed write leaves any previous descriptor untouched.
/// 產生專案描述檔並以原子方式取代目標檔案；失敗時保留舊檔。
#[derive(Debug)]
pub struct DescriptorEmitter {
    path: PathBuf,
}

impl DescriptorEmitter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Emitter targeting `<project_dir>/<name>.xcodeproj/project.pbxproj`.
    pub fn for_model(model: &ProjectModel) -> Self {
        Self::new(model.pbxproj_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders `model` without touching the filesystem.
    pub fn render(&self, model: &ProjectModel) -> Result<String, EmitError> {
        Ok(pbxproj::render(model)?)
    }

    /// Renders and writes `model`, skipping the write when nothing changed.
    /// 產生並寫入描述檔；內容未變時略過寫入。
    pub fn emit(&self, model: &ProjectModel) -> Result<EmitReport, EmitError> {
        let contents = self.render(model)?;
        self.write(&contents)
    }

    /// Atomically replaces the descriptor with already rendered `contents`.
    pub fn write(&self, contents: &str) -> Result<EmitReport, EmitError> {
        let unchanged = fs::read(&self.path)
            .map(|existing| existing == contents.as_bytes())
            .unwrap_or(false);
        if unchanged {
            debug!(path = %self.path.display(), "descriptor already up to date");
        } else {
            write_atomic(&self.path, contents.as_bytes()).map_err(|source| EmitError::Write {
                path: self.path.clone(),
                source,
            })?;
            info!(path = %self.path.display(), bytes = contents.len(), "wrote project descriptor");
        }
        Ok(EmitReport {
            path: self.path.clone(),
            bytes: contents.len(),
            changed: !unchanged,
        })
    }
}
