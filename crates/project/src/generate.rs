//! The scan-then-emit pipeline behind `pbxgen generate`.
//! `pbxgen generate` 背後的掃描與輸出流程。

use std::io;
use std::path::{self, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::emitter::{DescriptorEmitter, EmitError};
use crate::manifest::{ManifestError, ProjectManifest};
use crate::model::{BuildTarget, ModelError, ProjectModel, ResourceList, SourceFileSet};
use crate::scanner::{self, ScanError};
use crate::util::normalize;

/// Switches for one generation run.
/// 單次產生流程的選項。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Overrides the manifest's `output_dir`.
    pub output_dir: Option<PathBuf>,
    /// Render only; nothing is written.
    pub dry_run: bool,
}

/// Per-target counts reported after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSummary {
    pub name: String,
    pub sources: usize,
    pub resources: usize,
}

/// Result of [`generate_project`].
/// [`generate_project`] 的結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub pbxproj: PathBuf,
    pub targets: Vec<TargetSummary>,
    /// True when the descriptor on disk was replaced.
    pub written: bool,
    pub contents: String,
}

/// Errors surfaced by the generation pipeline.
/// 產生流程可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot resolve {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("scanning target {target} failed: {source}")]
    Scan {
        target: String,
        #[source]
        source: ScanError,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Scans every target root of `manifest` and assembles the project model.
/// Relative paths resolve against `base_dir`.
/// 掃描設定檔中所有目標並組裝專案模型。
pub fn build_model(
    manifest: &ProjectManifest,
    base_dir: &Path,
    output_dir: Option<&Path>,
) -> Result<ProjectModel, GenerateError> {
    manifest.validate()?;
    let base_dir = absolute(base_dir)?;
    let project_dir = match output_dir.or(manifest.output_dir.as_deref()) {
        Some(dir) => absolute(&base_dir.join(dir))?,
        None => base_dir.clone(),
    };

    let mut model = ProjectModel::new(&manifest.name, project_dir);
    model.organization = manifest.organization.clone();
    model.development_team = manifest.development_team.clone();
    model.deployment_target = manifest.deployment_target.clone();
    model.swift_version = manifest.swift_version.clone();

    for entry in &manifest.targets {
        let root = absolute(&base_dir.join(&entry.root))?;
        let sources: SourceFileSet = scanner::scan_files(&root, &entry.extensions)
            .map_err(|source| GenerateError::Scan {
                target: entry.name.clone(),
                source,
            })?
            .into_iter()
            .collect();
        let resources: ResourceList = entry
            .resources
            .iter()
            .map(|path| normalize(&root.join(path)))
            .collect();
        debug!(
            target = %entry.name,
            sources = sources.len(),
            resources = resources.len(),
            "resolved target"
        );

        let mut target = BuildTarget::new(
            &entry.name,
            entry.kind,
            manifest.bundle_identifier_for(entry),
            root.clone(),
        );
        target.sources = sources;
        target.resources = resources;
        target.info_plist = entry.info_plist.as_ref().map(|path| normalize(&root.join(path)));
        target.host = manifest.host_for(entry).map(str::to_string);
        target.build_settings = entry.build_settings.clone();
        target.check_resources()?;
        model.add_target(target)?;
    }
    model.validate_hosts()?;
    Ok(model)
}

/// Runs the full pipeline: scan, assemble, render and (unless dry-run) write.
/// 執行完整流程：掃描、組裝、產生並寫入（dry-run 時不寫入）。
pub fn generate_project(
    manifest: &ProjectManifest,
    base_dir: &Path,
    options: &GenerateOptions,
) -> Result<GenerateReport, GenerateError> {
    let model = build_model(manifest, base_dir, options.output_dir.as_deref())?;
    let emitter = DescriptorEmitter::for_model(&model);
    let targets = model
        .targets
        .iter()
        .map(|target| TargetSummary {
            name: target.name.clone(),
            sources: target.sources.len(),
            resources: target.resources.len(),
        })
        .collect();

    let contents = emitter.render(&model)?;
    let written = if options.dry_run {
        false
    } else {
        emitter.write(&contents)?.changed
    };
    info!(
        project = %model.name,
        path = %emitter.path().display(),
        written,
        "generation finished"
    );

    Ok(GenerateReport {
        pbxproj: emitter.path().to_path_buf(),
        targets,
        written,
        contents,
    })
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
fn absolute(path: &Path) -> Result<PathBuf, GenerateError> {
    path::absolute(path)
        .map(|path| normalize(&path))
        .map_err(|source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        })
}
