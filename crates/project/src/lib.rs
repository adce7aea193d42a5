//! Scans Xcode app sources and regenerates `project.pbxproj` descriptors.
//! 掃描 Xcode 專案原始碼並重新產生 `project.pbxproj` 描述檔。

mod serde_path;
mod util;

pub mod emitter;
pub mod generate;
pub mod ids;
pub mod manifest;
pub mod model;
pub mod pbxproj;
pub mod plist;
pub mod scanner;

pub use emitter::{DescriptorEmitter, EmitError, EmitReport};
pub use generate::{
    build_model, generate_project, GenerateError, GenerateOptions, GenerateReport, TargetSummary,
};
pub use ids::ObjectId;
pub use manifest::{
    ManifestError, ManifestStore, ProjectManifest, TargetKind, TargetManifest, MANIFEST_FILE,
};
pub use model::{BuildTarget, ModelError, ProjectModel, ResourceList, SourceFileSet};
pub use pbxproj::{render, RenderError, OBJECT_VERSION};
pub use scanner::{scan, scan_files, ExtensionFilter, ScanError, ScanReport};
pub use util::write_atomic;
