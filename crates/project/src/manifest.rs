use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::scanner::ExtensionFilter;
use crate::serde_path;
use crate::util::write_atomic;

/// Conventional manifest file name looked up in the project root.
/// 專案根目錄中預設的設定檔名稱。
pub const MANIFEST_FILE: &str = "pbxgen.json";

/// Kind of product a target builds.
/// 目標產出的產品類型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    #[default]
    Application,
    AppExtension,
}

impl TargetKind {
    pub fn product_type(self) -> &'static str {
        match self {
            TargetKind::Application => "com.apple.product-type.application",
            TargetKind::AppExtension => "com.apple.product-type.app-extension",
        }
    }

    pub fn product_extension(self) -> &'static str {
        match self {
            TargetKind::Application => "app",
            TargetKind::AppExtension => "appex",
        }
    }

    pub fn explicit_file_type(self) -> &'static str {
        match self {
            TargetKind::Application => "wrapper.application",
            TargetKind::AppExtension => "wrapper.app-extension",
        }
    }
}

/// One build target as written in the manifest.
/// Relative `root` paths resolve against the manifest directory, relative
/// resources and `info_plist` against the target root.
/// 設定檔中的單一建置目標；相對路徑分別以設定檔目錄與目標根目錄為基準。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetManifest {
    pub name: String,
    #[serde(default)]
    pub kind: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_identifier: Option<String>,
    #[serde(with = "serde_path")]
    pub root: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: ExtensionFilter,
    #[serde(default, with = "serde_path::list")]
    pub resources: Vec<PathBuf>,
    #[serde(
        default,
        with = "serde_path::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub info_plist: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_settings: BTreeMap<String, String>,
}

impl TargetManifest {
    pub fn new(name: impl Into<String>, kind: TargetKind, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            bundle_identifier: None,
            root: root.into(),
            extensions: default_extensions(),
            resources: Vec::new(),
            info_plist: None,
            host: None,
            build_settings: BTreeMap::new(),
        }
    }

    pub fn with_resources<I, P>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }
}

/// Project-level configuration driving a generation run.
/// 驅動一次產生流程的專案設定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub name: String,
    pub bundle_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_team: Option<String>,
    #[serde(default = "default_deployment_target")]
    pub deployment_target: String,
    #[serde(default = "default_swift_version")]
    pub swift_version: String,
    /// Directory receiving `<name>.xcodeproj`; defaults to the manifest directory.
    #[serde(
        default,
        with = "serde_path::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub targets: Vec<TargetManifest>,
}

impl Default for ProjectManifest {
    /// The layout of the PoemForTheMoment app: one application plus its
    /// notification content extension.
    fn default() -> Self {
        let app = TargetManifest::new(
            "PoemForTheMoment",
            TargetKind::Application,
            "PoemForTheMoment",
        )
        .with_resources([
            "Resources/Assets.xcassets",
            "Resources/start.json",
            "Resources/poems.json",
            "Resources/LaunchScreen.storyboard",
        ]);
        let extension = TargetManifest::new(
            "NotificationContent",
            TargetKind::AppExtension,
            "NotificationContent",
        )
        .with_resources(["MainInterface.storyboard"]);

        Self {
            name: "PoemForTheMoment".to_string(),
            bundle_identifier: "com.emerald-lunar.PoemForTheMoment".to_string(),
            organization: None,
            development_team: None,
            deployment_target: default_deployment_target(),
            swift_version: default_swift_version(),
            output_dir: None,
            targets: vec![app, extension],
        }
    }
}

impl ProjectManifest {
    /// Checks the structural rules a manifest must satisfy before scanning.
    /// 在掃描前驗證設定檔結構。
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::EmptyName);
        }
        if self.targets.is_empty() {
            return Err(ManifestError::NoTargets);
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(ManifestError::EmptyTargetName);
            }
            if !seen.insert(target.name.as_str()) {
                return Err(ManifestError::DuplicateTarget(target.name.clone()));
            }
        }

        for target in &self.targets {
            let Some(host) = target.host.as_deref() else {
                continue;
            };
            if target.kind != TargetKind::AppExtension {
                return Err(ManifestError::HostOnApplication(target.name.clone()));
            }
            match self.targets.iter().find(|candidate| candidate.name == host) {
                Some(candidate) if candidate.kind == TargetKind::Application => {}
                Some(_) => {
                    return Err(ManifestError::HostNotApplication {
                        target: target.name.clone(),
                        host: host.to_string(),
                    })
                }
                None => {
                    return Err(ManifestError::UnknownHost {
                        target: target.name.clone(),
                        host: host.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Bundle identifier for `target`: its explicit value, the project identifier
    /// for applications, or `<project id>.<target name>` for extensions.
    /// 取得目標的 bundle identifier。
    pub fn bundle_identifier_for(&self, target: &TargetManifest) -> String {
        if let Some(explicit) = &target.bundle_identifier {
            return explicit.clone();
        }
        match target.kind {
            TargetKind::Application => self.bundle_identifier.clone(),
            TargetKind::AppExtension => format!("{}.{}", self.bundle_identifier, target.name),
        }
    }

    /// Name of the application embedding `target`, if it is an extension.
    /// 取得嵌入此擴充功能的應用程式目標名稱。
    pub fn host_for<'a>(&'a self, target: &'a TargetManifest) -> Option<&'a str> {
        if target.kind != TargetKind::AppExtension {
            return None;
        }
        target.host.as_deref().or_else(|| {
            self.targets
                .iter()
                .find(|candidate| candidate.kind == TargetKind::Application)
                .map(|candidate| candidate.name.as_str())
        })
    }
}

/// Errors raised while loading or validating a manifest.
/// 載入或驗證設定檔時的錯誤。
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid manifest payload: {0}")]
    Invalid(String),
    #[error("project name must not be empty")]
    EmptyName,
    #[error("manifest declares no targets")]
    NoTargets,
    #[error("target name must not be empty")]
    EmptyTargetName,
    #[error("target {0} is declared more than once")]
    DuplicateTarget(String),
    #[error("application target {0} cannot declare a host")]
    HostOnApplication(String),
    #[error("target {target} names unknown host {host}")]
    UnknownHost { target: String, host: String },
    #[error("target {target} names host {host}, which is not an application")]
    HostNotApplication { target: String, host: String },
}

/// Reads and writes manifests as pretty JSON with atomic replacement.
/// 以 JSON 搭配原子寫入方式讀寫設定檔。
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that relative manifest paths resolve against.
    /// 相對路徑的解析基準目錄。
    pub fn base_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Loads and validates the manifest, returning `Ok(None)` when the file is absent.
    /// 載入並驗證設定檔；若檔案不存在則回傳 `Ok(None)`。
    pub fn load(&self) -> Result<Option<ProjectManifest>, ManifestError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let manifest: ProjectManifest = serde_json::from_str(&contents)
                    .map_err(|err| ManifestError::Invalid(err.to_string()))?;
                manifest.validate()?;
                debug!(
                    path = %self.path.display(),
                    targets = manifest.targets.len(),
                    "loaded manifest"
                );
                Ok(Some(manifest))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ManifestError::Io(err)),
        }
    }

    pub fn save(&self, manifest: &ProjectManifest) -> Result<(), ManifestError> {
        manifest.validate()?;
        let mut payload = serde_json::to_vec_pretty(manifest)
            .map_err(|err| ManifestError::Invalid(err.to_string()))?;
        payload.push(b'\n');
        write_atomic(&self.path, &payload)?;
        Ok(())
    }
}

fn default_extensions() -> ExtensionFilter {
    ExtensionFilter::single("swift")
}

fn default_deployment_target() -> String {
    "17.0".to_string()
}

fn default_swift_version() -> String {
    "5.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_manifest_matches_poem_layout() {
        let manifest = ProjectManifest::default();
        manifest.validate().unwrap();
        assert_eq!(manifest.targets.len(), 2);

        let extension = &manifest.targets[1];
        assert_eq!(extension.kind, TargetKind::AppExtension);
        assert_eq!(
            manifest.bundle_identifier_for(extension),
            "com.emerald-lunar.PoemForTheMoment.NotificationContent"
        );
        assert_eq!(manifest.host_for(extension), Some("PoemForTheMoment"));
        assert_eq!(manifest.host_for(&manifest.targets[0]), None);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let manifest: ProjectManifest = serde_json::from_str(
            r#"{
                "name": "Demo",
                "bundle_identifier": "com.example.demo",
                "targets": [{ "name": "Demo", "root": "Demo" }]
            }"#,
        )
        .unwrap();

        let target = &manifest.targets[0];
        assert_eq!(target.kind, TargetKind::Application);
        assert_eq!(target.extensions, ExtensionFilter::single("swift"));
        assert!(target.resources.is_empty());
        assert_eq!(manifest.deployment_target, "17.0");
    }

    #[test]
    fn rejects_duplicate_targets() {
        let mut manifest = ProjectManifest::default();
        manifest.targets[1].name = manifest.targets[0].name.clone();
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::DuplicateTarget(name)) if name == "PoemForTheMoment"
        ));
    }

    #[test]
    fn rejects_bad_hosts() {
        let mut manifest = ProjectManifest::default();
        manifest.targets[1].host = Some("Missing".into());
        assert!(matches!(manifest.validate(), Err(ManifestError::UnknownHost { .. })));

        manifest.targets[1].host = Some("NotificationContent".into());
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::HostNotApplication { .. })
        ));

        manifest.targets[1].host = None;
        manifest.targets[0].host = Some("NotificationContent".into());
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::HostOnApplication(_))
        ));
    }

    #[test]
    fn store_saves_and_loads() {
        let dir = tempdir().unwrap();
        let store = ManifestStore::new(dir.path().join(MANIFEST_FILE));
        assert!(store.load().unwrap().is_none());

        let manifest = ProjectManifest::default();
        store.save(&manifest).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(store.base_dir(), dir.path());
    }

    #[test]
    fn store_reports_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        fs::write(&path, "{ not json").unwrap();
        let err = ManifestStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ManifestError::Invalid(_)));
    }
}
