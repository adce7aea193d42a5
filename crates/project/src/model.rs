//! In-memory project description handed from the scanner to the emitter.
//! 掃描器交給輸出器的專案資料模型。

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::manifest::TargetKind;

/// Absolute source paths owned by one target, kept sorted and unique.
/// 單一目標擁有的原始碼路徑（排序且不重複）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFileSet(BTreeSet<PathBuf>);

impl SourceFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a path, returning `false` when it was already present.
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        self.0.insert(path.into())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.0.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathBuf> for SourceFileSet {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Resource paths in declaration order; repeated entries are dropped.
/// 依宣告順序保存的資源路徑；重複項目會被忽略。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceList(Vec<PathBuf>);

impl ResourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.0.contains(&path) {
            return false;
        }
        self.0.push(path);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathBuf> for ResourceList {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        let mut list = Self::new();
        for path in iter {
            list.push(path);
        }
        list
    }
}

/// A fully resolved build target.
/// 已解析完成的建置目標。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub name: String,
    pub kind: TargetKind,
    pub bundle_identifier: String,
    pub root: PathBuf,
    pub sources: SourceFileSet,
    pub resources: ResourceList,
    pub info_plist: Option<PathBuf>,
    /// Application embedding this target (extensions only).
    pub host: Option<String>,
    pub build_settings: BTreeMap<String, String>,
}

impl BuildTarget {
    pub fn new(
        name: impl Into<String>,
        kind: TargetKind,
        bundle_identifier: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            bundle_identifier: bundle_identifier.into(),
            root: root.into(),
            sources: SourceFileSet::new(),
            resources: ResourceList::new(),
            info_plist: None,
            host: None,
            build_settings: BTreeMap::new(),
        }
    }

    /// File name of the built product (`Name.app`, `Name.appex`).
    pub fn product_name(&self) -> String {
        format!("{}.{}", self.name, self.kind.product_extension())
    }

    /// Fails on the first resource that is not present on disk.
    /// 檢查所有資源是否存在。
    pub fn check_resources(&self) -> Result<(), ModelError> {
        match self.resources.iter().find(|path| !path.exists()) {
            Some(missing) => Err(ModelError::MissingResource {
                target: self.name.clone(),
                path: missing.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Everything needed to render one project descriptor.
/// 產生專案描述檔所需的完整資料。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectModel {
    pub name: String,
    pub organization: Option<String>,
    pub development_team: Option<String>,
    pub deployment_target: String,
    pub swift_version: String,
    /// Directory containing `<name>.xcodeproj`; relative paths are written against it.
    pub project_dir: PathBuf,
    pub targets: Vec<BuildTarget>,
}

impl ProjectModel {
    pub fn new(name: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            organization: None,
            development_team: None,
            deployment_target: "17.0".to_string(),
            swift_version: "5.0".to_string(),
            project_dir: project_dir.into(),
            targets: Vec::new(),
        }
    }

    /// Adds a target, refusing duplicate names and sources claimed by another target.
    /// 新增目標；拒絕重複名稱與已屬於其他目標的原始碼。
    pub fn add_target(&mut self, target: BuildTarget) -> Result<(), ModelError> {
        if self.target(&target.name).is_some() {
            return Err(ModelError::DuplicateTarget(target.name));
        }
        for existing in &self.targets {
            let shared = target
                .sources
                .iter()
                .find(|path| existing.sources.contains(path));
            if let Some(shared) = shared {
                return Err(ModelError::DuplicateSource {
                    path: shared.clone(),
                    first: existing.name.clone(),
                    second: target.name.clone(),
                });
            }
        }
        self.targets.push(target);
        Ok(())
    }

    pub fn target(&self, name: &str) -> Option<&BuildTarget> {
        self.targets.iter().find(|target| target.name == name)
    }

    /// Checks that every declared host names an application target.
    pub fn validate_hosts(&self) -> Result<(), ModelError> {
        for target in &self.targets {
            let Some(host) = target.host.as_deref() else {
                continue;
            };
            match self.target(host) {
                Some(candidate) if candidate.kind == TargetKind::Application => {}
                _ => {
                    return Err(ModelError::UnknownHost {
                        target: target.name.clone(),
                        host: host.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Extensions embedded by the application `host`, in declaration order.
    pub fn embedded_in<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a BuildTarget> + 'a {
        self.targets
            .iter()
            .filter(move |target| target.host.as_deref() == Some(host))
    }

    pub fn xcodeproj_dir(&self) -> PathBuf {
        self.project_dir.join(format!("{}.xcodeproj", self.name))
    }

    pub fn pbxproj_path(&self) -> PathBuf {
        self.xcodeproj_dir().join("project.pbxproj")
    }
}

/// Errors raised while assembling a [`ProjectModel`].
/// 組裝 [`ProjectModel`] 時的錯誤。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("target {0} is declared more than once")]
    DuplicateTarget(String),
    #[error("source {path} belongs to both {first} and {second}")]
    DuplicateSource {
        path: PathBuf,
        first: String,
        second: String,
    },
    #[error("resource {path} of target {target} does not exist")]
    MissingResource { target: String, path: PathBuf },
    #[error("target {target} is hosted by {host}, which is not an application target")]
    UnknownHost { target: String, host: String },
}
