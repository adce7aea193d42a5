//! Builds the `project.pbxproj` object graph for a [`ProjectModel`].
//! 依 [`ProjectModel`] 建立 `project.pbxproj` 的物件圖。

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::ids::ObjectId;
use crate::manifest::TargetKind;
use crate::model::{BuildTarget, ModelError, ProjectModel};
use crate::plist::{self, Object, Value};

/// Archive object version written in the document header (Xcode 14 format).
pub const OBJECT_VERSION: u32 = 56;
const COMPATIBILITY_VERSION: &str = "Xcode 14.0";
const TOOLS_VERSION: &str = "1500";
const BUILD_ACTION_MASK: &str = "2147483647";
const EMBED_PHASE_NAME: &str = "Embed Foundation Extensions";
/// `dstSubfolderSpec` value for the PlugIns folder of an app bundle.
const PLUGINS_SUBFOLDER: &str = "13";
const CONFIGURATIONS: [&str; 2] = ["Debug", "Release"];

/// Errors raised while rendering a descriptor.
/// 產生描述檔內容時的錯誤。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("path {0} is not valid UTF-8 and cannot be written to a project file")]
    InvalidPath(PathBuf),
    #[error("path {0} contains `.` or `..` components")]
    UnresolvedPath(PathBuf),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Renders `model` into the text of a `project.pbxproj` file.
/// Identical models always produce identical text.
/// 將 `model` 轉為 `project.pbxproj` 文字；相同輸入必得相同輸出。
pub fn render(model: &ProjectModel) -> Result<String, RenderError> {
    model.validate_hosts()?;
    let mut builder = Builder::new(model);
    let root = builder.build()?;
    Ok(plist::write_document(&builder.objects, root, OBJECT_VERSION))
}

struct Builder<'a> {
    model: &'a ProjectModel,
    project_id: ObjectId,
    objects: BTreeMap<ObjectId, Object>,
}

/// Directory node used while laying out a target's group hierarchy.
#[derive(Default)]
struct GroupNode {
    groups: BTreeMap<String, GroupNode>,
    files: BTreeMap<String, ObjectId>,
}

impl<'a> Builder<'a> {
    fn new(model: &'a ProjectModel) -> Self {
        Self {
            model,
            project_id: ObjectId::derive(&["PBXProject", &model.name]),
            objects: BTreeMap::new(),
        }
    }

    /// Stores `object` under `id`. A file listed twice in a target yields the
    /// same object again; two different objects must never share an id.
    fn insert(&mut self, id: ObjectId, object: Object) {
        match self.objects.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(object);
            }
            Entry::Occupied(slot) => {
                debug_assert!(*slot.get() == object, "object id {id} derived for two objects");
            }
        }
    }

    fn build(&mut self) -> Result<ObjectId, RenderError> {
        let model = self.model;
        let mut target_groups = Vec::new();
        let mut products = Vec::new();
        let mut target_ids = Vec::new();

        for target in &model.targets {
            target_groups.push(self.target_group(target)?);
            products.push(Value::reference(
                product_ref_id(target),
                target.product_name(),
            ));
            self.insert(product_ref_id(target), product_reference(target));
        }
        for target in &model.targets {
            target_ids.push(self.native_target(target)?);
        }

        let products_group = ObjectId::derive(&["PBXGroup", "products"]);
        self.insert(
            products_group,
            Object::new("PBXGroup")
                .comment("Products")
                .field("children", Value::Array(products))
                .field("name", "Products")
                .field("sourceTree", "<group>"),
        );

        let main_group = ObjectId::derive(&["PBXGroup", "main"]);
        let mut children = target_groups;
        children.push(Value::reference(products_group, "Products"));
        self.insert(
            main_group,
            Object::new("PBXGroup")
                .field("children", Value::Array(children))
                .field("sourceTree", "<group>"),
        );

        let project_configs = self.configuration_list(
            &["project", &model.name],
            format!("PBXProject \"{}\"", model.name),
            |configuration| project_settings(model, configuration),
        );

        let mut attributes = BTreeMap::new();
        attributes.insert("BuildIndependentTargetsInParallel".to_string(), Value::from("1"));
        attributes.insert("LastSwiftUpdateCheck".to_string(), Value::from(TOOLS_VERSION));
        attributes.insert("LastUpgradeCheck".to_string(), Value::from(TOOLS_VERSION));
        if let Some(organization) = &model.organization {
            attributes.insert("ORGANIZATIONNAME".to_string(), Value::from(organization));
        }
        attributes.insert(
            "TargetAttributes".to_string(),
            Value::Dict(
                model
                    .targets
                    .iter()
                    .map(|target| {
                        (
                            native_target_id(target).to_string(),
                            Value::dict([("CreatedOnToolsVersion", "15.0")]),
                        )
                    })
                    .collect(),
            ),
        );

        let project_id = self.project_id;
        self.insert(
            project_id,
            Object::new("PBXProject")
                .comment("Project object")
                .field("attributes", Value::Dict(attributes))
                .field("buildConfigurationList", project_configs)
                .field("compatibilityVersion", COMPATIBILITY_VERSION)
                .field("developmentRegion", "en")
                .field("hasScannedForEncodings", "0")
                .field("knownRegions", Value::array(["en", "Base"]))
                .field("mainGroup", Value::Ref(main_group, None))
                .field("productRefGroup", Value::reference(products_group, "Products"))
                .field("projectDirPath", "")
                .field("projectRoot", "")
                .field("targets", Value::Array(target_ids)),
        );
        Ok(project_id)
    }

    /// Registers file references for every member of `target` and returns a
    /// reference to its top-level group.
    fn target_group(&mut self, target: &BuildTarget) -> Result<Value, RenderError> {
        let mut tree = GroupNode::default();
        let mut outside = Vec::new();

        let members = target
            .sources
            .iter()
            .chain(target.resources.iter())
            .chain(target.info_plist.iter());
        for member in members {
            let id = file_ref_id(target, member)?;
            if self.objects.contains_key(&id) {
                continue;
            }
            let name = file_name(member)?;
            let reference = Object::new("PBXFileReference")
                .comment(name.clone())
                .field("lastKnownFileType", file_type(member));
            if let Some(relative) = relative_to(member, &target.root)? {
                let mut node = &mut tree;
                let mut parts = relative;
                parts.pop();
                for component in parts {
                    node = node.groups.entry(component).or_default();
                }
                node.files.insert(name.clone(), id);
                self.insert(
                    id,
                    reference.field("path", name).field("sourceTree", "<group>"),
                );
                continue;
            }

            // Outside the target directory: anchor to the project when possible.
            outside.push(Value::reference(id, name.clone()));
            let reference = reference.field("name", name);
            let reference = match relative_to(member, &self.model.project_dir)? {
                Some(relative) => reference
                    .field("path", relative.join("/"))
                    .field("sourceTree", "SOURCE_ROOT"),
                None => reference
                    .field("path", path_string(member)?)
                    .field("sourceTree", "<absolute>"),
            };
            self.insert(id, reference);
        }
        let mut children = self.group_children(target, "", &tree);
        children.extend(outside);

        let id = ObjectId::derive(&["PBXGroup", "target", &target.name]);
        let mut group = Object::new("PBXGroup")
            .comment(target.name.clone())
            .field("children", Value::Array(children));
        match relative_to(&target.root, &self.model.project_dir)? {
            Some(parts) if parts.is_empty() => {
                group = group.field("name", &target.name).field("sourceTree", "<group>");
            }
            Some(parts) => {
                if parts.last() != Some(&target.name) {
                    group = group.field("name", &target.name);
                }
                group = group.field("path", parts.join("/")).field("sourceTree", "<group>");
            }
            None => {
                group = group
                    .field("name", &target.name)
                    .field("path", path_string(&target.root)?)
                    .field("sourceTree", "<absolute>");
            }
        }
        self.insert(id, group);
        Ok(Value::reference(id, target.name.clone()))
    }

    fn group_children(
        &mut self,
        target: &BuildTarget,
        prefix: &str,
        node: &GroupNode,
    ) -> Vec<Value> {
        let mut children = Vec::new();
        for (name, child) in &node.groups {
            let relative = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            let grandchildren = self.group_children(target, &relative, child);
            let id = ObjectId::derive(&["PBXGroup", "subgroup", &target.name, &relative]);
            self.insert(
                id,
                Object::new("PBXGroup")
                    .comment(name.clone())
                    .field("children", Value::Array(grandchildren))
                    .field("path", name)
                    .field("sourceTree", "<group>"),
            );
            children.push(Value::reference(id, name.clone()));
        }
        for (name, id) in &node.files {
            children.push(Value::reference(*id, name.clone()));
        }
        children
    }

    fn native_target(&mut self, target: &BuildTarget) -> Result<Value, RenderError> {
        let model = self.model;
        let id = native_target_id(target);
        let sources = target.sources.iter();
        let resources = target.resources.iter();
        let mut phases = vec![
            self.file_phase(target, "PBXSourcesBuildPhase", "Sources", sources)?,
            self.file_phase(target, "PBXFrameworksBuildPhase", "Frameworks", std::iter::empty())?,
            self.file_phase(target, "PBXResourcesBuildPhase", "Resources", resources)?,
        ];

        let embedded: Vec<&BuildTarget> = model.embedded_in(&target.name).collect();
        let mut dependencies = Vec::new();
        if target.kind == TargetKind::Application && !embedded.is_empty() {
            phases.push(self.embed_phase(target, &embedded));
            for extension in &embedded {
                dependencies.push(self.dependency(target, extension));
            }
        }

        let info_plist = match target.info_plist.as_deref() {
            Some(path) => Some(match relative_to(path, &model.project_dir)? {
                Some(parts) => parts.join("/"),
                None => path_string(path)?,
            }),
            None => None,
        };
        let configs = self.configuration_list(
            &["target", &target.name],
            format!("PBXNativeTarget \"{}\"", target.name),
            |configuration| target_settings(model, target, info_plist.as_deref(), configuration),
        );
        self.insert(
            id,
            Object::new("PBXNativeTarget")
                .comment(target.name.clone())
                .field("buildConfigurationList", configs)
                .field("buildPhases", Value::Array(phases))
                .field("buildRules", Value::Array(Vec::new()))
                .field("dependencies", Value::Array(dependencies))
                .field("name", &target.name)
                .field("productName", &target.name)
                .field(
                    "productReference",
                    Value::reference(product_ref_id(target), target.product_name()),
                )
                .field("productType", target.kind.product_type()),
        );
        Ok(Value::reference(id, target.name.clone()))
    }

    fn file_phase<'p>(
        &mut self,
        target: &BuildTarget,
        isa: &'static str,
        phase: &str,
        files: impl Iterator<Item = &'p PathBuf>,
    ) -> Result<Value, RenderError> {
        let mut entries = Vec::new();
        for path in files {
            let key = path_string(path)?;
            let name = file_name(path)?;
            let file_ref = file_ref_id(target, path)?;
            let build_id = ObjectId::derive(&["PBXBuildFile", &target.name, phase, &key]);
            let comment = format!("{name} in {phase}");
            self.insert(
                build_id,
                Object::new("PBXBuildFile")
                    .comment(comment.clone())
                    .field("fileRef", Value::reference(file_ref, name)),
            );
            entries.push(Value::reference(build_id, comment));
        }

        let id = ObjectId::derive(&[isa, &target.name]);
        self.insert(
            id,
            Object::new(isa)
                .comment(phase)
                .field("buildActionMask", BUILD_ACTION_MASK)
                .field("files", Value::Array(entries))
                .field("runOnlyForDeploymentPostprocessing", "0"),
        );
        Ok(Value::reference(id, phase))
    }

    fn embed_phase(&mut self, host: &BuildTarget, extensions: &[&BuildTarget]) -> Value {
        let mut entries = Vec::new();
        for extension in extensions {
            let product = extension.product_name();
            let build_id = ObjectId::derive(&[
                "PBXBuildFile",
                &host.name,
                EMBED_PHASE_NAME,
                &extension.name,
            ]);
            let comment = format!("{product} in {EMBED_PHASE_NAME}");
            self.insert(
                build_id,
                Object::new("PBXBuildFile")
                    .comment(comment.clone())
                    .field("fileRef", Value::reference(product_ref_id(extension), product))
                    .field(
                        "settings",
                        Value::dict([("ATTRIBUTES", Value::array(["RemoveHeadersOnCopy"]))]),
                    ),
            );
            entries.push(Value::reference(build_id, comment));
        }

        let id = ObjectId::derive(&["PBXCopyFilesBuildPhase", &host.name, EMBED_PHASE_NAME]);
        self.insert(
            id,
            Object::new("PBXCopyFilesBuildPhase")
                .comment(EMBED_PHASE_NAME)
                .field("buildActionMask", BUILD_ACTION_MASK)
                .field("dstPath", "")
                .field("dstSubfolderSpec", PLUGINS_SUBFOLDER)
                .field("files", Value::Array(entries))
                .field("name", EMBED_PHASE_NAME)
                .field("runOnlyForDeploymentPostprocessing", "0"),
        );
        Value::reference(id, EMBED_PHASE_NAME)
    }

    fn dependency(&mut self, host: &BuildTarget, extension: &BuildTarget) -> Value {
        let proxy = ObjectId::derive(&["PBXContainerItemProxy", &host.name, &extension.name]);
        self.insert(
            proxy,
            Object::new("PBXContainerItemProxy")
                .comment("PBXContainerItemProxy")
                .field("containerPortal", Value::reference(self.project_id, "Project object"))
                .field("proxyType", "1")
                .field("remoteGlobalIDString", native_target_id(extension).to_string())
                .field("remoteInfo", &extension.name),
        );

        let id = ObjectId::derive(&["PBXTargetDependency", &host.name, &extension.name]);
        self.insert(
            id,
            Object::new("PBXTargetDependency")
                .comment("PBXTargetDependency")
                .field(
                    "target",
                    Value::reference(native_target_id(extension), extension.name.clone()),
                )
                .field("targetProxy", Value::reference(proxy, "PBXContainerItemProxy")),
        );
        Value::reference(id, "PBXTargetDependency")
    }

    fn configuration_list(
        &mut self,
        scope: &[&str],
        owner: String,
        settings: impl Fn(&str) -> BTreeMap<String, Value>,
    ) -> Value {
        let mut configs = Vec::new();
        for configuration in CONFIGURATIONS {
            let mut key = vec!["XCBuildConfiguration"];
            key.extend_from_slice(scope);
            key.push(configuration);
            let id = ObjectId::derive(&key);
            self.insert(
                id,
                Object::new("XCBuildConfiguration")
                    .comment(configuration)
                    .field("buildSettings", Value::Dict(settings(configuration)))
                    .field("name", configuration),
            );
            configs.push(Value::reference(id, configuration));
        }

        let mut key = vec!["XCConfigurationList"];
        key.extend_from_slice(scope);
        let id = ObjectId::derive(&key);
        let comment = format!("Build configuration list for {owner}");
        self.insert(
            id,
            Object::new("XCConfigurationList")
                .comment(comment.clone())
                .field("buildConfigurations", Value::Array(configs))
                .field("defaultConfigurationIsVisible", "0")
                .field("defaultConfigurationName", "Release"),
        );
        Value::reference(id, comment)
    }
}

fn native_target_id(target: &BuildTarget) -> ObjectId {
    ObjectId::derive(&["PBXNativeTarget", &target.name])
}

fn product_ref_id(target: &BuildTarget) -> ObjectId {
    ObjectId::derive(&["PBXFileReference", "product", &target.name])
}

fn file_ref_id(target: &BuildTarget, path: &Path) -> Result<ObjectId, RenderError> {
    let key = path_string(path)?;
    Ok(ObjectId::derive(&["PBXFileReference", "member", &target.name, &key]))
}

fn product_reference(target: &BuildTarget) -> Object {
    Object::new("PBXFileReference")
        .comment(target.product_name())
        .field("explicitFileType", target.kind.explicit_file_type())
        .field("includeInIndex", "0")
        .field("path", target.product_name())
        .field("sourceTree", "BUILT_PRODUCTS_DIR")
}

fn project_settings(model: &ProjectModel, configuration: &str) -> BTreeMap<String, Value> {
    let mut settings: BTreeMap<String, Value> = [
        ("ALWAYS_SEARCH_USER_PATHS", "NO"),
        ("CLANG_ENABLE_MODULES", "YES"),
        ("CLANG_ENABLE_OBJC_ARC", "YES"),
        ("COPY_PHASE_STRIP", "NO"),
        ("ENABLE_STRICT_OBJC_MSGSEND", "YES"),
        ("GCC_C_LANGUAGE_STANDARD", "gnu17"),
        ("SDKROOT", "iphoneos"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), Value::from(value)))
    .collect();
    settings.insert(
        "IPHONEOS_DEPLOYMENT_TARGET".to_string(),
        Value::from(&model.deployment_target),
    );

    let specific: &[(&str, &str)] = if configuration == "Debug" {
        &[
            ("DEBUG_INFORMATION_FORMAT", "dwarf"),
            ("ENABLE_TESTABILITY", "YES"),
            ("GCC_OPTIMIZATION_LEVEL", "0"),
            ("ONLY_ACTIVE_ARCH", "YES"),
            ("SWIFT_ACTIVE_COMPILATION_CONDITIONS", "DEBUG $(inherited)"),
            ("SWIFT_OPTIMIZATION_LEVEL", "-Onone"),
        ]
    } else {
        &[
            ("DEBUG_INFORMATION_FORMAT", "dwarf-with-dsym"),
            ("ENABLE_NS_ASSERTIONS", "NO"),
            ("SWIFT_COMPILATION_MODE", "wholemodule"),
            ("VALIDATE_PRODUCT", "YES"),
        ]
    };
    for (key, value) in specific {
        settings.insert(key.to_string(), Value::from(*value));
    }
    settings
}

fn target_settings(
    model: &ProjectModel,
    target: &BuildTarget,
    info_plist: Option<&str>,
    _configuration: &str,
) -> BTreeMap<String, Value> {
    let mut settings: BTreeMap<String, Value> = [
        ("CODE_SIGN_STYLE", "Automatic"),
        ("CURRENT_PROJECT_VERSION", "1"),
        ("MARKETING_VERSION", "1.0"),
        ("PRODUCT_NAME", "$(TARGET_NAME)"),
        ("SWIFT_EMIT_LOC_STRINGS", "YES"),
        ("TARGETED_DEVICE_FAMILY", "1,2"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), Value::from(value)))
    .collect();
    settings.insert(
        "PRODUCT_BUNDLE_IDENTIFIER".to_string(),
        Value::from(&target.bundle_identifier),
    );
    settings.insert("SWIFT_VERSION".to_string(), Value::from(&model.swift_version));
    if let Some(team) = &model.development_team {
        settings.insert("DEVELOPMENT_TEAM".to_string(), Value::from(team));
    }

    match info_plist {
        Some(info_plist) => {
            settings.insert("INFOPLIST_FILE".to_string(), Value::from(info_plist));
        }
        None => {
            settings.insert("GENERATE_INFOPLIST_FILE".to_string(), Value::from("YES"));
        }
    }

    match target.kind {
        TargetKind::Application => {
            settings.insert(
                "ASSETCATALOG_COMPILER_APPICON_NAME".to_string(),
                Value::from("AppIcon"),
            );
            settings.insert(
                "ASSETCATALOG_COMPILER_GLOBAL_ACCENT_COLOR_NAME".to_string(),
                Value::from("AccentColor"),
            );
            settings.insert(
                "LD_RUNPATH_SEARCH_PATHS".to_string(),
                Value::array(["$(inherited)", "@executable_path/Frameworks"]),
            );
            let launch_screen = target
                .resources
                .iter()
                .filter_map(|path| path.file_name()?.to_str())
                .filter_map(|name| name.strip_suffix(".storyboard"))
                .find(|stem| stem.starts_with("Launch"));
            if let Some(stem) = launch_screen {
                settings.insert(
                    "INFOPLIST_KEY_UILaunchStoryboardName".to_string(),
                    Value::from(stem),
                );
            }
        }
        TargetKind::AppExtension => {
            settings.insert("SKIP_INSTALL".to_string(), Value::from("YES"));
            settings.insert(
                "LD_RUNPATH_SEARCH_PATHS".to_string(),
                Value::array([
                    "$(inherited)",
                    "@executable_path/Frameworks",
                    "@executable_path/../../Frameworks",
                ]),
            );
        }
    }

    for (key, value) in &target.build_settings {
        settings.insert(key.clone(), Value::from(value));
    }
    settings
}

/// Xcode file type for `path`, keyed on its extension.
/// 依副檔名判斷 Xcode 檔案類型。
pub fn file_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match extension {
        "swift" => "sourcecode.swift",
        "m" => "sourcecode.c.objc",
        "mm" => "sourcecode.cpp.objcpp",
        "h" => "sourcecode.c.h",
        "c" => "sourcecode.c.c",
        "cpp" | "cc" => "sourcecode.cpp.cpp",
        "metal" => "sourcecode.metal",
        "json" => "text.json",
        "plist" => "text.plist.xml",
        "strings" => "text.plist.strings",
        "xcstrings" => "text.json.xcstrings",
        "storyboard" => "file.storyboard",
        "xib" => "file.xib",
        "xcassets" => "folder.assetcatalog",
        "entitlements" => "text.plist.entitlements",
        "png" => "image.png",
        "jpg" | "jpeg" => "image.jpeg",
        "txt" | "md" => "text",
        _ => "file",
    }
}

fn path_string(path: &Path) -> Result<String, RenderError> {
    path.to_str()
        .map(|text| text.replace('\\', "/"))
        .ok_or_else(|| RenderError::InvalidPath(path.to_path_buf()))
}

fn file_name(path: &Path) -> Result<String, RenderError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| RenderError::InvalidPath(path.to_path_buf()))
}

/// Components of `path` below `base`, or `None` when `path` lies elsewhere.
/// An empty list means `path` is `base` itself.
fn relative_to(path: &Path, base: &Path) -> Result<Option<Vec<String>>, RenderError> {
    match path.strip_prefix(base) {
        Ok(relative) => components(relative).map(Some),
        Err(_) => Ok(None),
    }
}

/// UTF-8 names of the components of a relative path; `.` and `..` are rejected.
fn components(path: &Path) -> Result<Vec<String>, RenderError> {
    path.components()
        .map(|component| match component {
            Component::Normal(part) => part
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| RenderError::InvalidPath(path.to_path_buf())),
            _ => Err(RenderError::UnresolvedPath(path.to_path_buf())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BuildTarget;

    fn sample_model() -> ProjectModel {
        let mut model = ProjectModel::new("Poem", "/work");
        let mut app = BuildTarget::new("Poem", TargetKind::Application, "com.example.poem", "/work/Poem");
        app.sources.insert("/work/Poem/App.swift");
        app.sources.insert("/work/Poem/Views/ContentView.swift");
        app.resources.push("/work/Poem/Resources/poems.json");
        app.resources.push("/work/Poem/Resources/LaunchScreen.storyboard");
        let mut ext = BuildTarget::new(
            "Notify",
            TargetKind::AppExtension,
            "com.example.poem.Notify",
            "/work/Notify",
        );
        ext.sources.insert("/work/Notify/NotificationViewController.swift");
        ext.host = Some("Poem".into());
        model.add_target(app).unwrap();
        model.add_target(ext).unwrap();
        model
    }

    #[test]
    fn render_is_deterministic() {
        let model = sample_model();
        assert_eq!(render(&model).unwrap(), render(&model).unwrap());
    }

    #[test]
    fn every_source_and_resource_is_built_once() {
        let text = render(&sample_model()).unwrap();
        for name in ["App.swift", "ContentView.swift", "NotificationViewController.swift"] {
            assert_eq!(text.matches(&format!("/* {name} in Sources */ = {{")).count(), 1, "{name}");
        }
        for name in ["poems.json", "LaunchScreen.storyboard"] {
            assert_eq!(text.matches(&format!("/* {name} in Resources */ = {{")).count(), 1, "{name}");
        }
    }

    #[test]
    fn groups_mirror_directories() {
        let text = render(&sample_model()).unwrap();
        assert!(text.contains("path = Views;"));
        assert!(text.contains("path = Resources;"));
        assert!(text.contains("path = Poem;"));
        assert!(text.contains("lastKnownFileType = sourcecode.swift; path = App.swift; sourceTree = \"<group>\";"));
    }

    #[test]
    fn host_embeds_extension() {
        let text = render(&sample_model()).unwrap();
        assert!(text.contains("/* Notify.appex in Embed Foundation Extensions */ = {isa = PBXBuildFile;"));
        assert!(text.contains("dstSubfolderSpec = 13;"));
        assert!(text.contains("remoteInfo = Notify;"));
        assert!(text.contains("productType = \"com.apple.product-type.app-extension\";"));
        assert!(text.contains("INFOPLIST_KEY_UILaunchStoryboardName = LaunchScreen;"));
        assert!(text.contains("PRODUCT_BUNDLE_IDENTIFIER = com.example.poem.Notify;"));
    }

    #[test]
    fn files_outside_root_use_absolute_paths() {
        let mut model = ProjectModel::new("Poem", "/work");
        let mut app = BuildTarget::new("Poem", TargetKind::Application, "com.example.poem", "/work/Poem");
        app.resources.push("/shared/Assets.xcassets");
        model.add_target(app).unwrap();

        let text = render(&model).unwrap();
        assert!(text.contains(
            "lastKnownFileType = folder.assetcatalog; name = Assets.xcassets; path = /shared/Assets.xcassets; sourceTree = \"<absolute>\";"
        ));
    }

    #[test]
    fn files_under_project_but_outside_root_are_project_relative() {
        let mut model = ProjectModel::new("Poem", "/work");
        let mut app = BuildTarget::new("Poem", TargetKind::Application, "com.example.poem", "/work/Poem");
        app.resources.push("/work/Shared/poems.json");
        app.info_plist = Some("/work/Shared/Info.plist".into());
        model.add_target(app).unwrap();

        let text = render(&model).unwrap();
        assert!(text.contains(
            "lastKnownFileType = text.json; name = poems.json; path = Shared/poems.json; sourceTree = SOURCE_ROOT;"
        ));
        assert!(text.contains("INFOPLIST_FILE = Shared/Info.plist;"));
        assert!(!text.contains("/work/Shared"));
    }

    #[test]
    fn parent_components_in_member_paths_are_rejected() {
        let mut model = ProjectModel::new("Poem", "/work");
        let mut app = BuildTarget::new("Poem", TargetKind::Application, "com.example.poem", "/work/Poem");
        app.resources.push("/work/Poem/../Shared/poems.json");
        model.add_target(app).unwrap();

        assert!(matches!(render(&model), Err(RenderError::UnresolvedPath(_))));
    }

    #[test]
    fn group_ids_stay_distinct_for_colliding_names() {
        let mut model = ProjectModel::new("Demo", "/work");
        let mut target = BuildTarget::new(
            "mainGroup",
            TargetKind::Application,
            "com.example.demo",
            "/work/mainGroup",
        );
        target.sources.insert("/work/mainGroup/Demo/App.swift");
        model.add_target(target).unwrap();

        let text = render(&model).unwrap();
        // Main group, Products, the target group and its `Demo` subgroup.
        assert_eq!(text.matches("isa = PBXGroup;").count(), 4);
        assert!(text.contains("path = Demo;"));
    }

    #[test]
    fn unknown_host_is_rejected() {
        let mut model = sample_model();
        model.targets[1].host = Some("Nope".into());
        assert!(matches!(render(&model), Err(RenderError::Model(ModelError::UnknownHost { .. }))));
    }

    #[test]
    fn file_types() {
        assert_eq!(file_type(Path::new("a/Main.storyboard")), "file.storyboard");
        assert_eq!(file_type(Path::new("Assets.xcassets")), "folder.assetcatalog");
        assert_eq!(file_type(Path::new("LICENSE")), "file");
    }
}
