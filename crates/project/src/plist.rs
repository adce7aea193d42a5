//! Writer for the OpenStep-style property lists Xcode stores in `project.pbxproj`.
//! 輸出 Xcode `project.pbxproj` 使用的 OpenStep 格式屬性清單。

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::ids::ObjectId;

/// A property-list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    /// Reference to another object, optionally annotated with a comment.
    Ref(ObjectId, Option<String>),
    Array(Vec<Value>),
    Dict(BTreeMap<String, Value>),
}

impl Value {
    pub fn reference(id: ObjectId, comment: impl Into<String>) -> Self {
        Value::Ref(id, Some(comment.into()))
    }

    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn dict<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Dict(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

/// One entry of the `objects` table.
/// `objects` 表中的單一物件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub isa: &'static str,
    pub comment: Option<String>,
    pub fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new(isa: &'static str) -> Self {
        Self {
            isa,
            comment: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// Object kinds Xcode writes on a single line.
const SINGLE_LINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Serializes an object table into a complete `project.pbxproj` document.
/// Sections are ordered by `isa`, objects within a section by identifier.
/// 將物件表序列化為完整的 `project.pbxproj` 內容。
pub fn write_document(
    objects: &BTreeMap<ObjectId, Object>,
    root: ObjectId,
    object_version: u32,
) -> String {
    let mut sections: BTreeMap<&str, Vec<(&ObjectId, &Object)>> = BTreeMap::new();
    for (id, object) in objects {
        sections.entry(object.isa).or_default().push((id, object));
    }

    let mut out = String::new();
    out.push_str("// !$*UTF8*$!\n{\n");
    out.push_str("\tarchiveVersion = 1;\n\tclasses = {\n\t};\n");
    let _ = writeln!(out, "\tobjectVersion = {object_version};");
    out.push_str("\tobjects = {\n");

    for (isa, entries) in &sections {
        let _ = writeln!(out, "\n/* Begin {isa} section */");
        let single_line = SINGLE_LINE_ISAS.contains(isa);
        for (id, object) in entries {
            out.push_str("\t\t");
            write_ref(&mut out, **id, object.comment.as_deref());
            out.push_str(" = ");
            write_object(&mut out, object, 2, single_line);
            out.push_str(";\n");
        }
        let _ = writeln!(out, "/* End {isa} section */");
    }

    out.push_str("\t};\n\trootObject = ");
    write_ref(&mut out, root, Some("Project object"));
    out.push_str(";\n}\n");
    out
}

fn write_object(out: &mut String, object: &Object, depth: usize, single_line: bool) {
    let isa = Value::String(object.isa.to_string());
    let entries = std::iter::once(("isa", &isa))
        .chain(object.fields.iter().map(|(key, value)| (key.as_str(), value)));
    write_entries(out, entries, depth, single_line);
}

fn write_entries<'a>(
    out: &mut String,
    entries: impl Iterator<Item = (&'a str, &'a Value)>,
    depth: usize,
    single_line: bool,
) {
    out.push('{');
    if !single_line {
        out.push('\n');
    }
    for (key, value) in entries {
        if !single_line {
            indent(out, depth + 1);
        }
        out.push_str(&quote(key));
        out.push_str(" = ");
        write_value(out, value, depth + 1, single_line);
        out.push(';');
        out.push(if single_line { ' ' } else { '\n' });
    }
    if !single_line {
        indent(out, depth);
    }
    out.push('}');
}

fn write_value(out: &mut String, value: &Value, depth: usize, single_line: bool) {
    match value {
        Value::String(text) => out.push_str(&quote(text)),
        Value::Ref(id, comment) => write_ref(out, *id, comment.as_deref()),
        Value::Array(items) => {
            out.push('(');
            if !single_line {
                out.push('\n');
            }
            for item in items {
                if !single_line {
                    indent(out, depth + 1);
                }
                write_value(out, item, depth + 1, single_line);
                out.push(',');
                out.push(if single_line { ' ' } else { '\n' });
            }
            if !single_line {
                indent(out, depth);
            }
            out.push(')');
        }
        Value::Dict(map) => write_entries(
            out,
            map.iter().map(|(key, value)| (key.as_str(), value)),
            depth,
            single_line,
        ),
    }
}

fn write_ref(out: &mut String, id: ObjectId, comment: Option<&str>) {
    let _ = write!(out, "{id}");
    if let Some(comment) = comment {
        let _ = write!(out, " /* {} */", comment.replace("*/", "* /"));
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

/// Quotes `text` unless it consists only of characters Xcode leaves bare.
/// 除非字串僅含允許的字元，否則加上引號並跳脫。
pub fn quote(text: &str) -> String {
    let bare = !text.is_empty()
        && !text.contains("//")
        && !text.contains("___")
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.'));
    if bare {
        return text.to_string();
    }

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                let _ = write!(quoted, "\\U{:04x}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_rules() {
        assert_eq!(quote("ContentView.swift"), "ContentView.swift");
        assert_eq!(quote("$(TARGET_NAME)"), "\"$(TARGET_NAME)\"");
        assert_eq!(quote("<group>"), "\"<group>\"");
        assert_eq!(quote("com.apple.product-type.application"), "\"com.apple.product-type.application\"");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("My App"), "\"My App\"");
        assert_eq!(quote("say \"hi\"\\"), "\"say \\\"hi\\\"\\\\\"");
        assert_eq!(quote("a\u{1}"), "\"a\\U0001\"");
    }

    #[test]
    fn writes_sections_in_isa_order() {
        let file_id = ObjectId::derive(&["file"]);
        let build_id = ObjectId::derive(&["build"]);
        let group_id = ObjectId::derive(&["group"]);
        let mut objects = BTreeMap::new();
        objects.insert(
            group_id,
            Object::new("PBXGroup")
                .field("children", Value::array([Value::reference(file_id, "App.swift")]))
                .field("sourceTree", "<group>"),
        );
        objects.insert(
            file_id,
            Object::new("PBXFileReference")
                .comment("App.swift")
                .field("path", "App.swift"),
        );
        objects.insert(
            build_id,
            Object::new("PBXBuildFile")
                .comment("App.swift in Sources")
                .field("fileRef", Value::reference(file_id, "App.swift")),
        );

        let text = write_document(&objects, group_id, 56);

        assert!(text.starts_with("// !$*UTF8*$!\n{\n\tarchiveVersion = 1;"));
        let build = text.find("Begin PBXBuildFile").unwrap();
        let file = text.find("Begin PBXFileReference").unwrap();
        let group = text.find("Begin PBXGroup").unwrap();
        assert!(build < file && file < group);
        assert!(text.contains(&format!(
            "\t\t{build_id} /* App.swift in Sources */ = {{isa = PBXBuildFile; fileRef = {file_id} /* App.swift */; }};\n"
        )));
        assert!(text.contains(&format!(
            "\t\t{group_id} = {{\n\t\t\tisa = PBXGroup;\n\t\t\tchildren = (\n\t\t\t\t{file_id} /* App.swift */,\n\t\t\t);\n\t\t\tsourceTree = \"<group>\";\n\t\t}};\n"
        )));
        assert!(text.ends_with(&format!("\trootObject = {group_id} /* Project object */;\n}}\n")));
    }

    #[test]
    fn nested_dicts_are_indented() {
        let id = ObjectId::derive(&["config"]);
        let mut objects = BTreeMap::new();
        objects.insert(
            id,
            Object::new("XCBuildConfiguration").field(
                "buildSettings",
                Value::dict([("SWIFT_VERSION", "5.0")]),
            ),
        );
        let text = write_document(&objects, id, 56);
        assert!(text.contains("\t\t\tbuildSettings = {\n\t\t\t\tSWIFT_VERSION = 5.0;\n\t\t\t};\n"));
    }
}
