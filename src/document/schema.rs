//! Serde model of the network-description document format.
//!
//! Every field is optional at the serde level: the format predates this
//! implementation and producers are sloppy, so "field missing" must be a
//! reportable condition with the offending section named, not a blanket
//! deserialization failure. Required-field enforcement lives in the loader
//! and the builder.

use serde::Deserialize;

/// One network-description document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(rename = "Header")]
    pub header: Option<Header>,
    #[serde(rename = "Modules")]
    pub modules: Option<Vec<ModuleDecl>>,
    #[serde(rename = "Ports")]
    pub ports: Option<Vec<PortDecl>>,
    #[serde(rename = "Connections")]
    pub connections: Option<Vec<ConnectionDecl>>,
}

/// Document header. `Name`, `Base` and `Type` are required by the loader.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    /// Base namespace used to qualify bare names declared in this document.
    #[serde(rename = "Base")]
    pub base: Option<String>,
    /// Document kind. `"C"` marks a component library in which every
    /// module must carry an `ImplClass`.
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
    /// Paths of documents to load first, in order. Relative paths resolve
    /// against this document's directory.
    #[serde(rename = "Import", default)]
    pub imports: Vec<String>,
}

/// A module declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleDecl {
    pub name: Option<String>,
    /// Local port names, or (v2 form) full inline port declarations with
    /// the module reference implied.
    #[serde(default)]
    pub ports: Vec<ModulePortDecl>,
    pub impl_class: Option<String>,
    pub super_module: Option<String>,
    #[serde(default)]
    pub sub_modules: Vec<String>,
    pub comment: Option<String>,
}

/// A module's inline port entry: either just a name, or a full declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModulePortDecl {
    Name(String),
    Full(PortDecl),
}

impl ModulePortDecl {
    /// The local port name this entry contributes to the module's port list.
    pub fn local_name(&self) -> Option<&str> {
        match self {
            ModulePortDecl::Name(name) => Some(name.trim()),
            ModulePortDecl::Full(decl) => decl.name.as_deref().map(str::trim),
        }
    }
}

/// A port declaration from the top-level `Ports` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortDecl {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Module")]
    pub module: Option<String>,
    /// `"Input"` or `"Output"`.
    #[serde(rename = "Type")]
    pub direction: Option<String>,
    /// Always a one-element array; the single entry is the port width.
    #[serde(rename = "Shape")]
    pub shape: Option<Vec<i64>>,
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
}

/// A connection declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectionDecl {
    pub name: Option<String>,
    pub from_module: Option<String>,
    pub from_port: Option<String>,
    pub to_module: Option<String>,
    pub to_port: Option<String>,
    pub comment: Option<String>,
}
