//! Descriptor types accumulated while documents are parsed.
//!
//! Descriptors are plain data: all relations between them live in the
//! registries owned by one `NetworkBuilder`, never in shared state.

use std::fmt;

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Parses the document-format spelling (`"Input"` / `"Output"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Input" => Some(Direction::Input),
            "Output" => Some(Direction::Output),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("Input"),
            Direction::Output => f.write_str("Output"),
        }
    }
}

/// A module: composite (has sub-modules) or leaf (grounded to an
/// implementation). The super/sub relation is kept in the
/// `HierarchyRegistry`, keyed by this descriptor's qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Qualified name; unique key across all loaded documents.
    pub name: String,
    /// Locally declared port names, in declaration order, deduplicated.
    pub ports: Vec<String>,
    /// External implementation reference; empty means composite.
    pub impl_class: String,
}

/// A port on a module. The qualified name is `<module>.<local>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Qualified port name.
    pub name: String,
    /// Qualified name of the owning module.
    pub module: String,
    pub direction: Direction,
    /// Declared width. Stays `None` until some declaration carries a
    /// Shape; validation rejects ports still untyped at that point.
    pub width: Option<u32>,
}

impl PortDescriptor {
    /// The local port name, without the owning module's prefix.
    pub fn local(&self) -> &str {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or(self.name.as_str())
    }
}

/// A connection after namespace qualification: one `(from, to)` pair of
/// qualified port names, keyed by the connection name. Redeclarations
/// under the same name are fragments of the same pairing and must agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub name: String,
    /// Qualified source port.
    pub from_port: String,
    /// Qualified destination port.
    pub to_port: String,
}
