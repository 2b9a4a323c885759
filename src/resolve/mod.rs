//! Hierarchy-aware connection resolution.
//!
//! Every declared connection is classified by the relative position of
//! its two endpoint modules in the containment tree, and becomes exactly
//! one of three wiring actions. Classification looks only at structure,
//! never at names.

pub mod link;

pub use link::{LinkTable, PortPair, ResolvedLink};

use thiserror::Error;

use crate::network::descriptor::{ConnectionDescriptor, Direction, PortDescriptor};
use crate::network::hierarchy::HierarchyRegistry;
use crate::network::ports::PortRegistry;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("connection `{connection}` references undefined port `{port}`")]
    UndefinedPort { connection: String, port: String },

    #[error(
        "connection `{connection}`: port dimension mismatch \
         (`{from_port}` is {from_width}, `{to_port}` is {to_width})"
    )]
    WidthMismatch {
        connection: String,
        from_port: String,
        from_width: u32,
        to_port: String,
        to_width: u32,
    },

    #[error(
        "connection `{connection}`: port `{port}` must be {expected} \
         for {relation} wiring, but it is {found}"
    )]
    DirectionMismatch {
        connection: String,
        port: String,
        expected: Direction,
        found: Direction,
        relation: &'static str,
    },

    #[error(
        "connection `{connection}` between `{from_module}` and `{to_module}` \
         spans a remote hierarchy level; expose ports one level at a time"
    )]
    RemoteLevel {
        connection: String,
        from_module: String,
        to_module: String,
    },

    #[error(
        "connection `{connection}` redeclared with different endpoints \
         (`{existing_from}` -> `{existing_to}` vs `{new_from}` -> `{new_to}`)"
    )]
    FragmentConflict {
        connection: String,
        existing_from: String,
        existing_to: String,
        new_from: String,
        new_to: String,
    },
}

/// Relative position of two modules in the containment tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `from` is the direct super-module of `to`.
    Inward,
    /// `to` is the direct super-module of `from`.
    Outward,
    /// Same level: both parentless, or both under the same direct parent.
    Peer,
    /// Any other relative position; wiring is only defined one level at
    /// a time, so these are rejected.
    Remote,
}

/// Classifies the `(from, to)` module pair. Total and deterministic.
pub fn relation_of(hierarchy: &HierarchyRegistry, from: &str, to: &str) -> Relation {
    if hierarchy.super_of(to) == Some(from) {
        Relation::Inward
    } else if hierarchy.super_of(from) == Some(to) {
        Relation::Outward
    } else if hierarchy.super_of(from) == hierarchy.super_of(to) {
        Relation::Peer
    } else {
        Relation::Remote
    }
}

/// Resolves one connection into a wiring action.
///
/// Both endpoint ports must already be registered. Direction rules per
/// classification: inward aliases run Input -> Input, outward aliases
/// Output -> Output, peer links Output -> Input. Widths must agree
/// whenever both are known; unknown widths are rejected by the port
/// checks that run before connection resolution.
pub fn resolve_connection(
    connection: &ConnectionDescriptor,
    hierarchy: &HierarchyRegistry,
    ports: &PortRegistry,
) -> Result<ResolvedLink, ConnectionError> {
    let from = lookup(ports, &connection.name, &connection.from_port)?;
    let to = lookup(ports, &connection.name, &connection.to_port)?;

    match relation_of(hierarchy, &from.module, &to.module) {
        Relation::Inward => {
            expect_direction(connection, from, Direction::Input, "inward alias")?;
            expect_direction(connection, to, Direction::Input, "inward alias")?;
            expect_width_match(connection, from, to)?;
            Ok(ResolvedLink::InwardAlias {
                super_module: from.module.clone(),
                super_port: from.local().to_string(),
                sub_module: to.module.clone(),
                sub_port: to.local().to_string(),
            })
        }
        Relation::Outward => {
            expect_direction(connection, from, Direction::Output, "outward alias")?;
            expect_direction(connection, to, Direction::Output, "outward alias")?;
            expect_width_match(connection, from, to)?;
            Ok(ResolvedLink::OutwardAlias {
                sub_module: from.module.clone(),
                sub_port: from.local().to_string(),
                super_module: to.module.clone(),
                super_port: to.local().to_string(),
            })
        }
        Relation::Peer => {
            expect_direction(connection, from, Direction::Output, "same-level")?;
            expect_direction(connection, to, Direction::Input, "same-level")?;
            expect_width_match(connection, from, to)?;
            Ok(ResolvedLink::Peer {
                from_module: from.module.clone(),
                from_port: from.local().to_string(),
                to_module: to.module.clone(),
                to_port: to.local().to_string(),
            })
        }
        Relation::Remote => Err(ConnectionError::RemoteLevel {
            connection: connection.name.clone(),
            from_module: from.module.clone(),
            to_module: to.module.clone(),
        }),
    }
}

fn lookup<'a>(
    ports: &'a PortRegistry,
    connection: &str,
    qualified: &str,
) -> Result<&'a PortDescriptor, ConnectionError> {
    ports.get(qualified).ok_or_else(|| ConnectionError::UndefinedPort {
        connection: connection.to_string(),
        port: qualified.to_string(),
    })
}

fn expect_direction(
    connection: &ConnectionDescriptor,
    port: &PortDescriptor,
    expected: Direction,
    relation: &'static str,
) -> Result<(), ConnectionError> {
    if port.direction == expected {
        Ok(())
    } else {
        Err(ConnectionError::DirectionMismatch {
            connection: connection.name.clone(),
            port: port.name.clone(),
            expected,
            found: port.direction,
            relation,
        })
    }
}

fn expect_width_match(
    connection: &ConnectionDescriptor,
    from: &PortDescriptor,
    to: &PortDescriptor,
) -> Result<(), ConnectionError> {
    if let (Some(from_width), Some(to_width)) = (from.width, to.width) {
        if from_width != to_width {
            return Err(ConnectionError::WidthMismatch {
                connection: connection.name.clone(),
                from_port: from.name.clone(),
                from_width,
                to_port: to.name.clone(),
                to_width,
            });
        }
    }
    Ok(())
}
