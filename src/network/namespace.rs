//! Base-namespace qualification of bare names.

/// Qualifies `name` with `base` unless it already carries a namespace.
///
/// A bare name (no `.`) is prefixed with the current document's base
/// namespace; a dotted name is taken verbatim. Cross-document references
/// must therefore always be written fully qualified.
pub fn qualify(base: &str, name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::qualify;
    use rstest::rstest;

    #[rstest]
    #[case("org.example", "V1", "org.example.V1")]
    #[case("org.example", "other.ns.V1", "other.ns.V1")]
    #[case("org.example", "a.b", "a.b")]
    #[case("base", "M", "base.M")]
    fn qualification(#[case] base: &str, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(qualify(base, name), expected);
    }
}
