// Node name checks for the selectors that key a parameter file.

/// Errors reported by the name validators.
///
/// Every variant carries the byte index in the checked string at which the
/// problem was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty
    Empty,
    /// Namespace is not absolute
    NotAbsolute,
    /// Two separators in a row
    RepeatedSlash(usize),
    /// Separator at the end of a non-root namespace
    EndsWithSlash(usize),
    /// Character outside `[A-Za-z0-9_]`
    InvalidCharacter(usize, char),
    /// Component that begins with a digit
    StartsWithNumber(usize),
}

impl NameError {
    /// Byte index of the offending character, if there is one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Empty | Self::NotAbsolute => None,
            Self::RepeatedSlash(i)
            | Self::EndsWithSlash(i)
            | Self::InvalidCharacter(i, _)
            | Self::StartsWithNumber(i) => Some(*i),
        }
    }
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "name is empty"),
            Self::NotAbsolute => write!(f, "namespace must start with '/'"),
            Self::RepeatedSlash(i) => write!(f, "repeated '/' at index {}", i),
            Self::EndsWithSlash(i) => write!(f, "name ends with '/' at index {}", i),
            Self::InvalidCharacter(i, c) => {
                write!(f, "invalid character '{}' at index {}", c, i)
            }
            Self::StartsWithNumber(i) => write!(f, "component starts with a number at index {}", i),
        }
    }
}

impl std::error::Error for NameError {}

fn is_wildcard(token: &str) -> bool {
    token == "*" || token == "**"
}

/// Check one component that starts at byte `offset` of the full name.
fn validate_token(token: &str, offset: usize) -> Result<(), NameError> {
    if is_wildcard(token) {
        return Ok(());
    }
    for (i, c) in token.char_indices() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return Err(NameError::InvalidCharacter(offset + i, c));
        }
    }
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(NameError::StartsWithNumber(offset));
    }
    Ok(())
}

/// Validate an absolute namespace such as `/`, `/ns` or `/ns/sub`.
///
/// `*` and `**` are accepted as components.
pub fn validate_namespace(namespace: &str) -> Result<(), NameError> {
    if namespace.is_empty() {
        return Err(NameError::Empty);
    }
    if !namespace.starts_with('/') {
        return Err(NameError::NotAbsolute);
    }
    if namespace == "/" {
        return Ok(());
    }
    if namespace.ends_with('/') {
        return Err(NameError::EndsWithSlash(namespace.len() - 1));
    }

    let mut offset = 1;
    for token in namespace[1..].split('/') {
        if token.is_empty() {
            return Err(NameError::RepeatedSlash(offset));
        }
        validate_token(token, offset)?;
        offset += token.len() + 1;
    }
    Ok(())
}

/// Validate a bare node name (no separators).
pub fn validate_node_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    validate_token(name, 0)
}

/// Validate a node selector from a parameter file.
///
/// The part after the last `/` is the node name and the part before it the
/// namespace. A missing leading `/` is tolerated, so `robot` and
/// `ns/robot` are accepted as well as `/ns/robot`, `/**` and `/ns/*`.
pub fn validate_fully_qualified_node_name(fqn: &str) -> Result<(), NameError> {
    if fqn.is_empty() {
        return Err(NameError::Empty);
    }
    let relative = !fqn.starts_with('/');
    let shift = usize::from(relative);
    let absolute = if relative {
        format!("/{}", fqn)
    } else {
        fqn.to_string()
    };

    let unshift = |e: NameError| match e {
        NameError::RepeatedSlash(i) => NameError::RepeatedSlash(i - shift),
        NameError::EndsWithSlash(i) => NameError::EndsWithSlash(i - shift),
        NameError::InvalidCharacter(i, c) => NameError::InvalidCharacter(i - shift, c),
        NameError::StartsWithNumber(i) => NameError::StartsWithNumber(i - shift),
        other => other,
    };

    // `rfind` cannot fail since `absolute` starts with '/'.
    let split = absolute.rfind('/').unwrap_or(0);
    let (namespace, node) = (&absolute[..split], &absolute[split + 1..]);
    if node.is_empty() {
        return Err(NameError::EndsWithSlash(absolute.len() - 1 - shift));
    }
    if namespace.ends_with('/') {
        return Err(NameError::RepeatedSlash(split - shift));
    }
    if !namespace.is_empty() {
        validate_namespace(namespace).map_err(unshift)?;
    }
    validate_token(node, split + 1).map_err(unshift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_namespaces() {
        for ns in ["/", "/ns", "/ns/sub_ns", "/_private", "/**", "/ns/*"] {
            assert_eq!(validate_namespace(ns), Ok(()), "{}", ns);
        }
    }

    #[test]
    fn test_invalid_namespaces() {
        assert_eq!(validate_namespace(""), Err(NameError::Empty));
        assert_eq!(validate_namespace("ns"), Err(NameError::NotAbsolute));
        assert_eq!(validate_namespace("/ns/"), Err(NameError::EndsWithSlash(3)));
        assert_eq!(validate_namespace("/ns//sub"), Err(NameError::RepeatedSlash(4)));
        assert_eq!(
            validate_namespace("/ns/s-b"),
            Err(NameError::InvalidCharacter(5, '-'))
        );
        assert_eq!(validate_namespace("/ns/9lives"), Err(NameError::StartsWithNumber(4)));
    }

    #[test]
    fn test_node_names() {
        assert_eq!(validate_node_name("camera"), Ok(()));
        assert_eq!(validate_node_name("**"), Ok(()));
        assert_eq!(validate_node_name(""), Err(NameError::Empty));
        assert_eq!(
            validate_node_name("node name"),
            Err(NameError::InvalidCharacter(4, ' '))
        );
        assert_eq!(validate_node_name("1node"), Err(NameError::StartsWithNumber(0)));
    }

    #[test]
    fn test_fully_qualified_names() {
        for fqn in [
            "robot",
            "/robot",
            "lidar_ns/lidar_2",
            "/my_ns/my_node",
            "/**",
            "/*",
            "/my_ns/**",
        ] {
            assert_eq!(validate_fully_qualified_node_name(fqn), Ok(()), "{}", fqn);
        }
    }

    #[test]
    fn test_invalid_fully_qualified_names() {
        assert_eq!(validate_fully_qualified_node_name(""), Err(NameError::Empty));
        assert_eq!(
            validate_fully_qualified_node_name("/ns/"),
            Err(NameError::EndsWithSlash(3))
        );
        assert_eq!(
            validate_fully_qualified_node_name("ns/bad-node"),
            Err(NameError::InvalidCharacter(6, '-'))
        );
        assert_eq!(
            validate_fully_qualified_node_name("/a//node"),
            Err(NameError::RepeatedSlash(3))
        );
        let err = validate_fully_qualified_node_name("/ns/2fast").unwrap_err();
        assert_eq!(err.index(), Some(4));
    }
}
