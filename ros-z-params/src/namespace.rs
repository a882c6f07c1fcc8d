//! Node and parameter namespace bookkeeping for the event router.

use crate::error::{ParamError, Result};

pub const NODE_NS_SEPARATOR: char = '/';
pub const PARAMETER_NS_SEPARATOR: char = '.';

/// Which of the two namespaces an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum NamespaceKind {
    #[strum(serialize = "node")]
    Node,
    #[strum(serialize = "parameter")]
    Parameter,
}

impl NamespaceKind {
    pub fn separator(self) -> char {
        match self {
            Self::Node => NODE_NS_SEPARATOR,
            Self::Parameter => PARAMETER_NS_SEPARATOR,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Segments {
    path: Option<String>,
    count: usize,
}

/// Tracks the `/`-joined node namespace and the `.`-joined parameter
/// namespace while the router walks nested mappings.
///
/// A count of zero always goes with an absent path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NamespaceTracker {
    node: Segments,
    parameter: Segments,
}

impl NamespaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn segments(&mut self, kind: NamespaceKind) -> &mut Segments {
        match kind {
            NamespaceKind::Node => &mut self.node,
            NamespaceKind::Parameter => &mut self.parameter,
        }
    }

    /// Append `name` as a new segment.
    ///
    /// No separator is inserted when the path already ends with one, so a
    /// root namespace `/` followed by `node` gives `/node`. Storage is
    /// reserved before anything changes; on failure the tracker is untouched.
    pub fn push(&mut self, name: &str, kind: NamespaceKind) -> Result<()> {
        let sep = kind.separator();
        let segs = self.segments(kind);
        let current = if segs.count > 0 { segs.path.as_mut() } else { None };
        if let Some(path) = current {
            let needs_sep = !path.ends_with(sep);
            let extra = name.len() + usize::from(needs_sep);
            path.try_reserve_exact(extra)
                .map_err(|e| ParamError::alloc("namespace", e))?;
            if needs_sep {
                path.push(sep);
            }
            path.push_str(name);
        } else {
            let mut path = String::new();
            path.try_reserve_exact(name.len())
                .map_err(|e| ParamError::alloc("namespace", e))?;
            path.push_str(name);
            segs.path = Some(path);
        }
        segs.count += 1;
        tracing::debug!("pushed {} namespace segment {:?}", kind, name);
        Ok(())
    }

    /// Remove the last segment. A no-op when no segment is active.
    pub fn pop(&mut self, kind: NamespaceKind) {
        let sep = kind.separator();
        let segs = self.segments(kind);
        match segs.count {
            0 => {}
            1 => {
                segs.path = None;
                segs.count = 0;
            }
            _ => {
                if let Some(idx) = segs.path.as_deref().and_then(|p| p.rfind(sep)) {
                    if let Some(path) = segs.path.as_mut() {
                        path.truncate(idx);
                    }
                }
                segs.count -= 1;
            }
        }
    }

    /// Replace the whole namespace with `value`, holding `count` segments.
    pub fn replace(&mut self, kind: NamespaceKind, value: &str, count: usize) -> Result<()> {
        let mut path = String::new();
        path.try_reserve_exact(value.len())
            .map_err(|e| ParamError::alloc("namespace", e))?;
        path.push_str(value);

        let segs = self.segments(kind);
        segs.count = count;
        segs.path = (count > 0).then_some(path);
        tracing::debug!("{} namespace is now {:?}", kind, value);
        Ok(())
    }

    pub fn node_ns(&self) -> Option<&str> {
        self.node.path.as_deref()
    }

    pub fn parameter_ns(&self) -> Option<&str> {
        self.parameter.path.as_deref()
    }

    pub fn node_count(&self) -> usize {
        self.node.count
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter.count
    }
}
