//! The deployment manifest: which page comes in which position.
//!
//! ```text
//! #Manifest
//! 1. 1.intro.html
//! 2. 2.body.html
//! 10. 10.appendix.html
//! ```
//!
//! Order numbers come from the `N.` filename prefix (see [`crate::naming`])
//! and sort numerically, so `10` follows `2`. Files without a prefix are
//! handled by [`UnnumberedPolicy`]; the same [`order_files`] call decides
//! both the render order and the manifest order.

use crate::config::UnnumberedPolicy;
use crate::naming::{output_file_name, parse_order_prefix};
use serde::Serialize;

/// One line of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub order: u32,
    pub output_name: String,
}

/// Source file names in deployment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
    /// `(order, source file name)`, ascending by order. Ties keep name order.
    pub ordered: Vec<(u32, String)>,
    /// Unnumbered files left out under [`UnnumberedPolicy::Skip`].
    pub skipped: Vec<String>,
}

/// Put source file names in deployment order.
pub fn order_files<S: AsRef<str>>(names: &[S], policy: UnnumberedPolicy) -> Ordering {
    let mut numbered = Vec::new();
    let mut unnumbered = Vec::new();
    for name in names {
        let name = name.as_ref().to_string();
        match parse_order_prefix(&name) {
            Some(order) => numbered.push((order, name)),
            None => unnumbered.push(name),
        }
    }
    numbered.sort();
    unnumbered.sort();

    match policy {
        UnnumberedPolicy::Skip => Ordering {
            ordered: numbered,
            skipped: unnumbered,
        },
        UnnumberedPolicy::Trailing => {
            let next = numbered.last().map_or(1, |(order, _)| order.saturating_add(1));
            let trailing = unnumbered
                .into_iter()
                .enumerate()
                .map(|(idx, name)| (next.saturating_add(idx as u32), name));
            numbered.extend(trailing);
            Ordering {
                ordered: numbered,
                skipped: Vec::new(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub header: String,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build the manifest for the given rendered source files.
    pub fn build<S: AsRef<str>>(
        header: &str,
        source_names: &[S],
        policy: UnnumberedPolicy,
    ) -> Self {
        let entries = order_files(source_names, policy)
            .ordered
            .into_iter()
            .map(|(order, name)| ManifestEntry {
                order,
                output_name: output_file_name(&name),
            })
            .collect();
        Self {
            header: header.to_string(),
            entries,
        }
    }

    /// File contents: the header line, then one `N. page.html` line per entry.
    pub fn to_text(&self) -> String {
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|entry| format!("{}. {}", entry.order, entry.output_name))
            .collect();
        format!("{}\n{}", self.header, lines.join("\n"))
    }
}
