//! Node palette: the catalog grouped into collapsible sections.

use std::collections::HashSet;

use flowdeck_client::{AllNodeTypes, NodeCategory};
use flowdeck_core::Error;

use crate::surface::DropPayload;

/// Load status of the catalogs behind the palette.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PaletteStatus {
    /// Catalogs have not arrived yet.
    #[default]
    Loading,
    /// Fetching the catalogs failed.
    Failed(String),
    /// Catalogs are available.
    Ready(AllNodeTypes),
}

/// One rendered palette section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSection<'a> {
    pub category: NodeCategory,
    pub title: &'static str,
    /// Number of entries, shown even when collapsed.
    pub count: usize,
    pub expanded: bool,
    /// Entry names; empty while collapsed.
    pub items: &'a [String],
}

/// Sidebar listing the draggable node types.
#[derive(Debug, Clone, Default)]
pub struct NodePalette {
    status: PaletteStatus,
    collapsed: HashSet<NodeCategory>,
}

impl NodePalette {
    /// Creates a palette with every section expanded.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &PaletteStatus {
        &self.status
    }

    /// Stores the outcome of a catalog fetch.
    pub fn set_catalogs(&mut self, result: Result<AllNodeTypes, &Error>) {
        self.status = match result {
            Ok(all) => PaletteStatus::Ready(all),
            Err(error) => PaletteStatus::Failed(error.to_string()),
        };
    }

    /// Returns the palette to its loading state.
    pub fn reset(&mut self) {
        self.status = PaletteStatus::Loading;
    }

    pub fn is_expanded(&self, category: NodeCategory) -> bool {
        !self.collapsed.contains(&category)
    }

    /// Flips a section between expanded and collapsed.
    pub fn toggle(&mut self, category: NodeCategory) {
        if !self.collapsed.remove(&category) {
            self.collapsed.insert(category);
        }
    }

    /// Sections in display order, once the catalogs are ready.
    pub fn sections(&self) -> Vec<PaletteSection<'_>> {
        let PaletteStatus::Ready(all) = &self.status else {
            return Vec::new();
        };

        NodeCategory::ALL
            .into_iter()
            .map(|category| {
                let items = &all.get(category).items;
                let expanded = self.is_expanded(category);
                PaletteSection {
                    category,
                    title: category.title(),
                    count: items.len(),
                    expanded,
                    items: if expanded { items } else { &[] },
                }
            })
            .collect()
    }

    /// Payload attached when an entry of `category` is dragged onto the canvas.
    pub fn drag_payload(category: NodeCategory, node_name: impl Into<String>) -> DropPayload {
        DropPayload {
            node_type: category.node_kind().as_str().to_owned(),
            node_name: node_name.into(),
        }
    }
}
