//! Node catalog types.

use flowdeck_graph::editor::NodeKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Category of the node catalog, as accepted by the `node_type` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeCategory {
    Triggers,
    Activities,
    Controllers,
}

impl NodeCategory {
    /// Every category, in palette order.
    pub const ALL: [Self; 3] = [Self::Triggers, Self::Activities, Self::Controllers];

    /// Returns the query parameter value.
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Section title shown in the palette.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Triggers => "Triggers",
            Self::Activities => "Activities",
            Self::Controllers => "Controllers",
        }
    }

    /// Structural kind of nodes dragged out of this category.
    pub fn node_kind(&self) -> NodeKind {
        match self {
            Self::Triggers => NodeKind::Trigger,
            Self::Activities => NodeKind::Activity,
            Self::Controllers => NodeKind::Controller,
        }
    }
}

/// One page of the node catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCatalog {
    /// Node names; entries that are not strings are skipped.
    #[serde(default, deserialize_with = "node_names")]
    pub items: Vec<String>,
    /// Fields this model does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeCatalog {
    /// Creates a catalog from node names.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            extra: Map::new(),
        }
    }
}

fn node_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let names = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(names)
}

/// The three catalog pages fetched together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllNodeTypes {
    pub triggers: NodeCatalog,
    pub activities: NodeCatalog,
    pub controllers: NodeCatalog,
}

impl AllNodeTypes {
    /// Returns the catalog of one category.
    pub fn get(&self, category: NodeCategory) -> &NodeCatalog {
        match category {
            NodeCategory::Triggers => &self.triggers,
            NodeCategory::Activities => &self.activities,
            NodeCategory::Controllers => &self.controllers,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(NodeCategory::Triggers.as_str(), "triggers");
        assert_eq!(NodeCategory::from_str("controllers").unwrap(), NodeCategory::Controllers);
        assert_eq!(NodeCategory::Activities.node_kind(), NodeKind::Activity);
        assert_eq!(NodeCategory::Triggers.title(), "Triggers");
    }

    #[test]
    fn test_catalog_is_lenient() {
        let catalog: NodeCatalog = serde_json::from_value(json!({
            "items": ["cron", 42, "webhook"],
            "totalCount": 3
        }))
        .unwrap();
        assert_eq!(catalog.items, ["cron", "webhook"]);
        assert_eq!(catalog.extra["totalCount"], 3);

        let catalog: NodeCatalog = serde_json::from_value(json!({})).unwrap();
        assert!(catalog.items.is_empty());
    }
}
