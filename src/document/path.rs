//! Element path queries over the document tree.
//!
//! An `ElementPath` is a sequential chain of steps. Each step operates on the
//! previous step's frontier (the elements matched so far), selecting either
//! direct children or descendants by element name. A trailing `@name` step
//! reads an attribute from the final frontier instead of selecting elements.
//!
//! ```text
//! Enclosure/Walls/Wall          child steps
//! //Attics/Attic                descendant axis from the start
//! WallType/*                    any child element
//! SystemIdentifier/@id          attribute of the last frontier
//! ```

use super::Node;

/// Axis a step walks along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

/// A single step: axis + element name (`*` matches any element).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    name: String,
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    steps: Vec<Step>,
    attribute: Option<String>,
}

impl ElementPath {
    /// Parse a path expression. Parsing is total: unknown names simply
    /// match nothing.
    pub fn parse(expr: &str) -> Self {
        let mut steps = Vec::new();
        let mut attribute = None;
        let mut axis = Axis::Child;

        let trimmed = expr.trim();
        let body = match trimmed.strip_prefix("//") {
            Some(rest) => {
                axis = Axis::Descendant;
                rest
            }
            None => trimmed.strip_prefix('/').unwrap_or(trimmed),
        };

        for segment in body.split('/') {
            if segment.is_empty() {
                axis = Axis::Descendant;
                continue;
            }
            if let Some(name) = segment.strip_prefix('@') {
                attribute = Some(name.to_string());
                break;
            }
            steps.push(Step {
                axis,
                name: segment.to_string(),
            });
            axis = Axis::Child;
        }

        Self { steps, attribute }
    }

    /// Whether the path ends in an attribute step.
    pub fn is_attribute(&self) -> bool {
        self.attribute.is_some()
    }

    /// Elements matched by the element steps, in document order.
    pub fn select<'a>(&self, origin: &Node<'a>) -> Vec<Node<'a>> {
        let mut frontier = vec![origin.clone()];

        for step in &self.steps {
            let mut next_frontier: Vec<Node<'a>> = Vec::new();
            for node in &frontier {
                let candidates = match step.axis {
                    Axis::Child => node.children(&step.name),
                    Axis::Descendant => node.descendants(&step.name),
                };
                for candidate in candidates {
                    if !next_frontier.iter().any(|n| n.same_element(&candidate)) {
                        next_frontier.push(candidate);
                    }
                }
            }
            frontier = next_frontier;
            if frontier.is_empty() {
                break;
            }
        }

        frontier
    }

    /// Scalar values at the path: attribute values when the path ends in
    /// `@name`, otherwise element text.
    pub fn values(&self, origin: &Node<'_>) -> Vec<String> {
        let nodes = self.select(origin);
        match &self.attribute {
            Some(attr) => nodes.iter().filter_map(|n| n.attr(attr)).collect(),
            None => nodes.iter().filter_map(|n| n.text()).collect(),
        }
    }
}

impl From<&str> for ElementPath {
    fn from(expr: &str) -> Self {
        Self::parse(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    fn doc() -> Document {
        Document::from_value(json!({
            "HPXML": {
                "@schemaVersion": "3.0",
                "Building": {
                    "BuildingID": {"@id": "bldg1"},
                    "BuildingDetails": {
                        "Enclosure": {
                            "Walls": {
                                "Wall": [
                                    {"SystemIdentifier": {"@id": "w1"}, "Area": 400},
                                    {"SystemIdentifier": {"@id": "w2"}, "Area": 250.5}
                                ]
                            },
                            "Attics": {"Attic": {"SystemIdentifier": {"@id": "a1"}}}
                        }
                    }
                }
            }
        }))
    }

    #[test]
    fn child_steps_follow_repeated_elements() {
        let doc = doc();
        let walls = ElementPath::parse("Building/BuildingDetails/Enclosure/Walls/Wall").select(&doc.root());
        assert_eq!(walls.len(), 2);
        assert_eq!(walls[1].path(), "HPXML/Building/BuildingDetails/Enclosure/Walls/Wall[2]");
    }

    #[test]
    fn descendant_axis_from_start() {
        let doc = doc();
        let attics = ElementPath::parse("//Attics/Attic").select(&doc.root());
        assert_eq!(attics.len(), 1);
        assert_eq!(attics[0].id().as_deref(), Some("a1"));
    }

    #[test]
    fn attribute_values() {
        let doc = doc();
        let ids = ElementPath::parse("//Wall/SystemIdentifier/@id").values(&doc.root());
        assert_eq!(ids, vec!["w1".to_string(), "w2".to_string()]);
        assert!(ElementPath::parse("Building/BuildingID/@id").is_attribute());
    }

    #[test]
    fn numeric_text_is_stringified() {
        let doc = doc();
        let areas = ElementPath::parse("//Wall/Area").values(&doc.root());
        assert_eq!(areas, vec!["400".to_string(), "250.5".to_string()]);
    }

    #[test]
    fn wildcard_matches_any_child() {
        let doc = doc();
        let parts = ElementPath::parse("Building/BuildingDetails/Enclosure/*").select(&doc.root());
        let names: Vec<&str> = parts.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["Walls", "Attics"]);
    }

    #[test]
    fn missing_step_yields_nothing() {
        let doc = doc();
        assert!(ElementPath::parse("Building/Nope/Wall").select(&doc.root()).is_empty());
    }
}
