//! Kind-specific field extensions for nodes and relationships.
//!
//! The extension a node or relationship carries is chosen by its kind through
//! a static lookup table. Kinds without an entry get the `Base` variant.

use serde::{Deserialize, Serialize};

use crate::record::{put_list, put_opt, Record, RecordReader};
use crate::{NodeType, RelationshipType, ValidationError};

/// Extra fields of a concept node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptDetails {
    /// Formal definition.
    pub definition: Option<String>,
    pub examples: Vec<String>,
    pub related_concepts: Vec<String>,
}

/// Extra fields of a programming-language node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetails {
    pub version: Option<String>,
    /// Supported paradigms.
    pub paradigm: Vec<String>,
    pub typing_system: Option<String>,
    pub memory_management: Option<String>,
    pub use_cases: Vec<String>,
}

/// Extra fields of a technology node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnologyDetails {
    pub domain: Option<String>,
    pub maturity: Option<String>,
    pub alternatives: Vec<String>,
    pub advantages: Vec<String>,
    pub disadvantages: Vec<String>,
}

/// Extra fields of a library/framework node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryDetails {
    pub version: Option<String>,
    pub license: Option<String>,
    pub repository_url: Option<String>,
    pub documentation_url: Option<String>,
    pub dependencies: Vec<String>,
}

/// Kind-specific node fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDetails {
    Concept(ConceptDetails),
    Language(LanguageDetails),
    Technology(TechnologyDetails),
    Library(LibraryDetails),
    #[default]
    Base,
}

/// Node kinds with a specialized field set, and how to build an empty one.
pub const NODE_DETAILS_TABLE: &[(NodeType, fn() -> NodeDetails)] = &[
    (NodeType::Concept, || NodeDetails::Concept(ConceptDetails::default())),
    (NodeType::Language, || NodeDetails::Language(LanguageDetails::default())),
    (NodeType::Technology, || NodeDetails::Technology(TechnologyDetails::default())),
    (NodeType::Library, || NodeDetails::Library(LibraryDetails::default())),
];

impl NodeDetails {
    /// Empty details for a node type, falling back to `Base`.
    pub fn for_type(node_type: NodeType) -> Self {
        NODE_DETAILS_TABLE
            .iter()
            .find(|(kind, _)| *kind == node_type)
            .map(|(_, build)| build())
            .unwrap_or(NodeDetails::Base)
    }

    /// Whether these details are the ones `node_type` carries.
    pub fn matches(&self, node_type: NodeType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(&Self::for_type(node_type))
    }

    /// Read the specialized fields for `node_type` from a flat record.
    pub fn from_record(node_type: NodeType, reader: &RecordReader<'_>) -> Result<Self, ValidationError> {
        Ok(match Self::for_type(node_type) {
            NodeDetails::Concept(_) => NodeDetails::Concept(ConceptDetails {
                definition: reader.optional_str("definition")?,
                examples: reader.string_list("examples")?,
                related_concepts: reader.string_list("related_concepts")?,
            }),
            NodeDetails::Language(_) => NodeDetails::Language(LanguageDetails {
                version: reader.optional_str("version")?,
                paradigm: reader.string_list("paradigm")?,
                typing_system: reader.optional_str("typing_system")?,
                memory_management: reader.optional_str("memory_management")?,
                use_cases: reader.string_list("use_cases")?,
            }),
            NodeDetails::Technology(_) => NodeDetails::Technology(TechnologyDetails {
                domain: reader.optional_str("domain")?,
                maturity: reader.optional_str("maturity")?,
                alternatives: reader.string_list("alternatives")?,
                advantages: reader.string_list("advantages")?,
                disadvantages: reader.string_list("disadvantages")?,
            }),
            NodeDetails::Library(_) => NodeDetails::Library(LibraryDetails {
                version: reader.optional_str("version")?,
                license: reader.optional_str("license")?,
                repository_url: reader.optional_str("repository_url")?,
                documentation_url: reader.optional_str("documentation_url")?,
                dependencies: reader.string_list("dependencies")?,
            }),
            NodeDetails::Base => NodeDetails::Base,
        })
    }

    /// Write the specialized fields into a flat record.
    pub fn write_record(&self, record: &mut Record) {
        match self {
            NodeDetails::Concept(d) => {
                put_opt(record, "definition", d.definition.clone());
                put_list(record, "examples", &d.examples);
                put_list(record, "related_concepts", &d.related_concepts);
            }
            NodeDetails::Language(d) => {
                put_opt(record, "version", d.version.clone());
                put_list(record, "paradigm", &d.paradigm);
                put_opt(record, "typing_system", d.typing_system.clone());
                put_opt(record, "memory_management", d.memory_management.clone());
                put_list(record, "use_cases", &d.use_cases);
            }
            NodeDetails::Technology(d) => {
                put_opt(record, "domain", d.domain.clone());
                put_opt(record, "maturity", d.maturity.clone());
                put_list(record, "alternatives", &d.alternatives);
                put_list(record, "advantages", &d.advantages);
                put_list(record, "disadvantages", &d.disadvantages);
            }
            NodeDetails::Library(d) => {
                put_opt(record, "version", d.version.clone());
                put_opt(record, "license", d.license.clone());
                put_opt(record, "repository_url", d.repository_url.clone());
                put_opt(record, "documentation_url", d.documentation_url.clone());
                put_list(record, "dependencies", &d.dependencies);
            }
            NodeDetails::Base => {}
        }
    }
}

/// Extra fields of a learning-path relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningPathDetails {
    /// Position of this step in the path.
    pub order: i64,
    /// Estimated minutes to complete the step.
    pub estimated_time: Option<u32>,
    pub difficulty_progression: Option<f64>,
}

/// Extra fields of a depends_on relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyDetails {
    pub dependency_level: Option<String>,
    pub critical_path: bool,
    pub alternative_solutions: Vec<String>,
}

/// Extra fields of an implements relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImplementationDetails {
    pub implementation_details: Option<String>,
    pub complexity: Option<String>,
    pub performance_impact: Option<String>,
}

/// Kind-specific relationship fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationshipDetails {
    LearningPath(LearningPathDetails),
    Dependency(DependencyDetails),
    Implementation(ImplementationDetails),
    #[default]
    Base,
}

pub const RELATIONSHIP_DETAILS_TABLE: &[(RelationshipType, fn() -> RelationshipDetails)] = &[
    (RelationshipType::LearningPath, || {
        RelationshipDetails::LearningPath(LearningPathDetails::default())
    }),
    (RelationshipType::DependsOn, || {
        RelationshipDetails::Dependency(DependencyDetails::default())
    }),
    (RelationshipType::Implements, || {
        RelationshipDetails::Implementation(ImplementationDetails::default())
    }),
];

impl RelationshipDetails {
    /// Empty details for a relationship type, falling back to `Base`.
    pub fn for_type(relationship_type: RelationshipType) -> Self {
        RELATIONSHIP_DETAILS_TABLE
            .iter()
            .find(|(kind, _)| *kind == relationship_type)
            .map(|(_, build)| build())
            .unwrap_or(RelationshipDetails::Base)
    }

    pub fn matches(&self, relationship_type: RelationshipType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(&Self::for_type(relationship_type))
    }

    pub fn from_record(
        relationship_type: RelationshipType,
        reader: &RecordReader<'_>,
    ) -> Result<Self, ValidationError> {
        Ok(match Self::for_type(relationship_type) {
            RelationshipDetails::LearningPath(_) => {
                RelationshipDetails::LearningPath(LearningPathDetails {
                    order: reader.optional_i64("order")?.unwrap_or(0),
                    estimated_time: reader.optional_u32("estimated_time")?,
                    difficulty_progression: reader.optional_f64("difficulty_progression")?,
                })
            }
            RelationshipDetails::Dependency(_) => RelationshipDetails::Dependency(DependencyDetails {
                dependency_level: reader.optional_str("dependency_level")?,
                critical_path: reader.bool_or("critical_path", false)?,
                alternative_solutions: reader.string_list("alternative_solutions")?,
            }),
            RelationshipDetails::Implementation(_) => {
                RelationshipDetails::Implementation(ImplementationDetails {
                    implementation_details: reader.optional_str("implementation_details")?,
                    complexity: reader.optional_str("complexity")?,
                    performance_impact: reader.optional_str("performance_impact")?,
                })
            }
            RelationshipDetails::Base => RelationshipDetails::Base,
        })
    }

    pub fn write_record(&self, record: &mut Record) {
        match self {
            RelationshipDetails::LearningPath(d) => {
                record.insert("order".to_string(), d.order.into());
                put_opt(record, "estimated_time", d.estimated_time);
                put_opt(record, "difficulty_progression", d.difficulty_progression);
            }
            RelationshipDetails::Dependency(d) => {
                put_opt(record, "dependency_level", d.dependency_level.clone());
                record.insert("critical_path".to_string(), d.critical_path.into());
                put_list(record, "alternative_solutions", &d.alternative_solutions);
            }
            RelationshipDetails::Implementation(d) => {
                put_opt(record, "implementation_details", d.implementation_details.clone());
                put_opt(record, "complexity", d.complexity.clone());
                put_opt(record, "performance_impact", d.performance_impact.clone());
            }
            RelationshipDetails::Base => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kind;
    use serde_json::json;

    #[test]
    fn test_node_table_dispatch() {
        assert!(matches!(NodeDetails::for_type(NodeType::Concept), NodeDetails::Concept(_)));
        assert!(matches!(NodeDetails::for_type(NodeType::Library), NodeDetails::Library(_)));
        assert_eq!(NodeDetails::for_type(NodeType::Algorithm), NodeDetails::Base);
    }

    #[test]
    fn test_every_node_type_has_matching_details() {
        for node_type in NodeType::ALL {
            assert!(NodeDetails::for_type(*node_type).matches(*node_type));
        }
        assert!(!NodeDetails::Base.matches(NodeType::Language));
    }

    #[test]
    fn test_relationship_table_dispatch() {
        assert!(matches!(
            RelationshipDetails::for_type(RelationshipType::DependsOn),
            RelationshipDetails::Dependency(_)
        ));
        assert_eq!(
            RelationshipDetails::for_type(RelationshipType::Prerequisite),
            RelationshipDetails::Base
        );
    }

    #[test]
    fn test_language_details_from_record() {
        let value = json!({
            "version": "C++20",
            "paradigm": ["procedural", "object_oriented"],
            "typing_system": "static"
        });
        let reader = RecordReader::from_value(&value).unwrap();
        let details = NodeDetails::from_record(NodeType::Language, &reader).unwrap();

        match details {
            NodeDetails::Language(d) => {
                assert_eq!(d.version.as_deref(), Some("C++20"));
                assert_eq!(d.paradigm.len(), 2);
                assert!(d.memory_management.is_none());
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_base_kind_ignores_extra_fields() {
        let value = json!({"version": "1.0"});
        let reader = RecordReader::from_value(&value).unwrap();
        let details = NodeDetails::from_record(NodeType::Tool, &reader).unwrap();
        assert_eq!(details, NodeDetails::Base);
    }

    #[test]
    fn test_learning_path_details_write_record() {
        let details = RelationshipDetails::LearningPath(LearningPathDetails {
            order: 3,
            estimated_time: Some(90),
            difficulty_progression: None,
        });
        let mut record = Record::new();
        details.write_record(&mut record);

        assert_eq!(record["order"], json!(3));
        assert_eq!(record["estimated_time"], json!(90));
        assert!(!record.contains_key("difficulty_progression"));
    }
}
