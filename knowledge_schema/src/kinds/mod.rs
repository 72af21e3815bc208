//! Enumerated kinds: node types, difficulty levels, relationship types and strengths.
//!
//! Every kind round-trips through its snake_case name. Parsing an unknown
//! name is a [`ValidationError`], never a silent fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ValidationError;

/// A closed enumeration with a stable wire name for every value.
pub trait Kind: Copy + Sized + 'static {
    /// Every recognized value, in declaration order.
    const ALL: &'static [Self];

    /// Field name used in validation errors.
    const FIELD: &'static str;

    /// The snake_case wire name.
    fn as_str(&self) -> &'static str;

    /// Parse a wire name, reporting the offending value on failure.
    fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| ValidationError::invalid(Self::FIELD, value))
    }
}

/// Types of knowledge nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Concept,
    /// A programming language.
    Language,
    Technology,
    /// A library or framework.
    Library,
    Tool,
    /// A programming paradigm.
    Paradigm,
    /// A design pattern.
    Pattern,
    Algorithm,
    DataStructure,
    Problem,
    Solution,
    BestPractice,
    CommonMistake,
}

impl Kind for NodeType {
    const ALL: &'static [Self] = &[
        NodeType::Concept,
        NodeType::Language,
        NodeType::Technology,
        NodeType::Library,
        NodeType::Tool,
        NodeType::Paradigm,
        NodeType::Pattern,
        NodeType::Algorithm,
        NodeType::DataStructure,
        NodeType::Problem,
        NodeType::Solution,
        NodeType::BestPractice,
        NodeType::CommonMistake,
    ];

    const FIELD: &'static str = "node_type";

    fn as_str(&self) -> &'static str {
        match self {
            NodeType::Concept => "concept",
            NodeType::Language => "language",
            NodeType::Technology => "technology",
            NodeType::Library => "library",
            NodeType::Tool => "tool",
            NodeType::Paradigm => "paradigm",
            NodeType::Pattern => "pattern",
            NodeType::Algorithm => "algorithm",
            NodeType::DataStructure => "data_structure",
            NodeType::Problem => "problem",
            NodeType::Solution => "solution",
            NodeType::BestPractice => "best_practice",
            NodeType::CommonMistake => "common_mistake",
        }
    }
}

/// How hard a node is to learn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Kind for DifficultyLevel {
    const ALL: &'static [Self] = &[
        DifficultyLevel::Beginner,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
        DifficultyLevel::Expert,
    ];

    const FIELD: &'static str = "difficulty_level";

    fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
            DifficultyLevel::Expert => "expert",
        }
    }
}

/// Broad family a relationship type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipCategory {
    Hierarchy,
    Dependency,
    Implementation,
    Association,
    Temporal,
    Learning,
    Practice,
    Evaluative,
}

/// Types of relationships between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    // Hierarchy
    BelongsTo,
    IsA,
    PartOf,
    Contains,

    // Dependency
    DependsOn,
    Requires,
    Prerequisite,

    // Implementation
    Implements,
    Uses,
    Extends,
    Inherits,

    // Association
    RelatedTo,
    SimilarTo,
    OppositeOf,
    ContrastsWith,

    // Temporal
    Before,
    After,
    LeadsTo,

    // Learning
    LearningPath,
    RecommendedAfter,
    BuildUpon,

    // Practice
    AppliesTo,
    Solves,
    ExampleOf,

    // Evaluative
    GoodPractice,
    BadPractice,
    AlternativeTo,
}

impl RelationshipType {
    /// The family this relationship type belongs to.
    pub fn category(&self) -> RelationshipCategory {
        use RelationshipType::*;
        match self {
            BelongsTo | IsA | PartOf | Contains => RelationshipCategory::Hierarchy,
            DependsOn | Requires | Prerequisite => RelationshipCategory::Dependency,
            Implements | Uses | Extends | Inherits => RelationshipCategory::Implementation,
            RelatedTo | SimilarTo | OppositeOf | ContrastsWith => RelationshipCategory::Association,
            Before | After | LeadsTo => RelationshipCategory::Temporal,
            LearningPath | RecommendedAfter | BuildUpon => RelationshipCategory::Learning,
            AppliesTo | Solves | ExampleOf => RelationshipCategory::Practice,
            GoodPractice | BadPractice | AlternativeTo => RelationshipCategory::Evaluative,
        }
    }

    /// Whether learning paths follow this edge.
    pub fn is_prerequisite_edge(&self) -> bool {
        matches!(self, RelationshipType::Prerequisite | RelationshipType::DependsOn)
    }

    /// Upper-case label used when the type is rendered into a store query.
    pub fn label(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl Kind for RelationshipType {
    const ALL: &'static [Self] = &[
        RelationshipType::BelongsTo,
        RelationshipType::IsA,
        RelationshipType::PartOf,
        RelationshipType::Contains,
        RelationshipType::DependsOn,
        RelationshipType::Requires,
        RelationshipType::Prerequisite,
        RelationshipType::Implements,
        RelationshipType::Uses,
        RelationshipType::Extends,
        RelationshipType::Inherits,
        RelationshipType::RelatedTo,
        RelationshipType::SimilarTo,
        RelationshipType::OppositeOf,
        RelationshipType::ContrastsWith,
        RelationshipType::Before,
        RelationshipType::After,
        RelationshipType::LeadsTo,
        RelationshipType::LearningPath,
        RelationshipType::RecommendedAfter,
        RelationshipType::BuildUpon,
        RelationshipType::AppliesTo,
        RelationshipType::Solves,
        RelationshipType::ExampleOf,
        RelationshipType::GoodPractice,
        RelationshipType::BadPractice,
        RelationshipType::AlternativeTo,
    ];

    const FIELD: &'static str = "relationship_type";

    fn as_str(&self) -> &'static str {
        use RelationshipType::*;
        match self {
            BelongsTo => "belongs_to",
            IsA => "is_a",
            PartOf => "part_of",
            Contains => "contains",
            DependsOn => "depends_on",
            Requires => "requires",
            Prerequisite => "prerequisite",
            Implements => "implements",
            Uses => "uses",
            Extends => "extends",
            Inherits => "inherits",
            RelatedTo => "related_to",
            SimilarTo => "similar_to",
            OppositeOf => "opposite_of",
            ContrastsWith => "contrasts_with",
            Before => "before",
            After => "after",
            LeadsTo => "leads_to",
            LearningPath => "learning_path",
            RecommendedAfter => "recommended_after",
            BuildUpon => "build_upon",
            AppliesTo => "applies_to",
            Solves => "solves",
            ExampleOf => "example_of",
            GoodPractice => "good_practice",
            BadPractice => "bad_practice",
            AlternativeTo => "alternative_to",
        }
    }
}

/// Strength of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStrength {
    Weak,
    #[default]
    Moderate,
    Strong,
    Critical,
}

impl Kind for RelationshipStrength {
    const ALL: &'static [Self] = &[
        RelationshipStrength::Weak,
        RelationshipStrength::Moderate,
        RelationshipStrength::Strong,
        RelationshipStrength::Critical,
    ];

    const FIELD: &'static str = "strength";

    fn as_str(&self) -> &'static str {
        match self {
            RelationshipStrength::Weak => "weak",
            RelationshipStrength::Moderate => "moderate",
            RelationshipStrength::Strong => "strong",
            RelationshipStrength::Critical => "critical",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RelationshipStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for DifficultyLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for RelationshipType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for RelationshipStrength {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for kind in NodeType::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }
        for kind in RelationshipType::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_parse_known_values() {
        assert_eq!("data_structure".parse::<NodeType>().unwrap(), NodeType::DataStructure);
        assert_eq!("expert".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Expert);
        assert_eq!(
            "recommended_after".parse::<RelationshipType>().unwrap(),
            RelationshipType::RecommendedAfter
        );
        assert_eq!("critical".parse::<RelationshipStrength>().unwrap(), RelationshipStrength::Critical);
    }

    #[test]
    fn test_parse_unknown_value_is_rejected() {
        let err = "Concept".parse::<NodeType>().unwrap_err();
        assert_eq!(err, ValidationError::invalid("node_type", "Concept"));

        let err = "friend_of".parse::<RelationshipType>().unwrap_err();
        assert_eq!(err.field(), "relationship_type");
    }

    #[test]
    fn test_relationship_categories() {
        assert_eq!(RelationshipType::PartOf.category(), RelationshipCategory::Hierarchy);
        assert_eq!(RelationshipType::Prerequisite.category(), RelationshipCategory::Dependency);
        assert_eq!(RelationshipType::BuildUpon.category(), RelationshipCategory::Learning);
        assert_eq!(RelationshipType::AlternativeTo.category(), RelationshipCategory::Evaluative);
    }

    #[test]
    fn test_prerequisite_edges() {
        assert!(RelationshipType::Prerequisite.is_prerequisite_edge());
        assert!(RelationshipType::DependsOn.is_prerequisite_edge());
        assert!(!RelationshipType::Requires.is_prerequisite_edge());
    }

    #[test]
    fn test_label_is_upper_case() {
        assert_eq!(RelationshipType::DependsOn.label(), "DEPENDS_ON");
    }

    #[test]
    fn test_default_strength() {
        assert_eq!(RelationshipStrength::default(), RelationshipStrength::Moderate);
    }
}
