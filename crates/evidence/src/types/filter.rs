//! Filter intents for multi-dimension evidence queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EvidenceError, EvidenceResult};
use crate::schema;

/// How the identifiers of one dimension combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanOperator {
    /// Every identifier must match.
    And,
    /// At least one identifier must match.
    #[default]
    Or,
    /// No identifier may match.
    Not,
}

/// Operator names and the boolean occurrence each one maps to.
const OPERATOR_TABLE: [(&str, BooleanOperator, &str); 3] = [
    ("AND", BooleanOperator::And, "must"),
    ("OR", BooleanOperator::Or, "should"),
    ("NOT", BooleanOperator::Not, "must_not"),
];

impl BooleanOperator {
    /// Looks up an operator by name, case-insensitively.
    ///
    /// Unknown names are rejected with
    /// [`EvidenceError::InvalidFilterCombination`].
    pub fn parse(name: &str, dimension: FilterDimension) -> EvidenceResult<Self> {
        let upper = name.trim().to_ascii_uppercase();
        OPERATOR_TABLE
            .iter()
            .find(|(n, _, _)| *n == upper)
            .map(|(_, op, _)| *op)
            .ok_or_else(|| EvidenceError::InvalidFilterCombination {
                dimension: dimension.to_string(),
                operator: name.to_string(),
            })
    }

    /// The operator's canonical name.
    pub fn as_str(&self) -> &'static str {
        self.entry().0
    }

    /// The bool-query occurrence (`must`, `should`, `must_not`).
    pub fn occurrence(&self) -> &'static str {
        self.entry().2
    }

    fn entry(&self) -> &'static (&'static str, BooleanOperator, &'static str) {
        match self {
            BooleanOperator::And => &OPERATOR_TABLE[0],
            BooleanOperator::Or => &OPERATOR_TABLE[1],
            BooleanOperator::Not => &OPERATOR_TABLE[2],
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filterable aspect of an evidence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterDimension {
    /// The subject gene/protein.
    Gene,
    /// The object disease/phenotype.
    Object,
    /// The evidence-type codes.
    EvidenceType,
}

impl FilterDimension {
    /// Dimension name as used by callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterDimension::Gene => "gene",
            FilterDimension::Object => "object",
            FilterDimension::EvidenceType => "evidenceType",
        }
    }

    /// Evidence field the dimension filters on.
    pub fn field(&self) -> &'static str {
        match self {
            FilterDimension::Gene => schema::evidence::SUBJECT_ABOUT,
            FilterDimension::Object => schema::evidence::OBJECT_ABOUT,
            FilterDimension::EvidenceType => schema::evidence::EVIDENCE_CODES,
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identifiers and operator for a single dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFilter {
    /// Which dimension.
    pub dimension: FilterDimension,
    /// Raw identifiers, in caller order.
    pub values: Vec<String>,
    /// How the identifiers combine.
    pub operator: BooleanOperator,
}

/// Per-dimension filters, combined with AND.
///
/// A dimension appears at most once; setting it again replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    filters: Vec<DimensionFilter>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a dimension's identifiers and operator.
    pub fn with<I, S>(
        mut self,
        dimension: FilterDimension,
        values: I,
        operator: BooleanOperator,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = DimensionFilter {
            dimension,
            values: values.into_iter().map(Into::into).collect(),
            operator,
        };
        match self.filters.iter_mut().find(|f| f.dimension == dimension) {
            Some(existing) => *existing = filter,
            None => {
                self.filters.push(filter);
                self.filters.sort_by_key(|f| f.dimension);
            }
        }
        self
    }

    /// Sets a dimension using an operator name, as received from a caller.
    pub fn with_named<I, S>(
        self,
        dimension: FilterDimension,
        values: I,
        operator: &str,
    ) -> EvidenceResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let operator = BooleanOperator::parse(operator, dimension)?;
        Ok(self.with(dimension, values, operator))
    }

    /// Filter for a dimension, if set.
    pub fn get(&self, dimension: FilterDimension) -> Option<&DimensionFilter> {
        self.filters.iter().find(|f| f.dimension == dimension)
    }

    /// Dimensions in canonical order (gene, object, evidence type).
    pub fn iter(&self) -> impl Iterator<Item = &DimensionFilter> {
        self.filters.iter()
    }

    /// Returns true if no dimension carries any identifier.
    pub fn is_empty(&self) -> bool {
        self.filters.iter().all(|f| f.values.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operator_case_insensitive() {
        assert_eq!(
            BooleanOperator::parse("and", FilterDimension::Gene).unwrap(),
            BooleanOperator::And
        );
        assert_eq!(
            BooleanOperator::parse("Or", FilterDimension::Object).unwrap(),
            BooleanOperator::Or
        );
        assert_eq!(
            BooleanOperator::parse("NOT", FilterDimension::EvidenceType).unwrap(),
            BooleanOperator::Not
        );
    }

    #[test]
    fn test_parse_unknown_operator() {
        let err = BooleanOperator::parse("xor", FilterDimension::Gene).unwrap_err();
        match err {
            EvidenceError::InvalidFilterCombination {
                dimension,
                operator,
            } => {
                assert_eq!(dimension, "gene");
                assert_eq!(operator, "xor");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_occurrences() {
        assert_eq!(BooleanOperator::And.occurrence(), "must");
        assert_eq!(BooleanOperator::Or.occurrence(), "should");
        assert_eq!(BooleanOperator::Not.occurrence(), "must_not");
    }

    #[test]
    fn test_filter_set_replaces_and_orders() {
        let filters = FilterSet::new()
            .with(FilterDimension::EvidenceType, ["ECO:0000205"], BooleanOperator::Or)
            .with(FilterDimension::Gene, ["P38398"], BooleanOperator::Or)
            .with(FilterDimension::Gene, ["ENSG00000012048", "BRCA2"], BooleanOperator::And);

        let dims: Vec<_> = filters.iter().map(|f| f.dimension).collect();
        assert_eq!(dims, vec![FilterDimension::Gene, FilterDimension::EvidenceType]);

        let gene = filters.get(FilterDimension::Gene).unwrap();
        assert_eq!(gene.values, vec!["ENSG00000012048", "BRCA2"]);
        assert_eq!(gene.operator, BooleanOperator::And);
    }

    #[test]
    fn test_with_named_rejects_unknown() {
        let result = FilterSet::new().with_named(FilterDimension::Object, ["EFO_0000305"], "nand");
        assert!(matches!(
            result,
            Err(EvidenceError::InvalidFilterCombination { .. })
        ));
    }

    #[test]
    fn test_empty_filter_set() {
        assert!(FilterSet::new().is_empty());
        let empty_values: Vec<String> = Vec::new();
        assert!(
            FilterSet::new()
                .with(FilterDimension::Gene, empty_values, BooleanOperator::And)
                .is_empty()
        );
    }
}
