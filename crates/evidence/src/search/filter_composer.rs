//! Boolean filter clauses for multi-dimension evidence queries.

use serde_json::{Value, json};

use super::alias;
use crate::types::{BooleanOperator, FilterDimension, FilterSet};

/// Builds the clause for one dimension.
///
/// Each identifier becomes a `terms` leaf over all of its alias forms; the
/// leaves are combined with the dimension's operator. An empty identifier
/// list yields `None` so the dimension does not constrain the query at all.
pub fn compose(
    dimension: FilterDimension,
    identifiers: &[String],
    operator: BooleanOperator,
) -> Option<Value> {
    if identifiers.is_empty() {
        return None;
    }

    let leaves: Vec<Value> = identifiers
        .iter()
        .map(|id| json!({ "terms": { dimension.field(): alias::expand(dimension, id) } }))
        .collect();

    let mut clause = json!({ "bool": { operator.occurrence(): leaves } });
    if operator == BooleanOperator::Or {
        clause["bool"]["minimum_should_match"] = json!(1);
    }
    Some(clause)
}

/// Builds the dimension clauses of a filter set, in dimension order.
pub fn compose_conditions(filters: &FilterSet) -> Vec<Value> {
    filters
        .iter()
        .filter_map(|f| compose(f.dimension, &f.values, f.operator))
        .collect()
}

/// Builds the complete query for a filter set.
///
/// Dimension clauses are always combined with AND. Filters do not score, so
/// the query runs in filter context.
pub fn compose_query(filters: &FilterSet) -> Value {
    json!({
        "constant_score": {
            "filter": {
                "bool": { "must": compose_conditions(filters) }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_identifiers_are_a_no_op() {
        assert!(compose(FilterDimension::Gene, &[], BooleanOperator::And).is_none());
        assert!(compose(FilterDimension::Object, &[], BooleanOperator::Not).is_none());
    }

    #[test]
    fn test_or_clause() {
        let clause = compose(
            FilterDimension::Gene,
            &ids(&["P38398", "ENSG00000141510"]),
            BooleanOperator::Or,
        )
        .unwrap();
        let leaves = clause["bool"]["should"].as_array().unwrap();
        assert_eq!(leaves.len(), 2);
        assert_eq!(
            leaves[0]["terms"]["biological_subject.about"],
            json!([
                "P38398",
                "http://identifiers.org/uniprot/P38398",
                "http://identifiers.org/ensembl/P38398"
            ])
        );
        assert_eq!(clause["bool"]["minimum_should_match"], 1);
    }

    #[test]
    fn test_and_and_not_clauses() {
        let and = compose(
            FilterDimension::EvidenceType,
            &ids(&["ECO:0000205"]),
            BooleanOperator::And,
        )
        .unwrap();
        assert!(and["bool"]["must"].is_array());
        assert_eq!(
            and["bool"]["must"][0]["terms"]["evidence.evidence_codes"][1],
            "http://identifiers.org/eco/ECO:0000205"
        );

        let not = compose(
            FilterDimension::Object,
            &ids(&["EFO_0000305"]),
            BooleanOperator::Not,
        )
        .unwrap();
        assert_eq!(
            not["bool"]["must_not"][0]["terms"]["biological_object.about"],
            json!(["EFO_0000305", "http://identifiers.org/efo/EFO_0000305"])
        );
        assert!(not["bool"].get("minimum_should_match").is_none());
    }

    #[test]
    fn test_query_combines_dimensions_with_and() {
        let filters = FilterSet::new()
            .with(FilterDimension::Object, ["EFO_0000305"], BooleanOperator::Or)
            .with(FilterDimension::Gene, ["BRCA1", "BRCA2"], BooleanOperator::And)
            .with(FilterDimension::EvidenceType, Vec::<String>::new(), BooleanOperator::Not);

        let query = compose_query(&filters);
        let conditions = query["constant_score"]["filter"]["bool"]["must"]
            .as_array()
            .unwrap();
        assert_eq!(conditions.len(), 2);
        assert!(conditions[0]["bool"]["must"].is_array());
        assert!(conditions[1]["bool"]["should"].is_array());
    }

    #[test]
    fn test_empty_filter_set_matches_everything() {
        let query = compose_query(&FilterSet::new());
        assert_eq!(
            query,
            json!({"constant_score": {"filter": {"bool": {"must": []}}}})
        );
    }
}
