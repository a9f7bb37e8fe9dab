//! Search Filters
//!
//! Query parameters are parsed against a fixed table of filterable fields per
//! entity. Reference fields parse as identifiers, numeric fields as integers;
//! anything else is an exact string match. Unknown parameters are rejected.

use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

use crate::utils::validation::normalize_email;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    Text,
    /// Text compared after email normalization
    Email,
    Number,
}

/// A filterable field: the query parameter name and the column it maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub param: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

const fn field(param: &'static str, column: &'static str, kind: FieldKind) -> FilterField {
    FilterField {
        param,
        column,
        kind,
    }
}

pub const ID_FIELD: FilterField = field("id", "id", FieldKind::Id);

pub const OWNER_FILTER_FIELDS: &[FilterField] = &[
    ID_FIELD,
    field("name", "name", FieldKind::Text),
    field("email", "email", FieldKind::Email),
    field("gender", "gender", FieldKind::Text),
    field("address", "address", FieldKind::Text),
    field("mobile", "mobile", FieldKind::Number),
    field("clinicId", "clinic_id", FieldKind::Id),
];

pub const CLINIC_FILTER_FIELDS: &[FilterField] = &[
    ID_FIELD,
    field("ownerId", "owner_id", FieldKind::Id),
    field("name", "name", FieldKind::Text),
    field("address", "address", FieldKind::Text),
    field("mobile", "mobile", FieldKind::Number),
    field("pincode", "pincode", FieldKind::Number),
];

pub const DOCTOR_FILTER_FIELDS: &[FilterField] = &[
    ID_FIELD,
    field("name", "name", FieldKind::Text),
    field("email", "email", FieldKind::Email),
    field("qualifications", "qualifications", FieldKind::Text),
    field("workingAt", "working_at", FieldKind::Text),
    field("address", "address", FieldKind::Text),
    field("mobile", "mobile", FieldKind::Number),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Id(Uuid),
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub field: FilterField,
    pub value: FilterValue,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter field '{0}'")]
    UnknownField(String),

    #[error("Invalid id for filter field '{0}'")]
    InvalidId(String),

    #[error("Invalid number for filter field '{0}'")]
    InvalidNumber(String),
}

/// Entities that can be matched against a filter without a database
pub trait Filterable {
    /// Current value of the given column, `None` when unset
    fn field_value(&self, column: &str) -> Option<FilterValue>;
}

/// Conjunction of equality conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    conditions: Vec<FilterCondition>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse query parameters against an entity's filterable fields
    pub fn from_params(
        fields: &[FilterField],
        params: &BTreeMap<String, String>,
    ) -> Result<Self, FilterError> {
        let mut filter = Self::new();

        for (param, raw) in params {
            let field = fields
                .iter()
                .find(|f| f.param == param)
                .copied()
                .ok_or_else(|| FilterError::UnknownField(param.clone()))?;

            let value = match field.kind {
                FieldKind::Id => Uuid::parse_str(raw.trim())
                    .map(FilterValue::Id)
                    .map_err(|_| FilterError::InvalidId(param.clone()))?,
                FieldKind::Number => raw
                    .trim()
                    .parse::<i64>()
                    .map(FilterValue::Number)
                    .map_err(|_| FilterError::InvalidNumber(param.clone()))?,
                FieldKind::Email => FilterValue::Text(normalize_email(raw)),
                FieldKind::Text => FilterValue::Text(raw.clone()),
            };

            filter.conditions.push(FilterCondition { field, value });
        }

        Ok(filter)
    }

    /// Filter matching a single record by id
    pub fn by_id(id: Uuid) -> Self {
        Self {
            conditions: vec![FilterCondition {
                field: ID_FIELD,
                value: FilterValue::Id(id),
            }],
        }
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches<T: Filterable>(&self, item: &T) -> bool {
        self.conditions
            .iter()
            .all(|condition| item.field_value(condition.field.column).as_ref() == Some(&condition.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    struct Sample {
        id: Uuid,
        name: String,
        mobile: i64,
    }

    impl Filterable for Sample {
        fn field_value(&self, column: &str) -> Option<FilterValue> {
            match column {
                "id" => Some(FilterValue::Id(self.id)),
                "name" => Some(FilterValue::Text(self.name.clone())),
                "mobile" => Some(FilterValue::Number(self.mobile)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_empty_params_match_everything() {
        let filter = SearchFilter::from_params(DOCTOR_FILTER_FIELDS, &BTreeMap::new()).unwrap();
        assert!(filter.is_empty());
        assert!(filter.matches(&Sample {
            id: Uuid::new_v4(),
            name: "Dr. Mir".into(),
            mobile: 9797798243,
        }));
    }

    #[test]
    fn test_typed_values() {
        let id = Uuid::new_v4();
        let filter = SearchFilter::from_params(
            CLINIC_FILTER_FIELDS,
            &params(&[("id", &id.to_string()), ("pincode", "190011")]),
        )
        .unwrap();

        assert_eq!(filter.conditions().len(), 2);
        assert!(filter
            .conditions()
            .iter()
            .any(|c| c.value == FilterValue::Id(id)));
        assert!(filter
            .conditions()
            .iter()
            .any(|c| c.value == FilterValue::Number(190011)));
    }

    #[test]
    fn test_malformed_id_is_rejected() {
        let result = SearchFilter::from_params(
            DOCTOR_FILTER_FIELDS,
            &params(&[("id", "64b7f0c2e4b0a1a2b3c4d5e6")]),
        );
        assert_eq!(result, Err(FilterError::InvalidId("id".into())));
    }

    #[test]
    fn test_unknown_and_non_numeric_fields() {
        assert_eq!(
            SearchFilter::from_params(OWNER_FILTER_FIELDS, &params(&[("password", "x")])),
            Err(FilterError::UnknownField("password".into()))
        );
        assert_eq!(
            SearchFilter::from_params(OWNER_FILTER_FIELDS, &params(&[("mobile", "97977")]))
                .map(|f| f.conditions().len()),
            Ok(1)
        );
        assert_eq!(
            SearchFilter::from_params(OWNER_FILTER_FIELDS, &params(&[("mobile", "abc")])),
            Err(FilterError::InvalidNumber("mobile".into()))
        );
    }

    #[test]
    fn test_email_values_are_normalized() {
        let filter = SearchFilter::from_params(
            OWNER_FILTER_FIELDS,
            &params(&[("email", " Saqlain@Gmail.com ")]),
        )
        .unwrap();
        assert_eq!(
            filter.conditions()[0].value,
            FilterValue::Text("saqlain@gmail.com".into())
        );
    }

    #[test]
    fn test_matches_is_a_conjunction() {
        let sample = Sample {
            id: Uuid::new_v4(),
            name: "HealthFirst".into(),
            mobile: 9876543000,
        };

        let by_id = SearchFilter::by_id(sample.id);
        assert!(by_id.matches(&sample));
        assert!(!SearchFilter::by_id(Uuid::new_v4()).matches(&sample));

        let mismatch = SearchFilter::from_params(
            CLINIC_FILTER_FIELDS,
            &params(&[("name", "HealthFirst"), ("mobile", "1")]),
        )
        .unwrap();
        assert!(!mismatch.matches(&sample));
    }
}
