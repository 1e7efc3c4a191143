//! Structured predicates and updaters for filtered repository calls.
//!
//! Managers pass these through untouched; each repository maps field names to
//! its own storage columns and rejects unknown fields.

use crate::repo::repository::{RepoError, RepoResult};
use rusqlite::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// SQL `LIKE` pattern match.
    Like,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    fn takes_operand(self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Null,
    Integer(i64),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<&FilterValue> for Value {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Null => Value::Null,
            FilterValue::Integer(value) => Value::Integer(*value),
            FilterValue::Text(value) => Value::Text(value.clone()),
        }
    }
}

/// One `field operator operand` predicate. Filters in a slice are AND-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub operand: FilterValue,
}

impl Filter {
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        operand: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: operand.into(),
        }
    }

    pub fn eq(field: impl Into<String>, operand: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Eq, operand)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, FilterValue::Null)
    }
}

/// One `field = value` assignment for filtered updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updater {
    pub field: String,
    pub value: FilterValue,
}

impl Updater {
    pub fn set(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Appends ` AND <column> <op> ?` per filter, resolving fields through `columns`.
pub(crate) fn push_filters(
    sql: &mut String,
    binds: &mut Vec<Value>,
    filters: &[Filter],
    columns: &[(&str, &str)],
) -> RepoResult<()> {
    for filter in filters {
        let column = resolve(&filter.field, columns)?;
        sql.push_str(" AND ");
        sql.push_str(column);
        sql.push(' ');
        sql.push_str(filter.operator.sql());

        if filter.operator.takes_operand() {
            if filter.operand == FilterValue::Null {
                return Err(RepoError::InvalidFilter(format!(
                    "operator `{}` on `{}` needs a non-null operand",
                    filter.operator.sql(),
                    filter.field
                )));
            }
            sql.push_str(" ?");
            binds.push(Value::from(&filter.operand));
        }
    }
    Ok(())
}

/// Builds `a = ?, b = ?` from updaters, resolving fields to assignment templates.
pub(crate) fn assignments(
    updaters: &[Updater],
    templates: &[(&str, &str)],
    binds: &mut Vec<Value>,
) -> RepoResult<String> {
    if updaters.is_empty() {
        return Err(RepoError::InvalidFilter("no updaters given".to_string()));
    }
    let mut parts = Vec::with_capacity(updaters.len());
    for updater in updaters {
        parts.push(resolve(&updater.field, templates)?);
        binds.push(Value::from(&updater.value));
    }
    Ok(parts.join(", "))
}

pub(crate) fn names_field(filters: &[Filter], field: &str) -> bool {
    filters.iter().any(|filter| filter.field == field)
}

fn resolve<'a>(field: &str, columns: &[(&str, &'a str)]) -> RepoResult<&'a str> {
    columns
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, column)| *column)
        .ok_or_else(|| RepoError::InvalidFilter(format!("unknown field `{field}`")))
}

#[cfg(test)]
mod tests {
    use super::{assignments, push_filters, Filter, FilterOperator, FilterValue, Updater};
    use crate::repo::RepoError;
    use rusqlite::types::Value;

    const COLUMNS: &[(&str, &str)] = &[("id", "t.id"), ("tag", "t.tag")];

    #[test]
    fn filters_render_in_order_with_binds() {
        let mut sql = String::from("WHERE 1 = 1");
        let mut binds = Vec::new();
        push_filters(
            &mut sql,
            &mut binds,
            &[
                Filter::new("id", FilterOperator::Gt, 3_i64),
                Filter::new("tag", FilterOperator::Like, "ru%"),
                Filter::is_null("tag"),
            ],
            COLUMNS,
        )
        .expect("valid filters");

        assert_eq!(sql, "WHERE 1 = 1 AND t.id > ? AND t.tag LIKE ? AND t.tag IS NULL");
        assert_eq!(binds, vec![Value::Integer(3), Value::Text("ru%".to_string())]);
    }

    #[test]
    fn unknown_field_and_null_operand_are_rejected() {
        let mut sql = String::new();
        let mut binds = Vec::new();
        assert!(matches!(
            push_filters(&mut sql, &mut binds, &[Filter::eq("nope", 1_i64)], COLUMNS),
            Err(RepoError::InvalidFilter(_))
        ));
        assert!(matches!(
            push_filters(
                &mut sql,
                &mut binds,
                &[Filter::eq("id", FilterValue::Null)],
                COLUMNS
            ),
            Err(RepoError::InvalidFilter(_))
        ));
    }

    #[test]
    fn assignments_require_at_least_one_updater() {
        let mut binds = Vec::new();
        assert!(matches!(
            assignments(&[], &[("tag", "tag = ?")], &mut binds),
            Err(RepoError::InvalidFilter(_))
        ));
        let rendered = assignments(
            &[Updater::set("tag", "new"), Updater::set("tag", None::<String>)],
            &[("tag", "tag = ?")],
            &mut binds,
        )
        .expect("valid updaters");
        assert_eq!(rendered, "tag = ?, tag = ?");
        assert_eq!(binds, vec![Value::Text("new".to_string()), Value::Null]);
    }
}
