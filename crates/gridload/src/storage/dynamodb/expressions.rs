//! Expression rendering for DynamoDB requests.
//!
//! Pure builders that turn typed descriptors into key-condition, update,
//! condition and projection expressions. Every attribute path goes through an
//! expression attribute name, so reserved words such as `year` or `DateTime`
//! never reach the expression text.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};

pub type ExpressionNames = HashMap<String, String>;
pub type ExpressionValues = HashMap<String, AttributeValue>;

/// Placeholder registry shared by every clause of one request.
#[derive(Debug, Default)]
pub struct ExpressionContext {
    names: Vec<String>,
    values: ExpressionValues,
}

impl ExpressionContext {
    /// Placeholder for a single attribute name. Repeated names share one placeholder.
    pub fn name(&mut self, attribute: &str) -> String {
        let index = match self.names.iter().position(|name| name == attribute) {
            Some(index) => index,
            None => {
                self.names.push(attribute.to_string());
                self.names.len() - 1
            }
        };
        format!("#n{index}")
    }

    /// Renders a document path such as `info.actors[0]`, keeping list indexes.
    pub fn path(&mut self, path: &str) -> String {
        path.split('.')
            .map(|segment| {
                let (name, index) = match segment.find('[') {
                    Some(pos) => segment.split_at(pos),
                    None => (segment, ""),
                };
                format!("{}{}", self.name(name), index)
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Placeholder for a value.
    pub fn value(&mut self, value: AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value);
        placeholder
    }

    /// Splits into the request maps. Empty maps become `None`, since DynamoDB
    /// rejects an empty `ExpressionAttributeValues`.
    pub fn into_parts(self) -> (Option<ExpressionNames>, Option<ExpressionValues>) {
        let names: ExpressionNames = self
            .names
            .into_iter()
            .enumerate()
            .map(|(index, name)| (format!("#n{index}"), name))
            .collect();
        let names = (!names.is_empty()).then_some(names);
        let values = (!self.values.is_empty()).then_some(self.values);
        (names, values)
    }
}

// ============================================================================
// Key queries
// ============================================================================

/// Condition on the sort key of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKeyCondition {
    Equals(AttributeValue),
    Between(AttributeValue, AttributeValue),
    AtLeast(AttributeValue),
    AtMost(AttributeValue),
    BeginsWith(String),
}

/// Partition equality plus an optional sort-key condition and projection.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyQuery {
    partition_name: String,
    partition_value: AttributeValue,
    sort: Option<(String, SortKeyCondition)>,
    projection: Vec<String>,
}

/// A [`KeyQuery`] rendered into request fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub key_condition: String,
    pub projection: Option<String>,
    pub names: Option<ExpressionNames>,
    pub values: Option<ExpressionValues>,
}

impl KeyQuery {
    pub fn partition(name: &str, value: AttributeValue) -> Self {
        Self {
            partition_name: name.to_string(),
            partition_value: value,
            sort: None,
            projection: Vec::new(),
        }
    }

    pub fn sort(mut self, name: &str, condition: SortKeyCondition) -> Self {
        self.sort = Some((name.to_string(), condition));
        self
    }

    /// Restricts the returned attributes to the given document paths.
    pub fn project<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn render(&self) -> RenderedQuery {
        let mut ctx = ExpressionContext::default();

        let partition = ctx.name(&self.partition_name);
        let partition_value = ctx.value(self.partition_value.clone());
        let mut key_condition = format!("{partition} = {partition_value}");

        if let Some((name, condition)) = &self.sort {
            let sort = ctx.name(name);
            let clause = match condition {
                SortKeyCondition::Equals(value) => format!("{sort} = {}", ctx.value(value.clone())),
                SortKeyCondition::Between(low, high) => {
                    let low = ctx.value(low.clone());
                    let high = ctx.value(high.clone());
                    format!("{sort} BETWEEN {low} AND {high}")
                }
                SortKeyCondition::AtLeast(value) => {
                    format!("{sort} >= {}", ctx.value(value.clone()))
                }
                SortKeyCondition::AtMost(value) => {
                    format!("{sort} <= {}", ctx.value(value.clone()))
                }
                SortKeyCondition::BeginsWith(prefix) => {
                    let prefix = ctx.value(AttributeValue::S(prefix.clone()));
                    format!("begins_with({sort}, {prefix})")
                }
            };
            key_condition = format!("{key_condition} AND {clause}");
        }

        let projection = (!self.projection.is_empty()).then(|| {
            self.projection
                .iter()
                .map(|path| ctx.path(path))
                .collect::<Vec<_>>()
                .join(", ")
        });

        let (names, values) = ctx.into_parts();
        RenderedQuery {
            key_condition,
            projection,
            names,
            values,
        }
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// Server-evaluated condition on the current item.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Exists(String),
    SizeGreaterThan(String, AttributeValue),
    AtMost(String, AttributeValue),
}

impl Condition {
    fn render(&self, ctx: &mut ExpressionContext) -> String {
        match self {
            Condition::Exists(path) => format!("attribute_exists({})", ctx.path(path)),
            Condition::SizeGreaterThan(path, value) => {
                let path = ctx.path(path);
                format!("size({path}) > {}", ctx.value(value.clone()))
            }
            Condition::AtMost(path, value) => {
                let path = ctx.path(path);
                format!("{path} <= {}", ctx.value(value.clone()))
            }
        }
    }
}

fn render_conditions(conditions: &[Condition], ctx: &mut ExpressionContext) -> Option<String> {
    if conditions.is_empty() {
        return None;
    }
    Some(
        conditions
            .iter()
            .map(|condition| condition.render(ctx))
            .collect::<Vec<_>>()
            .join(" AND "),
    )
}

/// Conditions rendered on their own, for conditional puts and deletes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCondition {
    pub expression: Option<String>,
    pub names: Option<ExpressionNames>,
    pub values: Option<ExpressionValues>,
}

pub fn render_condition(conditions: &[Condition]) -> RenderedCondition {
    let mut ctx = ExpressionContext::default();
    let expression = render_conditions(conditions, &mut ctx);
    let (names, values) = ctx.into_parts();
    RenderedCondition {
        expression,
        names,
        values,
    }
}

// ============================================================================
// Updates
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum UpdateAction {
    Set(String, AttributeValue),
    Increment(String, AttributeValue),
    Remove(String),
}

/// Update expression builder with optional guard conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    actions: Vec<UpdateAction>,
    conditions: Vec<Condition>,
    return_values: ReturnValue,
}

/// An [`Update`] rendered into request fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedUpdate {
    pub update_expression: String,
    pub condition_expression: Option<String>,
    pub names: Option<ExpressionNames>,
    pub values: Option<ExpressionValues>,
}

impl Update {
    pub fn new(return_values: ReturnValue) -> Self {
        Self {
            actions: Vec::new(),
            conditions: Vec::new(),
            return_values,
        }
    }

    /// `SET path = value`
    pub fn set(mut self, path: &str, value: AttributeValue) -> Self {
        self.actions.push(UpdateAction::Set(path.to_string(), value));
        self
    }

    /// `SET path = path + delta`
    pub fn increment(mut self, path: &str, delta: AttributeValue) -> Self {
        self.actions
            .push(UpdateAction::Increment(path.to_string(), delta));
        self
    }

    /// `REMOVE path`
    pub fn remove(mut self, path: &str) -> Self {
        self.actions.push(UpdateAction::Remove(path.to_string()));
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn return_values(&self) -> ReturnValue {
        self.return_values.clone()
    }

    pub fn render(&self) -> RenderedUpdate {
        let mut ctx = ExpressionContext::default();
        let mut sets = Vec::new();
        let mut removes = Vec::new();

        for action in &self.actions {
            match action {
                UpdateAction::Set(path, value) => {
                    let path = ctx.path(path);
                    let value = ctx.value(value.clone());
                    sets.push(format!("{path} = {value}"));
                }
                UpdateAction::Increment(path, delta) => {
                    let path = ctx.path(path);
                    let delta = ctx.value(delta.clone());
                    sets.push(format!("{path} = {path} + {delta}"));
                }
                UpdateAction::Remove(path) => removes.push(ctx.path(path)),
            }
        }

        let mut clauses = Vec::new();
        if !sets.is_empty() {
            clauses.push(format!("SET {}", sets.join(", ")));
        }
        if !removes.is_empty() {
            clauses.push(format!("REMOVE {}", removes.join(", ")));
        }

        let condition_expression = render_conditions(&self.conditions, &mut ctx);
        let (names, values) = ctx.into_parts();

        RenderedUpdate {
            update_expression: clauses.join(" "),
            condition_expression,
            names,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: &str) -> AttributeValue {
        AttributeValue::N(value.to_string())
    }

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    #[test]
    fn test_partition_only_query() {
        let rendered = KeyQuery::partition("year", n("2013")).render();

        assert_eq!(rendered.key_condition, "#n0 = :v0");
        assert_eq!(rendered.projection, None);
        assert_eq!(rendered.names.unwrap().get("#n0").unwrap(), "year");
        assert_eq!(rendered.values.unwrap().get(":v0"), Some(&n("2013")));
    }

    #[test]
    fn test_between_query_with_projection() {
        let rendered = KeyQuery::partition("year", n("2013"))
            .sort("title", SortKeyCondition::Between(s("A"), s("Z")))
            .project(["year", "title", "info.genres", "info.actors[0]"])
            .render();

        assert_eq!(rendered.key_condition, "#n0 = :v0 AND #n1 BETWEEN :v1 AND :v2");
        assert_eq!(
            rendered.projection.as_deref(),
            Some("#n0, #n1, #n2.#n3, #n2.#n4[0]")
        );

        let names = rendered.names.unwrap();
        assert_eq!(names.len(), 5);
        assert_eq!(names.get("#n2").unwrap(), "info");
        assert_eq!(names.get("#n4").unwrap(), "actors");

        let values = rendered.values.unwrap();
        assert_eq!(values.get(":v1"), Some(&s("A")));
        assert_eq!(values.get(":v2"), Some(&s("Z")));
    }

    #[test]
    fn test_begins_with_query() {
        let rendered = KeyQuery::partition("Id", n("42"))
            .sort("Id_CountryFK", SortKeyCondition::BeginsWith("42_".to_string()))
            .render();

        assert_eq!(rendered.key_condition, "#n0 = :v0 AND begins_with(#n1, :v1)");
        assert_eq!(rendered.values.unwrap().get(":v1"), Some(&s("42_")));
    }

    #[test]
    fn test_open_ended_sort_conditions() {
        let at_least = KeyQuery::partition("entsoeAreaReference_FK", n("1"))
            .sort("DateTime", SortKeyCondition::AtLeast(s("2020-10-13 00:00:00")))
            .render();
        assert_eq!(at_least.key_condition, "#n0 = :v0 AND #n1 >= :v1");

        let at_most = KeyQuery::partition("entsoeAreaReference_FK", n("1"))
            .sort("DateTime", SortKeyCondition::AtMost(s("2020-10-13 00:00:00")))
            .render();
        assert_eq!(at_most.key_condition, "#n0 = :v0 AND #n1 <= :v1");

        let equals = KeyQuery::partition("Id", n("1"))
            .sort("Id_CountryFK", SortKeyCondition::Equals(s("1_3")))
            .render();
        assert_eq!(equals.key_condition, "#n0 = :v0 AND #n1 = :v1");
    }

    #[test]
    fn test_update_sets_share_name_placeholders() {
        let rendered = Update::new(ReturnValue::UpdatedNew)
            .set("info.rating", n("5.5"))
            .set("info.plot", s("Everything happens all at once."))
            .condition(Condition::Exists("title".to_string()))
            .render();

        assert_eq!(
            rendered.update_expression,
            "SET #n0.#n1 = :v0, #n0.#n2 = :v1"
        );
        assert_eq!(
            rendered.condition_expression.as_deref(),
            Some("attribute_exists(#n3)")
        );
        assert_eq!(rendered.names.unwrap().len(), 4);
    }

    #[test]
    fn test_increment_renders_arithmetic() {
        let rendered = Update::new(ReturnValue::UpdatedNew)
            .increment("info.rating", n("1"))
            .render();

        assert_eq!(rendered.update_expression, "SET #n0.#n1 = #n0.#n1 + :v0");
        assert_eq!(rendered.condition_expression, None);
    }

    #[test]
    fn test_remove_with_size_condition() {
        let rendered = Update::new(ReturnValue::AllNew)
            .remove("info.actors[0]")
            .condition(Condition::SizeGreaterThan("info.actors".to_string(), n("3")))
            .render();

        assert_eq!(rendered.update_expression, "REMOVE #n0.#n1[0]");
        assert_eq!(
            rendered.condition_expression.as_deref(),
            Some("size(#n0.#n1) > :v0")
        );
        assert_eq!(rendered.values.unwrap().get(":v0"), Some(&n("3")));
    }

    #[test]
    fn test_standalone_condition() {
        let rendered = render_condition(&[Condition::AtMost("info.rating".to_string(), n("5"))]);

        assert_eq!(rendered.expression.as_deref(), Some("#n0.#n1 <= :v0"));
        assert!(rendered.names.is_some());
    }

    #[test]
    fn test_empty_condition_has_no_maps() {
        let rendered = render_condition(&[]);

        assert_eq!(rendered.expression, None);
        assert_eq!(rendered.names, None);
        assert_eq!(rendered.values, None);
    }
}
