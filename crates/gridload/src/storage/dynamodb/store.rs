//! Typed DynamoDB store client.
//!
//! One method per store operation. Each call is a single round-trip except
//! `query`, which follows `LastEvaluatedKey` until the partition slice is
//! exhausted. Conditional writes ask for the old item on condition failure so
//! a failed guard can be told apart from a missing item.

use std::collections::HashMap;

use aws_config::meta::region::{ProvideRegion, RegionProviderChain};
use aws_config::Region;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue, ReturnValuesOnConditionCheckFailure};
use aws_sdk_dynamodb::Client;
use gridload_core::storage::{ConditionalOutcome, Result};

use crate::config::Config;

use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
    map_update_item_error,
};
use super::expressions::{render_condition, Condition, KeyQuery, Update};

pub type Item = HashMap<String, AttributeValue>;

/// Region from `primary`, or `fallback` when it yields none.
fn region_chain(primary: impl ProvideRegion + 'static, fallback: &str) -> RegionProviderChain {
    RegionProviderChain::first_try(primary).or_else(Region::new(fallback.to_string()))
}

/// Raw result of a conditional update or delete.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The write was applied. Carries the attributes requested by `ReturnValues`.
    Applied(Item),
    /// The condition did not hold. `current` is the stored item, if one exists.
    ConditionFailed { current: Option<Item> },
}

impl WriteOutcome {
    /// A failed condition with no stored item means the key does not exist.
    pub fn into_conditional(self) -> ConditionalOutcome<Item> {
        match self {
            WriteOutcome::Applied(item) => ConditionalOutcome::Applied(item),
            WriteOutcome::ConditionFailed { current: Some(_) } => {
                ConditionalOutcome::ConditionFailed
            }
            WriteOutcome::ConditionFailed { current: None } => ConditionalOutcome::NotFound,
        }
    }
}

/// Cheaply cloneable handle over the SDK client.
#[derive(Clone, Debug)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the SDK client from configuration.
    ///
    /// Region and credentials come from the default provider chain, with the
    /// configured region as fallback. The endpoint override targets DynamoDB
    /// Local. Every operation is bounded by the configured store timeout.
    pub async fn from_config(config: &Config) -> Self {
        let timeout_config = aws_config::timeout::TimeoutConfig::builder()
            .operation_timeout(config.store_timeout())
            .build();

        let region = region_chain(RegionProviderChain::default_provider(), &config.aws_region);

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region)
            .timeout_config(timeout_config);

        if let Some(endpoint) = &config.aws_endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }

    /// Writes an item, overwriting any item with the same key.
    pub async fn put(&self, table: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table))?;

        tracing::debug!(table, "put_item");
        Ok(())
    }

    /// Gets an item by its full key.
    pub async fn get(&self, table: &str, key: Item) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| map_get_item_error(e, table))?;

        tracing::debug!(table, found = result.item.is_some(), "get_item");
        Ok(result.item)
    }

    /// Runs a key query across every result page, in ascending sort-key order.
    pub async fn query(&self, table: &str, query: &KeyQuery) -> Result<Vec<Item>> {
        let rendered = query.render();
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;
        let mut pages = 0;

        loop {
            pages += 1;
            let result = self
                .client
                .query()
                .table_name(table)
                .key_condition_expression(&rendered.key_condition)
                .set_projection_expression(rendered.projection.clone())
                .set_expression_attribute_names(rendered.names.clone())
                .set_expression_attribute_values(rendered.values.clone())
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| map_query_error(e, table))?;

            items.extend(result.items.unwrap_or_default());

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        tracing::debug!(
            table,
            key_condition = %rendered.key_condition,
            pages,
            items = items.len(),
            "query"
        );
        Ok(items)
    }

    /// Applies an update if its conditions hold.
    pub async fn update(&self, table: &str, key: Item, update: &Update) -> Result<WriteOutcome> {
        let rendered = update.render();
        tracing::debug!(
            table,
            update_expression = %rendered.update_expression,
            condition = ?rendered.condition_expression,
            "update_item"
        );

        let result = self
            .client
            .update_item()
            .table_name(table)
            .set_key(Some(key))
            .update_expression(rendered.update_expression)
            .set_condition_expression(rendered.condition_expression)
            .set_expression_attribute_names(rendered.names)
            .set_expression_attribute_values(rendered.values)
            .return_values(update.return_values())
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .send()
            .await;

        match result {
            Ok(output) => Ok(WriteOutcome::Applied(output.attributes.unwrap_or_default())),
            Err(err) => {
                if let Some(UpdateItemError::ConditionalCheckFailedException(failed)) =
                    err.as_service_error()
                {
                    return Ok(WriteOutcome::ConditionFailed {
                        current: failed.item().cloned(),
                    });
                }
                Err(map_update_item_error(err, table))
            }
        }
    }

    /// Deletes an item if its conditions hold, returning the deleted item.
    pub async fn delete(
        &self,
        table: &str,
        key: Item,
        conditions: &[Condition],
    ) -> Result<WriteOutcome> {
        let rendered = render_condition(conditions);
        tracing::debug!(table, condition = ?rendered.expression, "delete_item");

        let result = self
            .client
            .delete_item()
            .table_name(table)
            .set_key(Some(key))
            .set_condition_expression(rendered.expression)
            .set_expression_attribute_names(rendered.names)
            .set_expression_attribute_values(rendered.values)
            .return_values(ReturnValue::AllOld)
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .send()
            .await;

        match result {
            Ok(output) => Ok(WriteOutcome::Applied(output.attributes.unwrap_or_default())),
            Err(err) => {
                if let Some(DeleteItemError::ConditionalCheckFailedException(failed)) =
                    err.as_service_error()
                {
                    return Ok(WriteOutcome::ConditionFailed {
                        current: failed.item().cloned(),
                    });
                }
                Err(map_delete_item_error(err, table))
            }
        }
    }
}
