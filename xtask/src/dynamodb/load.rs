//! Fixture loading: JSON records to DynamoDB items.
//!
//! Conversion is pure and tested; only `write_items` talks to DynamoDB.

use super::config::TableKind;
use super::error::{DynamodbError, Result};
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

/// DynamoDB accepts at most 25 writes per batch.
const BATCH_SIZE: usize = 25;

/// Retries for items the store reports as unprocessed.
const MAX_UNPROCESSED_RETRIES: u32 = 5;

/// First wait before resubmitting unprocessed items; doubles per retry.
const UNPROCESSED_BACKOFF: Duration = Duration::from_millis(100);

pub type Item = HashMap<String, AttributeValue>;

impl TableKind {
    /// Name of the array field holding the records, `None` for a bare array.
    pub fn fixture_field(&self) -> Option<&'static str> {
        match self {
            TableKind::Movies => None,
            TableKind::ReferenceZones => Some("entsoeAreaRef"),
            TableKind::TotalLoad => Some("data"),
            TableKind::ResolutionCodes => Some("ResolutionCode"),
        }
    }
}

/// Parse a fixture document into store items for `kind`.
pub fn parse_fixture(kind: TableKind, contents: &str) -> Result<Vec<Item>> {
    let document: Value = serde_json::from_str(contents)?;

    let records = match kind.fixture_field() {
        None => document,
        Some(field) => match document {
            Value::Object(mut object) => object.remove(field).ok_or_else(|| {
                DynamodbError::InvalidFixture(format!("missing array field '{field}'"))
            })?,
            _ => {
                return Err(DynamodbError::InvalidFixture(format!(
                    "expected an object with an '{field}' field"
                )))
            }
        },
    };

    let Value::Array(records) = records else {
        return Err(DynamodbError::InvalidFixture(
            "records must be a JSON array".to_string(),
        ));
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Object(object) => record_to_item(kind, object),
            _ => Err(DynamodbError::InvalidFixture(format!(
                "record {index} is not an object"
            ))),
        })
        .collect()
}

/// Convert one record, deriving keys the fixture may omit and checking the key schema.
fn record_to_item(kind: TableKind, mut record: Map<String, Value>) -> Result<Item> {
    if kind == TableKind::ReferenceZones && !record.contains_key("Id_CountryFK") {
        let composite = match (record.get("Id"), record.get("Country_FK")) {
            (Some(id), Some(country)) => format!("{}_{}", scalar_text(id), scalar_text(country)),
            _ => {
                return Err(DynamodbError::InvalidFixture(
                    "zone record needs 'Id' and 'Country_FK'".to_string(),
                ))
            }
        };
        record.insert("Id_CountryFK".to_string(), Value::String(composite));
    }

    let item: Item = record
        .into_iter()
        .map(|(name, value)| (name, to_attribute_value(value)))
        .collect();

    let config = kind.table_config("");
    let keys = std::iter::once(&config.partition_key).chain(config.sort_key.as_ref());
    for key in keys {
        if !item.contains_key(&key.name) {
            return Err(DynamodbError::InvalidFixture(format!(
                "record is missing key attribute '{}'",
                key.name
            )));
        }
    }

    Ok(item)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON to attribute value. Numbers keep their shortest decimal text.
pub fn to_attribute_value(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => {
            AttributeValue::L(values.into_iter().map(to_attribute_value).collect())
        }
        Value::Object(object) => AttributeValue::M(
            object
                .into_iter()
                .map(|(k, v)| (k, to_attribute_value(v)))
                .collect(),
        ),
    }
}

/// Wait before the given retry (1-based) of unprocessed items.
fn retry_delay(retry: u32) -> Duration {
    UNPROCESSED_BACKOFF * 2u32.pow(retry.saturating_sub(1))
}

/// Write items in batches, resubmitting anything the store leaves unprocessed.
pub async fn write_items(client: &Client, table_name: &str, items: Vec<Item>) -> Result<usize> {
    let mut written = 0;

    for chunk in items.chunks(BATCH_SIZE) {
        let mut requests = chunk
            .iter()
            .map(|item| {
                PutRequest::builder()
                    .set_item(Some(item.clone()))
                    .build()
                    .map(|put| WriteRequest::builder().put_request(put).build())
                    .map_err(|e| DynamodbError::AwsSdk(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut attempts = 0;
        while !requests.is_empty() {
            if attempts > MAX_UNPROCESSED_RETRIES {
                return Err(DynamodbError::AwsSdk(format!(
                    "{} items left unprocessed in '{}'",
                    requests.len(),
                    table_name
                )));
            }
            if attempts > 0 {
                tokio::time::sleep(retry_delay(attempts)).await;
            }
            attempts += 1;

            let response = client
                .batch_write_item()
                .request_items(table_name, requests)
                .send()
                .await
                .map_err(|e| DynamodbError::AwsSdk(e.to_string()))?;

            requests = response
                .unprocessed_items()
                .and_then(|unprocessed| unprocessed.get(table_name))
                .cloned()
                .unwrap_or_default();
        }

        written += chunk.len();
    }

    Ok(written)
}
