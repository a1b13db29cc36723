use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::types::LabeledImage;

/// Partition key of the labels table
const IMAGE_ATTR: &str = "image";
const LABELS_ATTR: &str = "labels";

/// Key-value table of labeled-image records
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Unconditional upsert
    async fn put_labels(&self, record: &LabeledImage) -> Result<(), ServiceError>;
    async fn get_labels(&self, key: &str) -> Result<Option<LabeledImage>, ServiceError>;
    /// Deleting a missing record is not an error
    async fn delete_labels(&self, key: &str) -> Result<(), ServiceError>;
}

pub struct DynamoLabelStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoLabelStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl LabelStore for DynamoLabelStore {
    async fn put_labels(&self, record: &LabeledImage) -> Result<(), ServiceError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .map_err(|e| ServiceError::Table(format!("PutItem {}: {}", record.image, e)))?;
        Ok(())
    }

    async fn get_labels(&self, key: &str) -> Result<Option<LabeledImage>, ServiceError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(IMAGE_ATTR, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| ServiceError::Table(format!("GetItem {}: {}", key, e)))?;

        result.item().map(|item| from_item(key, item)).transpose()
    }

    async fn delete_labels(&self, key: &str) -> Result<(), ServiceError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(IMAGE_ATTR, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| ServiceError::Table(format!("DeleteItem {}: {}", key, e)))?;
        Ok(())
    }
}

fn to_item(record: &LabeledImage) -> HashMap<String, AttributeValue> {
    let labels = record
        .labels
        .iter()
        .map(|label| AttributeValue::S(label.clone()))
        .collect();

    HashMap::from([
        (IMAGE_ATTR.to_string(), AttributeValue::S(record.image.clone())),
        (LABELS_ATTR.to_string(), AttributeValue::L(labels)),
    ])
}

fn from_item(
    key: &str,
    item: &HashMap<String, AttributeValue>,
) -> Result<LabeledImage, ServiceError> {
    let image = item
        .get(IMAGE_ATTR)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| key.to_string());

    // Records are only written with labels, so anything else is a corrupt row
    let malformed = || ServiceError::Table(format!("item {} has malformed labels", key));

    // Written as a list; older rows may carry a string set
    let labels = match item.get(LABELS_ATTR) {
        Some(AttributeValue::L(values)) => values
            .iter()
            .map(|v| v.as_s().map(|s| s.to_string()).map_err(|_| malformed()))
            .collect::<Result<Vec<_>, _>>()?,
        Some(AttributeValue::Ss(values)) => values.clone(),
        _ => return Err(malformed()),
    };

    Ok(LabeledImage { image, labels })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_keeps_label_order() {
        let record = LabeledImage {
            image: "folder/photo:1.jpg".to_string(),
            labels: vec!["cat".to_string(), "animal".to_string()],
        };
        let item = to_item(&record);

        assert_eq!(
            item.get("image").and_then(|v| v.as_s().ok()).map(String::as_str),
            Some("folder/photo:1.jpg")
        );
        assert_eq!(from_item("folder/photo:1.jpg", &item).unwrap(), record);
    }

    #[test]
    fn test_item_without_labels_is_a_table_error() {
        let item = HashMap::from([(
            "image".to_string(),
            AttributeValue::S("a.png".to_string()),
        )]);
        let err = from_item("a.png", &item).unwrap_err();
        assert!(matches!(err, ServiceError::Table(_)));
    }

    #[test]
    fn test_item_with_ill_typed_labels_is_a_table_error() {
        for labels in [
            AttributeValue::S("cat".to_string()),
            AttributeValue::L(vec![AttributeValue::N("1".to_string())]),
        ] {
            let item = HashMap::from([
                ("image".to_string(), AttributeValue::S("a.png".to_string())),
                ("labels".to_string(), labels),
            ]);
            assert!(matches!(from_item("a.png", &item), Err(ServiceError::Table(_))));
        }
    }

    #[test]
    fn test_item_with_string_set_labels() {
        let item = HashMap::from([
            ("image".to_string(), AttributeValue::S("a.png".to_string())),
            ("labels".to_string(), AttributeValue::Ss(vec!["dog".to_string()])),
        ]);
        assert_eq!(from_item("a.png", &item).unwrap().labels, vec!["dog"]);
    }
}
