//! Policy-driven batch import

use chrono::NaiveDateTime;

use crate::model::{ConfigPublish, ImportItem, ImportResult, Operator, SameConfigPolicy};
use crate::service::config::{ConfigPersistService, validate};
use crate::service::is_conflict;

/// Infer configuration type from the data id suffix. `None` when the data
/// id has no suffix at all.
pub fn infer_config_type(data_id: &str) -> Option<String> {
    let (_, ext) = data_id.rsplit_once('.')?;

    let config_type = match ext.to_lowercase().as_str() {
        "properties" => "properties",
        "xml" => "xml",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "html" | "htm" => "html",
        _ => "text",
    };
    Some(config_type.to_string())
}

impl ConfigPersistService {
    /// Import `items` one by one. Every item is validated before the first
    /// write; a malformed item fails the whole call. Identity conflicts are
    /// resolved by `policy`.
    pub async fn batch_insert_or_update(
        &self,
        items: &[ConfigPublish],
        policy: SameConfigPolicy,
        op: &Operator,
        time: NaiveDateTime,
    ) -> anyhow::Result<ImportResult> {
        for item in items {
            if let Err(err) = validate(item) {
                tracing::error!(data_id = %item.key.data_id, group = %item.key.group, "import data verification failed: {}", err);
                return Err(err.into());
            }
        }

        let mut result = ImportResult::default();
        for (index, item) in items.iter().enumerate() {
            let mut publish = item.clone();
            if publish.advance.r#type.as_deref().is_none_or(|t| t.trim().is_empty()) {
                publish.advance.r#type = infer_config_type(&publish.key.data_id);
            }

            let err = match self.add_config_info(&publish, op, time).await {
                Ok(_) => {
                    result.succ_count += 1;
                    continue;
                }
                Err(err) if is_conflict(&err) => err,
                Err(err) => return Err(err),
            };

            match policy {
                SameConfigPolicy::Abort => {
                    tracing::warn!(key = %publish.key, "import aborted on existing config: {}", err);
                    result.fail_data.push(ImportItem::from(&publish.key));
                    result
                        .skip_data
                        .extend(items[index + 1..].iter().map(|rest| ImportItem::from(&rest.key)));
                    break;
                }
                SameConfigPolicy::Skip => {
                    result.skip_count += 1;
                    result.skip_data.push(ImportItem::from(&publish.key));
                }
                SameConfigPolicy::Overwrite => {
                    self.update_config_info(&publish, op, time).await?;
                    result.succ_count += 1;
                }
            }
        }

        tracing::info!(
            policy = %policy,
            succ_count = result.succ_count,
            skip_count = result.skip_count,
            fail_count = result.fail_data.len(),
            "batch import finished"
        );
        Ok(result)
    }
}
