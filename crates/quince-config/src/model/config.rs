// Configuration data models and structures

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use quince_persistence::entity;
use quince_persistence::model::ConfigKey;

fn millis(time: chrono::NaiveDateTime) -> i64 {
    time.and_utc().timestamp_millis()
}

/// Optional metadata supplied with a config write
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigAdvanceInfo {
    /// Comma separated tags. `None` leaves existing tags untouched on update.
    pub config_tags: Option<String>,
    pub desc: Option<String>,
    pub r#use: Option<String>,
    pub effect: Option<String>,
    pub r#type: Option<String>,
    pub schema: Option<String>,
}

/// A config write request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPublish {
    #[serde(flatten)]
    pub key: ConfigKey,
    pub content: String,
    /// `None` keeps the stored app name on update
    pub app_name: Option<String>,
    #[serde(flatten)]
    pub advance: ConfigAdvanceInfo,
}

impl ConfigPublish {
    pub fn new(key: ConfigKey, content: impl Into<String>) -> Self {
        Self {
            key,
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_tags(mut self, config_tags: impl Into<String>) -> Self {
        self.advance.config_tags = Some(config_tags.into());
        self
    }

    pub fn with_type(mut self, r#type: impl Into<String>) -> Self {
        self.advance.r#type = Some(r#type.into());
        self
    }
}

/// Actor performing a write
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub src_ip: Option<String>,
    pub src_user: Option<String>,
}

impl Operator {
    pub fn new(src_ip: impl Into<String>, src_user: impl Into<String>) -> Self {
        Self {
            src_ip: Some(src_ip.into()),
            src_user: Some(src_user.into()),
        }
    }

    pub fn src_ip(&self) -> Option<&str> {
        self.src_ip.as_deref()
    }

    pub fn src_user(&self) -> Option<&str> {
        self.src_user.as_deref()
    }
}

// Base configuration information structure
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfoBase {
    pub id: i64,
    pub data_id: String,
    pub group: String,
    pub content: String,
    pub md5: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfo {
    #[serde(flatten)]
    pub config_info_base: ConfigInfoBase,
    pub tenant: String,
    pub app_name: String,
    pub r#type: String,
}

impl ConfigInfo {
    pub fn key(&self) -> ConfigKey {
        ConfigKey::new(
            self.config_info_base.data_id.clone(),
            self.config_info_base.group.clone(),
            self.tenant.clone(),
        )
    }
}

impl From<entity::config_info::Model> for ConfigInfo {
    fn from(value: entity::config_info::Model) -> Self {
        Self {
            config_info_base: ConfigInfoBase {
                id: value.id,
                data_id: value.data_id,
                group: value.group_id,
                content: value.content,
                md5: value.md5.unwrap_or_default(),
            },
            tenant: value.tenant_id,
            app_name: value.app_name.unwrap_or_default(),
            r#type: value.r#type.unwrap_or_default(),
        }
    }
}

/// Config with every metadata column and its merged tag list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigAllInfo {
    #[serde(flatten)]
    pub config_info: ConfigInfo,
    pub create_time: i64,
    pub modify_time: i64,
    pub create_user: String,
    pub create_ip: String,
    pub desc: String,
    pub r#use: String,
    pub effect: String,
    pub schema: String,
    pub config_tags: String,
}

impl ConfigAllInfo {
    pub fn from_model(value: entity::config_info::Model, tags: &[String]) -> Self {
        Self {
            create_time: millis(value.gmt_create),
            modify_time: millis(value.gmt_modified),
            create_user: value.src_user.clone().unwrap_or_default(),
            create_ip: value.src_ip.clone().unwrap_or_default(),
            desc: value.c_desc.clone().unwrap_or_default(),
            r#use: value.c_use.clone().unwrap_or_default(),
            effect: value.effect.clone().unwrap_or_default(),
            schema: value.c_schema.clone().unwrap_or_default(),
            config_tags: tags.join(","),
            config_info: value.into(),
        }
    }
}

impl ConfigAdvanceInfo {
    pub fn from_model(value: &entity::config_info::Model, tags: &[String]) -> Self {
        Self {
            config_tags: if tags.is_empty() {
                None
            } else {
                Some(tags.join(","))
            },
            desc: value.c_desc.clone(),
            r#use: value.c_use.clone(),
            effect: value.effect.clone(),
            r#type: value.r#type.clone(),
            schema: value.c_schema.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfoBeta {
    #[serde(flatten)]
    pub config_info: ConfigInfo,
    pub beta_ips: String,
    pub modify_time: i64,
}

impl From<entity::config_info_beta::Model> for ConfigInfoBeta {
    fn from(value: entity::config_info_beta::Model) -> Self {
        Self {
            config_info: ConfigInfo {
                config_info_base: ConfigInfoBase {
                    id: value.id,
                    data_id: value.data_id,
                    group: value.group_id,
                    content: value.content,
                    md5: value.md5.unwrap_or_default(),
                },
                tenant: value.tenant_id,
                app_name: value.app_name.unwrap_or_default(),
                r#type: String::new(),
            },
            beta_ips: value.beta_ips.unwrap_or_default(),
            modify_time: millis(value.gmt_modified),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfoTag {
    #[serde(flatten)]
    pub config_info: ConfigInfo,
    pub tag: String,
    pub modify_time: i64,
}

impl From<entity::config_info_tag::Model> for ConfigInfoTag {
    fn from(value: entity::config_info_tag::Model) -> Self {
        Self {
            config_info: ConfigInfo {
                config_info_base: ConfigInfoBase {
                    id: value.id,
                    data_id: value.data_id,
                    group: value.group_id,
                    content: value.content,
                    md5: value.md5.unwrap_or_default(),
                },
                tenant: value.tenant_id,
                app_name: value.app_name.unwrap_or_default(),
                r#type: String::new(),
            },
            tag: value.tag_id,
            modify_time: millis(value.gmt_modified),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigHistoryInfo {
    /// History sequence id
    pub id: i64,
    /// Id of the config row the entry belongs to
    pub config_id: i64,
    pub data_id: String,
    pub group: String,
    pub tenant: String,
    pub app_name: String,
    pub md5: String,
    pub content: String,
    pub src_ip: String,
    pub src_user: String,
    pub op_type: String,
    pub created_time: i64,
    pub last_modified_time: i64,
}

impl From<entity::his_config_info::Model> for ConfigHistoryInfo {
    fn from(value: entity::his_config_info::Model) -> Self {
        Self {
            id: value.nid,
            config_id: value.id,
            data_id: value.data_id,
            group: value.group_id,
            tenant: value.tenant_id,
            app_name: value.app_name.unwrap_or_default(),
            md5: value.md5.unwrap_or_default(),
            content: value.content,
            src_ip: value.src_ip.unwrap_or_default(),
            src_user: value.src_user.unwrap_or_default(),
            op_type: value.op_type.trim().to_string(),
            created_time: millis(value.gmt_create),
            last_modified_time: millis(value.gmt_modified),
        }
    }
}

/// Identity and timestamp of a changed or deleted config, for incremental sync
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigChangeInfo {
    pub id: i64,
    pub data_id: String,
    pub group: String,
    pub tenant: String,
    pub md5: String,
    pub last_modified: i64,
}

impl From<entity::config_info::Model> for ConfigChangeInfo {
    fn from(value: entity::config_info::Model) -> Self {
        Self {
            id: value.id,
            data_id: value.data_id,
            group: value.group_id,
            tenant: value.tenant_id,
            md5: value.md5.unwrap_or_default(),
            last_modified: millis(value.gmt_modified),
        }
    }
}

impl From<entity::his_config_info::Model> for ConfigChangeInfo {
    fn from(value: entity::his_config_info::Model) -> Self {
        Self {
            id: value.id,
            data_id: value.data_id,
            group: value.group_id,
            tenant: value.tenant_id,
            md5: value.md5.unwrap_or_default(),
            last_modified: millis(value.gmt_modified),
        }
    }
}

/// Identity and content digest of a config, without its content
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigKeyMd5 {
    pub data_id: String,
    pub group: String,
    pub tenant: String,
    pub md5: String,
}

// ============================================================================
// Batch import
// ============================================================================

/// What a batch import does with a record whose identity already exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SameConfigPolicy {
    #[default]
    Abort,
    Skip,
    Overwrite,
}

impl SameConfigPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SameConfigPolicy::Abort => "ABORT",
            SameConfigPolicy::Skip => "SKIP",
            SameConfigPolicy::Overwrite => "OVERWRITE",
        }
    }
}

impl std::str::FromStr for SameConfigPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ABORT" => Ok(SameConfigPolicy::Abort),
            "SKIP" => Ok(SameConfigPolicy::Skip),
            "OVERWRITE" => Ok(SameConfigPolicy::Overwrite),
            _ => Err(format!("Invalid same config policy: {}", s)),
        }
    }
}

impl Display for SameConfigPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record reference reported back from a batch import
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportItem {
    pub data_id: String,
    pub group: String,
}

impl From<&ConfigKey> for ImportItem {
    fn from(key: &ConfigKey) -> Self {
        Self {
            data_id: key.data_id.clone(),
            group: key.group.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub succ_count: u32,
    pub skip_count: u32,
    pub fail_data: Vec<ImportItem>,
    pub skip_data: Vec<ImportItem>,
}
