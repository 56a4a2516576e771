//! YAML 配置文件层
//!
//! 文件的键与命令行 flag 同名，例如：
//!
//! ```yaml
//! slack-token: xoxb-...
//! slack-channel: "#ops"
//! ignore-exit-codes: "0,130"
//! notify-exit-codes: [1, 2]
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::ConfigLayer;
use crate::error::{Result, WrapError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FileConfig {
    slack_token: Option<String>,
    slack_channel: Option<String>,
    slack_message_template: Option<String>,
    slack_icon_emoji: Option<String>,
    slack_username: Option<String>,
    #[serde(alias = "notify-exit-code")]
    notify_exit_codes: Option<CodeList>,
    #[serde(alias = "ignore-exit-code")]
    ignore_exit_codes: Option<CodeList>,
}

/// 退出码列表的三种写法：`"1,2"`、`2`、`[1, 2]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CodeList {
    Number(i64),
    Text(String),
    List(Vec<CodeEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CodeEntry {
    Number(i64),
    Text(String),
}

impl CodeEntry {
    fn into_text(self) -> String {
        match self {
            CodeEntry::Number(n) => n.to_string(),
            CodeEntry::Text(s) => s,
        }
    }
}

impl CodeList {
    /// 统一成逗号分隔字符串，由 `ExitCodeSet::parse` 校验
    fn into_text(self) -> String {
        match self {
            CodeList::Number(n) => n.to_string(),
            CodeList::Text(s) => s,
            CodeList::List(entries) => entries
                .into_iter()
                .map(CodeEntry::into_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<FileConfig> for ConfigLayer {
    fn from(file: FileConfig) -> Self {
        ConfigLayer {
            token: file.slack_token,
            channel: file.slack_channel,
            message_template: file.slack_message_template,
            icon_emoji: file.slack_icon_emoji,
            username: file.slack_username,
            notify_exit_codes: file.notify_exit_codes.map(CodeList::into_text),
            ignore_exit_codes: file.ignore_exit_codes.map(CodeList::into_text),
        }
    }
}

/// 解析 YAML 文本
pub fn parse(content: &str) -> std::result::Result<ConfigLayer, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    let file: Option<FileConfig> = serde_yaml::from_str(content)?;
    Ok(file.map(ConfigLayer::from).unwrap_or_default())
}

/// 读取可选配置文件；文件不存在返回 `Ok(None)`
pub fn load_optional(path: &Path) -> Result<Option<ConfigLayer>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Config file not present, skipping");
            return Ok(None);
        }
        Err(e) => {
            return Err(WrapError::ConfigFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let layer = parse(&content).map_err(|e| WrapError::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(Some(layer))
}
