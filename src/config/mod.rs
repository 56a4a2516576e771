//! 配置解析
//!
//! 优先级（从低到高）：
//! 1. 内置默认值
//! 2. 配置文件 `/etc/wrapslack.yaml`（存在时才读取）
//! 3. 环境变量 `SLACK_TOKEN`（仅 token）
//! 4. 命令行 flag
//!
//! 每一层都是一个 `ConfigLayer`，通过 `ConfigLayer::merge` 显式合并，
//! 最后由 `EffectiveConfig::from_layer` 校验并生成不可变的最终配置。

pub mod file;

use std::path::Path;

use tracing::debug;

use crate::error::{Result, WrapError};
use crate::filter::ExitCodeSet;
use crate::notification::template::{MessageTemplate, DEFAULT_MESSAGE_TEMPLATE};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "/etc/wrapslack.yaml";

/// token 的环境变量名
pub const TOKEN_ENV_VAR: &str = "SLACK_TOKEN";

/// 默认图标
pub const DEFAULT_ICON_EMOJI: &str = ":robot_face:";

/// 默认显示用户名
pub const DEFAULT_USERNAME: &str = "wrapslack";

/// 默认忽略的退出码
pub const DEFAULT_IGNORE_EXIT_CODES: &str = "0";

/// 一个配置来源，所有字段可选
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub token: Option<String>,
    pub channel: Option<String>,
    pub message_template: Option<String>,
    pub icon_emoji: Option<String>,
    pub username: Option<String>,
    pub notify_exit_codes: Option<String>,
    pub ignore_exit_codes: Option<String>,
}

impl ConfigLayer {
    /// 内置默认值
    pub fn defaults() -> Self {
        Self {
            token: None,
            channel: None,
            message_template: Some(DEFAULT_MESSAGE_TEMPLATE.to_string()),
            icon_emoji: Some(DEFAULT_ICON_EMOJI.to_string()),
            username: Some(DEFAULT_USERNAME.to_string()),
            notify_exit_codes: Some(String::new()),
            ignore_exit_codes: Some(DEFAULT_IGNORE_EXIT_CODES.to_string()),
        }
    }

    /// 环境变量层；空值视为未设置
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            token: lookup(TOKEN_ENV_VAR).filter(|v| !v.is_empty()),
            ..Self::default()
        }
    }

    /// 用更高优先级的层覆盖当前层：`higher` 中为 `Some` 的字段胜出
    pub fn merge(self, higher: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            token: higher.token.or(self.token),
            channel: higher.channel.or(self.channel),
            message_template: higher.message_template.or(self.message_template),
            icon_emoji: higher.icon_emoji.or(self.icon_emoji),
            username: higher.username.or(self.username),
            notify_exit_codes: higher.notify_exit_codes.or(self.notify_exit_codes),
            ignore_exit_codes: higher.ignore_exit_codes.or(self.ignore_exit_codes),
        }
    }
}

/// 最终生效的配置
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub token: String,
    pub channel: String,
    pub message_template: MessageTemplate,
    pub icon_emoji: String,
    pub username: String,
    pub notify_codes: ExitCodeSet,
    pub ignore_codes: ExitCodeSet,
}

impl EffectiveConfig {
    /// 校验合并后的配置
    pub fn from_layer(layer: ConfigLayer) -> Result<Self> {
        let token = layer
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WrapError::usage("slack-token is required"))?;

        let channel = layer
            .channel
            .filter(|c| !c.is_empty())
            .ok_or_else(|| WrapError::usage("slack-channel is required"))?;

        let message_template =
            MessageTemplate::parse(layer.message_template.as_deref().unwrap_or_default())?;

        let ignore_codes = ExitCodeSet::parse(layer.ignore_exit_codes.as_deref().unwrap_or_default())?;
        let notify_codes = ExitCodeSet::parse(layer.notify_exit_codes.as_deref().unwrap_or_default())?;

        Ok(Self {
            token,
            channel,
            message_template,
            icon_emoji: layer.icon_emoji.unwrap_or_default(),
            username: layer.username.unwrap_or_default(),
            notify_codes,
            ignore_codes,
        })
    }
}

/// 按优先级合并所有来源并生成最终配置
///
/// `env` 用于查询环境变量，便于测试时替换。
pub fn resolve<F>(flags: ConfigLayer, config_path: &Path, env: F) -> Result<EffectiveConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file_layer = file::load_optional(config_path)?.unwrap_or_default();

    let merged = ConfigLayer::defaults()
        .merge(file_layer)
        .merge(ConfigLayer::from_env(env))
        .merge(flags);

    let config = EffectiveConfig::from_layer(merged)?;

    debug!(
        channel = %config.channel,
        username = %config.username,
        ignore_codes = %config.ignore_codes,
        notify_codes = %config.notify_codes,
        "Resolved configuration"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn required_flags() -> ConfigLayer {
        ConfigLayer {
            token: Some("xoxb-flag".to_string()),
            channel: Some("#flag".to_string()),
            ..Default::default()
        }
    }

    fn missing_path() -> std::path::PathBuf {
        std::path::PathBuf::from("/nonexistent/wrapslack-test/wrapslack.yaml")
    }

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    // ------------------------------------------------------------------
    // merge
    // ------------------------------------------------------------------

    #[test]
    fn test_merge_higher_some_wins() {
        let lower = ConfigLayer {
            channel: Some("low".to_string()),
            username: Some("low-user".to_string()),
            ..Default::default()
        };
        let higher = ConfigLayer {
            channel: Some("high".to_string()),
            ..Default::default()
        };

        let merged = lower.merge(higher);
        assert_eq!(merged.channel.as_deref(), Some("high"));
        assert_eq!(merged.username.as_deref(), Some("low-user"));
    }

    #[test]
    fn test_merge_empty_string_overrides() {
        let lower = ConfigLayer {
            notify_exit_codes: Some("1,2".to_string()),
            ..Default::default()
        };
        let higher = ConfigLayer {
            notify_exit_codes: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(lower.merge(higher).notify_exit_codes.as_deref(), Some(""));
    }

    #[test]
    fn test_env_layer_ignores_empty_token() {
        let layer = ConfigLayer::from_env(|_| Some(String::new()));
        assert!(layer.token.is_none());

        let layer = ConfigLayer::from_env(|key| {
            (key == TOKEN_ENV_VAR).then(|| "xoxb-env".to_string())
        });
        assert_eq!(layer.token.as_deref(), Some("xoxb-env"));
    }

    // ------------------------------------------------------------------
    // resolve
    // ------------------------------------------------------------------

    #[test]
    fn test_defaults_applied_without_file() {
        let config = resolve(required_flags(), &missing_path(), no_env).unwrap();

        assert_eq!(config.token, "xoxb-flag");
        assert_eq!(config.channel, "#flag");
        assert_eq!(config.icon_emoji, DEFAULT_ICON_EMOJI);
        assert_eq!(config.username, DEFAULT_USERNAME);
        assert_eq!(config.message_template.source(), DEFAULT_MESSAGE_TEMPLATE);
        assert!(config.notify_codes.is_empty());
        assert!(config.ignore_codes.contains(0));
        assert_eq!(config.ignore_codes.len(), 1);
    }

    #[test]
    fn test_missing_token_is_usage_error() {
        let flags = ConfigLayer {
            channel: Some("#c".to_string()),
            ..Default::default()
        };
        let err = resolve(flags, &missing_path(), no_env).unwrap_err();
        assert!(matches!(err, WrapError::Usage(_)));
        assert!(err.to_string().contains("slack-token"));
    }

    #[test]
    fn test_missing_channel_is_usage_error() {
        let flags = ConfigLayer {
            token: Some("t".to_string()),
            ..Default::default()
        };
        let err = resolve(flags, &missing_path(), no_env).unwrap_err();
        assert!(matches!(err, WrapError::Usage(_)));
        assert!(err.to_string().contains("slack-channel"));
    }

    #[test]
    fn test_empty_flag_token_is_missing() {
        let flags = ConfigLayer {
            token: Some(String::new()),
            ..required_flags()
        };
        let err = resolve(flags, &missing_path(), |_| Some("xoxb-env".to_string())).unwrap_err();
        assert!(matches!(err, WrapError::Usage(_)));
    }

    #[test]
    fn test_token_from_env_when_no_flag() {
        let flags = ConfigLayer {
            token: None,
            ..required_flags()
        };
        let config = resolve(flags, &missing_path(), |key| {
            (key == TOKEN_ENV_VAR).then(|| "xoxb-env".to_string())
        })
        .unwrap();
        assert_eq!(config.token, "xoxb-env");
    }

    #[test]
    fn test_token_precedence_flag_env_file() {
        let file = config_file("slack-token: xoxb-file\nslack-channel: file-channel\n");

        // 只有文件
        let config = resolve(ConfigLayer::default(), file.path(), no_env).unwrap();
        assert_eq!(config.token, "xoxb-file");
        assert_eq!(config.channel, "file-channel");

        // 环境变量覆盖文件
        let config = resolve(ConfigLayer::default(), file.path(), |_| {
            Some("xoxb-env".to_string())
        })
        .unwrap();
        assert_eq!(config.token, "xoxb-env");

        // flag 覆盖环境变量
        let flags = ConfigLayer {
            token: Some("xoxb-flag".to_string()),
            ..Default::default()
        };
        let config = resolve(flags, file.path(), |_| Some("xoxb-env".to_string())).unwrap();
        assert_eq!(config.token, "xoxb-flag");
        assert_eq!(config.channel, "file-channel");
    }

    #[test]
    fn test_file_overrides_defaults_and_flags_override_file() {
        let file = config_file(
            "slack-username: from-file\nslack-icon-emoji: \":fire:\"\nignore-exit-codes: \"0,1\"\n",
        );
        let flags = ConfigLayer {
            username: Some("from-flag".to_string()),
            ..required_flags()
        };

        let config = resolve(flags, file.path(), no_env).unwrap();
        assert_eq!(config.username, "from-flag");
        assert_eq!(config.icon_emoji, ":fire:");
        assert!(config.ignore_codes.contains(0));
        assert!(config.ignore_codes.contains(1));
    }

    #[test]
    fn test_invalid_exit_code_is_config_error() {
        let flags = ConfigLayer {
            notify_exit_codes: Some("1,x".to_string()),
            ..required_flags()
        };
        let err = resolve(flags, &missing_path(), no_env).unwrap_err();
        assert!(matches!(err, WrapError::Config(_)));
    }

    #[test]
    fn test_invalid_template_is_template_error() {
        let flags = ConfigLayer {
            message_template: Some("{{nope}}".to_string()),
            ..required_flags()
        };
        let err = resolve(flags, &missing_path(), no_env).unwrap_err();
        assert!(matches!(err, WrapError::Template(_)));
    }

    #[test]
    fn test_malformed_file_is_config_file_error() {
        let file = config_file("slack-channel: [\n");
        let err = resolve(required_flags(), file.path(), no_env).unwrap_err();
        assert!(matches!(err, WrapError::ConfigFile { .. }));
    }

    #[test]
    fn test_empty_ignore_flag_clears_default() {
        let flags = ConfigLayer {
            ignore_exit_codes: Some(String::new()),
            ..required_flags()
        };
        let config = resolve(flags, &missing_path(), no_env).unwrap();
        assert!(config.ignore_codes.is_empty());
    }
}
