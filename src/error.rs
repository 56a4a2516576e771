//! 错误类型
//!
//! 每一类错误都会终止本次调用；退出码过滤导致的"跳过通知"不是错误。

use std::path::PathBuf;

/// wrapslack 各阶段的错误
#[derive(Debug, thiserror::Error)]
pub enum WrapError {
    /// 缺少必需参数（token / channel / 要执行的命令）
    #[error("{0}")]
    Usage(String),

    /// 配置值非法（例如退出码列表中含非整数）
    #[error("invalid config: {0}")]
    Config(String),

    /// 配置文件存在但无法读取或解析
    #[error("failed to load config file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    /// 消息模板语法错误
    #[error("invalid message template: {0}")]
    Template(String),

    /// 子进程无法启动或等待失败（非零退出码不属于此类）
    #[error("failed to execute {command}: {source}")]
    Execution {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// 通知发送失败（网络错误或 Slack API 拒绝）
    #[error("failed to deliver notification: {0}")]
    Delivery(String),
}

impl WrapError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub(crate) fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, WrapError>;
