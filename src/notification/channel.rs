//! 通知渠道 trait 定义

use crate::config::EffectiveConfig;
use crate::error::Result;
use crate::runner::RunResult;

/// 通知消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// 目标 channel
    pub channel: String,
    /// 渲染后的消息内容
    pub text: String,
    /// 显示图标
    pub icon_emoji: String,
    /// 显示用户名
    pub username: String,
}

impl NotificationMessage {
    /// 根据配置和运行结果生成消息
    pub fn build(config: &EffectiveConfig, run: &RunResult) -> Self {
        Self {
            channel: config.channel.clone(),
            text: config.message_template.render(run),
            icon_emoji: config.icon_emoji.clone(),
            username: config.username.clone(),
        }
    }
}

/// 通知结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    /// 已发送
    Sent(NotificationMessage),
    /// 跳过（退出码未通过过滤）
    Skipped(String),
}

impl SendResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendResult::Sent(_))
    }
}

/// 通知渠道 trait
pub trait NotificationChannel {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 同步发送消息，只尝试一次
    fn send(&self, message: &NotificationMessage) -> Result<()>;
}
