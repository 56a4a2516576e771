//! 通知模块 - 渲染消息模板并发送到 Slack
//!
//! # 使用示例
//! ```ignore
//! use wrapslack::notification::{NotificationChannel, NotificationMessage, SlackChannel};
//!
//! let channel = SlackChannel::new(&config.token)?;
//! channel.send(&NotificationMessage::build(&config, &run))?;
//! ```

pub mod channel;
pub mod slack;
pub mod template;

pub use channel::{NotificationChannel, NotificationMessage, SendResult};
pub use slack::{SlackChannel, SLACK_API_URL};
pub use template::{MessageTemplate, TemplateVar, DEFAULT_MESSAGE_TEMPLATE};
