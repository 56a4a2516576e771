//! 退出码过滤 - 决定是否需要通知
//!
//! 两个列表：
//! - ignore（拒绝列表）：命中则一定不通知，优先级高于 notify
//! - notify（允许列表）：非空时只有命中的退出码才通知；为空表示全部允许

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, WrapError};

/// 退出码集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitCodeSet(BTreeSet<i32>);

impl ExitCodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析逗号分隔的退出码列表，如 `"0,2, 130"`
    ///
    /// 空字符串表示空列表；每项两侧空白会被去掉；空项或非整数报 `WrapError::Config`。
    pub fn parse(list: &str) -> Result<Self> {
        if list.trim().is_empty() {
            return Ok(Self::new());
        }

        list.split(',')
            .map(|entry| {
                let entry = entry.trim();
                entry.parse::<i32>().map_err(|_| {
                    WrapError::config(format!(
                        "invalid exit code `{}` in list `{}`",
                        entry, list
                    ))
                })
            })
            .collect()
    }

    pub fn contains(&self, code: i32) -> bool {
        self.0.contains(&code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<i32> for ExitCodeSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ExitCodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        f.write_str(&joined.join(","))
    }
}

/// 过滤结果，记录是哪条规则做出的决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// 需要通知
    Notify,
    /// 退出码在 ignore 列表中
    Ignored,
    /// notify 列表非空且不包含该退出码
    NotSelected,
}

impl FilterDecision {
    pub fn should_notify(self) -> bool {
        matches!(self, FilterDecision::Notify)
    }

    /// 跳过原因（用于日志）
    pub fn reason(self, exit_code: i32) -> String {
        match self {
            FilterDecision::Notify => format!("exit code {} selected", exit_code),
            FilterDecision::Ignored => format!("exit code {} is in ignore-exit-codes", exit_code),
            FilterDecision::NotSelected => {
                format!("exit code {} is not in notify-exit-codes", exit_code)
            }
        }
    }
}

/// 判断退出码是否需要通知。ignore 先于 notify 检查。
pub fn decide(exit_code: i32, ignore_codes: &ExitCodeSet, notify_codes: &ExitCodeSet) -> FilterDecision {
    if ignore_codes.contains(exit_code) {
        FilterDecision::Ignored
    } else if !notify_codes.is_empty() && !notify_codes.contains(exit_code) {
        FilterDecision::NotSelected
    } else {
        FilterDecision::Notify
    }
}

/// `decide` 的布尔形式
pub fn should_notify(exit_code: i32, ignore_codes: &ExitCodeSet, notify_codes: &ExitCodeSet) -> bool {
    decide(exit_code, ignore_codes, notify_codes).should_notify()
}
