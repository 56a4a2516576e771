//! 消息模板
//!
//! 语法为 `{{ name }}` 占位符，可用变量：`hostName`、`command`、`exitCode`。
//! 兼容 Go 模板写法 `{{.hostName}}`。模板在加载配置时解析，渲染本身不会失败。

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, WrapError};
use crate::runner::RunResult;

/// 默认消息模板
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "`{{hostName}}`: `{{command}}` exited with `{{exitCode}}`";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"^\s*\.?([A-Za-z_][A-Za-z0-9_]*)\s*$").expect("placeholder regex is valid")
    })
}

/// 模板变量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateVar {
    HostName,
    Command,
    ExitCode,
}

impl TemplateVar {
    pub fn name(self) -> &'static str {
        match self {
            TemplateVar::HostName => "hostName",
            TemplateVar::Command => "command",
            TemplateVar::ExitCode => "exitCode",
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        match name {
            "hostName" => Some(TemplateVar::HostName),
            "command" => Some(TemplateVar::Command),
            "exitCode" => Some(TemplateVar::ExitCode),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var(TemplateVar),
}

/// 已解析的消息模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl MessageTemplate {
    /// 解析模板字符串
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let after_open = &rest[start + OPEN.len()..];
            let end = after_open.find(CLOSE).ok_or_else(|| {
                WrapError::template(format!(
                    "unterminated `{}` at byte {}",
                    OPEN,
                    offset + start
                ))
            })?;

            let inner = &after_open[..end];
            segments.push(Segment::Var(parse_placeholder(inner)?));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// 原始模板文本
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 模板中引用到的变量（按出现顺序，可能重复）
    pub fn variables(&self) -> impl Iterator<Item = TemplateVar> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Var(v) => Some(*v),
            Segment::Text(_) => None,
        })
    }

    /// 使用运行结果渲染消息
    pub fn render(&self, run: &RunResult) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(TemplateVar::HostName) => out.push_str(&run.host_name),
                Segment::Var(TemplateVar::Command) => out.push_str(&run.command_line()),
                Segment::Var(TemplateVar::ExitCode) => out.push_str(&run.exit_code.to_string()),
            }
        }
        out
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_MESSAGE_TEMPLATE).expect("default template is valid")
    }
}

impl FromStr for MessageTemplate {
    type Err = WrapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_placeholder(inner: &str) -> Result<TemplateVar> {
    if inner.trim().is_empty() {
        return Err(WrapError::template("empty placeholder `{{}}`"));
    }

    let name = placeholder_regex()
        .captures(inner)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| WrapError::template(format!("invalid placeholder `{{{{{}}}}}`", inner)))?;

    TemplateVar::lookup(name).ok_or_else(|| {
        WrapError::template(format!(
            "unknown variable `{}` (expected hostName, command or exitCode)",
            name
        ))
    })
}
