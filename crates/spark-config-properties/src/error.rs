//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 属性文件加载链路只有两类失败：读取失败（I/O）与格式失败（转义非法、序数非法）；
//!   本模块把二者收敛为 [`PropertiesError`]，并通过 [`ErrorKind`] 暴露稳定分类。
//!
//! ## 设计要求（What）
//! - 所有错误派生 `thiserror::Error`，兼容 `std::error::Error` 与 `?` 传播；
//! - I/O 错误以 `#[error(transparent)]` 原样携带底层 [`io::Error`]，调用方看到的 `kind()`、
//!   `raw_os_error()` 与直接读流时完全一致；
//! - 本 crate 内部从不记录、吞掉或改写错误，翻译与降级全部交给调用方。

use std::{fmt, io, num::ParseIntError};

use thiserror::Error;

use crate::CONFIG_ORDINAL_KEY;

/// 错误的粗粒度分类。
///
/// - **意图 (Why)**：调用方通常只关心“读不到”还是“读到了但内容不对”，据此决定重试或直接报错；
/// - **契约 (What)**：`Io` 对应流打开/读取失败；`Format` 对应属性文件语法错误与序数解析错误。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Format,
}

impl ErrorKind {
    /// 返回稳定字符串描述，便于拼接到指标标签或日志字段中。
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::Format => "format",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 属性文件语法错误的具体原因。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MalformedReason {
    /// `\u` 之后剩余字符不足四个。
    #[error("truncated \\uxxxx escape")]
    TruncatedUnicodeEscape,

    /// `\u` 之后的四个字符并非全部为十六进制数字。
    #[error("malformed \\uxxxx encoding `\\u{digits}`")]
    InvalidUnicodeEscape { digits: String },
}

/// `config_ordinal` 存在但无法解析为十进制 `i32` 时返回的错误。
///
/// # 教案式说明
/// - **意图 (Why)**：“缺失”与“非法”必须区分：缺失时回退默认值，非法时必须让调用方感知，
///   否则一个拼写错误就会悄悄把配置源的优先级改成默认值；
/// - **契约 (What)**：`value` 保存原始字符串（不做 trim），`source` 为标准库的解析错误；
/// - **权衡 (Trade-offs)**：保留 `String` 拷贝换取可读的诊断信息，错误路径上的分配可以接受。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid `{key}` value `{value}`: {source}", key = CONFIG_ORDINAL_KEY)]
pub struct InvalidOrdinal {
    value: String,
    #[source]
    source: ParseIntError,
}

impl InvalidOrdinal {
    pub(crate) fn new(value: &str, source: ParseIntError) -> Self {
        Self {
            value: value.to_owned(),
            source,
        }
    }

    /// 返回导致失败的原始字符串。
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 返回底层整数解析错误。
    #[inline]
    pub fn parse_error(&self) -> &ParseIntError {
        &self.source
    }
}

/// 属性加载链路的统一错误。
///
/// # 教案式说明
/// - **意图 (Why)**：让 `load_properties_map` 与序数解析共用一个错误类型，
///   调用方可以统一 `?` 传播，再按 [`ErrorKind`] 分流；
/// - **契约 (What)**：
///   - `Io`：透明包装 [`io::Error`]，不附加任何上下文；
///   - `Malformed`：`line` 为出错逻辑行起始的物理行号（从 1 开始）；
///   - `InvalidOrdinal`：来自 [`crate::ordinal_from_map`]；
/// - **风险 (Trade-offs)**：枚举标记 `#[non_exhaustive]`，新增变体不会破坏下游的穷尽匹配。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PropertiesError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("malformed properties input at line {line}: {reason}")]
    Malformed { line: usize, reason: MalformedReason },

    #[error(transparent)]
    InvalidOrdinal(#[from] InvalidOrdinal),
}

impl PropertiesError {
    /// 将错误归入 [`ErrorKind`] 两类之一。
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Malformed { .. } | Self::InvalidOrdinal(_) => ErrorKind::Format,
        }
    }

    /// 若为 I/O 错误，返回底层 [`io::Error`] 的引用。
    pub fn as_io(&self) -> Option<&io::Error> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn malformed(line: usize, reason: MalformedReason) -> Self {
        Self::Malformed { line, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_split_io_from_format() {
        let io = PropertiesError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(
            io.as_io().map(io::Error::kind),
            Some(io::ErrorKind::NotFound)
        );

        let malformed = PropertiesError::malformed(3, MalformedReason::TruncatedUnicodeEscape);
        assert_eq!(malformed.kind(), ErrorKind::Format);
        assert!(malformed.as_io().is_none());

        let parse_err = "x".parse::<i32>().unwrap_err();
        let ordinal = PropertiesError::from(InvalidOrdinal::new("x", parse_err));
        assert_eq!(ordinal.kind(), ErrorKind::Format);
    }

    #[test]
    fn io_errors_display_unchanged() {
        let err = PropertiesError::from(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn messages_name_the_problem() {
        let err = PropertiesError::malformed(
            7,
            MalformedReason::InvalidUnicodeEscape {
                digits: "12G4".to_owned(),
            },
        );
        assert_eq!(
            err.to_string(),
            "malformed properties input at line 7: malformed \\uxxxx encoding `\\u12G4`"
        );

        let ordinal = InvalidOrdinal::new("ten", "ten".parse::<i32>().unwrap_err());
        assert!(
            ordinal
                .to_string()
                .starts_with("invalid `config_ordinal` value `ten`")
        );
        assert_eq!(ordinal.value(), "ten");
    }
}
