//! 传统 `key=value` 属性文件的文本解码器。
//!
//! # 教案式说明
//! - **意图（Why）**：配置源只需要“字符串到字符串”的条目，但磁盘上的格式带有注释、续行与转义；
//!   本模块把这些语法细节封装起来，对外只输出按出现顺序排列的 `(key, value)` 列表。
//! - **逻辑（How）**：分两步完成：
//!   1. [`LogicalLines`] 把物理行拼接为逻辑行：跳过行首空白、空行与注释行，处理反斜杠续行；
//!   2. [`split_entry`] + [`unescape`] 在逻辑行内切分键值，并解码 `\t`、`\uXXXX` 等转义。
//! - **契约（What）**：
//!   - 物理行终止符为 `\n`、`\r` 或 `\r\n`；空白字符为空格、`\t`、`\f`；
//!   - 逻辑行首个非空白字符为 `#` 或 `!` 时整行为注释，注释行不参与续行；
//!   - 重复的键按出现顺序全部保留，由上层转换时执行“后写覆盖先写”。
//! - **风险（Trade-offs）**：整段输入先读入内存再解码，属性文件通常只有数 KB，换取实现的直观性。

use std::io::Read;

use crate::error::{MalformedReason, PropertiesError};

const BACKSLASH: char = '\\';

#[inline]
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{000C}')
}

#[inline]
fn is_separator(c: char) -> bool {
    matches!(c, '=' | ':')
}

#[inline]
fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

/// 解析属性文本，返回按出现顺序排列的条目。
///
/// # 契约（What）
/// - **输入**：完整的属性文件文本；
/// - **输出**：键值已完成转义解码的条目列表，允许出现重复键；
/// - **错误**：`\u` 转义不足四位或含非十六进制字符时返回 [`PropertiesError::Malformed`]，
///   其中 `line` 为出错逻辑行起始的物理行号。
pub fn parse_properties(input: &str) -> Result<Vec<(String, String)>, PropertiesError> {
    let mut entries = Vec::new();
    let mut lines = LogicalLines::new(input);
    while let Some(line) = lines.next_line() {
        let (raw_key, raw_value) = split_entry(&line.text);
        let key = unescape(raw_key, line.number)?;
        let value = unescape(raw_value, line.number)?;
        entries.push((key, value));
    }
    Ok(entries)
}

/// 从字节流读取并解析属性文本。
///
/// # 教案式说明
/// - **Why**：加载入口拿到的是任意 [`Read`] 实现，需要在这里完成 UTF-8 解码；
/// - **How**：一次性 `read_to_end`，非法 UTF-8 序列按标准 UTF-8 读取器的做法替换为 U+FFFD，
///   BOM 不做剥离；
/// - **What**：`reader` 以值传入，函数返回前即被释放；读取失败原样返回 [`PropertiesError::Io`]。
pub fn read_properties<R: Read>(mut reader: R) -> Result<Vec<(String, String)>, PropertiesError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_properties(&String::from_utf8_lossy(&bytes))
}

/// 拼接完成、尚未解码转义的逻辑行。
#[derive(Debug, PartialEq, Eq)]
struct LogicalLine {
    /// 逻辑行首个有效字符所在的物理行号，从 1 开始。
    number: usize,
    text: String,
}

/// 物理行到逻辑行的拼接器。
struct LogicalLines<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    physical_line: usize,
}

impl<'a> LogicalLines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            physical_line: 1,
        }
    }

    fn next_line(&mut self) -> Option<LogicalLine> {
        let mut text = String::new();
        let mut number = self.physical_line;
        let mut skip_whitespace = true;
        let mut at_line_start = true;
        let mut in_comment = false;
        let mut continued = false;
        let mut odd_backslashes = false;

        loop {
            let Some(c) = self.chars.next() else {
                if text.is_empty() || in_comment {
                    return None;
                }
                // 输入末尾的续行反斜杠没有下一行可拼接，直接丢弃。
                if odd_backslashes {
                    text.pop();
                }
                return Some(LogicalLine { number, text });
            };

            let terminator = is_line_terminator(c);
            if terminator {
                if c == '\r' && self.chars.peek() == Some(&'\n') {
                    self.chars.next();
                }
                self.physical_line += 1;
            }

            if skip_whitespace {
                if is_whitespace(c) {
                    continue;
                }
                // 空行直接跳过；但续行之后紧跟的空行会结束当前逻辑行。
                if terminator && !continued {
                    continue;
                }
                skip_whitespace = false;
                continued = false;
            }

            if at_line_start && !terminator {
                at_line_start = false;
                if c == '#' || c == '!' {
                    in_comment = true;
                    continue;
                }
                number = self.physical_line;
            }

            if !terminator {
                if in_comment {
                    continue;
                }
                text.push(c);
                odd_backslashes = c == BACKSLASH && !odd_backslashes;
                continue;
            }

            if in_comment || text.is_empty() {
                in_comment = false;
                at_line_start = true;
                skip_whitespace = true;
                text.clear();
                continue;
            }

            if odd_backslashes {
                text.pop();
                odd_backslashes = false;
                skip_whitespace = true;
                continued = true;
                continue;
            }

            return Some(LogicalLine { number, text });
        }
    }
}

/// 在逻辑行内切分出原始（未解码）的键与值。
///
/// - 键止于首个未转义的 `=`、`:` 或空白；
/// - 随后跳过空白，若键由空白终止则再吞掉至多一个 `=`/`:`，并再次跳过空白；
/// - 剩余部分原样作为值，尾部空白保留。
fn split_entry(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (idx, c) in line.char_indices() {
        if !escaped && is_separator(c) {
            key_end = idx;
            value_start = idx + c.len_utf8();
            has_separator = true;
            break;
        }
        if !escaped && is_whitespace(c) {
            key_end = idx;
            value_start = idx + c.len_utf8();
            break;
        }
        escaped = c == BACKSLASH && !escaped;
    }

    let rest = &line[value_start..];
    let mut offset = rest.len();
    for (idx, c) in rest.char_indices() {
        if is_whitespace(c) {
            continue;
        }
        if !has_separator && is_separator(c) {
            has_separator = true;
            continue;
        }
        offset = idx;
        break;
    }

    (&line[..key_end], &rest[offset..])
}

/// 解码键或值中的转义序列。
fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    if !raw.contains(BACKSLASH) {
        return Ok(raw.to_owned());
    }

    let mut out = Utf16Assembler::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != BACKSLASH {
            out.push_char(c);
            continue;
        }
        // 逻辑行已剥离续行反斜杠，孤立的结尾反斜杠只可能来自空值，按无内容处理。
        let Some(escaped) = chars.next() else {
            break;
        };
        match escaped {
            'u' => {
                let digits: String = chars.by_ref().take(4).collect();
                if digits.chars().count() < 4 {
                    return Err(PropertiesError::malformed(
                        line,
                        MalformedReason::TruncatedUnicodeEscape,
                    ));
                }
                if !digits.chars().all(|d| d.is_ascii_hexdigit()) {
                    return Err(PropertiesError::malformed(
                        line,
                        MalformedReason::InvalidUnicodeEscape { digits },
                    ));
                }
                let unit = u16::from_str_radix(&digits, 16).map_err(|_| {
                    PropertiesError::malformed(
                        line,
                        MalformedReason::InvalidUnicodeEscape {
                            digits: digits.clone(),
                        },
                    )
                })?;
                out.push_unit(unit);
            }
            't' => out.push_char('\t'),
            'n' => out.push_char('\n'),
            'r' => out.push_char('\r'),
            'f' => out.push_char('\u{000C}'),
            other => out.push_char(other),
        }
    }
    Ok(out.finish())
}

/// 把 `\uXXXX` 产生的 UTF-16 码元与普通字符拼装为 `String`。
///
/// 成对的代理项合并为一个补充平面字符；落单的代理项替换为 U+FFFD。
struct Utf16Assembler {
    out: String,
    pending_high: Option<u16>,
}

impl Utf16Assembler {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            pending_high: None,
        }
    }

    fn flush_pending(&mut self) {
        if self.pending_high.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn push_char(&mut self, c: char) {
        self.flush_pending();
        self.out.push(c);
    }

    fn push_unit(&mut self, unit: u16) {
        match unit {
            0xD800..=0xDBFF => {
                self.flush_pending();
                self.pending_high = Some(unit);
            }
            0xDC00..=0xDFFF => match self.pending_high.take() {
                Some(high) => {
                    let code = 0x1_0000
                        + ((u32::from(high) - 0xD800) << 10)
                        + (u32::from(unit) - 0xDC00);
                    self.out
                        .push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                None => self.out.push(char::REPLACEMENT_CHARACTER),
            },
            _ => {
                self.flush_pending();
                self.out
                    .push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    fn finish(mut self) -> String {
        self.flush_pending();
        self.out
    }
}
