//! 属性流的定位与打开。
//!
//! # 教案式说明
//! - **意图（Why）**：加载入口只关心“能否打开一个可读字节流”，而不关心它来自文件、URI
//!   还是测试替身；[`PropertiesLocation`] 把这一能力抽象为 trait，作为作用域化资源获取的接缝。
//! - **逻辑（How）**：[`load_properties_map`] 调用 `open` 取得独占的读取器，交给
//!   [`read_properties`] 消费；读取器以值传递，在函数返回前（无论成功还是出错）恰好释放一次。
//! - **契约（What）**：
//!   - 打开或读取失败返回 [`PropertiesError::Io`]，底层 [`io::Error`] 原样保留；
//!   - 语法错误返回 [`PropertiesError::Malformed`]；
//!   - 任一错误路径都不会产出部分映射，也不会重试。

use std::{
    borrow::Cow,
    collections::HashMap,
    fmt,
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{convert::properties_to_map, error::PropertiesError, format::read_properties};

/// 可打开为属性字节流的位置。
///
/// # 契约说明（What）
/// - `open`：每次调用返回一个新的、由调用方独占的读取器；
/// - `describe`：返回人类可读的位置描述，用于日志字段与配置源命名。
pub trait PropertiesLocation {
    /// 打开后得到的读取器类型。
    type Reader: Read;

    /// 打开底层字节流。
    fn open(&self) -> io::Result<Self::Reader>;

    /// 位置的可读描述。
    fn describe(&self) -> Cow<'_, str>;
}

impl PropertiesLocation for Path {
    type Reader = File;

    fn open(&self) -> io::Result<File> {
        File::open(self)
    }

    fn describe(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }
}

impl PropertiesLocation for PathBuf {
    type Reader = File;

    fn open(&self) -> io::Result<File> {
        self.as_path().open()
    }

    fn describe(&self) -> Cow<'_, str> {
        self.as_path().describe()
    }
}

impl<T> PropertiesLocation for &T
where
    T: PropertiesLocation + ?Sized,
{
    type Reader = T::Reader;

    fn open(&self) -> io::Result<Self::Reader> {
        (**self).open()
    }

    fn describe(&self) -> Cow<'_, str> {
        (**self).describe()
    }
}

/// 由 URI 字符串解析得到的资源定位符。
///
/// # 教案式说明
/// - **意图 (Why)**：调用方常以 URI 形式传递配置位置，例如 `file:///etc/app/application.properties`；
/// - **契约 (What)**：
///   - 支持 `file:/p`、`file:///p`、`file://localhost/p` 以及不带 scheme 的裸路径；
///   - `file:` URI 中的 `%XX` 会被解码，`?`/`#` 之后的查询与片段被忽略；
///   - 其它 scheme 或远程主机返回 `io::ErrorKind::Unsupported`，非法百分号编码返回
///     `io::ErrorKind::InvalidInput`；
/// - **权衡 (Trade-offs)**：不做网络访问，远程配置应由专门的配置源实现负责。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ResourceLocator {
    File(PathBuf),
}

impl ResourceLocator {
    /// 若定位符指向本地文件，返回其路径。
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
        }
    }
}

impl FromStr for ResourceLocator {
    type Err = io::Error;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let Some((scheme, rest)) = split_scheme(uri) else {
            if uri.is_empty() {
                return Err(invalid_input("empty properties location"));
            }
            return Ok(Self::File(PathBuf::from(uri)));
        };

        if !scheme.eq_ignore_ascii_case("file") {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported properties location scheme `{scheme}` in `{uri}`"),
            ));
        }

        let rest = rest
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = match rest.strip_prefix("//") {
            Some(authority_and_path) => {
                let (host, path) = match authority_and_path.find('/') {
                    Some(idx) => authority_and_path.split_at(idx),
                    None => (authority_and_path, ""),
                };
                if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
                    return Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        format!("remote host `{host}` is not supported in `{uri}`"),
                    ));
                }
                path
            }
            None => rest,
        };

        if path.is_empty() {
            return Err(invalid_input(format!("`{uri}` does not name a file")));
        }
        Ok(Self::File(PathBuf::from(percent_decode(path)?)))
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

impl PropertiesLocation for ResourceLocator {
    type Reader = File;

    fn open(&self) -> io::Result<File> {
        match self {
            Self::File(path) => path.open(),
        }
    }

    fn describe(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

/// 打开位置、解析属性流并转换为规范化映射。
///
/// # 教案式说明
/// - **Why**：这是配置源实现最常用的入口，把“打开 - 读取 - 解析 - 转换”收敛为一次调用；
/// - **How**：在 `properties.load` span 内执行；读取器由本函数独占并在返回前释放；
/// - **What**：成功返回全新的 `HashMap<String, String>`；失败时错误原样上抛，不会返回部分结果，
///   也不会在本 crate 内记录错误日志。
pub fn load_properties_map<L>(location: &L) -> Result<HashMap<String, String>, PropertiesError>
where
    L: PropertiesLocation + ?Sized,
{
    let span = tracing::debug_span!("properties.load", location = %location.describe());
    let _entered = span.enter();

    let reader = location.open()?;
    let entries = read_properties(reader)?;
    let map = properties_to_map(entries);
    tracing::debug!(entries = map.len(), "loaded properties");
    Ok(map)
}

/// 解析 URI 字符串并加载其指向的属性文件。
///
/// 定位符解析失败同样以 [`PropertiesError::Io`] 返回。
pub fn url_to_map(uri: &str) -> Result<HashMap<String, String>, PropertiesError> {
    let locator: ResourceLocator = uri.parse()?;
    load_properties_map(&locator)
}

fn invalid_input<E>(message: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

/// 拆分 `scheme:rest`；单字符 scheme 视为 Windows 盘符，按裸路径处理。
fn split_scheme(uri: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = scheme.len() > 1
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}

fn percent_decode(path: &str) -> io::Result<String> {
    if !path.contains('%') {
        return Ok(path.to_owned());
    }

    let bytes = path.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] != b'%' {
            decoded.push(bytes[idx]);
            idx += 1;
            continue;
        }
        let byte = bytes
            .get(idx + 1..idx + 3)
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| invalid_input(format!("malformed percent escape in `{path}`")))?;
        decoded.push(byte);
        idx += 3;
    }

    String::from_utf8(decoded)
        .map_err(|_| invalid_input(format!("percent-decoded path `{path}` is not UTF-8")))
}
