use std::{collections::HashMap, hash::BuildHasher};

use crate::error::InvalidOrdinal;

/// 保留键：映射中携带配置源相对优先级的条目名。
pub const CONFIG_ORDINAL_KEY: &str = "config_ordinal";

/// 约定的默认序数的字符串形式，供预先向映射写入默认序数条目的场景使用。
pub const CONFIG_ORDINAL_100: &str = "100";

/// 约定的默认序数。
pub const DEFAULT_ORDINAL: i32 = 100;

/// 从规范化映射中读取序数。
///
/// # 教案式说明
/// - **意图 (Why)**：多个配置源依据序数排序，数值越大越优先；序数随映射本身携带，
///   因此在需要时按需解析，而不是另存一份状态。
/// - **执行 (How)**：查找 [`CONFIG_ORDINAL_KEY`]；缺失时原样返回 `default_ordinal`，
///   存在时按十进制有符号 `i32` 解析。
/// - **契约 (What)**：
///   - 允许一个前导 `+`/`-`，其余必须全部为 ASCII 数字，且不得超出 `i32` 范围；
///   - 空串、首尾空白或任何非数字字符都返回 [`InvalidOrdinal`]，绝不以默认值代替非法值；
///   - 错误交由调用方决定是否致命。
pub fn ordinal_from_map<S>(
    map: &HashMap<String, String, S>,
    default_ordinal: i32,
) -> Result<i32, InvalidOrdinal>
where
    S: BuildHasher,
{
    match map.get(CONFIG_ORDINAL_KEY) {
        None => Ok(default_ordinal),
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|err| InvalidOrdinal::new(raw, err)),
    }
}
