//! `spark-config-properties` 把传统 `key=value` 属性数据转换为规范化的字符串映射，
//! 并约定如何从映射中读取配置源的序数（优先级）。
//!
//! # 背景（Why）
//! - 配置系统的各个数据源最终都要交出 `String -> String` 映射；遗留的属性集合与属性文件是最常见的输入；
//! - 多个配置源之间依据保留键 [`CONFIG_ORDINAL_KEY`] 携带的序数排序，约定默认值为 [`CONFIG_ORDINAL_100`]。
//!
//! # 使用概览（How）
//! - [`properties_to_map`]：把任意 `Display` 键值集合渲染为新的字符串映射；
//! - [`load_properties_map`] / [`url_to_map`]：打开位置、解析属性文件并转换，读取器在返回前恰好释放一次；
//! - [`ordinal_from_map`]：读取序数，缺失时返回调用方给出的默认值。
//!
//! # 合约说明（What）
//! - 所有函数均为无状态纯函数（加载入口除一次阻塞读取外无副作用），可在任意线程调用；
//! - 错误只有两类，见 [`ErrorKind`]；本 crate 从不吞掉、改写或记录错误。
//!
//! # 风险提示（Trade-offs）
//! - 不负责多源合并、分层与变更监听；这些属于上层配置系统。

mod convert;
mod error;
mod format;
mod location;
mod ordinal;

pub use crate::convert::properties_to_map;
pub use crate::error::{ErrorKind, InvalidOrdinal, MalformedReason, PropertiesError};
pub use crate::format::{parse_properties, read_properties};
pub use crate::location::{PropertiesLocation, ResourceLocator, load_properties_map, url_to_map};
pub use crate::ordinal::{
    CONFIG_ORDINAL_100, CONFIG_ORDINAL_KEY, DEFAULT_ORDINAL, ordinal_from_map,
};
