use std::{collections::HashMap, fmt::Display};

/// 将松散类型的属性集合转换为规范化的 `String -> String` 映射。
///
/// # 教案式说明
/// - **意图 (Why)**：遗留属性存储的键值类型并不统一，下游配置系统只接受字符串映射；
///   通过一个泛型函数完成“渲染为字符串 + 插入新容器”，无需反射或动态分派。
/// - **执行 (How)**：对每个条目调用 [`ToString::to_string`]（即 `Display` 渲染），插入新建的 `HashMap`。
/// - **契约 (What)**：
///   - 传入 `&bag` 即按引用迭代，原集合既不被消费也不被修改；
///   - 返回值是完全独立的新分配，与输入不共享任何存储；
///   - 渲染后出现重复键时，后出现的条目覆盖先出现的条目。
/// - **权衡 (Trade-offs)**：每个键值都会分配新的 `String`；属性集合规模很小，清晰优先于零拷贝。
pub fn properties_to_map<I, K, V>(bag: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    let entries = bag.into_iter();
    let mut map = HashMap::with_capacity(entries.size_hint().0);
    for (key, value) in entries {
        map.insert(key.to_string(), value.to_string());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn renders_non_string_entries() {
        let mut bag = BTreeMap::new();
        bag.insert(1_u8, 2.5_f64);
        bag.insert(7, -3.0);

        let map = properties_to_map(&bag);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("1").map(String::as_str), Some("2.5"));
        assert_eq!(map.get("7").map(String::as_str), Some("-3"));
        // 按引用迭代后原集合仍可用。
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn later_entries_win_after_rendering() {
        let bag = vec![("k", "first"), ("other", "x"), ("k", "second")];
        let map = properties_to_map(bag);
        assert_eq!(map.len(), 2);
        assert_eq!(map["k"], "second");
    }

    #[test]
    fn colliding_renderings_collapse() {
        // `1_i32` 与 `"1"` 渲染结果相同，合并为一个键。
        let bag: Vec<(Box<dyn Display>, &str)> =
            vec![(Box::new(1_i32), "int"), (Box::new("1"), "str")];
        let map = properties_to_map(bag);
        assert_eq!(map.len(), 1);
        assert_eq!(map["1"], "str");
    }

    #[test]
    fn result_is_independent_of_input() {
        let mut bag = HashMap::new();
        bag.insert("a".to_owned(), "1".to_owned());

        let mut map = properties_to_map(&bag);
        map.insert("a".to_owned(), "changed".to_owned());
        bag.insert("b".to_owned(), "2".to_owned());

        assert_eq!(bag["a"], "1");
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn empty_bag_gives_empty_map() {
        let bag: [(&str, &str); 0] = [];
        assert!(properties_to_map(bag).is_empty());
    }
}
