//! 对象：按插入顺序保存的属性表

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;

use super::value::Value;

#[derive(Debug, Clone, Default)]
pub struct Object {
    properties: IndexMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// 设置属性；已存在的属性保持原有位置
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.properties.iter()
    }

    /// 渲染为 `{a: 1, b: "x"}`；字符串属性值加引号
    pub(crate) fn render(
        &self,
        f: &mut dyn fmt::Write,
        visiting: &mut Vec<*const RefCell<Object>>,
    ) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: ")?;
            value.render(f, visiting, true)?;
        }
        write!(f, "}}")
    }

    /// 属性集合相同且对应值结构相等（不要求顺序一致）
    pub(crate) fn structural_eq(
        &self,
        other: &Object,
        seen: &mut Vec<(*const RefCell<Object>, *const RefCell<Object>)>,
    ) -> bool {
        self.len() == other.len()
            && self.properties.iter().all(|(name, value)| {
                other
                    .get(name)
                    .is_some_and(|theirs| value.structural_eq(theirs, seen))
            })
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other, &mut Vec::new())
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut object = Object::new();
        object.set("b", Value::Number(1.0));
        object.set("a", Value::Number(2.0));
        object.set("b", Value::Number(3.0));
        let keys: Vec<_> = object.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(object.get("b"), Some(&Value::Number(3.0)));
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn test_display_nested() {
        let mut inner = Object::new();
        inner.set("s", Value::string("q"));
        let mut outer = Object::new();
        outer.set("inner", Value::object(inner));
        outer.set("n", Value::Nil);
        assert_eq!(outer.to_string(), r#"{inner: {s: "q"}, n: nil}"#);
        assert_eq!(Object::new().to_string(), "{}");
    }
}
