//! 运行时值

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::bytecode::Instruction;
use super::channel::Channel;
use super::object::Object;
use super::stdlib::NativeFn;

/// 运行时值（封闭变体集合）
#[derive(Clone)]
pub enum Value {
    Nil,
    Number(f64),
    Boolean(bool),
    String(Rc<str>),
    /// 按引用共享，经任一持有者的修改对所有持有者可见
    Object(Rc<RefCell<Object>>),
    Function(Rc<Function>),
    NativeFunction(Rc<NativeFunction>),
    Channel(Rc<RefCell<Channel>>),
}

/// 用户函数：参数名与独立的指令体，不捕获任何变量
#[derive(Debug, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub parameters: Vec<String>,
    pub body: Rc<[Instruction]>,
}

impl Function {
    pub fn new(name: Option<String>, parameters: Vec<String>, body: Vec<Instruction>) -> Self {
        Self {
            name,
            parameters,
            body: body.into(),
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// 宿主实现的函数，参数个数固定
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn object(object: Object) -> Self {
        Value::Object(Rc::new(RefCell::new(object)))
    }

    pub fn function(function: Function) -> Self {
        Value::Function(Rc::new(function))
    }

    pub fn native(name: &str, arity: usize, func: NativeFn) -> Self {
        Value::NativeFunction(Rc::new(NativeFunction {
            name: name.to_string(),
            arity,
            func,
        }))
    }

    pub fn channel(capacity: usize) -> Self {
        Value::Channel(Rc::new(RefCell::new(Channel::new(capacity))))
    }

    /// 类型名，用于错误信息
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::NativeFunction(_) => "native function",
            Value::Channel(_) => "channel",
        }
    }

    /// 语言层面的 `==`
    ///
    /// 对象、函数、通道按引用比较；其余按值比较；不同种类总是不相等。
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Channel(a), Value::Channel(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// 嵌套在对象中时的渲染：字符串加引号
    pub fn repr(&self) -> String {
        let mut out = String::new();
        let _ = self.render(&mut out, &mut Vec::new(), true);
        out
    }

    /// `visiting` 记录正在渲染的对象；再次遇到时输出 `{...}`
    pub(crate) fn render(
        &self,
        f: &mut dyn fmt::Write,
        visiting: &mut Vec<*const RefCell<Object>>,
        quoted: bool,
    ) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) if quoted => write!(f, "{s:?}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Object(object) => {
                let ptr = Rc::as_ptr(object);
                if visiting.contains(&ptr) {
                    return write!(f, "{{...}}");
                }
                visiting.push(ptr);
                let result = object.borrow().render(f, visiting);
                visiting.pop();
                result
            }
            Value::Function(function) => {
                if function.parameters.is_empty() {
                    write!(f, "<function>")
                } else {
                    write!(f, "<function {}>", function.parameters.join(", "))
                }
            }
            Value::NativeFunction(native) => write!(f, "<native {}>", native.name),
            Value::Channel(_) => write!(f, "<channel>"),
        }
    }

    /// 结构相等；`seen` 中的对象对视为相等，环状结构因此可以终止
    pub(crate) fn structural_eq(
        &self,
        other: &Value,
        seen: &mut Vec<(*const RefCell<Object>, *const RefCell<Object>)>,
    ) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => {
                let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
                if Rc::ptr_eq(a, b) || seen.contains(&pair) {
                    return true;
                }
                seen.push(pair);
                a.borrow().structural_eq(&b.borrow(), seen)
            }
            _ => self == other,
        }
    }
}

/// 结构相等（编译器测试用）；通道只与自身相等
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(_), Value::Object(_)) => self.structural_eq(other, &mut Vec::new()),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => {
                a.name == b.name && a.arity == b.arity
            }
            (Value::Channel(a), Value::Channel(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Vec::new(), false)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Number(n) => write!(f, "Number({n:?})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::String(s) => write!(f, "String({s:?})"),
            // 对象可能自引用，沿用带环检测的渲染
            Value::Object(_) => write!(f, "Object({})", self),
            Value::Function(function) => f.debug_tuple("Function").field(function).finish(),
            Value::NativeFunction(native) => f.debug_tuple("NativeFunction").field(native).finish(),
            Value::Channel(channel) => write!(f, "Channel({:p})", Rc::as_ptr(channel)),
        }
    }
}

/// 数字渲染：整数不带小数部分，特殊值按名字输出
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else if n == 0.0 {
        // -0 也渲染为 0
        "0".to_string()
    } else {
        format!("{n}")
    }
}
