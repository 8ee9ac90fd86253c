//! 原生函数
//!
//! VM 构造时注册到全局表：
//! - `Channel(capacity)` / `new_channel(capacity)`：创建通道
//! - `prompt(message)`：输出提示并从标准输入读取一行

use std::io::{self, BufRead, Write};

use crate::runtime::value::Value;

/// 原生函数指针类型
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

/// 预注册的原生函数：(名字, 参数个数, 实现)
pub fn natives() -> Vec<(&'static str, usize, NativeFn)> {
    vec![
        ("Channel", 1, channel_fn as NativeFn),
        ("new_channel", 1, channel_fn as NativeFn),
        ("prompt", 1, prompt_fn as NativeFn),
    ]
}

/// 容量必须是非负整数
fn channel_fn(args: &[Value]) -> Result<Value, String> {
    let capacity = match args.first() {
        Some(Value::Number(n)) => *n,
        Some(other) => {
            return Err(format!(
                "capacity must be a number, got {}",
                other.type_name()
            ))
        }
        None => return Err("missing capacity".to_string()),
    };
    if !capacity.is_finite() || capacity < 0.0 || capacity.fract() != 0.0 {
        return Err(format!(
            "capacity must be a non-negative integer, got {capacity}"
        ));
    }
    Ok(Value::channel(capacity as usize))
}

fn prompt_fn(args: &[Value]) -> Result<Value, String> {
    let message = args.first().map(Value::to_string).unwrap_or_default();
    let stdin = io::stdin();
    prompt_with(&message, &mut io::stdout(), &mut stdin.lock())
}

/// 输出提示并读取一行；输入结束时返回 nil
fn prompt_with(
    message: &str,
    output: &mut dyn Write,
    input: &mut dyn BufRead,
) -> Result<Value, String> {
    write!(output, "{message}").map_err(|e| e.to_string())?;
    output.flush().map_err(|e| e.to_string())?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(|e| e.to_string())?;
    if read == 0 {
        return Ok(Value::Nil);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']);
    Ok(Value::string(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_capacity_validation() {
        assert!(matches!(
            channel_fn(&[Value::Number(2.0)]),
            Ok(Value::Channel(_))
        ));
        assert!(channel_fn(&[Value::Number(0.0)]).is_ok());
        assert!(channel_fn(&[Value::Number(-1.0)]).is_err());
        assert!(channel_fn(&[Value::Number(1.5)]).is_err());
        assert!(channel_fn(&[Value::Number(f64::NAN)]).is_err());
        assert!(channel_fn(&[Value::string("1")]).is_err());
    }

    #[test]
    fn test_prompt_reads_line() {
        let mut out = Vec::new();
        let mut input: &[u8] = b"alice\nbob\n";
        let value = prompt_with("name? ", &mut out, &mut input).unwrap();
        assert_eq!(value, Value::string("alice"));
        assert_eq!(out, b"name? ");

        let mut empty: &[u8] = b"";
        assert_eq!(prompt_with("", &mut out, &mut empty).unwrap(), Value::Nil);
    }

    #[test]
    fn test_registered_names() {
        let names: Vec<_> = natives().into_iter().map(|(name, _, _)| name).collect();
        assert_eq!(names, ["Channel", "new_channel", "prompt"]);
    }
}
