//! Strand CLI - Command line interface
//!
//! 直接运行源文件，或按 package.json 项目配置运行

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

use serde_json::json;
use tracing::warn;

mod config;
mod logging;
mod platform;

use crate::config::{LogConfig, PackageJson};
use crate::logging::LogFormat;
use crate::platform::print_error_with_source;
use strand_api::{
    compile_with_config, execute_with_config, format_source, init_config, LogLevel, RunConfig,
};
use strand_core::{Instruction, Value};

#[derive(Parser)]
#[command(
    name = "strand",
    about = "Strand programming language - fibers, channels and a bytecode VM",
    version
)]
struct Cli {
    /// Source file, or a package.json project file
    #[arg(value_name = "INPUT", default_value = "package.json")]
    input: PathBuf,

    /// Print the canonically formatted source and exit
    #[arg(long)]
    fmt: bool,

    /// Compile only, do not execute
    #[arg(long)]
    compile_only: bool,

    /// Dump bytecode as JSON before running
    #[arg(long)]
    dump_bytecode: bool,

    /// Echo the source with line numbers
    #[arg(long)]
    show_source: bool,

    /// Log level: silent, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    log_format: LogFormat,
}

/// 命令行与项目文件合并后的选项
#[derive(Debug, Default, PartialEq)]
struct Options {
    entry: PathBuf,
    format: bool,
    compile_only: bool,
    dump_bytecode: bool,
    show_source: bool,
    log_level: Option<LogLevel>,
    run: RunConfig,
}

fn main() {
    let cli = Cli::parse();

    let options = match load_options(&cli) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let log_config = options
        .log_level
        .map(LogConfig::with_global)
        .unwrap_or_default();
    logging::init(&log_config, cli.log_format);

    let source = match std::fs::read_to_string(&options.entry) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "Error: Cannot read entry file '{}': {}",
                options.entry.display(),
                e
            );
            process::exit(1);
        }
    };

    // 全局配置只初始化一次，重复初始化时保留已有配置
    let _ = init_config(options.run.clone());

    if options.format {
        match format_source(&source) {
            Ok(text) => print!("{}", text),
            Err(e) => fail(&e, &source),
        }
        return;
    }

    if options.show_source {
        println!("[Source]");
        for (i, line) in source.lines().enumerate() {
            println!("{:3} | {}", i + 1, line);
        }
        println!("[Execution Result]");
    }

    let compiled = match compile_with_config(&source, &options.run) {
        Ok(c) => c,
        Err(e) => fail(&e, &source),
    };

    if options.dump_bytecode || options.compile_only {
        dump_json_output(&compiled.instructions, "main");
    }
    if options.compile_only {
        return;
    }

    match execute_with_config(compiled.instructions, &options.run) {
        Ok(output) => {
            if output.summary.blocked_fibers > 0 && !output.summary.halted {
                warn!(
                    target: "strand::cli",
                    blocked = output.summary.blocked_fibers,
                    "Program ended with fibers still blocked"
                );
            }
        }
        Err(e) => fail(&e, &source),
    }
}

fn fail(e: &strand_api::StrandError, source: &str) -> ! {
    print_error_with_source(e, source);
    process::exit(1);
}

/// 合并命令行参数与项目文件
///
/// `.json` 输入按项目文件解析，其他输入直接作为源文件。
/// 开关取两者之并，`--log-level` 覆盖项目中的设置。
fn load_options(cli: &Cli) -> Result<Options, String> {
    let is_project = cli
        .input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut options = if is_project {
        let package = read_package_json(&cli.input)?;
        options_from_package(&cli.input, package)?
    } else {
        Options {
            entry: cli.input.clone(),
            ..Options::default()
        }
    };

    options.format |= cli.fmt;
    options.compile_only |= cli.compile_only;
    options.dump_bytecode |= cli.dump_bytecode;
    options.show_source |= cli.show_source;
    options.run.dump_bytecode = options.dump_bytecode;

    if let Some(level) = &cli.log_level {
        options.log_level =
            Some(LogLevel::parse(level).ok_or_else(|| format!("Unknown log level '{}'", level))?);
    }

    Ok(options)
}

/// Read and parse package.json
fn read_package_json(path: &Path) -> Result<PackageJson, String> {
    if !path.exists() {
        return Err(format!(
            "未找到 '{}'\n\n当前目录不是一个 Strand 项目。\n提示: 创建 '{}' 文件并指定 'entry' 字段，或直接传入源文件",
            path.display(),
            path.display()
        ));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("无法读取 '{}': {}", path.display(), e))?;

    parse_package_json(&content).map_err(|e| format!("'{}': {}", path.display(), e))
}

fn parse_package_json(content: &str) -> Result<PackageJson, String> {
    let package: PackageJson =
        serde_json::from_str(content).map_err(|e| format!("解析失败: {}", e))?;

    if package.entry.is_empty() {
        return Err("'entry' 字段不能为空".to_string());
    }

    Ok(package)
}

/// 项目文件 -> 选项；入口路径相对 package.json 所在目录
fn options_from_package(package_path: &Path, package: PackageJson) -> Result<Options, String> {
    let base_dir = package_path.parent().unwrap_or(Path::new("."));
    let compiler = package.compiler.unwrap_or_default();

    let log_level = match compiler.log_level.as_deref() {
        Some(s) => Some(LogLevel::parse(s).ok_or_else(|| format!("Unknown log level '{}'", s))?),
        None => None,
    };

    Ok(Options {
        entry: base_dir.join(&package.entry),
        format: compiler.format.unwrap_or(false),
        compile_only: compiler.compile_only.unwrap_or(false),
        dump_bytecode: compiler.dump_bytecode.unwrap_or(false),
        show_source: compiler.show_source.unwrap_or(false),
        log_level,
        run: RunConfig {
            limits: package.limits,
            vm: package.vm,
            ..RunConfig::default()
        },
    })
}

/// JSON 格式输出编译结果（支持嵌套函数）
fn dump_json_output(instructions: &[Instruction], name: &str) {
    let output = build_json_output(instructions, name);
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: cannot serialize bytecode: {}", e),
    }
}

/// 递归构建 JSON 输出
fn build_json_output(instructions: &[Instruction], name: &str) -> serde_json::Value {
    let mut bytecode = Vec::with_capacity(instructions.len());
    let mut functions = Vec::new();

    for (offset, instruction) in instructions.iter().enumerate() {
        let mut entry = json!({ "opcode": instruction.name() });
        if let Some(operand) = instruction.operand() {
            entry["operand"] = json!(operand);
        }

        match instruction {
            Instruction::Jump(delta) | Instruction::JumpIfFalse(delta) => {
                entry["target"] = json!(offset as isize + 1 + delta);
            }
            Instruction::Push(Value::Function(function)) => {
                let func_name = format!("{}#func_{}", name, offset);
                let mut nested = build_json_output(&function.body, &func_name);
                nested["params"] = json!(function.parameters);
                if let Some(fn_name) = &function.name {
                    nested["function"] = json!(fn_name);
                }
                functions.push(nested);
            }
            _ => {}
        }
        bytecode.push(entry);
    }

    let mut result = json!({
        "name": name,
        "bytecode": bytecode,
    });
    if !functions.is_empty() {
        result["functions"] = json!(functions);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("strand").chain(args.iter().copied()))
    }

    #[test]
    fn test_source_file_input() {
        let options = load_options(&cli(&["demo.strand", "--dump-bytecode"])).unwrap();
        assert_eq!(options.entry, PathBuf::from("demo.strand"));
        assert!(options.dump_bytecode);
        assert!(options.run.dump_bytecode);
        assert!(!options.compile_only);
        assert_eq!(options.log_level, None);
    }

    #[test]
    fn test_unknown_log_level() {
        assert!(load_options(&cli(&["demo.strand", "--log-level", "loud"])).is_err());
        let options = load_options(&cli(&["demo.strand", "--log-level", "silent"])).unwrap();
        assert_eq!(options.log_level, Some(LogLevel::Error));
    }

    #[test]
    fn test_missing_project_file() {
        let err = load_options(&cli(&["no/such/package.json"])).unwrap_err();
        assert!(err.contains("package.json"));
    }

    #[test]
    fn test_package_options() {
        let package = parse_package_json(
            r#"{
                "entry": "src/main.strand",
                "compiler": { "compile_only": true, "log_level": "debug" },
                "limits": { "max_call_depth": 8 }
            }"#,
        )
        .unwrap();
        let options = options_from_package(Path::new("proj/package.json"), package).unwrap();
        assert_eq!(options.entry, Path::new("proj").join("src/main.strand"));
        assert!(options.compile_only);
        assert!(!options.dump_bytecode);
        assert_eq!(options.log_level, Some(LogLevel::Debug));
        assert_eq!(options.run.limits.max_call_depth, 8);
    }

    #[test]
    fn test_empty_entry_rejected() {
        assert!(parse_package_json(r#"{ "entry": "" }"#).is_err());
        assert!(parse_package_json("not json").is_err());
    }

    #[test]
    fn test_json_dump() {
        let compiled = strand_api::compile_with_config(
            "fun f(a) { return a }\nwhile false { }",
            &RunConfig::default(),
        )
        .unwrap();
        let dump = build_json_output(&compiled.instructions, "main");

        assert_eq!(dump["name"], "main");
        assert_eq!(dump["bytecode"][0]["opcode"], "PUSH");
        assert_eq!(dump["bytecode"][1]["opcode"], "DECLARE_GLOBAL");
        assert_eq!(dump["bytecode"][1]["operand"], "f");

        let jumps: Vec<_> = dump["bytecode"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|entry| entry.get("target").is_some())
            .collect();
        assert_eq!(jumps.len(), 2);

        let function = &dump["functions"][0];
        assert_eq!(function["name"], "main#func_0");
        assert_eq!(function["function"], "f");
        assert_eq!(function["params"], json!(["a"]));
        assert_eq!(function["bytecode"][0]["opcode"], "GET_LOCAL");
    }
}
