#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunCommand {
    /// 默认：全量重算 + 自检
    Recompute { json: bool },
    /// 只审计现有指标，不写库
    Validate { json: bool },
    Help,
    Unknown(String),
}

pub const USAGE: &str = "用法: daily-metrics [--validate-only] [--json]\n\
  --validate-only  只对现有 daily_metrics 做空值自检，不重算\n\
  --json           以 JSON 输出运行结果（行数、耗时、自检报告）\n\
  -h, --help       显示帮助\n\
连接参数从环境变量读取: DATABASE_URL 或 DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASSWORD";

impl RunCommand {
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut json = false;
        let mut validate_only = false;

        for arg in args {
            match arg.as_str() {
                "--json" => json = true,
                "--validate-only" | "validate" => validate_only = true,
                "-h" | "--help" | "help" => return RunCommand::Help,
                other => return RunCommand::Unknown(other.to_string()),
            }
        }

        if validate_only {
            RunCommand::Validate { json }
        } else {
            RunCommand::Recompute { json }
        }
    }
}
