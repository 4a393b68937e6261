// ==========================================
// 订单对账系统 - 命令行入口
// ==========================================
// 用法: mp-order-report [--db <path> | --json-dir <dir>] <command>
// 结果以格式化 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use mp_order_report::app::{get_default_db_path, AppState, StoreBackend};
use mp_order_report::logging;

#[derive(Parser, Debug)]
#[command(name = "mp-order-report", version, about = "电商平台订单对账与利润报表")]
struct Cli {
    /// SQLite 数据库路径（默认: MP_ORDER_REPORT_DB_PATH 或用户数据目录）
    #[arg(long, global = true, conflicts_with = "json_dir")]
    db: Option<String>,

    /// 使用 JSON 文件目录作为存储
    #[arg(long = "json-dir", global = true)]
    json_dir: Option<PathBuf>,

    /// 日志输出为 JSON 行
    #[arg(long = "log-json", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 导入订单导出文件（.xlsx/.xls/.csv）并生成报表
    Import {
        file: PathBuf,
        /// 追加到已存订单（默认替换）
        #[arg(long)]
        append: bool,
    },
    /// 按当前原始订单生成（合并）报表
    Generate,
    /// 试算报表，不落库
    Preview,
    /// 删除订单（永久排除）
    Delete {
        #[arg(required = true)]
        order_numbers: Vec<String>,
    },
    /// 人工录入订单（JSON 数组文件）
    ManualEntry {
        file: PathBuf,
        #[arg(long)]
        append: bool,
    },
    /// 备份当前报表
    Backup,
    /// 用 JSON 文件替换当前报表
    Restore { file: PathBuf },
    /// 商品目录
    Catalog {
        #[command(subcommand)]
        action: DocAction,
    },
    /// 平台费率规则
    FeeRules {
        #[command(subcommand)]
        action: DocAction,
    },
    /// 显示当前报表
    Show,
    /// 系统配置（仅 SQLite 后端）
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum DocAction {
    /// 显示当前内容
    Show,
    /// 用 JSON 文件整体替换
    Set { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_file(path: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("无法读取文件: {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    tracing::info!("{} v{}", mp_order_report::APP_NAME, mp_order_report::VERSION);

    let backend = match (cli.json_dir, cli.db) {
        (Some(dir), _) => StoreBackend::JsonDir(dir),
        (None, Some(db)) => StoreBackend::Sqlite(db),
        (None, None) => StoreBackend::Sqlite(get_default_db_path()),
    };

    let state = AppState::open(backend).await.map_err(anyhow::Error::msg)?;
    let result = run(&state, cli.command).await;
    state.shutdown();
    result
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Import { file, append } => {
            let path = file.to_string_lossy().to_string();
            print_json(&state.import_api.import_orders(&path, append).await?)
        }
        Command::Generate => print_json(&state.report_api.generate_report().await?),
        Command::Preview => print_json(&state.report_api.preview_report().await?),
        Command::Delete { order_numbers } => {
            print_json(&state.report_api.delete_orders(&order_numbers).await?)
        }
        Command::ManualEntry { file, append } => {
            let json = read_file(&file)?;
            print_json(&state.report_api.add_manual_entries_json(&json, append).await?)
        }
        Command::Backup => {
            let backup_id = state.report_api.backup_report().await?;
            print_json(&serde_json::json!({ "backupId": backup_id }))
        }
        Command::Restore { file } => {
            let json = read_file(&file)?;
            print_json(&state.report_api.restore_report(&json).await?)
        }
        Command::Show => print_json(&state.report_api.get_report().await?),
        Command::Catalog { action } => match action {
            DocAction::Show => print_json(&state.catalog_api.get_catalog().await?),
            DocAction::Set { file } => {
                let json = read_file(&file)?;
                print_json(&state.catalog_api.save_catalog_json(&json).await?)
            }
        },
        Command::FeeRules { action } => match action {
            DocAction::Show => print_json(&state.catalog_api.get_fee_rules().await?),
            DocAction::Set { file } => {
                let json = read_file(&file)?;
                print_json(&state.catalog_api.save_fee_rules_json(&json).await?)
            }
        },
        Command::Config { action } => {
            let Some(config) = state.config_manager.as_ref() else {
                bail!("JSON 文件存储不支持配置写入，请使用 --db");
            };
            match action {
                ConfigAction::Show => {
                    let snapshot = config.get_config_snapshot().map_err(anyhow::Error::msg)?;
                    println!("{}", snapshot);
                    Ok(())
                }
                ConfigAction::Set { key, value } => {
                    config
                        .set_global_config_value(&key, &value)
                        .map_err(anyhow::Error::msg)?;
                    print_json(&serde_json::json!({ "key": key, "value": value }))
                }
            }
        }
    }
}
