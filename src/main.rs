//! 命令行工具
//!
//! 离线使用提取与替换接口：对保存下来的一对响应 JSON 做修补，
//! 或查看其中能提取到的原文和章节。

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use notranslate::env::{generate_env_docs, init_tracing};
use notranslate::recovery::chapters::parse_chapters;
use notranslate::recovery::config::{ConfigManager, Features};
use notranslate::recovery::descriptions::extract_descriptions;
use notranslate::recovery::error::{RecoveryError, RecoveryResult};
use notranslate::recovery::processor::DataProcessor;
use notranslate::recovery::titles::extract_titles;

#[derive(Parser)]
#[command(name = "notranslate", version, about = "Recover original titles and descriptions from translated API responses")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Patch a translated response with texts from an untranslated one
    Process {
        /// Response JSON as served to the page
        #[arg(long)]
        original: PathBuf,
        /// Same request answered with the untranslated locale
        #[arg(long)]
        clean: PathBuf,
        /// Restore titles (default)
        #[arg(long, overrides_with = "no_titles")]
        titles: bool,
        /// Leave titles untouched
        #[arg(long, overrides_with = "titles")]
        no_titles: bool,
        /// Restore descriptions as well
        #[arg(long)]
        descriptions: bool,
        /// Write the patched JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print every title and description found in a response
    Extract {
        #[arg(long)]
        input: PathBuf,
    },
    /// Parse chapter markers from a description text or response JSON
    Chapters {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print documentation for the supported environment variables
    EnvDocs,
    /// Write an example configuration file
    InitConfig { path: PathBuf },
}

fn read_json(path: &Path) -> RecoveryResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| RecoveryError::from(e).with_context(path.display()))?;
    serde_json::from_str(&content).map_err(|e| RecoveryError::from(e).with_context(path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> RecoveryResult<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            tracing::info!("已写入 {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn run(cli: Cli) -> RecoveryResult<()> {
    match cli.command {
        Command::Process {
            original,
            clean,
            titles: _,
            no_titles,
            descriptions,
            output,
        } => {
            let original = read_json(&original)?;
            let clean = read_json(&clean)?;
            let features = Features {
                titles: !no_titles,
                descriptions,
            };

            let outcome = DataProcessor::new(features).process(&original, &clean);
            eprintln!(
                "titles: {}, descriptions: {}",
                outcome.title_changes, outcome.description_changes
            );

            let content = serde_json::to_string_pretty(&outcome.data)?;
            write_output(output.as_deref(), &content)
        }
        Command::Extract { input } => {
            let data = read_json(&input)?;
            let report = json!({
                "titles": extract_titles(&data),
                "descriptions": extract_descriptions(&data),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Chapters { input } => {
            let content = fs::read_to_string(&input)?;
            // 能解析为 JSON 时取主视频描述，否则按纯文本处理
            let description = match serde_json::from_str::<Value>(&content) {
                Ok(data) => extract_descriptions(&data)
                    .main_video_description
                    .ok_or_else(|| RecoveryError::InvalidInput("响应中没有主视频描述".to_string()))?,
                Err(_) => content,
            };

            println!("{}", serde_json::to_string_pretty(&parse_chapters(&description))?);
            Ok(())
        }
        Command::EnvDocs => {
            print!("{}", generate_env_docs());
            Ok(())
        }
        Command::InitConfig { path } => {
            let path = path.to_string_lossy();
            ConfigManager::generate_example_config(&path)?;
            println!("Example configuration written to {}", path);
            Ok(())
        }
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
