//! 代理服务器主程序入口

use notranslate::env::{init_tracing, EnvConfig};
use notranslate::recovery::config::ConfigManager;
use notranslate::web::{WebConfig, WebServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().skip(1).any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    // 先加载配置文件和 .env，日志级别可能来自其中
    let config_manager = match args.iter().position(|arg| arg == "--config") {
        Some(i) => match args.get(i + 1) {
            Some(path) => ConfigManager::from_file(path)?,
            None => {
                eprintln!("Error: --config requires a path");
                std::process::exit(1);
            }
        },
        None => ConfigManager::new()?,
    };

    init_tracing();

    let web_config = WebConfig::from_env()?;
    web_config.validate()?;

    if let Ok(env_config) = EnvConfig::from_env() {
        if env_config.mode == "development" {
            env_config.print_summary();
        }
    }

    let server = WebServer::new(web_config, config_manager.into_config());
    server.start().await?;

    Ok(())
}

fn print_help() {
    println!("NoTranslate Proxy");
    println!();
    println!("USAGE:");
    println!("    notranslate-proxy [--config <path>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>    Load interceptor settings from this file");
    println!("    -h, --help         Print help information");
    println!();
    println!("Run `notranslate env-docs` for the supported environment variables.");
}
