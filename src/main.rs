use anyhow::Result;
use clap::Parser;

mod app;
mod chronograf;
mod config;
mod logging;
mod ui;
mod wizard;

#[derive(Parser)]
#[command(name = "kapactl")]
#[command(version)]
#[command(about = "A terminal console for Kapacitor connections and alert rules", long_about = None)]
struct Cli {
    /// Chronograf API URL
    #[arg(long)]
    api_url: Option<String>,

    /// Source ID to manage (defaults to Chronograf's default source)
    #[arg(long)]
    source: Option<String>,

    /// Start the Kapacitor step with a blank connection
    #[arg(long)]
    new_kapacitor: bool,

    /// On-boarding mode for this run: no Kapacitor picker, stay on the connection step
    #[arg(long)]
    on_boarding: bool,

    /// Test API connection and print status
    #[arg(long)]
    test: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    // Load or create config
    let (mut config, writable) = config::AppConfig::load_or_default();
    config.merge_cli(cli.api_url.clone(), cli.source.clone());

    // Save config for next time, unless the existing file could not be read
    if writable {
        if let Err(err) = config.save() {
            tracing::warn!(error = %err, "failed to save configuration");
        }
    }

    tracing::info!(api_url = %config.api_url, source = ?config.source_id, "starting kapactl");

    if cli.test {
        return test_api_connection(&config).await;
    }

    let options = ui::RunOptions {
        show_new_kapacitor: cli.new_kapacitor,
        on_boarding: cli.on_boarding || config.on_boarding,
        save_config: writable,
    };
    ui::run(&mut config, options).await
}

async fn test_api_connection(config: &config::AppConfig) -> Result<()> {
    use chronograf::{ChronografClient, KapacitorApi};

    println!("Testing connection to Chronograf at {}...", config.api_url);

    let client = ChronografClient::new(config.api_url.clone());

    if let Err(e) = client.test_connection().await {
        eprintln!("✗ Connection failed: {:#}", e);
        std::process::exit(1);
    }
    println!("✓ Connected successfully!");

    let sources = client.get_sources().await?;
    println!("\nFound {} sources:", sources.len());

    for source in &sources {
        let marker = if source.default { " (default)" } else { "" };
        println!("  - [{}] {} {}{}", source.id, source.name, source.url, marker);

        let kapacitors = match client.get_kapacitors(source).await {
            Ok(kapacitors) => kapacitors,
            Err(e) => {
                eprintln!("    ✗ Failed to get Kapacitors: {:#}", e);
                continue;
            }
        };

        for kapacitor in &kapacitors {
            let reachable = match client.ping_kapacitor(kapacitor).await {
                Ok(()) => "reachable",
                Err(_) => "unreachable",
            };
            let active = if kapacitor.active { "*" } else { " " };
            println!(
                "    {} {} {} ({})",
                active, kapacitor.name, kapacitor.url, reachable
            );

            if kapacitor.active {
                match client.get_rules(kapacitor).await {
                    Ok(rules) => {
                        println!("      {} alert rules", rules.len());
                        for rule in rules.iter().take(5) {
                            println!("        - {} [{}]", rule.name, rule.status.as_str());
                        }
                        if rules.len() > 5 {
                            println!("        ... and {} more", rules.len() - 5);
                        }
                    }
                    Err(e) => eprintln!("      ✗ Failed to get rules: {:#}", e),
                }
            }
        }
    }

    println!("\n✓ All tests completed successfully!");

    Ok(())
}
