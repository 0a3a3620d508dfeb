use clap::Parser;
use userprobe::config::cli::{Cli, Command};
use userprobe::config::{self, LogFormat};
use userprobe::utils::{logger, validation::Validate};
use userprobe::{
    CatalogStore, FreshnessController, FreshnessOutcome, LocalStorage, PlatformDirectory,
    ProbeConfig, ProbeError, ProbeOrchestrator, ProbeResult, ProbeSummary, ReqwestProbeClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dotenv = config::load_dotenv();
    let config = ProbeConfig::from_env();
    let log_format = config
        .as_ref()
        .map(|c| c.log_format)
        .unwrap_or_default();
    match log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting userprobe");
    if let Some(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let result = match config {
        Ok(config) => {
            tracing::debug!("Config: {:?}", config);
            run(cli, &config).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: Cli, config: &ProbeConfig) -> userprobe::Result<()> {
    config.validate()?;

    let client = ReqwestProbeClient::new(config)?;
    let store = CatalogStore::new(LocalStorage::default(), config.list_filename.clone());
    let controller = FreshnessController::new(store, client.clone(), config);

    match cli.command {
        Command::Sync => {
            println!("[-] Checking catalog {}", config.list_filename);
            let outcome = controller.check().await?;
            print_freshness(&outcome);
            Ok(())
        }
        Command::Probe { username } => {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(ProbeError::InvalidConfigValueError {
                    field: "username".to_string(),
                    value: username,
                    reason: "Username cannot be empty".to_string(),
                });
            }

            let (outcome, catalog) = controller.refresh_and_load().await?;
            match outcome {
                Some(outcome) => print_freshness(&outcome),
                None => println!("[!] Catalog refresh failed, using local catalog"),
            }

            let platforms = PlatformDirectory::load(&config.platform_urls_path);
            let orchestrator = ProbeOrchestrator::new(client)
                .with_max_concurrent_probes(config.max_concurrent_probes);

            println!("[-] Probing {} sites for '{}'", catalog.len(), username);
            let results = tokio::select! {
                results = orchestrator.run(&username, &catalog) => results,
                _ = tokio::signal::ctrl_c() => {
                    println!("[!] Interrupted, cancelling outstanding probes");
                    return Err(ProbeError::Interrupted);
                }
            };

            for result in &results {
                print_result(result, &username, &platforms);
            }

            let summary = ProbeSummary::from_results(&results);
            println!(
                "[+] {} sites probed: {} ok, {} HTTP errors, {} failed",
                summary.total, summary.succeeded, summary.http_errors, summary.failed
            );
            Ok(())
        }
    }
}

fn print_freshness(outcome: &FreshnessOutcome) {
    match outcome {
        FreshnessOutcome::Downloaded { sites } => {
            println!("[!] Downloaded catalog ({} sites)", sites)
        }
        FreshnessOutcome::UpToDate => println!("[+] Catalog is up to date"),
        FreshnessOutcome::Updated { previous, current } => println!(
            "[!] Catalog updated ({} -> {})",
            previous.short(),
            current.short()
        ),
        FreshnessOutcome::Degraded { reason } => {
            println!("[!] Could not check for updates, using local catalog: {}", reason)
        }
    }
}

fn print_result(result: &ProbeResult, username: &str, platforms: &PlatformDirectory) {
    match &result.outcome {
        Ok(response) => {
            let json = if response.parsed_json().is_some() {
                " json"
            } else {
                ""
            };
            let link = platforms
                .profile_url(&result.site.name, username)
                .map(|url| format!(" profile: {}", url))
                .unwrap_or_default();
            println!(
                "[{}] {} HTTP {}{} {}{}",
                if response.is_success() { "+" } else { "-" },
                result.site.name,
                response.status,
                json,
                result.url,
                link
            );
        }
        Err(e) => println!("[x] {} {} error: {}", result.site.name, result.url, e),
    }
}
