use clap::Parser;
use fragment_router::config::LogFormat;
use fragment_router::session::{reports_to_json, BrowserSession, PageReport, SessionStart};
use fragment_router::utils::error::{ErrorSeverity, RouterError};
use fragment_router::utils::{logger, validation::Validate};
use fragment_router::{CliConfig, NavigationOutcome, ScriptRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    // 初始化日誌
    match config.logging.format {
        LogFormat::Json => logger::init_json_logger(config.logging.verbose),
        LogFormat::Compact => logger::init_cli_logger(config.logging.verbose),
    }
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(e);
    }

    let session = match BrowserSession::open(&config, &cli.start, ScriptRegistry::new()).await {
        Ok(SessionStart::Active(session)) => session,
        Ok(SessionStart::Static { route, title }) => {
            println!("{} ({}) is not SPA-enabled: no #{} element", route, title, config.shell.mount_point_id);
            return Ok(());
        }
        Err(e) => fail(e),
    };

    let mut reports = Vec::new();
    for route in &cli.routes {
        reports.push(session.visit(route).await);
    }
    for _ in 0..cli.back {
        reports.push(session.back().await);
    }
    if reports.is_empty() {
        reports.push(session.report(None).await);
    }

    if cli.json {
        match reports_to_json(&reports) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    let failed = reports
        .iter()
        .filter(|r| matches!(r.outcome, Some(NavigationOutcome::Failed { .. })))
        .count();
    if failed > 0 {
        tracing::warn!("{} navigation(s) failed", failed);
        std::process::exit(2);
    }

    Ok(())
}

fn print_report(report: &PageReport) {
    match &report.outcome {
        Some(NavigationOutcome::Applied { route, .. }) => println!("✅ {}", route),
        Some(NavigationOutcome::Failed { route, reason, .. }) => println!("❌ {}: {}", route, reason),
        Some(NavigationOutcome::Rejected { href }) => println!("⏭  ignored {:?}", href),
        Some(NavigationOutcome::Superseded { route, .. }) => println!("↪  superseded {}", route),
        None => println!("•  current page"),
    }

    let page = &report.page;
    println!("   title:       {}", page.title);
    if let Some(route) = &page.route {
        println!("   location:    {}", route);
    }
    println!("   stylesheets: {}", join_or_dash(&page.dynamic_stylesheets));
    println!("   scripts:     {}", join_or_dash(&report.scripts_executed));
    println!(
        "   history:     {}",
        page.history.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(" → ")
    );
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// 輸出用戶友好的錯誤信息，並依嚴重程度決定退出碼
fn fail(e: RouterError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
