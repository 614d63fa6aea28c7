use idxalloc::AppCommand;
use idxalloc::cli::custom::CustomCommand;
use idxalloc::cli::parse::ParseArgs;
use idxalloc::cli::rebalance::RebalanceArgs;
use idxalloc::cli::targets::TargetsArgs;
use idxalloc::core::sort::PlanColumn;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const SNAPSHOT: &str = r#"{
        "source": "schwab",
        "asOfClose": "10/16/2026",
        "fetchedAtUtc": "2026-10-17T02:15:00Z",
        "holdings": [
            { "symbol": "NVDA", "name": "NVIDIA Corp", "weightPct": 9.8 },
            { "symbol": "MSFT", "name": "Microsoft Corp", "weightPct": 8.4 },
            { "symbol": "AAPL", "name": "Apple Inc", "weightPct": 7.6 },
            { "symbol": "AMZN", "name": "Amazon.com Inc", "weightPct": 5.5 },
            { "symbol": "AVGO", "name": "Broadcom Inc", "weightPct": 5.1 },
            { "symbol": "META", "name": "Meta Platforms Inc", "weightPct": 3.6 },
            { "symbol": "GOOGL", "name": "Alphabet Inc Class A", "weightPct": 3.0 },
            { "symbol": "GOOG", "name": "Alphabet Inc Class C", "weightPct": 2.8 },
            { "symbol": "TSLA", "name": "Tesla Inc", "weightPct": 2.7 },
            { "symbol": "NFLX", "name": "Netflix Inc", "weightPct": 2.5 },
            { "symbol": "COST", "name": "Costco Wholesale Corp", "weightPct": 2.4 },
            { "symbol": "PLTR", "name": "Palantir Technologies Inc", "weightPct": 2.1 }
        ]
    }"#;

    pub async fn create_mock_server(body: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/qqq-holdings.json"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

/// Writes a config pointing at `snapshot_url` with its own data directory.
fn write_config(dir: &TempDir, snapshot: &str, extra: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    let data_path = dir.path().join("data");
    let content = format!(
        "snapshot:\n  {snapshot}\ndata_path: \"{}\"\n{extra}",
        data_path.display()
    );
    fs::write(&config_path, content).expect("Failed to write config file");
    config_path.to_str().unwrap().to_string()
}

async fn run(command: AppCommand, config_path: &str) {
    let result = idxalloc::run_command(command, Some(config_path)).await;
    assert!(
        result.is_ok(),
        "Command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_holdings_and_targets_with_mock() {
    let server = test_utils::create_mock_server(test_utils::SNAPSHOT, 200).await;
    let dir = TempDir::new().unwrap();
    let url = format!("url: \"{}/qqq-holdings.json\"", server.uri());
    let config_path = write_config(&dir, &url, "");

    info!("Running holdings");
    run(AppCommand::Holdings, &config_path).await;

    info!("Running targets");
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &url, "");
    run(
        AppCommand::Targets(TargetsArgs {
            amount: Some("$10,000".to_string()),
            rescale: Some(false),
        }),
        &config_path,
    )
    .await;
}

#[test_log::test(tokio::test)]
async fn test_rebalance_from_paste_and_assignments() {
    let server = test_utils::create_mock_server(test_utils::SNAPSHOT, 200).await;
    let dir = TempDir::new().unwrap();
    let url = format!("url: \"{}/qqq-holdings.json\"", server.uri());
    let config_path = write_config(&dir, &url, "top_n: 10\n");

    let paste = dir.path().join("positions.txt");
    fs::write(
        &paste,
        "Symbol Description Market Value\n\
         NVDA NVIDIA CORP $12,400.00\n\
         GOOGL ALPHABET INC CL A 3,100.00\n\
         GOOG ALPHABET INC CL C 2,900.00\n\
         SCHD SCHWAB US DIVIDEND 1.2K\n",
    )
    .unwrap();

    run(
        AppCommand::Rebalance(RebalanceArgs {
            additional: Some("5,000".to_string()),
            set: vec!["MSFT=8000".to_string()],
            paste: Some(paste),
            sort: Some(PlanColumn::SuggestedBuy),
            desc: true,
            ..RebalanceArgs::default()
        }),
        &config_path,
    )
    .await;
}

#[test_log::test(tokio::test)]
async fn test_rebalance_keeps_current_total_by_default() {
    let server = test_utils::create_mock_server(test_utils::SNAPSHOT, 200).await;
    let dir = TempDir::new().unwrap();
    let url = format!("url: \"{}/qqq-holdings.json\"", server.uri());
    let config_path = write_config(&dir, &url, "rescale_top_to_full: false\n");

    run(
        AppCommand::Rebalance(RebalanceArgs {
            set: vec![
                "NVDA=$10,000".to_string(),
                "GOOGL=2,000".to_string(),
                "QQQM=4000".to_string(),
            ],
            ..RebalanceArgs::default()
        }),
        &config_path,
    )
    .await;
}

#[test_log::test(tokio::test)]
async fn test_rebalance_rejects_both_policies() {
    let server = test_utils::create_mock_server(test_utils::SNAPSHOT, 200).await;
    let dir = TempDir::new().unwrap();
    let url = format!("url: \"{}/qqq-holdings.json\"", server.uri());
    let config_path = write_config(&dir, &url, "");

    let result = idxalloc::run_command(
        AppCommand::Rebalance(RebalanceArgs {
            new_total: Some("1000".to_string()),
            additional: Some("1000".to_string()),
            ..RebalanceArgs::default()
        }),
        Some(&config_path),
    )
    .await;
    assert!(result.unwrap_err().to_string().contains("either"));
}

#[test_log::test(tokio::test)]
async fn test_custom_stock_add() {
    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("latest.json");
    fs::write(&snapshot_path, test_utils::SNAPSHOT).unwrap();
    let source = format!("path: \"{}\"", snapshot_path.display());
    let config_path = write_config(&dir, &source, "");

    run(
        AppCommand::Custom(CustomCommand::Add {
            symbol: "voo".to_string(),
            name: Some("Vanguard S&P 500 ETF".to_string()),
            weight: "15%".to_string(),
        }),
        &config_path,
    )
    .await;

    assert!(dir.path().join("data").join("store").exists());
}

#[test_log::test(tokio::test)]
async fn test_parse_file_without_filter() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "path: \"unused.json\"", "");
    let input = dir.path().join("paste.txt");
    fs::write(&input, "AAPL 1,000\nBRK 2.5M\n").unwrap();

    run(
        AppCommand::Parse(ParseArgs {
            input: Some(input),
            ocr: false,
            all: true,
        }),
        &config_path,
    )
    .await;
}

fn write_history(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("index.json"),
        r#"["2026-07-01","2026-09-20","2026-10-15"]"#,
    )
    .unwrap();
    fs::write(
        dir.join("2026-09-20.json"),
        r#"{"holdings":[{"symbol":"NVDA","name":"NVIDIA","weightPct":9.1},{"symbol":"AAPL","name":"Apple","weightPct":8.0}]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("2026-10-15.json"),
        r#"{"holdings":[{"symbol":"NVDA","name":"NVIDIA","weightPct":9.8},{"symbol":"MSFT","name":"Microsoft","weightPct":8.4}]}"#,
    )
    .unwrap();
}

#[test_log::test(tokio::test)]
async fn test_trend_with_file_history() {
    let dir = TempDir::new().unwrap();
    let history = dir.path().join("history");
    write_history(&history);
    let extra = format!("history:\n  path: \"{}\"\n", history.display());
    let config_path = write_config(&dir, "path: \"unused.json\"", &extra);

    run(AppCommand::Trend { days: 30 }, &config_path).await;
}

#[test_log::test(tokio::test)]
async fn test_snapshot_server_error_fails_command() {
    let server = test_utils::create_mock_server("unavailable", 503).await;
    let dir = TempDir::new().unwrap();
    let url = format!("url: \"{}/qqq-holdings.json\"", server.uri());
    let config_path = write_config(&dir, &url, "");

    let result = idxalloc::run_command(AppCommand::Holdings, Some(&config_path)).await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file() {
    let result = idxalloc::run_command(
        AppCommand::Holdings,
        Some("/nonexistent/idxalloc/config.yaml"),
    )
    .await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}
