mod browser;
mod common;
mod config;
mod wordle;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use browser::{BrowserConfig, BrowserKind, WebDriverHost, new_session};
use common::scenario::{Scenario, ScenarioResult, expand_scenarios, get_scenario, list_scenarios};
use common::{artifacts_dir, capture_artifacts, split_csv};
use config::{WordleConfig, load_selector_map};
use wordle::WordlePage;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HeadlessMode {
    /// Run browsers in headless mode
    Headless,
    /// Run browsers with visible windows
    Windowed,
}

impl HeadlessMode {
    const fn is_headless(self) -> bool {
        matches!(self, Self::Headless)
    }
}

#[derive(Debug, Parser)]
#[command(name = "wordle-tester", version)]
#[command(about = "Browser automation and verification for the Wordle word-guessing game")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Browsers to run (chrome,edge,firefox,safari)
    #[arg(long, default_value = "chrome")]
    browsers: String,

    /// Base URL of the game
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// JSON file overriding element selectors
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// How long to wait for a notification toast, in milliseconds
    #[arg(long, default_value_t = 3000)]
    notification_timeout_ms: u64,

    /// Ceiling for waits without an explicit timeout, in seconds
    #[arg(long, default_value_t = 30)]
    default_timeout_secs: u64,

    /// Artifacts directory for screenshots and page sources of failures
    #[arg(long, default_value = "target/test-artifacts")]
    artifacts_dir: String,

    /// Connect to a Selenium Grid/Appium hub instead of local drivers
    #[arg(long)]
    hub: Option<String>,

    /// Run headless where supported
    #[arg(long, value_enum, default_value_t = HeadlessMode::Headless)]
    headless: HeadlessMode,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let wordle_config = build_wordle_config(&args)?;
    let scenarios = resolve_scenarios(&args.scenarios);

    let results = run_browser_scenarios(&args, &scenarios, &wordle_config).await;

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🟩 Wordle Automated Tester".bright_green().bold());
    println!("{}", "==========================".green());
}

fn build_wordle_config(args: &Args) -> Result<WordleConfig> {
    let mut cfg = WordleConfig::default().with_base_url(args.base_url.clone());
    cfg.notification_timeout = Duration::from_millis(args.notification_timeout_ms);
    if let Some(path) = &args.selectors {
        cfg.selectors = load_selector_map(path)?;
    }
    if cfg.base_url.is_none() {
        log::warn!("BASE_URL is not set; every scenario will fail during setup");
    }
    Ok(cfg)
}

fn resolve_scenarios(scenarios_arg: &str) -> Vec<Scenario> {
    let mut resolved = Vec::new();
    for name in expand_scenarios(&split_csv(scenarios_arg)) {
        match get_scenario(&name) {
            Some(scenario) => resolved.push(scenario),
            None => eprintln!("⚠️  Unknown scenario: {}", name.yellow()),
        }
    }
    resolved
}

fn build_browser_config(args: &Args) -> BrowserConfig {
    BrowserConfig {
        headless: args.headless.is_headless(),
        remote_hub: args.hub.clone(),
        ..BrowserConfig::default()
    }
}

async fn run_browser_scenarios(
    args: &Args,
    scenarios: &[Scenario],
    wordle_config: &WordleConfig,
) -> Vec<ScenarioResult> {
    let mut results = Vec::new();
    if scenarios.is_empty() {
        return results;
    }

    println!("{}", "🌐 Running Browser Tests".bright_blue().bold());
    println!("{}", "-".repeat(30).blue());

    let cfg = build_browser_config(args);

    for browser_name in split_csv(&args.browsers) {
        let Some(kind) = BrowserKind::parse(&browser_name) else {
            eprintln!("⚠️  Unknown browser: {}", browser_name.yellow());
            continue;
        };

        for scenario in scenarios {
            let result =
                run_scenario_in_fresh_session(args, &cfg, kind, scenario, wordle_config).await;
            results.push(result);
        }
    }

    results
}

/// Each scenario gets its own session so a failure cannot leak into the next.
async fn run_scenario_in_fresh_session(
    args: &Args,
    cfg: &BrowserConfig,
    kind: BrowserKind,
    scenario: &Scenario,
    wordle_config: &WordleConfig,
) -> ScenarioResult {
    let label = kind.label();
    let scenario_start = Instant::now();

    let driver = match new_session(kind, cfg).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("❌ Could not start {label}: {e}");
            let outcome = Err(anyhow::Error::new(e).context(format!("starting {label} session")));
            return ScenarioResult::from_outcome(scenario, label, &outcome, scenario_start);
        }
    };

    if args.verbose {
        println!("🧪 [{}] {}", label.bright_white(), scenario.name);
    }

    let host = WebDriverHost::new(&driver)
        .with_default_timeout(Duration::from_secs(args.default_timeout_secs));
    let page = WordlePage::new(&host, wordle_config);
    let outcome = scenario.run(&page, args.verbose).await;
    let duration = scenario_start.elapsed();

    match &outcome {
        Ok(()) => {
            println!("✅ [{}] {} - {:?}", label.green(), scenario.key, duration);
        }
        Err(e) => {
            eprintln!("❌ [{}] {} - {:?}: {:#}", label.red(), scenario.key, duration, e);
            let dir = artifacts_dir(&args.artifacts_dir, label, scenario.key);
            if let Err(capture_err) = capture_artifacts(&driver, &dir, e).await {
                log::warn!("could not capture artifacts in {dir}: {capture_err:#}");
            }
        }
    }

    let result = ScenarioResult::from_outcome(scenario, label, &outcome, scenario_start);
    if let Err(e) = driver.quit().await {
        log::warn!("failed to quit {label} session: {e}");
    }
    result
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => common::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Wordle Browser Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                common::reports::generate_markdown_report(&mut output_target, results)?;
            }
            write_total_time(&mut output_target, start_time)?;
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                common::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            write_total_time(&mut output_target, start_time)?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

/// Human-readable trailer; JSON output stays a single document.
fn write_total_time<W: Write>(out: &mut W, start_time: Instant) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "🏁 Total time: {:?}", start_time.elapsed())?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
