use {
    anyhow::{Context, Result},
    clap::Parser,
    market_snapshot::{
        AnalysisConfig, Cli, MarketSnapshot, PriceSeries, RawBar,
        analysis::{MOMENTUM_WINDOWS, rank_momentum},
        config::PriceLike,
        engine::{AssetInput, SetupEngine, build_snapshots_with},
        report::{fibonacci_table, levels_table, momentum_table, narrate, setups_table},
    },
    std::{collections::BTreeMap, fs, panic, path::Path, process::ExitCode},
};

fn init_log() {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Error)
    };

    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, global_level)
        .filter(Some("market_snapshot"), my_code_level)
        .parse_default_env()
        .init();
}

fn symbol_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_bars(path: &Path) -> Result<Vec<RawBar>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing bars in {}", path.display()))
}

fn read_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn read_benchmark(path: &Path) -> Result<(String, PriceSeries)> {
    let (series, _) = PriceSeries::from_raw(read_bars(path)?)
        .with_context(|| format!("validating benchmark {}", path.display()))?;
    Ok((symbol_of(path), series))
}

fn print_report(snapshot: &MarketSnapshot, config: &AnalysisConfig) {
    println!("{}\n", narrate(snapshot, config).render());

    println!("Price levels");
    println!("{}\n", levels_table(&snapshot.levels, snapshot.latest_price.value()));

    if let Some(fib) = &snapshot.fibonacci {
        println!("Fibonacci ({})", fib.swing());
        println!("{}\n", fibonacci_table(fib));
    }

    let setups = SetupEngine::new(config.setups.clone()).evaluate(snapshot);
    println!("Setups");
    println!("{}\n", setups_table(&setups));
}

fn run(args: Cli) -> Result<bool> {
    let config = read_config(args.config.as_deref())?;
    let benchmarks = args
        .benchmarks
        .iter()
        .map(|p| read_benchmark(p))
        .collect::<Result<Vec<_>>>()?;

    let inputs = args
        .inputs
        .iter()
        .map(|p| {
            Ok(AssetInput {
                symbol: symbol_of(p),
                bars: read_bars(p)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let several = inputs.len() > 1;

    let mut all_ok = true;
    let mut built = BTreeMap::new();
    for outcome in build_snapshots_with(inputs, &config, &benchmarks) {
        match outcome.result {
            Ok(snapshot) => {
                built.insert(outcome.symbol, snapshot);
            }
            Err(e) => {
                all_ok = false;
                eprintln!("{}: cannot build snapshot: {}", outcome.symbol, e);
            }
        }
    }

    if args.json {
        let out = serde_json::to_string_pretty(&built).context("serialising snapshots")?;
        println!("{}", out);
        return Ok(all_ok);
    }

    for (symbol, snapshot) in &built {
        if several {
            println!("=== {} ===\n", symbol);
        }
        print_report(snapshot, &config);
    }

    if several {
        let series: BTreeMap<String, PriceSeries> = built
            .iter()
            .map(|(symbol, snapshot)| (symbol.clone(), snapshot.series.clone()))
            .collect();
        println!("Momentum ranking");
        println!("{}", momentum_table(&rank_momentum(&series, &MOMENTUM_WINDOWS)));
    }

    Ok(all_ok)
}

fn main() -> ExitCode {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    init_log();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("cannot build snapshot: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
