//! Subcommand implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusty_latte::chart;
use rusty_latte::config::Settings;
use rusty_latte::data::export;
use rusty_latte::data::filter::{filter, FilterCriteria, Predicate};
use rusty_latte::data::loader::load;
use rusty_latte::data::model::{MenuTable, Nutrient};
use rusty_latte::metrics::rank::Ranking;
use rusty_latte::metrics::{compare, describe, load_metrics, save_metrics, MetricsReport};
use rusty_latte::narrate::{Narrator, SummarySource};

use crate::cli::{
    AskArgs, DatasetArgs, FilterArgs, FilterColumnArgs, PairArgs, StatsArgs, SummarizeArgs,
    TopArgs, VizExtremesArgs, VizMeansArgs, VizTopArgs,
};

/// Nutrients drawn by `viz-means`.
const MEANS_CHART_NUTRIENTS: [Nutrient; 5] = [
    Nutrient::Calories,
    Nutrient::SugarG,
    Nutrient::FatG,
    Nutrient::ProteinG,
    Nutrient::Sodium,
];

fn load_table(path: &Path) -> Result<MenuTable> {
    load(path).with_context(|| format!("loading {}", path.display()))
}

fn load_pair(pair: &PairArgs) -> Result<(MenuTable, MenuTable)> {
    Ok((load_table(&pair.drinks)?, load_table(&pair.food)?))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn run_stats(args: &StatsArgs, settings: &Settings) -> Result<()> {
    let (drinks, food) = load_pair(&args.pair)?;
    let top = args.top.unwrap_or(settings.top_n);
    let report = MetricsReport::build(&drinks, &food, top);

    let out = args.out.clone().unwrap_or_else(|| settings.metrics_path());
    save_metrics(&report, &out).with_context(|| format!("writing {}", out.display()))?;
    if report.uses_sugar_proxy() {
        log::warn!("sugar_g missing in at least one dataset; carbs_g used as proxy");
    }
    println!("Saved metrics to {}", out.display());
    Ok(())
}

pub fn run_compare(args: &PairArgs) -> Result<()> {
    let (drinks, food) = load_pair(args)?;
    print_json(&compare(&drinks, &food))
}

pub fn run_describe(args: &DatasetArgs) -> Result<()> {
    let table = load_table(&args.dataset)?;
    print_json(&describe(&table))
}

pub fn run_top(args: &TopArgs, settings: &Settings) -> Result<()> {
    let table = load_table(&args.dataset)?;
    let column = table.resolve_column(args.column);
    if column != args.column {
        log::warn!("{} has no {} values; ranking by {column}", args.dataset.display(), args.column);
    }
    let ranking = Ranking::build(&table, column, args.n.unwrap_or(settings.top_n));
    if ranking.items.is_empty() {
        log::warn!("{} has no {column} values", args.dataset.display());
    }
    export::write_ranking(&ranking, io::stdout().lock())?;
    Ok(())
}

pub fn run_filter(args: FilterArgs) -> Result<()> {
    let table = load_table(&args.dataset)?;
    let mut predicates = FilterCriteria::from(args.criteria).to_predicates();
    predicates.extend(args.predicates);
    print_filtered(&table, &predicates)
}

pub fn run_filter_column(args: &FilterColumnArgs) -> Result<()> {
    let table = load_table(&args.dataset)?;
    print_filtered(&table, &[Predicate::AtMost(args.column, args.max)])
}

fn print_filtered(table: &MenuTable, predicates: &[Predicate]) -> Result<()> {
    let rows = filter(table, predicates);
    log::info!("{} of {} rows match", rows.len(), table.len());
    export::write_table(&rows, io::stdout().lock())?;
    Ok(())
}

pub fn run_viz_top(args: &VizTopArgs, settings: &Settings) -> Result<()> {
    let table = load_table(&args.dataset)?;
    let out = args.out.clone().unwrap_or_else(|| {
        settings
            .plots_dir()
            .join(format!("top_{}.png", args.column.key()))
    });
    let written = chart::bar_top_items(
        &table,
        table.resolve_column(args.column),
        args.top.unwrap_or(settings.top_n),
        &out,
    )?;
    println!("Saved plot to {}", written.display());
    Ok(())
}

pub fn run_viz_means(args: &VizMeansArgs, settings: &Settings) -> Result<()> {
    let (drinks, food) = load_pair(&args.pair)?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| settings.plots_dir().join("means_comparison.png"));
    let written = chart::grouped_means_bar(&drinks, &food, &MEANS_CHART_NUTRIENTS, &out)?;
    println!("Saved plot to {}", written.display());
    Ok(())
}

pub fn run_viz_extremes(args: &VizExtremesArgs, settings: &Settings) -> Result<()> {
    let (drinks, food) = load_pair(&args.pair)?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| settings.plots_dir().join("extremes_comparison.png"));
    let written = chart::extremes_bar(&drinks, &food, &out)?;
    println!("Saved plot to {}", written.display());
    Ok(())
}

fn read_report(path: Option<&PathBuf>, settings: &Settings) -> Result<MetricsReport> {
    let path = path.cloned().unwrap_or_else(|| settings.metrics_path());
    load_metrics(&path).with_context(|| {
        format!("reading metrics {} (run `rusty-latte stats` first)", path.display())
    })
}

/// Narration failures are reported on stdout and do not fail the command.
pub fn run_summarize(args: &SummarizeArgs, settings: &Settings) -> Result<()> {
    let report = read_report(args.metrics.as_ref(), settings)?;

    let text = match summarize_text(&report, args.structured, settings) {
        Ok(text) => text,
        Err(e) => {
            println!("LLM summarization unavailable: {e}");
            return Ok(());
        }
    };

    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(out, &text).with_context(|| format!("writing {}", out.display()))?;
            println!("Saved summary to {}", out.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn summarize_text(report: &MetricsReport, structured: bool, settings: &Settings) -> Result<String> {
    let mut narrator = Narrator::from_settings(settings)?;
    if structured {
        let summary = narrator.summarize_structured(report)?;
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    let summary = narrator.summarize(report)?;
    if summary.source == SummarySource::Stale {
        eprintln!("note: request failed; showing the last saved summary for these metrics");
    }
    Ok(summary.text)
}

pub fn run_ask(args: &AskArgs, settings: &Settings) -> Result<()> {
    let report = read_report(args.metrics.as_ref(), settings)?;
    let answer = Narrator::from_settings(settings).and_then(|n| n.answer(&report, &args.question));
    match answer {
        Ok(text) => println!("{text}"),
        Err(e) => println!("LLM summarization unavailable: {e}"),
    }
    Ok(())
}
