//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use rusty_latte::data::filter::{FilterCriteria, Predicate};
use rusty_latte::data::model::Nutrient;

#[derive(Parser)]
#[command(
    name = "rusty-latte",
    version,
    about = "Menu nutrition analysis: statistics, comparisons, filters, charts and summaries",
    long_about = "Analyse menu nutrition tables.\n\n\
                  Reads CSV (UTF-8, UTF-16 with BOM, Windows-1252), JSON and Parquet.\n\
                  Column headers are matched against common aliases such as \
                  'Calories', 'Total Fat (g)' or 'Sodium (mg)'."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Settings file (default: ./rusty-latte.toml when present).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute statistics, comparisons and top lists for drinks and food and save them as JSON.
    Stats(StatsArgs),

    /// Print the drinks-versus-food comparison as JSON.
    Compare(PairArgs),

    /// Print descriptive statistics for one dataset as JSON.
    Describe(DatasetArgs),

    /// Print the highest items of one column as CSV.
    Top(TopArgs),

    /// Print the rows matching every given threshold as CSV.
    Filter(FilterArgs),

    /// Print the rows whose column is at most MAX as CSV.
    FilterColumn(FilterColumnArgs),

    /// Draw a bar chart of the top items by one column.
    VizTop(VizTopArgs),

    /// Draw grouped bars of drinks and food means.
    VizMeans(VizMeansArgs),

    /// Draw the highest calories, fat and carbs value of drinks and food.
    VizExtremes(VizExtremesArgs),

    /// Ask the language model to summarize a saved metrics file.
    Summarize(SummarizeArgs),

    /// Ask the language model a question about a saved metrics file.
    Ask(AskArgs),
}

#[derive(Args)]
pub struct PairArgs {
    #[arg(value_name = "DRINKS")]
    pub drinks: PathBuf,

    #[arg(value_name = "FOOD")]
    pub food: PathBuf,
}

#[derive(Args)]
pub struct DatasetArgs {
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,
}

#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub pair: PairArgs,

    /// Where to write the report (default: <output_dir>/metrics/metrics.json).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Length of each top list (default from settings).
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

#[derive(Args)]
pub struct TopArgs {
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Column to rank by.
    #[arg(long, default_value = "calories")]
    pub column: Nutrient,

    /// Number of items (default from settings).
    #[arg(short, long)]
    pub n: Option<usize>,
}

#[derive(Args, Default)]
pub struct CriteriaArgs {
    #[arg(long, value_name = "X")]
    pub calories_le: Option<f64>,

    /// Falls back to carbohydrates when the dataset has no sugar column.
    #[arg(long, value_name = "X")]
    pub sugar_g_le: Option<f64>,

    #[arg(long, value_name = "X")]
    pub fat_g_le: Option<f64>,

    #[arg(long, value_name = "X")]
    pub protein_g_ge: Option<f64>,

    #[arg(long, value_name = "X", alias = "sodium-mg-le")]
    pub sodium_le: Option<f64>,

    #[arg(long, value_name = "X", alias = "caffeine-mg-gt")]
    pub caffeine_gt: Option<f64>,

    /// Case-insensitive substring of the item name.
    #[arg(long, value_name = "TEXT")]
    pub name_contains: Option<String>,
}

impl From<CriteriaArgs> for FilterCriteria {
    fn from(args: CriteriaArgs) -> Self {
        FilterCriteria {
            calories_le: args.calories_le,
            sugar_g_le: args.sugar_g_le,
            fat_g_le: args.fat_g_le,
            protein_g_ge: args.protein_g_ge,
            sodium_le: args.sodium_le,
            caffeine_gt: args.caffeine_gt,
            name_contains: args.name_contains,
        }
    }
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    #[command(flatten)]
    pub criteria: CriteriaArgs,

    /// Extra predicate such as `calories<=200`, `protein_g>=5`, `caffeine>0`
    /// or `name~latte`. Repeatable.
    #[arg(long = "where", value_name = "EXPR")]
    pub predicates: Vec<Predicate>,
}

#[derive(Args)]
pub struct FilterColumnArgs {
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    #[arg(value_name = "COLUMN")]
    pub column: Nutrient,

    #[arg(value_name = "MAX")]
    pub max: f64,
}

#[derive(Args)]
pub struct VizTopArgs {
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    #[arg(long, default_value = "calories")]
    pub column: Nutrient,

    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Output PNG (default: <output_dir>/plots/top_<column>.png).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct VizMeansArgs {
    #[command(flatten)]
    pub pair: PairArgs,

    /// Output PNG (default: <output_dir>/plots/means_comparison.png).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct VizExtremesArgs {
    #[command(flatten)]
    pub pair: PairArgs,

    /// Output PNG (default: <output_dir>/plots/extremes_comparison.png).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct SummarizeArgs {
    /// Metrics report written by `stats` (default: <output_dir>/metrics/metrics.json).
    #[arg(long, value_name = "PATH")]
    pub metrics: Option<PathBuf>,

    /// Write the summary here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Return JSON with summary_text, key_points and caveats.
    #[arg(long)]
    pub structured: bool,
}

#[derive(Args)]
pub struct AskArgs {
    #[arg(value_name = "QUESTION")]
    pub question: String,

    #[arg(long, value_name = "PATH")]
    pub metrics: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filter_flags_and_predicates_parse() {
        let cli = Cli::parse_from([
            "rusty-latte",
            "filter",
            "drinks.csv",
            "--calories-le",
            "200",
            "--caffeine-mg-gt",
            "0",
            "--where",
            "protein_g>=5",
        ]);
        let Command::Filter(args) = cli.command else {
            panic!("expected filter");
        };
        assert_eq!(args.predicates, vec![Predicate::AtLeast(Nutrient::ProteinG, 5.0)]);
        let criteria = FilterCriteria::from(args.criteria);
        assert_eq!(criteria.calories_le, Some(200.0));
        assert_eq!(criteria.caffeine_gt, Some(0.0));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let result = Cli::try_parse_from(["rusty-latte", "top", "food.csv", "--column", "vitamins"]);
        assert!(result.is_err());
    }
}
