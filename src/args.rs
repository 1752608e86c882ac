//! These structs provide the CLI interface for the bars CLI.

use crate::filter::Selection;
use crate::model::{AmountPolicy, SalesTable};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// bars: The data core of a chocolate sales dashboard.
///
/// The purpose of this program is to load a chocolate sales CSV, narrow it down to the countries
/// and products you care about, and compute every aggregate a sales dashboard needs: monthly and
/// daily totals, country and product rankings, weekday distributions, growth and volume charts,
/// and a handful of key metrics. The results are written as JSON for a rendering layer to draw.
///
/// Start with `bars init --source <csv>`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and initialize the configuration file.
    ///
    /// This is the first command you should run. Decide what directory you want to keep your
    /// configuration and exports in and pass it as --bars-home. By default, it will be
    /// $HOME/beans-to-bars.
    Init(InitArgs),
    /// Compute every dashboard aggregate for the selected countries and products.
    Report(ReportArgs),
    /// Write the selected rows to chocolate_sales.csv.
    Export(ExportArgs),
    /// List the countries and products that can be selected.
    Options(OptionsArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and exports are held. Defaults to ~/beans-to-bars
    #[arg(long, env = "BARS_HOME", default_value_t = default_bars_home())]
    bars_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, bars_home: PathBuf) -> Self {
        Self {
            log_level,
            bars_home: bars_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn bars_home(&self) -> &DisplayPath {
        &self.bars_home
    }
}

/// (Not shown): Args for the `bars init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to the sales CSV, e.g. "Chocolate Sales.csv".
    #[arg(long)]
    source: PathBuf,

    /// What to do with a row whose amount cannot be parsed: "drop" logs a warning and skips the
    /// row, "fail" stops the load.
    #[arg(long, default_value_t = AmountPolicy::Drop)]
    amount_policy: AmountPolicy,
}

impl InitArgs {
    pub fn new(source: impl Into<PathBuf>, amount_policy: AmountPolicy) -> Self {
        Self {
            source: source.into(),
            amount_policy,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn amount_policy(&self) -> AmountPolicy {
        self.amount_policy
    }
}

/// The country and product checklists. Leaving one out selects every value.
#[derive(Debug, Default, Parser, Clone)]
pub struct FilterArgs {
    /// A country to include. Repeat to include several. Defaults to every country.
    #[arg(long = "country")]
    countries: Vec<String>,

    /// A product to include. Repeat to include several. Defaults to every product.
    #[arg(long = "product")]
    products: Vec<String>,
}

impl FilterArgs {
    pub fn new(countries: Vec<String>, products: Vec<String>) -> Self {
        Self {
            countries,
            products,
        }
    }

    /// Builds the selection for `table`, filling in every available value where a list is empty.
    pub fn selection(&self, table: &SalesTable) -> Selection {
        let countries = if self.countries.is_empty() {
            table.countries()
        } else {
            self.countries.iter().cloned().collect()
        };
        let products = if self.products.is_empty() {
            table.products()
        } else {
            self.products.iter().cloned().collect()
        };
        Selection::new(countries, products)
    }
}

/// (Not shown): Args for the `bars report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[clap(flatten)]
    filters: FilterArgs,

    /// Read this CSV instead of the configured source.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Write the report JSON to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ReportArgs {
    pub fn new(filters: FilterArgs, source: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        Self {
            filters,
            source,
            output,
        }
    }

    pub fn filters(&self) -> &FilterArgs {
        &self.filters
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// (Not shown): Args for the `bars export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    filters: FilterArgs,

    /// Read this CSV instead of the configured source.
    #[arg(long)]
    source: Option<PathBuf>,

    /// The directory to write chocolate_sales.csv into. Defaults to the configured export_dir.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(filters: FilterArgs, source: Option<PathBuf>, out_dir: Option<PathBuf>) -> Self {
        Self {
            filters,
            source,
            out_dir,
        }
    }

    pub fn filters(&self) -> &FilterArgs {
        &self.filters
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn out_dir(&self) -> Option<&Path> {
        self.out_dir.as_deref()
    }
}

/// (Not shown): Args for the `bars options` command.
#[derive(Debug, Parser, Clone)]
pub struct OptionsArgs {
    /// Read this CSV instead of the configured source.
    #[arg(long)]
    source: Option<PathBuf>,
}

impl OptionsArgs {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn default_bars_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("beans-to-bars"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --bars-home or BARS_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("beans-to-bars")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::sample_table;

    #[test]
    fn test_parse_report() {
        let args = Args::try_parse_from([
            "bars",
            "--log-level",
            "debug",
            "--bars-home",
            "/tmp/bars",
            "report",
            "--country",
            "UK",
            "--country",
            "India",
            "--output",
            "report.json",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert_eq!(args.common().bars_home().path(), Path::new("/tmp/bars"));
        match args.command() {
            Command::Report(report) => {
                assert_eq!(report.filters().countries, vec!["UK", "India"]);
                assert!(report.filters().products.is_empty());
                assert_eq!(report.output(), Some(Path::new("report.json")));
                assert!(report.source().is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_init() {
        let args = Args::try_parse_from([
            "bars",
            "init",
            "--source",
            "sales.csv",
            "--amount-policy",
            "fail",
        ])
        .unwrap();
        match args.command() {
            Command::Init(init) => {
                assert_eq!(init.source(), Path::new("sales.csv"));
                assert_eq!(init.amount_policy(), AmountPolicy::Fail);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_amount_policy() {
        let result = Args::try_parse_from([
            "bars",
            "init",
            "--source",
            "sales.csv",
            "--amount-policy",
            "ignore",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_defaults_to_everything() {
        let table = sample_table();
        let selection = FilterArgs::default().selection(&table);
        assert_eq!(selection, Selection::all(&table));
    }

    #[test]
    fn test_filter_narrows() {
        let table = sample_table();
        let filters = FilterArgs::new(vec!["USA".to_string()], vec![]);
        let selection = filters.selection(&table);
        assert_eq!(selection.countries().len(), 1);
        assert_eq!(selection.products(), &table.products());
    }
}
