//! Command implementations for the hydro CLI.
//!
//! Provides subcommands that run the per-station streamflow pipeline and
//! print the derived series for an external renderer.

use clap::Subcommand;

pub mod analyze;
pub mod report;

#[derive(Subcommand)]
pub enum Command {
    /// Analyze every station listed in a station styles fixture
    Analyze {
        /// Station styles CSV (KEY,NAME,DAILY_FILE,COLOR,MARKER)
        #[arg(short = 's', long, default_value = "fixtures/stations.csv")]
        stations: String,

        /// Directory holding the daily files; defaults to the fixture's directory
        #[arg(short = 'd', long)]
        data_dir: Option<String>,

        /// Annual metrics CSV
        #[arg(short = 'a', long)]
        annual: String,

        /// Monthly metrics CSV
        #[arg(short = 'm', long)]
        monthly: String,

        /// First day of the analysis window (YYYY-MM-DD)
        #[arg(long, default_value = "2014-10-01")]
        start: String,

        /// Last day of the analysis window (YYYY-MM-DD)
        #[arg(long, default_value = "2019-09-30")]
        end: String,

        /// Monthly metric averaged into the climatology
        #[arg(long, default_value = "Mean Flow")]
        metric: String,

        /// Annual column ranked for return periods
        #[arg(long, default_value = "Peak Flow")]
        peak_column: String,

        /// Discharge tokens meaning "no data"
        #[arg(long = "missing-token", default_values_t = [String::from("Eqp")])]
        missing_tokens: Vec<String>,

        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// Print the monthly climatology of one station
    Climatology {
        /// Monthly metrics CSV
        #[arg(short = 'm', long)]
        monthly: String,

        /// Station identifier from the Station column
        #[arg(short = 's', long)]
        station: String,

        /// Monthly metric to average
        #[arg(long, default_value = "Mean Flow")]
        metric: String,
    },

    /// Print the flood-frequency curve of one station
    ReturnPeriods {
        /// Annual metrics CSV
        #[arg(short = 'a', long)]
        annual: String,

        /// Station identifier from the Station column
        #[arg(short = 's', long)]
        station: String,

        /// Annual column to rank
        #[arg(long, default_value = "Peak Flow")]
        peak_column: String,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Analyze {
            stations,
            data_dir,
            annual,
            monthly,
            start,
            end,
            metric,
            peak_column,
            missing_tokens,
            json,
        } => {
            let request = analyze::AnalyzeRequest {
                stations,
                data_dir,
                annual,
                monthly,
                start,
                end,
                metric,
                peak_column,
                missing_tokens,
                json,
            };
            analyze::run_analyze(&request)
        }
        Command::Climatology {
            monthly,
            station,
            metric,
        } => analyze::run_climatology(&monthly, &station, &metric),
        Command::ReturnPeriods {
            annual,
            station,
            peak_column,
        } => analyze::run_return_periods(&annual, &station, &peak_column),
    }
}
