mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::household::ValidateArgs;
use commands::projection::{PortfolioArgs, ProjectArgs};
use commands::retirement::{
    GoalArgs, OptimalContributionArgs, RequiredReturnArgs, SustainabilityArgs,
};
use commands::scenarios::ScenariosArgs;
use commands::scoring::{CrisisArgs, ScoringArgs};

/// Household asset projection and retirement goal solving
#[derive(Parser)]
#[command(
    name = "hfp",
    version,
    about = "Household asset projection and retirement goal solving",
    long_about = "Projects a household's assets year by year from a JSON or YAML snapshot \
                  of income, spending, holdings and loans, and solves for the contribution \
                  or return needed to fund retirement. All arithmetic uses decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Project assets year by year, through retirement
    Project(ProjectArgs),
    /// Value-weighted annual return of the itemized holdings
    Portfolio(PortfolioArgs),
    /// Evaluate a retirement goal for a contribution and return
    Goal(GoalArgs),
    /// Monthly contribution needed at a target return
    OptimalContribution(OptimalContributionArgs),
    /// Annual return needed for a fixed monthly contribution
    RequiredReturn(RequiredReturnArgs),
    /// How long savings at retirement last against a 20-year retirement
    Sustainability(SustainabilityArgs),
    /// Compare what-if scenarios against the base projection
    Scenarios(ScenariosArgs),
    /// Financial health grade (A+ to D)
    Health(ScoringArgs),
    /// Composite 0-100 risk score
    Risk(ScoringArgs),
    /// Months net assets last if income stops
    Survival(ScoringArgs),
    /// Emergency cover after a market drop
    Crisis(CrisisArgs),
    /// Check a snapshot against the input rules
    Validate(ValidateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::Portfolio(args) => commands::projection::run_portfolio(args),
        Commands::Goal(args) => commands::retirement::run_goal(args),
        Commands::OptimalContribution(args) => commands::retirement::run_optimal_contribution(args),
        Commands::RequiredReturn(args) => commands::retirement::run_required_return(args),
        Commands::Sustainability(args) => commands::retirement::run_sustainability(args),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Health(args) => commands::scoring::run_health(args),
        Commands::Risk(args) => commands::scoring::run_risk(args),
        Commands::Survival(args) => commands::scoring::run_survival(args),
        Commands::Crisis(args) => commands::scoring::run_crisis(args),
        Commands::Validate(args) => commands::household::run_validate(args),
        Commands::Version => {
            println!("hfp {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
