use clap::Parser;
use splitbill::args::{Args, Command, ExpenseSubcommand, GroupSubcommand};
use splitbill::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.currency()).await?.print(),

        Command::Group(group_args) => {
            let config = Config::load(home).await?;
            match group_args.subcommand() {
                GroupSubcommand::Create(args) => {
                    commands::create_group(config, args.clone()).await?.print()
                }
                GroupSubcommand::List => commands::list_groups(config).await?.print(),
                GroupSubcommand::Members(args) => {
                    commands::list_members(config, args.clone()).await?.print()
                }
                GroupSubcommand::AddMember(args) => {
                    commands::add_member(config, args.clone()).await?.print()
                }
                GroupSubcommand::RemoveMember(args) => {
                    commands::remove_member(config, args.clone()).await?.print()
                }
            }
        }

        Command::Expense(expense_args) => {
            let config = Config::load(home).await?;
            match expense_args.subcommand() {
                ExpenseSubcommand::Add(args) => {
                    commands::add_expense(config, *args.clone()).await?.print()
                }
                ExpenseSubcommand::List(args) => {
                    commands::list_expenses(config, args.clone()).await?.print()
                }
                ExpenseSubcommand::Show(args) => {
                    commands::show_expense(config, args.clone()).await?.print()
                }
                ExpenseSubcommand::Edit(args) => {
                    commands::edit_expense(config, *args.clone()).await?.print()
                }
                ExpenseSubcommand::Delete(args) => {
                    commands::delete_expense(config, args.clone()).await?.print()
                }
            }
        }

        Command::Balances(balances_args) => {
            let config = Config::load(home).await?;
            commands::balances(config, balances_args.clone()).await?.print()
        }

        Command::Settle(settle_args) => {
            let config = Config::load(home).await?;
            commands::settle(config, settle_args.clone()).await?.print()
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            commands::summary(config, summary_args.clone()).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
