//! Budget Tracker CLI
//!
//! Usage:
//!   budget_tracker_cli --email a@b.c --password secret register --name Ana
//!   budget_tracker_cli --email a@b.c --password secret onboard --income 4000 --savings 500 \
//!       --category Food=300 --category Housing=1200
//!   budget_tracker_cli --email a@b.c --password secret add 12.50 --category Food
//!   budget_tracker_cli --email a@b.c --password secret insights --timeframe week

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use colored::Colorize;
use thiserror::Error;

use budget_tracker::{
    auth::{LocalAuthProvider, Session},
    config::{Config, ConfigError, ConfigManager},
    core::{
        palette,
        services::{
            AnalyticsService, AuthFlow, BudgetService, CategoryForm, DashboardService,
            ExpenseForm, ExpenseService, OnboardingDraft, OnboardingService, RecurringForm,
            ServiceContext,
        },
        time::SystemClock,
        timeframe::Timeframe,
    },
    domain::{Category, CategoryProgress, ExpenseView, Frequency, RecurringExpense},
    errors::BudgetError,
    state::AppState,
    storage::JsonFileStore,
};

const BUILD_HASH: &str = env!("BUDGET_TRACKER_BUILD_HASH");
const BUILD_TIMESTAMP: &str = env!("BUDGET_TRACKER_BUILD_TIMESTAMP");
const BUILD_PROFILE: &str = env!("BUDGET_TRACKER_BUILD_PROFILE");

/// Budget Tracker - category budgets, expenses and spending insights
#[derive(Parser)]
#[command(name = "budget_tracker_cli")]
#[command(about = "Track spending against monthly category budgets", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory (defaults to $BUDGET_TRACKER_HOME or ~/.budget_tracker)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Account email
    #[arg(long, global = true)]
    email: Option<String>,

    /// Account password
    #[arg(long, global = true)]
    password: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and its profile
    Register {
        /// Display name
        #[arg(long)]
        name: String,
    },

    /// Complete first-run setup
    Onboard {
        #[arg(long)]
        income: String,

        #[arg(long)]
        savings: String,

        /// Category with budget, as NAME=AMOUNT; repeatable. Preset names
        /// pick up their icon and colour.
        #[arg(long = "category", value_name = "NAME=AMOUNT")]
        categories: Vec<String>,
    },

    /// Show budget summary, category progress and recent expenses
    Dashboard,

    /// Show spending distribution, trend and summary
    Insights {
        /// day, week, month or year
        #[arg(short, long)]
        timeframe: Option<String>,
    },

    /// List expenses, optionally limited to a timeframe
    Expenses {
        #[arg(short, long)]
        timeframe: Option<String>,
    },

    /// Record an expense
    Add {
        amount: String,

        /// Category name
        #[arg(short, long)]
        category: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Date as YYYY-MM-DD (defaults to now)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List categories with this month's progress
    Categories,

    /// Add a category
    AddCategory {
        name: String,

        #[arg(short, long)]
        budget: String,

        #[arg(short, long)]
        icon: Option<String>,
    },

    /// Delete a category with its expenses and recurring templates
    DeleteCategory { name: String },

    /// List recurring templates
    Recurring {
        /// Only show templates that are due
        #[arg(long)]
        due: bool,
    },

    /// Add a recurring template
    AddRecurring {
        amount: String,

        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        description: String,

        /// daily, weekly, monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        frequency: Frequency,

        /// Next occurrence as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        next_date: Option<NaiveDate>,
    },

    /// Print build information
    Info,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("--email and --password are required for this command")]
    MissingCredentials,
    #[error("Unknown category `{0}`")]
    UnknownCategory(String),
    #[error("Expected NAME=AMOUNT, got `{0}`")]
    CategorySpec(String),
}

type CliResult<T> = Result<T, CliError>;

struct App {
    config: Config,
    store: Arc<JsonFileStore>,
    flow: AuthFlow,
    state: AppState,
}

impl App {
    fn open(data_dir: Option<PathBuf>) -> CliResult<Self> {
        let manager = match data_dir {
            Some(dir) => ConfigManager::with_base_dir(dir)?,
            None => ConfigManager::new()?,
        };
        let config = manager.load()?;
        tracing::debug!(data_dir = %manager.base_dir().display(), "opened data directory");
        let store = Arc::new(JsonFileStore::open(manager.data_file(&config))?);
        let auth = Arc::new(LocalAuthProvider::open(manager.accounts_file())?);
        let flow = AuthFlow::new(auth, store.clone(), Arc::new(SystemClock));
        let state = AppState::new(config.recent_expense_limit);
        Ok(Self {
            config,
            store,
            flow,
            state,
        })
    }

    async fn sign_in(&self, cli: &Cli) -> CliResult<ServiceContext> {
        let (email, password) = credentials(cli)?;
        let session = self.flow.sign_in(email, password, &self.state).await?;
        Ok(self.flow.context_for(&session))
    }

    fn money(&self, amount: f64) -> String {
        self.config.format_amount(amount)
    }
}

fn credentials(cli: &Cli) -> CliResult<(&str, &str)> {
    match (cli.email.as_deref(), cli.password.as_deref()) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(CliError::MissingCredentials),
    }
}

fn find_category<'a>(categories: &'a [Category], name: &str) -> CliResult<&'a Category> {
    categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CliError::UnknownCategory(name.to_string()))
}

fn parse_category_spec(raw: &str) -> CliResult<(String, String)> {
    match raw.split_once('=') {
        Some((name, amount)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), amount.trim().to_string()))
        }
        _ => Err(CliError::CategorySpec(raw.to_string())),
    }
}

fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose && std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "budget_tracker=debug");
    }
    budget_tracker::init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> CliResult<()> {
    if let Commands::Info = cli.command {
        println!("budget_tracker_cli {}", env!("CARGO_PKG_VERSION"));
        println!("  commit:  {BUILD_HASH}");
        println!("  built:   {BUILD_TIMESTAMP}");
        println!("  profile: {BUILD_PROFILE}");
        return Ok(());
    }

    let app = App::open(cli.data_dir.clone())?;
    match &cli.command {
        Commands::Register { name } => {
            let (email, password) = credentials(cli)?;
            let session = app.flow.sign_up(email, password, name, &app.state).await?;
            print_session(&session);
        }
        Commands::Onboard {
            income,
            savings,
            categories,
        } => {
            let ctx = app.sign_in(cli).await?;
            let mut draft = OnboardingDraft::new();
            draft.monthly_income = income.clone();
            draft.savings_goal = savings.clone();
            for spec in categories {
                let (name, amount) = parse_category_spec(spec)?;
                let selected = match palette::preset(&name) {
                    Some(preset) => {
                        if !draft.is_selected(preset.name) {
                            draft.toggle(preset);
                        }
                        preset.name.to_string()
                    }
                    None => {
                        draft.add_custom(&name)?;
                        name
                    }
                };
                draft.set_budget(&selected, amount);
            }
            let outcome = OnboardingService::new(ctx).complete(&draft, &app.state).await?;
            println!(
                "{} {} categories created for {}",
                "Setup complete:".green().bold(),
                outcome.categories.len(),
                outcome.profile.name
            );
        }
        Commands::Dashboard => {
            let ctx = app.sign_in(cli).await?;
            let dashboard = DashboardService::new(ctx, app.config.recent_expense_limit)
                .load(&app.state)
                .await?;
            println!("{} {}", "Hello,".bold(), dashboard.profile_name);
            let summary = dashboard.summary;
            let remaining = app.money(summary.remaining);
            println!(
                "Budget {}  Spent {}  Remaining {}",
                app.money(summary.total_budget),
                app.money(summary.total_spent),
                if summary.is_over_budget() {
                    remaining.red()
                } else {
                    remaining.green()
                }
            );
            println!();
            print_progress(&app, &dashboard.categories);
            println!();
            println!("{}", "Recent expenses".bold());
            print_expenses(&app, &app.state.expenses().recent);
        }
        Commands::Insights { timeframe } => {
            let ctx = app.sign_in(cli).await?;
            let timeframe = timeframe
                .as_deref()
                .map(Timeframe::parse)
                .unwrap_or(app.config.default_timeframe);
            let insights = AnalyticsService::new(ctx).insights(timeframe).await?;
            println!("{}", timeframe.to_string().bold());
            let summary = &insights.summary;
            println!("  Total spent    {}", app.money(summary.total_spent));
            println!("  Daily average  {}", app.money(summary.avg_per_day));
            println!(
                "  Top category   {}",
                summary.most_expensive_category.as_deref().unwrap_or("-")
            );
            println!(
                "  Top day        {}",
                summary.most_expensive_day.as_deref().unwrap_or("-")
            );
            println!();
            println!("{}", "By category".bold());
            for slice in &insights.by_category {
                println!("  {:<20} {}", slice.name, app.money(slice.value));
            }
            println!();
            println!("{}", "Trend".bold());
            for (label, value) in insights.trends.labels.iter().zip(&insights.trends.values) {
                println!("  {:>4} {}", label, app.money(*value));
            }
        }
        Commands::Expenses { timeframe } => {
            let ctx = app.sign_in(cli).await?;
            let service = ExpenseService::new(ctx);
            match timeframe.as_deref().map(Timeframe::parse) {
                Some(timeframe) => {
                    let expenses = service.expenses_for_timeframe(timeframe).await?;
                    app.state
                        .update_expenses(|cache| cache.set_timeframe_expenses(timeframe, expenses));
                    print_expenses(&app, &app.state.expenses().timeframe_expenses);
                }
                None => {
                    let expenses = service.expenses().await?;
                    app.state.update_expenses(|cache| cache.set_expenses(expenses));
                    print_expenses(&app, &app.state.expenses().expenses);
                }
            }
        }
        Commands::Add {
            amount,
            category,
            description,
            date,
        } => {
            let ctx = app.sign_in(cli).await?;
            let categories = BudgetService::new(ctx.clone()).categories().await?;
            let category = find_category(&categories, category)?;
            let mut form =
                ExpenseForm::new(amount.clone(), category.id).described(description.clone());
            if let Some(date) = date {
                form = form.on(start_of(*date));
            }
            let view = ExpenseService::new(ctx).add_expense(form).await?;
            app.state.update_expenses(|cache| cache.add(view.clone()));
            println!(
                "{} {} in {}",
                "Added".green().bold(),
                app.money(view.amount),
                view.category_name
            );
        }
        Commands::Categories => {
            let ctx = app.sign_in(cli).await?;
            let progress = BudgetService::new(ctx).categories_with_progress().await?;
            print_progress(&app, &progress);
        }
        Commands::AddCategory { name, budget, icon } => {
            let ctx = app.sign_in(cli).await?;
            let mut form = CategoryForm::new(name.clone(), budget.clone());
            if let Some(icon) = icon {
                form = form.with_icon(icon.clone());
            }
            let category = BudgetService::new(ctx).add_category(form).await?;
            println!(
                "{} {} {} ({})",
                "Added".green().bold(),
                category.icon,
                category.name,
                app.money(category.monthly_budget)
            );
        }
        Commands::DeleteCategory { name } => {
            let ctx = app.sign_in(cli).await?;
            let service = BudgetService::new(ctx);
            let categories = service.categories().await?;
            let category = find_category(&categories, name)?;
            service.delete_category(category.id).await?;
            println!("{} {}", "Deleted".yellow().bold(), category.name);
        }
        Commands::Recurring { due } => {
            let ctx = app.sign_in(cli).await?;
            let categories = BudgetService::new(ctx.clone()).categories().await?;
            let service = ExpenseService::new(ctx);
            let templates = if *due {
                service.due_recurring().await?
            } else {
                service.recurring().await?
            };
            print_recurring(&app, &templates, &categories);
        }
        Commands::AddRecurring {
            amount,
            category,
            description,
            frequency,
            next_date,
        } => {
            let ctx = app.sign_in(cli).await?;
            let categories = BudgetService::new(ctx.clone()).categories().await?;
            let category = find_category(&categories, category)?;
            let template = ExpenseService::new(ctx)
                .add_recurring(RecurringForm {
                    amount: amount.clone(),
                    description: description.clone(),
                    category_id: Some(category.id),
                    frequency: *frequency,
                    next_date: *next_date,
                })
                .await?;
            println!(
                "{} {} {} next on {}",
                "Added".green().bold(),
                template.frequency,
                app.money(template.amount),
                template.next_date
            );
        }
        Commands::Info => {}
    }
    tracing::debug!(path = %app.store.path().display(), "command finished");
    Ok(())
}

fn print_session(session: &Session) {
    println!(
        "{} {} ({})",
        "Signed in as".green().bold(),
        session.display_label(),
        session.email
    );
}

fn print_progress(app: &App, progress: &[CategoryProgress]) {
    if progress.is_empty() {
        println!("{}", "No categories yet.".dimmed());
        return;
    }
    for entry in progress {
        let percent = format!("{:>5.0}%", entry.percentage);
        let percent = if entry.is_over_budget() {
            percent.red()
        } else {
            percent.normal()
        };
        let remaining = if entry.is_over_budget() {
            format!("{} over", app.money(entry.remaining()))
        } else {
            format!("{} left", app.money(entry.remaining()))
        };
        println!(
            "  {} {:<18} {} / {} {}  {}",
            entry.category.icon,
            entry.category.name,
            app.money(entry.spent),
            app.money(entry.category.monthly_budget),
            percent,
            remaining.dimmed()
        );
    }
}

fn print_expenses(app: &App, expenses: &[ExpenseView]) {
    if expenses.is_empty() {
        println!("{}", "No expenses.".dimmed());
        return;
    }
    for expense in expenses {
        println!(
            "  {}  {} {:<18} {:<24} {}",
            expense.date.format("%Y-%m-%d"),
            expense.category_icon,
            expense.category_name,
            expense.description,
            app.money(expense.amount)
        );
    }
}

fn print_recurring(app: &App, templates: &[RecurringExpense], categories: &[Category]) {
    if templates.is_empty() {
        println!("{}", "No recurring expenses.".dimmed());
        return;
    }
    for template in templates {
        let category = categories
            .iter()
            .find(|c| c.id == template.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(budget_tracker::domain::expense::UNKNOWN_CATEGORY_NAME);
        println!(
            "  {}  {:<8} {:<18} {:<24} {}",
            template.next_date,
            template.frequency,
            category,
            template.description,
            app.money(template.amount)
        );
    }
}
