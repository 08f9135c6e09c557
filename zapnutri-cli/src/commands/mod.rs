mod about;
mod auth;
mod config_cmd;
mod dashboard;
mod diet;
mod onboarding;
mod pro;
mod progress;
mod workout;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use zapnutri::models::InstructionKind;
use zapnutri::{Config, Storage, ZapNutri};

pub use auth::{LoginCommand, RegisterCommand};
pub use dashboard::DashboardCommand;

#[derive(Parser)]
#[command(name = "zapnutri")]
#[command(about = "Nutrition and training coaching in your terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "ZAPNUTRI_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// What ZapNutri is
    About,

    /// Log in with email and password
    Login(LoginCommand),

    /// Create a new account
    Register(RegisterCommand),

    /// Log out and forget the local session
    Logout,

    /// Show who is logged in and their role
    Whoami,

    /// Fill in your student profile
    Onboarding,

    /// Launch interactive dashboard
    Dashboard(DashboardCommand),

    /// Food log and diet plans
    #[command(subcommand)]
    Diet(DietSubcommands),

    /// Training programs
    #[command(subcommand)]
    Workout(WorkoutSubcommands),

    /// Body metrics and goals
    #[command(subcommand)]
    Progress(ProgressSubcommands),

    /// Tools for nutritionists and personal trainers
    #[command(subcommand)]
    Pro(ProSubcommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum DietSubcommands {
    /// Today's calories and macros against your targets
    Today,

    /// Food items logged on a day
    History {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Log a food item
    Log {
        /// Food name (or template name with --template)
        food: String,

        /// Quantity in grams
        #[arg(short, long, default_value = "100")]
        grams: f64,

        /// Scale macros from the food template with this name
        #[arg(short, long)]
        template: bool,

        #[arg(long, default_value = "0")]
        kcal: f64,

        #[arg(long, default_value = "0")]
        protein: f64,

        #[arg(long, default_value = "0")]
        carbs: f64,

        #[arg(long, default_value = "0")]
        fat: f64,

        /// Meal (cafe_da_manha, almoco, jantar, lanche...)
        #[arg(short, long)]
        meal: Option<String>,

        /// Day to log on (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Weekly calories and macros
    Week {
        /// Any day of the week to show, defaults to this week
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// List food templates
    Templates {
        /// Only templates whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Generate a complete diet plan
    Generate {
        #[arg(long)]
        preferences: Option<String>,

        #[arg(long)]
        restrictions: Option<String>,

        /// Meals per day
        #[arg(long)]
        meals: Option<u8>,
    },
}

#[derive(Subcommand)]
enum WorkoutSubcommands {
    /// List training programs
    List,

    /// Create a new (active) training program
    Create {
        /// Program name
        name: String,

        /// Sessions per week (1-7)
        #[arg(short, long, default_value = "3")]
        frequency: i32,

        /// Program goal
        #[arg(short, long)]
        goal: Option<String>,
    },

    /// Show a program with its workouts and exercises
    Show {
        /// Program ID
        id: String,
    },

    /// Make a program the active one
    Activate {
        /// Program ID
        id: String,
    },

    /// Deactivate a program
    Deactivate {
        /// Program ID
        id: String,
    },

    /// Delete a program
    Delete {
        /// Program ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// This week's training summary
    Week,

    /// Generate a training plan
    Generate {
        /// Sessions per week (1-7)
        #[arg(short, long, default_value = "3")]
        frequency: i32,

        #[arg(short, long)]
        goal: Option<String>,

        /// Experience level
        #[arg(short, long)]
        level: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProgressSubcommands {
    /// Recent body metrics
    Metrics {
        /// Number of samples to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Log a body-metric sample
    Log {
        /// Weight in kg
        weight: f64,

        /// Body fat percentage
        #[arg(long)]
        fat: Option<f64>,

        /// Waist in cm
        #[arg(long)]
        waist: Option<f64>,

        /// Muscle mass in kg
        #[arg(long)]
        muscle: Option<f64>,

        /// Sample date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Change between the two latest samples
    Delta,

    /// List goals
    Goals {
        /// Include completed goals
        #[arg(short, long)]
        all: bool,
    },

    /// Create a goal
    GoalAdd {
        /// Goal type (peso, gordura, cintura...)
        tipo: String,

        /// Target value
        #[arg(short, long)]
        target: Option<f64>,

        /// Starting value
        #[arg(short, long)]
        start: Option<f64>,

        #[arg(long)]
        description: Option<String>,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Mark a goal as reached
    GoalDone {
        /// Goal ID
        id: String,
    },

    /// Weight and calorie trend
    Chart {
        /// Days to include, defaults to the configured chart range
        #[arg(short, long)]
        days: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ProSubcommands {
    /// List your students
    Students,

    /// View the app as one of your students
    Impersonate {
        /// Student's aluno ID
        aluno_id: String,
    },

    /// Return to your own account
    Stop,

    /// Show whether you are viewing a student's account
    Status,

    /// Nutrition or training instructions for a student
    #[command(subcommand)]
    Instructions(InstructionSubcommands),
}

#[derive(Subcommand)]
enum InstructionSubcommands {
    /// Show the current instructions
    Show {
        /// nutricionista or personal
        kind: InstructionKind,
        aluno_id: String,
    },

    /// Replace the instructions
    Save {
        /// nutricionista or personal
        kind: InstructionKind,
        aluno_id: String,

        /// New text; opens an editor when omitted
        #[arg(short, long)]
        text: Option<String>,
    },

    /// Ask the assistant for a draft
    Suggest {
        /// nutricionista or personal
        kind: InstructionKind,
        aluno_id: String,

        /// What you want help with
        prompt: String,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Edit configuration file
    Edit,

    /// Initialize configuration with defaults
    Init {
        /// Supabase project URL
        #[arg(long)]
        url: Option<String>,

        /// Supabase anon key
        #[arg(long)]
        anon_key: Option<String>,

        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// What every command needs to reach the backend
pub struct Context {
    config_path: Option<PathBuf>,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::config_file()?),
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load_from(&self.config_file()?)?)
    }

    pub fn connect(&self) -> Result<ZapNutri> {
        let config = self.load_config()?;
        if config.supabase.anon_key.is_empty() {
            bail!("Supabase anon key is not configured. Run 'zapnutri config init --url <url> --anon-key <key>' or set SUPABASE_ANON_KEY");
        }

        let storage = Storage::init()?;
        Ok(ZapNutri::new(config, storage)?)
    }

    /// Connect and require a logged-in session
    pub fn connect_authenticated(&self) -> Result<ZapNutri> {
        let app = self.connect()?;
        if !app.client.is_authenticated() {
            bail!("You are not logged in. Use 'zapnutri login' to authenticate.");
        }
        Ok(app)
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let ctx = Context::new(self.config);

        match self.command {
            Commands::About => {
                about::show();
                Ok(())
            }
            Commands::Login(cmd) => cmd.execute(&ctx).await,
            Commands::Register(cmd) => cmd.execute(&ctx).await,
            Commands::Logout => auth::logout(&ctx).await,
            Commands::Whoami => auth::whoami(&ctx).await,
            Commands::Onboarding => onboarding::run(&ctx).await,
            Commands::Dashboard(cmd) => cmd.execute(&ctx).await,
            Commands::Diet(subcmd) => match subcmd {
                DietSubcommands::Today => diet::today(&ctx).await,
                DietSubcommands::History { date } => diet::history(&ctx, date).await,
                DietSubcommands::Log {
                    food,
                    grams,
                    template,
                    kcal,
                    protein,
                    carbs,
                    fat,
                    meal,
                    date,
                } => {
                    let entry = diet::LogEntry {
                        food,
                        grams,
                        template,
                        kcal,
                        protein,
                        carbs,
                        fat,
                        meal,
                        date,
                    };
                    diet::log(&ctx, entry).await
                }
                DietSubcommands::Week { date } => diet::week(&ctx, date).await,
                DietSubcommands::Templates { search } => diet::templates(&ctx, search).await,
                DietSubcommands::Generate {
                    preferences,
                    restrictions,
                    meals,
                } => diet::generate(&ctx, preferences, restrictions, meals).await,
            },
            Commands::Workout(subcmd) => match subcmd {
                WorkoutSubcommands::List => workout::list(&ctx).await,
                WorkoutSubcommands::Create {
                    name,
                    frequency,
                    goal,
                } => workout::create(&ctx, name, frequency, goal).await,
                WorkoutSubcommands::Show { id } => workout::show(&ctx, &id).await,
                WorkoutSubcommands::Activate { id } => workout::set_active(&ctx, &id, true).await,
                WorkoutSubcommands::Deactivate { id } => {
                    workout::set_active(&ctx, &id, false).await
                }
                WorkoutSubcommands::Delete { id, force } => {
                    workout::delete(&ctx, &id, force).await
                }
                WorkoutSubcommands::Week => workout::week(&ctx).await,
                WorkoutSubcommands::Generate {
                    frequency,
                    goal,
                    level,
                    notes,
                } => workout::generate(&ctx, frequency, goal, level, notes).await,
            },
            Commands::Progress(subcmd) => match subcmd {
                ProgressSubcommands::Metrics { limit } => progress::metrics(&ctx, limit).await,
                ProgressSubcommands::Log {
                    weight,
                    fat,
                    waist,
                    muscle,
                    date,
                } => progress::log(&ctx, weight, fat, waist, muscle, date).await,
                ProgressSubcommands::Delta => progress::delta(&ctx).await,
                ProgressSubcommands::Goals { all } => progress::goals(&ctx, all).await,
                ProgressSubcommands::GoalAdd {
                    tipo,
                    target,
                    start,
                    description,
                    due,
                } => progress::goal_add(&ctx, tipo, target, start, description, due).await,
                ProgressSubcommands::GoalDone { id } => progress::goal_done(&ctx, &id).await,
                ProgressSubcommands::Chart { days } => progress::chart(&ctx, days).await,
            },
            Commands::Pro(subcmd) => match subcmd {
                ProSubcommands::Students => pro::students(&ctx).await,
                ProSubcommands::Impersonate { aluno_id } => {
                    pro::impersonate(&ctx, &aluno_id).await
                }
                ProSubcommands::Stop => pro::stop(&ctx),
                ProSubcommands::Status => pro::status(&ctx),
                ProSubcommands::Instructions(sub) => match sub {
                    InstructionSubcommands::Show { kind, aluno_id } => {
                        pro::show_instructions(&ctx, kind, &aluno_id).await
                    }
                    InstructionSubcommands::Save {
                        kind,
                        aluno_id,
                        text,
                    } => pro::save_instructions(&ctx, kind, &aluno_id, text).await,
                    InstructionSubcommands::Suggest {
                        kind,
                        aluno_id,
                        prompt,
                    } => pro::suggest_instructions(&ctx, kind, &aluno_id, &prompt).await,
                },
            },
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(&ctx),
                ConfigSubcommands::Edit => config_cmd::edit_config(&ctx),
                ConfigSubcommands::Init {
                    url,
                    anon_key,
                    force,
                } => config_cmd::init_config(&ctx, url, anon_key, force),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
