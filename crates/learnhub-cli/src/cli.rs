use clap::{Parser, Subcommand, ValueEnum};
use learnhub_gateway::Role;

#[derive(Parser)]
#[command(name = "learnhub")]
#[command(about = "LearnHub CLI: role dashboards and resource management from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides config and LEARNHUB_URL env var)
    #[arg(short, long, global = true, env = "LEARNHUB_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "LEARNHUB_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Gateway config file (defaults to ./learnhub.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the backend
    Login(LoginArgs),
    /// Logout (remove the stored session)
    Logout,
    /// Show the logged-in principal
    Whoami,
    /// Check backend connectivity
    Status,
    /// List known resources and their operations
    Resources,
    /// List a resource (e.g. course, cohort, mentorProfile)
    List(ListArgs),
    /// Read one item by reference (e.g. course/12)
    Get(RefArgs),
    /// Create a new item
    Create(CreateArgs),
    /// Replace an item
    Update(BodyRefArgs),
    /// Partially update an item
    Patch(BodyRefArgs),
    /// Delete an item
    Delete(RefArgs),
    /// Show course, cohort and team counts
    Stats,
    /// Load the dashboard for a role
    Dashboard(DashboardArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Student,
    Mentor,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Student => Role::Student,
            RoleArg::Mentor => Role::Mentor,
        }
    }
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Google ID token obtained from the sign-in flow
    #[arg(long, conflicts_with = "dev_email", required_unless_present = "dev_email")]
    pub google_token: Option<String>,
    /// Email for the development bypass login
    #[arg(long)]
    pub dev_email: Option<String>,
    /// Role to request (required for --dev-email; used for first Google sign-in)
    #[arg(long)]
    pub role: Option<RoleArg>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Resource name (e.g. course)
    pub resource: String,
    /// Filters as key=value pairs (e.g. course=3)
    pub params: Vec<String>,
}

#[derive(clap::Args)]
pub struct RefArgs {
    /// Item reference (e.g. course/12)
    pub reference: String,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Resource name (e.g. course)
    pub resource: String,
    /// Path to JSON file (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(clap::Args)]
pub struct BodyRefArgs {
    /// Item reference (e.g. course/12)
    pub reference: String,
    /// Path to JSON file (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(clap::Args)]
pub struct DashboardArgs {
    /// Role whose dashboard to load (defaults to the logged-in role)
    #[arg(long)]
    pub role: Option<RoleArg>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format)
    pub key: String,
    /// Value
    pub value: String,
}
