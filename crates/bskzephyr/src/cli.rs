//! Clap derive structures for the `zephyr` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zephyr -- control BSK Zephyr ventilation units from the command line
#[derive(Debug, Parser)]
#[command(
    name = "zephyr",
    version,
    about = "Control BSK Zephyr ventilation units from the command line",
    long_about = "A small CLI for the BSK Zephyr cloud API.\n\n\
        Signs in with your BSK account, lists the units you can control,\n\
        and changes power, airflow mode, fan speed, and humidity boost.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "ZEPHYR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Account email (overrides profile)
    #[arg(long, short = 'u', env = "ZEPHYR_USERNAME", global = true)]
    pub username: Option<String>,

    /// Account password (overrides profile and keyring)
    #[arg(long, env = "ZEPHYR_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Access token from a previous login (skips sign-in)
    #[arg(long, env = "ZEPHYR_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "ZEPHYR_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZEPHYR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ZEPHYR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and obtain an access token
    Login(LoginArgs),

    /// List and control ventilation units
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Store the token in the system keyring instead of printing it
    #[arg(long)]
    pub save: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List units bound to your account
    #[command(alias = "ls")]
    List,

    /// Change power, mode, speed, or humidity boost of a unit
    Control(ControlArgs),
}

#[derive(Debug, Args)]
pub struct ControlArgs {
    /// Group ID of the unit (see `zephyr devices list`)
    #[arg(value_name = "GROUP_ID")]
    pub group_id: String,

    /// Power state, e.g. "on" or "off"
    #[arg(long)]
    pub status: Option<String>,

    /// Airflow mode
    #[arg(long, short = 'm')]
    pub mode: Option<FanModeArg>,

    /// Fan speed preset
    #[arg(long, short = 's')]
    pub speed: Option<FanSpeedArg>,

    /// Humidity boost threshold (0 is a valid value)
    #[arg(long)]
    pub humidity_boost: Option<i64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FanModeArg {
    Cycle,
    Extract,
    Supply,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FanSpeedArg {
    Night,
    Low,
    Medium,
    High,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
