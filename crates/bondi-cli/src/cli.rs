//! Command line definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "bondi",
    version,
    about = "Bondifuzz command line interface"
)]
pub struct Cli {
    /// Enable logging output. Usually used for debugging
    #[arg(short, long, value_enum, default_value_t = Verbosity::None, global = true)]
    pub verbosity: Verbosity,

    /// Choose an output mode. Human-readable by default
    #[arg(short, long, value_enum, default_value_t = OutputMode::Human, global = true)]
    pub output_mode: OutputMode,

    /// Automatic 'yes', no confirmation prompts will be shown
    #[arg(short = 'y', long = "yes", global = true)]
    pub auto_approve: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Verbosity {
    None,
    Error,
    Warn,
    Info,
    Debug,
}

impl Verbosity {
    /// Filter directive for `tracing-subscriber`.
    pub fn directive(&self) -> &'static str {
        match self {
            Verbosity::None => "off",
            Verbosity::Error => "error",
            Verbosity::Warn => "warn",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show the account this client is logged in as
    Whoami,

    /// Platform metadata
    #[command(subcommand)]
    Meta(MetaCommand),

    /// User's projects
    #[command(subcommand)]
    Projects(ProjectsCommand),

    /// Fuzzers of a project
    #[command(subcommand)]
    Fuzzers(FuzzersCommand),

    /// Resource pools available to the user
    #[command(subcommand)]
    Pools(PoolsCommand),

    /// Revisions of a fuzzer
    #[command(subcommand)]
    Revisions(RevisionsCommand),

    /// Crashes found by a fuzzer
    #[command(subcommand)]
    Crashes(CrashesCommand),

    /// Admin CLI. Use with caution
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Do initialization to work with Bondifuzz
    Init {
        /// Bondifuzz API server URL
        #[arg(long)]
        server_url: Option<String>,
        /// Username of Bondifuzz account
        #[arg(long)]
        username: Option<String>,
        /// Password of Bondifuzz account
        #[arg(long)]
        password: Option<String>,
    },
    /// Get config field value by name: url, username, password
    Get { field: String },
    /// Set config field value by name
    Set { field: String, value: String },
    /// Show all config field names and values
    Show {
        /// Show the password instead of masking it
        #[arg(long)]
        no_hide: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum MetaCommand {
    /// List supported languages and fuzzing engines
    Configurations,
}

/// Owner selection shared by user-scoped commands.
#[derive(Debug, Args)]
pub struct OwnerArgs {
    /// Name or id of owner (admin only)
    #[arg(short, long, hide = true)]
    pub user: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List all projects
    List {
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Get project by name or id
    Get {
        project: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Create new project
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// CPU cores per node
        #[arg(long)]
        node_cpu: u32,
        /// RAM per node in GB
        #[arg(long)]
        node_ram: u32,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Update project name or description
    Update {
        project: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Delete project (move to trash bin)
    Delete {
        project: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Restore project (move out of trash bin)
    Restore {
        project: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Erase project permanently
    Erase {
        project: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
}

#[derive(Debug, Args)]
pub struct FuzzerScope {
    /// Project id or name the fuzzer belongs to
    #[arg(short, long)]
    pub project: String,
    #[command(flatten)]
    pub owner: OwnerArgs,
}

#[derive(Debug, Subcommand)]
pub enum FuzzersCommand {
    /// List all fuzzers in project
    List {
        #[command(flatten)]
        scope: FuzzerScope,
    },
    /// Get fuzzer by name or id
    Get {
        fuzzer: String,
        #[command(flatten)]
        scope: FuzzerScope,
    },
    /// Create new fuzzer
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Engine, for which the fuzzer is designed
        #[arg(short, long)]
        engine: String,
        /// Programming language, for which the fuzzer is designed
        #[arg(short, long)]
        lang: String,
        /// Whether fuzzer has integration with CI/CD
        #[arg(long = "ci-integration", alias = "ci")]
        ci_integration: bool,
        #[command(flatten)]
        scope: FuzzerScope,
    },
    /// Delete fuzzer (move to trash bin)
    Delete {
        fuzzer: String,
        #[command(flatten)]
        scope: FuzzerScope,
    },
    /// Restore fuzzer (move out of trash bin)
    Restore {
        fuzzer: String,
        #[command(flatten)]
        scope: FuzzerScope,
    },
    /// Erase fuzzer permanently
    Erase {
        fuzzer: String,
        #[command(flatten)]
        scope: FuzzerScope,
    },
}

#[derive(Debug, Subcommand)]
pub enum PoolsCommand {
    /// List pools owned by the user
    List {
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Get pool by id
    Get {
        pool: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
}

/// Fuzzer selection shared by revision and crash commands.
#[derive(Debug, Args)]
pub struct RevisionScope {
    /// Fuzzer id or name
    #[arg(short, long)]
    pub fuzzer: String,
    #[command(flatten)]
    pub project: FuzzerScope,
}

#[derive(Debug, Subcommand)]
pub enum RevisionsCommand {
    /// List all revisions of fuzzer
    List {
        #[command(flatten)]
        scope: RevisionScope,
    },
    /// Get revision by name or id
    Get {
        revision: String,
        #[command(flatten)]
        scope: RevisionScope,
    },
    /// Start fuzzing with this revision
    Start {
        revision: String,
        #[command(flatten)]
        scope: RevisionScope,
    },
    /// Restart fuzzing from scratch with this revision
    Restart {
        revision: String,
        #[command(flatten)]
        scope: RevisionScope,
    },
    /// Stop fuzzing
    Stop {
        revision: String,
        #[command(flatten)]
        scope: RevisionScope,
    },
}

#[derive(Debug, Subcommand)]
pub enum CrashesCommand {
    /// List crashes of fuzzer or one of its revisions
    List {
        /// Only crashes found by this revision (id or name)
        #[arg(short, long)]
        revision: Option<String>,
        #[command(flatten)]
        scope: RevisionScope,
    },
    /// Get crash by id
    Get {
        crash: String,
        #[command(flatten)]
        scope: RevisionScope,
    },
    /// Print the stack trace and sanitizer output of a crash
    Details {
        crash: String,
        #[command(flatten)]
        scope: RevisionScope,
    },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Manage users
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List all users
    List,
    /// Get user by name or id
    Get { user: String },
    /// Create new user
    Create {
        name: String,
        #[arg(short, long)]
        display_name: String,
        #[arg(short, long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
    },
    /// Update user name, display name or email
    Update {
        user: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        display_name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Allow the user to log in again
    Enable { user: String },
    /// Forbid the user to log in
    Disable { user: String },
    /// Set a new password
    ChangePassword {
        user: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete user (move to trash bin)
    Delete { user: String },
    /// Restore user (move out of trash bin)
    Restore { user: String },
    /// Erase user permanently
    Erase {
        user: String,
        /// Keep a backup of the erased account's data
        #[arg(long)]
        keep_backup: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bondi", "projects", "list", "-o", "json", "-v", "debug"]).unwrap();
        assert_eq!(cli.output_mode, OutputMode::Json);
        assert_eq!(cli.verbosity.directive(), "debug");
        assert!(matches!(cli.command, Command::Projects(ProjectsCommand::List { .. })));
    }

    #[test]
    fn test_parse_fuzzer_create() {
        let cli = Cli::try_parse_from([
            "bondi", "fuzzers", "create", "png-read", "-e", "libfuzzer", "-l", "Cpp", "--ci", "-p", "libpng",
        ])
        .unwrap();
        match cli.command {
            Command::Fuzzers(FuzzersCommand::Create { name, ci_integration, scope, .. }) => {
                assert_eq!(name, "png-read");
                assert!(ci_integration);
                assert_eq!(scope.project, "libpng");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_crash_list_for_revision() {
        let cli = Cli::try_parse_from([
            "bondi", "crashes", "list", "-f", "png-read", "-p", "libpng", "-r", "v2",
        ])
        .unwrap();
        match cli.command {
            Command::Crashes(CrashesCommand::List { revision, scope }) => {
                assert_eq!(revision.as_deref(), Some("v2"));
                assert_eq!(scope.fuzzer, "png-read");
                assert_eq!(scope.project.project, "libpng");
                assert!(scope.project.owner.user.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_admin_user_erase() {
        let cli = Cli::try_parse_from(["bondi", "admin", "users", "erase", "bob", "--keep-backup", "-y"]).unwrap();
        assert!(cli.auto_approve);
        assert!(matches!(
            cli.command,
            Command::Admin(AdminCommand::Users(UsersCommand::Erase { keep_backup: true, .. }))
        ));
    }
}
