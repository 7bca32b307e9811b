use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use modlink::application::LinkOptions;
use modlink::commands;
use modlink::config::ConfigOverrides;
use modlink::error::{exit_code, is_usage_error};
use std::path::PathBuf;

/// modlink - link externally developed modules into a workspace
///
/// Symlinks a module directory into the project's module root and keeps the
/// path aliases, project manifest and bootstrap imports in step. Every
/// document is backed up before it is changed.
///
/// Examples:
///   modlink link ../gbi-maps --scope @tailormap-gbi --module GbiMapsModule --assets
///   modlink unlink gbi-maps
///   modlink status
#[derive(Parser, Debug)]
#[command(author, version = env!("MODLINK_VERSION"), about, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root directory (defaults to the current directory; also via MODLINK_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "MODLINK_ROOT",
        value_name = "PATH",
        global = true
    )]
    root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Link an external module into the project
    Link(LinkArgs),

    /// Remove a linked module and its registrations
    Unlink(UnlinkArgs),

    /// List linked modules
    #[command(alias = "ls")]
    List,

    /// Show the health of every linked module
    Status,

    /// Restore the most recent backups and remove all linked modules
    Revert(RevertArgs),
}

#[derive(clap::Args, Debug)]
struct LinkArgs {
    /// Path to the module directory, absolute or relative to the project root
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Package scope for the import path
    #[arg(long, value_name = "SCOPE")]
    scope: Option<String>,

    /// Directory name under the module root (defaults to the source directory name)
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Library name for the import path (defaults to NAME)
    #[arg(long, value_name = "LIB")]
    lib: Option<String>,

    /// Module identifier to add to the bootstrap imports
    #[arg(long, value_name = "MODULE")]
    module: Option<String>,

    /// Register the module's assets, styles and translations
    #[arg(long)]
    assets: bool,

    /// Component selector prefix for the library project
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,
}

impl From<LinkArgs> for LinkOptions {
    fn from(args: LinkArgs) -> Self {
        LinkOptions {
            scope: args.scope,
            name: args.name,
            lib: args.lib,
            module: args.module,
            assets: args.assets,
            prefix: args.prefix,
        }
    }
}

#[derive(clap::Args, Debug)]
struct UnlinkArgs {
    /// Directory name of the linked module
    #[arg(value_name = "NAME")]
    name: String,
}

#[derive(clap::Args, Debug)]
struct RevertArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter(cli.verbose)),
    )
    .init();

    let runtime = modlink::runtime::RealRuntime;
    let overrides = ConfigOverrides { root: cli.root };

    let result = match cli.command {
        Commands::Link(args) => {
            let source = args.source.clone();
            commands::link(runtime, &source, args.into(), overrides)
        }
        Commands::Unlink(args) => commands::unlink(runtime, &args.name, overrides),
        Commands::List => commands::list(runtime, overrides),
        Commands::Status => commands::status(runtime, overrides),
        Commands::Revert(args) => commands::revert(runtime, args.yes, overrides),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        if is_usage_error(&e) {
            eprintln!("Run 'modlink --help' for usage.");
        }
        std::process::exit(exit_code(&e));
    }
}
