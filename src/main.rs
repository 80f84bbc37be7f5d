use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use composter::action::{ActionContext, ActionSettings};
use composter::cli::output;
use composter::config::{load_config, ComposterConfig};
use composter::dispatch::{ActionCatalog, Dispatcher};
use composter::hook::HookName;
use composter::paths::ControlPaths;
use composter::registry::persist;

#[derive(Parser)]
#[command(name = "composter")]
#[command(version, about = "Git hooks driven by declarative action packages")]
struct Cli {
    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Internal: run the actions registered for a hook (called by hook scripts)
    Dispatch {
        /// <HOOK> <ROOT> followed by the arguments Git passed to the hook
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Build the registry from configured packages and install hook entry points
    Install {
        /// Repository root (default: current dir)
        #[arg(default_value = ".")]
        directory: String,
    },
    /// Remove hook entry points and restore any hooks they replaced
    Uninstall {
        /// Repository root (default: current dir)
        #[arg(default_value = ".")]
        directory: String,
    },
    /// Show the installed registry
    List {
        /// Repository root (default: current dir)
        #[arg(default_value = ".")]
        directory: String,
        /// Only show this hook
        #[arg(long)]
        hook: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the staged files as an action would see them
    Staged {
        /// Repository root (default: current dir)
        #[arg(default_value = ".")]
        directory: String,
        /// Only paths matching this pattern
        #[arg(long)]
        pattern: Option<String>,
        /// Report working-tree paths without mirroring the index
        #[arg(long)]
        no_mirror: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    composter::observability::init_logging(cli.verbose);

    match cli.command {
        Commands::Dispatch { args } => {
            process::exit(cmd_dispatch(args));
        }
        Commands::Install { directory } => {
            cmd_install(&directory);
        }
        Commands::Uninstall { directory } => {
            cmd_uninstall(&directory);
        }
        Commands::List {
            directory,
            hook,
            json,
        } => {
            cmd_list(&directory, hook.as_deref(), json);
        }
        Commands::Staged {
            directory,
            pattern,
            no_mirror,
        } => {
            cmd_staged(&directory, pattern.as_deref(), no_mirror);
        }
    }
}

// ---------------------------------------------------------------------------
// CLI command implementations
// ---------------------------------------------------------------------------

fn resolve_root(directory: &str) -> PathBuf {
    Path::new(directory).canonicalize().unwrap_or_else(|e| {
        eprintln!("Error: cannot resolve directory '{}': {}", directory, e);
        process::exit(1);
    })
}

/// Configuration never blocks a hook: fall back to defaults.
fn config_for(root: &Path) -> ComposterConfig {
    load_config(Some(root)).unwrap_or_else(|e| {
        eprintln!("[composter] Warning: using default configuration: {}", e);
        ComposterConfig::default()
    })
}

fn cmd_dispatch(args: Vec<String>) -> i32 {
    let mut args = args.into_iter();
    let (Some(hook), Some(root)) = (args.next(), args.next()) else {
        eprintln!("[composter] dispatch needs <HOOK> <ROOT>; nothing to do.");
        return 0;
    };
    let hook_args: Vec<String> = args.collect();
    let root = PathBuf::from(root);

    let config = config_for(&root);
    let dispatcher = Dispatcher::new(ActionCatalog::with_builtins(), ActionSettings::from(&config));
    let report = dispatcher.dispatch(&hook, &root, &hook_args);

    tracing::debug!(
        hook = %hook,
        executed = report.executed,
        skipped = report.skipped,
        failed = report.failed,
        "dispatch finished with exit code {}",
        report.exit_code
    );
    report.exit_code
}

fn cmd_install(directory: &str) {
    let root = resolve_root(directory);
    let config = config_for(&root);
    let binary = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "composter".to_string());

    match composter::install::install(&root, &binary, &config) {
        Ok(report) => output::print_install_summary(&root, &report),
        Err(e) => {
            eprintln!("Error: install failed: {}", e);
            process::exit(1);
        }
    }
}

fn cmd_uninstall(directory: &str) {
    let root = resolve_root(directory);
    match composter::install::uninstall(&root) {
        Ok(report) => output::print_uninstall_summary(&root, &report),
        Err(e) => {
            eprintln!("Error: uninstall failed: {}", e);
            process::exit(1);
        }
    }
}

fn cmd_list(directory: &str, hook: Option<&str>, json: bool) {
    let root = resolve_root(directory);
    let only = hook.map(|name| {
        name.parse::<HookName>().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        })
    });

    let registry = persist::load(&ControlPaths::new(&root).registry_file()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("Run `composter install` first to create the registry.");
        process::exit(1);
    });

    if json {
        match serde_json::to_string_pretty(&output::registry_json(&registry, only)) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: cannot serialize registry: {}", e);
                process::exit(1);
            }
        }
    } else {
        print!("{}", output::render_registry(&registry, only));
    }
}

fn cmd_staged(directory: &str, pattern: Option<&str>, no_mirror: bool) {
    let root = resolve_root(directory);
    let settings = ActionSettings::from(&config_for(&root));
    let mirror = settings.staged.mirror() && !no_mirror;

    let mut ctx = ActionContext::new(HookName::PreCommit, &root, &settings);
    match ctx.staged_files(pattern, mirror) {
        Ok(files) if files.is_empty() => eprintln!("[composter] No staged files."),
        Ok(files) => {
            for file in files {
                println!("{}", file.display());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            drop(ctx);
            process::exit(1);
        }
    }
}
