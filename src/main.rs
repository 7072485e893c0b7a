//! gird CLI - Command-line interface
//!
//! Commands:
//!   gen      - Scan source files and generate the overlay
//!   build    - gen + go build -overlay
//!   test     - gen + go test -overlay
//!   run      - gen + go run -overlay
//!   audit    - Report contract coverage statistics
//!   clean    - Remove the cache directory

use gird::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let result = match args[1].as_str() {
        "gen" => cmd_gen(&dir_arg(&args, 2)),
        "build" => cmd_go("build", &args[2..]),
        "test" => cmd_go("test", &args[2..]),
        "run" => cmd_go("run", &args[2..]),
        "audit" => cmd_audit(&dir_arg(&args, 2)),
        "clean" => cmd_clean(&dir_arg(&args, 2)),
        "version" | "--version" | "-v" => {
            println!("gird {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("gird: unknown command {:?}", cmd);
            print_usage();
            Err("unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gird: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
gird - invisible contracts, invincible Go.

USAGE:
    gird <COMMAND> [OPTIONS]

COMMANDS:
    gen [dir]       Scan source files and generate the overlay
    build [args]    gen + go build -overlay
    test [args]     gen + go test -overlay
    run [args]      gen + go run -overlay
    audit [dir]     Report contract coverage statistics
    clean [dir]     Remove the cache directory
    version         Print version

If [dir] is omitted, the current directory is used.

EXAMPLES:
    gird gen ./service
    gird build ./...
    gird test -run TestTransfer
    gird audit
"#
    );
}

/// The optional directory argument at `idx`, defaulting to `.`.
fn dir_arg(args: &[String], idx: usize) -> String {
    args.get(idx).cloned().unwrap_or_else(|| ".".to_string())
}

fn cmd_gen(dir: &str) -> Result<()> {
    let root = absolute_dir(dir)?;
    let mut engine = Engine::new(&root);
    engine.run()
}

/// Runs `gen`, then the given `go` subcommand with the overlay flag (or
/// without it when nothing was mapped).
fn cmd_go(subcmd: &str, extra_args: &[String]) -> Result<()> {
    let root = absolute_dir(".")?;
    let mut engine = Engine::new(&root);
    engine.run()?;

    let overlay_path = root.join(CACHE_DIR).join(OVERLAY_FILE);
    let mut go_args: Vec<String> = vec![subcmd.to_string()];
    if overlay_path.exists() {
        go_args.push(format!("-overlay={}", overlay_path.display()));
    }
    go_args.extend(extra_args.iter().cloned());

    let status = std::process::Command::new("go")
        .args(&go_args)
        .status()
        .map_err(|e| Error::Other(format!("failed to run go: {}", e)))?;
    if !status.success() {
        return Err(Error::Other(format!("go {} failed", subcmd)));
    }
    Ok(())
}

fn cmd_audit(dir: &str) -> Result<()> {
    let root = absolute_dir(dir)?;
    let report = Auditor::new(&root).run()?;
    report.summarize().print_report(&root);
    Ok(())
}

fn cmd_clean(dir: &str) -> Result<()> {
    let cache = Path::new(dir).join(CACHE_DIR);
    if cache.exists() {
        std::fs::remove_dir_all(&cache)?;
    }
    println!("gird: cache cleaned");
    Ok(())
}

fn absolute_dir(dir: &str) -> Result<PathBuf> {
    let path = Path::new(dir);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
