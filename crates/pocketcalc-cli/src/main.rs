mod config;
mod terminal;
#[cfg(feature = "tui")]
mod tui;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use pocketcalc_core::{
    Calculator, EngineOptions, EqualsPolicy, InputSource, KeyScript, RecordingDisplay, Session,
};

use crate::terminal::TapeDisplay;

#[derive(Parser)]
#[command(
    name = "pocketcalc",
    version,
    about = "Four-function pocket calculator driven by key presses"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// What a second `=` does (overrides the config file)
    #[arg(long, global = true)]
    equals: Option<CliEquals>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Press a sequence of keys and print the final display
    Eval {
        /// Keys, e.g. `12 + 3 =` or `2*3=` (see `pocketcalc keys`)
        #[arg(required = true, allow_hyphen_values = true)]
        keys: Vec<String>,

        /// Print the display after every key
        #[arg(short, long)]
        trace: bool,
    },

    /// Read key scripts line by line from stdin
    Repl {
        /// Print the display after every key instead of once per line
        #[arg(short, long)]
        trace: bool,
    },

    /// Full-screen keypad
    Tui,

    /// Launch the JSON-RPC server on stdio
    Serve,

    /// List the key tokens accepted by eval, repl and serve
    Keys,

    /// Show current configuration
    Config,
}

#[derive(Clone, ValueEnum)]
enum CliEquals {
    /// A second `=` does nothing
    Clear,
    /// A second `=` repeats the last operation
    Repeat,
}

impl From<CliEquals> for EqualsPolicy {
    fn from(val: CliEquals) -> Self {
        match val {
            CliEquals::Clear => EqualsPolicy::Clear,
            CliEquals::Repeat => EqualsPolicy::Repeat,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;
    let mut options = cfg.engine_options();
    if let Some(policy) = cli.equals {
        options.equals = policy.into();
    }

    match cli.command {
        Commands::Eval { keys, trace } => cmd_eval(options, &keys, trace),
        Commands::Repl { trace } => cmd_repl(options, &cfg.repl.prompt, trace || cfg.repl.trace),
        Commands::Tui => {
            #[cfg(feature = "tui")]
            {
                tui::run_tui(options, cfg.tui.show_memory)
            }
            #[cfg(not(feature = "tui"))]
            {
                anyhow::bail!("tui feature not enabled, rebuild with `--features tui`")
            }
        }
        Commands::Serve => pocketcalc_rpc::run_server(options),
        Commands::Keys => cmd_keys(),
        Commands::Config => cmd_config(cli.config.as_deref(), &cfg, options),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_eval(options: EngineOptions, keys: &[String], trace: bool) -> Result<()> {
    let mut script = KeyScript::new(&keys.join(" "));
    warn_skipped(&script);

    let display = eval_script(options, &mut script, trace, io::stdout().lock());
    if !trace {
        println!("{display}");
    }
    Ok(())
}

/// Run a script against a fresh calculator and return the final display.
fn eval_script<W: Write>(
    options: EngineOptions,
    script: &mut impl InputSource,
    trace: bool,
    out: W,
) -> String {
    let calculator = Calculator::with_options(options);
    if trace {
        let mut session = Session::new(calculator, TapeDisplay::new(out, true));
        session.run(script);
        session.calculator().current_display().to_string()
    } else {
        let mut session = Session::new(calculator, RecordingDisplay::new());
        session.run(script);
        session.calculator().current_display().to_string()
    }
}

fn cmd_repl(options: EngineOptions, prompt: &str, trace: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut session = Session::new(
        Calculator::with_options(options),
        TapeDisplay::new(io::stdout(), trace),
    );

    print_prompt(prompt)?;
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        match line {
            "" => {}
            "quit" | "exit" => break,
            ":state" => {
                let snapshot = session.calculator().snapshot();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            _ => {
                let mut script = KeyScript::new(line);
                warn_skipped(&script);
                session.run(&mut script);
                if !trace {
                    let text = session.calculator().current_display().to_string();
                    session.display_mut().print(&text);
                }
            }
        }
        print_prompt(prompt)?;
    }

    Ok(())
}

fn print_prompt(prompt: &str) -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;
    Ok(())
}

fn warn_skipped(script: &KeyScript) {
    for token in script.skipped() {
        eprintln!("warning: ignored unknown key `{token}`");
    }
}

fn cmd_keys() -> Result<()> {
    println!("{:<22} Key", "Token");
    println!("{}", "-".repeat(40));
    let rows = [
        ("0-9", "digit"),
        (".", "decimal point"),
        ("+ - * /", "operator (also × ÷ x)"),
        ("=", "equals"),
        ("%", "percent"),
        ("sqrt", "square root"),
        ("neg, +/-", "change sign"),
        ("M+ / M-", "add to / subtract from memory"),
        ("MRC, MR", "recall memory; twice clears it"),
        ("CE, C", "clear entry"),
        ("AC", "clear all, memory included"),
    ];
    for (token, meaning) in rows {
        println!("{token:<22} {meaning}");
    }
    println!();
    println!("Numerals may be typed whole: `12.5 + 3 =` or `2*3=`.");
    Ok(())
}

fn cmd_config(explicit: Option<&Path>, cfg: &config::Config, options: EngineOptions) -> Result<()> {
    println!("Config: {}", config::show_config_path(explicit));
    println!();
    println!("[engine]");
    println!("  equals = {}", options.equals);
    if options.equals != cfg.engine.equals {
        println!("  (overridden on the command line, file says {})", cfg.engine.equals);
    }
    println!();
    println!("[repl]");
    println!("  prompt = {:?}", cfg.repl.prompt);
    println!("  trace = {}", cfg.repl.trace);
    println!();
    println!("[tui]");
    println!("  show_memory = {}", cfg.tui.show_memory);
    Ok(())
}
