use std::fmt::Display;

use augrex::{Match, Pattern, SearchTarget, escape_literal, replace, split};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::debug;

#[derive(Parser)]
#[command(name = "augrex")]
#[command(about = "Augrex - an augmented regex dialect with named groups and free-spacing mode")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the baseline pattern a dialect pattern compiles to
    Compile {
        /// The dialect pattern
        pattern: String,
        /// Flags, e.g. "gixsn"
        #[arg(short, long, default_value = "")]
        flags: String,
    },
    /// Show the first match and its groups
    Exec {
        /// The dialect pattern
        pattern: String,
        /// The input string
        input: String,
        /// Flags, e.g. "gixsn"
        #[arg(short, long, default_value = "")]
        flags: String,
        /// Byte offset to start searching at
        #[arg(long, default_value_t = 0)]
        pos: usize,
        /// Only accept a match starting exactly at the offset
        #[arg(long)]
        sticky: bool,
    },
    /// Find all matches in input
    Find {
        /// The dialect pattern
        pattern: String,
        /// The input string
        input: String,
        /// Flags, e.g. "gixsn"
        #[arg(short, long, default_value = "")]
        flags: String,
    },
    /// Replace matches using a `$` template
    Replace {
        /// The dialect pattern
        pattern: String,
        /// The input string
        input: String,
        /// Replacement template, e.g. "${last}, ${first}"
        replacement: String,
        /// Flags, e.g. "gixsn"
        #[arg(short, long, default_value = "")]
        flags: String,
        /// Replace every match regardless of the `g` flag
        #[arg(short, long)]
        all: bool,
        /// Treat the pattern as literal text
        #[arg(short, long)]
        literal: bool,
    },
    /// Split input on a pattern
    Split {
        /// The dialect pattern
        pattern: String,
        /// The input string
        input: String,
        /// Flags, e.g. "gixsn"
        #[arg(short, long, default_value = "")]
        flags: String,
        /// Maximum number of items
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Escape text for literal use inside a pattern
    Escape {
        /// The text to escape
        text: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { pattern, flags } => cmd_compile(&pattern, &flags),
        Commands::Exec {
            pattern,
            input,
            flags,
            pos,
            sticky,
        } => cmd_exec(&pattern, &input, &flags, pos, sticky),
        Commands::Find {
            pattern,
            input,
            flags,
        } => cmd_find(&pattern, &input, &flags),
        Commands::Replace {
            pattern,
            input,
            replacement,
            flags,
            all,
            literal,
        } => cmd_replace(&pattern, &input, &replacement, &flags, all, literal),
        Commands::Split {
            pattern,
            input,
            flags,
            limit,
        } => cmd_split(&pattern, &input, &flags, limit),
        Commands::Escape { text } => println!("{}", escape_literal(&text)),
    }
}

fn fail(e: impl Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), e);
    std::process::exit(1);
}

fn compile_or_exit(pattern: &str, flags: &str) -> Pattern {
    let compiled = Pattern::new(pattern, flags).unwrap_or_else(|e| fail(e));
    debug!("using {} as `{}`", compiled, compiled.rewritten());
    compiled
}

fn group_label(pattern: &Pattern, n: usize) -> String {
    match pattern.capture_names().get(n.wrapping_sub(1)) {
        Some(Some(name)) => format!("Group {n} ({name})"),
        _ => format!("Group {n}"),
    }
}

fn print_groups(m: &Match<'_>, pattern: &Pattern) {
    for n in 1..m.len() {
        let label = group_label(pattern, n);
        match m.group(n) {
            Some(text) => println!("  {}: {}", label, text.green()),
            None => println!("  {}: {}", label, "<absent>".dimmed()),
        }
    }
}

fn cmd_compile(pattern: &str, flags: &str) {
    println!("{}", "Compiling pattern...".bold());
    println!("  Input:  {}", pattern.cyan());
    println!();

    let compiled = compile_or_exit(pattern, flags);
    println!("{}", "Output:".bold());
    println!("  {}", compiled.rewritten().green());
    println!("  Flags:  {}", compiled.flags().to_string().yellow());
    if compiled.group_count() > 0 {
        println!();
        println!("{}", "Capture groups:".bold());
        for (i, name) in compiled.capture_names().iter().enumerate() {
            println!("  Group {}: {}", i + 1, name.as_deref().unwrap_or("-"));
        }
    }
}

fn cmd_exec(pattern: &str, input: &str, flags: &str, pos: usize, sticky: bool) {
    println!("{}", "Testing pattern...".bold());
    println!("  Pattern: {}", pattern.cyan());
    println!("  Input:   {}", input.yellow());
    println!();

    let compiled = compile_or_exit(pattern, flags);
    match compiled.exec_at(input, pos, sticky) {
        Ok(Some(m)) => {
            println!("{}", "✓ Match found!".green().bold());
            println!("  Position: {}..{}", m.start(), m.end());
            println!("  Match:    {}", m.as_str().green());
            if m.len() > 1 {
                println!();
                println!("{}", "Capture groups:".bold());
                print_groups(&m, &compiled);
            }
        }
        Ok(None) => println!("{}", "✗ No match".red()),
        Err(e) => fail(e),
    }
}

fn cmd_find(pattern: &str, input: &str, flags: &str) {
    let compiled = compile_or_exit(pattern, flags);
    let matches: Vec<_> = compiled
        .matches(input)
        .collect::<augrex::Result<_>>()
        .unwrap_or_else(|e| fail(e));

    if matches.is_empty() {
        println!("{}", "No matches found".red());
        return;
    }

    println!(
        "{} {}",
        "Found".bold(),
        format!("{} match(es)", matches.len()).green()
    );
    println!();
    for (i, m) in matches.iter().enumerate() {
        println!(
            "  {}. {}..{} = {}",
            i + 1,
            m.start(),
            m.end(),
            m.as_str().green()
        );
        if compiled.has_named_capture() {
            for (name, value) in m.named_groups() {
                println!("       {} = {}", name.cyan(), value.unwrap_or_default());
            }
        }
    }
}

fn cmd_replace(pattern: &str, input: &str, replacement: &str, flags: &str, all: bool, literal: bool) {
    let replace_all = all.then_some(true);
    let result = if literal {
        replace(input, SearchTarget::Literal(pattern), replacement.into(), replace_all)
    } else {
        let compiled = compile_or_exit(pattern, flags);
        replace(input, SearchTarget::Pattern(&compiled), replacement.into(), replace_all)
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => fail(e),
    }
}

fn cmd_split(pattern: &str, input: &str, flags: &str, limit: Option<usize>) {
    let compiled = compile_or_exit(pattern, flags);
    match split(input, &compiled, limit) {
        Ok(parts) => {
            for (i, part) in parts.iter().enumerate() {
                println!("  {}: {:?}", i, part);
            }
        }
        Err(e) => fail(e),
    }
}
