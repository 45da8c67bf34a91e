//! The interactive (or scripted) text-menu driver described in spec.md §6.
//!
//! Maps the menu characters `h/j/v/y` to a cache, `l/e/s` to an operation,
//! and a flower name to an address via [`moesi_sim::vocabulary`], then
//! prints a human-readable snapshot after every completed operation. This
//! binary is deliberately thin: all interesting behavior lives in
//! [`moesi_sim::system`].

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use log::info;

use moesi_sim::address::CacheId;
use moesi_sim::error::EngineError;
use moesi_sim::render::render_system;
use moesi_sim::system::System;
use moesi_sim::vocabulary;

/// An educational MOESI cache coherence simulator.
#[derive(Parser, Debug)]
#[command(name = "moesi-sim", version, about)]
struct Cli {
    /// Seed main memory's random initialization deterministically.
    #[arg(long)]
    seed: Option<u64>,

    /// Run a newline-delimited command script instead of the interactive
    /// menu. Each line has the grammar `<cache> <op> [<flower>] [<value>]`,
    /// e.g. `h l rosa` or `j e tulipa 42`, or `s` alone to quit early.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Raise log verbosity (`-v` for debug, `-vv` for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The operation requested for a turn.
enum Operation {
    Read,
    Write,
    Quit,
}

fn parse_operation(c: char) -> Option<Operation> {
    match c.to_ascii_lowercase() {
        'l' => Some(Operation::Read),
        'e' => Some(Operation::Write),
        's' => Some(Operation::Quit),
        _ => None,
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut system = System::new(cli.seed);
    info!("system initialized (seed = {:?})", cli.seed);

    match &cli.script {
        Some(path) => run_script(&mut system, path)?,
        None => run_interactive(&mut system)?,
    }

    println!("Encerrando o sistema da floricultura...");
    Ok(())
}

/// The interactive stdin/stdout menu.
fn run_interactive(system: &mut System) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        println!("\n--- Menu Floricultura com Simulacao de Cache ---");

        let cache_id = match prompt_until(
            &stdin,
            &mut stdout,
            "Escolha um florista (h: Heloise, j: Josiane, v: Valeria, y: Yandre, s: Sair): ",
            |line| {
                let c = line.chars().next()?;
                if c.eq_ignore_ascii_case(&'s') {
                    Some(Err(()))
                } else {
                    CacheId::from_menu_char(c).map(Ok)
                }
            },
        )? {
            Ok(id) => id,
            Err(()) => break,
        };

        let operation = match prompt_until(
            &stdin,
            &mut stdout,
            "Escolha a operacao (l: Leitura, e: Escrita, s: Sair): ",
            |line| line.chars().next().and_then(parse_operation).map(Ok::<_, ()>),
        )? {
            Ok(Operation::Quit) => break,
            Ok(op) => op,
            Err(()) => unreachable!("prompt_until never returns Err for operation"),
        };

        println!("\nFlores disponiveis:\n{}", vocabulary::FLOWERS.join(", "));

        let address = prompt_until(
            &stdin,
            &mut stdout,
            "Digite o nome da flor: ",
            |line| vocabulary::name_to_address(line).map(Ok::<_, ()>),
        )?
        .expect("flower prompt never yields Err");

        match operation {
            Operation::Read => {
                let value = system.read(cache_id, address);
                println!(
                    "Flor '{}' (florista {}): quantidade em estoque = {}",
                    vocabulary::address_to_name(address),
                    cache_id,
                    value
                );
            }
            Operation::Write => {
                let value = prompt_until(
                    &stdin,
                    &mut stdout,
                    "Digite o novo valor do estoque: ",
                    |line| match line.parse::<i64>() {
                        Ok(v) if v >= 0 => Some(Ok::<u32, ()>(v as u32)),
                        _ => None,
                    },
                )?
                .expect("value prompt never yields Err");
                system.write(cache_id, address, value);
            }
            Operation::Quit => unreachable!(),
        }

        println!("{}", render_system(&system.snapshot()));
    }

    Ok(())
}

/// Print `message`, read one line, and keep re-prompting until `parse`
/// accepts it. Mirrors `original_source/main.py`'s re-prompt loops, but
/// expressed with a `Result`-returning parser instead of Python's
/// `while ... not in [...]`.
fn prompt_until<T, E>(
    stdin: &io::Stdin,
    stdout: &mut io::Stdout,
    message: &str,
    mut parse: impl FnMut(&str) -> Option<Result<T, E>>,
) -> io::Result<Result<T, E>> {
    loop {
        print!("\n{}", message);
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // Stdin closed: treat as if the user asked to quit, by
            // propagating whatever quit-sentinel the caller's parser
            // would produce for an empty line, falling back to a hard
            // error if there is none.
            if let Some(result) = parse("s") {
                return Ok(result);
            }
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }

        let trimmed = line.trim().to_lowercase();
        if let Some(result) = parse(&trimmed) {
            return Ok(result);
        }

        println!("Opcao invalida! Tente novamente.");
    }
}

/// Run a non-interactive command script. Each non-blank, non-comment line
/// is `<cache> <op> [<flower>] [<value>]`; a line that is just `s` quits
/// early.
fn run_script(system: &mut System, path: &PathBuf) -> io::Result<()> {
    let file = File::open(path)?;
    for line in io::BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let cache_token = tokens.next().unwrap_or("");
        if cache_token.eq_ignore_ascii_case("s") {
            break;
        }

        let cache_id = match cache_token.chars().next().and_then(CacheId::from_menu_char) {
            Some(id) => id,
            None => {
                eprintln!("skipping malformed line (bad cache): {}", line);
                continue;
            }
        };

        let op_token = tokens.next().unwrap_or("");
        let operation = match op_token.chars().next().and_then(parse_operation) {
            Some(op) => op,
            None => {
                eprintln!("skipping malformed line (bad operation): {}", line);
                continue;
            }
        };
        if matches!(operation, Operation::Quit) {
            break;
        }

        let flower_token = tokens.next().unwrap_or("");
        let address = match vocabulary::name_to_address(flower_token) {
            Some(addr) => addr,
            None => {
                eprintln!("skipping malformed line (unknown flower): {}", line);
                continue;
            }
        };

        match operation {
            Operation::Read => {
                let value = system.read(cache_id, address);
                println!(
                    "leitura {} {} -> {}",
                    cache_id,
                    vocabulary::address_to_name(address),
                    value
                );
            }
            Operation::Write => {
                let value_token = tokens.next().unwrap_or("");
                let parsed: i64 = match value_token.parse() {
                    Ok(v) => v,
                    Err(_) => {
                        eprintln!("skipping malformed line (bad value): {}", line);
                        continue;
                    }
                };
                if parsed < 0 {
                    let err = EngineError::NegativeValue(parsed);
                    eprintln!("skipping malformed line ({}): {}", err, line);
                    continue;
                }
                let value = match u32::try_from(parsed) {
                    Ok(v) => v,
                    Err(_) => {
                        eprintln!("skipping malformed line (value too large): {}", line);
                        continue;
                    }
                };
                system.write(cache_id, address, value);
                println!(
                    "escrita {} {} {}",
                    cache_id,
                    vocabulary::address_to_name(address),
                    value
                );
            }
            Operation::Quit => unreachable!(),
        }

        println!("{}", render_system(&system.snapshot()));
    }

    Ok(())
}
