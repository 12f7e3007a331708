use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use mython::ast_printer::AstPrinter;
use mython::context::SimpleContext;
use mython::error::MythonError;
use mython::interpreter::Interpreter;
use mython::parser::Parser;
use mython::scanner::Scanner;
use mython::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Mython language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a program, printing each token
    Tokenize {
        /// Program file; standard input when omitted
        filename: Option<PathBuf>,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a program and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Runs a program, writing its output to standard output
    Run { filename: Option<PathBuf> },
}

/// Reads the program text from `filename`, or from standard input.
fn read_source(filename: Option<PathBuf>) -> Result<String> {
    let mut buf = Vec::new();

    match filename {
        Some(filename) => {
            info!("Reading file: {:?}", filename);
            let file =
                File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
            BufReader::new(file)
                .read_to_end(&mut buf)
                .context(format!("Failed to read file {:?}", filename))?;
        }
        None => {
            info!("Reading program from standard input");
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("Failed to read standard input")?;
        }
    }

    info!("Read {} bytes", buf.len());

    let source = String::from_utf8(buf).map_err(MythonError::from)?;

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'mython::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("mython::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Report a static (lex/parse) failure and exit with code 65.
fn exit_static(e: &MythonError) -> ! {
    debug!("Static error: {}", e);
    eprintln!("{}", e);
    std::process::exit(65);
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();

    for token in Scanner::new(source) {
        match token {
            Ok(token) => tokens.push(token),
            Err(e) => exit_static(&e),
        }
    }

    info!("Scanned {} tokens", tokens.len());

    tokens
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            info!("Running Tokenize subcommand");
            let source = read_source(filename)?;
            let mut scanner = Scanner::new(&source);
            let mut tokens = Vec::new();
            let mut tokenized = true;

            for token in &mut scanner {
                match token {
                    Ok(token) if json => tokens.push(token),
                    Ok(token) => println!("{}", token),
                    Err(e) => {
                        tokenized = false;
                        debug!("Tokenization debug: {}", e);
                        eprintln!("{}", e);
                    }
                }
            }

            if json {
                let rendered =
                    serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?;
                println!("{}", rendered);
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code 65");
                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename } => {
            info!("Running Parse subcommand");
            let source = read_source(filename)?;
            let tokens = tokenize(&source);

            match Parser::new(&tokens).parse() {
                Ok(program) => {
                    let ast_str = AstPrinter.print(&program);
                    debug!("AST: {}", ast_str);
                    println!("{}", ast_str);
                }
                Err(e) => exit_static(&e),
            }

            info!("Parse subcommand completed");
        }

        Commands::Run { filename } => {
            info!("Running Run subcommand");
            let source = read_source(filename)?;
            info!("Provided input:\n {}", source);

            let tokens = tokenize(&source);
            let program = match Parser::new(&tokens).parse() {
                Ok(program) => program,
                Err(e) => exit_static(&e),
            };

            let stdout = io::stdout();
            let mut context = SimpleContext::new(BufWriter::new(stdout.lock()));
            let mut interpreter = Interpreter::new();

            let outcome = interpreter.interpret(&program, &mut context);
            context
                .into_inner()
                .flush()
                .context("Failed to flush program output")?;

            match outcome {
                Ok(result) => {
                    info!("Program executed successfully, result: {:?}", result);
                }
                Err(e) => {
                    debug!("Runtime debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(70);
                }
            }
        }
    }

    Ok(())
}
