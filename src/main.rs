use clap::{Args, Parser as ClapParser, Subcommand};
use odata_mongo::cli::{self, CliError, Target, TranslateCommand};
use odata_mongo::TranslateOptions;
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "odata-mongo")]
#[command(about = "Translate OData query ASTs (as JSON) into MongoDB queries and pipelines")]
#[command(version)]
struct Cli {
    /// Log translation steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log nothing, not even warnings
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print collection, query, projection, sort, skip and limit for a find
    Query(TranslateArgs),

    /// Print the filter document only
    Filter(TranslateArgs),

    /// Print the aggregation pipeline, including $expand joins
    Pipeline(TranslateArgs),
}

#[derive(Args)]
struct TranslateArgs {
    /// AST as JSON (reads from stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,

    /// Field of the joined collection an association refers to
    #[arg(long, default_value = "_id")]
    foreign_field: String,

    /// Keep $lookup results as arrays instead of unwinding them
    #[arg(long)]
    no_unwind: bool,

    /// Match contains/startswith/endswith case-insensitively
    #[arg(long)]
    case_insensitive: bool,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the translated JSON.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(io::stderr)
            .init();
    } else if !cli.quiet {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Query(args) => run_translate(Target::Query, args),
        Commands::Filter(args) => run_translate(Target::Filter, args),
        Commands::Pipeline(args) => run_translate(Target::Pipeline, args),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_translate(target: Target, args: TranslateArgs) -> Result<(), CliError> {
    let input = match args.input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let command = TranslateCommand {
        target,
        input,
        options: TranslateOptions {
            foreign_field: args.foreign_field,
            unwind_expanded: !args.no_unwind,
            case_insensitive_match: args.case_insensitive,
        },
    };

    let output = cli::execute_translate(&command)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);
    Ok(())
}
