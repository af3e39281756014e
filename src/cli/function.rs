use std::io::Write as _;

use nyckel::function::*;
use tabwriter::TabWriter;

use crate::cli::{Cli, Output, color::*};

#[derive(Debug, clap::Args)]
pub(crate) struct FunctionArgs {
    #[command(subcommand)]
    pub command: FunctionCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum FunctionCommand {
    /// List functions
    #[clap(alias = "list")]
    Ls,
    /// Get information about a function
    Get(FunctionGetArgs),
    /// Create a new function
    Create(FunctionCreateArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct FunctionGetArgs {
    /// Function id
    pub function_id: String,
}

#[derive(Debug, clap::Args)]
#[command(after_long_help = CliExamples("
  # Create an image classifier
  nyckel function create pets --input Image --output Classification
"))]
pub(crate) struct FunctionCreateArgs {
    /// Function name
    pub name: String,
    /// Input kind (Text, Image, Tabular)
    #[arg(long)]
    pub input: FunctionInput,
    /// Output kind (Classification, Tags, Search, Localization, OCR)
    #[arg(long)]
    pub output: FunctionOutput,
}

pub(crate) fn handle(cli: &Cli, args: FunctionArgs) -> anyhow::Result<()> {
    match args.command {
        FunctionCommand::Ls => list_functions(cli),
        FunctionCommand::Get(args) => get_function(cli, args),
        FunctionCommand::Create(args) => create_function(cli, args),
    }
}

fn list_functions(cli: &Cli) -> anyhow::Result<()> {
    let functions = cli.roundtrip(ListFunctions)?;
    print_functions(cli, &functions)
}

fn get_function(cli: &Cli, args: FunctionGetArgs) -> anyhow::Result<()> {
    let function = cli.roundtrip(GetFunction {
        id: &args.function_id,
    })?;

    print_function(cli, &function)
}

fn create_function(cli: &Cli, args: FunctionCreateArgs) -> anyhow::Result<()> {
    let FunctionCreateArgs {
        name,
        input,
        output,
    } = args;

    let function = cli.roundtrip(CreateFunction {
        name: &name,
        input,
        output,
    })?;

    eprintln!("Created function {:?} ({})", function.name, function.id);
    print_function(cli, &function)
}

fn print_functions(cli: &Cli, functions: &[Function]) -> anyhow::Result<()> {
    let mut out = anstream::stdout().lock();
    match cli.output() {
        Output::Json => {
            serde_json::to_writer(&mut out, functions)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            let mut tw = TabWriter::new(&mut out).ansi(true);
            writeln!(&mut tw, "{HEADER}ID\tNAME\tINPUT\tOUTPUT{HEADER:#}")?;
            for f in functions {
                writeln!(&mut tw, "{}\t{}\t{}\t{}", f.id, f.name, f.input, f.output)?;
            }

            tw.flush()?;
        }
    }

    Ok(())
}

fn print_function(cli: &Cli, function: &Function) -> anyhow::Result<()> {
    let mut out = anstream::stdout().lock();
    match cli.output() {
        Output::Json => {
            serde_json::to_writer(&mut out, function)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            let mut tw = TabWriter::new(&mut out).ansi(true);
            writeln!(&mut tw, "{GREEN}ID{GREEN:#}\t{}", function.id)?;
            writeln!(&mut tw, "{GREEN}Name{GREEN:#}\t{}", function.name)?;
            writeln!(&mut tw, "{GREEN}Input{GREEN:#}\t{}", function.input)?;
            writeln!(&mut tw, "{GREEN}Output{GREEN:#}\t{}", function.output)?;
            tw.flush()?;
        }
    }

    Ok(())
}
