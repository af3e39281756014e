use std::io::Write as _;

use http::StatusCode;
use nyckel::label::*;
use tabwriter::TabWriter;

use crate::cli::{Cli, Output, api_status, color::*};

#[derive(Debug, clap::Args)]
pub(crate) struct LabelArgs {
    #[command(subcommand)]
    pub command: LabelCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum LabelCommand {
    /// List the labels of a function
    #[clap(alias = "list")]
    Ls(LabelLsArgs),
    /// Create a new label
    Create(LabelCreateArgs),
    /// Delete a label
    #[clap(alias = "delete")]
    Rm(LabelRmArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct LabelLsArgs {
    /// Function id
    pub function_id: String,
}

#[derive(Debug, clap::Args)]
#[command(after_long_help = CliExamples("
  # Create a label
  nyckel label create function_abc Dog

  # Create a label with a description
  nyckel label create function_abc Cat --description \"Not a dog\"
"))]
pub(crate) struct LabelCreateArgs {
    /// Function id
    pub function_id: String,
    /// Label name
    pub name: String,
    /// Label description
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Debug, clap::Args)]
pub(crate) struct LabelRmArgs {
    /// Function id
    pub function_id: String,
    /// Label id
    pub label_id: String,
    /// Do not fail if the label does not exist
    #[arg(long)]
    pub if_exists: bool,
}

pub(crate) fn handle(cli: &Cli, args: LabelArgs) -> anyhow::Result<()> {
    match args.command {
        LabelCommand::Ls(args) => list_labels(cli, args),
        LabelCommand::Create(args) => create_label(cli, args),
        LabelCommand::Rm(args) => delete_label(cli, args),
    }
}

fn list_labels(cli: &Cli, args: LabelLsArgs) -> anyhow::Result<()> {
    let labels = cli.roundtrip(ListLabels {
        function_id: &args.function_id,
    })?;

    let mut out = anstream::stdout().lock();
    match cli.output() {
        Output::Json => {
            serde_json::to_writer(&mut out, &labels)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            let mut tw = TabWriter::new(&mut out).ansi(true);
            writeln!(&mut tw, "{HEADER}ID\tNAME\tDESCRIPTION{HEADER:#}")?;
            for label in &labels {
                writeln!(
                    &mut tw,
                    "{}\t{}\t{DIM}{}{DIM:#}",
                    label.id, label.name, label.description
                )?;
            }

            tw.flush()?;
        }
    }

    Ok(())
}

fn create_label(cli: &Cli, args: LabelCreateArgs) -> anyhow::Result<()> {
    let LabelCreateArgs {
        function_id,
        name,
        description,
    } = args;

    let label = cli.roundtrip(CreateLabel {
        function_id: &function_id,
        name: &name,
        description: &description,
    })?;

    match cli.output() {
        Output::Json => {
            let mut out = anstream::stdout().lock();
            serde_json::to_writer(&mut out, &label)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            eprintln!("Created label {:?}", label.name);
            println!("{}", label.id);
        }
    }

    Ok(())
}

fn delete_label(cli: &Cli, args: LabelRmArgs) -> anyhow::Result<()> {
    let LabelRmArgs {
        function_id,
        label_id,
        if_exists,
    } = args;

    let req = DeleteLabel {
        function_id: &function_id,
        label_id: &label_id,
    };

    if let Err(e) = cli.roundtrip(req) {
        if if_exists && api_status(&e) == Some(StatusCode::NOT_FOUND) {
            eprintln!("Label {label_id:?} does not exist");
            return Ok(());
        } else {
            return Err(e);
        }
    }

    eprintln!("Deleted label {label_id:?}");
    Ok(())
}
