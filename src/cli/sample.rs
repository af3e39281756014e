use std::{io::Write as _, path::PathBuf};

use http::StatusCode;
use nyckel::sample::*;
use tabwriter::TabWriter;

use crate::cli::{Cli, Output, api_status, color::*};

#[derive(Debug, clap::Args)]
pub(crate) struct SampleArgs {
    #[command(subcommand)]
    pub command: SampleCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum SampleCommand {
    /// List the samples of a function
    #[clap(alias = "list")]
    Ls(SampleLsArgs),
    /// Upload an image as a new annotated sample
    Create(SampleCreateArgs),
    /// Annotate an existing sample
    Annotate(SampleAnnotateArgs),
    /// Delete a sample
    #[clap(alias = "delete")]
    Rm(SampleRmArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct SampleLsArgs {
    /// Function id
    pub function_id: String,
    /// Maximum number of samples to return
    #[arg(long)]
    pub count: Option<u32>,
    /// Where to start listing
    #[arg(long)]
    pub start: Option<u64>,
    /// Where to stop listing
    #[arg(long)]
    pub end: Option<u64>,
    /// Only list the sample with this external id
    #[arg(long)]
    pub external_id: Option<String>,
}

/// A label given either by name or by id.
#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
pub(crate) struct LabelSelector {
    /// Label name; the service creates the label if needed
    #[arg(long)]
    pub label_name: Option<String>,
    /// Label id
    #[arg(long)]
    pub label_id: Option<String>,
}

impl LabelSelector {
    fn label_ref(&self) -> anyhow::Result<LabelRef<'_>> {
        match (self.label_name.as_deref(), self.label_id.as_deref()) {
            (Some(name), _) => Ok(LabelRef::Name(name)),
            (None, Some(id)) => Ok(LabelRef::Id(id)),
            (None, None) => anyhow::bail!("One of --label-name or --label-id is required"),
        }
    }
}

#[derive(Debug, clap::Args)]
#[command(after_long_help = CliExamples("
  # Upload an image labelled \"Dog\"
  nyckel sample create function_abc ./rex.jpg --label-name Dog

  # Upload an image with a known label id and your own id
  nyckel sample create function_abc ./rex.jpg --label-id label_123 --external-id rex
"))]
pub(crate) struct SampleCreateArgs {
    /// Function id
    pub function_id: String,
    /// Image file to upload
    pub file: PathBuf,
    #[command(flatten)]
    pub label: LabelSelector,
    /// Your own id for the sample
    #[arg(long)]
    pub external_id: Option<String>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct SampleAnnotateArgs {
    /// Function id
    pub function_id: String,
    /// Sample id
    pub sample_id: String,
    #[command(flatten)]
    pub label: LabelSelector,
}

#[derive(Debug, clap::Args)]
pub(crate) struct SampleRmArgs {
    /// Function id
    pub function_id: String,
    /// Sample id
    pub sample_id: String,
    /// Do not fail if the sample does not exist
    #[arg(long)]
    pub if_exists: bool,
}

pub(crate) fn handle(cli: &Cli, args: SampleArgs) -> anyhow::Result<()> {
    match args.command {
        SampleCommand::Ls(args) => list_samples(cli, args),
        SampleCommand::Create(args) => create_sample(cli, args),
        SampleCommand::Annotate(args) => annotate_sample(cli, args),
        SampleCommand::Rm(args) => delete_sample(cli, args),
    }
}

fn list_samples(cli: &Cli, args: SampleLsArgs) -> anyhow::Result<()> {
    let SampleLsArgs {
        function_id,
        count,
        start,
        end,
        external_id,
    } = args;

    let samples = cli.roundtrip(ListSamples {
        function_id: &function_id,
        count,
        start,
        end,
        external_id: external_id.as_deref(),
    })?;

    let mut out = anstream::stdout().lock();
    match cli.output() {
        Output::Json => {
            serde_json::to_writer(&mut out, &samples)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            let mut tw = TabWriter::new(&mut out).ansi(true);
            writeln!(
                &mut tw,
                "{HEADER}ID\tEXTERNAL ID\tANNOTATION\tPREDICTION\tDATA{HEADER:#}"
            )?;
            for sample in &samples {
                let annotation = sample
                    .annotation
                    .as_ref()
                    .map(|a| a.label_id.as_str())
                    .unwrap_or("-");
                let prediction = match &sample.prediction {
                    Some(p) => format!("{} ({:.2})", p.label_id, p.confidence),
                    None => "-".to_string(),
                };

                writeln!(
                    &mut tw,
                    "{}\t{}\t{}\t{}\t{DIM}{}{DIM:#}",
                    sample.id,
                    sample.external_id.as_deref().unwrap_or("-"),
                    annotation,
                    prediction,
                    sample.data,
                )?;
            }

            tw.flush()?;
        }
    }

    Ok(())
}

fn create_sample(cli: &Cli, args: SampleCreateArgs) -> anyhow::Result<()> {
    let SampleCreateArgs {
        function_id,
        file,
        label,
        external_id,
    } = args;

    let sample = cli.roundtrip(CreateImageSample {
        function_id: &function_id,
        file: &file,
        label: label.label_ref()?,
        external_id: external_id.as_deref(),
    })?;

    match cli.output() {
        Output::Json => {
            let mut out = anstream::stdout().lock();
            serde_json::to_writer(&mut out, &sample)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            eprintln!("Created sample from {}", file.display());
            println!("{}", sample.id);
        }
    }

    Ok(())
}

fn annotate_sample(cli: &Cli, args: SampleAnnotateArgs) -> anyhow::Result<()> {
    let SampleAnnotateArgs {
        function_id,
        sample_id,
        label,
    } = args;

    let annotation = cli.roundtrip(AnnotateSample {
        function_id: &function_id,
        sample_id: &sample_id,
        label: label.label_ref()?,
    })?;

    match cli.output() {
        Output::Json => {
            let mut out = anstream::stdout().lock();
            serde_json::to_writer(&mut out, &annotation)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            eprintln!("Annotated sample {sample_id:?}");
            println!("{}", annotation.label_id);
        }
    }

    Ok(())
}

fn delete_sample(cli: &Cli, args: SampleRmArgs) -> anyhow::Result<()> {
    let SampleRmArgs {
        function_id,
        sample_id,
        if_exists,
    } = args;

    let req = DeleteSample {
        function_id: &function_id,
        sample_id: &sample_id,
    };

    if let Err(e) = cli.roundtrip(req) {
        if if_exists && api_status(&e) == Some(StatusCode::NOT_FOUND) {
            eprintln!("Sample {sample_id:?} does not exist");
            return Ok(());
        } else {
            return Err(e);
        }
    }

    eprintln!("Deleted sample {sample_id:?}");
    Ok(())
}
