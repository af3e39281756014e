use std::{io::Write as _, path::PathBuf};

use nyckel::invoke::InvokeFunction;
use tabwriter::TabWriter;

use crate::cli::{Cli, Output, color::*};

#[derive(Debug, clap::Args)]
#[command(after_long_help = CliExamples("
  # Classify an image
  nyckel invoke function_abc ./rex.jpg

  # Classify an image and keep it as a new sample
  nyckel invoke function_abc ./rex.jpg --capture --external-id rex
"))]
pub(crate) struct InvokeArgs {
    /// Function id
    pub function_id: String,
    /// File to classify
    pub file: PathBuf,
    /// Keep the input as a new sample
    #[arg(long)]
    pub capture: bool,
    /// Your own id for the captured sample
    #[arg(long)]
    pub external_id: Option<String>,
}

pub(crate) fn handle(cli: &Cli, args: InvokeArgs) -> anyhow::Result<()> {
    let InvokeArgs {
        function_id,
        file,
        capture,
        external_id,
    } = args;

    let invocation = cli.roundtrip(InvokeFunction {
        function_id: &function_id,
        file: &file,
        capture,
        external_id: external_id.as_deref(),
    })?;

    let mut out = anstream::stdout().lock();
    match cli.output() {
        Output::Json => {
            serde_json::to_writer(&mut out, &invocation)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            let mut tw = TabWriter::new(&mut out).ansi(true);
            writeln!(&mut tw, "{GREEN}Label{GREEN:#}\t{}", invocation.label_name)?;
            writeln!(&mut tw, "{GREEN}Label ID{GREEN:#}\t{}", invocation.label_id)?;
            writeln!(
                &mut tw,
                "{GREEN}Confidence{GREEN:#}\t{:.4}",
                invocation.confidence
            )?;
            tw.flush()?;
        }
    }

    Ok(())
}
