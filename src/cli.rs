mod color;
mod function;
mod invoke;
mod label;
mod sample;

use std::{io::Write as _, time};

use anyhow::bail;
use nyckel::{ApiError, ApiRequest, Client, Profile};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::color::*;

#[derive(Debug, Parser)]
#[command(
    name = "nyckel",
    about = "A command-line client for Nyckel",
    version = env!("NYCKEL_VERSION"),
    propagate_version = true
)]
pub(crate) struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// How to format output.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Output {
    Json,
    #[default]
    Tty,
}

#[derive(Debug, clap::Args)]
#[command(next_help_heading = "Global Options")]
pub(crate) struct GlobalArgs {
    /// Name of the profile to use
    #[arg(long, short = 'P', global = true)]
    pub profile: Option<String>,
    /// Output format
    #[arg(long, short = 'O', global = true)]
    pub output: Option<Output>,
    /// Timeout (in seconds) for client operations (-1 = no timeout)
    #[arg(long, global = true)]
    pub client_timeout: Option<i64>,
    /// Print verbose logs
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print version.
    Version,
    /// Exchange the configured client credentials for an access token
    Token,
    /// Manage functions
    Function(function::FunctionArgs),
    /// Manage labels
    Label(label::LabelArgs),
    /// Manage samples
    Sample(sample::SampleArgs),
    /// Run a function on a local file
    Invoke(invoke::InvokeArgs),
}

pub(crate) struct Cli {
    pub(crate) global: GlobalArgs,
    pub(crate) client: Client,
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    if let Command::Version = args.command {
        println!("nyckel {}", env!("NYCKEL_VERSION"));
        return Ok(());
    }

    let profile = if let Some(name) = args.global.profile.as_deref() {
        Profile::from_env(name)
    } else {
        Profile::from_default_env()
    };

    let profile = profile?.with_ua_product("nyckel-cli");

    let timeout = match args.global.client_timeout {
        Some(-1) | None => None,
        Some(v) if v > 0 => Some(time::Duration::from_secs(v as _)),
        Some(v) => bail!("Invalid timeout value: {v}"),
    };

    debug!(profile = ?profile, command = ?args.command, "cli invocation");

    // Every invocation starts without a credential, so get a fresh one.
    let mut client = Client::new(profile).with_timeout(timeout);
    let credential = client.exchange(chrono::Utc::now())?;
    debug!(expires_at = %credential.expires_at(), "obtained access token");
    client.set_credential(credential);

    let cli = Cli {
        global: args.global,
        client,
    };

    match args.command {
        Command::Version => unreachable!(),
        Command::Token => handle_token(&cli),
        Command::Function(args) => function::handle(&cli, args),
        Command::Label(args) => label::handle(&cli, args),
        Command::Sample(args) => sample::handle(&cli, args),
        Command::Invoke(args) => invoke::handle(&cli, args),
    }
}

impl Cli {
    pub(crate) fn roundtrip<T: ApiRequest>(&self, req: T) -> anyhow::Result<T::Response> {
        Ok(self.client.roundtrip(req)?)
    }

    pub(crate) fn output(&self) -> Output {
        self.global.output.unwrap_or_default()
    }
}

/// The HTTP status of a failed API call, if the error is one.
pub(crate) fn api_status(err: &anyhow::Error) -> Option<http::StatusCode> {
    err.downcast_ref::<ApiError>()?.status()
}

fn handle_token(cli: &Cli) -> anyhow::Result<()> {
    let Some(credential) = cli.client.credential() else {
        bail!("No access token");
    };

    let mut out = anstream::stdout().lock();
    match cli.output() {
        Output::Json => {
            serde_json::to_writer(&mut out, credential)?;
            writeln!(&mut out)?;
        }
        Output::Tty => {
            let mut tw = tabwriter::TabWriter::new(&mut out).ansi(true);
            writeln!(&mut tw, "{GREEN}Token Type{GREEN:#}\t{}", credential.token_type)?;
            writeln!(&mut tw, "{GREEN}Scope{GREEN:#}\t{}", credential.scope)?;
            writeln!(&mut tw, "{GREEN}Issued At{GREEN:#}\t{}", credential.issued_at)?;
            writeln!(&mut tw, "{GREEN}Expires At{GREEN:#}\t{}", credential.expires_at())?;
            writeln!(&mut tw, "{GREEN}Access Token{GREEN:#}\t{}", credential.access_token)?;
            tw.flush()?;
        }
    }

    Ok(())
}
