use crate::error::{Error, Result};
use crate::filters::{self, FilterDescriptor, ParsedParameters, FILTERS, MAX_PARAMS};
use crate::pipeline::{self, SoundBackend, WavBackend};
use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Too few arguments: print help and exit successfully.
    Usage,
    Run(CommandInvocation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub filter_name: String,
    pub raw_params: Vec<String>,
}

/// Split `program input output filter [params...]`. Paths are taken as given,
/// so names that are not valid UTF-8 still reach the file system intact.
pub fn parse_args(args: &[OsString]) -> Command {
    match args {
        [_, input, output, filter, params @ ..] => Command::Run(CommandInvocation {
            input_path: PathBuf::from(input),
            output_path: PathBuf::from(output),
            filter_name: filter.to_string_lossy().into_owned(),
            raw_params: params
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }),
        _ => Command::Usage,
    }
}

/// Convert the first `arity` raw tokens to numbers. Tokens past the arity are
/// ignored.
pub fn bind_parameters(
    invocation: &CommandInvocation,
    filter: &FilterDescriptor,
) -> Result<ParsedParameters> {
    let arity = filter.arity();
    let found = invocation.raw_params.len();
    let bad_arguments = || Error::BadArguments {
        filter: filter.name.to_string(),
        expected: arity,
        found,
    };

    if found < arity {
        return Err(bad_arguments());
    }
    if found > arity {
        log::debug!("ignoring {} extra arguments for {}", found - arity, filter.name);
    }

    let mut values = [0.0; MAX_PARAMS];
    for (value, token) in values.iter_mut().zip(&invocation.raw_params[..arity]) {
        *value = parse_lenient(token);
    }
    ParsedParameters::from_slice(&values[..arity]).ok_or_else(bad_arguments)
}

/// Best-effort number parsing: leading whitespace is skipped, the longest
/// numeric prefix is used, and text with no numeric prefix is 0.0.
pub fn parse_lenient(token: &str) -> f32 {
    let token = token.trim_start();
    token
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| token[..end].parse::<f32>().ok())
        .unwrap_or(0.0)
}

/// Write the help text, generated from the filter registry.
pub fn print_usage(out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "sndfilter {} - simple demonstrations of common sound filters",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "Usage:")?;
    writeln!(out, "  sndfilter input.wav output.wav <filter> <...>")?;
    writeln!(out)?;
    writeln!(out, "Where:")?;
    writeln!(out, "  input.wav    Input WAV file to process")?;
    writeln!(out, "  output.wav   Output WAV file of filtered results")?;
    writeln!(out, "  <filter>     One of the available filters (see below)")?;
    writeln!(out, "  <...>        Additional parameters for the particular filter")?;
    writeln!(out)?;
    writeln!(out, "  Filters:")?;
    for filter in FILTERS {
        writeln!(out, "    {:<11} {}", filter.name, filter.summary)?;
    }
    writeln!(out)?;
    writeln!(out, "  Filter Details:")?;
    for filter in FILTERS {
        let grammar: Vec<String> = filter
            .params
            .iter()
            .map(|p| format!("<{}>", p.name))
            .collect();
        writeln!(out, "    {} {}", filter.name, grammar.join(" "))?;
        for param in filter.params {
            writeln!(out, "      {:<10} {}", param.name, param.description)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub struct CliApp<B> {
    backend: B,
}

impl<B: SoundBackend> CliApp<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run one invocation and return the process exit status. Help goes to
    /// `out`, the single diagnostic line to `err`.
    pub fn run(&mut self, args: &[OsString], out: &mut dyn Write, err: &mut dyn Write) -> u8 {
        let invocation = match parse_args(args) {
            Command::Usage => {
                if let Err(e) = print_usage(out) {
                    log::warn!("failed to print usage: {}", e);
                }
                return EXIT_SUCCESS;
            }
            Command::Run(invocation) => invocation,
        };

        match self.process(&invocation) {
            Ok(()) => EXIT_SUCCESS,
            Err(error) => {
                if error.shows_usage() {
                    let _ = print_usage(out);
                }
                let _ = writeln!(err, "Error: {}", error);
                if let Some(source) = std::error::Error::source(&error) {
                    log::debug!("caused by: {}", source);
                }
                EXIT_FAILURE
            }
        }
    }

    fn process(&mut self, invocation: &CommandInvocation) -> Result<()> {
        let filter = filters::resolve(&invocation.filter_name)
            .ok_or_else(|| Error::UnknownFilter(invocation.filter_name.clone()))?;
        let params = bind_parameters(invocation, filter)?;
        log::debug!("{} bound to {:?}", filter.name, params.as_slice());

        pipeline::execute(
            &mut self.backend,
            &invocation.input_path,
            &invocation.output_path,
            filter,
            &params,
        )
    }
}

impl Default for CliApp<WavBackend> {
    fn default() -> Self {
        Self::new(WavBackend)
    }
}

pub fn run_cli() -> ExitCode {
    let args: Vec<OsString> = env::args_os().collect();

    let mut app = CliApp::<WavBackend>::default();
    let status = app.run(&args, &mut io::stdout().lock(), &mut io::stderr().lock());
    ExitCode::from(status)
}
