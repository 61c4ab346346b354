//! Command-line argument definitions for the Drafter CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the draft and the source to render, the
//! sketch arguments, the output format and destination, configuration file
//! selection, and logging verbosity.

use clap::Parser;

use drafter::{Value, export::Options};

/// Command-line arguments for the Drafter sketch tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a document, a draft directory, or its index.json
    #[arg(help = "Path to the input draft")]
    pub input: String,

    /// Source to render. Defaults to the only source of the draft, or the
    /// source named after the input.
    #[arg(short, long)]
    pub source: Option<String>,

    /// Positional sketch argument; repeat for each parameter
    #[arg(short, long = "arg", value_name = "VALUE", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Output format (svg, json, debug)
    #[arg(short, long, default_value = "svg")]
    pub format: String,

    /// Render option as KEY=VALUE (padding, background, precision, pretty)
    #[arg(short = 'O', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
    pub options: Vec<(String, String)>,

    /// Path to the output file. Writes to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Sketch arguments as values.
    pub fn values(&self) -> Vec<Value> {
        self.args.iter().map(|arg| parse_value(arg)).collect()
    }

    pub fn render_options(&self) -> Options {
        self.options.iter().cloned().collect()
    }
}

fn parse_option(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, found `{s}`"))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Read a command-line argument as a number, boolean or null, falling back
/// to a string.
fn parse_value(arg: &str) -> Value {
    match arg {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => arg
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::from(arg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let args = Args::try_parse_from([
            "drafter", "part.yaml", "-a", "3", "--arg", "null", "-a", "red", "-O", "padding=4",
            "-f", "json",
        ])
        .unwrap();

        assert_eq!(
            args.values(),
            vec![Value::Number(3.0), Value::Null, Value::from("red")]
        );
        assert_eq!(args.render_options().get("padding").map(String::as_str), Some("4"));
        assert_eq!(args.format, "json");
        assert_eq!(args.output, None);
    }

    #[test]
    fn test_option_without_value_is_rejected() {
        assert!(Args::try_parse_from(["drafter", "part.yaml", "-O", "padding"]).is_err());
    }
}
