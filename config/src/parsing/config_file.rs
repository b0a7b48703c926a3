//! Parsing logic for a separate withdrawer config file

use std::fs;

use clap::Parser;
use toml::{Value, map::Map};

use crate::{Cli, WithdrawerConfig, parsing::parse_config_from_args};

/// The CLI argument name for the config file
const CONFIG_FILE_ARG: &str = "--config-file";

/// Parse args from a config file
pub(crate) fn config_file_args(cli_args: &[String]) -> Result<Vec<String>, String> {
    // If we find "--config-file", the next argument is the file to read from
    let Some(index) = cli_args.iter().position(|arg| arg == CONFIG_FILE_ARG) else {
        return Ok(vec![]);
    };

    let path = cli_args
        .get(index + 1)
        .ok_or_else(|| format!("{CONFIG_FILE_ARG} requires a path"))?;
    read_config_file(path)
}

/// Parse a config entirely from a file
pub fn parse_config_from_file(path: &str) -> Result<WithdrawerConfig, String> {
    let mut file_args = read_config_file(path)?;
    file_args.insert(0, "dummy-program-name".to_string());
    let cli = Cli::try_parse_from(file_args).map_err(|e| e.to_string())?;
    parse_config_from_args(cli)
}

/// Parse a config file
fn read_config_file(path: &str) -> Result<Vec<String>, String> {
    // Read in the config file
    let file_contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    let config_kv_pairs: Map<_, _> =
        toml::from_str(&file_contents).map_err(|err| err.to_string())?;

    let mut config_file_args: Vec<String> = Vec::with_capacity(config_kv_pairs.len());
    for (toml_key, value) in config_kv_pairs.iter() {
        // Format the TOML key into --key
        let cli_arg = format!("--{}", toml_key);
        let cli_values = parse_toml_value(cli_arg, value)?;
        config_file_args.extend(cli_values);
    }

    Ok(config_file_args)
}

// ----------------
// | TOML Parsing |
// ----------------

/// Parse a toml value into a list of strings to append to the CLI args
fn parse_toml_value(cli_arg: String, val: &Value) -> Result<Vec<String>, String> {
    let values: Vec<String> = match val {
        Value::Boolean(b) => toml_boolean_to_args(cli_arg, *b),
        Value::Array(arr) => toml_array_to_args(&cli_arg, arr)?,
        x => toml_value_to_args(cli_arg, x)?,
    };

    Ok(values)
}

/// Parse a toml boolean into a string that is CLI compatible
///
/// This will be "--key" if the boolean is true, otherwise it will be empty
fn toml_boolean_to_args(cli_arg: String, b: bool) -> Vec<String> {
    if b { vec![cli_arg] } else { vec![] }
}

/// Parse a toml array into a string that is CLI compatible
///
/// This will be "--arg val1 --arg val2 --arg val3"
fn toml_array_to_args(cli_arg: &str, arr: &[Value]) -> Result<Vec<String>, String> {
    let mut res: Vec<String> = Vec::new();
    for val in arr.iter() {
        res.push(cli_arg.to_string());
        res.push(toml_value_to_string(val)?);
    }

    Ok(res)
}

/// Parse a toml value into a string that is CLI compatible
fn toml_value_to_args(cli_arg: String, val: &Value) -> Result<Vec<String>, String> {
    let value_str = toml_value_to_string(val)?;
    Ok(vec![cli_arg, value_str])
}

/// Helper method to convert a toml value to a string
fn toml_value_to_string(val: &Value) -> Result<String, String> {
    Ok(match val {
        Value::String(val) => val.clone(),
        Value::Integer(val) => format!("{:?}", val),
        Value::Float(val) => format!("{:?}", val),
        Value::Boolean(val) => format!("{:?}", val),
        _ => {
            return Err(format!("unsupported config value: {val}"));
        },
    })
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use common::types::chain::Chain;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::parsing::assemble_args;

    /// Write a config file with the given contents
    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    /// A config file setting every kind of value
    const CONFIG: &str = r#"
        token = "hei-4-2-abcdef"
        pool-address = "0x00000000000000000000000000000000000000aa"
        chain = "sepolia"
        block-polling-interval-ms = 250
        use-relayer = true
        relayer-url = "http://localhost:3000/relay"
        json-logs = false
    "#;

    #[test]
    fn test_toml_to_args() {
        let file = write_config(CONFIG);
        let args = read_config_file(file.path().to_str().unwrap()).unwrap();

        assert!(args.contains(&"--use-relayer".to_string()));
        assert!(!args.contains(&"--json-logs".to_string()));
        let idx = args.iter().position(|a| a == "--block-polling-interval-ms").unwrap();
        assert_eq!(args[idx + 1], "250");
    }

    #[test]
    fn test_parse_config_from_file() {
        let file = write_config(CONFIG);
        let config = parse_config_from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.token, "hei-4-2-abcdef");
        assert_eq!(config.chain, Chain::Sepolia);
        assert!(config.use_relayer);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_command_line_takes_precedence() {
        let file = write_config(CONFIG);
        let path = file.path().to_str().unwrap().to_string();
        let cli_args = vec![
            "withdrawer".to_string(),
            "--config-file".to_string(),
            path,
            "--chain".to_string(),
            "mainnet".to_string(),
        ];

        let full_args = assemble_args(cli_args).unwrap();
        assert_eq!(full_args[0], "withdrawer");

        let cli = Cli::try_parse_from(full_args).unwrap();
        let config = parse_config_from_args(cli).unwrap();
        assert_eq!(config.chain, Chain::Mainnet);
        assert_eq!(config.token, "hei-4-2-abcdef");
    }

    #[test]
    fn test_missing_config_file_path() {
        let args = vec!["withdrawer".to_string(), CONFIG_FILE_ARG.to_string()];
        assert!(config_file_args(&args).is_err());
    }
}
