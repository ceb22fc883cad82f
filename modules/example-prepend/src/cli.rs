//! Command-line arguments

use chimera_core::ModuleError;
use clap::Parser;

/// Arguments accepted after the module name
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "ExamplePrepend", no_binary_name = true)]
pub struct PrependArgs {
    /// The input string
    #[arg(short, long)]
    pub input: String,

    /// The prefix
    #[arg(short, long)]
    pub prefix: String,
}

impl PrependArgs {
    /// Parse residual arguments
    pub fn parse_args(args: &[String]) -> Result<Self, ModuleError> {
        Self::try_parse_from(args)
            .map_err(|e| ModuleError::invalid_arguments(format!("Error parsing cli args: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_short_and_long() {
        let parsed = PrependArgs::parse_args(&args(&["-i", "lower", "--prefix", "prefix"])).unwrap();
        assert_eq!(
            parsed,
            PrependArgs {
                input: "lower".to_string(),
                prefix: "prefix".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_required_argument() {
        let err = PrependArgs::parse_args(&args(&["--input", "lower"])).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidArguments(_)));
    }

    #[test]
    fn test_unknown_argument() {
        let result = PrependArgs::parse_args(&args(&["-i", "a", "-p", "b", "--shout"]));
        assert!(result.is_err());
    }
}
