use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    name = "flyway",
    version,
    about = "Runs Flyway database migrations, downloading Flyway on demand",
    after_help = "See Flyway's configuration options at https://flywaydb.org/documentation/commandline/"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: FlywayCommand,

    /// A JSON or TOML file containing configuration
    #[arg(short = 'c', long = "configfile", value_name = "FILE", global = true)]
    pub configfile: Option<PathBuf>,

    /// Enable detailed debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Connection timeout in seconds for downloads (0 disables it)
    #[arg(long, global = true, default_value = "30")]
    pub connect_timeout: u64,

    /// Read timeout in seconds for downloads (0 disables it)
    #[arg(long, global = true, default_value = "60")]
    pub read_timeout: u64,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlywayCommand {
    /// Migrates the schema to the latest version. Flyway will create the metadata table automatically if it doesn't exist.
    Migrate,

    /// Drops all objects (tables, views, procedures, triggers, ...) in the configured schemas. The schemas are cleaned in the order specified by the schemas property.
    Clean,

    /// Prints the details and status information about all the migrations.
    Info,

    /// Validate applied migrations against resolved ones (on the filesystem or classpath) to detect accidental changes that may prevent the schema(s) from being recreated exactly.
    #[command(long_about = "Validate applied migrations against resolved ones (on the filesystem or classpath) \
to detect accidental changes that may prevent the schema(s) from being recreated exactly.

Validation fails if
  - differences in migration names, types or checksums are found
  - versions have been applied that aren't resolved locally anymore
  - versions have been resolved that haven't been applied yet")]
    Validate,

    /// Baselines an existing database, excluding all migrations up to and including baselineVersion.
    Baseline,

    /// Repairs the Flyway metadata table.
    #[command(long_about = "Repairs the Flyway metadata table. This will perform the following actions:

  - Remove any failed migrations on databases without DDL transactions
    (User objects left behind must still be cleaned up manually)
  - Correct wrong checksums")]
    Repair,
}

impl FlywayCommand {
    /// Sub-command name as Flyway expects it
    pub fn name(self) -> &'static str {
        match self {
            FlywayCommand::Migrate => "migrate",
            FlywayCommand::Clean => "clean",
            FlywayCommand::Info => "info",
            FlywayCommand::Validate => "validate",
            FlywayCommand::Baseline => "baseline",
            FlywayCommand::Repair => "repair",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_configfile_and_command() {
        let args = CliArgs::try_parse_from(["flyway", "-c", "conf/flyway.toml", "migrate"]).unwrap();
        assert_eq!(args.command, FlywayCommand::Migrate);
        assert_eq!(args.configfile, Some(PathBuf::from("conf/flyway.toml")));
        assert_eq!(args.connect_timeout, 30);

        let args = CliArgs::try_parse_from(["flyway", "info", "--configfile", "flyway.json"]).unwrap();
        assert_eq!(args.command, FlywayCommand::Info);
        assert_eq!(args.configfile, Some(PathBuf::from("flyway.json")));
    }

    #[test]
    fn test_all_commands() {
        for name in ["migrate", "clean", "info", "validate", "baseline", "repair"] {
            let args = CliArgs::try_parse_from(["flyway", name]).unwrap();
            assert_eq!(args.command.name(), name);
        }
        assert!(CliArgs::try_parse_from(["flyway", "undo"]).is_err());
    }
}
