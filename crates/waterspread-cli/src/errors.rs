use console::style;
use std::fmt;
use std::path::Path;
use waterspread_core::WaterspreadError;

/// Error with context and suggestions for the user
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn scene_required() -> CliError {
    CliError::new("No scene file for the memory backend")
        .with_context("The memory backend evaluates queries over a local scene file.")
        .with_suggestion("Pass a scene file: --scene scenes.json")
        .with_suggestion("Or use the remote service: --backend http --endpoint http://host:8080")
        .with_help("Run: waterspread --help")
}

pub fn region_not_found(path: &Path) -> CliError {
    CliError::new("Region file not found")
        .with_context(format!("The specified file does not exist.\n\nPath: {}", path.display()))
        .with_suggestion("Check the file path and try again")
        .with_suggestion("Use absolute path or path relative to current directory")
}

pub fn unsupported_format(extension: &str, supported: &[String]) -> CliError {
    CliError::new(format!("Unsupported file format '.{}'", extension))
        .with_context(format!("Supported formats: {}", supported.join(", ")))
        .with_suggestion("Export the boundary as GeoJSON or as a zipped shapefile")
}

pub fn invalid_region(reason: &str) -> CliError {
    CliError::new("Region file could not be used")
        .with_context(format!("Reason: {}", reason))
        .with_suggestion("The file must contain at least one Polygon or MultiPolygon feature")
        .with_suggestion("Shapefiles need their .shx and .dbf files next to the .shp")
}

pub fn crs_mismatch(found: &str) -> CliError {
    CliError::new("Region is not in geographic coordinates")
        .with_context(format!("Found {}, expected EPSG:4326 (WGS 84).", found))
        .with_suggestion("Reproject the file to EPSG:4326 before uploading")
}

pub fn invalid_date(value: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid date '{}'", value))
        .with_context(reason.to_string())
        .with_suggestion("Use YYYY-MM-DD, e.g. --start 2016-03-01 --end 2022-03-31")
        .with_help("Run: waterspread run --help")
}

pub fn backend_unavailable(reason: &str, remediation: &str) -> CliError {
    CliError::new("Imagery backend unavailable")
        .with_context(format!("Error: {}", reason))
        .with_suggestion(remediation.to_string())
        .with_help("Run: waterspread config")
}

pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check waterspread.toml and WATERSPREAD_* environment variables")
        .with_help("Run: waterspread config")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let error = match error.downcast::<CliError>() {
        Ok(cli_error) => return cli_error,
        Err(error) => error,
    };

    match error.downcast_ref::<WaterspreadError>() {
        Some(WaterspreadError::FileNotFound { path }) => region_not_found(path),
        Some(WaterspreadError::UnsupportedFormat { extension, supported }) => {
            unsupported_format(extension, supported)
        }
        Some(WaterspreadError::CrsMismatch { found, .. }) => crs_mismatch(found),
        Some(WaterspreadError::InvalidDate { value, reason }) => invalid_date(value, reason),
        Some(WaterspreadError::BackendUnavailable { reason, remediation }) => {
            backend_unavailable(reason, remediation)
        }
        Some(WaterspreadError::ConfigInvalid { key, reason }) => invalid_config(key, reason),
        Some(e) if e.is_input_error() => invalid_region(&e.to_string()),
        _ => CliError::new(format!("{:#}", error)),
    }
}
