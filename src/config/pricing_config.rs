//! Pricing Configuration - dataset columns, optimizer range and output paths
//!
//! Every field has a serde default, so an empty TOML file (or no file at all)
//! yields settings matching the retail price dataset layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::CatalogMode;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "PRICING_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pricing.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an analysis / optimization run.
///
/// Load with `PricingConfig::load()` which searches:
/// 1. `$PRICING_CONFIG` env var
/// 2. `./pricing.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Dataset location
    #[serde(default)]
    pub data: DataConfig,

    /// Dataset column names
    #[serde(default)]
    pub columns: ColumnMapping,

    /// Optimizer settings
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Exploratory report settings
    #[serde(default)]
    pub exploration: ExplorationConfig,

    /// Output files
    #[serde(default)]
    pub output: OutputConfig,
}

impl PricingConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PRICING_CONFIG` environment variable
    /// 2. `./pricing.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded pricing config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded pricing config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings; they never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Pricing config saved");
        Ok(())
    }

    /// Coefficient-table key holding the elasticity.
    ///
    /// The fit names the price coefficient after `columns.price`, so that is
    /// the key unless `optimizer.elasticity_key` overrides it.
    pub fn elasticity_key(&self) -> &str {
        self.optimizer
            .elasticity_key
            .as_deref()
            .unwrap_or(&self.columns.price)
    }

    /// Validate value ranges and required names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let r = self.optimizer.price_change_range;
        if !r.is_finite() || r <= 0.0 || r > 1.0 {
            errors.push(format!(
                "optimizer.price_change_range = {r} must be in (0, 1]"
            ));
        }
        match self.optimizer.elasticity_key.as_deref() {
            Some(key) if key.trim().is_empty() => {
                errors.push("optimizer.elasticity_key must not be empty".to_string());
            }
            Some(key) if key != self.columns.price => {
                warn!(
                    elasticity_key = key,
                    price_column = %self.columns.price,
                    "optimizer.elasticity_key differs from columns.price; fitted coefficients will not contain it"
                );
            }
            _ => {}
        }

        let c = &self.columns;
        for (name, value) in [
            ("columns.product_id", &c.product_id),
            ("columns.price", &c.price),
            ("columns.quantity", &c.quantity),
            ("columns.category", &c.category),
            ("columns.date", &c.date),
            ("columns.date_format", &c.date_format),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{name} must not be empty"));
            }
        }

        if self.exploration.histogram_bins == 0 {
            errors.push("exploration.histogram_bins must be > 0".to_string());
        }
        if self.exploration.histogram_width == 0 {
            errors.push("exploration.histogram_width must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Data
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Sales dataset CSV
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/raw/retail_price.csv")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Names of the dataset columns each analysis step reads.
///
/// `price` and `quantity` are also the regressand / price regressor of the
/// elasticity model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_product_id_column")]
    pub product_id: String,
    #[serde(default = "default_price_column")]
    pub price: String,
    #[serde(default = "default_quantity_column")]
    pub quantity: String,
    #[serde(default = "default_category_column")]
    pub category: String,
    #[serde(default = "default_date_column")]
    pub date: String,
    /// chrono format string for the date column
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_total_sales_column")]
    pub total_sales: String,
    #[serde(default = "default_freight_column")]
    pub freight: String,
    #[serde(default = "default_weekday_column")]
    pub weekday: String,
    #[serde(default = "default_weekend_column")]
    pub weekend: String,
}

fn default_product_id_column() -> String { "product_id".to_string() }
fn default_price_column() -> String { "unit_price".to_string() }
fn default_quantity_column() -> String { "qty".to_string() }
fn default_category_column() -> String { "product_category_name".to_string() }
fn default_date_column() -> String { "month_year".to_string() }
fn default_date_format() -> String { "%d-%m-%Y".to_string() }
fn default_total_sales_column() -> String { "total_price".to_string() }
fn default_freight_column() -> String { "freight_price".to_string() }
fn default_weekday_column() -> String { "weekday".to_string() }
fn default_weekend_column() -> String { "weekend".to_string() }

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            product_id: default_product_id_column(),
            price: default_price_column(),
            quantity: default_quantity_column(),
            category: default_category_column(),
            date: default_date_column(),
            date_format: default_date_format(),
            total_sales: default_total_sales_column(),
            freight: default_freight_column(),
            weekday: default_weekday_column(),
            weekend: default_weekend_column(),
        }
    }
}

// ============================================================================
// Optimizer
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Allowed fractional price change (0.1 = ±10%)
    #[serde(default = "default_price_change_range")]
    pub price_change_range: f64,

    /// Coefficient-table key holding the elasticity (default: `columns.price`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticity_key: Option<String>,

    /// How dataset rows become catalog entries
    #[serde(default)]
    pub catalog: CatalogMode,
}

fn default_price_change_range() -> f64 {
    crate::optimizer::DEFAULT_PRICE_CHANGE_RANGE
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            price_change_range: default_price_change_range(),
            elasticity_key: None,
            catalog: CatalogMode::default(),
        }
    }
}

// ============================================================================
// Exploration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Rows shown in the overview preview
    #[serde(default = "default_head_rows")]
    pub head_rows: usize,

    /// Equal-width bins per histogram
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Character width of the longest histogram bar
    #[serde(default = "default_histogram_width")]
    pub histogram_width: usize,
}

fn default_head_rows() -> usize { 5 }
fn default_histogram_bins() -> usize { 30 }
fn default_histogram_width() -> usize { 40 }

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            head_rows: default_head_rows(),
            histogram_bins: default_histogram_bins(),
            histogram_width: default_histogram_width(),
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Serialization format of the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    #[serde(default = "default_coefficients_path")]
    pub coefficients_path: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,
}

fn default_results_path() -> PathBuf {
    PathBuf::from("data/processed/optimized_prices.csv")
}
fn default_coefficients_path() -> PathBuf {
    PathBuf::from("data/processed/coefficients.csv")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            coefficients_path: default_coefficients_path(),
            format: OutputFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = PricingConfig::from_toml_str("").unwrap();
        assert_eq!(config.columns.price, "unit_price");
        assert_eq!(config.columns.quantity, "qty");
        assert!((config.optimizer.price_change_range - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.optimizer.catalog, CatalogMode::Rows);
        assert_eq!(config.output.format, OutputFormat::Csv);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = PricingConfig::from_toml_str(
            r#"
[optimizer]
price_change_range = 0.25
catalog = "per_product"
"#,
        )
        .unwrap();
        assert!((config.optimizer.price_change_range - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.optimizer.catalog, CatalogMode::PerProduct);
        assert_eq!(config.elasticity_key(), "unit_price");
    }

    #[test]
    fn test_elasticity_key_follows_price_column() {
        let config = PricingConfig::from_toml_str("[columns]\nprice = \"price_usd\"\n").unwrap();
        assert!(config.optimizer.elasticity_key.is_none());
        assert_eq!(config.elasticity_key(), "price_usd");

        let config = PricingConfig::from_toml_str(
            "[columns]\nprice = \"price_usd\"\n\n[optimizer]\nelasticity_key = \"list_price\"\n",
        )
        .unwrap();
        assert_eq!(config.elasticity_key(), "list_price");
    }

    #[test]
    fn test_range_out_of_bounds_fails_validation() {
        let err = PricingConfig::from_toml_str(
            r#"
[optimizer]
price_change_range = 1.5
"#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors[0].contains("price_change_range"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_column_name_fails_validation() {
        let mut config = PricingConfig::default();
        config.columns.price = "  ".to_string();
        config.exploration.histogram_bins = 0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_toml_roundtrip_of_defaults_validates() {
        let toml_str = PricingConfig::default().to_toml().unwrap();
        let parsed = PricingConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.columns.date_format, "%d-%m-%Y");
    }

    #[test]
    fn test_bad_type_is_parse_error() {
        let err = PricingConfig::from_toml_str("[optimizer]\nprice_change_range = \"wide\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
    }
}
