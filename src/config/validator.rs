use super::{ConfigError, Variables};

pub struct VariablesValidator;

impl VariablesValidator {
    pub fn validate(variables: &Variables) -> Result<(), ConfigError> {
        let etl = &variables.etl;

        for (field, value) in [
            ("etl.source_bucket", &etl.source_bucket),
            ("etl.raw_data_bucket", &etl.raw_data_bucket),
            ("etl.temps3dir", &etl.temps3dir),
            ("etl.jdbc.db", &etl.jdbc.db),
            ("etl.jdbc.schema", &etl.jdbc.schema),
            ("etl.jdbc.url", &etl.jdbc.url),
            ("etl.jdbc.user_name", &etl.jdbc.user_name),
            ("access.access_key", &variables.access.access_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }

        if etl.source_bucket == etl.raw_data_bucket {
            return Err(ConfigError::invalid(
                "etl.raw_data_bucket",
                "must differ from etl.source_bucket",
            ));
        }

        if etl.jdbc.port == 0 {
            return Err(ConfigError::invalid("etl.jdbc.port", "must be greater than 0"));
        }

        Self::validate_identifier("etl.jdbc.schema", &etl.jdbc.schema)?;
        for (feature, table) in &etl.jdbc.dbtable {
            Self::validate_identifier(&format!("etl.jdbc.dbtable.{feature}"), table)?;
        }

        let features = variables.features();
        if features.is_empty() {
            return Err(ConfigError::invalid(
                "etl.features",
                "no features configured (etl.features and etl.jdbc.dbtable are both empty)",
            ));
        }
        for feature in &features {
            if variables.table_for(feature).is_none() {
                return Err(ConfigError::invalid(
                    "etl.features",
                    format!("feature '{feature}' has no table in etl.jdbc.dbtable"),
                ));
            }
            if feature.is_empty() || feature.contains(['/', '\'', '\\']) {
                return Err(ConfigError::invalid(
                    "etl.features",
                    format!("feature '{feature}' cannot be used as an object key"),
                ));
            }
        }

        if variables.etl.extractor.program.trim().is_empty() {
            return Err(ConfigError::invalid(
                "etl.extractor.program",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Schema and table names are spliced into the COPY statement verbatim
    fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
        let valid = !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if valid {
            Ok(())
        } else {
            Err(ConfigError::invalid(
                field,
                format!("'{value}' is not a plain SQL identifier"),
            ))
        }
    }
}
