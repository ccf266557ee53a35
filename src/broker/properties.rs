//! Flat `key=value` properties files, as shipped for Kafka clients.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a properties file.
#[derive(Debug, Error)]
pub enum PropertiesError {
    /// The file could not be read.
    #[error("Failed to read properties file {path}: {source}")]
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A non-comment line had no `=` or `:` separator.
    #[error("Malformed properties line {line}: {content}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// Offending line, trimmed.
        content: String,
    },
}

/// Parsed key/value properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Read and parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self, PropertiesError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PropertiesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let properties = Self::parse(&contents)?;
        tracing::debug!(
            path = %path.display(),
            keys = properties.entries.len(),
            "Loaded broker properties"
        );
        Ok(properties)
    }

    /// Parse properties text. Blank lines and lines starting with `#` or `!` are ignored; the
    /// first `=` or `:` separates key from value; later duplicates win.
    pub fn parse(contents: &str) -> Result<Self, PropertiesError> {
        let mut entries = BTreeMap::new();
        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some(split) = line.find(['=', ':']) else {
                return Err(PropertiesError::Malformed {
                    line: index + 1,
                    content: line.to_string(),
                });
            };
            let key = line[..split].trim();
            if key.is_empty() {
                return Err(PropertiesError::Malformed {
                    line: index + 1,
                    content: line.to_string(),
                });
            }
            let value = line[split + 1..].trim();
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(Self { entries })
    }

    /// Value for `key`, if present and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the file held no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_confluent_style_file() {
        let properties = Properties::parse(
            "# Required connection configs for Kafka producer\n\
             bootstrap.servers=pkc-123.us-east-1.aws.confluent.cloud:9092\n\
             security.protocol = SASL_SSL\n\
             sasl.jaas.config=org.apache.kafka.common.security.plain.PlainLoginModule required username='K' password='S';\n\
             ! legacy comment\n\
             \n\
             rest.endpoint: https://pkc-123.confluent.cloud:443\n",
        )
        .expect("properties");

        assert_eq!(properties.len(), 4);
        assert_eq!(properties.get("security.protocol"), Some("SASL_SSL"));
        assert_eq!(
            properties.get("rest.endpoint"),
            Some("https://pkc-123.confluent.cloud:443")
        );
        assert!(
            properties
                .get("sasl.jaas.config")
                .is_some_and(|value| value.ends_with("password='S';"))
        );
    }

    #[test]
    fn empty_values_read_as_missing() {
        let properties = Properties::parse("cluster.id=\n").expect("properties");
        assert_eq!(properties.get("cluster.id"), None);
        assert!(!properties.is_empty());
    }

    #[test]
    fn rejects_lines_without_separator() {
        let error = Properties::parse("a=1\njust-a-key\n").expect_err("malformed");
        assert!(matches!(error, PropertiesError::Malformed { line: 2, .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = Properties::load(Path::new("/definitely/not/here.properties"))
            .expect_err("missing file");
        assert!(matches!(error, PropertiesError::Io { .. }));
    }
}
