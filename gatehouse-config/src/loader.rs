// Configuration file loaders

use crate::{ConfigError, MapSource, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format from a path. `.env` and `*.env` files are dotenv files.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name == ".env" || name.starts_with(".env.") {
            return Some(FileFormat::Env);
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Parses configuration files into flat `UPPER_SNAKE` key-value maps.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from the file name
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::detect(path).ok_or_else(|| {
            ConfigError::LoadError(format!("Unsupported format: {}", path.display()))
        })?;
        Ok(Self::new(format))
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
        let content = fs::read_to_string(path.as_ref())?;
        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        match self.format {
            FileFormat::Toml => parse_toml(content),
            FileFormat::Env => parse_env(content),
        }
    }
}

/// Parse dotenv content without touching the process environment.
fn parse_env(content: &str) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();
    for item in dotenvy::from_read_iter(content.as_bytes()) {
        let (key, value) = item?;
        values.insert(key, value);
    }
    Ok(values)
}

/// Flatten TOML tables: `[google] client_id = "x"` becomes `GOOGLE_CLIENT_ID=x`.
fn parse_toml(content: &str) -> Result<HashMap<String, String>> {
    let table: toml::Table = content
        .parse()
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    let mut values = HashMap::new();
    flatten_table("", &table, &mut values);
    Ok(values)
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let key = key.to_ascii_uppercase().replace(['-', '.'], "_");
        let full_key = if prefix.is_empty() {
            key
        } else {
            format!("{}_{}", prefix, key)
        };

        match value {
            toml::Value::Table(inner) => flatten_table(&full_key, inner, out),
            other => {
                if let Some(scalar) = scalar_to_string(other) {
                    out.insert(full_key, scalar);
                }
            }
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
            Some(parts.join(","))
        }
        toml::Value::Table(_) => None,
    }
}

impl MapSource {
    /// Load a `.env` or `.toml` file, picking the parser from the file name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let loader = ConfigLoader::auto(path.as_ref())?;
        Ok(Self::from_pairs(loader.load_file(path)?))
    }

    pub fn from_dotenv(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_pairs(
            ConfigLoader::new(FileFormat::Env).load_file(path)?,
        ))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_pairs(
            ConfigLoader::new(FileFormat::Toml).load_file(path)?,
        ))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(Self::from_pairs(parse_toml(content)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigSource;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::detect(Path::new(".env")), Some(FileFormat::Env));
        assert_eq!(
            FileFormat::detect(Path::new("/etc/app/.env.production")),
            Some(FileFormat::Env)
        );
        assert_eq!(
            FileFormat::detect(Path::new("providers.TOML")),
            Some(FileFormat::Toml)
        );
        assert_eq!(FileFormat::detect(Path::new("providers.yaml")), None);
    }

    #[test]
    fn test_toml_flattening() {
        let source = MapSource::from_toml_str(
            r#"
            log_level = "debug"

            [google]
            client_id = "gid"
            client-secret = "gsecret"
            callback_url = "http://localhost:3000/oauth/google/callback"

            [apple]
            team_id = "TEAM"
            scopes = ["name", "email"]
            "#,
        )
        .unwrap();

        assert_eq!(source.get("LOG_LEVEL").as_deref(), Some("debug"));
        assert_eq!(source.get("GOOGLE_CLIENT_ID").as_deref(), Some("gid"));
        assert_eq!(source.get("GOOGLE_CLIENT_SECRET").as_deref(), Some("gsecret"));
        assert_eq!(source.get("APPLE_TEAM_ID").as_deref(), Some("TEAM"));
        assert_eq!(source.get("APPLE_SCOPES").as_deref(), Some("name,email"));
    }

    #[test]
    fn test_invalid_toml() {
        let result = MapSource::from_toml_str("[google\nclient_id = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_parse_env_content() {
        let values = ConfigLoader::new(FileFormat::Env)
            .parse("FACEBOOK_CLIENT_ID=fb\n# comment\nFACEBOOK_CLIENT_SECRET=\"quoted value\"\n")
            .unwrap();

        assert_eq!(values.get("FACEBOOK_CLIENT_ID").map(String::as_str), Some("fb"));
        assert_eq!(
            values.get("FACEBOOK_CLIENT_SECRET").map(String::as_str),
            Some("quoted value")
        );
        assert_eq!(values.len(), 2);
    }
}
