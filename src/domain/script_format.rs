use std::str::FromStr;

use anyhow::{Result, anyhow};

/// How generated batches are written out by the command-line tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptFormat {
    /// Commented parameter listing followed by the batch statement.
    #[default]
    Sql,
    /// One JSON object per batch with `sql` and `params`.
    JsonLines,
}

impl ScriptFormat {
    pub const ALL: [ScriptFormat; 2] = [ScriptFormat::Sql, ScriptFormat::JsonLines];

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptFormat::Sql => "sql",
            ScriptFormat::JsonLines => "jsonl",
        }
    }
}

impl std::fmt::Display for ScriptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sql" => Ok(ScriptFormat::Sql),
            "jsonl" | "json_lines" | "ndjson" => Ok(ScriptFormat::JsonLines),
            _ => Err(anyhow!(
                "Unsupported output format: {value}. Available values: sql,jsonl"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScriptFormat;

    #[test]
    fn parses_known_names_and_aliases() {
        assert_eq!("SQL".parse::<ScriptFormat>().ok(), Some(ScriptFormat::Sql));
        assert_eq!(" ndjson ".parse::<ScriptFormat>().ok(), Some(ScriptFormat::JsonLines));
        for format in ScriptFormat::ALL {
            assert_eq!(format.as_str().parse::<ScriptFormat>().ok(), Some(format));
        }
    }

    #[test]
    fn rejects_unknown_name() {
        let error = "csv".parse::<ScriptFormat>().expect_err("csv should be rejected");
        assert!(error.to_string().contains("Available values: sql,jsonl"));
    }
}
