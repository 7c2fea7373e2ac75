pub mod grade;
pub mod init;
pub mod leaderboard;
pub mod stats;
pub mod submit;
pub mod validate;

/// Output formats shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn parse(format: &str) -> anyhow::Result<Self> {
        match format {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => anyhow::bail!("unknown format '{other}', expected text or json"),
        }
    }
}
