use clap::Args;
use miette::{IntoDiagnostic, Result};
use ta_gaf::GafFile;

use super::Source;

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    source: Source,

    /// Pretty print the JSON output
    #[arg(short, long, default_value_t = false)]
    pretty: bool,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let data = self.source.load()?;
        let file = GafFile::parse(&data)?;

        let json = if self.pretty {
            serde_json::to_string_pretty(file.entries())
        } else {
            serde_json::to_string(file.entries())
        }
        .into_diagnostic()?;

        println!("{json}");
        Ok(())
    }
}
