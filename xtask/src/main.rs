//! Build automation tasks for BioDataFuse
//!
//! - `generate-cli-docs`: write the `bdf` command reference from the clap definitions

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for BioDataFuse", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<bdf_cli::Cli>();

    let content = format!(
        r#"# bdf CLI Reference

Generated from the CLI source code on {}.

## Quick Start

```bash
# Annotate two genes with WikiPathways and Open Targets locations
bdf query --ids "BRCA1,TP53" --id-type HGNC \
  --source WikiPathway \
  --source "OpenTarget:Gene location,Drug interactions" \
  --output-dir results

# See what can be selected
bdf sources
bdf id-types
```

## Configuration

| Variable | Purpose |
|----------|---------|
| `BDF_BRIDGEDB_URL` | Identifier mapping service |
| `BDF_WIKIPATHWAYS_SPARQL_URL` | WikiPathways SPARQL endpoint |
| `BDF_DISGENET_API_URL` | DisGeNET REST API |
| `BDF_DISGENET_API_KEY` | DisGeNET API key (required for DisGeNet) |
| `BDF_OPENTARGETS_URL` | Open Targets GraphQL endpoint |
| `BDF_CYTOSCAPE_URL` | CyREST endpoint of a running Cytoscape |
| `BDF_SPECIES` | Species for identifier mapping |
| `BDF_FETCH_TIMEOUT_SECS` | Per-source fetch timeout |
| `BDF_HTTP_TIMEOUT_SECS` | HTTP request timeout |
| `BDF_CONCURRENCY` | Sources fetched at the same time |

Variables may also be set in a `.env` file in the working directory.

## Commands

{}

---

*To update, run `cargo run -p xtask -- generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content).with_context(|| format!("Failed to write {}", file_path.display()))?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());
    Ok(())
}
