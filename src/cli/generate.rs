use clap::Args;
use console::style;
use std::path::PathBuf;

use crate::cli::run_cli_async;
use crate::config::{ConfigOverrides, MANIFEST_FILE, SourceFormat, load_config};
use crate::fs::TokioFileSystem;
use crate::materialize::FileOutcome;
use crate::pipeline::run as run_pipeline;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, value_name = "FILE", help = "Source OpenAPI or Swagger document")]
    pub src: Option<PathBuf>,
    #[arg(long, value_name = "DIR", help = "Directory the client is generated into")]
    pub dst: Option<PathBuf>,
    #[arg(long, help = "Overwrite existing files instead of printing a diff")]
    pub overwrite: bool,
    #[arg(long, value_enum, help = "Source document format [default: openapi]")]
    pub format: Option<SourceFormat>,
    #[arg(
        long,
        value_name = "FILE",
        default_value = MANIFEST_FILE,
        help = "Project manifest holding the apiCodegen settings"
    )]
    pub manifest: PathBuf,
}

pub async fn run(args: GenerateArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: GenerateArgs) -> Result<(), String> {
    let fs = TokioFileSystem;
    let overrides = ConfigOverrides {
        src: args.src,
        dst: args.dst,
        overwrite: args.overwrite.then_some(true),
        format: args.format,
    };

    let config = load_config(&fs, &args.manifest, overrides)
        .await
        .map_err(|err| err.to_string())?;
    let outcomes = run_pipeline(&config, &fs)
        .await
        .map_err(|err| err.to_string())?;

    for outcome in &outcomes {
        print_outcome(outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &FileOutcome) {
    let path = outcome.path().display();
    match outcome {
        FileOutcome::Written { .. } => println!("{} {path}", style("created").green()),
        FileOutcome::Overwritten { .. } => println!("{} {path}", style("overwritten").yellow()),
        FileOutcome::Diffed { diff, .. } if diff.is_empty() => {
            println!("{} {path}", style("unchanged").dim());
        }
        FileOutcome::Diffed { diff, .. } => {
            println!(
                "{} {path} (exists, rerun with --overwrite to replace)",
                style("skipped").cyan()
            );
            print!("{}", colorize_diff(diff));
        }
    }
}

fn colorize_diff(diff: &str) -> String {
    diff.lines()
        .map(|line| {
            let styled = if line.starts_with("+++") || line.starts_with("---") {
                style(line).bold()
            } else if line.starts_with('+') {
                style(line).green()
            } else if line.starts_with('-') {
                style(line).red()
            } else if line.starts_with("@@") {
                style(line).cyan()
            } else {
                style(line)
            };
            format!("{styled}\n")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_keeps_every_line() {
        console::set_colors_enabled(false);
        let diff = "--- a\n+++ a\n@@ -1 +1 @@\n-x\n+y\n";
        assert_eq!(colorize_diff(diff), diff);
    }
}
