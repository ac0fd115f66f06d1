//! Quill CLI - slug generation from the terminal
//!
//! Uses the remote strategy when a generation credential is present in the
//! environment, the local fallback transform otherwise.

mod cli;

use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};

use quill_core::{SlugError, SlugService};

use crate::cli::{Cli, Commands, CompletionShell};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), SlugError> {
    match cli.command {
        Commands::Slug { title, local } => {
            let title = title.join(" ");
            let service = if local {
                SlugService::local()?
            } else {
                SlugService::from_env()?
            };
            let slug = service.generate_slug(&title).await?;
            println!("{slug}");
        }
        Commands::Completions { shell } => {
            print_completions(shell);
        }
    }
    Ok(())
}

fn print_completions(shell: CompletionShell) {
    let mut command = Cli::command();
    let mut stdout = io::stdout();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut command, "quill", &mut stdout),
        CompletionShell::Zsh => generate(shells::Zsh, &mut command, "quill", &mut stdout),
        CompletionShell::Fish => generate(shells::Fish, &mut command, "quill", &mut stdout),
        CompletionShell::Powershell => {
            generate(shells::PowerShell, &mut command, "quill", &mut stdout);
        }
        CompletionShell::Elvish => generate(shells::Elvish, &mut command, "quill", &mut stdout),
    }
}
