use clap::Shell;
use std::{env, path::PathBuf};

#[path = "src/cli.rs"]
mod cli;

fn main() {
    let mut cli = cli::generate_cli();
    let mut out_dir = match env::var_os("OUT_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => return,
    };
    let _ = out_dir.pop();
    let _ = out_dir.pop();
    let _ = out_dir.pop();

    cli.gen_completions("stack-analyzer", Shell::Bash, &out_dir);
    cli.gen_completions("stack-analyzer", Shell::Fish, &out_dir);
    cli.gen_completions("stack-analyzer", Shell::Zsh, &out_dir);

    println!("cargo:rerun-if-changed=src/cli.rs");
}
