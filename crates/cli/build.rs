use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        return;
    };
    let completions_dir = out_dir.join("completions");
    if let Err(e) = fs::create_dir_all(&completions_dir) {
        println!("cargo:warning=Could not create completions directory: {}", e);
        return;
    }

    let mut cmd = clap::Command::new("sgnl")
        .about("Score the signal quality of web pages")
        .arg(clap::arg!(<INPUT> ... "URLs to fetch, local HTML files, or '-' for stdin"))
        .arg(
            clap::arg!(--config <FILE> "Configuration file")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-q --query <QUERY> "Search query the documents were retrieved for"))
        .arg(clap::arg!(--"source-url" <URL> "URL used for the domain lookup of file and stdin input"))
        .arg(clap::arg!(--"force-deep" "Run both extraction strategies and keep the longer text"))
        .arg(clap::arg!(--threshold <NUM> "Density threshold below which deep analysis is skipped"))
        .arg(clap::arg!(--"max-chars" <NUM> "Characters of body text in semantic output"))
        .arg(clap::arg!(-c --concurrency <NUM> "Maximum number of URLs fetched at once"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds"))
        .arg(clap::arg!(--"batch-timeout" <SECS> "Time budget per URL in seconds, covering fetch and scoring"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, text, semantic)")
                .default_value("json")
                .value_parser(["json", "text", "semantic"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    for shell in [
        clap_complete::Shell::Bash,
        clap_complete::Shell::Zsh,
        clap_complete::Shell::Fish,
        clap_complete::Shell::PowerShell,
    ] {
        if let Err(e) = clap_complete::generate_to(shell, &mut cmd, "sgnl", &completions_dir) {
            println!("cargo:warning=Could not generate {} completions: {}", shell, e);
        }
    }
}
