use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "surefact", version, about = "Run a research job and follow its progress")]
pub struct Args {
    /// Research topic; multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub topic: Vec<String>,
    /// Job stream endpoint (ws:// or wss://).
    #[arg(long)]
    pub url: Option<String>,
    /// Bearer token for the stream handshake.
    #[arg(long, env = "SUREFACT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// RON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory the finished report is written to.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn topic(&self) -> String {
        self.topic.join(" ")
    }
}
