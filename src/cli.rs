use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flvscope")]
#[command(
    author,
    version,
    about = "Audio/video timestamp sync analyzer for FLV files and HTTP-FLV streams"
)]
pub struct Cli {
    /// FLV file path or http(s):// URL
    #[arg(required = true)]
    pub input: String,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print samples as lines instead of drawing a chart
    #[arg(long)]
    pub plain: bool,
}
