use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "compress-quick",
    about = "Send an image to a compression service and download the smaller result",
    long_about = "compress-quick uploads a single JPEG, PNG, GIF or WebP image (up to 10MB) \
                  to a remote compression service, reports the before/after sizes, and saves \
                  the compressed file as compressed-<name>.",
    version,
    after_help = "EXAMPLES:\n  \
    compress-quick compress photo.png -b https://api.example.com\n  \
    COMPRESS_QUICK_BACKEND_URL=https://api.example.com compress-quick compress photo.jpg -o ./out\n  \
    compress-quick check photo.webp"
)]
pub struct Args {
    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print request and phase details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress an image through the compression service",
        long_about = "Upload one image to {backend-url}/compress as multipart field 'image' and \
                      save the response next to the other downloads."
    )]
    Compress {
        #[arg(help = "Image file to compress")]
        input: PathBuf,

        #[arg(
            short = 'o',
            long,
            default_value = ".",
            help = "Directory the compressed file is saved to"
        )]
        output_dir: PathBuf,

        #[arg(
            short = 'b',
            long,
            help = "Compression service base URL",
            long_help = "Base URL of the compression service. \
                         Falls back to the COMPRESS_QUICK_BACKEND_URL environment variable."
        )]
        backend_url: Option<String>,

        #[arg(
            short = 't',
            long,
            help = "Give up after this many seconds",
            long_help = "Overall request deadline in seconds. Without it the request may wait indefinitely."
        )]
        timeout: Option<u64>,
    },

    #[command(
        about = "Check whether an image would be accepted, without uploading",
        long_about = "Show the declared type, size and dimensions of an image and whether it \
                      passes the type allow-list and the 10MB size limit."
    )]
    Check {
        #[arg(help = "Image file to check")]
        input: PathBuf,
    },
}
