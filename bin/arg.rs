// A module to parse command line arguments

use ::clap::Parser;
use ::std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "pdfmeta",
    version = "0.1.0",
    about = "Extracts the version, page count, cross-reference chain and document metadata of PDF files"
)]

pub struct Args {
    #[clap(short, long, help = "Enable debug logging, unless RUST_LOG is set")]
    pub verbose: bool,
    #[clap(short, long, help = "A space-separated list of PDF files")]
    pub files: Vec<PathBuf>,
    #[clap(short, long, help = "A directory searched recursively for PDF files")]
    pub directory: Option<PathBuf>,
}
