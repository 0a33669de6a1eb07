mod arg;
mod fs;

use ::clap::Parser;
use ::log::error;
use ::log::info;
use ::log::warn;
use ::pdfmeta::PdfBuilder;

use self::arg::Args;
use self::fs::append_pdf_files;
use self::fs::filter_pdf_files;

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    ::env_logger::Builder::from_env(::env_logger::Env::default().default_filter_or(level)).init();

    let mut files = filter_pdf_files(args.files);
    if let Some(dir) = args.directory {
        append_pdf_files(&mut files, &dir);
    }

    for file in files {
        info!("Processing file: {}", file.display());
        let pdf_builder = match PdfBuilder::new(&file) {
            Ok(pdf_builder) => pdf_builder,
            Err(err) => {
                error!("{}", err);
                continue;
            }
        };
        let report = pdf_builder.parse();
        if !report.diagnostics.is_empty() {
            warn!(
                "{}: {} non-fatal errors",
                file.display(),
                report.diagnostics.len()
            );
        }
        match report.status() {
            Ok(document) => info!("{}: {}", file.display(), document),
            Err(err) => error!("{}: {}. Partial result: {}", file.display(), err, report.info),
        }
    }
}
