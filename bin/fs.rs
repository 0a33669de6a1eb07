use ::log::warn;
use ::std::fs::read_dir;
use ::std::path::Path;
use ::std::path::PathBuf;

fn is_pdf_file(path: &Path) -> bool {
    matches!(path.extension(), Some(ext) if path.is_file() && ext.to_ascii_lowercase() == "pdf")
}

/// Keeps the PDF files among `files`, logging the rest.
pub(super) fn filter_pdf_files(files: Vec<PathBuf>) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|path| {
            let keep = is_pdf_file(path);
            if !keep {
                warn!("Skipping {}: Not a PDF file", path.display());
            }
            keep
        })
        .collect::<Vec<PathBuf>>()
}

pub(super) fn append_pdf_files(files: &mut Vec<PathBuf>, dir: &Path) {
    match read_dir(dir) {
        Ok(entries) => {
            for entry in entries {
                match entry {
                    Ok(entry) => {
                        let path = entry.path();
                        if path.is_dir() {
                            append_pdf_files(files, &path);
                        } else if is_pdf_file(&path) {
                            files.push(path);
                        }
                    }
                    Err(err) => {
                        warn!("Failed to read an entry of {}. Error: {}", dir.display(), err);
                    }
                }
            }
        }
        Err(err) => {
            warn!("Failed to read directory {}. Error: {}", dir.display(), err);
        }
    }
}
