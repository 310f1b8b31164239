//! Multipart upload helpers.

use crate::{validation, Result};
use rand::RngCore;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};

/// One named file in a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// The form field name.
    pub name: String,
    /// Path of the local file to send.
    pub path: PathBuf,
}

impl FilePart {
    /// Creates a part named `name` streaming the file at `path`.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Returns a random file name that keeps the lowercased extension of `path`.
///
/// The base name is replaced by 16 random bytes, hex-encoded.
///
/// # Examples
///
/// ```
/// use olc::multipart::random_file_name;
///
/// let name = random_file_name("designs/Front.JSON");
/// assert!(name.ends_with(".json"));
/// assert_eq!(name.len(), 32 + ".json".len());
/// ```
pub fn random_file_name(path: impl AsRef<Path>) -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    let stem = hex::encode(bytes);

    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stem, ext.to_lowercase()),
        _ => stem,
    }
}

/// Returns the `s3/...` tail of an asset URL, or an empty string.
///
/// # Examples
///
/// ```
/// use olc::multipart::asset_url_to_path;
///
/// assert_eq!(
///     asset_url_to_path("https://cdn.example.com/s3/templates/a.json"),
///     "s3/templates/a.json"
/// );
/// assert_eq!(asset_url_to_path("https://cdn.example.com/other/a.json"), "");
/// ```
pub fn asset_url_to_path(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(offset) = lower[search_from..].find("/s3/") {
        let start = search_from + offset + 1;
        // At least one character must follow the `s3/` prefix.
        if url.len() > start + 3 {
            return url[start..].to_string();
        }
        search_from = start;
    }
    String::new()
}

/// Opens every part and assembles the form.
///
/// Each file is streamed from an open handle that is owned by the form, so
/// it is closed as soon as the request finishes or is dropped.
///
/// # Errors
///
/// Returns [`crate::Error::NotFound`] for a path that is not a regular file
/// and [`crate::Error::Io`] if opening it fails.
pub(crate) async fn build_form(parts: &[FilePart]) -> Result<Form> {
    let mut form = Form::new();

    for part in parts {
        validation::existing_file(&part.path)?;

        let file = tokio::fs::File::open(&part.path).await?;
        let length = file.metadata().await?.len();
        let file_name = random_file_name(&part.path);

        tracing::debug!(
            field = %part.name,
            path = %part.path.display(),
            file_name = %file_name,
            bytes = length,
            "Attaching multipart file"
        );

        let body = Part::stream_with_length(reqwest::Body::from(file), length)
            .file_name(file_name);
        form = form.part(part.name.clone(), body);
    }

    Ok(form)
}
