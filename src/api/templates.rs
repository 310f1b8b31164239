use super::authorized;
use crate::{
    multipart::{asset_url_to_path, FilePart},
    validation::{self, Params},
    Client, Error, Result,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// The three files that make up a template design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFiles {
    /// The design JSON.
    pub json_file: PathBuf,
    /// Front thumbnail image.
    pub thumbnail_file: PathBuf,
    /// Back thumbnail image.
    pub back_thumbnail_file: PathBuf,
}

impl TemplateFiles {
    /// Reads `jsonFile`, `thumbnailFile` and `backThumbnailFile` from params.
    ///
    /// Returns `Ok(None)` when none of them is present.
    fn from_params(params: &Params) -> Result<Option<Self>> {
        const KEYS: [&str; 3] = ["jsonFile", "thumbnailFile", "backThumbnailFile"];
        if !KEYS.iter().any(|key| params.contains_key(*key)) {
            return Ok(None);
        }

        let path = |key: &str| validation::required_str(params, key).map(PathBuf::from);
        Ok(Some(Self {
            json_file: path(KEYS[0])?,
            thumbnail_file: path(KEYS[1])?,
            back_thumbnail_file: path(KEYS[2])?,
        }))
    }

    fn parts(&self) -> Vec<FilePart> {
        vec![
            FilePart::new("json", &self.json_file),
            FilePart::new("thumbnail", &self.thumbnail_file),
            FilePart::new("backThumbnail", &self.back_thumbnail_file),
        ]
    }
}

/// Mail piece templates.
#[derive(Debug, Clone)]
pub struct TemplatesApi {
    pub(super) client: Client,
}

impl TemplatesApi {
    pub(super) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches one template.
    pub async fn get(&self, id: i64) -> Result<Value> {
        self.client
            .get(&format!("/templates/{}", id), authorized())
            .await?
            .json()
    }

    /// Deletes a template.
    pub async fn delete(&self, id: i64) -> Result<Value> {
        self.client
            .delete(&format!("/templates/{}", id), authorized())
            .await?
            .json()
    }

    /// Uploads a single image and returns its stored path.
    ///
    /// Yields `Ok(None)` if the response has no `data.filePath`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `path` is not a file.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<Option<String>> {
        let options = authorized().multipart(vec![FilePart::new("image", path.as_ref())]);
        let stored = self
            .client
            .post("/templates/uploadFile", None, options)
            .await?
            .value_at("data[filePath]")?;

        Ok(stored.and_then(|v| v.as_str().map(str::to_owned)))
    }

    /// Uploads a design and its thumbnails.
    ///
    /// The response `data` carries `templatePath`, `thumbnailPath` and
    /// `backThumbnailPath`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if any of the files is missing.
    pub async fn upload(&self, files: &TemplateFiles) -> Result<Value> {
        let options = authorized().multipart(files.parts());
        self.client
            .post("/templates/upload", None, options)
            .await?
            .json()
    }

    /// Creates a template.
    ///
    /// Requires a non-empty `title`, a non-zero integer `productId`, a valid
    /// custom field list under `fields` and the three design files
    /// (`jsonFile`, `thumbnailFile`, `backThumbnailFile`). The files are
    /// uploaded first, then the template is registered with their paths.
    pub async fn create(&self, params: &Params) -> Result<Value> {
        let title = validation::required_str(params, "title")?;
        let product_id = validation::required_int(params, "productId")?;
        if product_id == 0 {
            return Err(Error::InvalidConfig(
                "The \"productId\" parameter is required and should be a non-zero integer"
                    .to_string(),
            ));
        }
        let fields = params.get("fields").unwrap_or(&Value::Null);
        if !validation::custom_field_list(fields) {
            return Err(invalid_fields());
        }
        let files = TemplateFiles::from_params(params)?.ok_or_else(|| {
            Error::InvalidConfig("The \"jsonFile\" parameter is required".to_string())
        })?;

        let uploaded = self.upload(&files).await?;
        let mut body = uploaded_paths(&uploaded);
        body.insert("title".to_string(), json!(title));
        body.insert("productId".to_string(), json!(product_id));
        body.insert("fields".to_string(), fields.clone());

        self.client
            .post("/templates", Some(&body), authorized())
            .await?
            .json()
    }

    /// Updates a template.
    ///
    /// The current template is fetched first; `title` and `fields` in
    /// `changes` replace the stored values, and if any design file is given
    /// all three are re-uploaded.
    pub async fn update(&self, id: i64, changes: &Params) -> Result<Value> {
        // Validate before the first round trip.
        if changes.contains_key("title") {
            validation::required_str(changes, "title")?;
        }
        if let Some(fields) = changes.get("fields") {
            if !validation::custom_field_list(fields) {
                return Err(invalid_fields());
            }
        }
        let files = TemplateFiles::from_params(changes)?;
        if let Some(files) = &files {
            for part in files.parts() {
                validation::existing_file(&part.path)?;
            }
        }

        let current = self.get(id).await?;
        let data = &current["data"];
        let asset = |key: &str| json!(asset_url_to_path(data[key].as_str().unwrap_or_default()));

        let mut body = Params::new();
        body.insert(
            "title".to_string(),
            changes
                .get("title")
                .cloned()
                .unwrap_or_else(|| json!(data["title"].as_str().unwrap_or_default())),
        );
        body.insert("templatePath".to_string(), asset("templateUrl"));
        body.insert("thumbnailPath".to_string(), asset("thumbnailUrl"));
        body.insert("backThumbnailPath".to_string(), asset("backThumbnailUrl"));
        body.insert(
            "fields".to_string(),
            changes
                .get("fields")
                .or_else(|| data.get("fields"))
                .cloned()
                .unwrap_or_else(|| json!([])),
        );

        if let Some(files) = &files {
            let uploaded = self.upload(files).await?;
            body.extend(uploaded_paths(&uploaded));
        }

        self.client
            .patch(&format!("/templates/{}", id), Some(&body), authorized())
            .await?
            .json()
    }
}

fn uploaded_paths(uploaded: &Value) -> Params {
    ["templatePath", "thumbnailPath", "backThumbnailPath"]
        .into_iter()
        .map(|key| (key.to_string(), uploaded["data"][key].clone()))
        .collect()
}

fn invalid_fields() -> Error {
    Error::InvalidConfig(
        "The \"fields\" parameter is required and should be a non-empty list of custom fields"
            .to_string(),
    )
}
