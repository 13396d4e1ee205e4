use std::path::Path;

use reqwest::{multipart, Body, Client};
use tokio::fs::File;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::{debug, info};

use crate::structs::{IzError, PresignedUpload};
use crate::IzClient;

/// Uploads an image and requests its analysis.
///
/// Asks the API for a presigned storage location, streams the image bytes
/// there, then registers the uploaded object for analysis.
///
/// # Arguments
///
/// * `client` - An authenticated client.
/// * `image_path` - Path to the image file to analyze.
/// * `target_id` - Optional target library id. If omitted, the target type is
///   auto-detected from the image on the server side.
///
/// # Returns
///
/// * A Result wrapping the upload id to poll with
///   [wait_for_summary](crate::wait_for_summary).
pub async fn upload_and_analyze(
    client: &IzClient,
    image_path: &Path,
    target_id: Option<&str>,
) -> Result<String, IzError> {
    let filename = image_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| IzError::NoFileName(image_path.to_path_buf()))?;

    let presigned: PresignedUpload =
        serde_json::from_value(client.get(&format!("/presigned-urls/{}", filename)).await?)?;

    upload_to_storage(&presigned, image_path, filename).await?;
    info!("upload of {} successful", filename);

    debug!("requesting analysis for upload {}", presigned.upload_id);
    let path = format!("/requests-for-analysis/{}", presigned.upload_id);
    match target_id {
        Some(id) => client.post_with_query(&path, &[("target_id", id)]).await?,
        None => client.post(&path).await?,
    };

    Ok(presigned.upload_id)
}

/// Streams the image to the presigned storage location.
///
/// The storage backend requires every presigned field, in the order received,
/// with the file content as the last field of the form. The presigned URL is
/// a different trust domain, so the request goes out on a bare client without
/// the bearer token.
async fn upload_to_storage(
    presigned: &PresignedUpload,
    image_path: &Path,
    filename: &str,
) -> Result<(), IzError> {
    let mut form = multipart::Form::new();
    for field in &presigned.fields {
        form = form.text(field.key.clone(), field.value.clone());
    }

    let file = File::open(image_path).await?;
    let stream = FramedRead::new(file, BytesCodec::new());
    let part = multipart::Part::stream(Body::wrap_stream(stream))
        .file_name(filename.to_string())
        .mime_str(content_type_for(image_path))?;
    form = form.part("file", part);

    let response = Client::builder()
        .build()?
        .post(&presigned.url)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(IzError::Storage { status });
    }
    Ok(())
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => "image/png",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "image/jpeg",
    }
}
