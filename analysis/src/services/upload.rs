use actix_multipart::Multipart;
use common::error::{AppError, Res};
use futures::StreamExt;

pub const MAX_FILES: usize = 5;
pub const MAX_FILE_BYTES: usize = 20 * 1024 * 1024;

/// One tender document taken from the upload form.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A declared content type decides on its own; the file extension is only
/// consulted when the part carries none.
pub fn is_pdf(file_name: &str, content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => ct.eq_ignore_ascii_case("application/pdf"),
        None => file_name.to_ascii_lowercase().ends_with(".pdf"),
    }
}

pub fn validate_batch(files: &[PdfUpload]) -> Res<()> {
    if files.is_empty() {
        return Err(AppError::BadRequest(
            "Upload at least one PDF document".to_string(),
        ));
    }
    if files.len() > MAX_FILES {
        return Err(AppError::BadRequest(format!(
            "You can upload at most {} documents at a time",
            MAX_FILES
        )));
    }
    Ok(())
}

fn is_file_field(name: Option<&str>) -> bool {
    matches!(name, Some("files") | Some("files[]"))
}

fn invalid_upload(e: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid upload: {}", e))
}

/// Reads the `files` fields of a multipart form into memory.
///
/// Size and count limits are enforced while streaming so an oversized upload
/// is refused before it is fully buffered. Other fields are drained and
/// ignored.
pub async fn collect_pdfs(mut payload: Multipart) -> Res<Vec<PdfUpload>> {
    let mut files = Vec::new();

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(invalid_upload)?;

        if !is_file_field(field.name()) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(invalid_upload)?;
            }
            continue;
        }

        if files.len() == MAX_FILES {
            return Err(AppError::BadRequest(format!(
                "You can upload at most {} documents at a time",
                MAX_FILES
            )));
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("document.pdf")
            .to_string();
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());

        if !is_pdf(&file_name, content_type.as_deref()) {
            return Err(AppError::BadRequest(format!(
                "{} is not a PDF document",
                file_name
            )));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(invalid_upload)?;
            if bytes.len() + chunk.len() > MAX_FILE_BYTES {
                return Err(AppError::BadRequest(format!(
                    "{} is larger than 20 MB",
                    file_name
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        files.push(PdfUpload { file_name, bytes });
    }

    validate_batch(&files)?;
    Ok(files)
}
