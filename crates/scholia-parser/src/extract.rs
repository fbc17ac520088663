use scholia_core::error::{Result, ScholiaError};

const PDF_MAGIC: &[u8] = b"%PDF";

pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Recovers raw text from uploaded bytes.
///
/// PDFs go through `pdf-extract` on a blocking thread; anything else is
/// decoded as (lossy) UTF-8.
pub async fn extract_text(bytes: &[u8]) -> Result<String> {
    if !looks_like_pdf(bytes) {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }

    let owned = bytes.to_vec();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned))
        .await
        .map_err(|e| ScholiaError::Parse(format!("PDF extraction task failed: {e}")))?
        .map_err(|e| ScholiaError::Parse(format!("PDF text extraction failed: {e}")))?;

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_is_decoded() {
        let text = extract_text("hello 世界".as_bytes()).await.unwrap();
        assert_eq!(text, "hello 世界");
    }

    #[tokio::test]
    async fn corrupt_pdf_is_an_error() {
        let result = extract_text(b"%PDF-1.7 definitely not a real pdf").await;
        assert!(matches!(result, Err(ScholiaError::Parse(_))));
    }
}
