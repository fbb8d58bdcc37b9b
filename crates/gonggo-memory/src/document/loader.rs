use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gonggo_client::FileUpload;

use super::{DEFAULT_MAX_FILE_SIZE, DocumentError};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Document,
}

impl MediaKind {
    /// Images are recognized by extension or an explicit `image/*` MIME type.
    #[must_use]
    pub fn detect(file_name: &str, mime: Option<&str>) -> Self {
        if mime.is_some_and(|m| m.starts_with("image/")) {
            return Self::Image;
        }
        match extension(file_name) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Self::Image,
            _ => Self::Document,
        }
    }
}

/// A file read from disk and ready for upload.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub upload: FileUpload,
    pub media: MediaKind,
    pub size: u64,
}

impl LoadedFile {
    /// `data:` URL of the file content, used as the image preview.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.upload.mime,
            STANDARD.encode(&self.upload.bytes)
        )
    }
}

pub struct FileLoader {
    pub max_file_size: u64,
}

impl Default for FileLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl FileLoader {
    #[must_use]
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::FileTooLarge`] when `size` exceeds the limit.
    pub fn check_size(&self, size: u64) -> Result<(), DocumentError> {
        if size > self.max_file_size {
            return Err(DocumentError::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Load `path` after checking its size from metadata.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::FileTooLarge`] without reading the file when it
    /// exceeds the limit, [`DocumentError::NotAFile`] for directories, or an IO error.
    pub async fn load(&self, path: &Path) -> Result<LoadedFile, DocumentError> {
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(DocumentError::NotAFile(path.display().to_string()));
        }
        self.check_size(meta.len())?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_owned();
        let bytes = tokio::fs::read(path).await?;
        let mime = mime_for(&file_name);
        let media = MediaKind::detect(&file_name, Some(mime));
        tracing::debug!(file = %file_name, size = meta.len(), ?media, "file loaded");

        Ok(LoadedFile {
            size: meta.len(),
            upload: FileUpload::new(file_name, mime, bytes),
            media,
        })
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// MIME type by extension; unknown types upload as `application/octet-stream`.
#[must_use]
pub fn mime_for(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("txt") => "text/plain",
        Some("hwp") => "application/x-hwp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_images_by_extension() {
        assert_eq!(MediaKind::detect("scan.PNG", None), MediaKind::Image);
        assert_eq!(MediaKind::detect("photo.jpeg", None), MediaKind::Image);
        assert_eq!(MediaKind::detect("old.bmp", None), MediaKind::Image);
        assert_eq!(MediaKind::detect("report.pdf", None), MediaKind::Document);
        assert_eq!(MediaKind::detect("noext", None), MediaKind::Document);
    }

    #[test]
    fn explicit_image_mime_wins() {
        assert_eq!(
            MediaKind::detect("capture", Some("image/heic")),
            MediaKind::Image
        );
    }

    #[test]
    fn mime_lookup() {
        assert_eq!(mime_for("a.hwp"), "application/x-hwp");
        assert_eq!(mime_for("a.JPG"), "image/jpeg");
        assert_eq!(mime_for("a.xyz"), "application/octet-stream");
    }

    #[tokio::test]
    async fn load_small_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notice.pdf");
        std::fs::write(&file, b"%PDF-1.4").unwrap();

        let loaded = FileLoader::default().load(&file).await.unwrap();
        assert_eq!(loaded.upload.file_name, "notice.pdf");
        assert_eq!(loaded.upload.mime, "application/pdf");
        assert_eq!(loaded.media, MediaKind::Document);
        assert_eq!(loaded.size, 8);
    }

    #[tokio::test]
    async fn rejects_file_over_limit() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.bin");
        std::fs::write(&file, vec![0u8; 11]).unwrap();

        let err = FileLoader::new(10).load(&file).await.unwrap_err();
        assert!(matches!(err, DocumentError::FileTooLarge { size: 11, limit: 10 }));
    }

    #[tokio::test]
    async fn sparse_file_over_default_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.pdf");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(DEFAULT_MAX_FILE_SIZE + 1).unwrap();

        let err = FileLoader::default().load(&path).await.unwrap_err();
        assert!(matches!(err, DocumentError::FileTooLarge { .. }));
    }

    #[tokio::test]
    async fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileLoader::default().load(dir.path()).await.unwrap_err();
        assert!(matches!(err, DocumentError::NotAFile(_)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = FileLoader::default()
            .load(Path::new("/nonexistent/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)));
    }

    #[test]
    fn image_data_url() {
        let loaded = LoadedFile {
            upload: FileUpload::new("a.png", "image/png", b"abc".to_vec()),
            media: MediaKind::Image,
            size: 3,
        };
        assert_eq!(loaded.data_url(), "data:image/png;base64,YWJj");
    }
}
