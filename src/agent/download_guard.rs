// MEDIASCOUT Download Guard — Safe Acquisition Layer
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// Protects the gathering pipeline from downloading executables, scripts,
// or corrupt payloads disguised as stock media. Every URL is screened
// before fetch, and every downloaded file is screened before the
// validator ever opens it.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

/// Allowed extensions for downloaded stock media.
/// `.bin` is the content-type-unknown fallback the downloader may emit.
const SAFE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".webp", ".gif", ".bmp",
    ".mp4", ".webm", ".bin",
];

/// Suspicious URL patterns that indicate non-media content.
const BLOCKED_URL_PATTERNS: &[&str] = &[
    ".exe", ".bat", ".cmd", ".ps1", ".msi", ".scr",
    ".vbs", ".js", ".hta", ".pif", ".cpl",
    ".dll", ".sys", ".inf", ".reg",
    "malware", "trojan", "crack", "keygen", "warez",
];

/// Minimum sane file size (5 KB) — smaller files are tracking pixels or stubs.
const MIN_FILE_SIZE: u64 = 5 * 1024;

/// Maximum sane file size (200 MB) — covers the largest Pexels video files.
const MAX_FILE_SIZE: u64 = 200 * 1024 * 1024;

pub struct DownloadGuard;

impl DownloadGuard {
    // -----------------------------------------------------------------------
    // URL Validation
    // -----------------------------------------------------------------------

    /// Validate a URL before downloading. Returns `Ok(())` if safe.
    pub fn validate_url(raw_url: &str) -> Result<(), String> {
        let parsed = Url::parse(raw_url).map_err(|e| format!("Unparseable URL: {}", e))?;

        // 1. Must be HTTPS (or a local test endpoint)
        match parsed.scheme() {
            "https" => {}
            "http" if matches!(parsed.host_str(), Some("localhost") | Some("127.0.0.1")) => {}
            "data" | "javascript" => {
                warn!("[GUARD] 🛡️ Blocked injection URI scheme: {}", raw_url);
                return Err("Blocked injection URI scheme".to_string());
            }
            other => {
                warn!("[GUARD] 🛡️ Blocked non-HTTPS URL: {}", raw_url);
                return Err(format!("Unsafe protocol '{}' — only HTTPS allowed", other));
            }
        }

        // 2. Check for blocked patterns anywhere in the URL
        let url_lower = raw_url.to_lowercase();
        for pattern in BLOCKED_URL_PATTERNS {
            if url_lower.contains(pattern) {
                warn!(
                    "[GUARD] 🛡️ Blocked suspicious URL pattern '{}': {}",
                    pattern, raw_url
                );
                return Err(format!(
                    "URL contains blocked pattern '{}' — possible malware",
                    pattern
                ));
            }
        }

        debug!("[GUARD] ✅ URL passed safety check: {}", raw_url);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Downloaded File Validation
    // -----------------------------------------------------------------------

    /// Validate a downloaded file on disk. Returns `Ok(())` if safe to keep.
    pub fn validate_downloaded_file(path: &Path) -> Result<(), String> {
        // 1. File must exist
        if !path.exists() {
            return Err(format!("File does not exist: {:?}", path));
        }

        // 2. Extension check
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        if !SAFE_EXTENSIONS.contains(&ext.as_str()) {
            warn!(
                "[GUARD] 🛡️ Blocked unsafe file extension '{}': {:?}",
                ext, path
            );
            return Err(format!(
                "Unsafe file extension '{}' — only media files allowed",
                ext
            ));
        }

        // 3. File size bounds
        let metadata =
            fs::metadata(path).map_err(|e| format!("Cannot read file metadata: {}", e))?;

        let size = metadata.len();
        if size < MIN_FILE_SIZE {
            return Err(format!(
                "File too small ({} bytes) — likely a stub or placeholder",
                size
            ));
        }
        if size > MAX_FILE_SIZE {
            return Err(format!(
                "File too large ({} bytes) — exceeds 200 MB limit",
                size
            ));
        }

        // 4. Magic byte check — detect executables disguised as media
        Self::check_magic_bytes(path)?;

        debug!(
            "[GUARD] ✅ File passed safety check: {:?} ({} bytes)",
            path.file_name().unwrap_or_default(),
            size
        );
        Ok(())
    }

    /// Inspect the first bytes of a file for executable signatures.
    fn check_magic_bytes(path: &Path) -> Result<(), String> {
        let mut file =
            File::open(path).map_err(|e| format!("Cannot open file for magic-byte check: {}", e))?;

        let mut header = [0u8; 4];
        let bytes_read = file
            .read(&mut header)
            .map_err(|e| format!("Cannot read file header: {}", e))?;

        if bytes_read < 2 {
            return Err("File too small to validate header".to_string());
        }

        // PE executable (Windows .exe/.dll)
        if header[0] == b'M' && header[1] == b'Z' {
            warn!("[GUARD] 🛡️ PE executable detected: {:?}", path);
            return Err("File contains Windows executable (MZ header) — BLOCKED".to_string());
        }

        // ELF executable (Linux)
        if bytes_read >= 4 && header[0] == 0x7F && &header[1..4] == b"ELF" {
            warn!("[GUARD] 🛡️ ELF executable detected: {:?}", path);
            return Err("File contains Linux executable (ELF header) — BLOCKED".to_string());
        }

        // Script shebang (#!)
        if header[0] == b'#' && header[1] == b'!' {
            warn!("[GUARD] 🛡️ Script shebang detected: {:?}", path);
            return Err("File contains script shebang (#!) — BLOCKED".to_string());
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Filename Sanitization
    // -----------------------------------------------------------------------

    /// Strip path traversal attacks and dangerous characters from filenames.
    pub fn sanitize_filename(name: &str) -> String {
        name.replace("..", "")
            .replace('/', "_")
            .replace('\\', "_")
            .replace('\0', "")
            .replace(':', "_")
            .replace('*', "_")
            .replace('?', "_")
            .replace('"', "_")
            .replace('<', "_")
            .replace('>', "_")
            .replace('|', "_")
            .trim()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_allow_https_url() {
        let result =
            DownloadGuard::validate_url("https://images.pexels.com/photos/12345/photo.png");
        assert!(result.is_ok());
    }

    #[test]
    fn test_block_http_url() {
        let result = DownloadGuard::validate_url("http://evil-site.com/image.png");
        assert!(result.is_err());
    }

    #[test]
    fn test_allow_localhost() {
        let result = DownloadGuard::validate_url("http://localhost:3000/fixture.png");
        assert!(result.is_ok());
    }

    #[test]
    fn test_block_executable_url() {
        let result = DownloadGuard::validate_url("https://example.com/download.exe");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains(".exe"));
    }

    #[test]
    fn test_block_malware_keyword_url() {
        let result = DownloadGuard::validate_url("https://crack-site.com/keygen-art.png");
        assert!(result.is_err());
    }

    #[test]
    fn test_block_data_uri() {
        let result = DownloadGuard::validate_url("data:text/html,<script>alert(1)</script>");
        assert!(result.is_err());
    }

    #[test]
    fn test_block_javascript_uri() {
        let result = DownloadGuard::validate_url("javascript:alert(1)");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_nonexistent_file() {
        let result =
            DownloadGuard::validate_downloaded_file(Path::new("__nonexistent_xyz_test.png"));
        assert!(result.is_err());
    }

    #[test]
    fn test_block_executable_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("sneaky.png");

        // Write a PE header disguised as .png
        let mut f = File::create(&fake).unwrap();
        f.write_all(b"MZ").unwrap();
        // Pad to pass the minimum size check
        f.write_all(&vec![0u8; 20_000]).unwrap();
        f.flush().unwrap();

        let result = DownloadGuard::validate_downloaded_file(&fake);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("MZ"));
    }

    #[test]
    fn test_block_elf_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("sneaky.jpg");

        let mut f = File::create(&fake).unwrap();
        f.write_all(&[0x7F, b'E', b'L', b'F']).unwrap();
        f.write_all(&vec![0u8; 20_000]).unwrap();
        f.flush().unwrap();

        let result = DownloadGuard::validate_downloaded_file(&fake);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("ELF"));
    }

    #[test]
    fn test_block_unsafe_extension() {
        let dir = tempfile::tempdir().unwrap();
        let bad_file = dir.path().join("payload.exe");

        let mut f = File::create(&bad_file).unwrap();
        f.write_all(&vec![0u8; 20_000]).unwrap();
        f.flush().unwrap();

        let result = DownloadGuard::validate_downloaded_file(&bad_file);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains(".exe"));
    }

    #[test]
    fn test_block_undersized_file() {
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("stub.png");

        let mut f = File::create(&stub).unwrap();
        f.write_all(&vec![0u8; 128]).unwrap();
        f.flush().unwrap();

        let result = DownloadGuard::validate_downloaded_file(&stub);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("too small"));
    }

    #[test]
    fn test_sanitize_path_traversal() {
        assert_eq!(
            DownloadGuard::sanitize_filename("../../etc/passwd"),
            "__etc_passwd"
        );
    }

    #[test]
    fn test_sanitize_normal_name() {
        assert_eq!(
            DownloadGuard::sanitize_filename("pexels_img_42_1700000000.png"),
            "pexels_img_42_1700000000.png"
        );
    }
}
