//! Content-type detection based on file extensions.

fn extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) => &path[dot + 1..],
        None => "",
    }
}

/// Maps a path to its content type by extension. Unknown extensions default
/// to `text/html`.
pub fn content_type(path: &str) -> &'static str {
    match extension(path) {
        "txt" => "text/plain",
        "css" => "text/css",
        "csv" => "text/csv",
        "htm" | "html" => "text/html",
        "xml" => "text/xml",
        // Technically application/javascript (RFC 4329), but older IE
        // struggles with that.
        "js" => "text/javascript",
        "xhtml" => "application/xhtml+xml",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gif" => "image/gif",
        "jpeg" | "jpg" => "image/jpeg",
        "tiff" | "tif" => "image/tiff",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "swf" => "application/x-shockwave-flash",
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "ttf" => "font/ttf",
        _ => "text/html",
    }
}

/// Cacheability is only granted to resources that require it for browser
/// support reasons; everything else stays uncached to avoid reload headaches
/// during development.
pub fn is_cacheable(path: &str) -> bool {
    matches!(extension(path), "mp3" | "wav")
}
