//! Content-Type según la extensión del archivo.

/// Sufijo de las variantes precomprimidas
pub const GZIP_SUFFIX: &str = ".gz";

/// Infere el Content-Type a partir de la extensión.
///
/// Para una variante `.gz` hay que pasar el nombre lógico (sin el sufijo):
/// `index.html.gz` se sirve como `text/html` con `Content-Encoding: gzip`.
///
/// # Ejemplo
/// ```
/// use http_handlers::mime::content_type_for;
///
/// assert_eq!(content_type_for("/www/app.js"), "application/javascript");
/// assert_eq!(content_type_for("/www/LEEME"), "text/plain");
/// ```
pub fn content_type_for(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let extension = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "text/plain",
    };

    match extension.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "json" => "application/json",
        "js" => "application/javascript",
        "png" => "image/png",
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "eot" => "font/eot",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "xml" => "text/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/x-gzip",
        _ => "text/plain",
    }
}

/// Extensiones que vale la pena precomprimir
pub fn is_compressible(path: &str) -> bool {
    matches!(
        content_type_for(path),
        "text/html"
            | "text/css"
            | "application/json"
            | "application/javascript"
            | "image/svg+xml"
            | "text/xml"
            | "text/plain"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("/a/b/STYLE.CSS"), "text/css");
        assert_eq!(content_type_for("/img/logo.svg"), "image/svg+xml");
        assert_eq!(content_type_for("/data.json"), "application/json");
        assert_eq!(content_type_for("/bundle.js.gz"), "application/x-gzip");
    }

    #[test]
    fn test_dot_in_directory_only() {
        assert_eq!(content_type_for("/v1.2/README"), "text/plain");
    }

    #[test]
    fn test_compressible() {
        assert!(is_compressible("/index.htm"));
        assert!(is_compressible("/app.js"));
        assert!(!is_compressible("/photo.jpg"));
        assert!(!is_compressible("/index.html.gz"));
    }
}
