use super::*;

#[test]
fn accepts_png_jpeg_svg() {
    for mime in ["image/png", "image/jpeg", "image/svg+xml"] {
        let image = accept_upload(mime, "data:image/png;base64,AAAA").unwrap();
        assert_eq!(image.as_str(), "data:image/png;base64,AAAA");
    }
}

#[test]
fn mime_match_ignores_case_and_whitespace() {
    assert!(accept_upload(" IMAGE/PNG ", "data:x").is_ok());
}

#[test]
fn rejects_other_types() {
    assert_eq!(
        accept_upload("image/gif", "data:image/gif;base64,R0lG"),
        Err(UploadError::UnsupportedType("image/gif".into()))
    );
    assert!(matches!(accept_upload("application/pdf", "data:x"), Err(UploadError::UnsupportedType(_))));
}

#[test]
fn rejects_empty_data() {
    assert_eq!(accept_upload("image/jpeg", "  "), Err(UploadError::Empty));
}

#[test]
fn css_url_quotes_source() {
    let image = MapImage::from_stored("data:a\"b");
    assert_eq!(image.css_url(), "url(\"data:a%22b\")");
}

#[test]
fn serializes_as_plain_string() {
    let image = MapImage::from_stored("data:abc");
    assert_eq!(serde_json::to_string(&image).unwrap(), "\"data:abc\"");
}
