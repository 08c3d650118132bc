use std::path::Path;

/// Directory-listing page in the `<pre>` + anchors layout of plain file servers.
pub fn render_listing(names: &[String]) -> String {
    let mut out = String::from("<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n");
    for name in names {
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            urlencoding::encode(name),
            html_escape::encode_text(name)
        ));
    }
    out.push_str("</pre>\n");
    out
}

/// Regular files directly under `dir`, sorted by name.
pub async fn stored_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut rd = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Final path component of a client-supplied name; `None` if nothing usable is left.
pub fn base_name(raw: &str) -> Option<String> {
    let last = raw
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()?
        .trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(last.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_names() {
        let html = render_listing(&["a b&c.txt".to_string()]);
        assert!(html.contains("<a href=\"a%20b%26c.txt\">a b&amp;c.txt</a>"));
        assert!(html.starts_with("<!doctype html>"));
    }

    #[test]
    fn empty_listing_has_no_anchors() {
        assert!(!render_listing(&[]).contains("<a "));
    }

    #[test]
    fn strips_directories() {
        assert_eq!(base_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(base_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(base_name("C:\\fakepath\\photo.jpg").as_deref(), Some("photo.jpg"));
        assert_eq!(base_name("dir/").as_deref(), Some("dir"));
        assert_eq!(base_name("a/b//").as_deref(), Some("b"));
        assert_eq!(base_name("/"), None);
        assert_eq!(base_name(".."), None);
        assert_eq!(base_name(""), None);
    }

    #[tokio::test]
    async fn lists_only_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b"), b"1").unwrap();
        std::fs::write(dir.path().join("a"), b"1").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        assert_eq!(stored_files(dir.path()).await.unwrap(), ["a", "b"]);
    }
}
