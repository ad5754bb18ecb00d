//! Image placeholder substitution
//!
//! Manifests refer to the app's own image by its bare name
//! (`image: web`). At deploy time that placeholder becomes the pushed
//! image pinned by digest.

/// Replace every line ending in ` image: <app_name>` with
/// ` image: <image_ref>`.
///
/// Only an exact line suffix matches: `image: web-worker`,
/// `image: web:1.2` and `image: other/web` are left alone.
pub fn substitute_image(manifest: &str, app_name: &str, image_ref: &str) -> String {
    let placeholder = format!(" image: {app_name}");
    let replacement = format!(" image: {image_ref}");

    let mut out = String::with_capacity(manifest.len());
    for line in manifest.split_inclusive('\n') {
        let (content, ending) = split_line_ending(line);
        match content.strip_suffix(&placeholder) {
            Some(prefix) => {
                out.push_str(prefix);
                out.push_str(&replacement);
                out.push_str(ending);
            }
            None => out.push_str(line),
        }
    }
    out
}

fn split_line_ending(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(['\n', '\r']);
    (content, &line[content.len()..])
}
