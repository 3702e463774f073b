//! Resolution of `[target label]` links into anchors and images.

const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "bmp", "png", "tiff", "tif"];

/// Render a bracket link.
///
/// When the displayed value (`label`, or `target` without one) names an image,
/// an `<img>` is emitted, wrapped in an anchor to `target` if a distinct label
/// was given. Everything else becomes a plain `<a>`.
pub fn resolve_link(target: &str, label: Option<&str>) -> String {
    let text = label.unwrap_or(target);

    if is_image(text) {
        let img = format!("<img src=\"{}\" />", attribute(text));
        return match label {
            Some(label) if label != target => {
                format!("<a href=\"{}\">{img}</a>", attribute(target))
            }
            _ => img,
        };
    }

    format!("<a href=\"{}\">{text}</a>", attribute(target))
}

/// Whether `value` ends in a recognized image extension (case-insensitive).
pub fn is_image(value: &str) -> bool {
    value.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

fn attribute(value: &str) -> String {
    value.replace('"', "&quot;")
}
