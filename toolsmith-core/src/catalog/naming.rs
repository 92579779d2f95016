use crate::catalog::model::HttpMethod;

/// Upper bound on tool names imposed by the tool-calling protocol.
pub const MAX_TOOL_NAME_LEN: usize = 64;

/// Builds `{prefix}_{product}_{operation_id}`, truncating the operationId
/// portion so the result fits in [`MAX_TOOL_NAME_LEN`].
///
/// Truncation is positional: operationIds that share the fitting prefix
/// produce the same name.
pub fn tool_name(prefix: &str, product: &str, operation_id: &str) -> String {
    let head = format!("{}_{}_", sanitize(prefix), normalize_product(product));
    let tail = sanitize(operation_id);

    // Sanitized names are ASCII, so byte length == char count.
    if head.len() + tail.len() <= MAX_TOOL_NAME_LEN {
        return format!("{head}{tail}");
    }
    if head.len() >= MAX_TOOL_NAME_LEN {
        return head[..MAX_TOOL_NAME_LEN].to_string();
    }
    let room = MAX_TOOL_NAME_LEN - head.len();
    format!("{head}{}", &tail[..room])
}

pub fn normalize_product(product: &str) -> String {
    sanitize(&product.to_ascii_lowercase())
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Derives an operationId from the verb and path when the document omits one.
///
/// `GET /users/{id}/posts` becomes `getUsersPosts`.
pub fn default_operation_id(method: HttpMethod, path: &str) -> String {
    let mut out = method.path_item_key().to_string();
    for segment in path.trim_matches('/').split('/') {
        if segment.is_empty() || (segment.starts_with('{') && segment.ends_with('}')) {
            continue;
        }
        for word in segment.split(|c: char| !c.is_ascii_alphanumeric()) {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}
