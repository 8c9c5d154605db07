//! Path resolution over the flat namespace.
//!
//! All namespace keys are normalized absolute paths: they start with `/`,
//! contain no empty, `.` or `..` segments, and carry no trailing slash
//! (except the root itself).

/// Resolve a path against the working directory and normalize it.
///
/// Relative paths are joined onto `working_dir` (itself absolute); `.`
/// segments are dropped and `..` pops the previous segment, never climbing
/// above the root.
pub fn resolve(working_dir: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", working_dir.trim_end_matches('/'), path)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// The immediate parent of a normalized path, or `None` for the root.
pub fn parent(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(n) => Some(&path[..n]),
        None => None,
    }
}

/// Whether `candidate` lies strictly below `ancestor` (any depth).
///
/// Component-wise, not a string prefix: `/a` is not an ancestor of `/ab`.
pub fn is_descendant(ancestor: &str, candidate: &str) -> bool {
    if ancestor == "/" {
        return candidate != "/";
    }
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate.as_bytes()[ancestor.len()] == b'/'
}
