use super::errors::FsError;
use super::namespace::Namespace;
use super::types::Access;

/// Evaluate owner/other permission bits for one operation.
///
/// Evaluation has two principal classes only: the entry's owner and
/// everyone else. When the target path has no entry yet (about to be
/// created), the check walks upward and requires `Write` on the nearest
/// existing ancestor; the root is always accessible as the base case.
pub fn check_access(
    namespace: &Namespace,
    path: &str,
    access: Access,
    principal: &str,
    enforce: bool,
) -> Result<(), FsError> {
    if !enforce {
        return Ok(());
    }
    if principal.is_empty() {
        return Err(FsError::NoPrincipal);
    }

    let mut current = path;
    let mut requested = access;
    loop {
        if let Some(entry) = namespace.get(current) {
            let granted = if principal == entry.owner {
                entry.permission.owner
            } else {
                entry.permission.other
            };
            return if granted.implies(requested) {
                Ok(())
            } else {
                Err(FsError::PermissionDenied)
            };
        }

        match super::path::parent(current) {
            Some(parent) => {
                current = parent;
                requested = Access::Write;
            }
            None => return Ok(()),
        }
    }
}
