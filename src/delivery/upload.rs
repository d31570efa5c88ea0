/// Rules for accepted deliverable archives.
use uuid::Uuid;

/// Largest archive accepted, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Folder every deliverable is stored under.
pub const DELIVERABLE_FOLDER: &str = "deliverables";

const ZIP_CONTENT_TYPES: [&str; 3] = [
    "application/zip",
    "application/x-zip-compressed",
    "application/x-zip",
];

/// Only zip archives are accepted, recognised by content type or extension.
pub fn is_zip(file_name: &str, content_type: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .is_some_and(|ct| ZIP_CONTENT_TYPES.contains(&ct.as_str()));

    by_type || file_name.to_ascii_lowercase().ends_with(".zip")
}

/// `{projectId}_{originalName}_{millis}`, unique per upload.
pub fn object_name(project_id: Uuid, original_name: &str, millis: i64) -> String {
    format!("{project_id}_{original_name}_{millis}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_is_recognised_by_type_or_name() {
        assert!(is_zip("work.zip", None));
        assert!(is_zip("WORK.ZIP", Some("application/octet-stream")));
        assert!(is_zip("work", Some("application/zip")));
        assert!(is_zip("work", Some("application/x-zip-compressed; charset=binary")));
        assert!(!is_zip("work.pdf", Some("application/pdf")));
        assert!(!is_zip("work.tar.gz", None));
    }

    #[test]
    fn object_name_carries_project_and_time() {
        let id = Uuid::nil();
        assert_eq!(
            object_name(id, "logo.zip", 1700000000000),
            "00000000-0000-0000-0000-000000000000_logo.zip_1700000000000"
        );
    }
}
