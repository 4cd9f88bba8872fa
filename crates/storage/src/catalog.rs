use std::collections::HashSet;
use std::fs;
use std::path::Path;

use dramashelf_core::Work;

use crate::CatalogError;

/// Reads the catalog file: a JSON array of works.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Work>, CatalogError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let works = parse_catalog(&text).map_err(|err| match err {
        CatalogError::Parse { source, .. } => CatalogError::Parse {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })?;
    tracing::info!(path = %path.display(), works = works.len(), "loaded catalog");
    Ok(works)
}

pub fn parse_catalog(text: &str) -> Result<Vec<Work>, CatalogError> {
    let works: Vec<Work> = serde_json::from_str(text).map_err(|source| CatalogError::Parse {
        path: "<inline>".to_string(),
        source,
    })?;

    let mut seen = HashSet::new();
    for work in &works {
        if !seen.insert(work.id) {
            return Err(CatalogError::DuplicateId(work.id));
        }
    }
    Ok(works)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dramashelf_core::WorkId;
    use std::io::Write as _;

    const CATALOG: &str = r#"[
        {
            "id": 1,
            "title": "死神与少年",
            "author": "ささきの茶釜",
            "translator": "就是很一般",
            "tags": ["小町", "圣白莲"],
            "isTranslated": true,
            "originalUrl": "https://example.com/o/1",
            "translatedUrl": "https://example.com/t/1",
            "description": "你是我活过的证明。",
            "thumbnail": "https://example.com/1.jpg",
            "dateAdded": "2023-06-18"
        },
        {
            "id": 2,
            "title": "幻想死洛谭",
            "author": "ささきの茶釜",
            "dateAdded": "2024-08-24"
        }
    ]"#;

    #[test]
    fn loads_catalog_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(CATALOG.as_bytes())?;
        let works = load_catalog(file.path())?;
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].translators(), vec!["就是很一般"]);
        assert!(!works[1].is_translated);
        assert!(works[1].tags.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_duplicate_ids() {
        let text = r#"[
            {"id": 3, "title": "a", "author": "x", "dateAdded": "2024-01-01"},
            {"id": 3, "title": "b", "author": "y", "dateAdded": "2024-01-02"}
        ]"#;
        let err = parse_catalog(text).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(WorkId(3))));
    }

    #[test]
    fn reports_path_on_bad_json() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"{ not a list")?;
        let err = load_catalog(file.path()).unwrap_err();
        match err {
            CatalogError::Parse { path, .. } => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_catalog("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
