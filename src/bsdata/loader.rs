//! Catalogue loader: read a faction's primary `.cat` file and any parent
//! catalogues it imports root entries from.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bsdata::schema::Catalogue;
use crate::bsdata::xml::parse_catalogue;
use crate::error::{LoadError, Result, WarboardError};

/// Prefix tried when a linked catalogue is not found under its bare name.
const PARENT_PREFIX: &str = "Imperium - ";

/// A primary catalogue together with the parents it inherits from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCatalogue {
    pub catalogue: Catalogue,
    /// Farthest ancestor first, so later entries override earlier ones.
    pub parents: Vec<Catalogue>,
}

impl LoadedCatalogue {
    pub fn standalone(catalogue: Catalogue) -> Self {
        LoadedCatalogue {
            catalogue,
            parents: Vec::new(),
        }
    }

    /// Parents first, primary last: the symbol-table insertion order.
    pub fn in_override_order(&self) -> impl Iterator<Item = &Catalogue> {
        self.parents.iter().chain(std::iter::once(&self.catalogue))
    }
}

pub fn parse_catalogue_file(path: &Path) -> Result<Catalogue> {
    let raw = fs::read_to_string(path).map_err(|source| WarboardError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalogue(&raw, path)
}

/// Load `file_name` from `dir` and resolve its parent links.
///
/// A missing primary file is a [`LoadError::MissingPrimary`]; a missing parent
/// is logged and loading proceeds without it.
pub fn load_catalogue(dir: &Path, file_name: &str) -> Result<LoadedCatalogue> {
    let path = dir.join(file_name);
    if !path.is_file() {
        return Err(LoadError::MissingPrimary(path).into());
    }
    let catalogue = parse_catalogue_file(&path)?;
    log::info!(
        "loaded {} (id={}, revision={})",
        path.display(),
        catalogue.id,
        catalogue.revision
    );

    let mut visited = HashSet::new();
    visited.insert(catalogue.id.clone());
    let mut parents = Vec::new();
    load_parents(dir, &catalogue, &mut visited, &mut parents)?;

    Ok(LoadedCatalogue { catalogue, parents })
}

fn load_parents(
    dir: &Path,
    catalogue: &Catalogue,
    visited: &mut HashSet<String>,
    parents: &mut Vec<Catalogue>,
) -> Result<()> {
    for link in catalogue
        .catalogue_links
        .iter()
        .filter(|link| link.import_root_entries)
    {
        if visited.contains(&link.target_id) {
            continue;
        }
        let Some(path) = locate_parent(dir, &link.name) else {
            log::warn!(
                "{}: parent catalogue '{}' not found in {}, continuing without inheritance",
                catalogue.name,
                link.name,
                dir.display()
            );
            continue;
        };

        let parent = parse_catalogue_file(&path)?;
        if !visited.insert(parent.id.clone()) {
            continue;
        }
        visited.insert(link.target_id.clone());
        log::info!("{}: inheriting from {}", catalogue.name, path.display());

        load_parents(dir, &parent, visited, parents)?;
        parents.push(parent);
    }
    Ok(())
}

fn locate_parent(dir: &Path, link_name: &str) -> Option<PathBuf> {
    parent_candidates(link_name)
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn parent_candidates(link_name: &str) -> Vec<String> {
    let name = link_name.trim();
    let mut candidates = vec![format!("{name}.cat")];
    if !name.starts_with(PARENT_PREFIX) {
        candidates.push(format!("{PARENT_PREFIX}{name}.cat"));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).expect("fixture should be written");
    }

    fn catalogue_xml(id: &str, name: &str, link: Option<(&str, &str)>) -> String {
        let links = match link {
            Some((target, link_name)) => format!(
                r#"<catalogueLinks><catalogueLink id="cl-{id}" name="{link_name}" targetId="{target}" importRootEntries="true"/></catalogueLinks>"#
            ),
            None => String::new(),
        };
        format!(r#"<catalogue id="{id}" name="{name}" revision="1">{links}</catalogue>"#)
    }

    #[test]
    fn missing_primary_is_a_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_catalogue(dir.path(), "Nope.cat").expect_err("should fail");
        assert!(matches!(
            err,
            WarboardError::Load(LoadError::MissingPrimary(_))
        ));
    }

    #[test]
    fn parent_found_by_prefixed_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "Imperium - Blood Legion.cat",
            &catalogue_xml("child", "Imperium - Blood Legion", Some(("parent", "Star Legion"))),
        );
        write(
            dir.path(),
            "Imperium - Star Legion.cat",
            &catalogue_xml("parent", "Imperium - Star Legion", None),
        );

        let loaded = load_catalogue(dir.path(), "Imperium - Blood Legion.cat").expect("load");
        assert_eq!(loaded.catalogue.id, "child");
        assert_eq!(loaded.parents.len(), 1);
        assert_eq!(loaded.parents[0].id, "parent");
    }

    #[test]
    fn missing_parent_degrades_to_no_inheritance() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "Orphans.cat",
            &catalogue_xml("child", "Orphans", Some(("gone", "Lost Library"))),
        );
        let loaded = load_catalogue(dir.path(), "Orphans.cat").expect("load");
        assert!(loaded.parents.is_empty());
    }

    #[test]
    fn link_cycles_terminate() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "A.cat", &catalogue_xml("a", "A", Some(("b", "B"))));
        write(dir.path(), "B.cat", &catalogue_xml("b", "B", Some(("a", "A"))));
        let loaded = load_catalogue(dir.path(), "A.cat").expect("load");
        assert_eq!(loaded.parents.len(), 1);
        assert_eq!(loaded.parents[0].id, "b");
    }

    #[test]
    fn grandparents_come_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "C.cat", &catalogue_xml("c", "C", Some(("b", "B"))));
        write(dir.path(), "B.cat", &catalogue_xml("b", "B", Some(("a", "A"))));
        write(dir.path(), "A.cat", &catalogue_xml("a", "A", None));
        let loaded = load_catalogue(dir.path(), "C.cat").expect("load");
        let ids: Vec<_> = loaded.in_override_order().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
