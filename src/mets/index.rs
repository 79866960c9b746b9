//! Identifier and file-group indexes
//!
//! Built once when a document is loaded. In [`IndexMode::OnDemand`] no table
//! is kept and every lookup scans the tree, which is cheaper for one-shot
//! parses that only resolve a handful of ids.

use std::collections::HashMap;

use crate::xml::{Element, ElementId, XmlDocument};

use super::error::{IdSpace, MetsError, Result};

/// How identifier lookups are served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// Build lookup tables when the document is loaded
    #[default]
    Eager,
    /// Scan the tree on every lookup
    OnDemand,
}

/// Id → element table for one identifier space
#[derive(Debug)]
pub struct ElementIndex {
    space: IdSpace,
    by_id: Option<HashMap<String, ElementId>>,
}

impl ElementIndex {
    /// Build the index, failing on the first duplicated id in eager mode
    pub fn build(xml: &XmlDocument<'_>, space: IdSpace, mode: IndexMode) -> Result<Self> {
        if mode == IndexMode::OnDemand {
            return Ok(Self { space, by_id: None });
        }

        let mut by_id = HashMap::new();
        for element in xml.elements_named(space.element_name()) {
            let Some(id) = element.attr("ID") else {
                continue;
            };
            if by_id.insert(id.to_string(), element.id()).is_some() {
                return Err(MetsError::AmbiguousId {
                    kind: space,
                    id: id.to_string(),
                });
            }
        }

        tracing::debug!("Indexed {} {} ids", by_id.len(), space);
        Ok(Self {
            space,
            by_id: Some(by_id),
        })
    }

    pub fn space(&self) -> IdSpace {
        self.space
    }

    /// Look up an element by id
    pub fn get<'d>(&self, xml: &'d XmlDocument<'d>, id: &str) -> Result<Element<'d>> {
        match &self.by_id {
            Some(by_id) => by_id
                .get(id)
                .and_then(|&eid| xml.element(eid))
                .ok_or_else(|| MetsError::not_found(self.space, id)),
            None => {
                let mut matches = xml
                    .elements_named(self.space.element_name())
                    .filter(|e| e.attr("ID") == Some(id));
                let first = matches
                    .next()
                    .ok_or_else(|| MetsError::not_found(self.space, id))?;
                if matches.next().is_some() {
                    return Err(MetsError::AmbiguousId {
                        kind: self.space,
                        id: id.to_string(),
                    });
                }
                Ok(first)
            }
        }
    }

    pub fn len(&self) -> Option<usize> {
        self.by_id.as_ref().map(HashMap::len)
    }
}

/// A named rendition tier (`mets:fileGrp`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub label: String,
    pub files: Vec<String>,
}

/// Group label → members, and file id → owning group
#[derive(Debug, Default)]
pub struct FileGroupIndex {
    groups: Vec<FileGroup>,
    owner: HashMap<String, usize>,
}

impl FileGroupIndex {
    pub fn build(xml: &XmlDocument<'_>, mode: IndexMode) -> Self {
        if mode == IndexMode::OnDemand {
            return Self::default();
        }

        let mut index = Self::default();
        for group in xml.elements_named("fileGrp") {
            let label = group.attr("USE").unwrap_or_default().to_string();
            let files: Vec<String> = group
                .children_named("file")
                .filter_map(|f| f.attr("ID"))
                .map(str::to_string)
                .collect();
            let position = index.groups.len();
            for file in &files {
                index.owner.insert(file.clone(), position);
            }
            index.groups.push(FileGroup { label, files });
        }
        index
    }

    /// Label of the group owning `file`
    ///
    /// The table is only a shortcut over the tree; on a miss the owning
    /// `fileGrp` is found through the parent back-reference.
    pub fn group_of<'d>(&'d self, file: &Element<'d>) -> Result<&'d str> {
        let cached = file
            .attr("ID")
            .and_then(|id| self.owner.get(id))
            .map(|&i| self.groups[i].label.as_str());

        match cached {
            Some(label) => {
                debug_assert_eq!(Some(label), structural_group_of(file));
                Ok(label)
            }
            None => structural_group_of(file).ok_or_else(|| {
                MetsError::malformed(format!(
                    "file {} is not inside a fileGrp",
                    file.attr("ID").unwrap_or("<no id>")
                ))
            }),
        }
    }

    /// Members of the group with `label`, in document order
    pub fn members(&self, label: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|g| g.label == label)
            .map(|g| g.files.as_slice())
    }

    pub fn groups(&self) -> &[FileGroup] {
        &self.groups
    }
}

fn structural_group_of<'d>(file: &Element<'d>) -> Option<&'d str> {
    file.ancestors()
        .find(|a| a.name() == "fileGrp")
        .map(|g| g.attr("USE").unwrap_or_default())
}
