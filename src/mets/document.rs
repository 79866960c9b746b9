//! Loaded METS document
//!
//! Owns the element tree, the id indexes and the cross-reference table.
//! Root lookups are memoized in `OnceCell`s, which makes a document `!Sync`:
//! one document belongs to one resolution at a time. Distinct requests load
//! their own documents and may run in parallel.

use std::cell::OnceCell;
use std::collections::HashMap;

use url::Url;

use crate::xml::{Element, ElementId, XmlDocument};

use super::error::{IdSpace, MetsError, Result};
use super::index::{ElementIndex, FileGroupIndex, IndexMode};

/// Link between a logical node and a physical node (`mets:smLink`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    pub from: String,
    pub to: String,
}

/// Parsed METS document borrowing its source text
#[derive(Debug)]
pub struct MetsDocument<'input> {
    url: Url,
    xml: XmlDocument<'input>,
    pub(crate) divs: ElementIndex,
    pub(crate) files: ElementIndex,
    pub(crate) dmd_sections: ElementIndex,
    pub(crate) file_groups: FileGroupIndex,
    links: Vec<CrossReference>,
    links_from: HashMap<String, Vec<usize>>,
    pub(crate) logical_root: OnceCell<ElementId>,
    pub(crate) physical_root: OnceCell<Option<ElementId>>,
}

impl<'input> MetsDocument<'input> {
    /// Parse and index a document fetched from `url`
    ///
    /// In eager mode duplicate ids are rejected here, before any node query.
    pub fn parse(url: Url, xml: &'input str, mode: IndexMode) -> Result<Self> {
        let xml = XmlDocument::parse(xml)?;
        if xml.root().name() != "mets" {
            return Err(MetsError::malformed(format!(
                "expected <mets> document element, found <{}>",
                xml.root().name()
            )));
        }

        let divs = ElementIndex::build(&xml, IdSpace::Div, mode)?;
        let files = ElementIndex::build(&xml, IdSpace::File, mode)?;
        let dmd_sections = ElementIndex::build(&xml, IdSpace::DmdSec, mode)?;
        let file_groups = FileGroupIndex::build(&xml, mode);

        let mut links = Vec::new();
        let mut links_from: HashMap<String, Vec<usize>> = HashMap::new();
        for link in xml.elements_named("smLink") {
            let (Some(from), Some(to)) = (link.non_empty_attr("from"), link.non_empty_attr("to"))
            else {
                tracing::warn!("Skipping smLink without from/to in {}", url);
                continue;
            };
            links_from.entry(from.to_string()).or_default().push(links.len());
            links.push(CrossReference {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        tracing::debug!(
            "Loaded METS document {} ({} elements, {} cross-references)",
            url,
            xml.len(),
            links.len()
        );

        Ok(Self {
            url,
            xml,
            divs,
            files,
            dmd_sections,
            file_groups,
            links,
            links_from,
            logical_root: OnceCell::new(),
            physical_root: OnceCell::new(),
        })
    }

    /// URL the document was loaded from; relative hrefs resolve against it
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn xml(&self) -> &XmlDocument<'_> {
        &self.xml
    }

    pub fn cross_references(&self) -> &[CrossReference] {
        &self.links
    }

    /// Cross-references whose "from" side is `id`, in declaration order
    pub fn links_from(&self, id: &str) -> impl Iterator<Item = &CrossReference> {
        self.links_from
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.links[i])
    }

    pub fn file_groups(&self) -> &FileGroupIndex {
        &self.file_groups
    }

    /// Resolve an href found in this document
    pub fn resolve_href(&self, href: &str) -> Result<Url> {
        self.url
            .join(href.trim())
            .map_err(|e| MetsError::malformed(format!("invalid href {:?}: {}", href, e)))
    }

    pub(crate) fn element(&self, id: ElementId) -> Option<Element<'_>> {
        self.xml().element(id)
    }
}

/// Typed view over a `mets:div` element
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Div<'d> {
    element: Element<'d>,
}

impl<'d> Div<'d> {
    /// Wrap an element; returns `None` if it is not a `div`
    pub fn new(element: Element<'d>) -> Option<Self> {
        (element.name() == "div").then_some(Self { element })
    }

    pub fn element(&self) -> Element<'d> {
        self.element
    }

    pub fn id(&self) -> &'d str {
        self.element.attr("ID").unwrap_or_default()
    }

    pub fn div_type(&self) -> Option<&'d str> {
        self.element.non_empty_attr("TYPE")
    }

    /// Whether this div is a physical page
    pub fn is_page(&self) -> bool {
        self.div_type()
            .is_some_and(|t| t.eq_ignore_ascii_case("page"))
    }

    /// Numeric ORDER, `None` if absent
    ///
    /// A present but non-numeric ORDER is a document defect.
    pub fn order(&self) -> Result<Option<u32>> {
        match self.element.non_empty_attr("ORDER") {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                MetsError::malformed(format!("div {} has non-numeric ORDER {:?}", self.id(), raw))
            }),
        }
    }

    /// ORDER for nodes where it is mandatory
    pub fn required_order(&self) -> Result<u32> {
        self.order()?.ok_or_else(|| {
            MetsError::malformed(format!("page {} has no ORDER attribute", self.id()))
        })
    }

    /// ORDER for sorting; unparsable values sort like missing ones
    pub(crate) fn sort_order(&self) -> Option<u32> {
        self.order().ok().flatten()
    }

    pub fn order_label(&self) -> Option<&'d str> {
        self.element.non_empty_attr("ORDERLABEL")
    }

    pub fn label(&self) -> Option<&'d str> {
        self.element.non_empty_attr("LABEL")
    }

    /// First id listed in DMDID
    pub fn dmd_id(&self) -> Option<&'d str> {
        self.element
            .non_empty_attr("DMDID")
            .and_then(|ids| ids.split_whitespace().next())
    }

    /// Raw hrefs of the external pointers (`mets:mptr`)
    pub fn pointer_hrefs(&self) -> Vec<&'d str> {
        self.element
            .children_named("mptr")
            .filter_map(|m| m.non_empty_attr("href"))
            .collect()
    }

    /// FILEIDs of the file pointers, in document order
    pub fn file_ids(&self) -> Vec<&'d str> {
        let mut ids = Vec::new();
        for fptr in self.element.children_named("fptr") {
            if let Some(id) = fptr.non_empty_attr("FILEID") {
                ids.push(id);
            }
            // METS allows area/seq/par wrappers inside fptr
            for area in fptr.descendants_named("area") {
                if let Some(id) = area.non_empty_attr("FILEID") {
                    ids.push(id);
                }
            }
        }
        ids
    }

    pub fn children(&self) -> impl Iterator<Item = Div<'d>> + 'd {
        self.element.children().filter_map(Div::new)
    }

    pub fn has_children(&self) -> bool {
        self.children().next().is_some()
    }
}

impl std::fmt::Debug for Div<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Div")
            .field("id", &self.id())
            .field("type", &self.div_type())
            .finish()
    }
}
