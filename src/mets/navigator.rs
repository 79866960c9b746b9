//! Structure navigation
//!
//! Root, parent, file and cross-reference queries over one loaded
//! [`MetsDocument`].

use std::cmp::Ordering;

use url::Url;

use crate::xml::{Element, ElementId};

use super::document::{Div, MetsDocument};
use super::error::{IdSpace, MetsError, Result};

/// Resolved leaf file: id, group and absolute location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafFile {
    pub id: String,
    pub group: String,
    pub url: Url,
    pub mime_type: Option<String>,
}

/// Read-only navigation over one document
#[derive(Clone, Copy)]
pub struct StructureNavigator<'d> {
    doc: &'d MetsDocument<'d>,
}

impl<'d> StructureNavigator<'d> {
    pub fn new(doc: &'d MetsDocument<'d>) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &'d MetsDocument<'d> {
        self.doc
    }

    /// Look up a structural node by id
    pub fn div(&self, id: &str) -> Result<Div<'d>> {
        let element = self.doc.divs.get(self.doc.xml(), id)?;
        Div::new(element).ok_or_else(|| MetsError::not_found(IdSpace::Div, id))
    }

    /// The single top-level div of the logical structMap
    pub fn logical_root(&self) -> Result<Div<'d>> {
        let id = match self.doc.logical_root.get() {
            Some(&id) => id,
            None => {
                let id = self.find_logical_root()?;
                *self.doc.logical_root.get_or_init(|| id)
            }
        };
        self.as_div(id)
    }

    fn find_logical_root(&self) -> Result<ElementId> {
        let map = self
            .single_struct_map("LOGICAL")?
            .ok_or_else(|| MetsError::not_found("structMap", "LOGICAL"))?;
        let mut tops = map.children_named("div");
        let root = match (tops.next(), tops.next()) {
            (Some(root), None) => root,
            (None, _) => {
                return Err(MetsError::malformed("logical structMap contains no div"));
            }
            (Some(_), Some(_)) => {
                return Err(MetsError::malformed(
                    "logical structMap has more than one top-level div",
                ));
            }
        };

        Ok(root.id())
    }

    /// The top-level div of the physical structMap, if the document has one
    pub fn physical_root(&self) -> Result<Option<Div<'d>>> {
        let root = match self.doc.physical_root.get() {
            Some(&root) => root,
            None => {
                let root = self
                    .single_struct_map("PHYSICAL")?
                    .and_then(|map| map.child("div"))
                    .map(|d| d.id());
                *self.doc.physical_root.get_or_init(|| root)
            }
        };
        root.map(|id| self.as_div(id)).transpose()
    }

    fn single_struct_map(&self, map_type: &str) -> Result<Option<Element<'d>>> {
        let mut maps = self
            .doc
            .xml()
            .root()
            .children_named("structMap")
            .filter(|m| {
                m.attr("TYPE")
                    .is_some_and(|t| t.eq_ignore_ascii_case(map_type))
            });
        match (maps.next(), maps.next()) {
            (Some(_), Some(_)) => Err(MetsError::malformed(format!(
                "document has more than one {} structMap",
                map_type
            ))),
            (first, _) => Ok(first),
        }
    }

    fn as_div(&self, id: ElementId) -> Result<Div<'d>> {
        self.doc
            .element(id)
            .and_then(Div::new)
            .ok_or_else(|| MetsError::malformed("structMap root is not a div"))
    }

    pub fn is_logical_root(&self, div: &Div<'d>) -> Result<bool> {
        Ok(self.logical_root()? == *div)
    }

    /// Whether `div` lives in the physical structMap
    pub fn is_physical(&self, div: &Div<'d>) -> bool {
        div.element().ancestors().any(|a| {
            a.name() == "structMap"
                && a.attr("TYPE")
                    .is_some_and(|t| t.eq_ignore_ascii_case("PHYSICAL"))
        })
    }

    /// Parent div, `None` at the top of a structMap
    pub fn parent_of(&self, div: &Div<'d>) -> Option<Div<'d>> {
        div.element().parent().and_then(Div::new)
    }

    /// Nearest ancestor of the given type
    pub fn parent_of_type(&self, div: &Div<'d>, div_type: &str) -> Option<Div<'d>> {
        std::iter::successors(self.parent_of(div), |d| self.parent_of(d))
            .find(|d| d.div_type().is_some_and(|t| t.eq_ignore_ascii_case(div_type)))
    }

    /// `div` followed by its ancestors up to the structMap top
    pub fn self_and_ancestors(&self, div: &Div<'d>) -> Vec<Div<'d>> {
        std::iter::successors(Some(*div), |d| self.parent_of(d)).collect()
    }

    /// The file of `div` that belongs to `group`
    ///
    /// An empty `group` selects the first referenced file of any group.
    pub fn file_for(&self, div: &Div<'d>, group: &str) -> Result<LeafFile> {
        for file_id in div.file_ids() {
            let file = match self.doc.files.get(self.doc.xml(), file_id) {
                Ok(file) => file,
                Err(MetsError::NotFound { .. }) => {
                    tracing::warn!("div {} references unknown file {}", div.id(), file_id);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let file_group = self.doc.file_groups.group_of(&file)?;
            if group.is_empty() || file_group == group {
                return self.leaf_file(file, file_group);
            }
        }

        let wanted = if group.is_empty() { "any group" } else { group };
        Err(MetsError::not_found(
            "file",
            format!("{} of div {}", wanted, div.id()),
        ))
    }

    fn leaf_file(&self, file: Element<'d>, group: &str) -> Result<LeafFile> {
        let id = file.attr("ID").unwrap_or_default().to_string();
        let location = file
            .child("FLocat")
            .ok_or_else(|| MetsError::malformed(format!("file {} has no FLocat", id)))?;

        let loctype = location.attr("LOCTYPE").unwrap_or_default();
        if !loctype.eq_ignore_ascii_case("URL") {
            return Err(MetsError::UnsupportedLocationType {
                file_id: id,
                loctype: loctype.to_string(),
            });
        }

        let href = location
            .non_empty_attr("href")
            .ok_or_else(|| MetsError::malformed(format!("FLocat of file {} has no href", id)))?;

        Ok(LeafFile {
            url: self.doc.resolve_href(href)?,
            group: group.to_string(),
            mime_type: file.non_empty_attr("MIMETYPE").map(str::to_string),
            id,
        })
    }

    /// Nodes linked from `div` through cross-references, in declaration order
    pub fn related_nodes(&self, div: &Div<'d>) -> Vec<Div<'d>> {
        self.doc
            .links_from(div.id())
            .filter_map(|link| match self.div(&link.to) {
                Ok(target) => Some(target),
                Err(e) => {
                    tracing::warn!("Skipping smLink {} -> {}: {}", link.from, link.to, e);
                    None
                }
            })
            .collect()
    }

    /// Related pages sorted by ORDER ascending, order-less pages last
    pub fn related_pages_ascending(&self, div: &Div<'d>) -> Vec<Div<'d>> {
        let mut pages: Vec<Div<'d>> = self
            .related_nodes(div)
            .into_iter()
            .filter(Div::is_page)
            .collect();
        pages.sort_by(|a, b| compare_order_ascending(a.sort_order(), b.sort_order()));
        pages
    }

    /// Related pages sorted by ORDER descending, order-less pages first
    pub fn related_pages_descending(&self, div: &Div<'d>) -> Vec<Div<'d>> {
        let mut pages: Vec<Div<'d>> = self
            .related_nodes(div)
            .into_iter()
            .filter(Div::is_page)
            .collect();
        pages.sort_by(|a, b| compare_order_descending(a.sort_order(), b.sort_order()));
        pages
    }

    /// First page bound to `div`
    pub fn start_page(&self, div: &Div<'d>) -> Option<Div<'d>> {
        self.related_pages_ascending(div).into_iter().next()
    }

    /// Last page bound to `div`
    pub fn end_page(&self, div: &Div<'d>) -> Option<Div<'d>> {
        self.related_pages_descending(div).into_iter().next()
    }

    /// Absolute URL of the single external pointer of `div`
    ///
    /// `None` when the div has no pointer or more than one.
    pub fn external_pointer(&self, div: &Div<'d>) -> Result<Option<Url>> {
        match div.pointer_hrefs().as_slice() {
            [href] => self.doc.resolve_href(href).map(Some),
            [] => Ok(None),
            hrefs => {
                tracing::debug!("div {} has {} external pointers", div.id(), hrefs.len());
                Ok(None)
            }
        }
    }

    /// Descriptive metadata section referenced by DMDID
    pub fn dmd_section(&self, div: &Div<'d>) -> Result<Option<Element<'d>>> {
        match div.dmd_id() {
            Some(id) => self.doc.dmd_sections.get(self.doc.xml(), id).map(Some),
            None => Ok(None),
        }
    }
}

/// Ascending by order; missing orders sort after every present order
pub fn compare_order_ascending(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Exact reverse of [`compare_order_ascending`]: missing orders come first
pub fn compare_order_descending(a: Option<u32>, b: Option<u32>) -> Ordering {
    compare_order_ascending(a, b).reverse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mets::fixtures;

    #[test]
    fn test_roots_are_memoized() {
        let doc = fixtures::load(fixtures::MONOGRAPH_URL, fixtures::MONOGRAPH);
        let nav = StructureNavigator::new(&doc);
        assert!(doc.logical_root.get().is_none());

        let logical = nav.logical_root().unwrap();
        assert_eq!(logical.id(), "LOG_0000");
        assert!(doc.logical_root.get().is_some());
        assert_eq!(nav.logical_root().unwrap(), logical);

        let physical = nav.physical_root().unwrap().unwrap();
        assert_eq!(physical.id(), "PHYS_0000");
        assert!(nav.is_physical(&physical));
        assert!(!nav.is_physical(&logical));
    }

    #[test]
    fn test_missing_logical_map() {
        let doc = fixtures::load(
            "file:///tmp/empty.xml",
            r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/"><mets:fileSec/></mets:mets>"#,
        );
        let nav = StructureNavigator::new(&doc);
        assert!(nav.logical_root().unwrap_err().is_not_found());
        assert!(nav.physical_root().unwrap().is_none());
    }

    #[test]
    fn test_two_physical_maps_rejected() {
        let xml = r#"<mets>
            <structMap TYPE="LOGICAL"><div ID="L"/></structMap>
            <structMap TYPE="PHYSICAL"><div ID="P1"/></structMap>
            <structMap TYPE="PHYSICAL"><div ID="P2"/></structMap>
        </mets>"#;
        let doc = fixtures::load("file:///tmp/two.xml", xml);
        let nav = StructureNavigator::new(&doc);
        assert!(matches!(nav.physical_root(), Err(MetsError::MalformedDocument(_))));
    }

    #[test]
    fn test_parent_queries() {
        let doc = fixtures::load(fixtures::MONOGRAPH_URL, fixtures::MONOGRAPH);
        let nav = StructureNavigator::new(&doc);
        let section = nav.div("LOG_0003").unwrap();

        assert_eq!(nav.parent_of(&section).unwrap().id(), "LOG_0001");
        assert_eq!(nav.parent_of_type(&section, "monograph").unwrap().id(), "LOG_0000");
        assert!(nav.parent_of_type(&section, "volume").is_none());
        assert!(nav.parent_of(&nav.logical_root().unwrap()).is_none());

        let chain: Vec<&str> = nav.self_and_ancestors(&section).iter().map(|d| d.id()).collect();
        assert_eq!(chain, vec!["LOG_0003", "LOG_0001", "LOG_0000"]);
    }

    #[test]
    fn test_file_for_group_selection() {
        let doc = fixtures::load(fixtures::MONOGRAPH_URL, fixtures::MONOGRAPH);
        let nav = StructureNavigator::new(&doc);
        let page = nav.div("PHYS_0002").unwrap();

        let default = nav.file_for(&page, "DEFAULT").unwrap();
        assert_eq!(default.id, "FILE_0002");
        assert_eq!(default.url.as_str(), "http://images.example.org/werther/00000002.tif");
        assert_eq!(default.mime_type.as_deref(), Some("image/tiff"));

        assert_eq!(nav.file_for(&page, "THUMBS").unwrap().id, "THUMB_0002");
        assert_eq!(nav.file_for(&page, "").unwrap().id, "FILE_0002");
        assert!(nav.file_for(&page, "MAX").unwrap_err().is_not_found());

        let sequence = nav.physical_root().unwrap().unwrap();
        assert!(nav.file_for(&sequence, "").unwrap_err().is_not_found());
    }

    #[test]
    fn test_file_for_rejects_non_url_location() {
        let xml = fixtures::MONOGRAPH.replace(
            r#"<mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/00000001.tif"/>"#,
            r#"<mets:FLocat LOCTYPE="HANDLE" xlink:href="hdl:1234/5678"/>"#,
        );
        let doc = fixtures::load(fixtures::MONOGRAPH_URL, &xml);
        let nav = StructureNavigator::new(&doc);
        let page = nav.div("PHYS_0001").unwrap();
        assert!(matches!(
            nav.file_for(&page, "DEFAULT"),
            Err(MetsError::UnsupportedLocationType { ref loctype, .. }) if loctype == "HANDLE"
        ));
    }

    #[test]
    fn test_related_nodes_keep_declaration_order() {
        let doc = fixtures::load(fixtures::MONOGRAPH_URL, fixtures::MONOGRAPH);
        let nav = StructureNavigator::new(&doc);
        let chapter = nav.div("LOG_0001").unwrap();

        let related: Vec<&str> = nav.related_nodes(&chapter).iter().map(|d| d.id()).collect();
        assert_eq!(related, vec!["PHYS_0003", "PHYS_0002"]);

        assert_eq!(nav.start_page(&chapter).unwrap().id(), "PHYS_0002");
        assert_eq!(nav.end_page(&chapter).unwrap().id(), "PHYS_0003");
    }

    #[test]
    fn test_numeric_not_lexical_ordering() {
        assert_eq!(compare_order_ascending(Some(3), Some(10)), Ordering::Less);
        let mut orders = vec![Some(10), Some(3), Some(2)];
        orders.sort_by(|a, b| compare_order_ascending(*a, *b));
        assert_eq!(orders, vec![Some(2), Some(3), Some(10)]);
    }

    #[test]
    fn test_missing_order_last_ascending_first_descending() {
        let mut asc = vec![None, Some(2), Some(1)];
        asc.sort_by(|a, b| compare_order_ascending(*a, *b));
        assert_eq!(asc, vec![Some(1), Some(2), None]);

        let mut desc = vec![Some(1), None, Some(2)];
        desc.sort_by(|a, b| compare_order_descending(*a, *b));
        assert_eq!(desc, vec![None, Some(2), Some(1)]);
    }

    #[test]
    fn test_end_page_prefers_order_less_page() {
        let xml = r#"<mets xmlns:xlink="http://www.w3.org/1999/xlink">
            <structMap TYPE="LOGICAL"><div ID="L" TYPE="Monograph"/></structMap>
            <structMap TYPE="PHYSICAL"><div ID="S" TYPE="physSequence">
                <div ID="P1" TYPE="page" ORDER="1"/>
                <div ID="PX" TYPE="page"/>
                <div ID="P2" TYPE="page" ORDER="2"/>
            </div></structMap>
            <structLink>
                <smLink xlink:from="L" xlink:to="PX"/>
                <smLink xlink:from="L" xlink:to="P2"/>
                <smLink xlink:from="L" xlink:to="P1"/>
            </structLink>
        </mets>"#;
        let doc = fixtures::load("file:///tmp/orderless.xml", xml);
        let nav = StructureNavigator::new(&doc);
        let root = nav.logical_root().unwrap();
        assert_eq!(nav.start_page(&root).unwrap().id(), "P1");
        assert_eq!(nav.end_page(&root).unwrap().id(), "PX");
    }

    #[test]
    fn test_external_pointer_resolves_relative_href() {
        let doc = fixtures::load(fixtures::VOLUME_URL, fixtures::VOLUME);
        let nav = StructureNavigator::new(&doc);
        let root = nav.logical_root().unwrap();
        assert_eq!(
            nav.external_pointer(&root).unwrap().unwrap().as_str(),
            fixtures::ANCHOR_URL
        );
        let volume = nav.div("LOG_0001").unwrap();
        assert!(nav.external_pointer(&volume).unwrap().is_none());
    }
}
