//! Cascading title-page metadata
//!
//! Three strategies, chosen by where the requested div sits:
//!
//! - **top level**: the div is the logical root; only its own record is used
//! - **volume**: the div's parent holds exactly one external pointer; the
//!   parent work is loaded from that document
//! - **chapter**: everything else; the enclosing work is taken from the
//!   logical root, or from the document the root points to
//!
//! A resolver keeps one parent record so repeated lookups of the same
//! external document within one resolution load it once.

use std::time::Instant;

use serde::Serialize;
use url::Url;

use super::document::{Div, MetsDocument};
use super::error::{MetsError, Result};
use super::index::IndexMode;
use super::loader::{time_left, DocumentLoader};
use super::mods::{DescriptiveFields, MetadataExtractor};
use super::navigator::StructureNavigator;

pub const UNKNOWN_AUTHOR: &str = "unknown author";
pub const UNKNOWN_VOLUME: &str = "unknown volume";
pub const UNKNOWN_PAGE: &str = "unknown";

/// Longest work title printed on a chapter's title page
const MAX_WORK_TITLE_CHARS: usize = 80;
const TITLE_PAGE_LINES: usize = 4;

/// Up to four lines of cover-page text; absent lines stay `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TitlePage {
    lines: [Option<String>; TITLE_PAGE_LINES],
}

impl TitlePage {
    /// Line `n`, counted from 1
    pub fn line(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .and_then(|l| l.as_deref())
    }

    /// Present lines, top to bottom
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| l.as_deref())
    }

    fn set(&mut self, n: usize, value: Option<String>) {
        self.lines[n - 1] = value.filter(|v| !v.trim().is_empty());
    }
}

/// Document properties and cover text of one div
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub keywords: Vec<String>,
    pub title_page: TitlePage,
}

/// Which cascade applies to a div
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    TopLevel,
    Volume,
    Chapter,
}

pub struct MetadataCascadeResolver<'a> {
    extractor: &'a dyn MetadataExtractor,
    loader: Option<&'a dyn DocumentLoader>,
    max_pointer_depth: usize,
    index_mode: IndexMode,
    deadline: Option<Instant>,
    parent_cache: Option<(Url, DescriptiveFields)>,
}

impl<'a> MetadataCascadeResolver<'a> {
    pub fn new(
        extractor: &'a dyn MetadataExtractor,
        loader: Option<&'a dyn DocumentLoader>,
        max_pointer_depth: usize,
    ) -> Self {
        Self {
            extractor,
            loader,
            max_pointer_depth,
            index_mode: IndexMode::default(),
            deadline: None,
            parent_cache: None,
        }
    }

    /// Index mode for externally referenced documents
    pub fn with_index_mode(mut self, mode: IndexMode) -> Self {
        self.index_mode = mode;
        self
    }

    /// Stop following pointers once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn strategy<'d>(&self, nav: &StructureNavigator<'d>, div: &Div<'d>) -> Result<Strategy> {
        if nav.is_logical_root(div)? {
            return Ok(Strategy::TopLevel);
        }
        match nav.parent_of(div) {
            Some(parent) if parent.pointer_hrefs().len() == 1 => Ok(Strategy::Volume),
            _ => Ok(Strategy::Chapter),
        }
    }

    pub fn resolve<'d>(
        &mut self,
        nav: &StructureNavigator<'d>,
        div: &Div<'d>,
    ) -> Result<MetadataRecord> {
        let strategy = self.strategy(nav, div)?;
        tracing::debug!("Resolving metadata of {} as {:?}", div.id(), strategy);
        match strategy {
            Strategy::TopLevel => self.top_level(nav, div),
            Strategy::Volume => self.volume(nav, div),
            Strategy::Chapter => self.chapter(nav, div),
        }
    }

    // Monographs and multivolume anchors share this path, with or without
    // linked pages.
    fn top_level<'d>(&self, nav: &StructureNavigator<'d>, div: &Div<'d>) -> Result<MetadataRecord> {
        let own = self.extractor.extract(div, nav)?;

        let mut page = TitlePage::default();
        page.set(1, own.title.clone());
        page.set(2, own.creator().map(|a| format!("by {}", a)));
        page.set(3, place_and_date(own.place.as_deref(), own.date.as_deref()));

        Ok(MetadataRecord {
            title: own.title.clone(),
            creator: own.creator().map(str::to_string),
            keywords: own.keywords,
            title_page: page,
        })
    }

    fn volume<'d>(&mut self, nav: &StructureNavigator<'d>, div: &Div<'d>) -> Result<MetadataRecord> {
        let own = self.extractor.extract(div, nav)?;
        let parent = match nav.parent_of(div) {
            Some(parent_div) => match nav.external_pointer(&parent_div)? {
                Some(url) => self.external_work(nav, &url)?,
                None => DescriptiveFields::default(),
            },
            None => DescriptiveFields::default(),
        };

        let title = parent.title.clone().or_else(|| own.title.clone());
        let creator = own
            .creator()
            .or_else(|| parent.creator())
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string();

        let mut page = TitlePage::default();
        page.set(1, title.clone());
        page.set(
            2,
            Some(match own.volume_number.as_deref() {
                Some(number) => format!("volume: {}", number),
                None => UNKNOWN_VOLUME.to_string(),
            }),
        );
        page.set(3, Some(format!("by {}", creator)));
        page.set(
            4,
            place_and_date(
                own.place.as_deref().or(parent.place.as_deref()),
                own.date.as_deref().or(parent.date.as_deref()),
            ),
        );

        let keywords = if own.keywords.is_empty() {
            parent.keywords
        } else {
            own.keywords
        };

        Ok(MetadataRecord {
            title,
            creator: Some(creator),
            keywords,
            title_page: page,
        })
    }

    fn chapter<'d>(&mut self, nav: &StructureNavigator<'d>, div: &Div<'d>) -> Result<MetadataRecord> {
        let own = self.extractor.extract(div, nav)?;
        let root = nav.logical_root()?;

        let work = match nav.external_pointer(&root)? {
            Some(url) => self.external_work(nav, &url)?,
            None => self.extractor.extract(&root, nav)?,
        };
        // Not read from the logical root: in a volume file the root is the
        // pointer-only anchor stub and the number sits on the volume div.
        let volume_number = self.volume_number(nav, div)?;

        let start = nav.start_page(div).map(|p| page_label(&p));
        let end = nav.end_page(div).map(|p| page_label(&p));
        let author = own.creator().or_else(|| work.creator()).map(str::to_string);

        let mut page = TitlePage::default();
        page.set(1, own.title.clone());
        page.set(2, author.as_ref().map(|a| format!("by {}", a)));
        page.set(
            3,
            Some(in_line(
                work.title.as_deref(),
                volume_number.as_deref(),
                start.as_deref().unwrap_or(UNKNOWN_PAGE),
                end.as_deref().unwrap_or(UNKNOWN_PAGE),
            )),
        );
        page.set(4, place_and_date(work.place.as_deref(), work.date.as_deref()));

        Ok(MetadataRecord {
            title: own.title,
            creator: author,
            keywords: own.keywords,
            title_page: page,
        })
    }

    /// Volume number declared by `div` or its nearest ancestor
    fn volume_number<'d>(
        &self,
        nav: &StructureNavigator<'d>,
        div: &Div<'d>,
    ) -> Result<Option<String>> {
        for candidate in nav.self_and_ancestors(div) {
            if let Some(number) = self.extractor.extract(&candidate, nav)?.volume_number {
                return Ok(Some(number));
            }
        }
        Ok(None)
    }

    /// Work-level fields from the externally referenced document at `url`
    fn external_work<'d>(
        &mut self,
        nav: &StructureNavigator<'d>,
        url: &Url,
    ) -> Result<DescriptiveFields> {
        if let Some((cached_url, fields)) = &self.parent_cache {
            if cached_url == url {
                tracing::debug!("Parent record cache hit for {}", url);
                return Ok(fields.clone());
            }
        }

        let mut chain = vec![nav.document().url().to_string()];
        let fields = self.follow_pointer(url, &mut chain)?;
        self.parent_cache = Some((url.clone(), fields.clone()));
        Ok(fields)
    }

    fn follow_pointer(&self, url: &Url, chain: &mut Vec<String>) -> Result<DescriptiveFields> {
        if chain.iter().any(|seen| seen == url.as_str()) || chain.len() > self.max_pointer_depth {
            return Err(MetsError::Cycle {
                url: url.to_string(),
                chain: chain.clone(),
            });
        }
        chain.push(url.to_string());

        let Some(loader) = self.loader else {
            tracing::warn!("No document loader configured; not following pointer to {}", url);
            return Ok(DescriptiveFields::default());
        };

        time_left(self.deadline, url)?;
        let text = loader.load(url)?;
        let doc = MetsDocument::parse(url.clone(), &text, self.index_mode)?;
        let nav = StructureNavigator::new(&doc);
        let root = nav.logical_root()?;
        let mut fields = self.extractor.extract(&root, &nav)?;

        // A root that only points further up carries no work record itself
        if fields.title.is_none() {
            if let Some(next) = nav.external_pointer(&root)? {
                let upper = self.follow_pointer(&next, chain)?;
                fields = merge(fields, upper);
            }
        }
        Ok(fields)
    }
}

/// Fill the gaps of `own` from `upper`
fn merge(own: DescriptiveFields, upper: DescriptiveFields) -> DescriptiveFields {
    DescriptiveFields {
        title: own.title.or(upper.title),
        creators: if own.creators.is_empty() {
            upper.creators
        } else {
            own.creators
        },
        keywords: if own.keywords.is_empty() {
            upper.keywords
        } else {
            own.keywords
        },
        place: own.place.or(upper.place),
        date: own.date.or(upper.date),
        volume_number: own.volume_number.or(upper.volume_number),
    }
}

/// ORDERLABEL, else ORDER, else "unknown"
fn page_label(page: &Div<'_>) -> String {
    match (page.order_label(), page.sort_order()) {
        (Some(label), _) => label.to_string(),
        (None, Some(order)) => order.to_string(),
        (None, None) => UNKNOWN_PAGE.to_string(),
    }
}

/// `"<place>; <date>"`, `"<place>"` or `"published in <date>"`
pub fn place_and_date(place: Option<&str>, date: Option<&str>) -> Option<String> {
    let place = place.map(str::trim).filter(|p| !p.is_empty());
    let date = date.map(str::trim).filter(|d| !d.is_empty());
    match (place, date) {
        (Some(place), Some(date)) => Some(format!("{}; {}", place, date)),
        (Some(place), None) => Some(place.to_string()),
        (None, Some(date)) => Some(format!("published in {}", date)),
        (None, None) => None,
    }
}

/// Shorten `title` to at most [`MAX_WORK_TITLE_CHARS`] characters
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_WORK_TITLE_CHARS {
        return title.to_string();
    }
    let mut short: String = title.chars().take(MAX_WORK_TITLE_CHARS - 3).collect();
    short.push_str("...");
    short
}

fn in_line(work_title: Option<&str>, volume: Option<&str>, start: &str, end: &str) -> String {
    let mut line = String::new();
    if let Some(title) = work_title {
        line.push_str("in: ");
        line.push_str(&truncate_title(title));
    }
    if let Some(volume) = volume {
        line.push_str(if line.is_empty() { "in: " } else { "; " });
        line.push_str("volume: ");
        line.push_str(volume);
    }
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(&format!("(page(s) {} - {})", start, end));
    line
}
