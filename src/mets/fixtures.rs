//! Test documents and an in-memory loader

use std::cell::RefCell;
use std::collections::HashMap;

use url::Url;

use super::document::MetsDocument;
use super::error::{MetsError, Result};
use super::index::IndexMode;
use super::loader::DocumentLoader;

pub const MONOGRAPH_URL: &str = "http://repo.example.org/mets/monograph.xml";
pub const VOLUME_URL: &str = "http://repo.example.org/mets/volume_2.xml";
pub const ANCHOR_URL: &str = "http://repo.example.org/mets/anchor.xml";
pub const CYCLE_A_URL: &str = "http://repo.example.org/mets/cycle_a.xml";
pub const CYCLE_B_URL: &str = "http://repo.example.org/mets/cycle_b.xml";

/// Monograph: root -> two chapters -> one section each, four pages
pub const MONOGRAPH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:mods="http://www.loc.gov/mods/v3" xmlns:xlink="http://www.w3.org/1999/xlink">
    <mets:dmdSec ID="DMDLOG_0000">
        <mets:mdWrap MDTYPE="MODS"><mets:xmlData><mods:mods>
            <mods:titleInfo><mods:nonSort>Die</mods:nonSort><mods:title>Leiden des jungen Werthers</mods:title></mods:titleInfo>
            <mods:name type="personal">
                <mods:role><mods:roleTerm authority="marcrelator" type="code">aut</mods:roleTerm></mods:role>
                <mods:displayForm>Goethe, Johann Wolfgang von</mods:displayForm>
            </mods:name>
            <mods:name type="personal">
                <mods:role><mods:roleTerm authority="marcrelator" type="code">edt</mods:roleTerm></mods:role>
                <mods:namePart type="family">Weygand</mods:namePart>
            </mods:name>
            <mods:originInfo>
                <mods:place><mods:placeTerm type="text">Leipzig</mods:placeTerm></mods:place>
                <mods:dateIssued encoding="w3cdtf">1774</mods:dateIssued>
            </mods:originInfo>
            <mods:subject><mods:topic>Briefroman</mods:topic><mods:topic>Sturm und Drang</mods:topic></mods:subject>
        </mods:mods></mets:xmlData></mets:mdWrap>
    </mets:dmdSec>
    <mets:dmdSec ID="DMDLOG_0001">
        <mets:mdWrap MDTYPE="MODS"><mets:xmlData><mods:mods>
            <mods:titleInfo><mods:title>Erstes Buch</mods:title></mods:titleInfo>
        </mods:mods></mets:xmlData></mets:mdWrap>
    </mets:dmdSec>
    <mets:dmdSec ID="DMDLOG_0002">
        <mets:mdWrap MDTYPE="MODS"><mets:xmlData><mods:mods>
            <mods:titleInfo><mods:title>Zweites Buch</mods:title></mods:titleInfo>
        </mods:mods></mets:xmlData></mets:mdWrap>
    </mets:dmdSec>
    <mets:fileSec>
        <mets:fileGrp USE="DEFAULT">
            <mets:file ID="FILE_0001" MIMETYPE="image/tiff"><mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/00000001.tif"/></mets:file>
            <mets:file ID="FILE_0002" MIMETYPE="image/tiff"><mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/00000002.tif"/></mets:file>
            <mets:file ID="FILE_0003" MIMETYPE="image/tiff"><mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/00000003.tif"/></mets:file>
            <mets:file ID="FILE_0004" MIMETYPE="image/tiff"><mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/00000004.tif"/></mets:file>
        </mets:fileGrp>
        <mets:fileGrp USE="THUMBS">
            <mets:file ID="THUMB_0001" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/thumbs/00000001.jpg"/></mets:file>
            <mets:file ID="THUMB_0002" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/thumbs/00000002.jpg"/></mets:file>
            <mets:file ID="THUMB_0003" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/thumbs/00000003.jpg"/></mets:file>
            <mets:file ID="THUMB_0004" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="http://images.example.org/werther/thumbs/00000004.jpg"/></mets:file>
        </mets:fileGrp>
    </mets:fileSec>
    <mets:structMap TYPE="LOGICAL">
        <mets:div ID="LOG_0000" TYPE="Monograph" DMDID="DMDLOG_0000" LABEL="Die Leiden des jungen Werthers">
            <mets:div ID="LOG_0001" TYPE="Chapter" DMDID="DMDLOG_0001">
                <mets:div ID="LOG_0003" TYPE="Section" LABEL="Am 4. Mai"/>
            </mets:div>
            <mets:div ID="LOG_0002" TYPE="Chapter" DMDID="DMDLOG_0002">
                <mets:div ID="LOG_0004" TYPE="Section" LABEL="Am 20. Dezember"/>
            </mets:div>
        </mets:div>
    </mets:structMap>
    <mets:structMap TYPE="PHYSICAL">
        <mets:div ID="PHYS_0000" TYPE="physSequence">
            <mets:div ID="PHYS_0001" TYPE="page" ORDER="1" ORDERLABEL="[Cover]">
                <mets:fptr FILEID="FILE_0001"/><mets:fptr FILEID="THUMB_0001"/>
            </mets:div>
            <mets:div ID="PHYS_0002" TYPE="page" ORDER="2" ORDERLABEL="2">
                <mets:fptr FILEID="FILE_0002"/><mets:fptr FILEID="THUMB_0002"/>
            </mets:div>
            <mets:div ID="PHYS_0003" TYPE="page" ORDER="3" ORDERLABEL="3">
                <mets:fptr FILEID="FILE_0003"/><mets:fptr FILEID="THUMB_0003"/>
            </mets:div>
            <mets:div ID="PHYS_0004" TYPE="page" ORDER="4" ORDERLABEL="4">
                <mets:fptr FILEID="FILE_0004"/><mets:fptr FILEID="THUMB_0004"/>
            </mets:div>
        </mets:div>
    </mets:structMap>
    <mets:structLink>
        <mets:smLink xlink:from="LOG_0000" xlink:to="PHYS_0001"/>
        <mets:smLink xlink:from="LOG_0000" xlink:to="PHYS_0002"/>
        <mets:smLink xlink:from="LOG_0000" xlink:to="PHYS_0003"/>
        <mets:smLink xlink:from="LOG_0000" xlink:to="PHYS_0004"/>
        <mets:smLink xlink:from="LOG_0001" xlink:to="PHYS_0003"/>
        <mets:smLink xlink:from="LOG_0001" xlink:to="PHYS_0002"/>
        <mets:smLink xlink:from="LOG_0003" xlink:to="PHYS_0002"/>
        <mets:smLink xlink:from="LOG_0002" xlink:to="PHYS_0004"/>
        <mets:smLink xlink:from="LOG_0004" xlink:to="PHYS_0004"/>
    </mets:structLink>
</mets:mets>"#;

/// Volume 2 of a multi-volume work; the logical root points at the anchor
pub const VOLUME: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:mods="http://www.loc.gov/mods/v3" xmlns:xlink="http://www.w3.org/1999/xlink">
    <mets:dmdSec ID="DMDLOG_0001">
        <mets:mdWrap MDTYPE="MODS"><mets:xmlData><mods:mods>
            <mods:titleInfo><mods:title>Biermolke - D</mods:title></mods:titleInfo>
            <mods:part order="2"><mods:detail type="volume"><mods:number>2</mods:number></mods:detail></mods:part>
            <mods:originInfo><mods:dateIssued>1860</mods:dateIssued></mods:originInfo>
        </mods:mods></mets:xmlData></mets:mdWrap>
    </mets:dmdSec>
    <mets:dmdSec ID="DMDLOG_0002">
        <mets:mdWrap MDTYPE="MODS"><mets:xmlData><mods:mods>
            <mods:titleInfo><mods:title>Vorrede</mods:title></mods:titleInfo>
            <mods:name type="personal">
                <mods:role><mods:roleTerm type="code">aut</mods:roleTerm></mods:role>
                <mods:namePart type="family">Grimm</mods:namePart>
                <mods:namePart type="given">Jacob</mods:namePart>
            </mods:name>
        </mods:mods></mets:xmlData></mets:mdWrap>
    </mets:dmdSec>
    <mets:fileSec>
        <mets:fileGrp USE="DEFAULT">
            <mets:file ID="FILE_0001"><mets:FLocat LOCTYPE="URL" xlink:href="images/00000001.jpg"/></mets:file>
            <mets:file ID="FILE_0002"><mets:FLocat LOCTYPE="URL" xlink:href="images/00000002.jpg"/></mets:file>
            <mets:file ID="FILE_0003"><mets:FLocat LOCTYPE="URL" xlink:href="images/00000003.jpg"/></mets:file>
        </mets:fileGrp>
    </mets:fileSec>
    <mets:structMap TYPE="LOGICAL">
        <mets:div ID="LOG_0000" TYPE="MultivolumeWork">
            <mets:mptr LOCTYPE="URL" xlink:href="anchor.xml"/>
            <mets:div ID="LOG_0001" TYPE="Volume" DMDID="DMDLOG_0001">
                <mets:div ID="LOG_0002" TYPE="Preface" DMDID="DMDLOG_0002"/>
            </mets:div>
        </mets:div>
    </mets:structMap>
    <mets:structMap TYPE="PHYSICAL">
        <mets:div ID="PHYS_0000" TYPE="physSequence">
            <mets:div ID="PHYS_0001" TYPE="page" ORDER="1" ORDERLABEL="I"><mets:fptr FILEID="FILE_0001"/></mets:div>
            <mets:div ID="PHYS_0002" TYPE="page" ORDER="2" ORDERLABEL="II"><mets:fptr FILEID="FILE_0002"/></mets:div>
            <mets:div ID="PHYS_0003" TYPE="page" ORDER="3" ORDERLABEL="III"><mets:fptr FILEID="FILE_0003"/></mets:div>
        </mets:div>
    </mets:structMap>
    <mets:structLink>
        <mets:smLink xlink:from="LOG_0000" xlink:to="PHYS_0000"/>
        <mets:smLink xlink:from="LOG_0001" xlink:to="PHYS_0001"/>
        <mets:smLink xlink:from="LOG_0001" xlink:to="PHYS_0002"/>
        <mets:smLink xlink:from="LOG_0001" xlink:to="PHYS_0003"/>
        <mets:smLink xlink:from="LOG_0002" xlink:to="PHYS_0002"/>
        <mets:smLink xlink:from="LOG_0002" xlink:to="PHYS_0003"/>
    </mets:structLink>
</mets:mets>"#;

/// Anchor of the multi-volume work; supplies only a title
pub const ANCHOR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:mods="http://www.loc.gov/mods/v3" xmlns:xlink="http://www.w3.org/1999/xlink">
    <mets:dmdSec ID="DMDLOG_0000">
        <mets:mdWrap MDTYPE="MODS"><mets:xmlData><mods:mods>
            <mods:titleInfo><mods:title>Deutsches Wörterbuch</mods:title></mods:titleInfo>
        </mods:mods></mets:xmlData></mets:mdWrap>
    </mets:dmdSec>
    <mets:structMap TYPE="LOGICAL">
        <mets:div ID="LOG_0000" TYPE="MultivolumeWork" DMDID="DMDLOG_0000">
            <mets:div ID="LOG_0001" TYPE="Volume" ORDER="2">
                <mets:mptr LOCTYPE="URL" xlink:href="volume_2.xml"/>
            </mets:div>
        </mets:div>
    </mets:structMap>
</mets:mets>"#;

/// Two documents whose logical roots point at each other
pub const CYCLE_A: &str = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
    <mets:fileSec><mets:fileGrp USE="DEFAULT">
        <mets:file ID="FILE_0001"><mets:FLocat LOCTYPE="URL" xlink:href="a/1.jpg"/></mets:file>
    </mets:fileGrp></mets:fileSec>
    <mets:structMap TYPE="LOGICAL">
        <mets:div ID="LOG_0000" TYPE="MultivolumeWork">
            <mets:mptr LOCTYPE="URL" xlink:href="cycle_b.xml"/>
            <mets:div ID="LOG_0001" TYPE="Volume">
                <mets:div ID="LOG_0002" TYPE="Chapter" LABEL="Loop"/>
            </mets:div>
        </mets:div>
    </mets:structMap>
    <mets:structMap TYPE="PHYSICAL">
        <mets:div ID="PHYS_0000" TYPE="physSequence">
            <mets:div ID="PHYS_0001" TYPE="page" ORDER="1"><mets:fptr FILEID="FILE_0001"/></mets:div>
        </mets:div>
    </mets:structMap>
    <mets:structLink>
        <mets:smLink xlink:from="LOG_0002" xlink:to="PHYS_0001"/>
    </mets:structLink>
</mets:mets>"#;

pub const CYCLE_B: &str = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
    <mets:structMap TYPE="LOGICAL">
        <mets:div ID="LOG_0000" TYPE="MultivolumeWork">
            <mets:mptr LOCTYPE="URL" xlink:href="cycle_a.xml"/>
        </mets:div>
    </mets:structMap>
</mets:mets>"#;

/// Parse a fixture, panicking on failure
pub fn load<'x>(url: &str, xml: &'x str) -> MetsDocument<'x> {
    MetsDocument::parse(Url::parse(url).unwrap(), xml, IndexMode::Eager).unwrap()
}

/// Loader serving fixtures from memory and recording every request
#[derive(Default)]
pub struct MapLoader {
    documents: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, xml: &str) -> Self {
        self.documents.insert(url.to_string(), xml.to_string());
        self
    }

    /// Every fixture in this module
    pub fn all() -> Self {
        Self::new()
            .with(MONOGRAPH_URL, MONOGRAPH)
            .with(VOLUME_URL, VOLUME)
            .with(ANCHOR_URL, ANCHOR)
            .with(CYCLE_A_URL, CYCLE_A)
            .with(CYCLE_B_URL, CYCLE_B)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl DocumentLoader for MapLoader {
    fn load(&self, url: &Url) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.documents
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| MetsError::not_found("document", url.as_str()))
    }
}
