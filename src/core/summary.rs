use crate::core::model::{clean_abstract, sanitize_xml, ArchDesc, Ead, EadHeader};
use serde::Serialize;

/// Essential metadata describing an archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding_aid: Option<FindingAid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<File>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

/// Core information about the archival record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingAid {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub agency_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_title: String,
    #[serde(rename = "unit", skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitInfo>,
}

/// Meta information of the archival record taken from `archdesc/did`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInfo {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub date: Vec<String>,
    pub date_bulk: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub physical: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub files: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub length: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub material: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repository: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub physical_location: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub origin: Vec<String>,
    #[serde(rename = "abstract", skip_serializing_if = "Vec::is_empty")]
    pub abstract_text: Vec<String>,
}

/// Meta information about the EAD file itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edition: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub publisher: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub publication_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub copyright: String,
    #[serde(rename = "copyrightURI")]
    pub copyright_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Profile {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
}

impl Summary {
    pub fn new(ead: &Ead) -> Self {
        let header = match ead.header.as_ref() {
            Some(header) => header,
            None => return Summary::default(),
        };

        let mut finding_aid = FindingAid::new(header);
        if let (Some(aid), Some(archdesc)) = (finding_aid.as_mut(), ead.archdesc.as_ref()) {
            aid.add_unit(archdesc);
        }

        Summary {
            finding_aid,
            file: File::new(header),
            profile: Profile::new(header),
        }
    }

    pub fn unit(&self) -> Option<&UnitInfo> {
        self.finding_aid.as_ref().and_then(|aid| aid.unit.as_ref())
    }
}

impl Profile {
    fn new(header: &EadHeader) -> Option<Profile> {
        let profile = header.profiledesc.as_ref()?;
        Some(Profile {
            creation: profile
                .creation
                .as_ref()
                .map(|c| sanitize_xml(&c.raw))
                .unwrap_or_default(),
            language: profile
                .langusage
                .as_ref()
                .map(|l| sanitize_xml(&l.raw))
                .unwrap_or_default(),
        })
    }
}

impl File {
    fn new(header: &EadHeader) -> Option<File> {
        let filedesc = header.filedesc.as_ref()?;
        let mut file = File::default();

        if let Some(title) = &filedesc.title_proper {
            file.title = sanitize_xml(&title.raw);
        }
        if let Some(author) = &filedesc.author {
            file.author = sanitize_xml(&author.raw);
        }
        if let Some(edition) = &filedesc.edition_stmt {
            file.edition.push(sanitize_xml(&edition.raw));
        }

        if let Some(publication) = &filedesc.publication {
            file.publisher = publication.publisher.clone().unwrap_or_default();
            file.publication_date = publication.dates.first().cloned().unwrap_or_default();

            let copyright = publication
                .paragraphs
                .iter()
                .filter(|p| p.id == "copyright")
                .filter_map(|p| p.extrefs.first())
                .last();
            if let Some(extref) = copyright {
                file.copyright = extref.text.clone();
                file.copyright_uri = extref.href().to_string();
            }
        }

        Some(file)
    }
}

impl FindingAid {
    /// Identification from the `eadid`; call [`FindingAid::add_unit`] for the unit information.
    fn new(header: &EadHeader) -> Option<FindingAid> {
        let eadid = header.eadid.as_ref()?;
        Some(FindingAid {
            id: eadid.id.clone(),
            country: eadid.country_code.clone(),
            agency_code: eadid.main_agency_code.clone(),
            ..Default::default()
        })
    }

    /// Adds the information of the first `archdesc/did`.
    pub fn add_unit(&mut self, archdesc: &ArchDesc) {
        let did = match archdesc.first_did() {
            Some(did) => did,
            None => return,
        };

        for title in &did.unittitles {
            if title.kind == "short" {
                self.short_title = sanitize_xml(&title.raw);
                continue;
            }
            self.title.push(sanitize_xml(&title.raw));
        }

        let mut unit = UnitInfo::default();

        // only c-levels carry more than one unitid
        if let Some(unitid) = did.unitids.last() {
            unit.id = unitid.id.clone();
        }

        for date in &did.unitdates {
            match date.kind.as_str() {
                "bulk" => unit.date_bulk = date.text.clone(),
                _ => unit.date.push(date.text.clone()),
            }
        }

        if let Some(physdesc) = did.physdescs.first() {
            for extent in &physdesc.extents {
                match extent.unit.as_str() {
                    "files" => unit.files = extent.text.clone(),
                    "meter" | "metre" | "metres" => unit.length = extent.text.clone(),
                    _ => {}
                }
            }
            unit.physical = sanitize_xml(&physdesc.raw);
        }

        if let Some(language) = &did.langmaterial {
            unit.language = sanitize_xml(&language.raw);
        }
        if let Some(material) = did.materialspecs.first() {
            unit.material = sanitize_xml(&material.raw);
        }
        if let Some(repository) = &did.repository {
            unit.repository = sanitize_xml(&repository.raw);
        }
        if let Some(physloc) = did.physlocs.first() {
            unit.physical_location = sanitize_xml(&physloc.raw);
        }

        if let Some(origination) = &did.origination {
            unit.origin = origination
                .raw
                .split("<corpname>")
                .filter(|part| !part.trim().is_empty())
                .map(|part| sanitize_xml(&part.replace(" , ", " ")))
                .collect();
        }

        if let Some(abstract_text) = &did.abstract_text {
            unit.abstract_text = clean_abstract(&abstract_text.raw);
        }

        self.unit = Some(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ead>
  <eadheader>
    <eadid countrycode="NL" mainagencycode="NL-HaNA">2.13.71</eadid>
    <filedesc>
      <titlestmt>
        <titleproper>Inventaris van het archief van het <emph>Ministerie</emph></titleproper>
        <author>J. Jansen</author>
      </titlestmt>
      <editionstmt><p>Tweede druk</p></editionstmt>
      <publicationstmt>
        <publisher>Nationaal Archief</publisher>
        <date>2019</date>
        <p id="copyright"><extref href="https://creativecommons.org/publicdomain/zero/1.0/">CC0</extref></p>
      </publicationstmt>
    </filedesc>
    <profiledesc>
      <creation>Gecodeerd in <date>2019</date></creation>
      <langusage>Nederlands</langusage>
    </profiledesc>
  </eadheader>
  <archdesc level="fonds">
    <did>
      <unittitle>Archief van het Ministerie van Marine</unittitle>
      <unittitle type="short">Marine</unittitle>
      <unitid>NL-HaNA</unitid>
      <unitid>2.13.71</unitid>
      <unitdate normal="1813/1928">1813-1928</unitdate>
      <unitdate type="bulk" normal="1850/1900">1850-1900</unitdate>
      <physdesc><extent unit="files">1204</extent><extent unit="metres">40,5</extent></physdesc>
      <langmaterial>Nederlands</langmaterial>
      <origination><corpname>Ministerie van Marine</corpname> , <corpname>Marinestaf</corpname></origination>
      <abstract>Eerste regel<lb/>Tweede regel</abstract>
    </did>
  </archdesc>
</ead>"#;

    #[test]
    fn test_summary_from_header_and_archdesc() {
        let ead = Ead::parse_str(EAD).unwrap();
        let summary = Summary::new(&ead);

        let aid = summary.finding_aid.as_ref().unwrap();
        assert_eq!(aid.id, "2.13.71");
        assert_eq!(aid.country, "NL");
        assert_eq!(aid.agency_code, "NL-HaNA");
        assert_eq!(aid.title, vec!["Archief van het Ministerie van Marine".to_string()]);
        assert_eq!(aid.short_title, "Marine");

        let unit = summary.unit().unwrap();
        assert_eq!(unit.id, "2.13.71");
        assert_eq!(unit.date, vec!["1813-1928".to_string()]);
        assert_eq!(unit.date_bulk, "1850-1900");
        assert_eq!(unit.files, "1204");
        assert_eq!(unit.length, "40,5");
        assert_eq!(unit.language, "Nederlands");
        assert_eq!(unit.origin.len(), 2);
        assert_eq!(unit.origin[0], "Ministerie van Marine");
        assert_eq!(
            unit.abstract_text,
            vec!["Eerste regel".to_string(), "Tweede regel".to_string()]
        );

        let file = summary.file.as_ref().unwrap();
        assert_eq!(file.title, "Inventaris van het archief van het Ministerie");
        assert_eq!(file.author, "J. Jansen");
        assert_eq!(file.edition, vec!["Tweede druk".to_string()]);
        assert_eq!(file.publisher, "Nationaal Archief");
        assert_eq!(file.publication_date, "2019");
        assert_eq!(file.copyright, "CC0");
        assert_eq!(
            file.copyright_uri,
            "https://creativecommons.org/publicdomain/zero/1.0/"
        );

        let profile = summary.profile.as_ref().unwrap();
        assert_eq!(profile.creation, "Gecodeerd in 2019");
        assert_eq!(profile.language, "Nederlands");
    }

    #[test]
    fn test_summary_without_header_is_empty() {
        let summary = Summary::new(&Ead::default());
        assert_eq!(summary, Summary::default());
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, "{}");
    }
}
