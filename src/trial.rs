//! Clinical trial records
//!
//! Mirrors the clinicaltrials.gov v2 study shape. Every nested field is
//! optional: the record is read, never validated, and accessors return
//! `None` or an empty slice where the payload is silent.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Public study page on the registry
const STUDY_PAGE_BASE: &str = "https://clinicaltrials.gov/study/";

/// One clinical study returned by a search
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub protocol_section: ProtocolSection,
}

impl<'de> Deserialize<'de> for Trial {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Registry payloads wrap everything in `protocolSection`; some proxies
        // return the section itself.
        let mut record = Map::<String, Value>::deserialize(deserializer)?;
        let section = match record.remove("protocolSection") {
            Some(Value::Null) => return Ok(Trial::default()),
            Some(section) => section,
            None => Value::Object(record),
        };
        let protocol_section = ProtocolSection::deserialize(section).map_err(D::Error::custom)?;
        Ok(Trial { protocol_section })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtocolSection {
    #[serde(alias = "identification", skip_serializing_if = "Option::is_none")]
    pub identification_module: Option<IdentificationModule>,
    #[serde(alias = "status", skip_serializing_if = "Option::is_none")]
    pub status_module: Option<StatusModule>,
    #[serde(alias = "sponsorCollaborators", skip_serializing_if = "Option::is_none")]
    pub sponsor_collaborators_module: Option<SponsorCollaboratorsModule>,
    #[serde(alias = "description", skip_serializing_if = "Option::is_none")]
    pub description_module: Option<DescriptionModule>,
    #[serde(alias = "conditions", skip_serializing_if = "Option::is_none")]
    pub conditions_module: Option<ConditionsModule>,
    #[serde(alias = "design", skip_serializing_if = "Option::is_none")]
    pub design_module: Option<DesignModule>,
    #[serde(alias = "contactsLocations", skip_serializing_if = "Option::is_none")]
    pub contacts_locations_module: Option<ContactsLocationsModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentificationModule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nct_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusModule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_struct: Option<DateStruct>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateStruct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SponsorCollaboratorsModule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_sponsor: Option<Sponsor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sponsor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DescriptionModule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionsModule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignModule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_info: Option<EnrollmentInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactsLocationsModule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub central_contacts: Option<Vec<Contact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
}

/// A trial site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_point: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Central or site contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Trial {
    fn identification(&self) -> Option<&IdentificationModule> {
        self.protocol_section.identification_module.as_ref()
    }

    fn contacts_locations(&self) -> Option<&ContactsLocationsModule> {
        self.protocol_section.contacts_locations_module.as_ref()
    }

    pub fn nct_id(&self) -> Option<&str> {
        self.identification()?.nct_id.as_deref()
    }

    pub fn brief_title(&self) -> Option<&str> {
        self.identification()?.brief_title.as_deref()
    }

    pub fn official_title(&self) -> Option<&str> {
        self.identification()?.official_title.as_deref()
    }

    pub fn enrollment(&self) -> Option<u64> {
        self.protocol_section
            .design_module
            .as_ref()?
            .enrollment_info
            .as_ref()?
            .count
    }

    pub fn lead_sponsor(&self) -> Option<&str> {
        self.protocol_section
            .sponsor_collaborators_module
            .as_ref()?
            .lead_sponsor
            .as_ref()?
            .name
            .as_deref()
    }

    pub fn overall_status(&self) -> Option<&str> {
        self.protocol_section
            .status_module
            .as_ref()?
            .overall_status
            .as_deref()
    }

    pub fn start_date(&self) -> Option<&str> {
        self.protocol_section
            .status_module
            .as_ref()?
            .start_date_struct
            .as_ref()?
            .date
            .as_deref()
    }

    pub fn conditions(&self) -> &[String] {
        self.protocol_section
            .conditions_module
            .as_ref()
            .and_then(|m| m.conditions.as_deref())
            .unwrap_or(&[])
    }

    pub fn brief_summary(&self) -> Option<&str> {
        self.protocol_section
            .description_module
            .as_ref()?
            .brief_summary
            .as_deref()
    }

    pub fn locations(&self) -> &[Location] {
        self.contacts_locations()
            .and_then(|m| m.locations.as_deref())
            .unwrap_or(&[])
    }

    pub fn central_contacts(&self) -> &[Contact] {
        self.contacts_locations()
            .and_then(|m| m.central_contacts.as_deref())
            .unwrap_or(&[])
    }

    /// Registry page for this study, when it carries an NCT id
    pub fn page_url(&self) -> Option<String> {
        self.nct_id().map(|id| format!("{}{}", STUDY_PAGE_BASE, id))
    }
}

impl Location {
    /// "City, State" from whichever parts are present
    pub fn place(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Render a registry date ("2024-05-01" or "2024-05") for display.
/// Anything else is returned as-is.
pub fn format_start_date(raw: &str) -> String {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%B %-d, %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return date.format("%B %Y").to_string();
    }
    raw.to_string()
}
