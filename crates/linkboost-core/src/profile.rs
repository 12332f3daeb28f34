//! Normalization of scraped profile records.
//!
//! Scraping providers disagree on field names and types: images come as plain
//! strings or `{url}` objects, names as `fullName` or `firstName`/`lastName`,
//! lists as arrays, single strings, or singular/plural keys. Everything is
//! converted into [`Profile`] once, on receipt, so views never inspect raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

const TEXT_KEYS: [&str; 4] = ["text", "linkedinText", "name", "label"];
const PROFILE_IMAGE_KEYS: [&str; 5] = [
    "profilePicture",
    "photo",
    "displayImage",
    "profilePicUrl",
    "imgUrl",
];

/// Renders any value as display text. Objects yield their first non-empty
/// `text`, `linkedinText`, `name` or `label`; arrays and null yield `""`.
pub fn render_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) => String::new(),
        Value::Object(map) => TEXT_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|field| match field {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_default(),
    }
}

/// Resolves an image reference given as a URL string or a `{url}` object.
pub fn resolve_image(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("url") {
            Some(Value::String(url)) => url.clone(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Picks the first resolvable profile picture, or the placeholder.
pub fn resolve_profile_image(record: &Value) -> String {
    PROFILE_IMAGE_KEYS
        .iter()
        .map(|key| resolve_image(&record[*key]))
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
}

/// Arrays pass through; a non-blank string becomes a one-element list;
/// everything else is empty.
pub fn coerce_to_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) if !s.trim().is_empty() => vec![value.clone()],
        _ => Vec::new(),
    }
}

/// First key whose value renders to non-empty text.
fn first_text(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| render_text(&record[*key]))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// First key whose value resolves to a non-empty image URL.
fn first_image(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| resolve_image(&record[*key]))
        .find(|url| !url.is_empty())
        .unwrap_or_default()
}

/// First key that coerces to a non-empty list.
fn first_list(record: &Value, keys: &[&str]) -> Vec<Value> {
    keys.iter()
        .map(|key| coerce_to_list(&record[*key]))
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn count_text(value: &Value) -> String {
    let text = render_text(value);
    if text.is_empty() {
        "0".to_string()
    } else {
        text
    }
}

fn text_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .map(render_text)
        .filter(|text| !text.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub location: String,
    pub description: String,
    pub logo: String,
}

impl Experience {
    fn from_record(record: &Value) -> Self {
        if let Value::String(title) = record {
            return Self {
                title: title.clone(),
                ..Self::default()
            };
        }
        let end_date = first_text(record, &["endDate"]);
        Self {
            title: first_text(record, &["position", "title"]),
            company: first_text(record, &["companyName", "company"]),
            start_date: first_text(record, &["startDate"]),
            end_date: if end_date.is_empty() {
                "Present".to_string()
            } else {
                end_date
            },
            duration: first_text(record, &["duration"]),
            location: first_text(record, &["location"]),
            description: first_text(record, &["description"]),
            logo: first_image(record, &["companyLogo", "logoUrl", "logo"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub logo: String,
}

impl Education {
    fn from_record(record: &Value) -> Self {
        if let Value::String(school) = record {
            return Self {
                school: school.clone(),
                ..Self::default()
            };
        }
        Self {
            school: first_text(record, &["schoolName", "school", "title"]),
            degree: first_text(record, &["degreeName", "degree"]),
            field_of_study: first_text(record, &["fieldOfStudy"]),
            start_date: first_text(record, &["startDate"]),
            end_date: first_text(record, &["endDate"]),
            logo: first_image(record, &["schoolLogo", "logoUrl", "logo", "companyLogo"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedItem {
    pub title: String,
    pub url: String,
    pub image: String,
}

impl FeaturedItem {
    fn from_record(record: &Value) -> Self {
        Self {
            title: first_text(record, &["title", "description"]),
            url: first_text(record, &["url", "link"]),
            image: first_image(record, &["image", "thumbnail"]),
        }
    }
}

/// Canonical profile record. Every field is display-safe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    pub headline: String,
    pub about: String,
    pub location: String,
    pub profile_image: String,
    pub cover_image: String,
    pub follower_count: String,
    pub connections_count: String,
    pub current_position: String,
    pub linkedin_url: String,
    pub public_identifier: String,

    pub open_to_work: bool,
    pub hiring: bool,
    pub premium: bool,
    pub verified: bool,
    pub influencer: bool,

    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub featured: Vec<FeaturedItem>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
}

impl Profile {
    /// Adapts a provider payload into the canonical shape.
    pub fn from_record(record: &Value) -> Self {
        let mut full_name = first_text(record, &["fullName", "name"]);
        if full_name.is_empty() {
            let first = render_text(&record["firstName"]);
            let last = render_text(&record["lastName"]);
            full_name = format!("{} {}", first.trim(), last.trim()).trim().to_string();
        }

        let experience = first_list(record, &["experience", "experiences", "positions"])
            .iter()
            .map(Experience::from_record)
            .collect();

        let education = first_list(record, &["education", "educations"])
            .iter()
            .map(Education::from_record)
            .collect();

        let mut skills: Vec<String> = Vec::new();
        for skill in coerce_to_list(&record["topSkills"])
            .iter()
            .chain(coerce_to_list(&record["skills"]).iter())
        {
            let name = render_text(skill);
            if !name.is_empty() && !skills.contains(&name) {
                skills.push(name);
            }
        }

        let featured = coerce_to_list(&record["featured"])
            .iter()
            .map(FeaturedItem::from_record)
            .filter(|item| !item.title.is_empty() || !item.url.is_empty())
            .collect();

        Self {
            full_name,
            headline: first_text(record, &["headline", "occupation"]),
            about: first_text(record, &["about", "summary"]),
            location: first_text(record, &["location", "addressWithCountry"]),
            profile_image: resolve_profile_image(record),
            cover_image: first_image(record, &["coverPicture", "backgroundPicture"]),
            follower_count: count_text(&record["followerCount"]),
            connections_count: count_text(&record["connectionsCount"]),
            current_position: first_text(record, &["currentPosition"]),
            linkedin_url: first_text(record, &["linkedinUrl", "url"]),
            public_identifier: first_text(record, &["publicIdentifier"]),
            open_to_work: truthy(&record["openToWork"]),
            hiring: truthy(&record["hiring"]),
            premium: truthy(&record["premium"]),
            verified: truthy(&record["verified"]),
            influencer: truthy(&record["influencer"]),
            experience,
            education,
            skills,
            featured,
            certifications: text_list(&coerce_to_list(&record["certifications"])),
            languages: text_list(&coerce_to_list(&record["languages"])),
        }
    }

    /// Plain-text digest used as model context.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Name: {}\n", self.full_name));
        if !self.headline.is_empty() {
            out.push_str(&format!("Headline: {}\n", self.headline));
        }
        if !self.location.is_empty() {
            out.push_str(&format!("Location: {}\n", self.location));
        }
        if !self.about.is_empty() {
            out.push_str(&format!("About:\n{}\n", self.about));
        }
        if !self.experience.is_empty() {
            out.push_str("Experience:\n");
            for exp in &self.experience {
                out.push_str(&format!(
                    "- {} at {} ({} - {})\n",
                    exp.title, exp.company, exp.start_date, exp.end_date
                ));
                if !exp.description.is_empty() {
                    out.push_str(&format!("  {}\n", exp.description.replace('\n', "\n  ")));
                }
            }
        }
        if !self.education.is_empty() {
            out.push_str("Education:\n");
            for edu in &self.education {
                out.push_str(&format!("- {} {} {}\n", edu.school, edu.degree, edu.field_of_study));
            }
        }
        if !self.skills.is_empty() {
            out.push_str(&format!("Skills: {}\n", self.skills.join(", ")));
        }
        out
    }
}
