//! Best-effort model identity from a lot heading.

use crate::inference::rules::patterns::{FORM_FACTOR, HEADING_WARRANTY, LOT_CODE, TOWER};

use super::vendor::VendorProfile;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LotIdentity {
    pub lot_code: Option<String>,
    pub model_name: String,
    pub model_number: Option<String>,
    pub form_factor: Option<String>,
    /// Warranty years named in the heading ("- 1yr Warranty").
    pub warranty_years: Option<u32>,
}

pub fn identify(heading: &str, profile: &VendorProfile) -> LotIdentity {
    let heading = heading.trim();
    let lot_code = LOT_CODE.captures(heading).map(|c| c[1].to_string());
    let model_number = model_number(heading, profile);

    LotIdentity {
        model_name: model_name(heading, lot_code.as_deref()),
        form_factor: form_factor(heading, model_number.as_deref(), profile),
        warranty_years: HEADING_WARRANTY
            .captures(heading)
            .and_then(|c| c[1].parse().ok()),
        lot_code,
        model_number,
    }
}

/// Heading without the lot code prefix and the trailing warranty term.
fn model_name(heading: &str, lot_code: Option<&str>) -> String {
    let mut name = heading;
    if let Some(code) = lot_code {
        if let Some(rest) = name.strip_prefix(code) {
            name = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == ':');
        }
    }
    if let Some(m) = HEADING_WARRANTY.find(name) {
        name = name[..m.start()].trim_end_matches(|c: char| c.is_whitespace() || c == '-' || c == ',');
    }
    let name = name.trim();
    if name.is_empty() { heading.to_string() } else { name.to_string() }
}

fn model_number(heading: &str, profile: &VendorProfile) -> Option<String> {
    profile.model_patterns.iter().find_map(|pattern| {
        let caps = pattern.captures(heading)?;
        let parts: Vec<String> = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    })
}

fn form_factor(heading: &str, model_number: Option<&str>, profile: &VendorProfile) -> Option<String> {
    if let Some(caps) = FORM_FACTOR.captures(heading) {
        return Some(format!("{}U", &caps[1]));
    }
    if TOWER.is_match(heading) {
        return Some("Tower".to_string());
    }
    let number = model_number?.to_lowercase();
    profile
        .form_factors
        .iter()
        .find(|(prefix, _)| number.starts_with(prefix.as_str()))
        .map(|(_, ff)| ff.clone())
}
