//! Called number → campaign lookup for inbound calls.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignDirectory {
    by_number: BTreeMap<String, i64>,
    default_campaign: Option<i64>,
}

impl CampaignDirectory {
    /// Parses `+49301234=804,+49405678=805`. Blank input gives an empty map.
    pub fn parse(raw: &str, default_campaign: Option<i64>) -> Result<Self> {
        let mut by_number = BTreeMap::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (number, campaign) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("entry '{entry}' is missing '='"))?;
            let number = normalize_number(number);
            if number.is_empty() {
                return Err(anyhow!("entry '{entry}' has no phone number"));
            }
            let campaign = campaign
                .trim()
                .parse::<i64>()
                .map_err(|_| anyhow!("entry '{entry}' has a non-numeric campaign id"))?;
            by_number.insert(number, campaign);
        }
        Ok(Self {
            by_number,
            default_campaign,
        })
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn default_campaign(&self) -> Option<i64> {
        self.default_campaign
    }

    /// Mapped number first, then the default campaign.
    pub fn resolve(&self, called_number: Option<&str>) -> Option<i64> {
        called_number
            .map(normalize_number)
            .and_then(|n| self.by_number.get(&n).copied())
            .or(self.default_campaign)
    }
}

/// Keeps a leading `+` and the digits, so `+49 30 1234` and `+49-30-1234` match.
fn normalize_number(raw: &str) -> String {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return digits;
    }
    if raw.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}
