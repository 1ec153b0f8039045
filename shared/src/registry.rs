use std::collections::HashMap;

use serde::Serialize;

use crate::colors::{UNASSIGNED_COLOR, representative_color};
use crate::department::{UNASSIGNED_LABEL, normalize_department_code};

/// Representatives and department lists shown when no spreadsheet has been imported.
pub const DEFAULT_ASSIGNMENTS: [(&str, &[&str]); 13] = [
    ("Alex", &["01", "03", "07", "15", "26", "38", "42", "43", "63"]),
    ("Caroline", &["04", "05", "06", "13", "83", "84"]),
    ("Charles", &["67", "68", "80", "88"]),
    (
        "Charlotte",
        &["09", "11", "12", "30", "31", "32", "34", "46", "48", "65", "66", "81", "82"],
    ),
    ("Isabelle", &["2A", "2B"]),
    ("Laurence", &["14", "22", "27", "29", "35", "50", "56", "61", "76"]),
    ("Marvin", &["44", "49", "53", "72", "85"]),
    ("Olivier", &["75", "77", "78", "91", "92", "93", "94", "95"]),
    (
        "Pascal",
        &["16", "17", "19", "23", "24", "33", "40", "47", "64", "79", "86", "87"],
    ),
    (
        "Paul",
        &["02", "08", "10", "51", "52", "54", "55", "57", "59", "60", "62"],
    ),
    ("Pierre", &["21", "25", "39", "58", "70", "71", "89", "90"]),
    ("Victor", &["18", "28", "36", "37", "41", "45"]),
    ("Virginie", &["69", "73", "74"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Representative {
    pub name: String,
    pub departments: Vec<String>,
    pub color: String,
}

/// A department code claimed by more than one representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateAssignment {
    pub code: String,
    /// Representative that lookups resolve to.
    pub owner: String,
    pub shadowed: Vec<String>,
}

/// Representatives in registry order with a code index built once per rebuild.
///
/// When several representatives claim the same code the first one in
/// registry order owns it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    representatives: Vec<Representative>,
    owners: HashMap<String, usize>,
}

impl Registry {
    pub fn from_representatives(representatives: Vec<Representative>) -> Self {
        let mut owners = HashMap::new();
        for (idx, rep) in representatives.iter().enumerate() {
            for code in &rep.departments {
                owners.entry(code.clone()).or_insert(idx);
            }
        }
        Self {
            representatives,
            owners,
        }
    }

    pub fn build_default() -> Self {
        let representatives = DEFAULT_ASSIGNMENTS
            .iter()
            .enumerate()
            .map(|(idx, (name, codes))| Representative {
                name: (*name).to_owned(),
                departments: codes.iter().map(|code| (*code).to_owned()).collect(),
                color: representative_color(name, idx).to_owned(),
            })
            .collect();
        Self::from_representatives(representatives)
    }

    /// Groups `(name, code)` rows by name, keeping the order names first appear in.
    ///
    /// Both fields are trimmed; rows where either ends up empty are skipped.
    /// Single-digit codes are zero-padded before grouping.
    pub fn build_from_rows<I, N, C>(rows: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut representatives: Vec<Representative> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (name, code) in rows {
            let name = name.as_ref().trim();
            let code = normalize_department_code(code.as_ref());
            if name.is_empty() || code.is_empty() {
                continue;
            }

            let idx = match positions.get(name) {
                Some(idx) => *idx,
                None => {
                    let idx = representatives.len();
                    representatives.push(Representative {
                        name: name.to_owned(),
                        departments: Vec::new(),
                        color: representative_color(name, idx).to_owned(),
                    });
                    positions.insert(name.to_owned(), idx);
                    idx
                }
            };
            representatives[idx].departments.push(code);
        }

        Self::from_representatives(representatives)
    }

    pub fn representatives(&self) -> &[Representative] {
        &self.representatives
    }

    pub fn len(&self) -> usize {
        self.representatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }

    pub fn owner_of(&self, code: &str) -> Option<&Representative> {
        self.owners
            .get(code)
            .and_then(|idx| self.representatives.get(*idx))
    }

    pub fn color_of(&self, code: &str) -> &str {
        self.owner_of(code)
            .map_or(UNASSIGNED_COLOR, |rep| rep.color.as_str())
    }

    pub fn rep_of(&self, code: &str) -> &str {
        self.owner_of(code)
            .map_or(UNASSIGNED_LABEL, |rep| rep.name.as_str())
    }

    /// Sum of department list lengths; a code listed twice counts twice.
    pub fn total_departments(&self) -> usize {
        self.representatives
            .iter()
            .map(|rep| rep.departments.len())
            .sum()
    }

    /// Codes claimed by more than one representative, sorted by code.
    pub fn duplicate_assignments(&self) -> Vec<DuplicateAssignment> {
        let mut duplicates: Vec<DuplicateAssignment> = Vec::new();
        for (code, owner_idx) in &self.owners {
            let shadowed: Vec<String> = self
                .representatives
                .iter()
                .enumerate()
                .filter(|(idx, rep)| {
                    *idx != *owner_idx && rep.departments.iter().any(|c| c == code)
                })
                .map(|(_, rep)| rep.name.clone())
                .collect();
            if shadowed.is_empty() {
                continue;
            }
            duplicates.push(DuplicateAssignment {
                code: code.clone(),
                owner: self.representatives[*owner_idx].name.clone(),
                shadowed,
            });
        }
        duplicates.sort_by(|a, b| a.code.cmp(&b.code));
        duplicates
    }

    /// Representatives sorted by name for the sidebar, each with sorted codes.
    pub fn sorted_for_display(&self) -> Vec<Representative> {
        let mut sorted = self.representatives.clone();
        sorted.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        for rep in &mut sorted {
            rep.departments.sort();
        }
        sorted
    }
}
