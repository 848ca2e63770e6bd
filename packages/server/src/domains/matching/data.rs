use serde::{Deserialize, Serialize};

use crate::common::{Category, MatchError, MatchResult, MemberId};
use crate::domains::matching::models::{MatchSuggestion, Need, Offer};
use crate::domains::member::Member;

/// A need as it arrives from the extraction layer
#[derive(Debug, Clone, Deserialize)]
pub struct NewNeed {
    pub label: String,
    pub category: String,
}

/// An offer as it arrives from the extraction layer
#[derive(Debug, Clone, Deserialize)]
pub struct NewOffer {
    pub label: String,
    pub category: String,
}

/// One member's check-in: what they need help with and what they can give
#[derive(Debug, Clone, Deserialize)]
pub struct CheckIn {
    pub member_id: MemberId,
    #[serde(default)]
    pub needs: Vec<NewNeed>,
    #[serde(default)]
    pub offers: Vec<NewOffer>,
}

impl CheckIn {
    pub fn validate(&self) -> MatchResult<()> {
        if self.needs.is_empty() && self.offers.is_empty() {
            return Err(MatchError::Validation(
                "a check-in needs at least one need or offer".into(),
            ));
        }

        let items = self
            .needs
            .iter()
            .map(|n| ("need", n.label.as_str(), n.category.as_str()))
            .chain(
                self.offers
                    .iter()
                    .map(|o| ("offer", o.label.as_str(), o.category.as_str())),
            );

        for (kind, label, category) in items {
            if label.trim().is_empty() {
                return Err(MatchError::Validation(format!("{} label is empty", kind)));
            }
            if Category::parse(category).is_none() {
                return Err(MatchError::Validation(format!(
                    "{} '{}' has no category",
                    kind,
                    label.trim()
                )));
            }
        }

        Ok(())
    }

    /// Validate and turn the payload into active records owned by the member
    pub fn into_records(self) -> MatchResult<(Vec<Need>, Vec<Offer>)> {
        self.validate()?;

        let member_id = self.member_id;
        let needs = self
            .needs
            .into_iter()
            .filter_map(|n| {
                Category::parse(&n.category).map(|c| Need::new(member_id, n.label.trim(), c))
            })
            .collect();
        let offers = self
            .offers
            .into_iter()
            .filter_map(|o| {
                Category::parse(&o.category).map(|c| Offer::new(member_id, o.label.trim(), c))
            })
            .collect();

        Ok((needs, offers))
    }
}

/// A suggestion together with the records a client renders next to it
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedMatch {
    #[serde(flatten)]
    pub suggestion: MatchSuggestion,
    /// Public profiles (None if the member record is gone)
    pub requester: Option<Member>,
    pub expert: Option<Member>,
    pub need: Option<Need>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_in(needs: Vec<(&str, &str)>, offers: Vec<(&str, &str)>) -> CheckIn {
        CheckIn {
            member_id: MemberId::new(),
            needs: needs
                .into_iter()
                .map(|(label, category)| NewNeed {
                    label: label.into(),
                    category: category.into(),
                })
                .collect(),
            offers: offers
                .into_iter()
                .map(|(label, category)| NewOffer {
                    label: label.into(),
                    category: category.into(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_check_in_rejected() {
        let err = check_in(vec![], vec![]).validate().unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[test]
    fn test_blank_label_rejected() {
        let err = check_in(vec![("  ", "sales")], vec![]).validate().unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[test]
    fn test_blank_category_rejected() {
        let err = check_in(vec![], vec![("Cold outreach", " ")])
            .validate()
            .unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[test]
    fn test_into_records_trims_and_assigns_owner() {
        let payload = check_in(
            vec![(" Raising a seed round ", "fundraising")],
            vec![("Docker containerization", "technical")],
        );
        let member_id = payload.member_id;
        let (needs, offers) = payload.into_records().unwrap();

        assert_eq!(needs.len(), 1);
        assert_eq!(needs[0].label, "Raising a seed round");
        assert_eq!(needs[0].requester_id, member_id);
        assert!(needs[0].is_active());
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].owner_id, member_id);
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let json = format!(
            r#"{{"member_id": "{}", "offers": [{{"label": "SEO", "category": "marketing"}}]}}"#,
            MemberId::new()
        );
        let payload: CheckIn = serde_json::from_str(&json).unwrap();
        assert!(payload.needs.is_empty());
        assert!(payload.validate().is_ok());
    }
}
