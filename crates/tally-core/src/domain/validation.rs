//! CreatePoll request validation.
//!
//! Requests arrive in transport shape (everything is a string, `maxVotes`
//! included). `validate` turns them into a `PollDraft` or an
//! `InvalidArgument` error; nothing reaches the ledger before this passes.

use std::collections::HashSet;

use super::ids::PollId;
use crate::error::PollError;

pub const DEFAULT_MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePollRequest {
    pub id: String,
    pub title: String,
    pub question: String,
    pub max_votes: String,
    pub options: Vec<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub id: PollId,
    pub title: String,
    pub question: String,
    pub max_votes: u32,
    pub options: Vec<String>,
}

impl CreatePollRequest {
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        title: impl Into<String>,
        question: impl Into<String>,
        max_votes: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            question: question.into(),
            max_votes: max_votes.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn validate(self, min_options: usize) -> Result<PollDraft, PollError> {
        let id = PollId::parse(self.id)?;

        let max_votes = match self.max_votes.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(PollError::invalid(format!(
                    "maxVotes must be a positive integer, got {:?}",
                    self.max_votes
                )));
            }
        };

        if self.options.len() < min_options {
            return Err(PollError::invalid(format!(
                "at least {min_options} options are required, got {}",
                self.options.len()
            )));
        }
        if self.options.iter().any(|o| o.is_empty()) {
            return Err(PollError::invalid("option text must not be empty"));
        }
        if let Some(dup) = first_duplicate(&self.options) {
            return Err(PollError::invalid(format!("duplicate option {dup:?}")));
        }

        Ok(PollDraft {
            id,
            title: self.title,
            question: self.question,
            max_votes,
            options: self.options,
        })
    }
}

/// 最初に重複した選択肢（大文字小文字は区別する）
pub(crate) fn first_duplicate(options: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(options.len());
    options
        .iter()
        .map(String::as_str)
        .find(|option| !seen.insert(*option))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[test]
    fn valid_request_becomes_a_draft() {
        let draft = CreatePollRequest::new("p1", "T", "Q?", "100", ["A", "B"])
            .validate(DEFAULT_MIN_OPTIONS)
            .unwrap();

        assert_eq!(draft.id.as_str(), "p1");
        assert_eq!(draft.max_votes, 100);
        assert_eq!(draft.options, vec!["A".to_string(), "B".to_string()]);
    }

    #[rstest]
    #[case::empty_id("", "10", vec!["A", "B"])]
    #[case::blank_id("  ", "10", vec!["A", "B"])]
    #[case::non_numeric_max("p1", "ten", vec!["A", "B"])]
    #[case::zero_max("p1", "0", vec!["A", "B"])]
    #[case::negative_max("p1", "-3", vec!["A", "B"])]
    #[case::empty_max("p1", "", vec!["A", "B"])]
    #[case::no_options("p1", "10", vec![])]
    #[case::single_option("p1", "10", vec!["A"])]
    #[case::empty_option("p1", "10", vec!["A", ""])]
    #[case::duplicate_option("p1", "10", vec!["A", "B", "A"])]
    fn invalid_requests_are_rejected(
        #[case] id: &str,
        #[case] max_votes: &str,
        #[case] options: Vec<&str>,
    ) {
        let err = CreatePollRequest::new(id, "T", "Q?", max_votes, options)
            .validate(DEFAULT_MIN_OPTIONS)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn min_options_is_configurable() {
        let single = CreatePollRequest::new("p1", "T", "Q?", "1", ["only"]);
        assert!(single.clone().validate(1).is_ok());
        assert!(single.validate(2).is_err());
    }

    #[test]
    fn options_are_case_sensitive() {
        let draft = CreatePollRequest::new("p1", "T", "Q?", "5", ["yes", "Yes"])
            .validate(DEFAULT_MIN_OPTIONS);
        assert!(draft.is_ok());
    }
}
