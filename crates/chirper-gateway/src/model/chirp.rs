use serde::Serialize;

pub const TAGS_PARAM: &str = "tags";
pub const STARTING_DATE_PARAM: &str = "startingDate";
pub const ENDING_DATE_PARAM: &str = "endingDate";

pub const CHIRP_CREATED_MESSAGE: &str = "Chirp created successfully";

/// Repeated `tags` query parameters, in request order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub tags: Vec<String>,
}

impl FromIterator<(String, String)> for TagFilter {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let tags = iter
            .into_iter()
            .filter(|(key, _)| key == TAGS_PARAM)
            .map(|(_, value)| value)
            .collect();
        Self { tags }
    }
}

/// Query of the count endpoint. An empty date value counts as missing.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CountQuery {
    pub starting_date: Option<String>,
    pub ending_date: Option<String>,
    pub tags: Vec<String>,
}

impl FromIterator<(String, String)> for CountQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut query = CountQuery::default();
        for (key, value) in iter {
            match key.as_str() {
                TAGS_PARAM => query.tags.push(value),
                STARTING_DATE_PARAM if !value.is_empty() => query.starting_date = Some(value),
                ENDING_DATE_PARAM if !value.is_empty() => query.ending_date = Some(value),
                _ => {}
            }
        }
        query
    }
}

#[derive(Debug, Serialize)]
pub struct CreateChirpResponse {
    pub message: &'static str,
}

impl Default for CreateChirpResponse {
    fn default() -> Self {
        Self {
            message: CHIRP_CREATED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn tag_filter_keeps_repeated_tags_in_order() {
        let filter: TagFilter = pairs(&[("tags", "b"), ("other", "x"), ("tags", "a")])
            .into_iter()
            .collect();
        assert_eq!(filter.tags, vec!["b", "a"]);
    }

    #[test]
    fn count_query_collects_dates_and_tags() {
        let query: CountQuery = pairs(&[
            ("startingDate", "2016-01-01"),
            ("endingDate", "2016-01-02"),
            ("tags", "tag1"),
            ("tags", "tag2"),
        ])
        .into_iter()
        .collect();

        assert_eq!(query.starting_date.as_deref(), Some("2016-01-01"));
        assert_eq!(query.ending_date.as_deref(), Some("2016-01-02"));
        assert_eq!(query.tags, vec!["tag1", "tag2"]);
    }

    #[test]
    fn empty_date_counts_as_missing() {
        let query: CountQuery = pairs(&[("startingDate", ""), ("endingDate", "2016-01-02")])
            .into_iter()
            .collect();

        assert_eq!(query.starting_date, None);
        assert_eq!(query.ending_date.as_deref(), Some("2016-01-02"));
    }
}
