//! List query parameters and the pagination metadata returned with each page.

use serde::Deserialize;

/// Filter and paging parameters for a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub search: Option<String>,
    /// Only items carrying this tag
    pub tag: Option<String>,
    /// Only items not carrying this tag
    pub exclude_tag: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListParams {
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = Some(grade.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn exclude_tag(mut self, tag: impl Into<String>) -> Self {
        self.exclude_tag = Some(tag.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Same filter, different page window.
    pub fn page(&self, limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..self.clone()
        }
    }

    /// Query string pairs in backend naming; unset fields are omitted.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let text = [
            ("subject", &self.subject),
            ("grade", &self.grade),
            ("search", &self.search),
            ("tag", &self.tag),
            ("excludeTag", &self.exclude_tag),
            ("sort", &self.sort),
        ];
        let numbers = [("limit", self.limit), ("offset", self.offset)];

        text.into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v.to_string()))
            })
            .chain(
                numbers
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.to_string()))),
            )
            .collect()
    }
}

/// Pagination metadata attached to a list response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub has_more: Option<bool>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl Pagination {
    /// Whether more items exist past the page that started at `offset` and returned
    /// `returned` items. An explicit `hasMore` wins over `total`.
    pub fn has_more(&self, offset: usize, returned: usize) -> bool {
        match (self.has_more, self.total) {
            (Some(has_more), _) => has_more,
            (None, Some(total)) => ((offset + returned) as u64) < total,
            (None, None) => false,
        }
    }
}
