//! Wire types for the `/v1/students` surface.
//!
//! Shared by the HTTP server and the typed client so both sides agree on
//! field names, paging defaults and the search/sort vocabulary.

use serde::{Deserialize, Serialize};

/// Externally exposed read shape of a student record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub ra: String,
    pub cpf: String,
}

impl StudentView {
    /// Text fields considered by search, in display order.
    pub fn search_fields(&self) -> [&str; 4] {
        [self.name.as_str(), self.email.as_str(), self.ra.as_str(), self.cpf.as_str()]
    }

    pub fn matches(&self, term: &SearchTerm) -> bool {
        term.matches(self.search_fields())
    }
}

/// Creation payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStudentInput {
    pub name: String,
    pub email: String,
    pub ra: String,
    pub cpf: String,
}

/// Update payload; `ra` and `cpf` are fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStudentInput {
    pub name: String,
    pub email: String,
}

/// One page of results together with the echoed paging parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page_number: u64,
    pub page_size: u64,
}

fn default_page_number() -> u64 { 1 }
fn default_page_size() -> u64 { 10 }

/// Query string of `GET /v1/students/paged`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page_number")]
    pub page_number: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_desc: bool,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_number: default_page_number(),
            page_size: default_page_size(),
            search: None,
            sort_by: None,
            sort_desc: false,
        }
    }
}

impl PageQuery {
    pub fn page(page_number: u64, page_size: u64) -> Self {
        Self { page_number, page_size, ..Self::default() }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sorted_by(mut self, sort_by: impl Into<String>, descending: bool) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_desc = descending;
        self
    }

    pub fn search_term(&self) -> Option<SearchTerm> {
        SearchTerm::parse(self.search.as_deref())
    }

    pub fn sort(&self) -> StudentSort {
        StudentSort::parse(self.sort_by.as_deref(), self.sort_desc)
    }
}

/// Lower-cased, non-blank search text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Blank or whitespace-only input means "no filter".
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.trim().is_empty())
            .map(|s| SearchTerm(s.to_lowercase()))
    }

    /// Case-insensitive substring match against any of `fields`.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        fields
            .into_iter()
            .any(|f| f.to_lowercase().contains(self.0.as_str()))
    }

    /// `%term%` with `\` as the escape character for `%`, `_` and `\`.
    pub fn like_pattern(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        out.push('%');
        for c in self.0.chars() {
            if matches!(c, '%' | '_' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('%');
        out
    }
}

/// Column a page is ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Name,
    Email,
    Ra,
    Cpf,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Email => "email",
            SortKey::Ra => "ra",
            SortKey::Cpf => "cpf",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StudentSort {
    pub key: SortKey,
    pub descending: bool,
}

impl Default for StudentSort {
    fn default() -> Self {
        Self { key: SortKey::Id, descending: false }
    }
}

impl StudentSort {
    /// Keys are case-sensitive. Anything unrecognised orders by ascending id
    /// and ignores `descending`.
    pub fn parse(sort_by: Option<&str>, descending: bool) -> Self {
        let key = match sort_by {
            Some("name") => SortKey::Name,
            Some("email") => SortKey::Email,
            Some("ra") => SortKey::Ra,
            Some("cpf") => SortKey::Cpf,
            _ => return Self::default(),
        };
        Self { key, descending }
    }
}
