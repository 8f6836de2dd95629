//! Records the server hands to the paper-list page.
//!
//! These mirror the JSON injected into the page, so field names follow the
//! wire format (note the capitalised score fields).

use serde::{Deserialize, Serialize};

/// A paper as shown in the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// arXiv identifier, e.g. `2401.01234`
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Author names joined with `", "`
    pub authors: String,
    /// Publication date as preformatted by the server
    pub time: String,
    /// Empty when there is no thumbnail
    #[serde(default)]
    pub thumb_url: String,
    /// Tags the logged-in user attached to this paper
    #[serde(default)]
    pub utags: Vec<String>,
    /// Ranking weight
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<PaperScore>,
    /// Markdown explanation of the score, may contain LaTeX
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_result: Option<String>,
}

impl Paper {
    /// Author names in display order.
    pub fn author_names(&self) -> impl Iterator<Item = &str> {
        self.authors.split(", ").filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperScore {
    #[serde(rename = "Reputation")]
    pub reputation: i64,
    #[serde(rename = "Interpretability")]
    pub interpretability: i64,
    #[serde(rename = "Understanding")]
    pub understanding: i64,
    #[serde(rename = "Surprisal")]
    pub surprisal: i64,
}

impl PaperScore {
    /// Whether the paper comes from one of the notable authors.
    pub fn is_notable(&self) -> bool {
        self.reputation == 1
    }
}

/// A user tag with the number of papers carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub n: u64,
}

impl TagCount {
    /// The synthetic tag that matches every tagged paper.
    pub fn is_all(&self) -> bool {
        self.name == "all"
    }
}

/// Word weight from the tag classifier, shown in the inspection panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordWeight {
    pub word: String,
    pub weight: f64,
}

/// Everything one page render needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub papers: Vec<Paper>,
    #[serde(default)]
    pub tags: Vec<TagCount>,
    /// Logged-in user, if any
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub words: Vec<WordWeight>,
}

impl PageData {
    pub fn from_json(json: &str) -> Result<Self, crate::SanityError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "papers": [{
            "id": "2401.00001",
            "title": "On $x^2$",
            "summary": "We study things.",
            "authors": "Ada Lovelace, Alan Turing",
            "time": "Jan 01 2024",
            "thumb_url": "",
            "utags": ["interp"],
            "weight": 1.5,
            "score": {"Reputation": 1, "Interpretability": 7, "Understanding": 5, "Surprisal": 3}
        }],
        "tags": [{"name": "all", "n": 3}, {"name": "interp", "n": 1}],
        "user": "ada",
        "words": []
    }"#;

    #[test]
    fn parses_injected_page_data() {
        let data = PageData::from_json(PAGE).unwrap();
        assert_eq!(data.papers.len(), 1);
        let paper = &data.papers[0];
        assert_eq!(paper.score.map(|s| s.interpretability), Some(7));
        assert!(paper.score.unwrap().is_notable());
        assert_eq!(paper.scoring_result, None);
        assert!(data.tags[0].is_all());
        assert_eq!(data.user.as_deref(), Some("ada"));
    }

    #[test]
    fn splits_authors() {
        let data = PageData::from_json(PAGE).unwrap();
        let names: Vec<_> = data.papers[0].author_names().collect();
        assert_eq!(names, vec!["Ada Lovelace", "Alan Turing"]);
    }

    #[test]
    fn missing_optional_sections_default() {
        let data = PageData::from_json("{}").unwrap();
        assert!(data.papers.is_empty());
        assert!(data.user.is_none());
    }
}
