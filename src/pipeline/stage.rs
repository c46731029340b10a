use bson::{Document, doc};

/// One aggregation stage. Rendered as a single-key document.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Full-text search; rendered as a `$match` on `$text`.
    Search(String),
    Match(Document),
    Project(Document),
    Sort(Document),
    Skip(i64),
    Limit(i64),
}

impl Stage {
    /// Stage that lets every document through.
    #[must_use]
    pub fn match_all() -> Self {
        Self::Match(Document::new())
    }

    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Search(_) | Self::Match(_) => "$match",
            Self::Project(_) => "$project",
            Self::Sort(_) => "$sort",
            Self::Skip(_) => "$skip",
            Self::Limit(_) => "$limit",
        }
    }

    #[must_use]
    pub fn to_document(&self) -> Document {
        match self {
            Self::Search(text) => doc! { "$match": { "$text": { "$search": text.as_str() } } },
            Self::Match(d) => doc! { "$match": d.clone() },
            Self::Project(d) => doc! { "$project": d.clone() },
            Self::Sort(d) => doc! { "$sort": d.clone() },
            Self::Skip(n) => doc! { "$skip": *n },
            Self::Limit(n) => doc! { "$limit": *n },
        }
    }
}

impl From<Stage> for Document {
    fn from(stage: Stage) -> Self {
        stage.to_document()
    }
}
