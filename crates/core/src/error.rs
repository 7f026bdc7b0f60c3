use crate::geometry::ViewportSize;
use crate::store::PageIndex;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("document has no pages")]
    EmptyDocument,
    #[error("failed to render page {page_index} at {size}")]
    Render {
        page_index: PageIndex,
        size: ViewportSize,
        #[source]
        source: BoxError,
    },
}

impl SessionError {
    pub(crate) fn render<E>(page_index: PageIndex, size: ViewportSize, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Render { page_index, size, source: Box::new(source) }
    }

    /// Page whose render failed, if this is a render error
    pub fn page_index(&self) -> Option<PageIndex> {
        match self {
            Self::Render { page_index, .. } => Some(*page_index),
            Self::EmptyDocument => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
