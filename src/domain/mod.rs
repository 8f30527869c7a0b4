pub mod article;
pub mod language;
pub mod pagination;
pub mod payload;
pub mod selection;

pub use article::{Article, ImageArticle};
pub use language::{Language, TranslationLanguage, AVAILABLE_LANGUAGES};
pub use pagination::{PaginatedView, PaginationState};
pub use payload::{MostRead, RawContentPayload};
pub use selection::Selection;
